// ONNX Runtime backends for the exported models.
//
// Sequence classifiers (toxicity, identity hate, obscenity, insult):
//   inputs:  "sequences" i64 [batch, 70], "features" f32 [batch, 2]
//   output:  f32 [batch, 1] logits (pre-sigmoid)
//
// ULM toxicity classifier:
//   input:   "tokens" i64 [seq_len, 1] (sequence-first, batch of one)
//   output:  f32 [1, 2] logits (pre-softmax)
//
// The graphs are exported in evaluation mode, so dropout is already gone and
// a run is a pure function of its inputs.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

use super::traits::{LanguageModelClassifier, ModelInput, SequenceClassifier};
use crate::features::FEATURE_DIM;

fn load_session(model_path: &Path) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!(
            "Model file not found: {}\nRun `youtoxic assemble-artifacts` or check YOUTOXIC_ARTIFACT_DIR.",
            model_path.display()
        );
    }

    Session::builder()
        .context("Failed to create ONNX session builder")?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))
}

/// One of the four sequence classifiers.
pub struct OnnxSequenceClassifier {
    // ort::Session::run takes &mut self; the Mutex makes the classifier
    // shareable across request threads.
    session: Mutex<Session>,
}

impl OnnxSequenceClassifier {
    pub fn load(model_path: &Path) -> Result<Self> {
        let session = load_session(model_path)?;
        debug!("Loaded sequence classifier from {}", model_path.display());
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl SequenceClassifier for OnnxSequenceClassifier {
    fn infer(&self, input: &ModelInput<'_>) -> Result<Vec<f32>> {
        let batch_size = input.batch_size;
        if batch_size == 0 {
            return Ok(Vec::new());
        }

        let sequences = Tensor::from_array((
            [batch_size as i64, input.seq_len as i64],
            input.sequences.to_vec(),
        ))
        .context("Failed to create sequences tensor")?;
        let features = Tensor::from_array((
            [batch_size as i64, FEATURE_DIM as i64],
            input.features.to_vec(),
        ))
        .context("Failed to create features tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

        let outputs = session
            .run(ort::inputs! {
                "sequences" => sequences,
                "features" => features
            })
            .context("ONNX inference failed")?;

        // Output shape: [batch_size, 1]
        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract output tensor")?;

        if data.len() != batch_size {
            anyhow::bail!(
                "Model returned {} logits for a batch of {}",
                data.len(),
                batch_size
            );
        }
        Ok(data.to_vec())
    }
}

/// The ULM language-model toxicity classifier.
pub struct OnnxLanguageModelClassifier {
    session: Mutex<Session>,
}

impl OnnxLanguageModelClassifier {
    pub fn load(model_path: &Path) -> Result<Self> {
        let session = load_session(model_path)?;
        debug!("Loaded ULM classifier from {}", model_path.display());
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl LanguageModelClassifier for OnnxLanguageModelClassifier {
    fn logits(&self, token_ids: &[i64]) -> Result<[f32; 2]> {
        let tokens = Tensor::from_array(([token_ids.len() as i64, 1], token_ids.to_vec()))
            .context("Failed to create tokens tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

        let outputs = session
            .run(ort::inputs! { "tokens" => tokens })
            .context("ONNX inference failed")?;

        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract output tensor")?;

        match data {
            [not_toxic, toxic, ..] => Ok([*not_toxic, *toxic]),
            _ => anyhow::bail!("ULM model returned {} values, expected 2", data.len()),
        }
    }
}
