// Experimental ULM toxicity path.
//
// Independent of the four sequence classifiers: its own tokenizer, its own
// vocabulary, and a two-class softmax head instead of a single sigmoid
// logit. Runs one text at a time.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::category::softmax;
use super::onnx::OnnxLanguageModelClassifier;
use super::traits::LanguageModelClassifier;
use crate::artifacts::{ULM_MAPPINGS_FILE, ULM_MODEL_FILE};
use crate::text::ulm_tokenizer::{UlmTokenizer, UlmVocab};

/// Tokenizer, vocabulary and classifier for the ULM toxicity model.
pub struct UlmToxicityModel {
    tokenizer: UlmTokenizer,
    vocab: UlmVocab,
    classifier: Box<dyn LanguageModelClassifier>,
}

impl UlmToxicityModel {
    /// Load `mappings.json` and `ulm_toxicity_model.onnx` from the artifact directory.
    pub fn load(artifact_dir: &Path) -> Result<Self> {
        let vocab = UlmVocab::load(&artifact_dir.join(ULM_MAPPINGS_FILE))?;
        let classifier = OnnxLanguageModelClassifier::load(&artifact_dir.join(ULM_MODEL_FILE))?;
        Ok(Self::new(vocab, Box::new(classifier)))
    }

    pub fn new(vocab: UlmVocab, classifier: Box<dyn LanguageModelClassifier>) -> Self {
        Self {
            tokenizer: UlmTokenizer::new(),
            vocab,
            classifier,
        }
    }

    /// Token ids the model sees for `text`.
    pub fn encode(&self, text: &str) -> Vec<i64> {
        let tokens = self.tokenizer.tokenize(text);
        self.vocab.encode(&tokens)
    }

    /// Unrounded probability that `text` is toxic.
    pub fn toxic_probability(&self, text: &str) -> Result<f64> {
        let ids = self.encode(text);
        let logits = self
            .classifier
            .logits(&ids)
            .context("ULM inference failed")?;

        let probs = softmax(&[logits[0] as f64, logits[1] as f64]);
        debug!(tokens = ids.len(), toxic = probs[1], "ULM scored text");
        Ok(probs[1])
    }
}
