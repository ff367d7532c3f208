// The Pipeline: loads every artifact once and turns texts into labelled
// scores.
//
// For each category the steps are the same:
//   1. tokenize and pad to SEQUENCE_LEN
//   2. compute and standardize the two text features
//   3. run the category's classifier
//   4. sigmoid, round to 3 decimals
//   5. label = positive if rounded score > threshold, else negative
//
// Thresholding the rounded score keeps single-text and batch calls in
// agreement and the reported score consistent with its label.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::category::{
    round_score, sigmoid, BatchPrediction, Category, Prediction, DEFAULT_THRESHOLD,
};
use super::onnx::OnnxSequenceClassifier;
use super::traits::{ModelInput, SequenceClassifier};
use super::ulm::UlmToxicityModel;
use crate::artifacts::{SCALER_FILE, TOKENIZER_FILE};
use crate::features::get_features;
use crate::features::scaler::FeatureScaler;
use crate::text::sequencer::Sequencer;

/// Loaded models plus the shared tokenizer and scaler.
///
/// Immutable after construction; share it between threads as `Arc<Pipeline>`.
pub struct Pipeline {
    sequencer: Sequencer,
    scaler: FeatureScaler,
    /// Indexed by `Category::slot()`.
    classifiers: [Box<dyn SequenceClassifier>; 4],
    ulm: UlmToxicityModel,
    threshold: f64,
}

impl Pipeline {
    /// Eagerly load every artifact from `artifact_dir`.
    ///
    /// Fails on the first missing or unreadable file. There is no lazy
    /// loading and no retry.
    pub fn load(artifact_dir: &Path) -> Result<Self> {
        let started = Instant::now();

        let sequencer = Sequencer::load(&artifact_dir.join(TOKENIZER_FILE))?;
        let scaler = FeatureScaler::load(&artifact_dir.join(SCALER_FILE))?;

        let load = |category: Category| -> Result<Box<dyn SequenceClassifier>> {
            let classifier = OnnxSequenceClassifier::load(&artifact_dir.join(category.model_file()))
                .with_context(|| format!("Failed to load {} classifier", category))?;
            Ok(Box::new(classifier))
        };
        let classifiers = [
            load(Category::Toxicity)?,
            load(Category::IdentityHate)?,
            load(Category::Obscenity)?,
            load(Category::Insult)?,
        ];

        let ulm = UlmToxicityModel::load(artifact_dir).context("Failed to load ULM model")?;

        info!(
            dir = %artifact_dir.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pipeline loaded"
        );

        Ok(Self::from_parts(sequencer, scaler, classifiers, ulm))
    }

    /// Assemble a pipeline from already-loaded parts. `classifiers` is in
    /// `Category::ALL` order.
    pub fn from_parts(
        sequencer: Sequencer,
        scaler: FeatureScaler,
        classifiers: [Box<dyn SequenceClassifier>; 4],
        ulm: UlmToxicityModel,
    ) -> Self {
        Self {
            sequencer,
            scaler,
            classifiers,
            ulm,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Override the labelling threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score and label a single text.
    pub fn predict(&self, category: Category, text: &str) -> Result<Prediction> {
        let batch = self.predict_multiple(category, &[text])?;
        batch
            .get(0)
            .context("Classifier returned no prediction for a single text")
    }

    /// Score and label every text in one forward pass.
    pub fn predict_multiple<S: AsRef<str>>(
        &self,
        category: Category,
        texts: &[S],
    ) -> Result<BatchPrediction> {
        if texts.is_empty() {
            return Ok(BatchPrediction::default());
        }

        let sequences = self.sequencer.encode_batch(texts)?;
        let features = self.scaler.transform_batch(&get_features(texts));

        let input = ModelInput {
            sequences: &sequences,
            features: &features,
            batch_size: texts.len(),
            seq_len: self.sequencer.max_len(),
        };

        let logits = self.classifiers[category.slot()]
            .infer(&input)
            .with_context(|| format!("{} inference failed", category))?;

        if logits.len() != texts.len() {
            anyhow::bail!(
                "{} classifier returned {} logits for {} texts",
                category,
                logits.len(),
                texts.len()
            );
        }

        let mut batch = BatchPrediction::default();
        for logit in logits {
            if !logit.is_finite() {
                anyhow::bail!("{} classifier produced a non-finite logit", category);
            }
            let score = round_score(sigmoid(logit as f64));
            batch.scores.push(score);
            batch.labels.push(category.label_for(score, self.threshold));
        }

        debug!(category = category.key(), count = batch.len(), "Classified batch");
        Ok(batch)
    }

    /// Run several categories over the same texts, in `Category::ALL` order
    /// regardless of the order requested. Duplicates are ignored.
    pub fn classify<S: AsRef<str>>(
        &self,
        categories: &[Category],
        texts: &[S],
    ) -> Result<Vec<(Category, BatchPrediction)>> {
        Category::ALL
            .into_iter()
            .filter(|c| categories.contains(c))
            .map(|c| Ok((c, self.predict_multiple(c, texts)?)))
            .collect()
    }

    pub fn predict_toxicity(&self, text: &str) -> Result<Prediction> {
        self.predict(Category::Toxicity, text)
    }

    pub fn predict_toxicity_multiple<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<BatchPrediction> {
        self.predict_multiple(Category::Toxicity, texts)
    }

    pub fn predict_identity_hate(&self, text: &str) -> Result<Prediction> {
        self.predict(Category::IdentityHate, text)
    }

    pub fn predict_identity_hate_multiple<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<BatchPrediction> {
        self.predict_multiple(Category::IdentityHate, texts)
    }

    pub fn predict_obscenity(&self, text: &str) -> Result<Prediction> {
        self.predict(Category::Obscenity, text)
    }

    pub fn predict_obscenity_multiple<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<BatchPrediction> {
        self.predict_multiple(Category::Obscenity, texts)
    }

    pub fn predict_insult(&self, text: &str) -> Result<Prediction> {
        self.predict(Category::Insult, text)
    }

    pub fn predict_insult_multiple<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<BatchPrediction> {
        self.predict_multiple(Category::Insult, texts)
    }

    /// Toxicity via the ULM model: softmax over two classes, toxic = index 1.
    pub fn predict_toxicity_ulm(&self, text: &str) -> Result<Prediction> {
        let score = round_score(self.ulm.toxic_probability(text)?);
        Ok(Prediction {
            score,
            label: Category::Toxicity.label_for(score, self.threshold),
        })
    }

    /// ULM toxicity for each text. The model takes one sequence at a time,
    /// so this loops.
    pub fn predict_toxicity_ulm_multiple<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<BatchPrediction> {
        texts
            .iter()
            .map(|t| self.predict_toxicity_ulm(t.as_ref()))
            .collect::<Result<BatchPrediction>>()
    }
}
