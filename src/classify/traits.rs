// Model traits: the seam between the Pipeline and whatever runs the weights.
//
// Inference is synchronous and CPU-bound. Callers on an async runtime
// (the web server) wrap calls in spawn_blocking.

use anyhow::Result;

/// One padded batch ready for a sequence classifier.
///
/// `sequences` is row-major `[batch_size, seq_len]`; `features` is row-major
/// `[batch_size, FEATURE_DIM]`, already standardized.
#[derive(Debug, Clone, Copy)]
pub struct ModelInput<'a> {
    pub sequences: &'a [i64],
    pub features: &'a [f32],
    pub batch_size: usize,
    pub seq_len: usize,
}

/// A binary classifier over (sequence, features) pairs.
///
/// Implementations must be deterministic: the same input always yields the
/// same logits.
pub trait SequenceClassifier: Send + Sync {
    /// Return one raw logit (pre-sigmoid) per row, in input order.
    fn infer(&self, input: &ModelInput<'_>) -> Result<Vec<f32>>;
}

/// A two-class classifier over a single variable-length token sequence.
pub trait LanguageModelClassifier: Send + Sync {
    /// Return the raw `[not_toxic, toxic]` logits for one sequence.
    fn logits(&self, token_ids: &[i64]) -> Result<[f32; 2]>;
}
