// Standardization of the raw feature vectors.
//
// The scaler was fit on the training set; its per-feature mean and scale
// are stored as scaler.json: {"mean": [m0, m1], "scale": [s0, s1]}. Both
// arrays are fixed-length, so a file with the wrong dimension fails to parse.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FeatureVector, FEATURE_DIM};

/// Fitted standardization parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: FeatureVector,
    pub scale: FeatureVector,
}

impl FeatureScaler {
    /// Load and validate the scaler parameters from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Scaler file not found: {}\nRun `youtoxic assemble-artifacts` or check YOUTOXIC_ARTIFACT_DIR.",
                path.display()
            );
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let scaler: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse scaler {}", path.display()))?;
        scaler.validate()?;

        debug!(mean = ?scaler.mean, scale = ?scaler.scale, "Loaded feature scaler");
        Ok(scaler)
    }

    /// Build a scaler from explicit parameters.
    pub fn new(mean: FeatureVector, scale: FeatureVector) -> Self {
        Self { mean, scale }
    }

    fn validate(&self) -> Result<()> {
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            anyhow::bail!("Scaler parameters must be finite");
        }
        Ok(())
    }

    /// Standardize one feature vector: `(x - mean) / scale`.
    /// A zero scale (constant feature at fit time) divides by 1.
    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_DIM];
        for (i, slot) in out.iter_mut().enumerate() {
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            *slot = (features[i] - self.mean[i]) / scale;
        }
        out
    }

    /// Standardize a batch into a flat row-major `[n, FEATURE_DIM]` buffer
    /// ready for the model input tensor.
    pub fn transform_batch(&self, features: &[FeatureVector]) -> Vec<f32> {
        features
            .iter()
            .flat_map(|f| self.transform(f))
            .map(|v| v as f32)
            .collect()
    }
}
