use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::classify::category::DEFAULT_THRESHOLD;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing tokenizer, scaler and model files
    /// (YOUTOXIC_ARTIFACT_DIR, defaults to the platform data dir).
    pub artifact_dir: PathBuf,
    /// Score cutoff for positive labels (YOUTOXIC_THRESHOLD, default 0.4).
    pub threshold: f64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let artifact_dir = env::var("YOUTOXIC_ARTIFACT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::artifacts::default_artifact_dir());

        let threshold = match env::var("YOUTOXIC_THRESHOLD") {
            Ok(raw) => parse_threshold(&raw)?,
            Err(_) => DEFAULT_THRESHOLD,
        };

        Ok(Self {
            artifact_dir,
            threshold,
        })
    }

    /// Check that every artifact the pipeline needs is on disk.
    /// Call this before loading so the error lists everything that's missing.
    pub fn require_artifacts(&self) -> Result<()> {
        let missing = crate::artifacts::missing_artifacts(&self.artifact_dir);
        if !missing.is_empty() {
            anyhow::bail!(
                "Artifacts missing from {}: {}\n\
                 Run `youtoxic assemble-artifacts` if they were shipped as shards,\n\
                 or set YOUTOXIC_ARTIFACT_DIR to the directory that holds them.",
                self.artifact_dir.display(),
                missing.join(", ")
            );
        }
        Ok(())
    }
}

fn parse_threshold(raw: &str) -> Result<f64> {
    let threshold: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("YOUTOXIC_THRESHOLD is not a number: {raw:?}"))?;
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("YOUTOXIC_THRESHOLD must be between 0 and 1, got {threshold}");
    }
    Ok(threshold)
}
