// Classification categories and their prediction types.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Default cutoff above which a score is labelled positive.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// The four things the sequence classifiers detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Toxicity,
    IdentityHate,
    Obscenity,
    Insult,
}

impl Category {
    /// Every category, in the order results are reported.
    pub const ALL: [Category; 4] = [
        Category::Toxicity,
        Category::IdentityHate,
        Category::Obscenity,
        Category::Insult,
    ];

    /// Short key used by clients when requesting categories.
    pub fn key(self) -> &'static str {
        match self {
            Category::Toxicity => "toxic",
            Category::IdentityHate => "identity",
            Category::Obscenity => "obscene",
            Category::Insult => "insult",
        }
    }

    /// Human-readable name used as the result column heading.
    pub fn display_name(self) -> &'static str {
        match self {
            Category::Toxicity => "Toxicity",
            Category::IdentityHate => "Identity hate",
            Category::Obscenity => "Obscenity",
            Category::Insult => "Insult",
        }
    }

    /// ONNX file holding this category's classifier.
    pub fn model_file(self) -> &'static str {
        match self {
            Category::Toxicity => "toxicity_model.onnx",
            Category::IdentityHate => "identity_model.onnx",
            Category::Obscenity => "obscenity_model.onnx",
            Category::Insult => "insult_model.onnx",
        }
    }

    /// (positive, negative) labels.
    pub fn labels(self) -> (&'static str, &'static str) {
        match self {
            Category::Toxicity => ("Toxic", "Not toxic"),
            Category::IdentityHate => ("Prejudice", "Not prejudice"),
            Category::Obscenity => ("Obscene", "Not obscene"),
            Category::Insult => ("Insult", "Not an insult"),
        }
    }

    /// Label for a score under the given threshold. Strictly greater is positive.
    pub fn label_for(self, score: f64, threshold: f64) -> &'static str {
        let (positive, negative) = self.labels();
        if score > threshold {
            positive
        } else {
            negative
        }
    }

    /// Position of this category in [`Category::ALL`].
    pub(crate) fn slot(self) -> usize {
        match self {
            Category::Toxicity => 0,
            Category::IdentityHate => 1,
            Category::Obscenity => 2,
            Category::Insult => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    /// Accepts the request keys (`toxic`, `identity`, `obscene`, `insult`)
    /// and a few spelled-out aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "toxic" | "toxicity" => Ok(Category::Toxicity),
            "identity" | "identity_hate" | "identity-hate" | "prejudice" => {
                Ok(Category::IdentityHate)
            }
            "obscene" | "obscenity" => Ok(Category::Obscenity),
            "insult" => Ok(Category::Insult),
            other => anyhow::bail!(
                "Unknown classification type '{other}' (expected one of: toxic, identity, obscene, insult)"
            ),
        }
    }
}

/// One text's score (0..1, rounded to 3 decimals) and label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub score: f64,
    pub label: &'static str,
}

/// Scores and labels for a batch, index-aligned with the input texts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchPrediction {
    pub scores: Vec<f64>,
    pub labels: Vec<&'static str>,
}

impl BatchPrediction {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The i-th prediction, if present.
    pub fn get(&self, i: usize) -> Option<Prediction> {
        Some(Prediction {
            score: *self.scores.get(i)?,
            label: *self.labels.get(i)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Prediction> + '_ {
        self.scores
            .iter()
            .zip(&self.labels)
            .map(|(&score, &label)| Prediction { score, label })
    }
}

impl FromIterator<Prediction> for BatchPrediction {
    fn from_iter<I: IntoIterator<Item = Prediction>>(iter: I) -> Self {
        let mut batch = BatchPrediction::default();
        for p in iter {
            batch.scores.push(p.score);
            batch.labels.push(p.label);
        }
        batch
    }
}

/// Logistic function mapping a logit to (0, 1).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Round a score to 3 decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}
