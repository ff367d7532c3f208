// Shared fixtures: a tiny vocabulary and deterministic fake models.
//
// The fake sequence classifier scores a text by how many "bad" words it
// contains, so tests can steer predictions without real weights.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use youtoxic::classify::traits::{LanguageModelClassifier, ModelInput, SequenceClassifier};
use youtoxic::classify::ulm::UlmToxicityModel;
use youtoxic::classify::Pipeline;
use youtoxic::features::scaler::FeatureScaler;
use youtoxic::text::sequencer::Sequencer;
use youtoxic::text::ulm_tokenizer::UlmVocab;

/// Same layout as an exported Keras vocabulary: lowercase, filter
/// characters replaced by spaces, split on whitespace.
pub const TOKENIZER_JSON: &str = r##"{
    "version": "1.0",
    "truncation": null,
    "padding": null,
    "added_tokens": [],
    "normalizer": {
        "type": "Sequence",
        "normalizers": [
            {"type": "Lowercase"},
            {
                "type": "Replace",
                "pattern": {"Regex": "[!\"#$%&()*+,\\-./:;<=>?@\\[\\\\\\]^_`{|}~\\t\\n]"},
                "content": " "
            }
        ]
    },
    "pre_tokenizer": {"type": "WhitespaceSplit"},
    "post_processor": null,
    "decoder": null,
    "model": {
        "type": "WordLevel",
        "vocab": {
            "<OOV>": 1, "foo": 2, "bar": 3, "baz": 4, "fiz": 5,
            "you": 6, "are": 7, "an": 8, "idiot": 9, "damn": 10, "nice": 11,
            "don't": 12
        },
        "unk_token": "<OOV>"
    }
}"##;

pub const OOV_ID: u32 = 1;
pub const IDIOT_ID: i64 = 9;
pub const DAMN_ID: i64 = 10;
pub const DONT_ID: u32 = 12;

/// logit = base + per_hit * (occurrences of `flagged` ids in the sequence)
pub struct WordCountClassifier {
    pub flagged: Vec<i64>,
    pub base: f32,
    pub per_hit: f32,
    pub calls: Arc<AtomicUsize>,
}

impl WordCountClassifier {
    pub fn new(flagged: Vec<i64>) -> Self {
        Self {
            flagged,
            base: -3.0,
            per_hit: 6.0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SequenceClassifier for WordCountClassifier {
    fn infer(&self, input: &ModelInput<'_>) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(input.sequences.len(), input.batch_size * input.seq_len);
        assert_eq!(input.features.len(), input.batch_size * 2);

        Ok(input
            .sequences
            .chunks(input.seq_len)
            .map(|row| {
                let hits = row.iter().filter(|id| self.flagged.contains(id)).count();
                self.base + self.per_hit * hits as f32
            })
            .collect())
    }
}

/// Always returns the same logit, whatever the input.
pub struct ConstantClassifier(pub f32);

impl SequenceClassifier for ConstantClassifier {
    fn infer(&self, input: &ModelInput<'_>) -> Result<Vec<f32>> {
        Ok(vec![self.0; input.batch_size])
    }
}

/// Returns the first standardized feature as the logit.
pub struct FeatureEchoClassifier;

impl SequenceClassifier for FeatureEchoClassifier {
    fn infer(&self, input: &ModelInput<'_>) -> Result<Vec<f32>> {
        Ok(input.features.chunks(2).map(|f| f[0]).collect())
    }
}

/// Every call fails, like a session whose run errors out.
pub struct FailingClassifier;

impl SequenceClassifier for FailingClassifier {
    fn infer(&self, _input: &ModelInput<'_>) -> Result<Vec<f32>> {
        anyhow::bail!("session run failed")
    }
}

/// Returns one logit no matter how many texts were sent.
pub struct SingleLogitClassifier;

impl SequenceClassifier for SingleLogitClassifier {
    fn infer(&self, _input: &ModelInput<'_>) -> Result<Vec<f32>> {
        Ok(vec![0.0])
    }
}

/// Toxic when any token maps to "idiot" in the ULM vocabulary.
pub struct FakeUlm;

pub const ULM_ITOS: [&str; 6] = ["xxunk", "xxpad", "xxmaj", "you", "idiot", "nice"];

impl LanguageModelClassifier for FakeUlm {
    fn logits(&self, token_ids: &[i64]) -> Result<[f32; 2]> {
        if token_ids.contains(&4) {
            Ok([-2.0, 2.0])
        } else {
            Ok([1.5, -1.5])
        }
    }
}

pub struct FailingUlm;

impl LanguageModelClassifier for FailingUlm {
    fn logits(&self, _token_ids: &[i64]) -> Result<[f32; 2]> {
        anyhow::bail!("session run failed")
    }
}

pub fn sequencer() -> Sequencer {
    Sequencer::from_bytes(TOKENIZER_JSON.as_bytes()).unwrap()
}

pub fn ulm_model() -> UlmToxicityModel {
    ulm_model_with(Box::new(FakeUlm))
}

pub fn ulm_model_with(classifier: Box<dyn LanguageModelClassifier>) -> UlmToxicityModel {
    let itos = ULM_ITOS.iter().map(|s| s.to_string()).collect();
    UlmToxicityModel::new(UlmVocab::from_itos(itos), classifier)
}

/// Pipeline where toxicity flags "idiot", identity hate never fires,
/// obscenity flags "damn", insult flags "idiot".
pub fn pipeline() -> Pipeline {
    Pipeline::from_parts(
        sequencer(),
        FeatureScaler::new([0.05, 0.95], [0.1, 0.1]),
        [
            Box::new(WordCountClassifier::new(vec![IDIOT_ID])),
            Box::new(ConstantClassifier(-4.0)),
            Box::new(WordCountClassifier::new(vec![DAMN_ID])),
            Box::new(WordCountClassifier::new(vec![IDIOT_ID])),
        ],
        ulm_model(),
    )
}

/// Pipeline with the given toxicity classifier; the other three are
/// constant and the ULM is `ulm`.
pub fn pipeline_with(
    toxicity: Box<dyn SequenceClassifier>,
    ulm: Box<dyn LanguageModelClassifier>,
) -> Pipeline {
    Pipeline::from_parts(
        sequencer(),
        FeatureScaler::new([0.0, 0.0], [1.0, 1.0]),
        [
            toxicity,
            Box::new(ConstantClassifier(0.0)),
            Box::new(ConstantClassifier(0.0)),
            Box::new(ConstantClassifier(0.0)),
        ],
        ulm_model_with(ulm),
    )
}
