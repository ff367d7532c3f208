// Fixed-length id sequences for the four sequence classifiers.
//
// The training vocabulary was built with a Keras tokenizer and exported as a
// Hugging Face WordLevel tokenizer.json. Keras lowercases, replaces each of
// its filter characters with a space and splits on spaces, so the export
// uses a Sequence normalizer of Lowercase plus a Regex Replace over
//   !"#$%&()*+,-./:;<=>?@[\]^_`{|}~ tab newline
// followed by a WhitespaceSplit pre-tokenizer, with the OOV token as
// unk_token. Apostrophes are not filtered: "don't" is one vocabulary entry.
// Sequences are then pre-padded with 0 and pre-truncated to SEQUENCE_LEN,
// matching the `pad_sequences` defaults the models were trained with.

use std::path::Path;

use anyhow::{Context, Result};
use tokenizers::Tokenizer;
use tracing::debug;

/// Length every sequence is padded or truncated to.
pub const SEQUENCE_LEN: usize = 70;

/// Id used for padding positions.
pub const PAD_ID: i64 = 0;

/// Vocabulary lookup plus padding. Read-only after construction.
pub struct Sequencer {
    tokenizer: Tokenizer,
    max_len: usize,
}

impl Sequencer {
    /// Load the exported vocabulary from a tokenizer.json file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Tokenizer file not found: {}\nRun `youtoxic assemble-artifacts` or check YOUTOXIC_ARTIFACT_DIR.",
                path.display()
            );
        }

        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer {}: {}", path.display(), e))?;

        debug!("Loaded sequence tokenizer from {}", path.display());
        Self::from_tokenizer(tokenizer)
    }

    /// Build a sequencer from an in-memory tokenizer.json document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let tokenizer = Tokenizer::from_bytes(bytes)
            .map_err(|e| anyhow::anyhow!("Failed to parse tokenizer: {}", e))?;
        Self::from_tokenizer(tokenizer)
    }

    fn from_tokenizer(mut tokenizer: Tokenizer) -> Result<Self> {
        // Padding and truncation are applied by pad_sequence, not the tokenizer.
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(None)
            .map_err(|e| anyhow::anyhow!("Failed to disable tokenizer truncation: {}", e))?;

        Ok(Self {
            tokenizer,
            max_len: SEQUENCE_LEN,
        })
    }

    /// Length of the sequences this sequencer produces.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Raw (unpadded) vocabulary ids for each text.
    pub fn texts_to_sequences<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>> {
        texts
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(t.as_ref(), false)
                    .map(|enc| enc.get_ids().to_vec())
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect()
    }

    /// Tokenize and pad every text, returning a flat row-major
    /// `[texts.len(), max_len]` buffer ready for the model input tensor.
    pub fn encode_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<i64>> {
        let sequences = self
            .texts_to_sequences(texts)
            .context("Failed to convert texts to sequences")?;

        let mut flat = Vec::with_capacity(sequences.len() * self.max_len);
        for seq in &sequences {
            flat.extend(pad_sequence(seq, self.max_len));
        }
        Ok(flat)
    }
}

/// Pad or truncate one sequence to exactly `max_len` ids.
///
/// Short sequences get PAD_ID prepended; long ones keep their last
/// `max_len` ids.
pub fn pad_sequence(ids: &[u32], max_len: usize) -> Vec<i64> {
    let kept = &ids[ids.len().saturating_sub(max_len)..];
    let mut padded = Vec::with_capacity(max_len);
    padded.resize(max_len - kept.len(), PAD_ID);
    padded.extend(kept.iter().map(|&id| id as i64));
    padded
}
