// Word-level tokenizer and vocabulary for the ULM toxicity model.
//
// The ULM classifier was fine-tuned on text run through a rule-based
// tokenizer: a handful of string rewrites (HTML leftovers, character and
// word repetition markers, spacing), word segmentation with punctuation and
// English contractions split off, then case markers (`xxup`, `xxmaj`) in
// front of lowercased tokens. Token strings are mapped to ids through the
// `itos` list saved at training time; anything unseen becomes `xxunk` (0).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use regex_lite::Regex;
use tracing::debug;

pub const TK_UNK: &str = "xxunk";
pub const TK_REP: &str = "xxrep";
pub const TK_WREP: &str = "xxwrep";
pub const TK_UP: &str = "xxup";
pub const TK_MAJ: &str = "xxmaj";

/// Id that unknown tokens map to.
pub const UNK_ID: i64 = 0;

/// Minimum run length that gets collapsed into a repetition marker.
const MIN_REPEAT: usize = 4;

const CONTRACTION_SUFFIXES: [&str; 7] = ["n't", "'s", "'re", "'ve", "'ll", "'m", "'d"];

/// Rule-based word tokenizer. Construction compiles the spacing regexes once.
pub struct UlmTokenizer {
    extra_spaces: Regex,
    special_chars: Regex,
}

impl Default for UlmTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl UlmTokenizer {
    pub fn new() -> Self {
        Self {
            extra_spaces: Regex::new(r" {2,}").expect("valid regex"),
            special_chars: Regex::new(r"([/#\n])").expect("valid regex"),
        }
    }

    /// Split a text into the token strings the ULM vocabulary was built from.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = self.fix_html(text);
        let text = replace_char_repeats(&text);
        let text = replace_word_repeats(&text);
        let text = self.special_chars.replace_all(&text, " $1 ");
        let text = self.extra_spaces.replace_all(&text, " ");

        let mut words = Vec::new();
        for chunk in text.split(' ') {
            if chunk.is_empty() {
                continue;
            }
            if chunk == "\n" {
                words.push(chunk.to_string());
                continue;
            }
            segment_word(chunk.trim(), &mut words);
        }

        apply_case_markers(words)
    }

    fn fix_html(&self, text: &str) -> String {
        let fixed = text
            .replace("#39;", "'")
            .replace("amp;", "&")
            .replace("#146;", "'")
            .replace("nbsp;", " ")
            .replace("#36;", "$")
            .replace("\\n", "\n")
            .replace("quot;", "'")
            .replace("<br />", "\n")
            .replace("\\\"", "\"")
            .replace("<unk>", TK_UNK)
            .replace(" @.@ ", ".")
            .replace(" @-@ ", "-")
            .replace(" @,@ ", ",")
            .replace('\\', " \\ ");
        self.extra_spaces.replace_all(&fixed, " ").into_owned()
    }
}

/// `cccccc` -> ` xxrep 6 c ` for any non-space character repeated
/// MIN_REPEAT or more times.
fn replace_char_repeats(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }
        if !c.is_whitespace() && run >= MIN_REPEAT {
            out.push_str(&format!(" {TK_REP} {run} {c} "));
        } else {
            for _ in 0..run {
                out.push(c);
            }
        }
        i += run;
    }
    out
}

/// `w w w w` -> ` xxwrep 4 w ` for any word repeated MIN_REPEAT or more
/// times in a row.
fn replace_word_repeats(text: &str) -> String {
    let words: Vec<&str> = text.split(' ').filter(|w| !w.is_empty()).collect();
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let w = words[i];
        let mut run = 1;
        while i + run < words.len() && words[i + run] == w {
            run += 1;
        }
        let is_word = w.chars().all(|c| c.is_alphanumeric() || c == '_');
        if is_word && run >= MIN_REPEAT {
            out.push(format!("{TK_WREP} {run} {w}"));
        } else {
            out.extend(std::iter::repeat(w.to_string()).take(run));
        }
        i += run;
    }
    out.join(" ")
}

/// Split leading/trailing punctuation and contraction suffixes off a
/// whitespace-free chunk.
fn segment_word(chunk: &str, out: &mut Vec<String>) {
    let chars: Vec<char> = chunk.chars().collect();
    let mut start = 0;
    let mut end = chars.len();

    while start < end && is_split_punct(chars[start]) {
        out.push(chars[start].to_string());
        start += 1;
    }

    let mut suffixes = Vec::new();
    while end > start && is_split_punct(chars[end - 1]) {
        suffixes.push(chars[end - 1].to_string());
        end -= 1;
    }

    if start < end {
        let core: String = chars[start..end].iter().collect();
        split_contraction(&core, out);
    }

    out.extend(suffixes.into_iter().rev());
}

fn split_contraction(word: &str, out: &mut Vec<String>) {
    let lower = word.to_lowercase();
    for suffix in CONTRACTION_SUFFIXES {
        if lower.len() > suffix.len() && lower.ends_with(suffix) {
            // Suffixes are ASCII, so the byte split stays on a char boundary.
            let cut = word.len() - suffix.len();
            if word.is_char_boundary(cut) {
                out.push(word[..cut].to_string());
                out.push(word[cut..].to_string());
                return;
            }
        }
    }
    out.push(word.to_string());
}

fn is_split_punct(c: char) -> bool {
    !c.is_alphanumeric() && c != '_'
}

fn is_all_caps(token: &str) -> bool {
    token.chars().any(|c| c.is_alphabetic()) && !token.chars().any(|c| c.is_lowercase())
}

fn is_capitalized(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let rest: String = chars.collect();
            rest.chars().any(|c| c.is_alphabetic()) && !rest.chars().any(|c| c.is_uppercase())
        }
        _ => false,
    }
}

/// Prefix case markers and lowercase every token.
fn apply_case_markers(words: Vec<String>) -> Vec<String> {
    let mut tokens = Vec::with_capacity(words.len());
    for word in words {
        if word.chars().count() > 1 && is_all_caps(&word) {
            tokens.push(TK_UP.to_string());
        } else if word.chars().count() > 1 && is_capitalized(&word) {
            tokens.push(TK_MAJ.to_string());
        }
        tokens.push(word.to_lowercase());
    }
    tokens
}

/// Token string to id mapping saved alongside the ULM model.
pub struct UlmVocab {
    stoi: HashMap<String, i64>,
}

impl UlmVocab {
    /// Load the `itos` list from a JSON array of token strings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Vocabulary mapping not found: {}\nRun `youtoxic assemble-artifacts` or check YOUTOXIC_ARTIFACT_DIR.",
                path.display()
            );
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let itos: Vec<String> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse vocabulary mapping {}", path.display()))?;

        debug!(size = itos.len(), "Loaded ULM vocabulary from {}", path.display());
        Ok(Self::from_itos(itos))
    }

    pub fn from_itos(itos: Vec<String>) -> Self {
        let stoi = itos
            .into_iter()
            .enumerate()
            .map(|(i, s)| (s, i as i64))
            .collect();
        Self { stoi }
    }

    pub fn len(&self) -> usize {
        self.stoi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stoi.is_empty()
    }

    /// Map tokens to ids. An empty token list encodes as a lone `xxunk`
    /// so the model always sees at least one step.
    pub fn encode(&self, tokens: &[String]) -> Vec<i64> {
        if tokens.is_empty() {
            return vec![UNK_ID];
        }
        tokens
            .iter()
            .map(|t| self.stoi.get(t).copied().unwrap_or(UNK_ID))
            .collect()
    }
}
