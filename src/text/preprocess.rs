// Tweet cleanup applied before classification.
//
// Mentions and links carry no signal for the models and were absent from
// the training data, so any word containing `@` or `http` is dropped.

/// Remove mentions and links from a single text, normalizing whitespace.
pub fn preprocess_text(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !word.contains('@') && !word.contains("http"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply [`preprocess_text`] to every text, preserving order.
pub fn preprocess_texts<S: AsRef<str>>(texts: &[S]) -> Vec<String> {
    texts.iter().map(|t| preprocess_text(t.as_ref())).collect()
}
