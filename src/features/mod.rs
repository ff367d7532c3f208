// Hand-crafted features fed to the classifiers next to the token sequence.
//
// Two ratios per text: how much of it is uppercase, and how many of its
// words are distinct. Both are standardized with the scaler fit at training
// time before they reach the model.

pub mod scaler;

/// Number of features per text.
pub const FEATURE_DIM: usize = 2;

/// Raw (unscaled) features for one text: `[caps_ratio, unique_word_ratio]`.
pub type FeatureVector = [f64; FEATURE_DIM];

/// Compute the raw feature vector for a single text.
///
/// Empty text (or text with no words) yields 0.0 for the affected ratio
/// instead of dividing by zero.
pub fn text_features(text: &str) -> FeatureVector {
    let length = text.chars().count();
    let capitals = text.chars().filter(|c| c.is_uppercase()).count();
    let caps_ratio = ratio(capitals, length);

    let num_words = text.split_whitespace().count();
    let lowered = text.to_lowercase();
    let unique_words: std::collections::HashSet<&str> = lowered.split_whitespace().collect();
    let unique_ratio = ratio(unique_words.len(), num_words);

    [caps_ratio, unique_ratio]
}

/// Compute raw features for every text, preserving order.
pub fn get_features<S: AsRef<str>>(texts: &[S]) -> Vec<FeatureVector> {
    texts.iter().map(|t| text_features(t.as_ref())).collect()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_lowercase_unique_words() {
        let f = text_features("foo bar baz fiz");
        assert_eq!(f, [0.0, 1.0]);
    }

    #[test]
    fn test_caps_ratio_counts_characters() {
        // 2 uppercase out of 4 characters (space included)
        let f = text_features("AB c");
        assert!((f[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unique_ratio_ignores_case() {
        // "Go" and "go" are the same word; 2 unique of 3
        let f = text_features("Go go stop");
        assert!((f[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(text_features(""), [0.0, 0.0]);
    }

    #[test]
    fn test_whitespace_only_text_has_zero_unique_ratio() {
        let f = text_features("   ");
        assert_eq!(f, [0.0, 0.0]);
    }

    #[test]
    fn test_features_are_idempotent() {
        let text = "You are SO wrong, so so wrong";
        assert_eq!(text_features(text), text_features(text));
    }

    #[test]
    fn test_get_features_preserves_order() {
        let fs = get_features(&["AAAA", "a a"]);
        assert_eq!(fs.len(), 2);
        assert_eq!(fs[0], [1.0, 1.0]);
        assert_eq!(fs[1], [0.0, 0.5]);
    }

    #[test]
    fn test_multibyte_characters_count_once() {
        // 1 uppercase of 2 characters, regardless of UTF-8 width
        let f = text_features("Éé");
        assert!((f[0] - 0.5).abs() < 1e-12);
    }
}
