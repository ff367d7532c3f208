// Text handling: everything that turns raw input into model-ready ids.
//
// preprocess: tweet cleanup (mentions, links) before classification.
// sequencer: fixed-length id sequences for the four classifiers.
// ulm_tokenizer: word-level segmentation for the ULM toxicity model.

pub mod preprocess;
pub mod sequencer;
pub mod ulm_tokenizer;
