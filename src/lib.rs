// youtoxic: toxicity classification for short texts
//
// This is the library root. Each module corresponds to a stage of the
// classification pipeline or one of its outer surfaces.

pub mod artifacts;
pub mod classify;
pub mod config;
pub mod features;
pub mod output;
pub mod status;
pub mod text;

#[cfg(feature = "web")]
pub mod web;
