// Classification: categories, the model seam, ONNX backends, and the
// Pipeline that ties sequences + features + models into labelled scores.
//
// SequenceClassifier / LanguageModelClassifier are the swap points: the
// ONNX implementations run the exported models, tests plug in fakes.

pub mod category;
pub mod onnx;
pub mod pipeline;
pub mod traits;
pub mod ulm;

pub use category::{BatchPrediction, Category, Prediction};
pub use pipeline::Pipeline;
