//! Still-image classification over ONNX Runtime
//!
//! This crate loads a classification model from an assets directory, packs a
//! decoded RGB image into the tensor layout the model declares, runs a single
//! inference, and ranks the raw scores into the top-3 labels with confidence
//! percentages and the elapsed inference time.
//!
//! # Features
//! - Input-shape adaptation: channel-first and channel-last rank-4 models,
//!   with a 28x28 fallback for uninterpretable shapes
//! - Raw-byte tensor packing (0-255 floats, no normalization)
//! - Newline-delimited label tables with a synthetic `Class_{i}` fallback
//! - Asynchronous facade with an explicit ready/closed state machine
//!
//! # Example
//! ```no_run
//! use image_classification::ImageClassifier;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = ImageClassifier::new("assets");
//! classifier.load_model_from_assets("mobilenet_v2.onnx").await?;
//!
//! let img = image::open("photo.jpg")?.to_rgb8();
//! let result = classifier.classify(img).await?;
//! print!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod labels;
pub mod model;
pub mod rank;
pub mod service;
pub mod tensor;

pub use error::ClassifierError;
pub use labels::LabelTable;
pub use model::LoadedModel;
pub use rank::{rank, Classification, RankedLabel, TOP_K};
pub use service::ImageClassifier;
