//! Model loading and inference over ONNX Runtime
//!
//! A [`LoadedModel`] owns an ONNX Runtime session together with the input
//! geometry derived from the model's declared shape. Classification models in
//! the wild disagree on layout, so the loader accepts both channel-first
//! `[batch, 3, H, W]` and channel-last `[batch, H, W, channels]` rank-4
//! shapes and falls back to 28x28 for anything it cannot interpret.

use std::path::Path;

use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{TensorRef, ValueType};
use tracing::{debug, info};

use crate::error::ClassifierError;

/// Bytes per packed tensor element.
pub const FLOAT_BYTES: usize = std::mem::size_of::<f32>();

/// Color channels packed per pixel (RGB, no alpha).
pub const CHANNELS: usize = 3;

/// Input edge used when the declared shape cannot be interpreted.
pub const DEFAULT_INPUT_WIDTH: u32 = 28;
pub const DEFAULT_INPUT_HEIGHT: u32 = 28;

/// A classification model bound to an inference session.
pub struct LoadedModel {
    session: Session,
    input_width: u32,
    input_height: u32,
    input_bytes: usize,
}

impl LoadedModel {
    /// Load a model artifact and derive its input geometry.
    ///
    /// # Errors
    /// Returns [`ClassifierError::ModelNotFound`] if the file is missing and
    /// [`ClassifierError::ModelLoad`] if session construction fails. No
    /// partially built model is ever returned.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::ModelNotFound(path.display().to_string()));
        }

        info!("Loading model from {:?}", path);
        let session = Session::builder()
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?;

        let declared = declared_input_shape(&session);
        let (input_width, input_height) = derive_input_size(&declared);
        let input_bytes = FLOAT_BYTES * input_width as usize * input_height as usize * CHANNELS;
        debug!(
            "Model input shape {:?} -> {}x{} ({} input bytes)",
            declared, input_width, input_height, input_bytes
        );

        Ok(Self {
            session,
            input_width,
            input_height,
            input_bytes,
        })
    }

    #[must_use]
    pub fn input_width(&self) -> u32 {
        self.input_width
    }

    #[must_use]
    pub fn input_height(&self) -> u32 {
        self.input_height
    }

    /// Required packed input size in bytes: `4 * width * height * 3`.
    #[must_use]
    pub fn input_bytes(&self) -> usize {
        self.input_bytes
    }

    /// Run a single inference and return the flat output scores.
    ///
    /// # Errors
    /// Returns [`ClassifierError::Inference`] if the runtime call fails.
    pub fn run(&mut self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let input_tensor = TensorRef::from_array_view(input.view())
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let (_, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        Ok(scores.to_vec())
    }
}

/// Declared shape of the first input tensor, empty when unavailable.
fn declared_input_shape(session: &Session) -> Vec<i64> {
    session
        .inputs()
        .first()
        .and_then(|input| match input.dtype() {
            ValueType::Tensor { shape, .. } => Some(shape.as_ref().to_vec()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Interpret a declared input shape as (width, height).
///
/// Rank-4 shapes with a channel count of 3 in the second dimension are
/// treated as channel-first, all other rank-4 shapes as channel-last. Any
/// other rank, and dynamic (non-positive) extracted dimensions, fall back to
/// the 28x28 default.
fn derive_input_size(shape: &[i64]) -> (u32, u32) {
    let (width, height) = match shape {
        [_, 3, height, width] => (*width, *height),
        [_, height, width, _] => (*width, *height),
        _ => return (DEFAULT_INPUT_WIDTH, DEFAULT_INPUT_HEIGHT),
    };
    if width <= 0 || height <= 0 {
        return (DEFAULT_INPUT_WIDTH, DEFAULT_INPUT_HEIGHT);
    }
    (width as u32, height as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_first_shape() {
        assert_eq!(derive_input_size(&[1, 3, 224, 224]), (224, 224));
        assert_eq!(derive_input_size(&[1, 3, 240, 320]), (320, 240));
    }

    #[test]
    fn test_channel_last_shape() {
        assert_eq!(derive_input_size(&[1, 224, 224, 3]), (224, 224));
        assert_eq!(derive_input_size(&[1, 240, 320, 3]), (320, 240));
    }

    #[test]
    fn test_same_size_regardless_of_layout() {
        assert_eq!(
            derive_input_size(&[1, 3, 224, 224]),
            derive_input_size(&[1, 224, 224, 3])
        );
    }

    #[test]
    fn test_unsupported_rank_falls_back() {
        assert_eq!(derive_input_size(&[1, 10]), (28, 28));
        assert_eq!(derive_input_size(&[784]), (28, 28));
        assert_eq!(derive_input_size(&[]), (28, 28));
    }

    #[test]
    fn test_dynamic_dimensions_fall_back() {
        assert_eq!(derive_input_size(&[-1, 3, -1, -1]), (28, 28));
        assert_eq!(derive_input_size(&[1, -1, -1, 3]), (28, 28));
    }

    #[test]
    fn test_load_missing_model() {
        let result = LoadedModel::load("no_such_model.onnx");
        assert!(matches!(result, Err(ClassifierError::ModelNotFound(_))));
    }
}
