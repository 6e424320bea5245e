//! Error types for the classification pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Classifier is not initialized")]
    Uninitialized,

    #[error("Classifier has been closed")]
    Closed,

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Worker task failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
