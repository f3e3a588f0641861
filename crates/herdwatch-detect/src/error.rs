//! Error types for the detection pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for detection operations.
pub type DetectResult<T> = Result<T, DetectError>;

/// Errors that can occur while counting cows in an image.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Empty image payload")]
    EmptyInput,

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DetectError {
    /// Create an inference failure error.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for failures the client caused (bad or missing image bytes).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::Decode(_))
    }
}
