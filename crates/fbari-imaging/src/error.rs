//! Error types for imaging operations.

use thiserror::Error;

/// Result type for imaging operations.
pub type ImagingResult<T> = Result<T, ImagingError>;

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Transform stage '{stage}' failed: {message}")]
    Transform { stage: String, message: String },

    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImagingError {
    /// Create a decode failure error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a transform failure error carrying the failed stage name.
    pub fn transform(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a capability unavailable error.
    pub fn capability_unavailable(message: impl Into<String>) -> Self {
        Self::CapabilityUnavailable(message.into())
    }

    /// Whether this failure came from a missing external capability.
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, ImagingError::CapabilityUnavailable(_))
    }
}
