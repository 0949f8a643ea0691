//! Batch orchestration error types.

use thiserror::Error;

use fbari_models::BatchJobId;

/// Result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

/// Errors that can occur while orchestrating a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Job not found: {0}")]
    JobNotFound(BatchJobId),

    #[error("Storage error: {0}")]
    Storage(#[from] fbari_storage::StorageError),

    #[error("Imaging error: {0}")]
    Imaging(#[from] fbari_imaging::ImagingError),

    #[error("Archive failed: {0}")]
    Archive(String),

    #[error("Timed out waiting for job {job_id} after {waited_secs}s")]
    Timeout { job_id: BatchJobId, waited_secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchError {
    pub fn job_not_found(id: &BatchJobId) -> Self {
        Self::JobNotFound(id.clone())
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }
}
