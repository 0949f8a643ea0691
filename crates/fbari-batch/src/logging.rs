//! Structured job logging utilities.
//!
//! Provides consistent, structured logging for batch processing with
//! contextual information (job ID, operation, item).

use tracing::{error, info, warn};

use fbari_models::BatchJobId;

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: String,
}

impl JobLogger {
    /// Create a new job logger for a specific job and operation.
    pub fn new(job_id: &BatchJobId, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Log the start of a job operation.
    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    /// Log a progress update for one item.
    pub fn log_item(&self, item_index: usize, photo_id: &str, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            item_index,
            photo_id,
            "Item: {}", message
        );
    }

    /// Log a warning during job execution.
    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job warning: {}", message
        );
    }

    /// Log an item failure. Failures are item-scoped and reported, never
    /// retried here.
    pub fn log_item_error(&self, item_index: usize, photo_id: &str, message: &str) {
        error!(
            job_id = %self.job_id,
            operation = %self.operation,
            item_index,
            photo_id,
            "Item failed: {}", message
        );
    }

    /// Log the completion of a job operation.
    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }
}
