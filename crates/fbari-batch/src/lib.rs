//! Batch orchestration for the photo pipeline.
//!
//! This crate provides:
//! - The orchestrator: concurrent pipeline runs with per-item status
//! - ZIP packaging of batch results
//! - Orchestrator configuration from environment variables
//! - Structured job logging

pub mod archive;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;

pub use archive::{build_archive, entry_name};
pub use config::BatchConfig;
pub use error::{BatchError, BatchResult};
pub use logging::JobLogger;
pub use orchestrator::BatchOrchestrator;
