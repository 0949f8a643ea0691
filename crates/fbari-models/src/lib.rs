//! Shared data models for the Framebari processing core.
//!
//! This crate provides Serde-serializable types for:
//! - Edit settings (the wire schema sent by clients)
//! - Output formats, background styles, color grades and filter names
//! - Detected subjects (bounding boxes and masks)
//! - Batch jobs and per-item processing status

pub mod job;
pub mod settings;
pub mod style;
pub mod subject;

// Re-export common types
pub use job::{BatchItem, BatchJob, BatchJobId, ItemStatus, JobState, JobStatusReport, PhotoRef};
pub use settings::{parse_hex_color, EditSettings, OutputFormat};
pub use style::{BackgroundStyle, FilterKind, GradeName};
pub use subject::{BoundingBox, Subject, SubjectKind, SubjectMask};
