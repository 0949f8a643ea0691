#![deny(unreachable_patterns)]
//! Photo enhancement pipeline.
//!
//! This crate provides:
//! - The ordered edit pipeline (enhance, grade, filter, background, encode)
//! - LUT-based color grading with a fixed catalog of named grades
//! - The stylistic filter catalog
//! - Procedural background generation and mask compositing
//! - The subject-detection capability seam with a contour fallback

pub mod background;
pub mod detection;
pub mod engine;
pub mod error;
pub mod filters;
pub mod grading;

mod ops;

pub use background::{composite, generate, refine_edges};
pub use detection::{ContourDetector, SubjectDetector};
pub use engine::{
    detect_subjects, encode, encode_named, enhance, remove_background, replace_background, save,
    AppliedOp, Pipeline, PipelineResult,
};
pub use error::{ImagingError, ImagingResult};
pub use filters::{apply_filter, apply_filter_with, FilterParams};
pub use grading::{apply_lut, apply_subject_grading, lut_for, Lut};
