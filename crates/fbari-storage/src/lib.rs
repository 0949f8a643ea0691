//! Artifact storage and the preview cache.
//!
//! This crate provides:
//! - The `StorageProvider` trait and the filesystem `LocalStorage` impl
//! - The in-process preview cache with version-counter invalidation

pub mod error;
pub mod preview_cache;
pub mod provider;

pub use error::{StorageError, StorageResult};
pub use preview_cache::{cache_key, PreviewCache, DEFAULT_TTL};
pub use provider::{LocalStorage, StorageProvider};
