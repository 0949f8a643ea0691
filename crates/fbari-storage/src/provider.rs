//! Artifact storage behind a provider trait.
//!
//! The orchestrator only ever talks to [`StorageProvider`]; [`LocalStorage`]
//! is the filesystem implementation used by default and in tests. A remote
//! object store slots in behind the same trait.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Where processed artifacts live.
pub trait StorageProvider: Send + Sync {
    /// Persist bytes under a logical name; returns the stored key.
    fn store(&self, bytes: &[u8], logical_name: &str) -> StorageResult<String>;

    /// Load a previously stored artifact.
    fn load(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// A URL clients can fetch the artifact from.
    fn url_for(&self, key: &str) -> String;
}

/// Filesystem-backed storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject names that would escape the storage root.
    fn validated(&self, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty()
            || name.contains("..")
            || name.starts_with('/')
            || name.contains('\\')
        {
            return Err(StorageError::invalid_key(name));
        }
        Ok(self.root.join(name))
    }
}

impl StorageProvider for LocalStorage {
    fn store(&self, bytes: &[u8], logical_name: &str) -> StorageResult<String> {
        let path = self.validated(logical_name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)
            .map_err(|e| StorageError::write_failed(format!("{logical_name}: {e}")))?;
        debug!(key = logical_name, size = bytes.len(), "stored artifact");
        Ok(logical_name.to_string())
    }

    fn load(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.validated(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(key))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("file://{}", self.root.join(key).display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let key = storage.store(b"hello", "photos/a_processed.jpg").unwrap();
        assert_eq!(key, "photos/a_processed.jpg");
        assert_eq!(storage.load(&key).unwrap(), b"hello");
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let err = storage.load("nope.jpg").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_traversal_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        for bad in ["../escape.jpg", "/absolute.jpg", "a\\b.jpg", ""] {
            let err = storage.store(b"x", bad).unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "name {bad:?}");
        }
    }

    #[test]
    fn test_url_for_points_into_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let url = storage.url_for("x.png");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("x.png"));
    }
}
