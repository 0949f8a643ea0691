//! Preview cache with version-counter invalidation.
//!
//! Keys fingerprint the photo plus its full settings, so any settings change
//! is automatically a different key. Editing the photo itself goes through
//! [`PreviewCache::invalidate`], which bumps a per-photo version counter;
//! entries written under an older version stay physically present but can
//! never be returned again.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::debug;

use fbari_models::EditSettings;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Stable fingerprint of one (photo, settings) render.
///
/// Settings are canonicalized with JSON fields sorted by name, so two
/// serializations that differ only in field order produce the same key.
pub fn cache_key(photo_id: &str, settings: &EditSettings) -> String {
    let canonical = serde_json::to_value(settings)
        .map(|v| canonical_json(&v))
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(photo_id.as_bytes());
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Render a JSON value with object keys sorted recursively.
fn canonical_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", k, canonical_json(&map[k])))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        serde_json::Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", rendered.join(","))
        }
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
struct Entry {
    artifact: String,
    version: u64,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    versions: HashMap<String, u64>,
}

/// In-process preview cache.
///
/// Values are artifact references (storage keys), not pixel data.
#[derive(Debug)]
pub struct PreviewCache {
    inner: RwLock<Inner>,
    ttl: Duration,
}

impl Default for PreviewCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl PreviewCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            ttl,
        }
    }

    /// Look up a rendered preview. Hits only when the entry exists, its TTL
    /// has not expired, and it was stored under the photo's current version.
    pub fn get(&self, photo_id: &str, settings: &EditSettings) -> Option<String> {
        let key = cache_key(photo_id, settings);
        let inner = self.inner.read();
        let entry = inner.entries.get(&key)?;
        let current = inner.versions.get(photo_id).copied().unwrap_or(0);
        if entry.version != current {
            debug!(photo_id, "preview cache miss (stale version)");
            return None;
        }
        if entry.stored_at.elapsed() >= self.ttl {
            debug!(photo_id, "preview cache miss (expired)");
            return None;
        }
        Some(entry.artifact.clone())
    }

    /// Record a rendered preview under the photo's current version.
    pub fn set(&self, photo_id: &str, settings: &EditSettings, artifact: impl Into<String>) {
        let key = cache_key(photo_id, settings);
        let mut inner = self.inner.write();
        let version = inner.versions.get(photo_id).copied().unwrap_or(0);
        inner.entries.insert(
            key,
            Entry {
                artifact: artifact.into(),
                version,
                stored_at: Instant::now(),
            },
        );
    }

    /// Invalidate every cached preview of a photo by bumping its version
    /// counter. The only invalidation mechanism; nothing is deleted.
    pub fn invalidate(&self, photo_id: &str) {
        let mut inner = self.inner.write();
        *inner.versions.entry(photo_id.to_string()).or_insert(0) += 1;
        debug!(photo_id, "preview cache invalidated");
    }

    /// Number of physically present entries, stale ones included.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_round_trips() {
        let cache = PreviewCache::default();
        let settings = EditSettings::default();
        assert_eq!(cache.get("p1", &settings), None);
        cache.set("p1", &settings, "previews/p1.jpg");
        assert_eq!(cache.get("p1", &settings).as_deref(), Some("previews/p1.jpg"));
    }

    #[test]
    fn test_different_settings_are_different_keys() {
        let a = EditSettings::default();
        let b = EditSettings {
            brightness: 10,
            ..Default::default()
        };
        assert_ne!(cache_key("p1", &a), cache_key("p1", &b));
        assert_ne!(cache_key("p1", &a), cache_key("p2", &a));
    }

    #[test]
    fn test_canonicalization_is_field_order_independent() {
        // Same settings spelled with different wire field order
        let a: EditSettings =
            serde_json::from_str(r#"{"brightness": 5, "contrast": -3}"#).unwrap();
        let b: EditSettings =
            serde_json::from_str(r#"{"contrast": -3, "brightness": 5}"#).unwrap();
        assert_eq!(cache_key("p1", &a), cache_key("p1", &b));
    }

    #[test]
    fn test_invalidate_makes_entry_unreachable_but_present() {
        let cache = PreviewCache::default();
        let settings = EditSettings::default();
        cache.set("p1", &settings, "v1.jpg");
        cache.invalidate("p1");
        assert_eq!(cache.get("p1", &settings), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_set_after_invalidate_hits_again() {
        let cache = PreviewCache::default();
        let settings = EditSettings::default();
        cache.set("p1", &settings, "v1.jpg");
        cache.invalidate("p1");
        cache.set("p1", &settings, "v2.jpg");
        assert_eq!(cache.get("p1", &settings).as_deref(), Some("v2.jpg"));
    }

    #[test]
    fn test_invalidation_is_per_photo() {
        let cache = PreviewCache::default();
        let settings = EditSettings::default();
        cache.set("p1", &settings, "a.jpg");
        cache.set("p2", &settings, "b.jpg");
        cache.invalidate("p1");
        assert_eq!(cache.get("p1", &settings), None);
        assert_eq!(cache.get("p2", &settings).as_deref(), Some("b.jpg"));
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let cache = PreviewCache::new(Duration::ZERO);
        let settings = EditSettings::default();
        cache.set("p1", &settings, "a.jpg");
        assert_eq!(cache.get("p1", &settings), None);
    }
}
