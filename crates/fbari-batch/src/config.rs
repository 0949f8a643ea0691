//! Orchestrator configuration.

use std::time::Duration;

/// Batch orchestrator configuration.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum pipeline runs in flight at once
    pub max_concurrent: usize,
    /// Lifetime of entries in the orchestrator's preview cache
    pub preview_ttl: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            preview_ttl: Duration::from_secs(3600),
        }
    }
}

impl BatchConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_concurrent: std::env::var("FBARI_MAX_CONCURRENT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(4),
            preview_ttl: Duration::from_secs(
                std::env::var("FBARI_PREVIEW_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
        }
    }
}
