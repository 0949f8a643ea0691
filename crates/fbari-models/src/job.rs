//! Batch job definitions and per-item processing status.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::settings::EditSettings;

/// Unique identifier for a batch job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BatchJobId(pub String);

impl BatchJobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BatchJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to one source photo in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PhotoRef {
    /// Stable photo identity (also the preview-cache identity)
    pub photo_id: String,
    /// Storage path of the original bytes
    pub source_path: String,
    /// Original filename, used to derive archive entry names
    pub file_name: String,
}

impl PhotoRef {
    pub fn new(
        photo_id: impl Into<String>,
        source_path: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            photo_id: photo_id.into(),
            source_path: source_path.into(),
            file_name: file_name.into(),
        }
    }

    /// Filename stem without the final extension.
    pub fn base_name(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((base, _ext)) if !base.is_empty() => base,
            _ => &self.file_name,
        }
    }
}

/// Processing status of one batch item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ItemStatus {
    /// Waiting to be scheduled
    Pending,
    /// A worker is processing this item
    Running,
    /// Pipeline produced an artifact
    Succeeded {
        /// Storage path of the produced artifact
        artifact: String,
    },
    /// Pipeline failed; reason is reported, never retried here
    Failed { reason: String },
}

impl ItemStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Succeeded { .. } | ItemStatus::Failed { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Running => "running",
            ItemStatus::Succeeded { .. } => "succeeded",
            ItemStatus::Failed { .. } => "failed",
        }
    }
}

/// One photo plus its processing status inside a batch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchItem {
    pub photo: PhotoRef,
    pub status: ItemStatus,
}

/// Aggregate job state derived from item statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// At least one item has not reached a terminal status
    Running,
    /// Every item is terminal, regardless of how many failed
    Completed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Running => "running",
            JobState::Completed => "completed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot returned to status pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobStatusReport {
    pub state: JobState,
    pub completed_count: usize,
    pub total_count: usize,
}

/// A batch of pipeline runs sharing one settings set.
///
/// The item list is fixed at creation; only item statuses (and the
/// bookkeeping timestamps) mutate afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchJob {
    pub id: BatchJobId,
    /// Settings applied to every item
    pub settings: EditSettings,
    /// Ordered items; immutable in length and order after creation
    pub items: Vec<BatchItem>,
    /// When set, remaining pending items are not scheduled
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchJob {
    /// Create a new job with every item pending.
    pub fn new(photos: Vec<PhotoRef>, settings: EditSettings) -> Self {
        let now = Utc::now();
        Self {
            id: BatchJobId::new(),
            settings,
            items: photos
                .into_iter()
                .map(|photo| BatchItem {
                    photo,
                    status: ItemStatus::Pending,
                })
                .collect(),
            cancelled: false,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    /// Items with a terminal status (succeeded or failed).
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.status.is_terminal()).count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ItemStatus::Succeeded { .. }))
            .count()
    }

    pub fn state(&self) -> JobState {
        if self.completed_count() == self.total_count() {
            JobState::Completed
        } else {
            JobState::Running
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state() == JobState::Completed
    }

    /// Aggregate progress in percent.
    pub fn progress_percent(&self) -> u8 {
        if self.items.is_empty() {
            return 100;
        }
        (self.completed_count() * 100 / self.total_count()) as u8
    }

    /// Record a status transition for one item.
    pub fn set_item_status(&mut self, index: usize, status: ItemStatus) {
        if let Some(item) = self.items.get_mut(index) {
            item.status = status;
            self.updated_at = Utc::now();
            if self.is_terminal() && self.completed_at.is_none() {
                self.completed_at = Some(self.updated_at);
            }
        }
    }

    pub fn status_report(&self) -> JobStatusReport {
        JobStatusReport {
            state: self.state(),
            completed_count: self.completed_count(),
            total_count: self.total_count(),
        }
    }
}
