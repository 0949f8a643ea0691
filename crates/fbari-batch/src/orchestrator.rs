//! Batch orchestrator.
//!
//! One submitted batch fans out into one task per photo, gated by a
//! semaphore so at most `max_concurrent` pipeline runs are in flight. The
//! CPU-bound pipeline runs inside `spawn_blocking`; item status lives in a
//! shared job map behind a `parking_lot::RwLock` so blocking workers can
//! report without an async context. Item failures are item-scoped: siblings
//! keep running and the job still completes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Semaphore;
use tracing::debug;

use fbari_imaging::{Pipeline, SubjectDetector};
use fbari_models::{BatchJob, BatchJobId, EditSettings, ItemStatus, JobStatusReport, PhotoRef};
use fbari_storage::{PreviewCache, StorageProvider};

use crate::archive;
use crate::config::BatchConfig;
use crate::error::{BatchError, BatchResult};
use crate::logging::JobLogger;

/// How often `wait_until_complete` polls.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

type JobMap = Arc<RwLock<HashMap<BatchJobId, BatchJob>>>;

/// Schedules pipeline runs for batches of photos.
pub struct BatchOrchestrator {
    storage: Arc<dyn StorageProvider>,
    detector: Option<Arc<dyn SubjectDetector>>,
    jobs: JobMap,
    semaphore: Arc<Semaphore>,
    previews: Arc<PreviewCache>,
}

impl BatchOrchestrator {
    pub fn new(config: BatchConfig, storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            storage,
            detector: None,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            previews: Arc::new(PreviewCache::new(config.preview_ttl)),
        }
    }

    /// Use a segmentation backend for background replacement.
    pub fn with_detector(mut self, detector: Arc<dyn SubjectDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// The cache of rendered (photo, settings) artifacts. Invalidate a
    /// photo here after its source bytes change.
    pub fn previews(&self) -> &PreviewCache {
        &self.previews
    }

    /// Create a batch job and start scheduling its items.
    ///
    /// Returns immediately; the item list is immutable after this point.
    pub async fn submit(&self, photos: Vec<PhotoRef>, settings: EditSettings) -> BatchJobId {
        let job = BatchJob::new(photos, settings.clamped());
        let job_id = job.id.clone();
        let total = job.total_count();
        let items: Vec<PhotoRef> = job.items.iter().map(|i| i.photo.clone()).collect();

        self.jobs.write().insert(job_id.clone(), job);

        let logger = JobLogger::new(&job_id, "batch_process");
        logger.log_start(&format!("{total} items"));

        for (index, photo) in items.into_iter().enumerate() {
            let jobs = Arc::clone(&self.jobs);
            let storage = Arc::clone(&self.storage);
            let detector = self.detector.clone();
            let semaphore = Arc::clone(&self.semaphore);
            let previews = Arc::clone(&self.previews);
            let settings = settings.clamped();
            let job_id = job_id.clone();
            let logger = logger.clone();

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };

                if is_cancelled(&jobs, &job_id) {
                    set_status(
                        &jobs,
                        &job_id,
                        index,
                        ItemStatus::Failed {
                            reason: "cancelled".to_string(),
                        },
                    );
                    return;
                }

                // Reuse an unexpired render of the same (photo, settings)
                if let Some(artifact) = previews.get(&photo.photo_id, &settings) {
                    logger.log_item(index, &photo.photo_id, "reused cached render");
                    set_status(&jobs, &job_id, index, ItemStatus::Succeeded { artifact });
                    return;
                }

                set_status(&jobs, &job_id, index, ItemStatus::Running);
                logger.log_item(index, &photo.photo_id, "processing");

                let photo_id = photo.photo_id.clone();
                let cache_settings = settings.clone();
                // One blocking worker per in-flight run
                let outcome = tokio::task::spawn_blocking(move || {
                    run_item(&*storage, detector.as_deref(), &photo, &settings, index as u64)
                })
                .await;

                let status = match outcome {
                    Ok(Ok(artifact)) => {
                        logger.log_item(index, &photo_id, "succeeded");
                        previews.set(&photo_id, &cache_settings, artifact.clone());
                        ItemStatus::Succeeded { artifact }
                    }
                    Ok(Err(e)) => {
                        logger.log_item_error(index, &photo_id, &e.to_string());
                        ItemStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                    Err(e) => {
                        logger.log_item_error(index, &photo_id, &format!("worker panicked: {e}"));
                        ItemStatus::Failed {
                            reason: format!("worker panicked: {e}"),
                        }
                    }
                };
                set_status(&jobs, &job_id, index, status);
            });
        }

        job_id
    }

    /// Atomic status snapshot.
    pub fn status(&self, job_id: &BatchJobId) -> BatchResult<JobStatusReport> {
        let jobs = self.jobs.read();
        let job = jobs.get(job_id).ok_or_else(|| BatchError::job_not_found(job_id))?;
        Ok(job.status_report())
    }

    /// Full job snapshot, including per-item statuses.
    pub fn job(&self, job_id: &BatchJobId) -> BatchResult<BatchJob> {
        let jobs = self.jobs.read();
        jobs.get(job_id)
            .cloned()
            .ok_or_else(|| BatchError::job_not_found(job_id))
    }

    /// Stop scheduling remaining pending items. Items already running finish
    /// normally; pending items terminate as failed with reason "cancelled".
    pub fn cancel(&self, job_id: &BatchJobId) -> BatchResult<()> {
        let mut jobs = self.jobs.write();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| BatchError::job_not_found(job_id))?;
        job.cancelled = true;
        debug!(job_id = %job_id, "job cancelled");
        Ok(())
    }

    /// ZIP every successfully produced artifact. Failed and pending items
    /// are skipped silently.
    pub fn package_results(&self, job_id: &BatchJobId) -> BatchResult<Vec<u8>> {
        let job = self.job(job_id)?;
        let format = job.settings.output_format;

        let mut entries = Vec::new();
        for item in &job.items {
            if let ItemStatus::Succeeded { artifact } = &item.status {
                let bytes = self.storage.load(artifact)?;
                entries.push((archive::entry_name(&item.photo, format), bytes));
            }
        }

        archive::build_archive(entries.iter().map(|(name, bytes)| (name.clone(), bytes.as_slice())))
    }

    /// Poll until the job completes or the timeout elapses.
    pub async fn wait_until_complete(
        &self,
        job_id: &BatchJobId,
        timeout: Duration,
    ) -> BatchResult<JobStatusReport> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let report = self.status(job_id)?;
            if report.completed_count == report.total_count {
                return Ok(report);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BatchError::Timeout {
                    job_id: job_id.clone(),
                    waited_secs: timeout.as_secs(),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Load, run and store one item. Runs on a blocking worker thread.
fn run_item(
    storage: &dyn StorageProvider,
    detector: Option<&dyn SubjectDetector>,
    photo: &PhotoRef,
    settings: &EditSettings,
    seed: u64,
) -> BatchResult<String> {
    let bytes = storage.load(&photo.source_path)?;
    let pipeline = Pipeline::from_bytes(&bytes)?;
    let result = pipeline.run(settings, detector, seed)?;

    let name = format!(
        "processed/{}_processed.{}",
        photo.base_name(),
        settings.output_format.extension()
    );
    let key = storage.store(&result.encoded, &name)?;
    Ok(key)
}

fn is_cancelled(jobs: &JobMap, job_id: &BatchJobId) -> bool {
    jobs.read().get(job_id).map(|j| j.cancelled).unwrap_or(true)
}

fn set_status(jobs: &JobMap, job_id: &BatchJobId, index: usize, status: ItemStatus) {
    if let Some(job) = jobs.write().get_mut(job_id) {
        job.set_item_status(index, status);
    }
}
