//! Job persistence: store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::{JobStatus, PodcastJob};
use crate::error::{PodforgeError, Result};
use crate::script::PodcastScript;

/// Partial update applied to a job record. `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub script: Option<PodcastScript>,
    pub audio_url: Option<String>,
    pub duration_seconds: Option<u64>,
    pub error: Option<String>,
    /// Drop a stale error message, e.g. when a failed job is retried.
    pub clear_error: bool,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_script(mut self, script: PodcastScript) -> Self {
        self.script = Some(script);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Persistence boundary for podcast jobs.
///
/// `try_begin_audio` is the atomic concurrency guard: the check that no
/// audio stage is in flight and the transition into `generating_audio`
/// happen under one lock.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: PodcastJob) -> Result<PodcastJob>;

    /// Fetch a job, scoped to its owner.
    async fn get(&self, id: &str, user_id: &str) -> Result<PodcastJob>;

    /// Apply a partial update. Progress only moves forward unless the
    /// status changes with it.
    async fn update(&self, id: &str, patch: JobPatch) -> Result<PodcastJob>;

    /// Compare-and-set into `generating_audio`. Fails with a conflict,
    /// mutating nothing, when the job is already generating or stitching.
    async fn try_begin_audio(&self, id: &str, progress: u8) -> Result<PodcastJob>;

    async fn delete(&self, id: &str, user_id: &str) -> Result<()>;

    /// Jobs for one owner, newest first, optionally filtered by status.
    async fn list_by_owner(
        &self,
        user_id: &str,
        status: Option<JobStatus>,
    ) -> Result<Vec<PodcastJob>>;
}

/// In-memory job store backed by a `RwLock<HashMap>`.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Arc<RwLock<HashMap<String, PodcastJob>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_patch(job: &mut PodcastJob, patch: JobPatch) {
    let status_changes = patch.status.is_some_and(|s| s != job.status);

    if let Some(status) = patch.status {
        job.status = status;
    }
    if let Some(progress) = patch.progress {
        // Within a stage progress only moves forward; a status change
        // starts a new stage and may reset it.
        job.progress = if status_changes {
            progress.min(100)
        } else {
            job.progress.max(progress.min(100))
        };
    }
    if let Some(script) = patch.script {
        job.script = Some(script);
    }
    if let Some(audio_url) = patch.audio_url {
        job.audio_url = Some(audio_url);
    }
    if let Some(duration) = patch.duration_seconds {
        job.duration_seconds = Some(duration);
    }
    if patch.clear_error {
        job.error = None;
    }
    if let Some(error) = patch.error {
        job.error = Some(error);
    }
    job.updated_at = Utc::now();
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: PodcastJob) -> Result<PodcastJob> {
        let mut jobs = self.jobs.write().expect("job store lock poisoned");
        jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    async fn get(&self, id: &str, user_id: &str) -> Result<PodcastJob> {
        let jobs = self.jobs.read().expect("job store lock poisoned");
        jobs.get(id)
            .filter(|job| job.user_id == user_id)
            .cloned()
            .ok_or_else(|| PodforgeError::NotFound(format!("Job {id} not found")))
    }

    async fn update(&self, id: &str, patch: JobPatch) -> Result<PodcastJob> {
        let mut jobs = self.jobs.write().expect("job store lock poisoned");
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| PodforgeError::NotFound(format!("Job {id} not found")))?;
        apply_patch(job, patch);
        Ok(job.clone())
    }

    async fn try_begin_audio(&self, id: &str, progress: u8) -> Result<PodcastJob> {
        let mut jobs = self.jobs.write().expect("job store lock poisoned");
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| PodforgeError::NotFound(format!("Job {id} not found")))?;

        if job.status.blocks_audio_start() {
            return Err(PodforgeError::Conflict(format!(
                "Audio generation already in progress for job {id} (status {})",
                job.status
            )));
        }

        apply_patch(
            job,
            JobPatch {
                status: Some(JobStatus::GeneratingAudio),
                progress: Some(progress),
                clear_error: true,
                ..JobPatch::default()
            },
        );
        Ok(job.clone())
    }

    async fn delete(&self, id: &str, user_id: &str) -> Result<()> {
        let mut jobs = self.jobs.write().expect("job store lock poisoned");
        match jobs.get(id) {
            Some(job) if job.user_id == user_id => {
                jobs.remove(id);
                Ok(())
            }
            _ => Err(PodforgeError::NotFound(format!("Job {id} not found"))),
        }
    }

    async fn list_by_owner(
        &self,
        user_id: &str,
        status: Option<JobStatus>,
    ) -> Result<Vec<PodcastJob>> {
        let jobs = self.jobs.read().expect("job store lock poisoned");
        let mut owned: Vec<PodcastJob> = jobs
            .values()
            .filter(|job| job.user_id == user_id)
            .filter(|job| status.map_or(true, |s| job.status == s))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::PodcastOptions;

    fn job() -> PodcastJob {
        PodcastJob::new("user-1", None, PodcastOptions::default())
    }

    #[tokio::test]
    async fn get_is_owner_scoped() {
        let store = InMemoryJobStore::new();
        let created = store.create(job()).await.unwrap();
        assert!(store.get(&created.id, "user-1").await.is_ok());
        let err = store.get(&created.id, "someone-else").await.unwrap_err();
        assert!(matches!(err, PodforgeError::NotFound(_)));
    }

    #[tokio::test]
    async fn progress_never_regresses_within_a_stage() {
        let store = InMemoryJobStore::new();
        let created = store.create(job()).await.unwrap();
        store
            .update(&created.id, JobPatch::progress(50))
            .await
            .unwrap();
        let updated = store
            .update(&created.id, JobPatch::progress(10))
            .await
            .unwrap();
        assert_eq!(updated.progress, 50);
    }

    #[tokio::test]
    async fn status_change_may_reset_progress() {
        let store = InMemoryJobStore::new();
        let created = store.create(job()).await.unwrap();
        store
            .update(
                &created.id,
                JobPatch::status(JobStatus::Complete).with_progress(100),
            )
            .await
            .unwrap();
        let restarted = store.try_begin_audio(&created.id, 5).await.unwrap();
        assert_eq!(restarted.status, JobStatus::GeneratingAudio);
        assert_eq!(restarted.progress, 5);
    }

    #[tokio::test]
    async fn begin_audio_conflicts_while_in_flight() {
        let store = InMemoryJobStore::new();
        let created = store.create(job()).await.unwrap();
        store.try_begin_audio(&created.id, 5).await.unwrap();

        let err = store.try_begin_audio(&created.id, 5).await.unwrap_err();
        assert!(matches!(err, PodforgeError::Conflict(_)));

        // The rejected call mutated nothing.
        let current = store.get(&created.id, "user-1").await.unwrap();
        assert_eq!(current.status, JobStatus::GeneratingAudio);
        assert_eq!(current.progress, 5);
    }

    #[tokio::test]
    async fn begin_audio_clears_stale_error() {
        let store = InMemoryJobStore::new();
        let created = store.create(job()).await.unwrap();
        store
            .update(
                &created.id,
                JobPatch::status(JobStatus::Failed).with_error("TTS exploded"),
            )
            .await
            .unwrap();
        let restarted = store.try_begin_audio(&created.id, 5).await.unwrap();
        assert_eq!(restarted.error, None);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let store = InMemoryJobStore::new();
        let a = store.create(job()).await.unwrap();
        let _b = store.create(job()).await.unwrap();
        store
            .update(&a.id, JobPatch::status(JobStatus::Complete))
            .await
            .unwrap();

        let complete = store
            .list_by_owner("user-1", Some(JobStatus::Complete))
            .await
            .unwrap();
        assert_eq!(complete.len(), 1);
        assert_eq!(complete[0].id, a.id);

        let all = store.list_by_owner("user-1", None).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
