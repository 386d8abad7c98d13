//! The pipeline state machine: script stage, audio stage, and job access.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::store::{JobPatch, JobStore};
use super::{JobStatus, PodcastJob, PodcastOptions};
use crate::audio::generator::{self, generate_segments, ProgressCallback};
use crate::audio::stitcher::stitch_segments;
use crate::audio::storage::ArtifactStore;
use crate::audio::tts::SpeechProvider;
use crate::error::{PodforgeError, Result};
use crate::provider::CompletionProvider;
use crate::script::duration::estimate_script_duration;
use crate::script::export::{export_script, ExportFormat};
use crate::script::synthesizer::ScriptSynthesizer;
use crate::script::{PodcastScript, Segment};

/// Wall-clock budget for one pipeline stage. Processing is synchronous
/// within a single request/response cycle; this bound is what keeps a
/// stuck external call from pinning a job in an in-flight status.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(300);

/// Drives podcast jobs through their lifecycle and persists every
/// transition. Progress is written to the job record so clients observe
/// it by polling, without a live connection to the generating process.
pub struct PodcastOrchestrator {
    store: Arc<dyn JobStore>,
    speech: Arc<dyn SpeechProvider>,
    artifacts: Arc<dyn ArtifactStore>,
    synthesizer: ScriptSynthesizer,
    stage_timeout: Duration,
}

impl PodcastOrchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        completion: Arc<dyn CompletionProvider>,
        speech: Arc<dyn SpeechProvider>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            store,
            speech,
            artifacts,
            synthesizer: ScriptSynthesizer::new(completion),
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }

    pub fn with_stage_timeout(mut self, stage_timeout: Duration) -> Self {
        self.stage_timeout = stage_timeout;
        self
    }

    /// Script stage: create a job and synthesize its script.
    ///
    /// The job is created in `generating_script` and lands on `complete`
    /// with the script attached, or on `failed` with a bounded error
    /// message (in which case the error is also returned).
    pub async fn generate_script(
        &self,
        user_id: &str,
        source_content: &str,
        content_id: Option<String>,
        options: PodcastOptions,
    ) -> Result<PodcastJob> {
        if source_content.trim().is_empty() {
            return Err(PodforgeError::Validation(
                "Source content cannot be empty".to_string(),
            ));
        }

        let mut job = PodcastJob::new(user_id, content_id, options.clone());
        job.status = JobStatus::GeneratingScript;
        job.progress = 10;
        let job = self.store.create(job).await?;
        info!(job_id = %job.id, "script generation started");

        let result = crate::util::timeout::with_timeout(
            self.stage_timeout,
            self.synthesizer.synthesize(source_content, &options),
        )
        .await;

        match result {
            Ok(script) => {
                let estimated = estimate_script_duration(&script.segments);
                info!(
                    job_id = %job.id,
                    segments = script.segments.len(),
                    estimated_seconds = estimated,
                    "script synthesized"
                );
                self.store
                    .update(
                        &job.id,
                        JobPatch::status(JobStatus::Complete)
                            .with_progress(100)
                            .with_script(script),
                    )
                    .await
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, "script generation failed");
                self.store
                    .update(
                        &job.id,
                        JobPatch::status(JobStatus::Failed).with_error(e.persisted_message()),
                    )
                    .await?;
                Err(e)
            }
        }
    }

    /// Audio stage: voice the job's script and stitch the result.
    ///
    /// Returns a conflict, mutating nothing, while a previous audio
    /// request is still in flight; not-found for an unknown or foreign
    /// job; a validation error before any state change when a speaker
    /// has no voice mapping. Edited segments, when supplied, replace the
    /// stored script. A stage failure lands the job on `failed` with the
    /// script intact, so a retry skips re-synthesis.
    pub async fn generate_audio(
        &self,
        job_id: &str,
        user_id: &str,
        voice_map: &HashMap<String, String>,
        edited_segments: Option<Vec<Segment>>,
    ) -> Result<PodcastJob> {
        let job = self.store.get(job_id, user_id).await?;

        let edited = edited_segments.is_some();
        let script = match (edited_segments, job.script) {
            (Some(segments), existing) => {
                let base = existing.unwrap_or_else(|| PodcastScript {
                    title: "Untitled Episode".to_string(),
                    description: String::new(),
                    segments: Vec::new(),
                    key_takeaways: Vec::new(),
                });
                Some(PodcastScript { segments, ..base })
            }
            (None, existing) => existing,
        };
        let script = script.ok_or_else(|| {
            PodforgeError::Validation(format!(
                "Job {job_id} has no script; generate a script first"
            ))
        })?;
        if script.segments.is_empty() {
            return Err(PodforgeError::Validation(
                "Script has no segments to synthesize".to_string(),
            ));
        }

        // Fail fast on an incomplete voice map before any state mutation
        // or external spend. The generator re-checks at its own boundary.
        generator::validate_voice_map(&script.segments, voice_map)?;

        // Atomic check-and-transition; a concurrent request gets a
        // conflict here and the record is untouched.
        self.store.try_begin_audio(job_id, 5).await?;
        info!(job_id, segments = script.segments.len(), "audio generation started");

        if edited {
            self.store
                .update(job_id, JobPatch::default().with_script(script.clone()))
                .await?;
        }

        let result = crate::util::timeout::with_timeout(
            self.stage_timeout,
            self.run_audio_stage(job_id, &script, voice_map),
        )
        .await;

        match result {
            Ok(job) => Ok(job),
            Err(e) => {
                error!(job_id, error = %e, "audio generation failed");
                self.store
                    .update(
                        job_id,
                        JobPatch::status(JobStatus::Failed).with_error(e.persisted_message()),
                    )
                    .await?;
                Err(e)
            }
        }
    }

    async fn run_audio_stage(
        &self,
        job_id: &str,
        script: &PodcastScript,
        voice_map: &HashMap<String, String>,
    ) -> Result<PodcastJob> {
        let progress = self.progress_sink(job_id);

        let generated = generate_segments(
            &script.segments,
            voice_map,
            Arc::clone(&self.speech),
            progress,
        )
        .await?;

        self.store
            .update(
                job_id,
                JobPatch::status(JobStatus::Stitching).with_progress(80),
            )
            .await?;

        let stitched = stitch_segments(generated)?;
        let duration_seconds = stitched.duration_seconds;

        self.store
            .update(job_id, JobPatch::progress(95))
            .await?;

        let audio_url = self.artifacts.put(stitched.bytes, "audio/wav").await?;

        // audio_url and the measured duration are persisted together on
        // the transition into complete.
        self.store
            .update(
                job_id,
                JobPatch {
                    status: Some(JobStatus::Complete),
                    progress: Some(100),
                    audio_url: Some(audio_url),
                    duration_seconds: Some(duration_seconds),
                    ..JobPatch::default()
                },
            )
            .await
    }

    /// Progress sink that persists generator checkpoints verbatim.
    fn progress_sink(&self, job_id: &str) -> ProgressCallback {
        let store = Arc::clone(&self.store);
        let job_id = job_id.to_string();
        Arc::new(move |value: u8| {
            let store = Arc::clone(&store);
            let job_id = job_id.clone();
            Box::pin(async move {
                if let Err(e) = store.update(&job_id, JobPatch::progress(value)).await {
                    warn!(job_id = %job_id, error = %e, "failed to persist progress");
                }
            })
        })
    }

    /// Best-effort typo correction over a job's stored script.
    pub async fn refine_script(&self, job_id: &str, user_id: &str) -> Result<PodcastJob> {
        let job = self.store.get(job_id, user_id).await?;
        if job.status.blocks_audio_start() {
            return Err(PodforgeError::Conflict(format!(
                "Job {job_id} is generating audio; the script cannot be edited"
            )));
        }
        let script = job.script.ok_or_else(|| {
            PodforgeError::Validation(format!("Job {job_id} has no script to refine"))
        })?;

        let segments = self.synthesizer.fix_typos(&script.segments).await;
        let refined = PodcastScript { segments, ..script };
        self.store
            .update(job_id, JobPatch::default().with_script(refined))
            .await
    }

    pub async fn get_job(&self, job_id: &str, user_id: &str) -> Result<PodcastJob> {
        self.store.get(job_id, user_id).await
    }

    pub async fn delete_job(&self, job_id: &str, user_id: &str) -> Result<()> {
        self.store.delete(job_id, user_id).await
    }

    pub async fn list_jobs(
        &self,
        user_id: &str,
        status: Option<JobStatus>,
    ) -> Result<Vec<PodcastJob>> {
        self.store.list_by_owner(user_id, status).await
    }

    /// Export a job's script in the requested format.
    pub async fn export_job_script(
        &self,
        job_id: &str,
        user_id: &str,
        format: ExportFormat,
    ) -> Result<String> {
        let job = self.store.get(job_id, user_id).await?;
        let script = job.script.ok_or_else(|| {
            PodforgeError::NotFound(format!("Job {job_id} has no script to export"))
        })?;
        export_script(&script, format)
    }
}
