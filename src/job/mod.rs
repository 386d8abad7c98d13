//! Podcast job model and lifecycle.

pub mod orchestrator;
pub mod store;

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::script::PodcastScript;

pub use orchestrator::PodcastOrchestrator;
pub use store::{InMemoryJobStore, JobPatch, JobStore};

/// Lifecycle states of a podcast job.
///
/// Valid transitions are forward-only: `pending → generating_script →
/// {complete|failed}` and, for a job that already has a script,
/// `complete → generating_audio → stitching → {complete|failed}`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum JobStatus {
    #[default]
    Pending,
    GeneratingScript,
    GeneratingAudio,
    Stitching,
    Complete,
    Failed,
}

impl JobStatus {
    /// Whether a stage is currently running.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::GeneratingScript | Self::GeneratingAudio | Self::Stitching
        )
    }

    /// Whether this status blocks a new audio-generation request.
    pub fn blocks_audio_start(self) -> bool {
        matches!(self, Self::GeneratingAudio | Self::Stitching)
    }
}

/// Names of the two hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostNames {
    pub host1: String,
    pub host2: String,
}

impl Default for HostNames {
    fn default() -> Self {
        Self {
            host1: "Alex".to_string(),
            host2: "Jamie".to_string(),
        }
    }
}

/// Options controlling script and audio generation for one job.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
pub struct PodcastOptions {
    #[builder(default = 10)]
    pub target_duration_minutes: u32,
    #[builder(default = "conversational".to_string())]
    pub tone: String,
    #[builder(default)]
    pub host_names: HostNames,
    #[builder(default = "openai".to_string())]
    pub tts_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_transcript_ids: Option<Vec<String>>,
}

impl Default for PodcastOptions {
    fn default() -> Self {
        Self {
            target_duration_minutes: 10,
            tone: "conversational".to_string(),
            host_names: HostNames::default(),
            tts_provider: "openai".to_string(),
            source_transcript_ids: None,
        }
    }
}

/// The persisted record tracking one podcast's generation lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastJob {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    pub status: JobStatus,
    /// 0–100; non-decreasing within a stage.
    pub progress: u8,
    pub options: PodcastOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PodcastScript>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Real audio duration in seconds, set together with `audio_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PodcastJob {
    /// Create a fresh job record.
    pub fn new(
        user_id: impl Into<String>,
        content_id: Option<String>,
        options: PodcastOptions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            content_id,
            status: JobStatus::Pending,
            progress: 0,
            options,
            script: None,
            audio_url: None,
            duration_seconds: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
