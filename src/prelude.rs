//! Convenience re-exports for common use.

pub use crate::audio::{
    ArtifactStore, LocalArtifactStore, OpenAiSpeechProvider, SpeechProvider,
};
pub use crate::config::PodforgeConfig;
pub use crate::error::{PodforgeError, Result};
pub use crate::job::{
    HostNames, InMemoryJobStore, JobStatus, JobStore, PodcastJob, PodcastOptions,
    PodcastOrchestrator,
};
pub use crate::provider::{CompletionProvider, CompletionSettings, OpenAiCompletionProvider};
pub use crate::script::{
    export_script, parse_script, parse_script_with_mode, ExportFormat, PodcastScript, ScriptMode,
    ScriptSynthesizer, Segment,
};
