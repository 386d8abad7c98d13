//! Audio capabilities: speech synthesis, per-segment generation, stitching,
//! and artifact storage.

pub mod generator;
pub mod openai;
pub mod stitcher;
pub mod storage;
pub mod tts;

pub use generator::{generate_segments, GeneratedSegment, ProgressCallback};
pub use openai::OpenAiSpeechProvider;
pub use stitcher::{stitch_segments, StitchedAudio};
pub use storage::{ArtifactStore, LocalArtifactStore};
pub use tts::SpeechProvider;
