//! Script model, parsing, TTS preprocessing, synthesis, and export.

pub mod duration;
pub mod export;
pub mod parser;
pub mod preprocess;
pub mod synthesizer;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use duration::{estimate_script_duration, estimate_segment_duration, format_duration};
pub use export::{export_script, ExportFormat};
pub use parser::{parse_script, parse_script_with_mode, ParseOutcome, ParsedScript};
pub use preprocess::preprocess_text_for_tts;
pub use synthesizer::ScriptSynthesizer;

/// Default speaker name for single-narrator scripts.
pub const DEFAULT_NARRATOR: &str = "Narrator";

/// Whether a script is single-narrator or two-host dialogue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ScriptMode {
    #[default]
    Single,
    Podcast,
}

/// One speaker turn: text plus speaker label, position, and optional
/// emotion tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub speaker: String,
    /// TTS-ready text (preprocessed).
    pub text: String,
    /// Text as it appeared in the source.
    pub original_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    /// 1-based line in the source text where this segment started.
    pub line_number: usize,
    /// True when preprocessing changed the text.
    pub has_changes: bool,
}

impl Segment {
    /// Build a segment from raw source text, running TTS preprocessing and
    /// extracting the first bracketed emotion cue.
    pub fn from_source(speaker: impl Into<String>, raw_text: &str, line_number: usize) -> Self {
        let original_text = raw_text.trim().to_string();
        let text = preprocess_text_for_tts(&original_text);
        let has_changes = text != original_text;
        let emotion = preprocess::extract_emotion_cue(&original_text);
        Self {
            speaker: speaker.into(),
            text,
            original_text,
            emotion,
            line_number,
            has_changes,
        }
    }

    /// Word count of the TTS-ready text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A complete synthesized podcast script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastScript {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
}

impl PodcastScript {
    /// Distinct speakers in order of first appearance.
    pub fn speakers(&self) -> Vec<String> {
        let mut speakers: Vec<String> = Vec::new();
        for segment in &self.segments {
            if !speakers.contains(&segment.speaker) {
                speakers.push(segment.speaker.clone());
            }
        }
        speakers
    }
}
