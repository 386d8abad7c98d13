//! Script parsing: speaker detection and segmentation.
//!
//! A script is scanned line by line for speaker labels. Three label styles
//! are recognized, tried in priority order:
//!
//! 1. Bold markdown: `**Alex:** Hello there.`
//! 2. Screenplay caps: `ALEX: Hello there.`
//! 3. Bracketed: `[Alex]: Hello there.`
//!
//! The first style that yields at least two distinct speakers across the
//! document selects two-host (`podcast`) mode. Otherwise the whole text
//! becomes one narrator segment (`single` mode).

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{
    duration::{estimate_script_duration, format_duration},
    ScriptMode, Segment, DEFAULT_NARRATOR,
};
use crate::error::{PodforgeError, Result};

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\*([^*]+?)\*\*:?\s*(.*)$").expect("bold label regex"))
}

fn caps_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Z][A-Z0-9 .'\-]{1,39}):\s*(.*)$").expect("caps label regex")
    })
}

fn bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([^\]]+)\]:\s*(.*)$").expect("bracket label regex"))
}

/// Loose `Name: text` labels, used only when the caller has already
/// declared the script to be a dialogue.
fn generic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z][A-Za-z0-9 _.'\-]{0,39}):\s*(.*)$").expect("generic label regex")
    })
}

/// Result of parsing a script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedScript {
    pub mode: ScriptMode,
    /// Distinct speakers in order of first appearance.
    pub speakers: Vec<String>,
    pub segments: Vec<Segment>,
}

impl ParsedScript {
    /// Attach the duration estimate for boundary responses.
    pub fn into_outcome(self) -> ParseOutcome {
        let estimated_duration_seconds = estimate_script_duration(&self.segments);
        ParseOutcome {
            estimated_duration_formatted: format_duration(estimated_duration_seconds),
            estimated_duration_seconds,
            mode: self.mode,
            speakers: self.speakers,
            segments: self.segments,
        }
    }
}

/// Boundary-facing parse result: segments plus the duration estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub mode: ScriptMode,
    pub speakers: Vec<String>,
    pub segments: Vec<Segment>,
    pub estimated_duration_seconds: u64,
    pub estimated_duration_formatted: String,
}

/// Parse a script, auto-detecting single-narrator vs. two-host mode.
pub fn parse_script(text: &str) -> Result<ParsedScript> {
    if text.trim().is_empty() {
        return Err(PodforgeError::Validation(
            "Script text cannot be empty".to_string(),
        ));
    }

    for pattern in [bold_re(), caps_re(), bracket_re()] {
        let segments = collect_segments(text, pattern);
        let speakers = distinct_speakers(&segments);
        if speakers.len() >= 2 {
            return Ok(ParsedScript {
                mode: ScriptMode::Podcast,
                speakers,
                segments,
            });
        }
    }

    Ok(single_narrator(text, DEFAULT_NARRATOR))
}

/// Parse a script with an explicit mode and optional speaker names.
///
/// In `single` mode the whole text becomes one segment under
/// `speaker1_name` (default "Narrator"). In `podcast` mode the strict
/// label styles are tried first, falling back to loose `Name:` labels,
/// and the first two detected speakers are renamed to the provided names.
pub fn parse_script_with_mode(
    text: &str,
    mode: ScriptMode,
    speaker1_name: Option<&str>,
    speaker2_name: Option<&str>,
) -> Result<ParsedScript> {
    if text.trim().is_empty() {
        return Err(PodforgeError::Validation(
            "Script text cannot be empty".to_string(),
        ));
    }

    match mode {
        ScriptMode::Single => Ok(single_narrator(
            text,
            speaker1_name.unwrap_or(DEFAULT_NARRATOR),
        )),
        ScriptMode::Podcast => {
            let mut segments = Vec::new();
            for pattern in [bold_re(), caps_re(), bracket_re(), generic_re()] {
                segments = collect_segments(text, pattern);
                if distinct_speakers(&segments).len() >= 2 {
                    break;
                }
            }

            if segments.is_empty() {
                return Err(PodforgeError::Validation(
                    "No speaker-labeled lines found in podcast script".to_string(),
                ));
            }

            rename_speakers(&mut segments, speaker1_name, speaker2_name);
            let speakers = distinct_speakers(&segments);
            Ok(ParsedScript {
                mode: ScriptMode::Podcast,
                speakers,
                segments,
            })
        }
    }
}

fn single_narrator(text: &str, speaker: &str) -> ParsedScript {
    let segment = Segment::from_source(speaker, text, 1);
    let segments = if segment.text.is_empty() {
        Vec::new()
    } else {
        vec![segment]
    };
    ParsedScript {
        mode: ScriptMode::Single,
        speakers: vec![speaker.to_string()],
        segments,
    }
}

/// Scan lines against one label pattern. Labeled lines start a segment;
/// unlabeled lines are appended to the current one. Empty segments are
/// dropped.
fn collect_segments(text: &str, pattern: &Regex) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Option<(String, String, usize)> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = pattern.captures(line) {
            if let Some((speaker, body, line_number)) = current.take() {
                push_segment(&mut segments, &speaker, &body, line_number);
            }
            let speaker = caps[1].trim().trim_end_matches(':').trim().to_string();
            let body = caps[2].trim().to_string();
            current = Some((speaker, body, idx + 1));
        } else if let Some((_, body, _)) = current.as_mut() {
            // Continuation line for the current speaker; heading lines
            // separate sections, not dialogue.
            if !line.starts_with('#') {
                if !body.is_empty() {
                    body.push(' ');
                }
                body.push_str(line);
            }
        }
    }

    if let Some((speaker, body, line_number)) = current {
        push_segment(&mut segments, &speaker, &body, line_number);
    }

    segments
}

fn push_segment(segments: &mut Vec<Segment>, speaker: &str, body: &str, line_number: usize) {
    if body.trim().is_empty() {
        return;
    }
    let segment = Segment::from_source(speaker, body, line_number);
    if !segment.text.is_empty() {
        segments.push(segment);
    }
}

fn distinct_speakers(segments: &[Segment]) -> Vec<String> {
    let mut speakers: Vec<String> = Vec::new();
    for segment in segments {
        if !speakers.contains(&segment.speaker) {
            speakers.push(segment.speaker.clone());
        }
    }
    speakers
}

/// Map the first two detected speakers onto caller-provided names.
fn rename_speakers(segments: &mut [Segment], name1: Option<&str>, name2: Option<&str>) {
    let detected = distinct_speakers(segments);
    let mut mapping: Vec<(String, String)> = Vec::new();
    if let (Some(old), Some(new)) = (detected.first(), name1) {
        mapping.push((old.clone(), new.to_string()));
    }
    if let (Some(old), Some(new)) = (detected.get(1), name2) {
        mapping.push((old.clone(), new.to_string()));
    }

    for segment in segments {
        if let Some((_, new)) = mapping.iter().find(|(old, _)| *old == segment.speaker) {
            segment.speaker = new.clone();
        }
    }
}
