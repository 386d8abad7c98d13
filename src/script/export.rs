//! Script export: JSON, plain text, and SRT subtitles.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::duration::estimate_segment_duration;
use super::PodcastScript;
use crate::error::Result;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    Json,
    Txt,
    Srt,
}

/// Render a script in the requested format. Pure and deterministic.
///
/// SRT cue timing is built from the per-segment duration estimates, not
/// from generated audio; no waveform alignment is performed.
pub fn export_script(script: &PodcastScript, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(script)?),
        ExportFormat::Txt => Ok(export_txt(script)),
        ExportFormat::Srt => Ok(export_srt(script)),
    }
}

fn export_txt(script: &PodcastScript) -> String {
    script
        .segments
        .iter()
        .map(|segment| format!("{}: {}", segment.speaker, segment.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn export_srt(script: &PodcastScript) -> String {
    let mut cues = Vec::with_capacity(script.segments.len());
    let mut cursor = 0u64;

    for (i, segment) in script.segments.iter().enumerate() {
        let start = cursor;
        cursor += estimate_segment_duration(segment);
        cues.push(format!(
            "{}\n{} --> {}\n{}: {}",
            i + 1,
            srt_timestamp(start),
            srt_timestamp(cursor),
            segment.speaker,
            segment.text,
        ));
    }

    let mut out = cues.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn srt_timestamp(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02},000",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
