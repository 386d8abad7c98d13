//! Script synthesis and refinement against a text-completion capability.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::parser::parse_script_with_mode;
use super::{PodcastScript, ScriptMode, Segment};
use crate::error::{PodforgeError, Result};
use crate::job::PodcastOptions;
use crate::provider::{CompletionProvider, CompletionSettings};

const COMPOSE_SYSTEM_PROMPT: &str = "You write two-host podcast dialogue from source \
material. Reply with a JSON object: {\"title\", \"description\", \"segments\": \
[{\"speaker\", \"text\", \"emotion\"?}], \"key_takeaways\": [..]}. Alternate between \
the two hosts.";

const TYPO_FIX_SYSTEM_PROMPT: &str = "Fix spelling and grammar only. Keep wording, \
meaning, and all bracketed tags such as [laughing] exactly as they are. Reply with \
the corrected text and nothing else.";

/// Produces and refines podcast scripts via a completion provider.
pub struct ScriptSynthesizer {
    completion: Arc<dyn CompletionProvider>,
}

impl ScriptSynthesizer {
    pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
        Self { completion }
    }

    /// Compose a two-host script from source content.
    ///
    /// The provider is asked for a JSON script document; a prose reply is
    /// fed back through the script parser instead. Errors propagate to
    /// the caller.
    pub async fn synthesize(
        &self,
        source_content: &str,
        options: &PodcastOptions,
    ) -> Result<PodcastScript> {
        if source_content.trim().is_empty() {
            return Err(PodforgeError::Validation(
                "Source content cannot be empty".to_string(),
            ));
        }

        let user_text = format!(
            "Hosts: {} and {}. Tone: {}. Target length: about {} minutes.\n\n{}",
            options.host_names.host1,
            options.host_names.host2,
            options.tone,
            options.target_duration_minutes,
            source_content,
        );

        let reply = self
            .completion
            .complete(
                COMPOSE_SYSTEM_PROMPT,
                &user_text,
                &CompletionSettings::composition(),
            )
            .await?;

        self.parse_reply(&reply, options)
    }

    fn parse_reply(&self, reply: &str, options: &PodcastOptions) -> Result<PodcastScript> {
        let body = strip_code_fences(reply);

        if let Ok(raw) = serde_json::from_str::<RawScript>(body) {
            let segments = raw
                .segments
                .into_iter()
                .enumerate()
                .filter(|(_, s)| !s.text.trim().is_empty())
                .map(|(i, s)| {
                    let mut segment = Segment::from_source(s.speaker, &s.text, i + 1);
                    if s.emotion.is_some() {
                        segment.emotion = s.emotion;
                    }
                    segment
                })
                .collect::<Vec<_>>();

            if !segments.is_empty() {
                return Ok(PodcastScript {
                    title: raw.title,
                    description: raw.description,
                    segments,
                    key_takeaways: raw.key_takeaways,
                });
            }
        }

        debug!("completion reply was not a JSON script, parsing as dialogue text");
        let parsed = parse_script_with_mode(
            body,
            ScriptMode::Podcast,
            Some(&options.host_names.host1),
            Some(&options.host_names.host2),
        )?;

        Ok(PodcastScript {
            title: "Untitled Episode".to_string(),
            description: String::new(),
            segments: parsed.segments,
            key_takeaways: Vec::new(),
        })
    }

    /// Best-effort typo correction, one completion call per segment.
    ///
    /// Any provider failure keeps the original text; a reply that lost a
    /// bracketed cue present in the input is also discarded. This pass
    /// never returns an error.
    pub async fn fix_typos(&self, segments: &[Segment]) -> Vec<Segment> {
        let mut corrected = Vec::with_capacity(segments.len());
        for segment in segments {
            let mut updated = segment.clone();
            match self
                .completion
                .complete(
                    TYPO_FIX_SYSTEM_PROMPT,
                    &segment.text,
                    &CompletionSettings::correction(),
                )
                .await
            {
                Ok(reply) => {
                    let reply = reply.trim();
                    if reply.is_empty() {
                        warn!(line = segment.line_number, "empty typo-fix reply, keeping original");
                    } else if !preserves_bracket_cues(&segment.text, reply) {
                        warn!(
                            line = segment.line_number,
                            "typo-fix reply dropped a bracket cue, keeping original"
                        );
                    } else {
                        updated.text = reply.to_string();
                        updated.has_changes = updated.text != updated.original_text;
                    }
                }
                Err(e) => {
                    warn!(line = segment.line_number, error = %e, "typo-fix call failed, keeping original");
                }
            }
            corrected.push(updated);
        }
        corrected
    }
}

#[derive(Debug, Deserialize)]
struct RawScript {
    title: String,
    #[serde(default)]
    description: String,
    segments: Vec<RawSegment>,
    #[serde(default)]
    key_takeaways: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    speaker: String,
    text: String,
    #[serde(default)]
    emotion: Option<String>,
}

fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn preserves_bracket_cues(original: &str, corrected: &str) -> bool {
    let mut search = original;
    while let Some(start) = search.find('[') {
        let tail = &search[start..];
        match tail.find(']') {
            Some(end) => {
                let cue = &tail[..=end];
                if !corrected.contains(cue) {
                    return false;
                }
                search = &tail[end + 1..];
            }
            None => break,
        }
    }
    true
}
