//! Per-segment voice generation against a speaker→voice map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture};
use tracing::{debug, info};

use super::tts::SpeechProvider;
use crate::error::{PodforgeError, Result};
use crate::script::Segment;

/// Async progress sink. Fired at coarse checkpoints only, never per
/// segment.
pub type ProgressCallback = Arc<dyn Fn(u8) -> BoxFuture<'static, ()> + Send + Sync>;

/// A no-op progress callback.
pub fn noop_progress() -> ProgressCallback {
    Arc::new(|_| Box::pin(async {}))
}

/// One segment's synthesized audio, tagged with its script position.
#[derive(Debug, Clone)]
pub struct GeneratedSegment {
    pub index: usize,
    pub audio: Vec<u8>,
}

/// Check that every distinct speaker has a voice mapping.
pub fn validate_voice_map(
    segments: &[Segment],
    voice_map: &HashMap<String, String>,
) -> Result<()> {
    let mut missing: Vec<String> = Vec::new();
    for segment in segments {
        if !voice_map.contains_key(&segment.speaker) && !missing.contains(&segment.speaker) {
            missing.push(segment.speaker.clone());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PodforgeError::Validation(format!(
            "No voice mapping for speaker(s): {}",
            missing.join(", ")
        )))
    }
}

/// Synthesize audio for every segment, concurrently.
///
/// The voice map is validated up front: a missing speaker fails the call
/// before any TTS request is issued. Results are written into a pre-sized
/// arena by segment index, so completion order never affects output
/// order. Any single segment failure fails the whole call; no partial
/// audio is kept (resuming from the last good segment is not supported).
pub async fn generate_segments(
    segments: &[Segment],
    voice_map: &HashMap<String, String>,
    provider: Arc<dyn SpeechProvider>,
    progress: ProgressCallback,
) -> Result<Vec<GeneratedSegment>> {
    if segments.is_empty() {
        return Err(PodforgeError::Validation(
            "No segments to synthesize".to_string(),
        ));
    }
    validate_voice_map(segments, voice_map)?;

    let total = segments.len();
    info!(total, "starting voice generation");
    progress(10).await;

    let midpoint = total.div_ceil(2);
    let completed = Arc::new(AtomicUsize::new(0));

    let tasks = segments.iter().enumerate().map(|(index, segment)| {
        let provider = Arc::clone(&provider);
        let progress = Arc::clone(&progress);
        let completed = Arc::clone(&completed);
        let voice_id = voice_map[&segment.speaker].clone();
        let speaker = segment.speaker.clone();
        let text = segment.text.clone();

        async move {
            debug!(index, speaker = %speaker, voice = %voice_id, "synthesizing segment");
            let audio = provider.synthesize(&text, &voice_id).await.map_err(|e| {
                PodforgeError::Audio(format!(
                    "TTS failed for segment {} ({speaker}): {e}",
                    index + 1
                ))
            })?;

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if done == midpoint {
                progress(50).await;
            }
            Ok::<(usize, Vec<u8>), PodforgeError>((index, audio))
        }
    });

    let results = try_join_all(tasks).await?;

    // Arena indexed by script position; arrival order is irrelevant.
    let mut arena: Vec<Option<Vec<u8>>> = vec![None; total];
    for (index, audio) in results {
        arena[index] = Some(audio);
    }

    progress(80).await;

    arena
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.map(|audio| GeneratedSegment { index, audio })
                .ok_or_else(|| {
                    PodforgeError::InvalidState(format!("Missing audio for segment {index}"))
                })
        })
        .collect()
}
