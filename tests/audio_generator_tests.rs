//! Voice-segment generation and stitching behavior.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use pretty_assertions::assert_eq;

use podforge::audio::generator::noop_progress;
use podforge::audio::{generate_segments, stitch_segments, ProgressCallback, SpeechProvider};
use podforge::error::PodforgeError;
use podforge::script::Segment;

mod common;
use common::{wav_samples, MockSpeechProvider};

fn segments() -> Vec<Segment> {
    vec![
        Segment::from_source("Alex", "First line.", 1),
        Segment::from_source("Jamie", "Second line.", 2),
        Segment::from_source("Alex", "Third line.", 3),
    ]
}

fn voice_map() -> HashMap<String, String> {
    HashMap::from([
        ("Alex".to_string(), "voice-a".to_string()),
        ("Jamie".to_string(), "voice-b".to_string()),
    ])
}

fn recording_progress() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: ProgressCallback = Arc::new(move |value: u8| -> BoxFuture<'static, ()> {
        let sink = sink.clone();
        Box::pin(async move {
            sink.lock().unwrap().push(value);
        })
    });
    (callback, seen)
}

#[tokio::test]
async fn missing_voice_mapping_fails_before_any_tts_call() {
    let provider = Arc::new(MockSpeechProvider::new().with_voice("voice-a", &[1]));
    let mut map = voice_map();
    map.remove("Jamie");

    let err = generate_segments(&segments(), &map, provider.clone(), noop_progress())
        .await
        .unwrap_err();

    assert!(matches!(err, PodforgeError::Validation(ref m) if m.contains("Jamie")));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn out_of_order_completion_still_stitches_in_script_order() {
    // voice-a answers slowly, so Jamie's middle segment finishes first.
    let provider = Arc::new(
        MockSpeechProvider::new()
            .with_slow_voice("voice-a", &[1, 1], Duration::from_millis(80))
            .with_voice("voice-b", &[2, 2]),
    );

    let generated = generate_segments(&segments(), &voice_map(), provider, noop_progress())
        .await
        .unwrap();
    let indexes: Vec<usize> = generated.iter().map(|g| g.index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);

    let stitched = stitch_segments(generated).unwrap();
    assert_eq!(wav_samples(&stitched.bytes), vec![1, 1, 2, 2, 1, 1]);
    assert_eq!(stitched.segment_count, 3);
}

#[tokio::test]
async fn one_segment_failure_fails_the_whole_request() {
    let provider = Arc::new(
        MockSpeechProvider::new()
            .with_voice("voice-a", &[1])
            .with_failing_voice("voice-b"),
    );

    let err = generate_segments(&segments(), &voice_map(), provider, noop_progress())
        .await
        .unwrap_err();
    assert!(matches!(err, PodforgeError::Audio(ref m) if m.contains("segment 2")));
}

#[tokio::test]
async fn progress_fires_at_coarse_checkpoints_only() {
    let provider = Arc::new(
        MockSpeechProvider::new()
            .with_voice("voice-a", &[1])
            .with_voice("voice-b", &[2]),
    );
    let (callback, seen) = recording_progress();

    generate_segments(&segments(), &voice_map(), provider, callback)
        .await
        .unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.first(), Some(&10));
    assert_eq!(seen.last(), Some(&80));
    assert!(seen.contains(&50));
    // Coarse boundaries only, never one event per segment.
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn empty_segment_list_is_rejected() {
    let provider = Arc::new(MockSpeechProvider::new());
    let err = generate_segments(&[], &voice_map(), provider, noop_progress())
        .await
        .unwrap_err();
    assert!(matches!(err, PodforgeError::Validation(_)));
}

/// Generated duration comes from samples, not from the text estimate.
#[tokio::test]
async fn stitched_duration_is_measured_from_audio() {
    // 20000 frames at 8 kHz = 2.5 s → rounds up to 3.
    let provider = Arc::new(
        MockSpeechProvider::new()
            .with_voice("voice-a", &vec![0i16; 12000])
            .with_voice("voice-b", &vec![0i16; 8000]),
    );
    let two = &segments()[..2];

    let generated = generate_segments(two, &voice_map(), provider, noop_progress())
        .await
        .unwrap();
    let stitched = stitch_segments(generated).unwrap();
    assert_eq!(stitched.duration_seconds, 3);
}

/// SpeechProvider is object-safe and usable through a trait object.
#[tokio::test]
async fn provider_trait_object_dispatch() {
    let provider: Arc<dyn SpeechProvider> =
        Arc::new(MockSpeechProvider::new().with_voice("v", &[7]));
    let audio = provider.synthesize("hi", "v").await.unwrap();
    assert_eq!(wav_samples(&audio), vec![7]);
}
