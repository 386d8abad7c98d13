//! Shared test helpers and mock capability providers.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use podforge::audio::{ArtifactStore, SpeechProvider};
use podforge::error::PodforgeError;
use podforge::provider::{CompletionProvider, CompletionSettings};

/// Encode mono 16-bit PCM samples as a WAV buffer.
pub fn wav_bytes(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        for sample in samples {
            writer.write_sample(*sample).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

/// Decode a WAV buffer back into its samples.
pub fn wav_samples(bytes: &[u8]) -> Vec<i16> {
    hound::WavReader::new(Cursor::new(bytes))
        .expect("wav reader")
        .into_samples::<i16>()
        .map(|s| s.expect("sample"))
        .collect()
}

/// A canned JSON script document the mock completion provider can return.
pub fn script_json() -> String {
    serde_json::json!({
        "title": "Test Episode",
        "description": "Two hosts say hello",
        "segments": [
            {"speaker": "Alex", "text": "Hello."},
            {"speaker": "Jamie", "text": "Hi there!"}
        ],
        "key_takeaways": ["greetings matter"]
    })
    .to_string()
}

/// Completion provider returning queued replies, with a call counter.
pub struct MockCompletionProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    fallback: Option<String>,
    pub calls: AtomicUsize,
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that always answers with `reply` once the queue is empty.
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(reply.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn queue_error(&self, message: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Err(message.into()));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        _user_text: &str,
        _settings: &CompletionSettings,
    ) -> Result<String, PodforgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.replies.lock().unwrap().pop_front();
        match queued {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(PodforgeError::provider("mock", message)),
            None => match &self.fallback {
                Some(reply) => Ok(reply.clone()),
                None => Err(PodforgeError::provider("mock", "no reply queued")),
            },
        }
    }
}

/// Per-voice behavior of the mock speech provider.
#[derive(Clone)]
struct VoiceFixture {
    samples: Vec<i16>,
    delay: Duration,
    fail: bool,
}

/// Speech provider returning canned WAV audio per voice, with optional
/// latency and failure injection and a call counter.
pub struct MockSpeechProvider {
    voices: Mutex<HashMap<String, VoiceFixture>>,
    sample_rate: u32,
    pub calls: AtomicUsize,
}

impl MockSpeechProvider {
    pub fn new() -> Self {
        Self {
            voices: Mutex::new(HashMap::new()),
            sample_rate: 8000,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Register a voice that answers with the given samples.
    pub fn with_voice(self, voice_id: &str, samples: &[i16]) -> Self {
        self.voices.lock().unwrap().insert(
            voice_id.to_string(),
            VoiceFixture {
                samples: samples.to_vec(),
                delay: Duration::ZERO,
                fail: false,
            },
        );
        self
    }

    /// Register a voice that answers after a delay.
    pub fn with_slow_voice(self, voice_id: &str, samples: &[i16], delay: Duration) -> Self {
        self.voices.lock().unwrap().insert(
            voice_id.to_string(),
            VoiceFixture {
                samples: samples.to_vec(),
                delay,
                fail: false,
            },
        );
        self
    }

    /// Register a voice whose synthesis always fails.
    pub fn with_failing_voice(self, voice_id: &str) -> Self {
        self.voices.lock().unwrap().insert(
            voice_id.to_string(),
            VoiceFixture {
                samples: Vec::new(),
                delay: Duration::ZERO,
                fail: true,
            },
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn synthesize(&self, _text: &str, voice_id: &str) -> Result<Vec<u8>, PodforgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fixture = self
            .voices
            .lock()
            .unwrap()
            .get(voice_id)
            .cloned()
            .ok_or_else(|| {
                PodforgeError::provider("mock", format!("unknown voice {voice_id}"))
            })?;

        if !fixture.delay.is_zero() {
            tokio::time::sleep(fixture.delay).await;
        }
        if fixture.fail {
            return Err(PodforgeError::provider("mock", "synthesis exploded"));
        }
        Ok(wav_bytes(&fixture.samples, self.sample_rate))
    }
}

/// Artifact store keeping payloads in memory.
#[derive(Default)]
pub struct MemoryArtifactStore {
    puts: Mutex<Vec<(Vec<u8>, String)>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Vec<(Vec<u8>, String)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, PodforgeError> {
        let mut puts = self.puts.lock().unwrap();
        puts.push((bytes, content_type.to_string()));
        Ok(format!("mem://artifact-{}", puts.len()))
    }
}
