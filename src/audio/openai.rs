//! OpenAI TTS provider (`/audio/speech`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use super::tts::SpeechProvider;
use crate::error::PodforgeError;
use crate::provider::http::{bearer_headers, shared_client, status_to_error, trim_trailing_slash};
use crate::util::retry::RetryPolicy;
use crate::util::timeout::with_timeout;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TTS_MODEL: &str = "tts-1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI text-to-speech adapter. Requests WAV so downstream stitching can
/// concatenate samples without a decoder.
#[derive(Debug, Clone)]
pub struct OpenAiSpeechProvider {
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl OpenAiSpeechProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_TTS_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn new_with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            model: DEFAULT_TTS_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn validate(&self, text: &str, voice_id: &str) -> Result<(), PodforgeError> {
        if self.api_key.trim().is_empty() {
            return Err(PodforgeError::Validation(
                "Missing OpenAI API key for speech generation".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(PodforgeError::Validation(
                "Speech text cannot be empty".to_string(),
            ));
        }
        if voice_id.trim().is_empty() {
            return Err(PodforgeError::Validation(
                "Voice id cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    async fn synthesize_once(
        &self,
        text: &str,
        voice_id: &str,
    ) -> Result<Vec<u8>, PodforgeError> {
        let payload = serde_json::json!({
            "model": self.model.clone(),
            "input": text,
            "voice": voice_id,
            "response_format": "wav",
        });

        let url = format!("{}/audio/speech", trim_trailing_slash(&self.base_url));
        let headers = bearer_headers(&self.api_key);

        with_timeout(self.timeout, async {
            let response = shared_client()
                .post(url)
                .headers(headers)
                .json(&payload)
                .send()
                .await?;

            parse_speech_response(response).await
        })
        .await
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeechProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, PodforgeError> {
        self.validate(text, voice_id)?;
        self.retry_policy
            .execute(|| self.synthesize_once(text, voice_id))
            .await
    }
}

async fn parse_speech_response(response: reqwest::Response) -> Result<Vec<u8>, PodforgeError> {
    let status = response.status().as_u16();
    if status != 200 {
        let body = response.text().await.unwrap_or_default();
        return Err(status_to_error(status, &body));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let body = response.text().await.unwrap_or_default();
        if let Some(message) = extract_openai_error_message(&body) {
            return Err(PodforgeError::provider("openai", message));
        }
        return Err(PodforgeError::InvalidState(
            "Expected audio payload, got JSON response".to_string(),
        ));
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(PodforgeError::InvalidState(
            "Speech response contained empty audio payload".to_string(),
        ));
    }

    Ok(bytes.to_vec())
}

fn extract_openai_error_message(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
        .map(ToString::to_string)
}
