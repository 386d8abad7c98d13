//! Text-completion capability: trait and implementations.

pub mod http;
pub mod openai;

use async_trait::async_trait;

use crate::error::PodforgeError;

pub use openai::OpenAiCompletionProvider;

/// Settings for a single completion request.
#[derive(Debug, Clone, Default)]
pub struct CompletionSettings {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Ask the provider to emit a JSON object rather than prose.
    pub json_response: bool,
}

impl CompletionSettings {
    /// Low-temperature settings for mechanical correction passes.
    pub fn correction() -> Self {
        Self {
            temperature: Some(0.1),
            max_tokens: Some(500),
            json_response: false,
        }
    }

    /// Settings for full script composition.
    pub fn composition() -> Self {
        Self {
            temperature: Some(0.7),
            max_tokens: Some(4096),
            json_response: true,
        }
    }
}

/// Core trait for text-completion providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// Run one completion: system prompt + user text → reply text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        settings: &CompletionSettings,
    ) -> Result<String, PodforgeError>;
}
