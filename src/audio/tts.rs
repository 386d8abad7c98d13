//! Text-to-speech trait.

use async_trait::async_trait;

use crate::error::PodforgeError;

/// Trait for text-to-speech providers.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// Synthesize speech audio for one piece of text with one voice.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, PodforgeError>;
}
