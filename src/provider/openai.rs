//! OpenAI Chat Completions provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http::{bearer_headers, shared_client, status_to_error, trim_trailing_slash};
use super::{CompletionProvider, CompletionSettings};
use crate::error::PodforgeError;
use crate::util::retry::RetryPolicy;
use crate::util::timeout::with_timeout;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI chat-completions adapter (`/chat/completions`).
#[derive(Debug, Clone)]
pub struct OpenAiCompletionProvider {
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl OpenAiCompletionProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn new_with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
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

    fn validate(&self, user_text: &str) -> Result<(), PodforgeError> {
        if self.api_key.trim().is_empty() {
            return Err(PodforgeError::Validation(
                "Missing OpenAI API key for text completion".to_string(),
            ));
        }
        if user_text.trim().is_empty() {
            return Err(PodforgeError::Validation(
                "Completion input cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn build_request_body(
        &self,
        system_prompt: &str,
        user_text: &str,
        settings: &CompletionSettings,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model.clone(),
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_text},
            ],
        });

        let obj = body.as_object_mut().unwrap();
        if let Some(max) = settings.max_tokens {
            obj.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = settings.temperature {
            obj.insert("temperature".into(), temp.into());
        }
        if settings.json_response {
            obj.insert(
                "response_format".into(),
                serde_json::json!({"type": "json_object"}),
            );
        }

        body
    }

    async fn complete_once(
        &self,
        system_prompt: &str,
        user_text: &str,
        settings: &CompletionSettings,
    ) -> Result<String, PodforgeError> {
        let body = self.build_request_body(system_prompt, user_text, settings);
        let url = format!(
            "{}/chat/completions",
            trim_trailing_slash(&self.base_url)
        );

        debug!(model = %self.model, "OpenAI completion request");

        with_timeout(self.timeout, async {
            let response = shared_client()
                .post(url)
                .headers(bearer_headers(&self.api_key))
                .json(&body)
                .send()
                .await?;

            let status = response.status().as_u16();
            if status != 200 {
                let body_text = response.text().await.unwrap_or_default();
                return Err(status_to_error(status, &body_text));
            }

            let data: OpenAiChatResponse = response.json().await?;
            let choice = data
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| PodforgeError::api(200, "No choices in OpenAI response"))?;

            Ok(choice.message.content.unwrap_or_default())
        })
        .await
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        settings: &CompletionSettings,
    ) -> Result<String, PodforgeError> {
        self.validate(user_text)?;
        self.retry_policy
            .execute(|| self.complete_once(system_prompt, user_text, settings))
            .await
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChatMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatMessage {
    content: Option<String>,
}
