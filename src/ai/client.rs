//! Chat-completion client. The single point of entry for all external AI
//! calls in Wellspring.
//!
//! Runs in one of two modes:
//! - **mock** (default): deterministic canned replies from [`crate::ai::mock`],
//!   so the service works without an API key.
//! - **live**: calls the chat-completions API with a request timeout, retrying
//!   429 and 5xx responses with exponential backoff.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::mock;
use crate::config::Config;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI service rate limit exceeded, please try again in a moment")]
    RateLimited,

    #[error("AI service credentials were rejected")]
    InvalidCredentials,

    #[error("AI service temporarily unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub total_tokens: i32,
}

impl ChatCompletionResponse {
    /// Text of the first choice, or empty when the provider returned none.
    pub fn text(&self) -> &str {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("")
    }

    pub fn total_tokens(&self) -> i32 {
        self.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0)
    }
}

#[derive(Clone)]
pub struct AiClient {
    http: reqwest::Client,
    api_key: String,
    pub model: String,
    pub mock_mode: bool,
    pub max_tokens: u32,
    temperature: f64,
    max_retries: u32,
}

impl AiClient {
    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.ai_timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            api_key: config.ai_api_key.clone(),
            model: config.ai_model.clone(),
            mock_mode: config.ai_mock_mode,
            max_tokens: config.ai_max_tokens,
            temperature: config.ai_temperature,
            max_retries: config.ai_max_retries,
        }
    }

    /// Run a chat completion. Retries rate-limit (429) and server (5xx)
    /// failures with exponential backoff starting at 1s; other client errors
    /// surface immediately. Provider error bodies are logged, never returned
    /// to callers.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<ChatCompletionResponse, AiError> {
        if self.mock_mode {
            debug!("Mock mode enabled, returning canned completion");
            return Ok(self.mock_completion(messages));
        }

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens,
        };

        let mut last_error: Option<AiError> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                // Backoff: 1s, 2s, 4s, ...
                let delay = std::time::Duration::from_millis(1000 * (1u64 << (attempt - 1)));
                warn!(
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying chat completion"
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .http
                .post(CHAT_COMPLETIONS_URL)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "Chat completion request failed");
                    last_error = Some(AiError::Unavailable);
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "Retryable chat completion failure");
                last_error = Some(if status.as_u16() == 429 {
                    AiError::RateLimited
                } else {
                    AiError::Unavailable
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(status = %status, body = %body, "Chat completion rejected");
                return Err(match status.as_u16() {
                    401 | 403 => AiError::InvalidCredentials,
                    _ => AiError::Unavailable,
                });
            }

            match response.json::<ChatCompletionResponse>().await {
                Ok(parsed) => {
                    debug!(
                        model = %parsed.model,
                        tokens = parsed.total_tokens(),
                        "Chat completion succeeded"
                    );
                    return Ok(parsed);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Chat completion response was not parseable");
                    return Err(AiError::Unavailable);
                }
            }
        }

        Err(last_error.unwrap_or(AiError::Unavailable))
    }

    fn mock_completion(&self, messages: &[ChatMessage]) -> ChatCompletionResponse {
        let user_message = messages
            .iter()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or("");

        ChatCompletionResponse {
            model: "mock-model".into(),
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: mock::canned_reply(user_message).to_string(),
                },
            }],
            usage: Some(Usage { total_tokens: 250 }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_client() -> AiClient {
        AiClient {
            http: reqwest::Client::new(),
            api_key: String::new(),
            model: "gpt-4".into(),
            mock_mode: true,
            max_tokens: 1000,
            temperature: 0.7,
            max_retries: 3,
        }
    }

    #[tokio::test]
    async fn test_mock_completion_is_deterministic() {
        let client = mock_client();
        let messages = vec![
            ChatMessage::system("system prompt"),
            ChatMessage::user("I feel anxious about everything"),
        ];

        let first = client.complete(&messages, 1000).await.unwrap();
        let second = client.complete(&messages, 1000).await.unwrap();

        assert_eq!(first.model, "mock-model");
        assert_eq!(first.total_tokens(), 250);
        assert_eq!(first.text(), second.text());
        assert!(first.text().contains("anxious"));
    }

    #[tokio::test]
    async fn test_mock_completion_without_user_message() {
        let client = mock_client();
        let resp = client
            .complete(&[ChatMessage::system("only system")], 1000)
            .await
            .unwrap();
        // Empty user message falls through to the default canned reply
        assert!(!resp.text().is_empty());
    }
}
