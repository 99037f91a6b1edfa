//! OpenAI provider implementation
//!
//! Implements [`LlmProvider`] for OpenAI's chat completions endpoint.
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! The endpoint shape is shared by many local and hosted deployments, so the
//! base URL is configurable (`OPENAI_API_BASE`) for OpenAI-compatible APIs.

use crate::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmError, LlmProvider, Result, Role,
    TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment
    ///
    /// Reads the API key from `OPENAI_API_KEY` and, when set, the base URL
    /// from `OPENAI_API_BASE`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            LlmError::ConfigurationError("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let api_base =
            std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_OPENAI_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set a custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// OpenAI chat-completion provider
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Create a provider with custom configuration
    pub fn with_config(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider with an API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAiConfig::new(api_key))
    }

    /// Create a provider from the environment (`OPENAI_API_KEY`, `OPENAI_API_BASE`)
    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAiConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to {}", self.config.api_base);

        let openai_request = OpenAiRequest {
            model: request.model.clone(),
            messages: build_messages(request.system, &request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimitExceeded(error_text),
                400 => LlmError::InvalidRequest(error_text),
                404 => LlmError::ModelNotFound(request.model),
                _ => LlmError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::UnexpectedResponse("No choices in response".to_string()))?;

        debug!(
            "Received response - finish_reason: {}, tokens: {}/{}",
            choice.finish_reason,
            openai_response.usage.prompt_tokens,
            openai_response.usage.completion_tokens
        );

        Ok(CompletionResponse {
            message: ChatMessage::assistant(choice.message.content.unwrap_or_default()),
            usage: TokenUsage {
                input_tokens: openai_response.usage.prompt_tokens,
                output_tokens: openai_response.usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: OpenAiUsage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    #[allow(dead_code)]
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

/// Build the wire message array; the system prompt goes first when present
fn build_messages(system: Option<String>, messages: &[ChatMessage]) -> Vec<OpenAiMessage> {
    let mut result = Vec::with_capacity(messages.len() + 1);

    if let Some(sys) = system {
        result.push(OpenAiMessage {
            role: "system",
            content: sys,
        });
    }

    for msg in messages {
        result.push(OpenAiMessage {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            },
            content: msg.content.clone(),
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = OpenAiProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.config().api_key, "test-key");
        assert_eq!(provider.config().api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_custom_config() {
        let config = OpenAiConfig::new("test-key")
            .with_api_base("http://localhost:8000/v1")
            .with_timeout(60);

        let provider = OpenAiProvider::with_config(config).unwrap();
        assert_eq!(provider.config().api_base, "http://localhost:8000/v1");
        assert_eq!(provider.config().timeout_secs, 60);
    }

    #[test]
    fn test_system_message_goes_first() {
        let messages = vec![ChatMessage::user("Hello")];
        let wire = build_messages(Some("Be helpful".to_string()), &messages);

        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[0].content, "Be helpful");
        assert_eq!(wire[1].role, "user");
    }

    #[test]
    fn test_role_mapping() {
        let messages = vec![
            ChatMessage::system("ground"),
            ChatMessage::assistant("prior analysis"),
            ChatMessage::user("follow-up"),
        ];
        let wire = build_messages(None, &messages);

        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[1].role, "assistant");
        assert_eq!(wire[2].role, "user");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "choices": [
                {
                    "message": {"role": "assistant", "content": "Looks overbought."},
                    "finish_reason": "stop"
                }
            ],
            "usage": {"prompt_tokens": 120, "completion_tokens": 30}
        }"#;

        let parsed: OpenAiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices.len(), 1);
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Looks overbought.")
        );
        assert_eq!(parsed.usage.prompt_tokens, 120);
    }
}
