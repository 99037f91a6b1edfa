//! Provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for hosted chat-completion providers
///
/// Implementations give access to a specific service (OpenAI or any
/// OpenAI-compatible endpoint). The advisor only depends on this seam, so
/// tests can substitute a mock provider.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion from the model
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;
}
