//! Chat-completion provider layer for the portfolio advisor
//!
//! This crate defines the minimal surface the advisor needs from a hosted
//! chat-completion API:
//!
//! - [`ChatMessage`] / [`Role`]: plain-text conversation messages
//! - [`CompletionRequest`] / [`CompletionResponse`]: one completion round trip
//! - [`LlmProvider`]: the provider seam, implemented by [`providers::OpenAiProvider`]
//!   for OpenAI and OpenAI-compatible endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use advisor_llm::{CompletionRequest, ChatMessage, LlmProvider};
//! use advisor_llm::providers::OpenAiProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenAiProvider::from_env()?;
//!
//!     let request = CompletionRequest::builder("gpt-4o")
//!         .system("You are a capable financial analyst.")
//!         .add_message(ChatMessage::user("Summarize AAPL's last quarter."))
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.content);
//!     Ok(())
//! }
//! ```

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;

pub use completion::{CompletionRequest, CompletionRequestBuilder, CompletionResponse, TokenUsage};
pub use error::{LlmError, Result};
pub use messages::{ChatMessage, Role};
pub use provider::LlmProvider;
