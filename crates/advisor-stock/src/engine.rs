//! Analysis engine: runs the batched persona analysis and the follow-up chat
//!
//! The engine owns the model provider; all session state stays in [`Session`].
//! An analysis run is idempotent per session: once the concatenated text is
//! cached, re-invoking the run returns it without touching the provider.

use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::prompts::{self, Persona, CHAT_SYSTEM_TEXT};
use crate::session::Session;
use advisor_llm::{ChatMessage, CompletionRequest, LlmProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives model-backed analysis and chat for sessions
pub struct AdvisorEngine {
    provider: Arc<dyn LlmProvider>,
    config: AdvisorConfig,
}

impl AdvisorEngine {
    /// Create an engine over a model provider
    pub fn new(provider: Arc<dyn LlmProvider>, config: AdvisorConfig) -> Self {
        Self { provider, config }
    }

    /// Run the batched analysis for a session, or return the cached text
    ///
    /// Batches are sent sequentially in symbol order. A failing batch is
    /// substituted with an inline error marker so the surviving batches
    /// still render; the concatenation is cached on the session.
    pub async fn run_analysis(&self, session: &mut Session) -> Result<String> {
        if let Some(cached) = &session.analysis {
            debug!(session_id = %session.id, "returning cached analysis");
            return Ok(cached.clone());
        }

        let persona = session.persona.unwrap_or(Persona::GenericAnalyst);
        let batch_prompts = prompts::build_batch_prompts(&session.records, self.config.batch_size);

        info!(
            session_id = %session.id,
            persona = persona.label(),
            batches = batch_prompts.len(),
            "running analysis"
        );

        let mut sections = Vec::with_capacity(batch_prompts.len());
        for (index, prompt) in batch_prompts.iter().enumerate() {
            match self.complete_batch(persona, prompt).await {
                Ok(text) => sections.push(text),
                Err(e) => {
                    warn!(session_id = %session.id, batch = index, error = %e, "batch failed");
                    sections.push(format!("[analysis failed for this batch: {e}]"));
                }
            }
        }

        let analysis = sections.join("\n\n");
        session.analysis = Some(analysis.clone());
        Ok(analysis)
    }

    /// One follow-up chat turn grounded in the completed analysis
    ///
    /// Every turn re-seeds the conversation with the analysis text as the
    /// opening assistant message, followed by the accumulated history and
    /// the new user input. Both sides of the turn are appended to the
    /// session's history on success. Fails without issuing a request when
    /// no analysis has been run yet.
    pub async fn chat(&self, session: &mut Session, input: &str) -> Result<String> {
        let Some(analysis) = session.analysis.clone() else {
            return Err(AdvisorError::MissingAnalysis);
        };

        let mut messages = Vec::with_capacity(session.chat_history.len() + 2);
        messages.push(ChatMessage::assistant(analysis));
        messages.extend(session.chat_history.iter().cloned());
        messages.push(ChatMessage::user(input));

        let mut builder = CompletionRequest::builder(&self.config.model)
            .system(CHAT_SYSTEM_TEXT)
            .messages(messages)
            .max_tokens(self.config.max_tokens);
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }

        let response = self.provider.complete(builder.build()).await?;
        let reply = response.message.content.clone();

        session.chat_history.push(ChatMessage::user(input));
        session.chat_history.push(ChatMessage::assistant(&reply));
        Ok(reply)
    }

    async fn complete_batch(&self, persona: Persona, prompt: &str) -> Result<String> {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .system(persona.system_text())
            .add_message(ChatMessage::user(prompt))
            .max_tokens(self.config.max_tokens);
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }

        let response = self.provider.complete(builder.build()).await?;
        Ok(response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorBar;
    use crate::model::{Financials, SymbolAnalysisRecord};
    use advisor_llm::{CompletionResponse, LlmError, TokenUsage};
    use chrono::NaiveDate;
    use mockall::mock;
    use mockall::predicate::function;

    mock! {
        Provider {}

        #[async_trait::async_trait]
        impl LlmProvider for Provider {
            async fn complete(
                &self,
                request: CompletionRequest,
            ) -> advisor_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    fn response(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: ChatMessage::assistant(text),
            usage: TokenUsage::default(),
        }
    }

    fn record(symbol: &str) -> SymbolAnalysisRecord {
        SymbolAnalysisRecord {
            symbol: symbol.to_string(),
            is_favorite: true,
            is_holding: false,
            holding: None,
            bars: vec![IndicatorBar {
                date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                close: 100.0,
                ..IndicatorBar::default()
            }],
            financials: Financials::default(),
        }
    }

    fn session_with(symbols: &[&str]) -> Session {
        let mut session = Session::new(symbols.iter().map(|s| s.to_string()).collect(), vec![]);
        for symbol in symbols {
            session.records.insert(symbol.to_string(), record(symbol));
        }
        session.persona = Some(Persona::WarrenBuffett);
        session
    }

    fn engine(provider: MockProvider) -> AdvisorEngine {
        AdvisorEngine::new(Arc::new(provider), AdvisorConfig::default())
    }

    #[tokio::test]
    async fn test_one_request_per_batch() {
        // Six symbols at the default batch size of five makes two batches.
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(2)
            .returning(|_| Ok(response("batch text")));

        let mut session = session_with(&["AAPL", "AMZN", "GOOG", "MSFT", "NVDA", "TSLA"]);
        let analysis = engine(provider).run_analysis(&mut session).await.unwrap();

        assert_eq!(analysis, "batch text\n\nbatch text");
        assert_eq!(session.analysis.as_deref(), Some("batch text\n\nbatch text"));
    }

    #[tokio::test]
    async fn test_rerun_uses_cache_without_provider_calls() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(1)
            .returning(|_| Ok(response("first run")));

        let engine = engine(provider);
        let mut session = session_with(&["AAPL"]);

        let first = engine.run_analysis(&mut session).await.unwrap();
        let second = engine.run_analysis(&mut session).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_batch_is_inlined_not_fatal() {
        let mut provider = MockProvider::new();
        let mut calls = 0;
        provider.expect_complete().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(LlmError::RateLimitExceeded("throttled".to_string()))
            } else {
                Ok(response("second batch"))
            }
        });

        let mut session = session_with(&["AAPL", "AMZN", "GOOG", "MSFT", "NVDA", "TSLA"]);
        let analysis = engine(provider).run_analysis(&mut session).await.unwrap();

        assert!(analysis.starts_with("[analysis failed for this batch:"));
        assert!(analysis.ends_with("second batch"));
    }

    #[tokio::test]
    async fn test_analysis_uses_persona_system_text() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .with(function(|req: &CompletionRequest| {
                req.system
                    .as_deref()
                    .is_some_and(|s| s.contains("Warren Buffett"))
            }))
            .times(1)
            .returning(|_| Ok(response("ok")));

        let mut session = session_with(&["AAPL"]);
        engine(provider).run_analysis(&mut session).await.unwrap();
    }

    #[tokio::test]
    async fn test_chat_reseeds_with_analysis() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .with(function(|req: &CompletionRequest| {
                req.system.as_deref() == Some(CHAT_SYSTEM_TEXT)
                    && req.messages.first().is_some_and(|m| m.content == "the analysis")
                    && req.messages.last().is_some_and(|m| m.content == "what about AAPL?")
            }))
            .times(1)
            .returning(|_| Ok(response("AAPL looks fine")));

        let mut session = session_with(&["AAPL"]);
        session.analysis = Some("the analysis".to_string());

        let reply = engine(provider)
            .chat(&mut session, "what about AAPL?")
            .await
            .unwrap();

        assert_eq!(reply, "AAPL looks fine");
        assert_eq!(session.chat_history.len(), 2);
        assert_eq!(session.chat_history[0].content, "what about AAPL?");
        assert_eq!(session.chat_history[1].content, "AAPL looks fine");
    }

    #[tokio::test]
    async fn test_chat_accumulates_history() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(2)
            .returning(|_| Ok(response("reply")));

        let engine = engine(provider);
        let mut session = session_with(&["AAPL"]);
        session.analysis = Some("the analysis".to_string());

        engine.chat(&mut session, "first").await.unwrap();
        engine.chat(&mut session, "second").await.unwrap();
        assert_eq!(session.chat_history.len(), 4);
    }

    #[tokio::test]
    async fn test_chat_without_analysis_is_rejected() {
        // No expectations set: any provider call would panic the mock.
        let provider = MockProvider::new();

        let mut session = session_with(&["AAPL"]);
        assert!(session.analysis.is_none());

        let err = engine(provider).chat(&mut session, "hi").await.unwrap_err();
        assert!(matches!(err, AdvisorError::MissingAnalysis));
        assert!(session.chat_history.is_empty());
    }

    #[tokio::test]
    async fn test_failed_chat_turn_leaves_history_untouched() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(1)
            .returning(|_| Err(LlmError::RateLimitExceeded("throttled".to_string())));

        let mut session = session_with(&["AAPL"]);
        session.analysis = Some("the analysis".to_string());

        assert!(engine(provider).chat(&mut session, "hi").await.is_err());
        assert!(session.chat_history.is_empty());
    }
}
