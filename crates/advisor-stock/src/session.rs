//! Session state and the page machine driving the workflow
//!
//! The workflow walks a fixed page chain: pick symbols, fetch and inspect
//! data, pick a persona, run the analysis, chat about it. Transitions are
//! checked against an explicit table; anything off the table is rejected
//! rather than silently coerced.

use crate::error::{AdvisorError, Result};
use crate::model::SymbolAnalysisRecord;
use crate::prompts::Persona;
use crate::store::Holding;
use advisor_llm::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

/// Pages of the analysis workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    /// Manage favorites and holdings
    SelectStocks,
    /// Fetch prices, indicators and financials; inspect the data
    DataAnalysis,
    /// Pick the investor persona
    SelectInvestor,
    /// Run (or review) the AI analysis
    AiAnalysis,
    /// Follow-up chat grounded in the analysis
    AiChat,
}

impl Page {
    /// Whether moving from `self` to `to` is on the transition table
    ///
    /// Forward moves follow the chain one page at a time. Backward moves are
    /// limited to re-running the analysis (`AiAnalysis` back to
    /// `DataAnalysis` or `SelectInvestor`) and leaving the chat
    /// (`AiChat` back to `AiAnalysis`). Any page may jump to
    /// `SelectStocks`, which is the reset path.
    pub fn can_transition_to(self, to: Page) -> bool {
        if to == Page::SelectStocks {
            return true;
        }
        matches!(
            (self, to),
            (Page::SelectStocks, Page::DataAnalysis)
                | (Page::DataAnalysis, Page::SelectInvestor)
                | (Page::SelectInvestor, Page::AiAnalysis)
                | (Page::AiAnalysis, Page::AiChat)
                | (Page::AiAnalysis, Page::DataAnalysis)
                | (Page::AiAnalysis, Page::SelectInvestor)
                | (Page::AiChat, Page::AiAnalysis)
        )
    }
}

/// All state of one interactive session
///
/// Favorites and holdings are copied out of the preference store when a run
/// begins; `records` is rebuilt on every pass through the data page and the
/// cached `analysis` survives until the session resets or re-runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub page: Page,
    pub favorites: Vec<String>,
    pub holdings: Vec<Holding>,
    /// Per-symbol fetch results of the current run, keyed by symbol
    pub records: BTreeMap<String, SymbolAnalysisRecord>,
    pub persona: Option<Persona>,
    /// Concatenated analysis text, present once a run completed
    pub analysis: Option<String>,
    /// Follow-up turns, alternating user and assistant
    pub chat_history: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session on the stock selection page
    pub fn new(favorites: Vec<String>, holdings: Vec<Holding>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            page: Page::SelectStocks,
            favorites,
            holdings,
            records: BTreeMap::new(),
            persona: None,
            analysis: None,
            chat_history: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }

    /// Move to another page, enforcing the transition table
    ///
    /// A move to `SelectStocks` resets all run state. Leaving the chat page
    /// clears the chat history; the cached analysis stays until the run
    /// itself is discarded.
    pub fn goto(&mut self, to: Page) -> Result<()> {
        if !self.page.can_transition_to(to) {
            return Err(AdvisorError::InvalidTransition {
                from: self.page,
                to,
            });
        }
        debug!(session_id = %self.id, from = ?self.page, to = ?to, "page transition");

        if to == Page::SelectStocks {
            self.reset();
        } else {
            if self.page == Page::AiChat {
                self.chat_history.clear();
            }
            // Re-running invalidates the cached analysis
            if self.page == Page::AiAnalysis && to != Page::AiChat {
                self.analysis = None;
            }
            self.page = to;
        }
        self.touch();
        Ok(())
    }

    /// Discard all run state and return to the stock selection page
    pub fn reset(&mut self) {
        self.page = Page::SelectStocks;
        self.records.clear();
        self.persona = None;
        self.analysis = None;
        self.chat_history.clear();
        self.touch();
    }

    /// Start a new fetch pass: clear stale records and any prior analysis
    pub fn begin_run(&mut self) {
        self.records.clear();
        self.analysis = None;
        self.chat_history.clear();
        self.touch();
    }

    /// The deduplicated symbol universe of this session, favorites first
    pub fn symbols(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for symbol in self
            .favorites
            .iter()
            .chain(self.holdings.iter().map(|h| &h.symbol))
        {
            if !seen.contains(symbol) {
                seen.push(symbol.clone());
            }
        }
        seen
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn holding(symbol: &str) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            quantity: 1,
            price: 10.0,
            purchase_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        }
    }

    #[test]
    fn test_forward_chain() {
        let mut session = Session::new(vec!["AAPL".to_string()], vec![]);
        assert_eq!(session.page, Page::SelectStocks);

        session.goto(Page::DataAnalysis).unwrap();
        session.goto(Page::SelectInvestor).unwrap();
        session.goto(Page::AiAnalysis).unwrap();
        session.goto(Page::AiChat).unwrap();
        assert_eq!(session.page, Page::AiChat);
    }

    #[test]
    fn test_skipping_pages_is_rejected() {
        let mut session = Session::new(vec![], vec![]);
        let err = session.goto(Page::AiAnalysis).unwrap_err();
        assert!(matches!(
            err,
            AdvisorError::InvalidTransition {
                from: Page::SelectStocks,
                to: Page::AiAnalysis
            }
        ));
        assert_eq!(session.page, Page::SelectStocks);
    }

    #[test]
    fn test_chat_cannot_jump_backward_past_analysis() {
        let mut session = Session::new(vec![], vec![]);
        session.page = Page::AiChat;
        assert!(session.goto(Page::DataAnalysis).is_err());
        assert!(session.goto(Page::AiAnalysis).is_ok());
    }

    #[test]
    fn test_rerun_paths_from_analysis() {
        let mut session = Session::new(vec![], vec![]);
        session.page = Page::AiAnalysis;
        session.analysis = Some("done".to_string());

        session.goto(Page::SelectInvestor).unwrap();
        assert_eq!(session.page, Page::SelectInvestor);
        assert!(session.analysis.is_none(), "re-run discards cached analysis");
    }

    #[test]
    fn test_reset_from_any_page() {
        for page in [
            Page::SelectStocks,
            Page::DataAnalysis,
            Page::SelectInvestor,
            Page::AiAnalysis,
            Page::AiChat,
        ] {
            let mut session = Session::new(vec!["AAPL".to_string()], vec![]);
            session.page = page;
            session.persona = Some(Persona::WarrenBuffett);
            session.analysis = Some("text".to_string());
            session.chat_history.push(ChatMessage::user("hi"));

            session.goto(Page::SelectStocks).unwrap();
            assert_eq!(session.page, Page::SelectStocks);
            assert!(session.persona.is_none());
            assert!(session.analysis.is_none());
            assert!(session.chat_history.is_empty());
        }
    }

    #[test]
    fn test_leaving_chat_clears_history_keeps_analysis() {
        let mut session = Session::new(vec![], vec![]);
        session.page = Page::AiChat;
        session.analysis = Some("text".to_string());
        session.chat_history.push(ChatMessage::user("hi"));

        session.goto(Page::AiAnalysis).unwrap();
        assert!(session.chat_history.is_empty());
        assert_eq!(session.analysis.as_deref(), Some("text"));
    }

    #[test]
    fn test_symbol_universe_deduplicates() {
        let session = Session::new(
            vec!["AAPL".to_string(), "MSFT".to_string()],
            vec![holding("MSFT"), holding("NVDA")],
        );
        assert_eq!(session.symbols(), vec!["AAPL", "MSFT", "NVDA"]);
    }
}
