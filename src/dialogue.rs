//! Dialogue coordination
//!
//! Ties reply generation to the conversation log: one call to
//! [`DialogueCoordinator::handle`] is one completed turn.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Language;
use crate::conversation::{Exchange, Utterance};
use crate::generator::ResponseGenerator;
use crate::state::AssistantState;

/// Result of a dialogue turn
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    #[serde(rename = "response")]
    pub assistant_text: String,
    pub language: Language,
    pub timestamp: DateTime<Utc>,
}

/// Assistant status for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub status: &'static str,
    pub is_listening: bool,
    pub conversation_count: usize,
}

/// Runs dialogue turns against the shared assistant state
pub struct DialogueCoordinator {
    generator: ResponseGenerator,
    state: Arc<AssistantState>,
}

impl DialogueCoordinator {
    #[must_use]
    pub const fn new(generator: ResponseGenerator, state: Arc<AssistantState>) -> Self {
        Self { generator, state }
    }

    /// Shared assistant state
    #[must_use]
    pub const fn state(&self) -> &Arc<AssistantState> {
        &self.state
    }

    /// Handle one turn: generate a reply, record it, return it
    ///
    /// Never fails; backend faults arrive here already replaced by the
    /// localized apology.
    pub async fn handle(&self, user_text: &str, language: Language) -> Reply {
        tracing::info!(%language, input_len = user_text.len(), "handling dialogue turn");

        let assistant_text = self.generator.reply(user_text, language).await;

        let timestamp = self.state.log().append_with(|timestamp| {
            Exchange::new(user_text, assistant_text.clone(), language, timestamp)
        });

        Reply {
            assistant_text,
            language,
            timestamp,
        }
    }

    /// Handle an utterance produced by speech input or direct entry
    pub async fn handle_utterance(&self, utterance: &Utterance) -> Reply {
        self.handle(utterance.text(), utterance.language()).await
    }

    /// Current status snapshot
    #[must_use]
    pub fn status(&self) -> Status {
        Status {
            status: "active",
            is_listening: self.state.is_listening(),
            conversation_count: self.state.log().count(),
        }
    }
}
