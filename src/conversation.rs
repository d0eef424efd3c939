//! Utterances, exchanges and the in-memory conversation log

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Language;

/// A piece of user input tagged with its language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
    language: Language,
}

impl Utterance {
    /// Create a new utterance
    #[must_use]
    pub fn new(text: impl Into<String>, language: Language) -> Self {
        Self {
            text: text.into(),
            language,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Split into owned text and language
    #[must_use]
    pub fn into_parts(self) -> (String, Language) {
        (self.text, self.language)
    }
}

/// One completed dialogue turn
///
/// Serialized for the history endpoint as
/// `{user, jarvis, timestamp, language}`.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    #[serde(rename = "user")]
    user_text: String,
    #[serde(rename = "jarvis")]
    assistant_text: String,
    timestamp: DateTime<Utc>,
    language: Language,
}

impl Exchange {
    /// Create a new exchange
    #[must_use]
    pub fn new(
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
        language: Language,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
            timestamp,
            language,
        }
    }

    #[must_use]
    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    #[must_use]
    pub fn assistant_text(&self) -> &str {
        &self.assistant_text
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Append-only record of exchanges in completion order
///
/// `append` takes the write lock, so it is the serialization point for
/// concurrent dialogue turns.
#[derive(Debug, Default)]
pub struct ConversationLog {
    entries: RwLock<Vec<Exchange>>,
}

impl ConversationLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an exchange
    pub fn append(&self, exchange: Exchange) {
        // A panicked writer cannot leave a half-pushed Vec, so the data is still valid
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(exchange);
    }

    /// Stamp and record an exchange under the write lock
    ///
    /// The timestamp is taken after the lock is acquired, so entries stay in
    /// chronological order even when turns finish concurrently. Returns the
    /// timestamp used.
    pub fn append_with(&self, make: impl FnOnce(DateTime<Utc>) -> Exchange) -> DateTime<Utc> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let timestamp = Utc::now();
        entries.push(make(timestamp));
        timestamp
    }

    /// Snapshot of every exchange, oldest first
    #[must_use]
    pub fn all(&self) -> Vec<Exchange> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded exchanges
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
