//! Reply generation with localized fallback
//!
//! [`ResponseGenerator`] builds a prompt, queries a [`GenerativeBackend`]
//! under a timeout, and maps every [`BackendFault`] to a fixed apology in the
//! conversation's language via [`fallback_reply`].

mod gemini;
mod prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::Language;

pub use gemini::{DEFAULT_MODEL, GeminiBackend};
pub use prompt::build_prompt;

/// Apology returned for English turns when the backend fails
pub const EN_APOLOGY: &str = "Sorry, I cannot respond right now. Please try again.";

/// Apology returned for Bengali turns when the backend fails
pub const BN_APOLOGY: &str = "দুঃখিত, আমি এখন উত্তর দিতে পারছি না। আবার চেষ্টা করুন।";

/// Default time allowed for one backend round trip
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a backend call produced no reply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendFault {
    /// No usable API credential is configured
    #[error("no API credential configured")]
    MissingCredential,

    /// Request could not be sent or the connection failed
    #[error("network error: {0}")]
    Network(String),

    /// Backend did not answer in time
    #[error("backend timed out after {0:?}")]
    Timeout(Duration),

    /// Backend answered with a non-success status (quota, auth, server error)
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded
    #[error("malformed backend response: {0}")]
    Malformed(String),

    /// Response decoded but carried no text
    #[error("backend returned no text")]
    Empty,
}

/// A text-generation service
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Generate a reply for a complete prompt
    ///
    /// # Errors
    ///
    /// Returns a [`BackendFault`] describing why no text was produced
    async fn generate(&self, prompt: &str) -> Result<String, BackendFault>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Map a backend fault to the user-facing reply for a language
#[must_use]
pub fn fallback_reply(language: Language, fault: &BackendFault) -> &'static str {
    match fault {
        BackendFault::MissingCredential
        | BackendFault::Network(_)
        | BackendFault::Timeout(_)
        | BackendFault::Status { .. }
        | BackendFault::Malformed(_)
        | BackendFault::Empty => apology(language),
    }
}

const fn apology(language: Language) -> &'static str {
    match language {
        Language::En => EN_APOLOGY,
        Language::Bn => BN_APOLOGY,
    }
}

/// Produces assistant replies in the user's language
#[derive(Clone)]
pub struct ResponseGenerator {
    backend: Arc<dyn GenerativeBackend>,
    timeout: Duration,
}

impl ResponseGenerator {
    /// Create a generator with the default timeout
    #[must_use]
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-call timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generate a reply, never failing
    ///
    /// Backend faults are logged and replaced by the localized apology.
    pub async fn reply(&self, user_text: &str, language: Language) -> String {
        match self.try_reply(user_text, language).await {
            Ok(text) => text,
            Err(fault) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    %language,
                    error = %fault,
                    "backend failed, using fallback reply"
                );
                fallback_reply(language, &fault).to_string()
            }
        }
    }

    /// Generate a reply, surfacing the fault instead of falling back
    ///
    /// # Errors
    ///
    /// Returns the [`BackendFault`] when the backend fails, times out or
    /// answers with blank text
    pub async fn try_reply(
        &self,
        user_text: &str,
        language: Language,
    ) -> Result<String, BackendFault> {
        let prompt = build_prompt(user_text, language);
        tracing::debug!(%language, prompt_len = prompt.len(), "querying backend");

        let text = tokio::time::timeout(self.timeout, self.backend.generate(&prompt))
            .await
            .map_err(|_| BackendFault::Timeout(self.timeout))??;

        if text.trim().is_empty() {
            return Err(BackendFault::Empty);
        }

        tracing::debug!(response_len = text.len(), "backend responded");
        Ok(text)
    }
}
