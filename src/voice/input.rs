//! Spoken input with locale fallback
//!
//! [`LocaleChain`] decodes one recording against an ordered list of
//! languages; [`SpeechInput`] adds microphone capture in front of it and
//! turns every failure into a fixed placeholder utterance.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::capture::{AudioSource, CaptureError, SAMPLE_RATE, samples_to_wav};
use super::segmenter::ListenWindow;
use super::stt::{DecodeError, SpeechRecognizer};
use crate::Language;
use crate::conversation::Utterance;
use crate::state::AssistantState;

/// Placeholder when nobody spoke within the listen window
pub const NO_SPEECH_TEXT: &str = "No speech detected";

/// Placeholder when no locale could interpret the audio
pub const UNINTELLIGIBLE_TEXT: &str = "Could not understand audio";

/// Placeholder for device or speech-service faults
pub const LISTEN_ERROR_TEXT: &str = "Error in listening";

/// Decoding priority used unless overridden
pub const DEFAULT_LOCALE_ORDER: [Language; 2] = [Language::Bn, Language::En];

/// Upper bound on a single recognizer call
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(15);

/// Why listening produced no recognized text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenFault {
    #[error("no speech detected")]
    NoSpeech,

    #[error("audio unintelligible in every locale")]
    Unintelligible,

    #[error("capture device error: {0}")]
    Device(String),

    #[error("speech service error: {0}")]
    Service(String),
}

impl From<CaptureError> for ListenFault {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::NoSpeech => Self::NoSpeech,
            CaptureError::Device(msg) => Self::Device(msg),
        }
    }
}

impl From<DecodeError> for ListenFault {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Unintelligible => Self::Unintelligible,
            DecodeError::Service(msg) => Self::Service(msg),
            timeout @ DecodeError::Timeout(_) => Self::Service(timeout.to_string()),
        }
    }
}

/// Map a listen fault to its placeholder text
#[must_use]
pub const fn placeholder_text(fault: &ListenFault) -> &'static str {
    match fault {
        ListenFault::NoSpeech => NO_SPEECH_TEXT,
        ListenFault::Unintelligible => UNINTELLIGIBLE_TEXT,
        ListenFault::Device(_) | ListenFault::Service(_) => LISTEN_ERROR_TEXT,
    }
}

/// Placeholder utterance for a fault (always English)
#[must_use]
pub fn placeholder_utterance(fault: &ListenFault) -> Utterance {
    Utterance::new(placeholder_text(fault), Language::En)
}

/// Ordered locale fallback over a recognizer
pub struct LocaleChain {
    recognizer: Arc<dyn SpeechRecognizer>,
    order: Vec<Language>,
    timeout: Duration,
}

impl LocaleChain {
    /// Chain trying Bengali, then English
    #[must_use]
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            recognizer,
            order: DEFAULT_LOCALE_ORDER.to_vec(),
            timeout: DEFAULT_DECODE_TIMEOUT,
        }
    }

    /// Override the decoding priority
    #[must_use]
    pub fn with_order(mut self, order: Vec<Language>) -> Self {
        self.order = order;
        self
    }

    /// Bound each recognizer call
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Languages in the order they are attempted
    #[must_use]
    pub fn order(&self) -> &[Language] {
        &self.order
    }

    /// Decode the same recording in each language until one succeeds
    ///
    /// `Unintelligible` moves on to the next language; a service fault stops
    /// the chain.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Unintelligible`] if every language was tried
    /// without success, [`DecodeError::Timeout`] if a call outlived the
    /// timeout, or the first [`DecodeError::Service`] encountered
    pub async fn decode(&self, wav: &[u8]) -> Result<Utterance, DecodeError> {
        for &language in &self.order {
            let attempt = self.recognizer.recognize(wav, language.locale());
            let result = tokio::time::timeout(self.timeout, attempt)
                .await
                .map_err(|_| DecodeError::Timeout(self.timeout))?;

            match result {
                Ok(text) => {
                    tracing::info!(%language, text = %text, "recognized speech");
                    return Ok(Utterance::new(text, language));
                }
                Err(DecodeError::Unintelligible) => {
                    tracing::debug!(%language, "unintelligible, trying next locale");
                }
                Err(err) => return Err(err),
            }
        }

        Err(DecodeError::Unintelligible)
    }

    /// Decode a recording, mapping failures to placeholders
    pub async fn transcribe(&self, wav: &[u8]) -> Utterance {
        match self.decode(wav).await {
            Ok(utterance) => utterance,
            Err(err) => {
                let fault = ListenFault::from(err);
                tracing::warn!(
                    error = %fault,
                    recognizer = self.recognizer.name(),
                    "transcription failed"
                );
                placeholder_utterance(&fault)
            }
        }
    }
}

/// Microphone capture followed by locale-fallback decoding
pub struct SpeechInput {
    source: Arc<dyn AudioSource>,
    chain: Arc<LocaleChain>,
    state: Arc<AssistantState>,
    window: ListenWindow,
}

impl SpeechInput {
    #[must_use]
    pub fn new(
        source: Arc<dyn AudioSource>,
        chain: Arc<LocaleChain>,
        state: Arc<AssistantState>,
    ) -> Self {
        Self {
            source,
            chain,
            state,
            window: ListenWindow::default(),
        }
    }

    /// Set the listen window
    #[must_use]
    pub const fn with_window(mut self, window: ListenWindow) -> Self {
        self.window = window;
        self
    }

    /// Capture and decode one utterance, never failing
    ///
    /// Every fault becomes an English placeholder utterance.
    pub async fn listen(&self) -> Utterance {
        match self.try_listen().await {
            Ok(utterance) => utterance,
            Err(fault) => {
                match &fault {
                    ListenFault::NoSpeech | ListenFault::Unintelligible => {
                        tracing::info!(reason = %fault, "nothing recognized");
                    }
                    ListenFault::Device(_) | ListenFault::Service(_) => {
                        tracing::warn!(error = %fault, "listening error");
                    }
                }
                placeholder_utterance(&fault)
            }
        }
    }

    /// Capture and decode one utterance, surfacing the fault
    ///
    /// The shared listening flag is set for the duration of the call.
    ///
    /// # Errors
    ///
    /// Returns the [`ListenFault`] that stopped the attempt
    pub async fn try_listen(&self) -> Result<Utterance, ListenFault> {
        let _listening = self.state.begin_listening();

        let samples = self.source.capture(self.window).await?;
        let wav = samples_to_wav(&samples, SAMPLE_RATE)
            .map_err(|e| ListenFault::Device(e.to_string()))?;

        Ok(self.chain.decode(&wav).await?)
    }
}
