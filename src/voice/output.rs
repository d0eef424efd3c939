//! Spoken replies

use async_trait::async_trait;

use super::playback::AudioPlayback;
use super::tts::TextToSpeech;
use crate::{Error, Language, Result};

/// Playback volume for synthesized replies
pub const DEFAULT_VOLUME: f32 = 0.9;

/// Speaks assistant replies aloud
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Speak `text`
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails, or if this output has
    /// no implementation yet
    async fn speak(&self, text: &str) -> Result<()>;

    /// Language this output speaks
    fn language(&self) -> Language;
}

/// English speech: cloud synthesis played on the default output device
pub struct EnglishSpeech {
    tts: TextToSpeech,
}

impl EnglishSpeech {
    #[must_use]
    pub const fn new(tts: TextToSpeech) -> Self {
        Self { tts }
    }
}

#[async_trait]
impl AudioOutput for EnglishSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        tracing::debug!(text, "speaking");
        let mp3 = self.tts.synthesize(text, Language::En.locale()).await?;

        tokio::task::spawn_blocking(move || AudioPlayback::new()?.play_mp3(&mp3, DEFAULT_VOLUME))
            .await
            .map_err(|e| Error::Audio(format!("playback task failed: {e}")))?
    }

    fn language(&self) -> Language {
        Language::En
    }
}

/// Bengali speech output
///
/// No Bengali voice is wired up yet: the text is logged and
/// [`Error::Unsupported`] returned so callers can fall back to showing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct BengaliSpeech;

#[async_trait]
impl AudioOutput for BengaliSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        tracing::info!(text, "Jarvis (Bengali)");
        Err(Error::Unsupported("Bengali speech output".to_string()))
    }

    fn language(&self) -> Language {
        Language::Bn
    }
}

/// One output per conversation language
pub struct Speakers {
    english: Option<EnglishSpeech>,
    bengali: BengaliSpeech,
}

impl Speakers {
    /// Create the speaker set; without English synthesis only logging is possible
    #[must_use]
    pub const fn new(english: Option<EnglishSpeech>) -> Self {
        Self {
            english,
            bengali: BengaliSpeech,
        }
    }

    /// Output for a language, if one is available
    #[must_use]
    pub fn for_language(&self, language: Language) -> Option<&dyn AudioOutput> {
        match language {
            Language::En => self.english.as_ref().map(|e| e as &dyn AudioOutput),
            Language::Bn => Some(&self.bengali),
        }
    }

    /// Speak `text` in `language`
    ///
    /// # Errors
    ///
    /// Returns error if no output exists for the language or speaking fails
    pub async fn speak(&self, text: &str, language: Language) -> Result<()> {
        let output = self.for_language(language).ok_or_else(|| {
            Error::Config("speech output requires GOOGLE_API_KEY".to_string())
        })?;
        output.speak(text).await
    }
}
