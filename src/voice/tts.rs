//! Text-to-speech (TTS) processing

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const GOOGLE_TTS_BASE_URL: &str = "https://texttospeech.googleapis.com/v1";

/// Synthesizes speech from text via Google Cloud Text-to-Speech
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    speaking_rate: f64,
    base_url: String,
}

impl TextToSpeech {
    /// Create a new TTS instance
    ///
    /// # Errors
    ///
    /// Returns error if API key is empty
    pub fn new(api_key: SecretString, speaking_rate: f64) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("Google API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            speaking_rate,
            base_url: GOOGLE_TTS_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Synthesize text to speech
    ///
    /// Returns MP3 bytes.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str, locale: &str) -> Result<Vec<u8>> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SynthesizeRequest<'a> {
            input: SynthesisInput<'a>,
            voice: VoiceSelection<'a>,
            audio_config: AudioConfig,
        }

        #[derive(Serialize)]
        struct SynthesisInput<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct VoiceSelection<'a> {
            language_code: &'a str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct AudioConfig {
            audio_encoding: &'static str,
            speaking_rate: f64,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct SynthesizeResponse {
            audio_content: String,
        }

        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: locale,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: self.speaking_rate,
            },
        };

        let response = self
            .client
            .post(format!("{}/text:synthesize", self.base_url))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("Google TTS error {status}: {body}")));
        }

        let result: SynthesizeResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        BASE64
            .decode(result.audio_content)
            .map_err(|e| Error::Tts(format!("invalid audio content: {e}")))
    }
}
