//! Speech-to-text (STT) processing

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const GOOGLE_SPEECH_BASE_URL: &str = "https://speech.googleapis.com/v1";

/// Why a decoding attempt produced no text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Audio was received but could not be interpreted in this locale
    #[error("could not interpret audio content")]
    Unintelligible,

    /// The recognizer itself failed (network, credential, quota)
    #[error("speech service error: {0}")]
    Service(String),

    /// The recognizer did not answer in time
    #[error("speech service timed out after {0:?}")]
    Timeout(Duration),
}

/// Decodes recorded speech in a given locale
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Decode WAV audio as speech in `locale` (BCP-47, e.g. `bn-IN`)
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Unintelligible`] for low-confidence or empty
    /// results, [`DecodeError::Service`] for anything else
    async fn recognize(&self, wav: &[u8], locale: &str) -> Result<String, DecodeError>;

    /// Recognizer name for logging
    fn name(&self) -> &'static str;
}

/// Google Cloud Speech-to-Text `speech:recognize` client
pub struct GoogleSpeechRecognizer {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    min_confidence: f32,
}

impl GoogleSpeechRecognizer {
    /// Create a recognizer
    ///
    /// A missing key makes every call a [`DecodeError::Service`].
    #[must_use]
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: GOOGLE_SPEECH_BASE_URL.to_string(),
            min_confidence: 0.0,
        }
    }

    /// Point the client at a different API root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Treat results whose reported confidence is below `threshold` as unintelligible
    #[must_use]
    pub const fn with_min_confidence(mut self, threshold: f32) -> Self {
        self.min_confidence = threshold;
        self
    }
}

#[async_trait]
impl SpeechRecognizer for GoogleSpeechRecognizer {
    async fn recognize(&self, wav: &[u8], locale: &str) -> Result<String, DecodeError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| DecodeError::Service("no API credential configured".to_string()))?;

        tracing::debug!(audio_bytes = wav.len(), locale, "starting transcription");

        let request = RecognizeRequest {
            config: RecognitionConfig {
                language_code: locale,
                enable_automatic_punctuation: true,
            },
            audio: RecognitionAudio {
                content: BASE64.encode(wav),
            },
        };

        let response = self
            .client
            .post(format!("{}/speech:recognize", self.base_url))
            .query(&[("key", api_key.expose_secret())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e.without_url(), "speech request failed");
                DecodeError::Service("speech request failed".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "speech API error");
            return Err(DecodeError::Service(format!("speech API error {status}")));
        }

        let result: RecognizeResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e.without_url(), "failed to parse speech response");
            DecodeError::Service("malformed speech response".to_string())
        })?;

        let transcript = result.best_transcript(self.min_confidence)?;
        tracing::debug!(locale, transcript = %transcript, "transcription complete");
        Ok(transcript)
    }

    fn name(&self) -> &'static str {
        "google-speech"
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    language_code: &'a str,
    enable_automatic_punctuation: bool,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
    confidence: Option<f32>,
}

impl RecognizeResponse {
    /// Join the top alternative of each result segment
    fn best_transcript(self, min_confidence: f32) -> Result<String, DecodeError> {
        let mut transcript = String::new();

        let top = self
            .results
            .into_iter()
            .filter_map(|r| r.alternatives.into_iter().next());

        for alternative in top {
            // Google reports 0.0 when confidence was not computed
            if alternative
                .confidence
                .is_some_and(|c| c > 0.0 && c < min_confidence)
            {
                return Err(DecodeError::Unintelligible);
            }
            transcript.push_str(&alternative.transcript);
        }

        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(DecodeError::Unintelligible);
        }
        Ok(transcript.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RecognizeResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_response_is_unintelligible() {
        assert_eq!(
            parse("{}").best_transcript(0.0),
            Err(DecodeError::Unintelligible)
        );
    }

    #[test]
    fn test_segments_are_joined() {
        let response = parse(
            r#"{"results": [
                {"alternatives": [{"transcript": "hello", "confidence": 0.9}]},
                {"alternatives": [{"transcript": " world", "confidence": 0.8}]}
            ]}"#,
        );
        assert_eq!(response.best_transcript(0.0).as_deref(), Ok("hello world"));
    }

    #[test]
    fn test_low_confidence_is_unintelligible() {
        let json = r#"{"results": [{"alternatives": [{"transcript": "হ্যালো", "confidence": 0.2}]}]}"#;

        assert_eq!(parse(json).best_transcript(0.5), Err(DecodeError::Unintelligible));
        assert_eq!(parse(json).best_transcript(0.0).as_deref(), Ok("হ্যালো"));
    }

    #[test]
    fn test_request_wire_format() {
        let request = RecognizeRequest {
            config: RecognitionConfig {
                language_code: "bn-IN",
                enable_automatic_punctuation: true,
            },
            audio: RecognitionAudio {
                content: BASE64.encode(b"RIFF"),
            },
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["config"]["languageCode"], "bn-IN");
        assert_eq!(json["config"]["enableAutomaticPunctuation"], true);
        assert_eq!(json["audio"]["content"], "UklGRg==");
    }

    #[tokio::test]
    async fn test_missing_key_is_service_error() {
        let recognizer = GoogleSpeechRecognizer::new(None);
        let result = recognizer.recognize(b"RIFF", "en-US").await;
        assert!(matches!(result, Err(DecodeError::Service(_))));
    }
}
