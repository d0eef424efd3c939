//! Configuration management for the Jarvis gateway

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::generator::DEFAULT_MODEL;
use crate::voice::{DEFAULT_DECODE_TIMEOUT, ListenWindow};

/// Key value shipped in the sample `.env`; treated as absent
pub const API_KEY_PLACEHOLDER: &str = "YOUR_GEMINI_API_KEY_HERE";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TTS_RATE: f64 = 1.0;

/// Jarvis gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Google API key for Gemini, Speech-to-Text and Text-to-Speech
    pub google_api_key: Option<SecretString>,

    /// Generative model identifier
    pub model: String,

    /// Host to bind the HTTP server to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Upper bound on a single backend call
    pub backend_timeout: Duration,

    /// Upper bound on a single speech recognition call
    pub speech_timeout: Duration,

    /// Recognition results reported below this confidence count as unintelligible
    pub speech_min_confidence: f32,

    /// Microphone listen window
    pub listen: ListenWindow,

    /// Path to static files directory (web client)
    pub static_dir: Option<PathBuf>,

    /// English speaking rate (0.25 to 4.0)
    pub tts_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            speech_timeout: DEFAULT_DECODE_TIMEOUT,
            speech_min_confidence: 0.0,
            listen: ListenWindow::default(),
            static_dir: None,
            tts_rate: DEFAULT_TTS_RATE,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Unparseable values fall back to their defaults with a warning.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let google_api_key = lookup("GOOGLE_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && k != API_KEY_PLACEHOLDER)
            .map(SecretString::from);

        let model = lookup("JARVIS_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(defaults.model);

        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = parse_or(&lookup, "PORT", defaults.port);

        let backend_timeout = Duration::from_secs(parse_or(
            &lookup,
            "JARVIS_BACKEND_TIMEOUT_SECS",
            DEFAULT_BACKEND_TIMEOUT_SECS,
        ));

        let speech_timeout = Duration::from_secs(parse_or(
            &lookup,
            "JARVIS_SPEECH_TIMEOUT_SECS",
            defaults.speech_timeout.as_secs(),
        ));

        let speech_min_confidence = parse_or(
            &lookup,
            "JARVIS_SPEECH_MIN_CONFIDENCE",
            defaults.speech_min_confidence,
        )
        .clamp(0.0, 1.0);

        let listen = ListenWindow {
            start_timeout: Duration::from_secs(parse_or(
                &lookup,
                "JARVIS_LISTEN_TIMEOUT_SECS",
                defaults.listen.start_timeout.as_secs(),
            )),
            phrase_limit: Duration::from_secs(parse_or(
                &lookup,
                "JARVIS_PHRASE_LIMIT_SECS",
                defaults.listen.phrase_limit.as_secs(),
            )),
        };

        let static_dir = lookup("JARVIS_STATIC_DIR")
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from);

        let tts_rate = parse_or(&lookup, "JARVIS_TTS_RATE", DEFAULT_TTS_RATE).clamp(0.25, 4.0);

        Self {
            google_api_key,
            model,
            host,
            port,
            backend_timeout,
            speech_timeout,
            speech_min_confidence,
            listen,
            static_dir,
            tts_rate,
        }
    }

    /// Whether a usable Google API key is configured
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.google_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Socket address string for the HTTP server
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "invalid value, using default");
            default
        }),
        None => default,
    }
}
