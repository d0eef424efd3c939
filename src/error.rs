//! Error types for the Jarvis gateway

use thiserror::Error;

/// Result type alias for Jarvis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the dialogue core
///
/// The dialogue pipeline itself never surfaces these to end users; speech
/// and backend faults are mapped to placeholder or apology text at the
/// boundary (see [`crate::voice::ListenFault`] and
/// [`crate::generator::BackendFault`]).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device or encoding error
    #[error("audio error: {0}")]
    Audio(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Capability that exists as an interface but has no implementation yet
    #[error("not implemented: {0}")]
    Unsupported(String),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
