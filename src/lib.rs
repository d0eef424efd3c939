//! Jarvis Gateway - Bilingual voice and text assistant
//!
//! This library provides the core functionality for the Jarvis assistant:
//! - Speech input with Bengali-then-English locale fallback
//! - Reply generation via a generative-language backend (Gemini)
//! - In-memory conversation history
//! - HTTP API and spoken output
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Interfaces                        │
//! │   Microphone + Speakers  │  HTTP API  │  Web client │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                Dialogue Pipeline                     │
//! │  SpeechInput  │  DialogueCoordinator  │  Log/State  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Google Cloud                         │
//! │   Gemini  │  Speech-to-Text  │  Text-to-Speech      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod conversation;
pub mod dialogue;
pub mod error;
pub mod generator;
pub mod language;
pub mod state;
pub mod voice;

pub use config::Config;
pub use conversation::{ConversationLog, Exchange, Utterance};
pub use dialogue::{DialogueCoordinator, Reply, Status};
pub use error::{Error, Result};
pub use generator::{BackendFault, GeminiBackend, GenerativeBackend, ResponseGenerator};
pub use language::Language;
pub use state::AssistantState;
