//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use jarvis_gateway::voice::{
    AudioSource, CaptureError, DecodeError, ListenWindow, LocaleChain, SAMPLE_RATE,
    SpeechRecognizer,
};
use jarvis_gateway::{
    AssistantState, BackendFault, DialogueCoordinator, GenerativeBackend, ResponseGenerator,
};

/// Backend that answers with a fixed prefix and the prompt length
pub struct EchoBackend {
    pub calls: AtomicUsize,
}

impl EchoBackend {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GenerativeBackend for EchoBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("reply to {} chars", prompt.chars().count()))
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

/// Backend that always fails with the given fault
pub struct FailingBackend(pub BackendFault);

#[async_trait]
impl GenerativeBackend for FailingBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, BackendFault> {
        Err(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Recognizer with a canned answer per locale; other locales are unintelligible
pub struct CannedRecognizer {
    answers: HashMap<&'static str, Result<String, DecodeError>>,
    pub calls: AtomicUsize,
}

impl CannedRecognizer {
    pub fn new(answers: Vec<(&'static str, Result<String, DecodeError>)>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for CannedRecognizer {
    async fn recognize(&self, _wav: &[u8], locale: &str) -> Result<String, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(locale)
            .cloned()
            .unwrap_or(Err(DecodeError::Unintelligible))
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

/// Recognizer that never answers
pub struct StalledRecognizer;

#[async_trait]
impl SpeechRecognizer for StalledRecognizer {
    async fn recognize(&self, _wav: &[u8], _locale: &str) -> Result<String, DecodeError> {
        std::future::pending().await
    }

    fn name(&self) -> &'static str {
        "stalled"
    }
}

/// Audio source that hands back a fixed capture result
pub struct FixedSource(pub Result<Vec<f32>, CaptureError>);

#[async_trait]
impl AudioSource for FixedSource {
    async fn capture(&self, _window: ListenWindow) -> Result<Vec<f32>, CaptureError> {
        self.0.clone()
    }
}

/// Audio source that reports whether the listening flag was set during capture
pub struct ObservingSource {
    pub state: Arc<AssistantState>,
    pub saw_listening: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl AudioSource for ObservingSource {
    async fn capture(&self, _window: ListenWindow) -> Result<Vec<f32>, CaptureError> {
        self.saw_listening
            .store(self.state.is_listening(), Ordering::SeqCst);
        Ok(generate_sine_samples(220.0, 0.5, 0.3))
    }
}

/// Coordinator over a fresh state and the given backend
pub fn build_coordinator(backend: Arc<dyn GenerativeBackend>) -> Arc<DialogueCoordinator> {
    let generator = ResponseGenerator::new(backend);
    Arc::new(DialogueCoordinator::new(
        generator,
        Arc::new(AssistantState::new()),
    ))
}

/// Locale chain over a canned recognizer
pub fn canned_chain(answers: Vec<(&'static str, Result<String, DecodeError>)>) -> Arc<LocaleChain> {
    Arc::new(LocaleChain::new(Arc::new(CannedRecognizer::new(answers))))
}

/// Generate sine wave audio samples
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}
