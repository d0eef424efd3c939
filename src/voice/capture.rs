//! Audio capture from microphone

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use thiserror::Error;

use super::segmenter::{ListenWindow, Segment, SpeechSegmenter};
use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// How often the capture buffer is drained into the segmenter
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why no utterance was captured
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Nobody spoke within the listen window
    #[error("no speech detected")]
    NoSpeech,

    /// The input device could not be opened or failed mid-capture
    #[error("capture device error: {0}")]
    Device(String),
}

/// A source of single spoken utterances
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Capture one utterance as mono samples at [`SAMPLE_RATE`]
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::NoSpeech`] when the window elapses in silence,
    /// [`CaptureError::Device`] on any device fault
    async fn capture(&self, window: ListenWindow) -> std::result::Result<Vec<f32>, CaptureError>;
}

/// Captures audio from the default input device
pub struct AudioCapture {
    config: StreamConfig,
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl AudioCapture {
    /// Create a new audio capture instance
    ///
    /// # Errors
    ///
    /// Returns error if audio device cannot be opened
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable audio config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "audio capture initialized"
        );

        Ok(Self {
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        })
    }

    /// Start capturing audio
    ///
    /// # Errors
    ///
    /// Returns error if capture fails
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let buffer = Arc::clone(&self.buffer);
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device".to_string()))?;

        let stream = device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("audio capture started");
        Ok(())
    }

    /// Stop capturing audio
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("audio capture stopped");
        }
    }

    /// Take the samples captured since the last call
    #[must_use]
    pub fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    /// Get the sample rate
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

/// Default microphone as an [`AudioSource`]
///
/// Each capture opens the device on a blocking thread, segments one
/// utterance, then releases the device.
#[derive(Debug, Default, Clone, Copy)]
pub struct MicrophoneSource;

#[async_trait]
impl AudioSource for MicrophoneSource {
    async fn capture(&self, window: ListenWindow) -> std::result::Result<Vec<f32>, CaptureError> {
        tokio::task::spawn_blocking(move || capture_utterance(window))
            .await
            .map_err(|e| CaptureError::Device(format!("capture task failed: {e}")))?
    }
}

fn capture_utterance(window: ListenWindow) -> std::result::Result<Vec<f32>, CaptureError> {
    let device_err = |e: Error| CaptureError::Device(e.to_string());

    let mut capture = AudioCapture::new().map_err(device_err)?;
    capture.start().map_err(device_err)?;
    tracing::info!("listening...");

    let mut segmenter = SpeechSegmenter::new(window);
    let deadline = Instant::now() + window.max_duration() + Duration::from_secs(1);

    let outcome = loop {
        std::thread::sleep(POLL_INTERVAL);

        match segmenter.process(&capture.take_buffer()) {
            Segment::Complete => break Ok(segmenter.take_speech()),
            Segment::TimedOut => break Err(CaptureError::NoSpeech),
            // The device stopped delivering samples
            Segment::Pending if Instant::now() > deadline => {
                break Err(CaptureError::Device("capture stalled".to_string()));
            }
            Segment::Pending => {}
        }
    };

    capture.stop();
    outcome
}

/// Convert f32 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
