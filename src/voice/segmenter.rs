//! Utterance segmentation
//!
//! Splits a live microphone stream into a single utterance using local
//! energy detection: wait (bounded) for speech to start, then accumulate
//! until trailing silence or the phrase limit.

use std::time::Duration;

use super::SAMPLE_RATE;

/// Minimum audio energy threshold to consider speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum duration of speech to count as an utterance (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Trailing silence that ends an utterance (in samples)
const TRAILING_SILENCE_SAMPLES: usize = 12800; // 0.8 seconds

/// Bounds on a single listen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenWindow {
    /// How long to wait for speech to start
    pub start_timeout: Duration,
    /// Maximum length of the captured utterance
    pub phrase_limit: Duration,
}

impl Default for ListenWindow {
    fn default() -> Self {
        Self {
            start_timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(10),
        }
    }
}

impl ListenWindow {
    /// Upper bound on how long a capture may run
    #[must_use]
    pub fn max_duration(&self) -> Duration {
        self.start_timeout + self.phrase_limit
    }
}

#[allow(clippy::cast_possible_truncation)]
fn duration_samples(duration: Duration) -> usize {
    (duration.as_millis() * u128::from(SAMPLE_RATE) / 1000) as usize
}

/// Segmenter phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// No speech yet
    Waiting,
    /// Speech started, accumulating
    Speaking,
}

/// Outcome of feeding a chunk of audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Keep feeding audio
    Pending,
    /// An utterance is ready in the buffer
    Complete,
    /// Speech never started within the window
    TimedOut,
}

/// Detects the start and end of one spoken utterance
pub struct SpeechSegmenter {
    start_limit: usize,
    phrase_limit: usize,
    state: SegmenterState,
    speech_buffer: Vec<f32>,
    silence_counter: usize,
    waited: usize,
}

impl SpeechSegmenter {
    #[must_use]
    pub fn new(window: ListenWindow) -> Self {
        Self {
            start_limit: duration_samples(window.start_timeout),
            phrase_limit: duration_samples(window.phrase_limit),
            state: SegmenterState::Waiting,
            speech_buffer: Vec::new(),
            silence_counter: 0,
            waited: 0,
        }
    }

    /// Feed captured samples
    pub fn process(&mut self, samples: &[f32]) -> Segment {
        let energy = calculate_energy(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            SegmenterState::Waiting => {
                if is_speech {
                    self.state = SegmenterState::Speaking;
                    self.speech_buffer.clear();
                    self.speech_buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                } else {
                    self.waited += samples.len();
                    if self.waited >= self.start_limit {
                        tracing::debug!(waited = self.waited, "no speech before timeout");
                        return Segment::TimedOut;
                    }
                }
            }
            SegmenterState::Speaking => {
                self.speech_buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.speech_buffer.len() >= self.phrase_limit {
                    tracing::debug!(samples = self.speech_buffer.len(), "phrase limit reached");
                    return Segment::Complete;
                }

                if self.silence_counter > TRAILING_SILENCE_SAMPLES {
                    let spoken = self.speech_buffer.len() - self.silence_counter;
                    if spoken > MIN_SPEECH_SAMPLES {
                        tracing::debug!(samples = self.speech_buffer.len(), "utterance complete");
                        return Segment::Complete;
                    }

                    // Too short to be speech: a click or a cough
                    self.waited += self.speech_buffer.len();
                    self.reset_buffer();
                    if self.waited >= self.start_limit {
                        return Segment::TimedOut;
                    }
                }
            }
        }

        Segment::Pending
    }

    /// Take the captured utterance, capped at the phrase limit
    pub fn take_speech(&mut self) -> Vec<f32> {
        let mut speech = std::mem::take(&mut self.speech_buffer);
        speech.truncate(self.phrase_limit);
        self.reset_buffer();
        speech
    }

    /// Current phase
    #[must_use]
    pub const fn state(&self) -> SegmenterState {
        self.state
    }

    fn reset_buffer(&mut self) {
        self.state = SegmenterState::Waiting;
        self.speech_buffer.clear();
        self.silence_counter = 0;
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
pub fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHUNK: usize = 1600; // 100ms

    fn window(start_secs: u64, phrase_secs: u64) -> ListenWindow {
        ListenWindow {
            start_timeout: Duration::from_secs(start_secs),
            phrase_limit: Duration::from_secs(phrase_secs),
        }
    }

    #[test]
    fn test_energy_calculation() {
        let silence = vec![0.0f32; 100];
        assert!(calculate_energy(&silence) < 0.001);

        let loud = vec![0.5f32; 100];
        assert!(calculate_energy(&loud) > 0.4);

        assert!(calculate_energy(&[]).abs() < f32::EPSILON);
    }

    #[test]
    fn test_silence_times_out() {
        let mut segmenter = SpeechSegmenter::new(window(1, 10));
        let silence = vec![0.0f32; CHUNK];

        let mut outcome = Segment::Pending;
        for _ in 0..10 {
            outcome = segmenter.process(&silence);
        }
        assert_eq!(outcome, Segment::TimedOut);
    }

    #[test]
    fn test_speech_then_silence_completes() {
        let mut segmenter = SpeechSegmenter::new(window(5, 10));
        let loud = vec![0.3f32; CHUNK];
        let silence = vec![0.0f32; CHUNK];

        for _ in 0..5 {
            assert_eq!(segmenter.process(&loud), Segment::Pending);
        }
        assert_eq!(segmenter.state(), SegmenterState::Speaking);

        let mut outcome = Segment::Pending;
        for _ in 0..10 {
            outcome = segmenter.process(&silence);
            if outcome != Segment::Pending {
                break;
            }
        }
        assert_eq!(outcome, Segment::Complete);
        assert!(segmenter.take_speech().len() > MIN_SPEECH_SAMPLES);
        assert_eq!(segmenter.state(), SegmenterState::Waiting);
    }

    #[test]
    fn test_phrase_limit_caps_utterance() {
        let mut segmenter = SpeechSegmenter::new(window(5, 1));
        let loud = vec![0.3f32; CHUNK];

        let mut outcome = Segment::Pending;
        for _ in 0..20 {
            outcome = segmenter.process(&loud);
            if outcome != Segment::Pending {
                break;
            }
        }
        assert_eq!(outcome, Segment::Complete);
        assert_eq!(segmenter.take_speech().len(), SAMPLE_RATE as usize);
    }

    #[test]
    fn test_short_blip_is_ignored() {
        let mut segmenter = SpeechSegmenter::new(window(5, 10));
        let blip = vec![0.3f32; 800];
        let silence = vec![0.0f32; CHUNK];

        segmenter.process(&blip);
        for _ in 0..9 {
            assert_eq!(segmenter.process(&silence), Segment::Pending);
        }
        assert_eq!(segmenter.state(), SegmenterState::Waiting);
    }
}
