//! Voice processing module
//!
//! Handles microphone capture and utterance segmentation, speech
//! recognition with Bengali-then-English locale fallback, and spoken
//! replies.

mod capture;
mod input;
mod output;
mod playback;
mod segmenter;
mod stt;
mod tts;

pub use capture::{
    AudioCapture, AudioSource, CaptureError, MicrophoneSource, SAMPLE_RATE, samples_to_wav,
};
pub use input::{
    DEFAULT_DECODE_TIMEOUT, DEFAULT_LOCALE_ORDER, LISTEN_ERROR_TEXT, ListenFault, LocaleChain,
    NO_SPEECH_TEXT, SpeechInput, UNINTELLIGIBLE_TEXT, placeholder_text, placeholder_utterance,
};
pub use output::{AudioOutput, BengaliSpeech, DEFAULT_VOLUME, EnglishSpeech, Speakers};
pub use playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE, decode_mp3};
pub use segmenter::{ListenWindow, Segment, SegmenterState, SpeechSegmenter, calculate_energy};
pub use stt::{DecodeError, GoogleSpeechRecognizer, SpeechRecognizer};
pub use tts::TextToSpeech;
