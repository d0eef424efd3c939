//! Voice pipeline integration tests
//!
//! Tests voice components without requiring audio hardware

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use jarvis_gateway::voice::{
    CaptureError, DecodeError, LISTEN_ERROR_TEXT, ListenFault, ListenWindow, LocaleChain,
    NO_SPEECH_TEXT, SAMPLE_RATE, Segment, SegmenterState, SpeechInput, SpeechSegmenter,
    UNINTELLIGIBLE_TEXT, samples_to_wav,
};
use jarvis_gateway::{AssistantState, Language, Utterance};

mod common;
use common::{
    CannedRecognizer, FixedSource, ObservingSource, StalledRecognizer, canned_chain,
    generate_silence, generate_sine_samples,
};

fn speech_input(
    source: Result<Vec<f32>, CaptureError>,
    answers: Vec<(&'static str, Result<String, DecodeError>)>,
) -> (SpeechInput, Arc<AssistantState>) {
    let state = Arc::new(AssistantState::new());
    let input = SpeechInput::new(
        Arc::new(FixedSource(source)),
        canned_chain(answers),
        Arc::clone(&state),
    );
    (input, state)
}

#[test]
fn test_samples_to_wav() {
    let samples = generate_sine_samples(440.0, 0.5, 0.5);
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");

    let reader = hound::WavReader::new(Cursor::new(&wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len() as usize, samples.len());
}

#[test]
fn test_segmenter_on_generated_audio() {
    let mut segmenter = SpeechSegmenter::new(ListenWindow::default());

    let speech = generate_sine_samples(300.0, 1.0, 0.4);
    let silence = generate_silence(1.0);

    assert_eq!(segmenter.process(&speech), Segment::Pending);
    assert_eq!(segmenter.state(), SegmenterState::Speaking);
    assert_eq!(segmenter.process(&silence), Segment::Complete);

    let utterance = segmenter.take_speech();
    assert_eq!(utterance.len(), speech.len() + silence.len());
}

#[test]
fn test_segmenter_times_out_on_silence() {
    let window = ListenWindow {
        start_timeout: Duration::from_secs(2),
        phrase_limit: Duration::from_secs(10),
    };
    let mut segmenter = SpeechSegmenter::new(window);

    assert_eq!(segmenter.process(&generate_silence(1.0)), Segment::Pending);
    assert_eq!(segmenter.process(&generate_silence(1.0)), Segment::TimedOut);
}

#[tokio::test]
async fn test_listen_with_no_audio() {
    let (input, _) = speech_input(
        Err(CaptureError::NoSpeech),
        vec![("en-US", Ok("hello".to_string()))],
    );

    assert_eq!(
        input.listen().await,
        Utterance::new(NO_SPEECH_TEXT, Language::En)
    );
}

#[tokio::test]
async fn test_listen_bengali_only_audio() {
    let (input, _) = speech_input(
        Ok(generate_sine_samples(220.0, 1.0, 0.3)),
        vec![("bn-IN", Ok("তুমি কেমন আছো".to_string()))],
    );

    assert_eq!(
        input.listen().await,
        Utterance::new("তুমি কেমন আছো", Language::Bn)
    );
}

#[tokio::test]
async fn test_listen_english_after_bengali_fails() {
    let (input, _) = speech_input(
        Ok(generate_sine_samples(220.0, 1.0, 0.3)),
        vec![("en-US", Ok("what time is it".to_string()))],
    );

    assert_eq!(
        input.listen().await,
        Utterance::new("what time is it", Language::En)
    );
}

#[tokio::test]
async fn test_listen_unintelligible_everywhere() {
    let (input, _) = speech_input(Ok(generate_sine_samples(220.0, 1.0, 0.3)), vec![]);

    assert_eq!(
        input.listen().await,
        Utterance::new(UNINTELLIGIBLE_TEXT, Language::En)
    );
}

#[tokio::test]
async fn test_listen_device_fault() {
    let (input, _) = speech_input(
        Err(CaptureError::Device("no input device available".to_string())),
        vec![("en-US", Ok("hello".to_string()))],
    );

    assert_eq!(
        input.try_listen().await,
        Err(ListenFault::Device("no input device available".to_string()))
    );
    assert_eq!(
        input.listen().await,
        Utterance::new(LISTEN_ERROR_TEXT, Language::En)
    );
}

#[tokio::test]
async fn test_listen_service_fault() {
    let (input, _) = speech_input(
        Ok(generate_sine_samples(220.0, 1.0, 0.3)),
        vec![("bn-IN", Err(DecodeError::Service("quota".to_string())))],
    );

    assert_eq!(
        input.listen().await,
        Utterance::new(LISTEN_ERROR_TEXT, Language::En)
    );
}

#[tokio::test(start_paused = true)]
async fn test_listen_stalled_recognizer_times_out() {
    let state = Arc::new(AssistantState::new());
    let chain = LocaleChain::new(Arc::new(StalledRecognizer)).with_timeout(Duration::from_secs(5));
    let input = SpeechInput::new(
        Arc::new(FixedSource(Ok(generate_sine_samples(220.0, 1.0, 0.3)))),
        Arc::new(chain),
        Arc::clone(&state),
    );

    assert!(matches!(input.try_listen().await, Err(ListenFault::Service(_))));
    assert_eq!(
        input.listen().await,
        Utterance::new(LISTEN_ERROR_TEXT, Language::En)
    );
    assert!(!state.is_listening());
}

#[tokio::test]
async fn test_listening_flag_set_only_during_capture() {
    let state = Arc::new(AssistantState::new());
    let source = Arc::new(ObservingSource {
        state: Arc::clone(&state),
        saw_listening: AtomicBool::new(false),
    });
    let input = SpeechInput::new(
        source.clone(),
        canned_chain(vec![("en-US", Ok("hi".to_string()))]),
        Arc::clone(&state),
    );

    assert!(!state.is_listening());
    let utterance = input.listen().await;

    assert_eq!(utterance.text(), "hi");
    assert!(source.saw_listening.load(Ordering::SeqCst));
    assert!(!state.is_listening());
}

#[tokio::test]
async fn test_listening_flag_reset_after_fault() {
    let (input, state) = speech_input(Err(CaptureError::Device("unplugged".to_string())), vec![]);

    let _ = input.listen().await;
    assert!(!state.is_listening());
}

#[tokio::test]
async fn test_chain_stops_after_first_success() {
    let recognizer = Arc::new(CannedRecognizer::new(vec![
        ("bn-IN", Ok("নমস্কার".to_string())),
        ("en-US", Ok("hello".to_string())),
    ]));
    let chain = LocaleChain::new(recognizer.clone());

    let utterance = chain.transcribe(b"RIFF").await;

    assert_eq!(utterance.language(), Language::Bn);
    assert_eq!(recognizer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_custom_locale_order() {
    let recognizer = Arc::new(CannedRecognizer::new(vec![
        ("bn-IN", Ok("নমস্কার".to_string())),
        ("en-US", Ok("hello".to_string())),
    ]));
    let chain = LocaleChain::new(recognizer).with_order(vec![Language::En, Language::Bn]);

    assert_eq!(chain.order(), [Language::En, Language::Bn]);
    assert_eq!(
        chain.transcribe(b"RIFF").await,
        Utterance::new("hello", Language::En)
    );
}
