use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jarvis_gateway::api::ApiServerBuilder;
use jarvis_gateway::voice::{
    AudioCapture, AudioPlayback, EnglishSpeech, GoogleSpeechRecognizer, ListenFault, LocaleChain,
    MicrophoneSource, PLAYBACK_SAMPLE_RATE, Speakers, SpeechInput, TextToSpeech, calculate_energy,
    placeholder_text,
};
use jarvis_gateway::{
    AssistantState, Config, DialogueCoordinator, Error, GeminiBackend, ResponseGenerator,
};

/// Jarvis - Bilingual (English/Bengali) voice and text assistant
#[derive(Parser)]
#[command(name = "jarvis", version, about)]
struct Cli {
    /// Host to bind the HTTP server to
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (default)
    Serve,
    /// Talk to Jarvis through the microphone and speakers
    Talk {
        /// Handle a single utterance, then exit
        #[arg(long)]
        once: bool,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Check configuration and API key
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,jarvis_gateway=info",
        1 => "info,jarvis_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Talk { once } => talk(config, once).await,
        Command::TestMic { duration } => test_mic(duration).await,
        Command::TestSpeaker => test_speaker().await,
        Command::Check => {
            check(&config);
            Ok(())
        }
    }
}

/// Shared state, coordinator and speech chain built from configuration
struct Assistant {
    state: Arc<AssistantState>,
    coordinator: Arc<DialogueCoordinator>,
    chain: Arc<LocaleChain>,
}

fn build_assistant(config: &Config) -> Assistant {
    let backend = GeminiBackend::new(config.google_api_key.clone(), config.model.clone());
    let generator = ResponseGenerator::new(Arc::new(backend)).with_timeout(config.backend_timeout);

    let state = Arc::new(AssistantState::new());
    let coordinator = Arc::new(DialogueCoordinator::new(generator, Arc::clone(&state)));

    let recognizer = GoogleSpeechRecognizer::new(config.google_api_key.clone())
        .with_min_confidence(config.speech_min_confidence);
    let chain =
        Arc::new(LocaleChain::new(Arc::new(recognizer)).with_timeout(config.speech_timeout));

    Assistant {
        state,
        coordinator,
        chain,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    if !config.has_api_key() {
        tracing::warn!("GOOGLE_API_KEY not set; replies will be fallback apologies");
    }

    let assistant = build_assistant(&config);

    let mut builder = ApiServerBuilder::new(assistant.coordinator)
        .bind(config.host.clone(), config.port)
        .static_dir(config.static_dir.clone());

    if config.has_api_key() {
        builder = builder.speech(assistant.chain);
    }

    tracing::info!(model = %config.model, "jarvis ready at http://{}", config.bind_addr());

    tokio::select! {
        result = builder.build().run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("jarvis stopped by user"),
    }

    Ok(())
}

/// Listen, reply and speak until interrupted
async fn talk(config: Config, once: bool) -> anyhow::Result<()> {
    let assistant = build_assistant(&config);

    let input = SpeechInput::new(
        Arc::new(MicrophoneSource),
        Arc::clone(&assistant.chain),
        Arc::clone(&assistant.state),
    )
    .with_window(config.listen);

    let english = match config.google_api_key.clone() {
        Some(key) => Some(EnglishSpeech::new(TextToSpeech::new(key, config.tts_rate)?)),
        None => {
            tracing::warn!("GOOGLE_API_KEY not set; replies will be printed only");
            None
        }
    };
    let speakers = Speakers::new(english);

    tracing::info!("jarvis is listening (Ctrl+C to stop)");

    loop {
        let utterance = tokio::select! {
            result = input.try_listen() => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("jarvis stopped by user");
                return Ok(());
            }
        };

        let utterance = match utterance {
            Ok(utterance) => utterance,
            Err(ListenFault::NoSpeech) if !once => continue,
            Err(fault) => {
                println!("{}", placeholder_text(&fault));
                if once {
                    return Ok(());
                }
                continue;
            }
        };

        println!("You ({}): {}", utterance.language(), utterance.text());
        let reply = assistant.coordinator.handle_utterance(&utterance).await;
        println!("Jarvis: {}", reply.assistant_text);

        match speakers.speak(&reply.assistant_text, reply.language).await {
            Ok(()) => {}
            Err(Error::Unsupported(what)) => tracing::debug!(%what, "reply shown as text only"),
            Err(e) => tracing::warn!(error = %e, "failed to speak reply"),
        }

        if once {
            return Ok(());
        }
    }
}

/// Report configuration problems without starting anything
fn check(config: &Config) {
    println!("Jarvis {}", env!("CARGO_PKG_VERSION"));
    println!("---");
    println!("Model:           {}", config.model);
    println!("Server:          http://{}", config.bind_addr());
    println!("Backend timeout: {}s", config.backend_timeout.as_secs());
    println!(
        "Listen window:   {}s start, {}s phrase",
        config.listen.start_timeout.as_secs(),
        config.listen.phrase_limit.as_secs()
    );
    match &config.static_dir {
        Some(dir) if dir.join("index.html").is_file() => {
            println!("Web client:      {}", dir.display());
        }
        Some(dir) => println!("Web client:      {} (index.html missing!)", dir.display()),
        None => println!("Web client:      disabled"),
    }

    if config.has_api_key() {
        println!("API key:         configured");
    } else {
        println!("API key:         missing");
        println!("\nWarning: set GOOGLE_API_KEY to enable replies and speech.");
        println!("  1. Get a key from https://makersuite.google.com/app/apikey");
        println!("  2. Put GOOGLE_API_KEY=... in .env or the environment");
    }
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    let sample_rate = capture.sample_rate();
    println!("Sample rate: {sample_rate} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = calculate_energy(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: arecord -l (to list devices)");
    println!("  3. Try: pavucontrol (to check levels)");

    Ok(())
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let frequency = 440.0_f32;
    let num_samples = PLAYBACK_SAMPLE_RATE as usize * 2;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / PLAYBACK_SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    println!("Playing {} samples at {PLAYBACK_SAMPLE_RATE} Hz...", samples.len());

    tokio::task::spawn_blocking(move || AudioPlayback::new()?.play(samples)).await??;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl list sinks short");
    println!("  2. Try: pavucontrol (to check output levels)");

    Ok(())
}
