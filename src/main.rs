use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vocalens::audio::{AudioCapture, AudioClip, AudioPlayback};
use vocalens::config::DEFAULT_ELEVENLABS_VOICE;
use vocalens::stt::SpeechTranscriber;
use vocalens::vision::VisionQueryClient;
use vocalens::{ApiKeys, Config, Pipeline, SttModel, TtsBackend, VisionModel, tts};

/// vocalens - speak a question about a picture, hear the answer
#[derive(Parser)]
#[command(name = "vocalens", version, about)]
struct Cli {
    /// Where the recorded question is written
    #[arg(long, env = "VOCALENS_INPUT_AUDIO", default_value = "question.mp3")]
    input_audio: PathBuf,

    /// Where the synthesized answer is written
    #[arg(long, env = "VOCALENS_OUTPUT_AUDIO", default_value = "answer.mp3")]
    output_audio: PathBuf,

    /// Image the question is about
    #[arg(short, long, env = "VOCALENS_IMAGE", default_value = "image.jpg")]
    image: PathBuf,

    /// Speech-to-text model
    #[arg(long, value_enum, default_value_t)]
    stt_model: SttModel,

    /// Vision-language model
    #[arg(long, value_enum, default_value_t)]
    vision_model: VisionModel,

    /// Text-to-speech backend
    #[arg(long, value_enum, default_value_t, env = "VOCALENS_TTS_BACKEND")]
    tts_backend: TtsBackend,

    /// ElevenLabs voice identifier
    #[arg(long, env = "VOCALENS_TTS_VOICE", default_value = DEFAULT_ELEVENLABS_VOICE)]
    tts_voice: String,

    /// Max seconds to wait for speech to start
    #[arg(long, default_value = "20")]
    timeout: u64,

    /// Max seconds for the spoken phrase (unbounded if omitted)
    #[arg(long)]
    phrase_time_limit: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: record, transcribe, ask, speak the answer
    Run,
    /// Record a spoken phrase to the input audio path
    Record,
    /// Transcribe an audio file
    Transcribe {
        /// Audio file to transcribe (defaults to the input audio path)
        audio: Option<PathBuf>,
    },
    /// Ask the vision model a question about the image
    Analyze {
        /// Question to ask
        #[arg(default_value = "Describe what you see in this image.")]
        prompt: String,
    },
    /// Synthesize text to speech and play it
    Speak {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Play an audio file through the native player
    Play {
        /// Audio file to play
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,vocalens=info",
        1 => "info,vocalens=debug",
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
    let config = build_config(&cli);

    match cli.command {
        None | Some(Command::Run) => {
            let pipeline = Pipeline::new(config)?;
            pipeline.run().await?;
            Ok(())
        }
        Some(Command::Record) => cmd_record(&config),
        Some(Command::Transcribe { audio }) => {
            let path = audio.unwrap_or_else(|| config.input_audio.clone());
            cmd_transcribe(&config, path).await
        }
        Some(Command::Analyze { prompt }) => cmd_analyze(&config, &prompt).await,
        Some(Command::Speak { text }) => cmd_speak(&config, &text).await,
        Some(Command::Play { file }) => cmd_play(&file),
    }
}

fn build_config(cli: &Cli) -> Config {
    Config {
        api_keys: ApiKeys::from_env(),
        input_audio: cli.input_audio.clone(),
        output_audio: cli.output_audio.clone(),
        image: cli.image.clone(),
        stt_model: cli.stt_model,
        vision_model: cli.vision_model,
        tts_backend: cli.tts_backend,
        tts_voice: cli.tts_voice.clone(),
        timeout: Duration::from_secs(cli.timeout),
        phrase_time_limit: cli.phrase_time_limit.map(Duration::from_secs),
    }
}

/// Record a single phrase from the microphone
fn cmd_record(config: &Config) -> anyhow::Result<()> {
    let capture = AudioCapture::new()?;
    let clip = capture.record(&config.input_audio, config.timeout, config.phrase_time_limit)?;

    println!("Recorded {}", clip.path.display());
    if let Some(duration) = clip.duration {
        println!("Duration: {:.1}s", duration.as_secs_f64());
    }

    Ok(())
}

/// Transcribe an audio file and print the text
async fn cmd_transcribe(config: &Config, path: PathBuf) -> anyhow::Result<()> {
    let key = config.api_keys.require_groq()?.to_string();
    let transcriber = SpeechTranscriber::new(key, config.stt_model)?;

    let clip = AudioClip::from_path(path);
    let transcript = transcriber.transcribe(&clip).await?;

    if transcript.trim().is_empty() {
        println!("Transcription failed.");
    } else {
        println!("Final transcription: {transcript}");
    }

    Ok(())
}

/// Ask the vision model about the configured image
async fn cmd_analyze(config: &Config, prompt: &str) -> anyhow::Result<()> {
    let key = config.api_keys.require_groq()?.to_string();
    let vision = VisionQueryClient::new(key, config.vision_model)?;

    let answer = vision.ask(prompt, &config.image).await?;
    println!("{answer}");

    Ok(())
}

/// Synthesize text and play it back
async fn cmd_speak(config: &Config, text: &str) -> anyhow::Result<()> {
    let synthesizer =
        tts::synthesizer_for(config.tts_backend, &config.api_keys, &config.tts_voice)?;

    println!("Synthesizing with {}...", synthesizer.name());
    let clip = synthesizer.synthesize(text, &config.output_audio).await?;
    println!("Audio saved to {}", clip.path.display());

    let playback = AudioPlayback::new();
    playback.play(&clip.path)?;

    Ok(())
}

/// Play an audio file
fn cmd_play(file: &std::path::Path) -> anyhow::Result<()> {
    let playback = AudioPlayback::new();
    playback.play(file)?;
    Ok(())
}
