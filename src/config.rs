//! Configuration for the voice pipeline
//!
//! All selectable axes (STT model, vision model, TTS backend) are typed
//! enums validated when the configuration is loaded, and API keys are read
//! once from the environment and passed into each component constructor.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::{Error, Result};

/// Default ElevenLabs voice ("Aria")
pub const DEFAULT_ELEVENLABS_VOICE: &str = "9BWtsMINqrJLrRacOk9x";

/// Speech-to-text model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SttModel {
    /// Whisper large v3 (most accurate)
    #[default]
    #[value(name = "whisper-large-v3")]
    WhisperLargeV3,
    /// Whisper large v3 turbo (faster, slightly less accurate)
    #[value(name = "whisper-large-v3-turbo")]
    WhisperLargeV3Turbo,
}

impl SttModel {
    /// Model identifier as the transcription service expects it
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WhisperLargeV3 => "whisper-large-v3",
            Self::WhisperLargeV3Turbo => "whisper-large-v3-turbo",
        }
    }
}

impl std::fmt::Display for SttModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vision-language model for image questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VisionModel {
    /// Llama 3.2 90B vision
    #[default]
    #[value(name = "llama-3.2-90b-vision-preview")]
    Llama90bVision,
    /// Llama 3.2 11B vision (cheaper)
    #[value(name = "llama-3.2-11b-vision-preview")]
    Llama11bVision,
}

impl VisionModel {
    /// Model identifier as the inference service expects it
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Llama90bVision => "llama-3.2-90b-vision-preview",
            Self::Llama11bVision => "llama-3.2-11b-vision-preview",
        }
    }
}

impl std::fmt::Display for VisionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text-to-speech backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TtsBackend {
    /// Free Google Translate TTS (low fidelity, no credential needed)
    #[default]
    Gtts,
    /// Hosted ElevenLabs voices (requires `ELEVENLABS_API_KEY`)
    Elevenlabs,
}

impl std::fmt::Display for TtsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Gtts => "gtts",
            Self::Elevenlabs => "elevenlabs",
        })
    }
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Groq API key (transcription and vision inference)
    pub groq: Option<String>,

    /// ElevenLabs API key (optional hosted TTS)
    pub elevenlabs: Option<String>,
}

impl ApiKeys {
    /// Read API keys from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            groq: std::env::var("GROQ_API_KEY").ok(),
            elevenlabs: std::env::var("ELEVENLABS_API_KEY").ok(),
        }
    }

    /// The Groq key, or a fatal configuration error when absent
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `GROQ_API_KEY` is not set
    pub fn require_groq(&self) -> Result<&str> {
        self.groq
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("GROQ_API_KEY is not set".to_string()))
    }

    /// The ElevenLabs key, or a configuration error when absent
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `ELEVENLABS_API_KEY` is not set
    pub fn require_elevenlabs(&self) -> Result<&str> {
        self.elevenlabs
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "ELEVENLABS_API_KEY is not set; the elevenlabs backend is unavailable"
                        .to_string(),
                )
            })
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API keys for external services
    pub api_keys: ApiKeys,

    /// Where the recorded question is written
    pub input_audio: PathBuf,

    /// Where the synthesized answer is written
    pub output_audio: PathBuf,

    /// Image the question is about
    pub image: PathBuf,

    /// STT model
    pub stt_model: SttModel,

    /// Vision model
    pub vision_model: VisionModel,

    /// TTS backend
    pub tts_backend: TtsBackend,

    /// ElevenLabs voice identifier
    pub tts_voice: String,

    /// Max time to wait for speech to start
    pub timeout: Duration,

    /// Max duration of the spoken phrase, unbounded when `None`
    pub phrase_time_limit: Option<Duration>,
}

impl Config {
    /// Validate the configuration for a full pipeline run
    ///
    /// Fail-fast policy: a missing required credential or a missing image
    /// file is a fatal configuration error, caught here before any stage
    /// runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `GROQ_API_KEY` is absent, the image
    /// file does not exist, or the selected TTS backend lacks its credential
    pub fn validate(&self) -> Result<()> {
        self.api_keys.require_groq()?;

        if !self.image.is_file() {
            return Err(Error::Config(format!(
                "image file not found: {}",
                self.image.display()
            )));
        }

        if self.tts_backend == TtsBackend::Elevenlabs {
            self.api_keys.require_elevenlabs()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(groq: Option<&str>, elevenlabs: Option<&str>) -> ApiKeys {
        ApiKeys {
            groq: groq.map(String::from),
            elevenlabs: elevenlabs.map(String::from),
        }
    }

    fn config_with(keys: ApiKeys, image: PathBuf) -> Config {
        Config {
            api_keys: keys,
            input_audio: PathBuf::from("question.mp3"),
            output_audio: PathBuf::from("answer.mp3"),
            image,
            stt_model: SttModel::default(),
            vision_model: VisionModel::default(),
            tts_backend: TtsBackend::default(),
            tts_voice: DEFAULT_ELEVENLABS_VOICE.to_string(),
            timeout: Duration::from_secs(20),
            phrase_time_limit: None,
        }
    }

    #[test]
    fn model_identifiers() {
        assert_eq!(SttModel::WhisperLargeV3.as_str(), "whisper-large-v3");
        assert_eq!(
            VisionModel::Llama90bVision.as_str(),
            "llama-3.2-90b-vision-preview"
        );
    }

    #[test]
    fn missing_groq_key_is_config_error() {
        let keys = keys(None, None);
        assert!(matches!(keys.require_groq(), Err(Error::Config(_))));
    }

    #[test]
    fn empty_groq_key_is_config_error() {
        let keys = keys(Some(""), None);
        assert!(matches!(keys.require_groq(), Err(Error::Config(_))));
    }

    #[test]
    fn missing_image_fails_validation() {
        let config = config_with(
            keys(Some("gsk_test"), None),
            PathBuf::from("/nonexistent/image.jpg"),
        );
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn elevenlabs_backend_requires_key() {
        let image = tempfile::NamedTempFile::new().unwrap();
        let mut config = config_with(keys(Some("gsk_test"), None), image.path().to_path_buf());
        config.tts_backend = TtsBackend::Elevenlabs;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn valid_config_passes() {
        let image = tempfile::NamedTempFile::new().unwrap();
        let config = config_with(
            keys(Some("gsk_test"), Some("el_test")),
            image.path().to_path_buf(),
        );
        assert!(config.validate().is_ok());
    }
}
