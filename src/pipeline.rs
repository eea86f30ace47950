//! Sequential pipeline driver
//!
//! record → transcribe → vision query → synthesize → play. Stages run
//! strictly in sequence; a failed stage halts the run. Configuration
//! errors propagate out as fatal; every other failure is reported at the
//! stage boundary and the run ends gracefully.

use crate::audio::{AudioCapture, AudioClip, AudioPlayback};
use crate::config::Config;
use crate::stt::SpeechTranscriber;
use crate::tts::{self, SpeechSynthesizer};
use crate::vision::VisionQueryClient;
use crate::Result;

/// Drives the five pipeline stages in order
pub struct Pipeline {
    config: Config,
    transcriber: SpeechTranscriber,
    vision: VisionQueryClient,
    synthesizer: Box<dyn SpeechSynthesizer>,
    playback: AudioPlayback,
}

impl Pipeline {
    /// Build the pipeline from a validated configuration
    ///
    /// All fail-fast checks happen here: required credential, image file,
    /// and the selected TTS backend's credential.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if validation fails
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let groq = config.api_keys.require_groq()?.to_string();
        let transcriber = SpeechTranscriber::new(groq.clone(), config.stt_model)?;
        let vision = VisionQueryClient::new(groq, config.vision_model)?;
        let synthesizer =
            tts::synthesizer_for(config.tts_backend, &config.api_keys, &config.tts_voice)?;
        let playback = AudioPlayback::new();

        Ok(Self {
            config,
            transcriber,
            vision,
            synthesizer,
            playback,
        })
    }

    /// Run the full pipeline once
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal configuration failures; soft stage
    /// failures are logged and end the run gracefully
    pub async fn run(&self) -> Result<()> {
        let Some(clip) = stage("recording", self.record_question())? else {
            return Ok(());
        };

        let transcript = match stage("transcription", self.transcriber.transcribe(&clip).await)? {
            Some(text) if !text.trim().is_empty() => text,
            Some(_) => {
                tracing::error!("transcription returned no text, nothing to ask");
                return Ok(());
            }
            None => return Ok(()),
        };

        let Some(answer) = stage(
            "vision query",
            self.vision.ask(&transcript, &self.config.image).await,
        )?
        else {
            return Ok(());
        };

        let Some(reply) = stage(
            "synthesis",
            self.synthesizer
                .synthesize(&answer, &self.config.output_audio)
                .await,
        )?
        else {
            return Ok(());
        };

        if stage("playback", self.playback.play(&reply.path))?.is_some() {
            tracing::info!("pipeline complete");
        }

        Ok(())
    }

    /// Record the spoken question to the configured input path
    fn record_question(&self) -> Result<AudioClip> {
        let capture = AudioCapture::new()?;
        capture.record(
            &self.config.input_audio,
            self.config.timeout,
            self.config.phrase_time_limit,
        )
    }
}

/// Apply the propagation policy to one stage result
///
/// Fatal errors propagate; soft errors are logged with their cause and
/// collapse to `None` so the caller skips the downstream stages.
fn stage<T>(name: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tracing::error!(stage = name, error = %e, "stage failed, halting pipeline");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn soft_errors_collapse_to_none() {
        let result: Result<()> = Err(Error::Transport("connection refused".to_string()));
        assert!(stage("test", result).unwrap().is_none());
    }

    #[test]
    fn fatal_errors_propagate() {
        let result: Result<()> = Err(Error::Config("missing key".to_string()));
        assert!(stage("test", result).is_err());
    }

    #[test]
    fn success_passes_through() {
        let result: Result<u32> = Ok(7);
        assert_eq!(stage("test", result).unwrap(), Some(7));
    }
}
