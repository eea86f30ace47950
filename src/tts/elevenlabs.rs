//! Hosted ElevenLabs TTS backend

use std::path::Path;

use async_trait::async_trait;

use crate::audio::{AudioClip, AudioFormat};
use crate::tts::SpeechSynthesizer;
use crate::{Error, Result};

const ELEVENLABS_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";

/// Compressed output matching the free backend's MP3 clips
const OUTPUT_FORMAT: &str = "mp3_22050_32";

const MODEL_ID: &str = "eleven_turbo_v2";

/// Higher-fidelity hosted TTS; requires an API key
pub struct ElevenLabsEngine {
    client: reqwest::Client,
    api_key: String,
    voice: String,
}

#[derive(serde::Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabsEngine {
    /// Create the engine with a credential and voice identifier
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key is empty
    pub fn new(api_key: String, voice: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for hosted TTS".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsEngine {
    async fn synthesize(&self, text: &str, destination: &Path) -> Result<AudioClip> {
        if text.trim().is_empty() {
            return Err(Error::EmptyResult("no text to synthesize".to_string()));
        }

        let url = format!(
            "{ELEVENLABS_URL}/{}?output_format={OUTPUT_FORMAT}",
            self.voice
        );

        let request = SynthesisRequest {
            text,
            model_id: MODEL_ID,
        };

        tracing::debug!(voice = %self.voice, "synthesizing with ElevenLabs");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "ElevenLabs error {status}: {body}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        tokio::fs::write(destination, &audio).await?;
        tracing::info!(path = %destination.display(), bytes = audio.len(), "ElevenLabs audio saved");

        Ok(AudioClip {
            path: destination.to_path_buf(),
            format: AudioFormat::Mp3,
            duration: None,
        })
    }

    fn name(&self) -> &'static str {
        "elevenlabs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_rejected() {
        let result = ElevenLabsEngine::new(String::new(), "aria".to_string());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
