//! Speech-to-text (STT) processing

use crate::audio::{AudioClip, AudioFormat};
use crate::config::SttModel;
use crate::{Error, Result};

const GROQ_TRANSCRIPTION_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";

/// Fixed language hint for transcription
const LANGUAGE: &str = "en";

/// Response from the Groq transcription API
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcribes recorded audio to text
pub struct SpeechTranscriber {
    client: reqwest::Client,
    api_key: String,
    model: SttModel,
}

impl SpeechTranscriber {
    /// Create a new transcriber
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key is empty
    pub fn new(api_key: String, model: SttModel) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Groq API key required for transcription".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }

    /// Transcribe an audio clip to text
    ///
    /// Single synchronous request, no retry. The clip is checked before any
    /// network traffic: a missing or empty file never reaches the service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyResult`] if the clip file is missing or empty,
    /// [`Error::Transport`] on any service or network failure
    pub async fn transcribe(&self, clip: &AudioClip) -> Result<String> {
        if !clip.is_readable() {
            return Err(Error::EmptyResult(format!(
                "audio file missing or empty: {}",
                clip.path.display()
            )));
        }

        let audio = tokio::fs::read(&clip.path).await?;
        tracing::debug!(
            audio_bytes = audio.len(),
            model = self.model.as_str(),
            "starting transcription"
        );

        let (file_name, mime) = match clip.format {
            AudioFormat::Mp3 => ("audio.mp3", "audio/mpeg"),
            AudioFormat::Wav => ("audio.wav", "audio/wav"),
        };

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name(file_name)
                    .mime_str(mime)
                    .map_err(|e| Error::Transport(e.to_string()))?,
            )
            .text("model", self.model.as_str())
            .text("language", LANGUAGE);

        let response = self
            .client
            .post(GROQ_TRANSCRIPTION_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "transcription request failed");
                Error::Transport(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return Err(Error::Transport(format!(
                "transcription API error {status}: {body}"
            )));
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("failed to parse response: {e}")))?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn empty_api_key_rejected() {
        let result = SpeechTranscriber::new(String::new(), SttModel::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn missing_clip_fails_before_network() {
        let transcriber =
            SpeechTranscriber::new("gsk_test".to_string(), SttModel::default()).unwrap();
        let clip = AudioClip::from_path(PathBuf::from("/nonexistent/question.mp3"));

        let err = transcriber.transcribe(&clip).await.unwrap_err();
        assert!(matches!(err, Error::EmptyResult(_)));
    }
}
