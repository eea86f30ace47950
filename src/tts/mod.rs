//! Text-to-speech (TTS) processing
//!
//! Two interchangeable backends behind one trait: the free Google
//! Translate engine and hosted ElevenLabs voices. Synthesis writes a clip
//! and returns it; playback is a separate, explicit step.

mod elevenlabs;
mod gtts;

pub use elevenlabs::ElevenLabsEngine;
pub use gtts::{GttsEngine, chunk_text};

use std::path::Path;

use async_trait::async_trait;

use crate::audio::AudioClip;
use crate::config::{ApiKeys, TtsBackend};
use crate::Result;

/// A speech synthesis backend
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into an audio clip at `destination`
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or writing the clip fails
    async fn synthesize(&self, text: &str, destination: &Path) -> Result<AudioClip>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Construct the synthesizer for the selected backend
///
/// Credential requirements are enforced here, at configuration time: the
/// hosted backend is refused up front when its key is absent, before any
/// synthesis is attempted.
///
/// # Errors
///
/// Returns [`crate::Error::Config`] if the backend's credential is missing
pub fn synthesizer_for(
    backend: TtsBackend,
    keys: &ApiKeys,
    voice: &str,
) -> Result<Box<dyn SpeechSynthesizer>> {
    match backend {
        TtsBackend::Gtts => Ok(Box::new(GttsEngine::new())),
        TtsBackend::Elevenlabs => {
            let key = keys.require_elevenlabs()?;
            Ok(Box::new(ElevenLabsEngine::new(
                key.to_string(),
                voice.to_string(),
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gtts_needs_no_credential() {
        let keys = ApiKeys::default();
        let synthesizer = synthesizer_for(TtsBackend::Gtts, &keys, "").unwrap();
        assert_eq!(synthesizer.name(), "gtts");
    }

    #[test]
    fn elevenlabs_without_key_is_config_error() {
        let keys = ApiKeys::default();
        let result = synthesizer_for(TtsBackend::Elevenlabs, &keys, "aria");
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn elevenlabs_with_key_constructs() {
        let keys = ApiKeys {
            groq: None,
            elevenlabs: Some("el_test".to_string()),
        };
        let synthesizer = synthesizer_for(TtsBackend::Elevenlabs, &keys, "aria").unwrap();
        assert_eq!(synthesizer.name(), "elevenlabs");
    }
}
