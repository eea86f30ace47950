//! Free Google Translate TTS backend
//!
//! The same unofficial endpoint the gTTS library uses. Low fidelity,
//! English only, no credential required.

use std::path::Path;

use async_trait::async_trait;

use crate::audio::{AudioClip, AudioFormat};
use crate::tts::SpeechSynthesizer;
use crate::{Error, Result};

const GTTS_URL: &str = "https://translate.google.com/translate_tts";

/// Fixed synthesis language
const LANGUAGE: &str = "en";

/// The endpoint rejects long queries; text is chunked at word boundaries
const MAX_CHUNK_CHARS: usize = 200;

/// The endpoint refuses requests without a browser user agent
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Free low-fidelity TTS via Google Translate
pub struct GttsEngine {
    client: reqwest::Client,
}

impl GttsEngine {
    /// Create the engine; no credential needed
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch one chunk of synthesized MP3 audio
    async fn fetch_chunk(&self, chunk: &str, idx: usize, total: usize) -> Result<Vec<u8>> {
        let url = format!(
            "{GTTS_URL}?ie=UTF-8&client=tw-ob&tl={LANGUAGE}&total={total}&idx={idx}&textlen={}&q={}",
            chunk.len(),
            urlencoding::encode(chunk)
        );

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!("gTTS error {status}")));
        }

        Ok(response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?
            .to_vec())
    }
}

impl Default for GttsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for GttsEngine {
    async fn synthesize(&self, text: &str, destination: &Path) -> Result<AudioClip> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(Error::EmptyResult("no text to synthesize".to_string()));
        }

        tracing::debug!(chunks = chunks.len(), "synthesizing with gTTS");

        // Concatenated MP3 frames play back as one stream
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, idx, chunks.len()).await?);
        }

        tokio::fs::write(destination, &audio).await?;
        tracing::info!(path = %destination.display(), bytes = audio.len(), "gTTS audio saved");

        Ok(AudioClip {
            path: destination.to_path_buf(),
            format: AudioFormat::Mp3,
            duration: None,
        })
    }

    fn name(&self) -> &'static str {
        "gtts"
    }
}

/// Split text into whitespace-separated chunks of at most `max_chars`
///
/// Words are never split; a single word longer than the budget becomes its
/// own oversized chunk.
#[must_use]
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 200).is_empty());
        assert!(chunk_text("   \n\t ", 200).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("hello world", 200);
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn chunks_respect_budget() {
        let text = "alpha beta gamma delta epsilon";
        let chunks = chunk_text(text, 11);

        for chunk in &chunks {
            assert!(chunk.len() <= 11, "chunk too long: {chunk}");
        }
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn words_are_never_split() {
        let chunks = chunk_text("one twotwotwo three", 8);
        for chunk in &chunks {
            for word in chunk.split_whitespace() {
                assert!("one twotwotwo three".contains(word));
            }
        }
    }

    #[test]
    fn oversized_word_gets_own_chunk() {
        let chunks = chunk_text("supercalifragilistic", 5);
        assert_eq!(chunks, vec!["supercalifragilistic"]);
    }
}
