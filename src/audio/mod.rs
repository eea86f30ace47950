//! Audio capture, encoding, and playback
//!
//! Capture runs on the default input device at 16 kHz mono; clips are
//! written as 128 kbit/s MP3 via an ffmpeg subprocess. Playback is
//! delegated to the OS-native player for the detected platform.

mod capture;
mod endpoint;
mod playback;

pub use capture::{AudioCapture, SAMPLE_RATE};
pub use endpoint::{EndpointState, SpeechEndpointer};
pub use playback::{AudioPlayback, NativePlayer, PlatformTarget};

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

/// Target bitrate for MP3 clips
const MP3_BITRATE: &str = "128k";

/// Encoding of an on-disk audio clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// MPEG layer 3, compressed lossy
    Mp3,
    /// PCM WAV
    Wav,
}

/// A named, on-disk audio file
///
/// Produced by capture or synthesis, consumed read-only by transcription or
/// playback. File lifetime is caller-managed.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Location on disk
    pub path: PathBuf,
    /// Container format
    pub format: AudioFormat,
    /// Clip length, when known
    pub duration: Option<Duration>,
}

impl AudioClip {
    /// Reference an existing audio file, guessing the format from its
    /// extension
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("wav") => AudioFormat::Wav,
            _ => AudioFormat::Mp3,
        };
        Self {
            path,
            format,
            duration: None,
        }
    }

    /// Whether the underlying file exists and is non-empty
    #[must_use]
    pub fn is_readable(&self) -> bool {
        std::fs::metadata(&self.path).is_ok_and(|m| m.len() > 0)
    }
}

/// Convert f32 samples to WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// Transcode captured samples to an MP3 file at the target bitrate
///
/// Goes through an intermediate WAV and an ffmpeg subprocess; there is no
/// MP3 encoder in-process.
///
/// # Errors
///
/// Returns [`Error::Audio`] if ffmpeg is not on `PATH`, exits nonzero, or
/// the intermediate WAV cannot be written
pub fn write_mp3(samples: &[f32], sample_rate: u32, destination: &Path) -> Result<AudioClip> {
    let wav = samples_to_wav(samples, sample_rate)?;

    let mut temp = tempfile::Builder::new()
        .suffix(".wav")
        .tempfile()
        .map_err(|e| Error::Audio(format!("temp wav: {e}")))?;
    temp.write_all(&wav)
        .map_err(|e| Error::Audio(format!("temp wav: {e}")))?;
    temp.flush()
        .map_err(|e| Error::Audio(format!("temp wav: {e}")))?;

    let ffmpeg = which::which("ffmpeg")
        .map_err(|_| Error::Audio("ffmpeg not found on PATH, cannot encode MP3".to_string()))?;

    let output = std::process::Command::new(ffmpeg)
        .arg("-y")
        .args(["-loglevel", "error"])
        .arg("-i")
        .arg(temp.path())
        .args(["-codec:a", "libmp3lame", "-b:a", MP3_BITRATE])
        .arg(destination)
        .output()
        .map_err(|e| Error::Audio(format!("failed to spawn ffmpeg: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Audio(format!(
            "ffmpeg exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let duration = sample_duration(samples.len(), sample_rate);
    tracing::debug!(
        path = %destination.display(),
        samples = samples.len(),
        ?duration,
        "wrote mp3 clip"
    );

    Ok(AudioClip {
        path: destination.to_path_buf(),
        format: AudioFormat::Mp3,
        duration: Some(duration),
    })
}

/// Duration of a mono sample buffer at the given rate
#[must_use]
pub const fn sample_duration(samples: usize, sample_rate: u32) -> Duration {
    Duration::from_millis((samples as u64).saturating_mul(1000) / sample_rate as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_format_from_extension() {
        let wav = AudioClip::from_path(PathBuf::from("out.wav"));
        assert_eq!(wav.format, AudioFormat::Wav);

        let mp3 = AudioClip::from_path(PathBuf::from("out.mp3"));
        assert_eq!(mp3.format, AudioFormat::Mp3);
    }

    #[test]
    fn missing_clip_is_not_readable() {
        let clip = AudioClip::from_path(PathBuf::from("/nonexistent/clip.mp3"));
        assert!(!clip.is_readable());
    }

    #[test]
    fn empty_clip_is_not_readable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let clip = AudioClip::from_path(file.path().to_path_buf());
        assert!(!clip.is_readable());
    }

    #[test]
    fn duration_of_one_second_buffer() {
        assert_eq!(sample_duration(16000, 16000), Duration::from_secs(1));
        assert_eq!(sample_duration(8000, 16000), Duration::from_millis(500));
    }
}
