//! Error types for the vocalens pipeline

use thiserror::Error;

/// Result type alias for vocalens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voice pipeline
///
/// Only [`Error::Config`] is fatal; every other kind is caught at the
/// boundary of the stage that produced it and ends the run gracefully.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing credential, missing image file)
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device unavailable or stream failure
    #[error("device error: {0}")]
    Device(String),

    /// Network or remote service call failed
    #[error("transport error: {0}")]
    Transport(String),

    /// No native player for the detected operating system
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// No speech detected or no text returned
    #[error("empty result: {0}")]
    EmptyResult(String),

    /// Audio encoding, transcoding, or player process error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error should terminate the process
    ///
    /// Per the propagation policy, only configuration errors are fatal;
    /// everything else is reported and the pipeline ends gracefully.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_config_is_fatal() {
        assert!(Error::Config("missing key".into()).is_fatal());
        assert!(!Error::Device("no mic".into()).is_fatal());
        assert!(!Error::Transport("timeout".into()).is_fatal());
        assert!(!Error::UnsupportedPlatform("plan9".into()).is_fatal());
        assert!(!Error::EmptyResult("silence".into()).is_fatal());
        assert!(!Error::Audio("ffmpeg exited 1".into()).is_fatal());
    }
}
