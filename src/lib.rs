//! vocalens - voice-driven image Q&A
//!
//! Speak a question about a picture, hear the answer. Five stages run in
//! sequence, each handing the next a file path or a string:
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │ AudioCapture│──▶│ Transcriber │──▶│ VisionQuery │
//! │ mic → mp3   │   │ Groq Whisper│   │ Groq vision │
//! └─────────────┘   └─────────────┘   └──────┬──────┘
//!                                            │
//! ┌─────────────┐   ┌─────────────┐          │
//! │  Playback   │◀──│ Synthesizer │◀─────────┘
//! │ native OS   │   │ gTTS / 11L  │
//! └─────────────┘   └─────────────┘
//! ```
//!
//! Stages run strictly in sequence; only configuration errors are fatal,
//! everything else halts the run gracefully with a logged cause.

pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod stt;
pub mod tts;
pub mod vision;

pub use config::{ApiKeys, Config, SttModel, TtsBackend, VisionModel};
pub use error::{Error, Result};
pub use pipeline::Pipeline;
