//! Audio capture from microphone

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};

use crate::audio::endpoint::{SpeechEndpointer, rms_energy};
use crate::audio::{AudioClip, write_mp3};
use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Ambient noise sampling window before listening starts
const CALIBRATION_WINDOW: Duration = Duration::from_secs(1);

/// How often the capture buffer is drained while listening
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Captures audio from the default input device
pub struct AudioCapture {
    device: Device,
    config: StreamConfig,
    buffer: Arc<Mutex<Vec<f32>>>,
}

impl AudioCapture {
    /// Open the default input device
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if no input device is available or none
    /// supports 16kHz mono capture
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Device("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Device(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Device("no suitable audio config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "audio capture initialized"
        );

        Ok(Self {
            device,
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Record one spoken phrase and write it as an MP3 clip
    ///
    /// Calibrates a noise threshold against a short ambient window, then
    /// listens until the phrase ends, `phrase_time_limit` elapses, or
    /// `timeout` passes without any speech. The input stream is a scoped
    /// local, so the device is released on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the stream cannot be built,
    /// [`Error::EmptyResult`] if no speech arrives within `timeout`, and
    /// [`Error::Audio`] if transcoding fails
    pub fn record(
        &self,
        destination: &Path,
        timeout: Duration,
        phrase_time_limit: Option<Duration>,
    ) -> Result<AudioClip> {
        self.clear_buffer();
        let stream = self.build_stream()?;
        stream.play().map_err(|e| Error::Device(e.to_string()))?;

        tracing::info!("adjusting for ambient noise...");
        std::thread::sleep(CALIBRATION_WINDOW);
        let ambient_rms = rms_energy(&self.take_buffer());

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let phrase_limit_samples = phrase_time_limit
            .map(|d| (d.as_secs_f64() * f64::from(SAMPLE_RATE)) as usize);
        let mut endpointer = SpeechEndpointer::new(ambient_rms, phrase_limit_samples);

        tracing::info!("start speaking now...");
        let started = Instant::now();

        loop {
            std::thread::sleep(POLL_INTERVAL);
            let chunk = self.take_buffer();

            if endpointer.process(&chunk) {
                break;
            }

            if !endpointer.heard_speech() && started.elapsed() >= timeout {
                return Err(Error::EmptyResult(format!(
                    "no speech detected within {}s",
                    timeout.as_secs()
                )));
            }
        }

        drop(stream);
        tracing::info!("recording complete");

        let phrase = endpointer.take_phrase();
        let clip = write_mp3(&phrase, SAMPLE_RATE, destination)?;
        tracing::info!(path = %destination.display(), "audio saved");

        Ok(clip)
    }

    /// Build the input stream feeding the shared buffer
    fn build_stream(&self) -> Result<Stream> {
        let buffer = Arc::clone(&self.buffer);

        self.device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Device(e.to_string()))
    }

    /// Get captured audio and clear the buffer
    fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    fn clear_buffer(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }
}
