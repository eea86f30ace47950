//! Speech endpointing
//!
//! Energy-based detection of where a spoken phrase starts and ends.
//! The threshold is calibrated against ambient noise before listening
//! begins, to cut down on false starts.

/// Floor for the calibrated energy threshold
const MIN_ENERGY_THRESHOLD: f32 = 0.01;

/// Calibrated threshold is ambient RMS times this factor
const AMBIENT_MULTIPLIER: f32 = 1.75;

/// Minimum speech length to accept a phrase (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Trailing silence that ends a phrase (in samples)
const SILENCE_SAMPLES: usize = 12000; // 0.75 seconds

/// State of the endpointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// Waiting for speech to start
    Waiting,
    /// Speech detected, accumulating the phrase
    Speaking,
    /// Phrase complete (trailing silence or phrase limit reached)
    Complete,
}

/// Detects the boundaries of a single spoken phrase
pub struct SpeechEndpointer {
    threshold: f32,
    state: EndpointState,
    phrase_buffer: Vec<f32>,
    silence_counter: usize,
    phrase_limit_samples: Option<usize>,
}

impl SpeechEndpointer {
    /// Create an endpointer with a threshold calibrated from ambient noise
    ///
    /// `ambient_rms` is the RMS energy of a short sampling window recorded
    /// before listening starts; `phrase_limit_samples` caps the phrase
    /// length when set.
    #[must_use]
    pub fn new(ambient_rms: f32, phrase_limit_samples: Option<usize>) -> Self {
        let threshold = (ambient_rms * AMBIENT_MULTIPLIER).max(MIN_ENERGY_THRESHOLD);

        tracing::debug!(ambient_rms, threshold, "endpointer calibrated");

        Self {
            threshold,
            state: EndpointState::Waiting,
            phrase_buffer: Vec::new(),
            silence_counter: 0,
            phrase_limit_samples,
        }
    }

    /// Feed captured samples; returns true once the phrase is complete
    pub fn process(&mut self, samples: &[f32]) -> bool {
        if self.state == EndpointState::Complete {
            return true;
        }

        let is_speech = rms_energy(samples) > self.threshold;

        if self.state == EndpointState::Waiting {
            if !is_speech {
                return false;
            }
            self.state = EndpointState::Speaking;
            self.silence_counter = 0;
            tracing::trace!("speech started");
        }

        self.phrase_buffer.extend_from_slice(samples);

        if is_speech {
            self.silence_counter = 0;
        } else {
            self.silence_counter += samples.len();
        }

        if let Some(limit) = self.phrase_limit_samples
            && self.phrase_buffer.len() >= limit
        {
            self.phrase_buffer.truncate(limit);
            self.state = EndpointState::Complete;
            tracing::debug!(samples = self.phrase_buffer.len(), "phrase limit reached");
            return true;
        }

        if self.silence_counter > SILENCE_SAMPLES {
            let speech_len = self.phrase_buffer.len().saturating_sub(self.silence_counter);
            if speech_len > MIN_SPEECH_SAMPLES {
                self.state = EndpointState::Complete;
                tracing::debug!(samples = self.phrase_buffer.len(), "phrase complete");
                return true;
            }

            // False start: too little speech before the silence
            tracing::trace!(speech_len, "discarding false start");
            self.state = EndpointState::Waiting;
            self.phrase_buffer.clear();
            self.silence_counter = 0;
        }

        false
    }

    /// Whether any speech has been detected yet
    #[must_use]
    pub fn heard_speech(&self) -> bool {
        self.state != EndpointState::Waiting || !self.phrase_buffer.is_empty()
    }

    /// Take the accumulated phrase, clearing the buffer
    pub fn take_phrase(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.phrase_buffer)
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> EndpointState {
        self.state
    }

    /// The calibrated energy threshold
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
pub fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(duration_secs: f32, amplitude: f32) -> Vec<f32> {
        let rate = 16000.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = (rate * duration_secs) as usize;
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f32 / rate;
                amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect()
    }

    fn silence(duration_secs: f32) -> Vec<f32> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = (16000.0 * duration_secs) as usize;
        vec![0.0; n]
    }

    #[test]
    fn energy_calculation() {
        assert!(rms_energy(&silence(0.1)) < 0.001);
        assert!(rms_energy(&vec![0.5f32; 100]) > 0.4);
        assert!(rms_energy(&[]) < f32::EPSILON);
    }

    #[test]
    fn threshold_has_floor() {
        let endpointer = SpeechEndpointer::new(0.0, None);
        assert!(endpointer.threshold() >= MIN_ENERGY_THRESHOLD);
    }

    #[test]
    fn threshold_scales_with_ambient() {
        let endpointer = SpeechEndpointer::new(0.1, None);
        assert!(endpointer.threshold() > 0.1);
    }

    #[test]
    fn silence_never_completes() {
        let mut endpointer = SpeechEndpointer::new(0.0, None);
        for _ in 0..50 {
            assert!(!endpointer.process(&silence(0.1)));
        }
        assert_eq!(endpointer.state(), EndpointState::Waiting);
        assert!(!endpointer.heard_speech());
    }

    #[test]
    fn speech_then_silence_completes() {
        let mut endpointer = SpeechEndpointer::new(0.0, None);

        endpointer.process(&sine(0.5, 0.3));
        assert_eq!(endpointer.state(), EndpointState::Speaking);
        assert!(endpointer.heard_speech());

        let complete = endpointer.process(&silence(1.0));
        assert!(complete);
        assert_eq!(endpointer.state(), EndpointState::Complete);
    }

    #[test]
    fn phrase_limit_caps_buffer() {
        let limit = 16000; // 1 second
        let mut endpointer = SpeechEndpointer::new(0.0, Some(limit));

        // 2 seconds of continuous speech
        let complete = endpointer.process(&sine(2.0, 0.3));
        assert!(complete);

        let phrase = endpointer.take_phrase();
        assert_eq!(phrase.len(), limit);
    }

    #[test]
    fn take_phrase_clears_buffer() {
        let mut endpointer = SpeechEndpointer::new(0.0, None);
        endpointer.process(&sine(0.2, 0.3));

        let phrase = endpointer.take_phrase();
        assert!(!phrase.is_empty());
        assert!(endpointer.take_phrase().is_empty());
    }

    #[test]
    fn brief_noise_burst_does_not_complete() {
        let mut endpointer = SpeechEndpointer::new(0.0, None);

        // Shorter than the minimum speech length
        endpointer.process(&sine(0.1, 0.3));
        let complete = endpointer.process(&silence(1.0));
        assert!(!complete);
    }
}
