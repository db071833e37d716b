use crate::error::{MagstripeError, Result};
use crate::{
    ACTIVITY_THRESHOLD_FACTOR, FULL_SCALE, INITIAL_PEAK_FACTOR, MAX_SWIPE_SECONDS,
    PEAK_DECAY_FACTOR, QUIET_THRESHOLD_FACTOR, QUIET_WAIT_SECONDS, SAMPLE_RATE,
};

fn check_factor(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(MagstripeError::InvalidConfig(format!(
            "{} must be in (0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Peak detection thresholds, as fractions of signal magnitude.
///
/// The defaults are tuned for 44.1 kHz capture. Other rates need re-tuning here,
/// the decoder itself has no notion of sample rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecoderConfig {
    /// Fraction of the global peak a sample must exceed to end the leading quiet region
    pub quiet_threshold_factor: f64,
    /// Fraction of the global peak used as the threshold for the first peak
    pub initial_peak_factor: f64,
    /// Fraction of the last peak used as the threshold for the next one
    pub peak_decay_factor: f64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            quiet_threshold_factor: QUIET_THRESHOLD_FACTOR,
            initial_peak_factor: INITIAL_PEAK_FACTOR,
            peak_decay_factor: PEAK_DECAY_FACTOR,
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<()> {
        check_factor("quiet_threshold_factor", self.quiet_threshold_factor)?;
        check_factor("initial_peak_factor", self.initial_peak_factor)?;
        check_factor("peak_decay_factor", self.peak_decay_factor)
    }
}

/// Activity gate used to cut a continuous recording into swipe buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeDetectorConfig {
    /// Minimum sample magnitude treated as signal
    pub quiet_threshold: i32,
    /// Consecutive quiet samples that end a swipe
    pub quiet_wait_samples: usize,
    /// Longest swipe buffer; a recording that stays loud is cut here
    pub max_swipe_samples: usize,
}

impl Default for SwipeDetectorConfig {
    fn default() -> Self {
        Self::for_sample_rate(SAMPLE_RATE)
    }
}

impl SwipeDetectorConfig {
    pub fn for_sample_rate(sample_rate: u32) -> Self {
        Self {
            quiet_threshold: (FULL_SCALE * ACTIVITY_THRESHOLD_FACTOR) as i32,
            quiet_wait_samples: (sample_rate as f64 * QUIET_WAIT_SECONDS) as usize,
            max_swipe_samples: (sample_rate as f64 * MAX_SWIPE_SECONDS) as usize,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.quiet_threshold <= 0 || self.quiet_threshold > i16::MAX as i32 {
            return Err(MagstripeError::InvalidConfig(format!(
                "quiet_threshold must be in 1..=32767, got {}",
                self.quiet_threshold
            )));
        }
        if self.quiet_wait_samples == 0 {
            return Err(MagstripeError::InvalidConfig(
                "quiet_wait_samples must be non-zero".to_string(),
            ));
        }
        if self.max_swipe_samples <= self.quiet_wait_samples {
            return Err(MagstripeError::InvalidConfig(format!(
                "max_swipe_samples ({}) must exceed quiet_wait_samples ({})",
                self.max_swipe_samples, self.quiet_wait_samples
            )));
        }
        Ok(())
    }
}

/// Parameters of the synthetic F2F swipe generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderConfig {
    /// Bit cell length at the start of the swipe, in samples
    pub samples_per_bit: f64,
    /// Bit cell length at the end of the swipe; differs from the start to model acceleration
    pub end_samples_per_bit: f64,
    /// Pulse peak amplitude
    pub amplitude: i16,
    /// Zero bits before the start sentinel
    pub leading_zeros: usize,
    /// Zero bits after the LRC
    pub trailing_zeros: usize,
    /// Silence before and after the flux pulses
    pub silence_samples: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        // ~1500 bits/s: 75 bpi at a 20 in/s swipe
        Self {
            samples_per_bit: 30.0,
            end_samples_per_bit: 30.0,
            amplitude: 16_000,
            leading_zeros: 25,
            trailing_zeros: 25,
            silence_samples: 400,
        }
    }
}

impl EncoderConfig {
    pub fn with_speed(samples_per_bit: f64) -> Self {
        Self {
            samples_per_bit,
            end_samples_per_bit: samples_per_bit,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("samples_per_bit", self.samples_per_bit),
            ("end_samples_per_bit", self.end_samples_per_bit),
        ] {
            if !value.is_finite() || value < 8.0 {
                return Err(MagstripeError::InvalidConfig(format!(
                    "{} must be at least 8 samples, got {}",
                    name, value
                )));
            }
        }
        if self.amplitude <= 0 {
            return Err(MagstripeError::InvalidConfig(format!(
                "amplitude must be positive, got {}",
                self.amplitude
            )));
        }
        if self.leading_zeros < 8 {
            return Err(MagstripeError::InvalidConfig(format!(
                "at least 8 leading zeros are needed for clock calibration, got {}",
                self.leading_zeros
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DecoderConfig::default().validate().is_ok());
        assert!(SwipeDetectorConfig::default().validate().is_ok());
        assert!(EncoderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_swipe_detector_defaults_match_capture_loop() {
        let config = SwipeDetectorConfig::default();
        assert_eq!(config.quiet_threshold, 655);
        assert_eq!(config.quiet_wait_samples, 11_025);
        assert_eq!(config.max_swipe_samples, 441_000);
        assert_eq!(SwipeDetectorConfig::for_sample_rate(48_000).quiet_wait_samples, 12_000);
    }

    #[test]
    fn test_invalid_factors_rejected() {
        let config = DecoderConfig {
            peak_decay_factor: 1.5,
            ..DecoderConfig::default()
        };
        assert!(matches!(config.validate(), Err(MagstripeError::InvalidConfig(_))));

        let config = DecoderConfig {
            initial_peak_factor: f64::NAN,
            ..DecoderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_swipe_cap_must_exceed_quiet_wait() {
        let config = SwipeDetectorConfig {
            max_swipe_samples: 11_025,
            ..SwipeDetectorConfig::default()
        };
        assert!(matches!(config.validate(), Err(MagstripeError::InvalidConfig(_))));
    }

    #[test]
    fn test_encoder_rejects_tiny_cells() {
        assert!(EncoderConfig::with_speed(4.0).validate().is_err());
        let config = EncoderConfig {
            leading_zeros: 2,
            ..EncoderConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
