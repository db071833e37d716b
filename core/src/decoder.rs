use crate::amplitude::analyze;
use crate::bits::assign_bits;
use crate::config::DecoderConfig;
use crate::error::{DecodeFailure, Result};
use crate::framing::parse_track;
use crate::peaks::{extract_peaks, peak_distances};

/// Track 2 decoder for a fully buffered swipe
///
/// Stateless between calls: every decode runs amplitude analysis, peak extraction,
/// bit assignment, framing and LRC validation from scratch, so one decoder can be
/// shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Track2Decoder {
    config: DecoderConfig,
}

/// Outcome of one decode plus the pipeline statistics behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub outcome: std::result::Result<String, DecodeFailure>,
    pub max_magnitude: i32,
    pub start_index: usize,
    pub peak_count: usize,
    pub bit_count: usize,
}

impl DecodeReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Decoded text, or the partial text assembled before the failure
    pub fn text(&self) -> &str {
        match &self.outcome {
            Ok(text) => text,
            Err(failure) => &failure.partial,
        }
    }

    pub fn error_kind(&self) -> Option<crate::ErrorKind> {
        self.outcome.as_ref().err().map(|failure| failure.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Result of decoding a swipe in either direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeDecode {
    /// Direction of the decode that produced `report`
    pub direction: Direction,
    pub report: DecodeReport,
    /// Forward failure when the reversed buffer had to be tried
    pub forward_failure: Option<DecodeFailure>,
}

impl Track2Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a buffer of mono 16-bit samples into track 2 text (`;...?`)
    pub fn decode(&self, samples: &[i16]) -> std::result::Result<String, DecodeFailure> {
        self.analyze(samples).outcome
    }

    /// Decode and keep the intermediate statistics
    pub fn analyze(&self, samples: &[i16]) -> DecodeReport {
        let profile = analyze(samples, self.config.quiet_threshold_factor);
        let peaks = extract_peaks(samples, &profile, &self.config);
        let distances = peak_distances(&peaks);

        log::debug!(
            "{} samples, max magnitude {}, signal from {}, {} peaks",
            samples.len(),
            profile.max_magnitude,
            profile.start_index,
            peaks.len()
        );

        let mut report = DecodeReport {
            outcome: Ok(String::new()),
            max_magnitude: profile.max_magnitude,
            start_index: profile.start_index,
            peak_count: peaks.len(),
            bit_count: 0,
        };

        let stream = match assign_bits(&distances) {
            Ok(stream) => stream,
            Err(kind) => {
                report.outcome = Err(DecodeFailure::new(kind, ""));
                return report;
            }
        };
        report.bit_count = stream.bits.len();
        log::trace!("bits: {:?}", stream.bits);

        report.outcome = parse_track(&stream.bits);
        match &report.outcome {
            Ok(text) => log::debug!("decoded {:?}", text),
            Err(failure) => log::debug!("decode failed: {}", failure),
        }
        report
    }

    /// Decode forwards and, on failure, once more with the samples reversed.
    ///
    /// Handles a card swiped in the opposite direction. The reversed result is
    /// final even if it also fails.
    ///
    /// A reversed swipe occasionally frames as the empty track `;?` with a
    /// matching LRC. That counts as a forward success, so the retry does not
    /// run. Treat a `;?` result as a likely backwards swipe.
    pub fn decode_bidirectional(&self, samples: &[i16]) -> SwipeDecode {
        let forward = self.analyze(samples);
        if forward.is_success() {
            return SwipeDecode {
                direction: Direction::Forward,
                report: forward,
                forward_failure: None,
            };
        }
        let forward_failure = forward.outcome.err();

        if let Some(failure) = &forward_failure {
            log::debug!("forward decode failed ({}), retrying reversed", failure.kind);
        }
        let reversed: Vec<i16> = samples.iter().rev().copied().collect();
        SwipeDecode {
            direction: Direction::Reverse,
            report: self.analyze(&reversed),
            forward_failure,
        }
    }
}

/// Decode with the default thresholds
pub fn decode(samples: &[i16]) -> std::result::Result<String, DecodeFailure> {
    Track2Decoder::new().decode(samples)
}

/// [`Track2Decoder::decode_bidirectional`] with the default thresholds
pub fn decode_bidirectional(samples: &[i16]) -> SwipeDecode {
    Track2Decoder::new().decode_bidirectional(samples)
}
