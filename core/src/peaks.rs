//! Flux transition extraction
//!
//! Every flux reversal on the stripe shows up in the audio as a lobe, and
//! consecutive lobes alternate in polarity. The extractor walks the buffer looking
//! for the next lobe of the expected polarity whose magnitude clears an adaptive
//! threshold, then records its highest sample as a peak.

use crate::amplitude::AmplitudeProfile;
use crate::config::DecoderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn sign(self) -> i32 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

/// Local extremum that exceeded the peak threshold in effect when it was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peak {
    pub index: usize,
    pub magnitude: i32,
    pub polarity: Polarity,
}

/// Locate alternating-polarity peaks starting at `profile.start_index`.
///
/// The first polarity searched for is the opposite of the sample at the start
/// index, so the lobe the start index falls in is never reported. The threshold
/// starts at `initial_peak_factor * max_magnitude` and afterwards tracks
/// `peak_decay_factor` times the most recent peak, following amplitude drift as the
/// swipe speed changes.
pub fn extract_peaks(
    samples: &[i16],
    profile: &AmplitudeProfile,
    config: &DecoderConfig,
) -> Vec<Peak> {
    let Some(&first) = samples.get(profile.start_index) else {
        return Vec::new();
    };

    let mut polarity = if first >= 0 {
        Polarity::Negative
    } else {
        Polarity::Positive
    };
    let mut threshold = profile.max_magnitude as f64 * config.initial_peak_factor;
    let mut peaks = Vec::new();
    let mut pos = profile.start_index;

    while pos < samples.len() {
        // Highest point of the run of samples above threshold, if any
        let mut best: Option<(usize, i32)> = None;
        while pos < samples.len() {
            let value = samples[pos] as i32 * polarity.sign();
            if value as f64 <= threshold {
                break;
            }
            if best.map_or(true, |(_, top)| value > top) {
                best = Some((pos, value));
            }
            pos += 1;
        }

        if let Some((index, magnitude)) = best {
            peaks.push(Peak {
                index,
                magnitude,
                polarity,
            });
            polarity = polarity.flipped();
            threshold = magnitude as f64 * config.peak_decay_factor;
        }

        pos += 1;
    }

    peaks
}

/// Sample-count gaps between consecutive peaks
pub fn peak_distances(peaks: &[Peak]) -> Vec<usize> {
    peaks
        .windows(2)
        .map(|pair| pair[1].index - pair[0].index)
        .collect()
}
