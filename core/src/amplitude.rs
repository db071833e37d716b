/// Global amplitude statistics of a swipe buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmplitudeProfile {
    /// Largest absolute sample value
    pub max_magnitude: i32,
    /// Index of the first sample louder than the quiet threshold, 0 if none
    pub start_index: usize,
}

#[inline]
pub fn magnitude(sample: i16) -> i32 {
    (sample as i32).abs()
}

/// Find the peak magnitude and where the leading quiet region ends.
///
/// The quiet threshold is `quiet_threshold_factor * max_magnitude`. An empty or
/// silent buffer yields a zero profile, which the peak extractor turns into no peaks.
pub fn analyze(samples: &[i16], quiet_threshold_factor: f64) -> AmplitudeProfile {
    let max_magnitude = samples.iter().map(|&s| magnitude(s)).max().unwrap_or(0);

    let quiet_threshold = max_magnitude as f64 * quiet_threshold_factor;
    let start_index = samples
        .iter()
        .position(|&s| magnitude(s) as f64 > quiet_threshold)
        .unwrap_or(0);

    AmplitudeProfile {
        max_magnitude,
        start_index,
    }
}
