//! Swipe activity gate
//!
//! Cuts a continuous capture into swipe buffers: recording starts at the first
//! sample loud enough to be signal and stops after a fixed run of quiet samples,
//! or once the buffer reaches the configured maximum length.
//! Each emitted buffer is what [`crate::Track2Decoder`] expects as input.

use crate::amplitude::magnitude;
use crate::config::SwipeDetectorConfig;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct SwipeDetector {
    config: SwipeDetectorConfig,
    recording: Option<Vec<i16>>,
    quiet_run: usize,
}

impl SwipeDetector {
    pub fn new(config: SwipeDetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            recording: None,
            quiet_run: 0,
        })
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Feed captured samples, returning every swipe completed within them
    pub fn push(&mut self, chunk: &[i16]) -> Vec<Vec<i16>> {
        let threshold = self.config.quiet_threshold;
        let wait = self.config.quiet_wait_samples;
        let max_len = self.config.max_swipe_samples;
        let mut swipes = Vec::new();

        for &sample in chunk {
            let loud = magnitude(sample) >= threshold;
            match self.recording.as_mut() {
                None => {
                    if loud {
                        self.recording = Some(vec![sample]);
                        self.quiet_run = 0;
                    }
                }
                Some(buffer) => {
                    buffer.push(sample);
                    if loud {
                        self.quiet_run = 0;
                    } else {
                        self.quiet_run += 1;
                    }

                    let full = buffer.len() >= max_len;
                    if full || self.quiet_run >= wait {
                        if full && self.quiet_run < wait {
                            log::warn!("no quiet after {} samples, cutting swipe", max_len);
                        }
                        if let Some(swipe) = self.recording.take() {
                            log::debug!("swipe captured: {} samples", swipe.len());
                            swipes.push(swipe);
                        }
                        self.quiet_run = 0;
                    }
                }
            }
        }

        swipes
    }

    /// End of capture: hand back a swipe still being recorded
    pub fn finish(&mut self) -> Option<Vec<i16>> {
        self.quiet_run = 0;
        self.recording.take()
    }
}

/// Split a whole recording into swipe buffers
pub fn split_swipes(samples: &[i16], config: SwipeDetectorConfig) -> Result<Vec<Vec<i16>>> {
    let mut detector = SwipeDetector::new(config)?;
    let mut swipes = detector.push(samples);
    swipes.extend(detector.finish());
    Ok(swipes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SwipeDetectorConfig {
        SwipeDetectorConfig {
            quiet_threshold: 100,
            quiet_wait_samples: 5,
            max_swipe_samples: 1_000,
        }
    }

    #[test]
    fn test_silence_yields_nothing() {
        assert!(split_swipes(&[0, 10, -99, 50], config()).unwrap().is_empty());
    }

    #[test]
    fn test_swipe_ends_after_quiet_run() {
        let samples = [0, 0, 500, -300, 0, 0, 200, 0, 0, 0, 0, 0, 0, 0, 0];
        let swipes = split_swipes(&samples, config()).unwrap();
        assert_eq!(swipes, vec![vec![500, -300, 0, 0, 200, 0, 0, 0, 0, 0]]);
    }

    #[test]
    fn test_negative_samples_start_a_swipe() {
        let swipes = split_swipes(&[0, -150, 0, 0, 0, 0, 0], config()).unwrap();
        assert_eq!(swipes, vec![vec![-150, 0, 0, 0, 0, 0]]);
    }

    #[test]
    fn test_chunked_feed_matches_batch() {
        let mut samples = vec![0i16; 3];
        samples.extend([400, -400, 400, 0, 0, 0, 0, 0, 0, 0]);
        samples.extend([0, 300, -300, 0, 0]);

        let batch = split_swipes(&samples, config()).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], vec![300, -300, 0, 0]);

        let mut detector = SwipeDetector::new(config()).unwrap();
        let mut streamed = Vec::new();
        for chunk in samples.chunks(4) {
            streamed.extend(detector.push(chunk));
        }
        assert!(detector.is_recording());
        streamed.extend(detector.finish());
        assert_eq!(streamed, batch);
    }

    #[test]
    fn test_constant_signal_is_cut_at_max_length() {
        let config = SwipeDetectorConfig {
            max_swipe_samples: 8,
            ..config()
        };
        let mut samples = vec![500i16; 20];
        samples.extend([0; 10]);

        let swipes = split_swipes(&samples, config).unwrap();
        assert_eq!(
            swipes,
            vec![vec![500; 8], vec![500; 8], vec![500, 500, 500, 500, 0, 0, 0, 0]]
        );

        // A stuck line never grows the buffer past the cap
        let mut detector = SwipeDetector::new(config).unwrap();
        for _ in 0..100 {
            for swipe in detector.push(&[-700; 3]) {
                assert_eq!(swipe.len(), 8);
            }
        }
        assert!(detector.finish().map_or(0, |s| s.len()) < 8);
    }

    #[test]
    fn test_invalid_config() {
        let bad = SwipeDetectorConfig {
            quiet_wait_samples: 0,
            ..config()
        };
        assert!(SwipeDetector::new(bad).is_err());
    }
}
