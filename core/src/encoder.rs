//! Synthetic swipe generator
//!
//! Produces the waveform a playback head would hand to the sound card: one
//! pulse per flux reversal, alternating in polarity, with a reversal at every
//! cell boundary and another mid-cell for each `1`. Pulse amplitude follows swipe
//! speed, as the induced head voltage does.

use crate::config::EncoderConfig;
use crate::error::Result;
use crate::track2::frame_bits;
use std::f64::consts::PI;

#[derive(Debug, Clone, Default)]
pub struct Track2Encoder {
    config: EncoderConfig,
}

impl Track2Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Track bit image for `data` using this encoder's zero padding
    pub fn frame_bits(&self, data: &str) -> Result<Vec<u8>> {
        frame_bits(data, self.config.leading_zeros, self.config.trailing_zeros)
    }

    /// Encode card data (without sentinels) into a swipe waveform
    pub fn encode(&self, data: &str) -> Result<Vec<i16>> {
        let bits = self.frame_bits(data)?;
        Ok(self.modulate(&bits))
    }

    /// Length in samples of cell `index` out of `cells`
    fn cell_length(&self, index: usize, cells: usize) -> f64 {
        let start = self.config.samples_per_bit;
        let end = self.config.end_samples_per_bit;
        if cells <= 1 {
            return start;
        }
        start + (end - start) * index as f64 / (cells - 1) as f64
    }

    /// F2F-modulate an arbitrary bit sequence
    pub fn modulate(&self, bits: &[u8]) -> Vec<i16> {
        let config = &self.config;

        // (position, length of the cell it belongs to)
        let mut transitions: Vec<(f64, f64)> = Vec::with_capacity(bits.len() * 2 + 1);
        let mut position = config.silence_samples as f64;
        let mut cell = config.samples_per_bit;
        for (index, &bit) in bits.iter().enumerate() {
            cell = self.cell_length(index, bits.len());
            transitions.push((position, cell));
            if bit != 0 {
                transitions.push((position + cell / 2.0, cell));
            }
            position += cell;
        }
        transitions.push((position, cell));

        let shortest = config.samples_per_bit.min(config.end_samples_per_bit);
        let half_width = ((shortest / 4.0) as usize).saturating_sub(1).max(1);
        let total = position.round() as usize + half_width + config.silence_samples + 1;
        let mut samples = vec![0i16; total];

        for (n, &(at, cell)) in transitions.iter().enumerate() {
            let polarity = if n % 2 == 0 { 1.0 } else { -1.0 };
            let peak = config.amplitude as f64 * (shortest / cell) * polarity;
            let centre = at.round() as isize;

            for offset in -(half_width as isize)..=half_width as isize {
                let shape = 0.5 + 0.5 * (PI * offset as f64 / (half_width + 1) as f64).cos();
                let Ok(index) = usize::try_from(centre + offset) else {
                    continue;
                };
                if let Some(slot) = samples.get_mut(index) {
                    *slot = (peak * shape)
                        .round()
                        .clamp(i16::MIN as f64, i16::MAX as f64) as i16;
                }
            }
        }

        log::debug!(
            "modulated {} bits into {} samples ({} flux reversals)",
            bits.len(),
            samples.len(),
            transitions.len()
        );
        samples
    }
}
