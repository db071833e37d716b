//! Audio format helpers for feeding arbitrary recordings to the decoder
//! Uses linear interpolation for rate conversion

use crate::error::{MagstripeError, Result};

/// Mix interleaved multi-channel audio to mono by averaging the channels
///
/// # Arguments
/// * `interleaved` - Interleaved samples [L, R, L, R, ...]
/// * `channels` - Number of channels
///
/// # Returns
/// Mono samples; a trailing partial frame is dropped
pub fn downmix_to_mono(interleaved: &[i16], channels: usize) -> Result<Vec<i16>> {
    if channels == 0 {
        return Err(MagstripeError::InvalidConfig(
            "channel count must be non-zero".to_string(),
        ));
    }
    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    let mono = interleaved
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect();
    Ok(mono)
}

/// Resample audio to a target sample rate using linear interpolation
///
/// # Arguments
/// * `samples` - Input audio samples
/// * `from_rate` - Current sample rate in Hz
/// * `to_rate` - Target sample rate in Hz
///
/// # Example
/// ```
/// use magswipe_core::resample::resample;
///
/// let audio_22k = vec![0i16, 100, 200, 300];
/// let audio_44k = resample(&audio_22k, 22_050, 44_100);
/// assert_eq!(audio_44k.len(), 8);
/// assert_eq!(audio_44k[1], 50);
/// ```
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let new_length = ((samples.len() as f64) * ratio).ceil() as usize;
    let last = samples.len() - 1;
    let mut resampled = Vec::with_capacity(new_length);

    for i in 0..new_length {
        let src_idx = i as f64 / ratio;
        let floor = (src_idx.floor() as usize).min(last);
        let fraction = src_idx - floor as f64;

        let interpolated = if floor < last {
            samples[floor] as f64 * (1.0 - fraction) + samples[floor + 1] as f64 * fraction
        } else {
            samples[last] as f64
        };

        resampled.push(interpolated.round() as i16);
    }

    resampled
}

/// Convert float samples in [-1.0, 1.0] to 16-bit PCM, clamping out-of-range values
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
        .collect()
}
