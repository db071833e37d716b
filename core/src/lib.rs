//! Magnetic stripe track 2 reader for audio input
//!
//! Decodes Aiken Biphase (F2F) flux transitions captured through a microphone or
//! line-in jack back into track 2 characters, validating per-character odd parity
//! and the trailing LRC.

pub mod error;
pub mod config;
pub mod amplitude;
pub mod peaks;
pub mod bits;
pub mod framing;
pub mod lrc;
pub mod decoder;
pub mod track2;
pub mod encoder;
pub mod capture;
pub mod resample;

pub use config::{DecoderConfig, EncoderConfig, SwipeDetectorConfig};
pub use decoder::{
    decode, decode_bidirectional, DecodeReport, Direction, SwipeDecode, Track2Decoder,
};
pub use encoder::Track2Encoder;
pub use capture::{split_swipes, SwipeDetector};
pub use error::{DecodeFailure, ErrorKind, MagstripeError, Result};

// Audio configuration
pub const SAMPLE_RATE: u32 = 44_100; // validated operating rate
pub const FULL_SCALE: f64 = 32768.0;

// Decoder thresholds (fractions of peak magnitude)
pub const QUIET_THRESHOLD_FACTOR: f64 = 0.4;
pub const INITIAL_PEAK_FACTOR: f64 = 0.3;
pub const PEAK_DECAY_FACTOR: f64 = 0.8;

// Track 2 character layout
pub const CALIBRATION_DISTANCES: usize = 4;
pub const DATA_BITS_PER_CHAR: usize = 4;
pub const BITS_PER_CHAR: usize = DATA_BITS_PER_CHAR + 1; // + odd parity
pub const CHAR_BASE: u8 = 0x30;
pub const START_SENTINEL: char = ';';
pub const END_SENTINEL: char = '?';
/// Data bits of `;` (0x0B) in transmission order, before its parity bit
pub const START_SENTINEL_BITS: [u8; DATA_BITS_PER_CHAR] = [1, 1, 0, 1];

// Capture gate: 2% of full scale counts as activity, 0.25 s of quiet ends a swipe
pub const ACTIVITY_THRESHOLD_FACTOR: f64 = 0.02;
pub const QUIET_WAIT_SECONDS: f64 = 0.25;
pub const MAX_SWIPE_SECONDS: f64 = 10.0;
