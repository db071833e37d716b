use thiserror::Error;

/// Reason a waveform did not decode to a valid track.
///
/// Variants are listed in the order the decoder detects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    #[error("Not enough peaks found")]
    NotEnoughPeaks,

    #[error("Track 2 start sentinel not found")]
    StartSentinelNotFound,

    #[error("Parity bit check failed on last character read")]
    ParityBitCheckFailed,

    #[error("LRC parity bit check failed")]
    LrcParityBitCheckFailed,

    #[error("LRC is invalid")]
    LrcInvalid,

    #[error("Not enough data for LRC check")]
    NotEnoughDataForLrcCheck,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::NotEnoughPeaks,
        ErrorKind::StartSentinelNotFound,
        ErrorKind::ParityBitCheckFailed,
        ErrorKind::LrcParityBitCheckFailed,
        ErrorKind::LrcInvalid,
        ErrorKind::NotEnoughDataForLrcCheck,
    ];

    /// Legacy numeric status code (0 is success, failures are -1 through -6)
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::NotEnoughPeaks => -1,
            ErrorKind::StartSentinelNotFound => -2,
            ErrorKind::ParityBitCheckFailed => -3,
            ErrorKind::LrcParityBitCheckFailed => -4,
            ErrorKind::LrcInvalid => -5,
            ErrorKind::NotEnoughDataForLrcCheck => -6,
        }
    }

    /// Stable diagnostic name, e.g. `NOT_ENOUGH_PEAKS`
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::NotEnoughPeaks => "NOT_ENOUGH_PEAKS",
            ErrorKind::StartSentinelNotFound => "START_SENTINEL_NOT_FOUND",
            ErrorKind::ParityBitCheckFailed => "PARITY_BIT_CHECK_FAILED",
            ErrorKind::LrcParityBitCheckFailed => "LRC_PARITY_BIT_CHECK_FAILED",
            ErrorKind::LrcInvalid => "LRC_INVALID",
            ErrorKind::NotEnoughDataForLrcCheck => "NOT_ENOUGH_DATA_FOR_LRC_CHECK",
        }
    }
}

/// A failed decode, carrying whatever text was assembled before the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (partial data: {partial:?})")]
pub struct DecodeFailure {
    pub kind: ErrorKind,
    pub partial: String,
}

impl DecodeFailure {
    pub fn new(kind: ErrorKind, partial: impl Into<String>) -> Self {
        Self {
            kind,
            partial: partial.into(),
        }
    }
}

/// Errors outside the decode outcome itself: bad configuration or encoder input.
#[derive(Debug, Error)]
pub enum MagstripeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Character {0:?} cannot be encoded on track 2")]
    InvalidCharacter(char),

    #[error("Empty input")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, MagstripeError>;
