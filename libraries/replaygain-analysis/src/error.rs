//! Error types for gain analysis

use thiserror::Error;

/// Result type for gain analysis operations
pub type Result<T> = std::result::Result<T, GainAnalysisError>;

/// Errors that can occur during gain analysis
///
/// Running out of samples is not an error: gain reads report it through
/// [`GainEstimate::NotEnoughSamples`](crate::GainEstimate::NotEnoughSamples).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GainAnalysisError {
    /// No filter coefficients exist for this sample rate
    #[error("Unsupported sample rate: {0} Hz (supported: 8000, 11025, 12000, 16000, 22050, 24000, 32000, 44100, 48000, 64000, 88200, 96000)")]
    UnsupportedSampleRate(u32),

    /// Channel count other than mono or stereo
    #[error("Invalid channel count: {0} (must be 1 or 2)")]
    InvalidChannelCount(usize),

    /// Left and right blocks differ in length
    #[error("Channel length mismatch: left has {left} samples, right has {right}")]
    ChannelLengthMismatch {
        /// Samples in the left block
        left: usize,
        /// Samples in the right block
        right: usize,
    },

    /// Interleaved buffer does not hold a whole number of frames
    #[error("Sample count {len} is not divisible by channel count {channels}")]
    InvalidInterleavedLength {
        /// Number of samples in the buffer
        len: usize,
        /// Channels per frame
        channels: usize,
    },

    /// The analyzer has not been given a sample rate yet
    #[error("Gain analysis used before initialization with a sample rate")]
    NotInitialized,

    /// Configuration values out of range
    #[error("Invalid analyzer configuration: {0}")]
    InvalidConfig(String),

    /// Internal consistency failure: the current RMS window overflowed.
    ///
    /// Unreachable unless the analyzer itself is broken.
    #[error("Internal error: RMS window holds {filled} samples but is only {window} long")]
    WindowOverflow {
        /// Samples accumulated in the current window
        filled: usize,
        /// Configured window length
        window: usize,
    },
}
