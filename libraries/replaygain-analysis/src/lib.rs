//! Streaming ReplayGain analysis
//!
//! This crate computes the recommended playback gain for a title (one track)
//! and for an album (every title analyzed so far), following the classic
//! ReplayGain algorithm:
//!
//! - Equal-loudness filtering (10th-order Yule-Walker + 2nd-order Butterworth)
//! - Mean square energy over 50 ms windows, collected in a 0.01 dB histogram
//! - The 95th percentile window level, offset against a 64.82 dB calibration
//!
//! Samples can arrive in blocks of any size. Filter state is carried across
//! calls, so the result does not depend on how the stream is split.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    ┌───────────────┐    ┌──────────────┐    ┌─────────────┐
//! │ PCM blocks  │ ─► │ Yule → Butter │ ─► │ RMS windows  │ ─► │ Title hist. │
//! └─────────────┘    │ (per channel) │    │ (50 ms)      │    └─────────────┘
//!                    └───────────────┘    └──────────────┘           │ title_gain()
//!                                                                    ▼
//!                                                             ┌─────────────┐
//!                                                             │ Album hist. │
//!                                                             └─────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use replaygain_analysis::{AnalyzerConfig, GainAnalyzer};
//!
//! // Samples in the -1.0..1.0 range
//! let mut analyzer = GainAnalyzer::with_config(AnalyzerConfig::normalized())?;
//! analyzer.initialize(48000)?;
//!
//! for track in [0.5_f32, 0.25] {
//!     let samples: Vec<f32> = (0..48000 * 2)
//!         .map(|i| track * (i as f32 * 2.0 * std::f32::consts::PI * 1000.0 / 48000.0).sin())
//!         .collect();
//!     for block in samples.chunks(4096) {
//!         analyzer.analyze_mono(block)?;
//!     }
//!     println!("Track gain: {}", analyzer.title_gain()?);
//! }
//! println!("Album gain: {}", analyzer.album_gain()?);
//! # Ok::<(), replaygain_analysis::GainAnalysisError>(())
//! ```

#![deny(unsafe_code)]

mod analyzer;
mod channel;
mod coefficients;
mod config;
mod error;
mod filter;
mod gain;
mod histogram;

pub use analyzer::GainAnalyzer;
pub use coefficients::{
    ButterCoefficients, IirCoefficients, SampleRate, YuleCoefficients, BUTTER_ORDER, MAX_ORDER,
    YULE_ORDER,
};
pub use config::{AnalyzerConfig, NORMALIZED_SAMPLE_SCALE};
pub use error::{GainAnalysisError, Result};
pub use filter::DENORMAL_BIAS;
pub use gain::{GainEstimate, GAIN_NOT_ENOUGH_SAMPLES};
pub use histogram::LoudnessHistogram;

/// Calibration level in dB (pink noise reference)
pub const PINK_REFERENCE_DB: f64 = 64.82;

/// Fraction of RMS windows at or below the measured loudness
pub const RMS_PERCENTILE: f64 = 0.95;

/// Length of one RMS window in seconds
pub const RMS_WINDOW_SECONDS: f64 = 0.050;

/// Histogram buckets per dB
pub const STEPS_PER_DB: f64 = 100.0;

/// Upper end of the histogram in dB (typical material sits at 70..80 dB)
pub const MAX_DB: f64 = 120.0;

/// Number of histogram buckets (`STEPS_PER_DB * MAX_DB`)
pub const HISTOGRAM_LEN: usize = 12_000;

/// Highest supported sample rate in Hz
pub const MAX_SAMPLE_RATE_HZ: u32 = 96_000;

/// Samples in the longest RMS window (50 ms at the highest rate)
pub const MAX_WINDOW_LEN: usize = MAX_SAMPLE_RATE_HZ as usize / 20;
