//! Gain results

use std::fmt;

/// Plain-float stand-in for "not enough samples" used by legacy tag writers
pub const GAIN_NOT_ENOUGH_SAMPLES: f64 = -24601.0;

/// Recommended gain for a title or an album
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GainEstimate {
    /// Gain to apply in dB (negative for loud material)
    Db(f64),
    /// No complete RMS window was analyzed
    NotEnoughSamples,
}

impl GainEstimate {
    /// Gain in dB, if there was enough audio
    pub fn db(self) -> Option<f64> {
        match self {
            Self::Db(db) => Some(db),
            Self::NotEnoughSamples => None,
        }
    }

    /// Check for the not-enough-samples result
    pub fn is_not_enough_samples(self) -> bool {
        matches!(self, Self::NotEnoughSamples)
    }

    /// Gain as a linear amplitude multiplier
    pub fn linear_gain(self) -> Option<f64> {
        self.db().map(|db| 10.0_f64.powf(db / 20.0))
    }

    /// Gain in dB, or [`GAIN_NOT_ENOUGH_SAMPLES`]
    pub fn to_legacy_value(self) -> f64 {
        self.db().unwrap_or(GAIN_NOT_ENOUGH_SAMPLES)
    }
}

impl From<GainEstimate> for Option<f64> {
    fn from(gain: GainEstimate) -> Self {
        gain.db()
    }
}

impl fmt::Display for GainEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Db(db) => write!(f, "{:+.2} dB", db),
            Self::NotEnoughSamples => write!(f, "not enough samples"),
        }
    }
}
