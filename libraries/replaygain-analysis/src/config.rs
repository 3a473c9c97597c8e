//! Analyzer configuration

use crate::error::{GainAnalysisError, Result};
use crate::{PINK_REFERENCE_DB, RMS_PERCENTILE};

/// Sample scale for callers whose full scale is 1.0 (16-bit full scale)
pub const NORMALIZED_SAMPLE_SCALE: f64 = 32768.0;

/// Settings for a [`GainAnalyzer`](crate::GainAnalyzer)
///
/// The defaults reproduce the reference ReplayGain algorithm. The calibration
/// level assumes samples in 16-bit integer units (full scale = 32768); callers
/// feeding floats in the -1.0..1.0 range should use
/// [`AnalyzerConfig::normalized`].
///
/// # Example
///
/// ```
/// use replaygain_analysis::AnalyzerConfig;
///
/// let config = AnalyzerConfig::normalized().with_reference_level(64.82);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    /// Calibration level in dB; the gain is this minus the measured level
    pub reference_level_db: f64,
    /// Fraction of RMS windows that must be at or below the measured level
    pub percentile: f64,
    /// Factor converting caller samples to 16-bit integer units
    pub sample_scale: f64,
}

impl AnalyzerConfig {
    /// Configuration for samples already in 16-bit integer units
    pub fn new() -> Self {
        Self {
            reference_level_db: PINK_REFERENCE_DB,
            percentile: RMS_PERCENTILE,
            sample_scale: 1.0,
        }
    }

    /// Configuration for floating point samples with full scale 1.0
    pub fn normalized() -> Self {
        Self::new().with_sample_scale(NORMALIZED_SAMPLE_SCALE)
    }

    /// Use a custom calibration level
    pub fn with_reference_level(mut self, reference_level_db: f64) -> Self {
        self.reference_level_db = reference_level_db;
        self
    }

    /// Use a custom loudness percentile (0.0 exclusive to 1.0 inclusive)
    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.percentile = percentile;
        self
    }

    /// Use a custom sample scale
    pub fn with_sample_scale(mut self, sample_scale: f64) -> Self {
        self.sample_scale = sample_scale;
        self
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<()> {
        if !self.reference_level_db.is_finite() {
            return Err(GainAnalysisError::InvalidConfig(format!(
                "reference level must be finite, got {}",
                self.reference_level_db
            )));
        }
        if !(self.percentile > 0.0 && self.percentile <= 1.0) {
            return Err(GainAnalysisError::InvalidConfig(format!(
                "percentile must be in (0, 1], got {}",
                self.percentile
            )));
        }
        if !(self.sample_scale.is_finite() && self.sample_scale > 0.0) {
            return Err(GainAnalysisError::InvalidConfig(format!(
                "sample scale must be finite and positive, got {}",
                self.sample_scale
            )));
        }
        Ok(())
    }

    /// Square of the sample scale, applied to window mean squares
    pub(crate) fn energy_scale(&self) -> f64 {
        self.sample_scale * self.sample_scale
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::new()
    }
}
