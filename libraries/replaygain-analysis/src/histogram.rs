//! Loudness histogram and percentile gain estimation
//!
//! Every closed RMS window lands in one bucket of 0.01 dB width covering
//! 0..120 dB. The gain estimate picks the level that the configured
//! percentile of windows stays at or below, so short loud peaks are ignored.

use crate::gain::GainEstimate;
use crate::{HISTOGRAM_LEN, STEPS_PER_DB};

/// Window counts per quantized loudness level
#[derive(Debug, Clone, PartialEq)]
pub struct LoudnessHistogram {
    bins: Box<[u32]>,
}

impl LoudnessHistogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        Self {
            bins: vec![0; HISTOGRAM_LEN].into_boxed_slice(),
        }
    }

    /// Bucket index for a window's mean square value.
    ///
    /// The level is `10 * log10(mean_square)` in dB, quantized toward zero
    /// at [`STEPS_PER_DB`] and clamped into the table. The tiny floor keeps
    /// silence away from `log10(0)`.
    pub fn bucket_for(mean_square: f64) -> usize {
        let level = STEPS_PER_DB * 10.0 * (mean_square + 1e-37).log10();
        // `as` saturates, and NaN maps to 0
        (level as i64).clamp(0, HISTOGRAM_LEN as i64 - 1) as usize
    }

    /// Count one window at `bucket`
    pub fn record(&mut self, bucket: usize) {
        let bucket = bucket.min(HISTOGRAM_LEN - 1);
        self.bins[bucket] = self.bins[bucket].saturating_add(1);
    }

    /// Add every bucket of `other` into this histogram
    pub fn merge(&mut self, other: &LoudnessHistogram) {
        for (bin, &count) in self.bins.iter_mut().zip(other.bins.iter()) {
            *bin = bin.saturating_add(count);
        }
    }

    /// Reset all buckets to zero
    pub fn clear(&mut self) {
        self.bins.fill(0);
    }

    /// Total number of recorded windows
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&c| u64::from(c)).sum()
    }

    /// Check whether no window has been recorded
    pub fn is_empty(&self) -> bool {
        self.bins.iter().all(|&c| c == 0)
    }

    /// Count at a bucket
    pub fn count(&self, bucket: usize) -> u32 {
        self.bins.get(bucket).copied().unwrap_or(0)
    }

    /// Bucket holding the loudness level for `percentile`.
    ///
    /// Scans from the loudest bucket down until the windows seen cover
    /// `ceil(total * (1 - percentile))`. Returns `None` for an empty histogram.
    pub fn percentile_bucket(&self, percentile: f64) -> Option<usize> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let mut upper = ((total as f64) * (1.0 - percentile)).ceil().max(1.0) as u64;
        for (bucket, &count) in self.bins.iter().enumerate().rev() {
            let count = u64::from(count);
            if count >= upper {
                return Some(bucket);
            }
            upper -= count;
        }
        Some(0)
    }

    /// Gain that brings the percentile level to `reference_level_db`
    pub fn gain(&self, percentile: f64, reference_level_db: f64) -> GainEstimate {
        match self.percentile_bucket(percentile) {
            Some(bucket) => GainEstimate::Db(reference_level_db - bucket as f64 / STEPS_PER_DB),
            None => GainEstimate::NotEnoughSamples,
        }
    }
}

impl Default for LoudnessHistogram {
    fn default() -> Self {
        Self::new()
    }
}
