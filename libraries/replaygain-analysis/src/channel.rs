//! Per-channel filter pipeline
//!
//! Raw samples run through the equal-loudness filter, then the RMS weighting
//! filter, and the squared result feeds the window accumulator.
//!
//! Buffer layout (all indices relative to the current RMS window):
//!
//! ```text
//! history: [ last MAX_ORDER raw samples of previous blocks | first MAX_ORDER of this block ]
//! step:    [ MAX_ORDER carried stage-1 outputs | stage-1 outputs of this window ... ]
//! out:     [ MAX_ORDER carried stage-2 outputs | stage-2 outputs of this window ... ]
//! ```
//!
//! When a window closes its trailing `MAX_ORDER` outputs move to the front,
//! so the filters see one continuous signal no matter how the caller splits
//! the stream into blocks.

use crate::coefficients::{ButterCoefficients, YuleCoefficients, MAX_ORDER};
use crate::filter::DENORMAL_BIAS;
use crate::MAX_WINDOW_LEN;

/// Filter coefficient pair for one sample rate
#[derive(Debug, Clone, Copy)]
pub(crate) struct FilterPair {
    pub yule: &'static YuleCoefficients,
    pub butter: &'static ButterCoefficients,
}

/// Filter state and buffers for one audio channel
#[derive(Debug, Clone)]
pub(crate) struct ChannelPipeline {
    /// Raw input history followed by the head of the current block
    history: [f32; 2 * MAX_ORDER],
    /// Stage-1 (equal-loudness) output with carried history
    step: Box<[f32]>,
    /// Stage-2 (RMS weighting) output with carried history
    out: Box<[f32]>,
}

impl ChannelPipeline {
    pub fn new() -> Self {
        Self {
            history: [0.0; 2 * MAX_ORDER],
            step: vec![0.0; MAX_WINDOW_LEN + MAX_ORDER].into_boxed_slice(),
            out: vec![0.0; MAX_WINDOW_LEN + MAX_ORDER].into_boxed_slice(),
        }
    }

    /// Zero all filter history
    pub fn clear(&mut self) {
        self.history.fill(0.0);
        self.step[..MAX_ORDER].fill(0.0);
        self.out[..MAX_ORDER].fill(0.0);
    }

    /// Stage the head of a new block behind the carried raw history.
    ///
    /// Must be called once per block before [`filter_chunk`](Self::filter_chunk).
    pub fn begin_block(&mut self, block: &[f32]) {
        let head = block.len().min(MAX_ORDER);
        self.history[MAX_ORDER..MAX_ORDER + head].copy_from_slice(&block[..head]);
    }

    /// Filter `len` samples of `block` starting at `pos`, placing them at
    /// `window_pos` inside the current window.
    ///
    /// While `pos < MAX_ORDER` the input comes from the history buffer, whose
    /// lower half supplies the samples before the block; the caller must keep
    /// such chunks within `MAX_ORDER - pos` samples.
    pub fn filter_chunk(
        &mut self,
        filters: FilterPair,
        block: &[f32],
        pos: usize,
        len: usize,
        window_pos: usize,
    ) {
        let input = if pos < MAX_ORDER {
            debug_assert!(pos + len <= MAX_ORDER);
            &self.history[pos..MAX_ORDER + pos + len]
        } else {
            &block[pos - MAX_ORDER..pos + len]
        };

        let span = window_pos..window_pos + MAX_ORDER + len;
        filters
            .yule
            .apply(DENORMAL_BIAS, input, &mut self.step[span.clone()], MAX_ORDER);
        filters
            .butter
            .apply(0.0, &self.step[span.clone()], &mut self.out[span], MAX_ORDER);
    }

    /// Sum of squared stage-2 outputs over the first `window_len` samples
    /// of the current window.
    ///
    /// Summed in one pass at window close, so the result does not depend on
    /// how the window was filled.
    pub fn window_energy(&self, window_len: usize) -> f64 {
        self.out[MAX_ORDER..MAX_ORDER + window_len]
            .iter()
            .map(|&s| {
                let s = f64::from(s);
                s * s
            })
            .sum()
    }

    /// Carry the last `MAX_ORDER` filter outputs of a closed window to the front
    pub fn close_window(&mut self, window_len: usize) {
        self.step.copy_within(window_len..window_len + MAX_ORDER, 0);
        self.out.copy_within(window_len..window_len + MAX_ORDER, 0);
    }

    /// Keep the true last `MAX_ORDER` raw samples for the next block
    pub fn end_block(&mut self, block: &[f32]) {
        let n = block.len();
        if n < MAX_ORDER {
            // The block already sits at history[MAX_ORDER..MAX_ORDER + n]
            self.history.copy_within(n..n + MAX_ORDER, 0);
        } else {
            self.history[..MAX_ORDER].copy_from_slice(&block[n - MAX_ORDER..]);
        }
    }
}
