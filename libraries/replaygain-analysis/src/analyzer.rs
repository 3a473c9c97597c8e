//! Streaming ReplayGain analyzer
//!
//! [`GainAnalyzer`] is the analysis context. It must be initialized with a
//! sample rate before use, then accepts sample blocks of any size. Reading the
//! title gain closes the current title and folds it into the album; reading
//! the album gain changes nothing.

use crate::channel::{ChannelPipeline, FilterPair};
use crate::coefficients::{SampleRate, MAX_ORDER};
use crate::config::AnalyzerConfig;
use crate::error::{GainAnalysisError, Result};
use crate::gain::GainEstimate;
use crate::histogram::LoudnessHistogram;
use tracing::{debug, error, trace};

/// Frames converted per step by the interleaved entry points
const CONVERT_BLOCK_FRAMES: usize = 1024;

/// Streaming state fixed by one sample rate
#[derive(Debug, Clone)]
struct StreamState {
    rate: SampleRate,
    filters: FilterPair,
    window_len: usize,
    left: ChannelPipeline,
    right: ChannelPipeline,
    window_fill: usize,
    title: LoudnessHistogram,
}

impl StreamState {
    fn new(rate: SampleRate) -> Self {
        Self {
            rate,
            filters: FilterPair {
                yule: rate.yule(),
                butter: rate.butter(),
            },
            window_len: rate.window_len(),
            left: ChannelPipeline::new(),
            right: ChannelPipeline::new(),
            window_fill: 0,
            title: LoudnessHistogram::new(),
        }
    }

    /// Drop partial-window data and filter history, keep the title histogram
    fn clear_stream(&mut self) {
        self.left.clear();
        self.right.clear();
        self.window_fill = 0;
    }

    fn process(&mut self, left: &[f32], right: &[f32], energy_scale: f64) -> Result<()> {
        let total = left.len();
        if total == 0 {
            return Ok(());
        }

        self.left.begin_block(left);
        self.right.begin_block(right);

        let mut pos = 0;
        while pos < total {
            let mut len = (total - pos).min(self.window_len - self.window_fill);
            if pos < MAX_ORDER {
                len = len.min(MAX_ORDER - pos);
            }

            self.left
                .filter_chunk(self.filters, left, pos, len, self.window_fill);
            self.right
                .filter_chunk(self.filters, right, pos, len, self.window_fill);

            pos += len;
            self.window_fill += len;

            if self.window_fill == self.window_len {
                self.close_window(energy_scale);
            } else if self.window_fill > self.window_len {
                error!(
                    filled = self.window_fill,
                    window = self.window_len,
                    "RMS window overflow"
                );
                return Err(GainAnalysisError::WindowOverflow {
                    filled: self.window_fill,
                    window: self.window_len,
                });
            }
        }

        self.left.end_block(left);
        self.right.end_block(right);
        Ok(())
    }

    fn close_window(&mut self, energy_scale: f64) {
        let left_sum = self.left.window_energy(self.window_len);
        let right_sum = self.right.window_energy(self.window_len);
        let mean_square = (left_sum + right_sum) / self.window_len as f64 * 0.5 * energy_scale;
        let bucket = LoudnessHistogram::bucket_for(mean_square);
        trace!(bucket, "RMS window closed");
        self.title.record(bucket);

        self.left.close_window(self.window_len);
        self.right.close_window(self.window_len);
        self.window_fill = 0;
    }
}

/// ReplayGain analysis context
///
/// Holds all filter state, the title histogram and the album histogram for
/// one analysis session. Memory is allocated once on construction and does
/// not grow with the length of the stream. Independent analyzers share
/// nothing; a single analyzer needs external locking to be shared between
/// threads.
///
/// # Example
///
/// ```
/// use replaygain_analysis::GainAnalyzer;
///
/// let mut analyzer = GainAnalyzer::new();
/// analyzer.initialize(44100)?;
///
/// let tone: Vec<f32> = (0..44100)
///     .map(|i| 10_000.0 * (i as f32 * 2.0 * std::f32::consts::PI * 440.0 / 44100.0).sin())
///     .collect();
/// analyzer.analyze_stereo(&tone, &tone)?;
///
/// let title = analyzer.title_gain()?;
/// let album = analyzer.album_gain()?;
/// assert_eq!(title, album);
/// # Ok::<(), replaygain_analysis::GainAnalysisError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GainAnalyzer {
    config: AnalyzerConfig,
    stream: Option<StreamState>,
    album: LoudnessHistogram,
}

impl GainAnalyzer {
    /// Create an analyzer with the default configuration.
    ///
    /// No sample rate is set; call [`initialize`](Self::initialize) first.
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            stream: None,
            album: LoudnessHistogram::new(),
        }
    }

    /// Create an uninitialized analyzer with a custom configuration
    pub fn with_config(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Create an analyzer ready for audio at `sample_rate` Hz
    pub fn for_sample_rate(sample_rate: u32) -> Result<Self> {
        let mut analyzer = Self::new();
        analyzer.initialize(sample_rate)?;
        Ok(analyzer)
    }

    /// Configure the sample rate and reset everything, including the album.
    ///
    /// Calling this again on a used analyzer is equivalent to creating a new
    /// one with the same configuration.
    ///
    /// # Errors
    /// `UnsupportedSampleRate` if there are no filter coefficients for the
    /// rate. The analyzer is left unchanged in that case.
    pub fn initialize(&mut self, sample_rate: u32) -> Result<()> {
        let rate = SampleRate::from_hz(sample_rate)?;
        self.stream = Some(StreamState::new(rate));
        self.album.clear();
        debug!(
            sample_rate,
            window_len = rate.window_len(),
            "Initialized gain analysis"
        );
        Ok(())
    }

    /// Switch to a new sample rate, keeping the album accumulated so far.
    ///
    /// The current title and any partial window are discarded. Useful when
    /// the titles of one album come at different rates.
    pub fn reset_sample_rate(&mut self, sample_rate: u32) -> Result<()> {
        let rate = SampleRate::from_hz(sample_rate)?;
        self.stream = Some(StreamState::new(rate));
        debug!(
            sample_rate,
            window_len = rate.window_len(),
            album_windows = self.album.total(),
            "Reset gain analysis sample rate"
        );
        Ok(())
    }

    /// Check whether a sample rate has been configured
    pub fn is_initialized(&self) -> bool {
        self.stream.is_some()
    }

    /// Configured sample rate
    pub fn sample_rate(&self) -> Option<SampleRate> {
        self.stream.as_ref().map(|s| s.rate)
    }

    /// Samples per RMS window at the configured rate
    pub fn window_len(&self) -> Option<usize> {
        self.stream.as_ref().map(|s| s.window_len)
    }

    /// Active configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// RMS windows closed since the last title read
    pub fn title_windows(&self) -> u64 {
        self.stream.as_ref().map_or(0, |s| s.title.total())
    }

    /// RMS windows folded into the album
    pub fn album_windows(&self) -> u64 {
        self.album.total()
    }

    fn stream_mut(&mut self) -> Result<&mut StreamState> {
        self.stream.as_mut().ok_or(GainAnalysisError::NotInitialized)
    }

    /// Analyze a block of samples.
    ///
    /// With `channels == 1` only `left` is used and `right` is ignored; with
    /// `channels == 2` both slices must have the same length. Blocks may be
    /// any size; splitting a stream differently gives identical results.
    ///
    /// # Errors
    /// `InvalidChannelCount`, `ChannelLengthMismatch` and `NotInitialized`
    /// reject the call without touching any state. `WindowOverflow` signals
    /// an internal defect.
    pub fn analyze(&mut self, left: &[f32], right: &[f32], channels: usize) -> Result<()> {
        let right = match channels {
            1 => left,
            2 => {
                if left.len() != right.len() {
                    return Err(GainAnalysisError::ChannelLengthMismatch {
                        left: left.len(),
                        right: right.len(),
                    });
                }
                right
            }
            other => return Err(GainAnalysisError::InvalidChannelCount(other)),
        };

        let energy_scale = self.config.energy_scale();
        self.stream_mut()?.process(left, right, energy_scale)
    }

    /// Analyze a stereo block
    pub fn analyze_stereo(&mut self, left: &[f32], right: &[f32]) -> Result<()> {
        self.analyze(left, right, 2)
    }

    /// Analyze a mono block (treated as identical left and right channels)
    pub fn analyze_mono(&mut self, samples: &[f32]) -> Result<()> {
        self.analyze(samples, samples, 1)
    }

    /// Analyze interleaved frames (`L R L R ...` for stereo)
    pub fn analyze_interleaved(&mut self, samples: &[f32], channels: usize) -> Result<()> {
        self.analyze_interleaved_with(samples, channels, |s| s)
    }

    /// Analyze interleaved 16-bit integer frames
    pub fn analyze_interleaved_i16(&mut self, samples: &[i16], channels: usize) -> Result<()> {
        self.analyze_interleaved_with(samples, channels, f32::from)
    }

    fn analyze_interleaved_with<T: Copy>(
        &mut self,
        samples: &[T],
        channels: usize,
        convert: impl Fn(T) -> f32,
    ) -> Result<()> {
        if !(1..=2).contains(&channels) {
            return Err(GainAnalysisError::InvalidChannelCount(channels));
        }
        if samples.len() % channels != 0 {
            return Err(GainAnalysisError::InvalidInterleavedLength {
                len: samples.len(),
                channels,
            });
        }
        if !self.is_initialized() {
            return Err(GainAnalysisError::NotInitialized);
        }

        let mut left = [0.0_f32; CONVERT_BLOCK_FRAMES];
        let mut right = [0.0_f32; CONVERT_BLOCK_FRAMES];
        for block in samples.chunks(CONVERT_BLOCK_FRAMES * channels) {
            let frames = block.len() / channels;
            for (i, frame) in block.chunks_exact(channels).enumerate() {
                left[i] = convert(frame[0]);
                right[i] = convert(frame[channels - 1]);
            }
            self.analyze(&left[..frames], &right[..frames], channels)?;
        }
        Ok(())
    }

    /// Gain for everything analyzed since the last title read (or initialization).
    ///
    /// Folds the title into the album, then clears the title histogram and all
    /// filter history, so the next title starts fresh. The sample rate and the
    /// configuration stay.
    pub fn title_gain(&mut self) -> Result<GainEstimate> {
        let percentile = self.config.percentile;
        let reference = self.config.reference_level_db;
        let stream = self.stream.as_mut().ok_or(GainAnalysisError::NotInitialized)?;

        let gain = stream.title.gain(percentile, reference);
        let windows = stream.title.total();

        self.album.merge(&stream.title);
        stream.title.clear();
        stream.clear_stream();

        debug!(%gain, windows, album_windows = self.album.total(), "Title gain");
        Ok(gain)
    }

    /// Gain for every title read so far. Does not modify the analyzer.
    pub fn album_gain(&self) -> Result<GainEstimate> {
        if !self.is_initialized() {
            return Err(GainAnalysisError::NotInitialized);
        }
        let gain = self
            .album
            .gain(self.config.percentile, self.config.reference_level_db);
        debug!(%gain, windows = self.album.total(), "Album gain");
        Ok(gain)
    }
}

impl Default for GainAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (i as f32 * 0.1).sin())
            .collect()
    }

    #[test]
    fn test_uninitialized_rejects_everything() {
        let mut analyzer = GainAnalyzer::new();
        assert!(!analyzer.is_initialized());
        assert_eq!(analyzer.sample_rate(), None);
        assert_eq!(
            analyzer.analyze_mono(&[0.0; 10]),
            Err(GainAnalysisError::NotInitialized)
        );
        assert_eq!(
            analyzer.analyze_interleaved(&[0.0; 10], 2),
            Err(GainAnalysisError::NotInitialized)
        );
        assert_eq!(analyzer.title_gain(), Err(GainAnalysisError::NotInitialized));
        assert_eq!(analyzer.album_gain(), Err(GainAnalysisError::NotInitialized));
    }

    #[test]
    fn test_failed_initialize_keeps_state() {
        let mut analyzer = GainAnalyzer::for_sample_rate(48000).unwrap();
        assert_eq!(
            analyzer.initialize(44000),
            Err(GainAnalysisError::UnsupportedSampleRate(44000))
        );
        assert_eq!(analyzer.sample_rate(), Some(SampleRate::Hz48000));
    }

    #[test]
    fn test_invalid_channel_count_mutates_nothing() {
        let mut analyzer = GainAnalyzer::for_sample_rate(44100).unwrap();
        let block = tone(3000, 1000.0);
        assert_eq!(
            analyzer.analyze(&block, &block, 3),
            Err(GainAnalysisError::InvalidChannelCount(3))
        );
        assert_eq!(
            analyzer.analyze(&block, &block, 0),
            Err(GainAnalysisError::InvalidChannelCount(0))
        );
        let stream = analyzer.stream.as_ref().unwrap();
        assert_eq!(stream.window_fill, 0);
        assert_eq!(stream.title.total(), 0);
    }

    #[test]
    fn test_channel_length_mismatch() {
        let mut analyzer = GainAnalyzer::for_sample_rate(44100).unwrap();
        assert_eq!(
            analyzer.analyze_stereo(&[0.0; 4], &[0.0; 5]),
            Err(GainAnalysisError::ChannelLengthMismatch { left: 4, right: 5 })
        );
        // Mono ignores the right slice entirely
        assert!(analyzer.analyze(&[0.0; 4], &[], 1).is_ok());
    }

    #[test]
    fn test_window_fill_never_exceeds_window() {
        let mut analyzer = GainAnalyzer::for_sample_rate(8000).unwrap();
        let block = tone(1234, 5000.0);
        for _ in 0..10 {
            analyzer.analyze_mono(&block).unwrap();
            let stream = analyzer.stream.as_ref().unwrap();
            assert!(stream.window_fill < stream.window_len);
        }
        // 12340 samples in 400-sample windows
        assert_eq!(analyzer.title_windows(), 30);
    }

    #[test]
    fn test_partial_window_is_not_counted() {
        let mut analyzer = GainAnalyzer::for_sample_rate(44100).unwrap();
        analyzer.analyze_mono(&tone(2204, 1000.0)).unwrap();
        assert_eq!(analyzer.title_windows(), 0);
        assert_eq!(analyzer.title_gain(), Ok(GainEstimate::NotEnoughSamples));

        // The partial window was discarded by the title read
        analyzer.analyze_mono(&tone(1, 1000.0)).unwrap();
        assert_eq!(analyzer.title_windows(), 0);
    }

    #[test]
    fn test_title_read_clears_stream() {
        let mut analyzer = GainAnalyzer::for_sample_rate(44100).unwrap();
        analyzer.analyze_mono(&tone(5000, 1000.0)).unwrap();
        analyzer.title_gain().unwrap();

        let stream = analyzer.stream.as_ref().unwrap();
        assert_eq!(stream.window_fill, 0);
        assert_eq!(stream.title.total(), 0);
        assert_eq!(analyzer.album_windows(), 2);
    }

    #[test]
    fn test_initialize_resets_album() {
        let mut analyzer = GainAnalyzer::for_sample_rate(44100).unwrap();
        analyzer.analyze_mono(&tone(44100, 1000.0)).unwrap();
        analyzer.title_gain().unwrap();
        assert_eq!(analyzer.album_windows(), 20);

        analyzer.initialize(44100).unwrap();
        assert_eq!(analyzer.album_windows(), 0);
        assert_eq!(analyzer.album_gain(), Ok(GainEstimate::NotEnoughSamples));
    }

    #[test]
    fn test_reset_sample_rate_keeps_album() {
        let mut analyzer = GainAnalyzer::for_sample_rate(44100).unwrap();
        analyzer.analyze_mono(&tone(44100, 1000.0)).unwrap();
        analyzer.title_gain().unwrap();

        analyzer.reset_sample_rate(48000).unwrap();
        assert_eq!(analyzer.sample_rate(), Some(SampleRate::Hz48000));
        assert_eq!(analyzer.window_len(), Some(2400));
        assert_eq!(analyzer.album_windows(), 20);

        assert!(analyzer.reset_sample_rate(12345).is_err());
        assert_eq!(analyzer.sample_rate(), Some(SampleRate::Hz48000));
    }

    #[test]
    fn test_interleaved_matches_planar() {
        let left = tone(10_000, 3000.0);
        let right = tone(10_000, 1500.0);
        let interleaved: Vec<f32> = left
            .iter()
            .zip(&right)
            .flat_map(|(&l, &r)| [l, r])
            .collect();

        let mut planar = GainAnalyzer::for_sample_rate(44100).unwrap();
        planar.analyze_stereo(&left, &right).unwrap();

        let mut mixed = GainAnalyzer::for_sample_rate(44100).unwrap();
        mixed.analyze_interleaved(&interleaved, 2).unwrap();

        assert_eq!(planar.title_gain(), mixed.title_gain());
    }

    #[test]
    fn test_interleaved_length_checked() {
        let mut analyzer = GainAnalyzer::for_sample_rate(44100).unwrap();
        assert_eq!(
            analyzer.analyze_interleaved(&[0.0; 5], 2),
            Err(GainAnalysisError::InvalidInterleavedLength {
                len: 5,
                channels: 2
            })
        );
        assert_eq!(
            analyzer.analyze_interleaved_i16(&[0; 6], 3),
            Err(GainAnalysisError::InvalidChannelCount(3))
        );
    }

    #[test]
    fn test_i16_matches_f32() {
        let samples: Vec<i16> = (0..8820)
            .map(|i| (8000.0 * (i as f32 * 0.05).sin()) as i16)
            .collect();
        let floats: Vec<f32> = samples.iter().map(|&s| f32::from(s)).collect();

        let mut ints = GainAnalyzer::for_sample_rate(44100).unwrap();
        ints.analyze_interleaved_i16(&samples, 1).unwrap();

        let mut reference = GainAnalyzer::for_sample_rate(44100).unwrap();
        reference.analyze_mono(&floats).unwrap();

        assert_eq!(ints.title_gain(), reference.title_gain());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalyzerConfig::new().with_percentile(2.0);
        assert!(matches!(
            GainAnalyzer::with_config(config),
            Err(GainAnalysisError::InvalidConfig(_))
        ));
    }
}
