//! Recursive (IIR) filter stage
//!
//! A stage does not own any state. The caller hands it an input slice and an
//! output slice that both start with `history` samples of genuine prior data
//! (raw input before the block, and the filter's own previous output). The
//! stage fills `output[history..]` and never touches the history prefix.

use crate::coefficients::IirCoefficients;

/// Constant added to every stage-1 output sample.
///
/// Keeps the recursion out of the subnormal range on silent input, where
/// floating point arithmetic gets very slow. Far below anything audible.
pub const DENORMAL_BIAS: f64 = 1e-10;

impl<const LEN: usize> IirCoefficients<LEN> {
    /// Filter order (number of past samples each output depends on)
    pub const fn order(&self) -> usize {
        LEN - 1
    }

    /// Run the filter over `input[history..]`, writing `output[history..]`.
    ///
    /// `bias` is added to every output sample (see [`DENORMAL_BIAS`]).
    ///
    /// # Panics
    /// Panics if the slices differ in length or `history` is shorter than
    /// the filter order; both are programming errors in the caller.
    pub fn apply(&self, bias: f64, input: &[f32], output: &mut [f32], history: usize) {
        assert_eq!(input.len(), output.len(), "filter input/output length mismatch");
        assert!(history >= self.order(), "not enough filter history");

        for n in history..input.len() {
            let start = n + 1 - LEN;
            let acc = self
                .a
                .iter()
                .zip(input[start..=n].iter().rev())
                .fold(bias, |acc, (&a, &x)| acc + a * f64::from(x));
            let acc = self.b[1..]
                .iter()
                .zip(output[start..n].iter().rev())
                .fold(acc, |acc, (&b, &y)| acc - b * f64::from(y));
            output[n] = acc as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::SampleRate;

    #[test]
    fn test_order() {
        let rate = SampleRate::Hz44100;
        assert_eq!(rate.yule().order(), 10);
        assert_eq!(rate.butter().order(), 2);
    }

    #[test]
    fn test_history_prefix_untouched() {
        let filter = SampleRate::Hz48000.butter();
        let input = [1.0_f32, 2.0, 3.0, 4.0, 5.0];
        let mut output = [7.0_f32, 8.0, 0.0, 0.0, 0.0];
        filter.apply(0.0, &input, &mut output, 2);
        assert_eq!(&output[..2], &[7.0, 8.0]);
    }

    #[test]
    fn test_identity_filter() {
        let filter = IirCoefficients::<3> {
            a: [1.0, 0.0, 0.0],
            b: [1.0, 0.0, 0.0],
        };
        let input = [0.0_f32, 0.0, 0.5, -0.25, 1.0];
        let mut output = [0.0_f32; 5];
        filter.apply(0.0, &input, &mut output, 2);
        assert_eq!(output, input);
    }

    #[test]
    fn test_split_matches_single_pass() {
        // Filtering in two pieces with carried history equals one pass
        let filter = SampleRate::Hz44100.yule();
        let order = filter.order();
        let signal: Vec<f32> = (0..200).map(|i| ((i * 37 % 101) as f32) - 50.0).collect();

        let mut input = vec![0.0_f32; order];
        input.extend_from_slice(&signal);
        let mut whole = vec![0.0_f32; input.len()];
        filter.apply(DENORMAL_BIAS, &input, &mut whole, order);

        let split = order + 73;
        let mut first = vec![0.0_f32; split];
        filter.apply(DENORMAL_BIAS, &input[..split], &mut first, order);
        let mut second = vec![0.0_f32; input.len() - split + order];
        second[..order].copy_from_slice(&first[split - order..]);
        filter.apply(
            DENORMAL_BIAS,
            &input[split - order..],
            &mut second,
            order,
        );

        assert_eq!(&whole[..split], &first[..]);
        assert_eq!(&whole[split..], &second[order..]);
    }

    #[test]
    fn test_silence_stays_finite() {
        let filter = SampleRate::Hz8000.yule();
        let input = vec![0.0_f32; 10_000];
        let mut output = vec![0.0_f32; 10_000];
        filter.apply(DENORMAL_BIAS, &input, &mut output, 10);
        assert!(output.iter().all(|s| s.is_finite()));
    }
}
