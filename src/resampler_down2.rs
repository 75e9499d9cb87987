//! Downsample by a factor 2, mediocre quality.

use crate::math::{rshift_round, sat16, smlawb, smulwb};
use crate::resampler_rom::{RESAMPLER_DOWN2_0, RESAMPLER_DOWN2_1};

/// Decimates `input` by two with a pair of first order all-pass
/// sections running in Q10. Writes `input.len() / 2` samples; a
/// trailing odd sample is ignored.
pub fn resampler_down2(state: &mut [i32; 2], output: &mut [i16], input: &[i16]) {
    let len2 = input.len() / 2;
    debug_assert!(output.len() >= len2);

    for k in 0..len2 {
        // even sample through the first all-pass
        let in32 = i32::from(input[2 * k]) << 10;
        let y = in32 - state[0];
        let x = smlawb(y, y, RESAMPLER_DOWN2_1);
        let mut out32 = state[0] + x;
        state[0] = in32 + x;

        // odd sample through the second, added to the first
        let in32 = i32::from(input[2 * k + 1]) << 10;
        let y = in32 - state[1];
        let x = smulwb(y, RESAMPLER_DOWN2_0);
        out32 += state[1] + x;
        state[1] = in32 + x;

        output[k] = sat16(rshift_round(out32, 11));
    }
}

#[cfg(test)]
mod tests {
    use super::resampler_down2;

    #[test]
    fn zero_input_leaves_state_cleared() {
        let mut state = [0i32; 2];
        let input = [0i16; 8];
        let mut output = [0i16; 4];
        resampler_down2(&mut state, &mut output, &input);
        assert_eq!(output, [0, 0, 0, 0]);
        assert_eq!(state, [0, 0]);
    }

    #[test]
    fn dc_input_converges_to_dc_output() {
        let mut state = [0i32; 2];
        let input = [8000i16; 160];
        let mut output = [0i16; 80];
        resampler_down2(&mut state, &mut output, &input);
        // after the transient the all-pass pair passes DC unchanged
        for &s in &output[40..] {
            assert!((i32::from(s) - 8000).abs() <= 1);
        }
    }

    #[test]
    fn state_carries_across_calls() {
        let input: alloc::vec::Vec<i16> =
            (0..320).map(|i| (libm::sin(0.05 * i as f64) * 12000.0) as i16).collect();

        let mut state = [0i32; 2];
        let mut whole = [0i16; 160];
        resampler_down2(&mut state, &mut whole, &input);

        let mut state = [0i32; 2];
        let mut split = [0i16; 160];
        resampler_down2(&mut state, &mut split[..50], &input[..100]);
        resampler_down2(&mut state, &mut split[50..], &input[100..]);

        assert_eq!(whole, split);
    }
}
