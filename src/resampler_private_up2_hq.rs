//! Upsample by a factor 2, high quality.

use crate::math::{sat16, smlawb, smulwb};
use crate::resampler_rom::{RESAMPLER_UP2_HQ_0, RESAMPLER_UP2_HQ_1, RESAMPLER_UP2_HQ_NOTCH};

/// Doubles the rate of `input` with two second order all-pass chains
/// followed by a notch just above the original Nyquist. `state` holds
/// the four all-pass and two notch delay elements, all in Q10. Writes
/// `2 * input.len()` samples.
pub fn resampler_private_up2_hq(state: &mut [i32; 6], output: &mut [i16], input: &[i16]) {
    debug_assert!(output.len() >= 2 * input.len());

    for (k, &sample) in input.iter().enumerate() {
        let in32 = i32::from(sample) << 10;

        // even phase all-pass chain
        let y = in32 - state[0];
        let x = smulwb(y, RESAMPLER_UP2_HQ_0[0]);
        let out32_1 = state[0] + x;
        state[0] = in32 + x;

        let y = out32_1 - state[1];
        let x = smlawb(y, y, RESAMPLER_UP2_HQ_0[1]);
        let mut out32_2 = state[1] + x;
        state[1] = out32_1 + x;

        // notch filter
        out32_2 = smlawb(out32_2, state[5], RESAMPLER_UP2_HQ_NOTCH[2]);
        out32_2 = smlawb(out32_2, state[4], RESAMPLER_UP2_HQ_NOTCH[1]);
        let out32_1 = smlawb(out32_2, state[4], RESAMPLER_UP2_HQ_NOTCH[0]);
        state[5] = out32_2 - state[5];

        output[2 * k] = sat16(smlawb(256, out32_1, RESAMPLER_UP2_HQ_NOTCH[3]) >> 9);

        // odd phase all-pass chain
        let y = in32 - state[2];
        let x = smulwb(y, RESAMPLER_UP2_HQ_1[0]);
        let out32_1 = state[2] + x;
        state[2] = in32 + x;

        let y = out32_1 - state[3];
        let x = smlawb(y, y, RESAMPLER_UP2_HQ_1[1]);
        let mut out32_2 = state[3] + x;
        state[3] = out32_1 + x;

        out32_2 = smlawb(out32_2, state[4], RESAMPLER_UP2_HQ_NOTCH[2]);
        out32_2 = smlawb(out32_2, state[5], RESAMPLER_UP2_HQ_NOTCH[1]);
        let out32_1 = smlawb(out32_2, state[5], RESAMPLER_UP2_HQ_NOTCH[0]);
        state[4] = out32_2 - state[4];

        output[2 * k + 1] = sat16(smlawb(256, out32_1, RESAMPLER_UP2_HQ_NOTCH[3]) >> 9);
    }
}

#[cfg(test)]
mod tests {
    use super::resampler_private_up2_hq;

    #[test]
    fn doubles_the_sample_count() {
        let mut state = [0i32; 6];
        let input = [1000i16; 40];
        let mut output = [0i16; 80];
        resampler_private_up2_hq(&mut state, &mut output, &input);
        // DC passes through once the transient settles; the notch gain
        // leaves it about half a percent shy of unity
        for &s in &output[60..] {
            assert!((i32::from(s) - 1000).abs() <= 10, "s = {s}");
        }
    }

    #[test]
    fn state_carries_across_calls() {
        let input: alloc::vec::Vec<i16> =
            (0..160).map(|i| (libm::sin(0.07 * i as f64) * 9000.0) as i16).collect();

        let mut state = [0i32; 6];
        let mut whole = [0i16; 320];
        resampler_private_up2_hq(&mut state, &mut whole, &input);

        let mut state = [0i32; 6];
        let mut split = [0i16; 320];
        resampler_private_up2_hq(&mut state, &mut split[..140], &input[..70]);
        resampler_private_up2_hq(&mut state, &mut split[140..], &input[70..]);

        assert_eq!(whole, split);
    }
}
