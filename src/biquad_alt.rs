//! Second order ARMA filter with Q28 coefficients, transposed form.

use crate::math::{rshift_round, sat16, smlawb, smulwb};

/// Filters `buf` in place. The negated feedback coefficients are split
/// into a 14-bit low part and a high part so every multiply fits the
/// 16x32 fixed point primitives.
pub fn biquad_alt(buf: &mut [i16], b_q28: &[i32; 3], a_q28: &[i32; 2], state: &mut [i32; 2]) {
    let a0_l = (-a_q28[0]) & 0x3fff;
    let a0_u = (-a_q28[0]) >> 14;
    let a1_l = (-a_q28[1]) & 0x3fff;
    let a1_u = (-a_q28[1]) >> 14;

    for sample in buf.iter_mut() {
        let inval = i32::from(*sample);
        let out32_q14 = smlawb(state[0], b_q28[0], inval) << 2;

        state[0] = state[1] + rshift_round(smulwb(out32_q14, a0_l), 14);
        state[0] = smlawb(state[0], out32_q14, a0_u);
        state[0] = smlawb(state[0], b_q28[1], inval);

        state[1] = rshift_round(smulwb(out32_q14, a1_l), 14);
        state[1] = smlawb(state[1], out32_q14, a1_u);
        state[1] = smlawb(state[1], b_q28[2], inval);

        *sample = sat16((out32_q14 + (1 << 14) - 1) >> 14);
    }
}

#[cfg(test)]
mod tests {
    use super::biquad_alt;

    #[test]
    fn unity_coefficients_pass_the_signal_through() {
        // b = [1, 0, 0] in Q28, no feedback
        let b = [1 << 28, 0, 0];
        let a = [0, 0];
        let mut state = [0i32; 2];
        let mut buf: [i16; 64] = core::array::from_fn(|i| (i as i16 - 32) * 100);
        let reference = buf;
        biquad_alt(&mut buf, &b, &a, &mut state);
        assert_eq!(buf, reference);
    }

    #[test]
    fn state_carries_across_split_calls() {
        let b = [240000000, -480000000, 240000000];
        let a = [-510000000, 245000000];
        let input: [i16; 128] = core::array::from_fn(|i| ((i * 37) % 4001) as i16 - 2000);

        let mut whole = input;
        let mut state = [0i32; 2];
        biquad_alt(&mut whole, &b, &a, &mut state);

        let mut split = input;
        let mut state = [0i32; 2];
        let (head, tail) = split.split_at_mut(50);
        biquad_alt(head, &b, &a, &mut state);
        biquad_alt(tail, &b, &a, &mut state);

        assert_eq!(whole, split);
    }
}
