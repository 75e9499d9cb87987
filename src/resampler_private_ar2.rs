//! Second order AR filter with single delay elements, shared by the
//! fractional downsamplers.

use crate::math::{smlawb, smulwb};

/// Filters `input` through a two pole AR section, writing Q8 output.
/// `a_q14` holds the two negated AR coefficients.
pub fn resampler_private_ar2(state: &mut [i32; 2], out_q8: &mut [i32], input: &[i16], a_q14: &[i16; 2]) {
    debug_assert!(out_q8.len() >= input.len());
    for (out, &x) in out_q8.iter_mut().zip(input) {
        let out32 = state[0] + (i32::from(x) << 8);
        *out = out32;
        let out32 = out32 << 2;
        state[0] = smlawb(state[1], out32, i32::from(a_q14[0]));
        state[1] = smulwb(out32, i32::from(a_q14[1]));
    }
}
