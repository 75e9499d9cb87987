//! Short-term prediction error filters (MA form).

use crate::math::{rshift_round, sat16, smlabb, smulbb};

/// Runs the Q12 prediction error filter `1 - B(z)` over `input`, producing
/// the whitened residual. `state` holds the last `order` input samples in
/// Q0 and carries across calls.
pub fn lpc_analysis_filter(
    input: &[i16],
    coefs_q12: &[i16],
    state: &mut [i16],
    out: &mut [i16],
) {
    let order = coefs_q12.len();
    debug_assert!(order == state.len());
    debug_assert!(order & 1 == 0);

    for (k, &in_k) in input.iter().enumerate() {
        let mut out32_q12 = 0i32;
        for j in 0..order {
            out32_q12 = smlabb(out32_q12, i32::from(state[j]), i32::from(coefs_q12[j]));
        }
        // shift the state line
        for j in (1..order).rev() {
            state[j] = state[j - 1];
        }
        state[0] = in_k;

        let pred_err_q12 = (i32::from(in_k) << 12).saturating_sub(out32_q12);
        out[k] = sat16(rshift_round(pred_err_q12, 12));
    }
}

/// Variable-order MA prediction error filter with a Q12 state line, used by
/// the pitch-lag prewhitener.
pub fn ma_prediction(
    input: &[i16],
    coefs_q12: &[i16],
    state: &mut [i32],
    out: &mut [i16],
) {
    let order = coefs_q12.len();
    debug_assert!(order == state.len());

    for (k, &in_k) in input.iter().enumerate() {
        let in16 = i32::from(in_k);
        let out32 = rshift_round((in16 << 12).wrapping_sub(state[0]), 12);

        for d in 0..order - 1 {
            state[d] = smlabb(state[d + 1], in16, i32::from(coefs_q12[d]));
        }
        state[order - 1] = smulbb(in16, i32::from(coefs_q12[order - 1]));

        out[k] = sat16(out32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_coefficients_pass_input_through() {
        let input = [100i16, -200, 300, -400];
        let coefs = [0i16; 4];
        let mut state = [0i16; 4];
        let mut out = [0i16; 4];
        lpc_analysis_filter(&input, &coefs, &mut state, &mut out);
        assert_eq!(out, input);
        assert_eq!(state, [-400, 300, -200, 100]);
    }

    #[test]
    fn perfect_predictor_whitens_constant_signal() {
        // y[n] = x[n-1] predicts a constant exactly after warmup
        let input = [1000i16; 8];
        let coefs = [4096i16, 0];
        let mut state = [1000i16, 1000];
        let mut out = [0i16; 8];
        lpc_analysis_filter(&input, &coefs, &mut state, &mut out);
        assert!(out.iter().all(|&v| v == 0));
    }

    #[test]
    fn ma_prediction_state_carries_between_calls() {
        let coefs = [2048i16, -1024];
        let mut state_a = [0i32; 2];
        let mut out_full = [0i16; 6];
        let input = [500i16, -250, 125, 90, -40, 7];
        ma_prediction(&input, &coefs, &mut state_a, &mut out_full);

        let mut state_b = [0i32; 2];
        let mut out_split = [0i16; 6];
        ma_prediction(&input[..3], &coefs, &mut state_b, &mut out_split[..3]);
        ma_prediction(&input[3..], &coefs, &mut state_b, &mut out_split[3..]);
        assert_eq!(out_full, out_split);
    }
}
