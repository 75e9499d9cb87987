//! Perceptual prefilter: produces the weighted input signal that the
//! noise shaping quantizer tries to match. Applies the warped short
//! term shaping filter, an input tilt, harmonic shaping around the
//! pitch lag and low frequency shaping.

use crate::common::{SignalType, LTP_MASK, MAX_FRAME_LENGTH, MAX_SHAPE_LPC_ORDER, NB_SUBFR};
use crate::encoder_control::EncoderControl;
use crate::encoder_state::{EncoderState, PrefilterState};
use crate::math::{fix_const, rshift_round, sat16, smlabb, smlabt, smlawb, smulbb, smulwb, smulwt};

const HARM_SHAPE_FIR_TAPS: usize = 3;

/// All-pass warped analysis filter. `state` carries `order + 1` words
/// between calls, `coef_q13` has one Q13 tap per section and
/// `lambda_q16` is the warping factor. The order must be even.
pub fn warped_lpc_analysis_filter(
    state: &mut [i32],
    res: &mut [i16],
    coef_q13: &[i16],
    input: &[i16],
    lambda_q16: i32,
    order: usize,
) {
    debug_assert!(order & 1 == 0);
    debug_assert!(state.len() > order);

    for (n, out) in res.iter_mut().enumerate() {
        // lowpass section
        let mut tmp2 = smlawb(state[0], state[1], lambda_q16);
        state[0] = i32::from(input[n]) << 14;
        // allpass sections
        let mut tmp1 = smlawb(state[1], state[2] - tmp2, lambda_q16);
        state[1] = tmp2;
        let mut acc_q11 = smulwb(tmp2, i32::from(coef_q13[0]));
        let mut i = 2;
        while i < order {
            tmp2 = smlawb(state[i], state[i + 1] - tmp1, lambda_q16);
            state[i] = tmp1;
            acc_q11 = smlawb(acc_q11, tmp1, i32::from(coef_q13[i - 1]));
            tmp1 = smlawb(state[i + 1], state[i + 2] - tmp2, lambda_q16);
            state[i + 1] = tmp2;
            acc_q11 = smlawb(acc_q11, tmp2, i32::from(coef_q13[i]));
            i += 2;
        }
        state[order] = tmp1;
        acc_q11 = smlawb(acc_q11, tmp1, i32::from(coef_q13[order - 1]));
        *out = sat16(i32::from(input[n]) - rshift_round(acc_q11, 11));
    }
}

/// Filters one frame of input into the weighted signal `xw`.
pub fn prefilter(enc: &mut EncoderState, ctrl: &EncoderControl, xw: &mut [i16], x: &[i16]) {
    let subfr_length = enc.subfr_length;
    let mut lag = enc.prefilt.lag_prev;

    let mut x_filt_q12 = [0i32; MAX_FRAME_LENGTH / NB_SUBFR];
    let mut st_res = [0i16; MAX_FRAME_LENGTH / NB_SUBFR + MAX_SHAPE_LPC_ORDER];

    for k in 0..NB_SUBFR {
        if ctrl.sigtype == SignalType::Voiced {
            lag = ctrl.pitch_lags[k];
        }

        let harm_shape_gain_q12 = smulwb(
            ctrl.harm_shape_gain_q14[k],
            16384 - ctrl.harm_boost_q14[k],
        );
        debug_assert!(harm_shape_gain_q12 >= 0);
        let harm_shape_fir_packed_q12 =
            (harm_shape_gain_q12 >> 2) | ((harm_shape_gain_q12 >> 1) << 16);
        let tilt_q14 = ctrl.tilt_q14[k];
        let lf_shp_q14 = ctrl.lf_shp_q14[k];
        let ar1_q13 = &ctrl.ar1_q13[k * MAX_SHAPE_LPC_ORDER..(k + 1) * MAX_SHAPE_LPC_ORDER];

        let px = &x[k * subfr_length..(k + 1) * subfr_length];
        warped_lpc_analysis_filter(
            &mut enc.prefilt.s_ar_shp_q14,
            &mut st_res[..subfr_length],
            ar1_q13,
            px,
            enc.warping_q16,
            enc.shaping_lpc_order,
        );

        // reduce (mainly) low frequencies during harmonic emphasis;
        // low half of b_q12 weights the current sample, high half the
        // previous one
        let mut b_q12 = rshift_round(ctrl.gains_pre_q14[k], 2);
        let mut tmp32 = smlabb(
            fix_const(0.05, 26),
            ctrl.harm_boost_q14[k],
            harm_shape_gain_q12,
        );
        tmp32 = smlabb(tmp32, ctrl.coding_quality_q14, fix_const(0.1, 12));
        tmp32 = smulwb(tmp32, -ctrl.gains_pre_q14[k]);
        tmp32 = rshift_round(tmp32, 12);
        b_q12 |= i32::from(sat16(tmp32)) << 16;

        x_filt_q12[0] = smlabt(
            smulbb(i32::from(st_res[0]), b_q12),
            enc.prefilt.s_harm_hp,
            b_q12,
        );
        for j in 1..subfr_length {
            x_filt_q12[j] = smlabt(
                smulbb(i32::from(st_res[j]), b_q12),
                i32::from(st_res[j - 1]),
                b_q12,
            );
        }
        enc.prefilt.s_harm_hp = i32::from(st_res[subfr_length - 1]);

        prefilt(
            &mut enc.prefilt,
            &x_filt_q12[..subfr_length],
            &mut xw[k * subfr_length..(k + 1) * subfr_length],
            harm_shape_fir_packed_q12,
            tilt_q14,
            lf_shp_q14,
            lag,
        );
    }

    enc.prefilt.lag_prev = ctrl.pitch_lags[NB_SUBFR - 1];
}

/// Harmonic, tilt and low frequency shaping of the short term residual.
fn prefilt(
    p: &mut PrefilterState,
    st_res_q12: &[i32],
    xw: &mut [i16],
    harm_shape_fir_packed_q12: i32,
    tilt_q14: i32,
    lf_shp_q14: i32,
    lag: usize,
) {
    let mut buf_idx = p.s_ltp_shp_buf_idx;
    let mut s_lf_ar_q12 = p.s_lf_ar_shp_q12;
    let mut s_lf_ma_q12 = p.s_lf_ma_shp_q12;

    for (i, out) in xw.iter_mut().enumerate() {
        let n_ltp_q12 = if lag > 0 {
            // three tap FIR centered one sample before the lag
            let idx = lag + buf_idx;
            let mut n = smulbb(
                i32::from(p.s_ltp_shp[(idx - HARM_SHAPE_FIR_TAPS / 2 - 1) & LTP_MASK]),
                harm_shape_fir_packed_q12,
            );
            n = smlabt(
                n,
                i32::from(p.s_ltp_shp[(idx - HARM_SHAPE_FIR_TAPS / 2) & LTP_MASK]),
                harm_shape_fir_packed_q12,
            );
            smlabb(
                n,
                i32::from(p.s_ltp_shp[(idx - HARM_SHAPE_FIR_TAPS / 2 + 1) & LTP_MASK]),
                harm_shape_fir_packed_q12,
            )
        } else {
            0
        };

        let n_tilt_q10 = smulwb(s_lf_ar_q12, tilt_q14);
        let n_lf_q10 = smlawb(smulwt(s_lf_ar_q12, lf_shp_q14), s_lf_ma_q12, lf_shp_q14);

        s_lf_ar_q12 = st_res_q12[i] - (n_tilt_q10 << 2);
        s_lf_ma_q12 = s_lf_ar_q12 - (n_lf_q10 << 2);

        buf_idx = buf_idx.wrapping_sub(1) & LTP_MASK;
        p.s_ltp_shp[buf_idx] = sat16(rshift_round(s_lf_ma_q12, 12));

        *out = sat16(rshift_round(s_lf_ma_q12 - n_ltp_q12, 12));
    }

    p.s_lf_ar_shp_q12 = s_lf_ar_q12;
    p.s_lf_ma_shp_q12 = s_lf_ma_q12;
    p.s_ltp_shp_buf_idx = buf_idx;
}

#[cfg(test)]
mod tests {
    use super::warped_lpc_analysis_filter;

    #[test]
    fn zero_coefficients_pass_the_input_through() {
        let input: [i16; 8] = [100, -200, 300, -400, 500, -600, 700, -800];
        let mut state = [0i32; 17];
        let mut res = [0i16; 8];
        warped_lpc_analysis_filter(&mut state, &mut res, &[0i16; 16], &input, 20000, 16);
        assert_eq!(res, input);
    }

    #[test]
    fn single_tap_without_warping_predicts_the_previous_sample() {
        // coef 1.0 in Q13 on the first section, lambda 0: res[n] = in[n] - in[n-1]
        let input: [i16; 6] = [1000, 1000, 1000, 1000, 1000, 1000];
        let mut coef = [0i16; 16];
        coef[0] = 1 << 13;
        let mut state = [0i32; 17];
        let mut res = [0i16; 6];
        warped_lpc_analysis_filter(&mut state, &mut res, &coef, &input, 0, 16);
        assert_eq!(res[0], 1000);
        for &r in &res[1..] {
            assert_eq!(r, 0);
        }
    }
}
