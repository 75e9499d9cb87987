//! Noise shaping quantizer, single hypothesis version. Quantizes the
//! prefiltered input to integer pulses one sample at a time, feeding
//! each decision back through the prediction and shaping filters.

use crate::common::{
    SignalType, MAX_FRAME_LENGTH, MAX_SHAPE_LPC_ORDER, NB_SUBFR, NSQ_LPC_BUF_LENGTH,
};
use crate::encoder_control::EncoderControl;
use crate::lpc_analysis_filter::ma_prediction;
use crate::math::{
    inverse32_var_q, div32_var_q, lcg_rand, limit, rshift_round, sat16, smlawb, smlawt, smulbb,
    smulwb, smulwt, smulww,
};
use crate::schur::MAX_ORDER_LPC;
use crate::tables_ltp::LTP_ORDER;
use crate::tables_other::QUANTIZATION_OFFSETS_Q10;

/// Persistent quantizer state; one for the primary stream and one for
/// the redundant stream.
#[derive(Clone)]
pub struct NsqState {
    /// Quantized output, previous frame then current frame.
    pub xq: [i16; 2 * MAX_FRAME_LENGTH],
    pub s_ltp_shp_q10: [i32; 2 * MAX_FRAME_LENGTH],
    pub s_lpc_q14: [i32; MAX_FRAME_LENGTH / NB_SUBFR + NSQ_LPC_BUF_LENGTH],
    pub s_ar2_q14: [i32; MAX_SHAPE_LPC_ORDER],
    pub s_lf_ar_shp_q12: i32,
    pub lag_prev: usize,
    pub s_ltp_buf_idx: usize,
    pub s_ltp_shp_buf_idx: usize,
    pub rand_seed: i32,
    pub prev_inv_gain_q16: i32,
    pub rewhite_flag: bool,
}

impl Default for NsqState {
    fn default() -> Self {
        NsqState {
            xq: [0; 2 * MAX_FRAME_LENGTH],
            s_ltp_shp_q10: [0; 2 * MAX_FRAME_LENGTH],
            s_lpc_q14: [0; MAX_FRAME_LENGTH / NB_SUBFR + NSQ_LPC_BUF_LENGTH],
            s_ar2_q14: [0; MAX_SHAPE_LPC_ORDER],
            s_lf_ar_shp_q12: 0,
            lag_prev: 0,
            s_ltp_buf_idx: 0,
            s_ltp_shp_buf_idx: 0,
            rand_seed: 0,
            prev_inv_gain_q16: 1 << 16,
            rewhite_flag: false,
        }
    }
}

/// Quantizes one frame of the prefiltered signal `x` into pulses `q`.
#[allow(clippy::too_many_arguments)]
pub fn nsq(
    nsq: &mut NsqState,
    ctrl: &EncoderControl,
    x: &[i16],
    q: &mut [i8],
    frame_length: usize,
    subfr_length: usize,
    predict_lpc_order: usize,
    shaping_lpc_order: usize,
) {
    nsq.rand_seed = ctrl.seed;
    // unvoiced frames keep shaping around the previous lag
    let mut lag = nsq.lag_prev;

    debug_assert!(nsq.prev_inv_gain_q16 != 0);

    let offset_q10 =
        i32::from(QUANTIZATION_OFFSETS_Q10[ctrl.sigtype.code()][ctrl.quant_offset_type]);
    let lsf_interpolation_flag = ctrl.nlsf_interp_coef_q2 != (1 << 2);

    let mut s_ltp = [0i16; 2 * MAX_FRAME_LENGTH];
    let mut s_ltp_q16 = [0i32; 2 * MAX_FRAME_LENGTH];
    let mut x_sc_q10 = [0i32; MAX_FRAME_LENGTH / NB_SUBFR];

    nsq.s_ltp_shp_buf_idx = frame_length;
    nsq.s_ltp_buf_idx = frame_length;

    for k in 0..NB_SUBFR {
        let a_idx = (k >> 1) | usize::from(!lsf_interpolation_flag);
        let a_q12 = &ctrl.pred_coef_q12[a_idx][..predict_lpc_order];
        let b_q14 = &ctrl.ltp_coef_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER];
        let ar_shp_q13 = &ctrl.ar2_q13[k * MAX_SHAPE_LPC_ORDER..][..shaping_lpc_order];

        debug_assert!(ctrl.harm_shape_gain_q14[k] >= 0);
        let harm_shape_fir_packed_q14 =
            (ctrl.harm_shape_gain_q14[k] >> 2) | ((ctrl.harm_shape_gain_q14[k] >> 1) << 16);

        nsq.rewhite_flag = false;
        if ctrl.sigtype == SignalType::Voiced {
            lag = ctrl.pitch_lags[k];

            // rewhiten the LTP state whenever new LPC coefficients kick in
            if k & (3 - (usize::from(lsf_interpolation_flag) << 1)) == 0 {
                let start_idx = frame_length - lag - predict_lpc_order - LTP_ORDER / 2;
                debug_assert!(start_idx <= frame_length - predict_lpc_order);

                let mut filt_state = [0i32; MAX_ORDER_LPC];
                let xq_start = start_idx + k * (frame_length >> 2);
                ma_prediction(
                    &nsq.xq[xq_start..xq_start + (frame_length - start_idx)],
                    a_q12,
                    &mut filt_state[..predict_lpc_order],
                    &mut s_ltp[start_idx..frame_length],
                );

                nsq.rewhite_flag = true;
                nsq.s_ltp_buf_idx = frame_length;
            }
        }

        nsq_scale_states(
            nsq,
            &x[k * subfr_length..(k + 1) * subfr_length],
            &mut x_sc_q10[..subfr_length],
            &s_ltp,
            &mut s_ltp_q16,
            k,
            ctrl.ltp_scale_q14,
            &ctrl.gains_q16,
            &ctrl.pitch_lags,
        );

        noise_shape_quantizer(
            nsq,
            ctrl.sigtype,
            &x_sc_q10[..subfr_length],
            &mut q[k * subfr_length..(k + 1) * subfr_length],
            frame_length + k * subfr_length,
            &mut s_ltp_q16,
            a_q12,
            b_q14,
            ar_shp_q13,
            lag,
            harm_shape_fir_packed_q14,
            ctrl.tilt_q14[k],
            ctrl.lf_shp_q14[k],
            ctrl.gains_q16[k],
            ctrl.lambda_q10,
            offset_q10,
        );
    }

    nsq.lag_prev = ctrl.pitch_lags[NB_SUBFR - 1];

    // keep one frame of history for the next call
    nsq.xq.copy_within(frame_length..2 * frame_length, 0);
    nsq.s_ltp_shp_q10.copy_within(frame_length..2 * frame_length, 0);
}

/// Sequential quantization of one subframe.
#[allow(clippy::too_many_arguments)]
fn noise_shape_quantizer(
    nsq: &mut NsqState,
    sigtype: SignalType,
    x_sc_q10: &[i32],
    q: &mut [i8],
    xq_offset: usize,
    s_ltp_q16: &mut [i32],
    a_q12: &[i16],
    b_q14: &[i16],
    ar_shp_q13: &[i16],
    lag: usize,
    harm_shape_fir_packed_q14: i32,
    tilt_q14: i32,
    lf_shp_q14: i32,
    gain_q16: i32,
    lambda_q10: i32,
    offset_q10: i32,
) {
    let order = a_q12.len();
    let shaping_order = ar_shp_q13.len();
    debug_assert!(order & 1 == 0 && shaping_order & 1 == 0);

    let mut shp_lag_ix = nsq.s_ltp_shp_buf_idx.wrapping_sub(lag).wrapping_add(1);
    let mut pred_lag_ix = nsq.s_ltp_buf_idx.wrapping_sub(lag).wrapping_add(LTP_ORDER / 2);
    let mut lpc_ix = NSQ_LPC_BUF_LENGTH - 1;

    // quantization thresholds
    let thr1_q10 = -1536 - (lambda_q10 >> 1);
    let thr2_q10 = -512 - (lambda_q10 >> 1) + (smulbb(offset_q10, lambda_q10) >> 10);
    let thr3_q10 = 512 + (lambda_q10 >> 1);

    for (i, out) in q.iter_mut().enumerate() {
        nsq.rand_seed = lcg_rand(nsq.rand_seed);
        let dither = nsq.rand_seed >> 31;

        // short term prediction
        let mut lpc_pred_q10 = smulwb(nsq.s_lpc_q14[lpc_ix], i32::from(a_q12[0]));
        for j in 1..order {
            lpc_pred_q10 = smlawb(
                lpc_pred_q10,
                nsq.s_lpc_q14[lpc_ix - j],
                i32::from(a_q12[j]),
            );
        }

        // long term prediction
        let ltp_pred_q14 = if sigtype == SignalType::Voiced {
            let mut pred = smulwb(s_ltp_q16[pred_lag_ix], i32::from(b_q14[0]));
            for j in 1..LTP_ORDER {
                pred = smlawb(pred, s_ltp_q16[pred_lag_ix - j], i32::from(b_q14[j]));
            }
            pred_lag_ix += 1;
            pred
        } else {
            0
        };

        // noise shape feedback through a delay line rotated in place
        let mut tmp2 = nsq.s_lpc_q14[lpc_ix];
        let mut tmp1 = nsq.s_ar2_q14[0];
        nsq.s_ar2_q14[0] = tmp2;
        let mut n_ar_q10 = smulwb(tmp2, i32::from(ar_shp_q13[0]));
        let mut j = 2;
        while j < shaping_order {
            tmp2 = nsq.s_ar2_q14[j - 1];
            nsq.s_ar2_q14[j - 1] = tmp1;
            n_ar_q10 = smlawb(n_ar_q10, tmp1, i32::from(ar_shp_q13[j - 1]));
            tmp1 = nsq.s_ar2_q14[j];
            nsq.s_ar2_q14[j] = tmp2;
            n_ar_q10 = smlawb(n_ar_q10, tmp2, i32::from(ar_shp_q13[j]));
            j += 2;
        }
        nsq.s_ar2_q14[shaping_order - 1] = tmp1;
        n_ar_q10 = smlawb(n_ar_q10, tmp1, i32::from(ar_shp_q13[shaping_order - 1]));

        n_ar_q10 >>= 1; // Q11 -> Q10
        n_ar_q10 = smlawb(n_ar_q10, nsq.s_lf_ar_shp_q12, tilt_q14);

        let mut n_lf_q10 =
            smulwb(nsq.s_ltp_shp_q10[nsq.s_ltp_shp_buf_idx - 1], lf_shp_q14) << 2;
        n_lf_q10 = smlawt(n_lf_q10, nsq.s_lf_ar_shp_q12, lf_shp_q14);

        debug_assert!(lag > 0 || sigtype == SignalType::Unvoiced);

        // long term shaping with a symmetric three tap filter
        let n_ltp_q14 = if lag > 0 {
            let mut n = smulwb(
                nsq.s_ltp_shp_q10[shp_lag_ix] + nsq.s_ltp_shp_q10[shp_lag_ix - 2],
                harm_shape_fir_packed_q14,
            );
            n = smlawt(n, nsq.s_ltp_shp_q10[shp_lag_ix - 1], harm_shape_fir_packed_q14);
            shp_lag_ix += 1;
            n << 6
        } else {
            0
        };

        // input minus prediction plus noise feedback
        let mut tmp = (ltp_pred_q14 - n_ltp_q14) >> 4;
        tmp += lpc_pred_q10;
        tmp -= n_ar_q10;
        tmp -= n_lf_q10;
        let mut r_q10 = x_sc_q10[i] - tmp;

        // fold the dither into the residual sign
        r_q10 = (r_q10 ^ dither) - dither;
        r_q10 -= offset_q10;
        r_q10 = limit(r_q10, -(64 << 10), 64 << 10);

        // quantize with a deadzone widened by lambda
        let mut q_q0 = 0i32;
        let mut q_q10 = 0i32;
        if r_q10 < thr2_q10 {
            if r_q10 < thr1_q10 {
                q_q0 = rshift_round(r_q10 + (lambda_q10 >> 1), 10);
                q_q10 = q_q0 << 10;
            } else {
                q_q0 = -1;
                q_q10 = -1024;
            }
        } else if r_q10 > thr3_q10 {
            q_q0 = rshift_round(r_q10 - (lambda_q10 >> 1), 10);
            q_q10 = q_q0 << 10;
        }
        *out = q_q0 as i8;

        // excitation
        let mut exc_q10 = q_q10 + offset_q10;
        exc_q10 = (exc_q10 ^ dither) - dither;

        let lpc_exc_q10 = exc_q10 + rshift_round(ltp_pred_q14, 4);
        let xq_q10 = lpc_exc_q10 + lpc_pred_q10;

        nsq.xq[xq_offset + i] = sat16(rshift_round(smulww(xq_q10, gain_q16), 10));

        // update states
        lpc_ix += 1;
        nsq.s_lpc_q14[lpc_ix] = xq_q10 << 4;
        let s_lf_ar_shp_q10 = xq_q10 - n_ar_q10;
        nsq.s_lf_ar_shp_q12 = s_lf_ar_shp_q10 << 2;

        nsq.s_ltp_shp_q10[nsq.s_ltp_shp_buf_idx] = s_lf_ar_shp_q10 - n_lf_q10;
        s_ltp_q16[nsq.s_ltp_buf_idx] = lpc_exc_q10 << 6;
        nsq.s_ltp_shp_buf_idx += 1;
        nsq.s_ltp_buf_idx += 1;

        // dither sequence depends on the quantized pulses
        nsq.rand_seed = nsq.rand_seed.wrapping_add(i32::from(*out));
    }

    // keep the filter history for the next subframe
    nsq.s_lpc_q14
        .copy_within(q.len()..q.len() + NSQ_LPC_BUF_LENGTH, 0);
}

/// Scales the input and all filter states to the current subframe gain.
#[allow(clippy::too_many_arguments)]
fn nsq_scale_states(
    nsq: &mut NsqState,
    x: &[i16],
    x_sc_q10: &mut [i32],
    s_ltp: &[i16],
    s_ltp_q16: &mut [i32],
    subfr: usize,
    ltp_scale_q14: i32,
    gains_q16: &[i32; NB_SUBFR],
    pitch_lags: &[usize; NB_SUBFR],
) {
    let inv_gain_q16 = inverse32_var_q(gains_q16[subfr].max(1), 32).min(i32::from(i16::MAX));
    let lag = pitch_lags[subfr];

    // the rewhitened LTP state is unscaled, bring it to 1/gain domain
    if nsq.rewhite_flag {
        let mut inv_gain_q32 = inv_gain_q16 << 16;
        if subfr == 0 {
            // extra damping right after a potential loss
            inv_gain_q32 = smulwb(inv_gain_q32, ltp_scale_q14) << 2;
        }
        for i in nsq.s_ltp_buf_idx - lag - LTP_ORDER / 2..nsq.s_ltp_buf_idx {
            debug_assert!(i < MAX_FRAME_LENGTH);
            s_ltp_q16[i] = smulwb(inv_gain_q32, i32::from(s_ltp[i]));
        }
    }

    // adjust all running states when the gain changes
    if inv_gain_q16 != nsq.prev_inv_gain_q16 {
        let gain_adj_q16 = div32_var_q(inv_gain_q16, nsq.prev_inv_gain_q16, 16);

        for i in nsq.s_ltp_shp_buf_idx - x.len() * NB_SUBFR..nsq.s_ltp_shp_buf_idx {
            nsq.s_ltp_shp_q10[i] = smulww(gain_adj_q16, nsq.s_ltp_shp_q10[i]);
        }
        if !nsq.rewhite_flag {
            for i in nsq.s_ltp_buf_idx - lag - LTP_ORDER / 2..nsq.s_ltp_buf_idx {
                s_ltp_q16[i] = smulww(gain_adj_q16, s_ltp_q16[i]);
            }
        }

        nsq.s_lf_ar_shp_q12 = smulww(gain_adj_q16, nsq.s_lf_ar_shp_q12);

        for s in nsq.s_lpc_q14[..NSQ_LPC_BUF_LENGTH].iter_mut() {
            *s = smulww(gain_adj_q16, *s);
        }
        for s in nsq.s_ar2_q14.iter_mut() {
            *s = smulww(gain_adj_q16, *s);
        }
    }

    for (out, &sample) in x_sc_q10.iter_mut().zip(x) {
        *out = smulbb(i32::from(sample), inv_gain_q16) >> 6;
    }

    debug_assert!(inv_gain_q16 != 0);
    nsq.prev_inv_gain_q16 = inv_gain_q16;
}

#[cfg(test)]
mod tests {
    use super::{nsq, NsqState};
    use crate::common::{SignalType, NB_SUBFR};
    use crate::encoder_control::EncoderControl;

    fn quantize_frame(x: &[i16], state: &mut NsqState) -> alloc::vec::Vec<i8> {
        let mut ctrl = EncoderControl::default();
        ctrl.sigtype = SignalType::Unvoiced;
        ctrl.gains_q16 = [1 << 16; NB_SUBFR];
        ctrl.pred_coef_q12 = [[0; 16]; 2];
        ctrl.lambda_q10 = 1 << 10;
        ctrl.ltp_scale_q14 = 1 << 14;
        ctrl.seed = 1;

        let mut q = alloc::vec![0i8; x.len()];
        nsq(state, &ctrl, x, &mut q, x.len(), x.len() / NB_SUBFR, 16, 16);
        q
    }

    #[test]
    fn silence_quantizes_to_zero_pulses() {
        let x = [0i16; 320];
        let mut state = NsqState::default();
        let q = quantize_frame(&x, &mut state);
        assert!(q.iter().all(|&v| v == 0));
    }

    #[test]
    fn pulse_energy_tracks_the_input_when_prediction_is_off() {
        // with zero predictors and unit gain, big samples must produce pulses
        let x: alloc::vec::Vec<i16> = (0..320)
            .map(|i| if i % 4 == 0 { 20000 } else { -20000 })
            .collect();
        let mut state = NsqState::default();
        let q = quantize_frame(&x, &mut state);
        assert!(q.iter().filter(|&&v| v != 0).count() > 200);

        // the carried-over reconstruction holds the frame just coded
        assert!(state.xq[..320].iter().any(|&v| v != 0));
    }
}
