//! Core synthesis: reconstructs the excitation from the pulses and runs
//! the inverse long-term and short-term prediction filters.

use crate::common::{SignalType, MAX_FRAME_LENGTH, NB_SUBFR};
use crate::decoder_control::DecoderControl;
use crate::decoder_state::DecoderState;
use crate::lpc_analysis_filter::ma_prediction;
use crate::math::{div32_var_q, inverse32_var_q, lcg_rand, rshift_round, sat16, smlawb, smulwb, smulww};
use crate::schur::MAX_ORDER_LPC;
use crate::tables_ltp::LTP_ORDER;
use crate::tables_other::QUANTIZATION_OFFSETS_Q10;

/// Synthesizes one frame into `xq` from the decoded pulses `q`.
pub fn decode_core(
    dec: &mut DecoderState,
    ctrl: &mut DecoderControl,
    xq: &mut [i16],
    q: &[i32],
) {
    let frame_length = dec.frame_length;
    let subfr_length = dec.subfr_length;
    let lpc_order = dec.lpc_order;
    debug_assert!(xq.len() == frame_length && q.len() == frame_length);
    debug_assert!(dec.prev_inv_gain_q16 != 0);

    let offset_q10 = i32::from(
        QUANTIZATION_OFFSETS_Q10[ctrl.sigtype.code()][ctrl.quant_offset_type],
    );
    let nlsf_interpolation_flag = i32::from(ctrl.nlsf_interp_coef_q2 < 4);

    // excitation, dithered by the transmitted seed
    let mut rand_seed = ctrl.seed;
    for (exc, &pulse) in dec.exc_q10[..frame_length].iter_mut().zip(q) {
        rand_seed = lcg_rand(rand_seed);
        let dither = rand_seed >> 31;
        *exc = (((pulse << 10) + offset_q10) ^ dither) - dither;
        rand_seed = rand_seed.wrapping_add(pulse);
    }

    let mut s_ltp = [0i16; MAX_FRAME_LENGTH];
    let mut s_ltp_buf_idx = frame_length;

    for k in 0..NB_SUBFR {
        let base = k * subfr_length;
        let half = k >> 1;
        let gain_q16 = ctrl.gains_q16[k];
        let mut sigtype = ctrl.sigtype;

        let mut inv_gain_q16 = inverse32_var_q(gain_q16.max(1), 32);
        inv_gain_q16 = inv_gain_q16.min(i32::from(i16::MAX));

        let gain_adj_q16 = if inv_gain_q16 != dec.prev_inv_gain_q16 {
            div32_var_q(inv_gain_q16, dec.prev_inv_gain_q16, 16)
        } else {
            1 << 16
        };

        // avoid an abrupt transition from voiced concealment to unvoiced
        // decoding by keeping a weak single-tap predictor going
        if dec.loss_cnt > 0
            && dec.prev_sigtype == SignalType::Voiced
            && ctrl.sigtype == SignalType::Unvoiced
            && k < NB_SUBFR / 2
        {
            let taps = &mut ctrl.ltp_coef_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER];
            taps.fill(0);
            taps[LTP_ORDER / 2] = 1 << 12;
            sigtype = SignalType::Voiced;
            ctrl.pitch_lags[k] = dec.lag_prev;
        }

        let mut b_q14 = [0i16; LTP_ORDER];
        b_q14.copy_from_slice(&ctrl.ltp_coef_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER]);

        let mut lag = 0usize;
        if sigtype == SignalType::Voiced {
            lag = ctrl.pitch_lags[k] as usize;

            if k as i32 & (3 - (nlsf_interpolation_flag << 1)) == 0 {
                // rewhiten the output history with the current LPC filter
                // to rebuild the LTP state at the new gain
                let start_idx = frame_length - lag - lpc_order - LTP_ORDER / 2;
                debug_assert!(start_idx + base + (frame_length - start_idx) <= 2 * MAX_FRAME_LENGTH);

                let mut filt_state = [0i32; MAX_ORDER_LPC];
                ma_prediction(
                    &dec.out_buf[start_idx + base..start_idx + base + (frame_length - start_idx)],
                    &ctrl.pred_coef_q12[half][..lpc_order],
                    &mut filt_state[..lpc_order],
                    &mut s_ltp[start_idx..frame_length],
                );

                let mut inv_gain_q32 = inv_gain_q16 << 16;
                if k == 0 {
                    inv_gain_q32 = smulwb(inv_gain_q32, ctrl.ltp_scale_q14) << 2;
                }
                for i in 0..lag + LTP_ORDER / 2 {
                    dec.s_ltp_q16[s_ltp_buf_idx - i - 1] =
                        smulwb(inv_gain_q32, i32::from(s_ltp[frame_length - i - 1]));
                }
            } else if gain_adj_q16 != 1 << 16 {
                for i in 0..lag + LTP_ORDER / 2 {
                    dec.s_ltp_q16[s_ltp_buf_idx - i - 1] =
                        smulww(gain_adj_q16, dec.s_ltp_q16[s_ltp_buf_idx - i - 1]);
                }
            }
        }

        // rescale the short-term state to the new gain
        for s in dec.s_lpc_q14[..MAX_ORDER_LPC].iter_mut() {
            *s = smulww(gain_adj_q16, *s);
        }
        dec.prev_inv_gain_q16 = inv_gain_q16;

        // long-term prediction
        if sigtype == SignalType::Voiced {
            let mut pred_lag_ix = s_ltp_buf_idx - lag + LTP_ORDER / 2;
            for i in 0..subfr_length {
                let mut ltp_pred_q14 =
                    smulwb(dec.s_ltp_q16[pred_lag_ix], i32::from(b_q14[0]));
                ltp_pred_q14 =
                    smlawb(ltp_pred_q14, dec.s_ltp_q16[pred_lag_ix - 1], i32::from(b_q14[1]));
                ltp_pred_q14 =
                    smlawb(ltp_pred_q14, dec.s_ltp_q16[pred_lag_ix - 2], i32::from(b_q14[2]));
                ltp_pred_q14 =
                    smlawb(ltp_pred_q14, dec.s_ltp_q16[pred_lag_ix - 3], i32::from(b_q14[3]));
                ltp_pred_q14 =
                    smlawb(ltp_pred_q14, dec.s_ltp_q16[pred_lag_ix - 4], i32::from(b_q14[4]));
                pred_lag_ix += 1;

                let res = dec.exc_q10[base + i] + rshift_round(ltp_pred_q14, 4);
                dec.res_q10[base + i] = res;
                dec.s_ltp_q16[s_ltp_buf_idx] = res << 6;
                s_ltp_buf_idx += 1;
            }
        } else {
            let (exc, res) = (&dec.exc_q10, &mut dec.res_q10);
            res[base..base + subfr_length].copy_from_slice(&exc[base..base + subfr_length]);
        }

        // short-term prediction
        let a_q12 = &ctrl.pred_coef_q12[half];
        for i in 0..subfr_length {
            let mut lpc_pred_q10 = 0i32;
            for j in 0..lpc_order {
                lpc_pred_q10 = smlawb(
                    lpc_pred_q10,
                    dec.s_lpc_q14[MAX_ORDER_LPC + i - j - 1],
                    i32::from(a_q12[j]),
                );
            }
            let v = dec.res_q10[base + i].wrapping_add(lpc_pred_q10);
            dec.res_q10[base + i] = v;
            dec.s_lpc_q14[MAX_ORDER_LPC + i] = v.wrapping_shl(4);
        }

        // scale back up to the signal level
        for i in 0..subfr_length {
            dec.out_buf[frame_length + base + i] =
                sat16(rshift_round(smulww(dec.res_q10[base + i], gain_q16), 10));
        }

        dec.s_lpc_q14
            .copy_within(subfr_length..subfr_length + MAX_ORDER_LPC, 0);
    }

    xq.copy_from_slice(&dec.out_buf[frame_length..2 * frame_length]);
}

#[cfg(test)]
mod tests {
    use super::decode_core;
    use crate::common::SignalType;
    use crate::decoder_control::DecoderControl;
    use crate::decoder_state::DecoderState;
    use crate::decoder_set_fs::decoder_set_fs;

    #[test]
    fn zero_excitation_with_unit_gain_stays_quiet() {
        let mut dec = DecoderState::new();
        decoder_set_fs(&mut dec, 8);
        dec.first_frame_after_reset = false;

        let mut ctrl = DecoderControl::default();
        ctrl.sigtype = SignalType::Unvoiced;
        ctrl.gains_q16 = [1 << 16; 4];

        let q = alloc::vec![0i32; dec.frame_length];
        let mut xq = alloc::vec![0i16; dec.frame_length];
        decode_core(&mut dec, &mut ctrl, &mut xq, &q);

        // only the constant quantization offset leaks through the filters
        assert!(xq.iter().all(|&v| v.unsigned_abs() < 16));
    }

    #[test]
    fn louder_gain_scales_the_output_up() {
        let run = |gain: i32| -> i64 {
            let mut dec = DecoderState::new();
            decoder_set_fs(&mut dec, 8);
            let mut ctrl = DecoderControl::default();
            ctrl.sigtype = SignalType::Unvoiced;
            ctrl.gains_q16 = [gain; 4];
            ctrl.seed = 1;

            let mut q = alloc::vec![0i32; dec.frame_length];
            for (i, v) in q.iter_mut().enumerate() {
                *v = match i % 5 {
                    0 => 2,
                    2 => -1,
                    _ => 0,
                };
            }
            let mut xq = alloc::vec![0i16; dec.frame_length];
            decode_core(&mut dec, &mut ctrl, &mut xq, &q);
            xq.iter().map(|&v| i64::from(v) * i64::from(v)).sum()
        };

        let quiet = run(1 << 16);
        let loud = run(8 << 16);
        assert!(loud > 4 * quiet);
    }
}
