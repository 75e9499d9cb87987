//! Per-frame prediction analysis: LTP search and quantization for voiced
//! frames, then LPC estimation, NLSF quantization and residual energies.

use alloc::vec;

use crate::common::{SignalType, NB_SUBFR};
use crate::encoder_control::EncoderControl;
use crate::encoder_state::EncoderState;
use crate::find_lpc::find_lpc;
use crate::find_ltp::find_ltp;
use crate::ltp_analysis_filter::ltp_analysis_filter;
use crate::ltp_scale_ctrl::ltp_scale_ctrl;
use crate::math::{div32_var_q, smulwb};
use crate::process_nlsfs::process_nlsfs;
use crate::quant_ltp_gains::quant_ltp_gains;
use crate::residual_energy::residual_energy;
use crate::schur::MAX_ORDER_LPC;
use crate::tables_ltp::LTP_ORDER;
use crate::vector_ops::scale_copy_vector16;

/// Finds and quantizes all prediction coefficients for the frame.
/// `res_pitch` is the whitened residual from the pitch search and
/// `x_buf` the encoder's analysis buffer (previous frame first).
pub fn find_pred_coefs(
    enc: &mut EncoderState,
    ctrl: &mut EncoderControl,
    res_pitch: &[i16],
    x_buf: &[i16],
) {
    let subfr_length = enc.subfr_length;
    let order = enc.predict_lpc_order;

    // weights for the weighted least squares
    let mut min_gain_q16 = i32::MAX >> 6;
    for &g in ctrl.gains_q16.iter() {
        min_gain_q16 = min_gain_q16.min(g);
    }
    let mut inv_gains_q16 = [0i32; NB_SUBFR];
    let mut local_gains = [0i32; NB_SUBFR];
    let mut wght_q15 = [0i32; NB_SUBFR];
    for i in 0..NB_SUBFR {
        debug_assert!(ctrl.gains_q16[i] > 0);
        // invert and normalize so the largest inverse gain fits 16 bits
        let inv = div32_var_q(min_gain_q16, ctrl.gains_q16[i], 16 - 2).max(363);
        inv_gains_q16[i] = inv;
        wght_q15[i] = smulwb(inv, inv) >> 1;
        local_gains[i] = (1 << 16) / inv;
    }

    let mut lpc_in_pre = vec![0i16; NB_SUBFR * MAX_ORDER_LPC + crate::common::MAX_FRAME_LENGTH];
    let pre_len = NB_SUBFR * (subfr_length + order);

    if ctrl.sigtype == SignalType::Voiced {
        debug_assert!(enc.frame_length - order >= ctrl.pitch_lags[0] + LTP_ORDER / 2);

        let mut w_ltp = [0i32; NB_SUBFR * LTP_ORDER * LTP_ORDER];
        let mut corr_rshifts = [0i32; NB_SUBFR];
        ctrl.ltp_pred_cod_gain_q7 = find_ltp(
            &mut ctrl.ltp_coef_q14,
            &mut w_ltp,
            res_pitch,
            &res_pitch[enc.frame_length >> 1..],
            &ctrl.pitch_lags,
            &wght_q15,
            subfr_length,
            enc.frame_length,
            &mut corr_rshifts,
        );

        ctrl.per_index = quant_ltp_gains(
            &mut ctrl.ltp_coef_q14,
            &mut ctrl.ltp_index,
            &w_ltp,
            enc.mu_ltp_q8,
            enc.ltp_quant_low_complexity,
        );

        ltp_scale_ctrl(enc, ctrl);

        ltp_analysis_filter(
            &mut lpc_in_pre[..pre_len],
            x_buf,
            enc.frame_length - order,
            &ctrl.ltp_coef_q14,
            &ctrl.pitch_lags,
            &inv_gains_q16,
            subfr_length,
            order,
        );
    } else {
        // prepend each subframe with its history, scaled by the inverse gain
        let mut x_ix = enc.frame_length - order;
        for i in 0..NB_SUBFR {
            scale_copy_vector16(
                &mut lpc_in_pre[i * (subfr_length + order)..(i + 1) * (subfr_length + order)],
                &x_buf[x_ix..x_ix + subfr_length + order],
                inv_gains_q16[i],
            );
            x_ix += subfr_length;
        }

        ctrl.ltp_coef_q14 = [0; NB_SUBFR * LTP_ORDER];
        ctrl.ltp_pred_cod_gain_q7 = 0;
    }

    let mut nlsf_q15 = [0i32; MAX_ORDER_LPC];
    let interp_index = find_lpc(
        &mut nlsf_q15[..order],
        &enc.pred.prev_nlsf_q_q15[..order],
        enc.use_interpolated_nlsfs && !enc.first_frame_after_reset,
        order,
        &lpc_in_pre[..pre_len],
        subfr_length + order,
    );
    ctrl.nlsf_interp_coef_q2 = interp_index as i32;

    process_nlsfs(enc, ctrl, &mut nlsf_q15[..order]);

    residual_energy(
        &mut ctrl.res_nrg,
        &mut ctrl.res_nrg_q,
        &lpc_in_pre[..pre_len],
        &ctrl.pred_coef_q12,
        &local_gains,
        subfr_length,
        order,
    );

    // kept for fluctuation reduction in the next frame
    enc.pred.prev_nlsf_q_q15[..order].copy_from_slice(&nlsf_q15[..order]);
}
