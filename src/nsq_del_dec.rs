//! Noise shaping quantizer, delayed decision version. Runs several
//! quantizer hypotheses in parallel and commits each sample only after
//! a short delay, picking the survivor with the lowest rate-distortion.

use crate::common::{
    SignalType, DECISION_DELAY, DECISION_DELAY_MASK, MAX_DEL_DEC_STATES, MAX_FRAME_LENGTH,
    MAX_SHAPE_LPC_ORDER, NB_SUBFR, NSQ_LPC_BUF_LENGTH,
};
use crate::encoder_control::EncoderControl;
use crate::lpc_analysis_filter::ma_prediction;
use crate::math::{
    div32_var_q, inverse32_var_q, lcg_rand, limit, rshift_round, sat16, smlabb, smlawb, smlawt,
    smulbb, smulwb, smulww,
};
use crate::nsq::NsqState;
use crate::schur::MAX_ORDER_LPC;
use crate::tables_ltp::LTP_ORDER;
use crate::tables_other::QUANTIZATION_OFFSETS_Q10;

/// One quantizer hypothesis. The circular buffers hold the samples that
/// are still waiting for their final decision.
struct DelDecState {
    rand_state: [i32; DECISION_DELAY],
    q_q10: [i32; DECISION_DELAY],
    xq_q10: [i32; DECISION_DELAY],
    pred_q16: [i32; DECISION_DELAY],
    shape_q10: [i32; DECISION_DELAY],
    gain_q16: [i32; DECISION_DELAY],
    s_ar2_q14: [i32; MAX_SHAPE_LPC_ORDER],
    s_lpc_q14: [i32; MAX_FRAME_LENGTH / NB_SUBFR + NSQ_LPC_BUF_LENGTH],
    lf_ar_q12: i32,
    seed: i32,
    seed_init: i32,
    rd_q10: i32,
}

impl Default for DelDecState {
    fn default() -> Self {
        DelDecState {
            rand_state: [0; DECISION_DELAY],
            q_q10: [0; DECISION_DELAY],
            xq_q10: [0; DECISION_DELAY],
            pred_q16: [0; DECISION_DELAY],
            shape_q10: [0; DECISION_DELAY],
            gain_q16: [0; DECISION_DELAY],
            s_ar2_q14: [0; MAX_SHAPE_LPC_ORDER],
            s_lpc_q14: [0; MAX_FRAME_LENGTH / NB_SUBFR + NSQ_LPC_BUF_LENGTH],
            lf_ar_q12: 0,
            seed: 0,
            seed_init: 0,
            rd_q10: 0,
        }
    }
}

/// Per-sample candidate produced by one hypothesis.
#[derive(Clone, Copy, Default)]
struct SampleState {
    q_q10: i32,
    rd_q10: i32,
    xq_q14: i32,
    lf_ar_q12: i32,
    s_ltp_shp_q10: i32,
    lpc_exc_q16: i32,
}

/// Quantizes one frame of the prefiltered signal `x` into pulses `q`,
/// keeping `n_states` hypotheses alive.
#[allow(clippy::too_many_arguments)]
pub fn nsq_del_dec(
    nsq: &mut NsqState,
    ctrl: &mut EncoderControl,
    x: &[i16],
    q: &mut [i8],
    frame_length: usize,
    subfr_length: usize,
    predict_lpc_order: usize,
    shaping_lpc_order: usize,
    warping_q16: i32,
    n_states: usize,
) {
    debug_assert!(n_states >= 1 && n_states <= MAX_DEL_DEC_STATES);
    debug_assert!(nsq.prev_inv_gain_q16 != 0);

    // unvoiced frames keep shaping around the previous lag
    let mut lag = nsq.lag_prev;

    let mut states: [DelDecState; MAX_DEL_DEC_STATES] = Default::default();
    for (k, st) in states.iter_mut().enumerate().take(n_states) {
        st.seed = (k as i32 + ctrl.seed) & 3;
        st.seed_init = st.seed;
        st.lf_ar_q12 = nsq.s_lf_ar_shp_q12;
        st.shape_q10[0] = nsq.s_ltp_shp_q10[frame_length - 1];
        st.s_lpc_q14[..NSQ_LPC_BUF_LENGTH].copy_from_slice(&nsq.s_lpc_q14[..NSQ_LPC_BUF_LENGTH]);
        st.s_ar2_q14.copy_from_slice(&nsq.s_ar2_q14);
    }

    let offset_q10 =
        i32::from(QUANTIZATION_OFFSETS_Q10[ctrl.sigtype.code()][ctrl.quant_offset_type]);
    // index of the oldest undecided sample
    let mut smpl_buf_idx = 0usize;

    let mut decision_delay = DECISION_DELAY.min(subfr_length);

    // the delay must stay below the pitch lag or the long-term filters
    // would need samples that have not been committed yet
    if ctrl.sigtype == SignalType::Voiced {
        for k in 0..NB_SUBFR {
            decision_delay = decision_delay.min(ctrl.pitch_lags[k] - LTP_ORDER / 2 - 1);
        }
    } else if lag > 0 {
        decision_delay = decision_delay.min(lag - LTP_ORDER / 2 - 1);
    }

    let lsf_interpolation_flag = ctrl.nlsf_interp_coef_q2 != (1 << 2);

    let mut s_ltp = [0i16; 2 * MAX_FRAME_LENGTH];
    let mut s_ltp_q16 = [0i32; 2 * MAX_FRAME_LENGTH];
    let mut x_sc_q10 = [0i32; MAX_FRAME_LENGTH / NB_SUBFR];

    nsq.s_ltp_shp_buf_idx = frame_length;
    nsq.s_ltp_buf_idx = frame_length;
    let mut subfr = 0;

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
                if k == 2 {
                    // the second half uses fresh coefficients, so the
                    // pending samples must be committed now; flush the
                    // winner and restart the hypotheses from it
                    let winner_ind = find_winner(&states[..n_states]);
                    for (i, st) in states.iter_mut().enumerate().take(n_states) {
                        if i != winner_ind {
                            st.rd_q10 += i32::MAX >> 4;
                            debug_assert!(st.rd_q10 >= 0);
                        }
                    }

                    let winner = &states[winner_ind];
                    let q_base = k * subfr_length - decision_delay;
                    let xq_base = frame_length + k * subfr_length - decision_delay;
                    let shp_base = nsq.s_ltp_shp_buf_idx - decision_delay;
                    let mut last = smpl_buf_idx + decision_delay;
                    for i in 0..decision_delay {
                        last = last.wrapping_sub(1) & DECISION_DELAY_MASK;
                        q[q_base + i] = (winner.q_q10[last] >> 10) as i8;
                        nsq.xq[xq_base + i] = sat16(rshift_round(
                            smulww(winner.xq_q10[last], winner.gain_q16[last]),
                            10,
                        ));
                        nsq.s_ltp_shp_q10[shp_base + i] = winner.shape_q10[last];
                    }

                    subfr = 0;
                }

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

        nsq_del_dec_scale_states(
            nsq,
            &mut states[..n_states],
            &x[k * subfr_length..(k + 1) * subfr_length],
            &mut x_sc_q10[..subfr_length],
            &s_ltp,
            &mut s_ltp_q16,
            k,
            ctrl.ltp_scale_q14,
            &ctrl.gains_q16,
            &ctrl.pitch_lags,
        );

        noise_shape_quantizer_del_dec(
            nsq,
            &mut states[..n_states],
            ctrl.sigtype,
            &x_sc_q10[..subfr_length],
            q,
            k * subfr_length,
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
            subfr,
            warping_q16,
            &mut smpl_buf_idx,
            decision_delay,
        );
        subfr += 1;
    }

    // commit the tail of the winning hypothesis
    let winner_ind = find_winner(&states[..n_states]);
    let winner = &states[winner_ind];
    ctrl.seed = winner.seed_init;

    let q_base = frame_length - decision_delay;
    let xq_base = 2 * frame_length - decision_delay;
    let shp_base = nsq.s_ltp_shp_buf_idx - decision_delay;
    let pred_base = nsq.s_ltp_buf_idx - decision_delay;
    let mut last = smpl_buf_idx + decision_delay;
    for i in 0..decision_delay {
        last = last.wrapping_sub(1) & DECISION_DELAY_MASK;
        q[q_base + i] = (winner.q_q10[last] >> 10) as i8;
        nsq.xq[xq_base + i] = sat16(rshift_round(
            smulww(winner.xq_q10[last], winner.gain_q16[last]),
            10,
        ));
        nsq.s_ltp_shp_q10[shp_base + i] = winner.shape_q10[last];
        s_ltp_q16[pred_base + i] = winner.pred_q16[last];
    }
    nsq.s_lpc_q14[..NSQ_LPC_BUF_LENGTH]
        .copy_from_slice(&winner.s_lpc_q14[subfr_length..subfr_length + NSQ_LPC_BUF_LENGTH]);
    nsq.s_ar2_q14.copy_from_slice(&winner.s_ar2_q14);
    nsq.s_lf_ar_shp_q12 = winner.lf_ar_q12;
    nsq.lag_prev = ctrl.pitch_lags[NB_SUBFR - 1];

    // keep one frame of history for the next call
    nsq.xq.copy_within(frame_length..2 * frame_length, 0);
    nsq.s_ltp_shp_q10.copy_within(frame_length..2 * frame_length, 0);
}

fn find_winner(states: &[DelDecState]) -> usize {
    let mut winner_ind = 0;
    let mut rd_min_q10 = states[0].rd_q10;
    for (k, st) in states.iter().enumerate().skip(1) {
        if st.rd_q10 < rd_min_q10 {
            rd_min_q10 = st.rd_q10;
            winner_ind = k;
        }
    }
    winner_ind
}

/// Trellis quantization of one subframe. Every sample each hypothesis
/// spawns its two best quantization levels, the pool is pruned back to
/// `states.len()` survivors, and the sample decided `decision_delay`
/// samples ago is written out from the currently leading hypothesis.
#[allow(clippy::too_many_arguments)]
fn noise_shape_quantizer_del_dec(
    nsq: &mut NsqState,
    states: &mut [DelDecState],
    sigtype: SignalType,
    x_q10: &[i32],
    q: &mut [i8],
    q_offset: usize,
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
    subfr: usize,
    warping_q16: i32,
    smpl_buf_idx: &mut usize,
    decision_delay: usize,
) {
    let order = a_q12.len();
    let shaping_order = ar_shp_q13.len();
    debug_assert!(order & 1 == 0 && shaping_order & 1 == 0);

    let mut sample_states = [[SampleState::default(); 2]; MAX_DEL_DEC_STATES];

    let mut shp_lag_ix = nsq.s_ltp_shp_buf_idx.wrapping_sub(lag).wrapping_add(1);
    let mut pred_lag_ix = nsq.s_ltp_buf_idx.wrapping_sub(lag).wrapping_add(LTP_ORDER / 2);

    for i in 0..x_q10.len() {
        // long term prediction, common to all hypotheses
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

        for (st, ss) in states.iter_mut().zip(sample_states.iter_mut()) {
            st.seed = lcg_rand(st.seed);
            let dither = st.seed >> 31;

            let lpc_ix = NSQ_LPC_BUF_LENGTH - 1 + i;

            // short term prediction
            let mut lpc_pred_q10 = smulwb(st.s_lpc_q14[lpc_ix], i32::from(a_q12[0]));
            for j in 1..order {
                lpc_pred_q10 =
                    smlawb(lpc_pred_q10, st.s_lpc_q14[lpc_ix - j], i32::from(a_q12[j]));
            }

            // noise shape feedback through a chain of warped allpass sections
            let mut tmp2 = smlawb(st.s_lpc_q14[lpc_ix], st.s_ar2_q14[0], warping_q16);
            let mut tmp1 = smlawb(st.s_ar2_q14[0], st.s_ar2_q14[1] - tmp2, warping_q16);
            st.s_ar2_q14[0] = tmp2;
            let mut n_ar_q10 = smulwb(tmp2, i32::from(ar_shp_q13[0]));
            let mut j = 2;
            while j < shaping_order {
                tmp2 = smlawb(st.s_ar2_q14[j - 1], st.s_ar2_q14[j] - tmp1, warping_q16);
                st.s_ar2_q14[j - 1] = tmp1;
                n_ar_q10 = smlawb(n_ar_q10, tmp1, i32::from(ar_shp_q13[j - 1]));
                tmp1 = smlawb(st.s_ar2_q14[j], st.s_ar2_q14[j + 1] - tmp2, warping_q16);
                st.s_ar2_q14[j] = tmp2;
                n_ar_q10 = smlawb(n_ar_q10, tmp2, i32::from(ar_shp_q13[j]));
                j += 2;
            }
            st.s_ar2_q14[shaping_order - 1] = tmp1;
            n_ar_q10 = smlawb(n_ar_q10, tmp1, i32::from(ar_shp_q13[shaping_order - 1]));

            n_ar_q10 >>= 1; // Q11 -> Q10
            n_ar_q10 = smlawb(n_ar_q10, st.lf_ar_q12, tilt_q14);

            let mut n_lf_q10 = smulwb(st.shape_q10[*smpl_buf_idx], lf_shp_q14) << 2;
            n_lf_q10 = smlawt(n_lf_q10, st.lf_ar_q12, lf_shp_q14);

            // input minus prediction plus noise feedback
            let mut tmp = (ltp_pred_q14 - n_ltp_q14) >> 4;
            tmp += lpc_pred_q10;
            tmp -= n_ar_q10;
            tmp -= n_lf_q10;
            let mut r_q10 = x_q10[i] - tmp;

            // fold the dither into the residual sign
            r_q10 = (r_q10 ^ dither) - dither;
            r_q10 -= offset_q10;
            r_q10 = limit(r_q10, -(64 << 10), 64 << 10);

            // two quantization level candidates and their rate-distortion
            let (q1_q10, q2_q10, rd1_q10, rd2_q10);
            if r_q10 < -1536 {
                q1_q10 = rshift_round(r_q10, 10) << 10;
                let r_q10 = r_q10 - q1_q10;
                rd1_q10 =
                    smlabb((-(q1_q10 + offset_q10)).wrapping_mul(lambda_q10), r_q10, r_q10) >> 10;
                rd2_q10 = rd1_q10 + 1024 - (lambda_q10 + (r_q10 << 1));
                q2_q10 = q1_q10 + 1024;
            } else if r_q10 > 512 {
                q1_q10 = rshift_round(r_q10, 10) << 10;
                let r_q10 = r_q10 - q1_q10;
                rd1_q10 =
                    smlabb((q1_q10 + offset_q10).wrapping_mul(lambda_q10), r_q10, r_q10) >> 10;
                rd2_q10 = rd1_q10 + 1024 - (lambda_q10 - (r_q10 << 1));
                q2_q10 = q1_q10 - 1024;
            } else {
                let rr_q20 = smulbb(offset_q10, lambda_q10);
                rd2_q10 = smlabb(rr_q20, r_q10, r_q10) >> 10;
                rd1_q10 = rd2_q10 + 1024 + (lambda_q10 + (r_q10 << 1)) - (rr_q20 >> 9);
                q1_q10 = -1024;
                q2_q10 = 0;
            }

            if rd1_q10 < rd2_q10 {
                ss[0].rd_q10 = st.rd_q10 + rd1_q10;
                ss[1].rd_q10 = st.rd_q10 + rd2_q10;
                ss[0].q_q10 = q1_q10;
                ss[1].q_q10 = q2_q10;
            } else {
                ss[0].rd_q10 = st.rd_q10 + rd2_q10;
                ss[1].rd_q10 = st.rd_q10 + rd1_q10;
                ss[0].q_q10 = q2_q10;
                ss[1].q_q10 = q1_q10;
            }

            // reconstruction and shaping states for both candidates
            for s in ss.iter_mut() {
                let mut exc_q10 = offset_q10 + s.q_q10;
                exc_q10 = (exc_q10 ^ dither) - dither;

                let lpc_exc_q10 = exc_q10 + rshift_round(ltp_pred_q14, 4);
                let xq_q10 = lpc_exc_q10 + lpc_pred_q10;

                let s_lf_ar_shp_q10 = xq_q10 - n_ar_q10;
                s.s_ltp_shp_q10 = s_lf_ar_shp_q10 - n_lf_q10;
                s.lf_ar_q12 = s_lf_ar_shp_q10 << 2;
                s.xq_q14 = xq_q10 << 4;
                s.lpc_exc_q16 = lpc_exc_q10 << 6;
            }
        }

        *smpl_buf_idx = smpl_buf_idx.wrapping_sub(1) & DECISION_DELAY_MASK;
        let last_smple_idx = (*smpl_buf_idx + decision_delay) & DECISION_DELAY_MASK;

        // leading hypothesis after this sample
        let mut rd_min_q10 = sample_states[0][0].rd_q10;
        let mut winner_ind = 0;
        for k in 1..states.len() {
            if sample_states[k][0].rd_q10 < rd_min_q10 {
                rd_min_q10 = sample_states[k][0].rd_q10;
                winner_ind = k;
            }
        }

        // hypotheses whose oldest pending sample disagrees with the
        // winner's can no longer be committed, push them out
        let winner_rand_state = states[winner_ind].rand_state[last_smple_idx];
        for (k, st) in states.iter().enumerate() {
            if st.rand_state[last_smple_idx] != winner_rand_state {
                sample_states[k][0].rd_q10 += i32::MAX >> 4;
                sample_states[k][1].rd_q10 += i32::MAX >> 4;
                debug_assert!(sample_states[k][0].rd_q10 >= 0);
            }
        }

        // worst surviving candidate against the best runner-up
        let mut rd_max_q10 = sample_states[0][0].rd_q10;
        let mut rd_min_q10 = sample_states[0][1].rd_q10;
        let mut rd_max_ind = 0;
        let mut rd_min_ind = 0;
        for k in 1..states.len() {
            if sample_states[k][0].rd_q10 > rd_max_q10 {
                rd_max_q10 = sample_states[k][0].rd_q10;
                rd_max_ind = k;
            }
            if sample_states[k][1].rd_q10 < rd_min_q10 {
                rd_min_q10 = sample_states[k][1].rd_q10;
                rd_min_ind = k;
            }
        }

        if rd_min_q10 < rd_max_q10 {
            copy_del_dec_state(states, rd_max_ind, rd_min_ind, i);
            sample_states[rd_max_ind][0] = sample_states[rd_min_ind][1];
        }

        // commit the sample that has waited out the full delay
        if subfr > 0 || i >= decision_delay {
            let winner = &states[winner_ind];
            q[q_offset + i - decision_delay] = (winner.q_q10[last_smple_idx] >> 10) as i8;
            nsq.xq[xq_offset + i - decision_delay] = sat16(rshift_round(
                smulww(winner.xq_q10[last_smple_idx], winner.gain_q16[last_smple_idx]),
                10,
            ));
            nsq.s_ltp_shp_q10[nsq.s_ltp_shp_buf_idx - decision_delay] =
                winner.shape_q10[last_smple_idx];
            s_ltp_q16[nsq.s_ltp_buf_idx - decision_delay] = winner.pred_q16[last_smple_idx];
        }
        nsq.s_ltp_shp_buf_idx += 1;
        nsq.s_ltp_buf_idx += 1;

        for (st, ss) in states.iter_mut().zip(sample_states.iter()) {
            let s = &ss[0];
            st.lf_ar_q12 = s.lf_ar_q12;
            st.s_lpc_q14[NSQ_LPC_BUF_LENGTH + i] = s.xq_q14;
            st.xq_q10[*smpl_buf_idx] = s.xq_q14 >> 4;
            st.q_q10[*smpl_buf_idx] = s.q_q10;
            st.pred_q16[*smpl_buf_idx] = s.lpc_exc_q16;
            st.shape_q10[*smpl_buf_idx] = s.s_ltp_shp_q10;
            // dither sequence depends on the quantized pulses
            st.seed = st.seed.wrapping_add(s.q_q10 >> 10);
            st.rand_state[*smpl_buf_idx] = st.seed;
            st.rd_q10 = s.rd_q10;
            st.gain_q16[*smpl_buf_idx] = gain_q16;
        }
    }

    // keep the filter history for the next subframe
    for st in states.iter_mut() {
        st.s_lpc_q14
            .copy_within(x_q10.len()..x_q10.len() + NSQ_LPC_BUF_LENGTH, 0);
    }
}

/// Scales the input and all filter states, shared and per hypothesis,
/// to the current subframe gain.
#[allow(clippy::too_many_arguments)]
fn nsq_del_dec_scale_states(
    nsq: &mut NsqState,
    states: &mut [DelDecState],
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

        for st in states.iter_mut() {
            st.lf_ar_q12 = smulww(gain_adj_q16, st.lf_ar_q12);

            for s in st.s_lpc_q14[..NSQ_LPC_BUF_LENGTH].iter_mut() {
                *s = smulww(gain_adj_q16, *s);
            }
            for s in st.s_ar2_q14.iter_mut() {
                *s = smulww(gain_adj_q16, *s);
            }
            for i in 0..DECISION_DELAY {
                st.pred_q16[i] = smulww(gain_adj_q16, st.pred_q16[i]);
                st.shape_q10[i] = smulww(gain_adj_q16, st.shape_q10[i]);
            }
        }
    }

    for (out, &sample) in x_sc_q10.iter_mut().zip(x) {
        *out = smulbb(i32::from(sample), inv_gain_q16) >> 6;
    }

    debug_assert!(inv_gain_q16 != 0);
    nsq.prev_inv_gain_q16 = inv_gain_q16;
}

/// Replaces the `dst` hypothesis with `src`. Only the live part of the
/// LPC buffer is copied; entries before `lpc_ix` are never read again.
fn copy_del_dec_state(states: &mut [DelDecState], dst: usize, src: usize, lpc_ix: usize) {
    if dst == src {
        return;
    }
    let (lo, hi) = states.split_at_mut(dst.max(src));
    let (s, d): (&DelDecState, &mut DelDecState) = if src < dst {
        (&lo[src], &mut hi[0])
    } else {
        (&hi[0], &mut lo[dst])
    };

    d.rand_state = s.rand_state;
    d.q_q10 = s.q_q10;
    d.pred_q16 = s.pred_q16;
    d.shape_q10 = s.shape_q10;
    d.xq_q10 = s.xq_q10;
    d.s_ar2_q14 = s.s_ar2_q14;
    d.s_lpc_q14[lpc_ix..lpc_ix + NSQ_LPC_BUF_LENGTH]
        .copy_from_slice(&s.s_lpc_q14[lpc_ix..lpc_ix + NSQ_LPC_BUF_LENGTH]);
    d.lf_ar_q12 = s.lf_ar_q12;
    d.seed = s.seed;
    d.seed_init = s.seed_init;
    d.rd_q10 = s.rd_q10;
}

#[cfg(test)]
mod tests {
    use super::nsq_del_dec;
    use crate::common::{SignalType, NB_SUBFR};
    use crate::encoder_control::EncoderControl;
    use crate::nsq::NsqState;

    fn quantize_frame(x: &[i16], state: &mut NsqState, n_states: usize) -> alloc::vec::Vec<i8> {
        let mut ctrl = EncoderControl::default();
        ctrl.sigtype = SignalType::Unvoiced;
        ctrl.gains_q16 = [1 << 16; NB_SUBFR];
        ctrl.pred_coef_q12 = [[0; 16]; 2];
        ctrl.lambda_q10 = 1 << 10;
        ctrl.ltp_scale_q14 = 1 << 14;
        ctrl.seed = 2;

        let mut q = alloc::vec![99i8; x.len()];
        nsq_del_dec(
            state,
            &mut ctrl,
            x,
            &mut q,
            x.len(),
            x.len() / NB_SUBFR,
            16,
            16,
            0,
            n_states,
        );
        // the winner's initial seed is handed back for the encoder to code
        assert!((0..4).contains(&ctrl.seed));
        q
    }

    #[test]
    fn silence_quantizes_to_zero_pulses() {
        let x = [0i16; 320];
        let mut state = NsqState::default();
        let q = quantize_frame(&x, &mut state, 4);
        // every position got written despite the decision delay
        assert!(q.iter().all(|&v| v == 0));
    }

    #[test]
    fn delayed_decisions_never_beat_the_input_energy() {
        let x: alloc::vec::Vec<i16> = (0..320)
            .map(|i| if i % 4 == 0 { 20000 } else { -20000 })
            .collect();
        let mut state = NsqState::default();
        let q = quantize_frame(&x, &mut state, 4);
        assert!(q.iter().filter(|&&v| v != 0).count() > 200);
        assert!(q.iter().all(|&v| v != 99));
        assert!(state.xq[..320].iter().any(|&v| v != 0));
    }

    #[test]
    fn single_hypothesis_still_covers_the_frame() {
        let x: alloc::vec::Vec<i16> = (0..320)
            .map(|i| (libm::sin(i as f64 * 0.1) * 8000.0) as i16)
            .collect();
        let mut state = NsqState::default();
        let q = quantize_frame(&x, &mut state, 1);
        assert!(q.iter().all(|&v| v != 99));
    }
}
