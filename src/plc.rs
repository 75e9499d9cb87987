//! Packet loss concealment: extrapolates the last good frame with an
//! attenuated pitch predictor plus shaped noise, and fades the first
//! good frame back in.

use crate::bwexpander::bwexpander;
use crate::common::{SignalType, MAX_FRAME_LENGTH, NB_SUBFR};
use crate::decoder_control::DecoderControl;
use crate::decoder_state::DecoderState;
use crate::lpc_inv_pred_gain::lpc_inverse_pred_gain;
use crate::math::{clz32, lcg_rand, rshift_round, sat16, smlawb, smulbb, smulwb, smulww, sqrt_approx};
use crate::schur::MAX_ORDER_LPC;
use crate::tables_ltp::LTP_ORDER;
use crate::vector_ops::sum_sqr_shift;

const BWE_COEF_Q16: i32 = 64880;
const V_PITCH_GAIN_START_MIN_Q14: i32 = 11469;
const V_PITCH_GAIN_START_MAX_Q14: i32 = 15565;
const MAX_PITCH_LAG_MS: i32 = 18;
const RAND_BUF_SIZE: usize = 128;
const RAND_BUF_MASK: i32 = RAND_BUF_SIZE as i32 - 1;
const LOG2_INV_LPC_GAIN_HIGH_THRES: i32 = 3;
const LOG2_INV_LPC_GAIN_LOW_THRES: i32 = 8;
const PITCH_DRIFT_FAC_Q16: i32 = 655;

const NB_ATT: usize = 2;
const HARM_ATT_Q15: [i32; NB_ATT] = [32440, 31130];
const PLC_RAND_ATTENUATE_V_Q15: [i32; NB_ATT] = [31130, 26214];
const PLC_RAND_ATTENUATE_UV_Q15: [i32; NB_ATT] = [32440, 29491];

/// Conceals a lost frame or, for a good frame, refreshes the state the
/// next concealment will extrapolate from.
pub fn plc(
    dec: &mut DecoderState,
    ctrl: &mut DecoderControl,
    signal: &mut [i16],
    lost: bool,
) {
    if dec.fs_khz != dec.plc.fs_khz {
        dec.plc.reset(dec.frame_length);
        dec.plc.fs_khz = dec.fs_khz;
    }

    if lost {
        log::trace!("concealing lost frame, run length {}", dec.loss_cnt + 1);
        plc_conceal(dec, ctrl, signal);
        dec.loss_cnt += 1;
    } else {
        plc_update(dec, ctrl);
    }
}

/// Captures the predictors of a correctly decoded frame.
fn plc_update(dec: &mut DecoderState, ctrl: &DecoderControl) {
    dec.prev_sigtype = ctrl.sigtype;

    let mut ltp_gain_q14 = 0i32;
    if ctrl.sigtype == SignalType::Voiced {
        // last subframe that still contains a full pitch period
        let mut j = 0usize;
        while ((j * dec.subfr_length) as i32) < ctrl.pitch_lags[NB_SUBFR - 1] {
            let k = NB_SUBFR - 1 - j;
            let taps = &ctrl.ltp_coef_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER];
            let temp_gain_q14: i32 = taps.iter().map(|&t| i32::from(t)).sum();
            if temp_gain_q14 > ltp_gain_q14 {
                ltp_gain_q14 = temp_gain_q14;
                dec.plc.ltp_coef_q14.copy_from_slice(taps);
                dec.plc.pitch_l_q8 = ctrl.pitch_lags[k] << 8;
            }
            j += 1;
        }

        // collapse onto a single center tap
        dec.plc.ltp_coef_q14 = [0; LTP_ORDER];
        dec.plc.ltp_coef_q14[LTP_ORDER / 2] = ltp_gain_q14 as i16;

        if ltp_gain_q14 < V_PITCH_GAIN_START_MIN_Q14 {
            let scale_q10 = (V_PITCH_GAIN_START_MIN_Q14 << 10) / ltp_gain_q14.max(1);
            for t in dec.plc.ltp_coef_q14.iter_mut() {
                *t = (smulbb(i32::from(*t), scale_q10) >> 10) as i16;
            }
        } else if ltp_gain_q14 > V_PITCH_GAIN_START_MAX_Q14 {
            let scale_q14 = (V_PITCH_GAIN_START_MAX_Q14 << 14) / ltp_gain_q14.max(1);
            for t in dec.plc.ltp_coef_q14.iter_mut() {
                *t = (smulbb(i32::from(*t), scale_q14) >> 14) as i16;
            }
        }
    } else {
        dec.plc.pitch_l_q8 = smulbb(dec.fs_khz as i32, 18) << 8;
        dec.plc.ltp_coef_q14 = [0; LTP_ORDER];
    }

    dec.plc.prev_lpc_q12[..dec.lpc_order]
        .copy_from_slice(&ctrl.pred_coef_q12[1][..dec.lpc_order]);
    dec.plc.prev_ltp_scale_q14 = ctrl.ltp_scale_q14 as i16;
    dec.plc.prev_gains_q16 = ctrl.gains_q16;
}

/// Extrapolates one frame from the concealment state.
fn plc_conceal(dec: &mut DecoderState, ctrl: &mut DecoderControl, signal: &mut [i16]) {
    let frame_length = dec.frame_length;
    let subfr_length = dec.subfr_length;
    let lpc_order = dec.lpc_order;

    // shift the LTP memory down one frame
    dec.s_ltp_q16.copy_within(frame_length..2 * frame_length, 0);

    bwexpander(&mut dec.plc.prev_lpc_q12[..lpc_order], BWE_COEF_Q16);

    // pick the quieter of the last two subframes as the noise source
    let mut exc_buf = [0i16; MAX_FRAME_LENGTH];
    for k in NB_SUBFR / 2..NB_SUBFR {
        for i in 0..subfr_length {
            exc_buf[(k - NB_SUBFR / 2) * subfr_length + i] = rshift_round(
                smulww(dec.exc_q10[k * subfr_length + i], dec.plc.prev_gains_q16[k]),
                10,
            ) as i16;
        }
    }
    let (energy1, shift1) = sum_sqr_shift(&exc_buf[..subfr_length]);
    let (energy2, shift2) = sum_sqr_shift(&exc_buf[subfr_length..2 * subfr_length]);
    let rand_base = if (energy1 >> shift2) < (energy2 >> shift1) {
        (3 * subfr_length).saturating_sub(RAND_BUF_SIZE)
    } else {
        frame_length.saturating_sub(RAND_BUF_SIZE)
    };

    let mut b_q14 = dec.plc.ltp_coef_q14;
    let mut rand_scale_q14 = i32::from(dec.plc.rand_scale_q14);

    let att = (dec.loss_cnt as usize).min(NB_ATT - 1);
    let harm_gain_q15 = HARM_ATT_Q15[att];
    let mut rand_gain_q15 = if dec.prev_sigtype == SignalType::Voiced {
        PLC_RAND_ATTENUATE_V_Q15[att]
    } else {
        PLC_RAND_ATTENUATE_UV_Q15[att]
    };

    if dec.loss_cnt == 0 {
        rand_scale_q14 = 1 << 14;

        // voiced history: most of the energy comes from the predictor
        if dec.prev_sigtype == SignalType::Voiced {
            for &t in b_q14.iter() {
                rand_scale_q14 -= i32::from(t);
            }
            rand_scale_q14 = rand_scale_q14.max(3277);
            rand_scale_q14 =
                smulbb(rand_scale_q14, i32::from(dec.plc.prev_ltp_scale_q14)) >> 14;
        }

        // unvoiced history with a strong LPC filter: keep the noise down
        if dec.prev_sigtype == SignalType::Unvoiced {
            let inv_gain_q30 =
                lpc_inverse_pred_gain(&dec.plc.prev_lpc_q12[..lpc_order]).unwrap_or(0);
            let mut down_scale_q30 =
                inv_gain_q30.min((1 << 30) >> LOG2_INV_LPC_GAIN_HIGH_THRES);
            down_scale_q30 = down_scale_q30.max((1 << 30) >> LOG2_INV_LPC_GAIN_LOW_THRES);
            down_scale_q30 <<= LOG2_INV_LPC_GAIN_HIGH_THRES;
            rand_gain_q15 = smulwb(down_scale_q30, rand_gain_q15) >> 14;
        }
    }

    let mut rand_seed = dec.plc.rand_seed;
    let mut lag = rshift_round(dec.plc.pitch_l_q8, 8);
    let mut s_ltp_buf_idx = frame_length;

    // LTP synthesis over the extrapolated excitation
    let mut sig_q10 = [0i32; MAX_FRAME_LENGTH];
    for k in 0..NB_SUBFR {
        let base = k * subfr_length;
        let mut pred_lag_ix = s_ltp_buf_idx - lag as usize + LTP_ORDER / 2;
        for i in 0..subfr_length {
            rand_seed = lcg_rand(rand_seed);
            let idx = ((rand_seed >> 25) & RAND_BUF_MASK) as usize;

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

            let mut lpc_exc_q10 =
                smulwb(dec.exc_q10[rand_base + idx], rand_scale_q14) << 2;
            lpc_exc_q10 += rshift_round(ltp_pred_q14, 4);

            dec.s_ltp_q16[s_ltp_buf_idx] = lpc_exc_q10 << 6;
            s_ltp_buf_idx += 1;

            sig_q10[base + i] = lpc_exc_q10;
        }

        // fade the harmonic and noise parts from subframe to subframe
        for t in b_q14.iter_mut() {
            *t = (smulbb(harm_gain_q15, i32::from(*t)) >> 15) as i16;
        }
        rand_scale_q14 = smulbb(rand_scale_q14, rand_gain_q15) >> 15;

        // let the pitch drift upwards slowly
        dec.plc.pitch_l_q8 += smulwb(dec.plc.pitch_l_q8, PITCH_DRIFT_FAC_Q16);
        dec.plc.pitch_l_q8 = dec
            .plc
            .pitch_l_q8
            .min(smulbb(MAX_PITCH_LAG_MS, dec.fs_khz as i32) << 8);
        lag = rshift_round(dec.plc.pitch_l_q8, 8);
    }

    // LPC synthesis on top of the extrapolated residual
    let a_q12 = dec.plc.prev_lpc_q12;
    for k in 0..NB_SUBFR {
        let base = k * subfr_length;
        for i in 0..subfr_length {
            let mut lpc_pred_q10 = 0i32;
            for j in 0..lpc_order {
                lpc_pred_q10 = smlawb(
                    lpc_pred_q10,
                    dec.s_lpc_q14[MAX_ORDER_LPC + i - j - 1],
                    i32::from(a_q12[j]),
                );
            }
            sig_q10[base + i] = sig_q10[base + i].wrapping_add(lpc_pred_q10);
            dec.s_lpc_q14[MAX_ORDER_LPC + i] = sig_q10[base + i].wrapping_shl(4);
        }
        dec.s_lpc_q14
            .copy_within(subfr_length..subfr_length + MAX_ORDER_LPC, 0);
    }

    let gain_q16 = dec.plc.prev_gains_q16[NB_SUBFR - 1];
    for (out, &s) in signal.iter_mut().zip(&sig_q10[..frame_length]) {
        *out = sat16(rshift_round(smulww(s, gain_q16), 10));
    }

    dec.plc.rand_seed = rand_seed;
    dec.plc.rand_scale_q14 = rand_scale_q14 as i16;
    dec.plc.ltp_coef_q14 = b_q14;
    ctrl.pitch_lags = [lag; NB_SUBFR];
}

/// Smooths the energy step between a concealed frame and the first good
/// frame after it.
pub fn plc_glue_frames(dec: &mut DecoderState, signal: &mut [i16]) {
    if dec.loss_cnt > 0 {
        let (energy, shift) = sum_sqr_shift(signal);
        dec.plc.conc_energy = energy;
        dec.plc.conc_energy_shift = shift;
        dec.plc.last_frame_lost = true;
    } else {
        if dec.plc.last_frame_lost {
            let (mut energy, energy_shift) = sum_sqr_shift(signal);

            if energy_shift > dec.plc.conc_energy_shift {
                dec.plc.conc_energy >>= energy_shift - dec.plc.conc_energy_shift;
            } else if energy_shift < dec.plc.conc_energy_shift {
                energy >>= dec.plc.conc_energy_shift - energy_shift;
            }

            // fade in when the good frame is louder than the concealment
            if energy > dec.plc.conc_energy {
                let lz = clz32(dec.plc.conc_energy) - 1;
                dec.plc.conc_energy <<= lz;
                energy >>= (24 - lz).max(0);

                let frac_q24 = dec.plc.conc_energy / energy.max(1);

                let mut gain_q12 = sqrt_approx(frac_q24);
                let slope_q12 = ((1 << 12) - gain_q12) / signal.len() as i32;

                for s in signal.iter_mut() {
                    *s = ((gain_q12 * i32::from(*s)) >> 12) as i16;
                    gain_q12 = (gain_q12 + slope_q12).min(1 << 12);
                }
            }
        }
        dec.plc.last_frame_lost = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{plc, plc_glue_frames};
    use crate::common::SignalType;
    use crate::decoder_control::DecoderControl;
    use crate::decoder_state::DecoderState;
    use crate::decoder_set_fs::decoder_set_fs;

    fn primed_decoder() -> (DecoderState, DecoderControl) {
        let mut dec = DecoderState::new();
        decoder_set_fs(&mut dec, 8);
        let mut ctrl = DecoderControl::default();
        ctrl.sigtype = SignalType::Unvoiced;
        ctrl.gains_q16 = [1 << 16; 4];
        for (i, e) in dec.exc_q10.iter_mut().enumerate() {
            *e = ((i as u32).wrapping_mul(2654435761) >> 22) as i32 % 700;
        }
        (dec, ctrl)
    }

    #[test]
    fn concealment_decays_over_consecutive_losses() {
        let (mut dec, mut ctrl) = primed_decoder();
        let frame_length = dec.frame_length;

        // one good frame to prime the concealment state
        let mut good = alloc::vec![500i16; frame_length];
        plc(&mut dec, &mut ctrl, &mut good, false);

        let energy = |s: &[i16]| -> i64 {
            s.iter().map(|&v| i64::from(v) * i64::from(v)).sum()
        };

        let mut lost1 = alloc::vec![0i16; frame_length];
        plc(&mut dec, &mut ctrl, &mut lost1, true);
        let mut lost4 = alloc::vec![0i16; frame_length];
        for _ in 0..3 {
            plc(&mut dec, &mut ctrl, &mut lost4, true);
        }

        assert_eq!(dec.loss_cnt, 4);
        assert!(energy(&lost4) <= energy(&lost1));
    }

    #[test]
    fn conceals_from_a_fresh_state_at_every_rate() {
        // nothing primed the concealment lag yet; it starts at half a frame
        for fs_khz in [8usize, 12, 16, 24] {
            let mut dec = DecoderState::new();
            decoder_set_fs(&mut dec, fs_khz);
            let mut ctrl = DecoderControl::default();
            let mut out = alloc::vec![0i16; dec.frame_length];
            for _ in 0..3 {
                plc(&mut dec, &mut ctrl, &mut out, true);
            }
            assert_eq!(dec.loss_cnt, 3);
        }
    }

    #[test]
    fn glue_attenuates_a_loud_frame_after_a_quiet_concealment() {
        let (mut dec, mut ctrl) = primed_decoder();
        let frame_length = dec.frame_length;

        let mut lost = alloc::vec![0i16; frame_length];
        plc(&mut dec, &mut ctrl, &mut lost, true);
        plc_glue_frames(&mut dec, &mut lost);
        assert!(dec.plc.last_frame_lost);

        dec.loss_cnt = 0;
        let mut good = alloc::vec![8000i16; frame_length];
        let before = good.clone();
        plc_glue_frames(&mut dec, &mut good);
        assert!(!dec.plc.last_frame_lost);
        assert!(good[0] < before[0]);
        // the integer slope climbs back towards unity but the last sample
        // can land a few steps short of full gain
        let last = i32::from(good[frame_length - 1]);
        let want = i32::from(before[frame_length - 1]);
        assert!(last <= want && last > want * 15 / 16, "last = {last}");
    }
}
