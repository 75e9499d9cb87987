//! Comfort noise generation. Non-active frames update a smoothed gain
//! and spectrum estimate; during losses the estimate is synthesized and
//! mixed into the concealed signal.

use crate::common::{MAX_FRAME_LENGTH, NB_SUBFR};
use crate::decoder_control::DecoderControl;
use crate::decoder_state::DecoderState;
use crate::lpc_synthesis_filter::lpc_synthesis_filter;
use crate::math::{lcg_rand, rshift_round, sat16, smulwb, smulww};
use crate::nlsf2a_stable::nlsf2a_stable;
use crate::schur::MAX_ORDER_LPC;

const CNG_BUF_MASK_MAX: i32 = 255;
const CNG_GAIN_SMTH_Q16: i32 = 4634;
const CNG_NLSF_SMTH_Q16: i32 = 16348;

/// Fills `residual` with randomly re-drawn past excitation, scaled by
/// the smoothed comfort noise gain.
fn cng_exc(residual: &mut [i16], exc_buf_q10: &[i32], gain_q16: i32, rand_seed: &mut i32) {
    let mut exc_mask = CNG_BUF_MASK_MAX;
    while exc_mask > residual.len() as i32 {
        exc_mask >>= 1;
    }

    let mut seed = *rand_seed;
    for r in residual.iter_mut() {
        seed = lcg_rand(seed);
        let idx = ((seed >> 24) & exc_mask) as usize;
        *r = sat16(rshift_round(smulww(exc_buf_q10[idx], gain_q16), 10));
    }
    *rand_seed = seed;
}

/// Updates the comfort noise estimate from a good frame, or overlays
/// comfort noise on `signal` when the frame was concealed.
pub fn cng(dec: &mut DecoderState, ctrl: &DecoderControl, signal: &mut [i16]) {
    if dec.fs_khz != dec.cng.fs_khz {
        dec.cng.reset(dec.lpc_order);
        dec.cng.fs_khz = dec.fs_khz;
    }

    if dec.loss_cnt == 0 && !dec.vad_flag {
        // track the spectrum of non-active speech
        for (smth, &prev) in dec.cng.smth_nlsf_q15[..dec.lpc_order]
            .iter_mut()
            .zip(&dec.prev_nlsf_q15)
        {
            *smth += smulwb(prev - *smth, CNG_NLSF_SMTH_Q16);
        }

        // buffer the excitation of the loudest subframe
        let mut subfr = 0;
        let mut max_gain_q16 = 0;
        for (i, &g) in ctrl.gains_q16.iter().enumerate() {
            if g > max_gain_q16 {
                max_gain_q16 = g;
                subfr = i;
            }
        }
        dec.cng.exc_buf_q10.copy_within(
            0..(NB_SUBFR - 1) * dec.subfr_length,
            dec.subfr_length,
        );
        let start = subfr * dec.subfr_length;
        dec.cng.exc_buf_q10[..dec.subfr_length]
            .copy_from_slice(&dec.exc_q10[start..start + dec.subfr_length]);

        for &g in &ctrl.gains_q16 {
            dec.cng.smth_gain_q16 += smulwb(g - dec.cng.smth_gain_q16, CNG_GAIN_SMTH_Q16);
        }
    }

    if dec.loss_cnt > 0 {
        let mut cng_sig = [0i16; MAX_FRAME_LENGTH];
        let frame = &mut cng_sig[..signal.len()];
        cng_exc(
            frame,
            &dec.cng.exc_buf_q10,
            dec.cng.smth_gain_q16,
            &mut dec.cng.rand_seed,
        );

        let mut lpc_q12 = [0i16; MAX_ORDER_LPC];
        nlsf2a_stable(
            &mut lpc_q12[..dec.lpc_order],
            &dec.cng.smth_nlsf_q15[..dec.lpc_order],
        );

        lpc_synthesis_filter(
            frame,
            &lpc_q12[..dec.lpc_order],
            1 << 26,
            &mut dec.cng.synth_state[..dec.lpc_order],
        );

        for (s, &n) in signal.iter_mut().zip(frame.iter()) {
            *s = sat16(i32::from(*s) + i32::from(n));
        }
    } else {
        dec.cng.synth_state[..dec.lpc_order].fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::cng;
    use crate::decoder_control::DecoderControl;
    use crate::decoder_set_fs::decoder_set_fs;
    use crate::decoder_state::DecoderState;

    #[test]
    fn estimate_grows_on_quiet_frames_and_fills_losses() {
        let mut dec = DecoderState::new();
        decoder_set_fs(&mut dec, 8);
        let mut ctrl = DecoderControl::default();
        ctrl.gains_q16 = [4 << 16; 4];
        for (i, e) in dec.exc_q10.iter_mut().enumerate() {
            *e = if i % 2 == 0 { 300 } else { -300 };
        }

        // several non-active frames feed the estimate
        dec.vad_flag = false;
        let mut quiet = alloc::vec![0i16; dec.frame_length];
        for _ in 0..8 {
            cng(&mut dec, &ctrl, &mut quiet);
        }
        assert!(dec.cng.smth_gain_q16 > 0);

        // a lost frame gets noise mixed in
        dec.loss_cnt = 1;
        let mut lost = alloc::vec![0i16; dec.frame_length];
        cng(&mut dec, &ctrl, &mut lost);
        assert!(lost.iter().any(|&v| v != 0));
    }
}
