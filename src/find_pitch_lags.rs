//! Pitch lag search driver: whitens the input with a low order LPC
//! filter and hands the residual to the core pitch estimator.

use alloc::vec;

use crate::apply_sine_window::{apply_sine_window, WindowType};
use crate::autocorr::autocorr;
use crate::bwexpander::bwexpander;
use crate::common::SignalType;
use crate::encoder_control::EncoderControl;
use crate::encoder_state::EncoderState;
use crate::k2a::k2a;
use crate::lpc_analysis_filter::ma_prediction;
use crate::math::{div32_var_q, fix_const, sat16, smlabb, smlawb};
use crate::pitch_analysis_core::pitch_analysis_core;
use crate::pitch_est_tables::PE_FRAME_LENGTH_MS;
use crate::schur::schur;

const FIND_PITCH_WHITE_NOISE_FRACTION_Q16: i32 = fix_const(1e-3, 16);
const FIND_PITCH_BANDWIDTH_EXPANSION_Q16: i32 = fix_const(0.99, 16);
const MAX_FIND_PITCH_LPC_ORDER: usize = 16;

/// Runs the pitch analysis for one frame. `x_buf` holds the previous
/// frame, the current frame and `la_pitch` lookahead samples; the
/// whitened residual over the same span is written to `res`. Fills the
/// control struct's signal type, pitch lags and lag/contour indices.
pub fn find_pitch_lags(
    enc: &mut EncoderState,
    ctrl: &mut EncoderControl,
    res: &mut [i16],
    x_buf: &[i16],
) {
    let buf_len = 2 * enc.frame_length + enc.la_pitch;
    let win_length = enc.pred.pitch_lpc_win_length;
    let order = enc.pitch_estimation_lpc_order;
    debug_assert!(buf_len >= win_length);
    debug_assert!(x_buf.len() == buf_len && res.len() == buf_len);
    debug_assert!(order <= MAX_FIND_PITCH_LPC_ORDER && order & 1 == 0);

    // sine tapers on the outer la_pitch samples, flat in the middle
    let x_win = &x_buf[buf_len - win_length..];
    let mut wsig = vec![0i16; win_length];
    apply_sine_window(&mut wsig[..enc.la_pitch], &x_win[..enc.la_pitch], WindowType::Rising);
    wsig[enc.la_pitch..win_length - enc.la_pitch]
        .copy_from_slice(&x_win[enc.la_pitch..win_length - enc.la_pitch]);
    apply_sine_window(
        &mut wsig[win_length - enc.la_pitch..],
        &x_win[win_length - enc.la_pitch..],
        WindowType::Falling,
    );

    let mut auto_corr = [0i32; MAX_FIND_PITCH_LPC_ORDER + 1];
    autocorr(&mut auto_corr[..order + 1], &wsig);

    // white noise floor keeps the recursion well conditioned
    auto_corr[0] = smlawb(auto_corr[0], auto_corr[0], FIND_PITCH_WHITE_NOISE_FRACTION_Q16);

    let mut rc_q15 = [0i16; MAX_FIND_PITCH_LPC_ORDER];
    let res_nrg = schur(&mut rc_q15[..order], &auto_corr[..order + 1]);

    ctrl.pred_gain_q16 = div32_var_q(auto_corr[0], res_nrg.max(1), 16);

    let mut a_q24 = [0i32; MAX_FIND_PITCH_LPC_ORDER];
    k2a(&mut a_q24[..order], &rc_q15[..order]);

    let mut a_q12 = [0i16; MAX_FIND_PITCH_LPC_ORDER];
    for (a12, &a24) in a_q12[..order].iter_mut().zip(&a_q24[..order]) {
        *a12 = sat16(a24 >> 12);
    }
    bwexpander(&mut a_q12[..order], FIND_PITCH_BANDWIDTH_EXPANSION_Q16);

    let mut filt_state = [0i32; MAX_FIND_PITCH_LPC_ORDER];
    ma_prediction(x_buf, &a_q12[..order], &mut filt_state[..order], res);
    res[..order].fill(0);

    // correlation threshold drops for clean, active, previously voiced input
    let mut thrhld_q15 = fix_const(0.45, 15);
    thrhld_q15 = smlabb(thrhld_q15, fix_const(-0.004, 15), order as i32);
    thrhld_q15 = smlabb(thrhld_q15, fix_const(-0.1, 7), enc.speech_activity_q8);
    thrhld_q15 = smlabb(
        thrhld_q15,
        fix_const(0.15, 15),
        enc.prev_sigtype.code() as i32,
    );
    thrhld_q15 = smlawb(thrhld_q15, fix_const(-0.1, 16), ctrl.input_tilt_q15);
    let thrhld_q15 = i32::from(sat16(thrhld_q15));

    // the core searches the last two frames; the lookahead tail is
    // only there for the whitening filter
    let info = pitch_analysis_core(
        &res[..PE_FRAME_LENGTH_MS * enc.fs_khz],
        &mut enc.ltp_corr_q15,
        enc.prev_lag as i32,
        enc.pitch_estimation_threshold_q16,
        thrhld_q15,
        enc.fs_khz,
        enc.pitch_estimation_complexity as usize,
    );
    ctrl.sigtype = if info.unvoiced {
        SignalType::Unvoiced
    } else {
        SignalType::Voiced
    };
    for (dst, &lag) in ctrl.pitch_lags.iter_mut().zip(&info.pitch_lags) {
        *dst = lag as usize;
    }
    ctrl.lag_index = info.lag_index;
    ctrl.contour_index = info.contour_index;
}

#[cfg(test)]
mod tests {
    use super::find_pitch_lags;
    use crate::common::SignalType;
    use crate::control_codec::control_encoder;
    use crate::encoder_control::EncoderControl;
    use crate::encoder_state::EncoderState;

    fn test_encoder(fs_khz: usize) -> EncoderState {
        let mut enc = EncoderState::default();
        enc.api_fs_hz = fs_khz as i32 * 1000;
        enc.prev_api_fs_hz = enc.api_fs_hz;
        enc.max_internal_fs_khz = fs_khz;
        control_encoder(&mut enc, 20, 20000, 0, false, false, 2).unwrap();
        enc
    }

    fn run(fs_khz: usize, period: usize) -> (EncoderControl, usize) {
        let mut enc = test_encoder(fs_khz);
        enc.speech_activity_q8 = 200;
        let mut ctrl = EncoderControl::default();

        let buf_len = 2 * enc.frame_length + enc.la_pitch;
        let x_buf: alloc::vec::Vec<i16> = (0..buf_len)
            .map(|i| {
                let ph = (i % period) as f64 / period as f64;
                (libm::sin(2.0 * core::f64::consts::PI * ph) * 8000.0) as i16
            })
            .collect();
        let mut res = alloc::vec![0i16; buf_len];

        find_pitch_lags(&mut enc, &mut ctrl, &mut res, &x_buf);
        (ctrl, period)
    }

    #[test]
    fn voiced_8khz_input_produces_lags_in_range() {
        let (ctrl, _) = run(8, 64);
        if ctrl.sigtype == SignalType::Voiced {
            for &lag in &ctrl.pitch_lags {
                assert!((16..=144).contains(&lag));
            }
        }
    }

    #[test]
    fn the_lookahead_tail_does_not_upset_the_search() {
        // the residual handed over is longer than the 40 ms the core
        // searches; every internal rate has to cope with that
        for fs_khz in [8usize, 12, 16, 24] {
            let (ctrl, period) = run(fs_khz, 5 * fs_khz);
            if ctrl.sigtype == SignalType::Voiced {
                for &lag in &ctrl.pitch_lags {
                    let err = lag as i32 - period as i32;
                    assert!(err.abs() <= 10, "fs {} lag {} period {}", fs_khz, lag, period);
                }
            }
        }
    }
}
