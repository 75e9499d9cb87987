//! Derives the perceptual noise shaping parameters for one frame: the
//! warped short term shaping filters for the analysis and synthesis
//! sides, harmonic shaping and boost gains, spectral tilt, low
//! frequency shaping and the unquantized subframe gains.

use crate::apply_sine_window::{apply_sine_window, WindowType};
use crate::autocorr::autocorr;
use crate::bwexpander_32::bwexpander_32;
use crate::common::{SignalType, MAX_SHAPE_LPC_ORDER, NB_SUBFR, SHAPE_LPC_WIN_MAX};
use crate::control_codec::LBRR_SPEECH_ACTIVITY_THRES_Q8;
use crate::encoder_control::EncoderControl;
use crate::encoder_state::EncoderState;
use crate::k2a::k2a_q16;
use crate::lin2log::lin2log;
use crate::log2lin::log2lin;
use crate::lpc_inv_pred_gain::lpc_inverse_pred_gain_q24;
use crate::math::{
    add_pos_sat32, div32_var_q, fix_const, inverse32_var_q, lshift_sat32, rshift_round, sat16,
    smlabb, smlawb, smulbb, smulwb, smulww, sqrt_approx,
};
use crate::schur64::schur64;
use crate::sigm_q15::sigm_q15;
use crate::vector_ops::sum_sqr_shift;
use crate::warped_autocorrelation::warped_autocorrelation;

/// Gain of the warped short term analysis filter at the high end of
/// the spectrum, used to normalize the subframe gain.
fn warped_gain(coefs_q24: &[i32], lambda_q16: i32) -> i32 {
    let lambda = -lambda_q16;
    let mut gain_q24 = coefs_q24[coefs_q24.len() - 1];
    for &coef in coefs_q24[..coefs_q24.len() - 1].iter().rev() {
        gain_q24 = smlawb(coef, gain_q24, lambda);
    }
    let gain_q24 = smlawb(1 << 24, gain_q24, -lambda);
    inverse32_var_q(gain_q24, 40)
}

/// Rescales and, if needed, chirps the warped coefficients until their
/// magnitude fits the Q13 range used downstream.
fn limit_warped_coefs(coefs_q24: &mut [i32], lambda_q16: i32, limit_q24: i32) {
    let order = coefs_q24.len();

    // convert to monic warped coefficients
    let mut lambda = -lambda_q16;
    for i in (1..order).rev() {
        coefs_q24[i - 1] = smlawb(coefs_q24[i - 1], coefs_q24[i], lambda);
    }
    lambda = -lambda;
    let nom_q16 = smlawb(1 << 16, -lambda, lambda);
    let den_q24 = smlawb(1 << 24, coefs_q24[0], lambda);
    let mut gain_q16 = div32_var_q(nom_q16, den_q24, 24);
    for coef in coefs_q24.iter_mut() {
        *coef = smulww(gain_q16, *coef);
    }
    let limit_q20 = limit_q24 >> 4;

    for iter in 0..10i32 {
        let (maxabs_q24, idx) = coefs_q24
            .iter()
            .enumerate()
            .map(|(i, &c)| (c.abs(), i))
            .max()
            .unwrap_or((0, 0));
        let maxabs_q20 = maxabs_q24 >> 4;
        if maxabs_q20 <= limit_q20 {
            return;
        }

        for i in 1..order {
            coefs_q24[i - 1] = smlawb(coefs_q24[i - 1], coefs_q24[i], lambda);
        }
        gain_q16 = inverse32_var_q(gain_q16, 32);
        for coef in coefs_q24.iter_mut() {
            *coef = smulww(gain_q16, *coef);
        }

        let chirp_q16 = fix_const(0.99, 16)
            - div32_var_q(
                smulwb(
                    maxabs_q20 - limit_q20,
                    smlabb(fix_const(0.8, 10), fix_const(0.1, 10), iter),
                ),
                maxabs_q20.wrapping_mul(idx as i32 + 1),
                22,
            );
        bwexpander_32(coefs_q24, chirp_q16);

        lambda = -lambda;
        for i in (1..order).rev() {
            coefs_q24[i - 1] = smlawb(coefs_q24[i - 1], coefs_q24[i], lambda);
        }
        lambda = -lambda;
        let nom_q16 = smlawb(1 << 16, -lambda, lambda);
        let den_q24 = smlawb(1 << 24, coefs_q24[0], lambda);
        gain_q16 = div32_var_q(nom_q16, den_q24, 24);
        for coef in coefs_q24.iter_mut() {
            *coef = smulww(gain_q16, *coef);
        }
    }
}

/// Analyzes one frame and fills the shaping side of `ctrl`.
///
/// `x` spans the frame with `la_shape` samples of history before it and
/// `la_shape` of lookahead after it; `pitch_res` is the whitened
/// residual from the pitch search, one frame long.
pub fn noise_shape_analysis(
    enc: &mut EncoderState,
    ctrl: &mut EncoderControl,
    pitch_res: &[i16],
    x: &[i16],
) {
    let order = enc.shaping_lpc_order;
    debug_assert!(order & 1 == 0 && order <= MAX_SHAPE_LPC_ORDER);
    debug_assert!(x.len() >= enc.frame_length + 2 * enc.la_shape);

    // coding SNR for this frame: the configured SNR reduced by channel
    // backlog and, when redundancy is sent, by the FEC compensation
    ctrl.current_snr_db_q7 =
        enc.snr_db_q7 - smulwb(enc.buffered_in_channel_ms << 7, fix_const(0.05, 16));
    if enc.speech_activity_q8 > LBRR_SPEECH_ACTIVITY_THRES_Q8 {
        ctrl.current_snr_db_q7 -= enc.in_band_fec_snr_comp_q8 >> 1;
    }
    let mut snr_adj_db_q7 = ctrl.current_snr_db_q7;

    // quality measures
    ctrl.input_quality_q14 =
        (ctrl.input_quality_bands_q15[0] + ctrl.input_quality_bands_q15[1]) >> 2;
    ctrl.coding_quality_q14 =
        sigm_q15(rshift_round(snr_adj_db_q7 - fix_const(18.0, 7), 4)) >> 1;

    // reduce coding SNR during low speech activity
    let b_q8 = fix_const(1.0, 8) - enc.speech_activity_q8;
    let b_q8 = smulwb(b_q8 << 8, b_q8);
    snr_adj_db_q7 = smlawb(
        snr_adj_db_q7,
        smulbb(fix_const(-4.0, 7) >> 5, b_q8),
        smulwb(fix_const(1.0, 14) + ctrl.input_quality_q14, ctrl.coding_quality_q14),
    );

    if ctrl.sigtype == SignalType::Voiced {
        // less quantization noise where long term prediction is strong
        snr_adj_db_q7 = smlawb(snr_adj_db_q7, fix_const(2.0, 8), enc.ltp_corr_q15);
        ctrl.quant_offset_type = 0;
        ctrl.sparseness_q8 = 0;
    } else {
        // sparseness from energy fluctuations over 2 ms segments
        let n_samples = enc.fs_khz << 1;
        let n_segs = crate::common::FRAME_LENGTH_MS / 2;
        let mut energy_variation_q7 = 0i32;
        let mut log_energy_prev_q7 = 0i32;
        for k in 0..n_segs {
            let seg = &pitch_res[k * n_samples..(k + 1) * n_samples];
            let (mut nrg, scale) = sum_sqr_shift(seg);
            nrg += (n_samples as i32) >> scale; // one unit of noise floor per sample
            let log_energy_q7 = lin2log(nrg);
            if k > 0 {
                energy_variation_q7 += (log_energy_q7 - log_energy_prev_q7).abs();
            }
            log_energy_prev_q7 = log_energy_q7;
        }
        ctrl.sparseness_q8 = sigm_q15(smulwb(
            energy_variation_q7 - fix_const(5.0, 7),
            fix_const(0.4, 14),
        )) >> 7;

        // lower quantization offset for sparse unvoiced signals
        ctrl.quant_offset_type = if ctrl.sparseness_q8 > fix_const(0.75, 8) {
            0
        } else {
            1
        };
        snr_adj_db_q7 += smulbb(
            fix_const(2.0, 7),
            ctrl.sparseness_q8 - fix_const(0.5, 8),
        ) >> 8;

        // soften the SNR response for low quality unvoiced input
        let tmp_q9 = smlawb(fix_const(6.0, 9), fix_const(-0.4, 18), enc.snr_db_q7);
        snr_adj_db_q7 = smlawb(
            snr_adj_db_q7,
            tmp_q9,
            fix_const(1.0, 14) - ctrl.input_quality_q14,
        );
    }

    // bandwidth expansion factors, spread further apart at low rates
    let one_minus_q14 = (1 << 14) - ((3 * ctrl.coding_quality_q14) >> 2);
    let delta_q16 = smulwb(fix_const(0.01, 18), one_minus_q14);
    let bwexp2_q16 = fix_const(0.95, 16) + delta_q16;
    // applied on top of the synthesis side expansion, so made relative
    let bwexp1_q16 = div32_var_q(fix_const(0.95, 16) - delta_q16, bwexp2_q16, 16);

    let warping_q16 = if enc.warping_q16 > 0 {
        smlawb(enc.warping_q16, ctrl.coding_quality_q14, fix_const(0.01, 18))
    } else {
        0
    };

    let mut x_windowed = [0i16; SHAPE_LPC_WIN_MAX];
    let mut auto_corr = [0i32; MAX_SHAPE_LPC_ORDER + 1];
    let mut refl_coef_q16 = [0i32; MAX_SHAPE_LPC_ORDER];
    let mut x_ix = 0usize;

    for k in 0..NB_SUBFR {
        // sine slopes at the edges, flat in the middle
        let flat_part = enc.fs_khz * 5;
        let slope_part = (enc.shape_win_length - flat_part) >> 1;

        apply_sine_window(
            &mut x_windowed[..slope_part],
            &x[x_ix..x_ix + slope_part],
            WindowType::Rising,
        );
        let mut shift = slope_part;
        x_windowed[shift..shift + flat_part]
            .copy_from_slice(&x[x_ix + shift..x_ix + shift + flat_part]);
        shift += flat_part;
        apply_sine_window(
            &mut x_windowed[shift..shift + slope_part],
            &x[x_ix + shift..x_ix + shift + slope_part],
            WindowType::Falling,
        );
        x_ix += enc.subfr_length;

        let scale = if warping_q16 > 0 {
            warped_autocorrelation(
                &mut auto_corr,
                &x_windowed[..enc.shape_win_length],
                warping_q16,
                order,
            )
        } else {
            autocorr(&mut auto_corr[..order + 1], &x_windowed[..enc.shape_win_length])
        };

        // white noise fraction, keeps the recursion well conditioned
        auto_corr[0] = auto_corr[0]
            .wrapping_add(smulwb(auto_corr[0] >> 4, fix_const(1e-5, 20)).max(1));

        let mut nrg = schur64(&mut refl_coef_q16[..order], &auto_corr[..order + 1]);

        let mut ar_q24 = [0i32; MAX_SHAPE_LPC_ORDER];
        k2a_q16(&mut ar_q24[..order], &refl_coef_q16[..order]);

        // residual energy to subframe gain
        let mut qnrg = -scale;
        if qnrg & 1 != 0 {
            qnrg -= 1;
            nrg >>= 1;
        }
        let tmp32 = sqrt_approx(nrg);
        qnrg >>= 1;
        ctrl.gains_q16[k] = lshift_sat32(tmp32, 16 - qnrg);

        if warping_q16 > 0 {
            // compensate for the warped filter's gain at high frequencies
            let gain_mult_q16 = warped_gain(&ar_q24[..order], warping_q16);
            if ctrl.gains_q16[k] < 1 << 14 {
                ctrl.gains_q16[k] = smulww(ctrl.gains_q16[k], gain_mult_q16);
            } else {
                let halved = smulww(rshift_round(ctrl.gains_q16[k], 1), gain_mult_q16);
                ctrl.gains_q16[k] = if halved >= i32::MAX >> 1 {
                    i32::MAX
                } else {
                    halved << 1
                };
            }
        }

        // synthesis side shaping filter
        bwexpander_32(&mut ar_q24[..order], bwexp2_q16);
        if warping_q16 > 0 {
            limit_warped_coefs(&mut ar_q24[..order], warping_q16, fix_const(3.999, 24));
        }
        for (dst, &coef) in ctrl.ar2_q13[k * MAX_SHAPE_LPC_ORDER..]
            .iter_mut()
            .zip(&ar_q24[..order])
        {
            *dst = sat16(rshift_round(coef, 11));
        }

        // analysis side: the same filter, chirped slightly more
        let mut ar1_q24 = ar_q24;
        bwexpander_32(&mut ar1_q24[..order], bwexp1_q16);
        for (dst, &coef) in ctrl.ar1_q13[k * MAX_SHAPE_LPC_ORDER..]
            .iter_mut()
            .zip(&ar1_q24[..order])
        {
            *dst = sat16(rshift_round(coef, 11));
        }

        // ratio of the two filters' prediction gains, in the energy domain
        let pre_nrg_q30 = lpc_inverse_pred_gain_q24(&ar_q24[..order]).unwrap_or(1 << 30);
        let nrg_q30 = lpc_inverse_pred_gain_q24(&ar1_q24[..order])
            .unwrap_or(1 << 30)
            .max(1);
        ctrl.gains_pre_q14[k] = sqrt_approx(div32_var_q(pre_nrg_q30, nrg_q30, 28));
    }

    // increase gains during low speech activity and add a noise floor
    let gain_mult_q16 = log2lin(-smlawb(
        -fix_const(16.0, 7),
        snr_adj_db_q7,
        fix_const(0.16, 16),
    ));
    let gain_add_q16 = add_pos_sat32(
        log2lin(smlawb(fix_const(16.0, 7), fix_const(4.0, 7), fix_const(0.16, 16))),
        smulww(
            log2lin(smlawb(fix_const(16.0, 7), fix_const(-50.0, 7), fix_const(0.16, 16))),
            enc.avg_gain_q16,
        ),
    );
    for gain in ctrl.gains_q16.iter_mut() {
        *gain = smulww(*gain, gain_mult_q16);
        *gain = add_pos_sat32(*gain, gain_add_q16);
    }

    // low frequency shaping strength, reduced for low quality low bands
    let mut strength_q16 = 3 * 16
        * smlawb(
            1 << 12,
            fix_const(0.5, 13),
            ctrl.input_quality_bands_q15[0] - (1 << 15),
        );
    strength_q16 = (strength_q16 * enc.speech_activity_q8) >> 8;

    let tilt_q16;
    if ctrl.sigtype == SignalType::Voiced {
        // stronger low frequency attenuation for shorter pitch lags
        let fs_khz_inv_q14 = fix_const(0.2, 14) / enc.fs_khz as i32;
        for k in 0..NB_SUBFR {
            let b_q14 = fs_khz_inv_q14 + fix_const(3.0, 14) / ctrl.pitch_lags[k] as i32;
            ctrl.lf_shp_q14[k] = (((1 << 14)
                - b_q14
                - smulwb(strength_q16, smulwb(fix_const(0.6, 16), b_q14)))
                << 16)
                | ((b_q14 - (1 << 14)) & 0xFFFF);
        }
        tilt_q16 = -fix_const(0.3, 16)
            - smulwb(
                fix_const(0.7, 16),
                smulwb(fix_const(0.35, 24), enc.speech_activity_q8),
            );
    } else {
        let b_q14 = 21299 / enc.fs_khz as i32; // 1.3 in Q14
        let packed = (((1 << 14)
            - b_q14
            - smulwb(strength_q16, smulwb(fix_const(0.6, 16), b_q14)))
            << 16)
            | ((b_q14 - (1 << 14)) & 0xFFFF);
        ctrl.lf_shp_q14 = [packed; NB_SUBFR];
        tilt_q16 = -fix_const(0.3, 16);
    }

    // harmonic boosting and shaping, voiced frames only
    let mut harm_boost_q16 = 0;
    let mut harm_shape_gain_q16 = 0;
    if ctrl.sigtype == SignalType::Voiced {
        harm_boost_q16 = smulwb(fix_const(0.1, 18), (1 << 14) - ctrl.coding_quality_q14)
            + smulwb(fix_const(0.1, 18), (1 << 14) - ctrl.input_quality_q14);

        harm_shape_gain_q16 = smlawb(
            fix_const(0.3, 16),
            (1 << 16)
                - smulwb(
                    (1 << 18) - (ctrl.coding_quality_q14 << 4),
                    ctrl.input_quality_q14,
                ),
            fix_const(0.2, 16),
        );
        // scale down when the pitch correlation is weak
        harm_shape_gain_q16 = smulwb(
            harm_shape_gain_q16 << 1,
            sqrt_approx(enc.ltp_corr_q15 << 15),
        );
    }

    // smooth the shaping parameters across subframes
    for k in 0..NB_SUBFR {
        enc.shape.harm_boost_smth_q16 = smlawb(
            enc.shape.harm_boost_smth_q16,
            harm_boost_q16 - enc.shape.harm_boost_smth_q16,
            fix_const(0.4, 16),
        );
        enc.shape.harm_shape_gain_smth_q16 = smlawb(
            enc.shape.harm_shape_gain_smth_q16,
            harm_shape_gain_q16 - enc.shape.harm_shape_gain_smth_q16,
            fix_const(0.4, 16),
        );
        enc.shape.tilt_smth_q16 = smlawb(
            enc.shape.tilt_smth_q16,
            tilt_q16 - enc.shape.tilt_smth_q16,
            fix_const(0.4, 16),
        );

        ctrl.harm_boost_q14[k] = rshift_round(enc.shape.harm_boost_smth_q16, 2);
        ctrl.harm_shape_gain_q14[k] = rshift_round(enc.shape.harm_shape_gain_smth_q16, 2);
        ctrl.tilt_q14[k] = rshift_round(enc.shape.tilt_smth_q16, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::noise_shape_analysis;
    use crate::common::{SignalType, MAX_SHAPE_LPC_ORDER, NB_SUBFR};
    use crate::encoder_control::EncoderControl;
    use crate::encoder_state::EncoderState;
    use alloc::vec;
    use alloc::vec::Vec;

    fn setup(sigtype: SignalType) -> (EncoderState, EncoderControl, Vec<i16>, Vec<i16>) {
        let mut enc = EncoderState::default();
        enc.fs_khz = 16;
        enc.frame_length = 320;
        enc.subfr_length = 80;
        enc.la_shape = 80;
        enc.shape_win_length = 240;
        enc.shaping_lpc_order = 16;
        enc.warping_q16 = 16 * (crate::math::fix_const(0.015, 16));
        enc.snr_db_q7 = 25 << 7;
        enc.speech_activity_q8 = 200;

        let mut ctrl = EncoderControl::default();
        ctrl.sigtype = sigtype;
        ctrl.pitch_lags = [80; NB_SUBFR];
        ctrl.input_quality_bands_q15 = [1 << 14; crate::common::VAD_N_BANDS];

        let x: Vec<i16> = (0..enc.frame_length + 2 * enc.la_shape)
            .map(|i| (libm::sin(i as f64 * 2.0 * core::f64::consts::PI / 80.0) * 5000.0) as i16)
            .collect();
        let pitch_res = vec![100i16; enc.frame_length];
        (enc, ctrl, x, pitch_res)
    }

    #[test]
    fn voiced_frames_get_harmonic_shaping_and_positive_gains() {
        let (mut enc, mut ctrl, x, pitch_res) = setup(SignalType::Voiced);
        enc.ltp_corr_q15 = 1 << 14;

        noise_shape_analysis(&mut enc, &mut ctrl, &pitch_res, &x);

        for k in 0..NB_SUBFR {
            assert!(ctrl.gains_q16[k] > 0);
            assert!(ctrl.harm_shape_gain_q14[k] > 0);
            assert!(ctrl.tilt_q14[k] < 0);
            assert!(ctrl.gains_pre_q14[k] > 1 << 12 && ctrl.gains_pre_q14[k] < 1 << 16);
        }
        let ar = &ctrl.ar2_q13[..MAX_SHAPE_LPC_ORDER];
        assert!(ar.iter().any(|&c| c != 0));
    }

    #[test]
    fn steady_unvoiced_input_picks_the_high_quantizer_offset() {
        let (mut enc, mut ctrl, x, pitch_res) = setup(SignalType::Unvoiced);

        noise_shape_analysis(&mut enc, &mut ctrl, &pitch_res, &x);

        // constant-energy residual has no sparseness
        assert!(ctrl.sparseness_q8 < crate::math::fix_const(0.5, 8));
        assert_eq!(ctrl.quant_offset_type, 1);
        assert!(ctrl.harm_shape_gain_q14.iter().all(|&g| g == 0));
    }
}
