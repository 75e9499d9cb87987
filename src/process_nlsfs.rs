//! NLSF weighting, quantization and conversion to prediction
//! coefficients for both frame halves.

use crate::common::SignalType;
use crate::encoder_control::EncoderControl;
use crate::encoder_state::EncoderState;
use crate::interpolate::interpolate;
use crate::math::{smlawb, smulbb};
use crate::nlsf2a_stable::nlsf2a_stable;
use crate::nlsf_msvq_encode::nlsf_msvq_encode;
use crate::nlsf_vq_weights_laroia::nlsf_vq_weights_laroia;
use crate::schur::MAX_ORDER_LPC;

/// Quantizes the frame's NLSF vector in place and fills in the Q12
/// predictors for both halves, interpolating the first half when the
/// interpolation index says so.
pub fn process_nlsfs(enc: &mut EncoderState, ctrl: &mut EncoderControl, nlsf_q15: &mut [i32]) {
    debug_assert!((0..=256).contains(&enc.speech_activity_q8));
    debug_assert!((0..=256).contains(&ctrl.sparseness_q8));

    let order = enc.predict_lpc_order;

    // rate weights relax as speech activity drops
    let (nlsf_mu_q15, nlsf_mu_fluc_red_q16) = match ctrl.sigtype {
        SignalType::Voiced => (
            smlawb(66, -8388, enc.speech_activity_q8),
            smlawb(6554, -838_848, enc.speech_activity_q8),
        ),
        SignalType::Unvoiced => (
            smlawb(164, -33_554, enc.speech_activity_q8),
            smlawb(
                13107,
                -1_677_696,
                enc.speech_activity_q8 + ctrl.sparseness_q8,
            ),
        ),
    };
    let nlsf_mu_q15 = nlsf_mu_q15.max(1);
    debug_assert!(nlsf_mu_q15 <= 164 && (0..=13107).contains(&nlsf_mu_fluc_red_q16));

    let mut weights_q6 = [0i32; MAX_ORDER_LPC];
    nlsf_vq_weights_laroia(&mut weights_q6[..order], &nlsf_q15[..order]);

    let do_interpolate = enc.use_interpolated_nlsfs && ctrl.nlsf_interp_coef_q2 < (1 << 2);
    let mut nlsf0_q15 = [0i32; MAX_ORDER_LPC];
    if do_interpolate {
        // blend in the first-half weights, scaled by the squared
        // interpolation factor
        interpolate(
            &mut nlsf0_q15[..order],
            &enc.pred.prev_nlsf_q_q15[..order],
            &nlsf_q15[..order],
            ctrl.nlsf_interp_coef_q2,
        );
        let mut weights0_q6 = [0i32; MAX_ORDER_LPC];
        nlsf_vq_weights_laroia(&mut weights0_q6[..order], &nlsf0_q15[..order]);

        let i_sqr_q15 =
            smulbb(ctrl.nlsf_interp_coef_q2, ctrl.nlsf_interp_coef_q2) << 11;
        for (w, &w0) in weights_q6[..order].iter_mut().zip(&weights0_q6[..order]) {
            *w = smlawb(*w >> 1, w0, i_sqr_q15);
            debug_assert!(*w >= 1 && *w <= i32::from(i16::MAX));
        }
    }

    let cb = enc.nlsf_cbs[ctrl.sigtype.code()];
    nlsf_msvq_encode(
        &mut ctrl.nlsf_indices[..cb.n_stages()],
        &mut nlsf_q15[..order],
        cb,
        &enc.pred.prev_nlsf_q_q15[..order],
        &weights_q6[..order],
        nlsf_mu_q15,
        nlsf_mu_fluc_red_q16,
        enc.nlsf_msvq_survivors,
        enc.first_frame_after_reset,
    );

    nlsf2a_stable(&mut ctrl.pred_coef_q12[1][..order], &nlsf_q15[..order]);

    if do_interpolate {
        interpolate(
            &mut nlsf0_q15[..order],
            &enc.pred.prev_nlsf_q_q15[..order],
            &nlsf_q15[..order],
            ctrl.nlsf_interp_coef_q2,
        );
        nlsf2a_stable(&mut ctrl.pred_coef_q12[0][..order], &nlsf0_q15[..order]);
    } else {
        ctrl.pred_coef_q12[0] = ctrl.pred_coef_q12[1];
    }
}
