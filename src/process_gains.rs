//! Final conditioning of the subframe gains before quantization, plus
//! the rate-distortion weight for the residual quantizer.

use crate::common::SignalType;
use crate::encoder_control::EncoderControl;
use crate::encoder_state::EncoderState;
use crate::gain_quant::gains_quant;
use crate::log2lin::log2lin;
use crate::math::{fix_const, lshift_sat32, rshift_round, smlaww, smlawb, smmul, smulbb, smulwb, sqrt_approx};
use crate::sigm_q15::sigm_q15;
use crate::tables_other::QUANTIZATION_OFFSETS_Q10;

pub fn process_gains(enc: &mut EncoderState, ctrl: &mut EncoderControl) {
    // reduce gains when the LTP coding gain is high
    if ctrl.sigtype == SignalType::Voiced {
        let s_q16 = -sigm_q15(rshift_round(
            ctrl.ltp_pred_cod_gain_q7 - fix_const(12.0, 7),
            4,
        ));
        for gain in ctrl.gains_q16.iter_mut() {
            *gain = smlawb(*gain, *gain, s_q16);
        }
    }

    // limit on the quantized signal energy, from the target SNR
    let inv_max_sqr_val_q16 = log2lin(smulwb(
        fix_const(70.0, 7) - ctrl.current_snr_db_q7,
        fix_const(0.33, 16),
    )) / enc.subfr_length as i32;

    for k in 0..crate::common::NB_SUBFR {
        // soft limit on the ratio of residual energy and squared gain
        let mut res_nrg_part = crate::math::smulww(ctrl.res_nrg[k], inv_max_sqr_val_q16);
        let q = ctrl.res_nrg_q[k];
        if q > 0 {
            res_nrg_part = if q < 32 {
                rshift_round(res_nrg_part, q)
            } else {
                0
            };
        } else if q != 0 {
            res_nrg_part = if res_nrg_part > i32::MAX >> -q {
                i32::MAX
            } else {
                res_nrg_part << -q
            };
        }
        let gain = ctrl.gains_q16[k];
        let gain_squared = res_nrg_part.saturating_add(smmul(gain, gain));
        if gain_squared < i32::from(i16::MAX) {
            // recalculate with higher precision
            let gain_squared = smlaww(res_nrg_part << 16, gain, gain);
            debug_assert!(gain_squared > 0);
            let gain = sqrt_approx(gain_squared); // Q8
            ctrl.gains_q16[k] = lshift_sat32(gain, 8);
        } else {
            let gain = sqrt_approx(gain_squared); // Q0
            ctrl.gains_q16[k] = lshift_sat32(gain, 16);
        }
    }

    gains_quant(
        &mut ctrl.gains_indices,
        &mut ctrl.gains_q16,
        &mut enc.shape.last_gain_index,
        enc.n_frames_in_payload_buf > 0,
    );

    // larger quantizer offset when the LTP coding gain is low or the
    // input tilted towards low frequencies
    if ctrl.sigtype == SignalType::Voiced {
        ctrl.quant_offset_type =
            if ctrl.ltp_pred_cod_gain_q7 + (ctrl.input_tilt_q15 >> 8) > fix_const(1.0, 7) {
                0
            } else {
                1
            };
    }

    let quant_offset_q10 =
        i32::from(QUANTIZATION_OFFSETS_Q10[ctrl.sigtype.code()][ctrl.quant_offset_type]);
    ctrl.lambda_q10 = fix_const(1.2, 10)
        + smulbb(fix_const(-0.05, 10), enc.n_states_delayed_decision as i32)
        + smulwb(fix_const(-0.3, 18), enc.speech_activity_q8)
        + smulwb(fix_const(-0.2, 12), ctrl.input_quality_q14)
        + smulwb(fix_const(-0.1, 12), ctrl.coding_quality_q14)
        + smulwb(fix_const(1.5, 16), quant_offset_q10);

    debug_assert!(ctrl.lambda_q10 > 0);
    debug_assert!(ctrl.lambda_q10 < fix_const(2.0, 10));
}

#[cfg(test)]
mod tests {
    use super::process_gains;
    use crate::common::{NB_SUBFR, SignalType};
    use crate::encoder_control::EncoderControl;
    use crate::encoder_state::EncoderState;

    #[test]
    fn gains_stay_positive_and_lambda_in_range() {
        let mut enc = EncoderState::default();
        enc.subfr_length = 80;
        enc.n_states_delayed_decision = 4;
        enc.speech_activity_q8 = 200;

        let mut ctrl = EncoderControl::default();
        ctrl.sigtype = SignalType::Unvoiced;
        ctrl.current_snr_db_q7 = 20 << 7;
        ctrl.input_quality_q14 = 1 << 13;
        ctrl.coding_quality_q14 = 1 << 13;
        ctrl.gains_q16 = [50 << 16; NB_SUBFR];
        ctrl.res_nrg = [1000; NB_SUBFR];
        ctrl.res_nrg_q = [10; NB_SUBFR];

        process_gains(&mut enc, &mut ctrl);

        for &g in &ctrl.gains_q16 {
            assert!(g > 0);
        }
        assert!(ctrl.lambda_q10 > 0 && ctrl.lambda_q10 < 2 << 10);
    }
}
