//! Chooses how strongly the decoder should damp the LTP state after a
//! loss, based on the coding gain trend and the expected loss rate.

use crate::common::FRAME_LENGTH_MS;
use crate::encoder_control::EncoderControl;
use crate::encoder_state::EncoderState;
use crate::math::rshift_round;
use crate::sigm_q15::sigm_q15;
use crate::tables_other::LTP_SCALES_TABLE_Q14;

const NB_THRESHOLDS: usize = 11;

// trained thresholds, indexed by whole-percent loss rate
const LTP_SCALE_THRESHOLDS_Q15: [i32; NB_THRESHOLDS] = [
    31129, 26214, 16384, 13107, 9830, 6554, 4915, 3276, 2621, 2458, 0,
];

pub fn ltp_scale_ctrl(enc: &mut EncoderState, ctrl: &mut EncoderControl) {
    // first order high-pass on the coding gain
    enc.hp_ltp_pred_cod_gain_q7 = (ctrl.ltp_pred_cod_gain_q7 - enc.prev_ltp_pred_cod_gain_q7)
        .max(0)
        + rshift_round(enc.hp_ltp_pred_cod_gain_q7, 1);
    enc.prev_ltp_pred_cod_gain_q7 = ctrl.ltp_pred_cod_gain_q7;

    let g_out_q5 = rshift_round(
        (ctrl.ltp_pred_cod_gain_q7 >> 1) + (enc.hp_ltp_pred_cod_gain_q7 >> 1),
        3,
    );
    let g_limit_q15 = sigm_q15(g_out_q5 - (3 << 5));

    ctrl.ltp_scale_index = 0;

    // only scale up on the first frame of a packet
    if enc.n_frames_in_payload_buf == 0 {
        let frames_per_packet = enc.packet_size_ms / FRAME_LENGTH_MS;
        let round_loss = enc.packet_loss_perc as usize + frames_per_packet - 1;

        let thrld1_q15 = LTP_SCALE_THRESHOLDS_Q15[round_loss.min(NB_THRESHOLDS - 1)];
        let thrld2_q15 = LTP_SCALE_THRESHOLDS_Q15[(round_loss + 1).min(NB_THRESHOLDS - 1)];

        if g_limit_q15 > thrld1_q15 {
            ctrl.ltp_scale_index = 2;
        } else if g_limit_q15 > thrld2_q15 {
            ctrl.ltp_scale_index = 1;
        }
    }
    ctrl.ltp_scale_q14 = i32::from(LTP_SCALES_TABLE_Q14[ctrl.ltp_scale_index]);
}
