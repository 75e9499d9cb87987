//! Switches the decoder's internal sampling rate and clears the filter
//! memories that depend on it.

use crate::common::{FRAME_LENGTH_MS, MAX_FRAME_LENGTH, MIN_LPC_ORDER, NB_SUBFR, SignalType};
use crate::decoder_state::DecoderState;
use crate::schur::MAX_ORDER_LPC;
use crate::tables_nlsf_cb0_10::NLSF_CB0_10;
use crate::tables_nlsf_cb0_16::NLSF_CB0_16;
use crate::tables_nlsf_cb1_10::NLSF_CB1_10;
use crate::tables_nlsf_cb1_16::NLSF_CB1_16;
use crate::tables_other::{
    DEC_A_HP_12, DEC_A_HP_16, DEC_A_HP_24, DEC_A_HP_8, DEC_B_HP_12, DEC_B_HP_16, DEC_B_HP_24,
    DEC_B_HP_8,
};

/// Applies `fs_khz` to the decoder; a no-op when the rate is unchanged.
pub fn decoder_set_fs(dec: &mut DecoderState, fs_khz: usize) {
    debug_assert!(matches!(fs_khz, 8 | 12 | 16 | 24));

    if dec.fs_khz != fs_khz {
        log::debug!("decoder internal rate set to {} kHz", fs_khz);
        dec.fs_khz = fs_khz;
        dec.frame_length = FRAME_LENGTH_MS * fs_khz;
        dec.subfr_length = FRAME_LENGTH_MS / NB_SUBFR * fs_khz;
        if fs_khz == 8 {
            dec.lpc_order = MIN_LPC_ORDER;
            dec.nlsf_cbs = [&NLSF_CB0_10, &NLSF_CB1_10];
        } else {
            dec.lpc_order = MAX_ORDER_LPC;
            dec.nlsf_cbs = [&NLSF_CB0_16, &NLSF_CB1_16];
        }

        // drop the part of the state a rate switch invalidates
        dec.s_lpc_q14[..MAX_ORDER_LPC].fill(0);
        dec.out_buf[..MAX_FRAME_LENGTH].fill(0);
        dec.prev_nlsf_q15.fill(0);

        dec.lag_prev = 100;
        dec.last_gain_index = 1;
        dec.prev_sigtype = SignalType::Voiced;
        dec.first_frame_after_reset = true;

        match fs_khz {
            24 => {
                dec.hp_a = &DEC_A_HP_24;
                dec.hp_b = &DEC_B_HP_24;
            }
            16 => {
                dec.hp_a = &DEC_A_HP_16;
                dec.hp_b = &DEC_B_HP_16;
            }
            12 => {
                dec.hp_a = &DEC_A_HP_12;
                dec.hp_b = &DEC_B_HP_12;
            }
            _ => {
                dec.hp_a = &DEC_A_HP_8;
                dec.hp_b = &DEC_B_HP_8;
            }
        }
    }

    debug_assert!(dec.frame_length > 0 && dec.frame_length <= MAX_FRAME_LENGTH);
}
