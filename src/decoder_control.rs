//! Per-frame parameters recovered from the bitstream, consumed by the
//! core synthesis filters.

use crate::common::{SignalType, NB_SUBFR};
use crate::schur::MAX_ORDER_LPC;
use crate::tables_ltp::LTP_ORDER;

pub struct DecoderControl {
    // prediction parameters
    pub pitch_lags: [i32; NB_SUBFR],
    pub gains_q16: [i32; NB_SUBFR],
    pub seed: i32,
    /// Interpolated and final LPC coefficients for the two frame halves.
    pub pred_coef_q12: [[i16; MAX_ORDER_LPC]; 2],
    pub ltp_coef_q14: [i16; LTP_ORDER * NB_SUBFR],
    pub ltp_scale_q14: i32,

    // quantization indices
    pub per_index: usize,
    pub rate_level_index: usize,
    pub quant_offset_type: usize,
    pub sigtype: SignalType,
    pub nlsf_interp_coef_q2: i32,
}

impl Default for DecoderControl {
    fn default() -> Self {
        DecoderControl {
            pitch_lags: [0; NB_SUBFR],
            gains_q16: [1 << 16; NB_SUBFR],
            seed: 0,
            pred_coef_q12: [[0; MAX_ORDER_LPC]; 2],
            ltp_coef_q14: [0; LTP_ORDER * NB_SUBFR],
            ltp_scale_q14: 0,
            per_index: 0,
            rate_level_index: 0,
            quant_offset_type: 0,
            sigtype: SignalType::Unvoiced,
            nlsf_interp_coef_q2: 4,
        }
    }
}
