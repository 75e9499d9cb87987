//! Per-frame analysis results and quantization indices, rebuilt by the
//! encoder for every frame and consumed by parameter encoding and the
//! noise shaping quantizer.

use crate::common::{SignalType, MAX_SHAPE_LPC_ORDER, NB_SUBFR, VAD_N_BANDS};
use crate::schur::MAX_ORDER_LPC;
use crate::tables_ltp::LTP_ORDER;
use crate::tables_nlsf::NLSF_MSVQ_MAX_CB_STAGES;

/// How the frame participates in redundancy coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LbrrUsage {
    None,
    AddOneUp,
    AddTwoUp,
}

impl LbrrUsage {
    pub fn code(self) -> usize {
        match self {
            LbrrUsage::None => 0,
            LbrrUsage::AddOneUp => 1,
            LbrrUsage::AddTwoUp => 2,
        }
    }
}

pub struct EncoderControl {
    // quantization indices
    pub lag_index: usize,
    pub contour_index: usize,
    pub per_index: usize,
    pub ltp_index: [usize; NB_SUBFR],
    pub nlsf_indices: [usize; NLSF_MSVQ_MAX_CB_STAGES],
    pub nlsf_interp_coef_q2: i32,
    pub gains_indices: [usize; NB_SUBFR],
    pub seed: i32,
    pub ltp_scale_index: usize,
    pub rate_level_index: usize,
    pub quant_offset_type: usize,
    pub sigtype: SignalType,

    // prediction parameters
    pub pitch_lags: [usize; NB_SUBFR],
    pub gains_q16: [i32; NB_SUBFR],
    pub pred_coef_q12: [[i16; MAX_ORDER_LPC]; 2],
    pub ltp_coef_q14: [i16; LTP_ORDER * NB_SUBFR],
    pub ltp_scale_q14: i32,

    // noise shaping parameters
    pub ar1_q13: [i16; NB_SUBFR * MAX_SHAPE_LPC_ORDER],
    pub ar2_q13: [i16; NB_SUBFR * MAX_SHAPE_LPC_ORDER],
    /// Two Q14 coefficients per entry: low half LF MA, high half LF AR.
    pub lf_shp_q14: [i32; NB_SUBFR],
    pub gains_pre_q14: [i32; NB_SUBFR],
    pub harm_boost_q14: [i32; NB_SUBFR],
    pub tilt_q14: [i32; NB_SUBFR],
    pub harm_shape_gain_q14: [i32; NB_SUBFR],
    pub lambda_q10: i32,
    pub input_quality_q14: i32,
    pub coding_quality_q14: i32,
    pub pitch_freq_low_hz: i32,
    pub current_snr_db_q7: i32,

    // measures
    pub sparseness_q8: i32,
    pub pred_gain_q16: i32,
    pub ltp_pred_cod_gain_q7: i32,
    pub input_quality_bands_q15: [i32; VAD_N_BANDS],
    pub input_tilt_q15: i32,
    pub res_nrg: [i32; NB_SUBFR],
    pub res_nrg_q: [i32; NB_SUBFR],

    pub lbrr_usage: LbrrUsage,
}

impl Default for EncoderControl {
    fn default() -> Self {
        EncoderControl {
            lag_index: 0,
            contour_index: 0,
            per_index: 0,
            ltp_index: [0; NB_SUBFR],
            nlsf_indices: [0; NLSF_MSVQ_MAX_CB_STAGES],
            nlsf_interp_coef_q2: 4,
            gains_indices: [0; NB_SUBFR],
            seed: 0,
            ltp_scale_index: 0,
            rate_level_index: 0,
            quant_offset_type: 0,
            sigtype: SignalType::Unvoiced,
            pitch_lags: [0; NB_SUBFR],
            gains_q16: [1 << 16; NB_SUBFR],
            pred_coef_q12: [[0; MAX_ORDER_LPC]; 2],
            ltp_coef_q14: [0; LTP_ORDER * NB_SUBFR],
            ltp_scale_q14: 0,
            ar1_q13: [0; NB_SUBFR * MAX_SHAPE_LPC_ORDER],
            ar2_q13: [0; NB_SUBFR * MAX_SHAPE_LPC_ORDER],
            lf_shp_q14: [0; NB_SUBFR],
            gains_pre_q14: [0; NB_SUBFR],
            harm_boost_q14: [0; NB_SUBFR],
            tilt_q14: [0; NB_SUBFR],
            harm_shape_gain_q14: [0; NB_SUBFR],
            lambda_q10: 0,
            input_quality_q14: 0,
            coding_quality_q14: 0,
            pitch_freq_low_hz: 0,
            current_snr_db_q7: 0,
            sparseness_q8: 0,
            pred_gain_q16: 0,
            ltp_pred_cod_gain_q7: 0,
            input_quality_bands_q15: [0; VAD_N_BANDS],
            input_tilt_q15: 0,
            res_nrg: [0; NB_SUBFR],
            res_nrg_q: [0; NB_SUBFR],
            lbrr_usage: LbrrUsage::None,
        }
    }
}
