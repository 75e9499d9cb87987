//! Persistent encoder state: everything that survives between frames.

use crate::common::{
    SignalType, LA_SHAPE_MAX, MAX_ARITHM_BYTES, MAX_FRAME_LENGTH, MAX_LBRR_DELAY,
    MAX_SHAPE_LPC_ORDER,
};
use crate::lp_variable_cutoff::LpState;
use crate::nsq::NsqState;
use crate::range_coder::RangeCoder;
use crate::resampler::ResamplerState;
use crate::schur::MAX_ORDER_LPC;
use crate::tables_nlsf::NlsfCb;
use crate::tables_nlsf_cb0_16::NLSF_CB0_16;
use crate::tables_nlsf_cb1_16::NLSF_CB1_16;
use crate::vad::VadState;

/// One buffered redundant payload.
pub struct LbrrSlot {
    pub payload: [u8; MAX_ARITHM_BYTES],
    pub n_bytes: usize,
    pub usage: usize,
}

impl Default for LbrrSlot {
    fn default() -> Self {
        LbrrSlot {
            payload: [0; MAX_ARITHM_BYTES],
            n_bytes: 0,
            usage: 0,
        }
    }
}

/// Two-deep ring of redundant payloads; the oldest slot is overwritten
/// each frame and attached to the outgoing packet one or two frames later.
#[derive(Default)]
pub struct LbrrRing {
    slots: [LbrrSlot; MAX_LBRR_DELAY],
    oldest: usize,
}

impl LbrrRing {
    /// Slot about to be overwritten, i.e. the payload from
    /// `MAX_LBRR_DELAY` frames ago.
    pub fn oldest(&self) -> &LbrrSlot {
        &self.slots[self.oldest]
    }

    pub fn oldest_mut(&mut self) -> &mut LbrrSlot {
        &mut self.slots[self.oldest]
    }

    /// Slot written `age` frames ago, `age` in 1..=MAX_LBRR_DELAY.
    pub fn slot(&self, age: usize) -> &LbrrSlot {
        debug_assert!((1..=MAX_LBRR_DELAY).contains(&age));
        &self.slots[(self.oldest + MAX_LBRR_DELAY - age) % MAX_LBRR_DELAY]
    }

    /// Advances the ring after the oldest slot has been refilled.
    pub fn advance(&mut self) {
        self.oldest = (self.oldest + 1) % MAX_LBRR_DELAY;
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.n_bytes = 0;
            slot.usage = 0;
        }
        self.oldest = 0;
    }
}

/// Smoothers for the noise shaping parameters.
#[derive(Default)]
pub struct ShapeState {
    pub last_gain_index: i32,
    pub harm_boost_smth_q16: i32,
    pub harm_shape_gain_smth_q16: i32,
    pub tilt_smth_q16: i32,
}

/// Analysis-side shaping filter memory.
pub struct PrefilterState {
    pub s_ltp_shp: [i16; crate::common::LTP_BUF_LENGTH],
    pub s_ar_shp_q14: [i32; MAX_SHAPE_LPC_ORDER + 1],
    pub s_ltp_shp_buf_idx: usize,
    pub s_lf_ar_shp_q12: i32,
    pub s_lf_ma_shp_q12: i32,
    pub s_harm_hp: i32,
    pub rand_seed: i32,
    pub lag_prev: usize,
}

impl Default for PrefilterState {
    fn default() -> Self {
        PrefilterState {
            s_ltp_shp: [0; crate::common::LTP_BUF_LENGTH],
            s_ar_shp_q14: [0; MAX_SHAPE_LPC_ORDER + 1],
            s_ltp_shp_buf_idx: 0,
            s_lf_ar_shp_q12: 0,
            s_lf_ma_shp_q12: 0,
            s_harm_hp: 0,
            rand_seed: 0,
            lag_prev: 0,
        }
    }
}

/// Prediction analysis memory.
pub struct PredictState {
    pub pitch_lpc_win_length: usize,
    pub min_pitch_lag: usize,
    pub max_pitch_lag: usize,
    pub prev_nlsf_q_q15: [i32; MAX_ORDER_LPC],
}

impl Default for PredictState {
    fn default() -> Self {
        PredictState {
            pitch_lpc_win_length: 0,
            min_pitch_lag: 0,
            max_pitch_lag: 0,
            prev_nlsf_q_q15: [0; MAX_ORDER_LPC],
        }
    }
}

pub struct EncoderState {
    pub rc: RangeCoder,
    pub rc_lbrr: RangeCoder,
    pub nsq: NsqState,
    pub nsq_lbrr: NsqState,

    pub in_hp_state: [i32; 2],
    pub lp: LpState,
    pub vad: VadState,

    pub lbrr_prev_last_gain_index: i32,
    pub prev_sigtype: SignalType,
    pub type_offset_prev: usize,
    pub prev_lag: usize,
    pub prev_lag_index: usize,
    pub api_fs_hz: i32,
    pub prev_api_fs_hz: i32,
    pub max_internal_fs_khz: usize,
    pub fs_khz: usize,
    pub fs_khz_changed: bool,
    pub frame_length: usize,
    pub subfr_length: usize,
    pub la_pitch: usize,
    pub la_shape: usize,
    pub shape_win_length: usize,
    pub target_rate_bps: i32,
    pub packet_size_ms: usize,
    pub packet_loss_perc: i32,
    pub frame_counter: i32,
    pub complexity: u32,
    pub n_states_delayed_decision: usize,
    pub use_interpolated_nlsfs: bool,
    pub shaping_lpc_order: usize,
    pub predict_lpc_order: usize,
    pub pitch_estimation_complexity: u32,
    pub pitch_estimation_lpc_order: usize,
    pub pitch_estimation_threshold_q16: i32,
    pub ltp_quant_low_complexity: bool,
    pub nlsf_msvq_survivors: usize,
    pub first_frame_after_reset: bool,
    pub controlled_since_last_payload: bool,
    pub warping_q16: i32,

    pub input_buf: [i16; MAX_FRAME_LENGTH],
    pub input_buf_ix: usize,
    pub n_frames_in_payload_buf: usize,
    pub n_bytes_in_payload_buf: usize,

    pub frames_since_onset: i32,

    /// Voiced / unvoiced NLSF codebooks for the current LPC order.
    pub nlsf_cbs: [&'static NlsfCb; 2],

    pub lbrr: LbrrRing,
    pub use_in_band_fec: bool,
    pub lbrr_enabled: bool,
    pub lbrr_gain_increases: i32,

    pub bitrate_diff: i32,
    pub bitrate_threshold_up: i32,
    pub bitrate_threshold_down: i32,

    pub resampler: ResamplerState,

    pub no_speech_counter: i32,
    pub use_dtx: bool,
    pub in_dtx: bool,
    pub vad_flag: bool,

    pub q: [i8; MAX_FRAME_LENGTH],
    pub q_lbrr: [i8; MAX_FRAME_LENGTH],

    // analysis side
    pub variable_hp_smth1_q15: i32,
    pub variable_hp_smth2_q15: i32,
    pub shape: ShapeState,
    pub prefilt: PrefilterState,
    pub pred: PredictState,

    /// Two frames of history plus shape lookahead.
    pub x_buf: [i16; 2 * MAX_FRAME_LENGTH + LA_SHAPE_MAX],
    pub ltp_corr_q15: i32,
    pub mu_ltp_q8: i32,
    pub snr_db_q7: i32,
    pub avg_gain_q16: i32,
    pub avg_gain_q16_one_bit_per_sample: i32,
    pub buffered_in_channel_ms: i32,
    pub speech_activity_q8: i32,

    pub prev_ltp_pred_cod_gain_q7: i32,
    pub hp_ltp_pred_cod_gain_q7: i32,
    pub in_band_fec_snr_comp_q8: i32,
}

impl Default for EncoderState {
    fn default() -> Self {
        EncoderState {
            rc: RangeCoder::default(),
            rc_lbrr: RangeCoder::default(),
            nsq: NsqState::default(),
            nsq_lbrr: NsqState::default(),
            in_hp_state: [0; 2],
            lp: LpState::default(),
            vad: VadState::default(),
            lbrr_prev_last_gain_index: 0,
            prev_sigtype: SignalType::Unvoiced,
            type_offset_prev: 0,
            prev_lag: 0,
            prev_lag_index: 0,
            api_fs_hz: 0,
            prev_api_fs_hz: 0,
            max_internal_fs_khz: 0,
            fs_khz: 0,
            fs_khz_changed: false,
            frame_length: 0,
            subfr_length: 0,
            la_pitch: 0,
            la_shape: 0,
            shape_win_length: 0,
            target_rate_bps: 0,
            packet_size_ms: 0,
            packet_loss_perc: 0,
            frame_counter: 0,
            complexity: 0,
            n_states_delayed_decision: 0,
            use_interpolated_nlsfs: false,
            shaping_lpc_order: 0,
            predict_lpc_order: 0,
            pitch_estimation_complexity: 0,
            pitch_estimation_lpc_order: 0,
            pitch_estimation_threshold_q16: 0,
            ltp_quant_low_complexity: false,
            nlsf_msvq_survivors: 0,
            first_frame_after_reset: true,
            controlled_since_last_payload: false,
            warping_q16: 0,
            input_buf: [0; MAX_FRAME_LENGTH],
            input_buf_ix: 0,
            n_frames_in_payload_buf: 0,
            n_bytes_in_payload_buf: 0,
            frames_since_onset: 0,
            nlsf_cbs: [&NLSF_CB0_16, &NLSF_CB1_16],
            lbrr: LbrrRing::default(),
            use_in_band_fec: false,
            lbrr_enabled: false,
            lbrr_gain_increases: 0,
            bitrate_diff: 0,
            bitrate_threshold_up: 0,
            bitrate_threshold_down: 0,
            resampler: ResamplerState::default(),
            no_speech_counter: 0,
            use_dtx: false,
            in_dtx: false,
            vad_flag: false,
            q: [0; MAX_FRAME_LENGTH],
            q_lbrr: [0; MAX_FRAME_LENGTH],
            // log2(70) in Q15, just below the cutoff tracker floor
            variable_hp_smth1_q15: 200844,
            variable_hp_smth2_q15: 200844,
            shape: ShapeState::default(),
            prefilt: PrefilterState::default(),
            pred: PredictState::default(),
            x_buf: [0; 2 * MAX_FRAME_LENGTH + LA_SHAPE_MAX],
            ltp_corr_q15: 0,
            mu_ltp_q8: 0,
            snr_db_q7: 0,
            avg_gain_q16: 0,
            avg_gain_q16_one_bit_per_sample: 0,
            buffered_in_channel_ms: 0,
            speech_activity_q8: 0,
            prev_ltp_pred_cod_gain_q7: 0,
            hp_ltp_pred_cod_gain_q7: 0,
            in_band_fec_snr_comp_q8: 0,
        }
    }
}
