//! Persistent decoder state: synthesis filter memories, payload cursors
//! and the concealment and comfort noise substates.

use crate::common::{
    FrameTermination, SignalType, MAX_FRAME_LENGTH, NB_SUBFR,
};
use crate::decoder_set_fs::decoder_set_fs;
use crate::range_coder::RangeCoder;
use crate::resampler::ResamplerState;
use crate::schur::MAX_ORDER_LPC;
use crate::tables_ltp::LTP_ORDER;
use crate::tables_nlsf::NlsfCb;
use crate::tables_nlsf_cb0_16::NLSF_CB0_16;
use crate::tables_nlsf_cb1_16::NLSF_CB1_16;
use crate::tables_other::{DEC_A_HP_24, DEC_B_HP_24};

/// Memory of the most recent good frames, used to extrapolate over lost
/// packets.
pub struct PlcState {
    /// Pitch lag for voiced concealment, Q8 so the drift stays fractional.
    pub pitch_l_q8: i32,
    pub ltp_coef_q14: [i16; LTP_ORDER],
    pub prev_lpc_q12: [i16; MAX_ORDER_LPC],
    pub last_frame_lost: bool,
    pub rand_seed: i32,
    pub rand_scale_q14: i16,
    pub conc_energy: i32,
    pub conc_energy_shift: i32,
    pub prev_ltp_scale_q14: i16,
    pub prev_gains_q16: [i32; NB_SUBFR],
    pub fs_khz: usize,
}

impl Default for PlcState {
    fn default() -> Self {
        PlcState {
            pitch_l_q8: 0,
            ltp_coef_q14: [0; LTP_ORDER],
            prev_lpc_q12: [0; MAX_ORDER_LPC],
            last_frame_lost: false,
            rand_seed: 0,
            rand_scale_q14: 0,
            conc_energy: 0,
            conc_energy_shift: 0,
            prev_ltp_scale_q14: 0,
            prev_gains_q16: [0; NB_SUBFR],
            fs_khz: 0,
        }
    }
}

impl PlcState {
    /// Re-centers the concealment lag on half a frame.
    pub fn reset(&mut self, frame_length: usize) {
        self.pitch_l_q8 = (frame_length as i32) << 7;
    }
}

/// Comfort noise estimate, smoothed over non-active frames and played
/// out during losses.
pub struct CngState {
    pub exc_buf_q10: [i32; MAX_FRAME_LENGTH],
    pub smth_nlsf_q15: [i32; MAX_ORDER_LPC],
    pub synth_state: [i32; MAX_ORDER_LPC],
    pub smth_gain_q16: i32,
    pub rand_seed: i32,
    pub fs_khz: usize,
}

impl Default for CngState {
    fn default() -> Self {
        CngState {
            exc_buf_q10: [0; MAX_FRAME_LENGTH],
            smth_nlsf_q15: [0; MAX_ORDER_LPC],
            synth_state: [0; MAX_ORDER_LPC],
            smth_gain_q16: 0,
            rand_seed: 0,
            fs_khz: 0,
        }
    }
}

impl CngState {
    /// Spreads the smoothed NLSFs uniformly and restarts the noise seed.
    pub fn reset(&mut self, lpc_order: usize) {
        let nlsf_step_q15 = i32::from(i16::MAX) / (lpc_order as i32 + 1);
        let mut nlsf_acc_q15 = 0;
        for s in self.smth_nlsf_q15[..lpc_order].iter_mut() {
            nlsf_acc_q15 += nlsf_step_q15;
            *s = nlsf_acc_q15;
        }
        self.smth_gain_q16 = 0;
        self.rand_seed = 3176576;
    }
}

pub struct DecoderState {
    pub rc: RangeCoder,
    pub prev_inv_gain_q16: i32,
    /// Long-term prediction memory in Q16, one frame of history plus the
    /// frame being synthesized.
    pub s_ltp_q16: [i32; 2 * MAX_FRAME_LENGTH],
    pub s_lpc_q14: [i32; MAX_FRAME_LENGTH / NB_SUBFR + MAX_ORDER_LPC],
    pub exc_q10: [i32; MAX_FRAME_LENGTH],
    pub res_q10: [i32; MAX_FRAME_LENGTH],
    /// Previous and current decoded frame, the rewhitening source for
    /// voiced onsets.
    pub out_buf: [i16; 2 * MAX_FRAME_LENGTH],
    pub lag_prev: i32,
    pub last_gain_index: i32,
    pub type_offset_prev: usize,
    pub hp_state: [i32; 2],
    pub hp_a: &'static [i16; 2],
    pub hp_b: &'static [i16; 3],
    pub fs_khz: usize,
    pub prev_api_fs_hz: i32,
    pub frame_length: usize,
    pub subfr_length: usize,
    pub lpc_order: usize,
    pub prev_nlsf_q15: [i32; MAX_ORDER_LPC],
    pub first_frame_after_reset: bool,

    // payload cursors for packets with several frames
    pub n_bytes_left: i32,
    pub n_frames_decoded: usize,
    pub n_frames_in_packet: usize,
    pub more_internal_decoder_frames: bool,
    pub frame_termination: FrameTermination,

    pub resampler: ResamplerState,

    /// Voiced / unvoiced NLSF codebooks for the current LPC order.
    pub nlsf_cbs: [&'static NlsfCb; 2],

    // in-band FEC tracking
    pub vad_flag: bool,
    pub no_fec_counter: i32,
    pub inband_fec_offset: usize,

    pub cng: CngState,

    pub loss_cnt: i32,
    pub prev_sigtype: SignalType,
    pub plc: PlcState,
}

impl Default for DecoderState {
    fn default() -> Self {
        DecoderState {
            rc: RangeCoder::default(),
            prev_inv_gain_q16: 0,
            s_ltp_q16: [0; 2 * MAX_FRAME_LENGTH],
            s_lpc_q14: [0; MAX_FRAME_LENGTH / NB_SUBFR + MAX_ORDER_LPC],
            exc_q10: [0; MAX_FRAME_LENGTH],
            res_q10: [0; MAX_FRAME_LENGTH],
            out_buf: [0; 2 * MAX_FRAME_LENGTH],
            lag_prev: 0,
            last_gain_index: 0,
            type_offset_prev: 0,
            hp_state: [0; 2],
            hp_a: &DEC_A_HP_24,
            hp_b: &DEC_B_HP_24,
            fs_khz: 0,
            prev_api_fs_hz: 0,
            frame_length: 0,
            subfr_length: 0,
            lpc_order: 0,
            prev_nlsf_q15: [0; MAX_ORDER_LPC],
            first_frame_after_reset: false,
            n_bytes_left: 0,
            n_frames_decoded: 0,
            n_frames_in_packet: 0,
            more_internal_decoder_frames: false,
            frame_termination: FrameTermination::LastFrame,
            resampler: ResamplerState::default(),
            nlsf_cbs: [&NLSF_CB0_16, &NLSF_CB1_16],
            vad_flag: false,
            no_fec_counter: 0,
            inband_fec_offset: 0,
            cng: CngState::default(),
            loss_cnt: 0,
            prev_sigtype: SignalType::Unvoiced,
            plc: PlcState::default(),
        }
    }
}

impl DecoderState {
    /// Fresh decoder, set up for 24 kHz until the first payload says
    /// otherwise.
    pub fn new() -> Self {
        let mut dec = DecoderState::default();
        decoder_set_fs(&mut dec, 24);
        dec.first_frame_after_reset = true;
        dec.prev_inv_gain_q16 = 1 << 16;
        dec.cng.reset(dec.lpc_order);
        dec.cng.fs_khz = dec.fs_khz;
        dec.plc.reset(dec.frame_length);
        dec.plc.fs_khz = dec.fs_khz;
        dec
    }
}
