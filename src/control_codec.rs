//! Applies API control settings to the encoder: internal rate, packet
//! size, complexity profile, target quality and redundancy usage.

use crate::common::{
    FIND_PITCH_LPC_WIN_MS, FRAME_LENGTH_MS, LA_PITCH_MS, LA_SHAPE_MS, MAX_API_FS_KHZ,
    MAX_DEL_DEC_STATES, MAX_FRAME_LENGTH, MIN_LPC_ORDER, NB_SUBFR, SignalType, LA_SHAPE_MAX,
};
use crate::control_audio_bandwidth::{
    control_audio_bandwidth, MB2NB_BITRATE_BPS, MB2WB_BITRATE_BPS, NB2MB_BITRATE_BPS,
    SWB2WB_BITRATE_BPS, WB2MB_BITRATE_BPS, WB2SWB_BITRATE_BPS,
};
use crate::encoder_control::{EncoderControl, LbrrUsage};
use crate::encoder_state::EncoderState;
use crate::errors::SilkError;
use crate::nlsf_msvq_encode::MAX_NLSF_MSVQ_SURVIVORS;
use crate::nsq::NsqState;
use crate::resampler::{resampler, resampler_init, ResamplerState};
use crate::schur::MAX_ORDER_LPC;
use crate::tables_nlsf_cb0_10::NLSF_CB0_10;
use crate::tables_nlsf_cb0_16::NLSF_CB0_16;
use crate::tables_nlsf_cb1_10::NLSF_CB1_10;
use crate::tables_nlsf_cb1_16::NLSF_CB1_16;
use crate::tables_other::{
    SNR_TABLE_Q1, TARGET_RATE_TABLE_MB, TARGET_RATE_TABLE_NB, TARGET_RATE_TABLE_SWB,
    TARGET_RATE_TABLE_WB, TARGET_RATE_TAB_SZ,
};

/// Loss percentage above which redundancy is actually added.
pub const LBRR_LOSS_THRES: i32 = 1;

/// Speech activity needed before a frame is worth protecting, Q8.
pub const LBRR_SPEECH_ACTIVITY_THRES_Q8: i32 = 128;

/// Total target rate below which in-band FEC is not worth its bits.
const INBAND_FEC_MIN_RATE_BPS: i32 = 18000;

const NLSF_MSVQ_SURVIVORS_LC: usize = 2;
const NLSF_MSVQ_SURVIVORS_MC: usize = 4;

/// Applies the control settings before the first frame of a packet.
/// Mid-packet calls only track API rate changes.
pub fn control_encoder(
    enc: &mut EncoderState,
    packet_size_ms: usize,
    target_rate_bps: i32,
    packet_loss_perc: i32,
    use_in_band_fec: bool,
    use_dtx: bool,
    complexity: u32,
) -> Result<(), SilkError> {
    if enc.controlled_since_last_payload {
        if enc.api_fs_hz != enc.prev_api_fs_hz && enc.fs_khz > 0 {
            // API rate changed in the middle of a packet
            setup_resamplers(enc, enc.fs_khz)?;
        }
        return Ok(());
    }

    let fs_khz = control_audio_bandwidth(enc, target_rate_bps);

    setup_resamplers(enc, fs_khz)?;
    setup_packetsize(enc, packet_size_ms)?;
    setup_fs(enc, fs_khz);
    setup_complexity(enc, complexity)?;
    setup_rate(enc, target_rate_bps);

    if !(0..=100).contains(&packet_loss_perc) {
        return Err(SilkError::EncInvalidLossRate);
    }
    enc.packet_loss_perc = packet_loss_perc;

    enc.use_in_band_fec = use_in_band_fec;
    setup_lbrr(enc);

    enc.use_dtx = use_dtx;
    enc.controlled_since_last_payload = true;

    Ok(())
}

/// Decides whether the current frame gets a redundant copy.
pub fn lbrr_ctrl(enc: &EncoderState, ctrl: &mut EncoderControl) {
    ctrl.lbrr_usage = if enc.lbrr_enabled
        && enc.speech_activity_q8 > LBRR_SPEECH_ACTIVITY_THRES_Q8
        && enc.packet_loss_perc > LBRR_LOSS_THRES
    {
        LbrrUsage::AddOneUp
    } else {
        LbrrUsage::None
    };
}

fn setup_resamplers(enc: &mut EncoderState, fs_khz: usize) -> Result<(), SilkError> {
    if enc.fs_khz != fs_khz || enc.prev_api_fs_hz != enc.api_fs_hz {
        if enc.fs_khz == 0 {
            resampler_init(&mut enc.resampler, enc.api_fs_hz, fs_khz as i32 * 1000)?;
        } else {
            // rebuffer analysis history at the new rate: up to the API
            // rate, then back down through the fresh resampler state
            let mut buf_api = [0i16; (2 * MAX_FRAME_LENGTH + LA_SHAPE_MAX) * (MAX_API_FS_KHZ / 8)];
            let mut n_samples = 2 * enc.frame_length + LA_SHAPE_MS * enc.fs_khz;

            if (fs_khz as i32) * 1000 < enc.api_fs_hz {
                let mut temp = ResamplerState::default();
                resampler_init(&mut temp, enc.fs_khz as i32 * 1000, enc.api_fs_hz)?;
                n_samples = resampler(&mut temp, &mut buf_api, &enc.x_buf[..n_samples]);
                resampler_init(&mut enc.resampler, enc.api_fs_hz, fs_khz as i32 * 1000)?;
            } else {
                buf_api[..n_samples].copy_from_slice(&enc.x_buf[..n_samples]);
            }

            if fs_khz as i32 * 1000 != enc.api_fs_hz {
                let mut x_buf = [0i16; 2 * MAX_FRAME_LENGTH + LA_SHAPE_MAX];
                let n = resampler(&mut enc.resampler, &mut x_buf, &buf_api[..n_samples]);
                enc.x_buf[..n].copy_from_slice(&x_buf[..n]);
            }
        }
    }

    enc.prev_api_fs_hz = enc.api_fs_hz;
    Ok(())
}

fn setup_packetsize(enc: &mut EncoderState, packet_size_ms: usize) -> Result<(), SilkError> {
    if !matches!(packet_size_ms, 20 | 40 | 60 | 80 | 100) {
        return Err(SilkError::EncPacketSizeNotSupported);
    }
    if packet_size_ms != enc.packet_size_ms {
        enc.packet_size_ms = packet_size_ms;
        enc.lbrr.clear();
    }
    Ok(())
}

fn setup_fs(enc: &mut EncoderState, fs_khz: usize) {
    if enc.fs_khz == fs_khz {
        return;
    }

    log::debug!("encoder internal rate set to {} kHz", fs_khz);

    // rate-dependent state starts over
    enc.shape = Default::default();
    enc.prefilt = Default::default();
    enc.pred = Default::default();
    enc.nsq = NsqState::default();
    enc.nsq_lbrr.xq = [0; 2 * MAX_FRAME_LENGTH];
    enc.lbrr.clear();
    enc.lp.in_lp_state = [0; 2];
    enc.lp.transition_frame_no = if enc.lp.mode == 1 { 1 } else { 0 };
    enc.input_buf_ix = 0;
    enc.n_frames_in_payload_buf = 0;
    enc.n_bytes_in_payload_buf = 0;
    enc.target_rate_bps = 0; // forces an SNR update

    enc.prev_lag = 100;
    enc.prev_sigtype = SignalType::Unvoiced;
    enc.first_frame_after_reset = true;
    enc.prefilt.lag_prev = 100;
    enc.shape.last_gain_index = 1;
    enc.nsq.lag_prev = 100;
    enc.nsq.prev_inv_gain_q16 = 1 << 16;
    enc.nsq_lbrr.prev_inv_gain_q16 = 1 << 16;

    enc.fs_khz = fs_khz;
    if fs_khz == 8 {
        enc.predict_lpc_order = MIN_LPC_ORDER;
        enc.nlsf_cbs = [&NLSF_CB0_10, &NLSF_CB1_10];
    } else {
        enc.predict_lpc_order = MAX_ORDER_LPC;
        enc.nlsf_cbs = [&NLSF_CB0_16, &NLSF_CB1_16];
    }
    enc.frame_length = FRAME_LENGTH_MS * fs_khz;
    enc.subfr_length = enc.frame_length / NB_SUBFR;
    enc.la_pitch = LA_PITCH_MS * fs_khz;
    enc.pred.min_pitch_lag = 3 * fs_khz;
    enc.pred.max_pitch_lag = 18 * fs_khz;
    enc.pred.pitch_lpc_win_length = FIND_PITCH_LPC_WIN_MS * fs_khz;

    match fs_khz {
        24 => {
            enc.mu_ltp_q8 = 4;
            enc.bitrate_threshold_up = i32::MAX;
            enc.bitrate_threshold_down = SWB2WB_BITRATE_BPS;
        }
        16 => {
            enc.mu_ltp_q8 = 5;
            enc.bitrate_threshold_up = WB2SWB_BITRATE_BPS;
            enc.bitrate_threshold_down = WB2MB_BITRATE_BPS;
        }
        12 => {
            enc.mu_ltp_q8 = 6;
            enc.bitrate_threshold_up = MB2WB_BITRATE_BPS;
            enc.bitrate_threshold_down = MB2NB_BITRATE_BPS;
        }
        _ => {
            enc.mu_ltp_q8 = 8;
            enc.bitrate_threshold_up = NB2MB_BITRATE_BPS;
            enc.bitrate_threshold_down = 0;
        }
    }
    enc.fs_khz_changed = true;

    debug_assert!(enc.subfr_length * NB_SUBFR == enc.frame_length);
}

fn setup_complexity(enc: &mut EncoderState, complexity: u32) -> Result<(), SilkError> {
    match complexity {
        0 => {
            enc.complexity = 0;
            enc.pitch_estimation_complexity = 0;
            enc.pitch_estimation_threshold_q16 = 52429; // 0.8
            enc.pitch_estimation_lpc_order = 6;
            enc.shaping_lpc_order = 8;
            enc.la_shape = 3 * enc.fs_khz;
            enc.n_states_delayed_decision = 1;
            enc.use_interpolated_nlsfs = false;
            enc.ltp_quant_low_complexity = true;
            enc.nlsf_msvq_survivors = NLSF_MSVQ_SURVIVORS_LC;
            enc.warping_q16 = 0;
        }
        1 => {
            enc.complexity = 1;
            enc.pitch_estimation_complexity = 1;
            enc.pitch_estimation_threshold_q16 = 49152; // 0.75
            enc.pitch_estimation_lpc_order = 12;
            enc.shaping_lpc_order = 12;
            enc.la_shape = LA_SHAPE_MS * enc.fs_khz;
            enc.n_states_delayed_decision = 2;
            enc.use_interpolated_nlsfs = false;
            enc.ltp_quant_low_complexity = false;
            enc.nlsf_msvq_survivors = NLSF_MSVQ_SURVIVORS_MC;
            enc.warping_q16 = enc.fs_khz as i32 * 983; // 0.015
        }
        2 => {
            enc.complexity = 2;
            enc.pitch_estimation_complexity = 2;
            enc.pitch_estimation_threshold_q16 = 45875; // 0.7
            enc.pitch_estimation_lpc_order = 16;
            enc.shaping_lpc_order = 16;
            enc.la_shape = LA_SHAPE_MS * enc.fs_khz;
            enc.n_states_delayed_decision = MAX_DEL_DEC_STATES;
            enc.use_interpolated_nlsfs = true;
            enc.ltp_quant_low_complexity = false;
            enc.nlsf_msvq_survivors = MAX_NLSF_MSVQ_SURVIVORS;
            enc.warping_q16 = enc.fs_khz as i32 * 983;
        }
        _ => return Err(SilkError::EncInvalidComplexitySetting),
    }

    // the pitch whitener never exceeds the synthesis filter order
    enc.pitch_estimation_lpc_order = enc.pitch_estimation_lpc_order.min(enc.predict_lpc_order);
    enc.shape_win_length = LA_SHAPE_MS * enc.fs_khz + 2 * enc.la_shape;

    Ok(())
}

fn setup_rate(enc: &mut EncoderState, target_rate_bps: i32) {
    if target_rate_bps == enc.target_rate_bps {
        return;
    }
    enc.target_rate_bps = target_rate_bps;

    let rate_table: &[i32; TARGET_RATE_TAB_SZ] = match enc.fs_khz {
        8 => &TARGET_RATE_TABLE_NB,
        12 => &TARGET_RATE_TABLE_MB,
        16 => &TARGET_RATE_TABLE_WB,
        _ => &TARGET_RATE_TABLE_SWB,
    };

    // piece-wise linear rate to SNR mapping
    for k in 1..TARGET_RATE_TAB_SZ {
        if target_rate_bps <= rate_table[k] {
            let frac_q6 =
                ((target_rate_bps - rate_table[k - 1]) << 6) / (rate_table[k] - rate_table[k - 1]);
            enc.snr_db_q7 =
                (SNR_TABLE_Q1[k - 1] << 6) + frac_q6 * (SNR_TABLE_Q1[k] - SNR_TABLE_Q1[k - 1]);
            break;
        }
    }
}

fn setup_lbrr(enc: &mut EncoderState) {
    enc.lbrr_enabled = enc.use_in_band_fec;

    let lbrr_rate_thres_bps = match enc.fs_khz {
        8 => INBAND_FEC_MIN_RATE_BPS - 9000,
        12 => INBAND_FEC_MIN_RATE_BPS - 6000,
        16 => INBAND_FEC_MIN_RATE_BPS - 3000,
        _ => INBAND_FEC_MIN_RATE_BPS,
    };

    if enc.target_rate_bps >= lbrr_rate_thres_bps {
        // redundant copies are coded with raised gains; less raising
        // at higher loss so they stay useful
        enc.lbrr_gain_increases = (8 - (enc.packet_loss_perc >> 1)).max(0);

        if enc.lbrr_enabled && enc.packet_loss_perc > LBRR_LOSS_THRES {
            enc.in_band_fec_snr_comp_q8 = (6 << 8) - (enc.lbrr_gain_increases << 7);
        } else {
            enc.in_band_fec_snr_comp_q8 = 0;
            enc.lbrr_enabled = false;
        }
    } else {
        enc.in_band_fec_snr_comp_q8 = 0;
        enc.lbrr_enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::control_encoder;
    use crate::encoder_state::EncoderState;
    use crate::errors::SilkError;

    fn fresh(api_fs_hz: i32) -> EncoderState {
        let mut enc = EncoderState::default();
        enc.api_fs_hz = api_fs_hz;
        enc.max_internal_fs_khz = 24;
        enc
    }

    #[test]
    fn configures_frame_geometry_from_the_target_rate() {
        let mut enc = fresh(24000);
        control_encoder(&mut enc, 20, 30000, 0, false, false, 2).unwrap();
        assert_eq!(enc.fs_khz, 24);
        assert_eq!(enc.frame_length, 480);
        assert_eq!(enc.subfr_length, 120);
        assert_eq!(enc.predict_lpc_order, 16);
        assert!(enc.snr_db_q7 > 0);

        let mut enc = fresh(8000);
        control_encoder(&mut enc, 20, 12000, 0, false, false, 0).unwrap();
        assert_eq!(enc.fs_khz, 8);
        assert_eq!(enc.frame_length, 160);
        assert_eq!(enc.predict_lpc_order, 10);
        assert_eq!(enc.pitch_estimation_lpc_order, 6);
    }

    #[test]
    fn rejects_bad_settings() {
        let mut enc = fresh(16000);
        assert_eq!(
            control_encoder(&mut enc, 30, 20000, 0, false, false, 0),
            Err(SilkError::EncPacketSizeNotSupported)
        );
        assert_eq!(
            control_encoder(&mut enc, 20, 20000, 101, false, false, 0),
            Err(SilkError::EncInvalidLossRate)
        );
        assert_eq!(
            control_encoder(&mut enc, 20, 20000, 0, false, false, 3),
            Err(SilkError::EncInvalidComplexitySetting)
        );
    }

    #[test]
    fn lbrr_needs_fec_enabled_loss_and_rate() {
        let mut enc = fresh(16000);
        control_encoder(&mut enc, 20, 25000, 10, true, false, 1).unwrap();
        assert!(enc.lbrr_enabled);
        assert!(enc.in_band_fec_snr_comp_q8 > 0);

        let mut enc = fresh(16000);
        control_encoder(&mut enc, 20, 25000, 0, true, false, 1).unwrap();
        assert!(!enc.lbrr_enabled);

        let mut enc = fresh(16000);
        control_encoder(&mut enc, 20, 8000, 10, true, false, 1).unwrap();
        assert!(!enc.lbrr_enabled);
    }

    #[test]
    fn mid_packet_calls_leave_the_configuration_alone() {
        let mut enc = fresh(16000);
        control_encoder(&mut enc, 20, 20000, 0, false, false, 1).unwrap();
        let fs = enc.fs_khz;
        enc.controlled_since_last_payload = true;
        control_encoder(&mut enc, 40, 6000, 0, false, false, 2).unwrap();
        assert_eq!(enc.fs_khz, fs);
        assert_eq!(enc.packet_size_ms, 20);
        assert_eq!(enc.complexity, 1);
    }
}
