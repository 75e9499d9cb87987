//! Per-frame encoder top level: runs the analysis chain on one frame,
//! quantizes the excitation and assembles multi-frame payloads with
//! optional low bitrate redundancy.

use crate::common::{
    FrameTermination, FRAME_LENGTH_MS, LA_PITCH_MAX, MAX_ARITHM_BYTES, MAX_FRAME_LENGTH, NB_SUBFR,
};
use crate::control_codec::lbrr_ctrl;
use crate::encode_parameters::encode_parameters;
use crate::encoder_control::EncoderControl;
use crate::encoder_state::EncoderState;
use crate::errors::SilkError;
use crate::find_pitch_lags::find_pitch_lags;
use crate::find_pred_coefs::find_pred_coefs;
use crate::gain_quant::gains_dequant;
use crate::hp_variable_cutoff::hp_variable_cutoff;
use crate::lp_variable_cutoff::lp_variable_cutoff;
use crate::noise_shape_analysis::noise_shape_analysis;
use crate::nsq::nsq;
use crate::nsq_del_dec::nsq_del_dec;
use crate::prefilter::prefilter;
use crate::process_gains::process_gains;
use crate::tables_gain::N_LEVELS_QGAIN;
use crate::tables_other::FRAME_TERMINATION_CDF;
use crate::vad::vad_get_sa_q8;

/// Speech activity below 0.1 counts as silence for DTX, Q8.
const SPEECH_ACTIVITY_DTX_THRES_Q8: i32 = 26;

/// 100 ms of silence before transmission stops.
const NO_SPEECH_FRAMES_BEFORE_DTX: i32 = 5;

/// A DTX run is broken up by a coded frame after 400 ms.
const MAX_CONSECUTIVE_DTX: i32 = 20;

/// Encodes the frame sitting in `enc.input_buf`. Returns the payload
/// size, which stays zero until the last frame of a packet has been
/// coded.
pub fn encode_frame(enc: &mut EncoderState, output: &mut [u8]) -> Result<usize, SilkError> {
    let frame_length = enc.frame_length;
    let la_shape = enc.la_shape;
    let la_pitch = enc.la_pitch;

    let mut ctrl = EncoderControl::default();
    ctrl.seed = enc.frame_counter & 3;
    enc.frame_counter += 1;

    // voice activity of the unfiltered input
    let input = enc.input_buf;
    let vad_res = vad_get_sa_q8(&mut enc.vad, &input[..frame_length]);
    enc.speech_activity_q8 = vad_res.sa_q8;
    ctrl.input_quality_bands_q15 = vad_res.quality_q15;
    ctrl.input_tilt_q15 = vad_res.tilt_q15;

    // adaptive high-pass, then the bandwidth transition low-pass,
    // into the lookahead part of the analysis buffer
    let mut in_hp = [0i16; MAX_FRAME_LENGTH];
    in_hp[..frame_length].copy_from_slice(&input[..frame_length]);
    hp_variable_cutoff(enc, &mut ctrl, &mut in_hp[..frame_length]);

    let x_new = frame_length + la_shape;
    enc.x_buf[x_new..x_new + frame_length].copy_from_slice(&in_hp[..frame_length]);
    lp_variable_cutoff(&mut enc.lp, &mut enc.x_buf[x_new..x_new + frame_length]);

    // the analysis functions see a snapshot of the buffer
    let x_buf = enc.x_buf;
    let pitch_buf_len = 2 * frame_length + la_pitch;

    let mut res_pitch = [0i16; 2 * MAX_FRAME_LENGTH + LA_PITCH_MAX];
    find_pitch_lags(
        enc,
        &mut ctrl,
        &mut res_pitch[..pitch_buf_len],
        &x_buf[..pitch_buf_len],
    );

    noise_shape_analysis(
        enc,
        &mut ctrl,
        &res_pitch[frame_length..2 * frame_length],
        &x_buf[frame_length - la_shape..2 * frame_length + la_shape],
    );

    let mut xfw = [0i16; MAX_FRAME_LENGTH];
    prefilter(
        enc,
        &ctrl,
        &mut xfw[..frame_length],
        &x_buf[frame_length..2 * frame_length],
    );

    find_pred_coefs(
        enc,
        &mut ctrl,
        &res_pitch[..pitch_buf_len],
        &x_buf[..2 * frame_length],
    );

    process_gains(enc, &mut ctrl);

    // redundant version of this frame, held back for later packets
    let mut lbrr_payload = [0u8; MAX_ARITHM_BYTES];
    let n_bytes_lbrr = lbrr_encode(enc, &mut ctrl, &mut lbrr_payload, &xfw[..frame_length]);

    // noise shaping quantization
    if enc.n_states_delayed_decision > 1 || enc.warping_q16 > 0 {
        nsq_del_dec(
            &mut enc.nsq,
            &mut ctrl,
            &xfw[..frame_length],
            &mut enc.q[..frame_length],
            frame_length,
            enc.subfr_length,
            enc.predict_lpc_order,
            enc.shaping_lpc_order,
            enc.warping_q16,
            enc.n_states_delayed_decision,
        );
    } else {
        nsq(
            &mut enc.nsq,
            &ctrl,
            &xfw[..frame_length],
            &mut enc.q[..frame_length],
            frame_length,
            enc.subfr_length,
            enc.predict_lpc_order,
            enc.shaping_lpc_order,
        );
    }

    // convert speech activity into VAD and DTX flags
    if enc.speech_activity_q8 < SPEECH_ACTIVITY_DTX_THRES_Q8 {
        enc.vad_flag = false;
        enc.no_speech_counter += 1;
        if enc.no_speech_counter > NO_SPEECH_FRAMES_BEFORE_DTX {
            if !enc.in_dtx {
                log::debug!("entering DTX after {} silent frames", enc.no_speech_counter);
            }
            enc.in_dtx = true;
        }
        if enc.no_speech_counter > MAX_CONSECUTIVE_DTX + NO_SPEECH_FRAMES_BEFORE_DTX {
            // force a coded frame so the decoder stays in sync
            enc.no_speech_counter = NO_SPEECH_FRAMES_BEFORE_DTX;
            enc.in_dtx = false;
        }
    } else {
        enc.no_speech_counter = 0;
        enc.in_dtx = false;
        enc.vad_flag = true;
    }

    if enc.n_frames_in_payload_buf == 0 {
        enc.rc.enc_init();
        enc.n_bytes_in_payload_buf = 0;
    }

    let nlsf_cb = enc.nlsf_cbs[ctrl.sigtype.code()];
    let mut type_offset_prev = enc.type_offset_prev;
    encode_parameters(
        &mut enc.rc,
        &ctrl,
        &enc.q[..frame_length],
        enc.fs_khz,
        enc.n_frames_in_payload_buf == 0,
        &mut type_offset_prev,
        nlsf_cb,
        enc.vad_flag,
    );
    enc.type_offset_prev = type_offset_prev;

    // shift the analysis buffer by one frame
    enc.x_buf.copy_within(frame_length..2 * frame_length + la_shape, 0);

    enc.prev_sigtype = ctrl.sigtype;
    enc.prev_lag = ctrl.pitch_lags[NB_SUBFR - 1];
    enc.first_frame_after_reset = false;

    if enc.rc.error().is_some() {
        enc.n_frames_in_payload_buf = 0;
    } else {
        enc.n_frames_in_payload_buf += 1;
    }

    // finalize the payload once the packet is full
    let mut ret = Ok(());
    let mut n_bytes_out = 0usize;
    let n_bytes_coded;

    if enc.n_frames_in_payload_buf * FRAME_LENGTH_MS >= enc.packet_size_ms {
        // a buffered redundant frame changes the terminator
        let mut terminator = FrameTermination::LastFrame;
        let mut lbrr_age = 1;
        if enc.lbrr.slot(1).usage == 1 {
            terminator = FrameTermination::LbrrVer1;
        }
        if enc.lbrr.oldest().usage == 2 {
            terminator = FrameTermination::LbrrVer2;
            lbrr_age = 2;
        }

        enc.rc.encode(terminator.code(), &FRAME_TERMINATION_CDF);
        let (mut n_bytes, _) = enc.rc.length();

        if output.len() >= n_bytes {
            enc.rc.wrap_up();
            output[..n_bytes].copy_from_slice(enc.rc.payload(n_bytes));

            if matches!(
                terminator,
                FrameTermination::LbrrVer1 | FrameTermination::LbrrVer2
            ) {
                let slot = enc.lbrr.slot(lbrr_age);
                if output.len() >= n_bytes + slot.n_bytes {
                    output[n_bytes..n_bytes + slot.n_bytes]
                        .copy_from_slice(&slot.payload[..slot.n_bytes]);
                    n_bytes += slot.n_bytes;
                }
            }
            n_bytes_out = n_bytes;
            log::debug!(
                "packet of {} bytes, {} frames, terminator {}",
                n_bytes_out,
                enc.n_frames_in_payload_buf,
                terminator.code()
            );

            // store this frame's redundancy for a later packet
            let slot = enc.lbrr.oldest_mut();
            slot.payload[..n_bytes_lbrr].copy_from_slice(&lbrr_payload[..n_bytes_lbrr]);
            slot.n_bytes = n_bytes_lbrr;
            slot.usage = ctrl.lbrr_usage.code();
            enc.lbrr.advance();
        } else {
            n_bytes = 0;
            log::debug!("output buffer too short, payload discarded");
            ret = Err(SilkError::EncPayloadBufTooShort);
        }
        n_bytes_coded = n_bytes;
        enc.n_frames_in_payload_buf = 0;
    } else {
        enc.rc
            .encode(FrameTermination::MoreFrames.code(), &FRAME_TERMINATION_CDF);
        let (n_bytes, _) = enc.rc.length();
        n_bytes_coded = n_bytes;
    }

    if enc.rc.error().is_some() {
        ret = Err(SilkError::EncInternalError);
    }

    // track how far the channel lags behind the target rate
    enc.buffered_in_channel_ms +=
        8 * 1000 * (n_bytes_coded as i32 - enc.n_bytes_in_payload_buf as i32)
            / enc.target_rate_bps;
    enc.buffered_in_channel_ms -= FRAME_LENGTH_MS as i32;
    enc.buffered_in_channel_ms = enc.buffered_in_channel_ms.clamp(0, 100);
    enc.n_bytes_in_payload_buf = n_bytes_coded;

    ret.map(|_| n_bytes_out)
}

/// Re-encodes the current frame at a reduced rate into `payload`,
/// reusing all analysis results. Returns the number of payload bytes,
/// zero while the redundant packet is still incomplete.
fn lbrr_encode(
    enc: &mut EncoderState,
    ctrl: &mut EncoderControl,
    payload: &mut [u8; MAX_ARITHM_BYTES],
    xfw: &[i16],
) -> usize {
    lbrr_ctrl(enc, ctrl);

    if !enc.lbrr_enabled {
        return 0;
    }

    let frame_length = enc.frame_length;
    let saved_gains_indices = ctrl.gains_indices;
    let saved_gains_q16 = ctrl.gains_q16;
    let saved_ltp_scale_index = ctrl.ltp_scale_index;

    // above this rate the excitation is re-quantized with raised gains,
    // below it only the parameters are sent
    let rate_only_parameters = match enc.fs_khz {
        8 => 13500,
        12 => 15500,
        16 => 17500,
        _ => 19500,
    };

    if enc.complexity > 0 && enc.target_rate_bps > rate_only_parameters {
        if enc.n_frames_in_payload_buf == 0 {
            // quantizer state forks from the main encoder here
            enc.nsq_lbrr = enc.nsq.clone();
            enc.lbrr_prev_last_gain_index = enc.shape.last_gain_index;
            ctrl.gains_indices[0] = (ctrl.gains_indices[0] + enc.lbrr_gain_increases as usize)
                .min(N_LEVELS_QGAIN - 1);
        }

        // quantized gains, kept in sync with the redundancy decoder
        let indices = ctrl.gains_indices;
        gains_dequant(
            &mut ctrl.gains_q16,
            &indices,
            &mut enc.lbrr_prev_last_gain_index,
            enc.n_frames_in_payload_buf > 0,
        );

        if enc.n_states_delayed_decision > 1 || enc.warping_q16 > 0 {
            nsq_del_dec(
                &mut enc.nsq_lbrr,
                ctrl,
                xfw,
                &mut enc.q_lbrr[..frame_length],
                frame_length,
                enc.subfr_length,
                enc.predict_lpc_order,
                enc.shaping_lpc_order,
                enc.warping_q16,
                enc.n_states_delayed_decision,
            );
        } else {
            nsq(
                &mut enc.nsq_lbrr,
                &*ctrl,
                xfw,
                &mut enc.q_lbrr[..frame_length],
                frame_length,
                enc.subfr_length,
                enc.predict_lpc_order,
                enc.shaping_lpc_order,
            );
        }
    } else {
        enc.q_lbrr[..frame_length].fill(0);
        ctrl.ltp_scale_index = 0;
    }

    if enc.n_frames_in_payload_buf == 0 {
        enc.rc_lbrr.enc_init();
    }

    let nlsf_cb = enc.nlsf_cbs[ctrl.sigtype.code()];
    let mut type_offset_prev = enc.type_offset_prev;
    encode_parameters(
        &mut enc.rc_lbrr,
        ctrl,
        &enc.q_lbrr[..frame_length],
        enc.fs_khz,
        enc.n_frames_in_payload_buf == 0,
        &mut type_offset_prev,
        nlsf_cb,
        enc.vad_flag,
    );

    let n_frames = if enc.rc_lbrr.error().is_some() {
        0
    } else {
        enc.n_frames_in_payload_buf + 1
    };

    let mut n_bytes_out = 0;
    if n_frames * FRAME_LENGTH_MS >= enc.packet_size_ms {
        enc.rc_lbrr
            .encode(FrameTermination::LastFrame.code(), &FRAME_TERMINATION_CDF);
        let (n_bytes, _) = enc.rc_lbrr.length();
        if payload.len() >= n_bytes {
            enc.rc_lbrr.wrap_up();
            payload[..n_bytes].copy_from_slice(enc.rc_lbrr.payload(n_bytes));
            n_bytes_out = n_bytes;
        }
    } else {
        enc.rc_lbrr
            .encode(FrameTermination::MoreFrames.code(), &FRAME_TERMINATION_CDF);
    }

    // the redundant pass must not disturb the main encoding
    ctrl.gains_indices = saved_gains_indices;
    ctrl.gains_q16 = saved_gains_q16;
    ctrl.ltp_scale_index = saved_ltp_scale_index;

    n_bytes_out
}

#[cfg(test)]
mod tests {
    use super::encode_frame;
    use crate::common::MAX_ARITHM_BYTES;
    use crate::control_codec::control_encoder;
    use crate::encoder_state::EncoderState;

    fn test_encoder(packet_size_ms: usize) -> EncoderState {
        let mut enc = EncoderState::default();
        enc.api_fs_hz = 16000;
        enc.prev_api_fs_hz = 16000;
        enc.max_internal_fs_khz = 16;
        control_encoder(&mut enc, packet_size_ms, 20000, 0, false, false, 2).unwrap();
        enc
    }

    fn fill_noise(enc: &mut EncoderState, seed: &mut u32) {
        let frame_length = enc.frame_length;
        for s in enc.input_buf[..frame_length].iter_mut() {
            *seed = seed.wrapping_mul(907_633_515).wrapping_add(866_543);
            *s = (*seed >> 20) as i16;
        }
    }

    #[test]
    fn single_frame_packet_produces_a_payload() {
        let mut enc = test_encoder(20);
        let mut seed = 1u32;
        fill_noise(&mut enc, &mut seed);

        let mut payload = [0u8; MAX_ARITHM_BYTES];
        let n_bytes = encode_frame(&mut enc, &mut payload).unwrap();
        assert!(n_bytes > 0);
        assert_eq!(enc.n_frames_in_payload_buf, 0);
    }

    #[test]
    fn forty_ms_packet_finishes_on_the_second_frame() {
        let mut enc = test_encoder(40);
        let mut seed = 7u32;
        let mut payload = [0u8; MAX_ARITHM_BYTES];

        fill_noise(&mut enc, &mut seed);
        let first = encode_frame(&mut enc, &mut payload).unwrap();
        assert_eq!(first, 0);
        assert_eq!(enc.n_frames_in_payload_buf, 1);

        fill_noise(&mut enc, &mut seed);
        let second = encode_frame(&mut enc, &mut payload).unwrap();
        assert!(second > 0);
        assert_eq!(enc.n_frames_in_payload_buf, 0);
    }

    #[test]
    fn a_too_short_output_buffer_is_reported() {
        let mut enc = test_encoder(20);
        let mut seed = 3u32;
        fill_noise(&mut enc, &mut seed);

        let mut payload = [0u8; 1];
        let res = encode_frame(&mut enc, &mut payload);
        assert_eq!(res, Err(crate::errors::SilkError::EncPayloadBufTooShort));
    }

    #[test]
    fn long_silence_raises_the_dtx_flag() {
        let mut enc = test_encoder(20);
        enc.use_dtx = true;
        let mut payload = [0u8; MAX_ARITHM_BYTES];

        for _ in 0..10 {
            enc.input_buf = [0; crate::common::MAX_FRAME_LENGTH];
            encode_frame(&mut enc, &mut payload).unwrap();
        }
        assert!(enc.in_dtx);
        assert!(!enc.vad_flag);
    }
}
