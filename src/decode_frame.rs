//! Frame-level decode driver: bitstream parsing, core synthesis,
//! concealment, comfort noise and the output high-pass filter.

use crate::biquad::biquad;
use crate::cng::cng;
use crate::common::{MAX_FRAME_LENGTH, NB_SUBFR};
use crate::decode_core::decode_core;
use crate::decode_parameters::decode_parameters;
use crate::decoder_control::DecoderControl;
use crate::decoder_set_fs::decoder_set_fs;
use crate::decoder_state::DecoderState;
use crate::errors::SilkError;
use crate::plc::{plc, plc_glue_frames};
use crate::range_coder::RangeCoderError;

/// Decodes one frame into `out`, concealing it when `lost` is set or the
/// payload turns out corrupt. Returns the number of samples written, the
/// number of payload bytes consumed, and the decode status.
pub fn decode_frame(
    dec: &mut DecoderState,
    out: &mut [i16],
    payload: &[u8],
    lost: bool,
) -> (usize, usize, Result<(), SilkError>) {
    debug_assert!(out.len() >= dec.frame_length);

    let mut ctrl = DecoderControl::default();
    let mut lost = lost;
    let mut n_bytes_used = 0usize;
    let mut status = Ok(());

    if !lost {
        let fs_khz_old = dec.fs_khz;
        if dec.n_frames_decoded == 0 {
            dec.rc.dec_init(payload);
        }

        let mut pulses = [0i32; MAX_FRAME_LENGTH];
        decode_parameters(dec, &mut ctrl, &mut pulses, true);

        if let Some(e) = dec.rc.error() {
            dec.n_bytes_left = 0;
            lost = true;
            // undo a rate switch the corrupt header may have caused
            decoder_set_fs(dec, fs_khz_old);
            n_bytes_used = dec.rc.buffer_length();
            status = Err(match e {
                RangeCoderError::PayloadTooLong => SilkError::DecPayloadTooLarge,
                _ => SilkError::DecPayloadError,
            });
        } else {
            n_bytes_used = dec.rc.buffer_length() - dec.n_bytes_left as usize;
            dec.n_frames_decoded += 1;

            let frame_length = dec.frame_length;
            decode_core(dec, &mut ctrl, &mut out[..frame_length], &pulses[..frame_length]);
            plc(dec, &mut ctrl, &mut out[..frame_length], false);

            dec.loss_cnt = 0;
            dec.prev_sigtype = ctrl.sigtype;
            dec.first_frame_after_reset = false;
        }
    }

    let frame_length = dec.frame_length;
    if lost {
        plc(dec, &mut ctrl, &mut out[..frame_length], true);
    }

    // keep a frame of history for rewhitening voiced onsets
    dec.out_buf[..frame_length].copy_from_slice(&out[..frame_length]);

    plc_glue_frames(dec, &mut out[..frame_length]);
    cng(dec, &ctrl, &mut out[..frame_length]);
    biquad(&mut out[..frame_length], dec.hp_b, dec.hp_a, &mut dec.hp_state);

    dec.lag_prev = ctrl.pitch_lags[NB_SUBFR - 1];

    (frame_length, n_bytes_used, status)
}

#[cfg(test)]
mod tests {
    use super::decode_frame;
    use crate::common::MAX_FRAME_LENGTH;
    use crate::decoder_state::DecoderState;

    #[test]
    fn a_lost_first_frame_still_produces_audio_of_the_right_length() {
        let mut dec = DecoderState::new();
        let mut out = [0i16; MAX_FRAME_LENGTH];
        let (n, used, status) = decode_frame(&mut dec, &mut out, &[], true);
        assert_eq!(n, dec.frame_length);
        assert_eq!(used, 0);
        assert!(status.is_ok());
    }

    #[test]
    fn garbage_payload_reports_an_error_and_conceals() {
        let mut dec = DecoderState::new();
        let mut out = [0i16; MAX_FRAME_LENGTH];
        let junk = [0x5au8; 3];
        let (n, _, status) = decode_frame(&mut dec, &mut out, &junk, false);
        assert_eq!(n, dec.frame_length);
        assert!(status.is_err());
    }
}
