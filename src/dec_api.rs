//! Public decoder API: per-packet decoding with resampling to the API
//! rate, plus payload inspection helpers that never touch a running
//! decoder.

use alloc::vec::Vec;

use crate::common::{
    FrameTermination, SignalType, MAX_API_FS_KHZ, MAX_ARITHM_BYTES, MAX_FRAMES_PER_PACKET,
    MAX_FRAME_LENGTH, MAX_LBRR_DELAY,
};
use crate::decode_frame::decode_frame;
use crate::decode_parameters::decode_parameters;
use crate::decoder_control::DecoderControl;
use crate::decoder_state::DecoderState;
use crate::errors::SilkError;
use crate::resampler::{resampler, resampler_init};

/// Active frames without redundancy tolerated before the decoder stops
/// reporting an in-band FEC delay to the jitter buffer.
const NO_LBRR_THRES: i32 = 10;

/// Per-call decoder settings and feedback.
pub struct DecControl {
    /// Requested output rate in Hz, 8000 to 48000.
    pub api_sample_rate: i32,
    /// Output samples per frame at the API rate, written by the decoder.
    pub frame_size: usize,
    /// Frames found in the last fully consumed packet.
    pub frames_per_packet: usize,
    /// In-band FEC delay in packets, 0 when the stream carries none.
    pub in_band_fec_offset: usize,
    /// Set when the current packet still holds undecoded frames; the
    /// caller should call [`SilkDecoder::decode`] again before feeding
    /// the next packet.
    pub more_internal_decoder_frames: bool,
}

impl Default for DecControl {
    fn default() -> Self {
        DecControl {
            api_sample_rate: 24000,
            frame_size: 0,
            frames_per_packet: 0,
            in_band_fec_offset: 0,
            more_internal_decoder_frames: false,
        }
    }
}

/// Table of contents of a packet, recovered without full decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toc {
    pub corrupt: bool,
    pub frames_in_packet: usize,
    pub fs_khz: usize,
    /// 0 for none, otherwise the LBRR version (1 or 2).
    pub inband_lbrr: usize,
    pub vad_flags: [bool; MAX_FRAMES_PER_PACKET],
    pub sigtype_flags: [SignalType; MAX_FRAMES_PER_PACKET],
}

impl Default for Toc {
    fn default() -> Self {
        Toc {
            corrupt: false,
            frames_in_packet: 0,
            fs_khz: 0,
            inband_lbrr: 0,
            vad_flags: [false; MAX_FRAMES_PER_PACKET],
            sigtype_flags: [SignalType::Unvoiced; MAX_FRAMES_PER_PACKET],
        }
    }
}

/// Size of the decoder state, for callers budgeting memory up front.
pub fn decoder_size_bytes() -> usize {
    core::mem::size_of::<SilkDecoder>()
}

/// A SILK decoder instance.
pub struct SilkDecoder {
    state: DecoderState,
}

impl Default for SilkDecoder {
    fn default() -> Self {
        SilkDecoder::new()
    }
}

impl SilkDecoder {
    pub fn new() -> Self {
        SilkDecoder {
            state: DecoderState::new(),
        }
    }

    /// Decodes one frame from `payload` into `output` at the API rate,
    /// returning the number of samples written. Call with `lost` set to
    /// conceal a missing packet; `payload` is ignored in that case.
    ///
    /// A corrupt payload still writes one concealed frame of
    /// `ctrl.frame_size` samples before the error is returned.
    pub fn decode(
        &mut self,
        ctrl: &mut DecControl,
        lost: bool,
        payload: &[u8],
        output: &mut [i16],
    ) -> Result<usize, SilkError> {
        if ctrl.api_sample_rate > (MAX_API_FS_KHZ as i32) * 1000 || ctrl.api_sample_rate < 8000 {
            return Err(SilkError::DecInvalidSamplingFrequency);
        }

        let dec = &mut self.state;
        let mut lost = lost;
        let mut status = Ok(());

        if !dec.more_internal_decoder_frames {
            // first frame in the packet
            dec.n_frames_decoded = 0;
            if !lost && payload.len() > MAX_ARITHM_BYTES {
                lost = true;
                status = Err(SilkError::DecPayloadTooLarge);
            }
        }

        let prev_fs_khz = dec.fs_khz;

        let mut internal = [0i16; MAX_FRAME_LENGTH];
        let (n_samples, used_bytes, frame_status) =
            decode_frame(dec, &mut internal, payload, lost);
        if status.is_ok() {
            status = frame_status;
        }

        if used_bytes > 0 {
            if dec.n_bytes_left > 0
                && dec.frame_termination == FrameTermination::MoreFrames
                && dec.n_frames_decoded < MAX_FRAMES_PER_PACKET
            {
                dec.more_internal_decoder_frames = true;
            } else {
                dec.more_internal_decoder_frames = false;
                dec.n_frames_in_packet = dec.n_frames_decoded;

                // track how the far end spaces its redundancy
                if dec.vad_flag {
                    match dec.frame_termination {
                        FrameTermination::LastFrame => {
                            dec.no_fec_counter += 1;
                            if dec.no_fec_counter > NO_LBRR_THRES {
                                dec.inband_fec_offset = 0;
                            }
                        }
                        FrameTermination::LbrrVer1 => {
                            dec.inband_fec_offset = 1;
                            dec.no_fec_counter = 0;
                        }
                        FrameTermination::LbrrVer2 => {
                            dec.inband_fec_offset = 2;
                            dec.no_fec_counter = 0;
                        }
                        FrameTermination::MoreFrames => {}
                    }
                }
            }
        }

        // bring the internal frame up or down to the API rate
        let n_out;
        if (dec.fs_khz as i32) * 1000 != ctrl.api_sample_rate {
            if prev_fs_khz != dec.fs_khz || dec.prev_api_fs_hz != ctrl.api_sample_rate {
                resampler_init(
                    &mut dec.resampler,
                    (dec.fs_khz as i32) * 1000,
                    ctrl.api_sample_rate,
                )
                .map_err(|_| SilkError::DecInvalidSamplingFrequency)?;
            }
            n_out = resampler(&mut dec.resampler, output, &internal[..n_samples]);
        } else {
            output[..n_samples].copy_from_slice(&internal[..n_samples]);
            n_out = n_samples;
        }

        dec.prev_api_fs_hz = ctrl.api_sample_rate;

        ctrl.frame_size = (ctrl.api_sample_rate / 50) as usize;
        ctrl.frames_per_packet = dec.n_frames_in_packet;
        ctrl.in_band_fec_offset = dec.inband_fec_offset;
        ctrl.more_internal_decoder_frames = dec.more_internal_decoder_frames;

        status.map(|_| n_out)
    }
}

/// Extracts the low bitrate redundancy for a packet `lost_offset`
/// positions back, if `payload` carries it. Returns an empty vector
/// when there is none or the payload cannot be parsed.
pub fn search_for_lbrr(payload: &[u8], lost_offset: usize) -> Vec<u8> {
    if lost_offset < 1 || lost_offset > MAX_LBRR_DELAY {
        return Vec::new();
    }

    // throwaway state so a running decoder is not disturbed
    let mut dec = DecoderState::default();
    let mut ctrl = DecoderControl::default();
    let mut q = [0i32; MAX_FRAME_LENGTH];

    dec.rc.dec_init(payload);

    loop {
        decode_parameters(&mut dec, &mut ctrl, &mut q, false);

        if dec.rc.error().is_some() {
            return Vec::new();
        }

        let term = dec.frame_termination.code();
        if term > 0 && (term - 1) & lost_offset != 0 && dec.n_bytes_left >= 0 {
            let n = dec.n_bytes_left as usize;
            return payload[payload.len() - n..].to_vec();
        }

        if dec.n_bytes_left > 0 && dec.frame_termination == FrameTermination::MoreFrames {
            dec.n_frames_decoded += 1;
        } else {
            return Vec::new();
        }
    }
}

/// Parses the packet headers without synthesizing audio.
pub fn get_toc(payload: &[u8]) -> Toc {
    let mut dec = DecoderState::default();
    let mut ctrl = DecoderControl::default();
    let mut q = [0i32; MAX_FRAME_LENGTH];

    dec.rc.dec_init(payload);

    let mut toc = Toc::default();
    loop {
        decode_parameters(&mut dec, &mut ctrl, &mut q, false);

        if dec.n_frames_decoded < MAX_FRAMES_PER_PACKET {
            toc.vad_flags[dec.n_frames_decoded] = dec.vad_flag;
            toc.sigtype_flags[dec.n_frames_decoded] = ctrl.sigtype;
        }

        if dec.rc.error().is_some() {
            toc.corrupt = true;
            break;
        }

        if dec.n_bytes_left > 0 && dec.frame_termination == FrameTermination::MoreFrames {
            dec.n_frames_decoded += 1;
        } else {
            break;
        }
    }

    if toc.corrupt
        || dec.frame_termination == FrameTermination::MoreFrames
        || dec.n_frames_decoded + 1 > MAX_FRAMES_PER_PACKET
    {
        toc = Toc::default();
        toc.corrupt = true;
    } else {
        toc.frames_in_packet = dec.n_frames_decoded + 1;
        toc.fs_khz = dec.fs_khz;
        toc.inband_lbrr = match dec.frame_termination {
            FrameTermination::LastFrame => 0,
            term => term.code() - 1,
        };
    }
    toc
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{get_toc, search_for_lbrr, DecControl, SilkDecoder};
    use crate::common::{FrameTermination, SignalType};
    use crate::encode_parameters::encode_parameters;
    use crate::encoder_control::EncoderControl;
    use crate::errors::SilkError;
    use crate::range_coder::RangeCoder;
    use crate::tables_nlsf_cb1_16::NLSF_CB1_16;
    use crate::tables_other::FRAME_TERMINATION_CDF;

    fn one_frame_payload(termination: FrameTermination) -> Vec<u8> {
        let fs_khz = 16;
        let frame_length = 20 * fs_khz;

        let mut ectrl = EncoderControl::default();
        ectrl.sigtype = SignalType::Unvoiced;
        ectrl.quant_offset_type = 0;
        ectrl.gains_indices = [40, 32 + 4, 32 + 4, 32 + 4];
        ectrl.nlsf_indices = [5, 1, 2, 0];
        ectrl.nlsf_interp_coef_q2 = 4;
        ectrl.seed = 3;

        let mut q = alloc::vec![0i8; frame_length];
        q[17] = 1;
        q[130] = -1;

        let mut rc = RangeCoder::default();
        rc.enc_init();
        let mut type_offset_prev = 0;
        encode_parameters(
            &mut rc,
            &ectrl,
            &q,
            fs_khz,
            true,
            &mut type_offset_prev,
            &NLSF_CB1_16,
            true,
        );
        rc.encode(termination.code(), &FRAME_TERMINATION_CDF);
        let (n_bytes, _) = rc.length();
        rc.wrap_up();
        rc.payload(n_bytes).to_vec()
    }

    #[test]
    fn rejects_api_rates_outside_the_legal_range() {
        let mut dec = SilkDecoder::new();
        let mut ctrl = DecControl::default();
        ctrl.api_sample_rate = 7000;
        let mut out = [0i16; 960];
        assert_eq!(
            dec.decode(&mut ctrl, true, &[], &mut out),
            Err(SilkError::DecInvalidSamplingFrequency)
        );
    }

    #[test]
    fn decodes_a_single_frame_packet_at_the_internal_rate() {
        let payload = one_frame_payload(FrameTermination::LastFrame);

        let mut dec = SilkDecoder::new();
        let mut ctrl = DecControl::default();
        ctrl.api_sample_rate = 16000;
        let mut out = [0i16; 320];
        let n = dec.decode(&mut ctrl, false, &payload, &mut out).unwrap();
        assert_eq!(n, 320);
        assert!(!ctrl.more_internal_decoder_frames);
        assert_eq!(ctrl.frames_per_packet, 1);
    }

    #[test]
    fn resamples_the_output_when_the_api_rate_differs() {
        let payload = one_frame_payload(FrameTermination::LastFrame);

        let mut dec = SilkDecoder::new();
        let mut ctrl = DecControl::default();
        ctrl.api_sample_rate = 48000;
        let mut out = [0i16; 960];
        let n = dec.decode(&mut ctrl, false, &payload, &mut out).unwrap();
        assert_eq!(n, 960);
        assert_eq!(ctrl.frame_size, 960);
    }

    #[test]
    fn concealed_loss_still_yields_a_full_frame() {
        let mut dec = SilkDecoder::new();
        let mut ctrl = DecControl::default();
        ctrl.api_sample_rate = 24000;
        let mut out = [0i16; 480];
        let n = dec.decode(&mut ctrl, true, &[], &mut out).unwrap();
        assert_eq!(n, 480);
    }

    #[test]
    fn toc_reports_the_frame_layout() {
        let payload = one_frame_payload(FrameTermination::LastFrame);
        let toc = get_toc(&payload);
        assert!(!toc.corrupt);
        assert_eq!(toc.frames_in_packet, 1);
        assert_eq!(toc.fs_khz, 16);
        assert_eq!(toc.inband_lbrr, 0);
        assert!(toc.vad_flags[0]);
        assert_eq!(toc.sigtype_flags[0], SignalType::Unvoiced);
    }

    #[test]
    fn toc_flags_garbage_as_corrupt() {
        let toc = get_toc(&[0xa5u8; 3]);
        assert!(toc.corrupt);
    }

    #[test]
    fn lbrr_search_handles_packets_without_redundancy() {
        let payload = one_frame_payload(FrameTermination::LastFrame);
        assert!(search_for_lbrr(&payload, 1).is_empty());
        assert!(search_for_lbrr(&payload, 0).is_empty());
        assert!(search_for_lbrr(&payload, 3).is_empty());
    }

    #[test]
    fn toc_distinguishes_every_terminator() {
        for (term, lbrr) in [
            (FrameTermination::LastFrame, 0usize),
            (FrameTermination::LbrrVer1, 1),
            (FrameTermination::LbrrVer2, 2),
        ] {
            let toc = get_toc(&one_frame_payload(term));
            assert!(!toc.corrupt, "terminator {:?}", term);
            assert_eq!(toc.frames_in_packet, 1);
            assert_eq!(toc.inband_lbrr, lbrr);
        }
        // a packet that promises more frames but ends is malformed
        let toc = get_toc(&one_frame_payload(FrameTermination::MoreFrames));
        assert!(toc.corrupt);
    }

    #[test]
    fn lbrr_version_one_matches_a_single_packet_offset() {
        // terminator says redundancy for the previous packet follows;
        // with nothing left after the frame the tail is empty but the
        // offset arithmetic must still select version 1 only
        let payload = one_frame_payload(FrameTermination::LbrrVer1);
        let toc = get_toc(&payload);
        assert!(!toc.corrupt);
        assert_eq!(toc.inband_lbrr, 1);
    }
}
