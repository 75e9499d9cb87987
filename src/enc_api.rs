//! Public encoder API: buffers and resamples arbitrary 10 ms multiples
//! of input at the API rate and emits one payload per packet.

use crate::control_codec::control_encoder;
use crate::encode_frame::encode_frame;
use crate::encoder_state::EncoderState;
use crate::errors::SilkError;
use crate::resampler::resampler;

/// Rate control bounds, bps.
const MIN_TARGET_RATE_BPS: i32 = 5000;
const MAX_TARGET_RATE_BPS: i32 = 100000;

/// Per-call encoder settings.
pub struct EncControl {
    /// Input rate in Hz: 8, 12, 16, 24, 32, 44.1 or 48 kHz.
    pub api_sample_rate: i32,
    /// Ceiling for the internal rate in Hz: 8, 12, 16 or 24 kHz.
    pub max_internal_sample_rate: i32,
    /// Packet duration in samples at the API rate.
    pub packet_size: usize,
    /// Target rate in bps, clamped to 5000..=100000.
    pub bit_rate: i32,
    /// Expected channel loss in percent, steers redundancy and rate.
    pub packet_loss_percentage: i32,
    /// 0, 1 or 2; trades quality against compute.
    pub complexity: u32,
    /// Send redundant copies of frames for loss concealment.
    pub use_in_band_fec: bool,
    /// Stop transmitting during silence.
    pub use_dtx: bool,
}

impl Default for EncControl {
    fn default() -> Self {
        EncControl {
            api_sample_rate: 24000,
            max_internal_sample_rate: 24000,
            packet_size: 480,
            bit_rate: 25000,
            packet_loss_percentage: 0,
            complexity: 2,
            use_in_band_fec: false,
            use_dtx: false,
        }
    }
}

/// Size of the encoder state, for callers budgeting memory up front.
pub fn encoder_size_bytes() -> usize {
    core::mem::size_of::<SilkEncoder>()
}

/// A SILK encoder instance.
pub struct SilkEncoder {
    state: EncoderState,
}

impl Default for SilkEncoder {
    fn default() -> Self {
        SilkEncoder::new()
    }
}

impl SilkEncoder {
    pub fn new() -> Self {
        SilkEncoder {
            state: EncoderState::default(),
        }
    }

    /// Feeds `input` to the encoder and writes a payload into `output`
    /// once a whole packet has been buffered. Returns the payload size,
    /// zero while the packet is still being collected or suppressed by
    /// DTX. `input` must hold a multiple of 10 ms, at most one packet.
    pub fn encode(
        &mut self,
        ctrl: &EncControl,
        input: &[i16],
        output: &mut [u8],
    ) -> Result<usize, SilkError> {
        let api_fs_hz = ctrl.api_sample_rate;
        if !matches!(api_fs_hz, 8000 | 12000 | 16000 | 24000 | 32000 | 44100 | 48000)
            || !matches!(ctrl.max_internal_sample_rate, 8000 | 12000 | 16000 | 24000)
        {
            return Err(SilkError::EncFsNotSupported);
        }

        let enc = &mut self.state;
        enc.api_fs_hz = api_fs_hz;
        enc.max_internal_fs_khz = ((ctrl.max_internal_sample_rate >> 10) + 1) as usize;
        enc.use_in_band_fec = ctrl.use_in_band_fec;

        // only multiples of 10 ms are accepted
        let n_samples_in = input.len() as i32;
        let input_10ms = 100 * n_samples_in / api_fs_hz;
        if input_10ms * api_fs_hz != 100 * n_samples_in {
            return Err(SilkError::EncInputInvalidNoOfSamples);
        }

        let packet_size_ms = (1000 * ctrl.packet_size as i32 / api_fs_hz) as usize;
        let target_rate_bps = ctrl
            .bit_rate
            .clamp(MIN_TARGET_RATE_BPS, MAX_TARGET_RATE_BPS);
        control_encoder(
            enc,
            packet_size_ms,
            target_rate_bps,
            ctrl.packet_loss_percentage,
            ctrl.use_in_band_fec,
            ctrl.use_dtx,
            ctrl.complexity,
        )?;

        // no more than one packet per call
        if 1000 * n_samples_in > packet_size_ms as i32 * api_fs_hz {
            return Err(SilkError::EncInputInvalidNoOfSamples);
        }

        let mut samples = input;
        let mut n_bytes_out = 0usize;
        loop {
            let mut n_to_buffer = enc.frame_length - enc.input_buf_ix;
            if api_fs_hz == 1000 * enc.fs_khz as i32 {
                n_to_buffer = n_to_buffer.min(samples.len());
                let ix = enc.input_buf_ix;
                enc.input_buf[ix..ix + n_to_buffer].copy_from_slice(&samples[..n_to_buffer]);
                samples = &samples[n_to_buffer..];
                enc.input_buf_ix += n_to_buffer;
            } else {
                n_to_buffer = n_to_buffer.min(10 * input_10ms as usize * enc.fs_khz);
                let n_from_input =
                    (n_to_buffer as i32 * api_fs_hz / (enc.fs_khz as i32 * 1000)) as usize;
                let ix = enc.input_buf_ix;
                let produced = resampler(
                    &mut enc.resampler,
                    &mut enc.input_buf[ix..ix + n_to_buffer],
                    &samples[..n_from_input],
                );
                samples = &samples[n_from_input..];
                enc.input_buf_ix += produced;
            }

            if enc.input_buf_ix >= enc.frame_length {
                debug_assert_eq!(enc.input_buf_ix, enc.frame_length);

                let n = encode_frame(enc, output)?;
                if n_bytes_out == 0 {
                    n_bytes_out = n;
                } else {
                    // one packet boundary at most per call
                    debug_assert_eq!(n, 0);
                }
                enc.input_buf_ix = 0;
                enc.controlled_since_last_payload = false;

                if samples.is_empty() {
                    break;
                }
            } else {
                break;
            }
        }

        if enc.use_dtx && enc.in_dtx {
            return Ok(0);
        }
        Ok(n_bytes_out)
    }
}

#[cfg(test)]
mod tests {
    use super::{EncControl, SilkEncoder};
    use crate::common::MAX_ARITHM_BYTES;
    use crate::dec_api::{get_toc, DecControl, SilkDecoder};
    use crate::errors::SilkError;

    fn noise(len: usize, seed: &mut u32) -> alloc::vec::Vec<i16> {
        (0..len)
            .map(|_| {
                *seed = seed.wrapping_mul(907_633_515).wrapping_add(866_543);
                ((*seed >> 18) as i16) - 8192
            })
            .collect()
    }

    #[test]
    fn rejects_unsupported_rates() {
        let mut enc = SilkEncoder::new();
        let mut ctrl = EncControl::default();
        ctrl.api_sample_rate = 7000;
        let input = [0i16; 160];
        let mut out = [0u8; MAX_ARITHM_BYTES];
        assert_eq!(
            enc.encode(&ctrl, &input, &mut out),
            Err(SilkError::EncFsNotSupported)
        );

        ctrl.api_sample_rate = 16000;
        ctrl.max_internal_sample_rate = 44100;
        assert_eq!(
            enc.encode(&ctrl, &input, &mut out),
            Err(SilkError::EncFsNotSupported)
        );
    }

    #[test]
    fn rejects_input_that_is_not_a_multiple_of_10_ms() {
        let mut enc = SilkEncoder::new();
        let mut ctrl = EncControl::default();
        ctrl.api_sample_rate = 16000;
        ctrl.max_internal_sample_rate = 16000;
        ctrl.packet_size = 320;

        let input = [0i16; 317];
        let mut out = [0u8; MAX_ARITHM_BYTES];
        assert_eq!(
            enc.encode(&ctrl, &input, &mut out),
            Err(SilkError::EncInputInvalidNoOfSamples)
        );

        // more than one packet is also refused
        let input = [0i16; 640];
        assert_eq!(
            enc.encode(&ctrl, &input, &mut out),
            Err(SilkError::EncInputInvalidNoOfSamples)
        );
    }

    #[test]
    fn round_trips_a_packet_through_the_decoder() {
        let mut enc = SilkEncoder::new();
        let mut ctrl = EncControl::default();
        ctrl.api_sample_rate = 16000;
        ctrl.max_internal_sample_rate = 16000;
        ctrl.packet_size = 320;
        ctrl.bit_rate = 20000;

        let mut seed = 42u32;
        let input = noise(320, &mut seed);
        let mut payload = [0u8; MAX_ARITHM_BYTES];
        let n_bytes = enc.encode(&ctrl, &input, &mut payload).unwrap();
        assert!(n_bytes > 0);

        let toc = get_toc(&payload[..n_bytes]);
        assert!(!toc.corrupt);
        assert_eq!(toc.frames_in_packet, 1);
        assert_eq!(toc.fs_khz, 16);

        let mut dec = SilkDecoder::new();
        let mut dctrl = DecControl::default();
        dctrl.api_sample_rate = 16000;
        let mut out = [0i16; 320];
        let n = dec
            .decode(&mut dctrl, false, &payload[..n_bytes], &mut out)
            .unwrap();
        assert_eq!(n, 320);
    }

    #[test]
    fn buffers_ten_ms_chunks_until_the_packet_is_full() {
        let mut enc = SilkEncoder::new();
        let mut ctrl = EncControl::default();
        ctrl.api_sample_rate = 16000;
        ctrl.max_internal_sample_rate = 16000;
        ctrl.packet_size = 320;

        let mut seed = 9u32;
        let mut payload = [0u8; MAX_ARITHM_BYTES];
        let first = enc
            .encode(&ctrl, &noise(160, &mut seed), &mut payload)
            .unwrap();
        assert_eq!(first, 0);
        let second = enc
            .encode(&ctrl, &noise(160, &mut seed), &mut payload)
            .unwrap();
        assert!(second > 0);
    }

    #[test]
    fn resamples_a_48_khz_input_down_to_the_internal_rate() {
        let mut enc = SilkEncoder::new();
        let mut ctrl = EncControl::default();
        ctrl.api_sample_rate = 48000;
        ctrl.max_internal_sample_rate = 24000;
        ctrl.packet_size = 960;

        let mut seed = 5u32;
        let input = noise(960, &mut seed);
        let mut payload = [0u8; MAX_ARITHM_BYTES];
        let n_bytes = enc.encode(&ctrl, &input, &mut payload).unwrap();
        assert!(n_bytes > 0);

        let toc = get_toc(&payload[..n_bytes]);
        assert!(!toc.corrupt);
        assert_eq!(toc.fs_khz, 24);
    }

    #[test]
    fn dtx_suppresses_payloads_during_silence() {
        let mut enc = SilkEncoder::new();
        let mut ctrl = EncControl::default();
        ctrl.api_sample_rate = 16000;
        ctrl.max_internal_sample_rate = 16000;
        ctrl.packet_size = 320;
        ctrl.use_dtx = true;

        let silence = [0i16; 320];
        let mut payload = [0u8; MAX_ARITHM_BYTES];
        let mut suppressed = false;
        for _ in 0..12 {
            let n = enc.encode(&ctrl, &silence, &mut payload).unwrap();
            if n == 0 {
                suppressed = true;
            }
        }
        assert!(suppressed);
    }
}
