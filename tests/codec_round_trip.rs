//! End to end encoder/decoder runs over the public API.

use silk_codec::{
    get_toc, search_for_lbrr, DecControl, EncControl, SilkDecoder, SilkEncoder, SilkError,
};

const MAX_PAYLOAD: usize = 1024;

/// Pseudo speech: a pitch-like pulse train with added noise, loud
/// enough to register as voice activity.
fn make_signal(len: usize, period: usize, seed: &mut u32) -> Vec<i16> {
    let mut out = vec![0i16; len];
    for (i, s) in out.iter_mut().enumerate() {
        *seed = seed.wrapping_mul(907_633_515).wrapping_add(866_543);
        let noise = ((*seed >> 19) as i32) - 4096;
        let pulse = if i % period < 4 { 9000 } else { 0 };
        *s = (pulse + noise).clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }
    out
}

fn encoder_control(api_hz: i32, internal_hz: i32, packet_ms: usize) -> EncControl {
    let mut ctrl = EncControl::default();
    ctrl.api_sample_rate = api_hz;
    ctrl.max_internal_sample_rate = internal_hz;
    ctrl.packet_size = api_hz as usize * packet_ms / 1000;
    ctrl.bit_rate = 25000;
    ctrl
}

#[test]
fn twenty_ms_packets_round_trip_at_matching_rates() {
    let mut enc = SilkEncoder::new();
    let ctrl = encoder_control(16000, 16000, 20);

    let mut dec = SilkDecoder::new();
    let mut dctrl = DecControl::default();
    dctrl.api_sample_rate = 16000;

    let mut seed = 11u32;
    let mut decoded_packets = 0;
    for _ in 0..25 {
        let input = make_signal(320, 80, &mut seed);
        let mut payload = [0u8; MAX_PAYLOAD];
        let n_bytes = enc.encode(&ctrl, &input, &mut payload).unwrap();
        assert!(n_bytes > 0);

        let mut out = [0i16; 320];
        let n = dec
            .decode(&mut dctrl, false, &payload[..n_bytes], &mut out)
            .unwrap();
        assert_eq!(n, 320);
        assert!(!dctrl.more_internal_decoder_frames);
        decoded_packets += 1;
    }
    assert_eq!(decoded_packets, 25);
}

#[test]
fn sixty_ms_packets_hold_three_decodable_frames() {
    let mut enc = SilkEncoder::new();
    let ctrl = encoder_control(24000, 24000, 60);

    let mut seed = 3u32;
    let mut payload = [0u8; MAX_PAYLOAD];
    let mut n_bytes = 0;
    for _ in 0..3 {
        let input = make_signal(480, 120, &mut seed);
        n_bytes = enc.encode(&ctrl, &input, &mut payload).unwrap();
    }
    assert!(n_bytes > 0);

    let toc = get_toc(&payload[..n_bytes]);
    assert!(!toc.corrupt);
    assert_eq!(toc.frames_in_packet, 3);
    assert_eq!(toc.fs_khz, 24);

    // three decode calls drain the packet
    let mut dec = SilkDecoder::new();
    let mut dctrl = DecControl::default();
    dctrl.api_sample_rate = 24000;
    let mut out = [0i16; 480];

    let n = dec
        .decode(&mut dctrl, false, &payload[..n_bytes], &mut out)
        .unwrap();
    assert_eq!(n, 480);
    assert!(dctrl.more_internal_decoder_frames);

    dec.decode(&mut dctrl, false, &payload[..n_bytes], &mut out)
        .unwrap();
    assert!(dctrl.more_internal_decoder_frames);

    dec.decode(&mut dctrl, false, &payload[..n_bytes], &mut out)
        .unwrap();
    assert!(!dctrl.more_internal_decoder_frames);
    assert_eq!(dctrl.frames_per_packet, 3);
}

#[test]
fn fractional_api_rate_is_resampled_both_ways() {
    let mut enc = SilkEncoder::new();
    let ctrl = encoder_control(44100, 16000, 20);

    let mut dec = SilkDecoder::new();
    let mut dctrl = DecControl::default();
    dctrl.api_sample_rate = 44100;

    let mut seed = 17u32;
    for _ in 0..10 {
        let input = make_signal(882, 200, &mut seed);
        let mut payload = [0u8; MAX_PAYLOAD];
        let n_bytes = enc.encode(&ctrl, &input, &mut payload).unwrap();
        assert!(n_bytes > 0);

        let mut out = [0i16; 900];
        let n = dec
            .decode(&mut dctrl, false, &payload[..n_bytes], &mut out)
            .unwrap();
        assert!(n > 0);
    }
}

#[test]
fn every_rate_and_packet_size_combination_round_trips() {
    let mut seed = 7u32;
    for api_hz in [8000i32, 12000, 16000, 24000, 32000, 44100, 48000] {
        for internal_hz in [8000i32, 12000, 16000, 24000] {
            for packet_ms in [20usize, 40, 60, 80, 100] {
                let mut enc = SilkEncoder::new();
                let ctrl = encoder_control(api_hz, internal_hz, packet_ms);

                let mut dec = SilkDecoder::new();
                let mut dctrl = DecControl::default();
                dctrl.api_sample_rate = api_hz;

                // one 20 ms frame of input per encode call
                let frame_len = api_hz as usize * 20 / 1000;
                let frames = packet_ms / 20;

                // two packets, so the second runs on warmed-up state
                for _ in 0..2 {
                    let mut payload = [0u8; MAX_PAYLOAD];
                    let mut n_bytes = 0;
                    for _ in 0..frames {
                        let input = make_signal(frame_len, frame_len / 4, &mut seed);
                        n_bytes = enc.encode(&ctrl, &input, &mut payload).unwrap();
                    }
                    assert!(n_bytes > 0, "{api_hz}/{internal_hz}/{packet_ms}ms");

                    let mut out = [0i16; 960];
                    let mut decoded = 0;
                    loop {
                        let n = dec
                            .decode(&mut dctrl, false, &payload[..n_bytes], &mut out)
                            .unwrap();
                        assert_eq!(n, frame_len, "{api_hz}/{internal_hz}/{packet_ms}ms");
                        decoded += 1;
                        if !dctrl.more_internal_decoder_frames {
                            break;
                        }
                    }
                    assert_eq!(decoded, frames, "{api_hz}/{internal_hz}/{packet_ms}ms");
                }
            }
        }
    }
}

#[test]
fn in_band_fec_recovers_a_lost_packet() {
    let mut enc = SilkEncoder::new();
    let mut ctrl = encoder_control(16000, 16000, 20);
    ctrl.bit_rate = 25000;
    ctrl.use_in_band_fec = true;
    ctrl.packet_loss_percentage = 20;

    let mut seed = 23u32;
    let mut payloads: Vec<Vec<u8>> = Vec::new();
    for _ in 0..20 {
        let input = make_signal(320, 80, &mut seed);
        let mut payload = [0u8; MAX_PAYLOAD];
        let n_bytes = enc.encode(&ctrl, &input, &mut payload).unwrap();
        payloads.push(payload[..n_bytes].to_vec());
    }

    // redundancy only starts once the ring has filled
    let carrying: Vec<usize> = (0..payloads.len())
        .filter(|&i| get_toc(&payloads[i]).inband_lbrr > 0)
        .collect();
    assert!(!carrying.is_empty(), "no packet carried redundancy");

    // a packet that carries version 1 redundancy covers its predecessor
    let i = *carrying.last().unwrap();
    let offset = get_toc(&payloads[i]).inband_lbrr;
    let lbrr = search_for_lbrr(&payloads[i], offset);
    assert!(!lbrr.is_empty());

    let mut dec = SilkDecoder::new();
    let mut dctrl = DecControl::default();
    dctrl.api_sample_rate = 16000;
    let mut out = [0i16; 320];
    let n = dec.decode(&mut dctrl, false, &lbrr, &mut out).unwrap();
    assert_eq!(n, 320);
}

#[test]
fn decoder_conceals_a_loss_and_recovers() {
    let mut enc = SilkEncoder::new();
    let ctrl = encoder_control(16000, 16000, 20);

    let mut dec = SilkDecoder::new();
    let mut dctrl = DecControl::default();
    dctrl.api_sample_rate = 16000;

    let mut seed = 31u32;
    let mut out = [0i16; 320];
    for round in 0..12 {
        let input = make_signal(320, 80, &mut seed);
        let mut payload = [0u8; MAX_PAYLOAD];
        let n_bytes = enc.encode(&ctrl, &input, &mut payload).unwrap();

        if round == 6 {
            // drop this packet on the floor
            let n = dec.decode(&mut dctrl, true, &[], &mut out).unwrap();
            assert_eq!(n, 320);
        } else {
            let n = dec
                .decode(&mut dctrl, false, &payload[..n_bytes], &mut out)
                .unwrap();
            assert_eq!(n, 320);
        }
    }
}

#[test]
fn dtx_goes_quiet_and_wakes_up_for_speech() {
    let mut enc = SilkEncoder::new();
    let mut ctrl = encoder_control(16000, 16000, 20);
    ctrl.use_dtx = true;

    let silence = vec![0i16; 320];
    let mut payload = [0u8; MAX_PAYLOAD];

    let mut quiet = 0;
    for _ in 0..15 {
        if enc.encode(&ctrl, &silence, &mut payload).unwrap() == 0 {
            quiet += 1;
        }
    }
    assert!(quiet > 0, "DTX never engaged");

    // speech restarts transmission immediately
    let mut seed = 41u32;
    let mut woke = false;
    for _ in 0..3 {
        let input = make_signal(320, 80, &mut seed);
        if enc.encode(&ctrl, &input, &mut payload).unwrap() > 0 {
            woke = true;
        }
    }
    assert!(woke, "DTX did not release on speech");
}

#[test]
fn encoder_survives_a_rate_change_between_packets() {
    let mut enc = SilkEncoder::new();
    let mut seed = 19u32;
    let mut payload = [0u8; MAX_PAYLOAD];

    let ctrl = encoder_control(24000, 24000, 20);
    for _ in 0..3 {
        let input = make_signal(480, 120, &mut seed);
        assert!(enc.encode(&ctrl, &input, &mut payload).unwrap() > 0);
    }

    // drop the API rate; the encoder reconfigures itself
    let ctrl = encoder_control(8000, 8000, 20);
    let mut toc_fs = 0;
    for _ in 0..3 {
        let input = make_signal(160, 40, &mut seed);
        let n_bytes = enc.encode(&ctrl, &input, &mut payload).unwrap();
        assert!(n_bytes > 0);
        toc_fs = get_toc(&payload[..n_bytes]).fs_khz;
    }
    assert_eq!(toc_fs, 8);
}

#[test]
fn a_fresh_encoder_is_deterministic() {
    let ctrl = encoder_control(16000, 16000, 20);
    let mut seed = 77u32;
    let input = make_signal(320, 80, &mut seed);

    let mut first = Vec::new();
    let mut second = Vec::new();
    for out in [&mut first, &mut second] {
        let mut enc = SilkEncoder::new();
        let mut payload = [0u8; MAX_PAYLOAD];
        let n_bytes = enc.encode(&ctrl, &input, &mut payload).unwrap();
        out.extend_from_slice(&payload[..n_bytes]);
    }
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn invalid_settings_are_rejected_without_touching_state() {
    let mut enc = SilkEncoder::new();
    let mut payload = [0u8; MAX_PAYLOAD];

    let mut ctrl = encoder_control(16000, 16000, 20);
    ctrl.complexity = 9;
    let input = vec![0i16; 320];
    assert_eq!(
        enc.encode(&ctrl, &input, &mut payload),
        Err(SilkError::EncInvalidComplexitySetting)
    );

    // a 30 ms packet size is not a legal framing
    let mut ctrl = encoder_control(16000, 16000, 30);
    ctrl.complexity = 2;
    assert_eq!(
        enc.encode(&ctrl, &input, &mut payload),
        Err(SilkError::EncPacketSizeNotSupported)
    );

    // the encoder still works afterwards
    let ctrl = encoder_control(16000, 16000, 20);
    let mut seed = 2u32;
    let speech = make_signal(320, 80, &mut seed);
    assert!(enc.encode(&ctrl, &speech, &mut payload).unwrap() > 0);
}
