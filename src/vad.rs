//! Voice activity detection over a four band filterbank, with a
//! per-band noise floor tracker and an SNR-driven sigmoid.

use crate::ana_filt_bank_1::ana_filt_bank_1;
use crate::common::{MAX_FRAME_LENGTH, VAD_N_BANDS};
use crate::lin2log::lin2log;
use crate::math::{add_pos_sat32, smlabb, smlawb, smulwb, smulww, sqrt_approx};
use crate::sigm_q15::sigm_q15;

const VAD_INTERNAL_SUBFRAMES_LOG2: usize = 2;
const VAD_INTERNAL_SUBFRAMES: usize = 1 << VAD_INTERNAL_SUBFRAMES_LOG2;

const VAD_NOISE_LEVEL_SMOOTH_COEF_Q16: i32 = 1024;
const VAD_NOISE_LEVELS_BIAS: i32 = 50;
const VAD_NEGATIVE_OFFSET_Q5: i32 = 128;
const VAD_SNR_FACTOR_Q16: i32 = 45000;
const VAD_SNR_SMOOTH_COEF_Q18: i32 = 4096;

const TILT_WEIGHTS: [i32; VAD_N_BANDS] = [30000, 6000, -12000, -12000];

/// Noise tracker and filterbank memory.
pub struct VadState {
    ana_state: [i32; 2],
    ana_state1: [i32; 2],
    ana_state2: [i32; 2],
    xnrg_subfr: [i32; VAD_N_BANDS],
    nrg_ratio_smth_q8: [i32; VAD_N_BANDS],
    hp_state: i16,
    nl: [i32; VAD_N_BANDS],
    inv_nl: [i32; VAD_N_BANDS],
    noise_level_bias: [i32; VAD_N_BANDS],
    counter: i32,
}

impl Default for VadState {
    fn default() -> Self {
        let mut vad = VadState {
            ana_state: [0; 2],
            ana_state1: [0; 2],
            ana_state2: [0; 2],
            xnrg_subfr: [0; VAD_N_BANDS],
            nrg_ratio_smth_q8: [100 * 256; VAD_N_BANDS],
            hp_state: 0,
            nl: [0; VAD_N_BANDS],
            inv_nl: [0; VAD_N_BANDS],
            noise_level_bias: [0; VAD_N_BANDS],
            counter: 15,
        };
        // pink noise floor, energy inversely proportional to frequency
        for b in 0..VAD_N_BANDS {
            vad.noise_level_bias[b] = (VAD_NOISE_LEVELS_BIAS / (b as i32 + 1)).max(1);
            vad.nl[b] = 100 * vad.noise_level_bias[b];
            vad.inv_nl[b] = i32::MAX / vad.nl[b];
        }
        vad
    }
}

/// Per-frame VAD measurements consumed by noise shaping and DTX.
pub struct VadResult {
    pub sa_q8: i32,
    pub snr_db_q7: i32,
    pub quality_q15: [i32; VAD_N_BANDS],
    pub tilt_q15: i32,
}

fn get_noise_levels(xnrg: &[i32; VAD_N_BANDS], vad: &mut VadState) {
    // faster adaptation during the first 20 seconds
    let min_coef = if vad.counter < 1000 {
        i32::from(i16::MAX) / ((vad.counter >> 4) + 1)
    } else {
        0
    };

    for k in 0..VAD_N_BANDS {
        let nl = vad.nl[k];
        let nrg = add_pos_sat32(xnrg[k], vad.noise_level_bias[k]);
        let inv_nrg = i32::MAX / nrg;

        // slower updates when the band is much louder than the floor
        let coef = if nrg > nl << 3 {
            VAD_NOISE_LEVEL_SMOOTH_COEF_Q16 >> 3
        } else if nrg < nl {
            VAD_NOISE_LEVEL_SMOOTH_COEF_Q16
        } else {
            smulwb(smulww(inv_nrg, nl), VAD_NOISE_LEVEL_SMOOTH_COEF_Q16 << 1)
        };
        let coef = coef.max(min_coef);

        vad.inv_nl[k] = smlawb(vad.inv_nl[k], inv_nrg - vad.inv_nl[k], coef);
        vad.nl[k] = (i32::MAX / vad.inv_nl[k]).min(0x00ff_ffff);
    }

    vad.counter += 1;
}

/// Measures the speech activity of `input`, a whole 20 ms frame at
/// 8 to 24 kHz.
pub fn vad_get_sa_q8(vad: &mut VadState, input: &[i16]) -> VadResult {
    let frame_length = input.len();
    debug_assert!(frame_length <= MAX_FRAME_LENGTH && frame_length % 8 == 0);

    let mut x = [[0i16; MAX_FRAME_LENGTH / 2]; VAD_N_BANDS];
    let mut tmp = [0i16; MAX_FRAME_LENGTH / 2];

    // split 0..fs/2 into 0..fs/4 and fs/4..fs/2, then keep halving the
    // low band
    {
        let (x0, rest) = x.split_at_mut(1);
        ana_filt_bank_1(
            input,
            &mut vad.ana_state,
            &mut x0[0][..frame_length / 2],
            &mut rest[2][..frame_length / 2],
        );
        tmp[..frame_length / 2].copy_from_slice(&x0[0][..frame_length / 2]);
        ana_filt_bank_1(
            &tmp[..frame_length / 2],
            &mut vad.ana_state1,
            &mut x0[0][..frame_length / 4],
            &mut rest[1][..frame_length / 4],
        );
        tmp[..frame_length / 4].copy_from_slice(&x0[0][..frame_length / 4]);
        ana_filt_bank_1(
            &tmp[..frame_length / 4],
            &mut vad.ana_state2,
            &mut x0[0][..frame_length / 8],
            &mut rest[0][..frame_length / 8],
        );
    }

    // differentiate the lowest band to reject DC
    let decimated = frame_length >> 3;
    x[0][decimated - 1] >>= 1;
    let hp_state_tmp = x[0][decimated - 1];
    for i in (1..decimated).rev() {
        x[0][i - 1] >>= 1;
        x[0][i] -= x[0][i - 1];
    }
    x[0][0] -= vad.hp_state;
    vad.hp_state = hp_state_tmp;

    // energy per band, reusing the lookahead subframe of the last call
    let mut xnrg = [0i32; VAD_N_BANDS];
    for b in 0..VAD_N_BANDS {
        let decimated = frame_length >> (VAD_N_BANDS - b).min(VAD_N_BANDS - 1);
        let dec_subframe_length = decimated >> VAD_INTERNAL_SUBFRAMES_LOG2;
        let mut offset = 0;

        xnrg[b] = vad.xnrg_subfr[b];
        let mut sum_squared = 0;
        for s in 0..VAD_INTERNAL_SUBFRAMES {
            sum_squared = 0;
            for i in 0..dec_subframe_length {
                let x_tmp = i32::from(x[b][i + offset]) >> 3;
                sum_squared = smlabb(sum_squared, x_tmp, x_tmp);
            }
            if s < VAD_INTERNAL_SUBFRAMES - 1 {
                xnrg[b] = add_pos_sat32(xnrg[b], sum_squared);
            } else {
                // lookahead subframe counts half now, half next frame
                xnrg[b] = add_pos_sat32(xnrg[b], sum_squared >> 1);
            }
            offset += dec_subframe_length;
        }
        vad.xnrg_subfr[b] = sum_squared;
    }

    get_noise_levels(&xnrg, vad);

    // per-band SNR, plus a spectral tilt estimate
    let mut sum_squared = 0;
    let mut input_tilt = 0;
    let mut nrg_to_noise_ratio_q8 = [256i32; VAD_N_BANDS];
    for b in 0..VAD_N_BANDS {
        let speech_nrg = xnrg[b] - vad.nl[b];
        if speech_nrg > 0 {
            nrg_to_noise_ratio_q8[b] = if xnrg[b] & 0xff80_0000u32 as i32 == 0 {
                (xnrg[b] << 8) / (vad.nl[b] + 1)
            } else {
                xnrg[b] / ((vad.nl[b] >> 8) + 1)
            };

            let mut snr_q7 = lin2log(nrg_to_noise_ratio_q8[b]) - 8 * 128;
            sum_squared = smlabb(sum_squared, snr_q7, snr_q7);

            if speech_nrg < 1 << 20 {
                // discount quiet bands in the tilt measure
                snr_q7 = smulwb(sqrt_approx(speech_nrg) << 6, snr_q7);
            }
            input_tilt = smlawb(input_tilt, TILT_WEIGHTS[b], snr_q7);
        }
    }

    let sum_squared = sum_squared / VAD_N_BANDS as i32;
    let snr_db_q7 = 3 * sqrt_approx(sum_squared);

    let mut sa_q15 = sigm_q15(smulwb(VAD_SNR_FACTOR_Q16, snr_db_q7) - VAD_NEGATIVE_OFFSET_Q5);
    let tilt_q15 = (sigm_q15(input_tilt) - 16384) << 1;

    // scale back the sigmoid when there is little absolute energy
    let mut speech_nrg = 0;
    for b in 0..VAD_N_BANDS {
        speech_nrg += (b as i32 + 1) * ((xnrg[b] - vad.nl[b]) >> 4);
    }
    if speech_nrg <= 0 {
        sa_q15 >>= 1;
    } else if speech_nrg < 32768 {
        let speech_nrg = sqrt_approx(speech_nrg << 15);
        sa_q15 = smulwb(32768 + speech_nrg, sa_q15);
    }

    let sa_q8 = (sa_q15 >> 7).min(255);

    // smoothed per-band quality for the noise shaper
    let smooth_coef_q16 = smulwb(VAD_SNR_SMOOTH_COEF_Q18, smulwb(sa_q15, sa_q15));
    let mut quality_q15 = [0i32; VAD_N_BANDS];
    for b in 0..VAD_N_BANDS {
        vad.nrg_ratio_smth_q8[b] = smlawb(
            vad.nrg_ratio_smth_q8[b],
            nrg_to_noise_ratio_q8[b] - vad.nrg_ratio_smth_q8[b],
            smooth_coef_q16,
        );
        let snr_q7 = 3 * (lin2log(vad.nrg_ratio_smth_q8[b]) - 8 * 128);
        quality_q15[b] = sigm_q15((snr_q7 - 16 * 128) >> 4);
    }

    VadResult {
        sa_q8,
        snr_db_q7,
        quality_q15,
        tilt_q15,
    }
}

#[cfg(test)]
mod tests {
    use super::{vad_get_sa_q8, VadState};
    use alloc::vec::Vec;

    fn noise_frame(len: usize, amp: i32, seed: &mut u32) -> Vec<i16> {
        (0..len)
            .map(|_| {
                *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
                ((*seed >> 20) as i32 % (2 * amp) - amp) as i16
            })
            .collect()
    }

    #[test]
    fn silence_scores_as_inactive() {
        let mut vad = VadState::default();
        let frame = [0i16; 320];
        let mut last = 0;
        for _ in 0..5 {
            last = vad_get_sa_q8(&mut vad, &frame).sa_q8;
        }
        assert!(last < 64, "silence scored {}", last);
    }

    #[test]
    fn a_loud_onset_after_quiet_background_scores_as_active() {
        let mut vad = VadState::default();
        let mut seed = 1u32;

        // let the noise floor settle on low-level noise
        for _ in 0..50 {
            let frame = noise_frame(320, 20, &mut seed);
            vad_get_sa_q8(&mut vad, &frame);
        }
        let quiet = vad_get_sa_q8(&mut vad, &noise_frame(320, 20, &mut seed)).sa_q8;

        // a strong tone burst
        let loud: Vec<i16> = (0..320)
            .map(|i| (libm::sin(2.0 * core::f64::consts::PI * 330.0 / 16000.0 * i as f64) * 9000.0) as i16)
            .collect();
        let active = vad_get_sa_q8(&mut vad, &loud).sa_q8;

        assert!(active > quiet, "active {} vs quiet {}", active, quiet);
        assert!(active > 128, "active score too low: {}", active);
    }
}
