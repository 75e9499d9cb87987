//! Sampling rate converter between the API rate and the internal rate.
//!
//! Equal rates copy, exact 2x upsampling runs the high quality
//! all-pass pair directly, any other upsampling (and non-tabulated
//! downsampling ratios such as the 44.1 kHz family) goes through 2x
//! upsampling plus 144-phase FIR interpolation, and the tabulated
//! downsampling ratios run an AR-shaped polyphase FIR, with a 2x
//! pre-decimator for ratios of 1:4 and steeper.

use crate::errors::SilkError;
use crate::math::smulww;
use crate::resampler_private_down_fir::resampler_private_down_fir;
use crate::resampler_private_iir_fir::resampler_private_iir_fir;
use crate::resampler_private_up2_hq::resampler_private_up2_hq;
use crate::resampler_rom::{
    RESAMPLER_1_2_COEFS, RESAMPLER_1_3_COEFS, RESAMPLER_2_3_COEFS, RESAMPLER_3_4_COEFS,
    RESAMPLER_3_8_COEFS, RESAMPLER_DOWN_ORDER_FIR, RESAMPLER_ORDER_FIR_144,
};

/// Input samples processed per batch, bounding the stack buffers of
/// the private kernels.
pub(crate) const RESAMPLER_MAX_BATCH_SIZE_IN: usize = 480;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResamplerKernel {
    Copy,
    Up2Hq,
    IirFir,
    DownFir,
}

/// State for one direction of rate conversion.
#[derive(Clone)]
pub struct ResamplerState {
    pub(crate) s_iir: [i32; 6],
    pub(crate) s_ar: [i32; 2],
    pub(crate) s_down2: [i32; 2],
    pub(crate) s_fir_q8: [i32; RESAMPLER_DOWN_ORDER_FIR],
    pub(crate) s_fir_144: [i16; RESAMPLER_ORDER_FIR_144],
    pub(crate) batch_size: usize,
    pub(crate) inv_ratio_q16: i32,
    pub(crate) fir_fracs: i32,
    pub(crate) input2x: bool,
    pub(crate) coefs: &'static [i16],
    pub(crate) kernel: ResamplerKernel,
}

impl Default for ResamplerState {
    fn default() -> Self {
        Self {
            s_iir: [0; 6],
            s_ar: [0; 2],
            s_down2: [0; 2],
            s_fir_q8: [0; RESAMPLER_DOWN_ORDER_FIR],
            s_fir_144: [0; RESAMPLER_ORDER_FIR_144],
            batch_size: 0,
            inv_ratio_q16: 0,
            fir_fracs: 1,
            input2x: false,
            coefs: &[],
            kernel: ResamplerKernel::Copy,
        }
    }
}

fn gcd(mut a: i32, mut b: i32) -> i32 {
    while b > 0 {
        let tmp = a % b;
        a = b;
        b = tmp;
    }
    a
}

/// Resets `state` for a conversion from `fs_hz_in` to `fs_hz_out`.
pub fn resampler_init(
    state: &mut ResamplerState,
    fs_hz_in: i32,
    fs_hz_out: i32,
) -> Result<(), SilkError> {
    if fs_hz_in < 8000 || fs_hz_in > 48000 || fs_hz_out < 8000 || fs_hz_out > 48000 {
        return Err(SilkError::EncFsNotSupported);
    }

    *state = ResamplerState::default();

    // batches of 10 ms, or a whole number of conversion cycles when
    // 10 ms is not a whole number of input samples
    state.batch_size = (fs_hz_in / 100) as usize;
    if fs_hz_in % 100 != 0 {
        let cycle_len = fs_hz_in / gcd(fs_hz_in, fs_hz_out);
        let cycles_per_batch = RESAMPLER_MAX_BATCH_SIZE_IN as i32 / cycle_len;
        if cycles_per_batch == 0 {
            state.batch_size = RESAMPLER_MAX_BATCH_SIZE_IN;
        } else {
            state.batch_size = (cycles_per_batch * cycle_len) as usize;
        }
    }

    let mut up2 = 0;
    let mut down2 = 0;
    if fs_hz_out > fs_hz_in {
        if fs_hz_out == 2 * fs_hz_in {
            state.kernel = ResamplerKernel::Up2Hq;
        } else {
            state.kernel = ResamplerKernel::IirFir;
            up2 = 1;
        }
    } else if fs_hz_out < fs_hz_in {
        state.kernel = ResamplerKernel::DownFir;
        if 4 * fs_hz_out == 3 * fs_hz_in {
            state.fir_fracs = 3;
            state.coefs = &RESAMPLER_3_4_COEFS;
        } else if 3 * fs_hz_out == 2 * fs_hz_in {
            state.fir_fracs = 2;
            state.coefs = &RESAMPLER_2_3_COEFS;
        } else if 2 * fs_hz_out == fs_hz_in {
            state.fir_fracs = 1;
            state.coefs = &RESAMPLER_1_2_COEFS;
        } else if 8 * fs_hz_out == 3 * fs_hz_in {
            state.fir_fracs = 3;
            state.coefs = &RESAMPLER_3_8_COEFS;
        } else if 3 * fs_hz_out == fs_hz_in {
            state.fir_fracs = 1;
            state.coefs = &RESAMPLER_1_3_COEFS;
        } else if 4 * fs_hz_out == fs_hz_in {
            state.fir_fracs = 1;
            state.coefs = &RESAMPLER_1_2_COEFS;
            down2 = 1;
        } else if 6 * fs_hz_out == fs_hz_in {
            state.fir_fracs = 1;
            state.coefs = &RESAMPLER_1_3_COEFS;
            down2 = 1;
        } else {
            // no tabulated phase set; upsample 2x and interpolate down
            state.kernel = ResamplerKernel::IirFir;
            up2 = 1;
        }
    } else {
        state.kernel = ResamplerKernel::Copy;
    }

    state.input2x = (up2 | down2) == 1;

    // Q16 input/output ratio, rounded up so a whole batch of input
    // never produces one output sample too many
    state.inv_ratio_q16 = (((fs_hz_in << (14 + up2 - down2)) / fs_hz_out) << 2).max(1);
    while smulww(state.inv_ratio_q16, fs_hz_out << down2) < (fs_hz_in << up2) {
        state.inv_ratio_q16 += 1;
    }

    log::debug!(
        "resampler {} Hz -> {} Hz, kernel {:?}",
        fs_hz_in,
        fs_hz_out,
        state.kernel
    );

    Ok(())
}

/// Converts `input` into `output`, returning the number of output
/// samples written. `output` must be large enough for the configured
/// rate ratio.
pub fn resampler(state: &mut ResamplerState, output: &mut [i16], input: &[i16]) -> usize {
    debug_assert!(state.batch_size > 0);

    match state.kernel {
        ResamplerKernel::Copy => {
            output[..input.len()].copy_from_slice(input);
            input.len()
        }
        ResamplerKernel::Up2Hq => {
            resampler_private_up2_hq(&mut state.s_iir, &mut output[..2 * input.len()], input);
            2 * input.len()
        }
        ResamplerKernel::IirFir => resampler_private_iir_fir(state, output, input),
        ResamplerKernel::DownFir => resampler_private_down_fir(state, output, input),
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{resampler, resampler_init, ResamplerKernel, ResamplerState};

    fn tone(len: usize, step: f64, amp: f64) -> Vec<i16> {
        (0..len).map(|i| (libm::sin(step * i as f64) * amp) as i16).collect()
    }

    #[test]
    fn rejects_rates_outside_the_supported_range() {
        let mut state = ResamplerState::default();
        assert!(resampler_init(&mut state, 7000, 8000).is_err());
        assert!(resampler_init(&mut state, 16000, 96000).is_err());
    }

    #[test]
    fn picks_the_expected_kernel_per_ratio() {
        let mut state = ResamplerState::default();

        resampler_init(&mut state, 16000, 16000).unwrap();
        assert_eq!(state.kernel, ResamplerKernel::Copy);

        resampler_init(&mut state, 8000, 16000).unwrap();
        assert_eq!(state.kernel, ResamplerKernel::Up2Hq);

        resampler_init(&mut state, 8000, 24000).unwrap();
        assert_eq!(state.kernel, ResamplerKernel::IirFir);

        resampler_init(&mut state, 24000, 16000).unwrap();
        assert_eq!(state.kernel, ResamplerKernel::DownFir);
        assert_eq!(state.fir_fracs, 2);

        resampler_init(&mut state, 48000, 8000).unwrap();
        assert_eq!(state.kernel, ResamplerKernel::DownFir);
        assert!(state.input2x);

        // 44.1 kHz has no tabulated phases and takes the fractional path
        resampler_init(&mut state, 44100, 16000).unwrap();
        assert_eq!(state.kernel, ResamplerKernel::IirFir);
    }

    #[test]
    fn sample_counts_match_the_rate_ratio() {
        let cases = [
            (8000, 24000, 3.0),
            (12000, 48000, 4.0),
            (16000, 8000, 0.5),
            (24000, 8000, 1.0 / 3.0),
            (48000, 12000, 0.25),
            (16000, 12000, 0.75),
        ];
        for &(fs_in, fs_out, ratio) in &cases {
            let mut state = ResamplerState::default();
            resampler_init(&mut state, fs_in, fs_out).unwrap();

            // 20 ms of input
            let input = tone(fs_in as usize / 50, 0.03, 8000.0);
            let mut output = vec![0i16; 6 * input.len() + 16];
            let produced = resampler(&mut state, &mut output, &input);
            let expected = (input.len() as f64 * ratio) as usize;
            assert!(
                produced.abs_diff(expected) <= 1,
                "{} -> {}: produced {}, expected {}",
                fs_in,
                fs_out,
                produced,
                expected
            );
        }
    }

    #[test]
    fn downsampling_preserves_a_low_frequency_tone() {
        let mut state = ResamplerState::default();
        resampler_init(&mut state, 16000, 8000).unwrap();

        // 250 Hz at 16 kHz, three frames to get past the transient
        let input = tone(960, 2.0 * core::f64::consts::PI * 250.0 / 16000.0, 10000.0);
        let mut output = vec![0i16; 480];
        let produced = resampler(&mut state, &mut output, &input);
        assert_eq!(produced, 480);

        let energy: i64 = output[240..480].iter().map(|&s| i64::from(s) * i64::from(s)).sum();
        let reference: i64 = input[480..960].iter().map(|&s| i64::from(s) * i64::from(s)).sum();
        // same tone, half the samples
        let db_diff = libm::log10(energy as f64 / (reference as f64 / 2.0)) * 10.0;
        assert!(db_diff.abs() < 1.0, "energy drift {} dB", db_diff);
    }

    #[test]
    fn state_carries_across_calls() {
        let input = tone(640, 0.05, 9000.0);

        let mut state = ResamplerState::default();
        resampler_init(&mut state, 16000, 24000).unwrap();
        let mut whole = vec![0i16; 960];
        let n_whole = resampler(&mut state, &mut whole, &input);

        let mut state = ResamplerState::default();
        resampler_init(&mut state, 16000, 24000).unwrap();
        let mut split = vec![0i16; 960];
        let n0 = resampler(&mut state, &mut split, &input[..320]);
        let n1 = resampler(&mut state, &mut split[n0..], &input[320..]);

        assert_eq!(n_whole, n0 + n1);
        assert_eq!(whole[..n_whole], split[..n_whole]);
    }
}
