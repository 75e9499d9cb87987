//! Fractional downsampler: optional 2x pre-decimation, a second order
//! AR filter, then polyphase FIR interpolation of the Q8 output.

use crate::math::{rshift_round, sat16, smlawb, smulwb};
use crate::resampler::{ResamplerState, RESAMPLER_MAX_BATCH_SIZE_IN};
use crate::resampler_down2::resampler_down2;
use crate::resampler_private_ar2::resampler_private_ar2;
use crate::resampler_rom::RESAMPLER_DOWN_ORDER_FIR;

/// Symmetric 12 tap interpolation for integer decimation ratios.
fn interpol_sym(
    output: &mut [i16],
    buf_q8: &[i32],
    fir_coefs: &[i16],
    max_index_q16: i32,
    index_increment_q16: i32,
) -> usize {
    let mut n_out = 0;
    let mut index_q16 = 0;
    while index_q16 < max_index_q16 {
        let b = &buf_q8[(index_q16 >> 16) as usize..];

        let mut res_q6 = smulwb(b[0] + b[11], i32::from(fir_coefs[0]));
        res_q6 = smlawb(res_q6, b[1] + b[10], i32::from(fir_coefs[1]));
        res_q6 = smlawb(res_q6, b[2] + b[9], i32::from(fir_coefs[2]));
        res_q6 = smlawb(res_q6, b[3] + b[8], i32::from(fir_coefs[3]));
        res_q6 = smlawb(res_q6, b[4] + b[7], i32::from(fir_coefs[4]));
        res_q6 = smlawb(res_q6, b[5] + b[6], i32::from(fir_coefs[5]));

        output[n_out] = sat16(rshift_round(res_q6, 6));
        n_out += 1;
        index_q16 += index_increment_q16;
    }
    n_out
}

/// Phase-interpolated 12 tap filter for rational ratios like 3:4, with
/// the fractional sample position selecting between `fir_fracs` phases.
fn interpol_frac(
    output: &mut [i16],
    buf_q8: &[i32],
    fir_coefs: &[i16],
    max_index_q16: i32,
    index_increment_q16: i32,
    fir_fracs: i32,
) -> usize {
    const HALF: usize = RESAMPLER_DOWN_ORDER_FIR / 2;

    let mut n_out = 0;
    let mut index_q16 = 0;
    while index_q16 < max_index_q16 {
        let b = &buf_q8[(index_q16 >> 16) as usize..];
        let interpol_ind = smulwb(index_q16 & 0xffff, fir_fracs) as usize;

        let phase = &fir_coefs[HALF * interpol_ind..];
        let mut res_q6 = smulwb(b[0], i32::from(phase[0]));
        res_q6 = smlawb(res_q6, b[1], i32::from(phase[1]));
        res_q6 = smlawb(res_q6, b[2], i32::from(phase[2]));
        res_q6 = smlawb(res_q6, b[3], i32::from(phase[3]));
        res_q6 = smlawb(res_q6, b[4], i32::from(phase[4]));
        res_q6 = smlawb(res_q6, b[5], i32::from(phase[5]));

        let phase = &fir_coefs[HALF * (fir_fracs as usize - 1 - interpol_ind)..];
        res_q6 = smlawb(res_q6, b[11], i32::from(phase[0]));
        res_q6 = smlawb(res_q6, b[10], i32::from(phase[1]));
        res_q6 = smlawb(res_q6, b[9], i32::from(phase[2]));
        res_q6 = smlawb(res_q6, b[8], i32::from(phase[3]));
        res_q6 = smlawb(res_q6, b[7], i32::from(phase[4]));
        res_q6 = smlawb(res_q6, b[6], i32::from(phase[5]));

        output[n_out] = sat16(rshift_round(res_q6, 6));
        n_out += 1;
        index_q16 += index_increment_q16;
    }
    n_out
}

/// Runs the downsampling chain over `input`, returning the number of
/// output samples written.
pub fn resampler_private_down_fir(
    state: &mut ResamplerState,
    output: &mut [i16],
    input: &[i16],
) -> usize {
    let mut buf1 = [0i16; RESAMPLER_MAX_BATCH_SIZE_IN / 2];
    let mut buf2 = [0i32; RESAMPLER_MAX_BATCH_SIZE_IN + RESAMPLER_DOWN_ORDER_FIR];

    buf2[..RESAMPLER_DOWN_ORDER_FIR].copy_from_slice(&state.s_fir_q8);

    let fir_coefs = &state.coefs[2..];
    let ar_coefs = [state.coefs[0], state.coefs[1]];
    let index_increment_q16 = state.inv_ratio_q16;
    let shift = usize::from(state.input2x);

    let mut in_index = 0;
    let mut n_out = 0;
    let mut remaining = input.len();
    loop {
        let mut n_samples_in = remaining.min(state.batch_size);

        if state.input2x {
            // halve the rate first, then shape with the AR section
            resampler_down2(
                &mut state.s_down2,
                &mut buf1[..n_samples_in / 2],
                &input[in_index..in_index + n_samples_in],
            );
            n_samples_in >>= 1;
            resampler_private_ar2(
                &mut state.s_ar,
                &mut buf2[RESAMPLER_DOWN_ORDER_FIR..RESAMPLER_DOWN_ORDER_FIR + n_samples_in],
                &buf1[..n_samples_in],
                &ar_coefs,
            );
        } else {
            resampler_private_ar2(
                &mut state.s_ar,
                &mut buf2[RESAMPLER_DOWN_ORDER_FIR..RESAMPLER_DOWN_ORDER_FIR + n_samples_in],
                &input[in_index..in_index + n_samples_in],
                &ar_coefs,
            );
        }

        let max_index_q16 = (n_samples_in as i32) << 16;
        if state.fir_fracs == 1 {
            n_out += interpol_sym(
                &mut output[n_out..],
                &buf2,
                fir_coefs,
                max_index_q16,
                index_increment_q16,
            );
        } else {
            n_out += interpol_frac(
                &mut output[n_out..],
                &buf2,
                fir_coefs,
                max_index_q16,
                index_increment_q16,
                state.fir_fracs,
            );
        }

        in_index += n_samples_in << shift;
        remaining -= n_samples_in << shift;

        if remaining > shift {
            buf2.copy_within(n_samples_in..n_samples_in + RESAMPLER_DOWN_ORDER_FIR, 0);
        } else {
            state
                .s_fir_q8
                .copy_from_slice(&buf2[n_samples_in..n_samples_in + RESAMPLER_DOWN_ORDER_FIR]);
            break;
        }
    }

    n_out
}
