//! Fractional upsampler: 2x all-pass upsampling followed by FIR
//! interpolation over 144 phases.

use crate::math::{rshift_round, sat16, smlabb, smulbb, smulwb};
use crate::resampler::{ResamplerState, RESAMPLER_MAX_BATCH_SIZE_IN};
use crate::resampler_private_up2_hq::resampler_private_up2_hq;
use crate::resampler_rom::{RESAMPLER_FRAC_FIR_144, RESAMPLER_ORDER_FIR_144};

fn interpol(
    output: &mut [i16],
    buf: &[i16],
    max_index_q16: i32,
    index_increment_q16: i32,
) -> usize {
    let mut n_out = 0;
    let mut index_q16 = 0;
    while index_q16 < max_index_q16 {
        let table_index = smulwb(index_q16 & 0xffff, 144) as usize;
        let b = &buf[(index_q16 >> 16) as usize..];

        let head = &RESAMPLER_FRAC_FIR_144[table_index];
        let tail = &RESAMPLER_FRAC_FIR_144[143 - table_index];
        let mut res_q15 = smulbb(i32::from(b[0]), i32::from(head[0]));
        res_q15 = smlabb(res_q15, i32::from(b[1]), i32::from(head[1]));
        res_q15 = smlabb(res_q15, i32::from(b[2]), i32::from(head[2]));
        res_q15 = smlabb(res_q15, i32::from(b[3]), i32::from(tail[2]));
        res_q15 = smlabb(res_q15, i32::from(b[4]), i32::from(tail[1]));
        res_q15 = smlabb(res_q15, i32::from(b[5]), i32::from(tail[0]));

        output[n_out] = sat16(rshift_round(res_q15, 15));
        n_out += 1;
        index_q16 += index_increment_q16;
    }
    n_out
}

/// Runs the upsampling chain over `input`, returning the number of
/// output samples written.
pub fn resampler_private_iir_fir(
    state: &mut ResamplerState,
    output: &mut [i16],
    input: &[i16],
) -> usize {
    let mut buf = [0i16; 2 * RESAMPLER_MAX_BATCH_SIZE_IN + RESAMPLER_ORDER_FIR_144];
    buf[..RESAMPLER_ORDER_FIR_144].copy_from_slice(&state.s_fir_144);

    let index_increment_q16 = state.inv_ratio_q16;

    let mut in_index = 0;
    let mut n_out = 0;
    let mut remaining = input.len();
    loop {
        let n_samples_in = remaining.min(state.batch_size);

        resampler_private_up2_hq(
            &mut state.s_iir,
            &mut buf[RESAMPLER_ORDER_FIR_144..RESAMPLER_ORDER_FIR_144 + 2 * n_samples_in],
            &input[in_index..in_index + n_samples_in],
        );

        let max_index_q16 = (n_samples_in as i32) << 17;
        n_out += interpol(&mut output[n_out..], &buf, max_index_q16, index_increment_q16);

        in_index += n_samples_in;
        remaining -= n_samples_in;

        let tail = 2 * n_samples_in;
        if remaining > 0 {
            buf.copy_within(tail..tail + RESAMPLER_ORDER_FIR_144, 0);
        } else {
            state
                .s_fir_144
                .copy_from_slice(&buf[tail..tail + RESAMPLER_ORDER_FIR_144]);
            break;
        }
    }

    n_out
}
