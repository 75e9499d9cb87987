//! Downsample by a factor 2/3, low quality.

use alloc::vec;

use crate::math::{rshift_round, sat16, smlawb, smulwb};
use crate::resampler_private_ar2::resampler_private_ar2;
use crate::resampler_rom::RESAMPLER_2_3_COEFS_LQ;

const ORDER_FIR: usize = 4;
const MAX_BATCH_SIZE_IN: usize = 480;

/// Decimates `input` by 2/3 with a shared AR section and a short
/// interpolating FIR, producing two output samples per three input
/// samples. `state` holds four Q8 FIR taps followed by the two AR
/// elements. Returns the number of samples written.
pub fn resampler_down2_3(state: &mut [i32; ORDER_FIR + 2], output: &mut [i16], input: &[i16]) -> usize {
    debug_assert!(output.len() >= 2 * input.len() / 3);

    let (fir_state, ar_state) = state.split_at_mut(ORDER_FIR);
    let ar_state: &mut [i32; 2] = ar_state.try_into().unwrap();
    let ar_coefs = [RESAMPLER_2_3_COEFS_LQ[0], RESAMPLER_2_3_COEFS_LQ[1]];
    let fir0 = i32::from(RESAMPLER_2_3_COEFS_LQ[2]);
    let fir1 = i32::from(RESAMPLER_2_3_COEFS_LQ[3]);
    let fir2 = i32::from(RESAMPLER_2_3_COEFS_LQ[4]);
    let fir3 = i32::from(RESAMPLER_2_3_COEFS_LQ[5]);

    let mut buf = vec![0i32; MAX_BATCH_SIZE_IN + ORDER_FIR];
    buf[..ORDER_FIR].copy_from_slice(fir_state);

    let mut produced = 0;
    let mut processed = 0;
    let mut block_len = 0;
    while processed < input.len() {
        block_len = (input.len() - processed).min(MAX_BATCH_SIZE_IN);

        resampler_private_ar2(
            ar_state,
            &mut buf[ORDER_FIR..ORDER_FIR + block_len],
            &input[processed..processed + block_len],
            &ar_coefs,
        );

        let mut ix = 0;
        let mut counter = block_len;
        while counter > 2 {
            let mut res_q6 = smulwb(buf[ix], fir0);
            res_q6 = smlawb(res_q6, buf[ix + 1], fir1);
            res_q6 = smlawb(res_q6, buf[ix + 2], fir3);
            res_q6 = smlawb(res_q6, buf[ix + 3], fir2);
            output[produced] = sat16(rshift_round(res_q6, 6));
            produced += 1;

            let mut res_q6 = smulwb(buf[ix + 1], fir2);
            res_q6 = smlawb(res_q6, buf[ix + 2], fir3);
            res_q6 = smlawb(res_q6, buf[ix + 3], fir1);
            res_q6 = smlawb(res_q6, buf[ix + 4], fir0);
            output[produced] = sat16(rshift_round(res_q6, 6));
            produced += 1;

            ix += 3;
            counter -= 3;
        }

        processed += block_len;
        if processed < input.len() {
            buf.copy_within(block_len..block_len + ORDER_FIR, 0);
        }
    }

    fir_state.copy_from_slice(&buf[block_len..block_len + ORDER_FIR]);
    produced
}

#[cfg(test)]
mod tests {
    use super::resampler_down2_3;

    #[test]
    fn empty_input_produces_nothing() {
        let mut state = [0i32; 6];
        let mut output = [0i16; 8];
        assert_eq!(resampler_down2_3(&mut state, &mut output, &[]), 0);
        assert_eq!(state, [0; 6]);
    }

    #[test]
    fn produces_two_samples_per_triplet() {
        let mut state = [0i32; 6];
        let input = [1000i16; 240];
        let mut output = [0i16; 160];
        assert_eq!(resampler_down2_3(&mut state, &mut output, &input), 160);
        // DC gain of the LQ filter is close to unity
        for &s in &output[80..] {
            assert!((i32::from(s) - 1000).abs() <= 16);
        }
    }
}
