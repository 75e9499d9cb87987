//! Rate-distortion selection across the three LTP gain codebooks.

use crate::common::NB_SUBFR;
use crate::math::add_pos_sat32;
use crate::tables_ltp::{
    LTP_GAIN_BITS_Q6_PTRS, LTP_GAIN_MIDDLE_AVG_RD_Q14, LTP_ORDER, LTP_VQ_PTRS_Q14, LTP_VQ_SIZES,
    NB_LTP_CBKS,
};
use crate::vq_wmat_ec::vq_wmat_ec;

/// Quantizes the LTP gain vectors of all subframes in place, weighting
/// errors with the per-subframe matrices in `w_q18`. Picks the
/// periodicity codebook with the lowest total rate-distortion, or the
/// first one below the trained average when `low_complexity` is set.
/// Returns the periodicity index.
pub fn quant_ltp_gains(
    b_q14: &mut [i16; NB_SUBFR * LTP_ORDER],
    cbk_index: &mut [usize; NB_SUBFR],
    w_q18: &[i32; NB_SUBFR * LTP_ORDER * LTP_ORDER],
    mu_q8: i32,
    low_complexity: bool,
) -> usize {
    let mut periodicity_index = 0;
    let mut min_rate_dist = i32::MAX;

    for k in 0..NB_LTP_CBKS {
        let cl_q6 = LTP_GAIN_BITS_Q6_PTRS[k];
        let cbk_q14 = LTP_VQ_PTRS_Q14[k];
        debug_assert_eq!(cbk_q14.len(), LTP_VQ_SIZES[k]);

        let mut temp_idx = [0usize; NB_SUBFR];
        let mut rate_dist = 0i32;
        for j in 0..NB_SUBFR {
            let b_sub: &[i16; LTP_ORDER] =
                b_q14[j * LTP_ORDER..(j + 1) * LTP_ORDER].try_into().unwrap();
            let w_sub: &[i32; LTP_ORDER * LTP_ORDER] = w_q18
                [j * LTP_ORDER * LTP_ORDER..(j + 1) * LTP_ORDER * LTP_ORDER]
                .try_into()
                .unwrap();
            let (idx, rate_dist_subfr) = vq_wmat_ec(b_sub, w_sub, cbk_q14, cl_q6, mu_q8);
            temp_idx[j] = idx;
            rate_dist = add_pos_sat32(rate_dist, rate_dist_subfr);
        }

        let rate_dist = rate_dist.min(i32::MAX - 1);
        if rate_dist < min_rate_dist {
            min_rate_dist = rate_dist;
            *cbk_index = temp_idx;
            periodicity_index = k;
        }

        if low_complexity && rate_dist < LTP_GAIN_MIDDLE_AVG_RD_Q14 {
            break;
        }
    }

    let cbk_q14 = LTP_VQ_PTRS_Q14[periodicity_index];
    for j in 0..NB_SUBFR {
        b_q14[j * LTP_ORDER..(j + 1) * LTP_ORDER].copy_from_slice(&cbk_q14[cbk_index[j]]);
    }
    periodicity_index
}

#[cfg(test)]
mod tests {
    use super::quant_ltp_gains;
    use crate::common::NB_SUBFR;
    use crate::tables_ltp::{LTP_ORDER, LTP_VQ_PTRS_Q14};

    #[test]
    fn exact_codebook_vectors_quantize_to_themselves() {
        // identity-ish weighting: strong diagonal
        let mut w = [0i32; NB_SUBFR * LTP_ORDER * LTP_ORDER];
        for j in 0..NB_SUBFR {
            for i in 0..LTP_ORDER {
                w[j * LTP_ORDER * LTP_ORDER + i * LTP_ORDER + i] = 1 << 18;
            }
        }

        let mut b = [0i16; NB_SUBFR * LTP_ORDER];
        for j in 0..NB_SUBFR {
            b[j * LTP_ORDER..(j + 1) * LTP_ORDER].copy_from_slice(&LTP_VQ_PTRS_Q14[0][2 + j]);
        }
        let mut idx = [0usize; NB_SUBFR];
        quant_ltp_gains(&mut b, &mut idx, &w, 0, false);

        for j in 0..NB_SUBFR {
            let quantized = &b[j * LTP_ORDER..(j + 1) * LTP_ORDER];
            let reference = &LTP_VQ_PTRS_Q14[0][2 + j];
            assert_eq!(quantized, reference.as_slice());
        }
    }
}
