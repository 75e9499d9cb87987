//! Entropy constrained matrix-weighted VQ for the five-tap LTP gain
//! vectors.

use crate::math::{smlawb, smlawt, smulbb, smulwb, smulwt};
use crate::tables_ltp::LTP_ORDER;

/// Finds the codebook vector minimizing weighted error plus `mu_q8` times
/// the code length. `w_q18` is a symmetric 5x5 matrix in row major order,
/// `cb_q14` holds `l` rows of five taps. Returns the winning index and its
/// rate-distortion value (Q14).
pub fn vq_wmat_ec(
    in_q14: &[i16; LTP_ORDER],
    w_q18: &[i32; LTP_ORDER * LTP_ORDER],
    cb_q14: &[[i16; LTP_ORDER]],
    cl_q6: &[i16],
    mu_q8: i32,
) -> (usize, i32) {
    debug_assert!(cb_q14.len() == cl_q6.len());

    let mut best_index = 0usize;
    let mut best_rate_dist_q14 = i32::MAX;

    for (k, (cb_row, &cl)) in cb_q14.iter().zip(cl_q6).enumerate() {
        // two Q14 differences packed per word, low half first
        let d0 = i32::from(in_q14[0]) - i32::from(cb_row[0]);
        let d1 = i32::from(in_q14[1]) - i32::from(cb_row[1]);
        let d2 = i32::from(in_q14[2]) - i32::from(cb_row[2]);
        let d3 = i32::from(in_q14[3]) - i32::from(cb_row[3]);
        let diff_01 = (d0 as u16 as i32) | (d1 << 16);
        let diff_23 = (d2 as u16 as i32) | (d3 << 16);
        let diff_4 = i32::from(in_q14[4]) - i32::from(cb_row[4]);

        let mut sum1_q14 = smulbb(mu_q8, i32::from(cl));
        debug_assert!(sum1_q14 >= 0);

        // first row of W
        let mut sum2_q16 = smulwt(w_q18[1], diff_01);
        sum2_q16 = smlawb(sum2_q16, w_q18[2], diff_23);
        sum2_q16 = smlawt(sum2_q16, w_q18[3], diff_23);
        sum2_q16 = smlawb(sum2_q16, w_q18[4], diff_4);
        sum2_q16 <<= 1;
        sum2_q16 = smlawb(sum2_q16, w_q18[0], diff_01);
        sum1_q14 = smlawb(sum1_q14, sum2_q16, diff_01);

        // second row
        let mut sum2_q16 = smulwb(w_q18[7], diff_23);
        sum2_q16 = smlawt(sum2_q16, w_q18[8], diff_23);
        sum2_q16 = smlawb(sum2_q16, w_q18[9], diff_4);
        sum2_q16 <<= 1;
        sum2_q16 = smlawt(sum2_q16, w_q18[6], diff_01);
        sum1_q14 = smlawt(sum1_q14, sum2_q16, diff_01);

        // third row
        let mut sum2_q16 = smulwt(w_q18[13], diff_23);
        sum2_q16 = smlawb(sum2_q16, w_q18[14], diff_4);
        sum2_q16 <<= 1;
        sum2_q16 = smlawb(sum2_q16, w_q18[12], diff_23);
        sum1_q14 = smlawb(sum1_q14, sum2_q16, diff_23);

        // fourth row
        let mut sum2_q16 = smulwb(w_q18[19], diff_4);
        sum2_q16 <<= 1;
        sum2_q16 = smlawt(sum2_q16, w_q18[18], diff_23);
        sum1_q14 = smlawt(sum1_q14, sum2_q16, diff_23);

        // last row
        let sum2_q16 = smulwb(w_q18[24], diff_4);
        sum1_q14 = smlawb(sum1_q14, sum2_q16, diff_4);

        debug_assert!(sum1_q14 >= 0);

        if sum1_q14 < best_rate_dist_q14 {
            best_rate_dist_q14 = sum1_q14;
            best_index = k;
        }
    }

    (best_index, best_rate_dist_q14)
}

#[cfg(test)]
mod tests {
    use super::vq_wmat_ec;
    use crate::tables_ltp::LTP_ORDER;

    fn identity_w(scale: i32) -> [i32; LTP_ORDER * LTP_ORDER] {
        let mut w = [0i32; LTP_ORDER * LTP_ORDER];
        for i in 0..LTP_ORDER {
            w[i * LTP_ORDER + i] = scale;
        }
        w
    }

    #[test]
    fn exact_codebook_match_wins_with_zero_rate_weight() {
        let cb = [
            [0i16, 0, 16000, 0, 0],
            [100, 200, 8000, 200, 100],
            [-300, 500, 4000, 500, -300],
        ];
        let cl = [10i16, 20, 30];
        let w = identity_w(1 << 18);
        let (ix, rd) = vq_wmat_ec(&cb[1], &w, &cb, &cl, 0);
        assert_eq!(ix, 1);
        assert_eq!(rd, 0);
    }

    #[test]
    fn high_rate_weight_prefers_the_cheaper_vector() {
        let cb = [[0i16, 0, 0, 0, 0], [0, 0, 50, 0, 0]];
        let cl = [5i16, 500];
        let input = [0i16, 0, 50, 0, 0];
        let w = identity_w(1 << 10);
        // distortion gap is tiny, rate gap dominates
        let (ix, _) = vq_wmat_ec(&input, &w, &cb, &cl, 1 << 8);
        assert_eq!(ix, 0);
    }
}
