//! Multi-stage NLSF vector quantizer with an M-best tree search and
//! optional fluctuation reduction against the previous quantized vector.

use alloc::vec;

use crate::math::{add_pos_sat32, fix_const, smlabb, smlawb, smlawt, smulbb, smulwb};
use crate::nlsf_msvq_decode::nlsf_msvq_decode;
use crate::schur::MAX_ORDER_LPC;
use crate::sort::insertion_sort_increasing;
use crate::tables_nlsf::{NlsfCb, NlsfCbStage};

/// Upper bound on survivors kept between stages.
pub const MAX_NLSF_MSVQ_SURVIVORS: usize = 16;
/// Survivors with a rate-distortion this far (relative) above the best
/// one are discarded early.
const SURV_MAX_REL_RD_Q16: i32 = fix_const(0.1, 16);

/// Weighted quantization errors (Q20) for `n` input vectors against every
/// codebook vector of one stage. Two weights are packed per word so the
/// accumulator can alternate the low and high half.
fn vq_sum_error(
    err_q20: &mut [i32],
    inputs_q15: &[i32],
    w_q6: &[i32],
    stage: &NlsfCbStage,
    n: usize,
    order: usize,
) {
    debug_assert!(order <= MAX_ORDER_LPC && order & 1 == 0);

    let mut w_packed_q6 = [0i32; MAX_ORDER_LPC / 2];
    for m in 0..order >> 1 {
        w_packed_q6[m] = w_q6[2 * m] | (w_q6[2 * m + 1] << 16);
    }

    for nn in 0..n {
        let input = &inputs_q15[nn * order..(nn + 1) * order];
        let err = &mut err_q20[nn * stage.n_vectors..(nn + 1) * stage.n_vectors];
        for i in 0..stage.n_vectors {
            let cb_vec = &stage.cb_q15[i * order..(i + 1) * order];
            let mut sum_error = 0i32;
            let mut m = 0;
            while m < order {
                let w_q6 = w_packed_q6[m >> 1];
                let diff_q15 = input[m] - i32::from(cb_vec[m]);
                sum_error = smlawb(sum_error, smulbb(diff_q15, diff_q15), w_q6);
                let diff_q15 = input[m + 1] - i32::from(cb_vec[m + 1]);
                sum_error = smlawt(sum_error, smulbb(diff_q15, diff_q15), w_q6);
                m += 2;
            }
            debug_assert!(sum_error >= 0);
            err[i] = sum_error;
        }
    }
}

/// Adds the rate cost to the distortion of every candidate in one stage.
fn vq_rate_distortion(
    rd_q20: &mut [i32],
    stage: &NlsfCbStage,
    inputs_q15: &[i32],
    w_q6: &[i32],
    rate_acc_q5: &[i32],
    mu_q15: i32,
    n: usize,
    order: usize,
) {
    vq_sum_error(rd_q20, inputs_q15, w_q6, stage, n, order);

    for nn in 0..n {
        let rd_vec = &mut rd_q20[nn * stage.n_vectors..(nn + 1) * stage.n_vectors];
        for (rd, &rate_q5) in rd_vec.iter_mut().zip(stage.rates_q5) {
            debug_assert!(rate_acc_q5[nn] + i32::from(rate_q5) <= i32::from(i16::MAX));
            *rd = smlabb(*rd, rate_acc_q5[nn] + i32::from(rate_q5), mu_q15);
            debug_assert!(*rd >= 0);
        }
    }
}

/// Quantizes `nlsf_q15` in place against the multi-stage codebook `cb` and
/// returns the chosen index path in `indices`.
///
/// `mu_q15` trades distortion against rate; `mu_fluc_red_q16` additionally
/// penalizes deviation from `nlsf_q15_prev` unless `deactivate_fluc_red`
/// is set (used when the previous frame is unreliable).
#[allow(clippy::too_many_arguments)]
pub fn nlsf_msvq_encode(
    indices: &mut [usize],
    nlsf_q15: &mut [i32],
    cb: &NlsfCb,
    nlsf_q15_prev: &[i32],
    w_q6: &[i32],
    mu_q15: i32,
    mu_fluc_red_q16: i32,
    survivors: usize,
    deactivate_fluc_red: bool,
) {
    let order = nlsf_q15.len();
    let n_stages = cb.stages.len();
    debug_assert!(indices.len() == n_stages);
    debug_assert!((1..=MAX_NLSF_MSVQ_SURVIVORS).contains(&survivors));

    let max_evaluated = cb
        .stages
        .iter()
        .map(|s| s.n_vectors)
        .max()
        .unwrap_or(0)
        .max(survivors * cb.stages.iter().skip(1).map(|s| s.n_vectors).max().unwrap_or(0));

    let mut rate_dist_q18 = vec![0i32; max_evaluated];
    let mut temp_indices = vec![0usize; survivors];
    let mut rate_q5 = vec![0i32; survivors];
    let mut rate_new_q5 = vec![0i32; survivors];
    let mut path = vec![0usize; survivors * n_stages];
    let mut path_new = vec![0usize; survivors * n_stages];
    let mut res_q15 = vec![0i32; survivors * order];
    let mut res_new_q15 = vec![0i32; survivors * order];

    res_q15[..order].copy_from_slice(nlsf_q15);

    let mut prev_survivors = 1usize;
    let min_survivors = survivors / 2;
    let mut cur_survivors = 1usize;

    for (s, stage) in cb.stages.iter().enumerate() {
        cur_survivors = survivors.min(prev_survivors * stage.n_vectors);

        vq_rate_distortion(
            &mut rate_dist_q18,
            stage,
            &res_q15,
            w_q6,
            &rate_q5,
            mu_q15,
            prev_survivors,
            order,
        );

        insertion_sort_increasing(
            &mut rate_dist_q18[..prev_survivors * stage.n_vectors],
            &mut temp_indices[..cur_survivors],
            cur_survivors,
        );

        // drop survivors far above the best rate-distortion
        if rate_dist_q18[0] < i32::MAX / MAX_NLSF_MSVQ_SURVIVORS as i32 {
            let threshold_q18 = smlawb(
                rate_dist_q18[0],
                survivors as i32 * rate_dist_q18[0],
                SURV_MAX_REL_RD_Q16,
            );
            while rate_dist_q18[cur_survivors - 1] > threshold_q18 && cur_survivors > min_survivors
            {
                cur_survivors -= 1;
            }
        }

        for k in 0..cur_survivors {
            let (input_index, cb_index) = if s > 0 {
                (temp_indices[k] / stage.n_vectors, temp_indices[k] % stage.n_vectors)
            } else {
                (0, temp_indices[k])
            };

            // residual for the next stage
            let res_in = &res_q15[input_index * order..(input_index + 1) * order];
            let cb_vec = &stage.cb_q15[cb_index * order..(cb_index + 1) * order];
            for (i, out) in res_new_q15[k * order..(k + 1) * order].iter_mut().enumerate() {
                *out = res_in[i] - i32::from(cb_vec[i]);
            }

            rate_new_q5[k] = rate_q5[input_index] + i32::from(stage.rates_q5[cb_index]);

            let (src, dst) = (input_index * n_stages, k * n_stages);
            for i in 0..s {
                path_new[dst + i] = path[src + i];
            }
            path_new[dst + s] = cb_index;
        }

        if s < n_stages - 1 {
            res_q15[..cur_survivors * order].copy_from_slice(&res_new_q15[..cur_survivors * order]);
            rate_q5[..cur_survivors].copy_from_slice(&rate_new_q5[..cur_survivors]);
            path[..cur_survivors * n_stages]
                .copy_from_slice(&path_new[..cur_survivors * n_stages]);
        }

        prev_survivors = cur_survivors;
    }

    let mut best_index = 0usize;
    if !deactivate_fluc_red {
        // re-rank survivors with a penalty on deviation from the previous
        // quantized vector
        let mut best_rate_dist_q20 = i32::MAX;
        for s in 0..cur_survivors {
            nlsf_msvq_decode(nlsf_q15, cb, &path_new[s * n_stages..(s + 1) * n_stages]);

            let mut wsse_q20 = 0i32;
            for i in (0..order).step_by(2) {
                let se_q15 = nlsf_q15[i] - nlsf_q15_prev[i];
                wsse_q20 = smlawb(wsse_q20, smulbb(se_q15, se_q15), w_q6[i]);
                let se_q15 = nlsf_q15[i + 1] - nlsf_q15_prev[i + 1];
                wsse_q20 = smlawb(wsse_q20, smulbb(se_q15, se_q15), w_q6[i + 1]);
            }
            debug_assert!(wsse_q20 >= 0);

            let wsse_q20 = add_pos_sat32(rate_dist_q18[s], smulwb(wsse_q20, mu_fluc_red_q16));
            if wsse_q20 < best_rate_dist_q20 {
                best_rate_dist_q20 = wsse_q20;
                best_index = s;
            }
        }
    }

    indices.copy_from_slice(&path_new[best_index * n_stages..(best_index + 1) * n_stages]);
    nlsf_msvq_decode(nlsf_q15, cb, indices);
}

#[cfg(test)]
mod tests {
    use super::nlsf_msvq_encode;
    use crate::math::fix_const;
    use crate::nlsf_msvq_decode::nlsf_msvq_decode;
    use crate::nlsf_vq_weights_laroia::nlsf_vq_weights_laroia;
    use crate::tables_nlsf_cb0_10::NLSF_CB0_10;

    fn encode(nlsf: &[i32; 10], survivors: usize) -> ([usize; 4], [i32; 10]) {
        let mut q = *nlsf;
        let mut w = [0i32; 10];
        nlsf_vq_weights_laroia(&mut w, nlsf);
        let mut indices = [0usize; 4];
        nlsf_msvq_encode(
            &mut indices,
            &mut q,
            &NLSF_CB0_10,
            nlsf,
            &w,
            fix_const(0.003, 15),
            0,
            survivors,
            true,
        );
        (indices, q)
    }

    #[test]
    fn quantized_output_matches_decoded_path() {
        let nlsf = [1500, 4200, 7600, 10900, 14300, 17800, 21200, 24500, 27900, 31200];
        let (indices, q) = encode(&nlsf, 4);
        let mut decoded = [0i32; 10];
        nlsf_msvq_decode(&mut decoded, &NLSF_CB0_10, &indices);
        assert_eq!(q, decoded);
    }

    #[test]
    fn codebook_entry_quantizes_to_itself() {
        // stage 0 vector with zero residuals in later stages decodes exactly
        let mut nlsf = [0i32; 10];
        nlsf_msvq_decode(&mut nlsf, &NLSF_CB0_10, &[5, 0, 0, 0]);
        let input = nlsf;
        let (_, q) = encode(&input, 8);
        let err: i32 = input.iter().zip(&q).map(|(&a, &b)| (a - b).abs()).sum();
        // rate weighting may prefer an equally close cheaper path
        assert!(err < 2500, "total error {err}");
    }

    #[test]
    fn indices_stay_in_range_and_output_is_sorted() {
        let nlsf = [900, 3100, 6900, 9400, 13800, 16200, 20100, 23900, 28400, 30800];
        for survivors in [1usize, 4, 16] {
            let (indices, q) = encode(&nlsf, survivors);
            for (ix, stage) in indices.iter().zip(NLSF_CB0_10.stages) {
                assert!(*ix < stage.n_vectors);
            }
            for k in 1..10 {
                assert!(q[k] > q[k - 1]);
            }
        }
    }
}
