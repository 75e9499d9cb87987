//! Reconstructs an NLSF vector from a multi-stage codebook path.

use crate::nlsf_stabilize::nlsf_stabilize;
use crate::tables_nlsf::NlsfCb;

/// Sums the codebook contributions along `path` and stabilizes the result.
pub fn nlsf_msvq_decode(nlsf_q15: &mut [i32], cb: &NlsfCb, path: &[usize]) {
    let order = nlsf_q15.len();
    debug_assert!(path.len() == cb.stages.len());
    debug_assert!(path[0] < cb.stages[0].n_vectors);

    let stage0 = &cb.stages[0].cb_q15[path[0] * order..(path[0] + 1) * order];
    for (out, &v) in nlsf_q15.iter_mut().zip(stage0) {
        *out = i32::from(v);
    }

    for (stage, &ix) in cb.stages.iter().zip(path).skip(1) {
        debug_assert!(ix < stage.n_vectors);
        let residual = &stage.cb_q15[ix * order..(ix + 1) * order];
        for (out, &v) in nlsf_q15.iter_mut().zip(residual) {
            *out += i32::from(v);
        }
    }

    nlsf_stabilize(nlsf_q15, cb.delta_min_q15);
}

#[cfg(test)]
mod tests {
    use super::nlsf_msvq_decode;
    use crate::tables_nlsf_cb0_10::NLSF_CB0_10;

    #[test]
    fn decoded_vector_is_sorted_with_minimum_spacing() {
        let path = [3usize, 1, 7, 2];
        let mut nlsf = [0i32; 10];
        nlsf_msvq_decode(&mut nlsf, &NLSF_CB0_10, &path);
        for k in 1..10 {
            assert!(
                nlsf[k] - nlsf[k - 1] >= i32::from(NLSF_CB0_10.delta_min_q15[k]),
                "pair {k}"
            );
        }
        assert!(nlsf[0] >= i32::from(NLSF_CB0_10.delta_min_q15[0]));
        assert!(nlsf[9] <= (1 << 15) - i32::from(NLSF_CB0_10.delta_min_q15[10]));
    }

    #[test]
    fn zero_path_returns_first_stage_vector_when_feasible() {
        let path = [0usize; 4];
        let mut nlsf = [0i32; 10];
        nlsf_msvq_decode(&mut nlsf, &NLSF_CB0_10, &path);
        for k in 1..10 {
            assert!(nlsf[k] > nlsf[k - 1]);
        }
    }
}
