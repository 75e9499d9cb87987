//! Short-term predictor search: Burg analysis over the frame, optionally
//! split against an NLSF-interpolated first half.

use alloc::vec;

use crate::a2nlsf::a2nlsf;
use crate::burg_modified::burg_modified;
use crate::bwexpander_32::bwexpander_32;
use crate::interpolate::interpolate;
use crate::lpc_analysis_filter::lpc_analysis_filter;
use crate::math::fix_const;
use crate::nlsf2a_stable::nlsf2a_stable;
use crate::common::NB_SUBFR;
use crate::schur::MAX_ORDER_LPC;
use crate::vector_ops::sum_sqr_shift;

const FIND_LPC_COND_FAC_Q32: i32 = fix_const(2.5e-5, 32);
const FIND_LPC_CHIRP_Q16: i32 = fix_const(0.99995, 16);

/// Finds the NLSF vector for the frame and the interpolation index for the
/// first half (4 means no interpolation). `x` holds `NB_SUBFR` subframes of
/// `subfr_length` samples, each including `lpc_order` preceding samples.
pub fn find_lpc(
    nlsf_q15: &mut [i32],
    prev_nlsf_q_q15: &[i32],
    use_interpolated_nlsfs: bool,
    lpc_order: usize,
    x: &[i16],
    subfr_length: usize,
) -> usize {
    let mut interp_index = 4usize;

    let mut a_q16 = [0i32; MAX_ORDER_LPC];
    let (mut res_nrg, mut res_nrg_q) = burg_modified(
        &mut a_q16,
        x,
        subfr_length,
        NB_SUBFR,
        FIND_LPC_COND_FAC_Q32,
        lpc_order,
    );
    bwexpander_32(&mut a_q16[..lpc_order], FIND_LPC_CHIRP_Q16);

    if use_interpolated_nlsfs {
        // optimal predictor for the last half on its own
        let mut a_tmp_q16 = [0i32; MAX_ORDER_LPC];
        let (res_tmp_nrg, res_tmp_nrg_q) = burg_modified(
            &mut a_tmp_q16,
            &x[(NB_SUBFR >> 1) * subfr_length..],
            subfr_length,
            NB_SUBFR >> 1,
            FIND_LPC_COND_FAC_Q32,
            lpc_order,
        );
        bwexpander_32(&mut a_tmp_q16[..lpc_order], FIND_LPC_CHIRP_Q16);

        // leave only the first-half energy in res_nrg, so candidates below
        // compare against it directly
        let shift = res_tmp_nrg_q - res_nrg_q;
        if shift >= 0 {
            if shift < 32 {
                res_nrg -= res_tmp_nrg >> shift;
            }
        } else {
            debug_assert!(shift > -32);
            res_nrg = (res_nrg >> -shift) - res_tmp_nrg;
            res_nrg_q = res_tmp_nrg_q;
        }

        a2nlsf(nlsf_q15, &mut a_tmp_q16[..lpc_order]);

        let mut nlsf0_q15 = [0i32; MAX_ORDER_LPC];
        let mut a_tmp_q12 = [0i16; MAX_ORDER_LPC];
        let mut lpc_res = vec![0i16; 2 * subfr_length];
        for k in (0..4).rev() {
            interpolate(
                &mut nlsf0_q15[..lpc_order],
                &prev_nlsf_q_q15[..lpc_order],
                &nlsf_q15[..lpc_order],
                k as i32,
            );

            nlsf2a_stable(&mut a_tmp_q12[..lpc_order], &nlsf0_q15[..lpc_order]);

            let mut state = [0i16; MAX_ORDER_LPC];
            lpc_analysis_filter(
                &x[..2 * subfr_length],
                &a_tmp_q12[..lpc_order],
                &mut state[..lpc_order],
                &mut lpc_res,
            );

            let (mut res_nrg0, rshift0) =
                sum_sqr_shift(&lpc_res[lpc_order..subfr_length]);
            let (mut res_nrg1, rshift1) =
                sum_sqr_shift(&lpc_res[subfr_length + lpc_order..2 * subfr_length]);

            let shift = rshift0 - rshift1;
            let res_nrg_interp_q = if shift >= 0 {
                res_nrg1 >>= shift;
                -rshift0
            } else {
                res_nrg0 >>= -shift;
                -rshift1
            };
            let res_nrg_interp = res_nrg0 + res_nrg1;

            let shift = res_nrg_interp_q - res_nrg_q;
            let is_interp_lower = if shift >= 0 {
                (res_nrg_interp >> shift) < res_nrg
            } else if -shift < 32 {
                res_nrg_interp < (res_nrg >> -shift)
            } else {
                false
            };

            if is_interp_lower {
                res_nrg = res_nrg_interp;
                res_nrg_q = res_nrg_interp_q;
                interp_index = k;
            }
        }
    }

    if interp_index == 4 {
        a2nlsf(nlsf_q15, &mut a_q16[..lpc_order]);
    }

    interp_index
}

#[cfg(test)]
mod tests {
    use super::find_lpc;

    #[test]
    fn stationary_signal_yields_sorted_nlsfs_without_interpolation() {
        let subfr_length = 80;
        let x: alloc::vec::Vec<i16> = (0..4 * subfr_length)
            .map(|i| (libm::sin(0.2 * i as f64) * 6000.0) as i16)
            .collect();
        let prev = [0i32; 10];
        let mut nlsf = [0i32; 10];
        let interp = find_lpc(&mut nlsf, &prev, false, 10, &x, subfr_length);
        assert_eq!(interp, 4);
        for k in 1..10 {
            assert!(nlsf[k] > nlsf[k - 1]);
        }
    }

    #[test]
    fn interpolation_search_returns_index_at_most_four() {
        let subfr_length = 80;
        let x: alloc::vec::Vec<i16> = (0..4 * subfr_length)
            .map(|i| {
                let f = if i < 2 * subfr_length { 0.1 } else { 0.5 };
                (libm::sin(f * i as f64) * 5000.0) as i16
            })
            .collect();
        let prev: alloc::vec::Vec<i32> = (1..=10).map(|k| k * 32768 / 11).collect();
        let mut nlsf = [0i32; 10];
        let interp = find_lpc(&mut nlsf, &prev, true, 10, &x, subfr_length);
        assert!(interp <= 4);
        for k in 1..10 {
            assert!(nlsf[k] > nlsf[k - 1]);
        }
    }
}
