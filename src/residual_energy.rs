//! Residual energy measurements used when distributing gains over
//! subframes and when comparing predictor candidates.

use alloc::vec;

use crate::common::NB_SUBFR;
use crate::lpc_analysis_filter::lpc_analysis_filter;
use crate::math::{clz32, smlawb, smmul, smulwb};
use crate::schur::MAX_ORDER_LPC;
use crate::solve_ls::MAX_MATRIX_SIZE;
use crate::vector_ops::sum_sqr_shift;

/// Residual energies per subframe after whitening each frame half with its
/// own predictor, scaled by the squared quantization gains. Returns the
/// energies and their Q values.
pub fn residual_energy(
    nrgs: &mut [i32; NB_SUBFR],
    nrgs_q: &mut [i32; NB_SUBFR],
    x: &[i16],
    a_q12: &[[i16; MAX_ORDER_LPC]; 2],
    gains: &[i32; NB_SUBFR],
    subfr_length: usize,
    lpc_order: usize,
) {
    let offset = lpc_order + subfr_length;
    debug_assert!(x.len() >= NB_SUBFR * offset);

    let half_len = (NB_SUBFR >> 1) * offset;
    let mut lpc_res = vec![0i16; half_len];
    for i in 0..2 {
        let mut state = [0i16; MAX_ORDER_LPC];
        lpc_analysis_filter(
            &x[i * half_len..(i + 1) * half_len],
            &a_q12[i][..lpc_order],
            &mut state[..lpc_order],
            &mut lpc_res,
        );

        for j in 0..NB_SUBFR >> 1 {
            let res = &lpc_res[lpc_order + j * offset..lpc_order + j * offset + subfr_length];
            let (nrg, rshift) = sum_sqr_shift(res);
            nrgs[i * (NB_SUBFR >> 1) + j] = nrg;
            nrgs_q[i * (NB_SUBFR >> 1) + j] = -rshift;
        }
    }

    // apply squared subframe gains at full scale
    for i in 0..NB_SUBFR {
        let lz1 = clz32(nrgs[i]) - 1;
        let lz2 = clz32(gains[i]) - 1;
        let gain_up = gains[i] << lz2;
        let gain_sq = smmul(gain_up, gain_up);
        nrgs[i] = smmul(gain_sq, nrgs[i] << lz1);
        nrgs_q[i] += lz1 + 2 * lz2 - 64;
    }
}

/// Residual energy nrg = wxx - 2*wXx*c + c'*wXX*c for a Q(`c_q`) prediction
/// vector against correlations in common Q domain. Result in Q0.
pub fn residual_energy16_covar(
    c: &[i16],
    w_xx: &[i32],
    w_xx_vec: &[i32],
    wxx: i32,
    c_q: i32,
) -> i32 {
    let d = c.len();
    debug_assert!(d <= MAX_MATRIX_SIZE && (1..16).contains(&c_q));
    debug_assert!(w_xx.len() >= d * d && w_xx_vec.len() >= d);

    let mut lshifts = 16 - c_q;

    let c_max = c.iter().map(|&v| i32::from(v).abs()).max().unwrap_or(0);
    let mut qxtra = lshifts.min(clz32(c_max) - 17);

    let w_max = w_xx[0].max(w_xx[d * d - 1]);
    qxtra = qxtra
        .min(clz32(d as i32 * (smulwb(w_max, c_max) >> 4)) - 5)
        .max(0);

    let mut cn = [0i32; MAX_MATRIX_SIZE];
    for (out, &v) in cn.iter_mut().zip(c) {
        *out = i32::from(v) << qxtra;
        debug_assert!(out.abs() <= i32::from(i16::MAX) + 1);
    }
    lshifts -= qxtra;

    // wxx - 2 * wXx * c
    let mut tmp = 0i32;
    for (&w, &cv) in w_xx_vec.iter().zip(&cn[..d]) {
        tmp = smlawb(tmp, w, cv);
    }
    let mut nrg = (wxx >> (1 + lshifts)) - tmp;

    // add c' * wXX * c, using the upper triangle of the symmetric matrix
    let mut tmp2 = 0i32;
    for i in 0..d {
        let row = &w_xx[i * d..(i + 1) * d];
        let mut tmp = 0i32;
        for j in i + 1..d {
            tmp = smlawb(tmp, row[j], cn[j]);
        }
        tmp = smlawb(tmp, row[i] >> 1, cn[i]);
        tmp2 = smlawb(tmp2, tmp, cn[i]);
    }
    nrg += tmp2 << lshifts;

    // keep one bit of headroom, the caller may add two of these
    if nrg < 1 {
        1
    } else if nrg > i32::MAX >> (lshifts + 2) {
        i32::MAX >> 1
    } else {
        nrg << (lshifts + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::{residual_energy, residual_energy16_covar, NB_SUBFR};
    use crate::schur::MAX_ORDER_LPC;

    #[test]
    fn zero_predictor_passes_input_energy_through() {
        let subfr_length = 40;
        let lpc_order = 10;
        let offset = subfr_length + lpc_order;
        let x: alloc::vec::Vec<i16> = (0..NB_SUBFR * offset)
            .map(|i| (((i * 31) % 55) as i16 - 27) * 180)
            .collect();
        let a = [[0i16; MAX_ORDER_LPC]; 2];
        let gains = [1 << 16; NB_SUBFR];
        let mut nrgs = [0i32; NB_SUBFR];
        let mut nrgs_q = [0i32; NB_SUBFR];
        residual_energy(&mut nrgs, &mut nrgs_q, &x, &a, &gains, subfr_length, lpc_order);
        for i in 0..NB_SUBFR {
            assert!(nrgs[i] > 0);
            assert!(nrgs_q[i] < 0);
        }
    }

    #[test]
    fn covar_energy_matches_quadratic_form() {
        // 2x2 system with known result
        let c = [1 << 12, -(1 << 11)]; // 1.0, -0.5 in Q12
        let w_xx = [4_000_000, 1_000_000, 1_000_000, 3_000_000];
        let w_xx_vec = [2_500_000, 500_000];
        let wxx = 5_000_000;
        let nrg = residual_energy16_covar(&c, &w_xx, &w_xx_vec, wxx, 12);
        // exact: 5e6 - 2*(2.5e6 - 0.25e6) + (4e6 - 1e6 + 0.75e6) = 4.25e6
        assert!((nrg - 4_250_000).abs() < 5_000, "nrg = {nrg}");
    }

    #[test]
    fn covar_energy_is_clamped_to_at_least_one() {
        let c = [1i16 << 12];
        let w_xx = [100];
        let w_xx_vec = [10_000_000];
        let nrg = residual_energy16_covar(&c, &w_xx, &w_xx_vec, 0, 12);
        assert_eq!(nrg, 1);
    }
}
