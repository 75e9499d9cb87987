//! Correlation matrix and vector computations for the least squares
//! predictor estimates.

use crate::math::{clz32, smlabb, smulbb};
use crate::vector_ops::{inner_prod, sum_sqr_shift};

/// Correlation vector X'*t, where X is the data matrix formed from `x`
/// delayed by 1..=order samples. `x` holds `t.len() + order - 1` samples.
pub fn corr_vector(x: &[i16], t: &[i16], order: usize, xt: &mut [i32], rshifts: i32) {
    let l = t.len();
    debug_assert!(x.len() >= l + order - 1 && xt.len() >= order);

    // first sample of column 0 of X
    let col0 = order - 1;
    if rshifts > 0 {
        for lag in 0..order {
            let mut acc = 0i32;
            let col = &x[col0 - lag..];
            for i in 0..l {
                acc += smulbb(i32::from(col[i]), i32::from(t[i])) >> rshifts;
            }
            xt[lag] = acc;
        }
    } else {
        debug_assert!(rshifts == 0);
        for lag in 0..order {
            xt[lag] = inner_prod(&x[col0 - lag..col0 - lag + l], t);
        }
    }
}

/// Correlation matrix X'*X (row major, `order` x `order`). Returns the
/// number of right shifts applied to the correlations, at least
/// `min_rshifts`.
pub fn corr_matrix(
    x: &[i16],
    l: usize,
    order: usize,
    head_room: i32,
    xx: &mut [i32],
    min_rshifts: i32,
) -> i32 {
    debug_assert!(x.len() >= l + order - 1 && xx.len() >= order * order);

    let (mut energy, mut rshifts) = sum_sqr_shift(&x[..l + order - 1]);

    let head_room_rshifts = (head_room - clz32(energy)).max(0);
    energy >>= head_room_rshifts;
    rshifts += head_room_rshifts;

    // energy of column 0, removing the contribution of the first
    // order - 1 samples
    for &s in &x[..order - 1] {
        energy -= smulbb(i32::from(s), i32::from(s)) >> rshifts;
    }
    if rshifts < min_rshifts {
        energy >>= min_rshifts - rshifts;
        rshifts = min_rshifts;
    }

    xx[0] = energy;
    let col0 = order - 1;
    for j in 1..order {
        let drop = i32::from(x[col0 + l - j]);
        let add = i32::from(x[col0 - j]);
        energy = energy - (smulbb(drop, drop) >> rshifts) + (smulbb(add, add) >> rshifts);
        xx[j * order + j] = energy;
    }

    for lag in 1..order {
        let col_lag = col0 - lag;
        let mut energy = if rshifts > 0 {
            let mut acc = 0i32;
            for i in 0..l {
                acc += smulbb(i32::from(x[col0 + i]), i32::from(x[col_lag + i])) >> rshifts;
            }
            acc
        } else {
            inner_prod(&x[col0..col0 + l], &x[col_lag..col_lag + l])
        };

        xx[lag * order] = energy;
        xx[lag] = energy;
        for j in 1..order - lag {
            let drop = smulbb(i32::from(x[col0 + l - j]), i32::from(x[col_lag + l - j]));
            let add0 = i32::from(x[col0 - j]);
            let add1 = i32::from(x[col_lag - j]);
            energy = if rshifts > 0 {
                energy - (drop >> rshifts) + (smulbb(add0, add1) >> rshifts)
            } else {
                smlabb(energy - drop, add0, add1)
            };
            xx[(lag + j) * order + j] = energy;
            xx[j * order + lag + j] = energy;
        }
    }

    rshifts
}

/// Adds `noise` to the diagonal of `xx` and to the first element of the
/// correlation vector, conditioning the matrix for the linear solve.
pub fn regularize_correlations(xx: &mut [i32], xx_vec: &mut [i32], noise: i32, dim: usize) {
    debug_assert!(xx.len() >= dim * dim && !xx_vec.is_empty());
    for i in 0..dim {
        xx[i * dim + i] += noise;
    }
    xx_vec[0] += noise;
}

#[cfg(test)]
mod tests {
    use super::{corr_matrix, corr_vector, regularize_correlations};

    #[test]
    fn matrix_is_symmetric_with_autocorrelation_on_the_diagonal() {
        let x: alloc::vec::Vec<i16> = (0..48).map(|i| ((i * 37) % 61 - 30) as i16 * 100).collect();
        let order = 4;
        let l = x.len() - order + 1;
        let mut xx = [0i32; 16];
        corr_matrix(&x, l, order, 20, &mut xx, 0);
        for i in 0..order {
            for j in 0..order {
                assert_eq!(xx[i * order + j], xx[j * order + i]);
            }
            assert!(xx[i * order + i] > 0);
        }
    }

    #[test]
    fn vector_matches_direct_computation() {
        let x: alloc::vec::Vec<i16> = (0..40).map(|i| ((i * 23) % 41 - 20) as i16 * 50).collect();
        let order = 3;
        let l = x.len() - order + 1;
        let t: alloc::vec::Vec<i16> = x[order - 1..].to_vec();
        let mut xt = [0i32; 3];
        corr_vector(&x, &t, order, &mut xt, 0);
        for lag in 0..order {
            let direct: i32 = (0..l)
                .map(|i| i32::from(x[order - 1 - lag + i]) * i32::from(t[i]))
                .sum();
            assert_eq!(xt[lag], direct);
        }
    }

    #[test]
    fn regularization_touches_diagonal_and_first_vector_element() {
        let mut xx = [10, 1, 2, 20];
        let mut b = [5, 6];
        regularize_correlations(&mut xx, &mut b, 3, 2);
        assert_eq!(xx, [13, 1, 2, 23]);
        assert_eq!(b, [8, 6]);
    }
}
