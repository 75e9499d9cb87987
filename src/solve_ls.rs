//! Symmetric linear system solver based on an LDL' factorization, with
//! diagonal loading when the matrix is ill conditioned.

use crate::math::{fix_const, inverse32_var_q, smlaww, smmul, smulbb, smulww};
use crate::schur::MAX_ORDER_LPC;

/// Largest system the stack buffers accommodate, covering both the LPC and
/// the LTP orders.
pub const MAX_MATRIX_SIZE: usize = MAX_ORDER_LPC;

const LTP_COND_FAC_Q31: i32 = fix_const(1e-5, 31);

/// Inverted diagonal element split in two parts for extra precision.
#[derive(Clone, Copy, Default)]
struct InvD {
    q36_part: i32,
    q48_part: i32,
}

/// Solves A*x = b for symmetric A (row major, `m` x `m`). A is modified in
/// place when diagonal loading is needed. The solution is returned in Q16.
pub fn solve_ldl(a: &mut [i32], m: usize, b: &[i32], x_q16: &mut [i32]) {
    debug_assert!(m <= MAX_MATRIX_SIZE);
    debug_assert!(a.len() >= m * m && b.len() >= m && x_q16.len() >= m);

    let mut l_q16 = [0i32; MAX_MATRIX_SIZE * MAX_MATRIX_SIZE];
    let mut inv_d = [InvD::default(); MAX_MATRIX_SIZE];
    let mut y = [0i32; MAX_MATRIX_SIZE];

    ldl_factorize(a, m, &mut l_q16, &mut inv_d);

    // L*D*L'*x = b: first Y = inv(L)*b
    for i in 0..m {
        let row = &l_q16[i * m..];
        let mut tmp = 0i32;
        for j in 0..i {
            tmp = smlaww(tmp, row[j], y[j]);
        }
        y[i] = b[i] - tmp;
    }

    // then divide by the diagonal
    for i in 0..m {
        let tmp = y[i];
        y[i] = smmul(tmp, inv_d[i].q48_part) + (smulww(tmp, inv_d[i].q36_part) >> 4);
    }

    // finally x = inv(L')*Y
    for i in (0..m).rev() {
        let mut tmp = 0i32;
        for j in i + 1..m {
            tmp = smlaww(tmp, l_q16[j * m + i], x_q16[j]);
        }
        x_q16[i] = y[i] - tmp;
    }
}

fn ldl_factorize(
    a: &mut [i32],
    m: usize,
    l_q16: &mut [i32; MAX_MATRIX_SIZE * MAX_MATRIX_SIZE],
    inv_d: &mut [InvD; MAX_MATRIX_SIZE],
) {
    let mut v_q0 = [0i32; MAX_MATRIX_SIZE];
    let mut d_q0 = [0i32; MAX_MATRIX_SIZE];

    let diag_min_value =
        smmul(a[0].saturating_add(a[m * m - 1]), LTP_COND_FAC_Q31).max(1 << 9);

    let mut status = true;
    let mut loop_count = 0;
    while loop_count < m && status {
        status = false;
        'rows: for j in 0..m {
            let mut tmp = 0i32;
            for i in 0..j {
                v_q0[i] = smulww(d_q0[i], l_q16[j * m + i]);
                tmp = smlaww(tmp, v_q0[i], l_q16[j * m + i]);
            }
            let mut tmp = a[j * m + j] - tmp;

            if tmp < diag_min_value {
                // not positive semi-definite or ill conditioned; load the
                // diagonal and refactorize
                tmp = smulbb(loop_count as i32 + 1, diag_min_value) - tmp;
                for i in 0..m {
                    a[i * m + i] += tmp;
                }
                status = true;
                break 'rows;
            }
            d_q0[j] = tmp;

            // two-step Newton refinement of the reciprocal
            let one_div_diag_q36 = inverse32_var_q(tmp, 36);
            let one_div_diag_q40 = one_div_diag_q36 << 4;
            let err = (1 << 24) - smulww(tmp, one_div_diag_q40);
            let one_div_diag_q48 = smulww(err, one_div_diag_q40);

            inv_d[j].q36_part = one_div_diag_q36;
            inv_d[j].q48_part = one_div_diag_q48;

            l_q16[j * m + j] = 65536;
            for i in j + 1..m {
                let mut tmp = 0i32;
                for k in 0..j {
                    tmp = smlaww(tmp, v_q0[k], l_q16[i * m + k]);
                }
                let tmp = a[j * m + i] - tmp;
                l_q16[i * m + j] =
                    smmul(tmp, one_div_diag_q48) + (smulww(tmp, one_div_diag_q36) >> 4);
            }
        }
        loop_count += 1;
    }
    debug_assert!(!status);
}

#[cfg(test)]
mod tests {
    use super::solve_ldl;

    #[test]
    fn solves_a_small_well_conditioned_system() {
        // A = [[4e6, 1e6], [1e6, 3e6]], b = A * [1, 2]
        let mut a = [4_000_000, 1_000_000, 1_000_000, 3_000_000];
        let b = [6_000_000, 7_000_000];
        let mut x_q16 = [0i32; 2];
        solve_ldl(&mut a, 2, &b, &mut x_q16);
        assert!((x_q16[0] - (1 << 16)).abs() < 200, "x0 = {}", x_q16[0]);
        assert!((x_q16[1] - (2 << 16)).abs() < 200, "x1 = {}", x_q16[1]);
    }

    #[test]
    fn rank_deficient_matrix_is_regularized_not_rejected() {
        // both columns identical, solvable only after diagonal loading
        let mut a = [1_000_000, 1_000_000, 1_000_000, 1_000_000];
        let b = [2_000_000, 2_000_000];
        let mut x_q16 = [0i32; 2];
        solve_ldl(&mut a, 2, &b, &mut x_q16);
        // after loading the diagonal the solution lands near [1, 1];
        // the substitution passes round the two unknowns differently
        for &x in &x_q16 {
            assert!((x - (1 << 16)).abs() < (1 << 16) / 16, "x = {x}");
        }
    }
}
