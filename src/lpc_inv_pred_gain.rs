//! Inverse prediction gain of an LPC filter, doubling as a stability test
//! (all poles inside the unit circle).

use crate::math::{clz32, fix_const, inverse32_var_q, rshift_round, smmul};
use crate::schur::MAX_ORDER_LPC;

const QA: i32 = 16;
const A_LIMIT: i32 = fix_const(0.99975, QA);

fn inverse_pred_gain_qa(a_qa: &mut [[i32; MAX_ORDER_LPC]; 2], order: usize) -> Option<i32> {
    let mut inv_gain_q30 = 1i32 << 30;
    let mut cur = order & 1;

    for k in (1..order).rev() {
        if a_qa[cur][k] > A_LIMIT || a_qa[cur][k] < -A_LIMIT {
            return None;
        }

        let rc_q31 = -(a_qa[cur][k] << (31 - QA));
        let rc_mult1_q30 = (i32::MAX >> 1) - smmul(rc_q31, rc_q31);
        debug_assert!(rc_mult1_q30 > (1 << 15) && rc_mult1_q30 < (1 << 30));
        let mut rc_mult2_q16 = inverse32_var_q(rc_mult1_q30, 46);

        inv_gain_q30 = smmul(inv_gain_q30, rc_mult1_q30) << 2;
        debug_assert!((0..=1 << 30).contains(&inv_gain_q30));

        let old = cur;
        cur = k & 1;

        let headrm = clz32(rc_mult2_q16) - 1;
        rc_mult2_q16 <<= headrm;
        for n in 0..k {
            let tmp_qa = a_qa[old][n] - (smmul(a_qa[old][k - n - 1], rc_q31) << 1);
            a_qa[cur][n] = smmul(tmp_qa, rc_mult2_q16) << (16 - headrm);
        }
    }

    if a_qa[cur][0] > A_LIMIT || a_qa[cur][0] < -A_LIMIT {
        return None;
    }

    let rc_q31 = -(a_qa[cur][0] << (31 - QA));
    let rc_mult1_q30 = (i32::MAX >> 1) - smmul(rc_q31, rc_q31);
    inv_gain_q30 = smmul(inv_gain_q30, rc_mult1_q30) << 2;

    Some(inv_gain_q30)
}

/// Inverse prediction gain (Q30) for Q12 coefficients; `None` if the filter
/// is unstable.
pub fn lpc_inverse_pred_gain(a_q12: &[i16]) -> Option<i32> {
    let order = a_q12.len();
    debug_assert!(order <= MAX_ORDER_LPC);
    let mut a_qa = [[0i32; MAX_ORDER_LPC]; 2];
    for (k, &a) in a_q12.iter().enumerate() {
        a_qa[order & 1][k] = i32::from(a) << (QA - 12);
    }
    inverse_pred_gain_qa(&mut a_qa, order)
}

/// Same test for Q24 coefficients.
pub fn lpc_inverse_pred_gain_q24(a_q24: &[i32]) -> Option<i32> {
    let order = a_q24.len();
    debug_assert!(order <= MAX_ORDER_LPC);
    let mut a_qa = [[0i32; MAX_ORDER_LPC]; 2];
    for (k, &a) in a_q24.iter().enumerate() {
        a_qa[order & 1][k] = rshift_round(a, 24 - QA);
    }
    inverse_pred_gain_qa(&mut a_qa, order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_filter_has_unit_inverse_gain() {
        // each reflection stage scales by (2^30 - 1) / 2^30 with floor
        // rounding, so unity comes back a few LSBs short
        let a = [0i16; 10];
        let inv_gain = lpc_inverse_pred_gain(&a).expect("stable");
        assert!(inv_gain <= 1 << 30 && (1 << 30) - inv_gain < 100, "inv_gain = {inv_gain}");
    }

    #[test]
    fn stable_one_pole_filter_reports_gain_below_unity() {
        // pole at 0.5
        let a = [2048i16, 0];
        let inv_gain = lpc_inverse_pred_gain(&a).expect("stable");
        // 1 - 0.25 = 0.75 in Q30
        assert!((inv_gain - 805_306_368).abs() < 1 << 20);
    }

    #[test]
    fn pole_on_unit_circle_is_rejected() {
        let a = [4096i16, 0, 0, 0];
        assert_eq!(lpc_inverse_pred_gain(&a), None);
    }
}
