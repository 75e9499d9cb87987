//! High-precision Schur recursion, Q16 output.

use crate::math::{div32_var_q, rshift_round, smmul};
use crate::schur::MAX_ORDER_LPC;

/// Q16 reflection coefficients from `order + 1` correlations. Returns the
/// residual energy, or zero (with zeroed coefficients) for non-positive
/// zero-lag input.
pub fn schur64(rc_q16: &mut [i32], c: &[i32]) -> i32 {
    let order = rc_q16.len();
    debug_assert!(c.len() == order + 1 && order <= MAX_ORDER_LPC);

    if c[0] <= 0 {
        rc_q16.fill(0);
        return 0;
    }

    let mut buf = [[0i32; 2]; MAX_ORDER_LPC + 1];
    for (b, &v) in buf.iter_mut().zip(c) {
        b[0] = v;
        b[1] = v;
    }

    for k in 0..order {
        let rc_tmp_q31 = div32_var_q(-buf[k + 1][0], buf[0][1], 31);
        rc_q16[k] = rshift_round(rc_tmp_q31, 15);

        for n in 0..order - k {
            let ctmp1_q30 = buf[n + k + 1][0];
            let ctmp2_q30 = buf[n][1];
            buf[n + k + 1][0] = ctmp1_q30 + smmul(ctmp2_q30 << 1, rc_tmp_q31);
            buf[n][1] = ctmp2_q30 + smmul(ctmp1_q30 << 1, rc_tmp_q31);
        }
    }

    buf[0][1]
}

#[cfg(test)]
mod tests {
    use super::schur64;
    use crate::schur::schur;

    #[test]
    fn rejects_non_positive_energy() {
        let c = [0i32, 5, 5];
        let mut rc = [1i32; 2];
        assert_eq!(schur64(&mut rc, &c), 0);
        assert_eq!(rc, [0, 0]);
    }

    #[test]
    fn agrees_with_low_precision_schur() {
        let r0 = 1 << 29;
        let c = [r0, -r0 / 3, r0 / 5, -r0 / 11, r0 / 23, 0, 0, 0, 0, 0, 0];
        let mut rc16 = [0i32; 10];
        let mut rc15 = [0i16; 10];
        schur64(&mut rc16, &c);
        schur(&mut rc15, &c);
        for k in 0..10 {
            let hi = rc16[k] >> 1; // Q16 -> Q15
            assert!(
                (hi - i32::from(rc15[k])).abs() < 64,
                "tap {k}: {hi} vs {}",
                rc15[k]
            );
        }
    }
}
