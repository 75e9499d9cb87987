//! Step-up recursion from reflection coefficients to predictor
//! coefficients.

use crate::math::{smlawb, smlaww};

/// Converts Q15 reflection coefficients to Q24 prediction coefficients.
pub fn k2a(a_q24: &mut [i32], rc_q15: &[i16]) {
    debug_assert!(a_q24.len() >= rc_q15.len());

    for (k, &rc) in rc_q15.iter().enumerate() {
        let rc = i32::from(rc);
        for n in 0..(k + 1) >> 1 {
            let tmp1 = a_q24[n];
            let tmp2 = a_q24[k - n - 1];
            a_q24[n] = smlawb(tmp1, tmp2 << 1, rc);
            a_q24[k - n - 1] = smlawb(tmp2, tmp1 << 1, rc);
        }
        a_q24[k] = -(rc << 9);
    }
}

/// Same recursion for Q16 reflection coefficients.
pub fn k2a_q16(a_q24: &mut [i32], rc_q16: &[i32]) {
    debug_assert!(a_q24.len() >= rc_q16.len());

    for (k, &rc) in rc_q16.iter().enumerate() {
        for n in 0..(k + 1) >> 1 {
            let tmp1 = a_q24[n];
            let tmp2 = a_q24[k - n - 1];
            a_q24[n] = smlaww(tmp1, tmp2, rc);
            a_q24[k - n - 1] = smlaww(tmp2, tmp1, rc);
        }
        a_q24[k] = -(rc << 8);
    }
}

#[cfg(test)]
mod tests {
    use super::{k2a, k2a_q16};

    #[test]
    fn single_reflection_coefficient() {
        let mut a_q24 = [0i32; 1];
        k2a(&mut a_q24, &[16_384]);
        assert_eq!(a_q24, [-8_388_608]);
    }

    #[test]
    fn q15_and_q16_variants_agree() {
        let rc_q15 = [8_192i16, -4_096, 2_048];
        let rc_q16: alloc::vec::Vec<i32> = rc_q15.iter().map(|&r| i32::from(r) << 1).collect();
        let mut a = [0i32; 3];
        let mut b = [0i32; 3];
        k2a(&mut a, &rc_q15);
        k2a_q16(&mut b, &rc_q16);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() <= 1 << 9);
        }
    }

    #[test]
    fn two_stage_conversion() {
        let mut a_q24 = [0i32; 2];
        k2a(&mut a_q24, &[8_192, 4_096]);
        assert_eq!(a_q24, [-4_718_592, -2_097_152]);
    }
}
