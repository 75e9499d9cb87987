//! Inner products, energy with dynamic scaling and other small vector
//! helpers shared by the analysis kernels.

use crate::math::{smlabb, smulbb, smulwb};

/// 32-bit inner product of two 16-bit vectors.
pub fn inner_prod(in_vec1: &[i16], in_vec2: &[i16]) -> i32 {
    let mut sum = 0i32;
    for (&a, &b) in in_vec1.iter().zip(in_vec2) {
        sum = smlabb(sum, i32::from(a), i32::from(b));
    }
    sum
}

/// 64-bit inner product, for long windows where 32 bits can overflow.
pub fn inner_prod16_64(in_vec1: &[i16], in_vec2: &[i16]) -> i64 {
    let mut sum = 0i64;
    for (&a, &b) in in_vec1.iter().zip(in_vec2) {
        sum += i64::from(a) * i64::from(b);
    }
    sum
}

/// Largest absolute value in the vector, saturated to `i16::MAX` so the
/// result can be negated safely.
pub fn int16_array_maxabs(vec: &[i16]) -> i16 {
    let mut max = 0i32;
    let mut ind = 0usize;
    for (i, &v) in vec.iter().enumerate() {
        let lvl = smulbb(i32::from(v), i32::from(v));
        if lvl > max {
            max = lvl;
            ind = i;
        }
    }
    if max >= 1_073_676_289 {
        // (2^15 - 1)^2; -32768 must not be returned as-is
        i16::MAX
    } else if vec.is_empty() {
        0
    } else {
        vec[ind].unsigned_abs() as i16
    }
}

/// Energy of `x` right-shifted until it fits an `i32` with two leading
/// zeros; returns `(energy, shift)`.
pub fn sum_sqr_shift(x: &[i16]) -> (i32, i32) {
    let mut shft = 0i32;
    let mut nrg = 0u64;
    for &v in x {
        nrg += (i64::from(v) * i64::from(v)) as u64;
    }
    while nrg & 0xffff_ffff_c000_0000 != 0 {
        nrg >>= 2;
        shft += 2;
    }
    (nrg as i32, shft)
}

/// Copies `src` into `dst` scaled by `gain_q16`.
pub fn scale_copy_vector16(dst: &mut [i16], src: &[i16], gain_q16: i32) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = smulwb(gain_q16, i32::from(s)) as i16;
    }
}

/// Scales a 32-bit vector in place: `v = (v >> 8) * (gain_q26 >> 8) >> 10`,
/// net effect `v * gain` in Q18.
pub fn scale_vector32_q26_lshift_18(data: &mut [i32], gain_q26: i32) {
    for v in data.iter_mut() {
        *v = ((i64::from(*v) * i64::from(gain_q26)) >> 8) as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_products_agree() {
        let a = [100i16, -200, 300, 1000];
        let b = [7i16, 11, -13, 2];
        let want: i64 = a.iter().zip(&b).map(|(&x, &y)| i64::from(x) * i64::from(y)).sum();
        assert_eq!(i64::from(inner_prod(&a, &b)), want);
        assert_eq!(inner_prod16_64(&a, &b), want);
    }

    #[test]
    fn maxabs_handles_extremes() {
        assert_eq!(int16_array_maxabs(&[3, -7, 5]), 7);
        assert_eq!(int16_array_maxabs(&[i16::MIN, 4]), i16::MAX);
        assert_eq!(int16_array_maxabs(&[]), 0);
    }

    #[test]
    fn sum_sqr_shift_keeps_headroom() {
        let x = [i16::MAX; 512];
        let (nrg, shift) = sum_sqr_shift(&x);
        assert!(nrg >= 0);
        assert_eq!(
            (i64::from(nrg)) << shift,
            ((i64::from(i16::MAX) * i64::from(i16::MAX) * 512) >> shift) << shift
        );
        assert_eq!(nrg & 0x4000_0000u32 as i32, 0);

        let (nrg_small, shift_small) = sum_sqr_shift(&[3, 4]);
        assert_eq!((nrg_small, shift_small), (25, 0));
    }
}
