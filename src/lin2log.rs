//! Base-2 logarithm approximation on a Q7 scale.

use crate::math::{clz_frac, smlawb};

/// Approximates `128 * log2(in_lin)` with a piece-wise parabolic fit of the
/// fractional part. Close inverse of [`crate::log2lin::log2lin`].
pub fn lin2log(in_lin: i32) -> i32 {
    let (lz, frac_q7) = clz_frac(in_lin);
    ((31 - lz) << 7) + smlawb(frac_q7, frac_q7 * (128 - frac_q7), 179)
}

#[cfg(test)]
mod tests {
    use super::lin2log;

    #[test]
    fn exact_on_powers_of_two() {
        assert_eq!(lin2log(1), 0);
        assert_eq!(lin2log(2), 128);
        assert_eq!(lin2log(1 << 20), 20 * 128);
    }

    #[test]
    fn close_to_true_log_between_powers() {
        for &x in &[3i32, 100, 12345, 1 << 25] {
            let approx = lin2log(x);
            let true_val = (libm::log2(x as f64) * 128.0) as i32;
            assert!((approx - true_val).abs() <= 2, "x = {x}");
        }
    }
}
