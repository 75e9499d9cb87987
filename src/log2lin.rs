//! Base-2 exponential approximation from a Q7 log scale.

use crate::math::smlawb;

/// Approximates `2^(in_log_q7 / 128)`; close inverse of
/// [`crate::lin2log::lin2log`]. Saturates at the `i32` range.
pub fn log2lin(in_log_q7: i32) -> i32 {
    if in_log_q7 < 0 {
        return 0;
    }
    if in_log_q7 >= 31 << 7 {
        return i32::MAX;
    }

    let mut out = 1i32 << (in_log_q7 >> 7);
    let frac_q7 = in_log_q7 & 0x7f;
    if in_log_q7 < 2048 {
        out += (out * smlawb(frac_q7, frac_q7 * (128 - frac_q7), -174)) >> 7;
    } else {
        out += (out >> 7) * smlawb(frac_q7, frac_q7 * (128 - frac_q7), -174);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::log2lin;
    use crate::lin2log::lin2log;

    #[test]
    fn exact_on_powers_of_two() {
        assert_eq!(log2lin(0), 1);
        assert_eq!(log2lin(10 * 128), 1024);
    }

    #[test]
    fn inverts_lin2log_within_tolerance() {
        for &x in &[5i32, 77, 4096, 1_000_000] {
            let round_trip = log2lin(lin2log(x));
            assert!((round_trip - x).abs() <= x / 100 + 2, "x = {x}");
        }
    }

    #[test]
    fn clamps_out_of_range_input() {
        assert_eq!(log2lin(-5), 0);
        assert_eq!(log2lin(31 << 7), i32::MAX);
    }
}
