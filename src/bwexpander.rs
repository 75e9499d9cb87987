//! Bandwidth expansion (chirping) of AR filters, pulling poles toward the
//! origin for stability margin.

use crate::math::rshift_round;

/// Chirps a Q12 AR filter in place by `chirp_q16`.
///
/// Uses an unbiased rounding multiply; a biased one can push marginally
/// stable filters over the edge.
pub fn bwexpander(ar: &mut [i16], chirp_q16: i32) {
    let d = ar.len();
    if d == 0 {
        return;
    }
    let chirp_minus_one_q16 = chirp_q16 - 65536;
    let mut chirp_q16 = chirp_q16;

    for coef in ar.iter_mut().take(d - 1) {
        *coef = rshift_round(chirp_q16.wrapping_mul(i32::from(*coef)), 16) as i16;
        chirp_q16 += rshift_round(chirp_q16.wrapping_mul(chirp_minus_one_q16), 16);
    }
    ar[d - 1] = rshift_round(chirp_q16.wrapping_mul(i32::from(ar[d - 1])), 16) as i16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_chirp_is_identity() {
        let mut ar = [1000i16, -2000, 500];
        bwexpander(&mut ar, 65536);
        assert_eq!(ar, [1000, -2000, 500]);
    }

    #[test]
    fn chirp_shrinks_higher_coefficients_faster() {
        let mut ar = [4096i16, 4096, 4096];
        bwexpander(&mut ar, 64225); // 0.98 in Q16
        assert!(ar[0] > ar[1] && ar[1] > ar[2]);
        assert!(ar[0] < 4096);
    }
}
