//! 32-bit variant of the AR chirp, for Q16 coefficient vectors.

use crate::math::smulww;

/// Chirps a Q16 AR filter in place by `chirp_q16`.
pub fn bwexpander_32(ar: &mut [i32], chirp_q16: i32) {
    let d = ar.len();
    if d == 0 {
        return;
    }
    let chirp_minus_one_q16 = chirp_q16 - 65536;
    let mut chirp_q16 = chirp_q16;

    for coef in ar.iter_mut().take(d - 1) {
        *coef = smulww(chirp_q16, *coef);
        chirp_q16 += smulww(chirp_q16, chirp_minus_one_q16);
    }
    ar[d - 1] = smulww(chirp_q16, ar[d - 1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_direct_scaling_for_short_filters() {
        let mut ar = [1 << 16, -(1 << 15)];
        bwexpander_32(&mut ar, 62259); // 0.95 in Q16
        assert_eq!(ar[0], 62259);
        // second tap scaled by 0.95^2
        assert!((ar[1] + 29574).abs() < 32);
    }
}
