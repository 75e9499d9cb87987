//! Autocorrelation with automatic scaling.

use crate::math::clz64;
use crate::vector_ops::{inner_prod, inner_prod16_64};

/// Computes `results.len()` autocorrelation taps of `input`, scaled so the
/// zero-lag term holds 29 significant bits, leaving headroom for noise-floor
/// additions. Returns the number of right shifts applied; negative when the
/// correlations were shifted up to reach that level.
pub fn autocorr(results: &mut [i32], input: &[i16]) -> i32 {
    let corr_count = results.len().min(input.len());

    // zero-lag energy; +1 keeps all-zero input well defined
    let corr64 = inner_prod16_64(input, input) + 1;

    let lz = clz64(corr64);
    let n_right_shifts = 35 - lz;

    if n_right_shifts <= 0 {
        results[0] = (corr64 as i32) << -n_right_shifts;
        for i in 1..corr_count {
            results[i] = inner_prod(input, &input[i..]) << -n_right_shifts;
        }
    } else {
        results[0] = (corr64 >> n_right_shifts) as i32;
        for i in 1..corr_count {
            results[i] = (inner_prod16_64(input, &input[i..]) >> n_right_shifts) as i32;
        }
    }
    n_right_shifts
}

#[cfg(test)]
mod tests {
    use super::autocorr;

    #[test]
    fn zero_lag_dominates_and_scale_is_tracked() {
        let x: alloc::vec::Vec<i16> = (0..160).map(|i| ((i * 37) % 4001) as i16 - 2000).collect();
        let mut r = [0i32; 5];
        let scale = autocorr(&mut r, &x);
        for &tap in &r[1..] {
            assert!(tap.abs() <= r[0]);
        }
        // zero lag holds the energy at the returned scale, in either direction
        let energy: i64 = x.iter().map(|&v| i64::from(v) * i64::from(v)).sum::<i64>() + 1;
        let scaled = if scale >= 0 { energy >> scale } else { energy << -scale };
        assert_eq!(scaled, i64::from(r[0]));
        // normalized to 29 significant bits regardless of input level
        assert!(r[0] >= 1 << 28 && i64::from(r[0]) < 1i64 << 29);
    }

    #[test]
    fn quiet_input_is_scaled_up() {
        let x = [3i16; 160];
        let mut r = [0i32; 3];
        let scale = autocorr(&mut r, &x);
        assert!(scale < 0);
        assert!(r[0] >= 1 << 28 && i64::from(r[0]) < 1i64 << 29);
    }

    #[test]
    fn all_zero_input_is_well_defined() {
        let x = [0i16; 64];
        let mut r = [0i32; 3];
        let scale = autocorr(&mut r, &x);
        assert!(scale <= 0);
        assert_eq!(r[0], 1 << -scale);
        assert_eq!(&r[1..], &[0, 0]);
    }
}
