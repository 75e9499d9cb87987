//! Autocorrelation on a warped frequency axis, computed by running the
//! input through a chain of all-pass sections and correlating each
//! section output against the input.

use crate::common::MAX_SHAPE_LPC_ORDER;
use crate::math::{clz64, limit, smlawb};

const QC: i32 = 10;
const QS: i32 = 14;

/// Fills `corr` with `order + 1` warped autocorrelations and returns
/// their scale: the result equals the true correlation shifted right by
/// the returned amount. The order must be even.
pub fn warped_autocorrelation(
    corr: &mut [i32],
    input: &[i16],
    warping_q16: i32,
    order: usize,
) -> i32 {
    debug_assert!(order & 1 == 0);
    debug_assert!(corr.len() >= order + 1);

    let mut state_qs = [0i32; MAX_SHAPE_LPC_ORDER + 1];
    let mut corr_qc = [0i64; MAX_SHAPE_LPC_ORDER + 1];

    for &sample in input {
        let mut tmp1_qs = i32::from(sample) << QS;
        let mut i = 0;
        while i < order {
            let tmp2_qs = smlawb(state_qs[i], state_qs[i + 1] - tmp1_qs, warping_q16);
            state_qs[i] = tmp1_qs;
            corr_qc[i] += (i64::from(tmp1_qs) * i64::from(state_qs[0])) >> (2 * QS - QC);
            tmp1_qs = smlawb(state_qs[i + 1], state_qs[i + 2] - tmp2_qs, warping_q16);
            state_qs[i + 1] = tmp2_qs;
            corr_qc[i + 1] += (i64::from(tmp2_qs) * i64::from(state_qs[0])) >> (2 * QS - QC);
            i += 2;
        }
        state_qs[order] = tmp1_qs;
        corr_qc[order] += (i64::from(tmp1_qs) * i64::from(state_qs[0])) >> (2 * QS - QC);
    }

    debug_assert!(corr_qc[0] >= 0);
    let lsh = limit(clz64(corr_qc[0]) - 35, -12 - QC, 30 - QC);
    let scale = -(QC + lsh);
    debug_assert!((-30..=12).contains(&scale));
    if lsh >= 0 {
        for (out, &c) in corr.iter_mut().zip(&corr_qc[..order + 1]) {
            *out = (c << lsh) as i32;
        }
    } else {
        for (out, &c) in corr.iter_mut().zip(&corr_qc[..order + 1]) {
            *out = (c >> -lsh) as i32;
        }
    }
    scale
}

#[cfg(test)]
mod tests {
    use super::warped_autocorrelation;
    use crate::autocorr::autocorr;

    #[test]
    fn zero_warping_matches_plain_autocorrelation_shape() {
        let input: alloc::vec::Vec<i16> = (0..240)
            .map(|i| (libm::sin(i as f64 * 0.3) * 3000.0) as i16)
            .collect();

        let mut warped = [0i32; 17];
        let w_scale = warped_autocorrelation(&mut warped, &input, 0, 16);

        let mut plain = [0i32; 17];
        let p_scale = autocorr(&mut plain, &input);

        // with no warping both measure the same correlations, up to scaling
        for lag in 1..17 {
            let w = f64::from(warped[lag]) * libm::pow(2.0, f64::from(w_scale));
            let p = f64::from(plain[lag]) * libm::pow(2.0, f64::from(p_scale));
            assert!((w - p).abs() < 0.02 * p.abs().max(1.0), "lag {lag}: {w} vs {p}");
        }
    }

    #[test]
    fn lag_zero_term_is_the_energy() {
        let input = [1000i16; 100];
        let mut corr = [0i32; 17];
        let scale = warped_autocorrelation(&mut corr, &input, 20000, 16);
        let energy = f64::from(corr[0]) * libm::pow(2.0, f64::from(scale));
        assert!((energy - 1e8).abs() < 1e6);
    }
}
