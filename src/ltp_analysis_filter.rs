//! LTP analysis filter: subtracts the five tap long-term prediction and
//! scales each subframe by its inverse quantization gain.

use crate::common::NB_SUBFR;
use crate::math::{rshift_round, sat16, smlabb, smulbb, smulwb};
use crate::tables_ltp::LTP_ORDER;

/// Produces `NB_SUBFR` blocks of `pre_length + subfr_length` residual
/// samples. `x` must carry at least `max(pitch_lags) + LTP_ORDER / 2`
/// samples of history before `x_offset`.
pub fn ltp_analysis_filter(
    ltp_res: &mut [i16],
    x: &[i16],
    x_offset: usize,
    ltp_coef_q14: &[i16; LTP_ORDER * NB_SUBFR],
    pitch_lags: &[usize; NB_SUBFR],
    inv_gains_q16: &[i32; NB_SUBFR],
    subfr_length: usize,
    pre_length: usize,
) {
    let blk = subfr_length + pre_length;
    debug_assert!(ltp_res.len() >= NB_SUBFR * blk);

    let mut x_ix = x_offset;
    for k in 0..NB_SUBFR {
        let b = &ltp_coef_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER];
        let res = &mut ltp_res[k * blk..(k + 1) * blk];
        let mut lag_ix = x_ix - pitch_lags[k];

        for (i, out) in res.iter_mut().enumerate() {
            // five taps centered on the lagged sample
            let mut ltp_est = smulbb(
                i32::from(x[lag_ix + LTP_ORDER / 2]),
                i32::from(b[0]),
            );
            for j in 1..LTP_ORDER {
                ltp_est = smlabb(
                    ltp_est,
                    i32::from(x[lag_ix + LTP_ORDER / 2 - j]),
                    i32::from(b[j]),
                );
            }
            let ltp_est = rshift_round(ltp_est, 14);

            let res16 = sat16(i32::from(x[x_ix + i]) - ltp_est);
            *out = smulwb(inv_gains_q16[k], i32::from(res16)) as i16;

            lag_ix += 1;
        }
        x_ix += subfr_length;
    }
}

#[cfg(test)]
mod tests {
    use super::ltp_analysis_filter;
    use crate::common::NB_SUBFR;
    use crate::tables_ltp::LTP_ORDER;

    #[test]
    fn unit_center_tap_removes_a_periodic_signal() {
        let subfr_length = 40;
        let pre_length = 10;
        let period = 25usize;
        let x_offset = 100;
        let x: alloc::vec::Vec<i16> = (0..x_offset + NB_SUBFR * subfr_length + pre_length)
            .map(|i| if i % period == 0 { 6000 } else { 0 })
            .collect();

        // single tap of 1.0 in Q14 at the center position
        let mut coef = [0i16; LTP_ORDER * NB_SUBFR];
        for k in 0..NB_SUBFR {
            coef[k * LTP_ORDER + 2] = 1 << 14;
        }
        let lags = [period; NB_SUBFR];
        let inv_gains = [1 << 16; NB_SUBFR];

        let mut res = alloc::vec![0i16; NB_SUBFR * (subfr_length + pre_length)];
        ltp_analysis_filter(
            &mut res,
            &x,
            x_offset,
            &coef,
            &lags,
            &inv_gains,
            subfr_length,
            pre_length,
        );
        assert!(res.iter().all(|&v| v == 0));
    }
}
