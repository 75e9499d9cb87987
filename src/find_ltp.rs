//! Long-term predictor search: per-subframe weighted least squares over
//! five taps around the pitch lag, followed by a smoothing pass that
//! pulls weak gain vectors towards the subframe average.

use crate::common::NB_SUBFR;
use crate::corr_matrix::{corr_matrix, corr_vector, regularize_correlations};
use crate::lin2log::lin2log;
use crate::math::{
    clz32, div32_var_q, fix_const, lshift_sat32, rshift_round, sat16, smlawb, smulbb, smulwb,
    smulww,
};
use crate::residual_energy::residual_energy16_covar;
use crate::solve_ls::solve_ldl;
use crate::tables_ltp::LTP_ORDER;
use crate::vector_ops::{scale_vector32_q26_lshift_18, sum_sqr_shift};

const LTP_CORRS_HEAD_ROOM: i32 = 2;
const LTP_DAMPING_DIV3_Q16: i32 = fix_const(0.01 / 3.0, 16);
const LTP_SMOOTHING_Q26: i32 = fix_const(0.1, 26);

fn fit_ltp(b_q16: &[i32; LTP_ORDER], b_q14: &mut [i16]) {
    for (out, &v) in b_q14.iter_mut().zip(b_q16) {
        *out = sat16(rshift_round(v, 2));
    }
}

/// Finds unquantized LTP coefficients for all subframes, the weighting
/// matrices for their quantization, and the LTP coding gain.
///
/// `r_first` and `r_last` hold the whitened residual for the first and
/// last half of the frame, each preceded by `mem_offset` history samples.
/// Outputs land in `b_q14` (5 taps per subframe), `w_ltp` (a 5x5 matrix
/// per subframe) and `corr_rshifts`. Returns the coding gain in Q7.
#[allow(clippy::too_many_arguments)]
pub fn find_ltp(
    b_q14: &mut [i16; NB_SUBFR * LTP_ORDER],
    w_ltp: &mut [i32; NB_SUBFR * LTP_ORDER * LTP_ORDER],
    r_first: &[i16],
    r_last: &[i16],
    lag: &[usize; NB_SUBFR],
    wght_q15: &[i32; NB_SUBFR],
    subfr_length: usize,
    mem_offset: usize,
    corr_rshifts: &mut [i32; NB_SUBFR],
) -> i32 {
    let mut w = [0i32; NB_SUBFR];
    let mut rr = [0i32; NB_SUBFR];
    let mut nrg = [0i32; NB_SUBFR];

    let mut r = r_first;
    let mut r_ix = mem_offset;
    for k in 0..NB_SUBFR {
        if k == NB_SUBFR >> 1 {
            // second half of the frame lives in its own residual
            r = r_last;
            r_ix = mem_offset;
        }
        let lag_ix = r_ix - (lag[k] + LTP_ORDER / 2);
        let w_sub = &mut w_ltp[k * LTP_ORDER * LTP_ORDER..(k + 1) * LTP_ORDER * LTP_ORDER];

        let (mut rr_k, mut rr_shifts) = sum_sqr_shift(&r[r_ix..r_ix + subfr_length]);

        let lzs = clz32(rr_k);
        if lzs < LTP_CORRS_HEAD_ROOM {
            rr_k = rshift_round(rr_k, LTP_CORRS_HEAD_ROOM - lzs);
            rr_shifts += LTP_CORRS_HEAD_ROOM - lzs;
        }

        let basis = &r[lag_ix..lag_ix + subfr_length + LTP_ORDER - 1];
        corr_rshifts[k] = corr_matrix(
            basis,
            subfr_length,
            LTP_ORDER,
            LTP_CORRS_HEAD_ROOM,
            w_sub,
            rr_shifts,
        );

        let mut rr_vec = [0i32; LTP_ORDER];
        corr_vector(
            basis,
            &r[r_ix..r_ix + subfr_length],
            LTP_ORDER,
            &mut rr_vec,
            corr_rshifts[k],
        );
        if corr_rshifts[k] > rr_shifts {
            rr_k >>= corr_rshifts[k] - rr_shifts;
        }
        rr[k] = rr_k;
        debug_assert!(rr[k] >= 0);

        let mut regu = 1;
        regu = smlawb(regu, rr[k], LTP_DAMPING_DIV3_Q16);
        regu = smlawb(regu, w_sub[0], LTP_DAMPING_DIV3_Q16);
        regu = smlawb(
            regu,
            w_sub[LTP_ORDER * LTP_ORDER - 1],
            LTP_DAMPING_DIV3_Q16,
        );
        regularize_correlations(w_sub, &mut rr[k..k + 1], regu, LTP_ORDER);

        let mut b_q16 = [0i32; LTP_ORDER];
        solve_ldl(w_sub, LTP_ORDER, &rr_vec, &mut b_q16);

        let b_sub = &mut b_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER];
        fit_ltp(&b_q16, b_sub);

        let b_arr: &[i16; LTP_ORDER] = (&*b_sub).try_into().unwrap();
        nrg[k] = residual_energy16_covar(b_arr, w_sub, &rr_vec, rr[k], 14);

        // weight = Wght / (nrg * Wght + 0.01 * subfr_length)
        let extra_shifts = corr_rshifts[k].min(LTP_CORRS_HEAD_ROOM);
        let denom32 = lshift_sat32(smulwb(nrg[k], wght_q15[k]), 1 + extra_shifts)
            + ((smulwb(subfr_length as i32, 655)) >> (corr_rshifts[k] - extra_shifts));
        let denom32 = denom32.max(1);
        let temp32 = (wght_q15[k] << 16) / denom32;
        let temp32 = temp32 >> (31 + corr_rshifts[k] - extra_shifts - 26);

        // cap the scale so the matrix never wraps
        let mut w_ltp_max = 0;
        for &v in w_sub.iter() {
            w_ltp_max = v.max(w_ltp_max);
        }
        let lshift = clz32(w_ltp_max) - 1 - 3; // 3 bits free for the gain VQ
        let temp32 = if 26 - 18 + lshift < 31 {
            temp32.min(1 << (26 - 18 + lshift))
        } else {
            temp32
        };

        scale_vector32_q26_lshift_18(w_sub, temp32);
        w[k] = w_sub[(LTP_ORDER >> 1) * LTP_ORDER + (LTP_ORDER >> 1)];
        debug_assert!(w[k] >= 0);

        r_ix += subfr_length;
    }

    let mut max_rshifts = 0;
    for k in 0..NB_SUBFR {
        max_rshifts = corr_rshifts[k].max(max_rshifts);
    }

    // LTP coding gain
    let mut lpc_res_nrg = 0i32;
    let mut lpc_ltp_res_nrg = 0i32;
    for k in 0..NB_SUBFR {
        lpc_res_nrg +=
            (smulwb(rr[k], wght_q15[k]) + 1) >> (1 + (max_rshifts - corr_rshifts[k]));
        lpc_ltp_res_nrg +=
            (smulwb(nrg[k], wght_q15[k]) + 1) >> (1 + (max_rshifts - corr_rshifts[k]));
    }
    let lpc_ltp_res_nrg = lpc_ltp_res_nrg.max(1);
    let div_q16 = div32_var_q(lpc_res_nrg, lpc_ltp_res_nrg, 16);
    let ltp_pred_cod_gain_q7 = smulbb(3, lin2log(div_q16) - (16 << 7));

    // smoothing: pull each subframe's tap sum towards the weighted mean
    let mut d_q14 = [0i32; NB_SUBFR];
    for k in 0..NB_SUBFR {
        for &b in &b_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER] {
            d_q14[k] += i32::from(b);
        }
    }

    let mut max_abs_d_q14 = 0i32;
    let mut max_w_bits = 0i32;
    for k in 0..NB_SUBFR {
        max_abs_d_q14 = max_abs_d_q14.max(d_q14[k].abs());
        max_w_bits = max_w_bits.max(32 - clz32(w[k]) + corr_rshifts[k] - max_rshifts);
    }
    debug_assert!(max_abs_d_q14 <= 5 << 15);

    let extra_shifts = (max_w_bits + 32 - clz32(max_abs_d_q14) - 14 - (32 - 1 - 2 + max_rshifts))
        .max(0);
    let max_rshifts_wxtra = max_rshifts + extra_shifts;

    let mut temp32 = (262 >> (max_rshifts + extra_shifts)) + 1; // 1e-3 in Q(18 - shifts)
    let mut wd = 0i32;
    for k in 0..NB_SUBFR {
        temp32 += w[k] >> (max_rshifts_wxtra - corr_rshifts[k]);
        wd += smulww(w[k] >> (max_rshifts_wxtra - corr_rshifts[k]), d_q14[k]) << 2;
    }
    let m_q12 = div32_var_q(wd, temp32, 12);

    for k in 0..NB_SUBFR {
        let temp32 = if 2 - corr_rshifts[k] > 0 {
            w[k] >> (2 - corr_rshifts[k])
        } else {
            lshift_sat32(w[k], corr_rshifts[k] - 2)
        };

        let g_q26 = (LTP_SMOOTHING_Q26 / ((LTP_SMOOTHING_Q26 >> 10) + temp32))
            .wrapping_mul(lshift_sat32(m_q12.saturating_sub(d_q14[k] >> 2), 4));

        let b_sub = &mut b_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER];
        let mut delta_b_q14 = [0i32; LTP_ORDER];
        let mut sum_q14 = 0i32;
        for (delta, &b) in delta_b_q14.iter_mut().zip(b_sub.iter()) {
            *delta = i32::from(b).max(1638); // 0.1 in Q14
            sum_q14 += *delta;
        }
        let temp32 = g_q26 / sum_q14;
        for (b, &delta) in b_sub.iter_mut().zip(&delta_b_q14) {
            *b = crate::math::limit(
                i32::from(*b) + smulwb(lshift_sat32(temp32, 4), delta),
                -16000,
                28000,
            ) as i16;
        }
    }

    ltp_pred_cod_gain_q7
}

#[cfg(test)]
mod tests {
    use super::find_ltp;
    use crate::common::NB_SUBFR;
    use crate::tables_ltp::LTP_ORDER;

    #[test]
    fn periodic_residual_yields_positive_taps_and_gain() {
        let subfr_length = 80;
        let mem_offset = 320;
        let period = 64usize;
        let buf_len = mem_offset + 2 * subfr_length;
        let make = |phase0: usize| -> alloc::vec::Vec<i16> {
            (0..buf_len)
                .map(|i| {
                    let ph = ((i + phase0) % period) as f64 / period as f64;
                    (libm::sin(2.0 * core::f64::consts::PI * ph) * 4000.0) as i16
                })
                .collect()
        };
        let r_first = make(0);
        let r_last = make(2 * subfr_length);

        let mut b_q14 = [0i16; NB_SUBFR * LTP_ORDER];
        let mut w_ltp = [0i32; NB_SUBFR * LTP_ORDER * LTP_ORDER];
        let mut corr_rshifts = [0i32; NB_SUBFR];
        let lag = [period; NB_SUBFR];
        let wght_q15 = [16384i32; NB_SUBFR];

        let gain_q7 = find_ltp(
            &mut b_q14,
            &mut w_ltp,
            &r_first,
            &r_last,
            &lag,
            &wght_q15,
            subfr_length,
            mem_offset,
            &mut corr_rshifts,
        );

        // a perfectly periodic signal is highly predictable
        assert!(gain_q7 > 0);
        for k in 0..NB_SUBFR {
            let tap_sum: i32 = b_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER]
                .iter()
                .map(|&b| i32::from(b))
                .sum();
            assert!(tap_sum > 8192, "tap sum {tap_sum} too small");
        }
    }
}
