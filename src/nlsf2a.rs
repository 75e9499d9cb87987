//! Normalized line spectral frequencies back to whitening filter
//! coefficients; the accurate inverse of [`crate::a2nlsf`].

use crate::bwexpander_32::bwexpander_32;
use crate::math::{rshift_round, rshift_round64, sat16};
use crate::schur::MAX_ORDER_LPC;
use crate::table_lsf_cos::LSF_COS_TAB_Q12;

/// Builds the polynomial with roots at the interleaved cos values (Q20).
fn find_poly(out: &mut [i32], c_lsf_q20: &[i32], dd: usize) {
    out[0] = 1 << 20;
    out[1] = -c_lsf_q20[0];
    for k in 1..dd {
        let ftmp = c_lsf_q20[2 * k];
        out[k + 1] = (out[k - 1] << 1)
            - rshift_round64(i64::from(ftmp) * i64::from(out[k]), 20) as i32;
        for n in (2..=k).rev() {
            out[n] += out[n - 2]
                - rshift_round64(i64::from(ftmp) * i64::from(out[n - 1]), 20) as i32;
        }
        out[1] -= ftmp;
    }
}

/// Converts Q15 NLSFs to monic Q12 whitening coefficients. Magnitudes are
/// scaled down if any coefficient would overflow 16 bits.
pub fn nlsf2a(a_q12: &mut [i16], nlsf_q15: &[i32]) {
    let d = nlsf_q15.len();
    debug_assert!(a_q12.len() == d && d & 1 == 0 && d <= MAX_ORDER_LPC);

    // 2 * cos(pi * nlsf) via linear interpolation of the table
    let mut cos_lsf_q20 = [0i32; MAX_ORDER_LPC];
    for (k, &nlsf) in nlsf_q15.iter().enumerate() {
        debug_assert!((0..=32767).contains(&nlsf));
        let f_int = (nlsf >> 8) as usize;
        let f_frac = nlsf - ((f_int as i32) << 8);
        let cos_val = i32::from(LSF_COS_TAB_Q12[f_int]);
        let delta = i32::from(LSF_COS_TAB_Q12[f_int + 1]) - cos_val;
        cos_lsf_q20[k] = (cos_val << 8) + delta * f_frac;
    }

    let dd = d >> 1;
    let mut p = [0i32; MAX_ORDER_LPC / 2 + 1];
    let mut q = [0i32; MAX_ORDER_LPC / 2 + 1];
    find_poly(&mut p, &cos_lsf_q20[0..], dd);
    find_poly(&mut q, &cos_lsf_q20[1..], dd);

    let mut a_int32 = [0i32; MAX_ORDER_LPC];
    for k in 0..dd {
        let ptmp = p[k + 1] + p[k];
        let qtmp = q[k + 1] - q[k];
        a_int32[k] = -rshift_round(ptmp + qtmp, 9);
        a_int32[d - k - 1] = rshift_round(qtmp - ptmp, 9);
    }

    let mut iterations = 0;
    loop {
        let (idx, maxabs) = a_int32[..d]
            .iter()
            .map(|v| v.abs())
            .enumerate()
            .max_by_key(|&(_, v)| v)
            .unwrap_or((0, 0));

        if maxabs <= i32::from(i16::MAX) {
            break;
        }
        iterations += 1;
        if iterations > 10 {
            for v in a_int32[..d].iter_mut() {
                *v = i32::from(sat16(*v));
            }
            break;
        }
        let maxabs = maxabs.min(98_369);
        let sc_q16 = 65470
            - ((65470 >> 2) * (maxabs - i32::from(i16::MAX)))
                / ((maxabs * (idx as i32 + 1)) >> 2);
        bwexpander_32(&mut a_int32[..d], sc_q16);
    }

    for (a, &v) in a_q12.iter_mut().zip(&a_int32[..d]) {
        *a = v as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::nlsf2a;
    use crate::a2nlsf::a2nlsf;

    #[test]
    fn round_trips_through_a2nlsf() {
        // uniformly spaced NLSFs correspond to a zero predictor
        let nlsf: alloc::vec::Vec<i32> = (1..=10).map(|k| k * 32768 / 11).collect();
        let mut a_q12 = [0i16; 10];
        nlsf2a(&mut a_q12, &nlsf);

        let mut a_q16: alloc::vec::Vec<i32> =
            a_q12.iter().map(|&v| i32::from(v) << 4).collect();
        let mut nlsf_back = [0i32; 10];
        a2nlsf(&mut nlsf_back, &mut a_q16);

        for k in 0..10 {
            assert!(
                (nlsf_back[k] - nlsf[k]).abs() < 250,
                "k = {k}: {} vs {}",
                nlsf_back[k],
                nlsf[k]
            );
        }
    }
}
