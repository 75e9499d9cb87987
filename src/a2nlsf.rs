//! Whitening filter coefficients to normalized line spectral frequencies.
//!
//! Roots of the symmetric/antisymmetric polynomials are located on a
//! piece-wise linear cos(f) grid, so the mapping is not an exact LSF
//! transform, but it is an accurate inverse of [`crate::nlsf2a`]. Requires
//! an even order.

use crate::bwexpander_32::bwexpander_32;
use crate::math::{rshift_round, smlaww, smulbb};
use crate::schur::MAX_ORDER_LPC;
use crate::table_lsf_cos::{LSF_COS_TAB_Q12, LSF_COS_TAB_SZ};

const BIN_DIV_STEPS: i32 = 3;
const MAX_ITERATIONS: i32 = 30;

/// Transforms a polynomial from the cos(n f) basis to powers of cos(f).
fn trans_poly(p: &mut [i32], dd: usize) {
    for k in 2..=dd {
        for n in (k + 1..=dd).rev() {
            p[n - 2] -= p[n];
        }
        p[k - 2] -= p[k] << 1;
    }
}

/// Evaluates the polynomial at `x` (Q12); coefficients and result in Q16.
fn eval_poly(p: &[i32], x: i32, dd: usize) -> i32 {
    let mut y32 = p[dd];
    let x_q16 = x << 4;
    for n in (0..dd).rev() {
        y32 = smlaww(p[n], y32, x_q16);
    }
    y32
}

fn init_poly(a_q16: &[i32], p: &mut [i32], q: &mut [i32], dd: usize) {
    p[dd] = 1 << 16;
    q[dd] = 1 << 16;
    for k in 0..dd {
        p[k] = -a_q16[dd - k - 1] - a_q16[dd + k];
        q[k] = -a_q16[dd - k - 1] + a_q16[dd + k];
    }
    // divide out the fixed roots: z = -1 from P, z = 1 from Q
    for k in (1..=dd).rev() {
        p[k - 1] -= p[k];
        q[k - 1] += q[k];
    }
    trans_poly(p, dd);
    trans_poly(q, dd);
}

/// Converts monic whitening coefficients (Q16) to NLSFs in Q15. If root
/// finding fails, the coefficients are progressively bandwidth expanded in
/// place until it converges; as a last resort the NLSFs fall back to a
/// uniform (white) spectrum.
pub fn a2nlsf(nlsf_q15: &mut [i32], a_q16: &mut [i32]) {
    let d = nlsf_q15.len();
    debug_assert!(d == a_q16.len() && d & 1 == 0 && d <= MAX_ORDER_LPC);
    let dd = d >> 1;

    let mut p = [0i32; MAX_ORDER_LPC / 2 + 1];
    let mut q = [0i32; MAX_ORDER_LPC / 2 + 1];
    init_poly(a_q16, &mut p, &mut q, dd);

    let mut on_p = true;
    let mut xlo = i32::from(LSF_COS_TAB_Q12[0]);
    let mut ylo = eval_poly(&p, xlo, dd);
    let mut root_ix = 0usize;
    if ylo < 0 {
        nlsf_q15[0] = 0;
        on_p = false;
        ylo = eval_poly(&q, xlo, dd);
        root_ix = 1;
    }

    let mut k = 1usize;
    let mut expansions = 0i32;
    loop {
        let xhi = i32::from(LSF_COS_TAB_Q12[k]);
        let poly: &[i32] = if on_p { &p } else { &q };
        let mut yhi = eval_poly(poly, xhi, dd);

        if (ylo <= 0 && yhi >= 0) || (ylo >= 0 && yhi <= 0) {
            // bisect, then interpolate the remaining fraction
            let mut ffrac = -256i32;
            let mut xhi = xhi;
            for m in 0..BIN_DIV_STEPS {
                let xmid = rshift_round(xlo + xhi, 1);
                let ymid = eval_poly(poly, xmid, dd);
                if (ylo <= 0 && ymid >= 0) || (ylo >= 0 && ymid <= 0) {
                    xhi = xmid;
                    yhi = ymid;
                } else {
                    xlo = xmid;
                    ylo = ymid;
                    ffrac += 128 >> m;
                }
            }
            if ylo.abs() < 65536 {
                let den = ylo - yhi;
                let nom = (ylo << (8 - BIN_DIV_STEPS)) + (den >> 1);
                if den != 0 {
                    ffrac += nom / den;
                }
            } else {
                ffrac += ylo / ((ylo - yhi) >> (8 - BIN_DIV_STEPS));
            }
            nlsf_q15[root_ix] = (((k as i32) << 8) + ffrac).min(i32::from(i16::MAX));
            debug_assert!(nlsf_q15[root_ix] >= 0);

            root_ix += 1;
            if root_ix >= d {
                return;
            }
            on_p = root_ix & 1 == 0;
            xlo = i32::from(LSF_COS_TAB_Q12[k - 1]);
            ylo = (1 - (root_ix as i32 & 2)) << 12;
        } else {
            k += 1;
            xlo = xhi;
            ylo = yhi;

            if k > LSF_COS_TAB_SZ {
                expansions += 1;
                if expansions > MAX_ITERATIONS {
                    // fall back to a white spectrum
                    nlsf_q15[0] = (1 << 15) / (d as i32 + 1);
                    for k in 1..d {
                        nlsf_q15[k] = smulbb(k as i32 + 1, nlsf_q15[0]);
                    }
                    return;
                }

                bwexpander_32(a_q16, 65536 - smulbb(10 + expansions, expansions));

                init_poly(a_q16, &mut p, &mut q, dd);
                on_p = true;
                xlo = i32::from(LSF_COS_TAB_Q12[0]);
                ylo = eval_poly(&p, xlo, dd);
                root_ix = 0;
                if ylo < 0 {
                    nlsf_q15[0] = 0;
                    on_p = false;
                    ylo = eval_poly(&q, xlo, dd);
                    root_ix = 1;
                }
                k = 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::a2nlsf;

    #[test]
    fn zero_filter_yields_uniformly_spaced_nlsfs() {
        let mut a = [0i32; 10];
        let mut nlsf = [0i32; 10];
        a2nlsf(&mut nlsf, &mut a);
        // roots of 1 +/- z^-d are uniformly spaced on the circle
        for k in 1..10 {
            assert!(nlsf[k] > nlsf[k - 1]);
            let spacing = nlsf[k] - nlsf[k - 1];
            assert!((spacing - 3277).abs() < 700, "spacing {spacing}");
        }
    }

    #[test]
    fn output_is_sorted_and_in_range_for_a_resonant_filter() {
        // two-pole resonance near 0.1 * pi
        let mut a = [0i32; 10];
        a[0] = (1.8 * 65536.0) as i32;
        a[1] = (-0.81 * 65536.0) as i32;
        let mut nlsf = [0i32; 10];
        a2nlsf(&mut nlsf, &mut a);
        for k in 0..10 {
            assert!((0..=32767).contains(&nlsf[k]));
            if k > 0 {
                assert!(nlsf[k] > nlsf[k - 1]);
            }
        }
    }
}
