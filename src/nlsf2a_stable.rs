//! NLSF to whitening coefficient conversion with a guaranteed-stable
//! result.

use crate::bwexpander::bwexpander;
use crate::lpc_inv_pred_gain::lpc_inverse_pred_gain;
use crate::math::smulbb;
use crate::nlsf2a::nlsf2a;

const MAX_LPC_STABILIZE_ITERATIONS: i32 = 20;

/// Converts Q15 NLSFs to Q12 coefficients, bandwidth expanding with an
/// increasing chirp until the filter passes the stability test. Zeroes
/// the coefficients if it never does.
pub fn nlsf2a_stable(a_q12: &mut [i16], nlsf_q15: &[i32]) {
    nlsf2a(a_q12, nlsf_q15);

    let mut i = 0;
    while i < MAX_LPC_STABILIZE_ITERATIONS {
        if lpc_inverse_pred_gain(a_q12).is_some() {
            break;
        }
        bwexpander(a_q12, 65536 - smulbb(10 + i, i));
        i += 1;
    }

    if i == MAX_LPC_STABILIZE_ITERATIONS {
        for a in a_q12.iter_mut() {
            *a = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::nlsf2a_stable;
    use crate::lpc_inv_pred_gain::lpc_inverse_pred_gain;

    #[test]
    fn result_is_always_stable() {
        // tightly clustered NLSFs produce a near-unstable filter
        let nlsf = [500, 600, 700, 800, 16000, 16100, 30000, 30100, 31000, 31100];
        let mut a_q12 = [0i16; 10];
        nlsf2a_stable(&mut a_q12, &nlsf);
        assert!(lpc_inverse_pred_gain(&a_q12).is_some());
    }

    #[test]
    fn well_spaced_nlsfs_convert_without_expansion() {
        let nlsf: alloc::vec::Vec<i32> = (1..=10).map(|k| k * 32768 / 11).collect();
        let mut a_q12 = [0i16; 10];
        nlsf2a_stable(&mut a_q12, &nlsf);
        // zero predictor expected for a flat spectrum
        for &a in &a_q12 {
            assert!(a.abs() < 80);
        }
    }
}
