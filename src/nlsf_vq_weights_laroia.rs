//! Laroia low complexity NLSF error weights.
//!
//! R. Laroia, N. Phamdo and N. Farvardin, "Robust and Efficient
//! Quantization of Speech LSP Parameters Using Structured Vector
//! Quantization", Proc. ICASSP, pp. 641-644, 1991.

const Q_OUT: i32 = 6;
const MIN_NDELTA: i32 = 3;

/// Computes Q6 weights from the gaps around each Q15 NLSF. The vector
/// dimension must be even and the input sorted.
pub fn nlsf_vq_weights_laroia(weights_q6: &mut [i32], nlsf_q15: &[i32]) {
    let d = nlsf_q15.len();
    debug_assert!(d > 0 && d & 1 == 0 && weights_q6.len() == d);

    let mut tmp1 = (1 << (15 + Q_OUT)) / nlsf_q15[0].max(MIN_NDELTA);
    let mut tmp2 = (1 << (15 + Q_OUT)) / (nlsf_q15[1] - nlsf_q15[0]).max(MIN_NDELTA);
    weights_q6[0] = (tmp1 + tmp2).min(i32::from(i16::MAX));
    debug_assert!(weights_q6[0] > 0);

    let mut k = 1;
    while k < d - 1 {
        tmp1 = (1 << (15 + Q_OUT)) / (nlsf_q15[k + 1] - nlsf_q15[k]).max(MIN_NDELTA);
        weights_q6[k] = (tmp1 + tmp2).min(i32::from(i16::MAX));
        debug_assert!(weights_q6[k] > 0);

        tmp2 = (1 << (15 + Q_OUT)) / (nlsf_q15[k + 2] - nlsf_q15[k + 1]).max(MIN_NDELTA);
        weights_q6[k + 1] = (tmp1 + tmp2).min(i32::from(i16::MAX));
        debug_assert!(weights_q6[k + 1] > 0);

        k += 2;
    }

    tmp1 = (1 << (15 + Q_OUT)) / ((1 << 15) - nlsf_q15[d - 1]).max(MIN_NDELTA);
    weights_q6[d - 1] = (tmp1 + tmp2).min(i32::from(i16::MAX));
    debug_assert!(weights_q6[d - 1] > 0);
}

#[cfg(test)]
mod tests {
    use super::nlsf_vq_weights_laroia;

    #[test]
    fn narrow_gaps_get_large_weights() {
        let nlsf = [2000, 2100, 12000, 16000, 24000, 30000];
        let mut w = [0i32; 6];
        nlsf_vq_weights_laroia(&mut w, &nlsf);
        // the pair around the 100-wide gap dominates
        assert!(w[0] > w[2] && w[1] > w[2]);
        assert!(w.iter().all(|&x| x > 0 && x <= i32::from(i16::MAX)));
    }

    #[test]
    fn uniform_spacing_gives_uniform_interior_weights() {
        let nlsf: alloc::vec::Vec<i32> = (1..=10).map(|k| k * 32768 / 11).collect();
        let mut w = [0i32; 10];
        nlsf_vq_weights_laroia(&mut w, &nlsf);
        for k in 1..9 {
            assert_eq!(w[k], w[1]);
        }
    }
}
