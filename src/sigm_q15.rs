//! Table-interpolated sigmoid, used by the VAD and noise shaping to map
//! unbounded measures into 0..1.

use crate::math::smulbb;

const SIGM_LUT_SLOPE_Q10: [i32; 6] = [237, 153, 73, 30, 12, 7];
const SIGM_LUT_POS_Q15: [i32; 6] = [16384, 23955, 28861, 31213, 32178, 32548];
const SIGM_LUT_NEG_Q15: [i32; 6] = [16384, 8812, 3906, 1554, 589, 219];

/// `1 / (1 + exp(-x))` with `x` in Q5, result in Q15.
pub fn sigm_q15(in_q5: i32) -> i32 {
    if in_q5 < 0 {
        let in_q5 = -in_q5;
        if in_q5 >= 6 * 32 {
            0
        } else {
            let ind = (in_q5 >> 5) as usize;
            SIGM_LUT_NEG_Q15[ind] - smulbb(SIGM_LUT_SLOPE_Q10[ind], in_q5 & 0x1f)
        }
    } else if in_q5 >= 6 * 32 {
        32767
    } else {
        let ind = (in_q5 >> 5) as usize;
        SIGM_LUT_POS_Q15[ind] + smulbb(SIGM_LUT_SLOPE_Q10[ind], in_q5 & 0x1f)
    }
}

#[cfg(test)]
mod tests {
    use super::sigm_q15;

    #[test]
    fn midpoint_and_saturation() {
        assert_eq!(sigm_q15(0), 16384);
        assert_eq!(sigm_q15(1000), 32767);
        assert_eq!(sigm_q15(-1000), 0);
    }

    #[test]
    fn antisymmetric_around_midpoint() {
        for x in [16, 48, 100, 150] {
            let hi = sigm_q15(x);
            let lo = sigm_q15(-x);
            assert!((hi + lo - 32768).abs() <= 32, "x = {x}");
        }
    }

    #[test]
    fn monotonically_increasing() {
        let mut prev = sigm_q15(-192);
        for x in (-191..=192).step_by(7) {
            let y = sigm_q15(x);
            assert!(y >= prev);
            prev = y;
        }
    }
}
