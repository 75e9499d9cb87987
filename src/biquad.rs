//! Second order ARMA filter, tolerant of slowly varying coefficients.

use crate::math::{rshift_round, sat16, smlabb, smulwb};

/// Filters `buf` in place with Q13 MA coefficients `b` and Q13 AR
/// coefficients `a`. `state` carries the two Q13 state words.
pub fn biquad(buf: &mut [i16], b: &[i16; 3], a: &[i16; 2], state: &mut [i32; 2]) {
    let mut s0 = state[0];
    let mut s1 = state[1];
    let a0_neg = -i32::from(a[0]);
    let a1_neg = -i32::from(a[1]);

    for sample in buf.iter_mut() {
        let in16 = i32::from(*sample);
        let out32 = smlabb(s0, in16, i32::from(b[0]));

        s0 = smlabb(s1, in16, i32::from(b[1]));
        s0 += smulwb(out32, a0_neg) << 3;

        s1 = smulwb(out32, a1_neg) << 3;
        s1 = smlabb(s1, in16, i32::from(b[2]));

        *sample = sat16(rshift_round(out32, 13) + 1);
    }

    state[0] = s0;
    state[1] = s1;
}

#[cfg(test)]
mod tests {
    use super::biquad;
    use crate::tables_other::{DEC_A_HP_8, DEC_B_HP_8};

    #[test]
    fn highpass_removes_a_constant_offset() {
        let mut buf = [2000i16; 320];
        let mut state = [0i32; 2];
        biquad(&mut buf, &DEC_B_HP_8, &DEC_A_HP_8, &mut state);
        // dc settles towards zero by the end of the frame
        assert!(buf[319].abs() < buf[2].abs());
        assert!(buf[319].abs() < 100);
    }
}
