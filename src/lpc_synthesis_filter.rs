//! Even-order AR synthesis filter with a Q14 state line.

use crate::math::{lshift_sat32, rshift_round, sat16, smlawb, smulwb};

/// Filters `buf` in place: each sample is scaled by `gain_q26` and fed
/// through `1 / (1 - A(z))`. `state` carries the Q14 output history.
pub fn lpc_synthesis_filter(
    buf: &mut [i16],
    a_q12: &[i16],
    gain_q26: i32,
    state: &mut [i32],
) {
    let order = a_q12.len();
    debug_assert!(order == state.len());
    debug_assert!(order & 1 == 0);

    for sample in buf.iter_mut() {
        let mut out32_q10 = 0i32;
        for (j, &a) in a_q12.iter().enumerate() {
            out32_q10 = smlawb(out32_q10, state[order - 1 - j], i32::from(a));
        }

        out32_q10 = out32_q10.saturating_add(smulwb(gain_q26, i32::from(*sample)));
        *sample = sat16(rshift_round(out32_q10, 10));

        state.copy_within(1.., 0);
        state[order - 1] = lshift_sat32(out32_q10, 4);
    }
}

#[cfg(test)]
mod tests {
    use super::lpc_synthesis_filter;

    #[test]
    fn zero_coefficients_reduce_to_a_gain_stage() {
        let mut buf = [1000i16, -500, 250, 2];
        let coefs = [0i16; 2];
        let mut state = [0i32; 2];
        // unity gain in Q26
        lpc_synthesis_filter(&mut buf, &coefs, 1 << 26, &mut state);
        assert_eq!(buf, [1000, -500, 250, 2]);
    }

    #[test]
    fn a_resonant_pole_rings_longer_than_its_input() {
        // single impulse through y[n] = 0.9 y[n-1] + x[n]
        let mut buf = [0i16; 12];
        buf[0] = 1000;
        let coefs = [(0.9 * 4096.0) as i16, 0];
        let mut state = [0i32; 2];
        lpc_synthesis_filter(&mut buf, &coefs, 1 << 26, &mut state);
        assert_eq!(buf[0], 1000);
        assert!(buf[1] > 800 && buf[1] < 1000);
        assert!(buf[11] > 0);
    }
}
