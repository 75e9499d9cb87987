//! Two-band split with first order all-pass sections, decimating by 2.

use crate::math::{rshift_round, sat16, smlawb, smulwb};

// both Q15 coefficients are doubled; the high one wraps negative on purpose
const A_FB1_20: i32 = 5394 << 1;
const A_FB1_21: i32 = (20623 << 1) - 65536;

/// Splits `input` into a low and a high band, each `input.len() / 2`
/// samples. `state` holds the two Q10 all-pass delay elements.
pub fn ana_filt_bank_1(
    input: &[i16],
    state: &mut [i32; 2],
    out_low: &mut [i16],
    out_high: &mut [i16],
) {
    let n2 = input.len() / 2;
    debug_assert!(out_low.len() >= n2 && out_high.len() >= n2);

    for k in 0..n2 {
        let in32 = i32::from(input[2 * k]) << 10;
        let y = in32 - state[0];
        let x = smlawb(y, y, A_FB1_21);
        let out_1 = state[0] + x;
        state[0] = in32 + x;

        let in32 = i32::from(input[2 * k + 1]) << 10;
        let y = in32 - state[1];
        let x = smulwb(y, A_FB1_20);
        let out_2 = state[1] + x;
        state[1] = in32 + x;

        out_low[k] = sat16(rshift_round(out_2 + out_1, 11));
        out_high[k] = sat16(rshift_round(out_2 - out_1, 11));
    }
}

#[cfg(test)]
mod tests {
    use super::ana_filt_bank_1;

    #[test]
    fn dc_lands_in_the_low_band() {
        let input = [4000i16; 160];
        let mut state = [0i32; 2];
        let mut low = [0i16; 80];
        let mut high = [0i16; 80];
        ana_filt_bank_1(&input, &mut state, &mut low, &mut high);
        assert!((i32::from(low[79]) - 4000).abs() < 50);
        assert!(high[79].abs() < 50);
    }

    #[test]
    fn nyquist_lands_in_the_high_band() {
        let input: [i16; 160] =
            core::array::from_fn(|i| if i % 2 == 0 { 4000 } else { -4000 });
        let mut state = [0i32; 2];
        let mut low = [0i16; 80];
        let mut high = [0i16; 80];
        ana_filt_bank_1(&input, &mut state, &mut low, &mut high);
        assert!(low[79].abs() < 50);
        assert!(high[79].abs() > 3000);
    }
}
