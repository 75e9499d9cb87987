//! Sine windowing via a two-term recursion, with every other sample
//! linearly interpolated.

use crate::math::{smulwb, smulwt};

/// Which quarter of the sine period the window spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// Rising flank, sin(0)..sin(pi/2).
    Rising,
    /// Falling flank, sin(pi/2)..sin(pi).
    Falling,
}

// -round(65536 * pi / k) for window lengths k = 16, 20, ..., 120
const FREQ_TABLE_Q16: [i16; 27] = [
    12111, 9804, 8235, 7100, 6239, 5565, 5022, 4575, 4202,
    3885, 3612, 3375, 3167, 2984, 2820, 2674, 2542, 2422,
    2313, 2214, 2123, 2038, 1961, 1889, 1822, 1760, 1702,
];

/// Windows `px` into `px_win`. Length must be 16..=120 and a multiple of 4.
pub fn apply_sine_window(px_win: &mut [i16], px: &[i16], win_type: WindowType) {
    let length = px.len();
    debug_assert!(px_win.len() >= length);
    debug_assert!((16..=120).contains(&length) && length & 3 == 0);

    let f_q16 = i32::from(FREQ_TABLE_Q16[(length >> 2) - 4]);
    let c_q16 = smulwb(f_q16, -f_q16);
    debug_assert!(c_q16 >= -32768);

    let (mut s0_q16, mut s1_q16) = match win_type {
        WindowType::Rising => (0, f_q16 + (length as i32 >> 3)),
        WindowType::Falling => (1 << 16, (1 << 16) + (c_q16 >> 1) + (length as i32 >> 4)),
    };

    // sin(n f) = 2 cos(f) sin((n-1) f) - sin((n-2) f), two samples per step
    let mut k = 0;
    while k < length {
        let pair = (px[k] as u16 as u32) | ((px[k + 1] as u16 as u32) << 16);
        px_win[k] = smulwb((s0_q16 + s1_q16) >> 1, pair as i32) as i16;
        px_win[k + 1] = smulwt(s1_q16, pair as i32) as i16;
        s0_q16 = (smulwb(s1_q16, c_q16) + (s1_q16 << 1) - s0_q16 + 1).min(1 << 16);

        let pair = (px[k + 2] as u16 as u32) | ((px[k + 3] as u16 as u32) << 16);
        px_win[k + 2] = smulwb((s0_q16 + s1_q16) >> 1, pair as i32) as i16;
        px_win[k + 3] = smulwt(s0_q16, pair as i32) as i16;
        s1_q16 = (smulwb(s0_q16, c_q16) + (s0_q16 << 1) - s1_q16).min(1 << 16);

        k += 4;
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_sine_window, WindowType};

    #[test]
    fn rising_window_tracks_a_quarter_sine() {
        let px = [16384i16; 40];
        let mut win = [0i16; 40];
        apply_sine_window(&mut win, &px, WindowType::Rising);
        // the recursion runs at frequency pi / (length + 1), with sample k
        // landing on sin((k + 1) f / 2)
        for k in 0..40 {
            let want = libm::sin(core::f64::consts::PI * (k as f64 + 1.0) / 82.0) * 16384.0;
            let got = f64::from(win[k]);
            assert!((got - want).abs() < 350.0, "k = {k}: {got} vs {want}");
        }
        // monotone rise
        assert!(win[10] < win[20] && win[20] < win[35]);
    }

    #[test]
    fn falling_window_mirrors_the_rising_one() {
        let px = [16384i16; 40];
        let mut rise = [0i16; 40];
        let mut fall = [0i16; 40];
        apply_sine_window(&mut rise, &px, WindowType::Rising);
        apply_sine_window(&mut fall, &px, WindowType::Falling);
        for k in 0..40 {
            let diff = i32::from(rise[k]) - i32::from(fall[39 - k]);
            assert!(diff.abs() < 700, "k = {k}, diff = {diff}");
        }
    }
}
