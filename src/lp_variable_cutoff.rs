//! Low-pass filter with a cutoff that glides between elliptic filter
//! designs, smoothing audible steps when the internal sampling rate
//! changes.

use crate::biquad_alt::biquad_alt;
use crate::math::smlawb;
use crate::tables_other::{
    TRANSITION_FRAMES_DOWN, TRANSITION_FRAMES_UP, TRANSITION_INT_NUM, TRANSITION_INT_STEPS_DOWN,
    TRANSITION_INT_STEPS_UP, TRANSITION_LP_A_Q28, TRANSITION_LP_B_Q28,
};

/// Cutoff glide state. A transition starts by setting
/// `transition_frame_no` to 1 and stops when it is reset to 0.
#[derive(Clone, Default)]
pub struct LpState {
    pub in_lp_state: [i32; 2],
    pub transition_frame_no: i32,
    /// 0 narrows the cutoff over the transition, 1 widens it.
    pub mode: i32,
}

fn interpolate_filter_taps(ind: usize, fac_q16: i32) -> ([i32; 3], [i32; 2]) {
    let mut b_q28 = TRANSITION_LP_B_Q28[TRANSITION_INT_NUM - 1];
    let mut a_q28 = TRANSITION_LP_A_Q28[TRANSITION_INT_NUM - 1];

    if ind < TRANSITION_INT_NUM - 1 {
        if fac_q16 > 0 {
            if fac_q16 < 32768 {
                for nb in 0..3 {
                    b_q28[nb] = smlawb(
                        TRANSITION_LP_B_Q28[ind][nb],
                        TRANSITION_LP_B_Q28[ind + 1][nb] - TRANSITION_LP_B_Q28[ind][nb],
                        fac_q16,
                    );
                }
                for na in 0..2 {
                    a_q28[na] = smlawb(
                        TRANSITION_LP_A_Q28[ind][na],
                        TRANSITION_LP_A_Q28[ind + 1][na] - TRANSITION_LP_A_Q28[ind][na],
                        fac_q16,
                    );
                }
            } else if fac_q16 == 32768 {
                for nb in 0..3 {
                    b_q28[nb] = (TRANSITION_LP_B_Q28[ind][nb] + TRANSITION_LP_B_Q28[ind + 1][nb]) >> 1;
                }
                for na in 0..2 {
                    a_q28[na] = (TRANSITION_LP_A_Q28[ind][na] + TRANSITION_LP_A_Q28[ind + 1][na]) >> 1;
                }
            } else {
                // interpolate from the far row with the mirrored factor,
                // which does fit 16 bits
                for nb in 0..3 {
                    b_q28[nb] = smlawb(
                        TRANSITION_LP_B_Q28[ind + 1][nb],
                        TRANSITION_LP_B_Q28[ind][nb] - TRANSITION_LP_B_Q28[ind + 1][nb],
                        65536 - fac_q16,
                    );
                }
                for na in 0..2 {
                    a_q28[na] = smlawb(
                        TRANSITION_LP_A_Q28[ind + 1][na],
                        TRANSITION_LP_A_Q28[ind][na] - TRANSITION_LP_A_Q28[ind + 1][na],
                        65536 - fac_q16,
                    );
                }
            }
        } else {
            b_q28 = TRANSITION_LP_B_Q28[ind];
            a_q28 = TRANSITION_LP_A_Q28[ind];
        }
    }

    (b_q28, a_q28)
}

/// Filters one frame in place. Inactive (`transition_frame_no == 0`)
/// calls leave the signal untouched.
pub fn lp_variable_cutoff(lp: &mut LpState, signal: &mut [i16]) {
    debug_assert!(lp.transition_frame_no >= 0);

    if lp.transition_frame_no <= 0 {
        return;
    }

    let (ind, fac_q16) = if lp.mode == 0 {
        if lp.transition_frame_no < TRANSITION_FRAMES_DOWN {
            let fac = (lp.transition_frame_no << 16) / TRANSITION_INT_STEPS_DOWN;
            lp.transition_frame_no += 1;
            ((fac >> 16) as usize, fac & 0xffff)
        } else {
            (TRANSITION_INT_NUM - 1, 0)
        }
    } else if lp.transition_frame_no < TRANSITION_FRAMES_UP {
        let fac = ((TRANSITION_FRAMES_UP - lp.transition_frame_no) << 16) / TRANSITION_INT_STEPS_UP;
        lp.transition_frame_no += 1;
        ((fac >> 16) as usize, fac & 0xffff)
    } else {
        (0, 0)
    };

    let (b_q28, a_q28) = interpolate_filter_taps(ind, fac_q16);
    biquad_alt(signal, &b_q28, &a_q28, &mut lp.in_lp_state);
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{lp_variable_cutoff, LpState};
    use crate::tables_other::TRANSITION_FRAMES_DOWN;

    fn tone(len: usize, freq_hz: f64, fs_hz: f64) -> Vec<i16> {
        (0..len)
            .map(|i| {
                (libm::sin(2.0 * core::f64::consts::PI * freq_hz / fs_hz * i as f64) * 8000.0)
                    as i16
            })
            .collect()
    }

    fn energy(x: &[i16]) -> i64 {
        x.iter().map(|&s| i64::from(s) * i64::from(s)).sum()
    }

    #[test]
    fn inactive_state_passes_the_signal_through() {
        let mut lp = LpState::default();
        let input = tone(320, 700.0, 16000.0);
        let mut signal = input.clone();
        lp_variable_cutoff(&mut lp, &mut signal);
        assert_eq!(signal, input);
        assert_eq!(lp.transition_frame_no, 0);
    }

    #[test]
    fn a_completed_down_transition_attenuates_high_frequencies() {
        let mut lp = LpState {
            in_lp_state: [0; 2],
            transition_frame_no: TRANSITION_FRAMES_DOWN,
            mode: 0,
        };

        // narrowest cutoff is 0.35 * Nyquist; a single biquad section
        // gives roughly 19 dB at 6.5 kHz, while 500 Hz passes untouched
        let mut high = tone(640, 6500.0, 16000.0);
        lp_variable_cutoff(&mut lp, &mut high);

        let low_in = tone(640, 500.0, 16000.0);
        let mut low = low_in.clone();
        lp.in_lp_state = [0; 2];
        lp_variable_cutoff(&mut lp, &mut low);

        assert!(energy(&high[320..]) < energy(&low_in[320..]) / 50);
        assert!(energy(&low[320..]) > energy(&low_in[320..]) / 2);
    }

    #[test]
    fn down_transition_advances_one_interpolation_row_per_step_count() {
        let mut lp = LpState {
            in_lp_state: [0; 2],
            transition_frame_no: 1,
            mode: 0,
        };
        let mut frame = [0i16; 320];
        for _ in 0..TRANSITION_FRAMES_DOWN + 8 {
            lp_variable_cutoff(&mut lp, &mut frame);
        }
        // frame counter saturates at the end of the transition
        assert_eq!(lp.transition_frame_no, TRANSITION_FRAMES_DOWN);
    }

    #[test]
    fn up_transition_ends_at_the_widest_filter() {
        let mut lp = LpState {
            in_lp_state: [0; 2],
            transition_frame_no: 1,
            mode: 1,
        };
        let mut frame = tone(320, 700.0, 16000.0);
        let reference = frame.clone();
        for _ in 0..300 {
            frame.copy_from_slice(&reference);
            lp_variable_cutoff(&mut lp, &mut frame);
        }
        // widest design keeps a mid-band tone essentially intact
        assert!(energy(&frame[160..]) > energy(&reference[160..]) / 2);
    }
}
