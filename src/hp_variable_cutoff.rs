//! Input high-pass filter whose cutoff follows the low end of the
//! talker's pitch range, estimated from smoothed pitch lag statistics.

use crate::biquad_alt::biquad_alt;
use crate::common::SignalType;
use crate::encoder_control::EncoderControl;
use crate::encoder_state::EncoderState;
use crate::lin2log::lin2log;
use crate::log2lin::log2lin;
use crate::math::{smlawb, smulbb, smulwb, smulww};

// 0.45 * 2 * pi / 1000 in Q19
const RADIANS_CONSTANT_Q19: i32 = 1482;

/// log2(80) in Q7, the floor of the adaptive cutoff.
const LOG2_VARIABLE_HP_MIN_FREQ_Q7: i32 = 809;

pub const VARIABLE_HP_MIN_FREQ: i32 = 80;
pub const VARIABLE_HP_MAX_FREQ: i32 = 150;

const VARIABLE_HP_SMTH_COEF1_Q16: i32 = 6554;
const VARIABLE_HP_SMTH_COEF2_Q16: i32 = 983;
const VARIABLE_HP_MAX_DELTA_FREQ_Q7: i32 = 51;

/// Updates the cutoff trackers from the previous frame's pitch result
/// and high-pass filters one frame in place.
pub fn hp_variable_cutoff(enc: &mut EncoderState, ctrl: &mut EncoderControl, signal: &mut [i16]) {
    if enc.prev_sigtype == SignalType::Voiced {
        // log-domain distance from the previous pitch frequency
        let pitch_freq_hz_q16 =
            ((enc.fs_khz as i32 * 1000) << 16) / enc.prev_lag.max(1) as i32;
        let mut pitch_freq_log_q7 = lin2log(pitch_freq_hz_q16) - (16 << 7);

        // pull harder towards the floor when the low band is clean
        let quality_q15 = ctrl.input_quality_bands_q15[0];
        pitch_freq_log_q7 -= smulwb(
            smulwb(quality_q15 << 2, quality_q15),
            pitch_freq_log_q7 - LOG2_VARIABLE_HP_MIN_FREQ_Q7,
        );
        pitch_freq_log_q7 += (19661 - quality_q15) >> 9;

        let mut delta_freq_q7 = pitch_freq_log_q7 - (enc.variable_hp_smth1_q15 >> 8);
        if delta_freq_q7 < 0 {
            // track something close to the minimum pitch frequency
            delta_freq_q7 *= 3;
        }
        delta_freq_q7 =
            delta_freq_q7.clamp(-VARIABLE_HP_MAX_DELTA_FREQ_Q7, VARIABLE_HP_MAX_DELTA_FREQ_Q7);

        enc.variable_hp_smth1_q15 = smlawb(
            enc.variable_hp_smth1_q15,
            (enc.speech_activity_q8 << 1) * delta_freq_q7,
            VARIABLE_HP_SMTH_COEF1_Q16,
        );
    }

    enc.variable_hp_smth2_q15 = smlawb(
        enc.variable_hp_smth2_q15,
        enc.variable_hp_smth1_q15 - enc.variable_hp_smth2_q15,
        VARIABLE_HP_SMTH_COEF2_Q16,
    );

    ctrl.pitch_freq_low_hz = log2lin(enc.variable_hp_smth2_q15 >> 8)
        .clamp(VARIABLE_HP_MIN_FREQ, VARIABLE_HP_MAX_FREQ);

    // second order high-pass at the tracked cutoff
    let fc_q19 =
        smulbb(RADIANS_CONSTANT_Q19, ctrl.pitch_freq_low_hz) / enc.fs_khz as i32;
    let r_q28 = (1 << 28) - 471 * fc_q19;

    let b_q28 = [r_q28, -(r_q28 << 1), r_q28];
    let r_q22 = r_q28 >> 6;
    let a_q28 = [
        smulww(r_q22, smulww(fc_q19, fc_q19) - (2 << 22)),
        smulww(r_q22, r_q22),
    ];

    biquad_alt(signal, &b_q28, &a_q28, &mut enc.in_hp_state);
}

#[cfg(test)]
mod tests {
    use super::{hp_variable_cutoff, VARIABLE_HP_MIN_FREQ};
    use crate::common::SignalType;
    use crate::encoder_control::EncoderControl;
    use crate::encoder_state::EncoderState;

    #[test]
    fn removes_a_constant_offset() {
        let mut enc = EncoderState::default();
        enc.fs_khz = 16;
        let mut ctrl = EncoderControl::default();

        let mut signal = [3000i16; 320];
        hp_variable_cutoff(&mut enc, &mut ctrl, &mut signal);
        hp_variable_cutoff(&mut enc, &mut ctrl, &mut signal);
        assert!(signal[319].abs() < 100, "dc residue {}", signal[319]);
        assert!(ctrl.pitch_freq_low_hz >= VARIABLE_HP_MIN_FREQ);
    }

    #[test]
    fn voiced_history_with_a_long_lag_lowers_the_cutoff() {
        let mut enc = EncoderState::default();
        enc.fs_khz = 16;
        enc.prev_sigtype = SignalType::Voiced;
        enc.prev_lag = 160; // 100 Hz talker
        enc.speech_activity_q8 = 255;
        let mut ctrl = EncoderControl::default();
        ctrl.input_quality_bands_q15[0] = 30000;

        let mut signal = [0i16; 320];
        hp_variable_cutoff(&mut enc, &mut ctrl, &mut signal);
        let first = ctrl.pitch_freq_low_hz;
        for _ in 0..200 {
            hp_variable_cutoff(&mut enc, &mut ctrl, &mut signal);
        }
        assert!(ctrl.pitch_freq_low_hz <= first);
        assert!(ctrl.pitch_freq_low_hz >= VARIABLE_HP_MIN_FREQ);
    }
}
