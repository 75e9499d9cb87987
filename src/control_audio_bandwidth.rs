//! Internal sampling rate selection, with hysteresis on the target
//! bitrate and switching gated on speech pauses.

use crate::encoder_state::EncoderState;
use crate::tables_other::{TRANSITION_FRAMES_DOWN, TRANSITION_FRAMES_UP};

pub const SWB2WB_BITRATE_BPS: i32 = 25000;
pub const WB2SWB_BITRATE_BPS: i32 = 30000;
pub const WB2MB_BITRATE_BPS: i32 = 14000;
pub const MB2WB_BITRATE_BPS: i32 = 18000;
pub const MB2NB_BITRATE_BPS: i32 = 10000;
pub const NB2MB_BITRATE_BPS: i32 = 14000;

/// Bits of accumulated rate shortfall before switching down.
const ACCUM_BITS_DIFF_THRESHOLD: i32 = 30_000_000;

/// Picks the internal rate in kHz for the next frame. Does not apply
/// it; the caller reconfigures the encoder when the returned rate
/// differs from the current one.
pub fn control_audio_bandwidth(enc: &mut EncoderState, target_rate_bps: i32) -> usize {
    let mut fs_khz = enc.fs_khz;

    if fs_khz == 0 {
        // first frame after reset, pick from the target rate alone
        fs_khz = if target_rate_bps >= SWB2WB_BITRATE_BPS {
            24
        } else if target_rate_bps >= WB2MB_BITRATE_BPS {
            16
        } else if target_rate_bps >= MB2NB_BITRATE_BPS {
            12
        } else {
            8
        };
        fs_khz = fs_khz.min((enc.api_fs_hz / 1000) as usize);
        fs_khz = fs_khz.min(enc.max_internal_fs_khz);
    } else if fs_khz as i32 * 1000 > enc.api_fs_hz || fs_khz > enc.max_internal_fs_khz {
        fs_khz = ((enc.api_fs_hz / 1000) as usize).min(enc.max_internal_fs_khz);
    } else {
        if enc.api_fs_hz > 8000 {
            // accumulate the shortfall against the down-switch limit
            enc.bitrate_diff +=
                enc.packet_size_ms as i32 * (target_rate_bps - enc.bitrate_threshold_down);
            enc.bitrate_diff = enc.bitrate_diff.min(0);

            // only switch while there is no voice activity
            if !enc.vad_flag {
                if enc.lp.transition_frame_no == 0
                    && enc.bitrate_diff <= -ACCUM_BITS_DIFF_THRESHOLD
                {
                    // start a glide towards the lower cutoff
                    enc.lp.transition_frame_no = 1;
                    enc.lp.mode = 0;
                } else if enc.lp.transition_frame_no >= TRANSITION_FRAMES_DOWN && enc.lp.mode == 0
                {
                    enc.lp.transition_frame_no = 0;
                    enc.bitrate_diff = 0;
                    fs_khz = match enc.fs_khz {
                        24 => 16,
                        16 => 12,
                        _ => 8,
                    };
                    log::debug!("internal rate down to {} kHz", fs_khz);
                }

                if enc.fs_khz * 1000 < enc.api_fs_hz as usize
                    && target_rate_bps >= enc.bitrate_threshold_up
                    && ((enc.fs_khz == 16 && enc.max_internal_fs_khz >= 24)
                        || (enc.fs_khz == 12 && enc.max_internal_fs_khz >= 16)
                        || (enc.fs_khz == 8 && enc.max_internal_fs_khz >= 12))
                    && enc.lp.transition_frame_no == 0
                {
                    enc.lp.mode = 1;
                    enc.bitrate_diff = 0;
                    fs_khz = match enc.fs_khz {
                        8 => 12,
                        12 => 16,
                        _ => 24,
                    };
                    log::debug!("internal rate up to {} kHz", fs_khz);
                }
            }
        }

        // after a completed up-switch, stop filtering during pauses
        if enc.lp.mode == 1
            && enc.lp.transition_frame_no >= TRANSITION_FRAMES_UP
            && !enc.vad_flag
        {
            enc.lp.transition_frame_no = 0;
            enc.lp.in_lp_state = [0; 2];
        }
    }

    fs_khz
}

#[cfg(test)]
mod tests {
    use super::{control_audio_bandwidth, ACCUM_BITS_DIFF_THRESHOLD};
    use crate::encoder_state::EncoderState;
    use crate::tables_other::TRANSITION_FRAMES_DOWN;

    #[test]
    fn first_call_maps_rate_to_bandwidth_within_the_api_limit() {
        let mut enc = EncoderState::default();
        enc.api_fs_hz = 24000;
        enc.max_internal_fs_khz = 24;
        assert_eq!(control_audio_bandwidth(&mut enc, 40000), 24);
        assert_eq!(control_audio_bandwidth(&mut enc, 16000), 16);
        assert_eq!(control_audio_bandwidth(&mut enc, 11000), 12);
        assert_eq!(control_audio_bandwidth(&mut enc, 6000), 8);

        enc.api_fs_hz = 8000;
        assert_eq!(control_audio_bandwidth(&mut enc, 40000), 8);
    }

    #[test]
    fn a_sustained_rate_shortfall_switches_down_after_the_glide() {
        let mut enc = EncoderState::default();
        enc.api_fs_hz = 24000;
        enc.max_internal_fs_khz = 24;
        enc.fs_khz = 24;
        enc.packet_size_ms = 20;
        enc.bitrate_threshold_down = 25000;
        enc.bitrate_threshold_up = i32::MAX;
        enc.bitrate_diff = -ACCUM_BITS_DIFF_THRESHOLD;

        // the glide starts first, the switch happens once it completes
        assert_eq!(control_audio_bandwidth(&mut enc, 10000), 24);
        assert_eq!(enc.lp.transition_frame_no, 1);
        enc.lp.transition_frame_no = TRANSITION_FRAMES_DOWN;
        enc.bitrate_diff = -ACCUM_BITS_DIFF_THRESHOLD;
        assert_eq!(control_audio_bandwidth(&mut enc, 10000), 16);
    }

    #[test]
    fn no_switching_while_voice_is_active() {
        let mut enc = EncoderState::default();
        enc.api_fs_hz = 24000;
        enc.max_internal_fs_khz = 24;
        enc.fs_khz = 24;
        enc.packet_size_ms = 20;
        enc.bitrate_threshold_down = 25000;
        enc.bitrate_threshold_up = i32::MAX;
        enc.bitrate_diff = -ACCUM_BITS_DIFF_THRESHOLD;
        enc.vad_flag = true;

        assert_eq!(control_audio_bandwidth(&mut enc, 10000), 24);
        assert_eq!(enc.lp.transition_frame_no, 0);
    }
}
