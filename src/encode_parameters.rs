//! Range encoding of all per-frame side information followed by the
//! excitation pulses.

use crate::common::{SignalType, NB_SUBFR};
use crate::encode_pulses::encode_pulses;
use crate::encoder_control::EncoderControl;
use crate::range_coder::RangeCoder;
use crate::tables_gain::{DELTA_GAIN_CDF, GAIN_CDF};
use crate::tables_ltp::{LTP_GAIN_CDF_PTRS, LTP_PER_INDEX_CDF};
use crate::tables_nlsf::NlsfCb;
use crate::tables_other::{
    LTPSCALE_CDF, NLSF_INTERPOLATION_FACTOR_CDF, SAMPLING_RATES_CDF, SAMPLING_RATES_TABLE,
    SEED_CDF, VADFLAG_CDF,
};
use crate::tables_pitch_lag::{
    PITCH_CONTOUR_CDF, PITCH_CONTOUR_NB_CDF, PITCH_LAG_MB_CDF, PITCH_LAG_NB_CDF,
    PITCH_LAG_SWB_CDF, PITCH_LAG_WB_CDF,
};
use crate::tables_type_offset::{TYPE_OFFSET_CDF, TYPE_OFFSET_JOINT_CDF};

/// Writes one frame's parameters and pulses into the range coder.
/// `type_offset_prev` carries the joint type/offset symbol between
/// frames of the same payload.
#[allow(clippy::too_many_arguments)]
pub fn encode_parameters(
    rc: &mut RangeCoder,
    ctrl: &EncoderControl,
    q: &[i8],
    fs_khz: usize,
    first_frame_in_packet: bool,
    type_offset_prev: &mut usize,
    nlsf_cb: &NlsfCb,
    vad_flag: bool,
) {
    // sampling rate, only for the first frame of a packet
    if first_frame_in_packet {
        let rate_index = SAMPLING_RATES_TABLE
            .iter()
            .position(|&r| r == fs_khz as i32)
            .unwrap_or(SAMPLING_RATES_TABLE.len());
        rc.encode(rate_index, &SAMPLING_RATES_CDF);
    }

    // signal type and quantizer offset, jointly coded
    let type_offset = 2 * ctrl.sigtype.code() + ctrl.quant_offset_type;
    if first_frame_in_packet {
        rc.encode(type_offset, &TYPE_OFFSET_CDF);
    } else {
        rc.encode(type_offset, &TYPE_OFFSET_JOINT_CDF[*type_offset_prev]);
    }
    *type_offset_prev = type_offset;

    // gains; the first one of a packet is coded absolutely
    if first_frame_in_packet {
        rc.encode(ctrl.gains_indices[0], &GAIN_CDF[ctrl.sigtype.code()]);
    } else {
        rc.encode(ctrl.gains_indices[0], &DELTA_GAIN_CDF);
    }
    for i in 1..NB_SUBFR {
        rc.encode(ctrl.gains_indices[i], &DELTA_GAIN_CDF);
    }

    // NLSF path through the multi-stage codebook
    for (stage, &index) in ctrl.nlsf_indices[..nlsf_cb.n_stages()].iter().enumerate() {
        rc.encode(index, nlsf_cb.cdfs[stage]);
    }
    rc.encode(
        ctrl.nlsf_interp_coef_q2 as usize,
        &NLSF_INTERPOLATION_FACTOR_CDF,
    );

    if ctrl.sigtype == SignalType::Voiced {
        // pitch lag and contour
        match fs_khz {
            8 => rc.encode(ctrl.lag_index, &PITCH_LAG_NB_CDF),
            12 => rc.encode(ctrl.lag_index, &PITCH_LAG_MB_CDF),
            16 => rc.encode(ctrl.lag_index, &PITCH_LAG_WB_CDF),
            _ => rc.encode(ctrl.lag_index, &PITCH_LAG_SWB_CDF),
        }
        if fs_khz == 8 {
            rc.encode(ctrl.contour_index, &PITCH_CONTOUR_NB_CDF);
        } else {
            rc.encode(ctrl.contour_index, &PITCH_CONTOUR_CDF);
        }

        // LTP gains
        rc.encode(ctrl.per_index, &LTP_PER_INDEX_CDF);
        for k in 0..NB_SUBFR {
            rc.encode(ctrl.ltp_index[k], LTP_GAIN_CDF_PTRS[ctrl.per_index]);
        }

        rc.encode(ctrl.ltp_scale_index, &LTPSCALE_CDF);
    }

    rc.encode(ctrl.seed as usize, &SEED_CDF);

    encode_pulses(rc, ctrl.sigtype, ctrl.quant_offset_type, q);

    rc.encode(usize::from(vad_flag), &VADFLAG_CDF);
}
