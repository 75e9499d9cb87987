//! Range decoding of all per-frame side information and excitation, the
//! inverse of [`crate::encode_parameters`].

use crate::bwexpander::bwexpander;
use crate::common::{FrameTermination, SignalType, MAX_FRAME_LENGTH, NB_SUBFR};
use crate::decode_pitch::decode_pitch;
use crate::decode_pulses::decode_pulses;
use crate::decoder_control::DecoderControl;
use crate::decoder_set_fs::decoder_set_fs;
use crate::decoder_state::DecoderState;
use crate::gain_quant::gains_dequant;
use crate::nlsf2a_stable::nlsf2a_stable;
use crate::nlsf_msvq_decode::nlsf_msvq_decode;
use crate::schur::MAX_ORDER_LPC;
use crate::tables_gain::{DELTA_GAIN_CDF, DELTA_GAIN_CDF_OFFSET, GAIN_CDF, GAIN_CDF_OFFSET};
use crate::tables_ltp::{
    LTP_GAIN_CDF_OFFSETS, LTP_GAIN_CDF_PTRS, LTP_ORDER, LTP_PER_INDEX_CDF,
    LTP_PER_INDEX_CDF_OFFSET, LTP_VQ_PTRS_Q14,
};
use crate::tables_nlsf::NLSF_MSVQ_MAX_CB_STAGES;
use crate::tables_other::{
    FRAME_TERMINATION_CDF, FRAME_TERMINATION_CDF_OFFSET, LTPSCALE_CDF, LTPSCALE_CDF_OFFSET,
    LTP_SCALES_TABLE_Q14, NLSF_INTERPOLATION_FACTOR_CDF, NLSF_INTERPOLATION_FACTOR_CDF_OFFSET,
    SAMPLING_RATES_CDF, SAMPLING_RATES_CDF_OFFSET, SAMPLING_RATES_TABLE, SEED_CDF,
    SEED_CDF_OFFSET, VADFLAG_CDF, VADFLAG_CDF_OFFSET,
};
use crate::tables_pitch_lag::{
    PITCH_CONTOUR_CDF, PITCH_CONTOUR_CDF_OFFSET, PITCH_CONTOUR_NB_CDF,
    PITCH_CONTOUR_NB_CDF_OFFSET, PITCH_LAG_MB_CDF, PITCH_LAG_MB_CDF_OFFSET, PITCH_LAG_NB_CDF,
    PITCH_LAG_NB_CDF_OFFSET, PITCH_LAG_SWB_CDF, PITCH_LAG_SWB_CDF_OFFSET, PITCH_LAG_WB_CDF,
    PITCH_LAG_WB_CDF_OFFSET,
};
use crate::tables_type_offset::{
    TYPE_OFFSET_CDF, TYPE_OFFSET_CDF_OFFSET, TYPE_OFFSET_JOINT_CDF,
};

const BWE_AFTER_LOSS_Q16: i32 = 63570;

/// Reads one frame's parameters and pulses from the decoder's range
/// coder state. With `full_decoding` unset only the bitstream is parsed,
/// which is enough for packet inspection and redundancy extraction.
pub fn decode_parameters(
    dec: &mut DecoderState,
    ctrl: &mut DecoderControl,
    q: &mut [i32; MAX_FRAME_LENGTH],
    full_decoding: bool,
) {
    // sampling rate, only sent in the first frame of a packet
    if dec.n_frames_decoded == 0 {
        let rate_ix = dec.rc.decode(&SAMPLING_RATES_CDF, SAMPLING_RATES_CDF_OFFSET);
        let fs_khz = SAMPLING_RATES_TABLE[rate_ix] as usize;
        decoder_set_fs(dec, fs_khz);
    }

    // signal type and quantizer offset, jointly coded
    let type_offset = if dec.n_frames_decoded == 0 {
        dec.rc.decode(&TYPE_OFFSET_CDF, TYPE_OFFSET_CDF_OFFSET)
    } else {
        dec.rc.decode(
            &TYPE_OFFSET_JOINT_CDF[dec.type_offset_prev],
            TYPE_OFFSET_CDF_OFFSET,
        )
    };
    ctrl.sigtype = SignalType::from_code(type_offset >> 1);
    ctrl.quant_offset_type = type_offset & 1;
    dec.type_offset_prev = type_offset;

    // gains
    let mut gains_indices = [0usize; NB_SUBFR];
    gains_indices[0] = if dec.n_frames_decoded == 0 {
        dec.rc
            .decode(&GAIN_CDF[ctrl.sigtype.code()], GAIN_CDF_OFFSET)
    } else {
        dec.rc.decode(&DELTA_GAIN_CDF, DELTA_GAIN_CDF_OFFSET)
    };
    for ix in gains_indices[1..].iter_mut() {
        *ix = dec.rc.decode(&DELTA_GAIN_CDF, DELTA_GAIN_CDF_OFFSET);
    }
    gains_dequant(
        &mut ctrl.gains_q16,
        &gains_indices,
        &mut dec.last_gain_index,
        dec.n_frames_decoded > 0,
    );

    // NLSF path through the multi-stage codebook
    let cb = dec.nlsf_cbs[ctrl.sigtype.code()];
    let mut nlsf_indices = [0usize; NLSF_MSVQ_MAX_CB_STAGES];
    for (stage, ix) in nlsf_indices[..cb.n_stages()].iter_mut().enumerate() {
        *ix = dec.rc.decode(cb.cdfs[stage], cb.middle_ix[stage]);
    }
    let mut nlsf_q15 = [0i32; MAX_ORDER_LPC];
    nlsf_msvq_decode(
        &mut nlsf_q15[..dec.lpc_order],
        cb,
        &nlsf_indices[..cb.n_stages()],
    );

    ctrl.nlsf_interp_coef_q2 = dec.rc.decode(
        &NLSF_INTERPOLATION_FACTOR_CDF,
        NLSF_INTERPOLATION_FACTOR_CDF_OFFSET,
    ) as i32;

    // interpolation would reach into a state the reset wiped out
    if dec.first_frame_after_reset {
        ctrl.nlsf_interp_coef_q2 = 4;
    }

    if full_decoding {
        nlsf2a_stable(
            &mut ctrl.pred_coef_q12[1][..dec.lpc_order],
            &nlsf_q15[..dec.lpc_order],
        );

        if ctrl.nlsf_interp_coef_q2 < 4 {
            // NLSF vector for the first frame half, interpolated from the
            // previous and current quantized vectors
            let mut nlsf0_q15 = [0i32; MAX_ORDER_LPC];
            for i in 0..dec.lpc_order {
                nlsf0_q15[i] = dec.prev_nlsf_q15[i]
                    + ((ctrl.nlsf_interp_coef_q2 * (nlsf_q15[i] - dec.prev_nlsf_q15[i])) >> 2);
            }
            nlsf2a_stable(
                &mut ctrl.pred_coef_q12[0][..dec.lpc_order],
                &nlsf0_q15[..dec.lpc_order],
            );
        } else {
            let (first, second) = ctrl.pred_coef_q12.split_at_mut(1);
            first[0][..dec.lpc_order].copy_from_slice(&second[0][..dec.lpc_order]);
        }
    }

    dec.prev_nlsf_q15[..dec.lpc_order].copy_from_slice(&nlsf_q15[..dec.lpc_order]);

    // after a loss, soften the LPC filters
    if dec.loss_cnt > 0 {
        bwexpander(&mut ctrl.pred_coef_q12[0][..dec.lpc_order], BWE_AFTER_LOSS_Q16);
        bwexpander(&mut ctrl.pred_coef_q12[1][..dec.lpc_order], BWE_AFTER_LOSS_Q16);
    }

    if ctrl.sigtype == SignalType::Voiced {
        // pitch lag and contour
        let lag_index = match dec.fs_khz {
            8 => dec.rc.decode(&PITCH_LAG_NB_CDF, PITCH_LAG_NB_CDF_OFFSET),
            12 => dec.rc.decode(&PITCH_LAG_MB_CDF, PITCH_LAG_MB_CDF_OFFSET),
            16 => dec.rc.decode(&PITCH_LAG_WB_CDF, PITCH_LAG_WB_CDF_OFFSET),
            _ => dec.rc.decode(&PITCH_LAG_SWB_CDF, PITCH_LAG_SWB_CDF_OFFSET),
        };
        let contour_index = if dec.fs_khz == 8 {
            dec.rc
                .decode(&PITCH_CONTOUR_NB_CDF, PITCH_CONTOUR_NB_CDF_OFFSET)
        } else {
            dec.rc.decode(&PITCH_CONTOUR_CDF, PITCH_CONTOUR_CDF_OFFSET)
        };
        decode_pitch(lag_index, contour_index, &mut ctrl.pitch_lags, dec.fs_khz);

        // LTP gains
        ctrl.per_index = dec
            .rc
            .decode(&LTP_PER_INDEX_CDF, LTP_PER_INDEX_CDF_OFFSET);
        let cbk = LTP_VQ_PTRS_Q14[ctrl.per_index];
        for k in 0..NB_SUBFR {
            let ix = dec.rc.decode(
                LTP_GAIN_CDF_PTRS[ctrl.per_index],
                LTP_GAIN_CDF_OFFSETS[ctrl.per_index],
            );
            ctrl.ltp_coef_q14[k * LTP_ORDER..(k + 1) * LTP_ORDER].copy_from_slice(&cbk[ix]);
        }

        let scale_ix = dec.rc.decode(&LTPSCALE_CDF, LTPSCALE_CDF_OFFSET);
        ctrl.ltp_scale_q14 = i32::from(LTP_SCALES_TABLE_Q14[scale_ix]);
    } else {
        ctrl.pitch_lags = [0; NB_SUBFR];
        ctrl.ltp_coef_q14 = [0; LTP_ORDER * NB_SUBFR];
        ctrl.per_index = 0;
        ctrl.ltp_scale_q14 = 0;
    }

    ctrl.seed = dec.rc.decode(&SEED_CDF, SEED_CDF_OFFSET) as i32;

    ctrl.rate_level_index = decode_pulses(
        &mut dec.rc,
        ctrl.sigtype,
        ctrl.quant_offset_type,
        &mut q[..dec.frame_length],
    );

    dec.vad_flag = dec.rc.decode(&VADFLAG_CDF, VADFLAG_CDF_OFFSET) == 1;

    dec.frame_termination = FrameTermination::from_code(
        dec.rc
            .decode(&FRAME_TERMINATION_CDF, FRAME_TERMINATION_CDF_OFFSET),
    );

    // bytes not yet consumed hold further frames or redundancy
    let (n_bytes_used, _) = dec.rc.length();
    dec.n_bytes_left = dec.rc.buffer_length() as i32 - n_bytes_used as i32;
    if dec.n_bytes_left < 0 {
        dec.rc.mark_overread();
    }

    if dec.n_bytes_left == 0 {
        dec.rc.check_after_decoding();
    }
}

#[cfg(test)]
mod tests {
    use super::decode_parameters;
    use crate::common::{FrameTermination, SignalType, MAX_FRAME_LENGTH};
    use crate::decoder_control::DecoderControl;
    use crate::decoder_state::DecoderState;
    use crate::encode_parameters::encode_parameters;
    use crate::encoder_control::EncoderControl;
    use crate::range_coder::RangeCoder;
    use crate::tables_nlsf_cb1_16::NLSF_CB1_16;
    use crate::tables_other::{FRAME_TERMINATION_CDF, QUANTIZATION_OFFSETS_Q10};

    #[test]
    fn unvoiced_frame_round_trips_through_the_bitstream() {
        let fs_khz = 16;
        let frame_length = 20 * fs_khz;

        let mut ectrl = EncoderControl::default();
        ectrl.sigtype = SignalType::Unvoiced;
        ectrl.quant_offset_type = 0;
        ectrl.gains_indices = [40, 32 + 4, 32 + 4, 32 + 4];
        ectrl.nlsf_indices = [5, 1, 2, 0];
        ectrl.nlsf_interp_coef_q2 = 4;
        ectrl.seed = 3;

        let mut q = alloc::vec![0i8; frame_length];
        q[9] = 1;
        q[200] = -2;
        q[301] = 1;

        let mut rc = RangeCoder::default();
        rc.enc_init();
        let mut type_offset_prev = 0;
        encode_parameters(
            &mut rc,
            &ectrl,
            &q,
            fs_khz,
            true,
            &mut type_offset_prev,
            &NLSF_CB1_16,
            true,
        );
        rc.encode(FrameTermination::LastFrame.code(), &FRAME_TERMINATION_CDF);
        let (n_bytes, _) = rc.length();
        rc.wrap_up();
        let payload: alloc::vec::Vec<u8> = rc.payload(n_bytes).to_vec();

        let mut dec = DecoderState::new();
        dec.rc.dec_init(&payload);
        let mut dctrl = DecoderControl::default();
        let mut pulses = [0i32; MAX_FRAME_LENGTH];
        decode_parameters(&mut dec, &mut dctrl, &mut pulses, true);

        assert!(dec.rc.error().is_none());
        assert_eq!(dec.fs_khz, fs_khz);
        assert_eq!(dctrl.sigtype, SignalType::Unvoiced);
        assert_eq!(dctrl.quant_offset_type, 0);
        assert_eq!(dctrl.seed, 3);
        assert!(dec.vad_flag);
        assert_eq!(dec.frame_termination, FrameTermination::LastFrame);
        assert_eq!(dec.n_bytes_left, 0);
        for (p, &v) in pulses[..frame_length].iter().zip(&q) {
            assert_eq!(*p, i32::from(v));
        }
        // sanity check the fixed offset table the core synthesis relies on
        assert_eq!(QUANTIZATION_OFFSETS_Q10[1][0], 100);
    }
}
