//! Scalar gain quantization, uniform on a log scale with hysteresis.
//! The first gain of a packet is coded absolutely, the rest as deltas.

use crate::common::NB_SUBFR;
use crate::lin2log::lin2log;
use crate::log2lin::log2lin;
use crate::math::{limit, smulwb};
use crate::tables_gain::N_LEVELS_QGAIN;

pub const MIN_DELTA_GAIN_QUANT: i32 = -4;
pub const MAX_DELTA_GAIN_QUANT: i32 = 40;

const MIN_QGAIN_DB: i32 = 6;
const MAX_QGAIN_DB: i32 = 86;

const OFFSET: i32 = MIN_QGAIN_DB * 128 / 6 + 16 * 128;
const SCALE_Q16: i32 = 65536 * (N_LEVELS_QGAIN as i32 - 1) / ((MAX_QGAIN_DB - MIN_QGAIN_DB) * 128 / 6);
const INV_SCALE_Q16: i32 =
    65536 * ((MAX_QGAIN_DB - MIN_QGAIN_DB) * 128 / 6) / (N_LEVELS_QGAIN as i32 - 1);

/// Quantizes the subframe gains in place and produces their indices.
/// `prev_ind` carries the last quantized level across frames; when
/// `conditional` is set the first gain is delta coded against it.
pub fn gains_quant(
    ind: &mut [usize; NB_SUBFR],
    gain_q16: &mut [i32; NB_SUBFR],
    prev_ind: &mut i32,
    conditional: bool,
) {
    for k in 0..NB_SUBFR {
        let mut level = smulwb(SCALE_Q16, lin2log(gain_q16[k]) - OFFSET);

        // round towards the previous quantized gain
        if level < *prev_ind {
            level += 1;
        }

        if k == 0 && !conditional {
            let mut level = limit(level, 0, N_LEVELS_QGAIN as i32 - 1);
            level = level.max(*prev_ind + MIN_DELTA_GAIN_QUANT);
            *prev_ind = level;
            ind[k] = level as usize;
        } else {
            let delta = limit(level - *prev_ind, MIN_DELTA_GAIN_QUANT, MAX_DELTA_GAIN_QUANT);
            *prev_ind += delta;
            ind[k] = (delta - MIN_DELTA_GAIN_QUANT) as usize;
        }

        // 3968 is 31 in Q7, the largest log2lin input that fits
        gain_q16[k] = log2lin((smulwb(INV_SCALE_Q16, *prev_ind) + OFFSET).min(3967));
    }
}

/// Inverse of [`gains_quant`], shared by the decoder and the encoder's
/// redundant coding path.
pub fn gains_dequant(
    gain_q16: &mut [i32; NB_SUBFR],
    ind: &[usize; NB_SUBFR],
    prev_ind: &mut i32,
    conditional: bool,
) {
    for k in 0..NB_SUBFR {
        if k == 0 && !conditional {
            *prev_ind = ind[k] as i32;
        } else {
            *prev_ind += ind[k] as i32 + MIN_DELTA_GAIN_QUANT;
        }
        gain_q16[k] = log2lin((smulwb(INV_SCALE_Q16, *prev_ind) + OFFSET).min(3967));
    }
}

#[cfg(test)]
mod tests {
    use super::{gains_dequant, gains_quant};
    use crate::common::NB_SUBFR;

    #[test]
    fn dequant_reproduces_the_quantized_gains() {
        let mut gains = [30 << 16, 80 << 16, 200 << 16, 60 << 16];
        let mut ind = [0usize; NB_SUBFR];
        let mut prev_enc = 10;
        gains_quant(&mut ind, &mut gains, &mut prev_enc, false);

        let mut deq = [0i32; NB_SUBFR];
        let mut prev_dec = 10;
        gains_dequant(&mut deq, &ind, &mut prev_dec, false);

        assert_eq!(deq, gains);
        assert_eq!(prev_dec, prev_enc);
    }

    #[test]
    fn quantization_error_is_bounded_on_a_log_scale() {
        // one quantization step is about 1.3 dB, i.e. a ratio below 1.2
        let mut gains = [100 << 16; NB_SUBFR];
        let mut ind = [0usize; NB_SUBFR];
        let mut prev = 0;
        gains_quant(&mut ind, &mut gains, &mut prev, false);
        for &g in &gains {
            let ratio = f64::from(g) / f64::from(100 << 16);
            assert!(ratio > 1.0 / 1.2 && ratio < 1.2, "ratio {ratio}");
        }
    }
}
