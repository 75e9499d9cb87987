//! Reconstruction of the pitch lag contour from the transmitted lag and
//! contour indices.

use crate::pitch_est_tables::{CB_LAGS_STAGE2, CB_LAGS_STAGE3, PE_MIN_LAG_MS, PE_NB_SUBFR};

/// Expands `lag_index` and `contour_index` into per-subframe lags at the
/// given internal rate. 8 kHz streams use the small stage 2 codebook.
pub fn decode_pitch(
    lag_index: usize,
    contour_index: usize,
    pitch_lags: &mut [i32; PE_NB_SUBFR],
    fs_khz: usize,
) {
    let lag = (PE_MIN_LAG_MS * fs_khz + lag_index) as i32;
    if fs_khz == 8 {
        for (out, row) in pitch_lags.iter_mut().zip(&CB_LAGS_STAGE2) {
            *out = lag + i32::from(row[contour_index]);
        }
    } else {
        for (out, row) in pitch_lags.iter_mut().zip(&CB_LAGS_STAGE3) {
            *out = lag + i32::from(row[contour_index]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::decode_pitch;

    #[test]
    fn zero_contour_gives_flat_lags() {
        let mut lags = [0i32; 4];
        decode_pitch(30, 0, &mut lags, 16);
        // contour vector 0 of the large codebook is [-9, -3, 3, 9]
        assert_eq!(lags, [32 + 30 - 9, 32 + 30 - 3, 32 + 30 + 3, 32 + 30 + 9]);
    }

    #[test]
    fn narrowband_uses_small_codebook() {
        let mut lags = [0i32; 4];
        decode_pitch(10, 0, &mut lags, 8);
        assert_eq!(lags, [26, 26, 26, 26]);
    }
}
