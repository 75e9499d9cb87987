//! Core pitch analysis: a three stage lag search that starts on a 4 kHz
//! decimated signal, refines candidates at 8 kHz, and finally picks a
//! per-subframe lag contour at the full internal rate.

use crate::lin2log::lin2log;
use crate::math::{add_pos_sat32, clz32, limit, sat16, smlawb, smulbb, smulwb, sqrt_approx};
use crate::pitch_est_tables::{
    CBK_OFFSETS_STAGE3, CBK_SIZES_STAGE3, CB_LAGS_STAGE2, CB_LAGS_STAGE3, LAG_RANGE_STAGE3,
    PE_D_SRCH_LENGTH, PE_FLATCONTOUR_BIAS_Q20, PE_FRAME_LENGTH_MS, PE_MAX_FRAME_LENGTH_ST_1,
    PE_MAX_FRAME_LENGTH_ST_2, PE_MAX_LAG, PE_MAX_LAG_MS, PE_MIN_LAG_MS, PE_NB_CBKS_STAGE2,
    PE_NB_CBKS_STAGE2_EXT, PE_NB_CBKS_STAGE3_MAX, PE_NB_STAGE3_LAGS, PE_NB_SUBFR,
    PE_PREVLAG_BIAS_Q15, PE_SHORTLAG_BIAS_Q15,
};
use crate::resampler_down2::resampler_down2;
use crate::resampler_down2_3::resampler_down2_3;
use crate::resampler_down3::resampler_down3;
use crate::sort::insertion_sort_decreasing_i16;
use crate::vector_ops::{inner_prod, int16_array_maxabs};

const SCRATCH_SIZE: usize = 22;

/// Pitch search outcome for one frame.
pub struct PitchInfo {
    /// True when no lag with high enough correlation was found.
    pub unvoiced: bool,
    /// Per-subframe lags at the input rate; all zero when unvoiced.
    pub pitch_lags: [i32; PE_NB_SUBFR],
    pub lag_index: usize,
    pub contour_index: usize,
}

/// Searches `signal` (40 ms at `fs_khz`, current frame last) for the pitch
/// lag contour. `ltp_corr_q15` carries the normalized correlation from the
/// previous frame in and the new value out. `prev_lag` is zero when the
/// previous frame was unvoiced.
pub fn pitch_analysis_core(
    signal: &[i16],
    ltp_corr_q15: &mut i32,
    prev_lag: i32,
    search_thres1_q16: i32,
    search_thres2_q15: i32,
    fs_khz: usize,
    complexity: usize,
) -> PitchInfo {
    debug_assert!(fs_khz == 8 || fs_khz == 12 || fs_khz == 16 || fs_khz == 24);
    debug_assert!(complexity <= 2);
    debug_assert!((0..=1 << 16).contains(&search_thres1_q16));
    debug_assert!((0..=1 << 15).contains(&search_thres2_q15));

    let frame_length = PE_FRAME_LENGTH_MS * fs_khz;
    let frame_length_4khz = PE_FRAME_LENGTH_MS * 4;
    let frame_length_8khz = PE_FRAME_LENGTH_MS * 8;
    let sf_length = frame_length >> 3;
    let sf_length_8khz = frame_length_8khz >> 3;
    let min_lag = PE_MIN_LAG_MS * fs_khz;
    let min_lag_4khz = PE_MIN_LAG_MS * 4;
    let min_lag_8khz = PE_MIN_LAG_MS * 8;
    let max_lag = PE_MAX_LAG_MS * fs_khz;
    let max_lag_4khz = PE_MAX_LAG_MS * 4;
    let max_lag_8khz = PE_MAX_LAG_MS * 8;
    debug_assert_eq!(signal.len(), frame_length);

    let unvoiced = PitchInfo {
        unvoiced: true,
        pitch_lags: [0; PE_NB_SUBFR],
        lag_index: 0,
        contour_index: 0,
    };

    let mut c = [[0i16; (PE_MAX_LAG >> 1) + 5]; PE_NB_SUBFR];

    // resample to 8 kHz
    let mut signal_8khz = [0i16; PE_MAX_FRAME_LENGTH_ST_2];
    match fs_khz {
        16 => {
            let mut filt_state = [0i32; 2];
            resampler_down2(&mut filt_state, &mut signal_8khz[..frame_length_8khz], signal);
        }
        12 => {
            let mut filt_state = [0i32; 6];
            resampler_down2_3(&mut filt_state, &mut signal_8khz[..frame_length_8khz], signal);
        }
        24 => {
            let mut filt_state = [0i32; 8];
            resampler_down3(&mut filt_state, &mut signal_8khz[..frame_length_8khz], signal);
        }
        _ => signal_8khz[..frame_length_8khz].copy_from_slice(signal),
    }

    // decimate again to 4 kHz
    let mut signal_4khz = [0i16; PE_MAX_FRAME_LENGTH_ST_1];
    let mut filt_state = [0i32; 2];
    resampler_down2(
        &mut filt_state,
        &mut signal_4khz[..frame_length_4khz],
        &signal_8khz[..frame_length_8khz],
    );

    // low-pass filter
    for i in (1..frame_length_4khz).rev() {
        signal_4khz[i] =
            sat16(i32::from(signal_4khz[i]) + i32::from(signal_4khz[i - 1]));
    }

    // inner products run over two lengths, scale for the worst case
    let max_sum_sq_length = sf_length_8khz.max(frame_length_4khz >> 1);
    let shift = find_scaling(&signal_4khz[..frame_length_4khz], max_sum_sq_length);
    if shift > 0 {
        for s in signal_4khz[..frame_length_4khz].iter_mut() {
            *s >>= shift;
        }
    }

    // first stage, operating at 4 kHz
    let mut target_ix = frame_length_4khz >> 1;
    for k in 0..2 {
        let target = &signal_4khz[target_ix..target_ix + sf_length_8khz];
        let mut basis_ix = target_ix - min_lag_4khz;

        let mut cross_corr =
            inner_prod(target, &signal_4khz[basis_ix..basis_ix + sf_length_8khz]);
        let mut normalizer = inner_prod(
            &signal_4khz[basis_ix..basis_ix + sf_length_8khz],
            &signal_4khz[basis_ix..basis_ix + sf_length_8khz],
        );
        normalizer = add_pos_sat32(normalizer, smulbb(sf_length_8khz as i32, 4000));
        c[k][min_lag_4khz] = sat16(cross_corr / (sqrt_approx(normalizer) + 1));

        // normalizer is updated recursively from here on
        for d in min_lag_4khz + 1..=max_lag_4khz {
            basis_ix -= 1;
            cross_corr = inner_prod(target, &signal_4khz[basis_ix..basis_ix + sf_length_8khz]);
            normalizer += smulbb(
                i32::from(signal_4khz[basis_ix]),
                i32::from(signal_4khz[basis_ix]),
            ) - smulbb(
                i32::from(signal_4khz[basis_ix + sf_length_8khz]),
                i32::from(signal_4khz[basis_ix + sf_length_8khz]),
            );
            c[k][d] = sat16(cross_corr / (sqrt_approx(normalizer) + 1));
        }
        target_ix += sf_length_8khz;
    }

    // combine the two half-frame measures and bias towards short lags
    for i in (min_lag_4khz..=max_lag_4khz).rev() {
        let mut sum = i32::from(c[0][i]) + i32::from(c[1][i]);
        sum >>= 1;
        sum = smlawb(sum, sum, -((i as i32) << 4));
        c[0][i] = sum as i16;
    }

    let mut length_d_srch = 4 + 2 * complexity;
    debug_assert!(3 * length_d_srch <= PE_D_SRCH_LENGTH);
    let mut d_srch = [0usize; PE_D_SRCH_LENGTH];
    insertion_sort_decreasing_i16(
        &mut c[0][min_lag_4khz..=max_lag_4khz],
        &mut d_srch,
        length_d_srch,
    );

    // give up early when even the best correlation is weak
    let target = &signal_4khz[frame_length_4khz >> 1..frame_length_4khz];
    let energy = add_pos_sat32(inner_prod(target, target), 1000);
    let cmax = i32::from(c[0][min_lag_4khz]);
    let threshold = smulbb(cmax, cmax);
    if energy >> 6 > threshold {
        *ltp_corr_q15 = 0;
        return unvoiced;
    }

    let threshold = smulwb(search_thres1_q16, cmax);
    for i in 0..length_d_srch {
        if i32::from(c[0][min_lag_4khz + i]) > threshold {
            // convert to 8 kHz indices
            d_srch[i] = (d_srch[i] + min_lag_4khz) << 1;
        } else {
            length_d_srch = i;
            break;
        }
    }
    debug_assert!(length_d_srch > 0);

    let mut d_comp = [0i16; (PE_MAX_LAG >> 1) + 5];
    for &d in &d_srch[..length_d_srch] {
        d_comp[d] = 1;
    }

    // convolve to also search lags just off the candidates
    for i in (min_lag_8khz..=max_lag_8khz + 3).rev() {
        d_comp[i] += d_comp[i - 1] + d_comp[i - 2];
    }

    length_d_srch = 0;
    for i in min_lag_8khz..=max_lag_8khz {
        if d_comp[i + 1] > 0 {
            d_srch[length_d_srch] = i;
            length_d_srch += 1;
        }
    }

    for i in (min_lag_8khz..=max_lag_8khz + 3).rev() {
        d_comp[i] += d_comp[i - 1] + d_comp[i - 2] + d_comp[i - 3];
    }

    let mut length_d_comp = 0;
    for i in min_lag_8khz..max_lag_8khz + 4 {
        if d_comp[i] > 0 {
            d_comp[length_d_comp] = (i - 2) as i16;
            length_d_comp += 1;
        }
    }

    // second stage, operating at 8 kHz, on lag sections with high correlation
    let shift = find_scaling(&signal_8khz[..frame_length_8khz], sf_length_8khz);
    if shift > 0 {
        for s in signal_8khz[..frame_length_8khz].iter_mut() {
            *s >>= shift;
        }
    }

    for row in c.iter_mut() {
        row.fill(0);
    }

    let mut target_ix = frame_length_4khz; // middle of the 8 kHz frame
    for k in 0..PE_NB_SUBFR {
        let target = &signal_8khz[target_ix..target_ix + sf_length_8khz];
        let energy_target = inner_prod(target, target);
        for j in 0..length_d_comp {
            let d = d_comp[j] as usize;
            let basis = &signal_8khz[target_ix - d..target_ix - d + sf_length_8khz];

            let cross_corr = inner_prod(target, basis);
            let energy_basis = inner_prod(basis, basis);
            if cross_corr > 0 {
                // normalize so the first division stays below one
                let energy = energy_target.max(energy_basis);
                let lshift = limit(clz32(cross_corr) - 1, 0, 15);
                let temp32 = (cross_corr << lshift) / ((energy >> (15 - lshift)) + 1);
                let temp32 = smulwb(cross_corr, temp32);
                let temp32 = temp32.saturating_add(temp32);
                let lshift = limit(clz32(temp32) - 1, 0, 15);
                let energy = energy_target.min(energy_basis);
                c[k][d] = ((temp32 << lshift) / ((energy >> (15 - lshift)) + 1)) as i16;
            } else {
                c[k][d] = 0;
            }
        }
        target_ix += sf_length_8khz;
    }

    let mut ccmax = i32::MIN;
    let mut ccmax_b = i32::MIN;
    let mut cbimax = 0usize;
    let mut lag: i32 = -1;

    let prev_lag = match fs_khz {
        12 => (prev_lag << 1) / 3,
        16 => prev_lag >> 1,
        24 => prev_lag / 3,
        _ => prev_lag,
    };
    let prev_lag_log2_q7 = if prev_lag > 0 { lin2log(prev_lag) } else { 0 };

    let corr_thres_q15 = smulbb(search_thres2_q15, search_thres2_q15) >> 13;

    // at 8 kHz this is the last stage, use the extended codebook
    let nb_cbks_stage2 = if fs_khz == 8 && complexity > 0 {
        PE_NB_CBKS_STAGE2_EXT
    } else {
        PE_NB_CBKS_STAGE2
    };

    for &d in &d_srch[..length_d_srch] {
        let mut cc = [0i32; PE_NB_CBKS_STAGE2_EXT];
        for (j, cc_j) in cc[..nb_cbks_stage2].iter_mut().enumerate() {
            for i in 0..PE_NB_SUBFR {
                let lag_ix = (d as i32 + i32::from(CB_LAGS_STAGE2[i][j])) as usize;
                *cc_j += i32::from(c[i][lag_ix]);
            }
        }
        let mut ccmax_new = i32::MIN;
        let mut cbimax_new = 0;
        for (i, &cc_i) in cc[..nb_cbks_stage2].iter().enumerate() {
            if cc_i > ccmax_new {
                ccmax_new = cc_i;
                cbimax_new = i;
            }
        }

        // bias towards shorter lags
        let lag_log2_q7 = lin2log(d as i32);
        let mut ccmax_new_b = ccmax_new
            - (smulbb(PE_NB_SUBFR as i32 * PE_SHORTLAG_BIAS_Q15, lag_log2_q7) >> 7);

        // bias towards the previous lag
        if prev_lag > 0 {
            let delta = lag_log2_q7 - prev_lag_log2_q7;
            let delta_sqr_q7 = smulbb(delta, delta) >> 7;
            let mut prev_lag_bias_q15 =
                smulbb(PE_NB_SUBFR as i32 * PE_PREVLAG_BIAS_Q15, *ltp_corr_q15) >> 15;
            prev_lag_bias_q15 =
                prev_lag_bias_q15 * delta_sqr_q7 / (delta_sqr_q7 + (1 << 6));
            ccmax_new_b -= prev_lag_bias_q15;
        }

        if ccmax_new_b > ccmax_b
            && ccmax_new > corr_thres_q15
            && i32::from(CB_LAGS_STAGE2[0][cbimax_new]) <= min_lag_8khz as i32
        {
            ccmax_b = ccmax_new_b;
            ccmax = ccmax_new;
            lag = d as i32;
            cbimax = cbimax_new;
        }
    }

    if lag == -1 {
        *ltp_corr_q15 = 0;
        return unvoiced;
    }

    let mut result = PitchInfo {
        unvoiced: false,
        pitch_lags: [0; PE_NB_SUBFR],
        lag_index: 0,
        contour_index: 0,
    };

    if fs_khz > 8 {
        // third stage, full rate
        let shift = find_scaling(signal, sf_length);
        let mut scaled;
        let input_signal: &[i16] = if shift > 0 {
            scaled = [0i16; crate::pitch_est_tables::PE_MAX_FRAME_LENGTH];
            for (dst, &src) in scaled[..frame_length].iter_mut().zip(signal) {
                *dst = src >> shift;
            }
            &scaled[..frame_length]
        } else {
            signal
        };

        // compensate for the decimation
        lag = match fs_khz {
            12 => smulbb(lag, 3) >> 1,
            16 => lag << 1,
            _ => smulbb(lag, 3),
        };
        lag = limit(lag, min_lag as i32, max_lag as i32);
        let start_lag = (lag - 2).max(min_lag as i32);
        let end_lag = (lag + 2).min(max_lag as i32);
        let mut lag_new = lag;
        cbimax = 0;

        *ltp_corr_q15 = sqrt_approx(ccmax << 13);
        ccmax = i32::MIN;

        let crosscorr_st3 = calc_corr_st3(input_signal, start_lag, sf_length, complexity);
        let energies_st3 = calc_energy_st3(input_signal, start_lag, sf_length, complexity);

        let contour_bias = PE_FLATCONTOUR_BIAS_Q20 / lag;
        let cbk_size = CBK_SIZES_STAGE3[complexity];
        let cbk_offset = CBK_OFFSETS_STAGE3[complexity];

        for (lag_counter, d) in (start_lag..=end_lag).enumerate() {
            for j in cbk_offset..cbk_offset + cbk_size {
                let mut cross_corr = 0i32;
                let mut energy = 0i32;
                for k in 0..PE_NB_SUBFR {
                    // means, to avoid overflow
                    energy += energies_st3[k][j][lag_counter] >> 2;
                    cross_corr += crosscorr_st3[k][j][lag_counter] >> 2;
                }
                let mut ccmax_new;
                if cross_corr > 0 {
                    let lshift = limit(clz32(cross_corr) - 1, 0, 13);
                    ccmax_new = (cross_corr << lshift) / ((energy >> (13 - lshift)) + 1);
                    ccmax_new = i32::from(sat16(ccmax_new));
                    ccmax_new = smulwb(cross_corr, ccmax_new);
                    if ccmax_new > i32::MAX >> 3 {
                        ccmax_new = i32::MAX;
                    } else {
                        ccmax_new <<= 3;
                    }
                    // reduce depending on flatness of contour
                    let diff = j as i32 - (PE_NB_CBKS_STAGE3_MAX as i32 >> 1);
                    let diff = i32::from(i16::MAX) - ((contour_bias * diff * diff) >> 5);
                    ccmax_new = smulwb(ccmax_new, diff) << 1;
                } else {
                    ccmax_new = 0;
                }

                if ccmax_new > ccmax
                    && d + i32::from(CB_LAGS_STAGE3[0][j]) <= max_lag as i32
                {
                    ccmax = ccmax_new;
                    lag_new = d;
                    cbimax = j;
                }
            }
        }

        for k in 0..PE_NB_SUBFR {
            result.pitch_lags[k] = lag_new + i32::from(CB_LAGS_STAGE3[k][cbimax]);
        }
        result.lag_index = (lag_new - min_lag as i32) as usize;
        result.contour_index = cbimax;
    } else {
        ccmax = ccmax.max(0);
        *ltp_corr_q15 = sqrt_approx(ccmax << 13);
        for k in 0..PE_NB_SUBFR {
            result.pitch_lags[k] = lag + i32::from(CB_LAGS_STAGE2[k][cbimax]);
        }
        result.lag_index = (lag - min_lag_8khz as i32) as usize;
        result.contour_index = cbimax;
    }

    result
}

/// Correlations for the stage 3 search, covering the whole lag codebook
/// for every searched offset lag.
fn calc_corr_st3(
    signal: &[i16],
    start_lag: i32,
    sf_length: usize,
    complexity: usize,
) -> [[[i32; PE_NB_STAGE3_LAGS]; PE_NB_CBKS_STAGE3_MAX]; PE_NB_SUBFR] {
    let mut cross_corr_st3 = [[[0i32; PE_NB_STAGE3_LAGS]; PE_NB_CBKS_STAGE3_MAX]; PE_NB_SUBFR];
    let cbk_offset = CBK_OFFSETS_STAGE3[complexity];
    let cbk_size = CBK_SIZES_STAGE3[complexity];

    let mut target_ix = sf_length << 2; // middle of the frame
    for k in 0..PE_NB_SUBFR {
        let target = &signal[target_ix..target_ix + sf_length];
        let mut scratch = [0i32; SCRATCH_SIZE];
        let mut lag_counter = 0;

        let lag_low = i32::from(LAG_RANGE_STAGE3[complexity][k][0]);
        let lag_high = i32::from(LAG_RANGE_STAGE3[complexity][k][1]);
        for j in lag_low..=lag_high {
            let basis_ix = (target_ix as i32 - (start_lag + j)) as usize;
            scratch[lag_counter] = inner_prod(target, &signal[basis_ix..basis_ix + sf_length]);
            lag_counter += 1;
        }

        for i in cbk_offset..cbk_offset + cbk_size {
            let idx = (i32::from(CB_LAGS_STAGE3[k][i]) - lag_low) as usize;
            for j in 0..PE_NB_STAGE3_LAGS {
                debug_assert!(idx + j < lag_counter);
                cross_corr_st3[k][i][j] = scratch[idx + j];
            }
        }
        target_ix += sf_length;
    }
    cross_corr_st3
}

/// Energies for the stage 3 search, computed recursively along the lag axis.
fn calc_energy_st3(
    signal: &[i16],
    start_lag: i32,
    sf_length: usize,
    complexity: usize,
) -> [[[i32; PE_NB_STAGE3_LAGS]; PE_NB_CBKS_STAGE3_MAX]; PE_NB_SUBFR] {
    let mut energies_st3 = [[[0i32; PE_NB_STAGE3_LAGS]; PE_NB_CBKS_STAGE3_MAX]; PE_NB_SUBFR];
    let cbk_offset = CBK_OFFSETS_STAGE3[complexity];
    let cbk_size = CBK_SIZES_STAGE3[complexity];

    let mut target_ix = sf_length << 2;
    for k in 0..PE_NB_SUBFR {
        let mut scratch = [0i32; SCRATCH_SIZE];
        let mut lag_counter = 0;

        let lag_low = i32::from(LAG_RANGE_STAGE3[complexity][k][0]);
        let lag_high = i32::from(LAG_RANGE_STAGE3[complexity][k][1]);

        let basis_ix = (target_ix as i32 - (start_lag + lag_low)) as usize;
        let mut energy = inner_prod(
            &signal[basis_ix..basis_ix + sf_length],
            &signal[basis_ix..basis_ix + sf_length],
        );
        scratch[lag_counter] = energy;
        lag_counter += 1;

        for i in 1..=(lag_high - lag_low) as usize {
            // slide the window one sample towards older history
            let leaving = i32::from(signal[basis_ix + sf_length - i]);
            let entering = i32::from(signal[basis_ix - i]);
            energy -= smulbb(leaving, leaving);
            energy = add_pos_sat32(energy, smulbb(entering, entering));
            scratch[lag_counter] = energy;
            lag_counter += 1;
        }

        for i in cbk_offset..cbk_offset + cbk_size {
            let idx = (i32::from(CB_LAGS_STAGE3[k][i]) - lag_low) as usize;
            for j in 0..PE_NB_STAGE3_LAGS {
                debug_assert!(idx + j < lag_counter);
                energies_st3[k][i][j] = scratch[idx + j];
            }
        }
        target_ix += sf_length;
    }
    energies_st3
}

/// Right shift that keeps the worst case sum of `sum_sqr_len` squared
/// samples below 31 bits.
fn find_scaling(signal: &[i16], sum_sqr_len: usize) -> i32 {
    let x_max = int16_array_maxabs(signal);
    let mut nbits = if x_max < i16::MAX {
        32 - clz32(smulbb(i32::from(x_max), i32::from(x_max)))
    } else {
        30
    };
    nbits += 17 - (clz32(sum_sqr_len as i32) - 16);

    if nbits < 31 {
        0
    } else {
        nbits - 30
    }
}

#[cfg(test)]
mod tests {
    use super::{find_scaling, pitch_analysis_core};
    use crate::pitch_est_tables::{PE_FRAME_LENGTH_MS, PE_MIN_LAG_MS, PE_NB_SUBFR};

    fn periodic_frame(fs_khz: usize, period: usize, amp: f64) -> alloc::vec::Vec<i16> {
        (0..PE_FRAME_LENGTH_MS * fs_khz)
            .map(|i| {
                let phase = (i % period) as f64 / period as f64;
                (libm::sin(2.0 * core::f64::consts::PI * phase) * amp) as i16
            })
            .collect()
    }

    #[test]
    fn silence_is_classified_unvoiced() {
        let signal = [0i16; PE_FRAME_LENGTH_MS * 8];
        let mut ltp_corr = 0;
        let info = pitch_analysis_core(&signal, &mut ltp_corr, 0, 39322, 22938, 8, 0);
        assert!(info.unvoiced);
        assert_eq!(info.pitch_lags, [0; PE_NB_SUBFR]);
        assert_eq!(ltp_corr, 0);
    }

    #[test]
    fn strongly_periodic_8khz_signal_is_voiced_near_its_period() {
        let period = 60;
        let signal = periodic_frame(8, period, 9000.0);
        let mut ltp_corr = 0;
        let info = pitch_analysis_core(&signal, &mut ltp_corr, 0, 39322, 22938, 8, 2);
        assert!(!info.unvoiced);
        assert!(ltp_corr > 16384);
        for &lag in &info.pitch_lags {
            assert!((lag - period as i32).abs() <= 3);
            assert!(lag as usize >= PE_MIN_LAG_MS * 8);
        }
    }

    #[test]
    fn periodic_16khz_signal_finds_full_rate_lag() {
        let period = 120;
        let signal = periodic_frame(16, period, 9000.0);
        let mut ltp_corr = 0;
        let info = pitch_analysis_core(&signal, &mut ltp_corr, 0, 39322, 22938, 16, 2);
        assert!(!info.unvoiced);
        for &lag in &info.pitch_lags {
            assert!((lag - period as i32).abs() <= 10);
        }
    }

    #[test]
    fn scaling_keeps_loud_signals_in_headroom() {
        let loud = [i16::MAX; 320];
        assert!(find_scaling(&loud, 160) > 0);
        let quiet = [100i16; 320];
        assert_eq!(find_scaling(&quiet, 160), 0);
    }
}
