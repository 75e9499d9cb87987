//! Miscellaneous codec tables: rate control curves, small CDFs for
//! frame-level flags, quantization offsets and filter coefficients.

use crate::common::FRAME_LENGTH_MS;

/// Entries in each bitrate-to-SNR mapping table.
pub const TARGET_RATE_TAB_SZ: usize = 8;

/// Piece-wise linear mapping points from target bitrate to coding quality,
/// 8 kHz internal rate.
pub const TARGET_RATE_TABLE_NB: [i32; TARGET_RATE_TAB_SZ] = [
    0, 8000, 9000, 11000, 13000, 16000, 22000, 100000,
];

/// 12 kHz internal rate.
pub const TARGET_RATE_TABLE_MB: [i32; TARGET_RATE_TAB_SZ] = [
    0, 10000, 12000, 14000, 17000, 21000, 28000, 100000,
];

/// 16 kHz internal rate.
pub const TARGET_RATE_TABLE_WB: [i32; TARGET_RATE_TAB_SZ] = [
    0, 11000, 14000, 17000, 21000, 26000, 36000, 100000,
];

/// 24 kHz internal rate.
pub const TARGET_RATE_TABLE_SWB: [i32; TARGET_RATE_TAB_SZ] = [
    0, 13000, 16000, 19000, 25000, 32000, 46000, 100000,
];

/// SNR values (Q1 dB) matching the rate table breakpoints.
pub const SNR_TABLE_Q1: [i32; TARGET_RATE_TAB_SZ] = [19, 31, 35, 39, 43, 47, 54, 64];

/// SNR at one bit per sample, Q7 dB, per internal rate.
pub const SNR_TABLE_ONE_BIT_PER_SAMPLE_Q7: [i32; 4] = [1984, 2240, 2408, 2708];

/// Decoder output high-pass, second order, Q13. AR coefficients per
/// internal rate and the shared MA coefficients.
pub const DEC_A_HP_24: [i16; 2] = [-16220, 8030];
pub const DEC_B_HP_24: [i16; 3] = [8000, -16000, 8000];
pub const DEC_A_HP_16: [i16; 2] = [-16127, 7940];
pub const DEC_B_HP_16: [i16; 3] = [8000, -16000, 8000];
pub const DEC_A_HP_12: [i16; 2] = [-16043, 7859];
pub const DEC_B_HP_12: [i16; 3] = [8000, -16000, 8000];
pub const DEC_A_HP_8: [i16; 2] = [-15885, 7710];
pub const DEC_B_HP_8: [i16; 3] = [8000, -16000, 8000];

/// CDF for the extra LSB of pulse magnitudes in overflow coding.
pub const LSB_CDF: [u16; 3] = [0, 40000, 65535];

/// LTP scale index CDF.
pub const LTPSCALE_CDF: [u16; 4] = [0, 32000, 48000, 65535];

pub const LTPSCALE_CDF_OFFSET: usize = 2;

/// Voice activity flag CDF.
pub const VADFLAG_CDF: [u16; 3] = [0, 22000, 65535];

pub const VADFLAG_CDF_OFFSET: usize = 1;

/// Internal sampling rates in kHz, in coding order.
pub const SAMPLING_RATES_TABLE: [i32; 4] = [8, 12, 16, 24];

pub const SAMPLING_RATES_CDF: [u16; 5] = [0, 16000, 32000, 48000, 65535];

pub const SAMPLING_RATES_CDF_OFFSET: usize = 2;

/// NLSF interpolation factor CDF (5 candidate factors).
pub const NLSF_INTERPOLATION_FACTOR_CDF: [u16; 6] = [
    0, 3706, 8703, 19226, 30926, 65535,
];

pub const NLSF_INTERPOLATION_FACTOR_CDF_OFFSET: usize = 4;

/// Frame termination CDF: more frames follow, last frame, or last frame
/// followed by one of the two LBRR layouts.
pub const FRAME_TERMINATION_CDF: [u16; 5] = [0, 20000, 45000, 56000, 65535];

pub const FRAME_TERMINATION_CDF_OFFSET: usize = 2;

/// Dither seed CDF (uniform over 4 seeds).
pub const SEED_CDF: [u16; 5] = [0, 16384, 32768, 49152, 65535];

pub const SEED_CDF_OFFSET: usize = 2;

/// Quantization offsets in Q10, indexed by signal type then low/high.
pub const QUANTIZATION_OFFSETS_Q10: [[i16; 2]; 2] = [[32, 100], [100, 256]];

/// LTP state scaling factors, Q14.
pub const LTP_SCALES_TABLE_Q14: [i16; 3] = [15565, 11469, 8192];

/// Interpolation points of the bandwidth transition smoother.
pub const TRANSITION_INT_NUM: usize = 5;

/// Frames a bandwidth transition is smeared over; opening up takes
/// twice as long as narrowing down.
pub const TRANSITION_FRAMES_UP: i32 = 5120 / FRAME_LENGTH_MS as i32;
pub const TRANSITION_FRAMES_DOWN: i32 = 2560 / FRAME_LENGTH_MS as i32;

/// Frames between interpolation points in each direction.
pub const TRANSITION_INT_STEPS_UP: i32 =
    TRANSITION_FRAMES_UP / (TRANSITION_INT_NUM as i32 - 1);
pub const TRANSITION_INT_STEPS_DOWN: i32 =
    TRANSITION_FRAMES_DOWN / (TRANSITION_INT_NUM as i32 - 1);

/// Second-order low-pass MA coefficients for the bandwidth transition
/// smoother, Q28, one row per interpolation point.
pub const TRANSITION_LP_B_Q28: [[i32; 3]; TRANSITION_INT_NUM] = [
    [250767114, 501534038, 250767114],
    [209867381, 419732057, 209867381],
    [170987846, 341967853, 170987846],
    [131531482, 263046905, 131531482],
    [89306658, 178584282, 89306658],
];

/// Matching AR coefficients, Q28.
pub const TRANSITION_LP_A_Q28: [[i32; 2]; TRANSITION_INT_NUM] = [
    [506393414, 239854379],
    [411067935, 169683996],
    [306733530, 116694253],
    [185807084, 77959395],
    [35497197, 57401098],
];
