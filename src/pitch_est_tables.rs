//! Pitch estimator configuration constants and lag-contour codebooks.
//!
//! The search runs over two frames of history (40 ms) at up to 24 kHz; the
//! stage-2 and stage-3 codebooks give per-subframe lag offsets around a
//! common average lag.

/// Maximum internal rate seen by the pitch estimator, kHz.
pub const PE_MAX_FS_KHZ: usize = 24;

/// Analysis window of the estimator, ms (current frame plus history).
pub const PE_FRAME_LENGTH_MS: usize = 40;

pub const PE_MAX_FRAME_LENGTH: usize = PE_FRAME_LENGTH_MS * PE_MAX_FS_KHZ;
pub const PE_MAX_FRAME_LENGTH_ST_1: usize = PE_MAX_FRAME_LENGTH >> 2;
pub const PE_MAX_FRAME_LENGTH_ST_2: usize = PE_MAX_FRAME_LENGTH >> 1;

/// Longest lag searched, ms (56 Hz).
pub const PE_MAX_LAG_MS: usize = 18;

/// Shortest lag searched, ms (500 Hz).
pub const PE_MIN_LAG_MS: usize = 2;

pub const PE_MAX_LAG: usize = PE_MAX_LAG_MS * PE_MAX_FS_KHZ;
pub const PE_MIN_LAG: usize = PE_MIN_LAG_MS * PE_MAX_FS_KHZ;

/// Subframes per frame.
pub const PE_NB_SUBFR: usize = 4;

/// Candidate lags kept after the stage-1 coarse search.
pub const PE_D_SRCH_LENGTH: usize = 24;

pub const PE_MAX_DECIMATE_STATE_LENGTH: usize = 7;

/// Lags evaluated around each candidate in stage 3.
pub const PE_NB_STAGE3_LAGS: usize = 5;

pub const PE_NB_CBKS_STAGE2: usize = 3;
pub const PE_NB_CBKS_STAGE2_EXT: usize = 11;

/// Stage-2 contour entries bracketing the average lag.
pub const PE_CB_MN2: i32 = 1;
pub const PE_CB_MX2: i32 = 2;

pub const PE_NB_CBKS_STAGE3_MAX: usize = 34;
pub const PE_NB_CBKS_STAGE3_MID: usize = 24;
pub const PE_NB_CBKS_STAGE3_MIN: usize = 16;

/// Highest complexity setting of the estimator.
pub const PE_MAX_COMPLEX: usize = 2;

/// Bias towards shorter lags, counters period doubling.
pub const PE_SHORTLAG_BIAS_Q15: i32 = 6554;

/// Bias towards the previous frame's lag.
pub const PE_PREVLAG_BIAS_Q15: i32 = 6554;

/// Penalty on non-flat pitch contours.
pub const PE_FLATCONTOUR_BIAS_Q20: i32 = 52429;

/// Stage-2 contour codebook: per-subframe lag offsets.
pub const CB_LAGS_STAGE2: [[i16; PE_NB_CBKS_STAGE2_EXT]; PE_NB_SUBFR] = [
    [0, 2, -1, -1, -1, 0, 0, 1, 1, 0, 1],
    [0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0],
    [0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0],
    [0, -1, 2, 1, 0, 1, 1, 0, 0, -1, -1],
];

/// Stage-3 contour codebook.
pub const CB_LAGS_STAGE3: [[i16; PE_NB_CBKS_STAGE3_MAX]; PE_NB_SUBFR] = [
    [
        -9, -7, -6, -5, -5, -4, -4, -3, -3, -2, -2, -2, -1, -1, -1, 0, 0, 0, 1, 1, 0, 1, 2,
        2, 2, 3, 3, 4, 4, 5, 6, 5, 6, 8,
    ],
    [
        -3, -2, -2, -2, -1, -1, -1, -1, -1, 0, 0, -1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 1, 0,
        1, 1, 2, 1, 2, 2, 2, 2, 3,
    ],
    [
        3, 3, 2, 2, 2, 2, 1, 2, 1, 1, 0, 1, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, -1, 0, 0, -1,
        -1, -1, -1, -1, -2, -2, -2,
    ],
    [
        9, 8, 6, 5, 6, 5, 4, 4, 3, 3, 2, 2, 2, 1, 0, 1, 1, 0, 0, 0, -1, -1, -1, -2, -2, -2,
        -3, -3, -4, -4, -5, -5, -6, -7,
    ],
];

/// Stage-3 lag search ranges per complexity setting.
pub const LAG_RANGE_STAGE3: [[[i16; 2]; PE_NB_SUBFR]; PE_MAX_COMPLEX + 1] = [
    [[-2, 6], [-1, 5], [-1, 5], [-2, 7]],
    [[-4, 8], [-1, 6], [-1, 6], [-4, 9]],
    [[-9, 12], [-3, 7], [-2, 7], [-7, 13]],
];

pub const CBK_SIZES_STAGE3: [usize; PE_MAX_COMPLEX + 1] = [
    PE_NB_CBKS_STAGE3_MIN,
    PE_NB_CBKS_STAGE3_MID,
    PE_NB_CBKS_STAGE3_MAX,
];

pub const CBK_OFFSETS_STAGE3: [usize; PE_MAX_COMPLEX + 1] = [
    (PE_NB_CBKS_STAGE3_MAX - PE_NB_CBKS_STAGE3_MIN) >> 1,
    (PE_NB_CBKS_STAGE3_MAX - PE_NB_CBKS_STAGE3_MID) >> 1,
    0,
];
