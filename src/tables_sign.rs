//! Pulse sign probabilities.
//!
//! One entry per (signal type, quantization offset, rate level) combination;
//! each value is the Q16 probability of a positive sign, expanded into a
//! two-symbol CDF at the call site.

/// Indexed by `sign_type_offset * 9 + rate_level`, where the combined
/// type/offset index is in `0..4` and the rate level in `0..9`.
pub const SIGN_CDF: [u16; 36] = [
    37840, 36944, 36251, 35304,
    34715, 35503, 34529, 34296,
    34016, 47659, 44945, 42503,
    40235, 38569, 40254, 37851,
    37243, 36595, 43410, 44121,
    43127, 40978, 38845, 40433,
    38252, 37795, 36637, 59159,
    55630, 51806, 48073, 45036,
    48416, 43857, 42678, 41146,
];
