//! Signal type and quantization offset coding tables.
//!
//! The joint symbol packs signal type (unvoiced / voiced) and the low/high
//! quantization offset choice into two bits.

pub const TYPE_OFFSET_CDF: [u16; 5] = [
    0, 15729, 28836, 52428, 65535,
];

pub const TYPE_OFFSET_CDF_OFFSET: usize = 2;

/// Conditional CDFs keyed by the previous frame's joint symbol.
pub const TYPE_OFFSET_JOINT_CDF: [[u16; 5]; 4] = [
    [0, 39665, 48289, 56912, 65535],
    [0, 8624, 48289, 56912, 65535],
    [0, 8624, 17248, 56912, 65535],
    [0, 8624, 17248, 25871, 65535],
];
