//! Excitation entropy tables: pulse counts per shell block, rate levels and
//! the shell-split probability tables.

/// Number of rate levels for the excitation coder. The last level is only
/// used when pulse counts overflow into LSB coding.
pub const N_RATE_LEVELS: usize = 10;

/// Largest pulse count codable without LSBs in one shell block.
pub const MAX_PULSES: usize = 18;

/// Per-level caps on the pulse sum at each node size of the shell tree
/// (2, 4, 8 and 16 samples).
pub const MAX_PULSES_TABLE: [i32; 4] = [6, 8, 12, 18];

/// Pulse-count CDFs per rate level; symbol `MAX_PULSES + 1` flags LSB
/// overflow coding.
pub const PULSES_PER_BLOCK_CDF: [[u16; MAX_PULSES + 3]; N_RATE_LEVELS] = [
    [
        0, 46160, 62317, 65146, 65477, 65507, 65511, 65513,
        65515, 65517, 65519, 65521, 65523, 65525, 65527, 65529,
        65531, 65532, 65533, 65534, 65535,
    ],
    [
        0, 32529, 55300, 63271, 65132, 65459, 65506, 65513,
        65515, 65517, 65519, 65521, 65523, 65525, 65527, 65529,
        65531, 65532, 65533, 65534, 65535,
    ],
    [
        0, 21805, 45791, 58984, 63822, 65154, 65448, 65503,
        65513, 65516, 65518, 65520, 65522, 65524, 65526, 65528,
        65530, 65532, 65533, 65534, 65535,
    ],
    [
        0, 11968, 32312, 49605, 59405, 63571, 64988, 65391,
        65490, 65512, 65517, 65519, 65521, 65523, 65525, 65527,
        65529, 65531, 65533, 65534, 65535,
    ],
    [
        0, 4867, 17518, 33963, 48216, 57481, 62299, 64388,
        65165, 65419, 65493, 65513, 65519, 65521, 65523, 65525,
        65527, 65529, 65531, 65533, 65535,
    ],
    [
        0, 1467, 7037, 17618, 31021, 43753, 53430, 59559,
        62887, 64469, 65138, 65393, 65482, 65511, 65521, 65525,
        65527, 65529, 65531, 65533, 65535,
    ],
    [
        0, 298, 1897, 6212, 13978, 24461, 35783, 45973,
        53834, 59141, 62326, 64047, 64892, 65273, 65432, 65494,
        65518, 65527, 65531, 65533, 65535,
    ],
    [
        0, 34, 285, 1234, 3635, 8194, 15123, 23900,
        33429, 42482, 50127, 55937, 59952, 62495, 63983, 64791,
        65201, 65397, 65485, 65523, 65535,
    ],
    [
        0, 3, 24, 125, 475, 1390, 3310, 6669,
        11707, 18319, 26033, 34133, 41865, 48630, 54095, 58194,
        61064, 62948, 64112, 64792, 65535,
    ],
    [
        0, 2, 4, 11, 38, 127, 373, 944,
        2085, 4081, 7184, 11528, 17056, 23506, 30452, 37397,
        43880, 49552, 54224, 57858, 65535,
    ],
];

pub const PULSES_PER_BLOCK_CDF_OFFSET: usize = 6;

/// Codeword lengths in Q6 bits, for the rate-level search.
pub const PULSES_PER_BLOCK_BITS_Q6: [[i16; MAX_PULSES + 2]; N_RATE_LEVELS - 1] = [
    [
        32, 129, 290, 488, 710, 896, 960, 960,
        960, 960, 960, 960, 960, 960, 960, 960,
        1024, 1024, 1024, 1024,
    ],
    [
        65, 98, 195, 329, 489, 669, 844, 960,
        960, 960, 960, 960, 960, 960, 960, 960,
        1024, 1024, 1024, 1024,
    ],
    [
        102, 93, 148, 241, 360, 499, 654, 811,
        923, 960, 960, 960, 960, 960, 960, 960,
        960, 1024, 1024, 1024,
    ],
    [
        157, 108, 123, 175, 254, 354, 470, 600,
        739, 875, 960, 960, 960, 960, 960, 960,
        960, 960, 1024, 1024,
    ],
    [
        240, 152, 128, 141, 181, 241, 318, 409,
        513, 627, 747, 859, 960, 960, 960, 960,
        960, 960, 960, 960,
    ],
    [
        351, 228, 168, 147, 151, 177, 219, 275,
        344, 423, 512, 610, 713, 811, 896, 960,
        960, 960, 960, 960,
    ],
    [
        498, 343, 251, 197, 169, 162, 172, 196,
        232, 279, 336, 402, 475, 556, 643, 731,
        821, 896, 960, 960,
    ],
    [
        698, 514, 391, 305, 246, 207, 186, 178,
        183, 198, 224, 258, 300, 349, 406, 469,
        537, 611, 688, 795,
    ],
    [
        923, 743, 598, 483, 394, 326, 274, 237,
        212, 198, 193, 197, 210, 229, 256, 289,
        328, 372, 422, 414,
    ],
];

/// Rate-level CDFs, unvoiced then voiced.
pub const RATE_LEVELS_CDF: [[u16; N_RATE_LEVELS]; 2] = [
    [
        0, 13106, 24756, 34950, 43688, 50970, 56796, 61165,
        64078, 65535,
    ],
    [
        0, 5638, 14094, 25368, 35938, 45099, 52850, 59192,
        63420, 65535,
    ],
];

pub const RATE_LEVELS_CDF_OFFSET: usize = 4;

pub const RATE_LEVELS_BITS_Q6: [[i16; N_RATE_LEVELS - 1]; 2] = [
    [
        149, 159, 172, 186, 203, 223, 250, 287,
        351,
    ],
    [
        226, 189, 163, 168, 182, 197, 216, 253,
        317,
    ],
];

/// Split CDFs for shell nodes of 2 samples; slices start at
/// [`SHELL_CODE_TABLE_OFFSETS`]`[p]` and hold `p + 2` entries.
pub const SHELL_CODE_TABLE0: [u16; 33] = [
    0, 32768, 65535, 0, 16930, 48605, 65535, 0,
    9012, 32768, 56524, 65535, 0, 4998, 21054, 44482,
    60538, 65535, 0, 2936, 13244, 32768, 52291, 62599,
    65535, 0, 1859, 8325, 23084, 42451, 57210, 63676,
    65535,
];

/// Split CDFs for shell nodes of 4 samples.
pub const SHELL_CODE_TABLE1: [u16; 52] = [
    0, 32768, 65535, 0, 16930, 48605, 65535, 0,
    9012, 32768, 56524, 65535, 0, 4998, 21054, 44482,
    60538, 65535, 0, 2936, 13244, 32768, 52291, 62599,
    65535, 0, 1859, 8325, 23084, 42451, 57210, 63676,
    65535, 0, 1281, 5326, 15822, 32768, 49714, 60209,
    64254, 65535, 0, 959, 3531, 10710, 24340, 41195,
    54825, 62004, 64576, 65535,
];

/// Split CDFs for shell nodes of 8 samples.
pub const SHELL_CODE_TABLE2: [u16; 102] = [
    0, 32768, 65535, 0, 16930, 48605, 65535, 0,
    9012, 32768, 56524, 65535, 0, 4998, 21054, 44482,
    60538, 65535, 0, 2936, 13244, 32768, 52291, 62599,
    65535, 0, 1859, 8325, 23084, 42451, 57210, 63676,
    65535, 0, 1281, 5326, 15822, 32768, 49714, 60209,
    64254, 65535, 0, 959, 3531, 10710, 24340, 41195,
    54825, 62004, 64576, 65535, 0, 772, 2465, 7268,
    17599, 32768, 47937, 58268, 63071, 64764, 65535, 0,
    654, 1827, 5015, 12522, 25213, 40322, 53013, 60520,
    63708, 64881, 65535, 0, 576, 1440, 3571, 8869,
    18918, 32768, 46618, 56667, 61965, 64095, 64959, 65535,
    0, 520, 1198, 2653, 6325, 13957, 25864, 39672,
    51579, 59211, 62883, 64338, 65016, 65535,
];

/// Split CDFs for the 16-sample root of the shell tree.
pub const SHELL_CODE_TABLE3: [u16; 207] = [
    0, 32768, 65535, 0, 16930, 48605, 65535, 0,
    9012, 32768, 56524, 65535, 0, 4998, 21054, 44482,
    60538, 65535, 0, 2936, 13244, 32768, 52291, 62599,
    65535, 0, 1859, 8325, 23084, 42451, 57210, 63676,
    65535, 0, 1281, 5326, 15822, 32768, 49714, 60209,
    64254, 65535, 0, 959, 3531, 10710, 24340, 41195,
    54825, 62004, 64576, 65535, 0, 772, 2465, 7268,
    17599, 32768, 47937, 58268, 63071, 64764, 65535, 0,
    654, 1827, 5015, 12522, 25213, 40322, 53013, 60520,
    63708, 64881, 65535, 0, 576, 1440, 3571, 8869,
    18918, 32768, 46618, 56667, 61965, 64095, 64959, 65535,
    0, 520, 1198, 2653, 6325, 13957, 25864, 39672,
    51579, 59211, 62883, 64338, 65016, 65535, 0, 476,
    1039, 2070, 4598, 10214, 19947, 32768, 45589, 55322,
    60938, 63466, 64496, 65059, 65535, 0, 442, 930,
    1695, 3443, 7484, 15127, 26373, 39163, 50409, 58052,
    62093, 63841, 64606, 65094, 65535, 0, 412, 850,
    1449, 2678, 5545, 11360, 20777, 32768, 44759, 54176,
    59991, 62858, 64087, 64686, 65123, 65535, 0, 387,
    788, 1282, 2172, 4196, 8513, 16105, 26785, 38751,
    49431, 57023, 61339, 63363, 64253, 64747, 65148, 65535,
    0, 365, 738, 1164, 1835, 3271, 6420, 12353,
    21467, 32768, 44069, 53183, 59115, 62264, 63700, 64371,
    64797, 65170, 65535, 0, 346, 696, 1076, 1605,
    2639, 4912, 9434, 16938, 27127, 38409, 48597, 56101,
    60623, 62896, 63930, 64459, 64839, 65189, 65535,
];

/// Start of the CDF slice for each pulse sum.
pub const SHELL_CODE_TABLE_OFFSETS: [usize; MAX_PULSES + 1] = [
    0, 0, 3, 7, 12, 18, 25, 33,
    42, 52, 63, 75, 88, 102, 117, 133,
    150, 168, 187,
];
