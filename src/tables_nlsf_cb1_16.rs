//! Multi-stage NLSF codebook, unvoiced signals, order 16.

use crate::tables_nlsf::{NlsfCb, NlsfCbStage};

const STAGE0_Q15: [i16; 256] = [
    2564, 3764, 4064, 7790, 8714, 10569, 11361, 15810,
    17150, 19017, 22997, 23297, 24787, 25128, 29543, 32000,
    3152, 3759, 4893, 6071, 9813, 11236, 12908, 13842,
    18883, 20576, 20954, 21254, 23717, 24903, 27596, 31186,
    3276, 3729, 7552, 9747, 10589, 10911, 13832, 14186,
    15806, 21271, 22248, 24471, 24912, 25212, 28221, 32000,
    482, 4432, 6511, 7526, 9009, 11364, 13780, 15606,
    16550, 19123, 19423, 22372, 23531, 25467, 28053, 32000,
    668, 2701, 7280, 7580, 9786, 10145, 14277, 16101,
    17483, 20362, 21975, 23012, 26829, 27172, 28574, 31091,
    400, 5286, 5586, 5886, 8133, 12883, 14440, 16709,
    17009, 21261, 21561, 21861, 26125, 26425, 27637, 30599,
    1040, 4830, 5211, 6848, 10619, 11155, 11976, 16655,
    16955, 19100, 20587, 24764, 25305, 25832, 26843, 30785,
    2956, 3425, 3725, 6542, 8448, 9725, 13236, 13536,
    17167, 19049, 19528, 21294, 23254, 27160, 27460, 29680,
    740, 1853, 6543, 7514, 9235, 12337, 13124, 14622,
    16747, 21192, 21492, 22973, 25250, 26670, 28118, 32000,
    3593, 4553, 5611, 8042, 11225, 11525, 11825, 15081,
    17663, 18807, 21051, 22851, 26493, 27891, 28670, 29113,
    2051, 2808, 7586, 8171, 11738, 12909, 15253, 16135,
    17287, 19755, 20055, 24724, 25072, 26410, 30033, 30333,
    400, 3931, 4377, 8662, 8962, 10482, 11697, 16640,
    17611, 19955, 22104, 24781, 26222, 27548, 28072, 32000,
    536, 3105, 5896, 7408, 8432, 13351, 13668, 16439,
    17811, 18480, 21469, 22391, 23110, 28072, 28372, 30726,
    994, 6017, 7259, 8865, 9165, 10897, 13989, 14671,
    16760, 17351, 20776, 23123, 26746, 27287, 29528, 29941,
    400, 3667, 5836, 7580, 9234, 10230, 13076, 16328,
    17479, 21087, 21995, 23314, 23614, 27310, 29391, 31089,
    2909, 3991, 5480, 7023, 9099, 11971, 12417, 16707,
    17237, 17537, 21186, 21486, 24299, 25883, 29141, 29441,
];
const STAGE0_RATES_Q5: [i16; 16] = [
    83, 96, 106, 115, 122, 128, 133, 138,
    143, 147, 150, 154, 157, 160, 163, 165,
];
const STAGE0_CDF: [u16; 17] = [
    0, 10948, 19159, 25728, 31202, 35894, 40000, 43650,
    46935, 49921, 52659, 55186, 57533, 59723, 61777, 63710,
    65535,
];
const STAGE1_Q15: [i16; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    624, 346, 676, -347, -609, 582, 444, -567,
    287, -192, -215, 14, 108, -568, -506, -474,
    -225, -582, -72, 265, 384, 441, -311, 96,
    -310, -608, -320, 621, 632, -319, -200, -649,
    396, 79, 312, 398, -53, -553, 641, -578,
    493, -96, -340, 230, 312, -597, 544, -519,
    36, 87, -91, -583, 411, -25, -693, -481,
    -113, 471, -335, -249, -409, 58, -456, -617,
    -164, -247, -530, -591, -386, -225, 92, -117,
    -575, -622, 250, 610, -436, -71, 63, 56,
    614, -517, -140, 61, -276, 129, -91, 25,
    66, -201, -240, -318, 182, -679, 363, 364,
    -155, 369, -495, 393, -415, 425, 297, -78,
    324, 17, 514, 147, 540, -490, -556, -327,
];
const STAGE1_RATES_Q5: [i16; 8] = [
    67, 80, 91, 99, 106, 112, 118, 123,
];
const STAGE1_CDF: [u16; 9] = [
    0, 15286, 26751, 35923, 43567, 50119, 55852, 60948,
    65535,
];
const STAGE2_Q15: [i16; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    158, -174, -15, -112, -296, -37, 162, -161,
    -127, 245, -312, -273, -162, -218, 21, -213,
    -48, 229, -155, 87, -134, -113, -198, 229,
    306, -297, -28, -206, 179, -134, 90, -231,
    -235, -38, 246, 277, 258, -119, -59, -101,
    -262, -266, 290, -123, 178, -35, -279, 191,
    -52, 122, 317, 305, 294, 138, -75, -177,
    -194, 218, -8, 74, 182, 188, -34, -217,
    30, 219, -20, 244, 108, 248, 277, 154,
    16, 62, 175, 203, 3, -154, 207, 62,
    -112, -155, 177, 24, -219, 89, -161, -172,
    266, -6, -53, -113, 106, 43, -317, 232,
    132, -313, 37, -127, 94, -47, -72, 231,
    -287, -128, -263, -143, -26, 300, -231, -72,
];
const STAGE2_RATES_Q5: [i16; 8] = [
    67, 80, 91, 99, 106, 112, 118, 123,
];
const STAGE2_CDF: [u16; 9] = [
    0, 15286, 26751, 35923, 43567, 50119, 55852, 60948,
    65535,
];

const DELTA_MIN_Q15: [i16; 17] = [
    180, 8, 9, 9, 9, 9, 9, 9,
    9, 9, 9, 9, 9, 9, 9, 9,
    350,
];

const STAGES: [NlsfCbStage; 3] = [
    NlsfCbStage { n_vectors: 16, cb_q15: &STAGE0_Q15, rates_q5: &STAGE0_RATES_Q5 },
    NlsfCbStage { n_vectors: 8, cb_q15: &STAGE1_Q15, rates_q5: &STAGE1_RATES_Q5 },
    NlsfCbStage { n_vectors: 8, cb_q15: &STAGE2_Q15, rates_q5: &STAGE2_RATES_Q5 },
];

const CDFS: [&[u16]; 3] = [&STAGE0_CDF, &STAGE1_CDF, &STAGE2_CDF];

const MIDDLE_IX: [usize; 3] = [5, 3, 3];

pub const NLSF_CB1_16: NlsfCb = NlsfCb {
    stages: &STAGES,
    delta_min_q15: &DELTA_MIN_Q15,
    cdfs: &CDFS,
    middle_ix: &MIDDLE_IX,
};
