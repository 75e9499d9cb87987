//! Multi-stage NLSF codebook, unvoiced signals, order 10.

use crate::tables_nlsf::{NlsfCb, NlsfCbStage};

const STAGE0_Q15: [i16; 160] = [
    4776, 6007, 9784, 10098, 16035, 16335, 22628, 25065, 26642, 32000,
    1385, 7598, 8192, 9897, 14934, 15592, 19514, 25851, 26151, 29605,
    3814, 4114, 7221, 12437, 12756, 19281, 22467, 24590, 27599, 29346,
    5105, 5405, 10947, 13425, 15611, 19311, 20207, 23049, 26924, 29085,
    2979, 7215, 8915, 11044, 16083, 17376, 19931, 25577, 28042, 28894,
    3982, 6927, 9329, 12895, 15702, 17354, 19881, 22229, 26252, 27235,
    2502, 3776, 8479, 12279, 15804, 18437, 18737, 25607, 28794, 31460,
    503, 3552, 11488, 13750, 14947, 20121, 20884, 22645, 27145, 31988,
    5363, 5955, 11243, 11543, 14472, 19954, 21877, 24888, 25188, 28239,
    574, 4485, 10056, 13473, 13773, 18917, 21290, 23056, 24273, 28607,
    3512, 6434, 9604, 10130, 14587, 16841, 19911, 22383, 24358, 32000,
    4211, 6037, 7565, 13215, 14105, 18732, 21215, 23372, 27873, 31034,
    1113, 4767, 7198, 11346, 16376, 17315, 20802, 22068, 26336, 31428,
    5135, 5469, 8984, 13010, 14432, 19438, 21296, 21596, 27921, 29381,
    1703, 7572, 8075, 11062, 13150, 15537, 21181, 22162, 24539, 28729,
    3281, 6032, 8199, 11034, 16441, 16741, 19586, 25947, 29180, 32000,
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
const STAGE1_Q15: [i16; 80] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    264, 308, 153, 390, -684, -746, -618, -670, 479, -457,
    -219, 767, 387, -17, 538, -731, -482, -214, -418, -117,
    722, -465, 696, -103, -146, 201, -322, 354, 139, -200,
    529, 707, 480, 646, 49, -358, -455, 360, 427, 75,
    -166, 151, 314, -165, 495, -673, 645, 774, 282, 731,
    -124, -528, -131, -724, -791, 698, -178, -595, -627, -58,
    400, -567, 224, -368, -622, 746, -43, -479, 211, 425,
];
const STAGE1_RATES_Q5: [i16; 8] = [
    67, 80, 91, 99, 106, 112, 118, 123,
];
const STAGE1_CDF: [u16; 9] = [
    0, 15286, 26751, 35923, 43567, 50119, 55852, 60948,
    65535,
];
const STAGE2_Q15: [i16; 80] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    -106, 216, -153, 187, 307, -275, 72, 245, -96, 134,
    -70, 255, -51, 194, -172, 1, 110, -206, 322, -22,
    -79, -68, -285, 135, -80, 113, 46, 343, -341, 184,
    -185, 66, 341, -6, -341, -134, 314, -292, 145, -60,
    -226, 278, 299, 303, 20, -86, 173, 23, -41, -117,
    -317, -97, -325, 158, -278, 88, -317, 53, 314, 5,
    278, -125, 268, 309, -80, -71, 168, -58, 232, 195,
];
const STAGE2_RATES_Q5: [i16; 8] = [
    67, 80, 91, 99, 106, 112, 118, 123,
];
const STAGE2_CDF: [u16; 9] = [
    0, 15286, 26751, 35923, 43567, 50119, 55852, 60948,
    65535,
];

const DELTA_MIN_Q15: [i16; 11] = [
    250, 10, 12, 12, 12, 12, 12, 12,
    12, 12, 460,
];

const STAGES: [NlsfCbStage; 3] = [
    NlsfCbStage { n_vectors: 16, cb_q15: &STAGE0_Q15, rates_q5: &STAGE0_RATES_Q5 },
    NlsfCbStage { n_vectors: 8, cb_q15: &STAGE1_Q15, rates_q5: &STAGE1_RATES_Q5 },
    NlsfCbStage { n_vectors: 8, cb_q15: &STAGE2_Q15, rates_q5: &STAGE2_RATES_Q5 },
];

const CDFS: [&[u16]; 3] = [&STAGE0_CDF, &STAGE1_CDF, &STAGE2_CDF];

const MIDDLE_IX: [usize; 3] = [5, 3, 3];

pub const NLSF_CB1_10: NlsfCb = NlsfCb {
    stages: &STAGES,
    delta_min_q15: &DELTA_MIN_Q15,
    cdfs: &CDFS,
    middle_ix: &MIDDLE_IX,
};
