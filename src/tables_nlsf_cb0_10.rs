//! Multi-stage NLSF codebook, voiced signals, order 10.

use crate::tables_nlsf::{NlsfCb, NlsfCbStage};

const STAGE0_Q15: [i16; 320] = [
    4655, 6750, 8822, 12311, 14667, 16704, 22677, 23510, 25112, 27409,
    2418, 6505, 9774, 11383, 16404, 17873, 21541, 22357, 27698, 28725,
    1524, 4968, 7573, 13681, 16873, 17173, 20963, 25221, 25654, 27755,
    2911, 6714, 7014, 13471, 16178, 19412, 20187, 24578, 28355, 29944,
    525, 6903, 9386, 12718, 13999, 18178, 18664, 25140, 27280, 31940,
    421, 6679, 8294, 10275, 16856, 17156, 20288, 25547, 27156, 27665,
    2567, 3884, 8593, 10894, 17242, 19824, 22619, 25270, 25765, 29238,
    2898, 6207, 8949, 10714, 15015, 16043, 22961, 25968, 26442, 29934,
    458, 3772, 9187, 9487, 16121, 17505, 22133, 24652, 26417, 28813,
    2916, 5472, 6951, 12464, 13288, 20360, 22873, 25343, 25643, 30490,
    4351, 8192, 9544, 10817, 13897, 17332, 19487, 22135, 25949, 27600,
    4777, 5857, 8921, 11905, 12700, 16595, 21684, 21991, 26764, 29241,
    3685, 6951, 7292, 12992, 13757, 19721, 20232, 23073, 28570, 29361,
    4696, 5097, 8755, 9719, 16282, 20076, 21469, 25216, 26032, 31727,
    3720, 7582, 11471, 12929, 13229, 19036, 20043, 23107, 28166, 29796,
    1925, 6340, 9548, 11237, 17030, 19925, 22507, 24649, 24949, 29882,
    4743, 5118, 10890, 11209, 17316, 17840, 21266, 22641, 25939, 29674,
    3932, 6270, 10015, 13060, 14161, 19116, 19521, 24296, 25517, 28762,
    5095, 7801, 8101, 12997, 16093, 18923, 22354, 22654, 28602, 31689,
    4269, 6436, 7067, 11726, 14452, 16780, 18319, 25059, 26973, 29882,
    2109, 3782, 8525, 10123, 15398, 16535, 18477, 22155, 28074, 29658,
    5029, 5394, 7145, 9530, 16025, 19668, 20071, 21476, 27486, 28194,
    3835, 4135, 9806, 10753, 13835, 19686, 20401, 23438, 27133, 30034,
    4833, 8119, 9750, 12356, 12656, 19579, 21031, 21893, 24484, 32000,
    2712, 6023, 8971, 10278, 15033, 16315, 22662, 23223, 28260, 29509,
    4004, 4379, 8425, 11363, 12898, 18717, 20795, 22871, 28165, 30183,
    1429, 5108, 10472, 13537, 14002, 17679, 18933, 24801, 27794, 31514,
    3561, 7645, 10578, 11288, 16441, 16876, 19599, 26035, 28591, 29786,
    4419, 5664, 9672, 9972, 17207, 17507, 19633, 22467, 26140, 30687,
    4862, 5993, 10764, 12946, 16325, 16625, 20616, 23218, 28270, 29242,
    4494, 4922, 9373, 9673, 13297, 18017, 21860, 22288, 27737, 28037,
    4599, 6456, 8334, 10711, 12873, 17703, 18848, 23594, 26993, 30978,
];
const STAGE0_RATES_Q5: [i16; 32] = [
    95, 108, 119, 127, 134, 140, 146, 151,
    155, 159, 163, 166, 169, 172, 175, 178,
    180, 183, 185, 187, 189, 191, 193, 195,
    197, 198, 200, 201, 203, 204, 206, 207,
];
const STAGE0_CDF: [u16; 33] = [
    0, 8340, 14595, 19600, 23771, 27346, 30474, 33255,
    35758, 38033, 40119, 42044, 43832, 45501, 47066, 48539,
    49930, 51248, 52500, 53692, 54830, 55919, 56962, 57964,
    58927, 59855, 60749, 61613, 62448, 63256, 64039, 64798,
    65535,
];
const STAGE1_Q15: [i16; 80] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    152, 394, -607, -7, -687, 775, 646, 439, 381, 684,
    725, -373, -415, -457, -464, 215, 876, -144, 818, 588,
    -7, -132, -347, -739, -270, -72, 424, -484, -254, -876,
    -828, 879, 265, 292, -777, -180, 482, 431, 107, -73,
    -34, 349, -369, 511, -281, 20, 681, -568, 640, -51,
    -464, -513, -474, 848, -158, 609, 893, 548, -499, -429,
    665, 397, 824, -123, -754, 32, 449, -496, -173, 577,
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
    -316, -209, 449, -4, 336, -47, -217, 251, -39, -63,
    47, -108, 422, 442, 259, 363, -206, -116, -55, -231,
    428, -273, 54, -439, 34, -350, -34, 444, 216, 43,
    -349, -262, 58, -419, -180, 33, -318, -247, -290, -188,
    -300, -414, 427, -323, -152, 1, -395, -361, -147, 418,
    177, 211, -184, 94, -132, 212, -63, 79, -181, 378,
    126, -416, 345, 213, -419, 276, 99, -159, 97, 176,
];
const STAGE2_RATES_Q5: [i16; 8] = [
    67, 80, 91, 99, 106, 112, 118, 123,
];
const STAGE2_CDF: [u16; 9] = [
    0, 15286, 26751, 35923, 43567, 50119, 55852, 60948,
    65535,
];
const STAGE3_Q15: [i16; 80] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    36, -165, -198, -30, -30, 25, 8, -52, 191, 168,
    32, -33, -108, -216, 87, 193, 187, -162, -42, 45,
    183, -144, 215, -25, -162, 92, 65, -180, -200, 145,
    -20, -164, 126, 160, 16, -147, 112, -120, 60, 194,
    6, -196, 127, 210, -83, -211, 83, -166, 175, -171,
    -149, 23, -108, -62, 184, 109, -67, -65, 90, -51,
    62, -212, 3, -175, -24, -219, 104, 16, -167, -53,
];
const STAGE3_RATES_Q5: [i16; 8] = [
    67, 80, 91, 99, 106, 112, 118, 123,
];
const STAGE3_CDF: [u16; 9] = [
    0, 15286, 26751, 35923, 43567, 50119, 55852, 60948,
    65535,
];

const DELTA_MIN_Q15: [i16; 11] = [
    250, 10, 12, 12, 12, 12, 12, 12,
    12, 12, 460,
];

const STAGES: [NlsfCbStage; 4] = [
    NlsfCbStage { n_vectors: 32, cb_q15: &STAGE0_Q15, rates_q5: &STAGE0_RATES_Q5 },
    NlsfCbStage { n_vectors: 8, cb_q15: &STAGE1_Q15, rates_q5: &STAGE1_RATES_Q5 },
    NlsfCbStage { n_vectors: 8, cb_q15: &STAGE2_Q15, rates_q5: &STAGE2_RATES_Q5 },
    NlsfCbStage { n_vectors: 8, cb_q15: &STAGE3_Q15, rates_q5: &STAGE3_RATES_Q5 },
];

const CDFS: [&[u16]; 4] = [&STAGE0_CDF, &STAGE1_CDF, &STAGE2_CDF, &STAGE3_CDF];

const MIDDLE_IX: [usize; 4] = [7, 3, 3, 3];

pub const NLSF_CB0_10: NlsfCb = NlsfCb {
    stages: &STAGES,
    delta_min_q15: &DELTA_MIN_Q15,
    cdfs: &CDFS,
    middle_ix: &MIDDLE_IX,
};
