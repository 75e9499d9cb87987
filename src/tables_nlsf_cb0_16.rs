//! Multi-stage NLSF codebook, voiced signals, order 16.

use crate::tables_nlsf::{NlsfCb, NlsfCbStage};

const STAGE0_Q15: [i16; 512] = [
    400, 1696, 5690, 7537, 8517, 11192, 12379, 15449,
    16876, 19653, 19953, 23136, 23939, 26417, 29164, 32000,
    1835, 3387, 5580, 7780, 10471, 12075, 12821, 15377,
    17442, 21205, 23364, 24065, 24639, 26056, 29090, 29390,
    1094, 5397, 6093, 6429, 8788, 10120, 11719, 14880,
    16805, 18983, 22037, 25195, 25495, 26713, 28818, 29191,
    3261, 4939, 5358, 6341, 10151, 13394, 14510, 15186,
    17570, 21315, 22351, 24473, 24773, 25073, 27664, 28847,
    1933, 4318, 5164, 6995, 9067, 12269, 12569, 15413,
    16909, 18732, 21116, 22046, 25824, 27898, 29157, 32000,
    2235, 2535, 4297, 9475, 9895, 12696, 14736, 15940,
    16803, 21037, 21337, 22909, 25302, 27016, 29884, 31072,
    1091, 3239, 6871, 8289, 9262, 11435, 11735, 14818,
    17940, 21400, 21932, 23342, 26666, 27825, 29985, 32000,
    3043, 3902, 4903, 7299, 7756, 11537, 14626, 16039,
    17085, 18410, 21675, 23268, 24878, 26804, 28131, 30221,
    1490, 2441, 4590, 9736, 10897, 11795, 12095, 15228,
    16194, 20183, 21261, 23764, 24910, 25210, 28501, 31463,
    2412, 3131, 5678, 8083, 8383, 12810, 14164, 16262,
    17102, 18821, 21642, 22128, 26757, 27057, 28319, 29094,
    1110, 4019, 5107, 5990, 7980, 12162, 15612, 16535,
    16835, 20098, 21909, 23130, 23430, 24995, 30274, 32000,
    3081, 3779, 4079, 8168, 9283, 10458, 11940, 14625,
    17582, 19273, 22520, 24795, 25095, 25395, 29242, 29542,
    1584, 1884, 3760, 5568, 8607, 10104, 14107, 14900,
    17326, 17834, 19484, 23911, 24861, 26214, 27889, 32000,
    400, 4035, 5859, 8263, 9307, 12029, 12932, 15507,
    18636, 19152, 20746, 22952, 25895, 26550, 27812, 32000,
    3467, 5714, 6331, 6905, 8257, 12626, 12926, 15443,
    17538, 18064, 19475, 22559, 24152, 26864, 29013, 31999,
    1029, 3152, 4717, 6808, 10488, 11752, 12246, 15733,
    18318, 19216, 19516, 23066, 26891, 27251, 28196, 32000,
    1747, 4235, 5812, 6112, 11661, 11961, 14231, 17298,
    18610, 20459, 20759, 21405, 24863, 27067, 28851, 32000,
    1890, 2190, 4259, 7864, 10512, 10814, 13709, 14009,
    16072, 21444, 22637, 22937, 23617, 29083, 31014, 32000,
    1854, 3708, 4237, 8478, 10325, 11311, 13388, 15745,
    18655, 20223, 21448, 21948, 24156, 26848, 30458, 30857,
    1589, 4765, 7726, 8113, 8477, 10573, 13899, 14199,
    15836, 19850, 20357, 22168, 25642, 29078, 29378, 32000,
    1375, 3361, 6312, 6717, 9371, 10642, 15320, 16997,
    17405, 20366, 22128, 23072, 25957, 27232, 30615, 31253,
    400, 4123, 5618, 7248, 9800, 11835, 12135, 16658,
    18711, 20403, 21229, 24480, 25294, 27028, 29967, 30528,
    3271, 3571, 5380, 9706, 10606, 10906, 13967, 14836,
    16468, 20665, 20965, 21406, 26749, 27648, 28130, 31148,
    2040, 4343, 5374, 7734, 9271, 10771, 14486, 16900,
    17476, 18285, 20818, 25072, 25446, 28847, 30259, 30559,
    400, 3878, 6658, 7613, 8000, 12326, 12762, 15561,
    17005, 19993, 20593, 21622, 25092, 28615, 29085, 30292,
    3907, 5075, 5703, 7161, 9821, 10187, 13881, 14181,
    15277, 18183, 21541, 22790, 24885, 28496, 29716, 31010,
    3616, 5747, 6456, 7544, 7990, 10677, 11704, 13873,
    15894, 20095, 22373, 23596, 24732, 28032, 28884, 32000,
    2197, 3932, 5710, 8240, 9467, 12248, 13801, 16752,
    18597, 19247, 21592, 21892, 23150, 27135, 30998, 32000,
    400, 2769, 7401, 9161, 9487, 11837, 14676, 15211,
    16822, 18378, 22765, 23250, 24735, 27509, 28841, 31533,
    3521, 3936, 7472, 9054, 10019, 12048, 14564, 14864,
    17223, 17523, 19397, 24306, 26859, 27159, 28937, 32000,
    1520, 4900, 5669, 7999, 8299, 11957, 12851, 14940,
    17882, 20923, 21449, 22577, 25002, 29135, 30264, 31158,
    519, 5380, 5895, 7881, 8747, 11450, 13386, 16126,
    17454, 19034, 20352, 23959, 26090, 26468, 26928, 30438,
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
const STAGE1_Q15: [i16; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    687, -669, -189, -300, 558, -314, -796, 88,
    -516, 586, 277, -57, -49, 665, 62, 390,
    465, 740, 50, -205, -686, -685, 579, 474,
    113, -768, -214, -328, -350, -570, -645, -323,
    -741, -578, -675, 350, 176, 32, -769, -9,
    -282, 68, -465, -212, -203, 694, -720, -622,
    316, 382, -377, -658, -582, -457, -636, 115,
    -441, -407, 43, -18, -30, -104, 762, -768,
    -733, -711, 48, 450, 606, 561, 453, 543,
    -622, 329, 402, -43, 458, -176, -349, 496,
    -469, -357, 654, 175, 29, -609, 197, 682,
    278, 651, 296, 720, -370, 12, -638, 183,
    -521, -516, -61, -347, -594, 513, 476, -258,
    -206, 550, 747, 302, -729, 572, -724, 220,
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
    255, 75, -152, 189, -290, -238, -247, 72,
    332, 318, -152, -119, 214, 89, 242, -242,
    235, -317, -51, -150, 74, -160, -82, 221,
    144, -85, 80, 21, 386, 283, 286, 40,
    286, 157, -206, 353, 171, -192, 376, -37,
    181, -372, -157, -3, 329, 255, 109, 343,
    -122, -381, -171, 207, 140, -207, -292, -28,
    168, 163, 122, 74, 197, -15, -199, -151,
    392, -228, 75, -51, 42, -12, 377, -209,
    47, -48, -81, -381, 130, 7, -322, 197,
    -226, -139, -38, 139, -145, 161, -258, 105,
    -124, 362, 30, -85, 275, -187, -13, -371,
    391, 117, -243, -249, 47, -213, 378, -268,
    235, -262, 117, 266, 312, -338, 101, -382,
];
const STAGE2_RATES_Q5: [i16; 8] = [
    67, 80, 91, 99, 106, 112, 118, 123,
];
const STAGE2_CDF: [u16; 9] = [
    0, 15286, 26751, 35923, 43567, 50119, 55852, 60948,
    65535,
];
const STAGE3_Q15: [i16; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0,
    -122, -195, 195, -56, 32, 141, -112, 48,
    12, 172, -19, -6, -158, -177, -128, 100,
    -141, -62, 71, 126, -155, -106, 192, 25,
    197, 57, 173, -154, -2, -11, 65, -112,
    -17, 35, -49, 157, -169, -16, 169, 188,
    -66, -161, -14, -178, 140, -134, -11, 134,
    53, -19, -89, -90, -111, -37, 151, -199,
    198, 178, -120, 149, -36, 200, -102, -80,
    63, 137, -21, -167, -26, -89, 121, 65,
    -16, -182, -14, -88, 117, -33, 178, 137,
    53, -6, 175, 116, -22, 157, 65, -47,
    51, -74, -146, 113, -198, 128, -73, 9,
    -64, 187, -145, -161, -29, 93, -151, -127,
    22, -96, -59, -172, 177, 72, 164, -92,
];
const STAGE3_RATES_Q5: [i16; 8] = [
    67, 80, 91, 99, 106, 112, 118, 123,
];
const STAGE3_CDF: [u16; 9] = [
    0, 15286, 26751, 35923, 43567, 50119, 55852, 60948,
    65535,
];

const DELTA_MIN_Q15: [i16; 17] = [
    180, 8, 9, 9, 9, 9, 9, 9,
    9, 9, 9, 9, 9, 9, 9, 9,
    350,
];

const STAGES: [NlsfCbStage; 4] = [
    NlsfCbStage { n_vectors: 32, cb_q15: &STAGE0_Q15, rates_q5: &STAGE0_RATES_Q5 },
    NlsfCbStage { n_vectors: 8, cb_q15: &STAGE1_Q15, rates_q5: &STAGE1_RATES_Q5 },
    NlsfCbStage { n_vectors: 8, cb_q15: &STAGE2_Q15, rates_q5: &STAGE2_RATES_Q5 },
    NlsfCbStage { n_vectors: 8, cb_q15: &STAGE3_Q15, rates_q5: &STAGE3_RATES_Q5 },
];

const CDFS: [&[u16]; 4] = [&STAGE0_CDF, &STAGE1_CDF, &STAGE2_CDF, &STAGE3_CDF];

const MIDDLE_IX: [usize; 4] = [7, 3, 3, 3];

pub const NLSF_CB0_16: NlsfCb = NlsfCb {
    stages: &STAGES,
    delta_min_q15: &DELTA_MIN_Q15,
    cdfs: &CDFS,
    middle_ix: &MIDDLE_IX,
};
