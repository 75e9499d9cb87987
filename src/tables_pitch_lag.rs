//! Probability tables for pitch lag, contour and lag-delta coding.
//!
//! One lag CDF per internal sampling rate; the symbol index maps to
//! `lag - 2 ms * fs_khz`, covering lags from 2 ms up to 18 ms.

pub const PITCH_LAG_NB_CDF: [u16; 130] = [
    0, 195, 444, 753, 1128, 1573, 2091, 2684,
    3353, 4096, 4912, 5798, 6750, 7763, 8833, 9955,
    11123, 12331, 13574, 14846, 16141, 17454, 18779, 20112,
    21448, 22783, 24113, 25434, 26743, 28036, 29312, 30567,
    31800, 33009, 34192, 35348, 36476, 37575, 38645, 39685,
    40695, 41675, 42624, 43543, 44432, 45291, 46120, 46920,
    47692, 48436, 49153, 49843, 50507, 51145, 51759, 52349,
    52915, 53459, 53981, 54482, 54963, 55424, 55866, 56290,
    56696, 57085, 57458, 57815, 58157, 58485, 58799, 59100,
    59388, 59664, 59928, 60181, 60423, 60655, 60877, 61090,
    61294, 61489, 61676, 61855, 62027, 62191, 62348, 62499,
    62644, 62783, 62916, 63043, 63165, 63282, 63395, 63503,
    63607, 63707, 63803, 63895, 63983, 64068, 64150, 64228,
    64304, 64377, 64447, 64514, 64579, 64642, 64702, 64760,
    64816, 64870, 64922, 64973, 65022, 65069, 65115, 65159,
    65202, 65243, 65283, 65322, 65360, 65397, 65433, 65468,
    65502, 65535,
];

pub const PITCH_LAG_NB_CDF_OFFSET: usize = 33;

pub const PITCH_LAG_MB_CDF: [u16; 194] = [
    0, 132, 288, 469, 677, 913, 1179, 1476,
    1805, 2167, 2562, 2990, 3451, 3945, 4471, 5028,
    5616, 6233, 6878, 7550, 8247, 8968, 9711, 10475,
    11258, 12058, 12874, 13704, 14546, 15399, 16261, 17130,
    18005, 18885, 19768, 20652, 21537, 22421, 23303, 24182,
    25056, 25925, 26788, 27644, 28493, 29333, 30164, 30986,
    31797, 32598, 33388, 34166, 34932, 35686, 36427, 37156,
    37872, 38575, 39264, 39940, 40603, 41253, 41889, 42512,
    43122, 43718, 44301, 44871, 45428, 45972, 46504, 47023,
    47530, 48024, 48506, 48976, 49435, 49882, 50318, 50743,
    51157, 51560, 51953, 52335, 52707, 53070, 53423, 53767,
    54101, 54426, 54743, 55051, 55351, 55642, 55925, 56201,
    56469, 56730, 56984, 57230, 57470, 57703, 57930, 58150,
    58364, 58572, 58774, 58971, 59162, 59348, 59529, 59705,
    59876, 60042, 60203, 60360, 60513, 60661, 60805, 60945,
    61081, 61214, 61343, 61469, 61591, 61710, 61826, 61938,
    62047, 62153, 62257, 62358, 62456, 62552, 62645, 62736,
    62824, 62910, 62994, 63075, 63154, 63231, 63306, 63379,
    63451, 63521, 63589, 63655, 63720, 63783, 63845, 63905,
    63964, 64021, 64077, 64132, 64185, 64237, 64288, 64338,
    64387, 64434, 64480, 64525, 64569, 64612, 64654, 64696,
    64737, 64777, 64816, 64854, 64891, 64928, 64964, 64999,
    65034, 65068, 65101, 65134, 65166, 65197, 65228, 65258,
    65288, 65317, 65346, 65374, 65402, 65429, 65456, 65483,
    65509, 65535,
];

pub const PITCH_LAG_MB_CDF_OFFSET: usize = 50;

pub const PITCH_LAG_WB_CDF: [u16; 258] = [
    0, 101, 215, 343, 485, 642, 815, 1004,
    1210, 1434, 1675, 1934, 2212, 2508, 2822, 3155,
    3506, 3875, 4262, 4667, 5089, 5528, 5983, 6454,
    6940, 7441, 7956, 8485, 9027, 9581, 10147, 10724,
    11311, 11907, 12512, 13125, 13746, 14373, 15006, 15645,
    16288, 16935, 17586, 18239, 18895, 19552, 20210, 20869,
    21528, 22186, 22843, 23499, 24153, 24804, 25452, 26097,
    26739, 27377, 28011, 28640, 29264, 29883, 30497, 31105,
    31708, 32305, 32895, 33479, 34056, 34627, 35191, 35748,
    36298, 36841, 37377, 37906, 38427, 38941, 39448, 39947,
    40439, 40924, 41401, 41871, 42333, 42788, 43235, 43675,
    44108, 44534, 44952, 45363, 45767, 46164, 46554, 46937,
    47313, 47682, 48045, 48401, 48751, 49094, 49431, 49761,
    50085, 50403, 50715, 51021, 51321, 51615, 51903, 52186,
    52463, 52735, 53001, 53262, 53518, 53769, 54015, 54256,
    54492, 54723, 54950, 55172, 55390, 55603, 55812, 56017,
    56217, 56413, 56605, 56793, 56977, 57158, 57335, 57508,
    57678, 57844, 58007, 58167, 58323, 58476, 58626, 58773,
    58917, 59058, 59196, 59331, 59463, 59593, 59720, 59844,
    59966, 60085, 60202, 60317, 60429, 60539, 60647, 60753,
    60857, 60958, 61057, 61154, 61249, 61343, 61435, 61525,
    61613, 61699, 61784, 61867, 61948, 62028, 62106, 62183,
    62258, 62332, 62404, 62475, 62545, 62613, 62680, 62746,
    62811, 62874, 62936, 62997, 63057, 63116, 63174, 63231,
    63287, 63342, 63396, 63449, 63501, 63552, 63602, 63651,
    63699, 63747, 63794, 63840, 63885, 63929, 63973, 64016,
    64058, 64100, 64141, 64181, 64221, 64260, 64298, 64336,
    64373, 64410, 64446, 64482, 64517, 64552, 64586, 64620,
    64653, 64686, 64718, 64750, 64781, 64812, 64842, 64872,
    64902, 64931, 64960, 64988, 65016, 65044, 65071, 65098,
    65125, 65151, 65177, 65203, 65228, 65253, 65278, 65303,
    65327, 65351, 65375, 65399, 65422, 65445, 65468, 65491,
    65513, 65535,
];

pub const PITCH_LAG_WB_CDF_OFFSET: usize = 66;

pub const PITCH_LAG_SWB_CDF: [u16; 386] = [
    0, 70, 145, 226, 313, 406, 506, 612,
    725, 845, 972, 1107, 1249, 1399, 1556, 1721,
    1894, 2075, 2264, 2461, 2666, 2879, 3100, 3329,
    3565, 3809, 4061, 4321, 4588, 4863, 5145, 5435,
    5732, 6036, 6347, 6664, 6988, 7318, 7654, 7997,
    8345, 8699, 9058, 9423, 9793, 10168, 10547, 10931,
    11319, 11711, 12107, 12507, 12910, 13317, 13727, 14139,
    14554, 14972, 15392, 15814, 16238, 16663, 17090, 17518,
    17948, 18378, 18809, 19241, 19673, 20106, 20539, 20972,
    21405, 21838, 22270, 22702, 23133, 23563, 23992, 24420,
    24847, 25273, 25697, 26120, 26541, 26960, 27378, 27794,
    28208, 28620, 29029, 29436, 29841, 30244, 30644, 31042,
    31437, 31829, 32219, 32606, 32990, 33371, 33750, 34126,
    34499, 34869, 35236, 35600, 35961, 36319, 36674, 37025,
    37373, 37718, 38060, 38399, 38735, 39067, 39396, 39722,
    40045, 40364, 40680, 40993, 41303, 41610, 41913, 42213,
    42510, 42804, 43095, 43382, 43666, 43947, 44225, 44500,
    44772, 45041, 45307, 45570, 45829, 46085, 46338, 46588,
    46836, 47081, 47323, 47562, 47798, 48031, 48261, 48488,
    48713, 48935, 49154, 49370, 49584, 49795, 50003, 50209,
    50412, 50613, 50811, 51007, 51200, 51391, 51579, 51765,
    51948, 52129, 52308, 52484, 52658, 52830, 53000, 53167,
    53332, 53495, 53656, 53815, 53972, 54127, 54280, 54431,
    54580, 54727, 54872, 55015, 55156, 55295, 55432, 55567,
    55701, 55833, 55963, 56091, 56218, 56343, 56466, 56588,
    56708, 56826, 56943, 57058, 57172, 57284, 57395, 57504,
    57612, 57718, 57823, 57927, 58029, 58130, 58230, 58328,
    58425, 58521, 58615, 58708, 58800, 58891, 58981, 59069,
    59156, 59242, 59327, 59411, 59494, 59576, 59657, 59737,
    59816, 59894, 59971, 60047, 60122, 60196, 60269, 60341,
    60412, 60482, 60551, 60619, 60686, 60753, 60819, 60884,
    60948, 61011, 61074, 61136, 61197, 61257, 61316, 61375,
    61433, 61490, 61547, 61603, 61658, 61713, 61767, 61820,
    61873, 61925, 61976, 62027, 62077, 62127, 62176, 62225,
    62273, 62320, 62367, 62413, 62459, 62504, 62549, 62593,
    62637, 62680, 62723, 62765, 62807, 62848, 62889, 62929,
    62969, 63009, 63048, 63087, 63125, 63163, 63201, 63238,
    63275, 63311, 63347, 63383, 63418, 63453, 63488, 63522,
    63556, 63590, 63623, 63656, 63689, 63721, 63753, 63785,
    63816, 63847, 63878, 63908, 63938, 63968, 63998, 64027,
    64056, 64085, 64114, 64142, 64170, 64198, 64226, 64253,
    64280, 64307, 64334, 64360, 64386, 64412, 64438, 64464,
    64489, 64514, 64539, 64564, 64589, 64613, 64637, 64661,
    64685, 64709, 64732, 64755, 64778, 64801, 64824, 64847,
    64869, 64891, 64913, 64935, 64957, 64979, 65001, 65022,
    65043, 65064, 65085, 65106, 65127, 65148, 65168, 65188,
    65208, 65228, 65248, 65268, 65288, 65308, 65328, 65347,
    65366, 65385, 65404, 65423, 65442, 65461, 65480, 65499,
    65517, 65535,
];

pub const PITCH_LAG_SWB_CDF_OFFSET: usize = 100;

/// Contour codebook index CDF, 8 kHz internal rate.
pub const PITCH_CONTOUR_NB_CDF: [u16; 12] = [
    0, 17093, 29628, 38882, 45773, 50963, 54928, 58011,
    60459, 62450, 64111, 65535,
];

pub const PITCH_CONTOUR_NB_CDF_OFFSET: usize = 3;

/// Contour codebook index CDF, 12 kHz and up.
pub const PITCH_CONTOUR_CDF: [u16; 35] = [
    0, 7729, 14486, 20397, 25572, 30107, 34085, 37578,
    40650, 43355, 45741, 47849, 49716, 51373, 52847, 54162,
    55338, 56394, 57345, 58205, 58986, 59698, 60350, 60950,
    61504, 62019, 62499, 62949, 63373, 63775, 64157, 64522,
    64872, 65209, 65535,
];

pub const PITCH_CONTOUR_CDF_OFFSET: usize = 6;

/// Lag delta relative to the previous frame, for conditional lag coding.
pub const PITCH_DELTA_CDF: [u16; 23] = [
    0, 231, 547, 988, 1611, 2503, 3789, 5655,
    8372, 12340, 18145, 26649, 39118, 47622, 53427, 57395,
    60112, 61978, 63264, 64156, 64779, 65219, 65535,
];

pub const PITCH_DELTA_CDF_OFFSET: usize = 11;
