//! Frame geometry constants and parameter types shared between the
//! encoder and decoder.

/// Highest internal sampling rate (kHz).
pub const MAX_FS_KHZ: usize = 24;
/// Frame duration (ms).
pub const FRAME_LENGTH_MS: usize = 20;
/// Samples per frame at the highest internal rate.
pub const MAX_FRAME_LENGTH: usize = FRAME_LENGTH_MS * MAX_FS_KHZ;
/// Subframes per frame.
pub const NB_SUBFR: usize = 4;

/// Pitch analysis lookahead (ms) and its sample cap.
pub const LA_PITCH_MS: usize = 2;
pub const LA_PITCH_MAX: usize = LA_PITCH_MS * MAX_FS_KHZ;
/// Noise shape analysis lookahead (ms) and its sample cap.
pub const LA_SHAPE_MS: usize = 5;
pub const LA_SHAPE_MAX: usize = LA_SHAPE_MS * MAX_FS_KHZ;

/// LPC window for the pitch whitener (ms, samples).
pub const FIND_PITCH_LPC_WIN_MS: usize = 20 + (LA_PITCH_MS << 1);
pub const FIND_PITCH_LPC_WIN_MAX: usize = FIND_PITCH_LPC_WIN_MS * MAX_FS_KHZ;
/// Longest noise shaping analysis window (samples).
pub const SHAPE_LPC_WIN_MAX: usize = 15 * MAX_FS_KHZ;
/// Highest noise shaping filter order.
pub const MAX_SHAPE_LPC_ORDER: usize = 16;
/// Prediction filter orders: 16 above 8 kHz, 10 at 8 kHz.
pub const MIN_LPC_ORDER: usize = 10;

/// Circular buffer of past quantized excitation for the LTP taps.
pub const LTP_BUF_LENGTH: usize = 512;
pub const LTP_MASK: usize = LTP_BUF_LENGTH - 1;

/// Hard cap on one encoded payload.
pub const MAX_ARITHM_BYTES: usize = 1024;
/// Depth of the in-band redundancy ring.
pub const MAX_LBRR_DELAY: usize = 2;

/// Samples covered by one shell coder block.
pub const SHELL_CODEC_FRAME_LENGTH: usize = 16;
pub const MAX_NB_SHELL_BLOCKS: usize = MAX_FRAME_LENGTH / SHELL_CODEC_FRAME_LENGTH;

/// Delayed decision quantizer limits.
pub const MAX_DEL_DEC_STATES: usize = 4;
pub const DECISION_DELAY: usize = 32;
pub const DECISION_DELAY_MASK: usize = DECISION_DELAY - 1;
pub const NSQ_LPC_BUF_LENGTH: usize = DECISION_DELAY;

/// Filterbank bands in the voice activity detector.
pub const VAD_N_BANDS: usize = 4;

/// Highest API sampling rate (kHz).
pub const MAX_API_FS_KHZ: usize = 48;
/// Most internal frames one packet can carry.
pub const MAX_FRAMES_PER_PACKET: usize = 5;

/// Packet layout symbol closing every frame: tells the decoder whether
/// more frames follow and whether redundancy is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTermination {
    LastFrame,
    MoreFrames,
    LbrrVer1,
    LbrrVer2,
}

impl FrameTermination {
    pub fn code(self) -> usize {
        match self {
            FrameTermination::LastFrame => 0,
            FrameTermination::MoreFrames => 1,
            FrameTermination::LbrrVer1 => 2,
            FrameTermination::LbrrVer2 => 3,
        }
    }

    pub fn from_code(code: usize) -> FrameTermination {
        match code {
            1 => FrameTermination::MoreFrames,
            2 => FrameTermination::LbrrVer1,
            3 => FrameTermination::LbrrVer2,
            _ => FrameTermination::LastFrame,
        }
    }
}

/// Frame classification carried in the bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    Voiced,
    Unvoiced,
}

impl SignalType {
    /// Bitstream code, also the codebook selector.
    pub fn code(self) -> usize {
        match self {
            SignalType::Voiced => 0,
            SignalType::Unvoiced => 1,
        }
    }

    pub fn from_code(code: usize) -> SignalType {
        if code == 0 {
            SignalType::Voiced
        } else {
            SignalType::Unvoiced
        }
    }
}
