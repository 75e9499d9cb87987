//! Encoder and decoder status codes.
//!
//! The public API reports failures through [`SilkError`], a small enumeration
//! of negative integer codes. The discriminants are stable so callers that
//! bridge to other languages can classify errors numerically.

use core::fmt;

/// Error codes produced by the encoder and decoder.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SilkError {
    /// Input length is not a multiple of 10 ms, or exceeds the packet size.
    EncInputInvalidNoOfSamples = -1,

    /// API or internal sampling frequency not supported.
    EncFsNotSupported = -2,

    /// Packet size not 20, 40, 60, 80 or 100 ms.
    EncPacketSizeNotSupported = -3,

    /// Allocated payload buffer too short.
    EncPayloadBufTooShort = -4,

    /// Loss rate not between 0 and 100 percent.
    EncInvalidLossRate = -5,

    /// Complexity setting not valid; use 0, 1 or 2.
    EncInvalidComplexitySetting = -6,

    /// In-band FEC setting not valid; use 0 or 1.
    EncInvalidInbandFecSetting = -7,

    /// DTX setting not valid; use 0 or 1.
    EncInvalidDtxSetting = -8,

    /// Internal encoder error (degenerate range-coder interval).
    EncInternalError = -9,

    /// Output sampling frequency lower than the internal decoded frequency.
    DecInvalidSamplingFrequency = -10,

    /// Payload size exceeded the maximum allowed 1024 bytes.
    DecPayloadTooLarge = -11,

    /// Payload has bit errors.
    DecPayloadError = -12,
}

impl SilkError {
    /// Numeric code corresponding to this variant.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Converts a raw status code back into a [`SilkError`].
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::EncInputInvalidNoOfSamples),
            -2 => Some(Self::EncFsNotSupported),
            -3 => Some(Self::EncPacketSizeNotSupported),
            -4 => Some(Self::EncPayloadBufTooShort),
            -5 => Some(Self::EncInvalidLossRate),
            -6 => Some(Self::EncInvalidComplexitySetting),
            -7 => Some(Self::EncInvalidInbandFecSetting),
            -8 => Some(Self::EncInvalidDtxSetting),
            -9 => Some(Self::EncInternalError),
            -10 => Some(Self::DecInvalidSamplingFrequency),
            -11 => Some(Self::DecPayloadTooLarge),
            -12 => Some(Self::DecPayloadError),
            _ => None,
        }
    }
}

impl fmt::Display for SilkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::EncInputInvalidNoOfSamples => "invalid number of input samples",
            Self::EncFsNotSupported => "sampling rate not supported",
            Self::EncPacketSizeNotSupported => "packet size not supported",
            Self::EncPayloadBufTooShort => "payload buffer too short",
            Self::EncInvalidLossRate => "loss rate not between 0 and 100 percent",
            Self::EncInvalidComplexitySetting => "complexity setting not valid",
            Self::EncInvalidInbandFecSetting => "in-band FEC setting not valid",
            Self::EncInvalidDtxSetting => "DTX setting not valid",
            Self::EncInternalError => "internal encoder error",
            Self::DecInvalidSamplingFrequency => "invalid decode sampling frequency",
            Self::DecPayloadTooLarge => "payload too large",
            Self::DecPayloadError => "payload corrupt",
        };
        write!(f, "{} ({})", msg, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::SilkError;

    #[test]
    fn discriminants_are_stable() {
        assert_eq!(SilkError::EncInputInvalidNoOfSamples.code(), -1);
        assert_eq!(SilkError::EncInternalError.code(), -9);
        assert_eq!(SilkError::DecPayloadError.code(), -12);
    }

    #[test]
    fn round_trips_from_raw_codes() {
        for code in -12..=-1 {
            let err = SilkError::from_code(code).expect("every code maps");
            assert_eq!(err.code(), code);
        }
        assert_eq!(SilkError::from_code(0), None);
        assert_eq!(SilkError::from_code(-999), None);
    }
}
