//! Arithmetic range coder over 16-bit cumulative distribution tables.
//!
//! The coder keeps a `(base, range)` interval pair and a byte buffer. Symbols
//! are narrowed into the interval according to a CDF whose entries are Q16
//! cumulative probabilities starting at 0 and ending at 65535. Errors are
//! sticky: once the state records one, further calls become no-ops and the
//! frame-level caller maps the condition to an encoder/decoder status code.

/// Maximum number of payload bytes (a packet may contain multiple frames).
pub const MAX_ARITHM_BYTES: usize = 1024;

/// Internal failure conditions of the coder arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCoderError {
    WriteBeyondBuffer,
    ReadBeyondBuffer,
    CdfOutOfRange,
    NormalizationFailed,
    ZeroIntervalWidth,
    DecoderCheckFailed,
    PayloadTooLong,
}

/// Range encoder/decoder state. Two independent instances exist per frame
/// on the encoder side (main and LBRR); they never share buffers.
#[derive(Clone)]
pub struct RangeCoder {
    buffer: [u8; MAX_ARITHM_BYTES],
    buffer_length: usize,
    buffer_ix: usize,
    base_q32: u32,
    range_q16: u32,
    error: Option<RangeCoderError>,
}

impl Default for RangeCoder {
    fn default() -> Self {
        Self {
            buffer: [0; MAX_ARITHM_BYTES],
            buffer_length: MAX_ARITHM_BYTES,
            buffer_ix: 0,
            base_q32: 0,
            range_q16: 0xffff,
            error: None,
        }
    }
}

impl RangeCoder {
    /// Resets the state for encoding a fresh payload.
    pub fn enc_init(&mut self) {
        self.buffer_length = MAX_ARITHM_BYTES;
        self.range_q16 = 0xffff;
        self.buffer_ix = 0;
        self.base_q32 = 0;
        self.error = None;
    }

    /// Initializes the state for decoding `payload`. The first four bytes
    /// seed the base register; the read cursor starts after them.
    pub fn dec_init(&mut self, payload: &[u8]) {
        if payload.len() > MAX_ARITHM_BYTES {
            self.error = Some(RangeCoderError::PayloadTooLong);
            return;
        }
        self.buffer[..payload.len()].copy_from_slice(payload);
        self.buffer_length = payload.len();
        self.buffer_ix = 0;
        let mut base = 0u32;
        for k in 0..4 {
            base = (base << 8) | u32::from(*payload.get(k).unwrap_or(&0));
        }
        self.base_q32 = base;
        self.range_q16 = 0xffff;
        self.error = None;
    }

    /// Sticky error recorded by any previous operation.
    pub fn error(&self) -> Option<RangeCoderError> {
        self.error
    }

    /// Length of the payload being decoded.
    pub fn buffer_length(&self) -> usize {
        self.buffer_length
    }

    /// Records that decoding consumed more bytes than the payload holds.
    pub fn mark_overread(&mut self) {
        if self.error.is_none() {
            self.error = Some(RangeCoderError::ReadBeyondBuffer);
        }
    }

    /// Encodes one symbol under `cdf`; `data` indexes the CDF interval
    /// `[cdf[data], cdf[data + 1])`.
    pub fn encode(&mut self, data: usize, cdf: &[u16]) {
        if self.error.is_some() {
            return;
        }
        debug_assert!(data + 1 < cdf.len());

        let low_q16 = u32::from(cdf[data]);
        let high_q16 = u32::from(cdf[data + 1]);
        let base_tmp = self.base_q32;
        self.base_q32 = self.base_q32.wrapping_add(self.range_q16 * low_q16);
        let range_q32 = self.range_q16 * (high_q16 - low_q16);

        // Carry from the base update ripples back through finished bytes.
        if self.base_q32 < base_tmp {
            let mut ix = self.buffer_ix;
            loop {
                ix -= 1;
                self.buffer[ix] = self.buffer[ix].wrapping_add(1);
                if self.buffer[ix] != 0 {
                    break;
                }
            }
        }

        if range_q32 & 0xff00_0000 != 0 {
            self.range_q16 = range_q32 >> 16;
        } else {
            if range_q32 & 0xffff_0000 != 0 {
                self.range_q16 = range_q32 >> 8;
            } else {
                self.range_q16 = range_q32;
                if !self.push_byte() {
                    return;
                }
            }
            let _ = self.push_byte();
        }
    }

    fn push_byte(&mut self) -> bool {
        if self.buffer_ix >= self.buffer_length {
            self.error = Some(RangeCoderError::WriteBeyondBuffer);
            return false;
        }
        self.buffer[self.buffer_ix] = (self.base_q32 >> 24) as u8;
        self.buffer_ix += 1;
        self.base_q32 = self.base_q32.wrapping_shl(8);
        true
    }

    /// Decodes one symbol under `cdf`, starting the search from the
    /// caller-provided middle entry `cdf_middle`.
    pub fn decode(&mut self, cdf: &[u16], cdf_middle: usize) -> usize {
        if self.error.is_some() {
            return 0;
        }

        let mut ix = cdf_middle;
        let mut high_q16 = u32::from(cdf[ix]);
        let mut low_q16;
        let mut base_tmp = self.range_q16 * high_q16;
        if base_tmp > self.base_q32 {
            loop {
                ix -= 1;
                low_q16 = u32::from(cdf[ix]);
                base_tmp = self.range_q16 * low_q16;
                if base_tmp <= self.base_q32 {
                    break;
                }
                high_q16 = low_q16;
                if high_q16 == 0 {
                    self.error = Some(RangeCoderError::CdfOutOfRange);
                    return 0;
                }
            }
        } else {
            loop {
                low_q16 = high_q16;
                ix += 1;
                high_q16 = u32::from(cdf[ix]);
                base_tmp = self.range_q16 * high_q16;
                if base_tmp > self.base_q32 {
                    ix -= 1;
                    break;
                }
                if high_q16 == 0xffff {
                    self.error = Some(RangeCoderError::CdfOutOfRange);
                    return 0;
                }
            }
        }

        self.base_q32 = self.base_q32.wrapping_sub(self.range_q16 * low_q16);
        let range_q32 = self.range_q16 * (high_q16 - low_q16);

        if range_q32 & 0xff00_0000 != 0 {
            self.range_q16 = range_q32 >> 16;
        } else {
            if range_q32 & 0xffff_0000 != 0 {
                self.range_q16 = range_q32 >> 8;
                if self.base_q32 >> 24 != 0 {
                    self.error = Some(RangeCoderError::NormalizationFailed);
                    return 0;
                }
            } else {
                self.range_q16 = range_q32;
                if self.base_q32 >> 16 != 0 {
                    self.error = Some(RangeCoderError::NormalizationFailed);
                    return 0;
                }
                self.pull_byte();
            }
            self.pull_byte();
        }

        if self.range_q16 == 0 {
            self.error = Some(RangeCoderError::ZeroIntervalWidth);
            return 0;
        }

        ix
    }

    fn pull_byte(&mut self) {
        self.base_q32 = self.base_q32.wrapping_shl(8);
        // Read cursor is offset by the four bytes preloaded into the base.
        if self.buffer_ix < self.buffer_length {
            let byte_ix = self.buffer_ix + 4;
            if byte_ix < self.buffer_length {
                self.base_q32 |= u32::from(self.buffer[byte_ix]);
            }
            self.buffer_ix += 1;
        }
    }

    /// Number of whole bytes needed for the stream so far; also returns the
    /// exact bit count.
    pub fn length(&self) -> (usize, i32) {
        let n_bits =
            ((self.buffer_ix as i32) << 3) + crate::math::clz32(self.range_q16 as i32 - 1) - 14;
        let n_bytes = ((n_bits + 7) >> 3) as usize;
        (n_bytes, n_bits)
    }

    /// Flushes the shortest uniquely decodable byte string into the buffer.
    pub fn wrap_up(&mut self) {
        let mut base_q24 = self.base_q32 >> 8;

        let (n_bytes, bits_in_stream) = self.length();

        // 1..=9 further bits must be stored to pin down the interval.
        let bits_to_store = bits_in_stream - ((self.buffer_ix as i32) << 3);
        base_q24 = base_q24.wrapping_add(0x0080_0000u32 >> (bits_to_store - 1));
        base_q24 &= 0xffff_ffffu32.wrapping_shl((24 - bits_to_store) as u32);

        if base_q24 & 0x0100_0000 != 0 {
            let mut ix = self.buffer_ix;
            loop {
                ix -= 1;
                self.buffer[ix] = self.buffer[ix].wrapping_add(1);
                if self.buffer[ix] != 0 {
                    break;
                }
            }
        }

        if self.buffer_ix < self.buffer_length {
            self.buffer[self.buffer_ix] = (base_q24 >> 16) as u8;
            self.buffer_ix += 1;
            if bits_to_store > 8 && self.buffer_ix < self.buffer_length {
                self.buffer[self.buffer_ix] = (base_q24 >> 8) as u8;
                self.buffer_ix += 1;
            }
        }

        // Remaining bits in the last byte are set to one.
        if bits_in_stream & 7 != 0 {
            let mask = 0xffu8 >> (bits_in_stream & 7);
            if n_bytes >= 1 && n_bytes - 1 < self.buffer_length {
                self.buffer[n_bytes - 1] |= mask;
            }
        }
    }

    /// Verifies the filler bits after decoding a complete frame sequence.
    pub fn check_after_decoding(&mut self) {
        let (n_bytes, bits_in_stream) = self.length();

        if n_bytes == 0 || n_bytes - 1 >= self.buffer_length {
            self.error = Some(RangeCoderError::DecoderCheckFailed);
            return;
        }

        if bits_in_stream & 7 != 0 {
            let mask = 0xffu8 >> (bits_in_stream & 7);
            if self.buffer[n_bytes - 1] & mask != mask {
                self.error = Some(RangeCoderError::DecoderCheckFailed);
            }
        }
    }

    /// Finished payload bytes (valid after [`Self::wrap_up`]).
    pub fn payload(&self, n_bytes: usize) -> &[u8] {
        &self.buffer[..n_bytes]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CDF: &[u16] = &[0, 10000, 30000, 45000, 65535];

    #[test]
    fn round_trips_a_symbol_sequence() {
        let symbols = [0usize, 3, 2, 2, 1, 0, 3, 1, 1, 2, 0, 0, 3, 2, 1];

        let mut enc = RangeCoder::default();
        enc.enc_init();
        for &s in &symbols {
            enc.encode(s, TEST_CDF);
        }
        assert_eq!(enc.error(), None);
        let (n_bytes, _) = enc.length();
        enc.wrap_up();
        let payload: alloc::vec::Vec<u8> = enc.payload(n_bytes).to_vec();

        let mut dec = RangeCoder::default();
        dec.dec_init(&payload);
        for &s in &symbols {
            assert_eq!(dec.decode(TEST_CDF, 2), s);
        }
        dec.check_after_decoding();
        assert_eq!(dec.error(), None);
    }

    #[test]
    fn skewed_cdf_round_trips() {
        let cdf: &[u16] = &[0, 64000, 64500, 65000, 65535];
        let symbols = [0usize, 0, 0, 1, 0, 3, 0, 0, 2, 0, 0, 0, 1];

        let mut enc = RangeCoder::default();
        enc.enc_init();
        for &s in &symbols {
            enc.encode(s, cdf);
        }
        let (n_bytes, _) = enc.length();
        enc.wrap_up();
        let payload: alloc::vec::Vec<u8> = enc.payload(n_bytes).to_vec();

        let mut dec = RangeCoder::default();
        dec.dec_init(&payload);
        for &s in &symbols {
            assert_eq!(dec.decode(cdf, 1), s);
        }
        assert_eq!(dec.error(), None);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let big = [0u8; MAX_ARITHM_BYTES + 1];
        let mut dec = RangeCoder::default();
        dec.dec_init(&big);
        assert_eq!(dec.error(), Some(RangeCoderError::PayloadTooLong));
    }
}
