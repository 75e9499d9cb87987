//! Entropy coding of the pulse signs. Each nonzero pulse carries one
//! binary symbol whose probability depends on the signal type, the
//! quantizer offset and the rate level.

use crate::common::SignalType;
use crate::range_coder::RangeCoder;
use crate::tables_pulses_per_block::N_RATE_LEVELS;
use crate::tables_sign::SIGN_CDF;

fn sign_cdf(
    sigtype: SignalType,
    quant_offset_type: usize,
    rate_level_index: usize,
) -> [u16; 3] {
    let ix = (N_RATE_LEVELS - 1) * (2 * sigtype.code() + quant_offset_type) + rate_level_index;
    [0, SIGN_CDF[ix], 65535]
}

/// Encodes the signs of all nonzero entries of `q`.
pub fn encode_signs(
    rc: &mut RangeCoder,
    q: &[i8],
    sigtype: SignalType,
    quant_offset_type: usize,
    rate_level_index: usize,
) {
    let cdf = sign_cdf(sigtype, quant_offset_type, rate_level_index);
    for &v in q {
        if v != 0 {
            // negative maps to 0, positive to 1
            let data = ((i32::from(v) >> 15) + 1) as usize;
            rc.encode(data, &cdf);
        }
    }
}

/// Decodes a sign for every positive entry of `q` and applies it.
pub fn decode_signs(
    rc: &mut RangeCoder,
    q: &mut [i32],
    sigtype: SignalType,
    quant_offset_type: usize,
    rate_level_index: usize,
) {
    let cdf = sign_cdf(sigtype, quant_offset_type, rate_level_index);
    for v in q.iter_mut() {
        if *v > 0 {
            let data = rc.decode(&cdf, 1) as i32;
            *v *= (data << 1) - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_signs, encode_signs};
    use crate::common::SignalType;
    use crate::range_coder::RangeCoder;

    #[test]
    fn signs_survive_a_round_trip() {
        let q: [i8; 16] = [0, 3, -1, 0, 2, -2, 0, 0, 1, -4, 5, 0, -1, 1, 0, -3];

        let mut enc = RangeCoder::default();
        enc.enc_init();
        encode_signs(&mut enc, &q, SignalType::Unvoiced, 1, 3);
        let (n_bytes, _) = enc.length();
        enc.wrap_up();
        let payload: alloc::vec::Vec<u8> = enc.payload(n_bytes).to_vec();

        let mut dec = RangeCoder::default();
        dec.dec_init(&payload);
        let mut magnitudes: alloc::vec::Vec<i32> =
            q.iter().map(|&v| i32::from(v).abs()).collect();
        decode_signs(&mut dec, &mut magnitudes, SignalType::Unvoiced, 1, 3);

        let expected: alloc::vec::Vec<i32> = q.iter().map(|&v| i32::from(v)).collect();
        assert_eq!(magnitudes, expected);
        assert!(dec.error().is_none());
    }
}
