//! Entropy decoding of the excitation pulses, the inverse of
//! [`crate::encode_pulses`].

use crate::code_signs::decode_signs;
use crate::common::{SignalType, MAX_NB_SHELL_BLOCKS, SHELL_CODEC_FRAME_LENGTH};
use crate::range_coder::RangeCoder;
use crate::shell_coder::shell_decoder;
use crate::tables_other::LSB_CDF;
use crate::tables_pulses_per_block::{
    MAX_PULSES, N_RATE_LEVELS, PULSES_PER_BLOCK_CDF, PULSES_PER_BLOCK_CDF_OFFSET,
    RATE_LEVELS_CDF, RATE_LEVELS_CDF_OFFSET,
};

/// Decodes one frame of excitation into `q` and returns the rate level
/// index, which the caller keeps for concealment statistics.
pub fn decode_pulses(
    rc: &mut RangeCoder,
    sigtype: SignalType,
    quant_offset_type: usize,
    q: &mut [i32],
) -> usize {
    let frame_length = q.len();
    debug_assert!(frame_length % SHELL_CODEC_FRAME_LENGTH == 0);
    let iter = frame_length / SHELL_CODEC_FRAME_LENGTH;

    let rate_level_index = rc.decode(&RATE_LEVELS_CDF[sigtype.code()], RATE_LEVELS_CDF_OFFSET);

    // pulse count per block, with an escape symbol for downshifted blocks
    let mut sum_pulses = [0usize; MAX_NB_SHELL_BLOCKS];
    let mut n_lshifts = [0i32; MAX_NB_SHELL_BLOCKS];
    let cdf = &PULSES_PER_BLOCK_CDF[rate_level_index];
    for i in 0..iter {
        sum_pulses[i] = rc.decode(cdf, PULSES_PER_BLOCK_CDF_OFFSET);
        while sum_pulses[i] == MAX_PULSES + 1 {
            n_lshifts[i] += 1;
            sum_pulses[i] = rc.decode(
                &PULSES_PER_BLOCK_CDF[N_RATE_LEVELS - 1],
                PULSES_PER_BLOCK_CDF_OFFSET,
            );
        }
    }

    for i in 0..iter {
        let block = &mut q[i * SHELL_CODEC_FRAME_LENGTH..(i + 1) * SHELL_CODEC_FRAME_LENGTH];
        if sum_pulses[i] > 0 {
            shell_decoder(block, rc, sum_pulses[i] as i32);
        } else {
            block.fill(0);
        }
    }

    for i in 0..iter {
        if n_lshifts[i] > 0 {
            let block = &mut q[i * SHELL_CODEC_FRAME_LENGTH..(i + 1) * SHELL_CODEC_FRAME_LENGTH];
            for v in block.iter_mut() {
                let mut abs_q = *v;
                for _ in 0..n_lshifts[i] {
                    abs_q <<= 1;
                    abs_q += rc.decode(&LSB_CDF, 1) as i32;
                }
                *v = abs_q;
            }
        }
    }

    decode_signs(rc, q, sigtype, quant_offset_type, rate_level_index);

    rate_level_index
}

#[cfg(test)]
mod tests {
    use super::decode_pulses;
    use crate::common::SignalType;
    use crate::encode_pulses::encode_pulses;
    use crate::range_coder::RangeCoder;

    #[test]
    fn dense_voiced_frame_round_trips() {
        let q: alloc::vec::Vec<i8> = (0..160)
            .map(|i| match i % 7 {
                0 => 2,
                3 => -3,
                5 => 1,
                _ => 0,
            })
            .collect();

        let mut enc = RangeCoder::default();
        enc.enc_init();
        encode_pulses(&mut enc, SignalType::Voiced, 1, &q);
        let (n_bytes, _) = enc.length();
        enc.wrap_up();
        let payload: alloc::vec::Vec<u8> = enc.payload(n_bytes).to_vec();

        let mut dec = RangeCoder::default();
        dec.dec_init(&payload);
        let mut out = alloc::vec![0i32; q.len()];
        decode_pulses(&mut dec, SignalType::Voiced, 1, &mut out);
        assert!(dec.error().is_none());
        for (o, &v) in out.iter().zip(&q) {
            assert_eq!(*o, i32::from(v));
        }
    }
}
