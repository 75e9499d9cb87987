//! Entropy coding of the excitation pulses. The frame is cut into shell
//! blocks of 16 samples; each block codes its total pulse count, the
//! shell tree of magnitudes, any least significant bits split off to fit
//! the shell tables, and finally the signs.

use crate::code_signs::encode_signs;
use crate::common::{SignalType, MAX_FRAME_LENGTH, MAX_NB_SHELL_BLOCKS, SHELL_CODEC_FRAME_LENGTH};
use crate::range_coder::RangeCoder;
use crate::shell_coder::shell_encoder;
use crate::tables_other::LSB_CDF;
use crate::tables_pulses_per_block::{
    MAX_PULSES, MAX_PULSES_TABLE, N_RATE_LEVELS, PULSES_PER_BLOCK_BITS_Q6, PULSES_PER_BLOCK_CDF,
    RATE_LEVELS_BITS_Q6, RATE_LEVELS_CDF,
};

pub fn encode_pulses(
    rc: &mut RangeCoder,
    sigtype: SignalType,
    quant_offset_type: usize,
    q: &[i8],
) {
    let frame_length = q.len();
    debug_assert!(frame_length % SHELL_CODEC_FRAME_LENGTH == 0);
    let iter = frame_length / SHELL_CODEC_FRAME_LENGTH;

    let mut abs_pulses = [0i32; MAX_FRAME_LENGTH];
    for (a, &v) in abs_pulses.iter_mut().zip(q) {
        *a = i32::from(v).abs();
    }

    // halve each block until every node of its shell tree fits the tables
    let mut sum_pulses = [0i32; MAX_NB_SHELL_BLOCKS];
    let mut n_rshifts = [0i32; MAX_NB_SHELL_BLOCKS];
    for i in 0..iter {
        let block = &mut abs_pulses[i * SHELL_CODEC_FRAME_LENGTH..(i + 1) * SHELL_CODEC_FRAME_LENGTH];
        loop {
            let mut scale_down = false;
            let mut comb = [0i32; 8];
            for k in 0..8 {
                let sum = block[2 * k] + block[2 * k + 1];
                scale_down |= sum > MAX_PULSES_TABLE[0];
                comb[k] = sum;
            }
            for k in 0..4 {
                let sum = comb[2 * k] + comb[2 * k + 1];
                scale_down |= sum > MAX_PULSES_TABLE[1];
                comb[k] = sum;
            }
            for k in 0..2 {
                let sum = comb[2 * k] + comb[2 * k + 1];
                scale_down |= sum > MAX_PULSES_TABLE[2];
                comb[k] = sum;
            }
            sum_pulses[i] = comb[0] + comb[1];
            scale_down |= sum_pulses[i] > MAX_PULSES_TABLE[3];

            if !scale_down {
                break;
            }
            n_rshifts[i] += 1;
            for v in block.iter_mut() {
                *v >>= 1;
            }
        }
    }

    // rate level minimizing the bits spent on the pulse count symbols
    let mut rate_level_index = 0;
    let mut min_sum_bits_q6 = i32::MAX;
    for k in 0..N_RATE_LEVELS - 1 {
        let n_bits = &PULSES_PER_BLOCK_BITS_Q6[k];
        let mut sum_bits_q6 = i32::from(RATE_LEVELS_BITS_Q6[sigtype.code()][k]);
        for i in 0..iter {
            if n_rshifts[i] > 0 {
                sum_bits_q6 += i32::from(n_bits[MAX_PULSES + 1]);
            } else {
                sum_bits_q6 += i32::from(n_bits[sum_pulses[i] as usize]);
            }
        }
        if sum_bits_q6 < min_sum_bits_q6 {
            min_sum_bits_q6 = sum_bits_q6;
            rate_level_index = k;
        }
    }
    rc.encode(rate_level_index, &RATE_LEVELS_CDF[sigtype.code()]);

    // pulse counts; the overflow symbol escapes to the flattest table
    let cdf = &PULSES_PER_BLOCK_CDF[rate_level_index];
    for i in 0..iter {
        if n_rshifts[i] == 0 {
            rc.encode(sum_pulses[i] as usize, cdf);
        } else {
            rc.encode(MAX_PULSES + 1, cdf);
            for _ in 0..n_rshifts[i] - 1 {
                rc.encode(MAX_PULSES + 1, &PULSES_PER_BLOCK_CDF[N_RATE_LEVELS - 1]);
            }
            rc.encode(
                sum_pulses[i] as usize,
                &PULSES_PER_BLOCK_CDF[N_RATE_LEVELS - 1],
            );
        }
    }

    for i in 0..iter {
        if sum_pulses[i] > 0 {
            shell_encoder(
                rc,
                &abs_pulses[i * SHELL_CODEC_FRAME_LENGTH..(i + 1) * SHELL_CODEC_FRAME_LENGTH],
            );
        }
    }

    // bits shifted out before shell coding, most significant first
    for i in 0..iter {
        if n_rshifts[i] > 0 {
            let pulses = &q[i * SHELL_CODEC_FRAME_LENGTH..(i + 1) * SHELL_CODEC_FRAME_LENGTH];
            let n_ls = n_rshifts[i] - 1;
            for &v in pulses {
                let abs_q = i32::from(v).abs();
                for j in (1..=n_ls).rev() {
                    rc.encode(((abs_q >> j) & 1) as usize, &LSB_CDF);
                }
                rc.encode((abs_q & 1) as usize, &LSB_CDF);
            }
        }
    }

    encode_signs(rc, q, sigtype, quant_offset_type, rate_level_index);
}

#[cfg(test)]
mod tests {
    use super::encode_pulses;
    use crate::common::SignalType;
    use crate::decode_pulses::decode_pulses;
    use crate::range_coder::RangeCoder;

    fn round_trip(q: &[i8]) -> alloc::vec::Vec<i32> {
        let mut enc = RangeCoder::default();
        enc.enc_init();
        encode_pulses(&mut enc, SignalType::Unvoiced, 0, q);
        assert!(enc.error().is_none());
        let (n_bytes, _) = enc.length();
        enc.wrap_up();
        let payload: alloc::vec::Vec<u8> = enc.payload(n_bytes).to_vec();

        let mut dec = RangeCoder::default();
        dec.dec_init(&payload);
        let mut out = alloc::vec![0i32; q.len()];
        decode_pulses(&mut dec, SignalType::Unvoiced, 0, &mut out);
        assert!(dec.error().is_none());
        out
    }

    #[test]
    fn sparse_pulses_round_trip() {
        let mut q = [0i8; 320];
        q[3] = 2;
        q[17] = -1;
        q[100] = 4;
        q[101] = -4;
        q[319] = 1;
        let out = round_trip(&q);
        for (o, &v) in out.iter().zip(&q) {
            assert_eq!(*o, i32::from(v));
        }
    }

    #[test]
    fn large_pulses_use_the_lsb_escape() {
        // per-sample magnitudes beyond the shell tables force downshifting
        let mut q = [0i8; 80];
        q[0] = 25;
        q[1] = -19;
        q[40] = 7;
        let out = round_trip(&q);
        for (o, &v) in out.iter().zip(&q) {
            assert_eq!(*o, i32::from(v));
        }
    }
}
