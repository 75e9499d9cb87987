//! Shell coder for the pulse magnitudes. A block of 16 absolute pulse
//! values is summed pairwise into a binary tree, and each split of a
//! parent sum into its two children is entropy coded.

use crate::common::SHELL_CODEC_FRAME_LENGTH;
use crate::range_coder::RangeCoder;
use crate::tables_pulses_per_block::{
    MAX_PULSES_TABLE, SHELL_CODE_TABLE0, SHELL_CODE_TABLE1, SHELL_CODE_TABLE2,
    SHELL_CODE_TABLE3, SHELL_CODE_TABLE_OFFSETS,
};

fn combine_pulses(out: &mut [i32], input: &[i32]) {
    for (k, o) in out.iter_mut().enumerate() {
        *o = input[2 * k] + input[2 * k + 1];
    }
}

fn encode_split(rc: &mut RangeCoder, p_child1: i32, p: i32, shell_table: &[u16]) {
    if p > 0 {
        let off = SHELL_CODE_TABLE_OFFSETS[p as usize];
        rc.encode(p_child1 as usize, &shell_table[off..off + p as usize + 2]);
    }
}

fn decode_split(rc: &mut RangeCoder, p: i32, p_max: i32, shell_table: &[u16]) -> (i32, i32) {
    // a corrupt stream can hand us a parent beyond what the table codes
    let p = p.min(p_max);
    if p > 0 {
        let off = SHELL_CODE_TABLE_OFFSETS[p as usize];
        let p_child1 =
            rc.decode(&shell_table[off..off + p as usize + 2], (p >> 1) as usize) as i32;
        (p_child1, p - p_child1)
    } else {
        (0, 0)
    }
}

/// Encodes one shell code frame of 16 nonnegative pulse amplitudes.
pub fn shell_encoder(rc: &mut RangeCoder, pulses0: &[i32]) {
    debug_assert_eq!(pulses0.len(), SHELL_CODEC_FRAME_LENGTH);

    let mut pulses1 = [0i32; 8];
    let mut pulses2 = [0i32; 4];
    let mut pulses3 = [0i32; 2];
    let mut pulses4 = [0i32; 1];
    combine_pulses(&mut pulses1, pulses0);
    combine_pulses(&mut pulses2, &pulses1);
    combine_pulses(&mut pulses3, &pulses2);
    combine_pulses(&mut pulses4, &pulses3);

    encode_split(rc, pulses3[0], pulses4[0], &SHELL_CODE_TABLE3);

    encode_split(rc, pulses2[0], pulses3[0], &SHELL_CODE_TABLE2);

    encode_split(rc, pulses1[0], pulses2[0], &SHELL_CODE_TABLE1);
    encode_split(rc, pulses0[0], pulses1[0], &SHELL_CODE_TABLE0);
    encode_split(rc, pulses0[2], pulses1[1], &SHELL_CODE_TABLE0);

    encode_split(rc, pulses1[2], pulses2[1], &SHELL_CODE_TABLE1);
    encode_split(rc, pulses0[4], pulses1[2], &SHELL_CODE_TABLE0);
    encode_split(rc, pulses0[6], pulses1[3], &SHELL_CODE_TABLE0);

    encode_split(rc, pulses2[2], pulses3[1], &SHELL_CODE_TABLE2);

    encode_split(rc, pulses1[4], pulses2[2], &SHELL_CODE_TABLE1);
    encode_split(rc, pulses0[8], pulses1[4], &SHELL_CODE_TABLE0);
    encode_split(rc, pulses0[10], pulses1[5], &SHELL_CODE_TABLE0);

    encode_split(rc, pulses1[6], pulses2[3], &SHELL_CODE_TABLE1);
    encode_split(rc, pulses0[12], pulses1[6], &SHELL_CODE_TABLE0);
    encode_split(rc, pulses0[14], pulses1[7], &SHELL_CODE_TABLE0);
}

/// Decodes one shell code frame of 16 nonnegative pulse amplitudes from
/// their total `pulses4`.
pub fn shell_decoder(pulses0: &mut [i32], rc: &mut RangeCoder, pulses4: i32) {
    debug_assert_eq!(pulses0.len(), SHELL_CODEC_FRAME_LENGTH);

    let mut pulses1 = [0i32; 8];
    let mut pulses2 = [0i32; 4];
    let mut pulses3 = [0i32; 2];

    let max3 = MAX_PULSES_TABLE[3];
    let max2 = MAX_PULSES_TABLE[2];
    let max1 = MAX_PULSES_TABLE[1];
    let max0 = MAX_PULSES_TABLE[0];

    let (a, b) = decode_split(rc, pulses4, max3, &SHELL_CODE_TABLE3);
    pulses3[0] = a;
    pulses3[1] = b;

    let (a, b) = decode_split(rc, pulses3[0], max2, &SHELL_CODE_TABLE2);
    pulses2[0] = a;
    pulses2[1] = b;

    let (a, b) = decode_split(rc, pulses2[0], max1, &SHELL_CODE_TABLE1);
    pulses1[0] = a;
    pulses1[1] = b;
    let (a, b) = decode_split(rc, pulses1[0], max0, &SHELL_CODE_TABLE0);
    pulses0[0] = a;
    pulses0[1] = b;
    let (a, b) = decode_split(rc, pulses1[1], max0, &SHELL_CODE_TABLE0);
    pulses0[2] = a;
    pulses0[3] = b;

    let (a, b) = decode_split(rc, pulses2[1], max1, &SHELL_CODE_TABLE1);
    pulses1[2] = a;
    pulses1[3] = b;
    let (a, b) = decode_split(rc, pulses1[2], max0, &SHELL_CODE_TABLE0);
    pulses0[4] = a;
    pulses0[5] = b;
    let (a, b) = decode_split(rc, pulses1[3], max0, &SHELL_CODE_TABLE0);
    pulses0[6] = a;
    pulses0[7] = b;

    let (a, b) = decode_split(rc, pulses3[1], max2, &SHELL_CODE_TABLE2);
    pulses2[2] = a;
    pulses2[3] = b;

    let (a, b) = decode_split(rc, pulses2[2], max1, &SHELL_CODE_TABLE1);
    pulses1[4] = a;
    pulses1[5] = b;
    let (a, b) = decode_split(rc, pulses1[4], max0, &SHELL_CODE_TABLE0);
    pulses0[8] = a;
    pulses0[9] = b;
    let (a, b) = decode_split(rc, pulses1[5], max0, &SHELL_CODE_TABLE0);
    pulses0[10] = a;
    pulses0[11] = b;

    let (a, b) = decode_split(rc, pulses2[3], max1, &SHELL_CODE_TABLE1);
    pulses1[6] = a;
    pulses1[7] = b;
    let (a, b) = decode_split(rc, pulses1[6], max0, &SHELL_CODE_TABLE0);
    pulses0[12] = a;
    pulses0[13] = b;
    let (a, b) = decode_split(rc, pulses1[7], max0, &SHELL_CODE_TABLE0);
    pulses0[14] = a;
    pulses0[15] = b;
}

#[cfg(test)]
mod tests {
    use super::{shell_decoder, shell_encoder};
    use crate::common::SHELL_CODEC_FRAME_LENGTH;
    use crate::range_coder::RangeCoder;

    #[test]
    fn decoder_recovers_the_encoded_block() {
        let pulses: [i32; SHELL_CODEC_FRAME_LENGTH] =
            [0, 2, 1, 0, 0, 0, 3, 0, 1, 1, 0, 0, 0, 4, 0, 1];

        let mut rc = RangeCoder::default();
        rc.enc_init();
        shell_encoder(&mut rc, &pulses);
        assert!(rc.error().is_none());
        let (n_bytes, _) = rc.length();
        rc.wrap_up();
        let payload: alloc::vec::Vec<u8> = rc.payload(n_bytes).to_vec();

        let mut dec = RangeCoder::default();
        dec.dec_init(&payload);
        let mut out = [0i32; SHELL_CODEC_FRAME_LENGTH];
        let total: i32 = pulses.iter().sum();
        shell_decoder(&mut out, &mut dec, total);
        assert_eq!(out, pulses);
        assert!(dec.error().is_none());
    }

    #[test]
    fn corrupt_streams_stay_inside_the_split_tables() {
        // bytes that never came from the encoder can put the whole block
        // total on one child at every level
        let junk = [0xffu8; 12];
        let mut dec = RangeCoder::default();
        dec.dec_init(&junk);
        let mut out = [0i32; SHELL_CODEC_FRAME_LENGTH];
        shell_decoder(&mut out, &mut dec, 18);
        for &v in &out {
            assert!((0..=18).contains(&v));
        }
    }
}
