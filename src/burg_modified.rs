//! Burg AR analysis over stacked subframes. Computes prediction
//! coefficients directly, together with the residual energy the search
//! layers compare between candidate predictors.

use crate::math::{clz32, div32_var_q, rshift_round, smlawb, smlaww, smmul, smulbb};
use crate::schur::MAX_ORDER_LPC;
use crate::vector_ops::{inner_prod, inner_prod16_64, sum_sqr_shift};

/// subfr_length * nb_subfr = (0.005 * 24000 + 16) * 4
const MAX_FRAME_SIZE: usize = 544;
const MAX_NB_SUBFR: usize = 4;

const QA: i32 = 25;
const N_BITS_HEAD_ROOM: i32 = 2;
const MIN_RSHIFTS: i32 = -16;
const MAX_RSHIFTS: i32 = 32 - QA;

/// Runs the modified Burg recursion on `nb_subfr` stacked subframes of
/// `subfr_length` samples each (`order` preceding samples included).
/// Returns (residual energy, its Q value); `a_q16` receives the `order`
/// prediction coefficients.
pub fn burg_modified(
    a_q16: &mut [i32],
    x: &[i16],
    subfr_length: usize,
    nb_subfr: usize,
    white_noise_frac_q32: i32,
    order: usize,
) -> (i32, i32) {
    debug_assert!(subfr_length * nb_subfr <= MAX_FRAME_SIZE);
    debug_assert!(nb_subfr <= MAX_NB_SUBFR && order <= MAX_ORDER_LPC);
    debug_assert!(x.len() >= nb_subfr * subfr_length && a_q16.len() >= order);

    let (mut c0, mut rshifts) = sum_sqr_shift(&x[..nb_subfr * subfr_length]);
    if rshifts > MAX_RSHIFTS {
        c0 <<= rshifts - MAX_RSHIFTS;
        debug_assert!(c0 > 0);
        rshifts = MAX_RSHIFTS;
    } else {
        let lz = clz32(c0) - 1;
        let mut rshifts_extra = N_BITS_HEAD_ROOM - lz;
        if rshifts_extra > 0 {
            rshifts_extra = rshifts_extra.min(MAX_RSHIFTS - rshifts);
            c0 >>= rshifts_extra;
        } else {
            rshifts_extra = rshifts_extra.max(MIN_RSHIFTS - rshifts);
            c0 <<= -rshifts_extra;
        }
        rshifts += rshifts_extra;
    }

    let mut c_first_row = [0i32; MAX_ORDER_LPC];
    for s in 0..nb_subfr {
        let x_ptr = &x[s * subfr_length..(s + 1) * subfr_length];
        for n in 1..=order {
            c_first_row[n - 1] += if rshifts > 0 {
                (inner_prod16_64(&x_ptr[..subfr_length - n], &x_ptr[n..]) >> rshifts) as i32
            } else {
                inner_prod(&x_ptr[..subfr_length - n], &x_ptr[n..]) << -rshifts
            };
        }
    }
    let mut c_last_row = c_first_row;

    let mut af_qa = [0i32; MAX_ORDER_LPC];
    let mut caf = [0i32; MAX_ORDER_LPC + 1];
    let mut cab = [0i32; MAX_ORDER_LPC + 1];
    caf[0] = c0 + smmul(white_noise_frac_q32, c0) + 1;
    cab[0] = caf[0];

    for n in 0..order {
        // update correlation rows and the C*Af / C*Ab products with the
        // samples entering at each end
        for s in 0..nb_subfr {
            let x_ptr = &x[s * subfr_length..(s + 1) * subfr_length];
            if rshifts > -2 {
                let x1 = -(i32::from(x_ptr[n]) << (16 - rshifts));
                let x2 = -(i32::from(x_ptr[subfr_length - n - 1]) << (16 - rshifts));
                let mut tmp1 = i32::from(x_ptr[n]) << (QA - 16);
                let mut tmp2 = i32::from(x_ptr[subfr_length - n - 1]) << (QA - 16);
                for k in 0..n {
                    c_first_row[k] = smlawb(c_first_row[k], x1, i32::from(x_ptr[n - k - 1]));
                    c_last_row[k] =
                        smlawb(c_last_row[k], x2, i32::from(x_ptr[subfr_length - n + k]));
                    let atmp_qa = af_qa[k];
                    tmp1 = smlawb(tmp1, atmp_qa, i32::from(x_ptr[n - k - 1]));
                    tmp2 = smlawb(tmp2, atmp_qa, i32::from(x_ptr[subfr_length - n + k]));
                }
                let tmp1 = (-tmp1) << (32 - QA - rshifts);
                let tmp2 = (-tmp2) << (32 - QA - rshifts);
                for k in 0..=n {
                    caf[k] = smlawb(caf[k], tmp1, i32::from(x_ptr[n - k]));
                    cab[k] = smlawb(cab[k], tmp2, i32::from(x_ptr[subfr_length - n + k - 1]));
                }
            } else {
                let x1 = -(i32::from(x_ptr[n]) << -rshifts);
                let x2 = -(i32::from(x_ptr[subfr_length - n - 1]) << -rshifts);
                let mut tmp1 = i32::from(x_ptr[n]) << 17;
                let mut tmp2 = i32::from(x_ptr[subfr_length - n - 1]) << 17;
                for k in 0..n {
                    c_first_row[k] =
                        c_first_row[k].wrapping_add(x1.wrapping_mul(i32::from(x_ptr[n - k - 1])));
                    c_last_row[k] = c_last_row[k]
                        .wrapping_add(x2.wrapping_mul(i32::from(x_ptr[subfr_length - n + k])));
                    let atmp1 = rshift_round(af_qa[k], QA - 17);
                    tmp1 = tmp1.wrapping_add(i32::from(x_ptr[n - k - 1]).wrapping_mul(atmp1));
                    tmp2 = tmp2
                        .wrapping_add(i32::from(x_ptr[subfr_length - n + k]).wrapping_mul(atmp1));
                }
                let tmp1 = -tmp1;
                let tmp2 = -tmp2;
                for k in 0..=n {
                    caf[k] = smlaww(caf[k], tmp1, i32::from(x_ptr[n - k]) << (-rshifts - 1));
                    cab[k] = smlaww(
                        cab[k],
                        tmp2,
                        i32::from(x_ptr[subfr_length - n + k - 1]) << (-rshifts - 1),
                    );
                }
            }
        }

        // reflection coefficient numerator and denominator
        let mut tmp1 = c_first_row[n];
        let mut tmp2 = c_last_row[n];
        let mut num = 0i32;
        let mut nrg = cab[0] + caf[0];
        for k in 0..n {
            let atmp_qa = af_qa[k];
            let lz = (clz32(atmp_qa.abs()) - 1).min(32 - QA);
            let atmp1 = atmp_qa << lz;

            tmp1 += smmul(c_last_row[n - k - 1], atmp1) << (32 - QA - lz);
            tmp2 += smmul(c_first_row[n - k - 1], atmp1) << (32 - QA - lz);
            num += smmul(cab[n - k], atmp1) << (32 - QA - lz);
            nrg += smmul(cab[k + 1] + caf[k + 1], atmp1) << (32 - QA - lz);
        }
        caf[n + 1] = tmp1;
        cab[n + 1] = tmp2;
        num += tmp2;
        num = (-num) << 1;

        let rc_q31 = if num.abs() < nrg {
            div32_var_q(num, nrg, 31)
        } else {
            // negative energy or ratio too high, zero the remaining taps
            for a in af_qa[n..order].iter_mut() {
                *a = 0;
            }
            break;
        };

        for k in 0..(n + 1) >> 1 {
            let tmp1 = af_qa[k];
            let tmp2 = af_qa[n - k - 1];
            af_qa[k] = tmp1 + (smmul(tmp2, rc_q31) << 1);
            af_qa[n - k - 1] = tmp2 + (smmul(tmp1, rc_q31) << 1);
        }
        af_qa[n] = rc_q31 >> (31 - QA);

        for k in 0..=n + 1 {
            let tmp1 = caf[k];
            let tmp2 = cab[n + 1 - k];
            caf[k] = tmp1 + (smmul(tmp2, rc_q31) << 1);
            cab[n + 1 - k] = tmp2 + (smmul(tmp1, rc_q31) << 1);
        }
    }

    let mut nrg = caf[0];
    let mut tmp1 = 1 << 16;
    for k in 0..order {
        let atmp1 = rshift_round(af_qa[k], QA - 16);
        nrg = smlaww(nrg, caf[k + 1], atmp1);
        tmp1 = smlaww(tmp1, atmp1, atmp1);
        a_q16[k] = -atmp1;
    }
    let res_nrg = smlaww(nrg, smmul(white_noise_frac_q32, c0), -tmp1);

    (res_nrg, -rshifts)
}

#[cfg(test)]
mod tests {
    use super::burg_modified;
    use crate::math::{fix_const, lcg_rand};

    #[test]
    fn white_noise_gives_near_zero_coefficients() {
        let mut seed = 12345;
        let x: alloc::vec::Vec<i16> = (0..320)
            .map(|_| {
                seed = lcg_rand(seed);
                (seed >> 20) as i16
            })
            .collect();
        let mut a_q16 = [0i32; 8];
        let (res_nrg, _) = burg_modified(&mut a_q16, &x, 80, 4, fix_const(1e-5, 32), 8);
        assert!(res_nrg > 0);
        for &a in &a_q16 {
            assert!(a.abs() < 1 << 14, "a = {a}");
        }
    }

    #[test]
    fn ar1_process_is_identified() {
        // x[n] = 0.75 * x[n-1] + e[n]
        let mut seed = 99;
        let mut prev = 0i32;
        let x: alloc::vec::Vec<i16> = (0..320)
            .map(|_| {
                seed = lcg_rand(seed);
                let e = seed >> 22;
                prev = (3 * prev) / 4 + e;
                prev.clamp(-32768, 32767) as i16
            })
            .collect();
        let mut a_q16 = [0i32; 4];
        burg_modified(&mut a_q16, &x, 80, 4, fix_const(1e-5, 32), 4);
        // first tap close to 0.75 in Q16
        assert!(
            (a_q16[0] - 49152).abs() < 6000,
            "a0 = {} expected near 49152",
            a_q16[0]
        );
    }

    #[test]
    fn prediction_reduces_residual_energy() {
        let x: alloc::vec::Vec<i16> = (0..320)
            .map(|i| (libm::sin(0.15 * i as f64) * 8000.0) as i16)
            .collect();
        let mut a_q16 = [0i32; 6];
        let (res_nrg, res_nrg_q) = burg_modified(&mut a_q16, &x, 80, 4, fix_const(1e-5, 32), 6);
        let energy: i64 = x.iter().map(|&v| i64::from(v) * i64::from(v)).sum();
        // residual well below 10% of the input energy
        let res = (i64::from(res_nrg) << res_nrg_q.max(0)) >> (-res_nrg_q).max(0);
        assert!(res.max(1) * 10 < energy);
    }
}
