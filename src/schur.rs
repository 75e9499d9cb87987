//! Schur recursion: reflection coefficients from a correlation sequence.

use crate::math::{clz32, sat16, smlawb};

/// Maximum LPC order handled by the recursions.
pub const MAX_ORDER_LPC: usize = 16;

/// Q15 reflection coefficients from `order + 1` correlations. Returns the
/// residual energy. Faster but less accurate than [`crate::schur64::schur64`].
pub fn schur(rc_q15: &mut [i16], c: &[i32]) -> i32 {
    let order = rc_q15.len();
    debug_assert!(c.len() == order + 1 && order <= MAX_ORDER_LPC);

    let mut buf = [[0i32; 2]; MAX_ORDER_LPC + 1];

    // normalize correlations to Q30
    let lz = clz32(c[0]);
    if lz < 2 {
        for (b, &v) in buf.iter_mut().zip(c) {
            b[0] = v >> 1;
            b[1] = b[0];
        }
    } else if lz > 2 {
        for (b, &v) in buf.iter_mut().zip(c) {
            b[0] = v << (lz - 2);
            b[1] = b[0];
        }
    } else {
        for (b, &v) in buf.iter_mut().zip(c) {
            b[0] = v;
            b[1] = v;
        }
    }

    for k in 0..order {
        let denom = (buf[0][1] >> 15).max(1);
        let rc_tmp_q15 = i32::from(sat16(-(buf[k + 1][0] / denom)));
        rc_q15[k] = rc_tmp_q15 as i16;

        for n in 0..order - k {
            let ctmp1 = buf[n + k + 1][0];
            let ctmp2 = buf[n][1];
            buf[n + k + 1][0] = smlawb(ctmp1, ctmp2 << 1, rc_tmp_q15);
            buf[n][1] = smlawb(ctmp2, ctmp1 << 1, rc_tmp_q15);
        }
    }

    buf[0][1]
}

#[cfg(test)]
mod tests {
    use super::schur;

    #[test]
    fn white_noise_gives_near_zero_reflection_coefficients() {
        // correlations of an ideal white signal: delta at lag 0
        let c = [1 << 28, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut rc = [0i16; 10];
        let res = schur(&mut rc, &c);
        assert!(rc.iter().all(|&r| r == 0));
        assert!(res > 0);
    }

    #[test]
    fn single_pole_signal_recovers_its_coefficient() {
        // AR(1) with a = 0.5: r[k] = r[0] * 0.5^k
        let r0 = 1 << 28;
        let c = [r0, r0 / 2, r0 / 4, r0 / 8, r0 / 16];
        let mut rc = [0i16; 4];
        let res = schur(&mut rc, &c);
        // first reflection coefficient should be about -0.5 in Q15
        assert!((i32::from(rc[0]) + 16384).abs() < 200, "rc0 = {}", rc[0]);
        // the residual comes back at the recursion's internal Q30 level,
        // c[0] << 1 here; removing the single pole keeps 3/4 of it
        let want = 3 * (r0 >> 1);
        assert!((res - want).abs() < r0 >> 6, "res = {res}");
        // the later coefficients find nothing left to predict
        assert!(rc[1..].iter().all(|&r| r.abs() < 200));
    }
}
