//! Shared fixed-point arithmetic primitives.
//!
//! Every DSP kernel in this crate works on scaled integers; the helpers here
//! implement the handful of multiply/shift shapes those kernels are written
//! in terms of. Names follow the ARM-style mnemonics used throughout the
//! codec literature: `smulwb` multiplies a 32-bit word by the bottom 16 bits
//! of another word and keeps the top 32 bits of the 48-bit product, `smlawb`
//! is the same with an accumulator, and so on.

/// (a32 * b16_low) >> 16, keeping the top bits of the 48-bit product.
#[inline]
pub fn smulwb(a: i32, b: i32) -> i32 {
    ((i64::from(a) * i64::from(b as i16)) >> 16) as i32
}

/// a + ((b32 * c16_low) >> 16).
#[inline]
pub fn smlawb(a: i32, b: i32, c: i32) -> i32 {
    a.wrapping_add(smulwb(b, c))
}

/// (a32 * b16_top) >> 16.
#[inline]
pub fn smulwt(a: i32, b: i32) -> i32 {
    ((i64::from(a) * i64::from(b >> 16)) >> 16) as i32
}

/// a + ((b32 * c16_top) >> 16).
#[inline]
pub fn smlawt(a: i32, b: i32, c: i32) -> i32 {
    a.wrapping_add(smulwt(b, c))
}

/// a16_low * b16_low.
#[inline]
pub fn smulbb(a: i32, b: i32) -> i32 {
    i32::from(a as i16).wrapping_mul(i32::from(b as i16))
}

/// a + b16_low * c16_low.
#[inline]
pub fn smlabb(a: i32, b: i32, c: i32) -> i32 {
    a.wrapping_add(smulbb(b, c))
}

/// a16_low * b16_top.
#[inline]
pub fn smulbt(a: i32, b: i32) -> i32 {
    i32::from(a as i16).wrapping_mul(b >> 16)
}

/// a + b16_low * c16_top.
#[inline]
pub fn smlabt(a: i32, b: i32, c: i32) -> i32 {
    a.wrapping_add(smulbt(b, c))
}

/// a16_top * b16_top.
#[inline]
pub fn smultt(a: i32, b: i32) -> i32 {
    (a >> 16).wrapping_mul(b >> 16)
}

/// (a32 * b32) >> 16, computed in 64 bits.
#[inline]
pub fn smulww(a: i32, b: i32) -> i32 {
    ((i64::from(a) * i64::from(b)) >> 16) as i32
}

/// a + ((b32 * c32) >> 16), computed in 64 bits.
#[inline]
pub fn smlaww(a: i32, b: i32, c: i32) -> i32 {
    a.wrapping_add(smulww(b, c))
}

/// Top 32 bits of the 64-bit product (ARM `SMMUL`).
#[inline]
pub fn smmul(a: i32, b: i32) -> i32 {
    ((i64::from(a) * i64::from(b)) >> 32) as i32
}

/// Right shift with rounding; `shift` must be in 1..=31.
#[inline]
pub fn rshift_round(a: i32, shift: i32) -> i32 {
    debug_assert!((1..32).contains(&shift));
    if shift == 1 {
        (a >> 1) + (a & 1)
    } else {
        ((a >> (shift - 1)) + 1) >> 1
    }
}

/// 64-bit right shift with rounding; `shift` must be in 1..=63.
#[inline]
pub fn rshift_round64(a: i64, shift: i32) -> i64 {
    debug_assert!((1..64).contains(&shift));
    if shift == 1 {
        (a >> 1) + (a & 1)
    } else {
        ((a >> (shift - 1)) + 1) >> 1
    }
}

/// Saturate to 16-bit range.
#[inline]
pub fn sat16(a: i32) -> i16 {
    a.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Saturating addition of two values known to be non-negative.
#[inline]
pub fn add_pos_sat32(a: i32, b: i32) -> i32 {
    if (a.wrapping_add(b) as u32) & 0x8000_0000 != 0 {
        i32::MAX
    } else {
        a + b
    }
}

/// Left shift with 32-bit saturation.
#[inline]
pub fn lshift_sat32(a: i32, shift: i32) -> i32 {
    debug_assert!((0..32).contains(&shift));
    a.clamp(i32::MIN >> shift, i32::MAX >> shift) << shift
}

/// Clamp `a` between the two limits, in either order.
#[inline]
pub fn limit(a: i32, limit1: i32, limit2: i32) -> i32 {
    if limit1 < limit2 {
        a.clamp(limit1, limit2)
    } else {
        a.clamp(limit2, limit1)
    }
}

/// Leading zeros of a 32-bit word; 32 for zero.
#[inline]
pub fn clz32(a: i32) -> i32 {
    (a as u32).leading_zeros() as i32
}

/// Leading zeros of a 64-bit word; 64 for zero.
#[inline]
pub fn clz64(a: i64) -> i32 {
    (a as u64).leading_zeros() as i32
}

/// Leading zeros plus the 7 bits that follow the leading one.
#[inline]
pub fn clz_frac(input: i32) -> (i32, i32) {
    let lz = clz32(input);
    let frac_q7 = (input as u32).rotate_right((24 - lz) as u32 & 31) as i32 & 0x7f;
    (lz, frac_q7)
}

/// Integer square root approximation.
///
/// Accuracy is within ±10% for outputs above 15 and ±2.5% above 120, which
/// is sufficient everywhere the codec takes an energy square root.
pub fn sqrt_approx(x: i32) -> i32 {
    if x <= 0 {
        return 0;
    }
    let (lz, frac_q7) = clz_frac(x);
    let mut y = if lz & 1 != 0 { 32768 } else { 46214 };
    y >>= lz >> 1;
    smlawb(y, y, smulbb(213, frac_q7))
}

/// Approximation of `(a << q_res) / b` with one Newton refinement step.
pub fn div32_var_q(a32: i32, b32: i32, q_res: i32) -> i32 {
    debug_assert!(b32 != 0);
    debug_assert!(q_res >= 0);

    let a_headrm = clz32(a32.abs()) - 1;
    let mut a32_nrm = a32 << a_headrm;
    let b_headrm = clz32(b32.abs()) - 1;
    let b32_nrm = b32 << b_headrm;

    let b32_inv = (i32::MAX >> 2) / (b32_nrm >> 16);
    let mut result = smulwb(a32_nrm, b32_inv);

    a32_nrm = a32_nrm.wrapping_sub(smmul(b32_nrm, result).wrapping_shl(3));
    result = smlawb(result, a32_nrm, b32_inv);

    let lshift = 29 + a_headrm - b_headrm - q_res;
    if lshift <= 0 {
        lshift_sat32(result, -lshift)
    } else if lshift < 32 {
        result >> lshift
    } else {
        0
    }
}

/// Approximation of `(1 << q_res) / b` with one refinement step.
pub fn inverse32_var_q(b32: i32, q_res: i32) -> i32 {
    debug_assert!(b32 != 0 && b32 != i32::MIN);
    debug_assert!(q_res > 0);

    let b_headrm = clz32(b32.abs()) - 1;
    let b32_nrm = b32 << b_headrm;

    let b32_inv = (i32::MAX >> 2) / (b32_nrm >> 16);
    let mut result = b32_inv << 16;

    let err_q32 = (-smulwb(b32_nrm, b32_inv)).wrapping_shl(3);
    result = smlaww(result, err_q32, b32_inv);

    let lshift = 61 - b_headrm - q_res;
    if lshift <= 0 {
        lshift_sat32(result, -lshift)
    } else if lshift < 32 {
        result >> lshift
    } else {
        0
    }
}

/// Linear congruential step used for dither seeds.
#[inline]
pub fn lcg_rand(seed: i32) -> i32 {
    907_633_515_i32.wrapping_add(seed.wrapping_mul(196_314_165))
}

/// Fixed-point constant: `C * 2^q + 0.5` truncated, for literal tuning values.
#[inline]
pub const fn fix_const(c: f64, q: i32) -> i32 {
    (c * (1u64 << q) as f64 + 0.5) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smulwb_keeps_top_bits_of_product() {
        assert_eq!(smulwb(1 << 16, 1 << 14), 1 << 14);
        assert_eq!(smulwb(-65536, 32767), -32767);
        // Only the bottom 16 bits of the second operand participate.
        assert_eq!(smulwb(1 << 16, 0x7fff_0001), 1);
    }

    #[test]
    fn rounding_shift_rounds_half_up() {
        assert_eq!(rshift_round(3, 1), 2);
        assert_eq!(rshift_round(5, 2), 1);
        assert_eq!(rshift_round(6, 2), 2);
        assert_eq!(rshift_round64((1 << 20) + (1 << 9), 10), 1025);
    }

    #[test]
    fn clz_frac_splits_the_mantissa() {
        // exact powers of two carry no fractional bits
        assert_eq!(clz_frac(1 << 20), (11, 0));
        assert_eq!(clz_frac(1), (31, 0));
        // 1.5 * 2^20: the 7 bits below the leading one read 0.5 in Q7
        assert_eq!(clz_frac(3 << 19), (11, 64));
        // leading one below bit 7, the fraction wraps in from the top
        assert_eq!(clz_frac(3), (30, 64));
    }

    #[test]
    fn sqrt_approx_tracks_true_root() {
        for &(x, lo, hi) in &[(16i32, 3i32, 5i32), (144, 11, 13), (1 << 20, 990, 1060)] {
            let y = sqrt_approx(x);
            assert!(y >= lo && y <= hi, "sqrt_approx({x}) = {y}");
        }
        assert_eq!(sqrt_approx(0), 0);
        assert_eq!(sqrt_approx(-5), 0);
    }

    #[test]
    fn inverse_and_divide_agree_with_reference_math() {
        let inv = inverse32_var_q(1000, 30);
        // 2^30 / 1000 = 1073741.824
        assert!((inv - 1_073_742).abs() < 200, "inv = {inv}");

        let q = div32_var_q(123_456, 789, 10);
        // (123456 << 10) / 789 = 160226.9
        assert!((q - 160_227).abs() < 40, "q = {q}");
    }

    #[test]
    fn saturation_helpers_clamp() {
        assert_eq!(sat16(40000), i16::MAX);
        assert_eq!(sat16(-40000), i16::MIN);
        assert_eq!(add_pos_sat32(i32::MAX - 1, 10), i32::MAX);
        assert_eq!(limit(5, 10, 0), 5);
        assert_eq!(limit(-5, 10, 0), 0);
    }

    #[test]
    fn fix_const_matches_manual_scaling() {
        assert_eq!(fix_const(0.5, 8), 128);
        assert_eq!(fix_const(1.0, 16), 65536);
        assert_eq!(fix_const(0.1, 7), 13);
    }

    #[test]
    fn lcg_is_deterministic_and_wraps() {
        assert_eq!(lcg_rand(1), 1_103_947_680);
        assert_eq!(lcg_rand(0), 907_633_515);
        // Wrapping arithmetic, never panics at the extremes.
        let _ = lcg_rand(i32::MAX);
        let _ = lcg_rand(i32::MIN);
        assert_eq!(lcg_rand(12345), lcg_rand(12345));
    }
}
