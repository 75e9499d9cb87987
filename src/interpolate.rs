//! Linear interpolation between two parameter vectors.

/// Writes `x0 + ifact * (x1 - x0)` with `ifact_q2` in 0..=4, the weight
/// on the second vector.
pub fn interpolate(xi: &mut [i32], x0: &[i32], x1: &[i32], ifact_q2: i32) {
    debug_assert!((0..=1 << 2).contains(&ifact_q2));
    debug_assert!(x0.len() == xi.len() && x1.len() == xi.len());

    for i in 0..xi.len() {
        xi[i] = x0[i] + (((x1[i] - x0[i]) * ifact_q2) >> 2);
    }
}

#[cfg(test)]
mod tests {
    use super::interpolate;

    #[test]
    fn endpoints_and_midpoint() {
        let x0 = [100, -200, 300];
        let x1 = [200, 200, -100];
        let mut xi = [0i32; 3];

        interpolate(&mut xi, &x0, &x1, 0);
        assert_eq!(xi, x0);

        interpolate(&mut xi, &x0, &x1, 4);
        assert_eq!(xi, x1);

        interpolate(&mut xi, &x0, &x1, 2);
        assert_eq!(xi, [150, 0, 100]);
    }
}
