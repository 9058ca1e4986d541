/// Orientation mechanics: Bunge Euler angles and SO(3) geodesics.
use std::f64::consts::PI;

/// Wrap an angle into [lo, hi] by whole periods. Values within 1e-4 of a
/// bound are returned untouched.
pub fn wrap_angle(angle: f64, lo: f64, hi: f64) -> f64 {
    let range = hi - lo;
    if !angle.is_finite() || range <= 0.0 {
        return angle;
    }
    if (angle - lo).abs() < 1e-4 || (angle - hi).abs() < 1e-4 {
        return angle;
    }
    if angle > lo && angle < hi {
        return angle;
    }
    let wrapped = lo + (angle - lo).rem_euclid(range);
    if wrapped.is_finite() { wrapped } else { angle }
}

/// Wrap into the Bunge domain [0, 2π].
#[inline]
pub fn wrap_bunge(angle: f64) -> f64 {
    wrap_angle(angle, 0.0, 2.0 * PI)
}

/// Rotation matrix of Bunge (z-x-z) Euler angles, in radians.
pub fn euler_matrix(phi_1: f64, big_phi: f64, phi_2: f64) -> [[f64; 3]; 3] {
    let (s1, c1) = phi_1.sin_cos();
    let (s, c) = big_phi.sin_cos();
    let (s2, c2) = phi_2.sin_cos();
    [
        [c1 * c2 - s1 * s2 * c, s1 * c2 + c1 * s2 * c, s2 * s],
        [-c1 * s2 - s1 * c2 * c, -s1 * s2 + c1 * c2 * c, c2 * s],
        [s1 * s, -c1 * s, c],
    ]
}

/// Geodesic distance (misorientation angle, radians) between two
/// orientations given as Bunge Euler triplets. No crystal symmetry applied.
pub fn geodesic(a: [f64; 3], b: [f64; 3]) -> f64 {
    let ra = euler_matrix(a[0], a[1], a[2]);
    let rb = euler_matrix(b[0], b[1], b[2]);
    // trace(Ra · Rbᵀ)
    let mut trace = 0.0;
    for i in 0..3 {
        for k in 0..3 {
            trace += ra[i][k] * rb[i][k];
        }
    }
    ((trace - 1.0) / 2.0).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_moves_by_whole_periods() {
        let w = wrap_bunge(-0.5);
        assert!((w - (2.0 * PI - 0.5)).abs() < 1e-12);
        let w = wrap_bunge(7.0);
        assert!((w - (7.0 - 2.0 * PI)).abs() < 1e-12);
        assert_eq!(wrap_bunge(1.0), 1.0);
        assert_eq!(wrap_bunge(2.0 * PI + 5e-5), 2.0 * PI + 5e-5);
    }

    #[test]
    fn geodesic_of_pure_phi1_rotation() {
        let d = geodesic([0.0, 0.0, 0.0], [0.3, 0.0, 0.0]);
        assert!((d - 0.3).abs() < 1e-9);
        assert!(geodesic([1.0, 0.4, 2.0], [1.0, 0.4, 2.0]) < 1e-6);
    }
}
