/// Bound projection and proportional blending inside a parameter box.

/// Proportional approach: x' = clamp(x + k * (target - x)).
#[inline]
pub fn approach(x: f64, target: f64, k: f64, lo: f64, hi: f64) -> f64 {
    project(x + k * (target - x), lo, hi)
}

/// Project onto [lo, hi]. Non-finite input lands on `lo`.
#[inline]
pub fn project(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() { lo } else { x.clamp(lo, hi) }
}

/// Position of x inside [lo, hi] as a fraction (0 when the box is degenerate).
#[inline]
pub fn to_unit(x: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if span > 0.0 { ((x - lo) / span).clamp(0.0, 1.0) } else { 0.0 }
}

/// Inverse of [`to_unit`].
#[inline]
pub fn from_unit(u: f64, lo: f64, hi: f64) -> f64 {
    project(lo + u.clamp(0.0, 1.0) * (hi - lo), lo, hi)
}
