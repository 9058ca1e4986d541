/// Significant-figure compression for persisted curves.

/// Round to `sf` significant figures. Zero and non-finite values pass through.
#[inline]
pub fn round_sf(x: f64, sf: u32) -> f64 {
    if x == 0.0 || !x.is_finite() || sf == 0 {
        return x;
    }
    let magnitude = x.abs().log10().floor() as i32;
    let shift = sf as i32 - 1 - magnitude;
    let rounded = if shift >= 0 {
        let factor = 10f64.powi(shift);
        (x * factor).round() / factor
    } else {
        let factor = 10f64.powi(-shift);
        (x / factor).round() * factor
    };
    if rounded.is_finite() { rounded } else { x }
}
