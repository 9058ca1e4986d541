/// Curve resampling: evenly spaced grids and clamped linear interpolation.

/// `n` evenly spaced points from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n).map(|i| if i + 1 == n { hi } else { lo + step * i as f64 }).collect()
        }
    }
}

/// Pair `xs` with `ys` (truncated to the shorter), stable-sorted by x.
pub fn sorted_pairs(xs: &[f64], ys: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut pairs: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs.into_iter().unzip()
}

/// Linear interpolation on ascending `xs`, clamped to the end values.
/// Returns `None` for an empty curve.
pub fn interp1(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return None;
    }
    if x <= xs[0] {
        return Some(ys[0]);
    }
    if x >= xs[n - 1] {
        return Some(ys[n - 1]);
    }
    // first index with xs[i] > x; 1 <= i < n here
    let i = xs[..n].partition_point(|&v| v <= x);
    let (x0, x1, y0, y1) = (xs[i - 1], xs[i], ys[i - 1], ys[i]);
    let dx = x1 - x0;
    if dx <= 0.0 {
        return Some(y1);
    }
    Some(y0 + (y1 - y0) * (x - x0) / dx)
}

/// Resample a (possibly unsorted) curve at every point of `at`.
pub fn resample(xs: &[f64], ys: &[f64], at: &[f64]) -> Option<Vec<f64>> {
    let (sx, sy) = sorted_pairs(xs, ys);
    at.iter().map(|&x| interp1(&sx, &sy, x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_ends() {
        let g = linspace(0.0, 0.1, 5);
        assert_eq!(g.len(), 5);
        assert_eq!(g[0], 0.0);
        assert_eq!(g[4], 0.1);
    }

    #[test]
    fn interp_midpoints_and_clamping() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 10.0, 30.0];
        assert_eq!(interp1(&xs, &ys, 0.5), Some(5.0));
        assert_eq!(interp1(&xs, &ys, 1.5), Some(20.0));
        assert_eq!(interp1(&xs, &ys, -1.0), Some(0.0));
        assert_eq!(interp1(&xs, &ys, 9.0), Some(30.0));
        assert_eq!(interp1(&[], &[], 1.0), None);
    }

    #[test]
    fn resample_sorts_first() {
        let out = resample(&[2.0, 0.0, 1.0], &[30.0, 0.0, 10.0], &[0.5, 1.5]).unwrap();
        assert_eq!(out, vec![5.0, 20.0]);
    }
}
