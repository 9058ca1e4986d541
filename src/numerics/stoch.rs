/// Stochastic helpers for the population search and the samplers.
/// Callers own the generator (`bevy_prng::WyRand` in this crate) and pass it
/// in, so a fixed seed fixes every draw.
use rand_core::RngCore;

/// Uniform draw in [0, 1) from the top 53 bits.
#[inline]
pub fn uniform01<R: RngCore>(rng: &mut R) -> f64 {
    ((rng.next_u64() >> 11) as f64) / ((1u64 << 53) as f64)
}

/// Uniform draw in [lo, hi].
#[inline]
pub fn uniform_in<R: RngCore>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    (lo + uniform01(rng) * (hi - lo)).clamp(lo, hi)
}

/// Gaussian(0,1) via Box–Muller.
#[inline]
pub fn gaussian01<R: RngCore>(rng: &mut R) -> f64 {
    // 1 - u keeps the log argument in (0, 1].
    let u1 = 1.0 - uniform01(rng);
    let u2 = uniform01(rng);
    let r = (-2.0 * u1.ln()).sqrt();
    let t = 2.0 * std::f64::consts::PI * u2;
    r * t.cos()
}

/// Bernoulli(p).
#[inline]
pub fn bernoulli<R: RngCore>(rng: &mut R, p: f64) -> bool {
    uniform01(rng) < p.clamp(0.0, 1.0)
}

/// Uniform index in 0..n (n > 0).
#[inline]
pub fn index<R: RngCore>(rng: &mut R, n: usize) -> usize {
    ((uniform01(rng) * n as f64) as usize).min(n.saturating_sub(1))
}

/// Fisher–Yates shuffle.
pub fn shuffle<R: RngCore, T>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = index(rng, i + 1);
        items.swap(i, j);
    }
}
