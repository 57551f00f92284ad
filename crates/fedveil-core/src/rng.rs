//! Random variate generation
//!
//! All randomness flows through an injected [`RngCore`] so that tests can
//! pin every draw with a seeded ChaCha20 generator while production callers
//! use OS entropy. Uniform variates use the 53-bit mantissa technique;
//! Laplace noise is drawn with the inverse-CDF method and Gaussian noise
//! with the Box-Muller transform:
//!
//! ```text
//! Laplace:  F⁻¹(u) = -b · sign(u) · ln(1 - 2|u|),   u ~ Uniform(-0.5, 0.5)
//! Gaussian: Z = √(-2 ln U₁) · cos(2π U₂),           U₁, U₂ ~ Uniform(0, 1)
//! ```

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Build a generator from an optional seed: seeded for reproducibility,
/// OS entropy otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    }
}

/// Uniform f64 in [0, 1) with full 53-bit mantissa precision
pub(crate) fn uniform_f64(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// Uniform f64 in (-0.5, 0.5), excluding exactly 0
///
/// This is the range the Laplace inverse-CDF transformation needs.
pub(crate) fn uniform_centered(rng: &mut dyn RngCore) -> f64 {
    loop {
        let centered = uniform_f64(rng) - 0.5;
        if centered.abs() > 1e-15 {
            return centered;
        }
    }
}

/// Sample from Laplace(0, scale) via the inverse CDF
pub(crate) fn laplace_noise(rng: &mut dyn RngCore, scale: f64) -> f64 {
    let u = uniform_centered(rng);
    -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
}

/// Sample from the standard normal N(0, 1) via Box-Muller
pub(crate) fn standard_normal(rng: &mut dyn RngCore) -> f64 {
    // Clamp away from 0 so ln(u1) stays finite
    let u1 = uniform_f64(rng).max(1e-15);
    let u2 = uniform_f64(rng);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
