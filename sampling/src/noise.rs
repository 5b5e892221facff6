use rand_distr::{Distribution, Normal};

use crate::source::Source;

pub const DEFAULT_SIGMA: f64 = 3.2;

const TAILCUT: f64 = 6.0;

/// Discrete Gaussian over Z with a hard `6σ` tail cut, so every sample
/// carries a deterministic absolute bound usable for noise accounting.
pub struct NoiseSampler {
    normal: Normal<f64>,
    bound: f64,
}

impl NoiseSampler {
    pub fn new(sigma: f64) -> Self {
        assert!(sigma > 0.0, "sigma must be positive");
        Self {
            normal: Normal::new(0.0, sigma).expect("sigma is finite and positive"),
            bound: TAILCUT * sigma,
        }
    }

    /// Largest magnitude [`Self::sample`] can return.
    pub fn bound(&self) -> f64 {
        self.bound
    }

    pub fn sample(&self, source: &mut Source) -> i64 {
        loop {
            let x: f64 = self.normal.sample(source);
            if x.abs() <= self.bound {
                return x.round() as i64;
            }
        }
    }
}

/// Uniform ternary draw in `{-1, 0, 1}`.
pub fn sample_ternary(source: &mut Source) -> i64 {
    source.next_u64n(3, 3) as i64 - 1
}
