//! Laplace mechanism for (ε, 0)-differential privacy
//!
//! For a query f with L1 sensitivity Δf, releases f(D) + Lap(0, Δf/ε):
//!
//! ```text
//! p(x) = (1/2b) · e^(-|x|/b),   b = Δf/ε
//! ```
//!
//! guaranteeing P[M(D) ∈ S] ≤ e^ε · P[M(D') ∈ S] for neighboring D, D'.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::access::AccessDefinition;
use crate::budget::PrivacyBudget;
use crate::data::DataValue;
use crate::error::PrivacyError;
use crate::rng::laplace_noise;
use crate::validation::{validate_epsilon, validate_sensitivity};

/// Laplace noise calibrated to sensitivity/ε, applied per element
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LaplaceMechanism {
    sensitivity: f64,
    epsilon: f64,
}

impl LaplaceMechanism {
    pub fn new(sensitivity: f64, epsilon: f64) -> Result<Self, PrivacyError> {
        validate_sensitivity(sensitivity)?;
        validate_epsilon(epsilon)?;
        Ok(Self {
            sensitivity,
            epsilon,
        })
    }

    /// Scale parameter of the noise distribution: b = Δf/ε
    pub fn scale(&self) -> f64 {
        self.sensitivity / self.epsilon
    }

    /// Noise variance: Var(Lap(0, b)) = 2b²
    pub fn variance(&self) -> f64 {
        let scale = self.scale();
        2.0 * scale * scale
    }
}

impl AccessDefinition for LaplaceMechanism {
    fn apply(
        &mut self,
        data: &DataValue,
        rng: &mut dyn RngCore,
    ) -> Result<DataValue, PrivacyError> {
        let scale = self.scale();
        data.try_map_elements("LaplaceMechanism", |value| {
            Ok(value + laplace_noise(rng, scale))
        })
    }

    fn epsilon_delta(&self) -> Option<PrivacyBudget> {
        Some(PrivacyBudget::new_unchecked(self.epsilon, 0.0))
    }
}
