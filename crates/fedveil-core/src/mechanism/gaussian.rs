//! Gaussian mechanism for (ε, δ)-differential privacy
//!
//! Releases f(D) + N(0, σ²) with the classic analytic calibration
//!
//! ```text
//! σ = Δ₂f · √(2 ln(1.25/δ)) / ε
//! ```
//!
//! which requires 0 < ε < 1; construction outside that range is a
//! validation error.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::access::AccessDefinition;
use crate::budget::PrivacyBudget;
use crate::data::DataValue;
use crate::error::PrivacyError;
use crate::rng::standard_normal;
use crate::validation::{validate_sensitivity, DpValidationError};

/// Gaussian noise calibrated to (sensitivity, ε, δ), applied per element
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GaussianMechanism {
    sensitivity: f64,
    epsilon_delta: PrivacyBudget,
    sigma: f64,
}

impl GaussianMechanism {
    pub fn new(sensitivity: f64, epsilon_delta: PrivacyBudget) -> Result<Self, PrivacyError> {
        validate_sensitivity(sensitivity)?;

        let epsilon = epsilon_delta.epsilon();
        if epsilon >= 1.0 {
            return Err(DpValidationError::InvalidEpsilon {
                value: epsilon,
                reason: "the analytic Gaussian mechanism requires epsilon < 1".to_string(),
            }
            .into());
        }

        let delta = epsilon_delta.delta();
        if delta == 0.0 {
            return Err(DpValidationError::InvalidDelta {
                value: delta,
                reason: "the Gaussian mechanism requires delta > 0".to_string(),
            }
            .into());
        }

        let sigma = sensitivity * (2.0 * (1.25 / delta).ln()).sqrt() / epsilon;
        Ok(Self {
            sensitivity,
            epsilon_delta,
            sigma,
        })
    }

    /// Standard deviation of the calibrated noise
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }
}

impl AccessDefinition for GaussianMechanism {
    fn apply(
        &mut self,
        data: &DataValue,
        rng: &mut dyn RngCore,
    ) -> Result<DataValue, PrivacyError> {
        let sigma = self.sigma;
        data.try_map_elements("GaussianMechanism", |value| {
            Ok(value + sigma * standard_normal(rng))
        })
    }

    fn epsilon_delta(&self) -> Option<PrivacyBudget> {
        Some(self.epsilon_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::rng_from_seed;

    fn budget(epsilon: f64, delta: f64) -> PrivacyBudget {
        PrivacyBudget::new(epsilon, delta).unwrap()
    }

    #[test]
    fn test_epsilon_at_least_one_is_rejected() {
        // The (1, 1) parametrization must fail
        assert!(GaussianMechanism::new(1.0, budget(1.0, 1.0)).is_err());
        assert!(GaussianMechanism::new(1.0, budget(2.0, 1e-6)).is_err());
    }

    #[test]
    fn test_zero_delta_is_rejected() {
        assert!(GaussianMechanism::new(1.0, budget(0.5, 0.0)).is_err());
    }

    #[test]
    fn test_invalid_sensitivity() {
        assert!(GaussianMechanism::new(0.0, budget(0.5, 1e-6)).is_err());
        assert!(GaussianMechanism::new(-1.0, budget(0.5, 1e-6)).is_err());
    }

    #[test]
    fn test_sigma_calibration() {
        let mechanism = GaussianMechanism::new(1.0, budget(0.1, 1e-6)).unwrap();
        // σ = √(2 ln(1.25e6)) / 0.1 ≈ 53
        assert!(
            mechanism.sigma() > 50.0 && mechanism.sigma() < 60.0,
            "Sigma {} out of expected range",
            mechanism.sigma()
        );
    }

    #[test]
    fn test_cost_matches_configuration() {
        let epsilon_delta = budget(0.1, 1.0);
        let mechanism = GaussianMechanism::new(1.0, epsilon_delta).unwrap();
        assert_eq!(mechanism.epsilon_delta(), Some(epsilon_delta));
    }

    #[test]
    fn test_released_value_differs_but_stays_close() {
        let mut rng = rng_from_seed(Some(11));
        let mut mechanism = GaussianMechanism::new(1.0, budget(0.1, 1.0)).unwrap();

        let released = mechanism
            .apply(&DataValue::Scalar(175.0), &mut rng)
            .unwrap();
        let value = released.as_scalar().unwrap();
        assert!(value != 175.0);
        assert!((value - 175.0).abs() < 100.0);
    }

    #[test]
    fn test_empirical_variance_matches_sigma() {
        let mut rng = rng_from_seed(Some(12));
        let mut mechanism = GaussianMechanism::new(1.0, budget(0.5, 1e-3)).unwrap();
        let sigma = mechanism.sigma();

        let n = 20_000;
        let input = DataValue::Scalar(0.0);
        let samples: Vec<f64> = (0..n)
            .map(|_| {
                mechanism
                    .apply(&input, &mut rng)
                    .unwrap()
                    .as_scalar()
                    .unwrap()
            })
            .collect();

        let mean: f64 = samples.iter().sum::<f64>() / n as f64;
        let variance: f64 =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

        let expected = sigma * sigma;
        assert!(
            (variance - expected).abs() / expected < 0.1,
            "Variance {} too far from expected {}",
            variance,
            expected
        );
    }
}
