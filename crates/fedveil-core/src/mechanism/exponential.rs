//! Exponential mechanism for non-numeric and selection queries
//!
//! Draws outcomes r from a fixed output range with probability
//!
//! ```text
//! P[r] ∝ exp(ε · u(D, r) / (2 · Δu))
//! ```
//!
//! where u scores every candidate against the true data and Δu bounds how
//! much one record can change any score. Cost is (ε, 0) per application
//! regardless of the number of repetitions drawn.

use rand::distributions::{Distribution, WeightedIndex};
use rand::RngCore;

use crate::access::AccessDefinition;
use crate::budget::PrivacyBudget;
use crate::data::DataValue;
use crate::error::PrivacyError;
use crate::validation::{validate_epsilon, validate_sensitivity, DpValidationError};

/// Scores the output range against the true data, one score per candidate
pub type UtilityFn = Box<dyn Fn(&DataValue, &[f64]) -> Vec<f64>>;

pub struct ExponentialMechanism {
    utility: UtilityFn,
    output_range: Vec<f64>,
    delta_u: f64,
    epsilon: f64,
    repetitions: usize,
}

impl ExponentialMechanism {
    /// Single-draw mechanism over `output_range`
    pub fn new(
        utility: UtilityFn,
        output_range: Vec<f64>,
        delta_u: f64,
        epsilon: f64,
    ) -> Result<Self, PrivacyError> {
        Self::with_repetitions(utility, output_range, delta_u, epsilon, 1)
    }

    /// Mechanism drawing `repetitions` independent outcomes per application
    pub fn with_repetitions(
        utility: UtilityFn,
        output_range: Vec<f64>,
        delta_u: f64,
        epsilon: f64,
        repetitions: usize,
    ) -> Result<Self, PrivacyError> {
        validate_sensitivity(delta_u)?;
        validate_epsilon(epsilon)?;
        if output_range.is_empty() {
            return Err(DpValidationError::InvalidQuery(
                "the exponential mechanism needs a non-empty output range".to_string(),
            )
            .into());
        }
        if repetitions == 0 {
            return Err(DpValidationError::InvalidQuery(
                "the exponential mechanism needs at least one repetition".to_string(),
            )
            .into());
        }
        Ok(Self {
            utility,
            output_range,
            delta_u,
            epsilon,
            repetitions,
        })
    }

    pub fn output_range(&self) -> &[f64] {
        &self.output_range
    }
}

impl AccessDefinition for ExponentialMechanism {
    fn apply(
        &mut self,
        data: &DataValue,
        rng: &mut dyn RngCore,
    ) -> Result<DataValue, PrivacyError> {
        let scores = (self.utility)(data, &self.output_range);
        if scores.len() != self.output_range.len() {
            return Err(DpValidationError::InvalidQuery(format!(
                "utility function returned {} scores for {} candidates",
                scores.len(),
                self.output_range.len()
            ))
            .into());
        }

        // Shift by the maximum score so the weights stay finite
        let max_score = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mut weights = Vec::with_capacity(scores.len());
        for score in &scores {
            let weight = (self.epsilon * (score - max_score) / (2.0 * self.delta_u)).exp();
            if !weight.is_finite() {
                return Err(DpValidationError::InvalidQuery(
                    "utility function produced a non-finite score".to_string(),
                )
                .into());
            }
            weights.push(weight);
        }

        let sampler = WeightedIndex::new(&weights).map_err(|err| {
            DpValidationError::InvalidQuery(format!("invalid utility weights: {}", err))
        })?;

        let mut draws = Vec::with_capacity(self.repetitions);
        for _ in 0..self.repetitions {
            draws.push(self.output_range[sampler.sample(rng)]);
        }

        if self.repetitions == 1 {
            Ok(DataValue::Scalar(draws[0]))
        } else {
            Ok(DataValue::Vector(draws))
        }
    }

    fn epsilon_delta(&self) -> Option<PrivacyBudget> {
        Some(PrivacyBudget::new_unchecked(self.epsilon, 0.0))
    }
}
