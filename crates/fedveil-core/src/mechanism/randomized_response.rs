//! Randomized response for binary data
//!
//! Both mechanisms release a randomized version of a {0, 1} value so the
//! true value cannot be inferred with certainty. [`RandomizedResponseCoins`]
//! is the classic two-coin protocol; [`RandomizedResponseBinary`] is the
//! general parametrization by the two release probabilities.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::access::AccessDefinition;
use crate::budget::PrivacyBudget;
use crate::data::DataValue;
use crate::error::PrivacyError;
use crate::mechanism::ensure_binary;
use crate::validation::{validate_epsilon, validate_probability, DpValidationError};

/// Two-coin randomized response.
///
/// Per element: flip a first coin with heads-probability `prob_head_first`;
/// heads releases the true value, tails flips a second coin with
/// heads-probability `prob_head_second` and releases that coin's outcome
/// (heads = 1, tails = 0). The defaults (0.5, 0.5) give the classic
/// (ln 3, 0) mechanism.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RandomizedResponseCoins {
    prob_head_first: f64,
    prob_head_second: f64,
    epsilon: f64,
}

impl RandomizedResponseCoins {
    /// `prob_head_first` must lie in [0, 1) and `prob_head_second` in
    /// (0, 1); at the excluded endpoints a release probability degenerates
    /// to 0 or 1 and the privacy loss is unbounded.
    pub fn new(prob_head_first: f64, prob_head_second: f64) -> Result<Self, PrivacyError> {
        validate_probability(prob_head_first)?;
        validate_probability(prob_head_second)?;
        if prob_head_first >= 1.0 {
            return Err(DpValidationError::InvalidProbability {
                value: prob_head_first,
                reason: "a first coin that always lands heads releases the true value"
                    .to_string(),
            }
            .into());
        }
        if prob_head_second == 0.0 || prob_head_second == 1.0 {
            return Err(DpValidationError::InvalidProbability {
                value: prob_head_second,
                reason: "a deterministic second coin makes the privacy loss unbounded"
                    .to_string(),
            }
            .into());
        }

        Ok(Self {
            prob_head_first,
            prob_head_second,
            epsilon: coins_epsilon(prob_head_first, prob_head_second),
        })
    }
}

impl Default for RandomizedResponseCoins {
    fn default() -> Self {
        Self {
            prob_head_first: 0.5,
            prob_head_second: 0.5,
            epsilon: coins_epsilon(0.5, 0.5),
        }
    }
}

/// Privacy loss induced by the two coins.
///
/// The release probabilities are f1 = P(1 | true 1) = p1 + (1-p1)·p2 and
/// f0 = P(1 | true 0) = (1-p1)·p2, so ε = max(ln(f1/f0), ln((1-f0)/(1-f1))).
fn coins_epsilon(prob_head_first: f64, prob_head_second: f64) -> f64 {
    let f1 = prob_head_first + (1.0 - prob_head_first) * prob_head_second;
    let f0 = (1.0 - prob_head_first) * prob_head_second;
    (f1 / f0).ln().max(((1.0 - f0) / (1.0 - f1)).ln())
}

impl AccessDefinition for RandomizedResponseCoins {
    fn apply(
        &mut self,
        data: &DataValue,
        rng: &mut dyn RngCore,
    ) -> Result<DataValue, PrivacyError> {
        ensure_binary(data, "RandomizedResponseCoins")?;
        let (p1, p2) = (self.prob_head_first, self.prob_head_second);
        data.try_map_elements("RandomizedResponseCoins", |value| {
            if rng.gen_bool(p1) {
                Ok(value)
            } else if rng.gen_bool(p2) {
                Ok(1.0)
            } else {
                Ok(0.0)
            }
        })
    }

    fn epsilon_delta(&self) -> Option<PrivacyBudget> {
        Some(PrivacyBudget::new_unchecked(self.epsilon, 0.0))
    }
}

/// General binary randomized response.
///
/// `f0` = P(release 1 | true 0), `f1` = P(release 1 | true 1). Construction
/// fails when either probability is deterministic (outside the open unit
/// interval) or when the parametrization implies a privacy loss larger than
/// the declared ε.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RandomizedResponseBinary {
    f0: f64,
    f1: f64,
    epsilon: f64,
}

impl RandomizedResponseBinary {
    pub fn new(f0: f64, f1: f64, epsilon: f64) -> Result<Self, PrivacyError> {
        validate_epsilon(epsilon)?;
        for probability in [f0, f1] {
            validate_probability(probability)?;
            if probability == 0.0 || probability == 1.0 {
                return Err(DpValidationError::InvalidProbability {
                    value: probability,
                    reason: "a deterministic response provides no randomization".to_string(),
                }
                .into());
            }
        }

        let implied = (f1 / f0)
            .ln()
            .abs()
            .max((((1.0 - f0) / (1.0 - f1)).ln()).abs());
        if implied > epsilon + 1e-12 {
            return Err(DpValidationError::InvalidEpsilon {
                value: epsilon,
                reason: format!(
                    "response probabilities imply a privacy loss of {:.4}",
                    implied
                ),
            }
            .into());
        }

        Ok(Self { f0, f1, epsilon })
    }
}

impl AccessDefinition for RandomizedResponseBinary {
    fn apply(
        &mut self,
        data: &DataValue,
        rng: &mut dyn RngCore,
    ) -> Result<DataValue, PrivacyError> {
        ensure_binary(data, "RandomizedResponseBinary")?;
        let (f0, f1) = (self.f0, self.f1);
        data.try_map_elements("RandomizedResponseBinary", |value| {
            let prob_one = if value == 1.0 { f1 } else { f0 };
            Ok(if rng.gen_bool(prob_one) { 1.0 } else { 0.0 })
        })
    }

    fn epsilon_delta(&self) -> Option<PrivacyBudget> {
        Some(PrivacyBudget::new_unchecked(self.epsilon, 0.0))
    }
}
