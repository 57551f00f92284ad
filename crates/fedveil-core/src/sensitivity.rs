//! Empirical sensitivity estimation
//!
//! When no analytic sensitivity bound is available for a query, the
//! [`SensitivitySampler`] estimates one: it repeatedly evaluates the query
//! on pairs of datasets drawn from a data distribution, reduces each output
//! pair with a [`SensitivityNorm`], and summarizes the observed distances
//! into an empirical mean and a high-probability upper bound. The upper
//! bound calibrates a noise-adding mechanism.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::data::DataValue;
use crate::distribution::ProbabilityDistribution;
use crate::error::PrivacyError;
use crate::validation::DpValidationError;

/// Distance between two query outputs
pub trait SensitivityNorm {
    fn compute(&self, x1: &DataValue, x2: &DataValue) -> f64;
}

/// Sum of absolute elementwise differences
#[derive(Debug, Clone, Copy, Default)]
pub struct L1SensitivityNorm;

impl SensitivityNorm for L1SensitivityNorm {
    fn compute(&self, x1: &DataValue, x2: &DataValue) -> f64 {
        x1.elements()
            .iter()
            .zip(x2.elements().iter())
            .map(|(a, b)| (a - b).abs())
            .sum()
    }
}

/// Euclidean distance between outputs
#[derive(Debug, Clone, Copy, Default)]
pub struct L2SensitivityNorm;

impl SensitivityNorm for L2SensitivityNorm {
    fn compute(&self, x1: &DataValue, x2: &DataValue) -> f64 {
        x1.elements()
            .iter()
            .zip(x2.elements().iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// How the dataset pairs for one observation are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingPolicy {
    /// Neighboring datasets: the second sample replaces one record of the
    /// first with a fresh draw
    SingleRecordChange,
    /// Two fully independent samples
    IndependentPairs,
}

/// Result of a sensitivity estimation run
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensitivityEstimate {
    /// Mean observed distance
    pub mean: f64,
    /// Empirical quantile of the observed distances
    pub upper_bound: f64,
}

/// Empirical sensitivity sampler
#[derive(Debug, Clone, Copy)]
pub struct SensitivitySampler {
    iterations: usize,
    quantile: f64,
    policy: SamplingPolicy,
}

impl SensitivitySampler {
    /// `iterations` pairs are drawn; `quantile` ∈ (0, 1] picks the order
    /// statistic reported as the upper bound.
    pub fn new(
        iterations: usize,
        quantile: f64,
        policy: SamplingPolicy,
    ) -> Result<Self, PrivacyError> {
        if iterations == 0 {
            return Err(DpValidationError::InvalidQuery(
                "sensitivity sampling needs at least one iteration".to_string(),
            )
            .into());
        }
        if !quantile.is_finite() || !(0.0..=1.0).contains(&quantile) || quantile == 0.0 {
            return Err(DpValidationError::InvalidProbability {
                value: quantile,
                reason: "the upper-bound quantile must lie in (0, 1]".to_string(),
            }
            .into());
        }
        Ok(Self {
            iterations,
            quantile,
            policy,
        })
    }

    /// Sampler with the defaults used throughout: 95th-percentile bound on
    /// neighboring datasets
    pub fn with_iterations(iterations: usize) -> Result<Self, PrivacyError> {
        Self::new(iterations, 0.95, SamplingPolicy::SingleRecordChange)
    }

    /// Estimate the sensitivity of `query` over datasets of `sample_size`
    /// records drawn from `distribution`.
    pub fn sample_sensitivity<Q>(
        &self,
        query: Q,
        norm: &dyn SensitivityNorm,
        distribution: &dyn ProbabilityDistribution,
        sample_size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<SensitivityEstimate, PrivacyError>
    where
        Q: Fn(&DataValue) -> DataValue,
    {
        if sample_size == 0 {
            return Err(DpValidationError::InvalidQuery(
                "sensitivity sampling needs a sample size of at least 1".to_string(),
            )
            .into());
        }

        let mut distances = Vec::with_capacity(self.iterations);
        for _ in 0..self.iterations {
            let base = drawn(distribution, sample_size, rng)?;
            let neighbour = match self.policy {
                SamplingPolicy::SingleRecordChange => {
                    let mut neighbour = base.clone();
                    let replacement = drawn(distribution, 1, rng)?;
                    neighbour[rng.gen_range(0..sample_size)] = replacement[0];
                    neighbour
                }
                SamplingPolicy::IndependentPairs => drawn(distribution, sample_size, rng)?,
            };

            let out1 = query(&DataValue::Vector(base));
            let out2 = query(&DataValue::Vector(neighbour));
            distances.push(norm.compute(&out1, &out2));
        }

        let mean = distances.iter().sum::<f64>() / distances.len() as f64;

        let mut ordered = distances;
        ordered.sort_by(f64::total_cmp);
        let rank = ((self.quantile * ordered.len() as f64).ceil() as usize)
            .clamp(1, ordered.len())
            - 1;

        Ok(SensitivityEstimate {
            mean,
            upper_bound: ordered[rank],
        })
    }
}

/// Draw `size` records and hold the distribution to its contract
fn drawn(
    distribution: &dyn ProbabilityDistribution,
    size: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<f64>, PrivacyError> {
    let records = distribution.sample(size, rng)?;
    if records.len() != size {
        return Err(DpValidationError::InvalidQuery(format!(
            "the data distribution returned {} records for a request of {}",
            records.len(),
            size
        ))
        .into());
    }
    Ok(records)
}
