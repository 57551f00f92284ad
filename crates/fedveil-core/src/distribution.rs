//! Sampling distributions for sensitivity estimation
//!
//! A [`ProbabilityDistribution`] stands in for the data-generating process
//! when a query's sensitivity is estimated empirically rather than derived
//! analytically.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::PrivacyError;
use crate::rng::standard_normal;
use crate::validation::DpValidationError;

pub trait ProbabilityDistribution {
    /// Draw `size` records. Fails when the distribution cannot produce the
    /// requested sample size.
    fn sample(&self, size: usize, rng: &mut dyn RngCore) -> Result<Vec<f64>, PrivacyError>;
}

/// Normal distribution N(mean, std_dev²)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalDistribution {
    mean: f64,
    std_dev: f64,
}

impl NormalDistribution {
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, PrivacyError> {
        if !std_dev.is_finite() || std_dev <= 0.0 {
            return Err(DpValidationError::InvalidQuery(
                "the standard deviation must be positive and finite".to_string(),
            )
            .into());
        }
        Ok(Self { mean, std_dev })
    }
}

impl ProbabilityDistribution for NormalDistribution {
    fn sample(&self, size: usize, rng: &mut dyn RngCore) -> Result<Vec<f64>, PrivacyError> {
        Ok((0..size)
            .map(|_| self.mean + self.std_dev * standard_normal(rng))
            .collect())
    }
}

/// Resamples a fixed pool of records without replacement.
///
/// Can only produce samples up to the pool size; larger requests fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpiricalDistribution {
    values: Vec<f64>,
}

impl EmpiricalDistribution {
    pub fn new(values: Vec<f64>) -> Result<Self, PrivacyError> {
        if values.is_empty() {
            return Err(DpValidationError::InvalidQuery(
                "an empirical distribution needs at least one record".to_string(),
            )
            .into());
        }
        Ok(Self { values })
    }
}

impl ProbabilityDistribution for EmpiricalDistribution {
    fn sample(&self, size: usize, rng: &mut dyn RngCore) -> Result<Vec<f64>, PrivacyError> {
        if size > self.values.len() {
            return Err(DpValidationError::InvalidQuery(format!(
                "cannot draw {} records from an empirical pool of {}",
                size,
                self.values.len()
            ))
            .into());
        }
        let indices = rand::seq::index::sample(rng, self.values.len(), size);
        Ok(indices.iter().map(|i| self.values[i]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::rng_from_seed;

    #[test]
    fn test_normal_parameters() {
        assert!(NormalDistribution::new(0.0, 1.0).is_ok());
        assert!(NormalDistribution::new(0.0, 0.0).is_err());
        assert!(NormalDistribution::new(0.0, -1.0).is_err());
    }

    #[test]
    fn test_normal_sample_statistics() {
        let mut rng = rng_from_seed(Some(61));
        let distribution = NormalDistribution::new(175.0, 7.0).unwrap();

        let samples = distribution.sample(10_000, &mut rng).unwrap();
        let mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((mean - 175.0).abs() < 0.5, "Mean {} too far from 175", mean);
    }

    #[test]
    fn test_empirical_pool_limits() {
        let mut rng = rng_from_seed(Some(62));
        let distribution = EmpiricalDistribution::new(vec![1.0, 2.0, 3.0]).unwrap();

        assert_eq!(distribution.sample(3, &mut rng).unwrap().len(), 3);
        assert!(distribution.sample(4, &mut rng).is_err());
        assert!(EmpiricalDistribution::new(vec![]).is_err());
    }
}
