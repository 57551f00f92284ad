//! Amplification by subsampling
//!
//! Each wrapper draws a sample of the configured size from the queried data
//! and delegates to the wrapped mechanism on the sample alone. Because the
//! mechanism only ever sees a random fraction of the records, its effective
//! (ε, δ) cost shrinks by the closed-form amplification bounds:
//!
//! ```text
//! ε' = ln(1 + p · (e^ε − 1))
//! ```
//!
//! with p = m/n without replacement and p = 1 − (1 − 1/n)^m with
//! replacement. The cost reported by `epsilon_delta` is computed from the
//! declared data shape, never measured.

use rand::{Rng, RngCore};

use crate::access::AccessDefinition;
use crate::budget::PrivacyBudget;
use crate::data::DataValue;
use crate::error::PrivacyError;
use crate::validation::DpValidationError;

/// Subsample without replacement, then delegate to the wrapped mechanism
pub struct SampleWithoutReplacement {
    mechanism: Box<dyn AccessDefinition>,
    sample_size: usize,
    actual_sample_size: usize,
    total_size: usize,
}

/// Subsample with replacement, then delegate to the wrapped mechanism
pub struct SampleWithReplacement {
    mechanism: Box<dyn AccessDefinition>,
    sample_size: usize,
    actual_sample_size: usize,
    total_size: usize,
}

impl SampleWithoutReplacement {
    /// `data_shape` is the declared shape of the data this wrapper will be
    /// asked to sample; `sample_size` counts first-axis entries and must
    /// not exceed `data_shape[0]`.
    pub fn new(
        mechanism: Box<dyn AccessDefinition>,
        sample_size: usize,
        data_shape: &[usize],
    ) -> Result<Self, PrivacyError> {
        let (actual_sample_size, total_size) =
            check_wrapper_params(&*mechanism, sample_size, data_shape)?;
        Ok(Self {
            mechanism,
            sample_size,
            actual_sample_size,
            total_size,
        })
    }
}

impl SampleWithReplacement {
    /// Same construction contract as [`SampleWithoutReplacement::new`].
    pub fn new(
        mechanism: Box<dyn AccessDefinition>,
        sample_size: usize,
        data_shape: &[usize],
    ) -> Result<Self, PrivacyError> {
        let (actual_sample_size, total_size) =
            check_wrapper_params(&*mechanism, sample_size, data_shape)?;
        Ok(Self {
            mechanism,
            sample_size,
            actual_sample_size,
            total_size,
        })
    }
}

impl AccessDefinition for SampleWithoutReplacement {
    fn apply(
        &mut self,
        data: &DataValue,
        rng: &mut dyn RngCore,
    ) -> Result<DataValue, PrivacyError> {
        let values = sampled_values(data, self.sample_size)?;
        let indices = rand::seq::index::sample(rng, values.len(), self.sample_size);
        let sample: Vec<f64> = indices.iter().map(|i| values[i]).collect();
        self.mechanism.apply(&DataValue::Vector(sample), rng)
    }

    fn epsilon_delta(&self) -> Option<PrivacyBudget> {
        let inner = self.mechanism.epsilon_delta()?;
        let proportion = self.actual_sample_size as f64 / self.total_size as f64;
        Some(PrivacyBudget::new_unchecked(
            amplified_epsilon(inner.epsilon(), proportion),
            proportion * inner.delta(),
        ))
    }
}

impl AccessDefinition for SampleWithReplacement {
    fn apply(
        &mut self,
        data: &DataValue,
        rng: &mut dyn RngCore,
    ) -> Result<DataValue, PrivacyError> {
        let values = sampled_values(data, self.sample_size)?;
        let sample: Vec<f64> = (0..self.sample_size)
            .map(|_| values[rng.gen_range(0..values.len())])
            .collect();
        self.mechanism.apply(&DataValue::Vector(sample), rng)
    }

    fn epsilon_delta(&self) -> Option<PrivacyBudget> {
        let inner = self.mechanism.epsilon_delta()?;
        let n = self.total_size as f64;
        let proportion = 1.0 - (1.0 - 1.0 / n).powf(self.actual_sample_size as f64);
        Some(PrivacyBudget::new_unchecked(
            amplified_epsilon(inner.epsilon(), proportion),
            inner.delta() * binomial_hit_mass(self.actual_sample_size, self.total_size),
        ))
    }
}

fn check_wrapper_params(
    mechanism: &dyn AccessDefinition,
    sample_size: usize,
    data_shape: &[usize],
) -> Result<(usize, usize), PrivacyError> {
    if mechanism.epsilon_delta().is_none() {
        return Err(DpValidationError::InvalidQuery(
            "subsampling can only wrap a differentially private mechanism".to_string(),
        )
        .into());
    }
    let (&first_axis, trailing) = match data_shape.split_first() {
        Some(split) => split,
        None => {
            return Err(DpValidationError::InvalidQuery(
                "the declared data shape must have at least one axis".to_string(),
            )
            .into())
        }
    };
    if sample_size == 0 {
        return Err(DpValidationError::InvalidQuery(
            "the sample size must be at least 1".to_string(),
        )
        .into());
    }
    if sample_size > first_axis {
        return Err(DpValidationError::InvalidQuery(format!(
            "sample size {} must not exceed the first-axis extent {}",
            sample_size, first_axis
        ))
        .into());
    }

    // Flatten trailing axes: sampling one first-axis entry touches all of
    // its trailing elements
    let trailing_len: usize = trailing.iter().product();
    Ok((sample_size * trailing_len, first_axis * trailing_len))
}

fn sampled_values<'d>(
    data: &'d DataValue,
    sample_size: usize,
) -> Result<&'d [f64], PrivacyError> {
    let values = data.as_vector().ok_or_else(|| {
        DpValidationError::InvalidQuery(
            "subsampling requires vector-shaped data".to_string(),
        )
    })?;
    if values.len() < sample_size {
        return Err(DpValidationError::InvalidQuery(format!(
            "cannot draw a sample of {} from {} records",
            sample_size,
            values.len()
        ))
        .into());
    }
    Ok(values)
}

fn amplified_epsilon(epsilon: f64, proportion: f64) -> f64 {
    (1.0 + proportion * (epsilon.exp() - 1.0)).ln()
}

/// Σ_{k=1}^{m} C(m,k)·(1/n)^k·(1−1/n)^(m−k)
///
/// Accumulated with the term recurrence t_{k+1} = t_k·(m−k)/(k+1)·ratio so
/// the binomial coefficients never materialize (they overflow factorials
/// already for m in the low thousands).
fn binomial_hit_mass(m: usize, n: usize) -> f64 {
    if n == 1 {
        return 1.0;
    }
    let hit = 1.0 / n as f64;
    let miss = 1.0 - hit;
    let ratio = hit / miss;

    let mut term = m as f64 * hit * miss.powf((m - 1) as f64);
    let mut sum = 0.0;
    for k in 1..=m {
        sum += term;
        term *= (m - k) as f64 / (k + 1) as f64 * ratio;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::UnprotectedAccess;
    use crate::mechanism::{GaussianMechanism, LaplaceMechanism};
    use crate::rng::rng_from_seed;

    fn gaussian(epsilon: f64, delta: f64) -> Box<dyn AccessDefinition> {
        Box::new(
            GaussianMechanism::new(1.0, PrivacyBudget::new(epsilon, delta).unwrap()).unwrap(),
        )
    }

    #[test]
    fn test_wrapping_non_dp_definition_fails() {
        let result = SampleWithoutReplacement::new(Box::new(UnprotectedAccess), 1, &[10]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sample_size_must_fit_first_axis() {
        assert!(SampleWithoutReplacement::new(gaussian(0.5, 1e-3), 11, &[10]).is_err());
        assert!(SampleWithReplacement::new(gaussian(0.5, 1e-3), 11, &[10, 100]).is_err());
        assert!(SampleWithoutReplacement::new(gaussian(0.5, 1e-3), 0, &[10]).is_err());
        assert!(SampleWithoutReplacement::new(gaussian(0.5, 1e-3), 10, &[10]).is_ok());
    }

    #[test]
    fn test_without_replacement_reduction_closed_form() {
        let epsilon = 0.5;
        let delta = 1e-3;
        let wrapper =
            SampleWithoutReplacement::new(gaussian(epsilon, delta), 25, &[100]).unwrap();

        let reduced = wrapper.epsilon_delta().unwrap();
        let p = 25.0 / 100.0;
        let expected_epsilon = (1.0 + p * (epsilon.exp() - 1.0)).ln();
        assert!((reduced.epsilon() - expected_epsilon).abs() < 1e-12);
        assert!((reduced.delta() - p * delta).abs() < 1e-15);
        assert!(reduced.epsilon() < epsilon);
    }

    #[test]
    fn test_multidimensional_shape_is_flattened() {
        let epsilon = 0.5;
        let wrapper =
            SampleWithoutReplacement::new(gaussian(epsilon, 1e-3), 2, &[10, 3]).unwrap();

        // actual sample 2·3 = 6 of 30 flattened records
        let reduced = wrapper.epsilon_delta().unwrap();
        let p = 6.0 / 30.0;
        let expected_epsilon = (1.0 + p * (epsilon.exp() - 1.0)).ln();
        assert!((reduced.epsilon() - expected_epsilon).abs() < 1e-12);
    }

    #[test]
    fn test_with_replacement_delta_matches_hit_probability() {
        let delta = 1e-3;
        let wrapper = SampleWithReplacement::new(gaussian(0.5, delta), 25, &[100]).unwrap();

        let reduced = wrapper.epsilon_delta().unwrap();
        // The binomial series sums to the per-record hit probability
        let p = 1.0 - (1.0 - 1.0 / 100.0_f64).powf(25.0);
        assert!((reduced.delta() - delta * p).abs() < 1e-12);
    }

    #[test]
    fn test_binomial_hit_mass_large_sample_stays_finite() {
        // The factorial form of C(2500, k) overflows; the recurrence must not
        let mass = binomial_hit_mass(2500, 10_000);
        let expected = 1.0 - (1.0 - 1.0 / 10_000.0_f64).powf(2500.0);
        assert!(mass.is_finite());
        assert!((mass - expected).abs() < 1e-9);
    }

    #[test]
    fn test_apply_delegates_on_a_sample() {
        let mut rng = rng_from_seed(Some(41));
        let laplace = Box::new(LaplaceMechanism::new(1.0, 1.0).unwrap());
        let mut wrapper = SampleWithoutReplacement::new(laplace, 10, &[100]).unwrap();

        let data = DataValue::Vector((0..100).map(|i| i as f64).collect());
        let released = wrapper.apply(&data, &mut rng).unwrap();
        assert_eq!(released.as_vector().unwrap().len(), 10);
    }

    #[test]
    fn test_apply_rejects_scalar_and_short_data() {
        let mut rng = rng_from_seed(Some(42));
        let laplace = Box::new(LaplaceMechanism::new(1.0, 1.0).unwrap());
        let mut wrapper = SampleWithReplacement::new(laplace, 10, &[100]).unwrap();

        assert!(wrapper.apply(&DataValue::Scalar(1.0), &mut rng).is_err());
        assert!(wrapper
            .apply(&DataValue::Vector(vec![1.0; 5]), &mut rng)
            .is_err());
    }
}
