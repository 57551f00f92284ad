//! Differentially private randomization mechanisms
//!
//! Each mechanism implements [`crate::AccessDefinition`]: it transforms a
//! value into a differentially private release and reports its own (ε, δ)
//! cost. Mechanisms act uniformly on scalars and vectors; noise mechanisms
//! perturb each element independently, randomized response flips each
//! element independently, and the exponential mechanism draws from its
//! output range per repetition.

pub mod exponential;
pub mod gaussian;
pub mod laplace;
pub mod randomized_response;

pub use exponential::ExponentialMechanism;
pub use gaussian::GaussianMechanism;
pub use laplace::LaplaceMechanism;
pub use randomized_response::{RandomizedResponseBinary, RandomizedResponseCoins};

use crate::data::DataValue;
use crate::error::PrivacyError;
use crate::validation::DpValidationError;

/// Reject inputs that are not strictly binary (every element exactly 0 or 1)
pub(crate) fn ensure_binary(data: &DataValue, mechanism: &str) -> Result<(), PrivacyError> {
    let binary = match data {
        DataValue::Scalar(value) => *value == 0.0 || *value == 1.0,
        DataValue::Vector(values) => values.iter().all(|v| *v == 0.0 || *v == 1.0),
        DataValue::Labeled(_) => false,
    };
    if binary {
        Ok(())
    } else {
        Err(DpValidationError::InvalidQuery(format!(
            "{} requires strictly binary input (every element 0 or 1)",
            mechanism
        ))
        .into())
    }
}
