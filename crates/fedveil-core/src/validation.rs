//! Input validation for differential-privacy parameters
//!
//! Every parameter that reaches a mechanism or filter is validated here
//! before it is used, so a malformed budget can never silently weaken a
//! guarantee.
//!
//! # Parameter Constraints
//!
//! ## Epsilon (ε)
//! - Must be positive (> 0) and finite
//! - Smaller = more private, but more noise
//!
//! ## Delta (δ)
//! - Must be finite and in [0, 1]
//! - δ = 0 gives pure ε-DP (Laplace mechanism)
//! - Meaningful privacy requires δ < 1; the closed upper end exists so the
//!   analytic-Gaussian calibration with δ = 1 stays expressible
//!
//! ## Sensitivity (Δf)
//! - Must be positive (> 0) and finite
//! - Depends on the query type:
//!   - Count query: Δf = 1
//!   - Sum query: Δf = max_value
//!   - Average query: Δf = range / n

use serde::{Deserialize, Serialize};

/// Error type for DP parameter validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DpValidationError {
    /// Epsilon is invalid
    InvalidEpsilon { value: f64, reason: String },
    /// Delta is invalid
    InvalidDelta { value: f64, reason: String },
    /// Sensitivity is invalid
    InvalidSensitivity { value: f64, reason: String },
    /// A probability parameter is invalid
    InvalidProbability { value: f64, reason: String },
    /// Structural misuse of a query or access definition
    InvalidQuery(String),
}

impl std::fmt::Display for DpValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DpValidationError::InvalidEpsilon { value, reason } => {
                write!(f, "Invalid epsilon {}: {}", value, reason)
            }
            DpValidationError::InvalidDelta { value, reason } => {
                write!(f, "Invalid delta {}: {}", value, reason)
            }
            DpValidationError::InvalidSensitivity { value, reason } => {
                write!(f, "Invalid sensitivity {}: {}", value, reason)
            }
            DpValidationError::InvalidProbability { value, reason } => {
                write!(f, "Invalid probability {}: {}", value, reason)
            }
            DpValidationError::InvalidQuery(msg) => write!(f, "Invalid query: {}", msg),
        }
    }
}

impl std::error::Error for DpValidationError {}

/// Validate an epsilon parameter
///
/// # Constraints
/// - Must be finite
/// - Must be positive (> 0)
pub fn validate_epsilon(epsilon: f64) -> Result<(), DpValidationError> {
    if !epsilon.is_finite() {
        return Err(DpValidationError::InvalidEpsilon {
            value: epsilon,
            reason: "Epsilon must be a finite number".to_string(),
        });
    }

    if epsilon <= 0.0 {
        return Err(DpValidationError::InvalidEpsilon {
            value: epsilon,
            reason: "Epsilon must be positive".to_string(),
        });
    }

    Ok(())
}

/// Validate a delta parameter
///
/// # Constraints
/// - Must be finite
/// - Must be in [0, 1]
pub fn validate_delta(delta: f64) -> Result<(), DpValidationError> {
    if !delta.is_finite() {
        return Err(DpValidationError::InvalidDelta {
            value: delta,
            reason: "Delta must be a finite number".to_string(),
        });
    }

    if delta < 0.0 {
        return Err(DpValidationError::InvalidDelta {
            value: delta,
            reason: "Delta must be non-negative".to_string(),
        });
    }

    if delta > 1.0 {
        return Err(DpValidationError::InvalidDelta {
            value: delta,
            reason: "Delta must not exceed 1".to_string(),
        });
    }

    Ok(())
}

/// Validate a sensitivity parameter
///
/// # Constraints
/// - Must be finite
/// - Must be positive (> 0)
pub fn validate_sensitivity(sensitivity: f64) -> Result<(), DpValidationError> {
    if !sensitivity.is_finite() {
        return Err(DpValidationError::InvalidSensitivity {
            value: sensitivity,
            reason: "Sensitivity must be a finite number".to_string(),
        });
    }

    if sensitivity <= 0.0 {
        return Err(DpValidationError::InvalidSensitivity {
            value: sensitivity,
            reason: "Sensitivity must be positive".to_string(),
        });
    }

    Ok(())
}

/// Validate a probability parameter against `[0, 1]`
pub fn validate_probability(probability: f64) -> Result<(), DpValidationError> {
    if !probability.is_finite() {
        return Err(DpValidationError::InvalidProbability {
            value: probability,
            reason: "Probability must be a finite number".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&probability) {
        return Err(DpValidationError::InvalidProbability {
            value: probability,
            reason: "Probability must lie in [0, 1]".to_string(),
        });
    }

    Ok(())
}
