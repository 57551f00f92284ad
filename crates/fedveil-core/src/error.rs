//! Crate-level error type
//!
//! Two kinds of failure exist in this crate and both surface synchronously
//! to the immediate caller: parameter/usage validation errors and the
//! budget-exceeded rejection raised by an adaptive filter. Nothing here is
//! retried or suppressed; a surrounding orchestration layer decides whether
//! to abort, skip a participant, or retry with a cheaper mechanism.

use serde::{Deserialize, Serialize};

use crate::budget::PrivacyBudget;
use crate::validation::DpValidationError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PrivacyError {
    /// Malformed parameters or structural misuse, raised at the call that
    /// detects it (construction or apply time)
    Validation(DpValidationError),
    /// The adaptive filter refused a query that would exceed its global
    /// budget; carries the configured budget for diagnostics. The filter's
    /// history is rolled back before this is returned.
    BudgetExceeded { budget: PrivacyBudget },
}

impl std::fmt::Display for PrivacyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrivacyError::Validation(err) => write!(f, "{}", err),
            PrivacyError::BudgetExceeded { budget } => {
                write!(f, "Privacy budget {} has been exceeded", budget)
            }
        }
    }
}

impl std::error::Error for PrivacyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrivacyError::Validation(err) => Some(err),
            PrivacyError::BudgetExceeded { .. } => None,
        }
    }
}

impl From<DpValidationError> for PrivacyError {
    fn from(err: DpValidationError) -> Self {
        PrivacyError::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_exceeded_message_names_the_budget() {
        let budget = PrivacyBudget::new(1.0, 0.001).unwrap();
        let err = PrivacyError::BudgetExceeded { budget };
        let msg = err.to_string();
        assert!(msg.contains("exceeded"));
        assert!(msg.contains("ε=1"));
    }

    #[test]
    fn test_validation_errors_convert() {
        let err: PrivacyError = DpValidationError::InvalidQuery("boom".to_string()).into();
        assert!(matches!(err, PrivacyError::Validation(_)));
    }
}
