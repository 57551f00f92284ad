//! Access definitions
//!
//! An [`AccessDefinition`] is the capability through which a private value
//! may be read: it transforms the raw value into a releasable one and, if it
//! is differentially private, reports the (ε, δ) cost of one application.
//! Concrete definitions are the noise mechanisms, randomized response, the
//! subsampling wrappers, the adaptive filter, and [`UnprotectedAccess`].
//! Callers hold them behind this trait and never branch on the concrete
//! type.

use rand::RngCore;

use crate::budget::PrivacyBudget;
use crate::data::DataValue;
use crate::error::PrivacyError;

pub trait AccessDefinition {
    /// Transform a private value into its released form.
    ///
    /// Randomized definitions draw from `rng`; deterministic ones ignore it.
    fn apply(&mut self, data: &DataValue, rng: &mut dyn RngCore)
        -> Result<DataValue, PrivacyError>;

    /// The (ε, δ) cost of one application, or `None` for definitions that
    /// are not differentially private (cost-free, exempt from filtering).
    fn epsilon_delta(&self) -> Option<PrivacyBudget> {
        None
    }

    /// Apply with an optional per-call mechanism override.
    ///
    /// Definitions that do not support an override ignore the argument; the
    /// adaptive filter resolves it ahead of its configured default.
    fn apply_with(
        &mut self,
        data: &DataValue,
        mechanism: Option<&mut dyn AccessDefinition>,
        rng: &mut dyn RngCore,
    ) -> Result<DataValue, PrivacyError> {
        let _ = mechanism;
        self.apply(data, rng)
    }
}

/// Identity access: returns the value unchanged at no privacy cost.
///
/// The only definition exempt from budget filtering; attaching it to a
/// property means the property is deliberately public.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnprotectedAccess;

impl AccessDefinition for UnprotectedAccess {
    fn apply(
        &mut self,
        data: &DataValue,
        _rng: &mut dyn RngCore,
    ) -> Result<DataValue, PrivacyError> {
        Ok(data.clone())
    }
}
