//! Data nodes
//!
//! A [`DataNode`] is one protocol participant: it owns private payloads
//! bound to property names and routes every read through the access
//! definition configured for that property. The raw value never leaves the
//! node except as the output of an `apply`.

use std::collections::HashMap;

use rand_chacha::ChaCha20Rng;

use crate::access::AccessDefinition;
use crate::data::DataValue;
use crate::error::PrivacyError;
use crate::rng::rng_from_seed;
use crate::validation::DpValidationError;

pub struct DataNode {
    private_data: HashMap<String, DataValue>,
    access_policies: HashMap<String, Box<dyn AccessDefinition>>,
    rng: ChaCha20Rng,
}

impl DataNode {
    /// Node drawing randomness from OS entropy
    pub fn new() -> Self {
        Self::build(rng_from_seed(None))
    }

    /// Node with a pinned generator, for reproducible runs and tests
    pub fn with_seed(seed: u64) -> Self {
        Self::build(rng_from_seed(Some(seed)))
    }

    fn build(rng: ChaCha20Rng) -> Self {
        Self {
            private_data: HashMap::new(),
            access_policies: HashMap::new(),
            rng,
        }
    }

    /// Bind a private value to a property name.
    ///
    /// Rebinding an existing name replaces the value wholesale; the
    /// configured access definition for the name is kept.
    pub fn set_private_data(&mut self, name: &str, value: impl Into<DataValue>) {
        self.private_data.insert(name.to_string(), value.into());
    }

    /// Replace the access definition for a property wholesale
    pub fn configure_data_access(&mut self, name: &str, definition: Box<dyn AccessDefinition>) {
        self.access_policies.insert(name.to_string(), definition);
    }

    /// Query a property through its configured access definition
    pub fn query(&mut self, name: &str) -> Result<DataValue, PrivacyError> {
        self.query_with(name, None)
    }

    /// Query with an optional per-call mechanism override.
    ///
    /// The override reaches only definitions that accept one (the adaptive
    /// filter); other definitions ignore it.
    pub fn query_with(
        &mut self,
        name: &str,
        mechanism: Option<&mut dyn AccessDefinition>,
    ) -> Result<DataValue, PrivacyError> {
        let data = self.private_data.get(name).ok_or_else(|| {
            DpValidationError::InvalidQuery(format!(
                "no private data is bound to property '{}'",
                name
            ))
        })?;
        let policy = self.access_policies.get_mut(name).ok_or_else(|| {
            DpValidationError::InvalidQuery(format!(
                "data access for property '{}' has not been configured",
                name
            ))
        })?;
        policy.apply_with(data, mechanism, &mut self.rng)
    }

    /// Mutate a private value in place without releasing it
    pub fn apply_data_transformation<F>(&mut self, name: &str, transform: F) -> Result<(), PrivacyError>
    where
        F: FnOnce(&mut DataValue),
    {
        let data = self.private_data.get_mut(name).ok_or_else(|| {
            DpValidationError::InvalidQuery(format!(
                "no private data is bound to property '{}'",
                name
            ))
        })?;
        transform(data);
        Ok(())
    }

    /// Names of the bound properties (values stay private)
    pub fn private_property_names(&self) -> impl Iterator<Item = &str> {
        self.private_data.keys().map(String::as_str)
    }
}

impl Default for DataNode {
    fn default() -> Self {
        Self::new()
    }
}
