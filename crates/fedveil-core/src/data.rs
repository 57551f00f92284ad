//! Private payload types
//!
//! [`DataValue`] is the uniform value that mechanisms transform: a scalar,
//! a vector (element-wise treatment), or a labeled record pair. Labeled
//! payloads pass through [`crate::UnprotectedAccess`] unchanged but are
//! rejected by the numeric mechanisms.

use serde::{Deserialize, Serialize};

use crate::error::PrivacyError;
use crate::validation::DpValidationError;

/// A private value held by a data node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    Scalar(f64),
    Vector(Vec<f64>),
    Labeled(Box<LabeledData>),
}

/// A (data, label) record pair with independently mutable fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledData {
    pub data: DataValue,
    pub label: DataValue,
}

impl LabeledData {
    pub fn new(data: DataValue, label: DataValue) -> Self {
        Self { data, label }
    }
}

impl DataValue {
    /// Number of elements along the first axis (1 for a scalar; the inner
    /// data length for a labeled pair)
    pub fn len(&self) -> usize {
        match self {
            DataValue::Scalar(_) => 1,
            DataValue::Vector(values) => values.len(),
            DataValue::Labeled(labeled) => labeled.data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, DataValue::Scalar(_))
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            DataValue::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            DataValue::Vector(values) => Some(values),
            _ => None,
        }
    }

    /// Numeric elements of the value. Labeled pairs expose the elements of
    /// their data component.
    pub fn elements(&self) -> Vec<f64> {
        match self {
            DataValue::Scalar(value) => vec![*value],
            DataValue::Vector(values) => values.clone(),
            DataValue::Labeled(labeled) => labeled.data.elements(),
        }
    }

    /// Apply a fallible transformation to each numeric element, preserving
    /// shape. Labeled payloads are rejected: randomization acts on plain
    /// numeric data only.
    pub(crate) fn try_map_elements<F>(
        &self,
        mechanism: &str,
        mut op: F,
    ) -> Result<DataValue, PrivacyError>
    where
        F: FnMut(f64) -> Result<f64, PrivacyError>,
    {
        match self {
            DataValue::Scalar(value) => Ok(DataValue::Scalar(op(*value)?)),
            DataValue::Vector(values) => {
                let mut released = Vec::with_capacity(values.len());
                for value in values {
                    released.push(op(*value)?);
                }
                Ok(DataValue::Vector(released))
            }
            DataValue::Labeled(_) => Err(DpValidationError::InvalidQuery(format!(
                "{} operates on scalar or vector data, not labeled records",
                mechanism
            ))
            .into()),
        }
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Scalar(value)
    }
}

impl From<Vec<f64>> for DataValue {
    fn from(values: Vec<f64>) -> Self {
        DataValue::Vector(values)
    }
}

impl From<&[f64]> for DataValue {
    fn from(values: &[f64]) -> Self {
        DataValue::Vector(values.to_vec())
    }
}

impl From<LabeledData> for DataValue {
    fn from(labeled: LabeledData) -> Self {
        DataValue::Labeled(Box::new(labeled))
    }
}
