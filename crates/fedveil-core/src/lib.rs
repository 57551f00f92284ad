//! fedveil-core: differential-privacy access control for federated data
//!
//! Every read of a private value held by a participant flows through an
//! [`AccessDefinition`], so disclosure never exceeds a declared (ε, δ)
//! budget even across repeated, adaptively chosen queries.
//!
//! # Building blocks
//!
//! - Randomization mechanisms: [`LaplaceMechanism`], [`GaussianMechanism`],
//!   [`ExponentialMechanism`], [`RandomizedResponseCoins`],
//!   [`RandomizedResponseBinary`]
//! - Amplification by subsampling: [`SampleWithoutReplacement`],
//!   [`SampleWithReplacement`]
//! - Budget enforcement: [`AdaptiveDifferentialPrivacy`], an adaptive
//!   privacy filter with basic and advanced composition accounting
//! - Empirical calibration: [`SensitivitySampler`] with pluggable
//!   [`SensitivityNorm`]s and data distributions
//! - Orchestration: [`DataNode`] and [`FederatedData`]
//!
//! # Example
//!
//! ```rust
//! use fedveil_core::{DataNode, LaplaceMechanism};
//!
//! let mut node = DataNode::with_seed(7);
//! node.set_private_data("heights", vec![175.0, 162.0, 181.0]);
//! node.configure_data_access("heights", Box::new(LaplaceMechanism::new(1.0, 0.5)?));
//!
//! let release = node.query("heights")?;
//! assert_eq!(release.len(), 3);
//! # Ok::<(), fedveil_core::PrivacyError>(())
//! ```

pub mod access;
pub mod adaptive;
pub mod budget;
pub mod data;
pub mod distribution;
pub mod error;
pub mod federated;
pub mod mechanism;
pub mod node;
pub mod rng;
pub mod sampling;
pub mod sensitivity;
pub mod validation;

// Re-export the commonly used types for convenience
pub use access::{AccessDefinition, UnprotectedAccess};
pub use adaptive::AdaptiveDifferentialPrivacy;
pub use budget::PrivacyBudget;
pub use data::{DataValue, LabeledData};
pub use distribution::{EmpiricalDistribution, NormalDistribution, ProbabilityDistribution};
pub use error::PrivacyError;
pub use federated::{federate_array, FederatedData, FederatedDataRegistry};
pub use mechanism::{
    ExponentialMechanism, GaussianMechanism, LaplaceMechanism, RandomizedResponseBinary,
    RandomizedResponseCoins,
};
pub use node::DataNode;
pub use rng::rng_from_seed;
pub use sampling::{SampleWithReplacement, SampleWithoutReplacement};
pub use sensitivity::{
    L1SensitivityNorm, L2SensitivityNorm, SamplingPolicy, SensitivityEstimate, SensitivityNorm,
    SensitivitySampler,
};
pub use validation::DpValidationError;
