//! Federated data
//!
//! A [`FederatedData`] groups the nodes holding shards of one logical
//! dataset and broadcasts configuration and queries to them in insertion
//! order. Dataset identifiers are unique for the life of the process,
//! enforced through an explicit [`FederatedDataRegistry`] owned by the
//! caller instead of hidden global state, so independent setups (and tests)
//! cannot collide.

use std::collections::HashSet;

use crate::access::AccessDefinition;
use crate::data::DataValue;
use crate::error::PrivacyError;
use crate::node::DataNode;
use crate::validation::DpValidationError;

/// Tracks which federated-data identifiers are in use
#[derive(Debug, Default)]
pub struct FederatedDataRegistry {
    identifiers: HashSet<String>,
}

impl FederatedDataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, identifier: &str) -> Result<(), PrivacyError> {
        if !self.identifiers.insert(identifier.to_string()) {
            return Err(DpValidationError::InvalidQuery(format!(
                "federated data identifier '{}' is already in use",
                identifier
            ))
            .into());
        }
        Ok(())
    }
}

/// An ordered collection of nodes sharing one logical dataset
pub struct FederatedData {
    identifier: String,
    nodes: Vec<DataNode>,
}

impl FederatedData {
    /// Claims `identifier` in the registry; reusing one fails.
    pub fn new(
        registry: &mut FederatedDataRegistry,
        identifier: &str,
    ) -> Result<Self, PrivacyError> {
        registry.register(identifier)?;
        Ok(Self {
            identifier: identifier.to_string(),
            nodes: Vec::new(),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Bind `data` to the federation's identifier on `node` and take
    /// ownership of the node
    pub fn add_data_node(&mut self, mut node: DataNode, data: impl Into<DataValue>) {
        node.set_private_data(&self.identifier, data);
        self.nodes.push(node);
    }

    /// Configure data access on every node, in insertion order.
    ///
    /// The factory builds one definition per node: stateful definitions
    /// (adaptive filters) keep one history per node rather than aliasing a
    /// single history across the federation.
    pub fn configure_data_access<F>(&mut self, mut factory: F)
    where
        F: FnMut() -> Box<dyn AccessDefinition>,
    {
        let name = self.identifier.clone();
        for node in &mut self.nodes {
            node.configure_data_access(&name, factory());
        }
    }

    /// Query every node in insertion order, failing fast on the first error
    pub fn query(&mut self) -> Result<Vec<DataValue>, PrivacyError> {
        let name = self.identifier.clone();
        self.nodes.iter_mut().map(|node| node.query(&name)).collect()
    }

    /// Mutate every node's shard in place, in insertion order
    pub fn apply_transformation<F>(&mut self, mut transform: F) -> Result<(), PrivacyError>
    where
        F: FnMut(&mut DataValue),
    {
        let name = self.identifier.clone();
        for node in &mut self.nodes {
            node.apply_data_transformation(&name, &mut transform)?;
        }
        Ok(())
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut DataNode> {
        self.nodes.get_mut(index)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DataNode> {
        self.nodes.iter_mut()
    }
}

/// Split a flat array across `num_nodes` fresh nodes under `identifier`.
///
/// Shards are contiguous slices produced by fractional stepping, so uneven
/// lengths distribute their remainder across the tail shards.
pub fn federate_array(
    registry: &mut FederatedDataRegistry,
    identifier: &str,
    values: &[f64],
    num_nodes: usize,
) -> Result<FederatedData, PrivacyError> {
    if num_nodes == 0 {
        return Err(DpValidationError::InvalidQuery(
            "an array must be federated across at least one node".to_string(),
        )
        .into());
    }

    let mut federated = FederatedData::new(registry, identifier)?;
    let split_size = values.len() as f64 / num_nodes as f64;
    let mut last = 0.0;
    while last < values.len() as f64 {
        let start = last as usize;
        let end = ((last + split_size) as usize).min(values.len());
        federated.add_data_node(DataNode::new(), &values[start..end]);
        last += split_size;
    }

    Ok(federated)
}
