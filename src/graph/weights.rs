//! Prefix-keyed node and edge weights

use super::address::{EdgeAddress, NodeAddress};
use super::structure::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weight of an edge in each direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeight {
    pub forwards: f64,
    pub backwards: f64,
}

impl EdgeWeight {
    pub fn new(forwards: f64, backwards: f64) -> Self {
        Self { forwards, backwards }
    }
}

impl Default for EdgeWeight {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Weights keyed by address prefix.
///
/// The effective weight of an address is the product of the weights of every
/// prefix that matches it; unmatched addresses weigh 1.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    #[serde(default, with = "as_pairs")]
    pub node_weights: BTreeMap<NodeAddress, f64>,
    #[serde(default, with = "as_pairs")]
    pub edge_weights: BTreeMap<EdgeAddress, EdgeWeight>,
}

impl Weights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_weight(mut self, prefix: NodeAddress, weight: f64) -> Self {
        self.node_weights.insert(prefix, weight);
        self
    }

    pub fn with_edge_weight(mut self, prefix: EdgeAddress, weight: EdgeWeight) -> Self {
        self.edge_weights.insert(prefix, weight);
        self
    }

    pub fn node_weight(&self, address: &NodeAddress) -> f64 {
        self.node_weights
            .iter()
            .filter(|(prefix, _)| address.has_prefix(prefix))
            .map(|(_, w)| *w)
            .product()
    }

    pub fn edge_weight(&self, address: &EdgeAddress) -> EdgeWeight {
        self.edge_weights
            .iter()
            .filter(|(prefix, _)| address.has_prefix(prefix))
            .fold(EdgeWeight::default(), |acc, (_, w)| {
                EdgeWeight::new(acc.forwards * w.forwards, acc.backwards * w.backwards)
            })
    }

    /// Merge `other` into these weights. The same prefix with a different
    /// value is a conflict.
    pub fn merge(&mut self, other: &Weights) -> GraphResult<()> {
        for (prefix, weight) in &other.node_weights {
            match self.node_weights.get(prefix) {
                Some(existing) if existing != weight => {
                    return Err(GraphError::ConflictingNodeWeight(prefix.clone()))
                }
                _ => {
                    self.node_weights.insert(prefix.clone(), *weight);
                }
            }
        }
        for (prefix, weight) in &other.edge_weights {
            match self.edge_weights.get(prefix) {
                Some(existing) if existing != weight => {
                    return Err(GraphError::ConflictingEdgeWeight(prefix.clone()))
                }
                _ => {
                    self.edge_weights.insert(prefix.clone(), *weight);
                }
            }
        }
        Ok(())
    }

    /// Apply `overrides` on top of these weights, replacing matching prefixes.
    pub fn overridden_by(mut self, overrides: &Weights) -> Self {
        for (prefix, weight) in &overrides.node_weights {
            self.node_weights.insert(prefix.clone(), *weight);
        }
        for (prefix, weight) in &overrides.edge_weights {
            self.edge_weights.insert(prefix.clone(), *weight);
        }
        self
    }
}

/// Address keys are sequences, so maps serialize as `[[prefix, weight], ...]`.
mod as_pairs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let pairs: Vec<(K, V)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
