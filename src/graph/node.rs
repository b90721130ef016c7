//! Node representation in the contribution graph

use super::address::NodeAddress;
use serde::{Deserialize, Serialize};

/// A node in the contribution graph
///
/// Nodes are contributions (posts, pull requests, initiatives) or
/// participants. The address is the node's identity; two nodes with the same
/// address must agree on every other field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Canonical address
    pub address: NodeAddress,
    /// Human-readable description (markdown)
    pub description: String,
    /// Creation time in epoch millis; `None` for timeless nodes such as users
    pub timestamp_ms: Option<i64>,
}

impl Node {
    pub fn new(address: NodeAddress, description: impl Into<String>) -> Self {
        Self {
            address,
            description: description.into(),
            timestamp_ms: None,
        }
    }

    /// Set the creation timestamp
    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }
}
