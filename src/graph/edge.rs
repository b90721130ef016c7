//! Directed edges between contribution graph nodes

use super::address::{EdgeAddress, NodeAddress};
use serde::{Deserialize, Serialize};

/// A directed edge in the contribution graph
///
/// `src` and `dst` need not exist as nodes in the same graph: a plugin may
/// point at an entity owned by another plugin, and the edge is connected
/// once the graphs are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Canonical address
    pub address: EdgeAddress,
    /// Source node
    pub src: NodeAddress,
    /// Destination node
    pub dst: NodeAddress,
    /// Creation time in epoch millis
    pub timestamp_ms: i64,
}

impl Edge {
    pub fn new(address: EdgeAddress, src: NodeAddress, dst: NodeAddress, timestamp_ms: i64) -> Self {
        Self {
            address,
            src,
            dst,
            timestamp_ms,
        }
    }
}
