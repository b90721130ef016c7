//! Cred graphs: the scored output of a CredRank run

use crate::graph::{EdgeAddress, EdgeWeight, NodeAddress};
use crate::ledger::identity_prefix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredNode {
    pub address: NodeAddress,
    pub description: String,
    pub cred: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredEdge {
    pub address: EdgeAddress,
    pub src: NodeAddress,
    pub dst: NodeAddress,
    pub weight: EdgeWeight,
}

/// Scored contribution graph.
///
/// Identity nodes (under the ledger's identity prefix) are the participants
/// cred flows to; everything else is a contribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredGraph {
    pub nodes: Vec<CredNode>,
    pub edges: Vec<CredEdge>,
}

impl CredGraph {
    pub fn participants(&self) -> impl Iterator<Item = &CredNode> {
        let prefix = identity_prefix();
        self.nodes.iter().filter(move |n| n.address.has_prefix(&prefix))
    }

    pub fn total_cred(&self) -> f64 {
        self.nodes.iter().map(|n| n.cred).sum()
    }
}
