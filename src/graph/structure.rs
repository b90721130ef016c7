//! Graph: address-keyed nodes and edges

use super::address::{EdgeAddress, NodeAddress};
use super::edge::Edge;
use super::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised when graph contents disagree
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("conflicting node at {0}")]
    ConflictingNode(NodeAddress),

    #[error("conflicting edge at {0}")]
    ConflictingEdge(EdgeAddress),

    #[error("conflicting node weight for prefix {0}")]
    ConflictingNodeWeight(NodeAddress),

    #[error("conflicting edge weight for prefix {0}")]
    ConflictingEdgeWeight(EdgeAddress),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// A directed multigraph keyed by address.
///
/// Iteration order is address order, so two graphs with equal contents
/// serialize identically regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct Graph {
    nodes: BTreeMap<NodeAddress, Node>,
    edges: BTreeMap<EdgeAddress, Edge>,
}

/// Wire form of a graph: plain node and edge lists.
#[derive(Serialize, Deserialize)]
struct GraphData {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl TryFrom<GraphData> for Graph {
    type Error = GraphError;

    fn try_from(data: GraphData) -> GraphResult<Self> {
        let mut graph = Graph::new();
        for node in data.nodes {
            graph.add_node(node)?;
        }
        for edge in data.edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }
}

impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        Self {
            nodes: graph.nodes.into_values().collect(),
            edges: graph.edges.into_values().collect(),
        }
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Re-adding an identical node is a no-op.
    pub fn add_node(&mut self, node: Node) -> GraphResult<()> {
        match self.nodes.get(&node.address) {
            Some(existing) if *existing == node => Ok(()),
            Some(_) => Err(GraphError::ConflictingNode(node.address)),
            None => {
                self.nodes.insert(node.address.clone(), node);
                Ok(())
            }
        }
    }

    /// Add an edge. Re-adding an identical edge is a no-op.
    pub fn add_edge(&mut self, edge: Edge) -> GraphResult<()> {
        match self.edges.get(&edge.address) {
            Some(existing) if *existing == edge => Ok(()),
            Some(_) => Err(GraphError::ConflictingEdge(edge.address)),
            None => {
                self.edges.insert(edge.address.clone(), edge);
                Ok(())
            }
        }
    }

    pub fn node(&self, address: &NodeAddress) -> Option<&Node> {
        self.nodes.get(address)
    }

    pub fn edge(&self, address: &EdgeAddress) -> Option<&Edge> {
        self.edges.get(address)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges whose endpoints are both present in this graph
    pub fn connected_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .values()
            .filter(|e| self.nodes.contains_key(&e.src) && self.nodes.contains_key(&e.dst))
    }

    /// Merge `other` into this graph.
    pub fn merge(&mut self, other: &Graph) -> GraphResult<()> {
        for node in other.nodes() {
            self.add_node(node.clone())?;
        }
        for edge in other.edges() {
            self.add_edge(edge.clone())?;
        }
        Ok(())
    }
}
