//! Plugin declarations: the node and edge taxonomy a plugin produces

use crate::graph::{EdgeAddress, EdgeWeight, NodeAddress, Weights};
use serde::{Deserialize, Serialize};

/// A kind of node a plugin emits, identified by address prefix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    pub name: String,
    pub plural_name: String,
    pub prefix: NodeAddress,
    pub default_weight: f64,
    #[serde(default)]
    pub description: String,
}

/// A kind of edge a plugin emits, identified by address prefix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeType {
    /// e.g. "authors"
    pub forward_name: String,
    /// e.g. "is authored by"
    pub backward_name: String,
    pub prefix: EdgeAddress,
    pub default_weight: EdgeWeight,
    #[serde(default)]
    pub description: String,
}

/// Static metadata describing a plugin's output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDeclaration {
    pub name: String,
    pub node_prefix: NodeAddress,
    pub edge_prefix: EdgeAddress,
    pub node_types: Vec<NodeType>,
    pub edge_types: Vec<EdgeType>,
    /// Node types that represent participants rather than contributions
    #[serde(default)]
    pub user_types: Vec<NodeType>,
}

impl PluginDeclaration {
    /// Weights implied by the declared types' defaults.
    pub fn default_weights(&self) -> Weights {
        let mut weights = Weights::new();
        for node_type in self.node_types.iter().chain(&self.user_types) {
            weights
                .node_weights
                .insert(node_type.prefix.clone(), node_type.default_weight);
        }
        for edge_type in &self.edge_types {
            weights
                .edge_weights
                .insert(edge_type.prefix.clone(), edge_type.default_weight);
        }
        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_cover_every_type() {
        let node_prefix = NodeAddress::from_parts(["example", "forum"]).unwrap();
        let edge_prefix = EdgeAddress::from_parts(["example", "forum"]).unwrap();
        let declaration = PluginDeclaration {
            name: "Forum".into(),
            node_prefix: node_prefix.clone(),
            edge_prefix: edge_prefix.clone(),
            node_types: vec![NodeType {
                name: "Topic".into(),
                plural_name: "Topics".into(),
                prefix: node_prefix.append("TOPIC").unwrap(),
                default_weight: 2.0,
                description: String::new(),
            }],
            edge_types: vec![EdgeType {
                forward_name: "references".into(),
                backward_name: "is referenced by".into(),
                prefix: edge_prefix.append("REFERENCES").unwrap(),
                default_weight: EdgeWeight::new(1.0, 0.0),
                description: String::new(),
            }],
            user_types: vec![NodeType {
                name: "User".into(),
                plural_name: "Users".into(),
                prefix: node_prefix.append("USER").unwrap(),
                default_weight: 0.0,
                description: String::new(),
            }],
        };

        let weights = declaration.default_weights();
        let topic = node_prefix.append("TOPIC").unwrap().append("1").unwrap();
        let user = node_prefix.append("USER").unwrap().append("alice").unwrap();
        assert_eq!(weights.node_weight(&topic), 2.0);
        assert_eq!(weights.node_weight(&user), 0.0);
        let edge = edge_prefix.append("REFERENCES").unwrap().append("x").unwrap();
        assert_eq!(weights.edge_weight(&edge), EdgeWeight::new(1.0, 0.0));
    }
}
