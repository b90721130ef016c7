//! Contribution graph data structures

mod address;
mod edge;
mod node;
mod structure;
mod weighted;
mod weights;

pub use address::{AddressError, EdgeAddress, NodeAddress};
pub use edge::Edge;
pub use node::Node;
pub use structure::{Graph, GraphError, GraphResult};
pub use weighted::WeightedGraph;
pub use weights::{EdgeWeight, Weights};
