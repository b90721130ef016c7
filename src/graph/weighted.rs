//! WeightedGraph: a graph paired with its weights

use super::structure::{Graph, GraphResult};
use super::weights::Weights;
use serde::{Deserialize, Serialize};

/// The unit a plugin produces: its contribution graph and the weights that
/// apply to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedGraph {
    pub graph: Graph,
    pub weights: Weights,
}

impl WeightedGraph {
    pub fn new(graph: Graph, weights: Weights) -> Self {
        Self { graph, weights }
    }

    /// Merge several weighted graphs into one.
    ///
    /// Fails if two inputs disagree about a node, an edge or a weight.
    pub fn merge<'a, I>(graphs: I) -> GraphResult<WeightedGraph>
    where
        I: IntoIterator<Item = &'a WeightedGraph>,
    {
        let mut merged = WeightedGraph::default();
        for wg in graphs {
            merged.graph.merge(&wg.graph)?;
            merged.weights.merge(&wg.weights)?;
        }
        Ok(merged)
    }
}
