//! Instance traits: read inputs for and write outputs of a cred computation

use super::credgraph::CredGraph;
use crate::aggregate::GraphOutput;
use crate::graph::{GraphResult, WeightedGraph, Weights};
use crate::ledger::Ledger;
use crate::plugin::{PluginError, PluginId};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing instance data
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing instance file: {}", .0.display())]
    Missing(PathBuf),

    #[error("plugin {0} is configured more than once")]
    DuplicatePlugin(PluginId),

    #[error("cannot load plugin {plugin_id}: {source}")]
    Plugin {
        plugin_id: PluginId,
        #[source]
        source: PluginError,
    },
}

pub type InstanceResult<T> = Result<T, InstanceError>;

/// Everything a CredRank run needs.
#[derive(Debug, Clone)]
pub struct CredrankInput {
    /// One weighted graph per configured plugin, in configuration order
    pub plugin_graphs: Vec<WeightedGraph>,
    pub ledger: Ledger,
    pub weight_overrides: Weights,
}

impl CredrankInput {
    /// All plugin graphs merged, with the instance's weight overrides applied.
    pub fn weighted_graph(&self) -> GraphResult<WeightedGraph> {
        let merged = WeightedGraph::merge(&self.plugin_graphs)?;
        Ok(WeightedGraph::new(
            merged.graph,
            merged.weights.overridden_by(&self.weight_overrides),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct CredrankOutput {
    pub cred_graph: CredGraph,
    pub ledger: Ledger,
}

#[async_trait]
pub trait ReadOnlyInstance: Send + Sync {
    /// Read the inputs required to run CredRank.
    async fn read_credrank_input(&self) -> InstanceResult<CredrankInput>;

    /// Read the cred graph written by a previous CredRank run.
    async fn read_cred_graph(&self) -> InstanceResult<CredGraph>;

    /// Read the ledger. A fresh instance has an empty one.
    async fn read_ledger(&self) -> InstanceResult<Ledger>;
}

#[async_trait]
pub trait Instance: ReadOnlyInstance {
    /// Persist each plugin's graph and declaration, and the updated ledger.
    async fn write_graph_output(&self, output: &GraphOutput<'_>) -> InstanceResult<()>;

    /// Persist the result of a CredRank run.
    async fn write_credrank_output(&self, output: &CredrankOutput) -> InstanceResult<()>;
}
