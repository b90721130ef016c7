//! Plugin graph aggregation
//!
//! `graph()` runs every plugin through two strictly sequential phases:
//!
//! 1. Every plugin, in scope or not, contributes a reference detector. The
//!    detectors are assembled into a cascade with the identity-name
//!    fallback appended last.
//! 2. Every in-scope plugin, in input order, builds its weighted graph with
//!    that cascade and proposes identities, which are folded into the
//!    ledger before the next plugin runs.
//!
//! Out-of-scope plugins still contribute detectors because in-scope content
//! may reference entities they define.
//!
//! The ledger is borrowed exclusively for the whole call. Plugin and ledger
//! errors abort the run immediately; identities already added by earlier
//! plugins stay in the ledger.

use crate::graph::{GraphResult, WeightedGraph};
use crate::ledger::{ensure_identity_exists, Ledger, LedgerError};
use crate::plugin::{DirectoryContext, Plugin, PluginDeclaration, PluginError, PluginId};
use crate::progress::TaskReporter;
use crate::reference::{CascadingReferenceDetector, IdentityNameReferenceDetector};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};


/// A plugin together with the directories it operates in
#[derive(Clone)]
pub struct PluginEntry {
    pub plugin: Arc<dyn Plugin>,
    pub directory_context: DirectoryContext,
}

impl PluginEntry {
    pub fn new(plugin: Arc<dyn Plugin>, directory_context: DirectoryContext) -> Self {
        Self {
            plugin,
            directory_context,
        }
    }
}

/// Everything one aggregation run consumes.
pub struct GraphInput<'a> {
    pub plugins: Vec<PluginEntry>,
    /// Mutated in place; exclusive for the duration of the run
    pub ledger: &'a mut Ledger,
}

/// One in-scope plugin's contribution
#[derive(Debug, Clone, PartialEq)]
pub struct PluginOutput {
    pub plugin_id: PluginId,
    pub weighted_graph: WeightedGraph,
    pub declaration: PluginDeclaration,
}

/// Result of an aggregation run.
pub struct GraphOutput<'a> {
    /// In-scope plugins' outputs, in input order
    pub plugin_outputs: Vec<PluginOutput>,
    /// The input ledger, with any new identities applied
    pub ledger: &'a mut Ledger,
}

impl GraphOutput<'_> {
    /// Merge every plugin's weighted graph into one contribution graph.
    pub fn merged(&self) -> GraphResult<WeightedGraph> {
        WeightedGraph::merge(self.plugin_outputs.iter().map(|o| &o.weighted_graph))
    }
}

/// Errors that abort an aggregation run
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("plugin {plugin_id} failed: {source}")]
    Plugin {
        plugin_id: PluginId,
        #[source]
        source: PluginError,
    },

    #[error("ledger rejected an identity proposed by {plugin_id}: {source}")]
    Ledger {
        plugin_id: PluginId,
        #[source]
        source: LedgerError,
    },
}

impl AggregateError {
    /// The plugin whose operation or proposal caused the abort
    pub fn plugin_id(&self) -> &PluginId {
        match self {
            Self::Plugin { plugin_id, .. } | Self::Ledger { plugin_id, .. } => plugin_id,
        }
    }
}

fn plugin_error(plugin_id: &PluginId) -> impl FnOnce(PluginError) -> AggregateError + '_ {
    move |source| AggregateError::Plugin {
        plugin_id: plugin_id.clone(),
        source,
    }
}

/// Assemble the detection cascade: every plugin's detector in input order,
/// then the identity-name fallback over a snapshot of `ledger`.
pub async fn reference_detector(
    plugins: &[PluginEntry],
    ledger: &Ledger,
    reporter: &dyn TaskReporter,
) -> Result<CascadingReferenceDetector, AggregateError> {
    let mut plugin_detectors = Vec::with_capacity(plugins.len());
    for entry in plugins {
        let plugin_id = entry.plugin.id();
        let task = format!("reference detector for {}", plugin_id);
        reporter.start(&task);
        let detector = entry
            .plugin
            .reference_detector(&entry.directory_context, reporter)
            .await
            .map_err(plugin_error(plugin_id))?;
        plugin_detectors.push(detector);
        reporter.finish(&task);
    }
    Ok(CascadingReferenceDetector::with_fallback(
        plugin_detectors,
        IdentityNameReferenceDetector::from_ledger(ledger),
    ))
}

/// Aggregate plugin graphs, folding identity proposals into the ledger.
///
/// Only plugins whose id is in `scope` produce output or propose
/// identities; all plugins contribute reference detectors.
pub async fn graph<'a>(
    input: GraphInput<'a>,
    scope: &[PluginId],
    reporter: &dyn TaskReporter,
) -> Result<GraphOutput<'a>, AggregateError> {
    let GraphInput { plugins, ledger } = input;
    info!(plugins = plugins.len(), in_scope = scope.len(), "aggregating plugin graphs");

    let detector = reference_detector(&plugins, ledger, reporter).await?;

    let mut plugin_outputs = Vec::new();
    for entry in plugins.iter().filter(|e| scope.contains(e.plugin.id())) {
        let plugin = &entry.plugin;
        let ctx = &entry.directory_context;
        let plugin_id = plugin.id();
        let task = format!("generating graph for {}", plugin_id);
        reporter.start(&task);

        let weighted_graph = plugin
            .graph(ctx, &detector, reporter)
            .await
            .map_err(plugin_error(plugin_id))?;
        let declaration = plugin.declaration();
        let proposals = plugin
            .identities(ctx, reporter)
            .await
            .map_err(plugin_error(plugin_id))?;
        debug!(plugin = %plugin_id, proposals = proposals.len(), "applying identity proposals");
        for proposal in &proposals {
            ensure_identity_exists(ledger, proposal).map_err(|source| AggregateError::Ledger {
                plugin_id: plugin_id.clone(),
                source,
            })?;
        }

        plugin_outputs.push(PluginOutput {
            plugin_id: plugin_id.clone(),
            weighted_graph,
            declaration,
        });
        reporter.finish(&task);
    }

    info!(
        outputs = plugin_outputs.len(),
        accounts = ledger.account_count(),
        "aggregation complete"
    );
    Ok(GraphOutput {
        plugin_outputs,
        ledger,
    })
}
