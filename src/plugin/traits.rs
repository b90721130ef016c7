//! Plugin trait: the contract data-source plugins implement
//!
//! A plugin turns some external source (a forum, a repository, a file of
//! initiatives) into a weighted graph and a set of identity proposals.
//! How it does so is its own business; the aggregator only calls these
//! operations.

use super::declaration::PluginDeclaration;
use super::id::PluginId;
use crate::graph::{AddressError, GraphError, WeightedGraph};
use crate::ledger::IdentityProposal;
use crate::progress::TaskReporter;
use crate::reference::ReferenceDetector;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("address error: {0}")]
    Address(#[from] AddressError),

    #[error("plugin error: {0}")]
    Internal(String),
}

/// Directories a plugin may read configuration from and cache data in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryContext {
    config_dir: PathBuf,
    cache_dir: PathBuf,
}

impl DirectoryContext {
    pub fn new(config_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

/// The contract plugins implement.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique identifier for this plugin
    fn id(&self) -> &PluginId;

    /// Static description of the node and edge types this plugin produces
    fn declaration(&self) -> PluginDeclaration;

    /// A detector resolving references to entities this plugin defines.
    async fn reference_detector(
        &self,
        ctx: &DirectoryContext,
        reporter: &dyn TaskReporter,
    ) -> Result<Box<dyn ReferenceDetector>, PluginError>;

    /// Build this plugin's weighted graph.
    ///
    /// `detector` resolves references found in the plugin's content,
    /// including references to entities owned by other plugins.
    async fn graph(
        &self,
        ctx: &DirectoryContext,
        detector: &dyn ReferenceDetector,
        reporter: &dyn TaskReporter,
    ) -> Result<WeightedGraph, PluginError>;

    /// Identities this plugin believes should exist in the ledger.
    async fn identities(
        &self,
        ctx: &DirectoryContext,
        reporter: &dyn TaskReporter,
    ) -> Result<Vec<IdentityProposal>, PluginError>;
}
