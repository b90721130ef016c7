//! Shared fixtures for credweave integration tests
//!
//! Instances are built in temporary directories from YAML snippets, and
//! `FailingPlugin` stands in for a data source that breaks mid-run.

#![allow(dead_code)]

use async_trait::async_trait;
use credweave::ledger::IdentityProposal;
use credweave::plugin::{DirectoryContext, Plugin, PluginDeclaration, PluginError, PluginId};
use credweave::progress::TaskReporter;
use credweave::reference::{MappedReferenceDetector, ReferenceDetector};
use credweave::{EdgeAddress, LocalInstance, NodeAddress, WeightedGraph};
use std::path::Path;
use tempfile::TempDir;

pub const FORUM: &str = r#"
name: Forum
node_types:
  - kind: TOPIC
    name: Topic
    default_weight: 2
users:
  - name: alice
    url: https://forum.example/u/alice
  - name: bob
entities:
  - kind: TOPIC
    id: "1"
    url: https://forum.example/t/1
    description: Plan the release
    timestamp_ms: 1000
    author: alice
    references:
      - https://chat.example/m/9
      - "@carol"
      - "@alice"
  - kind: TOPIC
    id: "2"
    url: https://forum.example/t/2
    description: Release notes
    timestamp_ms: 2000
    author: bob
    references:
      - https://forum.example/t/1
      - https://unknown.example/x
"#;

pub const CHAT: &str = r#"
name: Chat
node_types:
  - kind: MESSAGE
    name: Message
users:
  - name: alice
entities:
  - kind: MESSAGE
    id: "9"
    url: https://chat.example/m/9
    description: see the forum thread
    timestamp_ms: 1500
    author: alice
    references:
      - https://forum.example/t/1
"#;

/// Write `credweave.yaml` plus one manifest per plugin, then open it.
pub async fn instance(dir: &TempDir, plugins: &[(&str, &str)]) -> LocalInstance {
    let ids: Vec<&str> = plugins.iter().map(|(id, _)| *id).collect();
    let config = format!("plugins: [{}]\n", ids.join(", "));
    write(&dir.path().join("credweave.yaml"), &config);
    for (id, manifest) in plugins {
        let (owner, name) = id.split_once('/').unwrap();
        let plugin_dir = dir.path().join("config/plugins").join(owner).join(name);
        write(&plugin_dir.join("plugin.yaml"), manifest);
    }
    LocalInstance::open(dir.path()).await.unwrap()
}

fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

pub fn address(parts: &[&str]) -> NodeAddress {
    NodeAddress::from_parts(parts.iter().copied()).unwrap()
}

pub fn plugin_id(id: &str) -> PluginId {
    PluginId::parse(id).unwrap()
}

/// Which operation a [`FailingPlugin`] fails in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Failure {
    Detector,
    Graph,
}

/// A plugin that contributes nothing and fails at a chosen point.
pub struct FailingPlugin {
    id: PluginId,
    failure: Failure,
}

impl FailingPlugin {
    pub fn new(id: &str, failure: Failure) -> Self {
        Self {
            id: plugin_id(id),
            failure,
        }
    }
}

#[async_trait]
impl Plugin for FailingPlugin {
    fn id(&self) -> &PluginId {
        &self.id
    }

    fn declaration(&self) -> PluginDeclaration {
        PluginDeclaration {
            name: "Failing".to_string(),
            node_prefix: NodeAddress::from_parts([self.id.owner(), self.id.name()]).unwrap(),
            edge_prefix: EdgeAddress::from_parts([self.id.owner(), self.id.name()]).unwrap(),
            node_types: Vec::new(),
            edge_types: Vec::new(),
            user_types: Vec::new(),
        }
    }

    async fn reference_detector(
        &self,
        _ctx: &DirectoryContext,
        _reporter: &dyn TaskReporter,
    ) -> Result<Box<dyn ReferenceDetector>, PluginError> {
        if self.failure == Failure::Detector {
            return Err(PluginError::Internal("source unavailable".to_string()));
        }
        Ok(Box::new(MappedReferenceDetector::default()))
    }

    async fn graph(
        &self,
        _ctx: &DirectoryContext,
        _detector: &dyn ReferenceDetector,
        _reporter: &dyn TaskReporter,
    ) -> Result<WeightedGraph, PluginError> {
        if self.failure == Failure::Graph {
            return Err(PluginError::Internal("rate limited".to_string()));
        }
        Ok(WeightedGraph::default())
    }

    async fn identities(
        &self,
        _ctx: &DirectoryContext,
        _reporter: &dyn TaskReporter,
    ) -> Result<Vec<IdentityProposal>, PluginError> {
        Ok(Vec::new())
    }
}
