//! LocalInstance: an instance backed by a directory of YAML and JSON files

use super::config::{InstanceConfig, CONFIG_FILE};
use super::credgraph::CredGraph;
use super::traits::{
    CredrankInput, CredrankOutput, Instance, InstanceError, InstanceResult, ReadOnlyInstance,
};
use crate::aggregate::{GraphOutput, PluginEntry};
use crate::graph::{WeightedGraph, Weights};
use crate::ledger::Ledger;
use crate::plugin::{DeclarativePlugin, DirectoryContext, PluginId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const LEDGER_FILE: &str = "data/ledger.json";
const CRED_GRAPH_FILE: &str = "output/credGraph.json";
const WEIGHTS_FILE: &str = "config/weights.json";
const GRAPH_FILE: &str = "graph.json";
const DECLARATION_FILE: &str = "declaration.json";

/// An instance rooted at a local directory.
///
/// ```text
/// credweave.yaml
/// config/plugins/<owner>/<name>/
/// config/weights.json
/// cache/<owner>/<name>/
/// data/ledger.json
/// output/graphs/<owner>/<name>/{graph,declaration}.json
/// output/credGraph.json
/// ```
#[derive(Debug, Clone)]
pub struct LocalInstance {
    root: PathBuf,
    cache_root: PathBuf,
    config: InstanceConfig,
}

impl LocalInstance {
    /// Open the instance at `root`, reading its `credweave.yaml`.
    pub async fn open(root: impl Into<PathBuf>) -> InstanceResult<Self> {
        let root = root.into();
        let config_path = root.join(CONFIG_FILE);
        let yaml = read_optional(&config_path)
            .await?
            .ok_or_else(|| InstanceError::Missing(config_path.clone()))?;
        let config = InstanceConfig::from_yaml(&yaml)?;
        info!(root = %root.display(), plugins = config.plugins.len(), "opened instance");
        Ok(Self {
            cache_root: root.join("cache"),
            root,
            config,
        })
    }

    /// Keep plugin caches under `cache_root` instead of `<root>/cache`.
    pub fn with_cache_root(mut self, cache_root: impl Into<PathBuf>) -> Self {
        self.cache_root = cache_root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    pub fn directory_context(&self, id: &PluginId) -> DirectoryContext {
        DirectoryContext::new(
            self.root
                .join("config")
                .join("plugins")
                .join(id.owner())
                .join(id.name()),
            self.cache_root.join(id.owner()).join(id.name()),
        )
    }

    /// Load every configured plugin from its manifest, in configuration order.
    pub async fn plugin_entries(&self) -> InstanceResult<Vec<PluginEntry>> {
        let mut entries = Vec::with_capacity(self.config.plugins.len());
        for id in &self.config.plugins {
            let ctx = self.directory_context(id);
            let plugin = DeclarativePlugin::load(id.clone(), &ctx)
                .await
                .map_err(|source| InstanceError::Plugin {
                    plugin_id: id.clone(),
                    source,
                })?;
            entries.push(PluginEntry::new(Arc::new(plugin), ctx));
        }
        Ok(entries)
    }

    fn graph_dir(&self, id: &PluginId) -> PathBuf {
        self.root
            .join("output")
            .join("graphs")
            .join(id.owner())
            .join(id.name())
    }

    async fn read_plugin_graph(&self, id: &PluginId) -> InstanceResult<WeightedGraph> {
        let path = self.graph_dir(id).join(GRAPH_FILE);
        read_json(&path)
            .await?
            .ok_or_else(|| InstanceError::Missing(path.clone()))
    }

    async fn write_ledger(&self, ledger: &Ledger) -> InstanceResult<()> {
        write_json(&self.root.join(LEDGER_FILE), ledger).await
    }
}

#[async_trait]
impl ReadOnlyInstance for LocalInstance {
    async fn read_credrank_input(&self) -> InstanceResult<CredrankInput> {
        let mut plugin_graphs = Vec::with_capacity(self.config.plugins.len());
        for id in &self.config.plugins {
            plugin_graphs.push(self.read_plugin_graph(id).await?);
        }
        let weight_overrides: Weights = read_json(&self.root.join(WEIGHTS_FILE))
            .await?
            .unwrap_or_default();
        Ok(CredrankInput {
            plugin_graphs,
            ledger: self.read_ledger().await?,
            weight_overrides,
        })
    }

    async fn read_cred_graph(&self) -> InstanceResult<CredGraph> {
        let path = self.root.join(CRED_GRAPH_FILE);
        read_json(&path)
            .await?
            .ok_or_else(|| InstanceError::Missing(path.clone()))
    }

    async fn read_ledger(&self) -> InstanceResult<Ledger> {
        Ok(read_json(&self.root.join(LEDGER_FILE))
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl Instance for LocalInstance {
    async fn write_graph_output(&self, output: &GraphOutput<'_>) -> InstanceResult<()> {
        for plugin_output in &output.plugin_outputs {
            let dir = self.graph_dir(&plugin_output.plugin_id);
            write_json(&dir.join(GRAPH_FILE), &plugin_output.weighted_graph).await?;
            write_json(&dir.join(DECLARATION_FILE), &plugin_output.declaration).await?;
            debug!(plugin = %plugin_output.plugin_id, "wrote plugin graph");
        }
        self.write_ledger(&*output.ledger).await?;
        info!(plugins = output.plugin_outputs.len(), "wrote graph output");
        Ok(())
    }

    async fn write_credrank_output(&self, output: &CredrankOutput) -> InstanceResult<()> {
        write_json(&self.root.join(CRED_GRAPH_FILE), &output.cred_graph).await?;
        self.write_ledger(&output.ledger).await
    }
}

/// Read a file, treating absence as `None`.
async fn read_optional(path: &Path) -> InstanceResult<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> InstanceResult<Option<T>> {
    match read_optional(path).await? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> InstanceResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::PluginOutput;
    use crate::graph::{EdgeAddress, Graph, Node, NodeAddress};
    use crate::instance::CredNode;
    use crate::ledger::{IdentityName, IdentityType};
    use crate::plugin::PluginDeclaration;
    use tempfile::TempDir;

    async fn instance_with(yaml: &str) -> (TempDir, LocalInstance) {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join(CONFIG_FILE), yaml).await.unwrap();
        let instance = LocalInstance::open(dir.path()).await.unwrap();
        (dir, instance)
    }

    fn id(s: &str) -> PluginId {
        PluginId::parse(s).unwrap()
    }

    fn plugin_output(plugin: &str, node: &str) -> PluginOutput {
        let plugin_id = id(plugin);
        let prefix = NodeAddress::from_parts([plugin_id.owner(), plugin_id.name()]).unwrap();
        let mut graph = Graph::new();
        graph
            .add_node(Node::new(prefix.append(node).unwrap(), node))
            .unwrap();
        PluginOutput {
            declaration: PluginDeclaration {
                name: plugin.to_string(),
                node_prefix: prefix,
                edge_prefix: EdgeAddress::from_parts([plugin_id.owner(), plugin_id.name()]).unwrap(),
                node_types: Vec::new(),
                edge_types: Vec::new(),
                user_types: Vec::new(),
            },
            plugin_id,
            weighted_graph: WeightedGraph::new(graph, Weights::new()),
        }
    }

    #[tokio::test]
    async fn open_requires_config() {
        let dir = TempDir::new().unwrap();
        let err = LocalInstance::open(dir.path()).await.unwrap_err();
        assert!(matches!(err, InstanceError::Missing(p) if p.ends_with(CONFIG_FILE)));
    }

    #[tokio::test]
    async fn directory_context_layout() {
        let (dir, instance) = instance_with("plugins: [example/forum]").await;
        let ctx = instance.directory_context(&id("example/forum"));
        assert_eq!(ctx.config_dir(), dir.path().join("config/plugins/example/forum"));
        assert_eq!(ctx.cache_dir(), dir.path().join("cache/example/forum"));

        let instance = instance.with_cache_root("/tmp/elsewhere");
        let ctx = instance.directory_context(&id("example/forum"));
        assert_eq!(ctx.cache_dir(), Path::new("/tmp/elsewhere/example/forum"));
    }

    #[tokio::test]
    async fn fresh_instance_has_empty_ledger() {
        let (_dir, instance) = instance_with("plugins: []").await;
        assert_eq!(instance.read_ledger().await.unwrap().account_count(), 0);
    }

    #[tokio::test]
    async fn graph_output_round_trips_through_credrank_input() {
        let (dir, instance) = instance_with("plugins: [example/forum, example/chat]").await;
        let mut ledger = Ledger::new();
        ledger
            .create_identity(IdentityType::User, IdentityName::parse("alice").unwrap())
            .unwrap();
        let forum = plugin_output("example/forum", "topic");
        let chat = plugin_output("example/chat", "message");
        let output = GraphOutput {
            plugin_outputs: vec![forum.clone(), chat.clone()],
            ledger: &mut ledger,
        };

        instance.write_graph_output(&output).await.unwrap();
        assert!(dir
            .path()
            .join("output/graphs/example/forum/declaration.json")
            .exists());

        let input = instance.read_credrank_input().await.unwrap();
        assert_eq!(
            input.plugin_graphs,
            vec![forum.weighted_graph, chat.weighted_graph]
        );
        assert_eq!(input.ledger.events(), ledger.events());
        assert_eq!(input.weight_overrides, Weights::new());
        assert_eq!(input.weighted_graph().unwrap().graph.node_count(), 2);
    }

    #[tokio::test]
    async fn missing_plugin_graph_is_reported() {
        let (_dir, instance) = instance_with("plugins: [example/forum]").await;
        let err = instance.read_credrank_input().await.unwrap_err();
        assert!(matches!(err, InstanceError::Missing(p) if p.ends_with("forum/graph.json")));
    }

    #[tokio::test]
    async fn weight_overrides_apply_to_merged_graph() {
        let (dir, instance) = instance_with("plugins: [example/forum]").await;
        let mut ledger = Ledger::new();
        let output = GraphOutput {
            plugin_outputs: vec![plugin_output("example/forum", "topic")],
            ledger: &mut ledger,
        };
        instance.write_graph_output(&output).await.unwrap();

        let topic = NodeAddress::from_parts(["example", "forum", "topic"]).unwrap();
        let overrides = Weights::new().with_node_weight(topic.clone(), 4.0);
        write_json(&dir.path().join(WEIGHTS_FILE), &overrides).await.unwrap();

        let input = instance.read_credrank_input().await.unwrap();
        assert_eq!(input.weighted_graph().unwrap().weights.node_weight(&topic), 4.0);
    }

    #[tokio::test]
    async fn credrank_output_round_trip() {
        let (_dir, instance) = instance_with("plugins: []").await;
        assert!(matches!(
            instance.read_cred_graph().await.unwrap_err(),
            InstanceError::Missing(_)
        ));

        let cred_graph = CredGraph {
            nodes: vec![CredNode {
                address: NodeAddress::from_parts(["example", "forum", "topic"]).unwrap(),
                description: "topic".into(),
                cred: 2.0,
            }],
            edges: Vec::new(),
        };
        let output = CredrankOutput {
            cred_graph: cred_graph.clone(),
            ledger: Ledger::new(),
        };
        instance.write_credrank_output(&output).await.unwrap();
        assert_eq!(instance.read_cred_graph().await.unwrap(), cred_graph);
    }

    #[tokio::test]
    async fn unloadable_plugin_names_the_plugin() {
        let (_dir, instance) = instance_with("plugins: [example/forum]").await;
        let err = instance.plugin_entries().await.err().unwrap();
        assert!(matches!(err, InstanceError::Plugin { plugin_id, .. } if plugin_id == id("example/forum")));
    }
}
