//! DeclarativePlugin: a plugin described entirely by a YAML manifest
//!
//! The manifest lists node types, users, and entities. Each entity may name
//! an author (one of the declared users) and carry free-form references,
//! which are resolved through the aggregation cascade: a reference may
//! point at another entity of this plugin, at an entity owned by another
//! plugin, or at a ledger identity by `@name`.
//!
//! Manifest file: `<config_dir>/plugin.yaml`.
//!
//! ```yaml
//! name: Forum
//! node_types:
//!   - kind: TOPIC
//!     name: Topic
//!     default_weight: 2
//! users:
//!   - name: alice
//!     url: https://forum.example/u/alice
//! entities:
//!   - kind: TOPIC
//!     id: "7"
//!     url: https://forum.example/t/7
//!     description: Fix the build
//!     timestamp_ms: 1600000000000
//!     author: alice
//!     references: ["@bob", "https://chat.example/m/1"]
//! ```

use super::declaration::{EdgeType, NodeType, PluginDeclaration};
use super::id::PluginId;
use super::traits::{DirectoryContext, Plugin, PluginError};
use crate::graph::{Edge, EdgeAddress, EdgeWeight, Graph, Node, NodeAddress, WeightedGraph};
use crate::ledger::{Alias, IdentityProposal, IdentityType};
use crate::progress::TaskReporter;
use crate::reference::{MappedReferenceDetector, ReferenceDetector};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

/// File name of the manifest inside the plugin's config directory
pub const MANIFEST_FILE: &str = "plugin.yaml";

const USER_KIND: &str = "USER";
const REFERENCES: &str = "REFERENCES";
const AUTHORS: &str = "AUTHORS";

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestNodeType {
    /// Address part identifying the type, e.g. `TOPIC`
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub plural_name: Option<String>,
    #[serde(default = "default_weight")]
    pub default_weight: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestUser {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestEntity {
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    pub description: String,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

/// Parsed contents of `plugin.yaml`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    #[serde(default)]
    pub node_types: Vec<ManifestNodeType>,
    #[serde(default)]
    pub users: Vec<ManifestUser>,
    #[serde(default)]
    pub entities: Vec<ManifestEntity>,
}

impl PluginManifest {
    pub fn from_yaml(yaml: &str) -> Result<Self, PluginError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// A plugin whose graph and identities come from a YAML manifest.
pub struct DeclarativePlugin {
    id: PluginId,
    manifest: PluginManifest,
    node_prefix: NodeAddress,
    edge_prefix: EdgeAddress,
}

impl DeclarativePlugin {
    /// Create a plugin from a manifest, validating it first.
    ///
    /// Entity kinds must be declared, entity keys unique, and authors must
    /// be declared users.
    pub fn new(id: PluginId, manifest: PluginManifest) -> Result<Self, PluginError> {
        validate_manifest(&manifest)?;
        let node_prefix = NodeAddress::from_parts([id.owner(), id.name()])?;
        let edge_prefix = EdgeAddress::from_parts([id.owner(), id.name()])?;
        Ok(Self {
            id,
            manifest,
            node_prefix,
            edge_prefix,
        })
    }

    /// Read and validate `<config_dir>/plugin.yaml`.
    pub async fn load(id: PluginId, ctx: &DirectoryContext) -> Result<Self, PluginError> {
        let path = ctx.config_dir().join(MANIFEST_FILE);
        let yaml = tokio::fs::read_to_string(&path).await.map_err(|e| {
            PluginError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::new(id, PluginManifest::from_yaml(&yaml)?)
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn entity_address(&self, entity: &ManifestEntity) -> Result<NodeAddress, PluginError> {
        Ok(self.node_prefix.append(&entity.kind)?.append(&entity.id)?)
    }

    fn user_address(&self, name: &str) -> Result<NodeAddress, PluginError> {
        Ok(self.node_prefix.append(USER_KIND)?.append(name)?)
    }
}

fn validate_manifest(manifest: &PluginManifest) -> Result<(), PluginError> {
    let kinds: HashSet<&str> = manifest.node_types.iter().map(|t| t.kind.as_str()).collect();
    if kinds.contains("") {
        return Err(PluginError::Config("node type kind must not be empty".to_string()));
    }
    if kinds.contains(USER_KIND) {
        return Err(PluginError::Config(format!(
            "node type kind {} is reserved",
            USER_KIND
        )));
    }
    let users: HashSet<&str> = manifest.users.iter().map(|u| u.name.as_str()).collect();
    if users.len() != manifest.users.len() {
        return Err(PluginError::Config("duplicate user name".to_string()));
    }

    let mut keys = HashSet::new();
    for entity in &manifest.entities {
        if !kinds.contains(entity.kind.as_str()) {
            return Err(PluginError::Config(format!(
                "entity {} has undeclared kind {}",
                entity.id, entity.kind
            )));
        }
        if !keys.insert((entity.kind.as_str(), entity.id.as_str())) {
            return Err(PluginError::Config(format!(
                "duplicate entity {}/{}",
                entity.kind, entity.id
            )));
        }
        if let Some(author) = &entity.author {
            if !users.contains(author.as_str()) {
                return Err(PluginError::Config(format!(
                    "entity {} has undeclared author {}",
                    entity.id, author
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Plugin for DeclarativePlugin {
    fn id(&self) -> &PluginId {
        &self.id
    }

    fn declaration(&self) -> PluginDeclaration {
        let node_types = self
            .manifest
            .node_types
            .iter()
            .map(|t| NodeType {
                name: t.name.clone(),
                plural_name: t.plural_name.clone().unwrap_or_else(|| format!("{}s", t.name)),
                prefix: NodeAddress::from_parts_unchecked(
                    self.node_prefix
                        .parts()
                        .iter()
                        .cloned()
                        .chain(std::iter::once(t.kind.clone()))
                        .collect(),
                ),
                default_weight: t.default_weight,
                description: t.description.clone(),
            })
            .collect();

        let edge_type = |kind: &str, forward: &str, backward: &str, weight: EdgeWeight| EdgeType {
            forward_name: forward.to_string(),
            backward_name: backward.to_string(),
            prefix: EdgeAddress::from_parts_unchecked(
                self.edge_prefix
                    .parts()
                    .iter()
                    .cloned()
                    .chain(std::iter::once(kind.to_string()))
                    .collect(),
            ),
            default_weight: weight,
            description: String::new(),
        };

        PluginDeclaration {
            name: self.manifest.name.clone(),
            node_prefix: self.node_prefix.clone(),
            edge_prefix: self.edge_prefix.clone(),
            node_types,
            edge_types: vec![
                edge_type(REFERENCES, "references", "is referenced by", EdgeWeight::new(1.0, 0.0)),
                edge_type(AUTHORS, "authors", "is authored by", EdgeWeight::new(0.5, 1.0)),
            ],
            user_types: vec![NodeType {
                name: "User".to_string(),
                plural_name: "Users".to_string(),
                prefix: NodeAddress::from_parts_unchecked(
                    self.node_prefix
                        .parts()
                        .iter()
                        .cloned()
                        .chain(std::iter::once(USER_KIND.to_string()))
                        .collect(),
                ),
                default_weight: 0.0,
                description: format!("A user of {}", self.manifest.name),
            }],
        }
    }

    async fn reference_detector(
        &self,
        _ctx: &DirectoryContext,
        _reporter: &dyn TaskReporter,
    ) -> Result<Box<dyn ReferenceDetector>, PluginError> {
        let mut table = Vec::new();
        for entity in &self.manifest.entities {
            if let Some(url) = &entity.url {
                table.push((url.clone(), self.entity_address(entity)?));
            }
        }
        for user in &self.manifest.users {
            if let Some(url) = &user.url {
                table.push((url.clone(), self.user_address(&user.name)?));
            }
        }
        Ok(Box::new(table.into_iter().collect::<MappedReferenceDetector>()))
    }

    async fn graph(
        &self,
        _ctx: &DirectoryContext,
        detector: &dyn ReferenceDetector,
        _reporter: &dyn TaskReporter,
    ) -> Result<WeightedGraph, PluginError> {
        let mut graph = Graph::new();

        for user in &self.manifest.users {
            graph.add_node(Node::new(self.user_address(&user.name)?, format!("@{}", user.name)))?;
        }

        for entity in &self.manifest.entities {
            let address = self.entity_address(entity)?;
            graph.add_node(
                Node::new(address.clone(), entity.description.clone())
                    .with_timestamp(entity.timestamp_ms),
            )?;

            if let Some(author) = &entity.author {
                let edge_address = self
                    .edge_prefix
                    .append(AUTHORS)?
                    .append(&entity.kind)?
                    .append(&entity.id)?;
                graph.add_edge(Edge::new(
                    edge_address,
                    self.user_address(author)?,
                    address.clone(),
                    entity.timestamp_ms,
                ))?;
            }

            for reference in &entity.references {
                let Some(target) = detector.resolve(reference) else {
                    debug!(plugin = %self.id, entity = %entity.id, reference, "unresolved reference");
                    continue;
                };
                let edge_address = self
                    .edge_prefix
                    .append(REFERENCES)?
                    .append(&entity.kind)?
                    .append(&entity.id)?
                    .append(target.to_string())?;
                graph.add_edge(Edge::new(
                    edge_address,
                    address.clone(),
                    target,
                    entity.timestamp_ms,
                ))?;
            }
        }

        Ok(WeightedGraph::new(graph, self.declaration().default_weights()))
    }

    async fn identities(
        &self,
        _ctx: &DirectoryContext,
        _reporter: &dyn TaskReporter,
    ) -> Result<Vec<IdentityProposal>, PluginError> {
        self.manifest
            .users
            .iter()
            .map(|user| {
                Ok(IdentityProposal {
                    name: user.name.clone(),
                    plugin_name: self.id.name().to_string(),
                    subtype: IdentityType::User,
                    alias: Alias::new(
                        self.user_address(&user.name)?,
                        format!("@{} on {}", user.name, self.manifest.name),
                    ),
                })
            })
            .collect()
    }
}
