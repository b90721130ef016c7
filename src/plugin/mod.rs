//! Plugins: the data sources whose graphs get aggregated

pub mod declarative;
mod declaration;
mod id;
mod traits;

pub use declaration::{EdgeType, NodeType, PluginDeclaration};
pub use declarative::{DeclarativePlugin, PluginManifest};
pub use id::{PluginId, PluginIdError};
pub use traits::{DirectoryContext, Plugin, PluginError};
