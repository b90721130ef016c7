//! Credweave: plugin graph aggregation with cross-plugin reference resolution
//!
//! Plugins turn data sources (forums, repositories, chat logs) into weighted
//! contribution graphs. Aggregation stitches them together: every plugin
//! contributes a reference detector, the detectors form a priority cascade
//! with a ledger-backed identity-name fallback, and each in-scope plugin
//! builds its graph against that cascade so it can link to entities other
//! plugins define. Plugins also propose identities, which are folded into
//! the ledger.
//!
//! # Core Concepts
//!
//! - **Addresses**: Hierarchical node and edge keys (`N[owner,plugin,...]`)
//! - **Reference detectors**: Map textual references (URLs, `@names`) to node addresses
//! - **Ledger**: Event-sourced registry of identities and their aliases
//! - **Instances**: Directories holding configuration, the ledger and outputs
//!
//! # Example
//!
//! ```
//! use credweave::{CascadingReferenceDetector, MappedReferenceDetector, NodeAddress, ReferenceDetector};
//!
//! let post = NodeAddress::from_parts(["example", "forum", "POST", "1"]).unwrap();
//! let forum: MappedReferenceDetector =
//!     [("https://forum.example/t/1".to_string(), post.clone())].into_iter().collect();
//! let cascade = CascadingReferenceDetector::new(vec![Box::new(forum)]);
//! assert_eq!(cascade.resolve("https://forum.example/t/1"), Some(post));
//! ```

pub mod aggregate;
pub mod graph;
pub mod instance;
pub mod ledger;
pub mod plugin;
pub mod progress;
pub mod reference;

pub use aggregate::{graph, AggregateError, GraphInput, GraphOutput, PluginEntry, PluginOutput};
pub use graph::{EdgeAddress, Graph, NodeAddress, WeightedGraph, Weights};
pub use instance::{Instance, InstanceError, LocalInstance, ReadOnlyInstance};
pub use ledger::{ensure_identity_exists, IdentityProposal, Ledger, LedgerError};
pub use plugin::{DeclarativePlugin, DirectoryContext, Plugin, PluginError, PluginId};
pub use progress::{LoggingTaskReporter, TaskReporter};
pub use reference::{
    CascadingReferenceDetector, IdentityNameReferenceDetector, MappedReferenceDetector,
    ReferenceDetector,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
