//! Instances: the on-disk home of a project's configuration, ledger and outputs

mod config;
mod credgraph;
mod local;
mod traits;

pub use config::{InstanceConfig, CONFIG_FILE};
pub use credgraph::{CredEdge, CredGraph, CredNode};
pub use local::LocalInstance;
pub use traits::{
    CredrankInput, CredrankOutput, Instance, InstanceError, InstanceResult, ReadOnlyInstance,
};
