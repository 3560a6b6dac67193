//! Network registry and integration probes for Archetype NFT collections.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod probe;
pub mod registry;
pub mod tasks;

pub use config::schema::ToolConfig;
pub use registry::{LoadPolicy, Registry};
pub use tasks::{TaskError, Toolbox};
