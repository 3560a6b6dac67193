//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! networks.toml (compiled in) or --config FILE
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ToolConfig (validated, secrets still unresolved)
//!     → registry::Registry::load (resolve secrets once)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - Secrets are references in the file, values only in the registry
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod secrets;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{CustomChainConfig, GasConfig, NetworkConfig, RpcConfig, ToolConfig};
pub use secrets::{EnvSource, ProcessEnv, Secret, SecretRef};
