//! Configuration schema definitions.
//!
//! This module defines the declarative shape of a network file. All types
//! derive Serde traits for deserialization from TOML. Nothing here is
//! resolved: secrets stay as references until the registry is built.

use serde::{Deserialize, Serialize};

use crate::config::secrets::SecretRef;

/// Root declaration of networks and explorer endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Network used when the caller does not select one.
    pub default_network: String,

    /// RPC client settings shared by every network.
    pub rpc: RpcConfig,

    /// Network declarations, one per chain.
    pub networks: Vec<NetworkConfig>,

    /// Source verification settings.
    pub verification: VerificationConfig,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            default_network: "localhost".to_string(),
            rpc: RpcConfig::default(),
            networks: Vec::new(),
            verification: VerificationConfig::default(),
        }
    }
}

/// RPC client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Timeout for a single RPC request in seconds.
    pub timeout_secs: u64,

    /// Block confirmations to wait for after a state-changing call.
    pub confirmations: u64,

    /// Maximum time to wait for a transaction receipt in seconds.
    pub receipt_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            confirmations: 1,
            receipt_timeout_secs: 300,
        }
    }
}

/// One network declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Unique network name (e.g., "sepolia").
    pub name: String,

    /// JSON-RPC endpoint. Optional only for development networks.
    #[serde(default)]
    pub url: Option<String>,

    /// Chain ID the endpoint is expected to serve.
    pub chain_id: u64,

    /// Signer private keys, in order.
    #[serde(default)]
    pub accounts: Vec<SecretRef>,

    /// Local development node (node-managed accounts, no real funds).
    #[serde(default)]
    pub development: bool,

    /// Gas overrides.
    #[serde(default)]
    pub gas: GasConfig,
}

/// Gas overrides for a network. All prices are in wei.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Fixed gas limit for every transaction.
    pub limit: Option<u64>,

    /// Fixed gas price.
    pub price: Option<u64>,

    /// Floor applied to the node's gas price estimate.
    pub min_price: Option<u64>,
}

/// Source verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Global switch; when off every lookup resolves to `Disabled`.
    pub enabled: bool,

    /// Explorer API key per network name.
    pub api_keys: std::collections::BTreeMap<String, SecretRef>,

    /// Explorer endpoints for chains the built-in table does not know.
    pub custom_chains: Vec<CustomChainConfig>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_keys: Default::default(),
            custom_chains: Vec::new(),
        }
    }
}

/// Explorer endpoints for one network.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomChainConfig {
    /// Network this entry belongs to.
    pub network: String,

    /// Chain ID, must match the network's.
    pub chain_id: u64,

    /// Explorer API base URL.
    pub api_url: String,

    /// Explorer web UI URL.
    pub browser_url: String,
}
