//! Resolved network registry.
//!
//! # Data Flow
//! ```text
//! ToolConfig (validated)
//!     + EnvSource (.env + process environment, read once)
//!     → Registry::load (resolve secrets, apply LoadPolicy)
//!     → Registry (immutable, passed by reference to every task)
//! ```
//!
//! # Security Constraints
//! - Signer keys are required, never defaulted, for value transfers
//! - Empty keys are dropped with a warning for read-only use
//! - Secret values never reach the logs

pub mod network;
pub mod verification;

use std::collections::BTreeMap;
use std::path::Path;

use url::Url;

use crate::config::loader::{builtin_config, load_config, ConfigError};
use crate::config::schema::{RpcConfig, ToolConfig};
use crate::config::secrets::{EnvSource, ProcessEnv};
use crate::config::validation::{validate_config, ValidationError};

pub use network::{GasPolicy, NetworkDescriptor, SignerKey};
pub use verification::{
    builtin_explorer, EndpointSource, ExplorerEndpoints, Verification, VerificationDescriptor,
};

/// What the caller is about to do with the registry.
#[derive(Debug, Clone, Default)]
pub struct LoadPolicy {
    /// Network the run targets; `None` means every network.
    pub target: Option<String>,
    /// Whether the run sends value-transferring transactions.
    pub value_transfers: bool,
}

impl LoadPolicy {
    /// Read-only access to one network.
    pub fn read_only(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            value_transfers: false,
        }
    }

    /// Value-transferring access to one network.
    pub fn transacting(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            value_transfers: true,
        }
    }

    fn covers(&self, network: &str) -> bool {
        self.target.as_deref().map_or(true, |t| t == network)
    }
}

/// Immutable table of networks and verification endpoints.
#[derive(Debug, Clone)]
pub struct Registry {
    default_network: String,
    rpc: RpcConfig,
    networks: Vec<NetworkDescriptor>,
    verification_enabled: bool,
    verifications: BTreeMap<String, VerificationDescriptor>,
}

impl Registry {
    /// Build the registry from a configuration and an environment.
    pub fn load(
        config: ToolConfig,
        env: &dyn EnvSource,
        policy: &LoadPolicy,
    ) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        if let Some(target) = &policy.target {
            if !config.networks.iter().any(|n| &n.name == target) {
                return Err(ConfigError::UnknownNetwork(target.clone()));
            }
        }

        let mut networks = Vec::with_capacity(config.networks.len());
        for declared in &config.networks {
            let enforce = policy.value_transfers
                && policy.covers(&declared.name)
                && !declared.development;

            if enforce && declared.accounts.is_empty() {
                return Err(ConfigError::NoSigner(declared.name.clone()));
            }

            let mut signer_keys = Vec::with_capacity(declared.accounts.len());
            for reference in &declared.accounts {
                let secret = reference.resolve(env);
                if secret.is_empty() {
                    if enforce {
                        return Err(ConfigError::MissingSecret {
                            network: declared.name.clone(),
                            reference: reference.to_string(),
                        });
                    }
                    tracing::debug!(
                        network = %declared.name,
                        reference = %reference,
                        "Signer key resolved empty, skipping"
                    );
                    continue;
                }
                signer_keys.push(SignerKey {
                    reference: reference.clone(),
                    secret,
                });
            }

            // Validation guarantees the URL parses.
            let rpc_url = declared
                .url
                .as_deref()
                .map(|url| parse_declared_url(&declared.name, url))
                .transpose()?;

            networks.push(NetworkDescriptor {
                name: declared.name.clone(),
                rpc_url,
                chain_id: declared.chain_id,
                development: declared.development,
                signer_keys,
                gas: GasPolicy::from(&declared.gas),
            });
        }

        let verifications = resolve_verifications(&config, &networks, env, policy)?;

        tracing::info!(
            networks = networks.len(),
            verification_enabled = config.verification.enabled,
            explorers = verifications.len(),
            "Network registry loaded"
        );

        Ok(Self {
            default_network: config.default_network,
            rpc: config.rpc,
            networks,
            verification_enabled: config.verification.enabled,
            verifications,
        })
    }

    /// Look up a network by name.
    pub fn resolve_network(&self, name: &str) -> Result<&NetworkDescriptor, ConfigError> {
        self.networks
            .iter()
            .find(|n| n.name == name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    /// Look up the verification endpoints for a network.
    pub fn resolve_verification(&self, network: &str) -> Result<Verification<'_>, ConfigError> {
        self.resolve_network(network)?;
        if !self.verification_enabled {
            return Ok(Verification::Disabled);
        }
        Ok(self
            .verifications
            .get(network)
            .map(Verification::Enabled)
            .unwrap_or(Verification::NotConfigured))
    }

    /// All networks, in declaration order.
    pub fn networks(&self) -> impl Iterator<Item = &NetworkDescriptor> {
        self.networks.iter()
    }

    pub fn default_network(&self) -> &str {
        &self.default_network
    }

    pub fn rpc(&self) -> &RpcConfig {
        &self.rpc
    }

    pub fn verification_enabled(&self) -> bool {
        self.verification_enabled
    }
}

fn resolve_verifications(
    config: &ToolConfig,
    networks: &[NetworkDescriptor],
    env: &dyn EnvSource,
    policy: &LoadPolicy,
) -> Result<BTreeMap<String, VerificationDescriptor>, ConfigError> {
    let mut resolved = BTreeMap::new();
    if !config.verification.enabled {
        return Ok(resolved);
    }

    for (network_name, reference) in &config.verification.api_keys {
        let network = networks
            .iter()
            .find(|n| &n.name == network_name)
            .ok_or_else(|| ConfigError::UnknownNetwork(network_name.clone()))?;

        let api_key = reference.resolve(env);
        if api_key.is_empty() && policy.covers(network_name) {
            tracing::warn!(
                network = %network_name,
                reference = %reference,
                "Explorer API key resolved empty; verification requests will be rejected"
            );
        }

        let custom = config
            .verification
            .custom_chains
            .iter()
            .find(|c| &c.network == network_name);

        let (api_url, browser_url, source) = match (custom, builtin_explorer(network.chain_id)) {
            (Some(chain), _) => (
                chain.api_url.as_str(),
                chain.browser_url.as_str(),
                EndpointSource::Custom,
            ),
            (None, Some(builtin)) => {
                (builtin.api_url, builtin.browser_url, EndpointSource::BuiltIn)
            }
            (None, None) => {
                return Err(ConfigError::Validation(vec![
                    ValidationError::MissingExplorerUrls(network_name.clone()),
                ]))
            }
        };
        parse_declared_url(network_name, browser_url)?;

        resolved.insert(
            network_name.clone(),
            VerificationDescriptor {
                network: network_name.clone(),
                chain_id: network.chain_id,
                api_key,
                api_url: parse_declared_url(network_name, api_url)?,
                browser_url: browser_url.to_string(),
                source,
            },
        );
    }

    Ok(resolved)
}

fn parse_declared_url(network: &str, url: &str) -> Result<Url, ConfigError> {
    Url::parse(url).map_err(|e| {
        ConfigError::Validation(vec![ValidationError::InvalidUrl {
            network: network.to_string(),
            url: url.to_string(),
            reason: e.to_string(),
        }])
    })
}

/// Load the registry from a file (or the compiled-in declarations) and the
/// process environment, reading `.env` first.
pub fn load(path: Option<&Path>, policy: &LoadPolicy) -> Result<Registry, ConfigError> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => builtin_config()?,
    };
    Registry::load(config, &ProcessEnv::with_dotenv(), policy)
}
