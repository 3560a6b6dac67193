//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (explorer entries reference existing networks)
//! - Validate value ranges (chain IDs > 0, URLs parse, gas prices coherent)
//! - Detect duplicate names and chain IDs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ToolConfig → Result<(), Vec<ValidationError>>
//! - Runs before secrets are resolved

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use url::Url;

use crate::config::schema::ToolConfig;
use crate::config::secrets::SecretRef;
use crate::registry::verification::builtin_explorer;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("network name must not be empty")]
    EmptyNetworkName,

    #[error("network '{0}' is declared more than once")]
    DuplicateNetwork(String),

    #[error("network '{0}' has chain ID 0")]
    ZeroChainId(String),

    #[error("chain ID {chain_id} is used by both '{first}' and '{second}'")]
    DuplicateChainId {
        chain_id: u64,
        first: String,
        second: String,
    },

    #[error("network '{0}' needs an RPC url")]
    MissingRpcUrl(String),

    #[error("network '{network}' has an invalid url '{url}': {reason}")]
    InvalidUrl {
        network: String,
        url: String,
        reason: String,
    },

    #[error("network '{network}' gas price {price} is below its minimum {min_price}")]
    GasPriceBelowMinimum {
        network: String,
        price: u64,
        min_price: u64,
    },

    #[error("network '{0}' has a gas limit of 0")]
    ZeroGasLimit(String),

    #[error("{context} references an empty environment variable name")]
    EmptyEnvName { context: String },

    #[error("default network '{0}' is not declared")]
    UnknownDefaultNetwork(String),

    #[error("explorer entry references unknown network '{0}'")]
    UnknownVerificationNetwork(String),

    #[error("custom chain for '{network}' declares chain ID {declared}, network has {expected}")]
    CustomChainIdMismatch {
        network: String,
        declared: u64,
        expected: u64,
    },

    #[error("network '{0}' has more than one custom chain entry")]
    DuplicateCustomChain(String),

    #[error("network '{0}' has an explorer API key but no known explorer endpoints")]
    MissingExplorerUrls(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ToolConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names: HashMap<&str, u64> = HashMap::new();
    let mut chain_ids: HashMap<u64, &str> = HashMap::new();

    for network in &config.networks {
        let name = network.name.as_str();
        if name.is_empty() {
            errors.push(ValidationError::EmptyNetworkName);
        }
        if names.insert(name, network.chain_id).is_some() {
            errors.push(ValidationError::DuplicateNetwork(name.to_string()));
        }

        if network.chain_id == 0 {
            errors.push(ValidationError::ZeroChainId(name.to_string()));
        } else if let Some(first) = chain_ids.insert(network.chain_id, name) {
            errors.push(ValidationError::DuplicateChainId {
                chain_id: network.chain_id,
                first: first.to_string(),
                second: name.to_string(),
            });
        }

        match &network.url {
            Some(url) => {
                if let Err(e) = Url::parse(url) {
                    errors.push(ValidationError::InvalidUrl {
                        network: name.to_string(),
                        url: url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            None if !network.development => {
                errors.push(ValidationError::MissingRpcUrl(name.to_string()));
            }
            None => {}
        }

        if let (Some(price), Some(min_price)) = (network.gas.price, network.gas.min_price) {
            if price < min_price {
                errors.push(ValidationError::GasPriceBelowMinimum {
                    network: name.to_string(),
                    price,
                    min_price,
                });
            }
        }
        if network.gas.limit == Some(0) {
            errors.push(ValidationError::ZeroGasLimit(name.to_string()));
        }

        for account in &network.accounts {
            check_secret_ref(account, &format!("network '{}' account", name), &mut errors);
        }
    }

    if !names.contains_key(config.default_network.as_str()) {
        errors.push(ValidationError::UnknownDefaultNetwork(config.default_network.clone()));
    }

    validate_verification(config, &names, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_verification(
    config: &ToolConfig,
    names: &HashMap<&str, u64>,
    errors: &mut Vec<ValidationError>,
) {
    let verification = &config.verification;
    let mut custom: HashSet<&str> = HashSet::new();

    for chain in &verification.custom_chains {
        let network = chain.network.as_str();
        match names.get(network) {
            None => errors.push(ValidationError::UnknownVerificationNetwork(network.to_string())),
            Some(&expected) if expected != chain.chain_id => {
                errors.push(ValidationError::CustomChainIdMismatch {
                    network: network.to_string(),
                    declared: chain.chain_id,
                    expected,
                });
            }
            Some(_) => {}
        }
        if !custom.insert(network) {
            errors.push(ValidationError::DuplicateCustomChain(network.to_string()));
        }
        for url in [&chain.api_url, &chain.browser_url] {
            if let Err(e) = Url::parse(url) {
                errors.push(ValidationError::InvalidUrl {
                    network: network.to_string(),
                    url: url.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    for (network, key) in &verification.api_keys {
        check_secret_ref(key, &format!("explorer key for '{}'", network), errors);
        match names.get(network.as_str()) {
            None => errors.push(ValidationError::UnknownVerificationNetwork(network.clone())),
            Some(&chain_id) => {
                if !custom.contains(network.as_str()) && builtin_explorer(chain_id).is_none() {
                    errors.push(ValidationError::MissingExplorerUrls(network.clone()));
                }
            }
        }
    }
}

fn check_secret_ref(reference: &SecretRef, context: &str, errors: &mut Vec<ValidationError>) {
    if let SecretRef::Env { env, .. } = reference {
        if env.trim().is_empty() {
            errors.push(ValidationError::EmptyEnvName {
                context: context.to_string(),
            });
        }
    }
}
