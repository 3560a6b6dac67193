//! Resolved network descriptors.

use url::Url;

use crate::config::schema::GasConfig;
use crate::config::secrets::{Secret, SecretRef};

/// Connection parameters for one chain, with secrets resolved.
#[derive(Debug, Clone)]
pub struct NetworkDescriptor {
    pub name: String,
    /// JSON-RPC endpoint; `None` only for development networks.
    pub rpc_url: Option<Url>,
    pub chain_id: u64,
    /// Local development node whose accounts are managed by the node.
    pub development: bool,
    /// Non-empty signer keys, in declaration order.
    pub signer_keys: Vec<SignerKey>,
    pub gas: GasPolicy,
}

impl NetworkDescriptor {
    /// True when the network can sign with locally held keys.
    pub fn has_local_signers(&self) -> bool {
        !self.signer_keys.is_empty()
    }
}

/// A signer private key and the reference it was resolved from.
#[derive(Debug, Clone)]
pub struct SignerKey {
    pub reference: SecretRef,
    pub secret: Secret,
}

/// Gas overrides applied to outgoing transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasPolicy {
    /// Fixed gas limit.
    pub limit: Option<u64>,
    /// Fixed gas price in wei.
    pub price: Option<u128>,
    /// Floor for the estimated gas price in wei.
    pub min_price: Option<u128>,
}

impl GasPolicy {
    /// True when pricing needs the node's estimate.
    pub fn needs_estimate(&self) -> bool {
        self.price.is_none() && self.min_price.is_some()
    }

    /// True when the policy overrides pricing at all.
    pub fn overrides_price(&self) -> bool {
        self.price.is_some() || self.min_price.is_some()
    }

    /// Gas price to use given the node's estimate.
    pub fn effective_price(&self, estimate: u128) -> u128 {
        match (self.price, self.min_price) {
            (Some(fixed), _) => fixed,
            (None, Some(floor)) => estimate.max(floor),
            (None, None) => estimate,
        }
    }
}

impl From<&GasConfig> for GasPolicy {
    fn from(config: &GasConfig) -> Self {
        Self {
            limit: config.limit,
            price: config.price.map(u128::from),
            min_price: config.min_price.map(u128::from),
        }
    }
}
