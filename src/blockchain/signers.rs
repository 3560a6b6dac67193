//! Signer providers.
//!
//! # Security
//! - Private keys come only from resolved registry secrets
//! - Keys are never logged or serialized
//! - Only addresses leave this module

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use futures_util::stream::{self, BoxStream, StreamExt};

use crate::blockchain::client::NetworkClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::registry::SignerKey;

/// Source of the accounts a network can sign with.
///
/// Addresses are produced lazily, in provider order.
pub trait SignerProvider: Send + Sync {
    fn accounts(&self) -> BoxStream<'_, BlockchainResult<Address>>;
}

/// Parse a hex-encoded private key (with or without 0x prefix).
pub fn parse_private_key(
    private_key_hex: &str,
    chain_id: u64,
) -> BlockchainResult<PrivateKeySigner> {
    let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

    let signer: PrivateKeySigner = key_hex
        .parse()
        .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

    Ok(signer.with_chain_id(Some(chain_id)))
}

/// Signers held in-process, built from the registry's signer keys.
#[derive(Debug, Clone, Default)]
pub struct LocalSigners {
    signers: Vec<PrivateKeySigner>,
}

impl LocalSigners {
    pub fn from_keys(keys: &[SignerKey], chain_id: u64) -> BlockchainResult<Self> {
        let signers = keys
            .iter()
            .map(|key| {
                parse_private_key(key.secret.expose(), chain_id).map_err(|e| {
                    BlockchainError::Wallet(format!("{} ({})", e, key.reference))
                })
            })
            .collect::<BlockchainResult<Vec<_>>>()?;

        tracing::debug!(count = signers.len(), chain_id, "Local signers initialized");
        Ok(Self { signers })
    }

    /// First configured signer, used for outgoing transactions.
    pub fn primary(&self) -> Option<&PrivateKeySigner> {
        self.signers.first()
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}

impl SignerProvider for LocalSigners {
    fn accounts(&self) -> BoxStream<'_, BlockchainResult<Address>> {
        stream::iter(self.signers.iter().map(|s| Ok(s.address()))).boxed()
    }
}

/// Accounts unlocked on the node itself (development networks).
#[derive(Debug, Clone)]
pub struct NodeSigners {
    client: NetworkClient,
}

impl NodeSigners {
    pub fn new(client: NetworkClient) -> Self {
        Self { client }
    }
}

impl SignerProvider for NodeSigners {
    fn accounts(&self) -> BoxStream<'_, BlockchainResult<Address>> {
        stream::once(self.client.get_accounts())
            .flat_map(|result| {
                let items: Vec<BlockchainResult<Address>> = match result {
                    Ok(addresses) => addresses.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            })
            .boxed()
    }
}
