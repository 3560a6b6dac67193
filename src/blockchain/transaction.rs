//! Transaction confirmation and gas pricing.
//!
//! # Responsibilities
//! - Resolve the gas price a network's policy asks for
//! - Wait for a receipt with the configured confirmations and timeout
//! - Turn on-chain reverts into errors

use std::time::Duration;

use alloy::network::Ethereum;
use alloy::primitives::TxHash;
use alloy::providers::{PendingTransactionBuilder, PendingTransactionError};

use crate::blockchain::client::NetworkClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, Confirmation};
use crate::config::schema::RpcConfig;
use crate::registry::GasPolicy;

/// How long and how deep to wait for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationSettings {
    pub confirmations: u64,
    pub timeout: Duration,
}

impl From<&RpcConfig> for ConfirmationSettings {
    fn from(rpc: &RpcConfig) -> Self {
        Self {
            confirmations: rpc.confirmations.max(1),
            timeout: Duration::from_secs(rpc.receipt_timeout_secs),
        }
    }
}

/// Gas price override for a transaction, if the policy sets one.
pub async fn gas_price_override(
    client: &NetworkClient,
    policy: &GasPolicy,
) -> BlockchainResult<Option<u128>> {
    if !policy.overrides_price() {
        return Ok(None);
    }
    let estimate = if policy.needs_estimate() {
        client.get_gas_price().await?
    } else {
        0
    };
    let price = policy.effective_price(estimate);
    tracing::debug!(network = %client.network(), estimate, price, "Gas price override");
    Ok(Some(price))
}

/// Wait for a sent transaction to be confirmed.
pub async fn await_confirmation(
    pending: PendingTransactionBuilder<Ethereum>,
    settings: ConfirmationSettings,
) -> BlockchainResult<Confirmation> {
    let tx_hash: TxHash = *pending.tx_hash();
    tracing::info!(
        tx_hash = %tx_hash,
        confirmations = settings.confirmations,
        "Waiting for transaction receipt"
    );

    let receipt = pending
        .with_required_confirmations(settings.confirmations)
        .with_timeout(Some(settings.timeout))
        .get_receipt()
        .await
        .map_err(|e| match e {
            PendingTransactionError::TxWatcher(_) => {
                BlockchainError::ConfirmationTimeout(settings.confirmations)
            }
            other => BlockchainError::ProviderConnectivity(format!(
                "receipt for {}: {}",
                tx_hash, other
            )),
        })?;

    if !receipt.status() {
        tracing::warn!(
            tx_hash = %tx_hash,
            block_number = ?receipt.block_number,
            "Transaction reverted"
        );
        return Err(BlockchainError::Reverted {
            tx_hash,
            block_number: receipt.block_number,
        });
    }

    let confirmation = Confirmation {
        tx_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
    };
    tracing::info!(
        tx_hash = %tx_hash,
        block_number = ?receipt.block_number,
        gas_used = receipt.gas_used,
        "Transaction confirmed"
    );
    Ok(confirmation)
}
