//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a network's JSON-RPC endpoint
//! - Query chain state (chain ID, block number, accounts, gas price)
//! - Bound every request with the configured timeout
//! - Check the endpoint serves the chain the registry declares

use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use tokio::time::timeout;
use url::Url;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::config::schema::RpcConfig;
use crate::registry::NetworkDescriptor;

/// RPC client bound to one registered network.
#[derive(Clone)]
pub struct NetworkClient {
    provider: DynProvider,
    network: String,
    chain_id: u64,
    rpc_url: Url,
    timeout_duration: Duration,
}

impl NetworkClient {
    /// Create a read-only client for a network.
    pub fn connect(network: &NetworkDescriptor, rpc: &RpcConfig) -> BlockchainResult<Self> {
        let rpc_url = endpoint(network)?;
        let provider = ProviderBuilder::new().connect_http(rpc_url.clone()).erased();
        Ok(Self::with_provider(network, rpc, rpc_url, provider))
    }

    /// Create a client that signs outgoing transactions with `signer`.
    pub fn connect_with_signer(
        network: &NetworkDescriptor,
        rpc: &RpcConfig,
        signer: PrivateKeySigner,
    ) -> BlockchainResult<Self> {
        let rpc_url = endpoint(network)?;
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect_http(rpc_url.clone())
            .erased();
        Ok(Self::with_provider(network, rpc, rpc_url, provider))
    }

    fn with_provider(
        network: &NetworkDescriptor,
        rpc: &RpcConfig,
        rpc_url: Url,
        provider: DynProvider,
    ) -> Self {
        tracing::debug!(
            network = %network.name,
            chain_id = network.chain_id,
            timeout_secs = rpc.timeout_secs,
            "RPC client created"
        );
        Self {
            provider,
            network: network.name.clone(),
            chain_id: network.chain_id,
            rpc_url,
            timeout_duration: Duration::from_secs(rpc.timeout_secs),
        }
    }

    /// Bound any call with the request timeout, leaving its result untouched.
    pub(crate) async fn bounded<F>(
        &self,
        method: &'static str,
        call: F,
    ) -> BlockchainResult<F::Output>
    where
        F: IntoFuture,
    {
        timeout(self.timeout_duration, call).await.map_err(|_| {
            tracing::warn!(network = %self.network, method, "RPC timeout");
            BlockchainError::Timeout(self.timeout_duration.as_secs())
        })
    }

    async fn request<T, E, F>(&self, method: &'static str, call: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        self.bounded(method, call).await?.map_err(|e| {
            tracing::warn!(network = %self.network, method, error = %e, "RPC error");
            BlockchainError::ProviderConnectivity(format!("{} on {}: {}", method, self.network, e))
        })
    }

    /// Verify the connected chain ID matches the registry.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.request("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.request("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    /// Accounts managed by the node (`eth_accounts`).
    pub async fn get_accounts(&self) -> BlockchainResult<Vec<Address>> {
        self.request("eth_accounts", self.provider.get_accounts())
            .await
    }

    /// Get the native balance of an address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.request("eth_getBalance", self.provider.get_balance(address))
            .await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.request("eth_gasPrice", self.provider.get_gas_price())
            .await
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    /// Chain ID declared by the registry.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_duration
    }
}

fn endpoint(network: &NetworkDescriptor) -> BlockchainResult<Url> {
    network.rpc_url.clone().ok_or_else(|| {
        BlockchainError::NotAvailable(format!("network '{}' has no RPC url", network.name))
    })
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("network", &self.network)
            .field("rpc_url", &self.rpc_url.as_str())
            .field("chain_id", &self.chain_id)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::GasPolicy;

    fn descriptor(url: Option<&str>) -> NetworkDescriptor {
        NetworkDescriptor {
            name: "localhost".to_string(),
            rpc_url: url.map(|u| u.parse().unwrap()),
            chain_id: 31337,
            development: true,
            signer_keys: Vec::new(),
            gas: GasPolicy::default(),
        }
    }

    fn rpc() -> RpcConfig {
        RpcConfig {
            timeout_secs: 2,
            ..RpcConfig::default()
        }
    }

    #[tokio::test]
    async fn test_client_creation() {
        // Creating a client does not touch the network.
        let client = NetworkClient::connect(&descriptor(Some("http://127.0.0.1:8545")), &rpc());
        assert!(client.is_ok());
        let client = client.unwrap();
        assert_eq!(client.chain_id(), 31337);
        assert_eq!(client.timeout(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_network_without_url() {
        let err = NetworkClient::connect(&descriptor(None), &rpc()).unwrap_err();
        assert!(matches!(err, BlockchainError::NotAvailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connectivity_error() {
        // Port 9 (discard) is closed on any sane test host.
        let client =
            NetworkClient::connect(&descriptor(Some("http://127.0.0.1:9")), &rpc()).unwrap();
        let err = client.get_chain_id().await.unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::ProviderConnectivity(_) | BlockchainError::Timeout(_)
        ));
    }

    #[test]
    fn test_debug_omits_provider() {
        let client =
            NetworkClient::connect(&descriptor(Some("http://127.0.0.1:8545")), &rpc()).unwrap();
        let rendered = format!("{:?}", client);
        assert!(rendered.contains("localhost"));
        assert!(rendered.contains("31337"));
    }
}
