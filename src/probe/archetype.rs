//! Bindings to a deployed `Archetype` collection.

use alloy::eips::BlockId;
use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::SolInterface;
use async_trait::async_trait;

use crate::blockchain::client::NetworkClient;
use crate::blockchain::transaction::{await_confirmation, gas_price_override, ConfirmationSettings};
use crate::blockchain::types::{BlockchainError, BlockchainResult, Confirmation};
use crate::probe::allowlist::AllowListAuth;
use crate::probe::scenario::MintTarget;
use crate::registry::GasPolicy;

sol! {
    #[sol(rpc)]
    contract Archetype {
        struct Auth {
            bytes32 key;
            bytes32[] proof;
        }

        error WalletUnauthorizedToMint();
        error InsufficientEthSent();
        error ExcessiveEthSent();
        error MaxSupplyExceeded();
        error ListMaxSupplyExceeded();
        error NumberOfMintsExceeded();
        error MintingPaused();
        error MintNotYetStarted();
        error MintEnded();
        error InvalidReferral();

        function mint(Auth calldata auth, uint256 quantity) external payable;
        function balanceOf(address owner) external view returns (uint256);
        function totalSupply() external view returns (uint256);
    }
}

impl From<&AllowListAuth> for Archetype::Auth {
    fn from(auth: &AllowListAuth) -> Self {
        Self {
            key: auth.key,
            proof: auth.proof.clone(),
        }
    }
}

/// A deployed collection reached through a client that can send from
/// `sender`, either with its own wallet or through the node's accounts.
#[derive(Debug, Clone)]
pub struct ArchetypeContract {
    client: NetworkClient,
    address: Address,
    sender: Address,
    gas: GasPolicy,
    confirmations: ConfirmationSettings,
}

impl ArchetypeContract {
    pub fn new(
        client: NetworkClient,
        address: Address,
        sender: Address,
        gas: GasPolicy,
        confirmations: ConfirmationSettings,
    ) -> Self {
        Self {
            client,
            address,
            sender,
            gas,
            confirmations,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn instance(&self) -> Archetype::ArchetypeInstance<alloy::providers::DynProvider> {
        Archetype::new(self.address, self.client.provider().clone())
    }

    /// Total minted supply.
    pub async fn total_supply(&self) -> BlockchainResult<U256> {
        let contract = self.instance();
        let call = contract.totalSupply();
        self.client
            .bounded("totalSupply", call.call())
            .await?
            .map_err(contract_error)
    }
}

#[async_trait]
impl MintTarget for ArchetypeContract {
    async fn mint(
        &self,
        auth: &AllowListAuth,
        quantity: U256,
        value: U256,
    ) -> BlockchainResult<Confirmation> {
        let contract = self.instance();
        let mut call = contract
            .mint(auth.into(), quantity)
            .value(value)
            .from(self.sender);
        if let Some(limit) = self.gas.limit {
            call = call.gas(limit);
        }
        if let Some(price) = gas_price_override(&self.client, &self.gas).await? {
            call = call.gas_price(price);
        }

        tracing::info!(
            contract = %self.address,
            quantity = %quantity,
            value = %value,
            public = auth.is_public(),
            "Sending mint"
        );
        let pending = self
            .client
            .bounded("mint", call.send())
            .await?
            .map_err(contract_error)?;

        match await_confirmation(pending, self.confirmations).await {
            // With a fixed gas limit nothing is estimated, so a failing mint is
            // only seen once mined. Replay it at its block for the reason.
            Err(BlockchainError::Reverted {
                tx_hash,
                block_number: Some(block),
            }) => {
                let replay = call.block(BlockId::number(block));
                match self.client.bounded("mint replay", replay.call()).await? {
                    Err(e) => Err(contract_error(e)),
                    Ok(_) => Err(BlockchainError::Reverted {
                        tx_hash,
                        block_number: Some(block),
                    }),
                }
            }
            other => other,
        }
    }

    async fn balance_of(&self, owner: Address) -> BlockchainResult<U256> {
        let contract = self.instance();
        let call = contract.balanceOf(owner);
        self.client
            .bounded("balanceOf", call.call())
            .await?
            .map_err(contract_error)
    }
}

/// Map a contract call failure, decoding Archetype revert reasons.
fn contract_error(e: alloy::contract::Error) -> BlockchainError {
    if let Some(data) = e.as_revert_data() {
        return match Archetype::ArchetypeErrors::abi_decode(&data) {
            Ok(decoded) => BlockchainError::ExternalContractCall(format!(
                "reverted with {}",
                revert_name(&decoded)
            )),
            Err(_) => BlockchainError::ExternalContractCall(e.to_string()),
        };
    }
    match &e {
        alloy::contract::Error::TransportError(inner) if !inner.is_error_resp() => {
            BlockchainError::ProviderConnectivity(e.to_string())
        }
        _ => BlockchainError::ExternalContractCall(e.to_string()),
    }
}

fn revert_name(error: &Archetype::ArchetypeErrors) -> &'static str {
    use Archetype::ArchetypeErrors as E;
    match error {
        E::WalletUnauthorizedToMint(_) => "WalletUnauthorizedToMint",
        E::InsufficientEthSent(_) => "InsufficientEthSent",
        E::ExcessiveEthSent(_) => "ExcessiveEthSent",
        E::MaxSupplyExceeded(_) => "MaxSupplyExceeded",
        E::ListMaxSupplyExceeded(_) => "ListMaxSupplyExceeded",
        E::NumberOfMintsExceeded(_) => "NumberOfMintsExceeded",
        E::MintingPaused(_) => "MintingPaused",
        E::MintNotYetStarted(_) => "MintNotYetStarted",
        E::MintEnded(_) => "MintEnded",
        E::InvalidReferral(_) => "InvalidReferral",
    }
}
