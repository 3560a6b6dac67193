//! Mint acceptance scenario.
//!
//! # Responsibilities
//! - Describe one mint call and the balance it should leave behind
//! - Run it against any `MintTarget` (live contract or test double)
//! - Report a balance mismatch as an error, never as a warning

use alloy::primitives::{address, Address, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, BlockchainResult, Confirmation};
use crate::probe::allowlist::AllowListAuth;

/// 0.15 ether.
pub const ACCEPTANCE_VALUE_WEI: u128 = 150_000_000_000_000_000;

/// Collection the acceptance scenario was written against.
pub const ACCEPTANCE_CONTRACT: Address = address!("43F6A56a2fc5c5b55eb893CF73efb13BEe0338ba");

/// Beneficiary whose balance the acceptance scenario checks.
pub const ACCEPTANCE_BENEFICIARY: Address = address!("60A59d7003345843BE285c15c7C78B62b61e0d7c");

/// Contract surface the scenario needs.
#[async_trait]
pub trait MintTarget: Send + Sync {
    /// Mint `quantity` tokens to the caller, paying `value`, and wait for
    /// the transaction to be final.
    async fn mint(
        &self,
        auth: &AllowListAuth,
        quantity: U256,
        value: U256,
    ) -> BlockchainResult<Confirmation>;

    async fn balance_of(&self, owner: Address) -> BlockchainResult<U256>;
}

/// One mint call plus its expected post-state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintScenario {
    pub contract: Address,
    pub auth: AllowListAuth,
    pub quantity: U256,
    pub value: U256,
    pub beneficiary: Address,
    pub expected_balance: U256,
}

impl MintScenario {
    /// Public-tier mint of 10 for 0.15 ether; the beneficiary starts at 10
    /// and must end at 20.
    pub fn acceptance() -> Self {
        Self {
            contract: ACCEPTANCE_CONTRACT,
            auth: AllowListAuth::public(),
            quantity: U256::from(10),
            value: U256::from(ACCEPTANCE_VALUE_WEI),
            beneficiary: ACCEPTANCE_BENEFICIARY,
            expected_balance: U256::from(20),
        }
    }
}

/// What a successful run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub confirmation: Confirmation,
    pub balance_before: U256,
    pub balance_after: U256,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Chain(#[from] BlockchainError),

    #[error("balance of {beneficiary} is {actual}, expected {expected}")]
    BalanceMismatch {
        beneficiary: Address,
        expected: U256,
        actual: U256,
    },
}

/// Run the scenario: mint, await finality, check the balance.
pub async fn run_scenario(
    target: &dyn MintTarget,
    scenario: &MintScenario,
) -> Result<ScenarioReport, ScenarioError> {
    let balance_before = target.balance_of(scenario.beneficiary).await?;
    tracing::info!(
        contract = %scenario.contract,
        beneficiary = %scenario.beneficiary,
        balance = %balance_before,
        "Scenario starting"
    );

    let confirmation = target
        .mint(&scenario.auth, scenario.quantity, scenario.value)
        .await?;

    let balance_after = target.balance_of(scenario.beneficiary).await?;
    if balance_after != scenario.expected_balance {
        return Err(ScenarioError::BalanceMismatch {
            beneficiary: scenario.beneficiary,
            expected: scenario.expected_balance,
            actual: balance_after,
        });
    }

    tracing::info!(
        tx_hash = %confirmation.tx_hash,
        balance = %balance_after,
        "Scenario passed"
    );
    Ok(ScenarioReport {
        confirmation,
        balance_before,
        balance_after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance_fixture() {
        let scenario = MintScenario::acceptance();
        assert!(scenario.auth.is_public());
        assert!(scenario.auth.proof.is_empty());
        assert_eq!(scenario.quantity, U256::from(10));
        assert_eq!(
            scenario.value,
            alloy::primitives::utils::parse_ether("0.15").unwrap()
        );
        assert_eq!(
            scenario.contract.to_string().to_lowercase(),
            "0x43f6a56a2fc5c5b55eb893cf73efb13bee0338ba"
        );
        assert_eq!(
            scenario.beneficiary.to_string().to_lowercase(),
            "0x60a59d7003345843be285c15c7c78b62b61e0d7c"
        );
    }

    #[test]
    fn test_mismatch_message() {
        let err = ScenarioError::BalanceMismatch {
            beneficiary: ACCEPTANCE_BENEFICIARY,
            expected: U256::from(20),
            actual: U256::from(10),
        };
        assert!(err.to_string().ends_with("is 10, expected 20"));
    }
}
