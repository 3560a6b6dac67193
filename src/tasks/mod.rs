//! Command-line tasks.
//!
//! # Data Flow
//! ```text
//! Registry + selected network
//!     → Toolbox::assemble (signer provider, explorer client, size reporter)
//!     → task function (accounts, check-chain, verify-status, size)
//!     → stdout report / TaskError
//! ```
//!
//! Tasks receive their capabilities from the `Toolbox`; none of them reach
//! for the environment or the registry on their own.

pub mod accounts;
pub mod chain;
pub mod size;
pub mod verify;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::blockchain::client::NetworkClient;
use crate::blockchain::signers::{LocalSigners, NodeSigners, SignerProvider};
use crate::blockchain::types::BlockchainError;
use crate::config::loader::ConfigError;
use crate::probe::scenario::ScenarioError;
use crate::registry::{NetworkDescriptor, Registry, Verification};

pub use accounts::accounts;
pub use chain::{check_chains, ChainCheck};
pub use size::{ContractSize, ContractSizer};
pub use verify::{ExplorerClient, SourceStatus};

/// Errors surfaced by a task run.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chain(#[from] BlockchainError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("Explorer error: {0}")]
    Explorer(String),

    #[error("Verification unavailable for {network}: {reason}")]
    VerificationUnavailable {
        network: String,
        reason: &'static str,
    },

    #[error("{0} chain check(s) failed")]
    ChecksFailed(usize),

    #[error("Malformed artifact {path}: {reason}")]
    Artifact { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability providers for one network, handed to each task.
pub struct Toolbox {
    network: NetworkDescriptor,
    signers: Box<dyn SignerProvider>,
    explorer: Result<ExplorerClient, &'static str>,
    sizer: ContractSizer,
}

impl Toolbox {
    /// Assemble the providers for `network_name`.
    ///
    /// Configured keys become local signers; a development network without
    /// keys falls back to the node's own accounts.
    pub fn assemble(
        registry: &Registry,
        network_name: &str,
        artifacts: impl Into<PathBuf>,
    ) -> Result<Self, TaskError> {
        let network = registry.resolve_network(network_name)?.clone();

        let signers: Box<dyn SignerProvider> = if network.has_local_signers() {
            Box::new(LocalSigners::from_keys(&network.signer_keys, network.chain_id)?)
        } else if network.development {
            Box::new(NodeSigners::new(NetworkClient::connect(&network, registry.rpc())?))
        } else {
            tracing::warn!(network = %network.name, "No signer keys resolved");
            Box::new(LocalSigners::default())
        };

        let timeout = Duration::from_secs(registry.rpc().timeout_secs);
        let explorer = match registry.resolve_verification(network_name)? {
            Verification::Enabled(descriptor) => {
                Ok(ExplorerClient::new(descriptor.clone(), timeout)?)
            }
            Verification::Disabled => Err("verification is disabled"),
            Verification::NotConfigured => Err("no explorer API key configured"),
        };

        tracing::debug!(
            network = %network.name,
            development = network.development,
            explorer = explorer.is_ok(),
            "Toolbox assembled"
        );
        Ok(Self {
            network,
            signers,
            explorer,
            sizer: ContractSizer::new(artifacts),
        })
    }

    pub fn network(&self) -> &NetworkDescriptor {
        &self.network
    }

    pub fn signers(&self) -> &dyn SignerProvider {
        self.signers.as_ref()
    }

    pub fn explorer(&self) -> Result<&ExplorerClient, TaskError> {
        self.explorer
            .as_ref()
            .map_err(|reason| TaskError::VerificationUnavailable {
                network: self.network.name.clone(),
                reason: *reason,
            })
    }

    pub fn sizer(&self) -> &ContractSizer {
        &self.sizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::builtin_config;
    use crate::registry::LoadPolicy;
    use std::collections::HashMap;

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn registry(pairs: &[(&str, &str)]) -> Registry {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Registry::load(builtin_config().unwrap(), &env, &LoadPolicy::default()).unwrap()
    }

    #[tokio::test]
    async fn test_local_signers_from_keys() {
        let registry = registry(&[("PRIVATE_KEY", TEST_PRIVATE_KEY)]);
        let toolbox = Toolbox::assemble(&registry, "sepolia", "artifacts").unwrap();

        let mut out = Vec::new();
        assert_eq!(accounts(toolbox.signers(), &mut out).await.unwrap(), 1);
        assert_eq!(
            String::from_utf8(out).unwrap().trim().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[tokio::test]
    async fn test_no_keys_yields_no_accounts() {
        let toolbox = Toolbox::assemble(&registry(&[]), "base_mainnet", "artifacts").unwrap();
        let mut out = Vec::new();
        assert_eq!(accounts(toolbox.signers(), &mut out).await.unwrap(), 0);
    }

    #[test]
    fn test_explorer_availability() {
        let registry = registry(&[("ETHERSCAN_API_KEY", "key")]);

        let blast = Toolbox::assemble(&registry, "blast_mainnet", "artifacts").unwrap();
        assert_eq!(
            blast.explorer().unwrap().descriptor().api_url.as_str(),
            "https://api.blastscan.io/api"
        );

        let localhost = Toolbox::assemble(&registry, "localhost", "artifacts").unwrap();
        let err = localhost.explorer().unwrap_err();
        assert!(matches!(
            err,
            TaskError::VerificationUnavailable { ref network, .. } if network == "localhost"
        ));
    }

    #[test]
    fn test_unknown_network() {
        let err = Toolbox::assemble(&registry(&[]), "hogwarts", "artifacts").err().unwrap();
        assert!(matches!(err, TaskError::Config(ConfigError::UnknownNetwork(_))));
    }

    #[test]
    fn test_sizer_directory() {
        let toolbox = Toolbox::assemble(&registry(&[]), "localhost", "build/artifacts").unwrap();
        assert_eq!(toolbox.sizer().artifacts(), std::path::Path::new("build/artifacts"));
    }
}
