//! The `check-chain` task: compare declared chain IDs with live endpoints.

use std::io::Write;

use crate::blockchain::client::NetworkClient;
use crate::blockchain::types::BlockchainError;
use crate::registry::{NetworkDescriptor, Registry};
use crate::tasks::TaskError;

/// Outcome for one network.
#[derive(Debug)]
pub struct ChainCheck {
    pub network: String,
    pub expected: u64,
    /// Latest block height when the endpoint serves the declared chain.
    pub outcome: Result<u64, BlockchainError>,
}

impl ChainCheck {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Check each network in turn. Networks without an RPC url are skipped.
pub async fn check_chains<'a>(
    registry: &Registry,
    networks: impl IntoIterator<Item = &'a NetworkDescriptor>,
) -> Vec<ChainCheck> {
    let mut checks = Vec::new();
    for network in networks {
        if network.rpc_url.is_none() {
            tracing::debug!(network = %network.name, "No RPC url, skipping chain check");
            continue;
        }
        let outcome = match NetworkClient::connect(network, registry.rpc()) {
            Ok(client) => match client.verify_chain_id().await {
                Ok(()) => client.get_block_number().await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            tracing::warn!(network = %network.name, error = %e, "Chain check failed");
        }
        checks.push(ChainCheck {
            network: network.name.clone(),
            expected: network.chain_id,
            outcome,
        });
    }
    checks
}

/// Print the checks; fails if any check failed.
pub fn write_report<W: Write>(checks: &[ChainCheck], out: &mut W) -> Result<(), TaskError> {
    for check in checks {
        match &check.outcome {
            Ok(block) => writeln!(
                out,
                "{:<20} {:>10}  ok (block {})",
                check.network, check.expected, block
            )?,
            Err(e) => writeln!(out, "{:<20} {:>10}  FAILED: {}", check.network, check.expected, e)?,
        }
    }
    let failed = checks.iter().filter(|c| !c.passed()).count();
    if failed > 0 {
        return Err(TaskError::ChecksFailed(failed));
    }
    Ok(())
}
