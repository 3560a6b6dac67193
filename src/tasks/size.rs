//! Contract size report over compiled artifacts.
//!
//! Reads Hardhat-style artifact JSON (`contractName`, `sourceName`,
//! `bytecode`, `deployedBytecode`) below an artifacts directory and measures
//! init and runtime code against the EIP-3860 and EIP-170 limits.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::tasks::TaskError;

/// EIP-170 runtime code limit in bytes.
pub const DEPLOYED_CODE_LIMIT: usize = 24_576;

/// EIP-3860 init code limit in bytes.
pub const INIT_CODE_LIMIT: usize = 49_152;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Artifact {
    contract_name: String,
    #[serde(default)]
    source_name: Option<String>,
    #[serde(default)]
    bytecode: String,
    #[serde(default)]
    deployed_bytecode: String,
}

/// Measured sizes of one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSize {
    pub name: String,
    pub source: Option<String>,
    pub deployed: usize,
    pub init: usize,
}

impl ContractSize {
    pub fn exceeds_limits(&self) -> bool {
        self.deployed > DEPLOYED_CODE_LIMIT || self.init > INIT_CODE_LIMIT
    }
}

/// Size reporter bound to an artifacts directory.
#[derive(Debug, Clone)]
pub struct ContractSizer {
    artifacts: PathBuf,
}

impl ContractSizer {
    pub fn new(artifacts: impl Into<PathBuf>) -> Self {
        Self {
            artifacts: artifacts.into(),
        }
    }

    pub fn artifacts(&self) -> &Path {
        &self.artifacts
    }

    /// Measure every deployable contract, largest runtime code first.
    pub fn measure(&self) -> Result<Vec<ContractSize>, TaskError> {
        let mut files = Vec::new();
        collect_artifacts(&self.artifacts, &mut files)?;

        let mut sizes = Vec::new();
        for path in files {
            let content = fs::read_to_string(&path)?;
            let artifact: Artifact =
                serde_json::from_str(&content).map_err(|e| TaskError::Artifact {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;

            let deployed = code_size(&artifact.deployed_bytecode);
            if deployed == 0 {
                // Interfaces and abstract contracts.
                continue;
            }
            let size = ContractSize {
                name: artifact.contract_name,
                source: artifact.source_name,
                deployed,
                init: code_size(&artifact.bytecode),
            };
            if size.exceeds_limits() {
                tracing::warn!(
                    contract = %size.name,
                    deployed = size.deployed,
                    init = size.init,
                    "Contract exceeds code size limits"
                );
            }
            sizes.push(size);
        }

        sizes.sort_by(|a, b| b.deployed.cmp(&a.deployed).then_with(|| a.name.cmp(&b.name)));
        tracing::debug!(
            dir = %self.artifacts.display(),
            contracts = sizes.len(),
            "Artifacts measured"
        );
        Ok(sizes)
    }
}

fn collect_artifacts(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), TaskError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().map_or(false, |name| name == "build-info") {
                continue;
            }
            collect_artifacts(&path, files)?;
        } else if is_artifact(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_artifact(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".json") && !name.ends_with(".dbg.json")
}

/// Byte length of a hex code string (link placeholders count as code).
fn code_size(hex: &str) -> usize {
    hex.strip_prefix("0x").unwrap_or(hex).len() / 2
}

/// Print a size table; contracts over a limit are marked with `!`.
pub fn write_report<W: Write>(sizes: &[ContractSize], out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{:<40} {:>14} {:>14}", "contract", "deployed (KiB)", "init (KiB)")?;
    for size in sizes {
        writeln!(
            out,
            "{:<40} {:>14.3} {:>14.3}{}",
            size.name,
            size.deployed as f64 / 1024.0,
            size.init as f64 / 1024.0,
            if size.exceeds_limits() { "  !" } else { "" }
        )?;
    }
    Ok(())
}
