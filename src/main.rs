//! archetype: network registry diagnostics and mint probes.
//!
//! # Architecture Overview
//!
//! ```text
//!   networks.toml / --config FILE        .env + environment
//!              │                                │
//!              ▼                                ▼
//!      config (load + validate) ──────▶ registry (resolve secrets, LoadPolicy)
//!                                               │
//!                         ┌─────────────────────┼──────────────────────┐
//!                         ▼                     ▼                      ▼
//!                 tasks::Toolbox        blockchain::NetworkClient   probe
//!          (signers, explorer, sizer)     (alloy, timeouts)    (Archetype mint)
//!                         │                     │                      │
//!                         └──────────── stdout report / exit code ─────┘
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, B256, U256};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;

use archetype_tooling::blockchain::signers::{LocalSigners, NodeSigners, SignerProvider};
use archetype_tooling::blockchain::transaction::ConfirmationSettings;
use archetype_tooling::blockchain::NetworkClient;
use archetype_tooling::config::loader::{builtin_config, load_config};
use archetype_tooling::config::{ConfigError, ProcessEnv};
use archetype_tooling::observability::init_logging;
use archetype_tooling::probe::scenario::{ACCEPTANCE_BENEFICIARY, ACCEPTANCE_CONTRACT};
use archetype_tooling::probe::{
    run_scenario, AllowList, AllowListAuth, ArchetypeContract, MintScenario,
};
use archetype_tooling::registry::{self, LoadPolicy, Registry};
use archetype_tooling::tasks::{self, chain, size, SourceStatus, Toolbox};

#[derive(Parser)]
#[command(name = "archetype")]
#[command(
    about = "Network registry diagnostics and mint probes for Archetype collections",
    long_about = None
)]
struct Cli {
    /// Network declaration file (defaults to the built-in table)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Target network (defaults to the registry's default network)
    #[arg(short, long, global = true)]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the accounts of the selected network, one per line
    Accounts,
    /// List registered networks
    Networks,
    /// Compare declared chain IDs with the live endpoints
    CheckChain {
        /// Check every registered network
        #[arg(long)]
        all: bool,
    },
    /// Ask the network's explorer whether a contract's source is verified
    VerifyStatus {
        #[arg(long)]
        address: Address,
    },
    /// Report contract code sizes from compiled artifacts
    Size {
        #[arg(long, default_value = "artifacts")]
        artifacts: PathBuf,
    },
    /// Print an allow-list root and, optionally, one member's proof
    Allowlist {
        /// File with one address per line
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        address: Option<Address>,
    },
    /// Mint against a live collection and check the beneficiary's balance
    Mint(MintArgs),
}

#[derive(clap::Args)]
struct MintArgs {
    #[arg(long, default_value_t = ACCEPTANCE_CONTRACT)]
    contract: Address,
    #[arg(long, default_value_t = 10)]
    quantity: u64,
    /// Value attached to the mint, in ether
    #[arg(long, default_value = "0.15")]
    value: String,
    /// Allow-list key; zero selects the public tier
    #[arg(long, default_value_t = B256::ZERO)]
    key: B256,
    /// Merkle proof entries, in order
    #[arg(long, num_args = 1..)]
    proof: Vec<B256>,
    /// Derive key and proof for the sender from an allow-list file
    #[arg(long, conflicts_with_all = ["key", "proof"])]
    allow_list: Option<PathBuf>,
    #[arg(long, default_value_t = ACCEPTANCE_BENEFICIARY)]
    beneficiary: Address,
    /// Expected beneficiary balance after the mint
    #[arg(long, default_value_t = 20)]
    expect: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    let mut stdout = io::stdout().lock();
    match &cli.command {
        Commands::Accounts => {
            let (registry, network) = open(&cli, false)?;
            let toolbox = Toolbox::assemble(&registry, &network, "artifacts")?;
            tasks::accounts(toolbox.signers(), &mut stdout).await?;
        }
        Commands::Networks => {
            let registry = registry::load(cli.config.as_deref(), &LoadPolicy::default())?;
            print_networks(&registry, &mut stdout)?;
        }
        Commands::CheckChain { all } => {
            let (registry, network) = open(&cli, false)?;
            let checks = if *all {
                chain::check_chains(&registry, registry.networks()).await
            } else {
                chain::check_chains(&registry, [registry.resolve_network(&network)?]).await
            };
            chain::write_report(&checks, &mut stdout)?;
        }
        Commands::VerifyStatus { address } => {
            let (registry, network) = open(&cli, false)?;
            let toolbox = Toolbox::assemble(&registry, &network, "artifacts")?;
            let explorer = toolbox.explorer()?;
            let link = explorer.descriptor().address_url(&address.to_string());
            match explorer.source_status(*address).await? {
                SourceStatus::Verified {
                    contract_name,
                    compiler_version,
                } => writeln!(
                    stdout,
                    "verified: {} ({})\n{}",
                    contract_name, compiler_version, link
                )?,
                SourceStatus::Unverified => writeln!(stdout, "unverified\n{}", link)?,
            }
        }
        Commands::Size { artifacts } => {
            let (registry, network) = open(&cli, false)?;
            let toolbox = Toolbox::assemble(&registry, &network, artifacts)?;
            let sizes = toolbox.sizer().measure()?;
            size::write_report(&sizes, &mut stdout)?;
        }
        Commands::Allowlist { file, address } => {
            let list = AllowList::parse(&fs::read_to_string(file)?)?;
            writeln!(stdout, "root: {}", list.root())?;
            if let Some(address) = *address {
                let proof = list
                    .proof(address)
                    .ok_or_else(|| format!("{} is not on the allow-list", address))?;
                for node in proof {
                    writeln!(stdout, "{}", node)?;
                }
            }
        }
        Commands::Mint(args) => {
            let (registry, network) = open(&cli, true)?;
            mint(&registry, &network, args, &mut stdout).await?;
        }
    }

    Ok(())
}

/// Load the registry for the selected network.
fn open(cli: &Cli, value_transfers: bool) -> Result<(Registry, String), ConfigError> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => builtin_config()?,
    };
    let network = cli
        .network
        .clone()
        .unwrap_or_else(|| config.default_network.clone());
    let policy = if value_transfers {
        LoadPolicy::transacting(network.as_str())
    } else {
        LoadPolicy::read_only(network.as_str())
    };
    let registry = Registry::load(config, &ProcessEnv::with_dotenv(), &policy)?;
    Ok((registry, network))
}

fn print_networks<W: Write>(registry: &Registry, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>10}  {:<5} {:>7}  url",
        "network", "chain id", "dev", "signers"
    )?;
    for network in registry.networks() {
        let marker = if network.name == registry.default_network() { "*" } else { "" };
        writeln!(
            out,
            "{:<20} {:>10}  {:<5} {:>7}  {}",
            format!("{}{}", network.name, marker),
            network.chain_id,
            network.development,
            network.signer_keys.len(),
            network.rpc_url.as_ref().map_or("-", |url| url.as_str())
        )?;
    }
    Ok(())
}

async fn mint<W: Write>(
    registry: &Registry,
    network_name: &str,
    args: &MintArgs,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    let network = registry.resolve_network(network_name)?;
    let signers = LocalSigners::from_keys(&network.signer_keys, network.chain_id)?;

    let (client, sender) = match signers.primary() {
        Some(signer) => (
            NetworkClient::connect_with_signer(network, registry.rpc(), signer.clone())?,
            signer.address(),
        ),
        None => {
            // Development node: send from its first unlocked account.
            let client = NetworkClient::connect(network, registry.rpc())?;
            let sender = NodeSigners::new(client.clone())
                .accounts()
                .next()
                .await
                .ok_or_else(|| ConfigError::NoSigner(network.name.clone()))??;
            (client, sender)
        }
    };
    client.verify_chain_id().await?;
    let funds = client.get_balance(sender).await?;
    tracing::info!(network = %network.name, sender = %sender, balance = %funds, "Sender ready");

    let auth = match &args.allow_list {
        Some(path) => AllowList::parse(&fs::read_to_string(path)?)?
            .auth(sender)
            .ok_or_else(|| format!("{} is not on the allow-list", sender))?,
        None => AllowListAuth {
            key: args.key,
            proof: args.proof.clone(),
        },
    };

    let scenario = MintScenario {
        contract: args.contract,
        auth,
        quantity: U256::from(args.quantity),
        value: parse_ether(&args.value)?,
        beneficiary: args.beneficiary,
        expected_balance: U256::from(args.expect),
    };

    let contract = ArchetypeContract::new(
        client,
        scenario.contract,
        sender,
        network.gas,
        ConfirmationSettings::from(registry.rpc()),
    );

    let supply_before = contract.total_supply().await?;
    let report = run_scenario(&contract, &scenario).await?;
    let supply_after = contract.total_supply().await?;
    tracing::info!(
        supply_before = %supply_before,
        supply_after = %supply_after,
        "Collection supply"
    );
    writeln!(
        out,
        "tx {} in block {}: balance {} -> {}",
        report.confirmation.tx_hash,
        report
            .confirmation
            .block_number
            .map_or_else(|| "?".to_string(), |n| n.to_string()),
        report.balance_before,
        report.balance_after
    )?;
    Ok(())
}
