//! Deployer CLI
//!
//! Runs deploy plans against a configured network and inspects the
//! address registry.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use codec::KeyKind;
use deploy_config::{defaults, load_config, DeployerConfig};
use deployer::{DeployPlan, Deployer, EthersClient, EthersClientConfig};
use registry::{AddressRegistry, RegistryConfig};
use tracing::{error, info};
use types::AbiValue;

#[derive(Parser, Debug)]
#[command(name = "deployer")]
#[command(about = "Idempotent contract deployment with a per-network address registry")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network name from the configuration
    #[arg(short, long, default_value = defaults::DEFAULT_NETWORK)]
    network: String,

    /// Chain id, overrides the network's configured chain id
    #[arg(long)]
    chain_id: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record chain info, then deploy or reconnect every contract in a plan
    Deploy {
        /// Deploy plan (TOML)
        #[arg(short, long)]
        plan: PathBuf,

        /// Forget recorded addresses for this chain first
        #[arg(long)]
        fresh: bool,
    },

    /// Record chain id, network name, current block and RPC URL
    ChainInfo,

    /// Delete the registry file of the active chain
    Reset,

    /// Print the registry entry of the active chain
    Show,

    /// List chain ids with a registry file for the active network
    List,

    /// Derive an on-chain key, e.g. `key market 0x11.. 0x22..`
    Key {
        /// market, position, claimable-funding, vault-open-interest or execution-fee
        kind: KeyKind,

        /// Field values in schema order
        values: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let result = run(args).await;
    if let Err(e) = &result {
        error!("🛑 {:#}", e);
    }
    result
}

async fn run(args: Args) -> Result<()> {
    if let Command::Key { kind, values } = &args.command {
        return print_key(*kind, values);
    }

    let config = load_config(args.config.as_deref())?;
    let registry = build_registry(&config);

    match &args.command {
        Command::Deploy { plan, fresh } => {
            let plan = DeployPlan::from_file(plan)?;
            let mut deployer = connect(&args, &config, registry).await?;
            if *fresh {
                deployer.reset()?;
            }

            let deployments = plan.execute(&mut deployer).await?;
            for deployment in &deployments {
                info!(
                    "   - {}: {} ({})",
                    deployment.label,
                    types::format_address(&deployment.address()),
                    deployment.state
                );
            }
            info!(
                "Deployments performed this run: {}",
                deployer.deployments_performed()
            );
        }
        Command::ChainInfo => {
            let mut deployer = connect(&args, &config, registry).await?;
            let info = deployer.write_chain_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Reset => {
            let chain_id = offline_chain_id(&args, &config)?;
            if registry.reset(&args.network, chain_id)? {
                info!("Registry for {} ({}) removed", args.network, chain_id);
            } else {
                info!("No registry for {} ({})", args.network, chain_id);
            }
        }
        Command::Show => {
            let chain_id = offline_chain_id(&args, &config)?;
            let entry = registry.get(&args.network, chain_id)?;
            let document = serde_json::json!({
                "chainInfo": entry.chain_info,
                "addresses": entry.addresses,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::List => {
            for chain_id in registry.list(&args.network)? {
                println!("{}", chain_id);
            }
        }
        Command::Key { .. } => {}
    }

    Ok(())
}

fn build_registry(config: &DeployerConfig) -> AddressRegistry {
    let registry_config = config
        .ephemeral_networks()
        .into_iter()
        .fold(RegistryConfig::new(&config.registry.root), |c, network| {
            c.with_ephemeral(network)
        });
    AddressRegistry::new(registry_config)
}

async fn connect(
    args: &Args,
    config: &DeployerConfig,
    registry: AddressRegistry,
) -> Result<Deployer<EthersClient>> {
    let rpc_url = config.rpc_url(&args.network)?.to_string();
    let private_key = std::env::var(defaults::PRIVATE_KEY_VAR)
        .with_context(|| format!("{} is not set", defaults::PRIVATE_KEY_VAR))?;

    let client = EthersClient::connect(EthersClientConfig {
        rpc_url,
        chain_id: expected_chain_id(args, config)?,
        private_key,
        artifacts_dir: config.artifacts.dir.clone(),
        confirmations: config.deploy.confirmations,
        confirmation_timeout: Duration::from_secs(config.deploy.confirmation_timeout_secs),
        poll_interval: Duration::from_millis(config.deploy.poll_interval_ms),
    })
    .await?;

    Ok(Deployer::new(client, registry, args.network.clone()))
}

/// `--chain-id` wins over the network's configured chain id
fn expected_chain_id(args: &Args, config: &DeployerConfig) -> Result<Option<u64>> {
    Ok(args.chain_id.or(config.network(&args.network)?.chain_id))
}

fn offline_chain_id(args: &Args, config: &DeployerConfig) -> Result<u64> {
    match expected_chain_id(args, config)? {
        Some(chain_id) => Ok(chain_id),
        None => bail!(
            "Network '{}' has no configured chain_id, pass --chain-id",
            args.network
        ),
    }
}

fn print_key(kind: KeyKind, inputs: &[String]) -> Result<()> {
    // the execution-fee key has fixed fields and takes no input
    let expected = match kind {
        KeyKind::ExecutionFee => 0,
        _ => kind.schema().len(),
    };
    if inputs.len() != expected {
        bail!("{} key takes {} values, got {}", kind, expected, inputs.len());
    }

    let values = kind
        .schema()
        .iter()
        .zip(inputs)
        .map(|(param, input)| AbiValue::parse(param, input))
        .collect::<Result<Vec<_>, _>>()?;

    let key = kind.derive(&values)?;
    println!("{:#x}", key);
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}
