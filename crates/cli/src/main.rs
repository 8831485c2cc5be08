//! BTP bridge setup CLI.
//!
//! Command-line interface for setting up BTP bridges between locally running
//! chains. Provides commands for:
//! - BTP bridge setup (ICON to ICON, ICON to Ethereum / Hardhat)
//! - Listing the services recorded in the registry
//! - Configuration management
//!
//! Exit codes: 0 on success, 3 when the bridge is already running, 1 on any
//! other failure.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::{ChainPair, HttpWorkflowEngine};
use orchestrator::BridgeOrchestrator;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::Outcome;
use config::Config;
use output::OutputFormatter;

/// Exit code of a setup that found the bridge already running.
const EXIT_ALREADY_RUNNING: i32 = 3;

/// BTP Bridge Setup CLI
#[derive(Parser)]
#[command(name = "bridge-setup")]
#[command(author, version, about = "BTP bridge setup orchestrator", long_about = None)]
struct Cli {
    /// Workflow engine endpoint (overrides config)
    #[arg(long, global = true, env = "BRIDGE_ENGINE_ENDPOINT")]
    engine_endpoint: Option<String>,

    /// Enclave hosting the chain services (overrides config)
    #[arg(long, global = true, env = "BRIDGE_ENCLAVE")]
    enclave: Option<String>,

    /// Output format: table, json
    #[arg(long, global = true, value_name = "FORMAT", env = "BRIDGE_OUTPUT")]
    output: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable JSON output (shorthand for --output json)
    #[arg(long, global = true)]
    json: bool,

    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bridge operations
    #[command(subcommand)]
    Bridge(BridgeCommands),

    /// Service registry operations
    #[command(subcommand)]
    Services(ServicesCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum BridgeCommands {
    /// Set up a BTP bridge between two chains
    Btp {
        /// First chain: icon, eth or hardhat
        #[arg(long = "chainA", value_name = "CHAIN")]
        chain_a: String,

        /// Second chain: icon, eth or hardhat
        #[arg(long = "chainB", value_name = "CHAIN")]
        chain_b: String,

        /// Service name of an already running chain A node
        #[arg(long = "chainAServiceName", value_name = "NAME")]
        chain_a_service: Option<String>,

        /// Service name of an already running chain B node
        #[arg(long = "chainBServiceName", value_name = "NAME")]
        chain_b_service: Option<String>,

        /// Start the relay between the chains once the contracts are deployed
        #[arg(long)]
        bridge: bool,
    },
}

#[derive(Subcommand)]
enum ServicesCommands {
    /// List services recorded in the registry
    List,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set workflow engine endpoint
    SetEndpoint {
        /// Workflow engine endpoint URL
        endpoint: String,
    },

    /// Set enclave
    SetEnclave {
        /// Enclave name
        enclave: String,
    },

    /// Set output format
    SetFormat {
        /// Output format (table or json)
        format: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;

    // Override config with CLI arguments
    if let Some(endpoint) = cli.engine_endpoint {
        config.engine_endpoint = endpoint;
    }

    if let Some(enclave) = cli.enclave {
        config.enclave = enclave;
    }

    if let Some(output) = cli.output {
        config.output_format = output;
    }

    if cli.no_color {
        config.colored = false;
    }

    if cli.json {
        config.output_format = "json".to_string();
    }

    let json_mode = config.output_format == "json";
    let formatter = OutputFormatter::new(config.colored, json_mode);

    let result = match cli.command {
        Commands::Bridge(cmd) => handle_bridge_command(cmd, &config, &formatter).await,
        Commands::Services(cmd) => handle_services_command(cmd, &config, &formatter),
        Commands::Config(cmd) => {
            handle_config_command(cmd, config, &formatter).map(|()| Outcome::Done)
        }
    };

    match result {
        Ok(Outcome::Done) => Ok(()),
        Ok(Outcome::AlreadyRunning) => std::process::exit(EXIT_ALREADY_RUNNING),
        Err(e) => {
            formatter.error(&format!("Error: {:#}", e));
            std::process::exit(1);
        }
    }
}

async fn handle_bridge_command(
    cmd: BridgeCommands,
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<Outcome> {
    match cmd {
        BridgeCommands::Btp {
            chain_a,
            chain_b,
            chain_a_service,
            chain_b_service,
            bridge,
        } => {
            let mut pair = parse_pair(&chain_a, &chain_b)?.with_bridge(bridge);
            if let Some(name) = chain_a_service {
                pair = pair.with_chain_a_service(name);
            }
            if let Some(name) = chain_b_service {
                pair = pair.with_chain_b_service(name);
            }

            debug!(
                "Using workflow engine {} (enclave {})",
                config.engine_endpoint, config.enclave
            );
            let engine =
                HttpWorkflowEngine::new(config.engine_endpoint.clone(), config.request_timeout())
                    .context("Failed to create workflow engine client")?;
            let orchestrator = BridgeOrchestrator::standard(
                Arc::new(engine),
                Arc::new(config.service_store()),
                config.bridge_config(),
            );

            commands::bridge::setup_btp(&orchestrator, formatter, pair).await
        }
    }
}

/// Parse the chain names, naming the pair and phase on failure like the
/// orchestrator's own setup errors.
fn parse_pair(chain_a: &str, chain_b: &str) -> Result<ChainPair> {
    ChainPair::parse(chain_a, chain_b).with_context(|| {
        format!("BTP setup failed for chain A {chain_a} and chain B {chain_b} during validation")
    })
}

fn handle_services_command(
    cmd: ServicesCommands,
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<Outcome> {
    match cmd {
        ServicesCommands::List => {
            commands::services::list_services(&config.service_store(), formatter)?;
            Ok(Outcome::Done)
        }
    }
}

fn handle_config_command(
    cmd: ConfigCommands,
    config: Config,
    formatter: &OutputFormatter,
) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            if formatter.json_mode {
                formatter.json(&config)?;
            } else {
                formatter.header("Current Configuration");
                formatter.kv("Engine Endpoint", &config.engine_endpoint);
                formatter.kv("Enclave", &config.enclave);
                formatter.kv("Package", &config.package);
                formatter.kv("Bridge Script", &config.bridge_script);
                formatter.kv("Output Directory", &config.output_dir.display().to_string());
                formatter.kv(
                    "Request Timeout",
                    &config
                        .request_timeout_secs
                        .map(|secs| format!("{}s", secs))
                        .unwrap_or_else(|| "None".to_string()),
                );
                formatter.kv("Output Format", &config.output_format);
                formatter.kv("Colored Output", &config.colored.to_string());

                println!();
                let config_path = Config::config_path()?;
                formatter.info(&format!("Config file: {}", config_path.display()));
            }
            Ok(())
        }
        // Setters persist on top of the stored file, not the flag overrides.
        ConfigCommands::SetEndpoint { endpoint } => {
            Config::load()?.set_engine_endpoint(endpoint.clone())?;
            formatter.success(&format!("Engine endpoint set to: {}", endpoint));
            Ok(())
        }
        ConfigCommands::SetEnclave { enclave } => {
            Config::load()?.set_enclave(enclave.clone())?;
            formatter.success(&format!("Enclave set to: {}", enclave));
            Ok(())
        }
        ConfigCommands::SetFormat { format } => {
            Config::load()?.set_output_format(format.clone())?;
            formatter.success(&format!("Output format set to: {}", format));
            Ok(())
        }
    }
}
