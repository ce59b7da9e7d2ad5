//! Venue Sign CLI
//!
//! Builds operation messages and signs or verifies them with local keys.
//! JSON results go to stdout, logs to stderr.

mod commands;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use venue_core::config::Config;

/// Command-line arguments for the signing tool.
#[derive(Parser, Debug)]
#[command(author, version, about = "Build, sign and verify venue typed-data messages", long_about = None)]
struct Cli {
    /// Configuration file; environment variables are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the typed message for an operation
    Build(OperationArgs),

    /// Sign an operation with one local key
    Sign {
        #[command(flatten)]
        operation: OperationArgs,

        /// Environment variable holding the private key
        #[arg(long, default_value = "WALLET_PRIVATE_KEY")]
        key_var: String,
    },

    /// Collect signatures from several local keys and aggregate them
    Multisign {
        #[command(flatten)]
        operation: OperationArgs,

        /// Environment variable holding a signer's private key; repeatable
        #[arg(long = "key-var", required = true)]
        key_vars: Vec<String>,
    },

    /// Verify a signature aggregate against the configured signer set
    Verify {
        /// Path to the aggregate JSON
        #[arg(long)]
        aggregate: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct OperationArgs {
    /// Operation kind (deposit, withdrawal, order, cancel)
    #[arg(short, long)]
    pub kind: String,

    /// Operation field as name=value; repeatable
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Seconds until the deadline when no deadline field is given
    #[arg(long, default_value_t = 3600)]
    pub expires_in: i64,
}

fn parse_field(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty field name in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Config::from_env().context("failed to load config from environment"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = format!(
        "sign_cli={level},venue_core={level},wallets={level},multisig={level}",
        level = cli.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(cli.config.as_deref())?;
    info!(
        domain = %config.domain.name,
        chain_id = config.domain.chain_id,
        "Loaded configuration"
    );

    match cli.command {
        Command::Build(operation) => commands::build(&config, &operation),
        Command::Sign { operation, key_var } => commands::sign(&config, &operation, &key_var).await,
        Command::Multisign {
            operation,
            key_vars,
        } => commands::multisign(&config, &operation, &key_vars).await,
        Command::Verify { aggregate } => commands::verify(&config, &aggregate),
    }
}
