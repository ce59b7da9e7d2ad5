//! Subcommand handlers.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};
use venue_core::config::Config;
use venue_core::operations::{self, OperationFields};
use venue_core::{NonceTracker, TypedMessage};
use wallets::LocalWallet;

use multisig::{MultiSignConfig, MultiSignCoordinator, SignatureAggregate, SingleSignCoordinator};

use crate::OperationArgs;

pub fn build(config: &Config, operation: &OperationArgs) -> Result<()> {
    let message = prepare_message(config, operation)?;
    print_json(&message)
}

pub async fn sign(config: &Config, operation: &OperationArgs, key_var: &str) -> Result<()> {
    let message = prepare_message(config, operation)?;
    let wallet = load_wallet(key_var)?;

    let mut coordinator = SingleSignCoordinator::new(wallet);
    let record = coordinator
        .sign_message(&message)
        .await
        .context("signing failed")?;

    print_json(&record)
}

pub async fn multisign(config: &Config, operation: &OperationArgs, key_vars: &[String]) -> Result<()> {
    let message = prepare_message(config, operation)?;
    let mut coordinator = MultiSignCoordinator::new(multisig_config(config)?);

    for key_var in key_vars {
        if !coordinator.add_wallet(key_var.as_str(), load_wallet(key_var)?) {
            warn!(key_var = %key_var, "Key variable given twice, ignoring");
        }
    }

    let round = coordinator.sign_round(&message).await?;
    print_json(&round)?;

    if !round.outcome.satisfied {
        bail!(
            "aggregate has {} valid signature(s), {} required",
            round.outcome.valid_count,
            round.outcome.threshold
        );
    }
    Ok(())
}

pub fn verify(config: &Config, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let aggregate: SignatureAggregate =
        serde_json::from_str(&raw).context("failed to parse signature aggregate")?;

    let coordinator = MultiSignCoordinator::new(multisig_config(config)?);
    let outcome = coordinator.verify(&aggregate)?;
    print_json(&outcome)?;

    if !outcome.satisfied {
        bail!(
            "aggregate has {} valid signature(s), {} required",
            outcome.valid_count,
            outcome.threshold
        );
    }
    Ok(())
}

/// Build and validate the operation message.
///
/// A missing nonce comes from a tracker at the configured origin; a missing
/// deadline is `now + expires_in`.
fn prepare_message(config: &Config, operation: &OperationArgs) -> Result<TypedMessage> {
    let domain = config.domain_descriptor()?;
    let mut nonces = NonceTracker::with_config(&config.nonce)?;

    let mut fields = OperationFields::new();
    for (name, value) in &operation.fields {
        fields.insert(name.as_str(), Value::String(value.clone()));
    }
    if fields.get("nonce").is_none() {
        fields.insert("nonce", nonces.issue().to_string());
    }
    if fields.get("deadline").is_none() {
        let deadline = deadline_after(Utc::now(), operation.expires_in)?;
        fields.insert("deadline", deadline.to_string());
    }

    let message = operations::build(&operation.kind, &domain, &fields)?;

    let report = operations::validate(&message, &nonces);
    if !report.valid {
        bail!("message failed validation: {}", report.errors.join("; "));
    }

    info!(
        kind = %operation.kind,
        primary_type = message.primary_type(),
        "Built operation message"
    );
    Ok(message)
}

/// Unix timestamp `expires_in` seconds after `now`.
fn deadline_after(now: DateTime<Utc>, expires_in: i64) -> Result<i64> {
    let offset = Duration::try_seconds(expires_in)
        .with_context(|| format!("--expires-in {} is out of range", expires_in))?;
    let deadline = now
        .checked_add_signed(offset)
        .with_context(|| format!("--expires-in {} overflows the deadline", expires_in))?;
    Ok(deadline.timestamp())
}

fn multisig_config(config: &Config) -> Result<MultiSignConfig> {
    let settings = config
        .multisig
        .as_ref()
        .context("config has no multisig section")?;
    Ok(MultiSignConfig::try_from(settings)?)
}

fn load_wallet(key_var: &str) -> Result<LocalWallet> {
    let key = std::env::var(key_var)
        .with_context(|| format!("{} environment variable not set", key_var))?;
    LocalWallet::from_private_key(&key).with_context(|| format!("{} holds an invalid key", key_var))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
