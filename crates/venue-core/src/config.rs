//! Configuration management for signing sessions.

use crate::nonce::NonceConfig;
use crate::signing::{DomainDescriptor, DEFAULT_DOMAIN_VERSION};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub domain: DomainConfig,
    #[serde(default)]
    pub nonce: NonceConfig,
    #[serde(default)]
    pub multisig: Option<MultisigSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: String,
}

/// Raw multi-signer settings; the coordinator crate validates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultisigSettings {
    pub threshold: usize,
    #[serde(default)]
    pub signers: Vec<String>,
    #[serde(default = "default_aggregation")]
    pub aggregation_method: String,
}

fn default_version() -> String {
    DEFAULT_DOMAIN_VERSION.to_string()
}

fn default_aggregation() -> String {
    "ecdsa-concat".to_string()
}

impl Config {
    /// Load configuration from environment variables (reads `.env` first).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = NonceConfig::default();

        let multisig = match env::var("MULTISIG_THRESHOLD").ok() {
            Some(threshold) => Some(MultisigSettings {
                threshold: parse_var("MULTISIG_THRESHOLD", &threshold)?,
                signers: env::var("MULTISIG_SIGNERS")
                    .map(|list| split_list(&list))
                    .unwrap_or_default(),
                aggregation_method: env::var("MULTISIG_AGGREGATION")
                    .unwrap_or_else(|_| default_aggregation()),
            }),
            None => None,
        };

        Ok(Self {
            domain: DomainConfig {
                name: required_var("DOMAIN_NAME")?,
                version: env::var("DOMAIN_VERSION").unwrap_or_else(|_| default_version()),
                chain_id: parse_var("CHAIN_ID", &required_var("CHAIN_ID")?)?,
                verifying_contract: required_var("VERIFYING_CONTRACT")?,
            },
            nonce: NonceConfig {
                origin: optional_var("NONCE_ORIGIN")?.unwrap_or(defaults.origin),
                max_age_secs: optional_var("NONCE_MAX_AGE_SECS")?.unwrap_or(defaults.max_age_secs),
                back_window: optional_var("NONCE_BACK_WINDOW")?.unwrap_or(defaults.back_window),
            },
            multisig,
        })
    }

    /// Load configuration from a file, with `VENUE__`-prefixed environment overrides
    /// (e.g. `VENUE__DOMAIN__CHAIN_ID=137`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("VENUE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validated signing domain.
    pub fn domain_descriptor(&self) -> Result<DomainDescriptor> {
        DomainDescriptor::new(
            self.domain.name.clone(),
            self.domain.version.clone(),
            self.domain.chain_id,
            &self.domain.verifying_contract,
        )
    }

    /// Load configuration for testing (with defaults).
    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            domain: DomainConfig {
                name: "Venue Exchange".to_string(),
                version: default_version(),
                chain_id: 1,
                verifying_contract: "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC".to_string(),
            },
            nonce: NonceConfig::default(),
            multisig: None,
        }
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config {
        message: format!("{} environment variable not set", name),
    })
}

fn optional_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) => parse_var(name, &value).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::Config {
        message: format!("{} has an invalid value: '{}'", name, value),
    })
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
