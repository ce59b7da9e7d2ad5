//! Coordinator error taxonomy.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use wallets::WalletError;

/// One signer's failure during a collection round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerFailure {
    pub wallet_id: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: WalletError,
}

impl fmt::Display for SignerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.wallet_id, self.error)
    }
}

fn serialize_display<S: serde::Serializer>(error: &WalletError, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(error)
}

fn summarize(failures: &[SignerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// Connect or sign failed in a single-signer flow.
    #[error("Signing failed: {0}")]
    SigningFailed(#[from] WalletError),

    #[error("Threshold not met: {connected} signer(s) registered, {required} required")]
    ThresholdNotMet { required: usize, connected: usize },

    #[error("Signature collection failed for all {} signer(s): {}", .failures.len(), summarize(.failures))]
    SignatureCollectionFailed { failures: Vec<SignerFailure> },

    #[error("Invalid multi-sign config: {0}")]
    InvalidConfig(String),

    #[error("Malformed signature aggregate: {0}")]
    MalformedAggregate(String),

    #[error(transparent)]
    Core(#[from] venue_core::Error),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
