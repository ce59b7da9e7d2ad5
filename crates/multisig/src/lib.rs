//! Single- and multi-signer coordination over typed-data wallets.
//!
//! - [`SingleSignCoordinator`] drives one wallet and returns a [`SignatureRecord`].
//! - [`MultiSignCoordinator`] collects signatures from a registry of wallets,
//!   packages them into a [`SignatureAggregate`] and verifies the aggregate
//!   against a [`MultiSignConfig`] threshold.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod multi;
pub mod registry;
pub mod single;

#[cfg(test)]
mod testing;

pub use aggregate::{
    verify_aggregate, CollectedSignature, PairStatus, PairVerification, SignatureAggregate,
    VerificationOutcome,
};
pub use config::{AggregationMethod, MultiSignConfig};
pub use error::{CoordinatorError, Result, SignerFailure};
pub use multi::{MultiSignCoordinator, SigningRound};
pub use registry::WalletRegistry;
pub use single::{SignatureRecord, SingleSignCoordinator};
