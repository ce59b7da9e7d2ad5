//! Venue Core Library
//!
//! Signing domain, typed messages, operation builder, nonce tracking and
//! signer recovery shared by the wallet adapters and signing coordinators.

pub mod config;
pub mod error;
pub mod nonce;
pub mod operations;
pub mod serde_util;
pub mod signing;

pub use error::{Error, Result};
pub use nonce::NonceTracker;
pub use operations::{OperationFields, OperationKind};
pub use signing::{DomainDescriptor, TypedMessage};
