//! EIP-712 typed data for the trading venue.
//!
//! # Architecture
//!
//! ```text
//! DomainDescriptor ──┐
//!                    ├──► TypedMessage ──► signing_hash() ──► wallet signs
//! operation fields ──┘          │
//!                               └──► recover_signer(message, signature) ──► Address
//! ```
//!
//! # Example
//!
//! ```ignore
//! use venue_core::operations::{build, OperationFields};
//! use venue_core::signing::{recover_signer, DomainDescriptor};
//!
//! let domain = DomainDescriptor::new("Venue Exchange", "1", 1, "0xCcCC...cccC")?;
//! let fields = OperationFields::new()
//!     .with("account", "0xf39F...2266")
//!     .with("token", "0x2791...4174")
//!     .with("amount", "1000000")
//!     .with("nonce", "0")
//!     .with("deadline", "1700003600");
//! let message = build("deposit", &domain, &fields)?;
//!
//! let signer = recover_signer(&message, &signature_hex)?;
//! ```

pub mod domain;
pub mod eip712;
pub mod recovery;
pub mod typed_data;

pub use domain::{DomainDescriptor, DEFAULT_DOMAIN_VERSION};
pub use recovery::{decode_signature, is_signed_by, recover_from_digest, recover_signer, SIGNATURE_LENGTH};
pub use typed_data::{TypeField, TypedMessage, EIP712_DOMAIN_TYPE_NAME};
