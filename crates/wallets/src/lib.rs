//! Wallet backends for typed-data signing.
//!
//! Every backend implements [`WalletSigner`]:
//! - [`ExtensionWallet`] - browser extension via EIP-1193
//! - [`InjectedWallet`] - generic injected provider, silent reconnect
//! - [`LibraryWallet`] - hook-style wallet library with its own account state
//! - [`LocalWallet`] - in-process private key

pub mod error;
pub mod extension;
pub mod injected;
pub mod library;
pub mod local;
pub mod provider;
pub mod signer;

#[cfg(test)]
mod testing;

pub use error::{Result, WalletError};
pub use extension::ExtensionWallet;
pub use injected::InjectedWallet;
pub use library::{LibraryAccount, LibraryError, LibraryWallet, SignTypedDataRequest, WalletLibrary};
pub use local::LocalWallet;
pub use provider::{typed_data_v4_payload, Eip1193Provider, RpcError};
pub use signer::{ConnectionInfo, WalletKind, WalletSigner};
