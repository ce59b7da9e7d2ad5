//! Signer capability shared by every wallet backend.
//!
//! Coordinators only see [`WalletSigner`]; backend-specific request shapes
//! stay inside each adapter.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use venue_core::TypedMessage;

use crate::error::Result;

/// Backend family of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    /// Browser extension speaking EIP-1193 JSON-RPC.
    Extension,
    /// Hook-driven wallet library holding its own reactive account state.
    Library,
    /// Generic injected provider.
    Injected,
    /// In-process private key.
    Local,
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletKind::Extension => write!(f, "extension wallet"),
            WalletKind::Library => write!(f, "library wallet"),
            WalletKind::Injected => write!(f, "injected wallet"),
            WalletKind::Local => write!(f, "local wallet"),
        }
    }
}

/// Result of a successful connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub address: Address,
    pub chain_id: Option<u64>,
    pub kind: WalletKind,
}

/// Capability set every wallet backend exposes.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn kind(&self) -> WalletKind;

    /// Whether the backend exists at all (extension installed, library ready).
    fn is_available(&self) -> bool;

    /// Connected account, if any.
    fn address(&self) -> Option<Address>;

    fn is_connected(&self) -> bool {
        self.address().is_some()
    }

    /// Connect, prompting the user where the backend requires it.
    ///
    /// Fails with [`WalletError::Connection`](crate::WalletError::Connection) on
    /// rejection or when the backend is absent.
    async fn connect(&mut self) -> Result<ConnectionInfo>;

    async fn disconnect(&mut self) -> Result<()>;

    /// Sign a typed message, returning a `0x`-prefixed 65-byte hex signature.
    ///
    /// Fails with [`WalletError::Signing`](crate::WalletError::Signing) when not
    /// connected or when the backend refuses.
    async fn sign_typed_data(&self, message: &TypedMessage) -> Result<String>;
}

#[async_trait]
impl WalletSigner for Box<dyn WalletSigner> {
    fn kind(&self) -> WalletKind {
        (**self).kind()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn address(&self) -> Option<Address> {
        (**self).address()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    async fn connect(&mut self) -> Result<ConnectionInfo> {
        (**self).connect().await
    }

    async fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect().await
    }

    async fn sign_typed_data(&self, message: &TypedMessage) -> Result<String> {
        (**self).sign_typed_data(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_kind_display() {
        assert_eq!(WalletKind::Extension.to_string(), "extension wallet");
        assert_eq!(WalletKind::Local.to_string(), "local wallet");
    }

    #[test]
    fn test_connection_info_serialization() {
        let info = ConnectionInfo {
            address: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap(),
            chain_id: Some(1),
            kind: WalletKind::Injected,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["chainId"], 1);
        assert_eq!(json["kind"], "injected");
    }

    #[test]
    fn test_boxed_wallet_delegates() {
        let local = crate::LocalWallet::from_private_key(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        let mut boxed: Box<dyn WalletSigner> = Box::new(local);

        assert_eq!(boxed.kind(), WalletKind::Local);
        assert!(!boxed.is_connected());

        let info = tokio_test::block_on(boxed.connect()).unwrap();
        assert_eq!(boxed.address(), Some(info.address));

        tokio_test::block_on(boxed.disconnect()).unwrap();
        assert!(boxed.address().is_none());
    }
}
