//! In-process wallet backed by a private key.
//!
//! Loads from the `WALLET_PRIVATE_KEY` environment variable or a hex key and
//! signs typed-data digests directly, without a user prompt.

use alloy_primitives::Address;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::str::FromStr;
use tracing::debug;
use venue_core::TypedMessage;

use crate::error::{Result, WalletError};
use crate::signer::{ConnectionInfo, WalletKind, WalletSigner};

/// A wallet holding its private key in memory.
#[derive(Clone)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
    address: Address,
    connected: bool,
}

impl LocalWallet {
    /// Load wallet from the `WALLET_PRIVATE_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set or the key is malformed.
    pub fn from_env() -> Result<Self> {
        let private_key = std::env::var("WALLET_PRIVATE_KEY").map_err(|_| {
            WalletError::InvalidKey("WALLET_PRIVATE_KEY environment variable not set".to_string())
        })?;

        Self::from_private_key(&private_key)
    }

    /// Create a wallet from a 64-character hex key, optionally `0x`-prefixed.
    pub fn from_private_key(key: &str) -> Result<Self> {
        let key_clean = key.trim().trim_start_matches("0x");

        let signer = PrivateKeySigner::from_str(key_clean).map_err(|_| {
            WalletError::InvalidKey("expected 64 hex characters".to_string())
        })?;

        let address = signer.address();

        Ok(Self {
            signer,
            address,
            connected: false,
        })
    }

    /// Address of the key, regardless of connection state.
    pub fn key_address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl WalletSigner for LocalWallet {
    fn kind(&self) -> WalletKind {
        WalletKind::Local
    }

    fn is_available(&self) -> bool {
        true
    }

    fn address(&self) -> Option<Address> {
        self.connected.then_some(self.address)
    }

    async fn connect(&mut self) -> Result<ConnectionInfo> {
        self.connected = true;
        debug!(address = %self.address, "Local wallet connected");
        Ok(ConnectionInfo {
            address: self.address,
            chain_id: self.signer.chain_id(),
            kind: WalletKind::Local,
        })
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    async fn sign_typed_data(&self, message: &TypedMessage) -> Result<String> {
        if !self.connected {
            return Err(WalletError::not_connected(WalletKind::Local));
        }

        let digest = message
            .signing_hash()
            .map_err(|e| WalletError::signing(WalletKind::Local, e.to_string()))?;

        let signature = self
            .signer
            .sign_hash(&digest)
            .await
            .map_err(|e| WalletError::signing(WalletKind::Local, e.to_string()))?;

        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the private key in debug output
        f.debug_struct("LocalWallet")
            .field("address", &self.address.to_string())
            .field("connected", &self.connected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use venue_core::signing::recover_signer;
    use venue_core::{DomainDescriptor, OperationFields, OperationKind};

    // Test private key (DO NOT USE IN PRODUCTION - this is a well-known test key)
    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn deposit() -> TypedMessage {
        let domain = DomainDescriptor::new(
            "Venue Exchange",
            "1",
            1,
            "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC",
        )
        .unwrap();
        let fields = OperationFields::new()
            .with("account", json!(TEST_ADDRESS))
            .with("token", json!("0x0000000000000000000000000000000000000001"))
            .with("amount", json!("1000000"))
            .with("nonce", json!("0"))
            .with("deadline", json!("1900000000"));
        OperationKind::Deposit.build(&domain, &fields).unwrap()
    }

    #[test]
    fn test_from_private_key_with_prefix() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(wallet.key_address(), TEST_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn test_from_private_key_without_prefix() {
        let key_no_prefix = TEST_PRIVATE_KEY.trim_start_matches("0x");
        let wallet = LocalWallet::from_private_key(key_no_prefix).unwrap();
        assert_eq!(wallet.key_address(), TEST_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(matches!(
            LocalWallet::from_private_key("not-a-valid-key"),
            Err(WalletError::InvalidKey(_))
        ));
        assert!(LocalWallet::from_private_key("0x1234").is_err());
    }

    #[test]
    fn test_debug_does_not_expose_key() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let debug_str = format!("{:?}", wallet);

        assert!(debug_str.contains("LocalWallet"));
        assert!(!debug_str.contains(TEST_PRIVATE_KEY.trim_start_matches("0x")));
    }

    #[tokio::test]
    async fn test_sign_requires_connection() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert!(wallet.address().is_none());

        let err = wallet.sign_typed_data(&deposit()).await.unwrap_err();
        assert!(matches!(err, WalletError::Signing { .. }));
    }

    #[tokio::test]
    async fn test_signature_recovers_to_wallet() {
        let mut wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let info = wallet.connect().await.unwrap();
        assert_eq!(info.address, wallet.key_address());
        assert!(wallet.is_connected());

        let message = deposit();
        let signature = wallet.sign_typed_data(&message).await.unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + 130);
        assert_eq!(recover_signer(&message, &signature).unwrap(), info.address);
    }

    #[tokio::test]
    async fn test_disconnect_clears_address() {
        let mut wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        wallet.connect().await.unwrap();
        wallet.disconnect().await.unwrap();
        assert!(!wallet.is_connected());
    }
}
