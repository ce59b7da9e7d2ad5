//! Hook-driven wallet library adapter.
//!
//! Libraries in this family own the account state themselves and expose it
//! reactively; the adapter reads the live account on every call instead of
//! caching it, and passes typed data in the library's structured shape rather
//! than as a JSON string.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;
use venue_core::signing::TypeField;
use venue_core::TypedMessage;

use crate::error::{Result, WalletError};
use crate::provider::signature_from_reply;
use crate::signer::{ConnectionInfo, WalletKind, WalletSigner};

const KIND: WalletKind = WalletKind::Library;

/// Account state as reported by the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryAccount {
    pub address: String,
    pub chain_id: Option<u64>,
}

/// Structured signing request handed to the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTypedDataRequest {
    pub account: String,
    pub domain: Value,
    pub types: BTreeMap<String, Vec<TypeField>>,
    pub primary_type: String,
    pub message: serde_json::Map<String, Value>,
}

impl SignTypedDataRequest {
    pub fn new(account: Address, message: &TypedMessage) -> Self {
        Self {
            account: account.to_string(),
            domain: message.domain().wallet_json(),
            types: message.types().clone(),
            primary_type: message.primary_type().to_string(),
            message: message.message_json(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LibraryError {
    pub message: String,
    /// The user dismissed the library's prompt.
    pub rejected: bool,
}

impl LibraryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rejected: false,
        }
    }

    pub fn rejected() -> Self {
        Self {
            message: "user rejected the request".to_string(),
            rejected: true,
        }
    }
}

/// Operations a wallet library exposes to the application.
#[async_trait]
pub trait WalletLibrary: Send + Sync {
    fn is_ready(&self) -> bool;

    /// Current account, if the library holds one.
    fn account(&self) -> Option<LibraryAccount>;

    async fn connect(&self) -> std::result::Result<LibraryAccount, LibraryError>;

    async fn disconnect(&self) -> std::result::Result<(), LibraryError>;

    async fn sign_typed_data(
        &self,
        request: SignTypedDataRequest,
    ) -> std::result::Result<String, LibraryError>;
}

pub struct LibraryWallet<L> {
    library: L,
}

impl<L: WalletLibrary> LibraryWallet<L> {
    pub fn new(library: L) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &L {
        &self.library
    }
}

fn parse_account(account: &LibraryAccount) -> Result<Address> {
    account
        .address
        .parse()
        .map_err(|_| WalletError::connection(KIND, format!("malformed account '{}'", account.address)))
}

#[async_trait]
impl<L: WalletLibrary> WalletSigner for LibraryWallet<L> {
    fn kind(&self) -> WalletKind {
        KIND
    }

    fn is_available(&self) -> bool {
        self.library.is_ready()
    }

    fn address(&self) -> Option<Address> {
        self.library
            .account()
            .and_then(|account| parse_account(&account).ok())
    }

    async fn connect(&mut self) -> Result<ConnectionInfo> {
        if !self.library.is_ready() {
            return Err(WalletError::connection(KIND, "wallet library is not ready"));
        }

        let account = self
            .library
            .connect()
            .await
            .map_err(|e| WalletError::connection(KIND, e.message))?;
        let address = parse_account(&account)?;
        info!(address = %address, chain_id = ?account.chain_id, "Library wallet connected");

        Ok(ConnectionInfo {
            address,
            chain_id: account.chain_id,
            kind: KIND,
        })
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.library
            .disconnect()
            .await
            .map_err(|e| WalletError::disconnection(KIND, e.message))
    }

    async fn sign_typed_data(&self, message: &TypedMessage) -> Result<String> {
        let account = self.address().ok_or_else(|| WalletError::not_connected(KIND))?;

        let signature = self
            .library
            .sign_typed_data(SignTypedDataRequest::new(account, message))
            .await
            .map_err(|e| WalletError::signing(KIND, e.message))?;

        signature_from_reply(KIND, &Value::String(signature))
    }
}
