//! Generic injected provider wallet.
//!
//! Unlike the extension adapter, connect first asks `eth_accounts` so an
//! already-authorized site connects without a prompt, and signing falls back
//! to the unversioned `eth_signTypedData` for providers without v4.

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::{debug, info};
use venue_core::TypedMessage;

use crate::error::{Result, WalletError};
use crate::provider::{
    request_account, request_chain_id, request_signature, signature_from_reply, signing_error,
    Eip1193Provider,
};
use crate::signer::{ConnectionInfo, WalletKind, WalletSigner};

const KIND: WalletKind = WalletKind::Injected;

pub struct InjectedWallet<P> {
    provider: P,
    account: Option<Address>,
    chain_id: Option<u64>,
}

impl<P: Eip1193Provider> InjectedWallet<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            account: None,
            chain_id: None,
        }
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }
}

#[async_trait]
impl<P: Eip1193Provider> WalletSigner for InjectedWallet<P> {
    fn kind(&self) -> WalletKind {
        KIND
    }

    fn is_available(&self) -> bool {
        self.provider.is_present()
    }

    fn address(&self) -> Option<Address> {
        self.account
    }

    async fn connect(&mut self) -> Result<ConnectionInfo> {
        if !self.provider.is_present() {
            return Err(WalletError::connection(KIND, "no injected provider found"));
        }

        let address = match request_account(&self.provider, KIND, "eth_accounts").await {
            Ok(Some(address)) => address,
            Ok(None) | Err(_) => {
                debug!("No pre-authorized account, requesting access");
                request_account(&self.provider, KIND, "eth_requestAccounts")
                    .await?
                    .ok_or_else(|| WalletError::connection(KIND, "provider returned no accounts"))?
            }
        };
        let chain_id = request_chain_id(&self.provider).await;

        self.account = Some(address);
        self.chain_id = chain_id;
        info!(address = %address, chain_id = ?chain_id, "Injected wallet connected");

        Ok(ConnectionInfo {
            address,
            chain_id,
            kind: KIND,
        })
    }

    /// Injected providers have no revoke call; the account is forgotten locally.
    async fn disconnect(&mut self) -> Result<()> {
        self.account = None;
        self.chain_id = None;
        Ok(())
    }

    async fn sign_typed_data(&self, message: &TypedMessage) -> Result<String> {
        let account = self.account.ok_or_else(|| WalletError::not_connected(KIND))?;

        let reply =
            match request_signature(&self.provider, "eth_signTypedData_v4", account, message).await
            {
                Ok(reply) => reply,
                Err(e) if e.is_method_not_found() => {
                    debug!("Provider lacks eth_signTypedData_v4, retrying unversioned method");
                    request_signature(&self.provider, "eth_signTypedData", account, message)
                        .await
                        .map_err(|e| signing_error(KIND, &e))?
                }
                Err(e) => return Err(signing_error(KIND, &e)),
            };

        signature_from_reply(KIND, &reply)
    }
}
