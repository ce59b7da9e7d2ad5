//! Browser-extension wallet (MetaMask-style) over EIP-1193.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};
use venue_core::TypedMessage;

use crate::error::{Result, WalletError};
use crate::provider::{
    request_account, request_chain_id, request_signature, signature_from_reply, signing_error,
    Eip1193Provider,
};
use crate::signer::{ConnectionInfo, WalletKind, WalletSigner};

const KIND: WalletKind = WalletKind::Extension;

/// Wallet backed by an extension's EIP-1193 provider.
///
/// `connect` always prompts via `eth_requestAccounts`; signing uses
/// `eth_signTypedData_v4` only.
pub struct ExtensionWallet<P> {
    provider: P,
    account: Option<Address>,
    chain_id: Option<u64>,
}

impl<P: Eip1193Provider> ExtensionWallet<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            account: None,
            chain_id: None,
        }
    }

    /// Chain reported by the extension at connect time.
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }
}

#[async_trait]
impl<P: Eip1193Provider> WalletSigner for ExtensionWallet<P> {
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
            return Err(WalletError::connection(KIND, "no wallet extension detected"));
        }

        let address = request_account(&self.provider, KIND, "eth_requestAccounts")
            .await?
            .ok_or_else(|| WalletError::connection(KIND, "extension returned no accounts"))?;
        let chain_id = request_chain_id(&self.provider).await;

        self.account = Some(address);
        self.chain_id = chain_id;
        info!(address = %address, chain_id = ?chain_id, "Extension wallet connected");

        Ok(ConnectionInfo {
            address,
            chain_id,
            kind: KIND,
        })
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.account.is_none() {
            return Ok(());
        }

        let params = json!([{ "eth_accounts": {} }]);
        match self.provider.request("wallet_revokePermissions", params).await {
            Ok(_) => {}
            // Older extensions cannot revoke; forgetting the account locally is enough.
            Err(e) if e.is_method_not_found() => {
                debug!("Extension does not support wallet_revokePermissions");
            }
            Err(e) => return Err(WalletError::disconnection(KIND, e.to_string())),
        }

        self.account = None;
        self.chain_id = None;
        Ok(())
    }

    async fn sign_typed_data(&self, message: &TypedMessage) -> Result<String> {
        let account = self.account.ok_or_else(|| WalletError::not_connected(KIND))?;

        let target_chain = message.domain().chain_id();
        if let Some(chain_id) = self.chain_id.filter(|c| *c != target_chain) {
            warn!(
                wallet_chain = chain_id,
                domain_chain = target_chain,
                "Extension is on a different chain than the signing domain"
            );
        }

        let reply = request_signature(&self.provider, "eth_signTypedData_v4", account, message)
            .await
            .map_err(|e| signing_error(KIND, &e))?;

        signature_from_reply(KIND, &reply)
    }
}
