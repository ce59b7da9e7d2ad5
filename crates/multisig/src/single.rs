//! Single-signer signing flow.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use venue_core::signing::{is_signed_by, recover_signer};
use venue_core::TypedMessage;
use wallets::WalletSigner;

use crate::error::Result;

/// A signature together with its recovered signer and the signed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub signature: String,
    pub signer_address: Address,
    pub message: TypedMessage,
}

/// Drives one wallet through connect, sign and recover.
pub struct SingleSignCoordinator<W> {
    wallet: W,
}

impl<W: WalletSigner> SingleSignCoordinator<W> {
    pub fn new(wallet: W) -> Self {
        Self { wallet }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn into_wallet(self) -> W {
        self.wallet
    }

    /// Sign `message`, connecting first if needed.
    ///
    /// The record carries the address recovered from the signature, not the
    /// one the wallet reports.
    pub async fn sign_message(&mut self, message: &TypedMessage) -> Result<SignatureRecord> {
        if !self.wallet.is_connected() {
            self.wallet.connect().await?;
        }

        let signature = self.wallet.sign_typed_data(message).await?;
        let signer_address = recover_signer(message, &signature)?;

        if let Some(reported) = self.wallet.address() {
            if reported != signer_address {
                warn!(
                    reported = %reported,
                    recovered = %signer_address,
                    "Wallet signed with a different account than it reports"
                );
            }
        }

        info!(
            signer = %signer_address,
            primary_type = message.primary_type(),
            "Message signed"
        );

        Ok(SignatureRecord {
            signature,
            signer_address,
            message: message.clone(),
        })
    }

    /// Re-run recovery on a record. Never errors; bad signatures are `false`.
    pub fn verify_signature(&self, record: &SignatureRecord) -> bool {
        is_signed_by(&record.message, &record.signature, record.signer_address)
    }
}
