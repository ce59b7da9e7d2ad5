//! Wallet backend errors.

use thiserror::Error;

use crate::signer::WalletKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("{wallet} connection failed: {reason}")]
    Connection { wallet: WalletKind, reason: String },

    #[error("{wallet} disconnect failed: {reason}")]
    Disconnection { wallet: WalletKind, reason: String },

    #[error("{wallet} signing failed: {reason}")]
    Signing { wallet: WalletKind, reason: String },

    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

impl WalletError {
    pub fn connection(wallet: WalletKind, reason: impl Into<String>) -> Self {
        Self::Connection {
            wallet,
            reason: reason.into(),
        }
    }

    pub fn disconnection(wallet: WalletKind, reason: impl Into<String>) -> Self {
        Self::Disconnection {
            wallet,
            reason: reason.into(),
        }
    }

    pub fn signing(wallet: WalletKind, reason: impl Into<String>) -> Self {
        Self::Signing {
            wallet,
            reason: reason.into(),
        }
    }

    pub fn not_connected(wallet: WalletKind) -> Self {
        Self::signing(wallet, "wallet is not connected")
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
