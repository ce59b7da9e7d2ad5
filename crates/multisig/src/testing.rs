//! Test wallets with scripted failures.

use alloy_primitives::Address;
use async_trait::async_trait;
use venue_core::{DomainDescriptor, OperationFields, OperationKind, TypedMessage};
use wallets::{ConnectionInfo, LocalWallet, WalletError, WalletKind, WalletSigner};

// Hardhat development keys (DO NOT USE IN PRODUCTION)
pub(crate) const KEYS: [&str; 3] = [
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

pub(crate) fn address_of(key: &str) -> Address {
    LocalWallet::from_private_key(key).unwrap().key_address()
}

pub(crate) fn deposit() -> TypedMessage {
    let domain = DomainDescriptor::new(
        "Venue Exchange",
        "1",
        1,
        "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC",
    )
    .unwrap();
    let fields = OperationFields::new()
        .with("account", "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        .with("token", "0x0000000000000000000000000000000000000001")
        .with("amount", "1000000")
        .with("nonce", "0")
        .with("deadline", "1900000000");
    OperationKind::Deposit.build(&domain, &fields).unwrap()
}

/// Local key wallet that can be told to fail at connect or sign.
pub(crate) struct ScriptedWallet {
    inner: LocalWallet,
    fail_connect: bool,
    fail_sign: bool,
    fail_disconnect: bool,
}

impl ScriptedWallet {
    pub fn healthy(key: &str) -> Self {
        Self {
            inner: LocalWallet::from_private_key(key).unwrap(),
            fail_connect: false,
            fail_sign: false,
            fail_disconnect: false,
        }
    }

    pub fn failing_connect(key: &str) -> Self {
        Self {
            fail_connect: true,
            ..Self::healthy(key)
        }
    }

    pub fn failing_sign(key: &str) -> Self {
        Self {
            fail_sign: true,
            ..Self::healthy(key)
        }
    }

    pub fn failing_disconnect(key: &str) -> Self {
        Self {
            fail_disconnect: true,
            ..Self::healthy(key)
        }
    }
}

#[async_trait]
impl WalletSigner for ScriptedWallet {
    fn kind(&self) -> WalletKind {
        WalletKind::Extension
    }

    fn is_available(&self) -> bool {
        true
    }

    fn address(&self) -> Option<Address> {
        self.inner.address()
    }

    async fn connect(&mut self) -> Result<ConnectionInfo, WalletError> {
        if self.fail_connect {
            return Err(WalletError::connection(
                WalletKind::Extension,
                "user rejected the request",
            ));
        }
        self.inner.connect().await
    }

    async fn disconnect(&mut self) -> Result<(), WalletError> {
        if self.fail_disconnect {
            return Err(WalletError::disconnection(WalletKind::Extension, "provider gone"));
        }
        self.inner.disconnect().await
    }

    async fn sign_typed_data(&self, message: &TypedMessage) -> Result<String, WalletError> {
        if self.fail_sign {
            return Err(WalletError::signing(
                WalletKind::Extension,
                "user rejected the request",
            ));
        }
        self.inner.sign_typed_data(message).await
    }
}
