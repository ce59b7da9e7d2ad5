//! Provider double that signs with a real key.

use alloy_primitives::Address;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use venue_core::TypedMessage;

use crate::provider::{Eip1193Provider, RpcError};

// Hardhat development keys (DO NOT USE IN PRODUCTION)
pub(crate) const HARDHAT_KEYS: [&str; 3] = [
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

/// Answers EIP-1193 requests the way a browser wallet would, signing
/// `eth_signTypedData*` payloads with a local key.
pub(crate) struct KeyBackedProvider {
    signer: PrivateKeySigner,
    /// Whether `eth_accounts` reports the account without a prompt.
    pub pre_authorized: bool,
    /// Whether `eth_signTypedData_v4` is implemented.
    pub supports_v4: bool,
    pub prompts: AtomicUsize,
}

impl KeyBackedProvider {
    pub fn hardhat(index: usize) -> Self {
        Self {
            signer: PrivateKeySigner::from_str(HARDHAT_KEYS[index]).unwrap(),
            pre_authorized: false,
            supports_v4: true,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    fn sign(&self, params: &Value) -> Result<Value, RpcError> {
        let payload = params[1]
            .as_str()
            .ok_or_else(|| RpcError::new(-32602, "payload must be a JSON string"))?;
        let message: TypedMessage = serde_json::from_str(payload)
            .map_err(|e| RpcError::new(-32602, e.to_string()))?;
        let digest = message
            .signing_hash()
            .map_err(|e| RpcError::new(-32602, e.to_string()))?;
        let signature = self
            .signer
            .sign_hash_sync(&digest)
            .map_err(|e| RpcError::new(-32603, e.to_string()))?;
        Ok(json!(format!("0x{}", hex::encode(signature.as_bytes()))))
    }
}

#[async_trait]
impl Eip1193Provider for KeyBackedProvider {
    fn is_present(&self) -> bool {
        true
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "eth_requestAccounts" => {
                self.prompts.fetch_add(1, Ordering::SeqCst);
                Ok(json!([self.address().to_string()]))
            }
            "eth_accounts" if self.pre_authorized => Ok(json!([self.address().to_string()])),
            "eth_accounts" => Ok(json!([])),
            "eth_chainId" => Ok(json!("0x1")),
            "eth_signTypedData_v4" if self.supports_v4 => self.sign(&params),
            "eth_signTypedData" => self.sign(&params),
            "wallet_revokePermissions" => Ok(Value::Null),
            _ => Err(RpcError::new(RpcError::METHOD_NOT_FOUND, "method not found")),
        }
    }
}
