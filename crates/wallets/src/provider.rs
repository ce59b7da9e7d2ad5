//! EIP-1193 JSON-RPC provider seam.
//!
//! Extension and injected wallets both talk to a provider object exposing a
//! single `request(method, params)` call. The helpers here translate a
//! [`TypedMessage`] into the `eth_signTypedData_v4` payload and interpret the
//! replies, so the wallet adapters only decide which methods to call.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;
use venue_core::signing::{decode_signature, EIP712_DOMAIN_TYPE_NAME};
use venue_core::TypedMessage;

use crate::error::{Result, WalletError};
use crate::signer::WalletKind;

/// Error object returned by a provider request.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("provider error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested account or method has not been authorized.
    pub const UNAUTHORIZED: i64 = 4100;
    /// The provider does not implement the method.
    pub const METHOD_NOT_FOUND: i64 = -32601;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Self::USER_REJECTED
    }

    pub fn is_method_not_found(&self) -> bool {
        self.code == Self::METHOD_NOT_FOUND
    }

    /// Reason string for wallet errors; rejections get a stable wording.
    fn reason(&self) -> String {
        if self.is_user_rejection() {
            "user rejected the request".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Minimal EIP-1193 provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    /// Whether a provider object is present in the host at all.
    fn is_present(&self) -> bool;

    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, RpcError>;
}

/// Build the JSON payload for `eth_signTypedData_v4`.
///
/// The domain type list is generated from the descriptor and `chainId` is a
/// JSON number, matching what browser wallets expect.
pub fn typed_data_v4_payload(message: &TypedMessage) -> Value {
    let mut types = serde_json::Map::new();
    types.insert(
        EIP712_DOMAIN_TYPE_NAME.to_string(),
        json!([
            { "name": "name", "type": "string" },
            { "name": "version", "type": "string" },
            { "name": "chainId", "type": "uint256" },
            { "name": "verifyingContract", "type": "address" },
        ]),
    );
    for (type_name, members) in message.types() {
        let members: Vec<Value> = members
            .iter()
            .map(|m| json!({ "name": m.name, "type": m.type_name }))
            .collect();
        types.insert(type_name.clone(), Value::Array(members));
    }

    json!({
        "types": types,
        "primaryType": message.primary_type(),
        "domain": message.domain().wallet_json(),
        "message": message.message_json(),
    })
}

/// Request an account list and return the first entry.
///
/// `Ok(None)` means the provider answered with an empty list.
pub(crate) async fn request_account<P: Eip1193Provider + ?Sized>(
    provider: &P,
    kind: WalletKind,
    method: &str,
) -> Result<Option<Address>> {
    let reply = provider
        .request(method, json!([]))
        .await
        .map_err(|e| WalletError::connection(kind, e.reason()))?;

    let first = match reply.as_array().and_then(|accounts| accounts.first()) {
        Some(first) => first,
        None => return Ok(None),
    };

    first
        .as_str()
        .and_then(|s| s.parse::<Address>().ok())
        .map(Some)
        .ok_or_else(|| WalletError::connection(kind, format!("malformed account in reply: {}", first)))
}

/// Read the provider's chain id; failures are not fatal to a connect.
pub(crate) async fn request_chain_id<P: Eip1193Provider + ?Sized>(provider: &P) -> Option<u64> {
    match provider.request("eth_chainId", json!([])).await {
        Ok(reply) => reply.as_str().and_then(parse_chain_id),
        Err(e) => {
            debug!(error = %e, "eth_chainId request failed");
            None
        }
    }
}

/// Send a typed-data signing request with the given method name.
pub(crate) async fn request_signature<P: Eip1193Provider + ?Sized>(
    provider: &P,
    method: &str,
    account: Address,
    message: &TypedMessage,
) -> std::result::Result<Value, RpcError> {
    let payload = typed_data_v4_payload(message);
    // Providers take the payload as a JSON string, not an object.
    let params = json!([account.to_string(), payload.to_string()]);
    provider.request(method, params).await
}

/// Validate a signature reply and return it normalized to lowercase hex.
pub(crate) fn signature_from_reply(kind: WalletKind, reply: &Value) -> Result<String> {
    let text = reply
        .as_str()
        .ok_or_else(|| WalletError::signing(kind, format!("expected a hex string, got {}", reply)))?;
    let bytes = decode_signature(text).map_err(|e| WalletError::signing(kind, e.to_string()))?;
    Ok(format!("0x{}", hex::encode(bytes)))
}

pub(crate) fn signing_error(kind: WalletKind, error: &RpcError) -> WalletError {
    WalletError::signing(kind, error.reason())
}

fn parse_chain_id(value: &str) -> Option<u64> {
    match value.strip_prefix("0x") {
        Some(hex_part) => u64::from_str_radix(hex_part, 16).ok(),
        None => value.parse().ok(),
    }
}
