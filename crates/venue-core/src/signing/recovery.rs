//! Signer recovery for typed-data signatures.
//!
//! Shared by the single- and multi-signer coordinators. A failure here means
//! "this signature does not count"; callers never treat it as fatal for a batch.

use alloy_primitives::{Address, Signature, B256, U256};

use super::typed_data::TypedMessage;
use crate::{Error, Result};

/// Length of an `r ‖ s ‖ v` signature in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// Recover the address that produced `signature` over `message`.
pub fn recover_signer(message: &TypedMessage, signature: &str) -> Result<Address> {
    let digest = message
        .signing_hash()
        .map_err(|e| Error::recovery(format!("cannot hash message: {}", e)))?;
    recover_from_digest(&digest, signature)
}

/// Recover the signing address from a prehashed digest and a hex signature.
pub fn recover_from_digest(digest: &B256, signature: &str) -> Result<Address> {
    let sig_bytes = decode_signature(signature)?;
    // Legacy 27/28 and raw 0/1 parity bytes are both in circulation.
    let y_parity = match sig_bytes[64] {
        0 | 27 => false,
        1 | 28 => true,
        v => return Err(Error::recovery(format!("invalid recovery id: {}", v))),
    };

    let signature = Signature::new(
        U256::from_be_slice(&sig_bytes[..32]),
        U256::from_be_slice(&sig_bytes[32..64]),
        y_parity,
    );
    signature
        .recover_address_from_prehash(digest)
        .map_err(|e| Error::recovery(format!("failed to recover key: {}", e)))
}

/// Compare the recovered signer with an expected address.
pub fn is_signed_by(message: &TypedMessage, signature: &str, expected: Address) -> bool {
    matches!(recover_signer(message, signature), Ok(recovered) if recovered == expected)
}

/// Decode a `0x`-prefixed (or bare) 65-byte hex signature.
pub fn decode_signature(signature: &str) -> Result<Vec<u8>> {
    let sig_bytes = hex::decode(signature.trim().trim_start_matches("0x"))
        .map_err(|e| Error::recovery(format!("invalid signature hex: {}", e)))?;

    if sig_bytes.len() != SIGNATURE_LENGTH {
        return Err(Error::recovery(format!(
            "signature must be {} bytes, got {}",
            SIGNATURE_LENGTH,
            sig_bytes.len()
        )));
    }
    Ok(sig_bytes)
}
