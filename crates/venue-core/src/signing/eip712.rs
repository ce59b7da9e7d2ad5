//! EIP-712 hashing for typed messages.
//!
//! digest = keccak256("\x19\x01" ‖ domainSeparator ‖ hashStruct(message))
//!
//! Encoding goes through alloy's [`TypedData`](alloy_dyn_abi::TypedData), so
//! struct-typed members pull their referenced types into `encodeType` and
//! arrays hash element-wise.

use alloy_primitives::B256;

use super::typed_data::TypedMessage;
use crate::Result;

impl TypedMessage {
    /// Canonical type string of the primary type, referenced types appended.
    pub fn encode_type(&self) -> Result<String> {
        Ok(self.typed_data().encode_type()?)
    }

    pub fn type_hash(&self) -> Result<B256> {
        Ok(self.typed_data().type_hash()?)
    }

    /// `hashStruct(message) = keccak256(typeHash ‖ encodeData(message))`
    pub fn struct_hash(&self) -> Result<B256> {
        Ok(self.typed_data().hash_struct()?)
    }

    /// The digest a wallet signs for this message.
    pub fn signing_hash(&self) -> Result<B256> {
        Ok(self.typed_data().eip712_signing_hash()?)
    }
}
