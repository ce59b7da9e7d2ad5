//! Typed-data message model shared by every signer adapter.
//!
//! [`TypedMessage`] is the single closed representation of an EIP-712 message
//! inside the workspace. It keeps the venue wire form of the values (integers
//! as decimal strings, bytes as `0x` hex) next to the alloy [`TypedData`] that
//! encodes them, so nested struct members and arrays hash the same way any
//! standard verifier hashes them. Wallet adapters translate it at their own
//! boundary.

use alloy_dyn_abi::{DynSolValue, TypedData};
use alloy_primitives::{I256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::domain::DomainDescriptor;
use crate::{Error, Result};

/// Name of the implicit domain type inside an EIP-712 `types` map.
pub const EIP712_DOMAIN_TYPE_NAME: &str = "EIP712Domain";

/// One `(name, type)` member of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypeField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A complete EIP-712 message: domain, schema, primary type and values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TypedMessageRepr", into = "TypedMessageRepr")]
pub struct TypedMessage {
    domain: DomainDescriptor,
    types: BTreeMap<String, Vec<TypeField>>,
    primary_type: String,
    message: Map<String, Value>,
    typed: TypedData,
}

impl TypedMessage {
    /// Assemble a message, checking that the schema and values agree.
    ///
    /// `types` may reference further struct types and arrays; an
    /// `EIP712Domain` entry is dropped since the domain type is derived from
    /// the descriptor. Values are coerced against their declared types and
    /// stored in wire form.
    pub fn new(
        domain: DomainDescriptor,
        mut types: BTreeMap<String, Vec<TypeField>>,
        primary_type: impl Into<String>,
        message: Map<String, Value>,
    ) -> Result<Self> {
        let primary_type = primary_type.into();
        types.remove(EIP712_DOMAIN_TYPE_NAME);

        let schema = types.get(&primary_type).ok_or_else(|| Error::InvalidMessage {
            message: format!("primary type '{}' is not in the type schema", primary_type),
        })?;
        if schema.is_empty() {
            return Err(Error::InvalidMessage {
                message: format!("type '{}' has no members", primary_type),
            });
        }
        if let Some(extra) = message
            .keys()
            .find(|name| !schema.iter().any(|m| &m.name == *name))
        {
            return Err(Error::InvalidMessage {
                message: format!("field '{}' is not declared by '{}'", extra, primary_type),
            });
        }

        let mut typed: TypedData = serde_json::from_value(json!({
            "types": &types,
            "primaryType": &primary_type,
            "domain": domain.wallet_json(),
            "message": Value::Object(Map::new()),
        }))
        .map_err(|e| Error::InvalidMessage {
            message: format!("type schema: {}", e),
        })?;

        let mut normalized = Map::new();
        for member in schema {
            let raw = message.get(&member.name).ok_or_else(|| Error::MissingField {
                type_name: primary_type.clone(),
                field: member.name.clone(),
            })?;
            let member_type = typed.resolver.resolve(&member.type_name).map_err(|_| {
                Error::UnsupportedType {
                    type_name: member.type_name.clone(),
                }
            })?;
            let value = member_type
                .coerce_json(raw)
                .map_err(|e| Error::invalid_field(&member.name, e.to_string()))?;
            check_range(&member.name, &value)?;
            normalized.insert(member.name.clone(), wire_json(&value));
        }

        typed.resolver.resolve(&primary_type)?;
        typed.message = Value::Object(normalized.clone());

        Ok(Self {
            domain,
            types,
            primary_type,
            message: normalized,
            typed,
        })
    }

    pub fn domain(&self) -> &DomainDescriptor {
        &self.domain
    }

    /// Struct types, without the domain type.
    pub fn types(&self) -> &BTreeMap<String, Vec<TypeField>> {
        &self.types
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    /// Message values in wire form, keyed by member name.
    pub fn message(&self) -> &Map<String, Value> {
        &self.message
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.message.get(name)
    }

    /// Ordered members of the primary type.
    pub fn primary_schema(&self) -> Option<&[TypeField]> {
        self.types.get(&self.primary_type).map(Vec::as_slice)
    }

    /// Value of a top-level `uintN` member.
    pub fn uint_field(&self, name: &str) -> Option<U256> {
        let member = self.primary_schema()?.iter().find(|m| m.name == name)?;
        if !member.type_name.starts_with("uint") || member.type_name.ends_with(']') {
            return None;
        }
        U256::from_str_radix(self.field(name)?.as_str()?, 10).ok()
    }

    /// The `nonce` field, when the primary type declares one.
    pub fn nonce(&self) -> Option<U256> {
        self.uint_field("nonce")
    }

    /// The `deadline` field (unix seconds), when the primary type declares one.
    pub fn deadline(&self) -> Option<U256> {
        self.uint_field("deadline")
    }

    /// Owned copy of the message values.
    pub fn message_json(&self) -> Map<String, Value> {
        self.message.clone()
    }

    /// The alloy typed-data object used for encoding and hashing.
    pub fn typed_data(&self) -> &TypedData {
        &self.typed
    }
}

// `typed` is derived from the other parts.
impl PartialEq for TypedMessage {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.types == other.types
            && self.primary_type == other.primary_type
            && self.message == other.message
    }
}

impl Eq for TypedMessage {}

/// Reject integers wider than their declared type.
fn check_range(path: &str, value: &DynSolValue) -> Result<()> {
    match value {
        DynSolValue::Uint(v, bits) if v.bit_len() > *bits => Err(Error::invalid_field(
            path,
            format!("{} does not fit in uint{}", v, bits),
        )),
        DynSolValue::Int(v, bits) if !int_fits(*v, *bits) => Err(Error::invalid_field(
            path,
            format!("{} does not fit in int{}", v, bits),
        )),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| check_range(&format!("{}[{}]", path, i), item))
        }
        DynSolValue::CustomStruct {
            prop_names, tuple, ..
        } => prop_names
            .iter()
            .zip(tuple)
            .try_for_each(|(name, item)| check_range(&format!("{}.{}", path, name), item)),
        _ => Ok(()),
    }
}

/// Two's-complement fit: the magnitude bits must leave room for the sign bit.
fn int_fits(value: I256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let raw = value.into_raw();
    let magnitude = if value.is_negative() { !raw } else { raw };
    magnitude.bit_len() < bits
}

/// Wire form of a coerced value.
fn wire_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(v, _) => Value::String(v.to_string()),
        DynSolValue::Uint(v, _) => Value::String(v.to_string()),
        DynSolValue::FixedBytes(word, size) => {
            Value::String(format!("0x{}", hex::encode(&word[..*size])))
        }
        DynSolValue::Address(a) => Value::String(a.to_string()),
        DynSolValue::Function(f) => Value::String(format!("0x{}", hex::encode(f.as_slice()))),
        DynSolValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(wire_json).collect())
        }
        DynSolValue::CustomStruct {
            prop_names, tuple, ..
        } => Value::Object(
            prop_names
                .iter()
                .cloned()
                .zip(tuple.iter().map(wire_json))
                .collect(),
        ),
    }
}

/// EIP-712 JSON shape: `{types, primaryType, domain, message}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypedMessageRepr {
    types: BTreeMap<String, Vec<TypeField>>,
    primary_type: String,
    domain: DomainDescriptor,
    message: Map<String, Value>,
}

impl TryFrom<TypedMessageRepr> for TypedMessage {
    type Error = Error;

    fn try_from(repr: TypedMessageRepr) -> Result<Self> {
        TypedMessage::new(repr.domain, repr.types, repr.primary_type, repr.message)
    }
}

impl From<TypedMessage> for TypedMessageRepr {
    fn from(message: TypedMessage) -> Self {
        Self {
            types: message.types,
            primary_type: message.primary_type,
            domain: message.domain,
            message: message.message,
        }
    }
}
