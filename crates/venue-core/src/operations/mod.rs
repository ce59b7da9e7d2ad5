//! Typed message builder for venue operations.
//!
//! Each [`OperationKind`] has a fixed schema, so the same inputs always build a
//! structurally identical [`TypedMessage`] regardless of how the caller ordered
//! its fields. Integer members (amounts, prices, nonce, deadline) travel as
//! decimal strings; enum members as upper-case strings.

pub mod order_params;

use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::nonce::NonceTracker;
use crate::signing::{DomainDescriptor, TypeField, TypedMessage};
use crate::{Error, Result};

pub use order_params::{OrderParams, OrderSide, OrderType, DEFAULT_DECIMALS};

/// Venue operations that can be signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Deposit,
    Withdrawal,
    /// Order submission.
    Order,
    /// Order cancellation.
    Cancel,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Deposit,
        OperationKind::Withdrawal,
        OperationKind::Order,
        OperationKind::Cancel,
    ];

    /// Name of the EIP-712 primary type.
    pub fn primary_type(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "Deposit",
            OperationKind::Withdrawal => "Withdrawal",
            OperationKind::Order => "Order",
            OperationKind::Cancel => "CancelOrder",
        }
    }

    /// Ordered `(name, type)` members of the primary type.
    pub fn schema(&self) -> Vec<TypeField> {
        let members: &[(&str, &str)] = match self {
            OperationKind::Deposit => &[
                ("account", "address"),
                ("token", "address"),
                ("amount", "uint256"),
                ("nonce", "uint256"),
                ("deadline", "uint256"),
            ],
            OperationKind::Withdrawal => &[
                ("account", "address"),
                ("token", "address"),
                ("amount", "uint256"),
                ("recipient", "address"),
                ("nonce", "uint256"),
                ("deadline", "uint256"),
            ],
            OperationKind::Order => &[
                ("account", "address"),
                ("market", "string"),
                ("side", "string"),
                ("orderType", "string"),
                ("price", "uint256"),
                ("size", "uint256"),
                ("nonce", "uint256"),
                ("deadline", "uint256"),
            ],
            OperationKind::Cancel => &[
                ("account", "address"),
                ("orderId", "string"),
                ("nonce", "uint256"),
                ("deadline", "uint256"),
            ],
        };
        members
            .iter()
            .map(|(name, type_name)| TypeField::new(*name, *type_name))
            .collect()
    }

    /// Build the typed message for this operation.
    pub fn build(&self, domain: &DomainDescriptor, fields: &OperationFields) -> Result<TypedMessage> {
        domain.validate()?;

        let schema = self.schema();
        let mut values = Map::new();

        for member in &schema {
            let raw = fields.get(&member.name).ok_or_else(|| Error::MissingField {
                type_name: self.primary_type().to_string(),
                field: member.name.clone(),
            })?;
            values.insert(member.name.clone(), self.normalize_enum(&member.name, raw)?);
        }

        for ignored in fields.names().filter(|name| !values.contains_key(*name)) {
            debug!(operation = %self, field = %ignored, "Ignoring undeclared operation field");
        }

        let mut types = BTreeMap::new();
        types.insert(self.primary_type().to_string(), schema);

        TypedMessage::new(domain.clone(), types, self.primary_type(), values)
    }

    fn normalize_enum(&self, field: &str, raw: &Value) -> Result<Value> {
        let allowed: &[&str] = match (self, field) {
            (OperationKind::Order, "side") => &["BUY", "SELL"],
            (OperationKind::Order, "orderType") => &["LIMIT", "MARKET"],
            _ => return Ok(raw.clone()),
        };

        let text = raw
            .as_str()
            .ok_or_else(|| Error::invalid_field(field, "expected a string"))?
            .trim()
            .to_uppercase();

        if !allowed.contains(&text.as_str()) {
            return Err(Error::invalid_field(
                field,
                format!("'{}' is not one of {}", text, allowed.join(", ")),
            ));
        }
        Ok(Value::String(text))
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "deposit" => Ok(OperationKind::Deposit),
            "withdrawal" | "withdraw" => Ok(OperationKind::Withdrawal),
            "order" | "submit_order" | "order_submission" => Ok(OperationKind::Order),
            "cancel" | "cancel_order" | "order_cancellation" => Ok(OperationKind::Cancel),
            _ => Err(Error::UnsupportedOperation {
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Deposit => write!(f, "deposit"),
            OperationKind::Withdrawal => write!(f, "withdrawal"),
            OperationKind::Order => write!(f, "order"),
            OperationKind::Cancel => write!(f, "cancel"),
        }
    }
}

/// Raw operation inputs keyed by member name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationFields(BTreeMap<String, Value>);

impl OperationFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build a typed message from an operation name.
///
/// Fails with [`Error::UnsupportedOperation`] for unknown kinds.
pub fn build(kind: &str, domain: &DomainDescriptor, fields: &OperationFields) -> Result<TypedMessage> {
    kind.parse::<OperationKind>()?.build(domain, fields)
}

/// Result of a read-only message validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Validate a message against the nonce tracker and the current time.
pub fn validate(message: &TypedMessage, nonces: &NonceTracker) -> ValidationReport {
    validate_at(message, nonces, Utc::now())
}

/// Validate a message as of `now`. Never mutates the nonce tracker.
pub fn validate_at(
    message: &TypedMessage,
    nonces: &NonceTracker,
    now: DateTime<Utc>,
) -> ValidationReport {
    let mut errors = Vec::new();

    if let Err(e) = message.domain().validate() {
        errors.push(e.to_string());
    }

    if message.types().is_empty() {
        errors.push("type schema is empty".to_string());
    }

    match message.primary_schema() {
        None => errors.push(format!(
            "primary type '{}' is not in the type schema",
            message.primary_type()
        )),
        Some(schema) => {
            for member in schema {
                if message.field(&member.name).is_none() {
                    errors.push(format!("missing field '{}'", member.name));
                }
            }
        }
    }

    match message.nonce() {
        Some(nonce) if nonces.is_used(nonce) => {
            errors.push(format!("nonce {} has already been used", nonce))
        }
        Some(_) => {}
        None => errors.push("message has no nonce".to_string()),
    }

    match message.deadline() {
        Some(deadline) => {
            let now_secs = U256::from(now.timestamp().max(0) as u64);
            if deadline <= now_secs {
                errors.push(format!("deadline {} is not after {}", deadline, now_secs));
            }
        }
        None => errors.push("message has no deadline".to_string()),
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}
