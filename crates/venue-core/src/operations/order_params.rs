//! Fluent order parameters with decimal price and size.
//!
//! Converts human-facing decimals into integer base units so the builder only
//! ever sees exact decimal strings.

use alloy_primitives::{Address, U256};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::OperationFields;
use crate::{Error, Result};

/// Default number of decimals for price and size base units (USDC-style).
pub const DEFAULT_DECIMALS: u32 = 6;

/// Largest supported decimals; 10^18 still fits in a u64 scale factor.
const MAX_DECIMALS: u32 = 18;

/// Order side (buy/sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    #[default]
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(Error::invalid_field("side", format!("'{}' is not BUY or SELL", other))),
        }
    }
}

/// Order execution type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    #[default]
    Limit,
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
        }
    }
}

impl FromStr for OrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "LIMIT" => Ok(OrderType::Limit),
            "MARKET" => Ok(OrderType::Market),
            other => Err(Error::invalid_field(
                "orderType",
                format!("'{}' is not LIMIT or MARKET", other),
            )),
        }
    }
}

/// Order parameters builder.
#[derive(Debug, Clone)]
pub struct OrderParams {
    account: Option<Address>,
    market: Option<String>,
    side: OrderSide,
    order_type: OrderType,
    price: Option<Decimal>,
    size: Option<Decimal>,
    nonce: U256,
    deadline: Option<u64>,
    decimals: u32,
}

impl OrderParams {
    pub fn new() -> Self {
        Self {
            account: None,
            market: None,
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            price: None,
            size: None,
            nonce: U256::ZERO,
            deadline: None,
            decimals: DEFAULT_DECIMALS,
        }
    }

    pub fn account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    pub fn side(mut self, side: OrderSide) -> Self {
        self.side = side;
        self
    }

    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn size(mut self, size: Decimal) -> Self {
        self.size = Some(size);
        self
    }

    pub fn nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set deadline in seconds from now.
    pub fn expires_in(mut self, seconds: u64) -> Self {
        let now = Utc::now().timestamp().max(0) as u64;
        self.deadline = Some(now + seconds);
        self
    }

    /// Set absolute deadline (unix seconds).
    pub fn expires_at(mut self, timestamp: u64) -> Self {
        self.deadline = Some(timestamp);
        self
    }

    /// Number of decimals for price and size base units.
    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// Produce builder inputs for an `order` operation.
    pub fn into_fields(self) -> Result<OperationFields> {
        let missing = |field: &str| Error::MissingField {
            type_name: "Order".to_string(),
            field: field.to_string(),
        };

        let account = self.account.ok_or_else(|| missing("account"))?;
        let market = self.market.ok_or_else(|| missing("market"))?;
        let price = self.price.ok_or_else(|| missing("price"))?;
        let size = self.size.ok_or_else(|| missing("size"))?;
        let deadline = self.deadline.ok_or_else(|| missing("deadline"))?;

        if size <= Decimal::ZERO {
            return Err(Error::invalid_field("size", "must be positive"));
        }
        if price <= Decimal::ZERO && self.order_type == OrderType::Limit {
            return Err(Error::invalid_field("price", "limit orders need a positive price"));
        }

        Ok(OperationFields::new()
            .with("account", account.to_string())
            .with("market", market)
            .with("side", self.side.to_string())
            .with("orderType", self.order_type.to_string())
            .with("price", to_base_units("price", price, self.decimals)?.to_string())
            .with("size", to_base_units("size", size, self.decimals)?.to_string())
            .with("nonce", self.nonce.to_string())
            .with("deadline", deadline.to_string()))
    }
}

impl Default for OrderParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale a non-negative decimal to integer base units, rounding half-even.
pub fn to_base_units(field: &str, value: Decimal, decimals: u32) -> Result<U256> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::invalid_field(field, "must not be negative"));
    }
    if decimals > MAX_DECIMALS {
        return Err(Error::invalid_field(
            field,
            format!("at most {} decimals are supported", MAX_DECIMALS),
        ));
    }

    let scale = Decimal::from(10u64.pow(decimals));
    let scaled = value
        .checked_mul(scale)
        .ok_or_else(|| Error::invalid_field(field, "value too large"))?
        .round();

    U256::from_str_radix(&scaled.trunc().to_string(), 10)
        .map_err(|e| Error::invalid_field(field, format!("{}", e)))
}
