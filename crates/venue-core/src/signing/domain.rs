//! EIP-712 signing domain for the trading venue.
//!
//! A [`DomainDescriptor`] binds every signature to one application, chain and
//! verifying contract. It is validated once at construction and never mutated;
//! switching chain or contract produces a new descriptor.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::Eip712Domain;
use serde::{Deserialize, Serialize};

use crate::serde_util::decimal_string;
use crate::{Error, Result};

/// Default domain version used by the venue contracts.
pub const DEFAULT_DOMAIN_VERSION: &str = "1";

/// Immutable EIP-712 domain descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DomainRepr", into = "DomainRepr")]
pub struct DomainDescriptor {
    name: String,
    version: String,
    chain_id: u64,
    verifying_contract: Address,
}

/// Wire form of the domain: every value is a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainRepr {
    name: String,
    version: String,
    #[serde(with = "decimal_string")]
    chain_id: u64,
    verifying_contract: String,
}

impl DomainDescriptor {
    /// Create a validated domain descriptor.
    ///
    /// `verifying_contract` must be a `0x`-prefixed 20-byte hex string.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: &str,
    ) -> Result<Self> {
        let verifying_contract = parse_contract_address(verifying_contract)?;
        Self::from_parts(name.into(), version.into(), chain_id, verifying_contract)
    }

    fn from_parts(
        name: String,
        version: String,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Result<Self> {
        let domain = Self {
            name,
            version,
            chain_id,
            verifying_contract,
        };
        domain.validate()?;
        Ok(domain)
    }

    /// Re-check the descriptor invariants.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid_domain("name must not be empty"));
        }
        if self.version.trim().is_empty() {
            return Err(invalid_domain("version must not be empty"));
        }
        if self.chain_id == 0 {
            return Err(invalid_domain("chain id must be positive"));
        }
        Ok(())
    }

    /// Build a new descriptor for a different chain.
    pub fn with_chain_id(&self, chain_id: u64) -> Result<Self> {
        Self::from_parts(
            self.name.clone(),
            self.version.clone(),
            chain_id,
            self.verifying_contract,
        )
    }

    /// Build a new descriptor pointing at a different verifying contract.
    pub fn with_verifying_contract(&self, verifying_contract: &str) -> Result<Self> {
        Self::from_parts(
            self.name.clone(),
            self.version.clone(),
            self.chain_id,
            parse_contract_address(verifying_contract)?,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }

    /// The descriptor as an alloy EIP-712 domain (no salt).
    pub fn eip712_domain(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(self.name.clone().into()),
            Some(self.version.clone().into()),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }

    /// EIP-712 domain separator hash.
    pub fn separator(&self) -> B256 {
        self.eip712_domain().separator()
    }

    /// Domain object as wallets read it: `chainId` is a JSON number.
    pub fn wallet_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "version": self.version,
            "chainId": self.chain_id,
            "verifyingContract": self.verifying_contract.to_string(),
        })
    }
}

impl TryFrom<DomainRepr> for DomainDescriptor {
    type Error = Error;

    fn try_from(repr: DomainRepr) -> Result<Self> {
        Self::new(repr.name, repr.version, repr.chain_id, &repr.verifying_contract)
    }
}

impl From<DomainDescriptor> for DomainRepr {
    fn from(domain: DomainDescriptor) -> Self {
        Self {
            name: domain.name,
            version: domain.version,
            chain_id: domain.chain_id,
            verifying_contract: domain.verifying_contract.to_string(),
        }
    }
}

/// Parse a strictly formatted `0x` + 40 hex digit address.
pub fn parse_contract_address(value: &str) -> Result<Address> {
    if !is_hex_address(value) {
        return Err(invalid_domain(format!(
            "verifying contract '{}' is not a 0x-prefixed 20-byte hex address",
            value
        )));
    }
    value
        .parse::<Address>()
        .map_err(|e| invalid_domain(format!("verifying contract: {}", e)))
}

/// `^0x[0-9a-fA-F]{40}$`
pub fn is_hex_address(value: &str) -> bool {
    value.len() == 42
        && value.starts_with("0x")
        && value[2..].chars().all(|c| c.is_ascii_hexdigit())
}

fn invalid_domain(message: impl Into<String>) -> Error {
    Error::InvalidDomain {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC";

    fn test_domain() -> DomainDescriptor {
        DomainDescriptor::new("Venue Exchange", "1", 1, CONTRACT).unwrap()
    }

    #[test]
    fn test_valid_domain() {
        let domain = test_domain();
        assert_eq!(domain.name(), "Venue Exchange");
        assert_eq!(domain.version(), "1");
        assert_eq!(domain.chain_id(), 1);
        assert_eq!(
            domain.verifying_contract(),
            CONTRACT.parse::<Address>().unwrap()
        );
    }

    #[test]
    fn test_rejects_empty_fields() {
        assert!(DomainDescriptor::new("", "1", 1, CONTRACT).is_err());
        assert!(DomainDescriptor::new("Venue", " ", 1, CONTRACT).is_err());
        assert!(DomainDescriptor::new("Venue", "1", 0, CONTRACT).is_err());
    }

    #[test]
    fn test_rejects_malformed_contract() {
        let no_prefix = CONTRACT.trim_start_matches("0x");
        assert!(DomainDescriptor::new("Venue", "1", 1, no_prefix).is_err());
        assert!(DomainDescriptor::new("Venue", "1", 1, "0x1234").is_err());
        assert!(DomainDescriptor::new(
            "Venue",
            "1",
            1,
            "0xZZCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        )
        .is_err());
    }

    #[test]
    fn test_separator_matches_eip712_reference() {
        // "Ether Mail" domain from the EIP-712 reference example.
        let domain = DomainDescriptor::new("Ether Mail", "1", 1, CONTRACT).unwrap();
        let expected: B256 = "0xf2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f"
            .parse()
            .unwrap();
        assert_eq!(domain.separator(), expected);
    }

    #[test]
    fn test_zero_contract_is_well_formed() {
        let zero = "0x0000000000000000000000000000000000000000";
        let domain = DomainDescriptor::new("Venue Exchange", "1", 1, zero).unwrap();
        assert_eq!(domain.verifying_contract(), Address::ZERO);
        assert_ne!(domain.separator(), test_domain().separator());
    }

    #[test]
    fn test_rebuild_does_not_mutate() {
        let domain = test_domain();
        let rebuilt = domain.with_chain_id(137).unwrap();
        assert_eq!(domain.chain_id(), 1);
        assert_eq!(rebuilt.chain_id(), 137);
        assert_ne!(domain.separator(), rebuilt.separator());

        assert!(domain.with_chain_id(0).is_err());
        assert!(domain.with_verifying_contract("0xabc").is_err());
    }

    #[test]
    fn test_serde_uses_string_chain_id() {
        let json = serde_json::to_value(test_domain()).unwrap();
        assert_eq!(json["chainId"], "1");
        assert_eq!(
            json["verifyingContract"].as_str().unwrap().to_lowercase(),
            CONTRACT.to_lowercase()
        );

        let parsed: DomainDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, test_domain());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = serde_json::json!({
            "name": "Venue",
            "version": "1",
            "chainId": 0,
            "verifyingContract": CONTRACT,
        });
        assert!(serde_json::from_value::<DomainDescriptor>(json).is_err());
    }
}
