//! Threshold configuration for multi-signer rounds.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use venue_core::config::MultisigSettings;
use venue_core::signing::domain::is_hex_address;

use crate::error::{CoordinatorError, Result};

/// How collected signatures are packed into `aggregateSignature`.
///
/// Neither method is cryptographic aggregation. `EcdsaConcat` is a plain
/// concatenation for audit and transport; `SchnorrPlaceholder` reserves the
/// slot for a future threshold scheme and produces nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMethod {
    #[default]
    EcdsaConcat,
    SchnorrPlaceholder,
}

impl AggregationMethod {
    /// Pack signatures in order. Returns `None` when the method has no encoding.
    pub fn combine(&self, signatures: &[String]) -> Option<String> {
        match self {
            AggregationMethod::EcdsaConcat => {
                let body: String = signatures
                    .iter()
                    .map(|s| s.trim().trim_start_matches("0x"))
                    .collect();
                Some(format!("0x{}", body))
            }
            AggregationMethod::SchnorrPlaceholder => {
                warn!("Schnorr aggregation is not implemented, aggregate signature left empty");
                None
            }
        }
    }
}

impl FromStr for AggregationMethod {
    type Err = CoordinatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "ecdsa-concat" | "ecdsa" => Ok(AggregationMethod::EcdsaConcat),
            "schnorr-placeholder" | "schnorr" => Ok(AggregationMethod::SchnorrPlaceholder),
            other => Err(CoordinatorError::InvalidConfig(format!(
                "unknown aggregation method '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMethod::EcdsaConcat => write!(f, "ecdsa-concat"),
            AggregationMethod::SchnorrPlaceholder => write!(f, "schnorr-placeholder"),
        }
    }
}

/// Validated threshold settings: `1 <= threshold <= expected_signers.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSignConfig {
    threshold: usize,
    expected_signers: Vec<Address>,
    aggregation_method: AggregationMethod,
}

impl MultiSignConfig {
    /// Duplicate signer addresses are dropped; first occurrence keeps its position.
    pub fn new(
        threshold: usize,
        expected_signers: impl IntoIterator<Item = Address>,
        aggregation_method: AggregationMethod,
    ) -> Result<Self> {
        let mut signers: Vec<Address> = Vec::new();
        for signer in expected_signers {
            if !signers.contains(&signer) {
                signers.push(signer);
            }
        }

        if threshold == 0 {
            return Err(CoordinatorError::InvalidConfig(
                "threshold must be at least 1".to_string(),
            ));
        }
        if threshold > signers.len() {
            return Err(CoordinatorError::InvalidConfig(format!(
                "threshold {} exceeds {} expected signer(s)",
                threshold,
                signers.len()
            )));
        }

        Ok(Self {
            threshold,
            expected_signers: signers,
            aggregation_method,
        })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Expected signers in configured order.
    pub fn expected_signers(&self) -> &[Address] {
        &self.expected_signers
    }

    pub fn aggregation_method(&self) -> AggregationMethod {
        self.aggregation_method
    }

    pub fn is_expected(&self, address: &Address) -> bool {
        self.expected_signers.contains(address)
    }
}

impl TryFrom<&MultisigSettings> for MultiSignConfig {
    type Error = CoordinatorError;

    fn try_from(settings: &MultisigSettings) -> Result<Self> {
        let signers = settings
            .signers
            .iter()
            .map(|s| {
                let s = s.trim();
                if !is_hex_address(s) {
                    return Err(CoordinatorError::InvalidConfig(format!(
                        "'{}' is not a 0x-prefixed 20-byte address",
                        s
                    )));
                }
                s.parse::<Address>()
                    .map_err(|e| CoordinatorError::InvalidConfig(format!("'{}': {}", s, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(
            settings.threshold,
            signers,
            settings.aggregation_method.parse()?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const BOB: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
    const CAROL: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = MultiSignConfig::new(
            2,
            [addr(ALICE), addr(BOB), addr(CAROL)],
            AggregationMethod::EcdsaConcat,
        )
        .unwrap();
        assert_eq!(config.threshold(), 2);
        assert_eq!(config.expected_signers()[1], addr(BOB));
        assert!(config.is_expected(&addr(CAROL)));
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(MultiSignConfig::new(0, [addr(ALICE)], AggregationMethod::default()).is_err());
        assert!(
            MultiSignConfig::new(2, [addr(ALICE)], AggregationMethod::default()).is_err()
        );
    }

    #[test]
    fn test_duplicate_signers_do_not_inflate_set() {
        let result = MultiSignConfig::new(
            2,
            [addr(ALICE), addr(&ALICE.to_lowercase())],
            AggregationMethod::default(),
        );
        assert!(matches!(result, Err(CoordinatorError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_settings() {
        let settings = MultisigSettings {
            threshold: 2,
            signers: vec![ALICE.to_string(), BOB.to_string()],
            aggregation_method: "schnorr".to_string(),
        };
        let config = MultiSignConfig::try_from(&settings).unwrap();
        assert_eq!(config.aggregation_method(), AggregationMethod::SchnorrPlaceholder);

        let bad = MultisigSettings {
            signers: vec!["0x1234".to_string(), BOB.to_string()],
            ..settings
        };
        assert!(MultiSignConfig::try_from(&bad).is_err());
    }

    #[test]
    fn test_ecdsa_concat() {
        let a = format!("0x{}", "aa".repeat(65));
        let b = format!("0x{}", "bb".repeat(65));
        let combined = AggregationMethod::EcdsaConcat.combine(&[a, b]).unwrap();
        assert_eq!(combined.len(), 2 + 260);
        assert!(combined.starts_with("0xaaaa"));
        assert!(combined.ends_with("bbbb"));
    }

    #[test]
    fn test_schnorr_placeholder_is_empty() {
        assert_eq!(
            AggregationMethod::SchnorrPlaceholder.combine(&["0x01".to_string()]),
            None
        );
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(
            "ECDSA_CONCAT".parse::<AggregationMethod>().unwrap(),
            AggregationMethod::EcdsaConcat
        );
        assert!("bls".parse::<AggregationMethod>().is_err());
    }
}
