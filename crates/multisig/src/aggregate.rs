//! Signature aggregate envelope and offline verification.
//!
//! An aggregate is the audit record of one signing round. It can be
//! serialized, shipped elsewhere and verified with [`verify_aggregate`] using
//! only the aggregate and the expected signer set.

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;
use venue_core::serde_util::decimal_string;
use venue_core::signing::recover_from_digest;
use venue_core::TypedMessage;

use crate::config::AggregationMethod;
use crate::error::{CoordinatorError, Result};

/// A signature gathered from one registered wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedSignature {
    pub signer_id: String,
    pub address: Address,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureAggregate {
    pub round_id: Uuid,
    /// Signatures, parallel to `claimed_signers` by position.
    pub signatures: Vec<String>,
    pub claimed_signers: Vec<Address>,
    #[serde(with = "decimal_string")]
    pub threshold: usize,
    #[serde(with = "decimal_string")]
    pub signature_count: usize,
    pub message: TypedMessage,
    pub aggregation_method: AggregationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SignatureAggregate {
    /// Package collected signatures for `message` in collection order.
    pub fn new(
        message: &TypedMessage,
        collected: &[CollectedSignature],
        threshold: usize,
        method: AggregationMethod,
    ) -> Self {
        let signatures: Vec<String> = collected.iter().map(|c| c.signature.clone()).collect();
        let claimed_signers = collected.iter().map(|c| c.address).collect();
        let aggregate_signature = method.combine(&signatures);

        Self {
            round_id: Uuid::new_v4(),
            signature_count: signatures.len(),
            signatures,
            claimed_signers,
            threshold,
            message: message.clone(),
            aggregation_method: method,
            aggregate_signature,
            created_at: Utc::now(),
        }
    }

    /// Shape check: parallel sequences and a positive threshold.
    pub fn check_shape(&self) -> Result<()> {
        if self.signatures.len() != self.claimed_signers.len() {
            return Err(CoordinatorError::MalformedAggregate(format!(
                "{} signature(s) but {} claimed signer(s)",
                self.signatures.len(),
                self.claimed_signers.len()
            )));
        }
        if self.threshold == 0 {
            return Err(CoordinatorError::MalformedAggregate(
                "threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Why a (signature, claimed signer) pair did or did not count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairStatus {
    Valid,
    /// Recovery succeeded but produced a different address.
    SignerMismatch { recovered: Address },
    /// The claimed signer is not in the expected set.
    NotExpected,
    /// The signer already counted at an earlier position.
    Duplicate,
    RecoveryFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairVerification {
    pub index: usize,
    pub claimed_signer: Address,
    #[serde(flatten)]
    pub status: PairStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    /// Empty when the aggregate was rejected before any recovery.
    pub pairs: Vec<PairVerification>,
    #[serde(with = "decimal_string")]
    pub valid_count: usize,
    #[serde(with = "decimal_string")]
    pub threshold: usize,
    pub satisfied: bool,
}

/// Verify against the aggregate's own threshold.
pub fn verify_aggregate(
    aggregate: &SignatureAggregate,
    expected_signers: &[Address],
) -> Result<VerificationOutcome> {
    verify_with_threshold(aggregate, expected_signers, aggregate.threshold)
}

/// Count pairs whose recovered signer equals the claimed one and is expected.
///
/// Each signer counts once. Per-pair failures never abort the count; only a
/// malformed aggregate is an error.
pub fn verify_with_threshold(
    aggregate: &SignatureAggregate,
    expected_signers: &[Address],
    threshold: usize,
) -> Result<VerificationOutcome> {
    aggregate.check_shape()?;

    if aggregate.signatures.len() < threshold {
        debug!(
            signatures = aggregate.signatures.len(),
            threshold, "Aggregate has fewer signatures than the threshold"
        );
        return Ok(VerificationOutcome {
            pairs: Vec::new(),
            valid_count: 0,
            threshold,
            satisfied: false,
        });
    }

    let digest = aggregate.message.signing_hash()?;

    let mut counted: HashSet<Address> = HashSet::new();
    let mut pairs = Vec::with_capacity(aggregate.signatures.len());

    for (index, (signature, claimed)) in aggregate
        .signatures
        .iter()
        .zip(&aggregate.claimed_signers)
        .enumerate()
    {
        let status = match recover_from_digest(&digest, signature) {
            Err(e) => PairStatus::RecoveryFailed {
                reason: e.to_string(),
            },
            Ok(recovered) if recovered != *claimed => PairStatus::SignerMismatch { recovered },
            Ok(_) if !expected_signers.contains(claimed) => PairStatus::NotExpected,
            Ok(recovered) => {
                if counted.insert(recovered) {
                    PairStatus::Valid
                } else {
                    PairStatus::Duplicate
                }
            }
        };

        if status != PairStatus::Valid {
            debug!(index, claimed = %claimed, status = ?status, "Signature does not count");
        }
        pairs.push(PairVerification {
            index,
            claimed_signer: *claimed,
            status,
        });
    }

    let valid_count = counted.len();
    Ok(VerificationOutcome {
        pairs,
        valid_count,
        threshold,
        satisfied: valid_count >= threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_signer::SignerSync;
    use alloy_signer_local::PrivateKeySigner;
    use std::str::FromStr;
    use venue_core::{DomainDescriptor, OperationFields, OperationKind};

    // Hardhat development keys (DO NOT USE IN PRODUCTION)
    const KEYS: [&str; 3] = [
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
    ];

    fn message() -> TypedMessage {
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
            .with("amount", "340282366920938463463374607431768211456")
            .with("recipient", "0x70997970C51812dc3A010C7d01b50e0d17dc79C8")
            .with("nonce", "1")
            .with("deadline", "1900000000");
        OperationKind::Withdrawal.build(&domain, &fields).unwrap()
    }

    fn collect(message: &TypedMessage, keys: &[&str]) -> (Vec<CollectedSignature>, Vec<Address>) {
        let digest = message.signing_hash().unwrap();
        let collected: Vec<CollectedSignature> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let signer = PrivateKeySigner::from_str(key).unwrap();
                let signature = signer.sign_hash_sync(&digest).unwrap();
                CollectedSignature {
                    signer_id: format!("signer-{}", i),
                    address: signer.address(),
                    signature: format!("0x{}", hex::encode(signature.as_bytes())),
                }
            })
            .collect();
        let expected = collected.iter().map(|c| c.address).collect();
        (collected, expected)
    }

    #[test]
    fn test_all_valid() {
        let message = message();
        let (collected, expected) = collect(&message, &KEYS);
        let aggregate =
            SignatureAggregate::new(&message, &collected, 2, AggregationMethod::EcdsaConcat);

        let outcome = verify_aggregate(&aggregate, &expected).unwrap();
        assert_eq!(outcome.valid_count, 3);
        assert!(outcome.satisfied);
        assert!(outcome.pairs.iter().all(|p| p.status == PairStatus::Valid));
    }

    #[test]
    fn test_too_few_signatures_rejected_early() {
        let message = message();
        let (collected, expected) = collect(&message, &KEYS[..1]);
        let aggregate =
            SignatureAggregate::new(&message, &collected, 2, AggregationMethod::EcdsaConcat);

        let outcome = verify_aggregate(&aggregate, &expected).unwrap();
        assert!(!outcome.satisfied);
        assert!(outcome.pairs.is_empty());
    }

    #[test]
    fn test_swapped_claims_do_not_count() {
        let message = message();
        let (collected, expected) = collect(&message, &KEYS[..2]);
        let mut aggregate =
            SignatureAggregate::new(&message, &collected, 1, AggregationMethod::EcdsaConcat);
        aggregate.claimed_signers.swap(0, 1);

        let outcome = verify_aggregate(&aggregate, &expected).unwrap();
        assert_eq!(outcome.valid_count, 0);
        assert!(matches!(outcome.pairs[0].status, PairStatus::SignerMismatch { .. }));
    }

    #[test]
    fn test_duplicate_pair_counts_once() {
        let message = message();
        let (collected, expected) = collect(&message, &KEYS[..1]);
        let doubled = vec![collected[0].clone(), collected[0].clone()];
        let aggregate =
            SignatureAggregate::new(&message, &doubled, 2, AggregationMethod::EcdsaConcat);

        let outcome = verify_aggregate(&aggregate, &expected).unwrap();
        assert_eq!(outcome.valid_count, 1);
        assert_eq!(outcome.pairs[1].status, PairStatus::Duplicate);
        assert!(!outcome.satisfied);
    }

    #[test]
    fn test_unexpected_signer_does_not_count() {
        let message = message();
        let (collected, expected) = collect(&message, &KEYS);
        let aggregate =
            SignatureAggregate::new(&message, &collected, 3, AggregationMethod::EcdsaConcat);

        let outcome = verify_aggregate(&aggregate, &expected[..2]).unwrap();
        assert_eq!(outcome.valid_count, 2);
        assert_eq!(outcome.pairs[2].status, PairStatus::NotExpected);
        assert!(!outcome.satisfied);
    }

    #[test]
    fn test_garbage_signature_is_recovery_failure() {
        let message = message();
        let (mut collected, expected) = collect(&message, &KEYS[..2]);
        collected[1].signature = "0xdeadbeef".to_string();
        let aggregate =
            SignatureAggregate::new(&message, &collected, 1, AggregationMethod::EcdsaConcat);

        let outcome = verify_aggregate(&aggregate, &expected).unwrap();
        assert_eq!(outcome.valid_count, 1);
        assert!(outcome.satisfied);
        assert!(matches!(outcome.pairs[1].status, PairStatus::RecoveryFailed { .. }));
    }

    #[test]
    fn test_mismatched_lengths_are_malformed() {
        let message = message();
        let (collected, expected) = collect(&message, &KEYS[..2]);
        let mut aggregate =
            SignatureAggregate::new(&message, &collected, 1, AggregationMethod::EcdsaConcat);
        aggregate.claimed_signers.pop();

        assert!(matches!(
            verify_aggregate(&aggregate, &expected),
            Err(CoordinatorError::MalformedAggregate(_))
        ));
    }

    #[test]
    fn test_json_round_trip_preserves_verification() {
        let message = message();
        let (collected, expected) = collect(&message, &KEYS);
        let aggregate =
            SignatureAggregate::new(&message, &collected, 2, AggregationMethod::EcdsaConcat);

        let json = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(json["threshold"], "2");
        assert_eq!(json["signatureCount"], "3");
        assert_eq!(
            json["message"]["message"]["amount"],
            "340282366920938463463374607431768211456"
        );

        let restored: SignatureAggregate = serde_json::from_value(json).unwrap();
        assert_eq!(restored, aggregate);
        assert!(verify_aggregate(&restored, &expected).unwrap().satisfied);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = VerificationOutcome {
            pairs: vec![PairVerification {
                index: 0,
                claimed_signer: KEYS[0].parse::<PrivateKeySigner>().unwrap().address(),
                status: PairStatus::NotExpected,
            }],
            valid_count: 0,
            threshold: 1,
            satisfied: false,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["pairs"][0]["status"], "not_expected");
        assert_eq!(json["validCount"], "0");
    }
}
