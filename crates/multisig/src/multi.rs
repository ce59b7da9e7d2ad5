//! Threshold multi-signer coordinator.
//!
//! A round runs in two independently retryable steps:
//!
//! 1. [`MultiSignCoordinator::collect_signatures`] asks every registered
//!    wallet to sign, one at a time in registration order, tolerating
//!    individual failures.
//! 2. [`MultiSignCoordinator::verify_signature`] recovers every signer from
//!    the aggregate alone, so it can be re-run offline.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use venue_core::TypedMessage;
use wallets::{WalletError, WalletSigner};

use crate::aggregate::{
    verify_with_threshold, CollectedSignature, SignatureAggregate, VerificationOutcome,
};
use crate::config::MultiSignConfig;
use crate::error::{CoordinatorError, Result, SignerFailure};
use crate::registry::WalletRegistry;

/// Aggregate and verification outcome from [`MultiSignCoordinator::sign_round`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRound {
    pub aggregate: SignatureAggregate,
    pub outcome: VerificationOutcome,
}

/// Coordinates a threshold of wallets signing the same message.
///
/// Construct one per signing session; the registry is not shared.
#[derive(Debug)]
pub struct MultiSignCoordinator {
    config: MultiSignConfig,
    wallets: WalletRegistry,
}

impl MultiSignCoordinator {
    pub fn new(config: MultiSignConfig) -> Self {
        Self {
            config,
            wallets: WalletRegistry::new(),
        }
    }

    pub fn config(&self) -> &MultiSignConfig {
        &self.config
    }

    /// Register a wallet under `wallet_id`. Re-adding an existing id is a no-op
    /// and returns `false`.
    pub fn add_wallet<W>(&mut self, wallet_id: impl Into<String>, wallet: W) -> bool
    where
        W: WalletSigner + 'static,
    {
        let wallet_id = wallet_id.into();
        let added = self.wallets.insert(wallet_id.clone(), Box::new(wallet));
        if added {
            info!(
                wallet = %wallet_id,
                registered = self.wallets.len(),
                threshold = self.config.threshold(),
                "Wallet registered"
            );
        } else {
            debug!(wallet = %wallet_id, "Wallet already registered, ignoring");
        }
        added
    }

    /// Unregister a wallet, disconnecting it best-effort. Returns whether it
    /// was registered.
    pub async fn remove_wallet(&mut self, wallet_id: &str) -> bool {
        let Some(mut wallet) = self.wallets.remove(wallet_id) else {
            return false;
        };

        if wallet.is_connected() {
            if let Err(e) = wallet.disconnect().await {
                warn!(wallet = %wallet_id, error = %e, "Disconnect failed during removal");
            }
        }
        info!(wallet = %wallet_id, registered = self.wallets.len(), "Wallet removed");
        true
    }

    pub fn wallet_ids(&self) -> Vec<&str> {
        self.wallets.ids().collect()
    }

    pub fn wallet(&self, wallet_id: &str) -> Option<&dyn WalletSigner> {
        self.wallets.get(wallet_id)
    }

    /// Number of registered wallets.
    pub fn connected_signer_count(&self) -> usize {
        self.wallets.len()
    }

    /// Whether enough wallets are registered to attempt a round.
    pub fn is_threshold_met(&self) -> bool {
        self.connected_signer_count() >= self.config.threshold()
    }

    /// Ask every registered wallet to sign `message`, in registration order.
    ///
    /// Wallets that fail are left out of the result. Fails only when the
    /// threshold precondition is not met or every wallet failed.
    pub async fn collect_signatures(
        &mut self,
        message: &TypedMessage,
    ) -> Result<Vec<CollectedSignature>> {
        if !self.is_threshold_met() {
            return Err(CoordinatorError::ThresholdNotMet {
                required: self.config.threshold(),
                connected: self.connected_signer_count(),
            });
        }

        let ids: Vec<String> = self.wallets.ids().map(String::from).collect();
        let mut collected = Vec::with_capacity(ids.len());
        let mut failures = Vec::new();

        for wallet_id in ids {
            let Some(wallet) = self.wallets.get_mut(&wallet_id) else {
                continue;
            };

            match sign_with(&mut **wallet, message).await {
                Ok((address, signature)) => {
                    debug!(wallet = %wallet_id, address = %address, "Signature collected");
                    collected.push(CollectedSignature {
                        signer_id: wallet_id,
                        address,
                        signature,
                    });
                }
                Err(error) => {
                    warn!(wallet = %wallet_id, error = %error, "Signer failed, continuing");
                    failures.push(SignerFailure { wallet_id, error });
                }
            }
        }

        if collected.is_empty() {
            return Err(CoordinatorError::SignatureCollectionFailed { failures });
        }

        info!(
            collected = collected.len(),
            failed = failures.len(),
            threshold = self.config.threshold(),
            "Signature collection finished"
        );
        Ok(collected)
    }

    /// Package collected signatures with the configured threshold.
    pub fn aggregate_signatures(
        &self,
        message: &TypedMessage,
        collected: &[CollectedSignature],
    ) -> SignatureAggregate {
        SignatureAggregate::new(
            message,
            collected,
            self.config.threshold(),
            self.config.aggregation_method(),
        )
    }

    /// Detailed verification against the expected signer set.
    ///
    /// The larger of the aggregate's and the configured threshold applies.
    pub fn verify(&self, aggregate: &SignatureAggregate) -> Result<VerificationOutcome> {
        let threshold = aggregate.threshold.max(self.config.threshold());
        let outcome = verify_with_threshold(aggregate, self.config.expected_signers(), threshold)?;

        info!(
            round = %aggregate.round_id,
            valid = outcome.valid_count,
            threshold,
            satisfied = outcome.satisfied,
            "Aggregate verified"
        );
        Ok(outcome)
    }

    /// `true` when enough distinct expected signers are recovered.
    ///
    /// Errors only on a malformed aggregate.
    pub fn verify_signature(&self, aggregate: &SignatureAggregate) -> Result<bool> {
        Ok(self.verify(aggregate)?.satisfied)
    }

    /// Collect, aggregate and verify in one call.
    pub async fn sign_round(&mut self, message: &TypedMessage) -> Result<SigningRound> {
        let collected = self.collect_signatures(message).await?;
        let aggregate = self.aggregate_signatures(message, &collected);
        let outcome = self.verify(&aggregate)?;
        Ok(SigningRound { aggregate, outcome })
    }
}

async fn sign_with(
    wallet: &mut dyn WalletSigner,
    message: &TypedMessage,
) -> std::result::Result<(Address, String), WalletError> {
    if !wallet.is_connected() {
        wallet.connect().await?;
    }
    let address = wallet
        .address()
        .ok_or_else(|| WalletError::connection(wallet.kind(), "no account after connect"))?;
    let signature = wallet.sign_typed_data(message).await?;
    Ok((address, signature))
}
