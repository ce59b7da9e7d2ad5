//! Nonce issuing and replay tracking.
//!
//! The used-set is cleared wholesale once the tracker is older than its max
//! age. This is a coarse replay window, not per-nonce expiry: a nonce marked
//! used just before a reset becomes acceptable again right after it.

use alloy_primitives::U256;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::{Error, Result};

/// Default replay window (24h).
pub const DEFAULT_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// How far behind the issue counter a nonce may still arrive.
pub const DEFAULT_BACK_WINDOW: u64 = 1000;

/// Configuration for a [`NonceTracker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonceConfig {
    /// First nonce handed out by `issue`.
    pub origin: u64,
    /// Replay window in seconds before the used-set is cleared.
    pub max_age_secs: i64,
    /// Accepted distance below the issue counter.
    pub back_window: u64,
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self {
            origin: 0,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            back_window: DEFAULT_BACK_WINDOW,
        }
    }
}

/// Issues monotonically increasing nonces and remembers consumed ones.
///
/// Single-owner state: concurrent signing rounds sharing one tracker need
/// external serialization.
#[derive(Debug, Clone)]
pub struct NonceTracker {
    counter: U256,
    used: HashSet<U256>,
    window_started_at: DateTime<Utc>,
    max_age: Duration,
    back_window: U256,
}

impl NonceTracker {
    /// Tracker starting at zero with the default 24h window.
    pub fn new() -> Self {
        Self::from_parts(&NonceConfig::default(), Duration::hours(24))
    }

    /// Fails unless `max_age_secs` is a positive, representable duration.
    pub fn with_config(config: &NonceConfig) -> Result<Self> {
        if config.max_age_secs <= 0 {
            return Err(Error::config(format!(
                "nonce max_age_secs must be positive, got {}",
                config.max_age_secs
            )));
        }
        let max_age = Duration::try_seconds(config.max_age_secs).ok_or_else(|| {
            Error::config(format!(
                "nonce max_age_secs {} is out of range",
                config.max_age_secs
            ))
        })?;
        Ok(Self::from_parts(config, max_age))
    }

    fn from_parts(config: &NonceConfig, max_age: Duration) -> Self {
        Self {
            counter: U256::from(config.origin),
            used: HashSet::new(),
            window_started_at: Utc::now(),
            max_age,
            back_window: U256::from(config.back_window),
        }
    }

    /// Return the current counter value, then advance it.
    pub fn issue(&mut self) -> U256 {
        self.expire_window(Utc::now());
        let nonce = self.counter;
        self.counter += U256::from(1u64);
        debug!(nonce = %nonce, "Issued nonce");
        nonce
    }

    /// Record a nonce as consumed.
    pub fn mark_used(&mut self, nonce: U256) {
        self.expire_window(Utc::now());
        self.used.insert(nonce);
    }

    /// Whether the nonce was consumed inside the current window.
    pub fn is_used(&self, nonce: U256) -> bool {
        !self.window_expired(Utc::now()) && self.used.contains(&nonce)
    }

    /// Valid iff unused and no more than the back window below the counter.
    pub fn validate(&self, nonce: U256) -> bool {
        let floor = self.counter.saturating_sub(self.back_window);
        !self.is_used(nonce) && nonce >= floor
    }

    /// Next value `issue` will return.
    pub fn current(&self) -> U256 {
        self.counter
    }

    /// Number of nonces recorded in the current window.
    pub fn used_count(&self) -> usize {
        if self.window_expired(Utc::now()) {
            0
        } else {
            self.used.len()
        }
    }

    fn window_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.window_started_at > self.max_age
    }

    fn expire_window(&mut self, now: DateTime<Utc>) {
        if self.window_expired(now) {
            info!(
                cleared = self.used.len(),
                window_started_at = %self.window_started_at,
                "Nonce replay window expired, clearing used set"
            );
            self.used.clear();
            self.window_started_at = now;
        }
    }
}

impl Default for NonceTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_is_strictly_increasing() {
        let mut tracker = NonceTracker::new();
        let issued: Vec<U256> = (0..50).map(|_| tracker.issue()).collect();
        assert_eq!(issued[0], U256::ZERO);
        assert!(issued.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(tracker.current(), U256::from(50u64));
    }

    #[test]
    fn test_configurable_origin() {
        let mut tracker = NonceTracker::with_config(&NonceConfig {
            origin: 1_000_000,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(tracker.issue(), U256::from(1_000_000u64));
        assert_eq!(tracker.issue(), U256::from(1_000_001u64));
    }

    #[test]
    fn test_config_rejects_non_positive_max_age() {
        for max_age_secs in [0, -1, i64::MIN] {
            let result = NonceTracker::with_config(&NonceConfig {
                max_age_secs,
                ..Default::default()
            });
            assert!(matches!(result, Err(Error::Config { .. })), "{}", max_age_secs);
        }
    }

    #[test]
    fn test_config_rejects_unrepresentable_max_age() {
        let result = NonceTracker::with_config(&NonceConfig {
            max_age_secs: i64::MAX,
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_default_config_matches_new() {
        let tracker = NonceTracker::with_config(&NonceConfig::default()).unwrap();
        assert_eq!(tracker.max_age, NonceTracker::new().max_age);
        assert_eq!(tracker.max_age, Duration::seconds(DEFAULT_MAX_AGE_SECS));
    }

    #[test]
    fn test_mark_used_invalidates() {
        let mut tracker = NonceTracker::new();
        let nonce = tracker.issue();
        assert!(tracker.validate(nonce));

        tracker.mark_used(nonce);
        assert!(tracker.is_used(nonce));
        assert!(!tracker.validate(nonce));
        assert_eq!(tracker.used_count(), 1);
    }

    #[test]
    fn test_back_window() {
        let mut tracker = NonceTracker::new();
        for _ in 0..1500 {
            tracker.issue();
        }
        // counter = 1500, floor = 500
        assert!(tracker.validate(U256::from(500u64)));
        assert!(tracker.validate(U256::from(1499u64)));
        assert!(!tracker.validate(U256::from(499u64)));
        // Nonces ahead of the counter are not rejected by the window.
        assert!(tracker.validate(U256::from(2000u64)));
    }

    #[test]
    fn test_window_reset_clears_used_set() {
        let mut tracker = NonceTracker::new();
        let nonce = tracker.issue();
        tracker.mark_used(nonce);

        tracker.window_started_at = Utc::now() - Duration::hours(25);

        // Reads see the expired window without mutating it.
        assert!(!tracker.is_used(nonce));
        assert_eq!(tracker.used_count(), 0);
        assert_eq!(tracker.used.len(), 1);

        // The next mutation clears the set and restarts the timer.
        let next = tracker.issue();
        assert_eq!(next, U256::from(1u64));
        assert!(tracker.used.is_empty());
        assert!(Utc::now() - tracker.window_started_at < Duration::minutes(1));
    }

    #[test]
    fn test_window_not_expired_keeps_used_set() {
        let mut tracker = NonceTracker::new();
        tracker.mark_used(U256::from(3u64));
        tracker.window_started_at = Utc::now() - Duration::hours(23);
        tracker.issue();
        assert!(tracker.is_used(U256::from(3u64)));
    }
}
