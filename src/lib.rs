//! Venue Signer: EIP-712 typed-data signing for trading venue operations
//!
//! This is the root crate that hosts integration tests and benchmarks.
//! For actual functionality, use the individual crates directly:
//!
//! - `venue-core`: Signing domain, typed messages, operation builder, nonces, recovery
//! - `wallets`: Extension, injected, library and local-key wallet backends
//! - `multisig`: Single-sign and threshold multi-sign coordinators
//! - `sign-cli`: Command-line build / sign / multisign / verify

// Re-export for tests and benchmarks
pub use multisig;
pub use venue_core as core;
pub use wallets;
