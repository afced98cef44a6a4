//! Nullable infrastructure for deterministic testing.
//!
//! The settlement engine reaches the outside world through time (passed in
//! explicitly) and token ledgers (the `TokenLedger` trait). This crate
//! provides test-friendly stand-ins that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what was done to them
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod ledger;

pub use clock::NullClock;
pub use ledger::{NullLedger, TransferRecord};
