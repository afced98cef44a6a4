//! Seconds-resolution timestamps.
//!
//! Every engine operation is handed `now` by its caller (the sequencer that
//! orders transactions); nothing in the settlement path reads a clock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix time in whole seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Shift forward by `secs`. Saturates, so a huge voting window on a late
    /// start yields a deadline of `u64::MAX` rather than wrapping.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl From<u64> for Timestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
