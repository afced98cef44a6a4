//! Participant address type with `diva_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A DIVA participant address, always prefixed with `diva_`.
///
/// Derived from the participant's Ed25519 public key via base32 encoding plus a
/// Blake2b checksum (see `diva_crypto::derive_address`). Service accounts such
/// as the settlement escrow use a free-form suffix.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all DIVA addresses.
    pub const PREFIX: &'static str = "diva_";

    /// Create a new address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `diva_`.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with diva_");
        Self(s)
    }

    /// Non-panicking constructor for untrusted input.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.starts_with(Self::PREFIX) && raw.len() > Self::PREFIX.len() {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
