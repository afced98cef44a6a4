//! Voter registry records.

use crate::Address;
use serde::{Deserialize, Serialize};

/// A participant in the voter registry.
///
/// Reputation is bounded by the settlement parameters (`[1, 100]` by default)
/// and only changes at claim finalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub address: Address,
    pub is_registered: bool,
    pub reputation: u32,
    pub vote_count: u64,
}

impl Voter {
    /// A freshly registered voter.
    pub fn registered(address: Address, initial_reputation: u32) -> Self {
        Self {
            address,
            is_registered: true,
            reputation: initial_reputation,
            vote_count: 0,
        }
    }

    /// The record reported for an address that never registered.
    pub fn unregistered(address: Address) -> Self {
        Self {
            address,
            is_registered: false,
            reputation: 0,
            vote_count: 0,
        }
    }
}
