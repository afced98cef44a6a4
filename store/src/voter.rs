//! Voter registry trait.

use crate::StoreError;
use diva_types::{Address, Voter};

/// Participant identity, reputation and vote count.
///
/// Reputation bounds belong to the implementation; every write clamps into
/// them.
pub trait VoterDirectory {
    /// Inclusive `(min, max)` reputation bounds enforced on every write.
    fn reputation_bounds(&self) -> (u32, u32);

    /// Register `address` at the minimum reputation. `Duplicate` if already
    /// registered.
    fn register_voter(&self, address: &Address) -> Result<Voter, StoreError>;

    /// The voter's record, or [`Voter::unregistered`] for unknown addresses.
    fn get_voter_data(&self, address: &Address) -> Result<Voter, StoreError>;

    fn is_registered(&self, address: &Address) -> Result<bool, StoreError>;

    /// Shift reputation by `delta`, clamped to the bounds. Returns the new
    /// value. `NotFound` for unregistered addresses.
    fn update_reputation(&self, address: &Address, delta: i64) -> Result<u32, StoreError>;

    /// Returns the new count. `NotFound` for unregistered addresses.
    fn increment_vote_count(&self, address: &Address) -> Result<u64, StoreError>;

    fn voter_count(&self) -> Result<u64, StoreError>;
}
