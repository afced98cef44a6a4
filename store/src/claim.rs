//! Claim and vote storage trait.

use crate::StoreError;
use diva_types::{Address, Claim, ClaimId, VoteRecord};

/// Claims keyed by content hash, votes keyed by `(claim, voter)`.
pub trait ClaimStore {
    /// Get a claim. `NotFound` if no claim has this id.
    fn get_claim(&self, id: &ClaimId) -> Result<Claim, StoreError>;

    /// Store a new claim. `Duplicate` if the id is taken.
    fn insert_claim(&self, claim: &Claim) -> Result<(), StoreError>;

    /// Overwrite an existing claim. `NotFound` if it was never inserted.
    fn put_claim(&self, claim: &Claim) -> Result<(), StoreError>;

    fn contains_claim(&self, id: &ClaimId) -> Result<bool, StoreError>;

    fn claim_count(&self) -> Result<u64, StoreError>;

    /// Get the vote `voter` cast on `claim`, withdrawn or not.
    fn get_vote(&self, claim: &ClaimId, voter: &Address) -> Result<Option<VoteRecord>, StoreError>;

    /// Insert or overwrite the vote keyed by `(vote.claim, vote.voter)`.
    fn put_vote(&self, vote: &VoteRecord) -> Result<(), StoreError>;

    /// All votes on a claim, withdrawn included, in the order first cast.
    fn votes_for(&self, claim: &ClaimId) -> Result<Vec<VoteRecord>, StoreError>;
}
