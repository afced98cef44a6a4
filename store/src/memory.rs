//! In-memory stores, safe to share across threads.

use crate::{ClaimStore, StoreError, VoterDirectory};
use diva_types::{Address, Claim, ClaimId, Voter, VoteRecord};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("store mutex poisoned".into()))
}

#[derive(Default)]
struct ClaimTables {
    claims: HashMap<ClaimId, Claim>,
    votes: HashMap<(ClaimId, Address), VoteRecord>,
    /// Voters per claim, in the order their vote was first stored.
    voters: HashMap<ClaimId, Vec<Address>>,
}

/// Claims and votes held in memory.
#[derive(Default)]
pub struct MemoryClaimStore {
    tables: Mutex<ClaimTables>,
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClaimStore for MemoryClaimStore {
    fn get_claim(&self, id: &ClaimId) -> Result<Claim, StoreError> {
        lock(&self.tables)?
            .claims
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn insert_claim(&self, claim: &Claim) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables)?;
        if tables.claims.contains_key(&claim.id) {
            return Err(StoreError::Duplicate(claim.id.to_string()));
        }
        tables.claims.insert(claim.id, claim.clone());
        Ok(())
    }

    fn put_claim(&self, claim: &Claim) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables)?;
        match tables.claims.get_mut(&claim.id) {
            Some(stored) => {
                *stored = claim.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(claim.id.to_string())),
        }
    }

    fn contains_claim(&self, id: &ClaimId) -> Result<bool, StoreError> {
        Ok(lock(&self.tables)?.claims.contains_key(id))
    }

    fn claim_count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.tables)?.claims.len() as u64)
    }

    fn get_vote(&self, claim: &ClaimId, voter: &Address) -> Result<Option<VoteRecord>, StoreError> {
        Ok(lock(&self.tables)?
            .votes
            .get(&(*claim, voter.clone()))
            .cloned())
    }

    fn put_vote(&self, vote: &VoteRecord) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables)?;
        let key = (vote.claim, vote.voter.clone());
        if tables.votes.insert(key, vote.clone()).is_none() {
            tables
                .voters
                .entry(vote.claim)
                .or_default()
                .push(vote.voter.clone());
        }
        Ok(())
    }

    fn votes_for(&self, claim: &ClaimId) -> Result<Vec<VoteRecord>, StoreError> {
        let tables = lock(&self.tables)?;
        let Some(voters) = tables.voters.get(claim) else {
            return Ok(Vec::new());
        };
        Ok(voters
            .iter()
            .filter_map(|voter| tables.votes.get(&(*claim, voter.clone())).cloned())
            .collect())
    }
}

/// Voter registry held in memory, with fixed reputation bounds.
pub struct MemoryVoterRegistry {
    min_reputation: u32,
    max_reputation: u32,
    voters: Mutex<HashMap<Address, Voter>>,
}

impl MemoryVoterRegistry {
    /// Registry with reputation bounded to `[min_reputation, max_reputation]`.
    /// New voters start at `min_reputation`, which must be at least 1.
    pub fn with_bounds(min_reputation: u32, max_reputation: u32) -> Result<Self, StoreError> {
        if min_reputation == 0 || min_reputation > max_reputation {
            return Err(StoreError::InvalidBounds {
                min: min_reputation,
                max: max_reputation,
            });
        }
        Ok(Self {
            min_reputation,
            max_reputation,
            voters: Mutex::new(HashMap::new()),
        })
    }

    fn clamp(&self, value: i64) -> u32 {
        value.clamp(i64::from(self.min_reputation), i64::from(self.max_reputation)) as u32
    }
}

impl Default for MemoryVoterRegistry {
    fn default() -> Self {
        Self {
            min_reputation: 1,
            max_reputation: 100,
            voters: Mutex::new(HashMap::new()),
        }
    }
}

impl VoterDirectory for MemoryVoterRegistry {
    fn reputation_bounds(&self) -> (u32, u32) {
        (self.min_reputation, self.max_reputation)
    }

    fn register_voter(&self, address: &Address) -> Result<Voter, StoreError> {
        let mut voters = lock(&self.voters)?;
        if voters.contains_key(address) {
            return Err(StoreError::Duplicate(address.to_string()));
        }
        let voter = Voter::registered(address.clone(), self.min_reputation);
        voters.insert(address.clone(), voter.clone());
        Ok(voter)
    }

    fn get_voter_data(&self, address: &Address) -> Result<Voter, StoreError> {
        Ok(lock(&self.voters)?
            .get(address)
            .cloned()
            .unwrap_or_else(|| Voter::unregistered(address.clone())))
    }

    fn is_registered(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(lock(&self.voters)?.contains_key(address))
    }

    fn update_reputation(&self, address: &Address, delta: i64) -> Result<u32, StoreError> {
        let mut voters = lock(&self.voters)?;
        let voter = voters
            .get_mut(address)
            .ok_or_else(|| StoreError::NotFound(address.to_string()))?;
        voter.reputation = self.clamp(i64::from(voter.reputation).saturating_add(delta));
        Ok(voter.reputation)
    }

    fn increment_vote_count(&self, address: &Address) -> Result<u64, StoreError> {
        let mut voters = lock(&self.voters)?;
        let voter = voters
            .get_mut(address)
            .ok_or_else(|| StoreError::NotFound(address.to_string()))?;
        voter.vote_count = voter.vote_count.saturating_add(1);
        Ok(voter.vote_count)
    }

    fn voter_count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.voters)?.len() as u64)
    }
}
