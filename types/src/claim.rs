//! Claim ("post") and vote records.

use crate::{Address, ClaimId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A side of a claim, or the absence of one.
///
/// `None` is never a valid ballot; it is the outcome of a tie or of a claim
/// nobody voted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    None = 0,
    True = 1,
    Fake = 2,
}

impl Choice {
    /// Whether this choice can be cast as a vote.
    pub fn is_ballot(&self) -> bool {
        matches!(self, Choice::True | Choice::Fake)
    }

    /// Wire discriminant (0 = none, 1 = true, 2 = fake).
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Choice::None),
            1 => Some(Choice::True),
            2 => Some(Choice::Fake),
            _ => None,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Choice::None => "none",
            Choice::True => "true",
            Choice::Fake => "fake",
        };
        f.write_str(s)
    }
}

/// Lifecycle of a claim. `Completed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    Active,
    Completed,
}

/// Running aggregates for one side of a claim, over non-withdrawn votes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTally {
    pub vote_count: u64,
    pub total_stake: u128,
    pub total_reputation: u64,
}

/// A claim under vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub poster: Address,
    pub content_url: String,
    pub created_at: Timestamp,
    pub voting_deadline: Timestamp,
    /// Escrowed poster stake, settled at finalization.
    pub post_stake: u128,
    pub status: ClaimStatus,
    pub true_tally: SideTally,
    pub fake_tally: SideTally,
    /// `Choice::None` until finalized, and after a tie.
    pub outcome: Choice,
    pub rewards_distributed: bool,
}

impl Claim {
    pub fn new(
        id: ClaimId,
        poster: Address,
        content_url: String,
        post_stake: u128,
        now: Timestamp,
        vote_duration_secs: u64,
    ) -> Self {
        Self {
            id,
            poster,
            content_url,
            created_at: now,
            voting_deadline: now.plus_secs(vote_duration_secs),
            post_stake,
            status: ClaimStatus::Active,
            true_tally: SideTally::default(),
            fake_tally: SideTally::default(),
            outcome: Choice::None,
            rewards_distributed: false,
        }
    }

    /// Aggregates for a ballot side. `Choice::None` has no tally.
    pub fn tally(&self, side: Choice) -> Option<&SideTally> {
        match side {
            Choice::True => Some(&self.true_tally),
            Choice::Fake => Some(&self.fake_tally),
            Choice::None => None,
        }
    }

    pub fn tally_mut(&mut self, side: Choice) -> Option<&mut SideTally> {
        match side {
            Choice::True => Some(&mut self.true_tally),
            Choice::Fake => Some(&mut self.fake_tally),
            Choice::None => None,
        }
    }

    /// Cumulative reputation weight across both sides (the quorum measure).
    pub fn total_reputation_weight(&self) -> u64 {
        self.true_tally
            .total_reputation
            .saturating_add(self.fake_tally.total_reputation)
    }

    pub fn total_stake(&self) -> u128 {
        self.true_tally
            .total_stake
            .saturating_add(self.fake_tally.total_stake)
    }

    pub fn is_active(&self) -> bool {
        self.status == ClaimStatus::Active
    }

    /// Whether the voting window has elapsed at `now`.
    pub fn deadline_passed(&self, now: Timestamp) -> bool {
        now >= self.voting_deadline
    }
}

/// One voter's ballot on one claim, keyed by `(claim, voter)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub claim: ClaimId,
    pub voter: Address,
    pub choice: Choice,
    pub stake_amount: u128,
    /// Reputation the voter held when the vote was cast; this is the weight
    /// added to (and on withdrawal removed from) the side's tally.
    pub reputation: u32,
    pub timestamp: Timestamp,
    pub withdrawn: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim() -> Claim {
        Claim::new(
            ClaimId::new([1u8; 32]),
            Address::new("diva_poster"),
            "https://example.com/a".to_string(),
            5,
            Timestamp::new(1_000),
            3 * 24 * 3600,
        )
    }

    #[test]
    fn new_claim_is_active_with_empty_tallies() {
        let c = claim();
        assert!(c.is_active());
        assert_eq!(c.voting_deadline, Timestamp::new(1_000 + 259_200));
        assert_eq!(c.total_reputation_weight(), 0);
        assert_eq!(c.total_stake(), 0);
        assert_eq!(c.outcome, Choice::None);
        assert!(!c.rewards_distributed);
    }

    #[test]
    fn deadline_is_inclusive() {
        let c = claim();
        assert!(!c.deadline_passed(Timestamp::new(1_000 + 259_199)));
        assert!(c.deadline_passed(Timestamp::new(1_000 + 259_200)));
    }

    #[test]
    fn none_side_has_no_tally() {
        let mut c = claim();
        assert!(c.tally(Choice::None).is_none());
        assert!(c.tally_mut(Choice::None).is_none());
        c.tally_mut(Choice::Fake).unwrap().total_reputation = 7;
        c.tally_mut(Choice::True).unwrap().total_reputation = 3;
        assert_eq!(c.total_reputation_weight(), 10);
    }

    #[test]
    fn choice_discriminants() {
        assert_eq!(Choice::from_u8(2), Some(Choice::Fake));
        assert_eq!(Choice::from_u8(3), None);
        assert_eq!(Choice::True.as_u8(), 1);
        assert!(!Choice::None.is_ballot());
    }
}
