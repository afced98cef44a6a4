//! Events emitted by the settlement engine, in emission order.

use diva_types::{Address, Choice, ClaimId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementEvent {
    /// Staking tokens minted against reference currency.
    DivasPurchased {
        to: Address,
        value: u128,
        reference_amount: u128,
    },
    PostCreated {
        claim: ClaimId,
        poster: Address,
        content_url: String,
    },
    VoteCast {
        claim: ClaimId,
        voter: Address,
        choice: Choice,
        stake: u128,
    },
    VoteWithdrawn {
        claim: ClaimId,
        voter: Address,
        refund: u128,
    },
    /// A vote arrived after the deadline; the claim was closed instead.
    VoteFailed { claim: ClaimId, timestamp: Timestamp },
    ReputationUpdated { voter: Address, new_reputation: u32 },
    VoteFinalized {
        claim: ClaimId,
        outcome: Choice,
        majority_percent: u64,
        total_rewarded: u128,
        total_returned: u128,
        winner_count: u64,
        loser_count: u64,
    },
}

impl SettlementEvent {
    /// The claim this event concerns, if any.
    pub fn claim(&self) -> Option<&ClaimId> {
        match self {
            SettlementEvent::PostCreated { claim, .. }
            | SettlementEvent::VoteCast { claim, .. }
            | SettlementEvent::VoteWithdrawn { claim, .. }
            | SettlementEvent::VoteFailed { claim, .. }
            | SettlementEvent::VoteFinalized { claim, .. } => Some(claim),
            SettlementEvent::DivasPurchased { .. } | SettlementEvent::ReputationUpdated { .. } => None,
        }
    }
}
