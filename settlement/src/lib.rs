//! Staking-vote settlement for DIVA claims.
//!
//! Registered participants stake DIVA on whether a posted claim is true or
//! fake. Stakes are pulled with offline-signed permits; a claim closes when
//! its combined reputation weight reaches the quorum, when its deadline
//! passes, or when the owner finalizes it. Settlement refunds losers in part,
//! pools the rest for the winners and adjusts reputations.

pub mod authorization;
pub mod engine;
pub mod error;
pub mod events;
pub mod math;
pub mod payout;
pub mod purchase;

pub use authorization::{sign_authorization, Authorization};
pub use engine::{EngineAccounts, SettlementEngine, VoteReceipt};
pub use error::SettlementError;
pub use events::SettlementEvent;
pub use math::isqrt;
pub use payout::{compute_settlement, vote_weight, PayoutKind, Settlement, VoterPayout};
