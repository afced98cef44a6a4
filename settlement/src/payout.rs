//! Settlement arithmetic: outcome, refunds, reward pool and winner shares.
//!
//! Everything here is a pure function of the claim, its votes and the
//! parameters. The engine turns the result into one batch of ledger
//! transfers and a set of reputation updates.
//!
//! For a decided claim:
//! - each loser gets back `stake × loser_refund_percent / 100`;
//! - the rest of every losing stake forms the reward pool, plus the poster's
//!   stake when the claim is judged fake;
//! - each winner gets `stake + pool × weight / Σweight`, where
//!   `weight = isqrt(stake) × reputation_at_vote_time`;
//! - the integer remainder of the pool, or the whole pool when `Σweight` is
//!   zero, goes to the treasury.
//!
//! A tie (including a claim nobody voted on) refunds every stake in full.

use crate::error::SettlementError;
use crate::math::isqrt;
use diva_types::{Address, Choice, Claim, ClaimId, SettlementParams, VoteRecord};
use serde::{Deserialize, Serialize};

/// Why a voter is being paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutKind {
    /// Tie: full stake back.
    Refund,
    /// On the winning side: stake plus a share of the pool.
    Winner,
    /// On the losing side: partial refund.
    Loser,
}

/// One voter's payout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterPayout {
    pub voter: Address,
    pub choice: Choice,
    pub stake: u128,
    /// Share of the reward pool (winners only).
    pub reward: u128,
    /// Total transferred to the voter.
    pub amount: u128,
    pub kind: PayoutKind,
}

/// The full result of finalizing a claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub claim: ClaimId,
    pub outcome: Choice,
    /// `winning_weight × 100 / (winning + losing)`; 0 when there is no winner.
    pub majority_percent: u64,
    pub true_weight: u64,
    pub fake_weight: u64,
    pub reward_pool: u128,
    pub total_winner_weight: u128,
    /// Sum of pool shares paid to winners.
    pub total_rewarded: u128,
    /// Sum of stake paid back to voters (full, winner or partial refunds).
    pub total_returned: u128,
    pub winner_count: u64,
    pub loser_count: u64,
    pub payouts: Vec<VoterPayout>,
    pub poster: Address,
    pub poster_refund: u128,
    /// Pool remainder sent to the treasury.
    pub treasury_sweep: u128,
    /// Reputation change per voter, in vote order. Empty on a tie.
    pub reputation_deltas: Vec<(Address, i64)>,
}

impl Settlement {
    /// Ledger transfers that realize this settlement, zero amounts omitted.
    pub fn transfers(&self, treasury: &Address) -> Vec<(Address, u128)> {
        let mut out: Vec<(Address, u128)> = self
            .payouts
            .iter()
            .filter(|p| p.amount > 0)
            .map(|p| (p.voter.clone(), p.amount))
            .collect();
        if self.poster_refund > 0 {
            out.push((self.poster.clone(), self.poster_refund));
        }
        if self.treasury_sweep > 0 {
            out.push((treasury.clone(), self.treasury_sweep));
        }
        out
    }

    /// Everything leaving escrow.
    pub fn total_disbursed(&self) -> Result<u128, SettlementError> {
        self.payouts
            .iter()
            .try_fold(0u128, |acc, p| acc.checked_add(p.amount))
            .and_then(|acc| acc.checked_add(self.poster_refund))
            .and_then(|acc| acc.checked_add(self.treasury_sweep))
            .ok_or(SettlementError::Overflow)
    }
}

/// Winner weight: square-root-damped stake times reputation.
pub fn vote_weight(stake: u128, reputation: u32) -> Result<u128, SettlementError> {
    isqrt(stake)
        .checked_mul(u128::from(reputation))
        .ok_or(SettlementError::Overflow)
}

/// Compute the settlement of `claim` from its votes. Withdrawn votes are
/// ignored.
pub fn compute_settlement(
    claim: &Claim,
    votes: &[VoteRecord],
    params: &SettlementParams,
) -> Result<Settlement, SettlementError> {
    let live: Vec<&VoteRecord> = votes
        .iter()
        .filter(|v| !v.withdrawn && v.claim == claim.id)
        .collect();

    let mut true_weight = 0u64;
    let mut fake_weight = 0u64;
    for v in &live {
        let side = match v.choice {
            Choice::True => &mut true_weight,
            Choice::Fake => &mut fake_weight,
            Choice::None => return Err(SettlementError::InvalidChoice),
        };
        *side = side
            .checked_add(u64::from(v.reputation))
            .ok_or(SettlementError::Overflow)?;
    }

    let mut settlement = Settlement {
        claim: claim.id,
        outcome: Choice::None,
        majority_percent: 0,
        true_weight,
        fake_weight,
        reward_pool: 0,
        total_winner_weight: 0,
        total_rewarded: 0,
        total_returned: 0,
        winner_count: 0,
        loser_count: 0,
        payouts: Vec::with_capacity(live.len()),
        poster: claim.poster.clone(),
        poster_refund: claim.post_stake,
        treasury_sweep: 0,
        reputation_deltas: Vec::new(),
    };

    if true_weight == fake_weight {
        for v in &live {
            settlement.payouts.push(VoterPayout {
                voter: v.voter.clone(),
                choice: v.choice,
                stake: v.stake_amount,
                reward: 0,
                amount: v.stake_amount,
                kind: PayoutKind::Refund,
            });
            settlement.total_returned = settlement
                .total_returned
                .checked_add(v.stake_amount)
                .ok_or(SettlementError::Overflow)?;
        }
        return Ok(settlement);
    }

    let (outcome, winning, losing) = if true_weight > fake_weight {
        (Choice::True, true_weight, fake_weight)
    } else {
        (Choice::Fake, fake_weight, true_weight)
    };
    settlement.outcome = outcome;
    settlement.majority_percent =
        (u128::from(winning) * 100 / (u128::from(winning) + u128::from(losing))) as u64;

    // Losers first: their forfeits make up the pool.
    let mut pool = 0u128;
    for v in live.iter().filter(|v| v.choice != outcome) {
        let refund = v
            .stake_amount
            .checked_mul(u128::from(params.loser_refund_percent))
            .ok_or(SettlementError::Overflow)?
            / 100;
        pool = pool
            .checked_add(v.stake_amount - refund)
            .ok_or(SettlementError::Overflow)?;
        settlement.total_returned = settlement
            .total_returned
            .checked_add(refund)
            .ok_or(SettlementError::Overflow)?;
        settlement.loser_count += 1;
        settlement
            .reputation_deltas
            .push((v.voter.clone(), -i64::from(params.reputation_penalty)));
        settlement.payouts.push(VoterPayout {
            voter: v.voter.clone(),
            choice: v.choice,
            stake: v.stake_amount,
            reward: 0,
            amount: refund,
            kind: PayoutKind::Loser,
        });
    }

    if outcome == Choice::Fake {
        pool = pool
            .checked_add(claim.post_stake)
            .ok_or(SettlementError::Overflow)?;
        settlement.poster_refund = 0;
    }
    settlement.reward_pool = pool;

    let winners: Vec<(&VoteRecord, u128)> = live
        .iter()
        .filter(|v| v.choice == outcome)
        .map(|v| vote_weight(v.stake_amount, v.reputation).map(|w| (*v, w)))
        .collect::<Result<_, _>>()?;
    let total_weight = winners
        .iter()
        .try_fold(0u128, |acc, (_, w)| acc.checked_add(*w))
        .ok_or(SettlementError::Overflow)?;
    settlement.total_winner_weight = total_weight;

    let mut distributed = 0u128;
    for (v, weight) in winners {
        let reward = if total_weight == 0 {
            0
        } else {
            pool.checked_mul(weight).ok_or(SettlementError::Overflow)? / total_weight
        };
        distributed += reward;
        let amount = v
            .stake_amount
            .checked_add(reward)
            .ok_or(SettlementError::Overflow)?;
        settlement.total_returned = settlement
            .total_returned
            .checked_add(v.stake_amount)
            .ok_or(SettlementError::Overflow)?;
        settlement.winner_count += 1;
        settlement
            .reputation_deltas
            .push((v.voter.clone(), i64::from(params.reputation_reward)));
        settlement.payouts.push(VoterPayout {
            voter: v.voter.clone(),
            choice: v.choice,
            stake: v.stake_amount,
            reward,
            amount,
            kind: PayoutKind::Winner,
        });
    }
    settlement.total_rewarded = distributed;
    settlement.treasury_sweep = pool - distributed;

    Ok(settlement)
}
