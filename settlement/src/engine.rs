//! The settlement engine.
//!
//! Owns the claim store, the voter registry and the two token ledgers, and is
//! the only writer of all four. Every entry point validates everything it can
//! before moving a token, moves tokens in a single ledger step where several
//! are involved, and only then writes claim and registry state. A rejected
//! call changes nothing.
//!
//! Claim lifecycle: `Active -> Completed`, triggered by
//! - a vote that lifts the combined reputation weight to the quorum,
//! - a vote arriving at or after the deadline (the vote is dropped),
//! - `finalize_and_distribute` by the owner, or by anyone after the deadline.

use crate::authorization::{pull_with_permit, Authorization};
use crate::error::SettlementError;
use crate::events::SettlementEvent;
use crate::math::isqrt;
use crate::payout::{compute_settlement, Settlement};
use diva_crypto::claim_id_for_url;
use diva_ledger::TokenLedger;
use diva_store::{ClaimStore, StoreError, VoterDirectory};
use diva_types::{
    Address, Choice, Claim, ClaimId, ClaimStatus, ParamsError, SettlementParams, Timestamp, Voter,
    VoteRecord,
};

/// What happened to a vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteReceipt {
    Recorded,
    /// Recorded, and it brought the claim to quorum.
    RecordedAndFinalized(Settlement),
    /// The deadline had passed: the vote was dropped and the claim closed.
    DeadlineClosed(Settlement),
}

/// The engine's own accounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineAccounts {
    /// May finalize early and manage the registry; receives pool dust.
    pub owner: Address,
    /// Holds escrowed stakes and reference currency; spender of every permit
    /// and minter of the staking token.
    pub escrow: Address,
}

pub struct SettlementEngine<L, R, V, S> {
    pub(crate) params: SettlementParams,
    pub(crate) accounts: EngineAccounts,
    pub(crate) stake_ledger: L,
    pub(crate) reference_ledger: R,
    pub(crate) voters: V,
    pub(crate) claims: S,
    pub(crate) events: Vec<SettlementEvent>,
}

struct FinalizationPlan {
    claim: Claim,
    settlement: Settlement,
    transfers: Vec<(Address, u128)>,
}

pub(crate) fn log_rejection<T>(
    op: &'static str,
    caller: &Address,
    result: Result<T, SettlementError>,
) -> Result<T, SettlementError> {
    if let Err(e) = &result {
        tracing::debug!(op, caller = %caller, error = %e, "operation rejected");
    }
    result
}

impl<L, R, V, S> SettlementEngine<L, R, V, S>
where
    L: TokenLedger,
    R: TokenLedger,
    V: VoterDirectory,
    S: ClaimStore,
{
    /// Build an engine. The parameters are validated and must agree with the
    /// ledgers' decimals; they cannot be changed afterwards.
    pub fn new(
        params: SettlementParams,
        accounts: EngineAccounts,
        stake_ledger: L,
        reference_ledger: R,
        voters: V,
        claims: S,
    ) -> Result<Self, SettlementError> {
        params.validate()?;
        if stake_ledger.decimals() != params.stake_token_decimals {
            return Err(ParamsError::Invalid {
                field: "stake_token_decimals",
                reason: format!("ledger {} uses {}", stake_ledger.symbol(), stake_ledger.decimals()),
            }
            .into());
        }
        if reference_ledger.decimals() != params.reference_token_decimals {
            return Err(ParamsError::Invalid {
                field: "reference_token_decimals",
                reason: format!(
                    "ledger {} uses {}",
                    reference_ledger.symbol(),
                    reference_ledger.decimals()
                ),
            }
            .into());
        }
        let (min_reputation, max_reputation) = voters.reputation_bounds();
        if min_reputation != params.min_reputation {
            return Err(ParamsError::Invalid {
                field: "min_reputation",
                reason: format!("voter registry floor is {min_reputation}"),
            }
            .into());
        }
        if max_reputation != params.max_reputation {
            return Err(ParamsError::Invalid {
                field: "max_reputation",
                reason: format!("voter registry ceiling is {max_reputation}"),
            }
            .into());
        }
        tracing::info!(
            owner = %accounts.owner,
            escrow = %accounts.escrow,
            quorum = params.quorum,
            "settlement engine ready"
        );
        Ok(Self {
            params,
            accounts,
            stake_ledger,
            reference_ledger,
            voters,
            claims,
            events: Vec::new(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn params(&self) -> &SettlementParams {
        &self.params
    }

    pub fn owner(&self) -> &Address {
        &self.accounts.owner
    }

    pub fn escrow_address(&self) -> &Address {
        &self.accounts.escrow
    }

    pub fn stake_ledger(&self) -> &L {
        &self.stake_ledger
    }

    /// Direct ledger access, for funding accounts outside the engine.
    pub fn stake_ledger_mut(&mut self) -> &mut L {
        &mut self.stake_ledger
    }

    pub fn reference_ledger(&self) -> &R {
        &self.reference_ledger
    }

    pub fn reference_ledger_mut(&mut self) -> &mut R {
        &mut self.reference_ledger
    }

    pub fn voters(&self) -> &V {
        &self.voters
    }

    pub fn claims(&self) -> &S {
        &self.claims
    }

    /// Integer square root used for winner weighting.
    pub fn sqrt(&self, n: u128) -> u128 {
        isqrt(n)
    }

    /// The id a claim on `content_url` has (or would have).
    pub fn claim_id_for(&self, content_url: &str) -> ClaimId {
        claim_id_for_url(content_url)
    }

    pub fn get_claim(&self, id: &ClaimId) -> Result<Claim, SettlementError> {
        self.load_claim(id)
    }

    pub fn get_vote(&self, id: &ClaimId, voter: &Address) -> Result<Option<VoteRecord>, SettlementError> {
        Ok(self.claims.get_vote(id, voter)?)
    }

    /// Registry record; unregistered addresses read as `{false, 0, 0}`.
    pub fn get_voter_data(&self, address: &Address) -> Result<Voter, SettlementError> {
        Ok(self.voters.get_voter_data(address)?)
    }

    pub fn is_registered(&self, address: &Address) -> Result<bool, SettlementError> {
        Ok(self.voters.is_registered(address)?)
    }

    pub fn events(&self) -> &[SettlementEvent] {
        &self.events
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SettlementEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Registry ─────────────────────────────────────────────────────────

    /// Register a voter at the minimum reputation. Owner only.
    pub fn register_voter(&mut self, caller: &Address, voter: &Address) -> Result<Voter, SettlementError> {
        let result = self
            .require_owner(caller)
            .and_then(|_| self.register(voter));
        log_rejection("register_voter", caller, result)
    }

    /// Shift a voter's reputation by `delta`, clamped. Owner only.
    pub fn update_reputation(
        &mut self,
        caller: &Address,
        voter: &Address,
        delta: i64,
    ) -> Result<u32, SettlementError> {
        let result = self
            .require_owner(caller)
            .and_then(|_| self.apply_reputation(voter, delta));
        log_rejection("update_reputation", caller, result)
    }

    pub(crate) fn register(&mut self, voter: &Address) -> Result<Voter, SettlementError> {
        let record = self.voters.register_voter(voter).map_err(|e| match e {
            StoreError::Duplicate(_) => SettlementError::AlreadyRegistered(voter.to_string()),
            other => other.into(),
        })?;
        tracing::info!(voter = %voter, reputation = record.reputation, "voter registered");
        Ok(record)
    }

    fn apply_reputation(&mut self, voter: &Address, delta: i64) -> Result<u32, SettlementError> {
        let before = self.voters.get_voter_data(voter)?;
        if !before.is_registered {
            return Err(SettlementError::VoterNotRegistered(voter.to_string()));
        }
        let after = self.voters.update_reputation(voter, delta)?;
        if after != before.reputation {
            tracing::debug!(voter = %voter, from = before.reputation, to = after, "reputation updated");
            self.events.push(SettlementEvent::ReputationUpdated {
                voter: voter.clone(),
                new_reputation: after,
            });
        }
        Ok(after)
    }

    // ── Claims ───────────────────────────────────────────────────────────

    /// Open a claim on `content_url`, escrowing the fixed post stake.
    pub fn create_post(
        &mut self,
        caller: &Address,
        content_url: &str,
        stake_amount: u128,
        auth: &Authorization,
        now: Timestamp,
    ) -> Result<ClaimId, SettlementError> {
        let result = self.try_create_post(caller, content_url, stake_amount, auth, now);
        log_rejection("create_post", caller, result)
    }

    fn try_create_post(
        &mut self,
        caller: &Address,
        content_url: &str,
        stake_amount: u128,
        auth: &Authorization,
        now: Timestamp,
    ) -> Result<ClaimId, SettlementError> {
        self.require_registered(caller)?;
        if stake_amount != self.params.post_stake_amount {
            return Err(SettlementError::InvalidPostStake {
                stake: stake_amount,
                required: self.params.post_stake_amount,
            });
        }
        let id = claim_id_for_url(content_url);
        if self.claims.contains_claim(&id)? {
            return Err(SettlementError::DuplicateClaim(id.to_string()));
        }

        pull_with_permit(
            &mut self.stake_ledger,
            caller,
            &self.accounts.escrow,
            stake_amount,
            auth,
            now,
        )?;

        let claim = Claim::new(
            id,
            caller.clone(),
            content_url.to_string(),
            stake_amount,
            now,
            self.params.max_vote_duration_secs,
        );
        self.claims.insert_claim(&claim)?;

        tracing::info!(
            claim = %id,
            poster = %caller,
            deadline = %claim.voting_deadline,
            "post created"
        );
        self.events.push(SettlementEvent::PostCreated {
            claim: id,
            poster: caller.clone(),
            content_url: content_url.to_string(),
        });
        Ok(id)
    }

    // ── Voting ───────────────────────────────────────────────────────────

    /// Stake on one side of a claim.
    ///
    /// A vote evaluated at or after the deadline is not recorded: the claim
    /// is finalized instead and `VoteReceipt::DeadlineClosed` returned. A vote
    /// that brings the combined reputation weight to the quorum finalizes the
    /// claim in the same call.
    pub fn vote(
        &mut self,
        caller: &Address,
        claim_id: &ClaimId,
        choice: Choice,
        stake_amount: u128,
        auth: &Authorization,
        now: Timestamp,
    ) -> Result<VoteReceipt, SettlementError> {
        let result = self.try_vote(caller, claim_id, choice, stake_amount, auth, now);
        log_rejection("vote", caller, result)
    }

    fn try_vote(
        &mut self,
        caller: &Address,
        claim_id: &ClaimId,
        choice: Choice,
        stake_amount: u128,
        auth: &Authorization,
        now: Timestamp,
    ) -> Result<VoteReceipt, SettlementError> {
        if !choice.is_ballot() {
            return Err(SettlementError::InvalidChoice);
        }
        let voter = self.require_registered(caller)?;
        let mut claim = self.load_claim(claim_id)?;
        if !claim.is_active() || claim.rewards_distributed {
            return Err(SettlementError::VotingClosed(claim_id.to_string()));
        }

        if claim.deadline_passed(now) {
            let votes = self.claims.votes_for(claim_id)?;
            let plan = self.plan_finalization(&claim, &votes, 0)?;
            let mark = self.events.len();
            let settlement = self.apply_finalization(plan)?;
            tracing::info!(claim = %claim_id, voter = %caller, "late vote closed the claim");
            self.events.insert(
                mark,
                SettlementEvent::VoteFailed {
                    claim: *claim_id,
                    timestamp: now,
                },
            );
            return Ok(VoteReceipt::DeadlineClosed(settlement));
        }

        if self.claims.get_vote(claim_id, caller)?.is_some() {
            return Err(SettlementError::AlreadyVoted {
                claim: claim_id.to_string(),
                voter: caller.to_string(),
            });
        }
        if stake_amount < self.params.min_stake_amount {
            return Err(SettlementError::StakeTooLow {
                stake: stake_amount,
                min: self.params.min_stake_amount,
            });
        }
        if stake_amount > self.params.max_stake_amount {
            return Err(SettlementError::StakeTooHigh {
                stake: stake_amount,
                max: self.params.max_stake_amount,
            });
        }

        let tally = claim.tally_mut(choice).ok_or(SettlementError::InvalidChoice)?;
        tally.vote_count = tally.vote_count.checked_add(1).ok_or(SettlementError::Overflow)?;
        tally.total_stake = tally
            .total_stake
            .checked_add(stake_amount)
            .ok_or(SettlementError::Overflow)?;
        tally.total_reputation = tally
            .total_reputation
            .checked_add(u64::from(voter.reputation))
            .ok_or(SettlementError::Overflow)?;

        let record = VoteRecord {
            claim: *claim_id,
            voter: caller.clone(),
            choice,
            stake_amount,
            reputation: voter.reputation,
            timestamp: now,
            withdrawn: false,
        };

        // Plan the quorum close before any token moves so a failing plan
        // leaves the vote unrecorded.
        let quorum_plan = if claim.total_reputation_weight() >= self.params.quorum {
            let mut votes = self.claims.votes_for(claim_id)?;
            votes.push(record.clone());
            Some(self.plan_finalization(&claim, &votes, stake_amount)?)
        } else {
            None
        };

        pull_with_permit(
            &mut self.stake_ledger,
            caller,
            &self.accounts.escrow,
            stake_amount,
            auth,
            now,
        )?;
        self.claims.put_vote(&record)?;
        self.voters.increment_vote_count(caller)?;
        self.claims.put_claim(&claim)?;

        tracing::info!(
            claim = %claim_id,
            voter = %caller,
            choice = %choice,
            stake = %stake_amount,
            weight = claim.total_reputation_weight(),
            "vote recorded"
        );
        self.events.push(SettlementEvent::VoteCast {
            claim: *claim_id,
            voter: caller.clone(),
            choice,
            stake: stake_amount,
        });

        match quorum_plan {
            Some(plan) => {
                tracing::info!(claim = %claim_id, quorum = self.params.quorum, "quorum reached");
                Ok(VoteReceipt::RecordedAndFinalized(self.apply_finalization(plan)?))
            }
            None => Ok(VoteReceipt::Recorded),
        }
    }

    /// Take a vote back before the deadline and get the full stake refunded.
    pub fn withdraw_vote(
        &mut self,
        caller: &Address,
        claim_id: &ClaimId,
        now: Timestamp,
    ) -> Result<u128, SettlementError> {
        let result = self.try_withdraw_vote(caller, claim_id, now);
        log_rejection("withdraw_vote", caller, result)
    }

    fn try_withdraw_vote(
        &mut self,
        caller: &Address,
        claim_id: &ClaimId,
        now: Timestamp,
    ) -> Result<u128, SettlementError> {
        let mut claim = self.load_claim(claim_id)?;
        let mut vote = self
            .claims
            .get_vote(claim_id, caller)?
            .ok_or_else(|| SettlementError::VoteNotFound {
                claim: claim_id.to_string(),
                voter: caller.to_string(),
            })?;
        if vote.withdrawn {
            return Err(SettlementError::AlreadyWithdrawn(claim_id.to_string()));
        }
        if !claim.is_active() || claim.deadline_passed(now) {
            return Err(SettlementError::VotingClosed(claim_id.to_string()));
        }

        let tally = claim
            .tally_mut(vote.choice)
            .ok_or(SettlementError::InvalidChoice)?;
        tally.vote_count = tally.vote_count.checked_sub(1).ok_or(SettlementError::Overflow)?;
        tally.total_stake = tally
            .total_stake
            .checked_sub(vote.stake_amount)
            .ok_or(SettlementError::Overflow)?;
        tally.total_reputation = tally
            .total_reputation
            .checked_sub(u64::from(vote.reputation))
            .ok_or(SettlementError::Overflow)?;

        self.stake_ledger
            .transfer(&self.accounts.escrow, caller, vote.stake_amount)?;
        vote.withdrawn = true;
        self.claims.put_vote(&vote)?;
        self.claims.put_claim(&claim)?;

        tracing::info!(
            claim = %claim_id,
            voter = %caller,
            refund = %vote.stake_amount,
            "vote withdrawn"
        );
        self.events.push(SettlementEvent::VoteWithdrawn {
            claim: *claim_id,
            voter: caller.clone(),
            refund: vote.stake_amount,
        });
        Ok(vote.stake_amount)
    }

    // ── Finalization ─────────────────────────────────────────────────────

    /// Settle a claim: decide the outcome, pay everyone out of escrow and
    /// update reputations. The owner may call this at any time; anyone else
    /// only once the deadline has passed.
    pub fn finalize_and_distribute(
        &mut self,
        caller: &Address,
        claim_id: &ClaimId,
        now: Timestamp,
    ) -> Result<Settlement, SettlementError> {
        let result = self.try_finalize(caller, claim_id, now);
        log_rejection("finalize_and_distribute", caller, result)
    }

    fn try_finalize(
        &mut self,
        caller: &Address,
        claim_id: &ClaimId,
        now: Timestamp,
    ) -> Result<Settlement, SettlementError> {
        let claim = self.load_claim(claim_id)?;
        if claim.rewards_distributed {
            return Err(SettlementError::AlreadyDistributed(claim_id.to_string()));
        }
        if *caller != self.accounts.owner && !claim.deadline_passed(now) {
            return Err(SettlementError::NotAuthorized(caller.to_string()));
        }
        let votes = self.claims.votes_for(claim_id)?;
        let plan = self.plan_finalization(&claim, &votes, 0)?;
        self.apply_finalization(plan)
    }

    /// Compute a settlement and check escrow can cover it. `incoming` is
    /// stake that will reach escrow before the plan is applied.
    fn plan_finalization(
        &self,
        claim: &Claim,
        votes: &[VoteRecord],
        incoming: u128,
    ) -> Result<FinalizationPlan, SettlementError> {
        let settlement = compute_settlement(claim, votes, &self.params)?;
        let needed = settlement.total_disbursed()?;
        let available = self
            .stake_ledger
            .balance_of(&self.accounts.escrow)
            .checked_add(incoming)
            .ok_or(SettlementError::Overflow)?;
        if available < needed {
            return Err(SettlementError::InsufficientFunds(format!(
                "escrow holds {available}, settlement of {} needs {needed}",
                claim.id
            )));
        }
        // Reputation writes happen after the payout; every target must
        // already be registered so none of them can be refused.
        for (voter, _) in &settlement.reputation_deltas {
            if !self.voters.is_registered(voter)? {
                return Err(SettlementError::VoterNotRegistered(voter.to_string()));
            }
        }

        let mut closed = claim.clone();
        closed.status = ClaimStatus::Completed;
        closed.outcome = settlement.outcome;
        closed.rewards_distributed = true;
        Ok(FinalizationPlan {
            transfers: settlement.transfers(&self.accounts.owner),
            claim: closed,
            settlement,
        })
    }

    fn apply_finalization(&mut self, plan: FinalizationPlan) -> Result<Settlement, SettlementError> {
        self.stake_ledger
            .transfer_many(&self.accounts.escrow, &plan.transfers)?;
        self.claims.put_claim(&plan.claim)?;
        for (voter, delta) in &plan.settlement.reputation_deltas {
            self.apply_reputation(voter, *delta)?;
        }

        let s = plan.settlement;
        tracing::info!(
            claim = %s.claim,
            outcome = %s.outcome,
            majority = s.majority_percent,
            rewarded = %s.total_rewarded,
            returned = %s.total_returned,
            dust = %s.treasury_sweep,
            winners = s.winner_count,
            losers = s.loser_count,
            "claim finalized"
        );
        self.events.push(SettlementEvent::VoteFinalized {
            claim: s.claim,
            outcome: s.outcome,
            majority_percent: s.majority_percent,
            total_rewarded: s.total_rewarded,
            total_returned: s.total_returned,
            winner_count: s.winner_count,
            loser_count: s.loser_count,
        });
        Ok(s)
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn load_claim(&self, id: &ClaimId) -> Result<Claim, SettlementError> {
        self.claims.get_claim(id).map_err(|e| match e {
            StoreError::NotFound(_) => SettlementError::ClaimNotFound(id.to_string()),
            other => other.into(),
        })
    }

    fn require_registered(&self, address: &Address) -> Result<Voter, SettlementError> {
        let voter = self.voters.get_voter_data(address)?;
        if !voter.is_registered {
            return Err(SettlementError::VoterNotRegistered(address.to_string()));
        }
        Ok(voter)
    }

    fn require_owner(&self, caller: &Address) -> Result<(), SettlementError> {
        if *caller != self.accounts.owner {
            return Err(SettlementError::NotAuthorized(caller.to_string()));
        }
        Ok(())
    }
}
