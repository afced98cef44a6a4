use diva_ledger::TokenLedger;
use diva_nullables::{NullClock, NullLedger};
use diva_settlement::{
    compute_settlement, isqrt, Authorization, EngineAccounts, SettlementEngine,
};
use diva_store::{ClaimStore, MemoryClaimStore, MemoryVoterRegistry};
use diva_types::{
    Address, Choice, Claim, ClaimId, SettlementParams, Signature, Timestamp, VoteRecord, DIVA_UNIT,
};
use proptest::prelude::*;

fn addr(i: usize) -> Address {
    Address::new(format!("diva_voter{i}"))
}

fn any_choice() -> impl Strategy<Value = Choice> {
    prop_oneof![Just(Choice::True), Just(Choice::Fake)]
}

proptest! {
    #[test]
    fn isqrt_is_floor_root(n in any::<u128>()) {
        let r = isqrt(n);
        prop_assert!(r * r <= n);
        let next = r + 1;
        prop_assert!(next.checked_mul(next).map_or(true, |sq| sq > n));
    }

    #[test]
    fn isqrt_is_monotonic(a in any::<u64>(), b in any::<u64>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(isqrt(u128::from(lo)) <= isqrt(u128::from(hi)));
    }

    /// Everything that entered escrow for a claim leaves it at settlement,
    /// and losers get back exactly the configured share (floored).
    #[test]
    fn settlement_conserves_stake(
        votes in prop::collection::vec(
            (any_choice(), 1u128..=100 * DIVA_UNIT, 1u32..=100, any::<bool>()),
            0..25,
        ),
    ) {
        let params = SettlementParams::diva_defaults();
        let claim = Claim::new(
            ClaimId::new([1u8; 32]),
            Address::new("diva_poster"),
            "https://example.com".into(),
            params.post_stake_amount,
            Timestamp::new(0),
            params.max_vote_duration_secs,
        );
        let records: Vec<VoteRecord> = votes
            .iter()
            .enumerate()
            .map(|(i, (choice, stake, reputation, withdrawn))| VoteRecord {
                claim: claim.id,
                voter: addr(i),
                choice: *choice,
                stake_amount: *stake,
                reputation: *reputation,
                timestamp: Timestamp::new(1),
                withdrawn: *withdrawn,
            })
            .collect();

        let s = compute_settlement(&claim, &records, &params).unwrap();
        let staked: u128 = records.iter().filter(|v| !v.withdrawn).map(|v| v.stake_amount).sum();
        prop_assert_eq!(s.total_disbursed().unwrap(), staked + claim.post_stake);
        prop_assert!(s.total_rewarded <= s.reward_pool);

        for p in &s.payouts {
            if p.choice != s.outcome && s.outcome != Choice::None {
                prop_assert_eq!(p.amount, p.stake * 60 / 100);
            } else {
                prop_assert!(p.amount >= p.stake);
            }
        }
        if s.outcome == Choice::None {
            prop_assert!(s.reputation_deltas.is_empty());
        }
    }

    /// After any mix of votes and withdrawals, each side's aggregates equal
    /// the sums over its live votes.
    #[test]
    fn aggregates_match_live_votes(
        ops in prop::collection::vec((0usize..8, any_choice(), 1u128..=20, any::<bool>()), 1..40),
    ) {
        let mut params = SettlementParams::diva_defaults();
        params.min_stake_amount = 1;
        params.max_stake_amount = 20;
        params.post_stake_amount = 5;
        params.quorum = u64::MAX;

        let escrow = Address::new("diva_escrow");
        let mut stake = NullLedger::stake_token();
        stake.fund(&Address::new("diva_poster"), 5);
        for i in 0..8 {
            stake.fund(&addr(i), 1_000);
        }
        let mut e = SettlementEngine::new(
            params,
            EngineAccounts { owner: Address::new("diva_owner"), escrow: escrow.clone() },
            stake,
            NullLedger::reference_token(),
            MemoryVoterRegistry::default(),
            MemoryClaimStore::new(),
        ).unwrap();
        let owner = Address::new("diva_owner");
        e.register_voter(&owner, &Address::new("diva_poster")).unwrap();
        for i in 0..8 {
            e.register_voter(&owner, &addr(i)).unwrap();
            e.update_reputation(&owner, &addr(i), i as i64 * 7).unwrap();
        }

        let clock = NullClock::new(100);
        let auth = Authorization { deadline: clock.in_secs(10), signature: Signature([0u8; 64]) };
        let id = e.create_post(&Address::new("diva_poster"), "https://x.example", 5, &auth, clock.now()).unwrap();

        for (who, choice, amount, withdraw) in ops {
            if withdraw {
                let _ = e.withdraw_vote(&addr(who), &id, clock.now());
            } else {
                let _ = e.vote(&addr(who), &id, choice, amount, &auth, clock.now());
            }
        }

        let claim = e.get_claim(&id).unwrap();
        let votes = e.claims().votes_for(&id).unwrap();
        for (side, tally) in [(Choice::True, claim.true_tally), (Choice::Fake, claim.fake_tally)] {
            let live: Vec<&VoteRecord> = votes.iter().filter(|v| !v.withdrawn && v.choice == side).collect();
            prop_assert_eq!(tally.vote_count, live.len() as u64);
            prop_assert_eq!(tally.total_stake, live.iter().map(|v| v.stake_amount).sum::<u128>());
            prop_assert_eq!(tally.total_reputation, live.iter().map(|v| u64::from(v.reputation)).sum::<u64>());
        }
        let live_stake: u128 = votes.iter().filter(|v| !v.withdrawn).map(|v| v.stake_amount).sum();
        prop_assert_eq!(e.stake_ledger().balance_of(&escrow), live_stake + 5);
    }
}
