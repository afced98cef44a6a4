#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use diva_settlement::compute_settlement;
use diva_types::{Address, Choice, Claim, ClaimId, SettlementParams, Timestamp, VoteRecord};

#[derive(Debug, Arbitrary)]
struct FuzzVote {
    fake: bool,
    stake: u64,
    reputation: u8,
    withdrawn: bool,
}

// Whenever a settlement is produced it must pay out exactly what escrow holds.
fuzz_target!(|input: (u64, u8, Vec<FuzzVote>)| {
    let (post_stake, refund_percent, votes) = input;
    let mut params = SettlementParams::diva_defaults();
    params.loser_refund_percent = refund_percent % 101;

    let claim = Claim::new(
        ClaimId::new([3u8; 32]),
        Address::new("diva_poster"),
        "https://example.com".into(),
        u128::from(post_stake),
        Timestamp::new(0),
        params.max_vote_duration_secs,
    );
    let records: Vec<VoteRecord> = votes
        .iter()
        .enumerate()
        .map(|(i, v)| VoteRecord {
            claim: claim.id,
            voter: Address::new(format!("diva_voter{i}")),
            choice: if v.fake { Choice::Fake } else { Choice::True },
            stake_amount: u128::from(v.stake),
            reputation: u32::from(v.reputation % 100) + 1,
            timestamp: Timestamp::new(1),
            withdrawn: v.withdrawn,
        })
        .collect();

    if let Ok(s) = compute_settlement(&claim, &records, &params) {
        let staked: u128 = records
            .iter()
            .filter(|v| !v.withdrawn)
            .map(|v| v.stake_amount)
            .sum();
        assert_eq!(s.total_disbursed(), Ok(staked + claim.post_stake));
        assert!(s.total_rewarded <= s.reward_pool);
    }
});
