use proptest::prelude::*;

use diva_types::{rescale, ClaimId, SettlementParams, Timestamp};

proptest! {
    /// ClaimId::is_zero is true only for all-zero bytes.
    #[test]
    fn claim_id_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let id = ClaimId::new(bytes);
        prop_assert_eq!(id.is_zero(), bytes == [0u8; 32]);
        prop_assert_eq!(id.to_string().len(), 64);
    }

    /// Shifting a timestamp keeps ordering and never wraps.
    #[test]
    fn plus_secs_is_monotonic(base in any::<u64>(), secs in any::<u64>()) {
        let t = Timestamp::new(base);
        prop_assert!(t.plus_secs(secs) >= t);
        prop_assert_eq!(t.plus_secs(secs).as_secs(), base.saturating_add(secs));
    }

    /// Scaling up then down by the same number of places is lossless.
    #[test]
    fn rescale_up_then_down(amount in 0u128..1_000_000_000_000u128, places in 0u8..18) {
        let up = rescale(amount, 0, places).unwrap();
        prop_assert_eq!(rescale(up, places, 0), Some(amount));
    }

    /// Clamped reputation always lands inside the configured bounds.
    #[test]
    fn clamp_reputation_in_bounds(value in any::<i64>()) {
        let p = SettlementParams::diva_defaults();
        let r = p.clamp_reputation(value);
        prop_assert!(r >= p.min_reputation && r <= p.max_reputation);
    }
}
