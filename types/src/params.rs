//! Settlement parameters.
//!
//! Fixed when the engine is constructed; there is no runtime setter. Loadable
//! from TOML, where any omitted field takes its deployed default. Raw token
//! amounts exceed TOML's 64-bit integers, so they are written as decimal
//! strings (plain integers are accepted too).

use crate::amount::{DIVA_DECIMALS, DIVA_UNIT, USDC_DECIMALS};
use crate::error::ParamsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementParams {
    // ── Stakes ───────────────────────────────────────────────────────────
    /// Smallest accepted vote stake (raw DIVA, inclusive).
    #[serde(with = "amount_str")]
    pub min_stake_amount: u128,

    /// Largest accepted vote stake (raw DIVA, inclusive).
    #[serde(with = "amount_str")]
    pub max_stake_amount: u128,

    /// Exact stake a poster escrows when creating a claim (raw DIVA).
    #[serde(with = "amount_str")]
    pub post_stake_amount: u128,

    // ── Closing rules ────────────────────────────────────────────────────
    /// Length of the voting window, from claim creation.
    pub max_vote_duration_secs: u64,

    /// Cumulative reputation weight (both sides) that closes a claim early.
    pub quorum: u64,

    // ── Reputation ───────────────────────────────────────────────────────
    pub min_reputation: u32,
    pub max_reputation: u32,
    /// Added to each winner's reputation at finalization (clamped).
    pub reputation_reward: u32,
    /// Removed from each loser's reputation at finalization (clamped).
    pub reputation_penalty: u32,

    // ── Payouts ──────────────────────────────────────────────────────────
    /// Share of a losing stake returned to the loser; the rest feeds the pool.
    pub loser_refund_percent: u8,

    // ── Purchase ─────────────────────────────────────────────────────────
    /// Whole DIVA minted per whole unit of reference currency.
    pub conversion_rate: u64,
    pub stake_token_decimals: u8,
    pub reference_token_decimals: u8,
}

impl SettlementParams {
    /// Values of the deployed DIVA contracts.
    pub fn diva_defaults() -> Self {
        Self {
            min_stake_amount: DIVA_UNIT,
            max_stake_amount: 100 * DIVA_UNIT,
            post_stake_amount: 5 * DIVA_UNIT,

            max_vote_duration_secs: 3 * 24 * 3600, // 3 days
            quorum: 1000,

            min_reputation: 1,
            max_reputation: 100,
            reputation_reward: 5,
            reputation_penalty: 5,

            loser_refund_percent: 60,

            conversion_rate: 1,
            stake_token_decimals: DIVA_DECIMALS,
            reference_token_decimals: USDC_DECIMALS,
        }
    }

    /// Load parameters from a TOML file and validate them.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ParamsError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse parameters from a TOML string and validate them.
    pub fn from_toml_str(s: &str) -> Result<Self, ParamsError> {
        let params: Self = toml::from_str(s).map_err(|e| ParamsError::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_toml_string(&self) -> Result<String, ParamsError> {
        toml::to_string_pretty(self).map_err(|e| ParamsError::Parse(e.to_string()))
    }

    /// Reject combinations the settlement arithmetic cannot honour.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.min_stake_amount == 0 {
            return Err(invalid("min_stake_amount", "must be non-zero"));
        }
        if self.min_stake_amount > self.max_stake_amount {
            return Err(invalid(
                "min_stake_amount",
                format!("{} exceeds max_stake_amount {}", self.min_stake_amount, self.max_stake_amount),
            ));
        }
        if self.post_stake_amount == 0 {
            return Err(invalid("post_stake_amount", "must be non-zero"));
        }
        if self.max_vote_duration_secs == 0 {
            return Err(invalid("max_vote_duration_secs", "must be non-zero"));
        }
        if self.quorum == 0 {
            return Err(invalid("quorum", "must be non-zero"));
        }
        if self.min_reputation == 0 {
            return Err(invalid("min_reputation", "must be at least 1"));
        }
        if self.min_reputation > self.max_reputation {
            return Err(invalid(
                "min_reputation",
                format!("{} exceeds max_reputation {}", self.min_reputation, self.max_reputation),
            ));
        }
        if self.loser_refund_percent > 100 {
            return Err(invalid("loser_refund_percent", "must be at most 100"));
        }
        if self.conversion_rate == 0 {
            return Err(invalid("conversion_rate", "must be non-zero"));
        }
        Ok(())
    }

    /// Clamp a reputation score into the configured bounds.
    pub fn clamp_reputation(&self, value: i64) -> u32 {
        value.clamp(i64::from(self.min_reputation), i64::from(self.max_reputation)) as u32
    }
}

impl Default for SettlementParams {
    fn default() -> Self {
        Self::diva_defaults()
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ParamsError {
    ParamsError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// `u128` as a decimal string, accepting bare integers on input.
mod amount_str {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        struct AmountVisitor;

        impl<'de> Visitor<'de> for AmountVisitor {
            type Value = u128;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a non-negative integer or decimal string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.replace('_', "").parse::<u128>().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(u128::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                u128::try_from(v).map_err(|_| E::custom("amount must be non-negative"))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let p = SettlementParams::diva_defaults();
        assert!(p.validate().is_ok());
        assert_eq!(p.quorum, 1000);
        assert_eq!(p.loser_refund_percent, 60);
        assert_eq!(p.post_stake_amount, 5 * DIVA_UNIT);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let p = SettlementParams::from_toml_str("").unwrap();
        assert_eq!(p, SettlementParams::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let p = SettlementParams::from_toml_str(
            r#"
            quorum = 250
            min_stake_amount = "500000000000000000"
            max_stake_amount = 1000000000000000000
            "#,
        )
        .unwrap();
        assert_eq!(p.quorum, 250);
        assert_eq!(p.min_stake_amount, DIVA_UNIT / 2);
        assert_eq!(p.max_stake_amount, DIVA_UNIT);
        assert_eq!(p.max_vote_duration_secs, 3 * 24 * 3600);
    }

    #[test]
    fn toml_string_roundtrip() {
        let p = SettlementParams::diva_defaults();
        let s = p.to_toml_string().unwrap();
        assert!(s.contains("max_stake_amount = \"100000000000000000000\""));
        assert_eq!(SettlementParams::from_toml_str(&s).unwrap(), p);
    }

    #[test]
    fn incoherent_configs_are_rejected() {
        let bad = [
            "min_stake_amount = \"0\"",
            "min_stake_amount = \"10\"\nmax_stake_amount = \"9\"",
            "quorum = 0",
            "min_reputation = 0",
            "min_reputation = 50\nmax_reputation = 10",
            "loser_refund_percent = 101",
            "conversion_rate = 0",
            "max_vote_duration_secs = 0",
        ];
        for toml in bad {
            assert!(
                matches!(SettlementParams::from_toml_str(toml), Err(ParamsError::Invalid { .. })),
                "accepted: {toml}"
            );
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            SettlementParams::from_toml_str("quorum = \"lots\""),
            Err(ParamsError::Parse(_))
        ));
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settlement.toml");
        std::fs::write(&path, "quorum = 42\n").unwrap();
        assert_eq!(SettlementParams::from_toml_file(&path).unwrap().quorum, 42);
        assert!(matches!(
            SettlementParams::from_toml_file(dir.path().join("missing.toml")),
            Err(ParamsError::Io(_))
        ));
    }

    #[test]
    fn clamp_reputation_bounds() {
        let p = SettlementParams::diva_defaults();
        assert_eq!(p.clamp_reputation(-4), 1);
        assert_eq!(p.clamp_reputation(250), 100);
        assert_eq!(p.clamp_reputation(42), 42);
    }
}
