//! Token units.
//!
//! Amounts are raw fixed-point integers (`u128`). The staking token (DIVA) has
//! 18 decimals; the reference currency (USDC) has 6.

/// Decimal places of the staking token.
pub const DIVA_DECIMALS: u8 = 18;

/// One whole DIVA in raw units.
pub const DIVA_UNIT: u128 = 1_000_000_000_000_000_000;

/// Decimal places of the reference currency.
pub const USDC_DECIMALS: u8 = 6;

/// One whole USDC in raw units.
pub const USDC_UNIT: u128 = 1_000_000;

/// Convert a raw amount between two decimal precisions.
///
/// Scaling up multiplies (checked); scaling down floors. Returns `None` on overflow.
pub fn rescale(amount: u128, from_decimals: u8, to_decimals: u8) -> Option<u128> {
    if to_decimals >= from_decimals {
        let factor = 10u128.checked_pow(u32::from(to_decimals - from_decimals))?;
        amount.checked_mul(factor)
    } else {
        let factor = 10u128.checked_pow(u32::from(from_decimals - to_decimals))?;
        Some(amount / factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usdc_to_diva_scales_by_twelve_places() {
        assert_eq!(rescale(USDC_UNIT, USDC_DECIMALS, DIVA_DECIMALS), Some(DIVA_UNIT));
        assert_eq!(rescale(10 * USDC_UNIT, USDC_DECIMALS, DIVA_DECIMALS), Some(10 * DIVA_UNIT));
    }

    #[test]
    fn scaling_down_floors() {
        assert_eq!(rescale(1_999_999, 6, 0), Some(1));
        assert_eq!(rescale(5, 6, 6), Some(5));
    }

    #[test]
    fn overflow_is_none() {
        assert_eq!(rescale(u128::MAX, 0, 1), None);
        assert_eq!(rescale(1, 0, 60), None);
    }
}
