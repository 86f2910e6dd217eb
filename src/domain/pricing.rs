//! Coin pricing and quantity validation.
//!
//! Rates are quoted per 1,000,000 coins. Totals are whole currency units,
//! rounded half up, computed in integer arithmetic.

use crate::domain::entities::Rate;
use crate::domain::errors::InputError;

/// Number of coins a rate is quoted for.
pub const COINS_PER_RATE_UNIT: u64 = 1_000_000;

/// Largest quantity or total an order can carry. The order log stores signed 64-bit integers.
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

/// Total for `quantity` coins at `rate`, rounded half up to a whole unit.
///
/// Returns `None` if the result exceeds [`MAX_AMOUNT`].
pub fn coin_total(quantity: u64, rate: Rate) -> Option<u64> {
    let numerator = u128::from(quantity) * u128::from(rate.hundredths());
    let denominator = u128::from(COINS_PER_RATE_UNIT) * 100;
    let rounded = (numerator + denominator / 2) / denominator;
    u64::try_from(rounded).ok().filter(|total| *total <= MAX_AMOUNT)
}

/// Parses a coin quantity: ASCII digits only, surrounding whitespace ignored, greater than zero,
/// at most [`MAX_AMOUNT`].
pub fn parse_quantity(text: &str) -> Result<u64, InputError> {
    let t = text.trim();
    if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::NotANumber);
    }
    let quantity: u64 = t.parse().map_err(|_| InputError::TooLarge)?;
    if quantity == 0 {
        return Err(InputError::NotPositive);
    }
    if quantity > MAX_AMOUNT {
        return Err(InputError::TooLarge);
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(units: u64) -> Rate {
        Rate::from_units(units).unwrap()
    }

    #[test]
    fn test_coin_total_exact() {
        assert_eq!(coin_total(5_000_000, rate(100)), Some(500));
        assert_eq!(coin_total(1_000_000, rate(150)), Some(150));
        assert_eq!(coin_total(300_000, rate(10_000)), Some(3_000));
    }

    #[test]
    fn test_coin_total_rounds_half_up() {
        // 500_000 coins at 1 per million = 0.5 -> 1
        assert_eq!(coin_total(500_000, rate(1)), Some(1));
        // 499_999 coins at 1 per million = 0.499999 -> 0
        assert_eq!(coin_total(499_999, rate(1)), Some(0));
        // 1_500_000 at 99.99 = 149.985 -> 150
        let r = Rate::from_hundredths(9_999).unwrap();
        assert_eq!(coin_total(1_500_000, r), Some(150));
        // 2_500_000 at 1 = 2.5 -> 3
        assert_eq!(coin_total(2_500_000, rate(1)), Some(3));
    }

    #[test]
    fn test_coin_total_matches_rounding_for_many_quantities() {
        let r = Rate::from_hundredths(12_345).unwrap();
        for q in (1..5_000_000u64).step_by(99_991) {
            let exact = q as f64 * 123.45 / 1_000_000.0;
            let expected = (exact + 0.5).floor() as u64;
            assert_eq!(coin_total(q, r), Some(expected), "quantity {}", q);
        }
    }

    #[test]
    fn test_coin_total_overflow() {
        let highest = Rate::from_hundredths(Rate::MAX_HUNDREDTHS).unwrap();
        assert_eq!(coin_total(u64::MAX, highest), None);
        // one currency unit per coin: total == quantity
        let per_coin = Rate::from_units(COINS_PER_RATE_UNIT).unwrap();
        assert_eq!(coin_total(MAX_AMOUNT, per_coin), Some(MAX_AMOUNT));
        // fits u64 but not the order log
        assert_eq!(coin_total(MAX_AMOUNT + 1, per_coin), None);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("5000000"), Ok(5_000_000));
        assert_eq!(parse_quantity("  42\n"), Ok(42));
        assert_eq!(parse_quantity("abc"), Err(InputError::NotANumber));
        assert_eq!(parse_quantity("1.5"), Err(InputError::NotANumber));
        assert_eq!(parse_quantity("-3"), Err(InputError::NotANumber));
        assert_eq!(parse_quantity("0"), Err(InputError::NotPositive));
        assert_eq!(parse_quantity(""), Err(InputError::NotANumber));
        assert_eq!(
            parse_quantity("99999999999999999999999"),
            Err(InputError::TooLarge)
        );
    }

    #[test]
    fn test_parse_quantity_bounded_by_order_log() {
        assert_eq!(parse_quantity("9223372036854775807"), Ok(MAX_AMOUNT));
        assert_eq!(
            parse_quantity("9223372036854775808"),
            Err(InputError::TooLarge)
        );
        assert_eq!(
            parse_quantity("10000000000000000000"),
            Err(InputError::TooLarge)
        );
    }
}
