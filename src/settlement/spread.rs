use rust_decimal::{Decimal, dec};

/// Applied while the account still has monthly allowance left.
pub const PROMO_SPREAD: Decimal = dec!(0.01);

/// Applied once the monthly allowance is used up.
pub const STANDARD_SPREAD: Decimal = dec!(0.02);

/// Spread for the account's next transfer. Pure function of the month's
/// settled `user`-visible transaction count against the tier allowance;
/// callers must evaluate it fresh on every request, it is never cached.
pub fn spread_for_month(settled_this_month: i64, allowance: i32) -> Decimal {
    if settled_this_month < i64::from(allowance) {
        PROMO_SPREAD
    } else {
        STANDARD_SPREAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promo_below_allowance() {
        assert_eq!(spread_for_month(0, 10), PROMO_SPREAD);
        assert_eq!(spread_for_month(9, 10), PROMO_SPREAD);
        assert_eq!(spread_for_month(99, 100), PROMO_SPREAD);
    }

    #[test]
    fn test_standard_at_allowance() {
        assert_eq!(spread_for_month(10, 10), STANDARD_SPREAD);
        assert_eq!(spread_for_month(11, 10), STANDARD_SPREAD);
        assert_eq!(spread_for_month(100, 100), STANDARD_SPREAD);
    }
}
