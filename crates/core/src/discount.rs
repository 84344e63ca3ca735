//! Quantity-tiered discounts.
//!
//! Buying more of one product unlocks a larger percentage off its unit price:
//!
//! | Quantity   | Discount |
//! |------------|----------|
//! | 0-9        | 0%       |
//! | 10-25      | 5%       |
//! | 26-50      | 7%       |
//! | 51-100     | 11%      |
//! | above 100  | 14%      |

use rust_decimal::Decimal;

use crate::Quantity;

/// One row of the discount table. Both bounds are inclusive; `max_qty: None`
/// means the tier is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountTier {
    pub min_qty: i64,
    pub max_qty: Option<i64>,
    pub percent: u8,
}

impl DiscountTier {
    const fn contains(&self, quantity: i64) -> bool {
        match self.max_qty {
            Some(max) => quantity >= self.min_qty && quantity <= max,
            None => quantity >= self.min_qty,
        }
    }
}

/// The store's tier table, ordered by `min_qty`.
///
/// Tiers must stay contiguous and non-decreasing in percent; the tests in
/// this module enforce that.
pub const DISCOUNT_TIERS: [DiscountTier; 4] = [
    DiscountTier {
        min_qty: 10,
        max_qty: Some(25),
        percent: 5,
    },
    DiscountTier {
        min_qty: 26,
        max_qty: Some(50),
        percent: 7,
    },
    DiscountTier {
        min_qty: 51,
        max_qty: Some(100),
        percent: 11,
    },
    DiscountTier {
        min_qty: 101,
        max_qty: None,
        percent: 14,
    },
];

/// Discount percentage for a quantity.
///
/// Total over every integer: anything below the first tier, including zero
/// and negative values, gets `0`.
///
/// ```
/// use greenmarket_core::discount_percent;
///
/// assert_eq!(discount_percent(9), 0);
/// assert_eq!(discount_percent(30), 7);
/// assert_eq!(discount_percent(101), 14);
/// ```
#[must_use]
pub fn discount_percent(quantity: i64) -> u8 {
    DISCOUNT_TIERS
        .iter()
        .find(|tier| tier.contains(quantity))
        .map_or(0, |tier| tier.percent)
}

/// `unit_price × (1 − discount/100) × quantity`, computed exactly.
#[must_use]
pub fn discounted_line_total(unit_price: Decimal, quantity: Quantity) -> Decimal {
    let qty = Decimal::from(quantity.get());
    let percent = Decimal::from(discount_percent(i64::from(quantity.get())));
    let hundred = Decimal::ONE_HUNDRED;
    unit_price * qty * (hundred - percent) / hundred
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        let cases = [
            (0, 0),
            (9, 0),
            (10, 5),
            (25, 5),
            (26, 7),
            (50, 7),
            (51, 11),
            (100, 11),
            (101, 14),
            (10_000, 14),
        ];
        for (qty, expected) in cases {
            assert_eq!(discount_percent(qty), expected, "quantity {qty}");
        }
    }

    #[test]
    fn test_negative_quantities_get_nothing() {
        assert_eq!(discount_percent(-1), 0);
        assert_eq!(discount_percent(i64::MIN), 0);
    }

    #[test]
    fn test_percent_is_monotone_and_from_known_set() {
        let allowed = [0, 5, 7, 11, 14];
        let mut previous = 0;
        for qty in 0..=500 {
            let percent = discount_percent(qty);
            assert!(allowed.contains(&percent), "unexpected {percent}% at {qty}");
            assert!(percent >= previous, "discount dropped at {qty}");
            previous = percent;
        }
    }

    #[test]
    fn test_tiers_are_contiguous_without_overlap() {
        for pair in DISCOUNT_TIERS.windows(2) {
            let [lower, upper] = pair else { unreachable!() };
            let lower_max = lower.max_qty.unwrap();
            assert_eq!(upper.min_qty, lower_max + 1);
            assert!(upper.percent >= lower.percent);
        }
        assert!(DISCOUNT_TIERS.last().unwrap().max_qty.is_none());
        assert_eq!(DISCOUNT_TIERS.first().unwrap().min_qty, 10);
    }

    #[test]
    fn test_discounted_line_total() {
        let thirty = Quantity::new(30).unwrap();
        assert_eq!(
            discounted_line_total(Decimal::from(100), thirty),
            Decimal::from(2790)
        );

        let five = Quantity::new(5).unwrap();
        assert_eq!(
            discounted_line_total(Decimal::from(320), five),
            Decimal::from(1600)
        );

        // 45 * 13 * 0.95 = 555.75
        let thirteen = Quantity::new(13).unwrap();
        assert_eq!(
            discounted_line_total(Decimal::from(45), thirteen),
            Decimal::new(555_75, 2)
        );
    }
}
