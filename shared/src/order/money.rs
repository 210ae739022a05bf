//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic runs on `Decimal`; values are converted to `f64` (rounded
//! half-up to 2 places) only for storage and serialization.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation (NaN/∞ become zero)
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_default()
}

#[inline]
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `unit_price × quantity`, rounded
pub fn line_total(unit_price: Decimal, quantity: i64) -> Decimal {
    round(unit_price * Decimal::from(quantity))
}

/// Flat delivery fee waived above a subtotal threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub fee: Decimal,
    pub free_threshold: Decimal,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            fee: Decimal::from(10),
            free_threshold: Decimal::from(100),
        }
    }
}

impl DeliveryPolicy {
    pub fn new(fee: f64, free_threshold: f64) -> Self {
        Self {
            fee: to_decimal(fee),
            free_threshold: to_decimal(free_threshold),
        }
    }

    pub fn fee_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_threshold {
            Decimal::ZERO
        } else {
            self.fee
        }
    }
}

/// Order-level money figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub discount: f64,
    pub total: f64,
}

impl Totals {
    /// Build totals from line totals.
    ///
    /// `total = subtotal + delivery_fee - discount`, never below zero.
    pub fn compute(
        line_totals: impl IntoIterator<Item = Decimal>,
        policy: &DeliveryPolicy,
        discount: Decimal,
    ) -> Self {
        let subtotal = round(line_totals.into_iter().sum());
        let delivery_fee = policy.fee_for(subtotal);
        let discount = round(discount.max(Decimal::ZERO));
        let total = (subtotal + delivery_fee - discount).max(Decimal::ZERO);
        Self {
            subtotal: to_f64(subtotal),
            delivery_fee: to_f64(delivery_fee),
            discount: to_f64(discount),
            total: to_f64(total),
        }
    }
}

/// Equality within one cent
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < Decimal::new(1, DECIMAL_PLACES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_non_finite_becomes_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(to_f64(Decimal::new(5, 3)), 0.01);
        assert_eq!(to_f64(Decimal::new(4, 3)), 0.0);
        assert_eq!(to_f64(Decimal::new(-5, 3)), -0.01);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(to_f64(line_total(to_decimal(3.33), 3)), 9.99);
        assert_eq!(to_f64(line_total(to_decimal(0.1), 10)), 1.0);
    }

    #[test]
    fn test_delivery_fee_threshold() {
        let policy = DeliveryPolicy::default();
        assert_eq!(policy.fee_for(to_decimal(99.99)), Decimal::from(10));
        assert_eq!(policy.fee_for(to_decimal(100.0)), Decimal::ZERO);
        assert_eq!(policy.fee_for(to_decimal(250.0)), Decimal::ZERO);
    }

    #[test]
    fn test_totals() {
        let policy = DeliveryPolicy::default();
        let totals = Totals::compute(
            [line_total(to_decimal(12.5), 2), line_total(to_decimal(3.25), 4)],
            &policy,
            Decimal::ZERO,
        );
        assert_eq!(totals.subtotal, 38.0);
        assert_eq!(totals.delivery_fee, 10.0);
        assert_eq!(totals.total, 48.0);

        let totals = Totals::compute([to_decimal(120.0)], &policy, to_decimal(5.0));
        assert_eq!(totals.delivery_fee, 0.0);
        assert_eq!(totals.discount, 5.0);
        assert_eq!(totals.total, 115.0);
    }

    #[test]
    fn test_totals_never_negative() {
        let policy = DeliveryPolicy::new(0.0, 0.0);
        let totals = Totals::compute([to_decimal(5.0)], &policy, to_decimal(50.0));
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn test_money_eq() {
        assert!(money_eq(10.0, 10.004));
        assert!(!money_eq(10.0, 10.02));
    }
}
