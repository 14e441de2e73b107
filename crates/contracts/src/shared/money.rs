//! Fixed-point money helpers.
//!
//! Amounts travel as [`Decimal`] with scale 2 and are persisted as integer
//! minor units (cents).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Number of fractional digits carried by every amount.
pub const MONEY_SCALE: u32 = 2;

/// Reasons an amount cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    Negative,
    TooPrecise,
    OutOfRange,
}

impl std::fmt::Display for MoneyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negative => write!(f, "amount must not be negative"),
            Self::TooPrecise => write!(f, "amount has more than {} decimal places", MONEY_SCALE),
            Self::OutOfRange => write!(f, "amount does not fit into minor units"),
        }
    }
}

impl std::error::Error for MoneyError {}

/// Build an amount from minor units: `1050` becomes `10.50`.
pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Convert an amount to minor units without rounding.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative);
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(MoneyError::TooPrecise);
    }
    (amount * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or(MoneyError::OutOfRange)
}

/// Price of one line: `unit_price * quantity`, exact.
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_units_keeps_scale() {
        assert_eq!(from_minor_units(1000).to_string(), "10.00");
        assert_eq!(from_minor_units(5).to_string(), "0.05");
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(Decimal::new(1999, 2)), Ok(1999));
        assert_eq!(to_minor_units(Decimal::new(10, 0)), Ok(1000));
        assert_eq!(to_minor_units(Decimal::new(12500, 3)), Ok(1250));
        assert_eq!(to_minor_units(Decimal::ZERO), Ok(0));
    }

    #[test]
    fn test_to_minor_units_rejects_bad_amounts() {
        assert_eq!(to_minor_units(Decimal::new(-1, 2)), Err(MoneyError::Negative));
        assert_eq!(to_minor_units(Decimal::new(1001, 3)), Err(MoneyError::TooPrecise));
    }

    #[test]
    fn test_line_totals_sum_without_drift() {
        // 0.10 * 3 accumulated ten times must stay exactly 3.00
        let total: Decimal = (0..10).map(|_| line_total(from_minor_units(10), 3)).sum();
        assert_eq!(total, from_minor_units(300));
    }
}
