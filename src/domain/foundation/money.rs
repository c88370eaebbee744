//! Money value object, stored as integer cents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use super::ValidationError;

/// A non-negative amount in minor units (cents) of the store currency.
///
/// All prices, order totals, and payment amounts use this type. There is
/// no floating point anywhere in the money path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Largest representable amount (99,999,999.99).
    pub const MAX: Self = Self(9_999_999_999);

    /// Creates an amount from cents, returning error if negative or too large.
    pub fn from_cents(cents: i64) -> Result<Self, ValidationError> {
        if !(0..=Self::MAX.0).contains(&cents) {
            return Err(ValidationError::out_of_range(
                "amount",
                0,
                Self::MAX.0,
                cents,
            ));
        }
        Ok(Self(cents))
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Adds two amounts, saturating at `Money::MAX`.
    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0).min(Self::MAX.0))
    }

    /// Adds two amounts, failing if the result exceeds `Money::MAX`.
    pub fn checked_add(self, other: Money) -> Result<Money, ValidationError> {
        Self::from_cents(self.0.saturating_add(other.0))
    }

    /// Sums amounts, failing on the first partial total above `Money::MAX`.
    pub fn checked_sum<I>(amounts: I) -> Result<Money, ValidationError>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Saturating; use [`Money::checked_add`] where a capped total would be wrong.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        self.saturating_add(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_accepts_zero_and_positive() {
        assert_eq!(Money::from_cents(0).unwrap(), Money::ZERO);
        assert_eq!(Money::from_cents(1500).unwrap().cents(), 1500);
    }

    #[test]
    fn from_cents_rejects_negative() {
        assert!(Money::from_cents(-1).is_err());
    }

    #[test]
    fn from_cents_rejects_above_max() {
        assert!(Money::from_cents(Money::MAX.cents() + 1).is_err());
    }

    #[test]
    fn sum_adds_all_amounts() {
        let total: Money = [1000, 500]
            .iter()
            .map(|c| Money::from_cents(*c).unwrap())
            .sum();
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn display_formats_with_two_decimals() {
        assert_eq!(Money::from_cents(1505).unwrap().to_string(), "15.05");
        assert_eq!(Money::from_cents(7).unwrap().to_string(), "0.07");
    }

    #[test]
    fn addition_saturates_at_max() {
        assert_eq!(Money::MAX + Money::from_cents(1).unwrap(), Money::MAX);
    }

    #[test]
    fn checked_add_refuses_totals_above_max() {
        let one = Money::from_cents(1).unwrap();

        assert_eq!(Money::MAX.checked_add(Money::ZERO).unwrap(), Money::MAX);
        assert!(matches!(
            Money::MAX.checked_add(one),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn checked_sum_refuses_overflowing_totals() {
        let half = Money::from_cents(Money::MAX.cents() / 2 + 1).unwrap();

        assert!(Money::checked_sum([half, half]).is_err());
        assert_eq!(
            Money::checked_sum([half, Money::ZERO]).unwrap().cents(),
            half.cents()
        );
        assert_eq!(Money::checked_sum(Vec::new()).unwrap(), Money::ZERO);
    }
}
