//! Money value type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error produced when converting an external value into [`Money`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MoneyError {
    /// The value was NaN or infinite.
    #[error("amount is not a finite number")]
    NotFinite,

    /// The value carried more than two decimal places.
    #[error("amount {0} has more than two decimal places")]
    TooPrecise(f64),

    /// The value does not fit in the cent range.
    #[error("amount {0} is out of range")]
    OutOfRange(f64),
}

/// Money amount represented in cents to avoid floating point issues.
///
/// Serializes as the bare cent count, so wire amounts are integers.
/// Arithmetic saturates at the `i64` bounds; a saturated total is far
/// past any accepted charge limit, so it fails amount validation
/// instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a dollar value.
    ///
    /// The cents portion is calculated as dollars * 100.
    pub const fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Converts a decimal amount (e.g. a JSON number) into cents.
    ///
    /// Rejects non-finite values and values with more than two decimal
    /// places, the only precision the checkout accepts.
    pub fn try_from_f64(value: f64) -> Result<Self, MoneyError> {
        if !value.is_finite() {
            return Err(MoneyError::NotFinite);
        }
        let cents = value * 100.0;
        if cents.abs() > i64::MAX as f64 {
            return Err(MoneyError::OutOfRange(value));
        }
        let rounded = cents.round();
        if (cents - rounded).abs() > 1e-6 {
            return Err(MoneyError::TooPrecise(value));
        }
        Ok(Self {
            cents: rounded as i64,
        })
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns the amount as a decimal number of dollars.
    pub fn as_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity, saturating at the `i64` bounds.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents.saturating_mul(i64::from(quantity)),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_sub(rhs.cents),
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_add(rhs.cents);
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_sub(rhs.cents);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.dollars(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_from_dollars() {
        let money = Money::from_dollars(50);
        assert_eq!(money.cents(), 5000);
        assert_eq!(money.dollars(), 50);
        assert_eq!(money.cents_part(), 0);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(100).to_string(), "$1.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);
    }

    #[test]
    fn test_money_arithmetic_saturates() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.multiply(2).cents(), i64::MAX);
        assert_eq!((max + Money::from_cents(1)).cents(), i64::MAX);

        let mut total = max;
        total += Money::from_cents(100);
        assert_eq!(total.cents(), i64::MAX);

        let min = Money::from_cents(i64::MIN);
        assert_eq!((min - Money::from_cents(1)).cents(), i64::MIN);
    }

    #[test]
    fn test_money_comparison() {
        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(0).is_zero());
        assert!(Money::from_cents(-100).is_negative());
    }

    #[test]
    fn test_money_add_assign() {
        let mut money = Money::from_cents(100);
        money += Money::from_cents(50);
        assert_eq!(money.cents(), 150);
    }

    #[test]
    fn test_try_from_f64_accepts_two_decimals() {
        assert_eq!(Money::try_from_f64(12.34).unwrap().cents(), 1234);
        assert_eq!(Money::try_from_f64(0.01).unwrap().cents(), 1);
        assert_eq!(Money::try_from_f64(1_000_000.0).unwrap().cents(), 100_000_000);
    }

    #[test]
    fn test_try_from_f64_rejects_extra_precision() {
        assert!(matches!(
            Money::try_from_f64(12.345),
            Err(MoneyError::TooPrecise(_))
        ));
        assert!(matches!(
            Money::try_from_f64(0.001),
            Err(MoneyError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_try_from_f64_rejects_non_finite() {
        assert_eq!(Money::try_from_f64(f64::NAN), Err(MoneyError::NotFinite));
        assert_eq!(
            Money::try_from_f64(f64::INFINITY),
            Err(MoneyError::NotFinite)
        );
    }

    #[test]
    fn test_as_f64_roundtrip() {
        let money = Money::from_cents(123_456);
        assert!((money.as_f64() - 1234.56).abs() < f64::EPSILON);
    }

    #[test]
    fn test_money_serializes_as_bare_cents() {
        let money = Money::from_cents(999);
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "999");
        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(money, deserialized);
    }
}
