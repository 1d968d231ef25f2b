//! Money type for representing monetary values.
//!
//! Amounts are exact decimals in major currency units (e.g. naira, not kobo).
//! Tax and percentage discounts are kept at full precision; rounding to two
//! places only happens when an amount is formatted for display.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};

/// Decimal places shown in formatted amounts.
const DISPLAY_PLACES: u32 = 2;

/// A monetary amount.
///
/// The currency is a display concern owned by the cart configuration, so
/// `Money` carries only the amount. Arithmetic saturates at the bounds of
/// [`Decimal`] instead of panicking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create a Money value from an exact decimal amount.
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Money value from whole currency units.
    ///
    /// ```
    /// use storefront_cart::money::Money;
    /// let fee = Money::from_major(1500);
    /// assert_eq!(fee.display("₦"), "₦1500.00");
    /// ```
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Create a zero amount.
    pub fn zero() -> Self {
        Self::ZERO
    }

    /// The exact amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiply by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Multiply by a fractional rate (e.g. a tax rate of `0.1`).
    pub fn scale(&self, rate: Decimal) -> Money {
        Money(self.0.saturating_mul(rate))
    }

    /// Calculate a percentage (0-100) of this amount.
    pub fn percentage(&self, percent: Decimal) -> Money {
        self.scale(percent / Decimal::ONE_HUNDRED)
    }

    /// The amount rounded half away from zero to display precision.
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(DISPLAY_PLACES, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Format without a symbol (e.g. "3220.00").
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.rounded())
    }

    /// Format with a currency symbol prefix (e.g. "₦3220.00").
    pub fn display(&self, symbol: &str) -> String {
        format!("{}{}", symbol, self.display_amount())
    }

    /// Sum an iterator of Money values.
    pub fn sum<'a>(iter: impl Iterator<Item = &'a Money>) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, quantity: u32) -> Money {
        self.multiply(quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_amount())
    }
}
