//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With f32 prices a receipt total is only "close to" 74.50, so a test   │
//! │  asserting the exact total depends on the order of the additions.      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    500 + 2000 + 0 = 2500 cents, always, in any order                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use checkout_core::money::Money;
//!
//! let price = Money::from_cents(750); // 7.50
//! let doubled = price * 2i64;         // 15.00
//! let discounted = doubled - Money::from_cents(100);
//!
//! assert_eq!(discounted.cents(), 1400);
//! assert_eq!(discounted.to_string(), "14.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts are subtracted freely and items with a
///   zero or negative price are allowed on a ticket
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde**: serializes as the bare number of cents
///
/// ## Where Money Flows
/// ```text
/// Item.price ──► Rule(occurrence, quantity, price) ──► Line.discount
///      │                                                    │
///      └──────────────► price - discount ◄──────────────────┘
///                              │
///                              ▼
///                  subtotal ──► ticket rule ──► total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use checkout_core::money::Money;
    ///
    /// let price = Money::from_cents(2000); // 20.00
    /// assert_eq!(price.cents(), 2000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated towards zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Formats the amount as a plain decimal with two places (`-1.50`).
    ///
    /// Receipts print amounts in columns without a currency symbol.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display honours width and alignment flags so receipt columns line up:
/// `format!("{:>6}", money)`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_decimal_string())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Multiplication by a line count. Saturates instead of wrapping.
impl Mul<usize> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: usize) -> Self {
        let qty = i64::try_from(qty).unwrap_or(i64::MAX);
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.units(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(7450).to_string(), "74.50");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-150).to_string(), "-1.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_display_respects_width() {
        assert_eq!(format!("{:>6}", Money::from_cents(500)), "  5.00");
        assert_eq!(format!("{:>6}", Money::from_cents(2000)), " 20.00");
        assert_eq!(format!("{:<6}|", Money::from_cents(100)), "1.00  |");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((-a).cents(), -1000);

        let by_i64: Money = a * 3i64;
        let by_count: Money = a * 4usize;
        assert_eq!(by_i64.cents(), 3000);
        assert_eq!(by_count.cents(), 4000);

        let mut running = Money::zero();
        running += a;
        running -= b;
        assert_eq!(running.cents(), 500);
    }

    #[test]
    fn test_sum() {
        let amounts = [
            Money::from_cents(500),
            Money::from_cents(2000),
            Money::from_cents(750),
        ];
        let by_ref: Money = amounts.iter().sum();
        let by_value: Money = amounts.into_iter().sum();
        assert_eq!(by_ref.cents(), 3250);
        assert_eq!(by_value, by_ref);
    }

    #[test]
    fn test_zero() {
        assert!(Money::zero().is_zero());
        assert!(!Money::from_cents(-100).is_zero());
        assert_eq!(Money::default(), Money::zero());
    }

    #[test]
    fn test_count_multiplication_saturates() {
        let cent = Money::from_cents(1);
        assert_eq!(cent * usize::MAX, Money::from_cents(i64::MAX));
        assert_eq!(-cent * usize::MAX, Money::from_cents(-i64::MAX));
        assert_eq!(Money::from_cents(i64::MAX / 2) * 3usize, Money::from_cents(i64::MAX));
        assert_eq!(Money::zero() * usize::MAX, Money::zero());
    }

    #[test]
    fn test_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(2500)).unwrap();
        assert_eq!(json, "2500");
        let back: Money = serde_json::from_str("750").unwrap();
        assert_eq!(back, Money::from_cents(750));
    }
}
