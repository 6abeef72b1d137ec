//! # Money Module
//!
//! Provides the `Money` type for every currency column in Branchbook:
//! order totals, received amounts, account balances, customer dues and the
//! cash/bank/expense columns of the daily TopSheet.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE REVERSAL PROBLEM                                                   │
//! │                                                                         │
//! │  An order update first reverts the old effects and then applies the    │
//! │  new ones. With floats:                                                 │
//! │    due = 0.1 + 0.2 - 0.2 - 0.1 = 2.7e-17  ❌ drift after every update  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    due = 10 + 20 - 20 - 10 = 0            ✅ exact, forever            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use branchbook_core::money::Money;
//!
//! let total = Money::from_cents(10_000); // 100.00
//! let received = Money::from_cents(4_000); // 40.00
//!
//! let due = total - received;
//! assert_eq!(due.cents(), 6_000);
//! assert_eq!(due.to_string(), "60.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: deltas are signed; a reversal is a negative Money
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent in SQL**: stored as a plain INTEGER column
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Order.total_amount ──┬──► Customer.due_amount (total - received)      │
/// │                       │                                                 │
/// │  Order.received ──────┼──► Account.current_balance                     │
/// │                       │                                                 │
/// │                       └──► TopSheet.cash / TopSheet.bank               │
/// │                                                                         │
/// │  Purchase.total ─────────► TopSheet.expense, Account.current_balance   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use branchbook_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole major units.
    ///
    /// ## Example
    /// ```rust
    /// use branchbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(100).cents(), 10_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns `self` when positive, zero otherwise.
    ///
    /// Used for "only if something is still owed" checks such as the
    /// customer due produced by an order (`total - received`).
    #[inline]
    pub const fn positive_part(&self) -> Self {
        if self.0 > 0 {
            Money(self.0)
        } else {
            Money(0)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as `major.minor` without a currency symbol; branches may trade
/// in different currencies and the frontend owns localisation.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
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
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(400);

        assert_eq!((a + b).cents(), 1400);
        assert_eq!((a - b).cents(), 600);
        assert_eq!((-a).cents(), -1000);
        assert_eq!((b * 3).cents(), 1200);
    }

    #[test]
    fn test_apply_then_revert_is_exact() {
        let mut balance = Money::from_cents(12_345);
        let deltas = [Money::from_cents(10), Money::from_cents(20), Money::from_cents(33)];

        for d in deltas {
            balance += d;
        }
        for d in deltas.iter().rev() {
            balance -= *d;
        }

        assert_eq!(balance.cents(), 12_345);
    }

    #[test]
    fn test_sum() {
        let items = vec![Money::from_cents(100), Money::from_cents(250)];
        let total: Money = items.iter().sum();
        assert_eq!(total.cents(), 350);
    }

    #[test]
    fn test_positive_part() {
        assert_eq!(Money::from_cents(60).positive_part().cents(), 60);
        assert_eq!(Money::from_cents(-60).positive_part().cents(), 0);
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_cents(4000)).unwrap();
        assert_eq!(json, "4000");

        let back: Money = serde_json::from_str("6000").unwrap();
        assert_eq!(back.cents(), 6000);
    }
}
