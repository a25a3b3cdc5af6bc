//! # Money Module
//!
//! Provides the `Money` and `Percent` types for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Weekly share of a monthly cost:                                        │
//! │    $1000.00 / 4.33 = $230.946882...  → which cent do we keep?          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + one explicit rounding step               │
//! │    100000 cents × 100 / 433 = 23094.69 → 23095 cents (half up)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bodega_core::money::{Money, Percent};
//!
//! let revenue = Money::from_cents(250_000); // $2500.00
//! let variable = revenue.percentage(Percent::from_bps(3000));
//! assert_eq!(variable.cents(), 75_000);     // $750.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Net margins and balances go negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support, serialized as a plain cent count
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.cost / sale_price ──► gross_margin                            │
/// │                                                                         │
/// │  Sale.amount ──► weekly revenue ──┬──► variable cost (× Percent)        │
/// │                                   │                                     │
/// │  Cost.amount (fixed) ──► ÷ 4.33 ──┴──► net margin                       │
/// │                                                                         │
/// │  Purchase.total_cost ──► balance = sales − purchases                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
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

    /// Multiplies by `numerator / denominator`, rounding half away from zero.
    ///
    /// This is the single rounding primitive of the crate: percentages,
    /// weekly shares of monthly costs and unit costs all go through it.
    /// Intermediate math runs in i128 so large amounts cannot overflow.
    ///
    /// A non-positive `denominator` yields zero.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    ///
    /// // $1000.00 spread over 4.33 weeks
    /// let weekly = Money::from_cents(100_000).mul_div_round(100, 433);
    /// assert_eq!(weekly.cents(), 23_095);
    /// ```
    pub fn mul_div_round(&self, numerator: i64, denominator: i64) -> Money {
        if denominator <= 0 {
            return Money::zero();
        }
        let product = self.0 as i128 * numerator as i128;
        let denominator = denominator as i128;
        let half = denominator / 2;
        let rounded = if product >= 0 {
            (product + half) / denominator
        } else {
            (product - half) / denominator
        };
        Money::from_cents(rounded as i64)
    }

    /// Applies a percentage and returns the resulting share.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, the +5000 providing
    /// round-half-up on the cent.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::{Money, Percent};
    ///
    /// let revenue = Money::from_cents(1000);    // $10.00
    /// let share = revenue.percentage(Percent::from_bps(825)); // 8.25%
    /// // $0.825 → $0.83
    /// assert_eq!(share.cents(), 83);
    /// ```
    #[inline]
    pub fn percentage(&self, percent: Percent) -> Money {
        self.mul_div_round(percent.bps() as i64, 10_000)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. The UI formats amounts itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 3000 bps = 30% (the default variable-cost estimate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from a human-entered value (`27.5` → 2750 bps).
    ///
    /// Negative or non-finite input clamps to zero.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Percent(0);
        }
        Percent((pct * 100.0).round() as u32)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
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
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(format!("{}", Percent::from_bps(3000)), "30.00%");
        assert_eq!(format!("{}", Percent::from_bps(825)), "8.25%");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_mul_div_round_half_away_from_zero() {
        // 100000 * 100 / 433 = 23094.688... → 23095
        assert_eq!(Money::from_cents(100_000).mul_div_round(100, 433).cents(), 23_095);
        // 5 / 2 = 2.5 → 3, -5 / 2 = -2.5 → -3
        assert_eq!(Money::from_cents(5).mul_div_round(1, 2).cents(), 3);
        assert_eq!(Money::from_cents(-5).mul_div_round(1, 2).cents(), -3);
        // Exact division is untouched
        assert_eq!(Money::from_cents(433_000).mul_div_round(100, 433).cents(), 100_000);
    }

    #[test]
    fn test_mul_div_round_non_positive_denominator() {
        assert!(Money::from_cents(1000).mul_div_round(1, 0).is_zero());
        assert!(Money::from_cents(1000).mul_div_round(1, -3).is_zero());
    }

    #[test]
    fn test_percentage() {
        let revenue = Money::from_cents(1000);
        assert_eq!(revenue.percentage(Percent::from_bps(1000)).cents(), 100);
        assert_eq!(revenue.percentage(Percent::from_bps(825)).cents(), 83);
        assert!(revenue.percentage(Percent::zero()).is_zero());
    }

    #[test]
    fn test_percent_from_percentage() {
        assert_eq!(Percent::from_percentage(30.0).bps(), 3000);
        assert_eq!(Percent::from_percentage(27.5).bps(), 2750);
        assert_eq!(Percent::from_percentage(-4.0).bps(), 0);
        assert_eq!(Percent::from_percentage(f64::NAN).bps(), 0);
        assert!((Percent::from_bps(3000).percentage() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_serializes_as_plain_cents() {
        let json = serde_json::to_string(&Money::from_cents(1099)).unwrap();
        assert_eq!(json, "1099");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Money::from_cents(1099));
    }
}
