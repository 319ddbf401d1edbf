//! # Money Module
//!
//! Provides [`Money`] for prices and costs, and [`FractionalMoney`] for
//! commission amounts that must stay exact until they are displayed.
//!
//! ## Why Two Types?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE COMPOUNDING ROUNDING PROBLEM                                       │
//! │                                                                         │
//! │  Commission at 7.5% on 3 lines of $0.10:                                │
//! │    per line: $0.0075 → rounds to $0.01   (×3 = $0.03)   ❌ drift        │
//! │    exact:    $0.0225 → rounds once to $0.02             ✅              │
//! │                                                                         │
//! │  OUR SOLUTION                                                           │
//! │    Money          = integer cents            (prices, costs, totals)    │
//! │    FractionalMoney = cents × basis points    (1/10000 of a cent)        │
//! │                                                                         │
//! │  cents × bps is always an integer, so every commission intermediate is │
//! │  exact. Rounding happens once, in `round_to_cents`, at presentation.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cocolu_core::money::Money;
//! use cocolu_core::types::CommissionRate;
//!
//! let revenue = Money::from_cents(100_000); // $1000.00
//! let commission = revenue.apply_rate(CommissionRate::from_bps(1000)); // 10%
//! assert_eq!(commission.round_to_cents(), Money::from_cents(10_000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::CommissionRate;

/// Number of fractional units in one cent (one basis point of a cent).
pub const FRACTIONAL_UNITS_PER_CENT: i64 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative on loss-making lines
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// Variant.sale_price_cents ──► OrderLine.unit_price ──► line revenue
/// Variant.unit_cost_cents  ──► OrderLine.unit_cost  ──► line profit
///                                                         │
///                                   Commission ◄──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use cocolu_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ```rust
    /// use cocolu_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(1000).cents(), 100_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use cocolu_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a percentage rate exactly, without rounding.
    ///
    /// ## Implementation
    /// `cents × bps` is already expressed in ten-thousandths of a cent,
    /// which is exactly the unit of [`FractionalMoney`].
    pub fn apply_rate(&self, rate: CommissionRate) -> FractionalMoney {
        let scaled = self.0 as i128 * rate.bps() as i128;
        FractionalMoney::from_i128_saturating(scaled)
    }

    /// Lifts a cent amount into the fractional unit.
    #[inline]
    pub fn to_fractional(&self) -> FractionalMoney {
        FractionalMoney::from_i128_saturating(self.0 as i128 * FRACTIONAL_UNITS_PER_CENT as i128)
    }
}

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and the CLI. The dashboard formats for the user's locale.
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

// =============================================================================
// FractionalMoney Type
// =============================================================================

/// An exact monetary amount in ten-thousandths of a cent.
///
/// Produced by applying a basis-point rate to [`Money`]. Amounts are added
/// and compared in this unit; [`FractionalMoney::round_to_cents`] is the only
/// way back to [`Money`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FractionalMoney(i64);

impl FractionalMoney {
    /// Creates a value from raw fractional units (1/10000 cent).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        FractionalMoney(units)
    }

    /// Returns the raw fractional units (1/10000 cent).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        FractionalMoney(0)
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    fn from_i128_saturating(value: i128) -> Self {
        let clamped = value.clamp(i64::MIN as i128, i64::MAX as i128);
        FractionalMoney(clamped as i64)
    }

    /// Rounds to whole cents using Bankers Rounding (round half to even).
    ///
    /// ## Bankers Rounding
    /// ```text
    ///   2.5¢ → 2¢    3.5¢ → 4¢    -2.5¢ → -2¢    2.5001¢ → 3¢
    /// ```
    /// Alternating the direction of exact halves removes the systematic
    /// upward bias that half-up rounding introduces over many orders.
    ///
    /// ## Example
    /// ```rust
    /// use cocolu_core::money::{FractionalMoney, Money};
    ///
    /// assert_eq!(FractionalMoney::from_units(25_000).round_to_cents(), Money::from_cents(2));
    /// assert_eq!(FractionalMoney::from_units(35_000).round_to_cents(), Money::from_cents(4));
    /// ```
    pub fn round_to_cents(&self) -> Money {
        let quotient = self.0.div_euclid(FRACTIONAL_UNITS_PER_CENT);
        let remainder = self.0.rem_euclid(FRACTIONAL_UNITS_PER_CENT);
        let half = FRACTIONAL_UNITS_PER_CENT / 2;

        let cents = if remainder > half || (remainder == half && quotient % 2 != 0) {
            quotient + 1
        } else {
            quotient
        };

        Money::from_cents(cents)
    }
}

impl Default for FractionalMoney {
    fn default() -> Self {
        FractionalMoney::zero()
    }
}

impl Add for FractionalMoney {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        FractionalMoney(self.0.saturating_add(other.0))
    }
}

impl AddAssign for FractionalMoney {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sum for FractionalMoney {
    fn sum<I: Iterator<Item = FractionalMoney>>(iter: I) -> Self {
        iter.fold(FractionalMoney::zero(), Add::add)
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
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!(vec![a, b, b].into_iter().sum::<Money>().cents(), 2000);
    }

    #[test]
    fn test_apply_rate_is_exact() {
        // $0.10 at 7.5% = 0.75 cents, kept exactly
        let amount = Money::from_cents(10);
        let fractional = amount.apply_rate(CommissionRate::from_bps(750));
        assert_eq!(fractional.units(), 7_500);
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(FractionalMoney::from_units(25_000).round_to_cents().cents(), 2);
        assert_eq!(FractionalMoney::from_units(35_000).round_to_cents().cents(), 4);
        assert_eq!(FractionalMoney::from_units(25_001).round_to_cents().cents(), 3);
        assert_eq!(FractionalMoney::from_units(24_999).round_to_cents().cents(), 2);
        assert_eq!(FractionalMoney::from_units(-25_000).round_to_cents().cents(), -2);
        assert_eq!(FractionalMoney::from_units(-35_000).round_to_cents().cents(), -4);
        assert_eq!(FractionalMoney::zero().round_to_cents().cents(), 0);
    }

    /// Critical test: summing exact amounts then rounding once differs from
    /// rounding each line. This is why rounding is deferred.
    #[test]
    fn test_deferred_rounding_avoids_drift() {
        let rate = CommissionRate::from_bps(750);
        let line = Money::from_cents(10).apply_rate(rate);

        let rounded_per_line: i64 = (0..3).map(|_| line.round_to_cents().cents()).sum();
        let rounded_once = (line + line + line).round_to_cents().cents();

        assert_eq!(rounded_per_line, 3);
        assert_eq!(rounded_once, 2);
    }

    #[test]
    fn test_to_fractional() {
        assert_eq!(Money::from_cents(25).to_fractional().units(), 250_000);
        assert_eq!(Money::from_cents(25).to_fractional().round_to_cents().cents(), 25);
    }
}
