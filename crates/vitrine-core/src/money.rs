//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A client debt of R$ 100,00 paid in three parts of R$ 33,33:            │
//! │    float math leaves 0.010000000000005116 "owed" forever                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    10000 / 3 = 3333 remainder 1                                         │
//! │    We KNOW we have 1 centavo left, and put it on the first installment  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vitrine_core::money::Money;
//!
//! let price = Money::from_cents(8990); // R$ 89,90
//! let doubled = price * 2;            // R$ 179,80
//! let total = price + Money::from_cents(1010);
//! assert_eq!(total.cents(), 10000);
//! assert_eq!(doubled.to_string(), "R$ 179,80");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::InterestRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in centavos (the smallest BRL unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: deltas (debt reductions, bleeds) are naturally signed
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Product.sale_price ──► SaleItem.unit_price ──► Sale.subtotal
///                                                     │
///                                 + surcharge ◄───────┤ (installment credit)
///                                                     ▼
///   Client.current_debt ◄── total − paid ──── Sale.total ──► CashMovement
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$ 10,99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole reais and centavos.
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole reais portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavos portion (always 0-99).
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

    /// Subtracts `other`, never going below zero.
    ///
    /// Every balance in the ledgers (client debt, stock-like counters) is
    /// clamped this way on reduction.
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// let debt = Money::from_cents(5000);
    /// assert_eq!(debt.saturating_reduce(Money::from_cents(8000)), Money::zero());
    /// assert_eq!(debt.saturating_reduce(Money::from_cents(2000)).cents(), 3000);
    /// ```
    #[inline]
    pub fn saturating_reduce(&self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }

    /// Applies a rate in basis points and returns the resulting amount.
    ///
    /// Used for the installment-credit surcharge:
    /// `surcharge = subtotal × rate / 100` with the rate stored as bps.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, i.e. half rounds up.
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_core::money::Money;
    /// use vitrine_core::types::InterestRate;
    ///
    /// let subtotal = Money::from_cents(15990);       // R$ 159,90
    /// let rate = InterestRate::from_bps(299);        // 2,99%
    /// assert_eq!(subtotal.apply_rate(rate).cents(), 478); // R$ 4,78
    /// ```
    pub fn apply_rate(&self, rate: InterestRate) -> Money {
        // i128 to prevent overflow on large amounts
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Splits the amount into `parts` equal shares.
    ///
    /// Returns `(share, remainder)` where `share * parts + remainder == self`.
    /// The remainder is what the first installment carries on top of the
    /// share, so the parts always add back up to the original amount.
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// let (share, rest) = Money::from_cents(10000).split(3);
    /// assert_eq!(share.cents(), 3333);
    /// assert_eq!(rest.cents(), 1);
    /// ```
    pub fn split(&self, parts: u32) -> (Money, Money) {
        let parts = i64::from(parts.max(1));
        (Money(self.0 / parts), Money(self.0 % parts))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Brazilian display format: `R$ 1234,56`.
///
/// ## Note
/// This is for logs and message templates. The presentation layer does its
/// own locale-aware formatting with thousands separators.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R$ {},{:02}", sign, self.reais().abs(), self.cents_part())
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
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
