//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Totals stored as doubles drift when re-derived from line items,        │
//! │  and drift in a ledger is a reconciliation bug.                         │
//! │                                                                         │
//! │  OUR SOLUTION: integers in the smallest currency unit                   │
//! │    Rp 49.500 is stored as 49500 - exact, always                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All arithmetic is exact integer math. The only rounding point in the
//! system is [`Money::calculate_tax`], which rounds half up at the smallest
//! currency unit; intermediate totals are never rounded mid-calculation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (whole rupiah for IDR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **`sqlx(transparent)`**: Persists as a plain INTEGER column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from the smallest currency unit.
    ///
    /// ```rust
    /// use essy_core::money::Money;
    ///
    /// let price = Money::from_minor(15_000); // Rp 15.000
    /// assert_eq!(price.minor(), 15_000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in the smallest currency unit.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Zero money value.
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

    /// Calculates tax, rounding half up at the smallest currency unit.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides round-half-up (5000/10000 = 0.5).
    /// i128 intermediates prevent overflow on large amounts.
    ///
    /// ```rust
    /// use essy_core::money::Money;
    /// use essy_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_minor(45_000);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(1000)); // 10%
    /// assert_eq!(tax.minor(), 4_500);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(tax as i64)
    }

    /// Multiplies money by a quantity (line totals).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Saturating subtraction that never goes below zero.
    ///
    /// Used for change display where a shortfall should read as zero,
    /// not as negative change.
    #[inline]
    pub const fn saturating_sub_zero(&self, other: Money) -> Money {
        let diff = self.0 - other.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the value with the `Rp` prefix and dot thousands
/// separators, the way Indonesian receipts print amounts.
///
/// For debugging and the demo binary only; real UI formatting belongs
/// to the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp {}", sign, group_thousands(self.0.unsigned_abs()))
    }
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        let rem = value % 1000;
        value /= 1000;
        if value == 0 {
            groups.push(format!("{}", rem));
            break;
        }
        groups.push(format!("{:03}", rem));
    }
    groups.reverse();
    groups.join(".")
}

/// Default money is zero.
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

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(15_000);
        assert_eq!(money.minor(), 15_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(49_500)), "Rp 49.500");
        assert_eq!(format!("{}", Money::from_minor(500)), "Rp 500");
        assert_eq!(format!("{}", Money::from_minor(1_000_000)), "Rp 1.000.000");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-Rp 550");
        assert_eq!(format!("{}", Money::from_minor(0)), "Rp 0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(15_000);
        let b = Money::from_minor(3_000);

        assert_eq!((a + b).minor(), 18_000);
        assert_eq!((a - b).minor(), 12_000);
        assert_eq!((a * 3).minor(), 45_000);
    }

    #[test]
    fn test_tax_calculation_basic() {
        // Rp 45.000 at 10% = Rp 4.500
        let amount = Money::from_minor(45_000);
        let tax = amount.calculate_tax(TaxRate::from_bps(1000));
        assert_eq!(tax.minor(), 4_500);
    }

    #[test]
    fn test_tax_calculation_rounds_half_up() {
        // Rp 15 at 10% = 1.5 -> rounds up to 2
        let amount = Money::from_minor(15);
        let tax = amount.calculate_tax(TaxRate::from_bps(1000));
        assert_eq!(tax.minor(), 2);

        // Rp 14 at 10% = 1.4 -> rounds down to 1
        let amount = Money::from_minor(14);
        let tax = amount.calculate_tax(TaxRate::from_bps(1000));
        assert_eq!(tax.minor(), 1);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_minor(15_000);
        assert_eq!(unit_price.multiply_quantity(3).minor(), 45_000);
    }

    #[test]
    fn test_saturating_sub_zero() {
        let total = Money::from_minor(49_500);
        let tendered = Money::from_minor(50_000);

        assert_eq!(tendered.saturating_sub_zero(total).minor(), 500);
        assert_eq!(total.saturating_sub_zero(tendered).minor(), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_minor(100).is_positive());
        assert!(Money::from_minor(-100).is_negative());
    }
}
