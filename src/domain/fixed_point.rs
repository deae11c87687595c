//! Decimal-scaled integer arithmetic.
//!
//! A [`FixedPoint`] is an arbitrary-precision signed integer paired with an
//! explicit decimal scale: the value `1.5` at 18 decimals is stored as
//! `raw = 1_500_000_000_000_000_000`.
//!
//! # Semantics
//!
//! - Binary operations between two fixed-point values require equal scales
//!   and fail with [`PricingError::ScaleMismatch`] otherwise. Nothing is
//!   silently coerced.
//! - Every division truncates toward zero, matching on-chain integer
//!   division.
//! - `multiply` truncates once (`a · b / 10^s`), `divide` truncates once
//!   (`a · 10^s / b`).
//! - Rescaling is explicit: [`upscale`](FixedPoint::upscale) is exact,
//!   [`downscale`](FixedPoint::downscale) truncates toward zero.
//!
//! Values are immutable; every operation returns a new value.
//!
//! # Examples
//!
//! ```
//! use stable_lp_pricing::domain::{Decimals, FixedPoint};
//!
//! let a = FixedPoint::from_integer(3, Decimals::CANONICAL);
//! let b = FixedPoint::from_integer(2, Decimals::CANONICAL);
//! let q = a.divide(&b).expect("non-zero divisor");
//! assert_eq!(q.to_string(), "1.500000000000000000");
//! ```

use core::cmp::Ordering;
use core::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use super::Decimals;
use crate::error::{PricingError, Result};

/// Arbitrary-precision signed integer with an explicit decimal scale.
///
/// Equality (`==`) is structural: two values are equal only when both the
/// raw integer and the scale match. Use [`try_cmp`](Self::try_cmp) for an
/// ordering that rejects mismatched scales.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedPoint {
    raw: BigInt,
    scale: Decimals,
}

impl FixedPoint {
    /// Wraps a raw scaled integer.
    #[must_use]
    pub fn from_raw(raw: impl Into<BigInt>, scale: Decimals) -> Self {
        Self {
            raw: raw.into(),
            scale,
        }
    }

    /// Creates the fixed-point representation of a whole number
    /// (`value · 10^scale`).
    #[must_use]
    pub fn from_integer(value: impl Into<BigInt>, scale: Decimals) -> Self {
        Self {
            raw: value.into() * scale.factor(),
            scale,
        }
    }

    /// Zero at the given scale.
    #[must_use]
    pub fn zero(scale: Decimals) -> Self {
        Self::from_raw(BigInt::zero(), scale)
    }

    /// One at the given scale.
    #[must_use]
    pub fn one(scale: Decimals) -> Self {
        Self::from_integer(1, scale)
    }

    /// Returns the raw scaled integer.
    #[must_use]
    pub const fn raw(&self) -> &BigInt {
        &self.raw
    }

    /// Returns the decimal scale.
    #[must_use]
    pub const fn scale(&self) -> Decimals {
        self.scale
    }

    /// Returns `true` if the raw value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Returns `true` if the value is strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.raw.is_negative()
    }

    /// Returns `true` if the value is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.raw.is_positive()
    }

    /// Fails with [`PricingError::ScaleMismatch`] unless both operands share
    /// a scale.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::ScaleMismatch`] when the scales differ.
    pub fn ensure_same_scale(&self, other: &Self) -> Result<()> {
        if self.scale != other.scale {
            return Err(PricingError::ScaleMismatch {
                left: self.scale.get(),
                right: other.scale.get(),
            });
        }
        Ok(())
    }

    /// Exact addition.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::ScaleMismatch`] when the scales differ.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.ensure_same_scale(other)?;
        Ok(Self::from_raw(&self.raw + &other.raw, self.scale))
    }

    /// Exact subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::ScaleMismatch`] when the scales differ.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.ensure_same_scale(other)?;
        Ok(Self::from_raw(&self.raw - &other.raw, self.scale))
    }

    /// Additive inverse.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self::from_raw(-&self.raw, self.scale)
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self::from_raw(self.raw.abs(), self.scale)
    }

    /// Fixed-point product `a · b / 10^scale`, truncated toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::ScaleMismatch`] when the scales differ.
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        self.ensure_same_scale(other)?;
        Ok(Self::from_raw(
            &self.raw * &other.raw / self.scale.factor(),
            self.scale,
        ))
    }

    /// Multiplies by a dimensionless integer. Exact.
    #[must_use]
    pub fn multiply_int(&self, factor: impl Into<BigInt>) -> Self {
        Self::from_raw(&self.raw * factor.into(), self.scale)
    }

    /// Fixed-point quotient `a · 10^scale / b`, truncated toward zero.
    ///
    /// # Errors
    ///
    /// - [`PricingError::ScaleMismatch`] when the scales differ.
    /// - [`PricingError::DivisionByZero`] when `other` is zero.
    pub fn divide(&self, other: &Self) -> Result<Self> {
        self.ensure_same_scale(other)?;
        if other.raw.is_zero() {
            return Err(PricingError::DivisionByZero);
        }
        Ok(Self::from_raw(
            &self.raw * self.scale.factor() / &other.raw,
            self.scale,
        ))
    }

    /// Divides by a dimensionless integer, truncating toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::DivisionByZero`] when `divisor` is zero.
    pub fn divide_int(&self, divisor: impl Into<BigInt>) -> Result<Self> {
        let divisor = divisor.into();
        if divisor.is_zero() {
            return Err(PricingError::DivisionByZero);
        }
        Ok(Self::from_raw(&self.raw / divisor, self.scale))
    }

    /// Scale-preserving `self · numerator / denominator` with a single
    /// truncation at the end, the shape of on-chain `a * b // c`.
    ///
    /// # Errors
    ///
    /// - [`PricingError::ScaleMismatch`] when any scales differ.
    /// - [`PricingError::DivisionByZero`] when `denominator` is zero.
    pub fn mul_div(&self, numerator: &Self, denominator: &Self) -> Result<Self> {
        self.ensure_same_scale(numerator)?;
        self.ensure_same_scale(denominator)?;
        if denominator.raw.is_zero() {
            return Err(PricingError::DivisionByZero);
        }
        Ok(Self::from_raw(
            &self.raw * &numerator.raw / &denominator.raw,
            self.scale,
        ))
    }

    /// Integer power by repeated fixed-point multiplication starting from
    /// one. Every intermediate product is truncated, so `x.pow(3)` equals
    /// `one · x · x · x` evaluated left to right.
    #[must_use]
    pub fn pow(&self, exponent: u32) -> Self {
        let factor = self.scale.factor();
        let mut result = factor.clone();
        for _ in 0..exponent {
            result = result * &self.raw / &factor;
        }
        Self::from_raw(result, self.scale)
    }

    /// Square root at the same scale, computed as the integer square root of
    /// `raw · 10^scale` (truncated).
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeSqrtOperand`] for negative values.
    pub fn sqrt(&self) -> Result<Self> {
        if self.raw.is_negative() {
            return Err(PricingError::NegativeSqrtOperand);
        }
        let widened = &self.raw * self.scale.factor();
        Ok(Self::from_raw(widened.sqrt(), self.scale))
    }

    /// Ordering between values of equal scale.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::ScaleMismatch`] when the scales differ.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        self.ensure_same_scale(other)?;
        Ok(self.raw.cmp(&other.raw))
    }

    /// Re-expresses the value with more decimal places. Exact.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidPrecision`] if `target` has fewer
    /// decimal places than the current scale.
    pub fn upscale(&self, target: Decimals) -> Result<Self> {
        let Some(diff) = target.get().checked_sub(self.scale.get()) else {
            return Err(PricingError::InvalidPrecision(
                "upscale target must not have fewer decimals",
            ));
        };
        let factor = BigInt::from(10u32).pow(u32::from(diff));
        Ok(Self::from_raw(&self.raw * factor, target))
    }

    /// Re-expresses the value with fewer decimal places, truncating toward
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidPrecision`] if `target` has more
    /// decimal places than the current scale.
    pub fn downscale(&self, target: Decimals) -> Result<Self> {
        let Some(diff) = self.scale.get().checked_sub(target.get()) else {
            return Err(PricingError::InvalidPrecision(
                "downscale target must not have more decimals",
            ));
        };
        let factor = BigInt::from(10u32).pow(u32::from(diff));
        Ok(Self::from_raw(&self.raw / factor, target))
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.raw.is_negative() { "-" } else { "" };
        let magnitude = self.raw.abs();
        let digits = usize::from(self.scale.get());
        if digits == 0 {
            return write!(f, "{sign}{magnitude}");
        }
        let factor = self.scale.factor();
        let whole = &magnitude / &factor;
        let frac = (&magnitude % &factor).to_string();
        write!(f, "{sign}{whole}.{frac:0>digits$}")
    }
}
