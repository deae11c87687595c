//! External reference prices.
//!
//! Prices come from an oracle collaborator and are trusted inputs; nothing
//! here is derived from pool balances.

use super::{Decimals, FixedPoint};
use crate::error::{PricingError, Result};

/// A strictly positive USD price at the canonical 18-decimal scale.
///
/// # Examples
///
/// ```
/// use stable_lp_pricing::domain::{Decimals, FixedPoint, Price};
///
/// let one_dollar = FixedPoint::from_integer(1, Decimals::CANONICAL);
/// assert!(Price::new(one_dollar).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Price(FixedPoint);

impl Price {
    /// Wraps a USD price.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidPrice`] if the value is zero or negative.
    /// - [`PricingError::ScaleMismatch`] if the value is not 18-decimal.
    pub fn new(value: FixedPoint) -> Result<Self> {
        ensure_canonical(&value)?;
        if !value.is_positive() {
            return Err(PricingError::InvalidPrice("price must be positive"));
        }
        Ok(Self(value))
    }

    /// Returns the wrapped value.
    #[must_use]
    pub const fn value(&self) -> &FixedPoint {
        &self.0
    }
}

/// Price of asset A expressed in units of asset B (`s`): how many B one A
/// is worth.
///
/// The fair-value solver searches for the balance at which the pool's
/// marginal exchange rate equals this ratio.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceRatio(FixedPoint);

impl PriceRatio {
    /// Wraps a ratio directly.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidPrice`] if the ratio is zero or negative.
    /// - [`PricingError::ScaleMismatch`] if the value is not 18-decimal.
    pub fn new(value: FixedPoint) -> Result<Self> {
        ensure_canonical(&value)?;
        if !value.is_positive() {
            return Err(PricingError::InvalidPrice("price ratio must be positive"));
        }
        Ok(Self(value))
    }

    /// Derives `s = price_a / price_b` from two USD prices.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidPrice`] if the quotient truncates to
    /// zero.
    pub fn from_prices(price_a: &Price, price_b: &Price) -> Result<Self> {
        Self::new(price_a.value().divide(price_b.value())?)
    }

    /// Returns the wrapped value.
    #[must_use]
    pub const fn value(&self) -> &FixedPoint {
        &self.0
    }
}

fn ensure_canonical(value: &FixedPoint) -> Result<()> {
    if value.scale() != Decimals::CANONICAL {
        return Err(PricingError::ScaleMismatch {
            left: value.scale().get(),
            right: Decimals::CANONICAL.get(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn usd(raw: u64) -> FixedPoint {
        FixedPoint::from_raw(raw, Decimals::CANONICAL)
    }

    #[test]
    fn zero_price_rejected() {
        assert_eq!(
            Price::new(usd(0)),
            Err(PricingError::InvalidPrice("price must be positive"))
        );
    }

    #[test]
    fn negative_ratio_rejected() {
        assert!(PriceRatio::new(usd(1).negate()).is_err());
    }

    #[test]
    fn non_canonical_scale_rejected() {
        let v = FixedPoint::from_integer(1, Decimals::REDUCED);
        assert_eq!(
            Price::new(v),
            Err(PricingError::ScaleMismatch { left: 6, right: 18 })
        );
    }

    #[test]
    fn ratio_from_prices() {
        let (Ok(a), Ok(b)) = (
            Price::new(usd(1_010_000_000_000_000_000)),
            Price::new(usd(1_000_000_000_000_000_000)),
        ) else {
            panic!("valid prices");
        };
        let Ok(s) = PriceRatio::from_prices(&a, &b) else {
            panic!("expected Ok");
        };
        assert_eq!(s.value(), &usd(1_010_000_000_000_000_000));
    }
}
