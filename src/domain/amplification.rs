//! StableSwap amplification coefficient.

use core::fmt;

use crate::error::PricingError;

/// Precision multiplier applied to `A` by on-chain pools (`A_precise = A · 100`).
pub const A_PRECISION: u64 = 100;

/// Largest accepted plain amplification coefficient.
pub const MAX_A: u64 = 1_000_000;

/// Amplification coefficient, stored in its precise on-chain form.
///
/// Curve-style pools keep `A · A_PRECISION` on chain so the coefficient can
/// ramp smoothly between whole values. Both the invariant engine and the
/// fair-value solver consume the precise value.
///
/// | A | Curve |
/// |---|-------|
/// | 1 | close to constant product |
/// | 50–5 000 | hybrid, low slippage near peg |
/// | → ∞ | constant sum |
///
/// # Examples
///
/// ```
/// use stable_lp_pricing::domain::Amplification;
///
/// let amp = Amplification::new(50).expect("valid A");
/// assert_eq!(amp.precise(), 5_000);
/// assert_eq!(amp.coefficient(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amplification(u64);

impl Amplification {
    /// Creates an amplification from the plain coefficient `A`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidConfiguration`] unless
    /// `1 <= a <= MAX_A`.
    pub const fn new(a: u64) -> Result<Self, PricingError> {
        if a == 0 || a > MAX_A {
            return Err(PricingError::InvalidConfiguration(
                "amplification must be in 1..=1_000_000",
            ));
        }
        Ok(Self(a * A_PRECISION))
    }

    /// Creates an amplification from the precise on-chain value
    /// (`A · A_PRECISION`), e.g. as returned by `A_precise()`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidConfiguration`] if the value is zero or
    /// exceeds `MAX_A · A_PRECISION`.
    pub const fn from_precise(precise: u64) -> Result<Self, PricingError> {
        if precise == 0 || precise > MAX_A * A_PRECISION {
            return Err(PricingError::InvalidConfiguration(
                "precise amplification must be in 1..=100_000_000",
            ));
        }
        Ok(Self(precise))
    }

    /// Returns `A · A_PRECISION`.
    #[must_use]
    pub const fn precise(&self) -> u64 {
        self.0
    }

    /// Returns the plain coefficient `A`, truncated.
    #[must_use]
    pub const fn coefficient(&self) -> u64 {
        self.0 / A_PRECISION
    }
}

impl fmt::Display for Amplification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A={}.{:02}",
            self.0 / A_PRECISION,
            self.0 % A_PRECISION
        )
    }
}
