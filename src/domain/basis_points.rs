//! Basis-point representation for fee percentages.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Maximum value that represents 100%.
const MAX_BPS: u32 = 10_000;

/// Denominator of on-chain StableSwap fee parameters (`10^10` = 100%).
pub const FEE_DENOMINATOR: u64 = 10_000_000_000;

/// Conversion factor from basis points to [`FEE_DENOMINATOR`] units.
const FEE_UNITS_PER_BP: u64 = FEE_DENOMINATOR / MAX_BPS as u64;

/// A percentage expressed in basis points (1 bp = 0.01%, 10 000 bp = 100%).
///
/// All `u32` values are technically valid, but values above 10 000 are
/// nonsensical as percentages. Use [`is_valid_percent`](Self::is_valid_percent)
/// to check; pool configuration rejects them.
///
/// # Examples
///
/// ```
/// use stable_lp_pricing::domain::BasisPoints;
///
/// let bp = BasisPoints::new(4);
/// assert_eq!(bp.get(), 4);
/// assert_eq!(bp.fee_units(), 4_000_000);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// Zero basis points (0%).
    pub const ZERO: Self = Self(0);

    /// Creates a new `BasisPoints` from a raw `u32` value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the underlying `u32` value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the value is in the valid percentage range (`0..=10_000`).
    #[must_use]
    pub const fn is_valid_percent(&self) -> bool {
        self.0 <= MAX_BPS
    }

    /// Expresses the percentage in [`FEE_DENOMINATOR`] units, the form the
    /// on-chain pool stores its `fee` and `admin_fee` in.
    #[must_use]
    pub const fn fee_units(&self) -> u64 {
        self.0 as u64 * FEE_UNITS_PER_BP
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}
