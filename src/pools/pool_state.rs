//! Pool snapshot and swap accounting.
//!
//! A [`PoolState`] is the on-chain state of a StableSwap pool at one block:
//! amplification, per-coin balances, LP supply, and fee parameters. It is
//! never mutated in place. Every simulated event ([`exchange`], the
//! liquidity operations in [`super::liquidity`]) returns a fresh snapshot
//! alongside its result.
//!
//! [`exchange`]: PoolState::exchange

use num_bigint::BigInt;
use tracing::debug;

use crate::domain::{Amplification, BasisPoints, Decimals, FixedPoint, FEE_DENOMINATOR};
use crate::error::{PricingError, Result};
use crate::invariant::{common_scale, get_d, get_y};

/// Immutable snapshot of a StableSwap pool.
///
/// All balances and the LP supply share one decimal scale. Use
/// [`PoolConfig::snapshot`](crate::config::PoolConfig::snapshot) to build a
/// canonical 18-decimal snapshot from raw on-chain integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    amplification: Amplification,
    balances: Vec<FixedPoint>,
    total_supply: FixedPoint,
    fee: BasisPoints,
    admin_fee: BasisPoints,
}

/// Result of [`PoolState::exchange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Amount of coin `j` paid out, net of fees.
    pub amount_out: FixedPoint,
    /// Total fee charged in coin `j`.
    pub fee: FixedPoint,
    /// Part of `fee` removed from the pool as admin revenue.
    pub admin_fee: FixedPoint,
    /// Pool state after the swap.
    pub pool: PoolState,
}

impl PoolState {
    /// Creates a validated snapshot.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidConfiguration`] for fewer than two coins or a
    ///   fee above 100%.
    /// - [`PricingError::ScaleMismatch`] if balances and supply disagree on
    ///   scale.
    /// - [`PricingError::InvalidQuantity`] for a negative balance or supply.
    pub fn new(
        amplification: Amplification,
        balances: Vec<FixedPoint>,
        total_supply: FixedPoint,
        fee: BasisPoints,
        admin_fee: BasisPoints,
    ) -> Result<Self> {
        if balances.len() < 2 {
            return Err(PricingError::InvalidConfiguration(
                "pool needs at least two coins",
            ));
        }
        if !fee.is_valid_percent() {
            return Err(PricingError::InvalidConfiguration("fee above 100%"));
        }
        if !admin_fee.is_valid_percent() {
            return Err(PricingError::InvalidConfiguration("admin fee above 100%"));
        }
        let scale = common_scale(&balances)?;
        if total_supply.scale() != scale {
            return Err(PricingError::ScaleMismatch {
                left: total_supply.scale().get(),
                right: scale.get(),
            });
        }
        if total_supply.is_negative() {
            return Err(PricingError::InvalidQuantity(
                "total supply must not be negative",
            ));
        }
        Ok(Self {
            amplification,
            balances,
            total_supply,
            fee,
            admin_fee,
        })
    }

    /// Returns the amplification coefficient.
    #[must_use]
    pub const fn amplification(&self) -> Amplification {
        self.amplification
    }

    /// Returns the per-coin balances.
    #[must_use]
    pub fn balances(&self) -> &[FixedPoint] {
        &self.balances
    }

    /// Returns the outstanding LP supply.
    #[must_use]
    pub const fn total_supply(&self) -> &FixedPoint {
        &self.total_supply
    }

    /// Returns the swap fee.
    #[must_use]
    pub const fn fee(&self) -> BasisPoints {
        self.fee
    }

    /// Returns the share of fees kept as admin revenue.
    #[must_use]
    pub const fn admin_fee(&self) -> BasisPoints {
        self.admin_fee
    }

    /// Returns the number of coins.
    #[must_use]
    pub fn n_coins(&self) -> usize {
        self.balances.len()
    }

    /// Returns the shared decimal scale of balances and supply.
    #[must_use]
    pub const fn scale(&self) -> Decimals {
        self.total_supply.scale()
    }

    /// Returns `true` when no LP tokens are outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_supply.is_zero()
    }

    /// Computes the invariant `D` of the current balances.
    ///
    /// # Errors
    ///
    /// Propagates [`get_d`] errors.
    pub fn invariant(&self) -> Result<FixedPoint> {
        get_d(&self.balances, self.amplification)
    }

    /// Naive LP price `D / total_supply`.
    ///
    /// Reads the pool's own balances, so it moves with any balance
    /// manipulation. Compare with
    /// [`lp_fair_price`](crate::fair_value::lp_fair_price).
    ///
    /// # Errors
    ///
    /// - [`PricingError::InsufficientLiquidity`] when the supply is zero.
    /// - Propagates [`get_d`] errors.
    pub fn virtual_price(&self) -> Result<FixedPoint> {
        if self.is_empty() {
            return Err(PricingError::InsufficientLiquidity);
        }
        self.invariant()?.divide(&self.total_supply)
    }

    /// Quotes the amount of coin `j` received for `dx` of coin `i`, net of
    /// the swap fee.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidAssetIndex`] for a bad index pair.
    /// - [`PricingError::InvalidQuantity`] if `dx` is not positive or too
    ///   small to move the balance of `j`.
    /// - Propagates [`get_y`] errors.
    pub fn get_dy(&self, i: usize, j: usize, dx: &FixedPoint) -> Result<FixedPoint> {
        let quote = self.quote(i, j, dx)?;
        quote.net()
    }

    /// Applies a swap of `dx` of coin `i` for coin `j` on a working copy.
    ///
    /// The admin share of the fee leaves the pool; the rest stays in the
    /// balance of `j` and accrues to LPs.
    ///
    /// # Errors
    ///
    /// - [`PricingError::SlippageExceeded`] if the output is below `min_dy`.
    /// - Every error of [`get_dy`](Self::get_dy).
    pub fn exchange(
        &self,
        i: usize,
        j: usize,
        dx: &FixedPoint,
        min_dy: &FixedPoint,
    ) -> Result<SwapOutcome> {
        let quote = self.quote(i, j, dx)?;
        let amount_out = quote.net()?;
        if amount_out.try_cmp(min_dy)?.is_lt() {
            return Err(PricingError::SlippageExceeded {
                actual: amount_out,
                limit: min_dy.clone(),
            });
        }
        let admin_fee = fee_portion(&quote.fee, self.admin_fee.fee_units());

        let balances = self
            .balances
            .iter()
            .enumerate()
            .map(|(k, balance)| match k {
                _ if k == i => balance.add(dx),
                _ if k == j => balance.subtract(&amount_out)?.subtract(&admin_fee),
                _ => Ok(balance.clone()),
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            i,
            j,
            dx = %dx,
            dy = %amount_out,
            fee = %quote.fee,
            "exchange"
        );

        Ok(SwapOutcome {
            amount_out,
            fee: quote.fee,
            admin_fee,
            pool: self.with_balances(balances, self.total_supply.clone()),
        })
    }

    fn quote(&self, i: usize, j: usize, dx: &FixedPoint) -> Result<Quote> {
        let (Some(x_i), Some(x_j)) = (self.balances.get(i), self.balances.get(j)) else {
            return Err(PricingError::InvalidAssetIndex {
                i,
                j,
                n_coins: self.n_coins(),
            });
        };
        if !dx.is_positive() {
            return Err(PricingError::InvalidQuantity("swap input must be positive"));
        }
        let x = x_i.add(dx)?;
        let y = get_y(i, j, &x, &self.balances, self.amplification)?;

        let one = FixedPoint::from_raw(1, self.scale());
        let gross = x_j.subtract(&y)?.subtract(&one)?;
        if !gross.is_positive() {
            return Err(PricingError::InvalidQuantity(
                "swap input too small to produce output",
            ));
        }
        let fee = fee_portion(&gross, self.fee.fee_units());
        Ok(Quote { gross, fee })
    }

    /// Rebuilds the snapshot with new balances and supply, keeping the
    /// parameters.
    pub(crate) fn with_balances(
        &self,
        balances: Vec<FixedPoint>,
        total_supply: FixedPoint,
    ) -> Self {
        Self {
            amplification: self.amplification,
            balances,
            total_supply,
            fee: self.fee,
            admin_fee: self.admin_fee,
        }
    }
}

struct Quote {
    gross: FixedPoint,
    fee: FixedPoint,
}

impl Quote {
    fn net(&self) -> Result<FixedPoint> {
        self.gross.subtract(&self.fee)
    }
}

/// `amount · fee_units / 10^10`, truncated toward zero.
pub(crate) fn fee_portion(amount: &FixedPoint, fee_units: impl Into<BigInt>) -> FixedPoint {
    FixedPoint::from_raw(
        amount.raw() * fee_units.into() / BigInt::from(FEE_DENOMINATOR),
        amount.scale(),
    )
}
