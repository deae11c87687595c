//! Manipulation-resistant LP token pricing.
//!
//! The naive LP price ([`PoolState::virtual_price`]) reads the pool's own
//! balances, which a flash loan can skew for the duration of a transaction.
//! This module only takes the invariant `D` and the amplification `A` from
//! the pool. It rebuilds the balances the pool *would* hold if its marginal
//! exchange rate matched the external price ratio, then prices the LP token
//! from those synthetic balances:
//!
//! ```text
//! s        = price_a / price_b
//! x        = solve f(x) = 0           (synthetic balance of coin A)
//! y        = calc_y_from_x(x, A, D)   (synthetic balance of coin B)
//! lp_price = (x · price_a + y · price_b) / total_supply
//! ```
//!
//! Defined for two-coin pools at the canonical 18-decimal scale.
//!
//! # Examples
//!
//! ```
//! use stable_lp_pricing::domain::{Amplification, BasisPoints, Decimals, FixedPoint, Price};
//! use stable_lp_pricing::fair_value::lp_fair_price;
//! use stable_lp_pricing::pools::PoolState;
//!
//! let tokens = |n: u64| FixedPoint::from_integer(n, Decimals::CANONICAL);
//! let pool = PoolState::new(
//!     Amplification::new(50).expect("valid A"),
//!     vec![tokens(1_000_000), tokens(1_000_000)],
//!     tokens(2_000_000),
//!     BasisPoints::new(4),
//!     BasisPoints::new(5_000),
//! )
//! .expect("valid pool");
//!
//! let usd = Price::new(tokens(1)).expect("positive price");
//! let fair = lp_fair_price(&pool, &usd, &usd).expect("priced");
//! assert!(fair.is_converged());
//! ```

mod derivatives;
mod solver;

pub use derivatives::{
    calc_a, calc_b, calc_r, marginal_rate_error, marginal_rate_slope, next_iterate,
};
pub use solver::{calc_y_from_x, solve_synthetic_balance, Estimate, SolverDiagnostics};

use tracing::debug;

use crate::domain::{Amplification, Decimals, FixedPoint, Price, PriceRatio};
use crate::error::{PricingError, Result};
use crate::invariant::get_d_traced;
use crate::math::{NoopSink, TraceSink};
use crate::pools::PoolState;

/// Output of the fair-value solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FairValue {
    /// Synthetic balance of coin A.
    pub synthetic_balance_a: FixedPoint,
    /// Synthetic balance of coin B.
    pub synthetic_balance_b: FixedPoint,
    /// LP token price in the numeraire of the input prices.
    pub lp_price: FixedPoint,
    /// How the solve for coin A ended.
    pub balance_a_diagnostics: SolverDiagnostics,
    /// How the solve for coin B ended.
    pub balance_b_diagnostics: SolverDiagnostics,
}

impl FairValue {
    /// Returns `true` if both solves converged, i.e. neither hit the
    /// iteration cap nor stopped on a vanishing slope.
    ///
    /// A `false` here does not make the price unusable, but a consumer
    /// should discount its confidence in it.
    #[must_use]
    pub const fn is_converged(&self) -> bool {
        self.balance_a_diagnostics.converged && self.balance_b_diagnostics.converged
    }
}

/// Prices the LP token of a two-coin pool from external per-coin prices.
///
/// # Errors
///
/// - [`PricingError::InvalidConfiguration`] unless the pool has two coins.
/// - [`PricingError::ScaleMismatch`] unless the pool is at 18 decimals.
/// - [`PricingError::InsufficientLiquidity`] for an empty pool or `D = 0`.
/// - Propagates invariant and fixed-point errors.
pub fn lp_fair_price(state: &PoolState, price_a: &Price, price_b: &Price) -> Result<FairValue> {
    lp_fair_price_traced(state, price_a, price_b, &NoopSink)
}

/// [`lp_fair_price`] reporting every intermediate value to `sink`.
///
/// # Errors
///
/// Same as [`lp_fair_price`].
pub fn lp_fair_price_traced(
    state: &PoolState,
    price_a: &Price,
    price_b: &Price,
    sink: &dyn TraceSink,
) -> Result<FairValue> {
    if state.n_coins() != 2 {
        return Err(PricingError::InvalidConfiguration(
            "fair value is defined for two-coin pools",
        ));
    }
    if state.is_empty() {
        return Err(PricingError::InsufficientLiquidity);
    }
    let d = get_d_traced(state.balances(), state.amplification(), sink)?;
    fair_value_from_invariant_traced(
        &d,
        state.amplification(),
        state.total_supply(),
        price_a,
        price_b,
        sink,
    )
}

/// Prices the LP token from an already known invariant.
///
/// # Errors
///
/// - [`PricingError::ScaleMismatch`] unless `d` and `total_supply` are at
///   18 decimals.
/// - [`PricingError::InsufficientLiquidity`] if `d` or `total_supply` is
///   not positive.
/// - Propagates fixed-point errors.
pub fn fair_value_from_invariant(
    d: &FixedPoint,
    amp: Amplification,
    total_supply: &FixedPoint,
    price_a: &Price,
    price_b: &Price,
) -> Result<FairValue> {
    fair_value_from_invariant_traced(d, amp, total_supply, price_a, price_b, &NoopSink)
}

/// [`fair_value_from_invariant`] reporting every intermediate value to
/// `sink`.
///
/// # Errors
///
/// Same as [`fair_value_from_invariant`].
pub fn fair_value_from_invariant_traced(
    d: &FixedPoint,
    amp: Amplification,
    total_supply: &FixedPoint,
    price_a: &Price,
    price_b: &Price,
    sink: &dyn TraceSink,
) -> Result<FairValue> {
    for value in [d, total_supply] {
        if value.scale() != Decimals::CANONICAL {
            return Err(PricingError::ScaleMismatch {
                left: value.scale().get(),
                right: Decimals::CANONICAL.get(),
            });
        }
        if !value.is_positive() {
            return Err(PricingError::InsufficientLiquidity);
        }
    }

    let ratio = PriceRatio::from_prices(price_a, price_b)?;
    let a = solve_synthetic_balance(d, amp, ratio.value(), sink)?;
    let b = calc_y_from_x(&a.value, amp, d, sink)?;

    let lp_price = a
        .value
        .multiply(price_a.value())?
        .add(&b.value.multiply(price_b.value())?)?
        .divide(total_supply)?;
    debug!(
        s = %ratio.value(),
        x = %a.value,
        y = %b.value,
        lp_price = %lp_price,
        "fair value"
    );

    Ok(FairValue {
        synthetic_balance_a: a.value,
        synthetic_balance_b: b.value,
        lp_price,
        balance_a_diagnostics: a.diagnostics,
        balance_b_diagnostics: b.diagnostics,
    })
}
