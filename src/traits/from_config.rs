//! Construction from configuration.
//!
//! [`FromConfig`] gives a uniform way to build a value from its
//! declarative configuration. Implementations validate the configuration
//! first: a successfully constructed value is always in a valid initial
//! state.
//!
//! There is no blanket implementation; every pairing is written out.

use crate::config::PoolConfig;
use crate::domain::{Decimals, FixedPoint};
use crate::error::Result;
use crate::pools::PoolState;

/// Builds `Self` from a configuration of type `C`.
pub trait FromConfig<C> {
    /// Creates a new instance from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error, typically
    /// [`InvalidConfiguration`](crate::error::PricingError::InvalidConfiguration),
    /// if the configuration is invalid.
    fn from_config(config: &C) -> Result<Self>
    where
        Self: Sized;
}

impl FromConfig<PoolConfig> for PoolState {
    /// Creates an empty pool: zero balances and zero LP supply at 18
    /// decimals, ready for a first deposit.
    fn from_config(config: &PoolConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.amplification()?,
            vec![FixedPoint::zero(Decimals::CANONICAL); config.n_coins()],
            FixedPoint::zero(Decimals::CANONICAL),
            config.fee(),
            config.admin_fee(),
        )
    }
}
