//! Static deployment parameters of a StableSwap pool.

use serde::{Deserialize, Serialize};

use crate::domain::{Amplification, BasisPoints, Decimals, FixedPoint, MAX_A};
use crate::error::{PricingError, Result};
use crate::pools::PoolState;

/// Declarative description of a pool: everything except its balances.
///
/// Balances change every block; these parameters do not. Combine a config
/// with a raw balance read via [`snapshot`](Self::snapshot) to obtain a
/// [`PoolState`].
///
/// # Validation
///
/// - `amplification` in `1..=1_000_000` (plain `A`, not the precise form).
/// - At least two coins.
/// - `fee` and `admin_fee` at most 10 000 bp.
///
/// # Examples
///
/// ```
/// use stable_lp_pricing::config::PoolConfig;
///
/// let json = r#"{
///     "amplification": 200,
///     "fee": 4,
///     "admin_fee": 5000,
///     "coin_decimals": [18, 6]
/// }"#;
/// let config: PoolConfig = serde_json::from_str(json).expect("well-formed");
/// config.validate().expect("valid");
///
/// let pool = config
///     .snapshot(&[1_000 * 10u128.pow(18), 1_000 * 10u128.pow(6)], 2_000 * 10u128.pow(18))
///     .expect("snapshot");
/// assert_eq!(pool.balances()[0], pool.balances()[1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    amplification: u64,
    fee: BasisPoints,
    admin_fee: BasisPoints,
    coin_decimals: Vec<Decimals>,
}

impl PoolConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidConfiguration`] if any parameter is
    /// out of range.
    pub fn new(
        amplification: u64,
        fee: BasisPoints,
        admin_fee: BasisPoints,
        coin_decimals: Vec<Decimals>,
    ) -> Result<Self> {
        let config = Self {
            amplification,
            fee,
            admin_fee,
            coin_decimals,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// Deserialized configs are not validated automatically; call this
    /// before use.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidConfiguration`] if any parameter is
    /// out of range.
    pub fn validate(&self) -> Result<()> {
        if self.amplification == 0 || self.amplification > MAX_A {
            return Err(PricingError::InvalidConfiguration(
                "amplification must be in 1..=1_000_000",
            ));
        }
        if self.coin_decimals.len() < 2 {
            return Err(PricingError::InvalidConfiguration(
                "pool needs at least two coins",
            ));
        }
        if !self.fee.is_valid_percent() {
            return Err(PricingError::InvalidConfiguration("fee above 100%"));
        }
        if !self.admin_fee.is_valid_percent() {
            return Err(PricingError::InvalidConfiguration("admin fee above 100%"));
        }
        Ok(())
    }

    /// Returns the amplification coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidConfiguration`] if `A` is out of range.
    pub fn amplification(&self) -> Result<Amplification> {
        Amplification::new(self.amplification)
    }

    /// Returns the swap fee.
    #[must_use]
    pub const fn fee(&self) -> BasisPoints {
        self.fee
    }

    /// Returns the admin share of fees.
    #[must_use]
    pub const fn admin_fee(&self) -> BasisPoints {
        self.admin_fee
    }

    /// Returns the native decimals of each coin.
    #[must_use]
    pub fn coin_decimals(&self) -> &[Decimals] {
        &self.coin_decimals
    }

    /// Returns the number of coins.
    #[must_use]
    pub fn n_coins(&self) -> usize {
        self.coin_decimals.len()
    }

    /// Builds a canonical 18-decimal snapshot from raw on-chain integers.
    ///
    /// Each `raw_balances[i]` is read at the coin's native decimals and
    /// upscaled to 18. `raw_total_supply` is an 18-decimal LP amount.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidConfiguration`] if the config is invalid.
    /// - [`PricingError::InvalidQuantity`] unless there is one balance per
    ///   coin.
    pub fn snapshot(&self, raw_balances: &[u128], raw_total_supply: u128) -> Result<PoolState> {
        self.validate()?;
        if raw_balances.len() != self.n_coins() {
            return Err(PricingError::InvalidQuantity(
                "expected one balance per coin",
            ));
        }
        let balances = raw_balances
            .iter()
            .zip(&self.coin_decimals)
            .map(|(raw, decimals)| {
                FixedPoint::from_raw(*raw, *decimals).upscale(Decimals::CANONICAL)
            })
            .collect::<Result<Vec<_>>>()?;
        PoolState::new(
            self.amplification()?,
            balances,
            FixedPoint::from_raw(raw_total_supply, Decimals::CANONICAL),
            self.fee,
            self.admin_fee,
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn decimals(values: &[u8]) -> Vec<Decimals> {
        values
            .iter()
            .map(|v| {
                let Ok(d) = Decimals::new(*v) else {
                    panic!("valid decimals");
                };
                d
            })
            .collect()
    }

    fn config() -> PoolConfig {
        let Ok(config) = PoolConfig::new(
            100,
            BasisPoints::new(4),
            BasisPoints::new(5_000),
            decimals(&[18, 6]),
        ) else {
            panic!("valid config");
        };
        config
    }

    #[test]
    fn valid_config() {
        let config = config();
        assert_eq!(config.n_coins(), 2);
        assert_eq!(config.fee(), BasisPoints::new(4));
        let Ok(amp) = config.amplification() else {
            panic!("valid amplification");
        };
        assert_eq!(amp.precise(), 10_000);
    }

    #[test]
    fn zero_amplification_rejected() {
        let result = PoolConfig::new(0, BasisPoints::ZERO, BasisPoints::ZERO, decimals(&[18, 18]));
        assert!(matches!(result, Err(PricingError::InvalidConfiguration(_))));
    }

    #[test]
    fn excessive_amplification_rejected() {
        let result = PoolConfig::new(
            MAX_A + 1,
            BasisPoints::ZERO,
            BasisPoints::ZERO,
            decimals(&[18, 18]),
        );
        assert!(matches!(result, Err(PricingError::InvalidConfiguration(_))));
    }

    #[test]
    fn single_coin_rejected() {
        let result = PoolConfig::new(10, BasisPoints::ZERO, BasisPoints::ZERO, decimals(&[18]));
        assert!(matches!(result, Err(PricingError::InvalidConfiguration(_))));
    }

    #[test]
    fn excessive_admin_fee_rejected() {
        let result = PoolConfig::new(
            10,
            BasisPoints::ZERO,
            BasisPoints::new(10_001),
            decimals(&[18, 18]),
        );
        assert!(matches!(result, Err(PricingError::InvalidConfiguration(_))));
    }

    #[test]
    fn snapshot_normalises_decimals() {
        let Ok(state) = config().snapshot(&[5 * 10u128.pow(18), 5 * 10u128.pow(6)], 10u128.pow(19))
        else {
            panic!("expected Ok");
        };
        let five = FixedPoint::from_integer(5, Decimals::CANONICAL);
        assert_eq!(state.balances(), &[five.clone(), five]);
        assert_eq!(
            state.total_supply(),
            &FixedPoint::from_integer(10, Decimals::CANONICAL)
        );
        assert_eq!(state.scale(), Decimals::CANONICAL);
    }

    #[test]
    fn snapshot_requires_one_balance_per_coin() {
        let result = config().snapshot(&[1], 1);
        assert!(matches!(result, Err(PricingError::InvalidQuantity(_))));
    }

    #[test]
    fn serde_round_trip() {
        let config = config();
        let Ok(json) = serde_json::to_string(&config) else {
            panic!("serializable");
        };
        assert_eq!(
            json,
            r#"{"amplification":100,"fee":4,"admin_fee":5000,"coin_decimals":[18,6]}"#
        );
        let Ok(parsed) = serde_json::from_str::<PoolConfig>(&json) else {
            panic!("deserializable");
        };
        assert_eq!(parsed, config);
    }

    #[test]
    fn deserialized_config_is_validated_on_use() {
        let json = r#"{"amplification":0,"fee":4,"admin_fee":0,"coin_decimals":[18,18]}"#;
        let Ok(parsed) = serde_json::from_str::<PoolConfig>(json) else {
            panic!("well-formed json");
        };
        assert!(parsed.validate().is_err());
        assert!(parsed.snapshot(&[1, 1], 2).is_err());
    }

    #[test]
    fn out_of_range_decimals_fail_to_parse() {
        let json = r#"{"amplification":10,"fee":4,"admin_fee":0,"coin_decimals":[18,19]}"#;
        assert!(serde_json::from_str::<PoolConfig>(json).is_err());
    }
}
