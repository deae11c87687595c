//! Pool configuration.
//!
//! [`PoolConfig`] is the declarative blueprint of a pool: amplification,
//! fee parameters and the native decimals of each coin. It is
//! serde-serialisable so deployments can keep it in JSON or TOML.

mod pool_config;

pub use pool_config::PoolConfig;
