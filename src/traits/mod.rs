//! Core trait abstractions.
//!
//! [`FromConfig`] is the configuration-driven construction seam: pools are
//! built from a validated [`PoolConfig`](crate::config::PoolConfig).

mod from_config;

pub use from_config::FromConfig;
