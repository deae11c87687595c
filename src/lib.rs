//! # Stable LP Pricing
//!
//! Deterministic StableSwap invariant engine and manipulation-resistant LP
//! token fair-value solver.
//!
//! An oracle that prices an LP token from a pool's instantaneous balances
//! can be skewed by a flash loan. This crate instead treats the invariant
//! `D` and the amplification `A` as structural constants, rebuilds the
//! balances the pool would hold if it were priced consistently with
//! trusted external prices, and prices the LP token from those.
//!
//! All arithmetic runs on arbitrary-precision decimal fixed point with
//! truncating division, so results match on-chain integer math bit for
//! bit.
//!
//! # Quick Start
//!
//! ```rust
//! use stable_lp_pricing::config::PoolConfig;
//! use stable_lp_pricing::domain::{BasisPoints, Decimals, FixedPoint, Price};
//! use stable_lp_pricing::fair_value::lp_fair_price;
//!
//! // 1. Static pool parameters: A = 50, 4bp fee, 50% admin share.
//! let config = PoolConfig::new(
//!     50,
//!     BasisPoints::new(4),
//!     BasisPoints::new(5_000),
//!     vec![Decimals::CANONICAL, Decimals::CANONICAL],
//! )
//! .expect("valid config");
//!
//! // 2. Snapshot raw on-chain balances and LP supply.
//! let e18 = 10u128.pow(18);
//! let pool = config
//!     .snapshot(&[1_000_000 * e18, 1_000_000 * e18], 2_000_000 * e18)
//!     .expect("valid snapshot");
//!
//! // 3. Invariant and naive LP price.
//! let d = pool.invariant().expect("converges");
//! assert_eq!(d, FixedPoint::from_integer(2_000_000, Decimals::CANONICAL));
//!
//! // 4. Fair LP price from external USD prices.
//! let usd = Price::new(FixedPoint::one(Decimals::CANONICAL)).expect("positive");
//! let fair = lp_fair_price(&pool, &usd, &usd).expect("priced");
//! assert!(fair.is_converged());
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  PoolConfig   │  A, fees, coin decimals
//! └──────┬───────┘
//!        │ snapshot(raw balances, raw supply)
//!        ▼
//! ┌──────────────┐
//! │  PoolState    │  swaps and liquidity events on working copies
//! └──────┬───────┘
//!        │ get_d
//!        ▼
//! ┌──────────────┐
//! │  Invariant    │  Newton iterations for D and y, fatal on the cap
//! └──────┬───────┘
//!        │ D, A, price_a / price_b
//!        ▼
//! ┌──────────────┐
//! │  Fair value   │  damped Newton for synthetic balances, best effort
//! └──────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`FixedPoint`](domain::FixedPoint), [`Decimals`](domain::Decimals), [`Amplification`](domain::Amplification), [`BasisPoints`](domain::BasisPoints), [`Price`](domain::Price) |
//! | [`invariant`] | [`get_d`](invariant::get_d) and [`get_y`](invariant::get_y) |
//! | [`pools`] | [`PoolState`](pools::PoolState) snapshots, swaps, liquidity accounting |
//! | [`fair_value`] | [`lp_fair_price`](fair_value::lp_fair_price) and the Newton solver behind it |
//! | [`config`] | [`PoolConfig`](config::PoolConfig) declarative pool parameters |
//! | [`traits`] | [`FromConfig`](traits::FromConfig) construction seam |
//! | [`math`] | Injectable [`TraceSink`](math::TraceSink)s for numeric provenance |
//! | [`error`] | [`PricingError`](error::PricingError) taxonomy |
//! | [`prelude`] | Convenience re-exports |
//!
//! # Diagnostics
//!
//! Solvers emit `tracing` events: `DEBUG` on convergence and liquidity
//! events, `WARN` when the fair-value solver returns a non-converged
//! estimate. For a value-by-value record, pass a
//! [`RecordingSink`](math::RecordingSink) to any `*_traced` entry point.

pub mod config;
pub mod domain;
pub mod error;
pub mod fair_value;
pub mod invariant;
pub mod math;
pub mod pools;
pub mod prelude;
pub mod traits;
