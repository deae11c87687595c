//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use stable_lp_pricing::prelude::*;
//! ```

pub use crate::config::PoolConfig;
pub use crate::domain::{
    Amplification, BasisPoints, Decimals, FixedPoint, Price, PriceRatio, A_PRECISION,
};
pub use crate::error::{PricingError, Result};
pub use crate::fair_value::{lp_fair_price, FairValue, SolverDiagnostics};
pub use crate::invariant::{get_d, get_y};
pub use crate::math::{NoopSink, RecordingSink, TraceSink, TracingSink};
pub use crate::pools::{LiquidityOutcome, PoolState, SwapOutcome, Withdrawal};
pub use crate::traits::FromConfig;
