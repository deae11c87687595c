//! StableSwap pool snapshots and event accounting.
//!
//! [`PoolState`] models a pool at one block. Every event is simulated on a
//! working copy and returns the resulting snapshot:
//!
//! | Event | Method | Output |
//! |-------|--------|--------|
//! | Swap quote | [`PoolState::get_dy`] | net output amount |
//! | Swap | [`PoolState::exchange`] | [`SwapOutcome`] |
//! | Deposit | [`PoolState::add_liquidity`] | [`LiquidityOutcome`] |
//! | Proportional withdrawal | [`PoolState::remove_liquidity`] | [`Withdrawal`] |
//! | Imbalanced withdrawal | [`PoolState::remove_liquidity_imbalance`] | [`LiquidityOutcome`] |

mod liquidity;
mod pool_state;

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod proptest_properties;

pub use liquidity::{LiquidityOutcome, Withdrawal};
pub use pool_state::{PoolState, SwapOutcome};
