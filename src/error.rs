//! Unified error types for the pricing engine.
//!
//! All fallible operations across the crate return [`PricingError`] as their
//! error type, so consumers can tell programming errors (scale mismatches,
//! bad indices) apart from degenerate pool state and from recoverable
//! slippage guards.

use thiserror::Error;

use crate::domain::FixedPoint;

/// Errors produced by fixed-point arithmetic, the invariant engine, the
/// fair-value solver, and liquidity-event accounting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Arithmetic between two fixed-point values with different decimal
    /// scales. Always a programming error.
    #[error("scale mismatch: {left} decimals vs {right} decimals")]
    ScaleMismatch {
        /// Scale of the left-hand operand.
        left: u8,
        /// Scale of the right-hand operand.
        right: u8,
    },

    /// A divisor with a zero raw value.
    #[error("division by zero")]
    DivisionByZero,

    /// Square root requested for a negative value.
    #[error("square root of a negative operand")]
    NegativeSqrtOperand,

    /// A Newton iteration of the invariant engine exhausted its round budget.
    ///
    /// The invariant is ill-defined for the supplied balances; the pool
    /// snapshot should be rejected rather than retried.
    #[error("{computation} did not converge within {iterations} iterations")]
    ConvergenceFailure {
        /// Which computation failed (`"get_d"`, `"get_y"`).
        computation: &'static str,
        /// Number of rounds attempted.
        iterations: u32,
    },

    /// Asset indices violate `i != j` and `i, j < n_coins`.
    #[error("invalid asset index pair ({i}, {j}) for a {n_coins}-coin pool")]
    InvalidAssetIndex {
        /// Input asset index.
        i: usize,
        /// Output asset index.
        j: usize,
        /// Number of coins in the pool.
        n_coins: usize,
    },

    /// A liquidity event or swap fell outside the caller's acceptable bound.
    #[error("slippage exceeded: got {actual}, limit {limit}")]
    SlippageExceeded {
        /// Amount the operation would produce (or consume).
        actual: FixedPoint,
        /// Caller-supplied bound.
        limit: FixedPoint,
    },

    /// Decimal precision out of range or rescale in the wrong direction.
    #[error("invalid precision: {0}")]
    InvalidPrecision(&'static str),

    /// Pool or solver parameters are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// A quantity argument is negative, zero where it must be positive, or
    /// has the wrong shape.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// An external reference price is not strictly positive.
    #[error("invalid price: {0}")]
    InvalidPrice(&'static str),

    /// The operation requires a pool with outstanding LP supply.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, PricingError>;
