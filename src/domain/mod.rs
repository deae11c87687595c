//! Fundamental value types used throughout the pricing engine.
//!
//! All types use newtypes with validated constructors to enforce their
//! invariants: decimal scales stay in range, amplification is non-zero,
//! prices are positive.

mod amplification;
mod basis_points;
mod decimals;
mod fixed_point;
mod price;

pub use amplification::{Amplification, A_PRECISION, MAX_A};
pub use basis_points::{BasisPoints, FEE_DENOMINATOR};
pub use decimals::Decimals;
pub use fixed_point::FixedPoint;
pub use price::{Price, PriceRatio};
