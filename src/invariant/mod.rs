//! StableSwap invariant engine.
//!
//! | Function | Solves for |
//! |----------|------------|
//! | [`get_d`] | the invariant `D` of a balance vector |
//! | [`get_y`] | the balance of one asset that preserves `D` after another moves |
//!
//! The `_traced` variants report every Newton iterate to a
//! [`TraceSink`](crate::math::TraceSink); the plain variants use
//! [`NoopSink`](crate::math::NoopSink) and produce identical results.

mod engine;

pub(crate) use engine::common_scale;
pub use engine::{get_d, get_d_traced, get_y, get_y_traced, MAX_ITERATIONS};
