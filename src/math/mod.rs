//! Numeric support shared by the solvers.
//!
//! The fixed-point type itself lives in [`crate::domain`]; this module holds
//! the diagnostic plumbing the solvers report through.

mod trace;

pub use trace::{NoopSink, RecordingSink, TraceEntry, TraceSink, TracingSink};

pub(crate) use trace::trace;
