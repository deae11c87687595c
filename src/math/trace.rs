//! Injectable trace sinks for numeric provenance.
//!
//! Solvers accept a `&dyn TraceSink` and report every intermediate value
//! they produce together with the source location that produced it. The
//! sink is write-only from the solver's point of view: arithmetic never
//! reads it back, so swapping sinks cannot change a result.
//!
//! | Sink | Behaviour |
//! |------|-----------|
//! | [`NoopSink`] | Discards everything (default for untraced entry points) |
//! | [`RecordingSink`] | Appends to a lock-guarded buffer for later inspection |
//! | [`TracingSink`] | Emits a `tracing` event at `TRACE` level per value |

use core::panic::Location;
use std::sync::{Mutex, MutexGuard, PoisonError};

use num_bigint::BigInt;
use num_traits::Signed;

use crate::domain::FixedPoint;

/// Receiver of intermediate solver values.
///
/// Implementations must tolerate concurrent calls: independent solver
/// invocations may share one sink across threads.
pub trait TraceSink: Send + Sync {
    /// Records one produced value.
    fn record(&self, label: &'static str, value: &FixedPoint, location: &'static Location<'static>);
}

/// Records `value` into `sink`, tagging it with the caller's location.
#[track_caller]
pub(crate) fn trace(sink: &dyn TraceSink, label: &'static str, value: &FixedPoint) {
    sink.record(label, value, Location::caller());
}

/// A sink that drops every value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopSink;

impl TraceSink for NoopSink {
    #[inline]
    fn record(&self, _: &'static str, _: &FixedPoint, _: &'static Location<'static>) {}
}

/// One recorded value with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Name of the quantity (`"d"`, `"x"`, `"adjustment"`, ...).
    pub label: &'static str,
    /// The value produced.
    pub value: FixedPoint,
    /// Source location that produced it.
    pub location: &'static Location<'static>,
}

/// Append-only in-memory sink.
///
/// Entries are kept in arrival order. The buffer is guarded by a mutex so
/// the sink can be shared between threads running independent solves.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<TraceEntry>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<TraceEntry>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a snapshot of all recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.guard().clone()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Drops all recorded entries.
    pub fn clear(&self) {
        self.guard().clear();
    }

    /// Returns the `n` entries with the largest absolute raw magnitude,
    /// largest first. Useful for spotting which intermediate quantity is
    /// closest to exhausting a fixed-width integer on chain.
    #[must_use]
    pub fn top_n(&self, n: usize) -> Vec<TraceEntry> {
        let mut entries = self.entries();
        entries.sort_by_cached_key(|e| core::cmp::Reverse(magnitude(&e.value)));
        entries.truncate(n);
        entries
    }
}

fn magnitude(value: &FixedPoint) -> BigInt {
    value.raw().abs()
}

impl TraceSink for RecordingSink {
    fn record(
        &self,
        label: &'static str,
        value: &FixedPoint,
        location: &'static Location<'static>,
    ) {
        self.guard().push(TraceEntry {
            label,
            value: value.clone(),
            location,
        });
    }
}

/// Forwards every value to the `tracing` subscriber at `TRACE` level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(
        &self,
        label: &'static str,
        value: &FixedPoint,
        location: &'static Location<'static>,
    ) {
        tracing::trace!(
            label,
            value = %value,
            file = location.file(),
            line = location.line(),
            "fixed-point value"
        );
    }
}
