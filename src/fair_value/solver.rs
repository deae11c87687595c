//! Best-effort Newton solvers for the synthetic balances.
//!
//! Unlike the invariant engine these never fail on the iteration cap: they
//! return the last iterate and flag it in [`SolverDiagnostics`].

use tracing::{debug, warn};

use super::derivatives::{next_iterate, N_COINS};
use crate::domain::{Amplification, FixedPoint, A_PRECISION};
use crate::error::Result;
use crate::invariant::MAX_ITERATIONS;
use crate::math::{trace, TraceSink};

/// How a best-effort solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SolverDiagnostics {
    /// Newton rounds performed.
    pub iterations: u32,
    /// `false` when the iteration cap was reached before the step fell
    /// under one whole unit.
    pub converged: bool,
}

/// A solver result with its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate {
    /// The solved balance.
    pub value: FixedPoint,
    /// How the solve ended.
    pub diagnostics: SolverDiagnostics,
}

/// Finds the balance `x` of coin A at which the pool's marginal rate equals
/// `s` (coin B per coin A), starting from `x₀ = D`.
///
/// Iterates [`next_iterate`] until consecutive iterates differ by less
/// than one whole unit. The reported value is the last iterate minus one
/// half. The iteration cap and a slope that truncates to zero both end the
/// solve early with `converged = false`.
///
/// # Errors
///
/// Propagates fixed-point errors from the derivative terms.
pub fn solve_synthetic_balance(
    d: &FixedPoint,
    amp: Amplification,
    s: &FixedPoint,
    sink: &dyn TraceSink,
) -> Result<Estimate> {
    let one = FixedPoint::one(d.scale());
    let half = one.divide_int(2)?;

    let mut x = d.clone();
    let mut x_prev = FixedPoint::zero(d.scale());
    for round in 1..=MAX_ITERATIONS {
        let Some(next) = next_iterate(d, amp, &x, s, sink)? else {
            warn!(
                iterations = round - 1,
                x = %x,
                "marginal rate slope vanished, returning last iterate"
            );
            return best_effort(&x, &half, round - 1);
        };
        x = next;
        trace(sink, "x", &x);

        if x.subtract(&x_prev)?.abs().try_cmp(&one)?.is_lt() {
            debug!(iterations = round, x = %x, "synthetic balance converged");
            return Ok(Estimate {
                value: x.subtract(&half)?,
                diagnostics: SolverDiagnostics {
                    iterations: round,
                    converged: true,
                },
            });
        }
        x_prev = x.clone();
    }

    warn!(
        iterations = MAX_ITERATIONS,
        x = %x,
        "synthetic balance did not converge, returning last iterate"
    );
    best_effort(&x, &half, MAX_ITERATIONS)
}

fn best_effort(x: &FixedPoint, half: &FixedPoint, iterations: u32) -> Result<Estimate> {
    Ok(Estimate {
        value: x.subtract(half)?,
        diagnostics: SolverDiagnostics {
            iterations,
            converged: false,
        },
    })
}

/// Two-coin `get_y`: the balance of coin B matching balance `x` of coin A
/// under invariant `d`.
///
/// Same recurrence as [`get_y`](crate::invariant::get_y), evaluated with
/// fixed-point operations and a one-whole-unit tolerance.
///
/// # Errors
///
/// Propagates fixed-point errors, including
/// [`PricingError::DivisionByZero`](crate::error::PricingError::DivisionByZero)
/// for a zero `x`.
pub fn calc_y_from_x(
    x: &FixedPoint,
    amp: Amplification,
    d: &FixedPoint,
    sink: &dyn TraceSink,
) -> Result<Estimate> {
    let n = u64::from(N_COINS);
    let ann = amp.precise() * n;
    let one = FixedPoint::one(d.scale());

    let c = d.multiply_int(A_PRECISION);
    let c = c.multiply(d)?.divide(&x.multiply_int(n))?;
    let c = c.multiply(d)?.divide_int(ann * n)?;
    let b = x.add(&d.multiply_int(A_PRECISION).divide_int(ann)?)?;

    let mut y = d.clone();
    for round in 1..=MAX_ITERATIONS {
        let y_prev = y;
        let denominator = y_prev.multiply_int(2).add(&b)?.subtract(d)?;
        y = y_prev.pow(2).add(&c)?.divide(&denominator)?;
        trace(sink, "y", &y);

        if y.subtract(&y_prev)?.abs().try_cmp(&one)?.is_lt() {
            debug!(iterations = round, y = %y, "counterparty balance converged");
            return Ok(Estimate {
                value: y,
                diagnostics: SolverDiagnostics {
                    iterations: round,
                    converged: true,
                },
            });
        }
    }

    warn!(
        iterations = MAX_ITERATIONS,
        y = %y,
        "counterparty balance did not converge, returning last iterate"
    );
    Ok(Estimate {
        value: y,
        diagnostics: SolverDiagnostics {
            iterations: MAX_ITERATIONS,
            converged: false,
        },
    })
}
