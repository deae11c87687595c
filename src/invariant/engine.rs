//! Newton iterations for `D` and `y`.
//!
//! Both solvers iterate on the raw scaled integers of their inputs, the way
//! an on-chain pool iterates on its `xp` vector, so a result computed here
//! is bit-identical to the contract's.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use tracing::debug;

use crate::domain::{Amplification, Decimals, FixedPoint, A_PRECISION};
use crate::error::{PricingError, Result};
use crate::math::{trace, NoopSink, TraceSink};

/// Maximum Newton rounds before declaring non-convergence.
pub const MAX_ITERATIONS: u32 = 255;

/// Computes the StableSwap invariant `D` for `balances`.
///
/// Solves
///
/// ```text
/// A·nⁿ·Σxᵢ + D = A·nⁿ·D + Dⁿ⁺¹ / (nⁿ·Πxᵢ)
/// ```
///
/// by Newton iteration from `D₀ = Σxᵢ`:
///
/// ```text
/// D_P    = Dⁿ⁺¹ / (nⁿ·Πxᵢ)
/// D_next = (Ann·S/A_PREC + n·D_P)·D / ((Ann − A_PREC)·D/A_PREC + (n+1)·D_P)
/// ```
///
/// where `Ann = A_precise · n`. Converges when consecutive iterates differ
/// by at most one raw unit.
///
/// An all-zero balance vector yields `D = 0`.
///
/// # Errors
///
/// - [`PricingError::InvalidQuantity`] for an empty or negative balance.
/// - [`PricingError::ScaleMismatch`] if the balances do not share a scale.
/// - [`PricingError::ConvergenceFailure`] if a single balance is zero while
///   others are not, or if the iteration exhausts [`MAX_ITERATIONS`].
///
/// # Examples
///
/// ```
/// use stable_lp_pricing::domain::{Amplification, Decimals, FixedPoint};
/// use stable_lp_pricing::invariant::get_d;
///
/// let b = FixedPoint::from_integer(1_000_000, Decimals::CANONICAL);
/// let amp = Amplification::new(50).expect("valid A");
/// let d = get_d(&[b.clone(), b], amp).expect("converges");
/// assert_eq!(d, FixedPoint::from_integer(2_000_000, Decimals::CANONICAL));
/// ```
pub fn get_d(balances: &[FixedPoint], amp: Amplification) -> Result<FixedPoint> {
    get_d_traced(balances, amp, &NoopSink)
}

/// [`get_d`] reporting every iterate to `sink`.
///
/// # Errors
///
/// Same as [`get_d`].
pub fn get_d_traced(
    balances: &[FixedPoint],
    amp: Amplification,
    sink: &dyn TraceSink,
) -> Result<FixedPoint> {
    let scale = common_scale(balances)?;
    let xp: Vec<BigInt> = balances.iter().map(|b| b.raw().clone()).collect();
    let d = compute_d(&xp, amp, scale, sink)?;
    Ok(FixedPoint::from_raw(d, scale))
}

/// Computes the balance of asset `j` that keeps the invariant of
/// `balances` unchanged once asset `i` holds `x`.
///
/// With `S'` the sum and `P'` the product of every balance except `j`
/// (asset `i` taken as `x`), iterates from `y₀ = D`:
///
/// ```text
/// c      = Dⁿ⁺¹·A_PREC / (nⁿ·P'·Ann)
/// b      = S' + D·A_PREC/Ann
/// y_next = (y² + c) / (2y + b − D)
/// ```
///
/// # Errors
///
/// - [`PricingError::InvalidAssetIndex`] if `i == j` or either index is out
///   of range.
/// - [`PricingError::InvalidQuantity`] if `x` is not strictly positive.
/// - [`PricingError::ScaleMismatch`] if `x` and `balances` disagree.
/// - [`PricingError::ConvergenceFailure`] on a degenerate pool or when the
///   iteration exhausts [`MAX_ITERATIONS`].
pub fn get_y(
    i: usize,
    j: usize,
    x: &FixedPoint,
    balances: &[FixedPoint],
    amp: Amplification,
) -> Result<FixedPoint> {
    get_y_traced(i, j, x, balances, amp, &NoopSink)
}

/// [`get_y`] reporting `D` and every `y` iterate to `sink`.
///
/// # Errors
///
/// Same as [`get_y`].
pub fn get_y_traced(
    i: usize,
    j: usize,
    x: &FixedPoint,
    balances: &[FixedPoint],
    amp: Amplification,
    sink: &dyn TraceSink,
) -> Result<FixedPoint> {
    let n_coins = balances.len();
    if i == j || i >= n_coins || j >= n_coins {
        return Err(PricingError::InvalidAssetIndex { i, j, n_coins });
    }
    let scale = common_scale(balances)?;
    if x.scale() != scale {
        return Err(PricingError::ScaleMismatch {
            left: x.scale().get(),
            right: scale.get(),
        });
    }
    if !x.is_positive() {
        return Err(PricingError::InvalidQuantity("new balance must be positive"));
    }

    let xp: Vec<BigInt> = balances.iter().map(|b| b.raw().clone()).collect();
    let d = compute_d(&xp, amp, scale, sink)?;

    let n = BigInt::from(n_coins);
    let a_prec = BigInt::from(A_PRECISION);
    let ann = BigInt::from(amp.precise()) * &n;

    let mut c = d.clone();
    let mut s = BigInt::zero();
    for (k, balance) in xp.iter().enumerate() {
        let x_k = if k == i {
            x.raw()
        } else if k != j {
            balance
        } else {
            continue;
        };
        if x_k.is_zero() {
            return Err(PricingError::ConvergenceFailure {
                computation: "get_y",
                iterations: 0,
            });
        }
        s += x_k;
        c = c * &d / (x_k * &n);
    }
    c = c * &d * &a_prec / (&ann * &n);
    let b = s + &d * &a_prec / &ann;

    let mut y = d.clone();
    for round in 1..=MAX_ITERATIONS {
        let denominator = BigInt::from(2u32) * &y + &b - &d;
        if !denominator.is_positive() {
            return Err(PricingError::DivisionByZero);
        }
        let y_prev = y;
        y = (&y_prev * &y_prev + &c) / denominator;
        trace(sink, "y", &FixedPoint::from_raw(y.clone(), scale));

        if (&y - &y_prev).abs() <= BigInt::one() {
            debug!(iterations = round, "get_y converged");
            return Ok(FixedPoint::from_raw(y, scale));
        }
    }

    Err(PricingError::ConvergenceFailure {
        computation: "get_y",
        iterations: MAX_ITERATIONS,
    })
}

/// Newton iteration for `D` on raw scaled integers.
fn compute_d(
    xp: &[BigInt],
    amp: Amplification,
    scale: Decimals,
    sink: &dyn TraceSink,
) -> Result<BigInt> {
    let s: BigInt = xp.iter().sum();
    if s.is_zero() {
        return Ok(BigInt::zero());
    }
    if xp.iter().any(Zero::is_zero) {
        // D_P would divide by a zero balance: the invariant is undefined.
        return Err(PricingError::ConvergenceFailure {
            computation: "get_d",
            iterations: 0,
        });
    }

    let n = BigInt::from(xp.len());
    let n_plus_1 = &n + BigInt::one();
    let a_prec = BigInt::from(A_PRECISION);
    let ann = BigInt::from(amp.precise()) * &n;

    let mut d = s.clone();
    for round in 1..=MAX_ITERATIONS {
        let mut d_p = d.clone();
        for x in xp {
            d_p = d_p * &d / (x * &n);
        }

        let numerator = (&ann * &s / &a_prec + &d_p * &n) * &d;
        let denominator = (&ann - &a_prec) * &d / &a_prec + &n_plus_1 * &d_p;
        if denominator.is_zero() {
            return Err(PricingError::DivisionByZero);
        }

        let d_prev = d;
        d = numerator / denominator;
        trace(sink, "d", &FixedPoint::from_raw(d.clone(), scale));

        if (&d - &d_prev).abs() <= BigInt::one() {
            debug!(iterations = round, "get_d converged");
            return Ok(d);
        }
    }

    Err(PricingError::ConvergenceFailure {
        computation: "get_d",
        iterations: MAX_ITERATIONS,
    })
}

/// Returns the shared scale of a non-empty, non-negative balance vector.
pub(crate) fn common_scale(balances: &[FixedPoint]) -> Result<Decimals> {
    let Some(first) = balances.first() else {
        return Err(PricingError::InvalidQuantity("balances must not be empty"));
    };
    for balance in balances {
        first.ensure_same_scale(balance)?;
        if balance.is_negative() {
            return Err(PricingError::InvalidQuantity("balances must not be negative"));
        }
    }
    Ok(first.scale())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::math::RecordingSink;

    fn tokens(n: u64) -> FixedPoint {
        FixedPoint::from_integer(n, Decimals::CANONICAL)
    }

    fn amp(a: u64) -> Amplification {
        let Ok(v) = Amplification::new(a) else {
            panic!("valid amplification");
        };
        v
    }

    #[test]
    fn balanced_pool_invariant_is_sum() {
        let Ok(d) = get_d(&[tokens(1_000_000), tokens(1_000_000)], amp(50)) else {
            panic!("expected Ok");
        };
        assert_eq!(d, tokens(2_000_000));
    }

    #[test]
    fn empty_pool_invariant_is_zero() {
        let Ok(d) = get_d(&[tokens(0), tokens(0)], amp(100)) else {
            panic!("expected Ok");
        };
        assert!(d.is_zero());
    }

    #[test]
    fn single_zero_balance_is_degenerate() {
        let Err(e) = get_d(&[tokens(0), tokens(5)], amp(100)) else {
            panic!("expected Err");
        };
        assert!(matches!(
            e,
            PricingError::ConvergenceFailure {
                computation: "get_d",
                ..
            }
        ));
    }

    #[test]
    fn imbalanced_invariant_below_sum() {
        let Ok(d) = get_d(&[tokens(1_500_000), tokens(500_000)], amp(100)) else {
            panic!("expected Ok");
        };
        let Ok(ordering) = d.try_cmp(&tokens(2_000_000)) else {
            panic!("same scale");
        };
        assert_eq!(ordering, core::cmp::Ordering::Less);
        let Ok(ordering) = d.try_cmp(&tokens(1_990_000)) else {
            panic!("same scale");
        };
        assert_eq!(ordering, core::cmp::Ordering::Greater);
    }

    #[test]
    fn three_coin_balanced_pool() {
        let Ok(d) = get_d(&[tokens(10), tokens(10), tokens(10)], amp(200)) else {
            panic!("expected Ok");
        };
        assert_eq!(d, tokens(30));
    }

    #[test]
    fn mismatched_scales_rejected() {
        let six = FixedPoint::from_integer(1, Decimals::REDUCED);
        let Err(e) = get_d(&[tokens(1), six], amp(10)) else {
            panic!("expected Err");
        };
        assert_eq!(e, PricingError::ScaleMismatch { left: 18, right: 6 });
    }

    #[test]
    fn negative_balance_rejected() {
        let Err(e) = get_d(&[tokens(1), tokens(1).negate()], amp(10)) else {
            panic!("expected Err");
        };
        assert!(matches!(e, PricingError::InvalidQuantity(_)));
    }

    #[test]
    fn empty_balances_rejected() {
        assert!(get_d(&[], amp(10)).is_err());
    }

    #[test]
    fn get_y_reference_swap() {
        // 1 000 tokens in against a balanced 1M/1M pool at A = 50.
        let balances = [tokens(1_000_000), tokens(1_000_000)];
        let Ok(x) = balances[0].add(&tokens(1_000)) else {
            panic!("same scale");
        };
        let Ok(y) = get_y(0, 1, &x, &balances, amp(50)) else {
            panic!("expected Ok");
        };
        assert_eq!(
            y,
            FixedPoint::from_raw(999_000_019_607_477_522_636_707u128, Decimals::CANONICAL)
        );
    }

    #[test]
    fn get_y_without_trade_returns_balance() {
        let balances = [tokens(700_000), tokens(1_300_000)];
        let Ok(y) = get_y(0, 1, &balances[0], &balances, amp(100)) else {
            panic!("expected Ok");
        };
        let Ok(diff) = y.subtract(&balances[1]) else {
            panic!("same scale");
        };
        assert!(diff.raw().abs() <= BigInt::from(2));
    }

    #[test]
    fn get_y_same_index_rejected() {
        let balances = [tokens(1), tokens(1)];
        let Err(e) = get_y(1, 1, &tokens(2), &balances, amp(10)) else {
            panic!("expected Err");
        };
        assert_eq!(
            e,
            PricingError::InvalidAssetIndex {
                i: 1,
                j: 1,
                n_coins: 2
            }
        );
    }

    #[test]
    fn get_y_out_of_range_rejected() {
        let balances = [tokens(1), tokens(1)];
        assert!(matches!(
            get_y(0, 2, &tokens(2), &balances, amp(10)),
            Err(PricingError::InvalidAssetIndex { .. })
        ));
        assert!(matches!(
            get_y(5, 0, &tokens(2), &balances, amp(10)),
            Err(PricingError::InvalidAssetIndex { .. })
        ));
    }

    #[test]
    fn get_y_non_positive_x_rejected() {
        let balances = [tokens(1), tokens(1)];
        assert!(matches!(
            get_y(0, 1, &tokens(0), &balances, amp(10)),
            Err(PricingError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn traced_run_records_iterates() {
        let sink = RecordingSink::new();
        let balances = [tokens(1_500_000), tokens(500_000)];
        let Ok(d) = get_d_traced(&balances, amp(100), &sink) else {
            panic!("expected Ok");
        };
        let entries = sink.entries();
        let Some(last) = entries.last() else {
            panic!("at least one iterate");
        };
        assert_eq!(last.label, "d");
        assert_eq!(last.value, d);
        assert!(last.location.file().ends_with("engine.rs"));
    }

    #[test]
    fn sink_does_not_change_result() {
        let balances = [tokens(1_234_567), tokens(891_011)];
        let sink = RecordingSink::new();
        assert_eq!(
            get_d(&balances, amp(300)),
            get_d_traced(&balances, amp(300), &sink)
        );
    }
}
