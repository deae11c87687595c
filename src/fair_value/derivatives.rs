//! Closed-form terms of the two-coin StableSwap curve.
//!
//! Solving the invariant for `y` given `x` gives
//!
//! ```text
//! y = (−(x·(a + x)) + r) / (2x),   r = √(x · (4b + x·(a + x)²))
//! a = D·A_PREC/(A·n) − D
//! b = Dⁿ⁺¹·A_PREC/(A·n²ⁿ⁻¹)
//! ```
//!
//! The marginal rate `−dy/dx` and its slope follow from that closed form.
//! Square roots run at 6 decimals and are rescaled to 18 afterwards: the
//! operands reach `D⁴` magnitudes and the reduced scale keeps the integer
//! square root tractable. The rescaling points fix the rounding, so every
//! term must be evaluated in exactly this order.
//!
//! All inputs are expected at the canonical 18-decimal scale.

use crate::domain::{Amplification, Decimals, FixedPoint, A_PRECISION};
use crate::error::Result;
use crate::math::{trace, TraceSink};

/// Number of coins the closed forms are derived for.
pub(crate) const N_COINS: u32 = 2;

/// `a = D·A_PREC/(A·n) − D`.
///
/// # Errors
///
/// Propagates fixed-point errors.
pub fn calc_a(d: &FixedPoint, amp: Amplification) -> Result<FixedPoint> {
    d.multiply_int(A_PRECISION)
        .divide_int(amp.precise() * u64::from(N_COINS))?
        .subtract(d)
}

/// `b = Dⁿ⁺¹·A_PREC/(A·n²ⁿ⁻¹)`.
///
/// # Errors
///
/// Propagates fixed-point errors.
pub fn calc_b(d: &FixedPoint, amp: Amplification) -> Result<FixedPoint> {
    d.pow(N_COINS + 1)
        .multiply_int(A_PRECISION)
        .divide_int(amp.precise() * u64::from(N_COINS.pow(2 * N_COINS - 1)))
}

/// `r = √x · √(4b + x·(a + x)²)`, evaluated at 6 decimals.
///
/// # Errors
///
/// - [`PricingError::NegativeSqrtOperand`](crate::error::PricingError::NegativeSqrtOperand)
///   if `x` or the radicand is negative.
/// - Propagates other fixed-point errors.
pub fn calc_r(x: &FixedPoint, b: &FixedPoint, a: &FixedPoint) -> Result<FixedPoint> {
    let x6 = x.downscale(Decimals::REDUCED)?;
    let b6 = b.downscale(Decimals::REDUCED)?;
    let a6 = a.downscale(Decimals::REDUCED)?;
    let radicand = b6
        .multiply_int(4)
        .add(&x6.multiply(&a6.add(&x6)?.pow(2))?)?;
    x6.sqrt()?
        .multiply(&radicand.sqrt()?)?
        .upscale(Decimals::CANONICAL)
}

/// Difference between the target rate `s` and the curve's marginal rate at
/// `x`:
///
/// ```text
/// f(x) = −s − (−2b + x·(a·x + x² − r)) / (2x·r)
/// ```
///
/// Zero where the pool's marginal exchange rate equals `s`.
///
/// # Errors
///
/// Propagates fixed-point errors, including
/// [`PricingError::DivisionByZero`](crate::error::PricingError::DivisionByZero)
/// when `x` vanishes at 6 decimals.
pub fn marginal_rate_error(
    d: &FixedPoint,
    amp: Amplification,
    x: &FixedPoint,
    s: &FixedPoint,
) -> Result<FixedPoint> {
    let a = calc_a(d, amp)?;
    let b = calc_b(d, amp)?;
    let r = calc_r(x, &b, &a)?;

    let bracket = a.multiply(x)?.add(&x.pow(2))?.subtract(&r)?;
    let numerator = b.multiply_int(-2).add(&x.multiply(&bracket)?)?;
    let denominator = x.multiply_int(2).multiply(&r)?;
    s.negate().subtract(&numerator.divide(&denominator)?)
}

/// Slope `f'(x)` of [`marginal_rate_error`]:
///
/// ```text
/// f'(x) = −2b·(3b + x·(a² + 3ax + 3x²)) / (x · (x·(4b + x·(a + x)²))^(3/2))
/// ```
///
/// expanded into four terms over `base = 4b + x·(a + x)²`, with `base`
/// held at 6 decimals.
///
/// # Errors
///
/// Propagates fixed-point errors.
pub fn marginal_rate_slope(
    d: &FixedPoint,
    amp: Amplification,
    x: &FixedPoint,
) -> Result<FixedPoint> {
    let a = calc_a(d, amp)?;
    let b = calc_b(d, amp)?;
    let a6 = a.downscale(Decimals::REDUCED)?;
    let b6 = b.downscale(Decimals::REDUCED)?;
    let x6 = x.downscale(Decimals::REDUCED)?;
    let base = b6
        .multiply_int(4)
        .add(&x6.multiply(&a6.add(&x6)?.pow(2))?)?;

    let t1 = b
        .multiply_int(6)
        .divide(x)?
        .divide(x)?
        .downscale(Decimals::REDUCED)?
        .multiply(&b6)?
        .divide(&base)?
        .upscale(Decimals::CANONICAL)?;
    let t2 = b
        .multiply_int(2)
        .divide(x)?
        .multiply(&a)?
        .divide(&base.upscale(Decimals::CANONICAL)?)?
        .multiply(&a)?;
    let six_b_over_base = b6
        .multiply_int(6)
        .divide(&base)?
        .upscale(Decimals::CANONICAL)?;
    let t3 = six_b_over_base.multiply(&a)?;
    let t4 = six_b_over_base.multiply(x)?;

    let numerator = t1.add(&t2)?.add(&t3)?.add(&t4)?;
    let denominator = x6
        .sqrt()?
        .multiply(&base.sqrt()?)?
        .upscale(Decimals::CANONICAL)?
        .negate();
    numerator.divide(&denominator)
}

/// One damped Newton step `x − f(x)/f'(x)`.
///
/// A step that would carry `x` to zero or below is replaced by `x / 2`.
/// Returns `None` when the slope truncates to zero at 18 decimals, which
/// happens for very large invariants.
///
/// # Errors
///
/// Propagates fixed-point errors.
pub fn next_iterate(
    d: &FixedPoint,
    amp: Amplification,
    x: &FixedPoint,
    s: &FixedPoint,
    sink: &dyn TraceSink,
) -> Result<Option<FixedPoint>> {
    let slope = marginal_rate_slope(d, amp, x)?;
    if slope.is_zero() {
        return Ok(None);
    }
    let error = marginal_rate_error(d, amp, x, s)?;
    let mut adjustment = error.divide(&slope)?;
    if adjustment.try_cmp(x)?.is_ge() {
        adjustment = x.divide_int(2)?;
    }
    trace(sink, "adjustment", &adjustment);
    x.subtract(&adjustment).map(Some)
}
