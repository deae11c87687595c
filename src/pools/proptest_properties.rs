//! Property-based tests using `proptest` for invariant and solver
//! validation.
//!
//! 1. **Scale discipline**: mixed-scale `add`/`subtract` fail.
//! 2. **Rescale round-trip**: `upscale` then `downscale` is lossless.
//! 3. **Symmetric invariant**: `get_d([b, b]) == 2b`.
//! 4. **Degenerate pool**: `get_d([0, 0]) == 0`.
//! 5. **Swap conservation**: `D` moves by at most one unit across a swap.
//! 6. **Liquidity round-trip**: deposit then proportional withdrawal never
//!    returns more than was deposited, and loses at most the charged fees
//!    beyond the fee-less estimate.
//! 7. **Fair-value monotonicity**: raising `s` lowers the synthetic balance
//!    of coin A and raises that of coin B.

use num_bigint::BigInt;
use num_traits::Signed;
use proptest::prelude::*;

use crate::domain::{Amplification, BasisPoints, Decimals, FixedPoint, PriceRatio};
use crate::error::PricingError;
use crate::fair_value::{calc_y_from_x, solve_synthetic_balance};
use crate::invariant::{get_d, get_y};
use crate::math::NoopSink;
use crate::pools::PoolState;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn tokens(n: u64) -> FixedPoint {
    FixedPoint::from_integer(n, Decimals::CANONICAL)
}

fn decimals(d: u8) -> Decimals {
    let Ok(d) = Decimals::new(d) else {
        panic!("valid decimals");
    };
    d
}

fn amp(a: u64) -> Amplification {
    let Ok(amp) = Amplification::new(a) else {
        panic!("valid amplification");
    };
    amp
}

fn balanced_pool(a: u64, balance: u64, fee: u32, admin_fee: u32) -> PoolState {
    let Ok(pool) = PoolState::new(
        amp(a),
        vec![tokens(balance), tokens(balance)],
        tokens(balance * 2),
        BasisPoints::new(fee),
        BasisPoints::new(admin_fee),
    ) else {
        panic!("valid pool");
    };
    pool
}

fn sum(values: &[FixedPoint]) -> BigInt {
    values.iter().map(|v| v.raw().clone()).sum()
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Balances in whole tokens, [1_000, 1_000_000_000].
fn balance_strategy() -> impl Strategy<Value = u64> {
    1_000u64..=1_000_000_000u64
}

/// Plain amplification in [1, 5_000].
fn amplification_strategy() -> impl Strategy<Value = u64> {
    1u64..=5_000u64
}

/// Fee in basis points, [0, 100].
fn fee_strategy() -> impl Strategy<Value = u32> {
    0u32..=100u32
}

// ---------------------------------------------------------------------------
// Property 1-2: Fixed-point scale handling
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_mixed_scales_rejected(
        a in any::<i64>(),
        b in any::<i64>(),
        da in 0u8..=18u8,
        db in 0u8..=18u8,
    ) {
        prop_assume!(da != db);
        let x = FixedPoint::from_raw(a, decimals(da));
        let y = FixedPoint::from_raw(b, decimals(db));
        let mismatch = PricingError::ScaleMismatch { left: da, right: db };
        prop_assert_eq!(x.add(&y), Err(mismatch.clone()));
        prop_assert_eq!(x.subtract(&y), Err(mismatch));
    }

    #[test]
    fn prop_rescale_round_trip(
        raw in any::<i64>(),
        low in 0u8..18u8,
        gap in 1u8..=18u8,
    ) {
        let high = low.saturating_add(gap).min(18);
        prop_assume!(high > low);
        let v = FixedPoint::from_raw(raw, decimals(low));
        let Ok(up) = v.upscale(decimals(high)) else {
            panic!("upscale to more decimals");
        };
        prop_assert_eq!(up.downscale(decimals(low)), Ok(v));
    }
}

// ---------------------------------------------------------------------------
// Property 3-5: Invariant engine
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_symmetric_invariant(
        balance in balance_strategy(),
        a in amplification_strategy(),
    ) {
        let b = tokens(balance);
        let Ok(d) = get_d(&[b.clone(), b], amp(a)) else {
            panic!("balanced pool converges");
        };
        prop_assert_eq!(d, tokens(balance * 2));
    }

    #[test]
    fn prop_degenerate_pool(a in amplification_strategy()) {
        let zero = tokens(0);
        prop_assert_eq!(get_d(&[zero.clone(), zero], amp(a)), Ok(tokens(0)));
    }

    #[test]
    fn prop_swap_conserves_invariant(
        x0 in balance_strategy(),
        ratio_pct in 50u64..=200u64,
        dx_permille in 1u64..=100u64,
        a in amplification_strategy(),
    ) {
        let y0 = x0 * ratio_pct / 100;
        let balances = [tokens(x0), tokens(y0)];
        let dx = tokens((x0 * dx_permille / 1_000).max(1));
        let Ok(x1) = balances[0].add(&dx) else {
            panic!("same scale");
        };

        let Ok(d0) = get_d(&balances, amp(a)) else {
            panic!("D converges");
        };
        let Ok(y1) = get_y(0, 1, &x1, &balances, amp(a)) else {
            panic!("y converges");
        };
        let Ok(d1) = get_d(&[x1, y1], amp(a)) else {
            panic!("D converges after swap");
        };
        let drift = (d1.raw() - d0.raw()).abs();
        prop_assert!(drift <= BigInt::from(1), "D drifted by {}", drift);
    }
}

// ---------------------------------------------------------------------------
// Property 6: Liquidity round-trip
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_balanced_deposit_round_trip_is_exact(
        balance in balance_strategy(),
        deposit_permille in 1u64..=100u64,
        a in amplification_strategy(),
        fee in fee_strategy(),
    ) {
        let pool = balanced_pool(a, balance, fee, 5_000);
        let d = tokens((balance * deposit_permille / 1_000).max(1));
        let zero = tokens(0);

        let Ok(deposit) = pool.add_liquidity(&[d.clone(), d.clone()], &zero) else {
            panic!("deposit accepted");
        };
        let Ok(withdrawal) = deposit
            .pool
            .remove_liquidity(&deposit.lp_amount, &[zero.clone(), zero])
        else {
            panic!("withdrawal accepted");
        };
        prop_assert_eq!(withdrawal.amounts, vec![d.clone(), d]);
    }

    #[test]
    fn prop_imbalanced_deposit_round_trip_is_fee_bounded(
        balance in balance_strategy(),
        p0 in 0u64..=100u64,
        p1 in 0u64..=100u64,
        a in amplification_strategy(),
        fee in fee_strategy(),
        admin_fee in 0u32..=10_000u32,
    ) {
        prop_assume!(p0 + p1 > 0);
        let pool = balanced_pool(a, balance, fee, admin_fee);
        let amounts = [tokens(balance * p0 / 1_000), tokens(balance * p1 / 1_000)];
        prop_assume!(amounts.iter().any(FixedPoint::is_positive));
        let zero = tokens(0);

        // Supply equals D here, so one LP token is worth one coin.
        let Ok(estimate) = pool.calc_token_amount(&amounts, true) else {
            panic!("estimate accepted");
        };
        let Ok(deposit) = pool.add_liquidity(&amounts, &zero) else {
            panic!("deposit accepted");
        };
        let Ok(withdrawal) = deposit
            .pool
            .remove_liquidity(&deposit.lp_amount, &[zero.clone(), zero])
        else {
            panic!("withdrawal accepted");
        };
        let returned = sum(&withdrawal.amounts);
        let deposited = sum(&amounts);
        prop_assert!(
            returned <= deposited,
            "round-trip profited: returned={} > deposited={}",
            returned, deposited
        );

        // Slippage is what the fee-less estimate already misses;
        // beyond it only the charged fees and truncation may be lost.
        let floor = estimate.raw() - sum(&deposit.fees) - BigInt::from(2);
        prop_assert!(
            returned >= floor,
            "round-trip lost more than fees: returned={} < floor={}",
            returned, floor
        );
    }
}

// ---------------------------------------------------------------------------
// Property 7: Fair-value monotonicity
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_fair_value_monotone_in_price_ratio(
        d_tokens in 1_000_000u64..=1_000_000_000u64,
        a in 10u64..=1_000u64,
        low_permille in 900u64..1_100u64,
        step in 1u64..=200u64,
    ) {
        let high_permille = (low_permille + step).min(1_100);
        prop_assume!(high_permille > low_permille);
        let d = tokens(d_tokens);

        let solve = |permille: u64| {
            let s = FixedPoint::from_raw(
                BigInt::from(permille) * BigInt::from(10u64.pow(15)),
                Decimals::CANONICAL,
            );
            let Ok(ratio) = PriceRatio::new(s) else {
                panic!("positive ratio");
            };
            let Ok(x) = solve_synthetic_balance(&d, amp(a), ratio.value(), &NoopSink) else {
                panic!("solver ran");
            };
            let Ok(y) = calc_y_from_x(&x.value, amp(a), &d, &NoopSink) else {
                panic!("counterparty solved");
            };
            (x.value, y.value)
        };

        let (x_low, y_low) = solve(low_permille);
        let (x_high, y_high) = solve(high_permille);
        prop_assert!(x_high.raw() < x_low.raw());
        prop_assert!(y_high.raw() > y_low.raw());
    }
}
