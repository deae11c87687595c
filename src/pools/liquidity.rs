//! Liquidity-event accounting.
//!
//! Deposits and imbalanced withdrawals charge a fee on each coin's
//! deviation from its ideal balance `D1 / D0 · old_balance`, then mint or
//! burn LP supply against the fee-adjusted invariant `D2`. Proportional
//! withdrawals are fee-free.
//!
//! | Operation | LP supply change |
//! |-----------|------------------|
//! | [`add_liquidity`](PoolState::add_liquidity) | `+ supply · (D2 − D0) / D0`, or `+ D1` on first deposit |
//! | [`remove_liquidity`](PoolState::remove_liquidity) | `− burn` |
//! | [`remove_liquidity_imbalance`](PoolState::remove_liquidity_imbalance) | `− (supply · (D0 − D2) / D0 + 1)` |

use num_bigint::BigInt;
use tracing::debug;

use super::pool_state::fee_portion;
use super::PoolState;
use crate::domain::FixedPoint;
use crate::error::{PricingError, Result};
use crate::invariant::get_d;

/// Result of a deposit or an imbalanced withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityOutcome {
    /// LP tokens minted (deposit) or burned (withdrawal).
    pub lp_amount: FixedPoint,
    /// Imbalance fee charged per coin.
    pub fees: Vec<FixedPoint>,
    /// Pool state after the event.
    pub pool: PoolState,
}

/// Result of a proportional withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Amount of each coin paid out.
    pub amounts: Vec<FixedPoint>,
    /// Pool state after the event.
    pub pool: PoolState,
}

/// Balances after charging imbalance fees.
struct FeeAdjusted {
    fees: Vec<FixedPoint>,
    /// Balances the pool stores: admin share of each fee removed.
    stored: Vec<FixedPoint>,
    /// Balances with the whole fee removed, used for `D2`.
    for_invariant: Vec<FixedPoint>,
}

impl PoolState {
    /// Estimates the LP amount minted or burned for `amounts`, ignoring
    /// fees.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InsufficientLiquidity`] on an empty pool.
    /// - [`PricingError::InvalidQuantity`] for a wrong number of amounts or
    ///   a withdrawal above a balance.
    /// - Propagates [`get_d`] errors.
    pub fn calc_token_amount(
        &self,
        amounts: &[FixedPoint],
        is_deposit: bool,
    ) -> Result<FixedPoint> {
        if self.is_empty() {
            return Err(PricingError::InsufficientLiquidity);
        }
        let d0 = self.invariant()?;
        let moved = self.moved_balances(amounts, is_deposit)?;
        let d1 = get_d(&moved, self.amplification())?;
        let diff = if is_deposit {
            d1.subtract(&d0)?
        } else {
            d0.subtract(&d1)?
        };
        self.total_supply().mul_div(&diff, &d0)
    }

    /// Deposits `amounts` and mints LP tokens.
    ///
    /// The first deposit into an empty pool mints `D1` and charges no fee;
    /// it requires every amount to be strictly positive.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidQuantity`] for a wrong number of amounts, a
    ///   negative amount, a non-positive first deposit, or a deposit that
    ///   does not grow the invariant.
    /// - [`PricingError::SlippageExceeded`] if fewer than `min_mint` LP
    ///   tokens would be minted.
    /// - Propagates [`get_d`] errors.
    pub fn add_liquidity(
        &self,
        amounts: &[FixedPoint],
        min_mint: &FixedPoint,
    ) -> Result<LiquidityOutcome> {
        let first_deposit = self.is_empty();
        if first_deposit && amounts.iter().any(|a| !a.is_positive()) {
            return Err(PricingError::InvalidQuantity(
                "initial deposit requires every coin",
            ));
        }

        let d0 = if first_deposit {
            FixedPoint::zero(self.scale())
        } else {
            self.invariant()?
        };
        let new_balances = self.moved_balances(amounts, true)?;
        let d1 = get_d(&new_balances, self.amplification())?;
        if d1.try_cmp(&d0)?.is_le() {
            return Err(PricingError::InvalidQuantity(
                "deposit must increase the invariant",
            ));
        }

        let (lp_amount, fees, stored) = if first_deposit {
            let fees = vec![FixedPoint::zero(self.scale()); self.n_coins()];
            (d1, fees, new_balances)
        } else {
            let adjusted = self.charge_imbalance_fee(&new_balances, &d0, &d1)?;
            let d2 = get_d(&adjusted.for_invariant, self.amplification())?;
            let minted = self.total_supply().mul_div(&d2.subtract(&d0)?, &d0)?;
            (minted, adjusted.fees, adjusted.stored)
        };

        if lp_amount.try_cmp(min_mint)?.is_lt() {
            return Err(PricingError::SlippageExceeded {
                actual: lp_amount,
                limit: min_mint.clone(),
            });
        }

        let supply = self.total_supply().add(&lp_amount)?;
        debug!(minted = %lp_amount, total_supply = %supply, "add_liquidity");
        Ok(LiquidityOutcome {
            lp_amount,
            fees,
            pool: self.with_balances(stored, supply),
        })
    }

    /// Burns `burn` LP tokens for a proportional share of every balance.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InsufficientLiquidity`] on an empty pool.
    /// - [`PricingError::InvalidQuantity`] if `burn` is negative, exceeds the
    ///   supply, or `min_amounts` has the wrong length.
    /// - [`PricingError::SlippageExceeded`] if a coin pays out less than its
    ///   minimum.
    pub fn remove_liquidity(
        &self,
        burn: &FixedPoint,
        min_amounts: &[FixedPoint],
    ) -> Result<Withdrawal> {
        if self.is_empty() {
            return Err(PricingError::InsufficientLiquidity);
        }
        self.ensure_len(min_amounts)?;
        if burn.is_negative() || burn.try_cmp(self.total_supply())?.is_gt() {
            return Err(PricingError::InvalidQuantity(
                "burn must be within the total supply",
            ));
        }

        let mut amounts = Vec::with_capacity(self.n_coins());
        let mut balances = Vec::with_capacity(self.n_coins());
        for (balance, min_amount) in self.balances().iter().zip(min_amounts) {
            let value = balance.mul_div(burn, self.total_supply())?;
            if value.try_cmp(min_amount)?.is_lt() {
                return Err(PricingError::SlippageExceeded {
                    actual: value,
                    limit: min_amount.clone(),
                });
            }
            balances.push(balance.subtract(&value)?);
            amounts.push(value);
        }

        let supply = self.total_supply().subtract(burn)?;
        debug!(burned = %burn, total_supply = %supply, "remove_liquidity");
        Ok(Withdrawal {
            amounts,
            pool: self.with_balances(balances, supply),
        })
    }

    /// Withdraws exactly `amounts`, burning LP tokens for the invariant
    /// lost plus the imbalance fee.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InsufficientLiquidity`] on an empty pool.
    /// - [`PricingError::InvalidQuantity`] for a wrong number of amounts, a
    ///   negative amount, a withdrawal above a balance, or a withdrawal that
    ///   burns nothing.
    /// - [`PricingError::SlippageExceeded`] if more than `max_burn` LP tokens
    ///   would be burned.
    /// - Propagates [`get_d`] errors.
    pub fn remove_liquidity_imbalance(
        &self,
        amounts: &[FixedPoint],
        max_burn: &FixedPoint,
    ) -> Result<LiquidityOutcome> {
        if self.is_empty() {
            return Err(PricingError::InsufficientLiquidity);
        }
        let d0 = self.invariant()?;
        let new_balances = self.moved_balances(amounts, false)?;
        let d1 = get_d(&new_balances, self.amplification())?;

        let adjusted = self.charge_imbalance_fee(&new_balances, &d0, &d1)?;
        let d2 = get_d(&adjusted.for_invariant, self.amplification())?;

        let lost = self.total_supply().mul_div(&d0.subtract(&d2)?, &d0)?;
        if lost.is_zero() {
            return Err(PricingError::InvalidQuantity("withdrawal burns nothing"));
        }
        let burned = lost.add(&FixedPoint::from_raw(1, self.scale()))?;
        if burned.try_cmp(max_burn)?.is_gt() {
            return Err(PricingError::SlippageExceeded {
                actual: burned,
                limit: max_burn.clone(),
            });
        }
        if burned.try_cmp(self.total_supply())?.is_gt() {
            return Err(PricingError::InvalidQuantity(
                "burn must be within the total supply",
            ));
        }

        let supply = self.total_supply().subtract(&burned)?;
        debug!(burned = %burned, total_supply = %supply, "remove_liquidity_imbalance");
        Ok(LiquidityOutcome {
            lp_amount: burned,
            fees: adjusted.fees,
            pool: self.with_balances(adjusted.stored, supply),
        })
    }

    /// Balances after adding (`deposit`) or removing each amount.
    fn moved_balances(&self, amounts: &[FixedPoint], deposit: bool) -> Result<Vec<FixedPoint>> {
        self.ensure_len(amounts)?;
        self.balances()
            .iter()
            .zip(amounts)
            .map(|(balance, amount)| {
                if amount.is_negative() {
                    return Err(PricingError::InvalidQuantity(
                        "amounts must not be negative",
                    ));
                }
                let moved = if deposit {
                    balance.add(amount)?
                } else {
                    balance.subtract(amount)?
                };
                if moved.is_negative() {
                    return Err(PricingError::InvalidQuantity(
                        "withdrawal exceeds balance",
                    ));
                }
                Ok(moved)
            })
            .collect()
    }

    fn ensure_len(&self, amounts: &[FixedPoint]) -> Result<()> {
        if amounts.len() != self.n_coins() {
            return Err(PricingError::InvalidQuantity(
                "expected one amount per coin",
            ));
        }
        Ok(())
    }

    /// Charges `fee · n / (4 · (n − 1))` on each coin's distance from its
    /// ideal balance `D1 · old / D0`.
    fn charge_imbalance_fee(
        &self,
        new_balances: &[FixedPoint],
        d0: &FixedPoint,
        d1: &FixedPoint,
    ) -> Result<FeeAdjusted> {
        let n_coins = self.n_coins();
        let fee_units = BigInt::from(self.fee().fee_units()) * BigInt::from(n_coins)
            / BigInt::from(4 * (n_coins - 1));
        let admin_units = self.admin_fee().fee_units();

        let mut adjusted = FeeAdjusted {
            fees: Vec::with_capacity(new_balances.len()),
            stored: Vec::with_capacity(new_balances.len()),
            for_invariant: Vec::with_capacity(new_balances.len()),
        };
        for (old, new) in self.balances().iter().zip(new_balances) {
            let ideal = d1.mul_div(old, d0)?;
            let difference = ideal.subtract(new)?.abs();
            let fee = fee_portion(&difference, fee_units.clone());
            adjusted
                .stored
                .push(new.subtract(&fee_portion(&fee, admin_units))?);
            adjusted.for_invariant.push(new.subtract(&fee)?);
            adjusted.fees.push(fee);
        }
        Ok(adjusted)
    }
}
