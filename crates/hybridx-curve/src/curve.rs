//! Constant-product formulas with the pool's 0.3% input fee.
//!
//! Prices are quote per whole base unit scaled by `10^price_decimals`:
//! `price = reserve_quote * 10^d / reserve_base`.

use alloy_primitives::U256;
use hybridx_types::constants::{POOL_FEE_DENOMINATOR, POOL_FEE_NUMERATOR};
use hybridx_types::{Amount, HybridxError, OrderSide, Price, Reserves, Result};

use crate::fixed_point::{Rounding, isqrt, mul_div, mul_div_wide, narrow};

/// Result of solving the curve for a target price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePrice {
    /// Input the taker pays into the pool.
    pub amount_in: Amount,
    /// Output the pool pays back.
    pub amount_out: Amount,
    pub reserve_in_after: Amount,
    pub reserve_out_after: Amount,
}

impl MovePrice {
    fn unchanged(reserve_in: Amount, reserve_out: Amount) -> Self {
        Self {
            amount_in: 0,
            amount_out: 0,
            reserve_in_after: reserve_in,
            reserve_out_after: reserve_out,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount_in == 0
    }
}

fn wide(value: u128) -> U256 {
    U256::from(value)
}

fn checked_mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(HybridxError::ArithmeticOverflow)
}

fn checked_add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(HybridxError::ArithmeticOverflow)
}

/// Output for `amount_in`: `in*997*reserve_out / (reserve_in*1000 + in*997)`,
/// rounded down.
pub fn swap_out(amount_in: Amount, reserve_in: Amount, reserve_out: Amount) -> Result<Amount> {
    if amount_in == 0 || reserve_in == 0 || reserve_out == 0 {
        return Ok(0);
    }
    let in_with_fee = checked_mul(wide(amount_in), wide(POOL_FEE_NUMERATOR))?;
    let numerator = checked_mul(in_with_fee, wide(reserve_out))?;
    let denominator = checked_add(
        checked_mul(wide(reserve_in), wide(POOL_FEE_DENOMINATOR))?,
        in_with_fee,
    )?;
    narrow(numerator / denominator)
}

/// Input required to receive `amount_out`, rounded up.
pub fn swap_in(amount_out: Amount, reserve_in: Amount, reserve_out: Amount) -> Result<Amount> {
    if amount_out == 0 || reserve_in == 0 || reserve_out == 0 {
        return Ok(0);
    }
    if amount_out >= reserve_out {
        return Err(HybridxError::InsufficientLiquidity);
    }
    let numerator = checked_mul(
        checked_mul(wide(reserve_in), wide(amount_out))?,
        wide(POOL_FEE_DENOMINATOR),
    )?;
    let denominator = checked_mul(wide(reserve_out - amount_out), wide(POOL_FEE_NUMERATOR))?;
    narrow(mul_div_wide(numerator, U256::from(1u8), denominator, Rounding::Ceil)?)
}

/// Marginal pool price, rounded down. Zero when the base reserve is empty.
pub fn spot_price(reserves: Reserves, price_decimals: u32) -> Result<Price> {
    if reserves.base == 0 {
        return Ok(0);
    }
    let scale = 10u128
        .checked_pow(price_decimals)
        .ok_or(HybridxError::ArithmeticOverflow)?;
    mul_div(reserves.quote, scale, reserves.base, Rounding::Floor)
}

/// Solve for the trade that moves the pool's marginal price to `target_price`.
///
/// A buy pays quote in and moves the price up; a sell pays base in and moves
/// it down. With `r` the input reserve, `k` the product of the reserves and
/// `f = 997/1000`, the input `x` satisfies `(r + x)(r + f*x) = T` where
/// `T = k * target / 10^d` for a buy and `T = k * 10^d / target` for a sell.
/// Every rounding step leaves the pool at or just short of the target.
///
/// Returns zero amounts when a reserve or the target is zero, or when the
/// current price already satisfies the direction.
pub fn amount_to_move_price_to(
    side: OrderSide,
    reserve_base: Amount,
    reserve_quote: Amount,
    target_price: Price,
    price_decimals: u32,
) -> Result<MovePrice> {
    let (reserve_in, reserve_out) = Reserves::new(reserve_base, reserve_quote).in_out(side);
    if reserve_base == 0 || reserve_quote == 0 || target_price == 0 {
        return Ok(MovePrice::unchanged(reserve_in, reserve_out));
    }

    let current = spot_price(Reserves::new(reserve_base, reserve_quote), price_decimals)?;
    let needs_move = match side {
        OrderSide::Buy => current < target_price,
        OrderSide::Sell => current > target_price,
    };
    if !needs_move {
        return Ok(MovePrice::unchanged(reserve_in, reserve_out));
    }

    let scale = wide(
        10u128
            .checked_pow(price_decimals)
            .ok_or(HybridxError::ArithmeticOverflow)?,
    );
    let k = checked_mul(wide(reserve_base), wide(reserve_quote))?;
    let target_product = match side {
        OrderSide::Buy => mul_div_wide(k, wide(target_price), scale, Rounding::Floor)?,
        OrderSide::Sell => mul_div_wide(k, scale, wide(target_price), Rounding::Floor)?,
    };

    // n x^2 + (n + D) r x + D (r^2 - T) = 0, positive root:
    // x = (sqrt((D - n)^2 r^2 + 4 n D T) - (n + D) r) / 2n
    let n = wide(POOL_FEE_NUMERATOR);
    let d = wide(POOL_FEE_DENOMINATOR);
    let r = wide(reserve_in);
    let fee_gap = d - n;
    let discriminant = checked_add(
        checked_mul(checked_mul(fee_gap, fee_gap)?, checked_mul(r, r)?)?,
        checked_mul(checked_mul(U256::from(4u8), checked_mul(n, d)?)?, target_product)?,
    )?;
    let root = isqrt(discriminant);
    let offset = checked_mul(n + d, r)?;
    if root <= offset {
        return Ok(MovePrice::unchanged(reserve_in, reserve_out));
    }
    let amount_in = narrow((root - offset) / (U256::from(2u8) * n))?;
    if amount_in == 0 {
        return Ok(MovePrice::unchanged(reserve_in, reserve_out));
    }

    let amount_out = swap_out(amount_in, reserve_in, reserve_out)?;
    Ok(MovePrice {
        amount_in,
        amount_out,
        reserve_in_after: reserve_in
            .checked_add(amount_in)
            .ok_or(HybridxError::ArithmeticOverflow)?,
        reserve_out_after: reserve_out
            .checked_sub(amount_out)
            .ok_or(HybridxError::ArithmeticUnderflow)?,
    })
}

/// Fee-adjusted constant-product check for a swap:
/// `((r_in + in) * D - in * (D - n)) * (r_out - out) * D >= r_in * r_out * D^2`.
pub fn invariant_holds(
    reserve_in: Amount,
    reserve_out: Amount,
    amount_in: Amount,
    amount_out: Amount,
) -> Result<bool> {
    if amount_out > reserve_out {
        return Ok(false);
    }
    let n = wide(POOL_FEE_NUMERATOR);
    let d = wide(POOL_FEE_DENOMINATOR);
    let balance_in = checked_add(wide(reserve_in), wide(amount_in))?;
    let adjusted_in = checked_mul(balance_in, d)? - checked_mul(wide(amount_in), d - n)?;
    let adjusted_out = checked_mul(wide(reserve_out - amount_out), d)?;
    let after = checked_mul(adjusted_in, adjusted_out)?;
    let before = checked_mul(checked_mul(wide(reserve_in), wide(reserve_out))?, d * d)?;
    Ok(after >= before)
}
