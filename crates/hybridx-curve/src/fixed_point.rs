//! Scaled-integer helpers with explicit rounding.

use alloy_primitives::U256;
use hybridx_types::{HybridxError, Result};

/// Direction of the final division in a fixed-point computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Toward zero. Used for amounts paid out.
    Floor,
    /// Away from zero. Used for amounts a payer must supply.
    Ceil,
}

/// `a * b / denominator` with a 256-bit intermediate product.
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Result<u128> {
    let quotient = mul_div_wide(U256::from(a), U256::from(b), U256::from(denominator), rounding)?;
    narrow(quotient)
}

/// 256-bit `a * b / denominator`.
pub(crate) fn mul_div_wide(a: U256, b: U256, denominator: U256, rounding: Rounding) -> Result<U256> {
    if denominator.is_zero() {
        return Err(HybridxError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(HybridxError::ArithmeticOverflow)?;
    let (quotient, remainder) = product.div_rem(denominator);
    match rounding {
        Rounding::Ceil if !remainder.is_zero() => quotient
            .checked_add(U256::from(1u8))
            .ok_or(HybridxError::ArithmeticOverflow),
        _ => Ok(quotient),
    }
}

/// Narrow a 256-bit value into an amount.
pub fn narrow(value: U256) -> Result<u128> {
    u128::try_from(value).map_err(|_| HybridxError::ArithmeticOverflow)
}

/// Floor integer square root (Babylonian method).
#[must_use]
pub fn isqrt(y: U256) -> U256 {
    if y > U256::from(3u8) {
        let mut z = y;
        let mut x = y / U256::from(2u8) + U256::from(1u8);
        while x < z {
            z = x;
            x = (y / x + x) / U256::from(2u8);
        }
        z
    } else if y.is_zero() {
        U256::ZERO
    } else {
        U256::from(1u8)
    }
}
