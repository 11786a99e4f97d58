//! # hybridx-curve
//!
//! **Fixed-point math for the constant-product pool under the book.**
//!
//! Pure functions, no state:
//!
//! - [`mul_div`] with an explicit [`Rounding`] direction
//! - [`swap_out`] / [`swap_in`]: the 0.3%-fee constant-product formulas
//! - [`amount_to_move_price_to`]: the trade that moves the pool's marginal
//!   price to a target
//!
//! All intermediates are 256-bit; results are narrowed with checked
//! conversions so overflow surfaces as an error, never as a wrapped value.

pub mod curve;
pub mod fixed_point;

pub use curve::{
    MovePrice, amount_to_move_price_to, invariant_holds, spot_price, swap_in, swap_out,
};
pub use fixed_point::{Rounding, isqrt, mul_div, narrow};
