//! # hybridx-types
//!
//! Shared types, errors, and configuration for the **HybridX** hybrid order
//! book: a price-level limit order book layered over a constant-product pool.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`AccountId`], [`MarketPair`]
//! - **Order model**: [`Order`], [`OrderSide`]
//! - **Events**: [`BookEvent`], [`Fill`], [`PoolLeg`]
//! - **Configuration**: [`BookConfig`], [`MarketConfig`]
//! - **Collaborator boundary**: [`Settlement`], [`LiquidityPool`], [`Transfer`], [`Reserves`]
//! - **Errors**: [`HybridxError`] with `HX_ERR_` prefix codes
//! - **Constants**: fee denominators and defaults

pub mod collaborator;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod order;

// Re-export all primary types at crate root:
//   use hybridx_types::{Order, OrderSide, BookEvent, Settlement, ...};

pub use collaborator::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use order::*;

/// Quantity of an asset in its smallest unit.
pub type Amount = u128;

/// Quote units per whole base unit, scaled by `10^price_decimals`.
pub type Price = u128;
