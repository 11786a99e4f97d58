//! # hybridx-settlement
//!
//! **Reference collaborators for the HybridX book.**
//!
//! The matching engine never owns balances or reserves. This crate provides
//! in-memory implementations of both boundaries so the engine can run end
//! to end:
//!
//! - [`Ledger`]: per-(account, asset) balances, atomic transfer batches
//! - [`ConstantProductPool`]: 0.3%-fee constant-product reserves
//! - [`SupplyConservation`]: `Σ balances == Σ deposits - Σ withdrawals`

pub mod ledger;
pub mod pool;
pub mod supply_conservation;

pub use ledger::Ledger;
pub use pool::ConstantProductPool;
pub use supply_conservation::SupplyConservation;
