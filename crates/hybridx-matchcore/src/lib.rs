//! # hybridx-matchcore
//!
//! **Matching engine for the HybridX hybrid order book.**
//!
//! A price-level limit order book per market pair, layered over a
//! constant-product pool for the same pair:
//!
//! - **Price/time priority**: `BTreeMap` levels, FIFO queues inside a level
//! - **Pool interleaving**: at every price, pool liquidity priced at or
//!   better than a resting level is consumed before that level
//! - **Plan, then commit**: a request is planned without side effects, then
//!   settled in one atomic transfer batch
//! - **Deterministic state**: same request sequence -> same book root

pub mod depth;
pub mod determinism;
pub mod engine;
pub mod fees;
pub mod matcher;
pub mod orderbook;
pub mod price_index;
pub mod price_level;
pub mod registry;

pub use depth::{BookSnapshot, Depth};
pub use determinism::{compute_book_root, verify_book_root};
pub use engine::{CancelReceipt, HybridBook, OrderReceipt, OrderRequest, SwapQuote};
pub use fees::{FeeBreakdown, FeeLedger, FeeSchedule};
pub use matcher::{MatchPlan, MatchRequest, MatchStep, plan, plan_swap};
pub use orderbook::OrderBook;
pub use price_index::{PriceLevelIndex, quantize};
pub use price_level::PriceLevel;
pub use registry::Markets;
