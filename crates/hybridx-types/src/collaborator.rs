//! Boundary with the collaborators the core calls into.
//!
//! The book never owns token balances or pool reserves. It plans a request
//! against a read-only view, then asks the [`LiquidityPool`] to execute pool
//! legs and the [`Settlement`] collaborator to move tokens in one atomic
//! batch of [`Transfer`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, OrderSide, Result};

/// One of the two assets of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Asset {
    Base,
    Quote,
}

impl Asset {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Base => Self::Quote,
            Self::Quote => Self::Base,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "BASE"),
            Self::Quote => write!(f, "QUOTE"),
        }
    }
}

/// A balance holder known to the settlement collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Account {
    /// A trader.
    User(AccountId),
    /// Funds held by the book on behalf of resting and in-flight orders.
    Escrow,
    /// The pool's token balances.
    Pool,
    /// Protocol fee recipient.
    Protocol,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{}", id.short()),
            Self::Escrow => write!(f, "escrow"),
            Self::Pool => write!(f, "pool"),
            Self::Protocol => write!(f, "protocol"),
        }
    }
}

/// A single token movement requested by the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Account,
    pub to: Account,
    pub asset: Asset,
    pub amount: Amount,
}

impl Transfer {
    #[must_use]
    pub fn new(from: Account, to: Account, asset: Asset, amount: Amount) -> Self {
        Self {
            from,
            to,
            asset,
            amount,
        }
    }
}

/// Token ledger used to escrow offers, pay fills, and refund cancellations.
pub trait Settlement {
    /// Verify that `transfers`, applied in order, would all succeed.
    /// Must not mutate any balance.
    fn check(&self, transfers: &[Transfer]) -> Result<()>;

    /// Apply every transfer in order, or none of them.
    fn apply(&mut self, transfers: &[Transfer]) -> Result<()>;

    /// Current balance of `account` in `asset`.
    fn balance(&self, account: Account, asset: Asset) -> Amount;
}

/// Pool reserves as seen by the book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
    pub base: Amount,
    pub quote: Amount,
}

impl Reserves {
    #[must_use]
    pub fn new(base: Amount, quote: Amount) -> Self {
        Self { base, quote }
    }

    #[must_use]
    pub fn of(&self, asset: Asset) -> Amount {
        match asset {
            Asset::Base => self.base,
            Asset::Quote => self.quote,
        }
    }

    /// `(reserve_in, reserve_out)` for a taker on `side`.
    #[must_use]
    pub fn in_out(&self, side: OrderSide) -> (Amount, Amount) {
        let asset_in = side.offered_asset();
        (self.of(asset_in), self.of(asset_in.other()))
    }

    /// Rebuild reserves from the `(reserve_in, reserve_out)` view of `side`.
    #[must_use]
    pub fn from_in_out(side: OrderSide, reserve_in: Amount, reserve_out: Amount) -> Self {
        match side {
            OrderSide::Buy => Self::new(reserve_out, reserve_in),
            OrderSide::Sell => Self::new(reserve_in, reserve_out),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base == 0 || self.quote == 0
    }
}

/// A swap the book asks the pool to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub asset_in: Asset,
    pub amount_in: Amount,
    /// The pool must reject the swap rather than pay out less than this.
    pub min_amount_out: Amount,
}

/// Constant-product liquidity for the same pair as the book.
pub trait LiquidityPool {
    fn reserves(&self) -> Reserves;

    /// Execute a swap and return the output amount. Implementations validate
    /// the request completely before touching their reserves and must keep
    /// the fee-adjusted constant product non-decreasing.
    fn swap(&mut self, request: SwapRequest) -> Result<Amount>;
}
