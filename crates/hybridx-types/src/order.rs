//! Order types for the HybridX order book.
//!
//! A Buy order offers **quote** and receives base; a Sell order offers
//! **base** and receives quote. `amount_offered` and `amount_remaining` are
//! always denominated in the offered asset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, Asset, OrderId, Price};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side a taker on this side matches against.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Asset an order on this side escrows.
    #[must_use]
    pub fn offered_asset(self) -> Asset {
        match self {
            Self::Buy => Asset::Quote,
            Self::Sell => Asset::Base,
        }
    }

    /// Asset an order on this side receives when filled.
    #[must_use]
    pub fn received_asset(self) -> Asset {
        self.offered_asset().other()
    }

    /// Whether a taker on this side with `limit` accepts a resting price.
    ///
    /// Buy takers accept asks at or below their limit; sell takers accept
    /// bids at or above it.
    #[must_use]
    pub fn accepts(self, limit: Price, resting: Price) -> bool {
        match self {
            Self::Buy => resting <= limit,
            Self::Sell => resting >= limit,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A resting limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: AccountId,
    /// Beneficiary credited with the order's proceeds.
    pub to: AccountId,
    pub side: OrderSide,
    /// Limit price, already quantized to the book's price step.
    pub price: Price,
    pub amount_offered: Amount,
    pub amount_remaining: Amount,
    /// Position in its price level's queue when it was rested.
    pub sequence_index: usize,
    /// Maker subsidy rate (bps of the protocol fee) in force when the order
    /// rested. Later config changes do not touch it.
    pub subsidy_fee_rate: u32,
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.amount_remaining == 0
    }

    /// Offered quantity already consumed by matches.
    #[must_use]
    pub fn filled_amount(&self) -> Amount {
        self.amount_offered - self.amount_remaining
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy_limit(id: u64, side: OrderSide, price: Price, amount: Amount) -> Self {
        let owner = AccountId::new();
        Self {
            id: OrderId(id),
            owner,
            to: owner,
            side,
            price,
            amount_offered: amount,
            amount_remaining: amount,
            sequence_index: 0,
            subsidy_fee_rate: crate::constants::DEFAULT_SUBSIDY_FEE_RATE,
            created_at: Utc::now(),
        }
    }
}
