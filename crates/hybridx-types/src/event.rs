//! Events emitted by book operations.
//!
//! Every mutating operation returns the events it produced, in the order
//! they happened. Amounts in `OrderCreated` / `OrderCanceled` are in the
//! order's offered asset.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, Asset, OrderId, OrderSide, Price};

/// A fill between an incoming taker and one resting maker order.
///
/// Fills always execute at the maker's price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub maker_order_id: OrderId,
    pub maker_owner: AccountId,
    pub taker_owner: AccountId,
    pub taker_side: OrderSide,
    pub price: Price,
    /// Base units exchanged.
    pub base_amount: Amount,
    /// Quote units exchanged.
    pub quote_amount: Amount,
    /// Fee taken from the taker's proceeds (in the taker's received asset).
    pub protocol_fee: Amount,
    /// Portion of `protocol_fee` credited to the maker.
    pub subsidy: Amount,
}

impl Fill {
    /// Asset the taker receives and pays the fee in.
    #[must_use]
    pub fn fee_asset(&self) -> Asset {
        self.taker_side.received_asset()
    }

    /// Amount of the taker's offered asset consumed by this fill.
    #[must_use]
    pub fn taker_consumed(&self) -> Amount {
        match self.taker_side {
            OrderSide::Buy => self.quote_amount,
            OrderSide::Sell => self.base_amount,
        }
    }
}

/// One swap against pool liquidity, moving the pool price toward a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolLeg {
    pub asset_in: Asset,
    pub amount_in: Amount,
    pub amount_out: Amount,
    /// Price the leg was solved toward (a resting level or the limit price).
    /// `None` when the leg swapped the whole remainder with no bound.
    pub target_price: Option<Price>,
}

/// Events emitted by book operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookEvent {
    /// A create-order request completed. `amount_remaining` is what rested
    /// after matching; `order_id` is `None` when nothing rested.
    OrderCreated {
        owner: AccountId,
        to: AccountId,
        amount_offered: Amount,
        amount_remaining: Amount,
        price: Price,
        side: OrderSide,
        order_id: Option<OrderId>,
    },
    /// A resting order was cancelled and its remainder refunded.
    OrderCanceled {
        owner: AccountId,
        to: AccountId,
        amount_offered: Amount,
        amount_refunded: Amount,
        price: Price,
        side: OrderSide,
        order_id: OrderId,
    },
    /// A maker order matched.
    OrderFilled(Fill),
    /// Pool liquidity was consumed.
    PoolSwapped(PoolLeg),
    /// A maker order too small to trade at its own price was removed and its
    /// residue refunded.
    OrderClosed {
        order_id: OrderId,
        owner: AccountId,
        amount_refunded: Amount,
    },
    /// An administrator changed a configuration value.
    ConfigUpdated { field: ConfigField, old: u128, new: u128 },
}

/// Identifies the configuration value changed by an admin operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigField {
    PriceStep,
    MinAmount,
    ProtocolFeeRate,
    SubsidyFeeRate,
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PriceStep => write!(f, "price_step"),
            Self::MinAmount => write!(f, "min_amount"),
            Self::ProtocolFeeRate => write!(f, "protocol_fee_rate"),
            Self::SubsidyFeeRate => write!(f, "subsidy_fee_rate"),
        }
    }
}
