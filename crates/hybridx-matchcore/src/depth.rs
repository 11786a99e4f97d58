//! Aggregated depth queries.
//!
//! Amounts are summed `amount_remaining` per level, so bid depth is in quote
//! and ask depth in base.

use std::sync::Arc;

use hybridx_types::{Amount, OrderSide, Price};

use crate::OrderBook;

/// Price levels best-first with their aggregated amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Depth {
    pub prices: Vec<Price>,
    pub amounts: Vec<Amount>,
}

impl Depth {
    fn push(&mut self, price: Price, amount: Amount) {
        self.prices.push(price);
        self.amounts.push(amount);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// `(price, amount)` pairs, best first.
    pub fn iter(&self) -> impl Iterator<Item = (Price, Amount)> + '_ {
        self.prices.iter().copied().zip(self.amounts.iter().copied())
    }
}

/// Whether `price` is still inside the bound of a range query.
fn within(side: OrderSide, price: Price, bound: Price) -> bool {
    match side {
        OrderSide::Buy => price >= bound,
        OrderSide::Sell => price <= bound,
    }
}

fn collect_levels(levels: impl Iterator<Item = (Price, Amount)>) -> Depth {
    let mut depth = Depth::default();
    for (price, amount) in levels {
        depth.push(price, amount);
    }
    depth
}

impl OrderBook {
    fn aggregated(&self, side: OrderSide) -> impl Iterator<Item = (Price, Amount)> + '_ {
        self.side(side)
            .iter_from_best()
            .map(move |level| (level.price, self.level_amount(side, level.price)))
    }

    /// Up to `max_levels` levels of `side`, best first.
    #[must_use]
    pub fn market_book(&self, side: OrderSide, max_levels: usize) -> Depth {
        collect_levels(self.aggregated(side).take(max_levels))
    }

    /// Levels of `side` from the best price while bids stay `>= bound` and
    /// asks `<= bound`.
    #[must_use]
    pub fn range_book(&self, side: OrderSide, bound: Price) -> Depth {
        collect_levels(
            self.aggregated(side)
                .take_while(|(price, _)| within(side, *price, bound)),
        )
    }

    /// Owned copy of the aggregated levels of both sides.
    #[must_use]
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            bids: Arc::new(self.aggregated(OrderSide::Buy).collect()),
            asks: Arc::new(self.aggregated(OrderSide::Sell).collect()),
            order_count: self.order_count(),
        }
    }
}

/// Immutable view of a book's depth taken at one point in time.
///
/// Cloning is cheap and the snapshot can be sent to reader threads; it does
/// not change when the book does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSnapshot {
    bids: Arc<Vec<(Price, Amount)>>,
    asks: Arc<Vec<(Price, Amount)>>,
    order_count: usize,
}

impl BookSnapshot {
    fn levels(&self, side: OrderSide) -> &[(Price, Amount)] {
        match side {
            OrderSide::Buy => &self.bids,
            OrderSide::Sell => &self.asks,
        }
    }

    #[must_use]
    pub fn best_price(&self, side: OrderSide) -> Option<Price> {
        self.levels(side).first().map(|(price, _)| *price)
    }

    #[must_use]
    pub fn market_book(&self, side: OrderSide, max_levels: usize) -> Depth {
        collect_levels(self.levels(side).iter().copied().take(max_levels))
    }

    #[must_use]
    pub fn range_book(&self, side: OrderSide, bound: Price) -> Depth {
        collect_levels(
            self.levels(side)
                .iter()
                .copied()
                .take_while(|(price, _)| within(side, *price, bound)),
        )
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.order_count
    }
}
