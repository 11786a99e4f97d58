//! Ordered index of price levels for one side of the book.
//!
//! Both sides share a `BTreeMap<Price, PriceLevel>`; the side decides the
//! walking direction:
//! - **Buy** levels: highest price first
//! - **Sell** levels: lowest price first

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use hybridx_types::{HybridxError, OrderId, OrderSide, Price, Result};

use crate::price_level::PriceLevel;

/// Price levels of one side, keyed by quantized price.
#[derive(Debug, Clone)]
pub struct PriceLevelIndex {
    side: OrderSide,
    levels: BTreeMap<Price, PriceLevel>,
}

impl PriceLevelIndex {
    #[must_use]
    pub fn new(side: OrderSide) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn side(&self) -> OrderSide {
        self.side
    }

    /// The best price for a taker: highest bid or lowest ask.
    #[must_use]
    pub fn best(&self) -> Option<Price> {
        match self.side {
            OrderSide::Buy => self.levels.keys().next_back().copied(),
            OrderSide::Sell => self.levels.keys().next().copied(),
        }
    }

    /// The next populated price strictly worse than `price` for a taker.
    ///
    /// `price` does not have to be a populated level.
    #[must_use]
    pub fn next(&self, price: Price) -> Option<Price> {
        match self.side {
            OrderSide::Buy => self.levels.range(..price).next_back().map(|(p, _)| *p),
            OrderSide::Sell => self
                .levels
                .range((Excluded(price), Unbounded))
                .next()
                .map(|(p, _)| *p),
        }
    }

    /// Queue `order_id` at `price`, creating the level if needed. Returns
    /// the order's position in the level.
    pub fn insert(&mut self, price: Price, order_id: OrderId) -> usize {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .push_back(order_id)
    }

    /// Remove `order_id` from `price`. Deletes the level once it is empty.
    /// Returns `false` if the order was not queued there.
    pub fn remove(&mut self, price: Price, order_id: OrderId) -> bool {
        let Some(level) = self.levels.get_mut(&price) else {
            return false;
        };
        let removed = level.remove(order_id);
        if level.is_empty() {
            self.levels.remove(&price);
        }
        removed
    }

    #[must_use]
    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Number of populated levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels from best to worst.
    pub fn iter_from_best(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            OrderSide::Buy => Box::new(self.levels.values().rev()),
            OrderSide::Sell => Box::new(self.levels.values()),
        }
    }
}

/// Snap `price` onto a multiple of `step`.
///
/// Bids round **down** and asks round **up**, so a maker never rests at a
/// price worse than the one it asked for.
pub fn quantize(side: OrderSide, price: Price, step: Price) -> Result<Price> {
    if step == 0 {
        return Err(HybridxError::DivisionByZero);
    }
    let floor = price / step * step;
    match side {
        OrderSide::Buy => Ok(floor),
        OrderSide::Sell if floor == price => Ok(price),
        OrderSide::Sell => floor
            .checked_add(step)
            .ok_or(HybridxError::ArithmeticOverflow),
    }
}
