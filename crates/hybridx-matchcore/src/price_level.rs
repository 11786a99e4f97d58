//! A single price level in the order book.
//!
//! Orders at the same price are queued in FIFO order (time priority)
//! using a [`VecDeque`]. The level only holds ids; the orders themselves
//! are owned by the [`OrderBook`](crate::OrderBook).

use std::collections::VecDeque;

use hybridx_types::{OrderId, Price};

/// All orders resting at one quantized price.
///
/// The front of the queue has the highest time priority and is filled
/// first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLevel {
    /// The price at this level.
    pub price: Price,
    orders: VecDeque<OrderId>,
}

impl PriceLevel {
    /// Create a new empty price level.
    #[must_use]
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
        }
    }

    /// Add an order to the back of this level and return its queue position.
    pub fn push_back(&mut self, order_id: OrderId) -> usize {
        self.orders.push_back(order_id);
        self.orders.len() - 1
    }

    /// Remove a specific order. Returns `false` if it is not queued here.
    pub fn remove(&mut self, order_id: OrderId) -> bool {
        match self.orders.iter().position(|id| *id == order_id) {
            Some(pos) => self.orders.remove(pos).is_some(),
            None => false,
        }
    }

    /// Queued ids, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.orders.iter().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }
}
