//! Resting-order state of a single book.
//!
//! - **Bids** and **asks**: one [`PriceLevelIndex`] per side
//! - **Orders**: `HashMap<OrderId, Order>`, the only owner of order data
//! - **Accounts**: `AccountId -> Vec<OrderId>` in creation order
//!
//! The index and the level queues only hold ids, so removing an order is a
//! map removal plus one queue scan at its level.

use std::collections::HashMap;

use hybridx_types::*;

use crate::price_index::PriceLevelIndex;
use crate::price_level::PriceLevel;

/// Resting orders of one market pair.
#[derive(Debug, Clone)]
pub struct OrderBook {
    bids: PriceLevelIndex,
    asks: PriceLevelIndex,
    orders: HashMap<OrderId, Order>,
    accounts: HashMap<AccountId, Vec<OrderId>>,
    next_id: OrderId,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bids: PriceLevelIndex::new(OrderSide::Buy),
            asks: PriceLevelIndex::new(OrderSide::Sell),
            orders: HashMap::new(),
            accounts: HashMap::new(),
            next_id: OrderId::FIRST,
        }
    }

    // =================================================================
    // Insertion
    // =================================================================

    /// The id the next rested order will receive.
    #[must_use]
    pub fn next_order_id(&self) -> OrderId {
        self.next_id
    }

    /// Rest a new order at the back of its level. The id is assigned here;
    /// `sequence_index` is set to the order's queue position.
    pub fn rest(&mut self, mut order: Order) -> OrderId {
        let id = self.next_id;
        self.next_id = id.next();
        order.id = id;
        order.sequence_index = self.side_mut(order.side).insert(order.price, id);
        self.accounts.entry(order.owner).or_default().push(id);
        self.orders.insert(id, order);
        id
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Remove an order from its level and from the order map.
    ///
    /// The account index is append-only and keeps the id.
    pub fn remove(&mut self, order_id: OrderId) -> Result<Order> {
        let order = self
            .orders
            .remove(&order_id)
            .ok_or(HybridxError::OrderNotFound(order_id))?;
        if !self.side_mut(order.side).remove(order.price, order_id) {
            return Err(HybridxError::Internal(format!(
                "{order_id} missing from its level {}",
                order.price
            )));
        }
        Ok(order)
    }

    /// Set the remaining amount of a resting order. Zero removes it.
    pub fn set_remaining(&mut self, order_id: OrderId, remaining: Amount) -> Result<()> {
        if remaining == 0 {
            return self.remove(order_id).map(|_| ());
        }
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(HybridxError::OrderNotFound(order_id))?;
        order.amount_remaining = remaining;
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Every order id ever rested by `account`, oldest first, including
    /// orders that have since been filled or cancelled.
    #[must_use]
    pub fn user_orders(&self, account: &AccountId) -> &[OrderId] {
        self.accounts.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn side(&self, side: OrderSide) -> &PriceLevelIndex {
        match side {
            OrderSide::Buy => &self.bids,
            OrderSide::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: OrderSide) -> &mut PriceLevelIndex {
        match side {
            OrderSide::Buy => &mut self.bids,
            OrderSide::Sell => &mut self.asks,
        }
    }

    #[must_use]
    pub fn best_price(&self, side: OrderSide) -> Option<Price> {
        self.side(side).best()
    }

    #[must_use]
    pub fn next_price(&self, side: OrderSide, price: Price) -> Option<Price> {
        self.side(side).next(price)
    }

    /// Resting orders at one level, oldest first.
    pub fn orders_at(&self, side: OrderSide, price: Price) -> impl Iterator<Item = &Order> + '_ {
        self.side(side)
            .level(price)
            .into_iter()
            .flat_map(PriceLevel::iter)
            .filter_map(|id| self.orders.get(&id))
    }

    /// Sum of `amount_remaining` at one level, in the side's offered asset.
    #[must_use]
    pub fn level_amount(&self, side: OrderSide, price: Price) -> Amount {
        self.orders_at(side, price)
            .map(|o| o.amount_remaining)
            .fold(0, Amount::saturating_add)
    }

    /// Total number of resting orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of populated levels on one side.
    #[must_use]
    pub fn level_count(&self, side: OrderSide) -> usize {
        self.side(side).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[must_use]
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.orders.contains_key(&order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest(book: &mut OrderBook, side: OrderSide, price: Price, amount: Amount) -> OrderId {
        book.rest(Order::dummy_limit(0, side, price, amount))
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut book = OrderBook::new();
        assert_eq!(book.next_order_id(), OrderId::FIRST);
        let a = rest(&mut book, OrderSide::Buy, 100, 5);
        let b = rest(&mut book, OrderSide::Sell, 101, 5);
        assert_eq!(a, OrderId(1));
        assert_eq!(b, OrderId(2));
        assert_eq!(book.next_order_id(), OrderId(3));
    }

    #[test]
    fn rest_records_queue_position() {
        let mut book = OrderBook::new();
        let a = rest(&mut book, OrderSide::Buy, 100, 5);
        let b = rest(&mut book, OrderSide::Buy, 100, 7);
        assert_eq!(book.order(a).unwrap().sequence_index, 0);
        assert_eq!(book.order(b).unwrap().sequence_index, 1);
        assert_eq!(book.level_amount(OrderSide::Buy, 100), 12);
        assert_eq!(book.level_count(OrderSide::Buy), 1);
    }

    #[test]
    fn best_and_next_per_side() {
        let mut book = OrderBook::new();
        rest(&mut book, OrderSide::Buy, 100, 1);
        rest(&mut book, OrderSide::Buy, 99, 1);
        rest(&mut book, OrderSide::Sell, 101, 1);
        rest(&mut book, OrderSide::Sell, 102, 1);
        assert_eq!(book.best_price(OrderSide::Buy), Some(100));
        assert_eq!(book.best_price(OrderSide::Sell), Some(101));
        assert_eq!(book.next_price(OrderSide::Buy, 100), Some(99));
        assert_eq!(book.next_price(OrderSide::Sell, 102), None);
        assert_eq!(book.order_count(), 4);
    }

    #[test]
    fn remove_cleans_level_but_keeps_account_history() {
        let mut book = OrderBook::new();
        let order = Order::dummy_limit(0, OrderSide::Sell, 10, 3);
        let owner = order.owner;
        let id = book.rest(order);

        let removed = book.remove(id).unwrap();
        assert_eq!(removed.amount_remaining, 3);
        assert!(book.is_empty());
        assert_eq!(book.level_count(OrderSide::Sell), 0);
        assert_eq!(book.user_orders(&owner), &[id]);
    }

    #[test]
    fn remove_unknown_order() {
        let mut book = OrderBook::new();
        assert_eq!(
            book.remove(OrderId(9)).unwrap_err(),
            HybridxError::OrderNotFound(OrderId(9))
        );
    }

    #[test]
    fn set_remaining_zero_removes() {
        let mut book = OrderBook::new();
        let id = rest(&mut book, OrderSide::Buy, 10, 8);
        book.set_remaining(id, 3).unwrap();
        assert_eq!(book.order(id).unwrap().amount_remaining, 3);
        book.set_remaining(id, 0).unwrap();
        assert!(!book.contains(id));
    }

    #[test]
    fn orders_at_is_fifo() {
        let mut book = OrderBook::new();
        let a = rest(&mut book, OrderSide::Sell, 10, 1);
        let b = rest(&mut book, OrderSide::Sell, 10, 2);
        let ids: Vec<OrderId> = book.orders_at(OrderSide::Sell, 10).map(|o| o.id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(book.orders_at(OrderSide::Sell, 11).count(), 0);
    }

    #[test]
    fn user_orders_unknown_account_is_empty() {
        let book = OrderBook::new();
        assert!(book.user_orders(&AccountId::from_byte(3)).is_empty());
    }
}
