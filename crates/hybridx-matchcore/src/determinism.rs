//! Book state hashing for replay verification.
//!
//! Two books fed the same request sequence must rest the same orders in the
//! same queues. The book root is a SHA-256 over the next order id and every
//! resting order walked side by side, level by level, front to back.
//! Timestamps are excluded.

use hybridx_types::{Order, OrderSide};
use sha2::{Digest, Sha256};

use crate::HybridBook;

fn hash_order(hasher: &mut Sha256, order: &Order) {
    hasher.update(order.id.0.to_le_bytes());
    hasher.update(order.owner.as_bytes());
    hasher.update(order.to.as_bytes());
    hasher.update([order.side as u8]);
    hasher.update(order.price.to_le_bytes());
    hasher.update(order.amount_offered.to_le_bytes());
    hasher.update(order.amount_remaining.to_le_bytes());
    hasher.update((order.sequence_index as u64).to_le_bytes());
    hasher.update(order.subsidy_fee_rate.to_le_bytes());
}

/// Compute the root hash of a book's resting state.
#[must_use]
pub fn compute_book_root(book: &HybridBook) -> [u8; 32] {
    let orders = book.orders();
    let mut hasher = Sha256::new();
    hasher.update(b"hybridx:book_root:v1:");
    hasher.update(orders.next_order_id().0.to_le_bytes());
    hasher.update((orders.order_count() as u64).to_le_bytes());

    for side in [OrderSide::Buy, OrderSide::Sell] {
        for level in orders.side(side).iter_from_best() {
            hasher.update(level.price.to_le_bytes());
            hasher.update((level.len() as u64).to_le_bytes());
            for order in orders.orders_at(side, level.price) {
                hash_order(&mut hasher, order);
            }
        }
    }

    let root: [u8; 32] = hasher.finalize().into();
    tracing::trace!(root = %hex::encode(root), "Book root computed");
    root
}

/// Recompute the root and compare with `expected`.
#[must_use]
pub fn verify_book_root(book: &HybridBook, expected: &[u8; 32]) -> bool {
    compute_book_root(book) == *expected
}
