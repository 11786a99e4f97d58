//! Shared harness: one book wired to an in-memory ledger and pool.

#![allow(dead_code)]

use hybridx_matchcore::{CancelReceipt, HybridBook, OrderReceipt, OrderRequest};
use hybridx_settlement::{ConstantProductPool, Ledger};
use hybridx_types::*;

pub const E18: u128 = 1_000_000_000_000_000_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn user(b: u8) -> AccountId {
    AccountId::from_byte(b)
}

pub fn admin() -> AccountId {
    AccountId::from_byte(0xad)
}

/// A book, its pool, and the ledger holding every balance.
pub struct Venue {
    pub book: HybridBook,
    pub ledger: Ledger,
    pub pool: ConstantProductPool,
}

impl Venue {
    pub fn new(config: BookConfig, base: Amount, quote: Amount) -> Self {
        init_tracing();
        let mut venue = Self {
            book: HybridBook::new(MarketPair::new("ETH", "USDC"), config).unwrap(),
            ledger: Ledger::new(),
            pool: ConstantProductPool::new(0, 0),
        };
        venue.add_liquidity(base, quote);
        venue
    }

    /// 18-decimal prices, default fees, finest step.
    pub fn with_pool(base: Amount, quote: Amount) -> Self {
        Self::new(BookConfig::new(admin()), base, quote)
    }

    /// Replace the pool with a fresh one holding the given reserves.
    pub fn add_liquidity(&mut self, base: Amount, quote: Amount) {
        let old = self.pool.reserves();
        self.ledger.withdraw(Account::Pool, Asset::Base, old.base).unwrap();
        self.ledger.withdraw(Account::Pool, Asset::Quote, old.quote).unwrap();
        self.ledger.deposit(Account::Pool, Asset::Base, base).unwrap();
        self.ledger.deposit(Account::Pool, Asset::Quote, quote).unwrap();
        self.pool = ConstantProductPool::new(base, quote);
    }

    pub fn fund(&mut self, account: AccountId, asset: Asset, amount: Amount) {
        self.ledger.deposit(Account::User(account), asset, amount).unwrap();
    }

    pub fn balance(&self, account: AccountId, asset: Asset) -> Amount {
        self.ledger.balance(Account::User(account), asset)
    }

    pub fn buy(&mut self, owner: AccountId, price: Price, amount: Amount) -> Result<OrderReceipt> {
        self.buy_request(OrderRequest::new(owner, price, amount))
    }

    pub fn sell(&mut self, owner: AccountId, price: Price, amount: Amount) -> Result<OrderReceipt> {
        self.sell_request(OrderRequest::new(owner, price, amount))
    }

    pub fn buy_request(&mut self, request: OrderRequest) -> Result<OrderReceipt> {
        self.book
            .create_buy_limit_order(&mut self.ledger, &mut self.pool, request)
    }

    pub fn sell_request(&mut self, request: OrderRequest) -> Result<OrderReceipt> {
        self.book
            .create_sell_limit_order(&mut self.ledger, &mut self.pool, request)
    }

    pub fn cancel(&mut self, caller: AccountId, order_id: OrderId) -> Result<CancelReceipt> {
        self.book.cancel_limit_order(&mut self.ledger, caller, order_id)
    }

    /// Ledger, pool, escrow and book agree with each other.
    pub fn assert_consistent(&self) {
        self.ledger.verify_supply().unwrap();

        let reserves = self.pool.reserves();
        assert_eq!(self.ledger.balance(Account::Pool, Asset::Base), reserves.base);
        assert_eq!(self.ledger.balance(Account::Pool, Asset::Quote), reserves.quote);

        let bids: Amount = self.book.market_book(OrderSide::Buy, usize::MAX).amounts.iter().sum();
        let asks: Amount = self.book.market_book(OrderSide::Sell, usize::MAX).amounts.iter().sum();
        assert_eq!(self.ledger.balance(Account::Escrow, Asset::Quote), bids, "quote escrow");
        assert_eq!(self.ledger.balance(Account::Escrow, Asset::Base), asks, "base escrow");

        if let (Some(bid), Some(ask)) = (
            self.book.best_price(OrderSide::Buy),
            self.book.best_price(OrderSide::Sell),
        ) {
            assert!(bid < ask, "crossed book: bid {bid} >= ask {ask}");
        }
    }
}
