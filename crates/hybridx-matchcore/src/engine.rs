//! The hybrid book of one market pair.
//!
//! [`HybridBook`] owns the resting orders, configuration and fee totals. It
//! does not own balances or pool reserves: every mutating operation takes the
//! [`Settlement`] and [`LiquidityPool`] collaborators by `&mut`.
//!
//! ## Commit order
//!
//! 1. Validate and quantize the request
//! 2. Plan it against the book and a reserves snapshot (no side effects)
//! 3. `settlement.check` the full transfer batch
//! 4. Execute pool legs (each is validated by the pool before it mutates)
//! 5. `settlement.apply` the batch
//! 6. Apply book mutations and fee totals
//!
//! Any failure up to step 4's first leg leaves every component untouched.

use chrono::Utc;
use hybridx_curve::{MovePrice, spot_price};
use hybridx_types::*;

use crate::depth::{BookSnapshot, Depth};
use crate::fees::FeeLedger;
use crate::OrderBook;
use crate::matcher::{self, MatchPlan, MatchRequest, MatchStep};
use crate::price_index::quantize;

/// A limit order as submitted by a trader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequest {
    pub owner: AccountId,
    /// Beneficiary of the proceeds. Refunds always go to `owner`.
    pub to: AccountId,
    /// Limit price before quantization.
    pub price: Price,
    /// Offered amount: quote for a buy, base for a sell.
    pub amount: Amount,
}

impl OrderRequest {
    /// Request whose proceeds go to `owner`.
    #[must_use]
    pub fn new(owner: AccountId, price: Price, amount: Amount) -> Self {
        Self {
            owner,
            to: owner,
            price,
            amount,
        }
    }

    #[must_use]
    pub fn with_beneficiary(mut self, to: AccountId) -> Self {
        self.to = to;
        self
    }
}

/// Outcome of a create-order request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    /// Id of the resting remainder, `None` when nothing rested.
    pub order_id: Option<OrderId>,
    pub side: OrderSide,
    /// Quantized limit price.
    pub price: Price,
    pub amount_offered: Amount,
    pub pool_consumed: Amount,
    pub book_consumed: Amount,
    pub amount_resting: Amount,
    pub amount_refunded: Amount,
    /// Received asset credited to the beneficiary, net of fees.
    pub amount_received: Amount,
    pub events: Vec<BookEvent>,
}

impl OrderReceipt {
    /// `amount_offered == pool + book + resting + refunded`.
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        [
            self.pool_consumed,
            self.book_consumed,
            self.amount_resting,
            self.amount_refunded,
        ]
        .into_iter()
        .try_fold(0u128, u128::checked_add)
            == Some(self.amount_offered)
    }

    pub fn fills(&self) -> impl Iterator<Item = &Fill> + '_ {
        self.events.iter().filter_map(|e| match e {
            BookEvent::OrderFilled(fill) => Some(fill),
            _ => None,
        })
    }
}

/// Outcome of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelReceipt {
    /// The order as it was removed.
    pub order: Order,
    pub amount_refunded: Amount,
    pub event: BookEvent,
}

/// Result of a read-only swap quote across the book and the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapQuote {
    /// Input the swap would consume.
    pub amount_in: Amount,
    /// Output delivered, net of protocol fees on book fills.
    pub amount_out: Amount,
    /// Input (out-quotes) or output (in-quotes) that cannot be matched.
    pub amount_left: Amount,
    pub reserves_after: Reserves,
}

/// Limit order book of one pair layered over that pair's pool.
#[derive(Debug, Clone)]
pub struct HybridBook {
    market: MarketPair,
    config: BookConfig,
    book: OrderBook,
    fees: FeeLedger,
}

impl HybridBook {
    pub fn new(market: MarketPair, config: BookConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            market = %market,
            price_step = config.price_step,
            min_amount = config.min_amount,
            "Book opened"
        );
        Ok(Self {
            market,
            config,
            book: OrderBook::new(),
            fees: FeeLedger::new(),
        })
    }

    // =================================================================
    // Order entry
    // =================================================================

    /// Buy base with `request.amount` quote, up to `request.price`.
    pub fn create_buy_limit_order<S, P>(
        &mut self,
        settlement: &mut S,
        pool: &mut P,
        request: OrderRequest,
    ) -> Result<OrderReceipt>
    where
        S: Settlement,
        P: LiquidityPool,
    {
        self.create_limit_order(settlement, pool, OrderSide::Buy, request)
    }

    /// Sell `request.amount` base, down to `request.price`.
    pub fn create_sell_limit_order<S, P>(
        &mut self,
        settlement: &mut S,
        pool: &mut P,
        request: OrderRequest,
    ) -> Result<OrderReceipt>
    where
        S: Settlement,
        P: LiquidityPool,
    {
        self.create_limit_order(settlement, pool, OrderSide::Sell, request)
    }

    fn create_limit_order<S, P>(
        &mut self,
        settlement: &mut S,
        pool: &mut P,
        side: OrderSide,
        request: OrderRequest,
    ) -> Result<OrderReceipt>
    where
        S: Settlement,
        P: LiquidityPool,
    {
        let price = self.validate(side, &request).inspect_err(|e| {
            tracing::warn!(
                owner = %request.owner,
                side = %side,
                price = request.price,
                amount = request.amount,
                error = %e,
                "Order rejected"
            );
        })?;

        let plan = matcher::plan(
            &self.book,
            &self.config,
            pool.reserves(),
            MatchRequest {
                side,
                owner: request.owner,
                to: request.to,
                price,
                amount: request.amount,
            },
        )?;
        debug_assert!(plan.is_conserved());

        let transfers = plan.transfers();
        settlement.check(&transfers).inspect_err(|e| {
            tracing::warn!(owner = %request.owner, error = %e, "Settlement check failed");
        })?;
        Self::execute_pool_legs(pool, &plan)?;
        if let Err(e) = settlement.apply(&transfers) {
            if plan.pool_legs().next().is_some() {
                tracing::error!(error = %e, "Settlement failed after pool legs executed");
                return Err(HybridxError::Internal(format!(
                    "settlement failed after pool swap: {e}"
                )));
            }
            return Err(e);
        }

        self.commit(plan).inspect_err(|e| {
            tracing::error!(error = %e, "Book mutation failed after settlement");
        })
    }

    fn validate(&self, side: OrderSide, request: &OrderRequest) -> Result<Price> {
        if request.amount == 0 || request.amount < self.config.min_amount {
            return Err(HybridxError::AmountInvalid {
                offered: request.amount,
                minimum: self.config.min_amount,
            });
        }
        if request.price == 0 {
            return Err(HybridxError::PriceInvalid);
        }
        let price = quantize(side, request.price, self.config.price_step)?;
        if price == 0 {
            return Err(HybridxError::PriceInvalid);
        }
        Ok(price)
    }

    fn execute_pool_legs<P: LiquidityPool>(pool: &mut P, plan: &MatchPlan) -> Result<()> {
        for (i, leg) in plan.pool_legs().enumerate() {
            let swapped = pool.swap(SwapRequest {
                asset_in: leg.asset_in,
                amount_in: leg.amount_in,
                min_amount_out: leg.amount_out,
            });
            match swapped {
                Ok(out) if out == leg.amount_out => {}
                Err(e) if i == 0 => return Err(e),
                other => {
                    tracing::error!(leg = i, planned = leg.amount_out, result = ?other, "Pool leg diverged from plan");
                    return Err(HybridxError::Internal(format!(
                        "pool leg {i} diverged from plan: {other:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn commit(&mut self, plan: MatchPlan) -> Result<OrderReceipt> {
        let request = plan.request;
        let mut events = Vec::with_capacity(plan.steps.len() + 1);

        for step in plan.steps {
            match step {
                MatchStep::Pool(leg) => {
                    tracing::debug!(
                        asset_in = %leg.asset_in,
                        amount_in = leg.amount_in,
                        amount_out = leg.amount_out,
                        target = ?leg.target_price,
                        "Pool leg executed"
                    );
                    events.push(BookEvent::PoolSwapped(leg));
                }
                MatchStep::Fill {
                    fill,
                    fees,
                    maker_remaining,
                    ..
                } => {
                    self.book.set_remaining(fill.maker_order_id, maker_remaining)?;
                    self.fees.record(fill.fee_asset(), &fees)?;
                    tracing::debug!(
                        maker_order = %fill.maker_order_id,
                        taker = %fill.taker_owner,
                        price = fill.price,
                        base = fill.base_amount,
                        quote = fill.quote_amount,
                        fee = fill.protocol_fee,
                        "Order filled"
                    );
                    events.push(BookEvent::OrderFilled(fill));
                }
                MatchStep::Retire {
                    order_id,
                    owner,
                    refund,
                } => {
                    self.book.remove(order_id)?;
                    tracing::warn!(order_id = %order_id, refund, "Dust maker order closed");
                    events.push(BookEvent::OrderClosed {
                        order_id,
                        owner,
                        amount_refunded: refund,
                    });
                }
            }
        }

        let order_id = (plan.amount_resting > 0).then(|| {
            self.book.rest(Order {
                id: self.book.next_order_id(),
                owner: request.owner,
                to: request.to,
                side: request.side,
                price: request.price,
                amount_offered: plan.amount_resting,
                amount_remaining: plan.amount_resting,
                sequence_index: 0,
                subsidy_fee_rate: self.config.subsidy_fee_rate,
                created_at: Utc::now(),
            })
        });

        events.push(BookEvent::OrderCreated {
            owner: request.owner,
            to: request.to,
            amount_offered: request.amount,
            amount_remaining: plan.amount_resting,
            price: request.price,
            side: request.side,
            order_id,
        });

        tracing::info!(
            market = %self.market,
            owner = %request.owner,
            side = %request.side,
            price = request.price,
            offered = request.amount,
            pool = plan.pool_consumed,
            book = plan.book_consumed,
            resting = plan.amount_resting,
            refunded = plan.amount_refunded,
            order_id = ?order_id,
            "Limit order processed"
        );

        Ok(OrderReceipt {
            order_id,
            side: request.side,
            price: request.price,
            amount_offered: request.amount,
            pool_consumed: plan.pool_consumed,
            book_consumed: plan.book_consumed,
            amount_resting: plan.amount_resting,
            amount_refunded: plan.amount_refunded,
            amount_received: plan.amount_received,
            events,
        })
    }

    // =================================================================
    // Cancellation
    // =================================================================

    /// Cancel a resting order and refund its remainder to the owner.
    pub fn cancel_limit_order<S: Settlement>(
        &mut self,
        settlement: &mut S,
        caller: AccountId,
        order_id: OrderId,
    ) -> Result<CancelReceipt> {
        let order = self
            .book
            .order(order_id)
            .ok_or(HybridxError::OrderNotFound(order_id))?;
        if order.owner != caller {
            tracing::warn!(order_id = %order_id, caller = %caller, "Cancel forbidden");
            return Err(HybridxError::Forbidden);
        }

        let refund = [Transfer::new(
            Account::Escrow,
            Account::User(order.owner),
            order.side.offered_asset(),
            order.amount_remaining,
        )];
        settlement.check(&refund)?;
        settlement.apply(&refund)?;
        let order = self.book.remove(order_id)?;

        tracing::info!(
            order_id = %order_id,
            owner = %order.owner,
            refunded = order.amount_remaining,
            "Order cancelled"
        );
        let event = BookEvent::OrderCanceled {
            owner: order.owner,
            to: order.to,
            amount_offered: order.amount_offered,
            amount_refunded: order.amount_remaining,
            price: order.price,
            side: order.side,
            order_id,
        };
        Ok(CancelReceipt {
            amount_refunded: order.amount_remaining,
            order,
            event,
        })
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn market(&self) -> &MarketPair {
        &self.market
    }

    #[must_use]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    #[must_use]
    pub fn orders(&self) -> &OrderBook {
        &self.book
    }

    #[must_use]
    pub fn fee_ledger(&self) -> &FeeLedger {
        &self.fees
    }

    /// A resting order by id.
    pub fn market_order(&self, order_id: OrderId) -> Result<&Order> {
        self.book
            .order(order_id)
            .ok_or(HybridxError::OrderNotFound(order_id))
    }

    pub fn order_by_id(&self, order_id: OrderId) -> Result<&Order> {
        self.market_order(order_id)
    }

    /// Ids of every order `account` ever rested here, oldest first.
    #[must_use]
    pub fn user_orders(&self, account: &AccountId) -> &[OrderId] {
        self.book.user_orders(account)
    }

    #[must_use]
    pub fn user_order(&self, account: &AccountId, index: usize) -> Option<OrderId> {
        self.book.user_orders(account).get(index).copied()
    }

    /// Pool marginal price at this book's price precision.
    pub fn get_price<P: LiquidityPool>(&self, pool: &P) -> Result<Price> {
        spot_price(pool.reserves(), self.config.price_decimals)
    }

    pub fn get_reserves<P: LiquidityPool>(&self, pool: &P) -> Reserves {
        pool.reserves()
    }

    /// The pool trade that would move its price to `target_price`.
    pub fn amount_to_move_price_to<P: LiquidityPool>(
        &self,
        pool: &P,
        side: OrderSide,
        target_price: Price,
    ) -> Result<MovePrice> {
        let reserves = pool.reserves();
        hybridx_curve::amount_to_move_price_to(
            side,
            reserves.base,
            reserves.quote,
            target_price,
            self.config.price_decimals,
        )
    }

    /// Output of swapping `amount_in` of `asset_in` with no price bound,
    /// walking every resting level and the pool in matching order.
    pub fn amount_out_for_move_price<P: LiquidityPool>(
        &self,
        pool: &P,
        asset_in: Asset,
        amount_in: Amount,
    ) -> Result<SwapQuote> {
        let side = match asset_in {
            Asset::Quote => OrderSide::Buy,
            Asset::Base => OrderSide::Sell,
        };
        let plan = matcher::plan_swap(&self.book, &self.config, pool.reserves(), side, amount_in)?;
        Ok(SwapQuote {
            amount_in: amount_in
                .checked_sub(plan.amount_refunded)
                .ok_or(HybridxError::ArithmeticUnderflow)?,
            amount_out: plan.amount_received,
            amount_left: plan.amount_refunded,
            reserves_after: plan.reserves_after,
        })
    }

    /// Smallest input of `asset_out.other()` whose out-quote delivers at
    /// least `amount_out`. When the book and pool cannot deliver that much,
    /// the quote for the largest reachable output is returned with the
    /// shortfall in `amount_left`.
    pub fn amount_in_for_move_price<P: LiquidityPool>(
        &self,
        pool: &P,
        asset_out: Asset,
        amount_out: Amount,
    ) -> Result<SwapQuote> {
        let asset_in = asset_out.other();
        if amount_out == 0 {
            return Ok(SwapQuote {
                reserves_after: pool.reserves(),
                ..SwapQuote::default()
            });
        }
        let quote = |amount: Amount| self.amount_out_for_move_price(pool, asset_in, amount);

        // Grow an upper bound, then bisect down to the smallest input.
        let mut lo: Amount = 0;
        let mut hi: Amount = 1;
        let unreachable = |q: SwapQuote| SwapQuote {
            amount_left: amount_out.saturating_sub(q.amount_out),
            ..q
        };
        let mut best = loop {
            match quote(hi) {
                Ok(q) if q.amount_out >= amount_out => break q,
                Ok(q) if hi > Amount::MAX / 2 => return Ok(unreachable(q)),
                Ok(_) => {
                    lo = hi;
                    hi *= 2;
                }
                // Larger inputs no longer fit the reserves.
                Err(HybridxError::ArithmeticOverflow) => return Ok(unreachable(quote(lo)?)),
                Err(err) => return Err(err),
            }
        };
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            let q = quote(mid)?;
            if q.amount_out >= amount_out {
                hi = mid;
                best = q;
            } else {
                lo = mid;
            }
        }
        tracing::trace!(asset_out = %asset_out, amount_out, amount_in = best.amount_in, "Input quoted");
        Ok(best)
    }

    #[must_use]
    pub fn best_price(&self, side: OrderSide) -> Option<Price> {
        self.book.best_price(side)
    }

    #[must_use]
    pub fn next_price(&self, side: OrderSide, price: Price) -> Option<Price> {
        self.book.next_price(side, price)
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.book.order_count()
    }

    #[must_use]
    pub fn level_count(&self, side: OrderSide) -> usize {
        self.book.level_count(side)
    }

    #[must_use]
    pub fn market_book(&self, side: OrderSide, max_levels: usize) -> Depth {
        self.book.market_book(side, max_levels)
    }

    #[must_use]
    pub fn range_book(&self, side: OrderSide, bound: Price) -> Depth {
        self.book.range_book(side, bound)
    }

    #[must_use]
    pub fn snapshot(&self) -> BookSnapshot {
        self.book.snapshot()
    }

    #[must_use]
    pub fn price_step(&self) -> Price {
        self.config.price_step
    }

    #[must_use]
    pub fn min_amount(&self) -> Amount {
        self.config.min_amount
    }

    #[must_use]
    pub fn protocol_fee_rate(&self) -> u32 {
        self.config.protocol_fee_rate
    }

    #[must_use]
    pub fn subsidy_fee_rate(&self) -> u32 {
        self.config.subsidy_fee_rate
    }

    #[must_use]
    pub fn price_decimals(&self) -> u32 {
        self.config.price_decimals
    }

    // =================================================================
    // Administration
    // =================================================================

    fn authorize(&self, caller: AccountId) -> Result<()> {
        if caller != self.config.admin {
            tracing::warn!(caller = %caller, "Config change forbidden");
            return Err(HybridxError::Forbidden);
        }
        Ok(())
    }

    fn config_updated(&self, field: ConfigField, old: u128, new: u128) -> BookEvent {
        tracing::info!(market = %self.market, field = %field, old, new, "Config updated");
        BookEvent::ConfigUpdated { field, old, new }
    }

    /// Applies to orders created afterwards; resting orders keep their level.
    pub fn set_price_step(&mut self, caller: AccountId, price_step: Price) -> Result<BookEvent> {
        self.authorize(caller)?;
        validate_price_step(price_step)?;
        let old = std::mem::replace(&mut self.config.price_step, price_step);
        Ok(self.config_updated(ConfigField::PriceStep, old, price_step))
    }

    pub fn set_min_amount(&mut self, caller: AccountId, min_amount: Amount) -> Result<BookEvent> {
        self.authorize(caller)?;
        let old = std::mem::replace(&mut self.config.min_amount, min_amount);
        Ok(self.config_updated(ConfigField::MinAmount, old, min_amount))
    }

    pub fn set_protocol_fee_rate(&mut self, caller: AccountId, rate: u32) -> Result<BookEvent> {
        self.authorize(caller)?;
        validate_fee_rate("protocol_fee_rate", rate)?;
        let old = std::mem::replace(&mut self.config.protocol_fee_rate, rate);
        Ok(self.config_updated(
            ConfigField::ProtocolFeeRate,
            u128::from(old),
            u128::from(rate),
        ))
    }

    pub fn set_subsidy_fee_rate(&mut self, caller: AccountId, rate: u32) -> Result<BookEvent> {
        self.authorize(caller)?;
        validate_fee_rate("subsidy_fee_rate", rate)?;
        let old = std::mem::replace(&mut self.config.subsidy_fee_rate, rate);
        Ok(self.config_updated(
            ConfigField::SubsidyFeeRate,
            u128::from(old),
            u128::from(rate),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Settlement that accepts everything and records the batches.
    #[derive(Default)]
    struct RecordingSettlement {
        batches: Vec<Vec<Transfer>>,
        reject: bool,
    }

    impl Settlement for RecordingSettlement {
        fn check(&self, _transfers: &[Transfer]) -> Result<()> {
            if self.reject {
                return Err(HybridxError::SettlementFailed {
                    reason: "rejected".into(),
                });
            }
            Ok(())
        }

        fn apply(&mut self, transfers: &[Transfer]) -> Result<()> {
            self.check(transfers)?;
            self.batches.push(transfers.to_vec());
            Ok(())
        }

        fn balance(&self, _account: Account, _asset: Asset) -> Amount {
            0
        }
    }

    /// Pool with no liquidity: every plan skips it.
    struct EmptyPool;

    impl LiquidityPool for EmptyPool {
        fn reserves(&self) -> Reserves {
            Reserves::default()
        }

        fn swap(&mut self, _request: SwapRequest) -> Result<Amount> {
            Err(HybridxError::InsufficientLiquidity)
        }
    }

    fn admin() -> AccountId {
        AccountId::from_byte(0xad)
    }

    fn book() -> HybridBook {
        let config = BookConfig::new(admin())
            .with_price_decimals(0)
            .with_price_step(10)
            .with_min_amount(5)
            .with_fee_rates(0, 0);
        HybridBook::new(MarketPair::new("ETH", "USDC"), config).unwrap()
    }

    #[test]
    fn rejects_small_amount_and_zero_price() {
        let mut hb = book();
        let owner = AccountId::from_byte(1);
        let mut s = RecordingSettlement::default();

        let err = hb
            .create_buy_limit_order(&mut s, &mut EmptyPool, OrderRequest::new(owner, 100, 4))
            .unwrap_err();
        assert_eq!(err, HybridxError::AmountInvalid { offered: 4, minimum: 5 });

        let err = hb
            .create_buy_limit_order(&mut s, &mut EmptyPool, OrderRequest::new(owner, 0, 50))
            .unwrap_err();
        assert_eq!(err, HybridxError::PriceInvalid);

        // A bid below one step quantizes to zero.
        let err = hb
            .create_buy_limit_order(&mut s, &mut EmptyPool, OrderRequest::new(owner, 9, 50))
            .unwrap_err();
        assert_eq!(err, HybridxError::PriceInvalid);
        assert!(s.batches.is_empty());
    }

    #[test]
    fn resting_order_is_quantized_and_indexed() {
        let mut hb = book();
        let owner = AccountId::from_byte(1);
        let mut s = RecordingSettlement::default();

        let receipt = hb
            .create_sell_limit_order(&mut s, &mut EmptyPool, OrderRequest::new(owner, 101, 7))
            .unwrap();
        let id = receipt.order_id.unwrap();
        assert_eq!(id, OrderId(1));
        assert_eq!(receipt.price, 110);
        assert_eq!(hb.market_order(id).unwrap().price, 110);
        assert_eq!(hb.user_orders(&owner), &[id]);
        assert_eq!(hb.user_order(&owner, 0), Some(id));
        assert_eq!(hb.user_order(&owner, 1), None);
        assert_eq!(hb.best_price(OrderSide::Sell), Some(110));
        assert!(matches!(
            receipt.events.last(),
            Some(BookEvent::OrderCreated { amount_remaining: 7, order_id: Some(_), .. })
        ));
        assert_eq!(
            s.batches[0],
            vec![Transfer::new(Account::User(owner), Account::Escrow, Asset::Base, 7)]
        );
    }

    #[test]
    fn settlement_rejection_leaves_book_untouched() {
        let mut hb = book();
        let mut s = RecordingSettlement {
            reject: true,
            ..Default::default()
        };
        let err = hb
            .create_sell_limit_order(
                &mut s,
                &mut EmptyPool,
                OrderRequest::new(AccountId::from_byte(1), 100, 7),
            )
            .unwrap_err();
        assert!(matches!(err, HybridxError::SettlementFailed { .. }));
        assert_eq!(hb.order_count(), 0);
        assert_eq!(hb.orders().next_order_id(), OrderId::FIRST);
    }

    #[test]
    fn cancel_checks_existence_then_owner() {
        let mut hb = book();
        let owner = AccountId::from_byte(1);
        let other = AccountId::from_byte(2);
        let mut s = RecordingSettlement::default();
        let id = hb
            .create_buy_limit_order(&mut s, &mut EmptyPool, OrderRequest::new(owner, 100, 500))
            .unwrap()
            .order_id
            .unwrap();

        assert_eq!(
            hb.cancel_limit_order(&mut s, other, OrderId(99)).unwrap_err(),
            HybridxError::OrderNotFound(OrderId(99))
        );
        assert_eq!(
            hb.cancel_limit_order(&mut s, other, id).unwrap_err(),
            HybridxError::Forbidden
        );

        let receipt = hb.cancel_limit_order(&mut s, owner, id).unwrap();
        assert_eq!(receipt.amount_refunded, 500);
        assert!(matches!(receipt.event, BookEvent::OrderCanceled { amount_refunded: 500, .. }));
        assert_eq!(hb.order_count(), 0);
        assert_eq!(
            hb.cancel_limit_order(&mut s, owner, id).unwrap_err(),
            HybridxError::OrderNotFound(id)
        );
    }

    #[test]
    fn admin_updates_config() {
        let mut hb = book();
        let event = hb.set_price_step(admin(), 5).unwrap();
        assert_eq!(
            event,
            BookEvent::ConfigUpdated {
                field: ConfigField::PriceStep,
                old: 10,
                new: 5
            }
        );
        assert_eq!(hb.price_step(), 5);

        hb.set_min_amount(admin(), 1).unwrap();
        hb.set_protocol_fee_rate(admin(), 25).unwrap();
        hb.set_subsidy_fee_rate(admin(), 0).unwrap();
        assert_eq!(hb.min_amount(), 1);
        assert_eq!(hb.protocol_fee_rate(), 25);
        assert_eq!(hb.subsidy_fee_rate(), 0);
    }

    #[test]
    fn admin_guards() {
        let mut hb = book();
        let stranger = AccountId::from_byte(3);
        assert_eq!(hb.set_price_step(stranger, 5).unwrap_err(), HybridxError::Forbidden);
        assert_eq!(hb.set_min_amount(stranger, 5).unwrap_err(), HybridxError::Forbidden);
        assert!(matches!(
            hb.set_price_step(admin(), 0),
            Err(HybridxError::InvalidConfig { .. })
        ));
        assert!(matches!(
            hb.set_protocol_fee_rate(admin(), 10_001),
            Err(HybridxError::InvalidConfig { .. })
        ));
        assert_eq!(hb.price_step(), 10);
    }

    #[test]
    fn invalid_config_rejected_on_open() {
        let config = BookConfig::new(admin()).with_price_step(0);
        assert!(HybridBook::new(MarketPair::new("A", "B"), config).is_err());
    }
}
