//! Side-effect-free planning of one limit order.
//!
//! ```text
//! plan(&OrderBook, &BookConfig, Reserves, MatchRequest) -> MatchPlan
//! ```
//!
//! ## Algorithm
//!
//! Starting from the best opposite level that crosses the limit:
//!
//! 1. **Pool phase**: swap against the pool until its marginal price reaches
//!    the level price (or the limit when no crossing level is left), capped
//!    by the quantity still unmatched.
//! 2. **Book phase**: fill the level's makers front to back at the maker's
//!    price, then advance to the next level.
//!
//! At every price the pool is consumed before resting orders at that price,
//! which keeps the pool price and the best resting price consistent.
//!
//! [`plan_swap`] runs the same walk with no limit: every level crosses and
//! the final pool leg takes the whole remainder.
//!
//! ## Rounding
//!
//! With `s = 10^price_decimals`, a fill of `base` units at `price` moves
//! `quote = ceil(base * price / s)`. The largest base a quote balance can pay
//! for is `floor(quote * s / price)`; when that is zero the balance is
//! **dust** at that price. A dust taker stops matching and is refunded. A
//! dust buy maker is retired and refunded.

use hybridx_curve::{Rounding, amount_to_move_price_to, mul_div, swap_out};
use hybridx_types::*;

use crate::OrderBook;
use crate::fees::{FeeBreakdown, FeeSchedule};

/// A validated, quantized limit order ready to be planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRequest {
    pub side: OrderSide,
    pub owner: AccountId,
    pub to: AccountId,
    /// Quantized limit price.
    pub price: Price,
    /// Offered amount, in `side.offered_asset()`.
    pub amount: Amount,
}

/// One action of a plan, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStep {
    /// Swap against the pool.
    Pool(PoolLeg),
    /// Fill against a resting maker.
    Fill {
        fill: Fill,
        fees: FeeBreakdown,
        /// Beneficiary of the maker order.
        maker_to: AccountId,
        /// Maker's `amount_remaining` after this fill.
        maker_remaining: Amount,
    },
    /// Remove a buy maker that can no longer pay for one base unit.
    Retire {
        order_id: OrderId,
        owner: AccountId,
        refund: Amount,
    },
}

/// Everything a request will do, computed without touching any state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPlan {
    pub request: MatchRequest,
    pub steps: Vec<MatchStep>,
    /// Offered amount swapped into the pool.
    pub pool_consumed: Amount,
    /// Offered amount paid to makers.
    pub book_consumed: Amount,
    /// Amount that will rest as a new order.
    pub amount_resting: Amount,
    /// Dust returned to the owner.
    pub amount_refunded: Amount,
    /// Received asset credited to `to`, net of fees.
    pub amount_received: Amount,
    /// Pool reserves after every leg executes.
    pub reserves_after: Reserves,
}

impl MatchPlan {
    pub fn pool_legs(&self) -> impl Iterator<Item = &PoolLeg> + '_ {
        self.steps.iter().filter_map(|step| match step {
            MatchStep::Pool(leg) => Some(leg),
            _ => None,
        })
    }

    pub fn fills(&self) -> impl Iterator<Item = (&Fill, &FeeBreakdown)> + '_ {
        self.steps.iter().filter_map(|step| match step {
            MatchStep::Fill { fill, fees, .. } => Some((fill, fees)),
            _ => None,
        })
    }

    /// `offered == pool + book + resting + refunded`.
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
            == Some(self.request.amount)
    }

    /// The settlement batch for this plan.
    ///
    /// The offer is escrowed first; every payout then leaves the escrow (or
    /// the pool for swap proceeds). Zero-amount transfers are omitted.
    #[must_use]
    pub fn transfers(&self) -> Vec<Transfer> {
        let req = &self.request;
        let offered = req.side.offered_asset();
        let received = req.side.received_asset();
        let mut out = Vec::with_capacity(self.steps.len() * 4 + 2);
        let mut push = |from: Account, to: Account, asset: Asset, amount: Amount| {
            if amount > 0 {
                out.push(Transfer::new(from, to, asset, amount));
            }
        };

        push(Account::User(req.owner), Account::Escrow, offered, req.amount);
        for step in &self.steps {
            match step {
                MatchStep::Pool(leg) => {
                    push(Account::Escrow, Account::Pool, leg.asset_in, leg.amount_in);
                    push(
                        Account::Pool,
                        Account::User(req.to),
                        leg.asset_in.other(),
                        leg.amount_out,
                    );
                }
                MatchStep::Fill {
                    fill,
                    fees,
                    maker_to,
                    ..
                } => {
                    let maker = Account::User(*maker_to);
                    let maker_proceeds = match req.side {
                        OrderSide::Buy => fill.quote_amount,
                        OrderSide::Sell => fill.base_amount,
                    };
                    push(Account::Escrow, maker, offered, maker_proceeds);
                    push(Account::Escrow, Account::User(req.to), received, fees.net);
                    push(Account::Escrow, Account::Protocol, received, fees.protocol_net);
                    push(Account::Escrow, maker, received, fees.subsidy);
                }
                MatchStep::Retire { owner, refund, .. } => {
                    push(Account::Escrow, Account::User(*owner), received, *refund);
                }
            }
        }
        push(
            Account::Escrow,
            Account::User(req.owner),
            offered,
            self.amount_refunded,
        );
        out
    }
}

/// How a book phase at one level ended.
enum LevelOutcome {
    /// Every maker at the level was consumed or retired.
    Exhausted,
    /// Nothing left to match.
    TakerFilled,
    /// The taker's remainder cannot pay for one base unit at this level.
    TakerDust,
}

struct Planner<'a> {
    book: &'a OrderBook,
    fees: FeeSchedule,
    scale: u128,
    price_decimals: u32,
    request: MatchRequest,
    /// `None` sweeps without a price bound.
    limit: Option<Price>,
    remaining: Amount,
    reserves: Reserves,
    steps: Vec<MatchStep>,
    pool_consumed: Amount,
    book_consumed: Amount,
    received: Amount,
}

/// Plan `request` against the current book and a snapshot of the pool
/// reserves. Pure: the same inputs always give the same plan.
pub fn plan(
    book: &OrderBook,
    config: &BookConfig,
    reserves: Reserves,
    request: MatchRequest,
) -> Result<MatchPlan> {
    if request.price == 0 {
        return Err(HybridxError::PriceInvalid);
    }
    Planner::new(book, config, reserves, request, Some(request.price))?.run()
}

/// Plan a swap of `amount` with no limit price: every crossing level and
/// the pool are consumed until the amount runs out or both are exhausted.
///
/// Whatever cannot be matched is reported in `amount_refunded`; nothing
/// ever rests.
pub fn plan_swap(
    book: &OrderBook,
    config: &BookConfig,
    reserves: Reserves,
    side: OrderSide,
    amount: Amount,
) -> Result<MatchPlan> {
    let request = MatchRequest {
        side,
        owner: AccountId::NIL,
        to: AccountId::NIL,
        price: 0,
        amount,
    };
    Planner::new(book, config, reserves, request, None)?.run()
}

fn sub(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_sub(b).ok_or(HybridxError::ArithmeticUnderflow)
}

fn add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b).ok_or(HybridxError::ArithmeticOverflow)
}

impl<'a> Planner<'a> {
    fn new(
        book: &'a OrderBook,
        config: &BookConfig,
        reserves: Reserves,
        request: MatchRequest,
        limit: Option<Price>,
    ) -> Result<Self> {
        Ok(Self {
            book,
            fees: FeeSchedule::from_config(config),
            scale: config.price_scale()?,
            price_decimals: config.price_decimals,
            request,
            limit,
            remaining: request.amount,
            reserves,
            steps: Vec::new(),
            pool_consumed: 0,
            book_consumed: 0,
            received: 0,
        })
    }

    fn run(mut self) -> Result<MatchPlan> {
        let book = self.book;
        let side = self.request.side;
        let limit = self.limit;
        let makers = side.opposite();
        let crossing = move |price: Option<Price>| {
            price.filter(|p| limit.is_none_or(|l| side.accepts(l, *p)))
        };

        let mut level = crossing(book.best_price(makers));
        let mut dust = false;
        loop {
            self.pool_phase(level.or(limit))?;
            let Some(price) = level else { break };
            if self.remaining == 0 {
                break;
            }
            match self.book_phase(price)? {
                LevelOutcome::Exhausted => level = crossing(book.next_price(makers, price)),
                LevelOutcome::TakerFilled => break,
                LevelOutcome::TakerDust => {
                    dust = true;
                    break;
                }
            }
        }

        if !dust && self.remaining > 0 {
            dust = match limit {
                Some(price) => self.is_dust(self.remaining, price)?,
                None => true,
            };
        }
        let (amount_resting, amount_refunded) = if dust {
            (0, self.remaining)
        } else {
            (self.remaining, 0)
        };

        Ok(MatchPlan {
            request: self.request,
            steps: self.steps,
            pool_consumed: self.pool_consumed,
            book_consumed: self.book_consumed,
            amount_resting,
            amount_refunded,
            amount_received: self.received,
            reserves_after: self.reserves,
        })
    }

    /// Largest base amount `quote` pays for at `price`.
    fn affordable_base(&self, quote: Amount, price: Price) -> Result<Amount> {
        mul_div(quote, self.scale, price, Rounding::Floor)
    }

    fn quote_for(&self, base: Amount, price: Price) -> Result<Amount> {
        mul_div(base, price, self.scale, Rounding::Ceil)
    }

    /// Only a quote-denominated (buy) remainder can be dust.
    fn is_dust(&self, remaining: Amount, price: Price) -> Result<bool> {
        Ok(match self.request.side {
            OrderSide::Buy => self.affordable_base(remaining, price)? == 0,
            OrderSide::Sell => false,
        })
    }

    /// Swap toward `target`, or swap the whole remainder when unbounded.
    fn pool_phase(&mut self, target: Option<Price>) -> Result<()> {
        if self.remaining == 0 {
            return Ok(());
        }
        let side = self.request.side;
        let (reserve_in, reserve_out) = self.reserves.in_out(side);
        if reserve_in == 0 || reserve_out == 0 {
            return Ok(());
        }
        let bounded = match target {
            Some(price) => {
                let movement = amount_to_move_price_to(
                    side,
                    self.reserves.base,
                    self.reserves.quote,
                    price,
                    self.price_decimals,
                )?;
                if movement.is_empty() {
                    return Ok(());
                }
                (movement.amount_in <= self.remaining)
                    .then_some((movement.amount_in, movement.amount_out))
            }
            None => None,
        };

        let (amount_in, amount_out) = match bounded {
            Some(leg) => leg,
            None => (
                self.remaining,
                swap_out(self.remaining, reserve_in, reserve_out)?,
            ),
        };
        if amount_out == 0 {
            return Ok(());
        }

        self.reserves = Reserves::from_in_out(
            side,
            add(reserve_in, amount_in)?,
            sub(reserve_out, amount_out)?,
        );
        self.remaining = sub(self.remaining, amount_in)?;
        self.pool_consumed = add(self.pool_consumed, amount_in)?;
        self.received = add(self.received, amount_out)?;
        self.steps.push(MatchStep::Pool(PoolLeg {
            asset_in: side.offered_asset(),
            amount_in,
            amount_out,
            target_price: target,
        }));
        Ok(())
    }

    fn book_phase(&mut self, price: Price) -> Result<LevelOutcome> {
        let book = self.book;
        for maker in book.orders_at(self.request.side.opposite(), price) {
            if self.remaining == 0 {
                return Ok(LevelOutcome::TakerFilled);
            }
            let outcome = match self.request.side {
                OrderSide::Buy => self.take_ask(maker, price)?,
                OrderSide::Sell => self.take_bid(maker, price)?,
            };
            if let Some(outcome) = outcome {
                return Ok(outcome);
            }
        }
        Ok(if self.remaining == 0 {
            LevelOutcome::TakerFilled
        } else {
            LevelOutcome::Exhausted
        })
    }

    /// Buy taker pays quote for a resting sell's base.
    fn take_ask(&mut self, maker: &Order, price: Price) -> Result<Option<LevelOutcome>> {
        let taker_base = self.affordable_base(self.remaining, price)?;
        if taker_base == 0 {
            return Ok(Some(LevelOutcome::TakerDust));
        }
        let base = maker.amount_remaining.min(taker_base);
        let quote = self.quote_for(base, price)?;
        let fees = self.fees.for_maker(maker.subsidy_fee_rate).apply(base)?;
        let maker_remaining = sub(maker.amount_remaining, base)?;

        self.remaining = sub(self.remaining, quote)?;
        self.book_consumed = add(self.book_consumed, quote)?;
        self.received = add(self.received, fees.net)?;
        self.push_fill(maker, price, base, quote, fees, maker_remaining);

        if maker_remaining > 0 {
            // The taker could not afford all of this maker.
            return Ok(Some(if self.remaining == 0 {
                LevelOutcome::TakerFilled
            } else {
                LevelOutcome::TakerDust
            }));
        }
        Ok(None)
    }

    /// Sell taker delivers base to a resting buy paying quote.
    fn take_bid(&mut self, maker: &Order, price: Price) -> Result<Option<LevelOutcome>> {
        let maker_base = self.affordable_base(maker.amount_remaining, price)?;
        if maker_base == 0 {
            self.retire(maker, maker.amount_remaining);
            return Ok(None);
        }
        let base = self.remaining.min(maker_base);
        let quote = self.quote_for(base, price)?;
        let fees = self.fees.for_maker(maker.subsidy_fee_rate).apply(quote)?;
        let maker_remaining = sub(maker.amount_remaining, quote)?;

        self.remaining = sub(self.remaining, base)?;
        self.book_consumed = add(self.book_consumed, base)?;
        self.received = add(self.received, fees.net)?;
        self.push_fill(maker, price, base, quote, fees, maker_remaining);

        if maker_remaining > 0 && self.affordable_base(maker_remaining, price)? == 0 {
            self.retire(maker, maker_remaining);
        }
        Ok(None)
    }

    fn push_fill(
        &mut self,
        maker: &Order,
        price: Price,
        base_amount: Amount,
        quote_amount: Amount,
        fees: FeeBreakdown,
        maker_remaining: Amount,
    ) {
        self.steps.push(MatchStep::Fill {
            fill: Fill {
                maker_order_id: maker.id,
                maker_owner: maker.owner,
                taker_owner: self.request.owner,
                taker_side: self.request.side,
                price,
                base_amount,
                quote_amount,
                protocol_fee: fees.protocol_fee,
                subsidy: fees.subsidy,
            },
            fees,
            maker_to: maker.to,
            maker_remaining,
        });
    }

    fn retire(&mut self, maker: &Order, refund: Amount) {
        self.steps.push(MatchStep::Retire {
            order_id: maker.id,
            owner: maker.owner,
            refund,
        });
    }
}
