//! Matching engine core
//!
//! One engine per trading pair. Every operation is a single logical
//! transaction: validate, move escrow through the Ledger, then mutate
//! the book. Failures abort before the first ledger movement, so a
//! returned error leaves book and balances untouched.

use std::collections::HashMap;
use tracing::debug;
use types::asset::Asset;
use types::errors::EngineError;
use types::ids::{AccountId, OrderId};
use types::order::{Order, Side};
use types::units::{Price, Quantity};

use crate::book::OrderBook;
use crate::events::{
    EngineEvent, OrderAmended, OrderCancelled, OrderCreated, OrderFilled, TradeExecuted,
};
use crate::ledger::Ledger;
use crate::scaling;
use crate::MAX_BATCH_SIZE;

/// Matching engine for one (base, quote) pair.
#[derive(Debug)]
pub struct MatchingEngine<L: Ledger> {
    base: Asset,
    quote: Asset,
    /// 10^base.decimals, the divisor scaling `amount * price` into quote
    base_scale: u128,
    book: OrderBook,
    ledger: L,
    /// Emitted events log (append-only)
    events: Vec<EngineEvent>,
}

/// One fill of a planned market sweep, resolved against an unmodified
/// book and applied only after the slippage guard passes.
struct PlannedFill {
    maker: OrderId,
    maker_trader: AccountId,
    fill: Quantity,
    quote_value: u128,
    price: Price,
}

/// Outcome of planning a market sweep.
struct MarketPlan {
    fills: Vec<PlannedFill>,
    /// Units debited from the taker: quote for a buy, base for a sell
    consumed: u128,
    /// Units received by the taker: base for a buy, quote for a sell
    received: u128,
}

impl<L: Ledger> MatchingEngine<L> {
    /// Create an engine for a pair, with the caller-supplied asset roles.
    pub fn new(base: Asset, quote: Asset, ledger: L) -> Self {
        Self {
            base_scale: base.unit_scale(),
            base,
            quote,
            book: OrderBook::new(),
            ledger,
            events: Vec::new(),
        }
    }

    // ───────────────────────── Limit placement ─────────────────────────

    /// Place a batch of limit orders.
    ///
    /// The full escrow for the batch is debited in a single ledger call
    /// before any book mutation. Each leg is then inserted in array
    /// order and immediately crossed against the opposite side at its
    /// exact price; leftovers rest on the book.
    pub fn place(
        &mut self,
        trader: AccountId,
        side: Side,
        prices: &[Price],
        amounts: &[Quantity],
        timestamp: i64,
    ) -> Result<Vec<OrderId>, EngineError> {
        if prices.is_empty() || prices.len() != amounts.len() {
            return Err(EngineError::InvalidInput);
        }
        if prices.len() > MAX_BATCH_SIZE {
            return Err(EngineError::BatchSizeTooLarge {
                len: prices.len(),
                max: MAX_BATCH_SIZE,
            });
        }

        // Validate every leg and total the escrow before touching state.
        let mut escrow: u128 = 0;
        for (price, amount) in prices.iter().zip(amounts) {
            if price.is_zero() {
                return Err(EngineError::InvalidPrice);
            }
            if amount.is_zero() {
                return Err(EngineError::InvalidAmount);
            }
            let leg_quote = scaling::quote_units(*amount, *price, self.base_scale)?;
            let leg_escrow = match side {
                Side::BUY => leg_quote,
                Side::SELL => amount.as_u128(),
            };
            escrow = escrow
                .checked_add(leg_escrow)
                .ok_or(EngineError::ArithmeticOverflow)?;
        }

        let escrow_asset = match side {
            Side::BUY => self.quote.id,
            Side::SELL => self.base.id,
        };
        self.ledger.debit(trader, escrow_asset, escrow)?;

        let mut ids = Vec::with_capacity(prices.len());
        for (price, amount) in prices.iter().zip(amounts) {
            let id = self
                .book
                .insert_resting(trader, side, *price, *amount, timestamp);
            self.events.push(EngineEvent::OrderCreated(OrderCreated {
                trader,
                id,
                price: *price,
                amount: *amount,
                side,
            }));
            debug!(order = id.as_u64(), price = %price, amount = %amount, "order placed");
            self.cross_at_price(*price)?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Match the heads of both sides at one exact price until either
    /// side empties.
    ///
    /// A fill whose quote value floors to zero stops the loop: dust
    /// never trades for zero quote.
    fn cross_at_price(&mut self, price: Price) -> Result<(), EngineError> {
        while let (Some(buy_id), Some(sell_id)) = (
            self.book.head(Side::BUY, price),
            self.book.head(Side::SELL, price),
        ) {
            let (buyer, seller, fill) = {
                let buy = self.book.order(buy_id).expect("head order exists");
                let sell = self.book.order(sell_id).expect("head order exists");
                (buy.trader, sell.trader, buy.remaining().min(sell.remaining()))
            };
            let value = scaling::quote_units_floor(fill, price, self.base_scale)?;
            if value == 0 {
                break;
            }

            // Escrow for both sides is already in custody.
            self.ledger.credit(seller, self.quote.id, value)?;
            self.ledger.credit(buyer, self.base.id, fill.as_u128())?;

            self.apply_fill_with_event(buy_id, fill);
            self.apply_fill_with_event(sell_id, fill);
            self.book.set_last_trade_price(price);
            self.events.push(EngineEvent::TradeExecuted(TradeExecuted {
                buyer,
                seller,
                base_amount: fill,
                price,
            }));
            debug!(price = %price, base = %fill, "trade executed");
        }
        Ok(())
    }

    fn apply_fill_with_event(&mut self, id: OrderId, fill: Quantity) {
        self.book.apply_fill(id, fill);
        let order = self.book.order(id).expect("filled order exists");
        self.events.push(EngineEvent::OrderFilled(OrderFilled {
            id,
            trader: order.trader,
            amount: fill,
            filled: order.filled,
            remaining: order.remaining(),
            side: order.side,
        }));
    }

    // ───────────────────────── Cancel / amend ─────────────────────────

    /// Cancel a resting order and refund its unfilled escrow.
    pub fn cancel(&mut self, caller: AccountId, id: OrderId) -> Result<(), EngineError> {
        let (side, price, remaining) = self.authorize(caller, id)?;

        // Refund is computed before the unlink so a conversion error
        // cannot leave the book half-mutated.
        let quote_refund = match side {
            Side::BUY => scaling::quote_units_floor(remaining, price, self.base_scale)?,
            Side::SELL => 0,
        };

        self.book.remove_order(id);
        match side {
            Side::BUY if quote_refund > 0 => {
                self.ledger.credit(caller, self.quote.id, quote_refund)?
            }
            Side::SELL => self
                .ledger
                .credit(caller, self.base.id, remaining.as_u128())?,
            _ => {}
        }

        self.events
            .push(EngineEvent::OrderCancelled(OrderCancelled { id, trader: caller }));
        debug!(order = id.as_u64(), "order cancelled");
        Ok(())
    }

    /// Resize a resting order, preserving its time priority.
    ///
    /// Growing debits additional escrow; shrinking refunds the
    /// difference. The price cannot change: cancel and re-place.
    pub fn amend(
        &mut self,
        caller: AccountId,
        id: OrderId,
        new_amount: Quantity,
    ) -> Result<(), EngineError> {
        let (side, price, _) = self.authorize(caller, id)?;
        let (amount, filled) = {
            let order = self.book.order(id).expect("authorized order exists");
            (order.amount, order.filled)
        };
        if new_amount.is_zero() {
            return Err(EngineError::InvalidAmount);
        }
        if new_amount <= filled {
            return Err(EngineError::AmountLessThanFilled { new_amount, filled });
        }

        if new_amount > amount {
            let delta = new_amount.saturating_sub(amount);
            match side {
                Side::BUY => {
                    let units = scaling::quote_units_floor(delta, price, self.base_scale)?;
                    if units > 0 {
                        self.ledger.debit(caller, self.quote.id, units)?;
                    }
                }
                Side::SELL => self.ledger.debit(caller, self.base.id, delta.as_u128())?,
            }
        } else if new_amount < amount {
            let delta = amount.saturating_sub(new_amount);
            match side {
                Side::BUY => {
                    let units = scaling::quote_units_floor(delta, price, self.base_scale)?;
                    if units > 0 {
                        self.ledger.credit(caller, self.quote.id, units)?;
                    }
                }
                Side::SELL => self.ledger.credit(caller, self.base.id, delta.as_u128())?,
            }
        }

        self.book.amend_amount(id, new_amount);
        self.events.push(EngineEvent::OrderAmended(OrderAmended {
            id,
            trader: caller,
            new_amount,
        }));
        debug!(order = id.as_u64(), new_amount = %new_amount, "order amended");
        Ok(())
    }

    fn authorize(
        &self,
        caller: AccountId,
        id: OrderId,
    ) -> Result<(Side, Price, Quantity), EngineError> {
        let order = self
            .book
            .order(id)
            .ok_or(EngineError::UnknownOrder { order_id: id })?;
        if order.trader != caller {
            return Err(EngineError::Unauthorized { order_id: id });
        }
        if !order.active {
            return Err(EngineError::OrderInactive { order_id: id });
        }
        Ok((order.side, order.price, order.remaining()))
    }

    // ───────────────────────── Market orders ─────────────────────────

    /// Sweep liquidity across the caller-supplied price hints.
    ///
    /// For a BUY, `amount` is a quote budget and the hints walk asks
    /// cheapest-first; for a SELL, `amount` is a base quantity and the
    /// hints walk bids richest-first. The engine follows the hint order
    /// verbatim and never re-sorts it.
    ///
    /// The sweep is planned against the unmodified book, the slippage
    /// guard checked, and only then is the taker debited for exactly the
    /// consumed units and the book mutated. A failing guard therefore
    /// leaves book and balances identical to the pre-call state.
    pub fn execute_market(
        &mut self,
        trader: AccountId,
        side: Side,
        amount: u128,
        price_hints: &[Price],
        min_received: u128,
        expiration: i64,
        timestamp: i64,
    ) -> Result<u128, EngineError> {
        if amount == 0 {
            return Err(EngineError::InvalidAmount);
        }
        if price_hints.is_empty() {
            return Err(EngineError::NoPricesProvided);
        }
        if expiration != 0 && timestamp >= expiration {
            return Err(EngineError::OrderExpired { expiration });
        }

        let plan = match side {
            Side::BUY => self.plan_market_buy(amount, price_hints)?,
            Side::SELL => self.plan_market_sell(amount, price_hints)?,
        };

        if plan.received < min_received {
            return Err(match side {
                Side::BUY => EngineError::InsufficientBaseReceived {
                    received: plan.received,
                    min_received,
                },
                Side::SELL => EngineError::InsufficientQuoteReceived {
                    received: plan.received,
                    min_received,
                },
            });
        }
        if plan.fills.is_empty() {
            return Ok(0);
        }

        let (spend_asset, receive_asset) = match side {
            Side::BUY => (self.quote.id, self.base.id),
            Side::SELL => (self.base.id, self.quote.id),
        };
        self.ledger.debit(trader, spend_asset, plan.consumed)?;

        for planned in &plan.fills {
            match side {
                Side::BUY => {
                    self.ledger
                        .credit(planned.maker_trader, self.quote.id, planned.quote_value)?;
                    self.ledger
                        .credit(trader, receive_asset, planned.fill.as_u128())?;
                }
                Side::SELL => {
                    self.ledger
                        .credit(planned.maker_trader, self.base.id, planned.fill.as_u128())?;
                    self.ledger
                        .credit(trader, receive_asset, planned.quote_value)?;
                }
            }
            let (buyer, seller) = match side {
                Side::BUY => (trader, planned.maker_trader),
                Side::SELL => (planned.maker_trader, trader),
            };
            self.apply_fill_with_event(planned.maker, planned.fill);
            self.book.set_last_trade_price(planned.price);
            self.events.push(EngineEvent::TradeExecuted(TradeExecuted {
                buyer,
                seller,
                base_amount: planned.fill,
                price: planned.price,
            }));
        }
        debug!(
            ?side,
            consumed = plan.consumed,
            received = plan.received,
            at = timestamp,
            "market order executed"
        );
        Ok(plan.received)
    }

    /// Plan a buy sweep over the ask levels named by the hints.
    ///
    /// Tracks per-order planned consumption so a duplicated hint cannot
    /// over-fill a maker.
    fn plan_market_buy(&self, budget: u128, hints: &[Price]) -> Result<MarketPlan, EngineError> {
        let mut fills = Vec::new();
        let mut planned: HashMap<OrderId, Quantity> = HashMap::new();
        let mut remaining_budget = budget;
        let mut received: u128 = 0;

        'hints: for price in hints {
            if remaining_budget == 0 {
                break;
            }
            let Some(level) = self.book.side(Side::SELL).level(*price) else {
                continue;
            };
            for maker_id in level.iter() {
                let order = self.book.order(maker_id).expect("queued order exists");
                let already = planned.get(&maker_id).copied().unwrap_or(Quantity::ZERO);
                let maker_remaining = order.remaining().saturating_sub(already);
                if maker_remaining.is_zero() {
                    continue;
                }

                let max_base =
                    scaling::base_units_floor(remaining_budget, *price, self.base_scale)?;
                let fill = maker_remaining.min(Quantity::new(max_base));
                // No further fill is possible at this price within the
                // budget, nor at any later (costlier) hint.
                if fill.is_zero() {
                    break 'hints;
                }
                let cost = scaling::quote_units_floor(fill, *price, self.base_scale)?;
                if cost == 0 {
                    break 'hints;
                }

                fills.push(PlannedFill {
                    maker: maker_id,
                    maker_trader: order.trader,
                    fill,
                    quote_value: cost,
                    price: *price,
                });
                planned.insert(
                    maker_id,
                    already
                        .checked_add(fill)
                        .ok_or(EngineError::ArithmeticOverflow)?,
                );
                remaining_budget -= cost;
                received = received
                    .checked_add(fill.as_u128())
                    .ok_or(EngineError::ArithmeticOverflow)?;
                if remaining_budget == 0 {
                    break 'hints;
                }
            }
        }

        Ok(MarketPlan {
            fills,
            consumed: budget - remaining_budget,
            received,
        })
    }

    /// Plan a sell sweep over the bid levels named by the hints.
    fn plan_market_sell(&self, amount: u128, hints: &[Price]) -> Result<MarketPlan, EngineError> {
        let mut fills = Vec::new();
        let mut planned: HashMap<OrderId, Quantity> = HashMap::new();
        let mut remaining_base = amount;
        let mut received: u128 = 0;

        'hints: for price in hints {
            if remaining_base == 0 {
                break;
            }
            let Some(level) = self.book.side(Side::BUY).level(*price) else {
                continue;
            };
            for maker_id in level.iter() {
                let order = self.book.order(maker_id).expect("queued order exists");
                let already = planned.get(&maker_id).copied().unwrap_or(Quantity::ZERO);
                let maker_remaining = order.remaining().saturating_sub(already);
                if maker_remaining.is_zero() {
                    continue;
                }

                let fill = maker_remaining.min(Quantity::new(remaining_base));
                let proceeds = scaling::quote_units_floor(fill, *price, self.base_scale)?;
                // Base must never sell for zero quote.
                if proceeds == 0 {
                    break 'hints;
                }

                fills.push(PlannedFill {
                    maker: maker_id,
                    maker_trader: order.trader,
                    fill,
                    quote_value: proceeds,
                    price: *price,
                });
                planned.insert(
                    maker_id,
                    already
                        .checked_add(fill)
                        .ok_or(EngineError::ArithmeticOverflow)?,
                );
                remaining_base -= fill.as_u128();
                received = received
                    .checked_add(proceeds)
                    .ok_or(EngineError::ArithmeticOverflow)?;
                if remaining_base == 0 {
                    break 'hints;
                }
            }
        }

        Ok(MarketPlan {
            fills,
            consumed: amount - remaining_base,
            received,
        })
    }

    // ───────────────────────── Read access ─────────────────────────

    /// Look up an order by id
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.book.order(id)
    }

    /// Ids of every order a trader has created, oldest first
    pub fn orders_of(&self, trader: AccountId) -> &[OrderId] {
        self.book.orders_of(trader)
    }

    /// Unfilled base units resting at a level
    pub fn liquidity(&self, side: Side, price: Price) -> Quantity {
        self.book.liquidity(side, price)
    }

    /// Price of the most recent trade, zero before the first
    pub fn last_trade_price(&self) -> Price {
        self.book.last_trade_price()
    }

    /// The pair's base asset
    pub fn base_asset(&self) -> Asset {
        self.base
    }

    /// The pair's quote asset
    pub fn quote_asset(&self) -> Asset {
        self.quote
    }

    /// Best bid (highest buy price)
    pub fn best_bid(&self) -> Option<Price> {
        self.book.best_bid()
    }

    /// Best ask (lowest sell price)
    pub fn best_ask(&self) -> Option<Price> {
        self.book.best_ask()
    }

    /// Bounded depth snapshot from the best price outward
    pub fn depth(&self, side: Side, limit: usize) -> Vec<(Price, Quantity)> {
        self.book.depth(side, limit)
    }

    /// Number of orders ever created on this pair
    pub fn order_count(&self) -> usize {
        self.book.order_count()
    }

    /// The underlying book (integrity checks, snapshots)
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Events emitted so far
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Take and clear the event log
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
