//! Order book infrastructure
//!
//! Contains the price index, price levels, and the per-pair order book.
//! The book is a pure state transformer: it never touches the Ledger.

pub mod price_index;
pub mod price_level;

pub use price_index::PriceIndex;
pub use price_level::PriceLevel;

use std::collections::HashMap;
use types::ids::{AccountId, OrderId};
use types::order::{Order, Side};
use types::units::{Price, Quantity};

/// One side of the book: the ordered price set plus the level map.
///
/// Invariant: a price is indexed iff its level exists iff that level has
/// resting liquidity.
#[derive(Debug, Clone, Default)]
pub struct BookSide {
    index: PriceIndex,
    levels: HashMap<Price, PriceLevel>,
}

impl BookSide {
    fn new() -> Self {
        Self {
            index: PriceIndex::new(),
            levels: HashMap::new(),
        }
    }

    /// The level at a price, if any liquidity rests there
    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// The price index for this side
    pub fn index(&self) -> &PriceIndex {
        &self.index
    }

    fn prune_if_empty(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(|level| level.is_empty()) {
            self.levels.remove(&price);
            self.index.remove(price);
        }
    }
}

/// The order book for a single trading pair.
///
/// Orders live in a dense append-only table indexed by `id - 1`; entries
/// are retained after fill or cancel and ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    bids: BookSide,
    asks: BookSide,
    orders: Vec<Order>,
    by_trader: HashMap<AccountId, Vec<OrderId>>,
    next_order_id: u64,
    last_trade_price: Price,
}

impl OrderBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(),
            asks: BookSide::new(),
            orders: Vec::new(),
            by_trader: HashMap::new(),
            next_order_id: 1,
            last_trade_price: Price::ZERO,
        }
    }

    fn book_side(&self, side: Side) -> &BookSide {
        match side {
            Side::BUY => &self.bids,
            Side::SELL => &self.asks,
        }
    }

    fn book_side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::BUY => &mut self.bids,
            Side::SELL => &mut self.asks,
        }
    }

    /// Insert a fresh resting order and return its assigned id.
    ///
    /// Creates the price level and index entry lazily and appends the
    /// order at the back of the level's FIFO.
    pub fn insert_resting(
        &mut self,
        trader: AccountId,
        side: Side,
        price: Price,
        amount: Quantity,
        timestamp: i64,
    ) -> OrderId {
        let id = OrderId::new(self.next_order_id);
        self.next_order_id += 1;

        let order = Order::new(id, trader, side, price, amount, timestamp);
        self.orders.push(order);
        self.by_trader.entry(trader).or_default().push(id);

        let book_side = self.book_side_mut(side);
        book_side
            .levels
            .entry(price)
            .or_insert_with(PriceLevel::new)
            .push_back(id, amount);
        book_side.index.insert(price);

        id
    }

    /// Look up an order by id
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(id.table_index()?)
    }

    fn order_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.get_mut(id.table_index()?)
    }

    /// Peek the first resting order at a level
    pub fn head(&self, side: Side, price: Price) -> Option<OrderId> {
        self.book_side(side).level(price)?.head()
    }

    /// Apply a fill to a resting order.
    ///
    /// Dequeues the order and marks it inactive when fully filled, and
    /// removes the price from the index in the same step that empties
    /// the level.
    pub fn apply_fill(&mut self, id: OrderId, fill: Quantity) {
        let order = self.order_mut(id).expect("fill targets a known order");
        let side = order.side;
        let price = order.price;
        order.record_fill(fill);
        let fully_filled = order.is_filled();

        let book_side = self.book_side_mut(side);
        let level = book_side
            .levels
            .get_mut(&price)
            .expect("resting order has a level");
        level.release_liquidity(fill);
        if fully_filled {
            level.unlink(id);
        }
        book_side.prune_if_empty(price);
    }

    /// Unlink an order from its level (cancel path) and retire it.
    ///
    /// The order may sit anywhere in the FIFO. Returns the unfilled
    /// remainder released back to the trader.
    pub fn remove_order(&mut self, id: OrderId) -> Quantity {
        let order = self.order_mut(id).expect("cancel targets a known order");
        let side = order.side;
        let price = order.price;
        let remaining = order.remaining();
        order.retire();

        let book_side = self.book_side_mut(side);
        if let Some(level) = book_side.levels.get_mut(&price) {
            level.unlink(id);
            level.release_liquidity(remaining);
            book_side.prune_if_empty(price);
        }
        remaining
    }

    /// Resize an order in place, preserving its FIFO position.
    ///
    /// The caller has already validated `new_amount` against the filled
    /// quantity, so the level stays non-empty and the index untouched.
    pub fn amend_amount(&mut self, id: OrderId, new_amount: Quantity) {
        let order = self.order_mut(id).expect("amend targets a known order");
        let side = order.side;
        let price = order.price;
        let old_amount = order.amount;
        order.amount = new_amount;

        let level = self
            .book_side_mut(side)
            .levels
            .get_mut(&price)
            .expect("resting order has a level");
        if new_amount > old_amount {
            level.add_liquidity(new_amount.saturating_sub(old_amount));
        } else {
            level.release_liquidity(old_amount.saturating_sub(new_amount));
        }
    }

    /// Total unfilled base units resting at a level
    pub fn liquidity(&self, side: Side, price: Price) -> Quantity {
        self.book_side(side)
            .level(price)
            .map(|level| level.total_liquidity())
            .unwrap_or(Quantity::ZERO)
    }

    /// Read access to one side (market planning, depth views)
    pub fn side(&self, side: Side) -> &BookSide {
        self.book_side(side)
    }

    /// Best bid (highest buy price)
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.index.best_max()
    }

    /// Best ask (lowest sell price)
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.index.best_min()
    }

    /// Bounded depth snapshot from the best price outward.
    pub fn depth(&self, side: Side, limit: usize) -> Vec<(Price, Quantity)> {
        let book_side = self.book_side(side);
        let prices: Vec<Price> = match side {
            Side::BUY => book_side.index.descending(limit).collect(),
            Side::SELL => book_side.index.ascending(limit).collect(),
        };
        prices
            .into_iter()
            .map(|price| {
                let liquidity = book_side
                    .level(price)
                    .map(|level| level.total_liquidity())
                    .unwrap_or(Quantity::ZERO);
                (price, liquidity)
            })
            .collect()
    }

    /// Ids of every order a trader has created, oldest first
    pub fn orders_of(&self, trader: AccountId) -> &[OrderId] {
        self.by_trader
            .get(&trader)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Price of the most recent trade, zero before the first
    pub fn last_trade_price(&self) -> Price {
        self.last_trade_price
    }

    pub(crate) fn set_last_trade_price(&mut self, price: Price) {
        self.last_trade_price = price;
    }

    /// Number of orders ever created
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Verify the structural invariants of both sides.
    ///
    /// For every level: non-empty queue, liquidity equal to the summed
    /// remainders of its active orders, and an index entry; and the
    /// index holds no price without a level.
    pub fn verify_integrity(&self) -> bool {
        for book_side in [&self.bids, &self.asks] {
            for (price, level) in &book_side.levels {
                if level.is_empty() || !book_side.index.contains(*price) {
                    return false;
                }
                let mut expected = Quantity::ZERO;
                for id in level.iter() {
                    let Some(order) = self.order(id) else {
                        return false;
                    };
                    if !order.active || order.price != *price {
                        return false;
                    }
                    expected = match expected.checked_add(order.remaining()) {
                        Some(sum) => sum,
                        None => return false,
                    };
                }
                if level.total_liquidity() != expected || expected.is_zero() {
                    return false;
                }
            }
            if book_side.index.len() != book_side.levels.len() {
                return false;
            }
        }
        true
    }
}
