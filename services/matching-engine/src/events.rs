//! Event taxonomy
//!
//! Events are immutable records appended by engine and registry
//! operations. Consumers drain them as an observable side channel; the
//! engine itself never reads them back.

use serde::{Deserialize, Serialize};
use types::asset::Asset;
use types::ids::{AccountId, AssetId, OrderId};
use types::order::Side;
use types::units::{Price, Quantity};

/// A new order was accepted onto the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub trader: AccountId,
    pub id: OrderId,
    pub price: Price,
    pub amount: Quantity,
    pub side: Side,
}

/// An order was cancelled by its trader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub id: OrderId,
    pub trader: AccountId,
}

/// An order was resized in place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAmended {
    pub id: OrderId,
    pub trader: AccountId,
    pub new_amount: Quantity,
}

/// A resting order received a fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    pub id: OrderId,
    pub trader: AccountId,
    /// Base units traded in this fill
    pub amount: Quantity,
    /// Cumulative filled base units after this fill
    pub filled: Quantity,
    /// Unfilled base units still resting
    pub remaining: Quantity,
    pub side: Side,
}

/// A trade crossed between a buyer and a seller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeExecuted {
    pub buyer: AccountId,
    pub seller: AccountId,
    pub base_amount: Quantity,
    pub price: Price,
}

/// Enum wrapper for all engine events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    OrderCreated(OrderCreated),
    OrderCancelled(OrderCancelled),
    OrderAmended(OrderAmended),
    OrderFilled(OrderFilled),
    TradeExecuted(TradeExecuted),
}

/// A trading pair was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCreated {
    pub key: [u8; 32],
    pub base: Asset,
    pub quote: Asset,
}

/// A quote token was added to the whitelist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTokenAdded {
    pub asset: AssetId,
}

/// Enum wrapper for all registry events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    PairCreated(PairCreated),
    QuoteTokenAdded(QuoteTokenAdded),
}
