//! Order lifecycle types
//!
//! An order rests on the book while `active`, accumulates fills, and is
//! retired by a full fill or a cancel. Entries stay in the order table
//! forever; FIFO priority is placement sequence, the timestamp is audit
//! data only.

use crate::ids::{AccountId, OrderId};
use crate::units::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

/// A limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub trader: AccountId,
    pub price: Price,
    /// Total base-smallest-units of the order
    pub amount: Quantity,
    /// Base-smallest-units already traded; `filled <= amount` always
    pub filled: Quantity,
    pub side: Side,
    /// Placement time, audit only
    pub timestamp: i64,
    /// True while the order rests on the book
    pub active: bool,
}

impl Order {
    /// Create a fresh resting order.
    pub fn new(
        id: OrderId,
        trader: AccountId,
        side: Side,
        price: Price,
        amount: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            trader,
            price,
            amount,
            filled: Quantity::ZERO,
            side,
            timestamp,
            active: true,
        }
    }

    /// Unfilled base units still resting.
    pub fn remaining(&self) -> Quantity {
        self.amount.saturating_sub(self.filled)
    }

    /// Check if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled == self.amount
    }

    /// Record a fill and deactivate on completion.
    ///
    /// # Panics
    /// Panics if the fill would exceed the order amount.
    pub fn record_fill(&mut self, fill: Quantity) {
        let new_filled = self
            .filled
            .checked_add(fill)
            .filter(|f| *f <= self.amount);
        self.filled = new_filled.expect("fill exceeds order amount");
        if self.is_filled() {
            self.active = false;
        }
    }

    /// Deactivate without filling (cancel path).
    pub fn retire(&mut self) {
        self.active = false;
    }

    /// Quantity invariant: `filled <= amount`.
    pub fn check_invariant(&self) -> bool {
        self.filled <= self.amount
    }
}
