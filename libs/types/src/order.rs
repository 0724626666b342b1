//! Order lifecycle types

use crate::ids::{ContractId, OrderId};
use crate::numeric::{Price, Quantity};
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

/// A limit order
///
/// `quantity_left` is decremented by the matching algorithm; the record
/// with its final `quantity_left` persists in the transactional store even
/// after the order leaves the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub username: String,
    pub contract: ContractId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub quantity_left: Quantity,
    pub is_cancelled: bool,
    /// Arrival time, unix nanos
    pub timestamp: i64,
}

impl Order {
    pub fn new(
        order_id: OrderId,
        username: impl Into<String>,
        contract: ContractId,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id,
            username: username.into(),
            contract,
            side,
            price,
            quantity,
            quantity_left: quantity,
            is_cancelled: false,
            timestamp,
        }
    }

    /// Check quantity invariant: 0 <= quantity_left <= quantity
    pub fn check_invariant(&self) -> bool {
        self.quantity_left <= self.quantity
    }

    pub fn is_filled(&self) -> bool {
        self.quantity_left.is_zero()
    }

    /// Whether this order's limit crosses the given best opposing price
    ///
    /// A BUY crosses when its limit is at or above the best ask; a SELL
    /// crosses when its limit is at or below the best bid.
    pub fn crosses(&self, best: Price) -> bool {
        match self.side {
            Side::BUY => self.price >= best,
            Side::SELL => self.price <= best,
        }
    }

    /// Decrement the remaining quantity by a fill
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity; the matching
    /// algorithm always fills `min(incoming, resting)`.
    pub fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity <= self.quantity_left,
            "fill would exceed remaining quantity"
        );
        self.quantity_left -= quantity;
        debug_assert!(self.check_invariant());
    }

    pub fn cancel(&mut self) {
        self.is_cancelled = true;
    }
}
