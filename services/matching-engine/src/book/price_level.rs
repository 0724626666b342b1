//! Price level implementation with FIFO queue
//!
//! A price level holds the ids of all resting orders at one price on one
//! side of the book, in arrival order. Time priority within the level is
//! the queue order; the order data itself lives in the book's arena.

use std::collections::VecDeque;
use types::ids::OrderId;

/// FIFO queue of resting order ids at a specific price
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    orders: VecDeque<OrderId>,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order at the back of the queue (time priority)
    pub fn push_back(&mut self, order_id: OrderId) {
        self.orders.push_back(order_id);
    }

    /// The order with time priority at this price
    pub fn front(&self) -> Option<OrderId> {
        self.orders.front().copied()
    }

    /// Remove an order wherever it sits in the queue
    ///
    /// Returns false if the id is not present.
    pub fn remove(&mut self, order_id: OrderId) -> bool {
        match self.orders.iter().position(|id| *id == order_id) {
            Some(position) => {
                self.orders.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.orders.iter().copied()
    }
}
