//! Order book for a single contract
//!
//! The book owns an arena of the currently resting orders, keyed by
//! `OrderId`, and two price-indexed sides holding id queues. An order is
//! either resting (present in the arena and exactly one level) or gone
//! from the book entirely; cancelled and fully filled orders never rest.

pub mod ask_book;
pub mod bid_book;
pub mod price_level;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use price_level::PriceLevel;

use std::collections::HashMap;
use std::fmt::Write as _;

use types::prelude::*;

#[derive(Debug, Default)]
pub struct OrderBook {
    /// Resting orders, the authoritative quantity_left during matching
    orders: HashMap<OrderId, Order>,
    bids: BidBook,
    asks: AskBook,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an order with remaining quantity at the back of its level
    pub fn submit_resting(&mut self, order: Order) {
        debug_assert!(!order.is_filled() && !order.is_cancelled);
        match order.side {
            Side::BUY => self.bids.insert(order.price, order.order_id),
            Side::SELL => self.asks.insert(order.price, order.order_id),
        }
        self.orders.insert(order.order_id, order);
    }

    /// Remove a resting order, returning it; None if not resting
    ///
    /// No mutation happens when the id is unknown.
    pub fn remove_resting(&mut self, order_id: OrderId) -> Option<Order> {
        let order = self.orders.remove(&order_id)?;
        let removed = match order.side {
            Side::BUY => self.bids.remove(order.price, order_id),
            Side::SELL => self.asks.remove(order.price, order_id),
        };
        debug_assert!(removed, "arena and levels out of sync");
        Some(order)
    }

    /// Best resting price on the given side
    pub fn best(&self, side: Side) -> Option<Price> {
        match side {
            Side::BUY => self.bids.best_price(),
            Side::SELL => self.asks.best_price(),
        }
    }

    /// The time-priority order at a price on the given side
    pub fn front_at(&self, side: Side, price: Price) -> Option<OrderId> {
        match side {
            Side::BUY => self.bids.front_at(price),
            Side::SELL => self.asks.front_at(price),
        }
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    pub fn order_mut(&mut self, order_id: OrderId) -> Option<&mut Order> {
        self.orders.get_mut(&order_id)
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.orders.contains_key(&order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// All resting orders in id order, for the full book snapshot
    pub fn resting_orders(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.orders.values().collect();
        orders.sort_by_key(|o| o.order_id);
        orders
    }

    /// Console rendering of the book, best prices innermost
    pub fn render(&self) -> String {
        let mut out = String::from("***\n");
        for (price, level) in self.asks.levels().collect::<Vec<_>>().into_iter().rev() {
            self.render_level(&mut out, price, level);
        }
        out.push_str("-----\n");
        for (price, level) in self.bids.levels() {
            self.render_level(&mut out, price, level);
        }
        out.push_str("***");
        out
    }

    fn render_level(&self, out: &mut String, price: Price, level: &PriceLevel) {
        let quantities: Vec<String> = level
            .iter()
            .filter_map(|id| self.orders.get(&id))
            .map(|o| o.quantity_left.to_string())
            .collect();
        let _ = writeln!(out, "{}:{}", price, quantities.join("+"));
    }
}
