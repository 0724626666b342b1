//! Bid (buy-side) price levels
//!
//! Levels are keyed by price in a `BTreeMap`; the best bid is the highest
//! key present, so the best-price invariant holds by construction after
//! every structural mutation.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::Price;

use super::price_level::PriceLevel;

#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, price: Price, order_id: OrderId) {
        self.levels.entry(price).or_default().push_back(order_id);
    }

    /// Remove an order; drained levels are dropped immediately
    pub fn remove(&mut self, price: Price, order_id: OrderId) -> bool {
        if let Some(level) = self.levels.get_mut(&price) {
            if level.remove(order_id) {
                if level.is_empty() {
                    self.levels.remove(&price);
                }
                return true;
            }
        }
        false
    }

    /// Best bid: the highest price with resting orders
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    /// The order with time priority at the given price
    pub fn front_at(&self, price: Price) -> Option<OrderId> {
        self.levels.get(&price).and_then(|level| level.front())
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Levels from best to worst
    pub fn levels(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().rev().map(|(price, level)| (*price, level))
    }
}
