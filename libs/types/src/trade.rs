//! Trade execution types

use crate::ids::{ContractId, OrderId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::{Order, Side};
use serde::{Deserialize, Serialize};

/// Immutable record of one execution
///
/// The execution price is always the resting (passive) order's price, so
/// price improvement goes to the aggressor. The timestamp is the later of
/// the two orders' arrival times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub contract: ContractId,
    pub aggressive_order: OrderId,
    pub passive_order: OrderId,
    pub buyer: String,
    pub seller: String,
    pub price: Price,
    pub quantity: Quantity,
    /// Unix nanos; max of the two orders' arrival timestamps
    pub timestamp: i64,
}

impl Trade {
    /// Create the trade for a match between an aggressive and a passive order
    pub fn between(aggressive: &Order, passive: &Order, quantity: Quantity) -> Self {
        debug_assert_ne!(aggressive.side, passive.side);

        let (buyer, seller) = match aggressive.side {
            Side::BUY => (aggressive.username.clone(), passive.username.clone()),
            Side::SELL => (passive.username.clone(), aggressive.username.clone()),
        };

        Self {
            trade_id: TradeId::new(),
            contract: aggressive.contract,
            aggressive_order: aggressive.order_id,
            passive_order: passive.order_id,
            buyer,
            seller,
            price: passive.price,
            quantity,
            timestamp: aggressive.timestamp.max(passive.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: u64, username: &str, side: Side, price: i64, quantity: u64, ts: i64) -> Order {
        Order::new(
            OrderId::new(id),
            username,
            ContractId::new(1),
            side,
            Price::new(price),
            Quantity::new(quantity),
            ts,
        )
    }

    #[test]
    fn test_price_is_passive_price() {
        let aggressive = order(2, "alice", Side::BUY, 105, 10, 20);
        let passive = order(1, "bob", Side::SELL, 100, 10, 10);

        let trade = Trade::between(&aggressive, &passive, Quantity::new(10));
        assert_eq!(trade.price, Price::new(100));
        assert_eq!(trade.aggressive_order, OrderId::new(2));
        assert_eq!(trade.passive_order, OrderId::new(1));
    }

    #[test]
    fn test_timestamp_is_max_of_arrivals() {
        let aggressive = order(2, "alice", Side::SELL, 100, 5, 30);
        let passive = order(1, "bob", Side::BUY, 100, 5, 10);

        let trade = Trade::between(&aggressive, &passive, Quantity::new(5));
        assert_eq!(trade.timestamp, 30);
    }

    #[test]
    fn test_buyer_seller_assignment() {
        let aggressive = order(2, "alice", Side::SELL, 100, 5, 2);
        let passive = order(1, "bob", Side::BUY, 100, 5, 1);

        let trade = Trade::between(&aggressive, &passive, Quantity::new(5));
        assert_eq!(trade.buyer, "bob");
        assert_eq!(trade.seller, "alice");
    }
}
