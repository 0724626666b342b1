//! Outbound notifications and the publish channel
//!
//! Events carry the exact wire shapes the outer layers fan out to clients:
//!
//! ```text
//! {"open_orders": [username, {order, quantity, price, side, ticker, contract_id}]}
//! {"fill":        [username, {order, quantity, price}]}
//! {"cancel":      [username, {order}]}
//! {"trade":       {ticker, quantity, price}}
//! {"book_update": {ticker: [{quantity, price, order_side}, ...]}}
//! {"safe_price":  {ticker: price}}
//! ```
//!
//! Publishing is fire-and-forget: the engine never waits on or learns
//! about delivery.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::mpsc;
use tracing::debug;
use types::prelude::*;

/// One row of the full book snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BookEntry {
    pub quantity: Quantity,
    pub price: Price,
    pub order_side: Side,
}

/// Notification published by the matching engine
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A remainder was placed in the book, reported to its owner
    OpenOrders {
        username: String,
        order: OrderId,
        quantity: Quantity,
        price: Price,
        side: Side,
        ticker: String,
        contract_id: ContractId,
    },
    /// One party's execution report
    Fill {
        username: String,
        order: OrderId,
        quantity: Quantity,
        price: Price,
    },
    /// A resting order left the book on request
    Cancel { username: String, order: OrderId },
    /// Public tape entry
    Trade {
        ticker: String,
        quantity: Quantity,
        price: Price,
    },
    /// Full book snapshot
    BookUpdate {
        ticker: String,
        entries: Vec<BookEntry>,
    },
    /// Safe price recomputation
    SafePrice { ticker: String, price: Price },
}

impl Event {
    /// Wire representation
    pub fn to_json(&self) -> Value {
        match self {
            Event::OpenOrders {
                username,
                order,
                quantity,
                price,
                side,
                ticker,
                contract_id,
            } => json!({
                "open_orders": [username, {
                    "order": order,
                    "quantity": quantity,
                    "price": price,
                    "side": side,
                    "ticker": ticker,
                    "contract_id": contract_id,
                }]
            }),
            Event::Fill {
                username,
                order,
                quantity,
                price,
            } => json!({
                "fill": [username, {"order": order, "quantity": quantity, "price": price}]
            }),
            Event::Cancel { username, order } => json!({
                "cancel": [username, {"order": order}]
            }),
            Event::Trade {
                ticker,
                quantity,
                price,
            } => json!({
                "trade": {"ticker": ticker, "quantity": quantity, "price": price}
            }),
            Event::BookUpdate { ticker, entries } => {
                let mut by_ticker = serde_json::Map::new();
                by_ticker.insert(ticker.clone(), json!(entries));
                json!({ "book_update": by_ticker })
            }
            Event::SafePrice { ticker, price } => {
                let mut by_ticker = serde_json::Map::new();
                by_ticker.insert(ticker.clone(), json!(price));
                json!({ "safe_price": by_ticker })
            }
        }
    }
}

/// Outbound publish channel seen from the engine
///
/// Implementations must not block; there is no acknowledgement or
/// backpressure.
pub trait Publisher {
    fn publish(&self, event: Event);
}

/// Publisher backed by an in-process channel
///
/// The receiving half belongs to the bus adapter that fans events out.
pub struct ChannelPublisher {
    tx: mpsc::Sender<Event>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, event: Event) {
        if self.tx.send(event).is_err() {
            debug!("event dropped, no subscriber");
        }
    }
}

/// Publisher that discards everything
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn publish(&self, _event: Event) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_orders_wire_shape() {
        let event = Event::OpenOrders {
            username: "alice".into(),
            order: OrderId::new(7),
            quantity: Quantity::new(5),
            price: Price::new(101),
            side: Side::BUY,
            ticker: "BTC/USD".into(),
            contract_id: ContractId::new(1),
        };
        assert_eq!(
            event.to_json(),
            json!({"open_orders": ["alice", {
                "order": 7, "quantity": 5, "price": 101,
                "side": "BUY", "ticker": "BTC/USD", "contract_id": 1,
            }]})
        );
    }

    #[test]
    fn test_fill_wire_shape() {
        let event = Event::Fill {
            username: "bob".into(),
            order: OrderId::new(3),
            quantity: Quantity::new(10),
            price: Price::new(100),
        };
        assert_eq!(
            event.to_json(),
            json!({"fill": ["bob", {"order": 3, "quantity": 10, "price": 100}]})
        );
    }

    #[test]
    fn test_cancel_wire_shape() {
        let event = Event::Cancel {
            username: "carol".into(),
            order: OrderId::new(9),
        };
        assert_eq!(event.to_json(), json!({"cancel": ["carol", {"order": 9}]}));
    }

    #[test]
    fn test_trade_and_safe_price_wire_shapes() {
        let trade = Event::Trade {
            ticker: "BTC/USD".into(),
            quantity: Quantity::new(2),
            price: Price::new(105),
        };
        assert_eq!(
            trade.to_json(),
            json!({"trade": {"ticker": "BTC/USD", "quantity": 2, "price": 105}})
        );

        let safe = Event::SafePrice {
            ticker: "BTC/USD".into(),
            price: Price::new(104),
        };
        assert_eq!(safe.to_json(), json!({"safe_price": {"BTC/USD": 104}}));
    }

    #[test]
    fn test_book_update_wire_shape() {
        let event = Event::BookUpdate {
            ticker: "BTC/USD".into(),
            entries: vec![BookEntry {
                quantity: Quantity::new(5),
                price: Price::new(100),
                order_side: Side::SELL,
            }],
        };
        assert_eq!(
            event.to_json(),
            json!({"book_update": {"BTC/USD": [
                {"quantity": 5, "price": 100, "order_side": "SELL"}
            ]}})
        );
    }

    #[test]
    fn test_channel_publisher_delivers_in_order() {
        let (publisher, rx) = ChannelPublisher::new();
        publisher.publish(Event::Cancel {
            username: "a".into(),
            order: OrderId::new(1),
        });
        publisher.publish(Event::Cancel {
            username: "b".into(),
            order: OrderId::new(2),
        });

        let events: Vec<Event> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Event::Cancel { username, .. } if username == "a"));
    }

    #[test]
    fn test_channel_publisher_fire_and_forget() {
        let (publisher, rx) = ChannelPublisher::new();
        drop(rx);
        // Must not panic or block with the subscriber gone.
        publisher.publish(Event::Cancel {
            username: "a".into(),
            order: OrderId::new(1),
        });
    }
}
