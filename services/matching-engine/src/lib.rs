//! Matching Engine Service
//!
//! Order matching core implementing price-time priority for a single
//! tradable contract per engine instance. Consumes decoded order/cancel
//! requests from an ordered inbound stream, drives the order book, settles
//! every execution through the ledger, feeds the safe-price publisher and
//! emits book/trade/fill/cancel/open-order notifications.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced (FIFO within a price level)
//! - Execution always at the resting order's price (price improvement to
//!   the aggressor)
//! - Every trade settles as a balanced double-entry journal before the
//!   next match proceeds
//! - The book is never crossed after a request completes

pub mod book;
pub mod engine;
pub mod events;
pub mod requests;
pub mod safe_price;

pub use book::OrderBook;
pub use engine::{Engine, EngineConfig};
pub use events::{ChannelPublisher, Event, NullPublisher, Publisher};
pub use requests::Request;
pub use safe_price::SafePricePublisher;
