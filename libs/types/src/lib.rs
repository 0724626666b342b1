//! Types library for the matching and settlement core
//!
//! This library provides the domain types shared by the order book,
//! matching engine and ledger, ensuring type safety and deterministic
//! behavior.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, ContractId, TradeId, JournalId)
//! - `numeric`: Integer minor-unit types (Price, Quantity)
//! - `contract`: Tradable contract metadata
//! - `order`: Order lifecycle types
//! - `trade`: Trade execution types
//! - `ledger`: Double-entry accounting types (Journal, Posting, Position)
//! - `errors`: Error taxonomy

// Public modules
pub mod contract;
pub mod errors;
pub mod ids;
pub mod ledger;
pub mod numeric;
pub mod order;
pub mod trade;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::contract::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::ledger::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
}
