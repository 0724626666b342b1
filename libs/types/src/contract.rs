//! Tradable contract metadata
//!
//! The matching core only needs the identity and ticker of the contract it
//! serves; tick size, lot size and denominator are carried through so the
//! display-unit conversion done by outer layers has a single source.

use crate::ids::ContractId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub ticker: String,
    pub tick_size: i64,
    pub lot_size: u64,
    pub denominator: i64,
}

impl Contract {
    /// Create a contract with unit tick/lot/denominator defaults
    pub fn new(id: ContractId, ticker: impl Into<String>) -> Self {
        Self {
            id,
            ticker: ticker.into(),
            tick_size: 1,
            lot_size: 1,
            denominator: 1,
        }
    }
}
