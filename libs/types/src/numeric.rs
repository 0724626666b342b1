//! Integer minor-unit types for prices and quantities
//!
//! All prices and quantities on the wire are integers in contract-defined
//! minor units; tick size, lot size and denominator govern conversion to
//! display units, which is a collaborator concern. Keeping the core in
//! integers avoids any rounding questions inside matching and settlement.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Sub, SubAssign};

/// Limit or execution price in minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    pub fn new(ticks: i64) -> Self {
        Self(ticks)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Price {
    fn from(ticks: i64) -> Self {
        Self(ticks)
    }
}

/// Order or trade quantity in lots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    pub fn new(lots: u64) -> Self {
        Self(lots)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Signed view, used when building ledger postings
    pub fn as_i64(&self) -> i64 {
        self.0 as i64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Quantity {
    fn from(lots: u64) -> Self {
        Self(lots)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    /// # Panics
    /// Panics on underflow; callers must never subtract more than is left.
    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0.checked_sub(rhs.0).expect("quantity underflow"))
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Quantity) {
        *self = *self - rhs;
    }
}
