//! Error taxonomy for the matching and settlement core
//!
//! Errors split into three classes: recoverable per-request failures
//! (malformed input, cancel of a non-resting order), ledger failures that
//! abort a single commit, and fatal failures that must halt the engine
//! instance so a supervisor can rebuild book state from the store.

use crate::ids::{ContractId, OrderId};
use thiserror::Error;

/// Ledger and transactional-store errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("journal does not balance for contract {contract}: residual {sum}")]
    UnbalancedJournal { contract: ContractId, sum: i64 },

    #[error("journal has no non-zero postings")]
    EmptyJournal,

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("order not found in store: {0}")]
    UnknownOrder(OrderId),
}

/// Per-request engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Cancel target is not currently resting (already filled or cancelled)
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// Undecodable or invalid inbound request; logged and skipped
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Unexpected invariant violation while processing a request
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl EngineError {
    /// Whether this failure must halt the engine instance
    ///
    /// Malformed requests are skipped and failed cancels are reported;
    /// everything else risks book/ledger divergence and is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            EngineError::OrderNotFound(_) | EngineError::MalformedRequest(_)
        )
    }
}

/// Surfaced fatal failure of one engine instance
///
/// The engine stops processing its contract's stream when this is
/// returned; the supervising component decides whether to rebuild book
/// state from the store's open orders and restart.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("engine halted: {source}")]
pub struct FatalError {
    #[from]
    pub source: EngineError,
}
