//! Ledger Service
//!
//! Settlement side of the matching core: a transactional store holding
//! accounts, order records, trades, journals and positions, the accountant
//! that turns every trade into a balanced double-entry journal, and batch
//! reconciliation tooling.
//!
//! **Key invariants:**
//! - Every committed journal balances to zero per contract
//! - A trade settles atomically: journal, postings and positions together
//! - Positions equal the sum of their postings (checked by `audit`)

pub mod accountant;
pub mod audit;
pub mod store;

pub use accountant::Accountant;
pub use audit::{audit_store, AuditReport};
pub use store::TransactionalStore;
