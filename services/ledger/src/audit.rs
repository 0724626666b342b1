//! Batch ledger reconciliation
//!
//! Offline consumer of the ledger invariants: re-audits every committed
//! journal and recomputes every position from its postings. Read-only; the
//! engine never waits on it.

use std::collections::BTreeMap;

use tracing::warn;
use types::prelude::*;

use crate::store::TransactionalStore;

/// A position whose stored balance disagrees with its postings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionBreak {
    pub username: String,
    pub contract: ContractId,
    pub recorded: i64,
    pub calculated: i64,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    /// Journals whose balance audit no longer passes
    pub unbalanced_journals: Vec<JournalId>,
    /// Positions that do not equal the sum of their postings
    pub position_breaks: Vec<PositionBreak>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.unbalanced_journals.is_empty() && self.position_breaks.is_empty()
    }
}

/// Reconcile the store's journals and positions
pub fn audit_store(store: &TransactionalStore) -> AuditReport {
    let mut report = AuditReport::default();

    for journal in store.journals() {
        if !journal.is_balanced() {
            warn!(journal_id = %journal.journal_id, "journal audit failed");
            report.unbalanced_journals.push(journal.journal_id);
        }
    }

    // Positions implied by the postings, keyed (owner, contract)
    let mut calculated: BTreeMap<(String, ContractId), i64> = BTreeMap::new();
    for journal in store.journals() {
        for posting in journal.postings() {
            *calculated
                .entry((posting.username.clone(), posting.contract))
                .or_insert(0) += posting.quantity;
        }
    }

    // Compare over the union of recorded and calculated keys
    for position in store.positions() {
        let key = (position.username.clone(), position.contract);
        let expected = calculated.remove(&key).unwrap_or(0);
        if expected != position.position {
            warn!(
                username = %position.username,
                contract = %position.contract,
                recorded = position.position,
                calculated = expected,
                "position audit failure"
            );
            report.position_breaks.push(PositionBreak {
                username: position.username,
                contract: position.contract,
                recorded: position.position,
                calculated: expected,
            });
        }
    }
    for ((username, contract), calculated) in calculated {
        if calculated != 0 {
            report.position_breaks.push(PositionBreak {
                username,
                contract,
                recorded: 0,
                calculated,
            });
        }
    }

    report
}
