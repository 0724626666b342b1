//! Trade settlement through balanced journals
//!
//! Every trade the matching engine produces is committed here: the traded
//! quantity is debited/credited between the counterparties as a `Trade`
//! journal whose construction re-checks the double-entry invariant. Either
//! the whole journal (trade record, postings, position updates) lands in
//! the store or nothing does — the sole boundary preventing partial
//! settlement.

use tracing::{debug, error};
use types::prelude::*;

use crate::store::TransactionalStore;

/// Owns the transactional store and settles trades into it
#[derive(Debug, Default)]
pub struct Accountant {
    store: TransactionalStore,
}

impl Accountant {
    pub fn new(store: TransactionalStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TransactionalStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TransactionalStore {
        &mut self.store
    }

    /// Validate a trade's settlement without persisting anything
    ///
    /// Looks up both counterparty accounts and builds the balance-audited
    /// journal. Every fallible step of settlement happens here; a failure
    /// leaves the store byte-identical, so callers may sequence their own
    /// state changes between `prepare_trade` and `commit_prepared`.
    pub fn prepare_trade(&self, trade: &Trade) -> Result<Journal, LedgerError> {
        let buyer_type = self.store.account_type(&trade.buyer)?;
        let seller_type = self.store.account_type(&trade.seller)?;

        let postings = vec![
            Posting::new(
                &trade.buyer,
                buyer_type,
                trade.contract,
                trade.quantity,
                receiving_side(buyer_type),
            ),
            Posting::new(
                &trade.seller,
                seller_type,
                trade.contract,
                trade.quantity,
                paying_side(seller_type),
            ),
        ];

        let note = format!(
            "trade {}@{} {}/{}",
            trade.quantity, trade.price, trade.buyer, trade.seller
        );
        Journal::new(JournalType::Trade, postings, trade.timestamp, Some(note)).map_err(|err| {
            error!(trade_id = %trade.trade_id, %err, "journal audit failed, trade not settled");
            err
        })
    }

    /// Persist a prepared trade: record, journal, postings, positions
    ///
    /// Infallible by construction: the journal already passed its balance
    /// audit and `commit_journal` applies everything in one mutation.
    pub fn commit_prepared(&mut self, trade: &Trade, journal: Journal) -> JournalId {
        let journal_id = journal.journal_id;
        self.store.record_trade(trade.clone());
        self.store.commit_journal(journal);

        debug!(
            trade_id = %trade.trade_id,
            journal_id = %journal_id,
            quantity = %trade.quantity,
            price = %trade.price,
            "trade settled"
        );
        journal_id
    }

    /// Settle one trade atomically
    ///
    /// The buyer's posting carries `+quantity` and the seller's
    /// `-quantity` (entry side chosen from each owner's account type), so
    /// positions track the contract moving from seller to buyer. A journal
    /// that fails its balance audit — possible only through a logic defect
    /// upstream — persists nothing and surfaces `UnbalancedJournal`.
    pub fn commit_trade(&mut self, trade: &Trade) -> Result<JournalId, LedgerError> {
        let journal = self.prepare_trade(trade)?;
        Ok(self.commit_prepared(trade, journal))
    }
}

/// Entry side that increases a balance: debit for assets, credit for
/// liabilities
fn receiving_side(account_type: AccountType) -> EntrySide {
    match account_type {
        AccountType::Asset => EntrySide::Debit,
        AccountType::Liability => EntrySide::Credit,
    }
}

fn paying_side(account_type: AccountType) -> EntrySide {
    match receiving_side(account_type) {
        EntrySide::Debit => EntrySide::Credit,
        EntrySide::Credit => EntrySide::Debit,
    }
}
