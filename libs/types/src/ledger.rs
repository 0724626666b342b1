//! Double-entry accounting types
//!
//! A `Journal` is one accounting transaction made of `Posting` legs. The
//! construction of a journal is the enforcement point for the double-entry
//! invariant: for every contract its postings reference, the signed sum of
//! quantities must be exactly zero, or construction fails and nothing can
//! be persisted.

use crate::errors::LedgerError;
use crate::ids::{ContractId, JournalId};
use crate::numeric::Quantity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account classification, determining the posting sign convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Debits increase the balance
    Asset,
    /// Credits increase the balance
    Liability,
}

/// Kind of accounting transaction a journal records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JournalType {
    Deposit,
    Withdrawal,
    Transfer,
    Adjustment,
    Trade,
    Fee,
}

/// Debit or credit leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntrySide {
    Debit,
    Credit,
}

/// One leg of a journal: owner, contract, signed quantity
///
/// An Asset account records a debit as `+quantity` and a credit as
/// `-quantity`; a Liability account records the opposite. Immutable once
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub username: String,
    pub account_type: AccountType,
    pub contract: ContractId,
    pub quantity: i64,
}

impl Posting {
    pub fn new(
        username: impl Into<String>,
        account_type: AccountType,
        contract: ContractId,
        quantity: Quantity,
        side: EntrySide,
    ) -> Self {
        let sign = match (account_type, side) {
            (AccountType::Asset, EntrySide::Debit) => 1,
            (AccountType::Asset, EntrySide::Credit) => -1,
            (AccountType::Liability, EntrySide::Debit) => -1,
            (AccountType::Liability, EntrySide::Credit) => 1,
        };
        Self {
            username: username.into(),
            account_type,
            contract,
            quantity: sign * quantity.as_i64(),
        }
    }

    /// The contribution of this leg to the per-contract balance check
    ///
    /// Undoes the account-type sign so that any debit contributes `+q` and
    /// any credit `-q`, regardless of account classification.
    pub fn balance_contribution(&self) -> i64 {
        match self.account_type {
            AccountType::Asset => self.quantity,
            AccountType::Liability => -self.quantity,
        }
    }
}

/// An accounting transaction: a validated, balanced set of postings
///
/// Zero-quantity postings are dropped before the balance check. The
/// posting list is private; a `Journal` value is proof that the invariant
/// held at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    pub journal_id: JournalId,
    pub journal_type: JournalType,
    /// Unix nanos
    pub timestamp: i64,
    pub note: Option<String>,
    postings: Vec<Posting>,
}

impl Journal {
    /// Construct a journal, enforcing the double-entry invariant
    pub fn new(
        journal_type: JournalType,
        postings: Vec<Posting>,
        timestamp: i64,
        note: Option<String>,
    ) -> Result<Self, LedgerError> {
        let postings: Vec<Posting> = postings.into_iter().filter(|p| p.quantity != 0).collect();
        if postings.is_empty() {
            return Err(LedgerError::EmptyJournal);
        }

        if let Some((contract, sum)) = Self::first_imbalance(&postings) {
            return Err(LedgerError::UnbalancedJournal { contract, sum });
        }

        Ok(Self {
            journal_id: JournalId::new(),
            journal_type,
            timestamp,
            note,
            postings,
        })
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    /// Re-run the balance audit, used by offline reconciliation
    pub fn is_balanced(&self) -> bool {
        Self::first_imbalance(&self.postings).is_none()
    }

    fn first_imbalance(postings: &[Posting]) -> Option<(ContractId, i64)> {
        let mut sums: BTreeMap<ContractId, i64> = BTreeMap::new();
        for posting in postings {
            *sums.entry(posting.contract).or_insert(0) += posting.balance_contribution();
        }
        sums.into_iter().find(|(_, sum)| *sum != 0)
    }
}

/// Running balance per (owner, contract)
///
/// Equals the sum of signed posting quantities for that owner and
/// contract; verified by periodic batch audit, not enforced synchronously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub username: String,
    pub contract: ContractId,
    pub position: i64,
}

impl Position {
    pub fn new(username: impl Into<String>, contract: ContractId) -> Self {
        Self {
            username: username.into(),
            contract,
            position: 0,
        }
    }
}
