//! In-memory transactional store
//!
//! Stands in for the durable database behind the matching core: accounts,
//! the historical order records (kept with their final `quantity_left` and
//! cancelled flag regardless of book membership), trades, journals and
//! positions. All mutation happens through `&mut self`, so a commit is a
//! single uninterrupted mutation; validation happens before any state is
//! touched, which is what makes `commit_journal` all-or-nothing.

use std::collections::HashMap;

use types::prelude::*;

#[derive(Debug, Default)]
pub struct TransactionalStore {
    accounts: HashMap<String, AccountType>,
    orders: HashMap<OrderId, Order>,
    trades: Vec<Trade>,
    journals: Vec<Journal>,
    positions: HashMap<(String, ContractId), i64>,
}

impl TransactionalStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accounts ────────────────────────────────────────────────────

    pub fn register_account(&mut self, username: impl Into<String>, account_type: AccountType) {
        self.accounts.insert(username.into(), account_type);
    }

    pub fn account_type(&self, username: &str) -> Result<AccountType, LedgerError> {
        self.accounts
            .get(username)
            .copied()
            .ok_or_else(|| LedgerError::UnknownAccount(username.to_string()))
    }

    // ── Order records ───────────────────────────────────────────────

    pub fn insert_order(&mut self, order: Order) {
        self.orders.insert(order.order_id, order);
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Highest order id ever recorded; id allocation resumes past it
    /// after a rebuild
    pub fn max_order_id(&self) -> Option<OrderId> {
        self.orders.keys().max().copied()
    }

    /// Decrement the persisted remaining quantity after a fill
    pub fn apply_fill(&mut self, order_id: OrderId, quantity: Quantity) -> Result<(), LedgerError> {
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(LedgerError::UnknownOrder(order_id))?;
        order.fill(quantity);
        Ok(())
    }

    pub fn mark_cancelled(&mut self, order_id: OrderId) -> Result<(), LedgerError> {
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(LedgerError::UnknownOrder(order_id))?;
        order.cancel();
        tracing::info!(order_id = %order_id, "order cancelled in store");
        Ok(())
    }

    /// Orders with remaining quantity that were never cancelled, in
    /// arrival order (id as tie-break) — the rebuild source after a crash
    pub fn open_orders(&self, contract: ContractId) -> Vec<Order> {
        let mut open: Vec<Order> = self
            .orders
            .values()
            .filter(|o| o.contract == contract && !o.is_cancelled && !o.is_filled())
            .cloned()
            .collect();
        open.sort_by_key(|o| (o.timestamp, o.order_id));
        open
    }

    // ── Trades ──────────────────────────────────────────────────────

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Price of the most recent trade on the contract, if any
    pub fn last_trade_price(&self, contract: ContractId) -> Option<Price> {
        self.trades
            .iter()
            .rev()
            .find(|t| t.contract == contract)
            .map(|t| t.price)
    }

    // ── Journals & positions ────────────────────────────────────────

    /// Commit a journal and apply its postings to positions
    ///
    /// The journal was balance-validated at construction and this method
    /// cannot fail part-way, so either the journal with all its position
    /// updates lands or (on an earlier validation error) nothing does.
    pub fn commit_journal(&mut self, journal: Journal) {
        for posting in journal.postings() {
            *self
                .positions
                .entry((posting.username.clone(), posting.contract))
                .or_insert(0) += posting.quantity;
        }
        self.journals.push(journal);
    }

    pub fn journals(&self) -> &[Journal] {
        &self.journals
    }

    pub fn position(&self, username: &str, contract: ContractId) -> i64 {
        self.positions
            .get(&(username.to_string(), contract))
            .copied()
            .unwrap_or(0)
    }

    pub fn positions(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self
            .positions
            .iter()
            .map(|((username, contract), position)| Position {
                username: username.clone(),
                contract: *contract,
                position: *position,
            })
            .collect();
        positions.sort_by(|a, b| (&a.username, a.contract).cmp(&(&b.username, b.contract)));
        positions
    }

    #[cfg(test)]
    pub(crate) fn overwrite_position(&mut self, username: &str, contract: ContractId, position: i64) {
        self.positions
            .insert((username.to_string(), contract), position);
    }
}
