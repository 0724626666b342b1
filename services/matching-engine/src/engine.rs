//! Matching engine core
//!
//! One `Engine` serves one contract and consumes its inbound request
//! stream strictly sequentially: a submit or cancel runs to completion,
//! including every resulting trade, ledger commit and notification, before
//! the next request is looked at. Different contracts get independent
//! engine instances and share nothing but the ledger's store.

use tracing::{debug, error, info, warn};
use types::prelude::*;

use ledger::Accountant;

use crate::book::OrderBook;
use crate::events::{BookEntry, Event, Publisher};
use crate::requests::{Request, SubmitRequest};
use crate::safe_price::SafePricePublisher;

/// Engine tunables
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Safe price before any trade has ever happened on the contract
    pub default_safe_price: Price,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_safe_price: Price::new(42),
        }
    }
}

/// Matching engine for a single contract
pub struct Engine {
    contract: Contract,
    book: OrderBook,
    accountant: Accountant,
    safe_price: SafePricePublisher,
    publisher: Box<dyn Publisher>,
    next_order_id: u64,
}

impl Engine {
    /// Create an engine with an empty book
    ///
    /// The safe price seeds from the most recent stored trade on the
    /// contract, falling back to the configured default, and is published
    /// immediately.
    pub fn new(
        contract: Contract,
        accountant: Accountant,
        publisher: Box<dyn Publisher>,
        config: EngineConfig,
    ) -> Self {
        let initial = accountant
            .store()
            .last_trade_price(contract.id)
            .unwrap_or(config.default_safe_price);
        let safe_price = SafePricePublisher::new(contract.ticker.clone(), initial);
        safe_price.publish_current(publisher.as_ref());

        Self {
            contract,
            book: OrderBook::new(),
            accountant,
            safe_price,
            publisher,
            next_order_id: 1,
        }
    }

    /// Recreate an engine after a fatal failure
    ///
    /// Resting state is rebuilt from the store's open (un-filled,
    /// un-cancelled) orders in arrival order, so price-time priority
    /// survives the restart; a fresh book snapshot is published.
    pub fn rebuild(
        contract: Contract,
        accountant: Accountant,
        publisher: Box<dyn Publisher>,
        config: EngineConfig,
    ) -> Self {
        let mut engine = Self::new(contract, accountant, publisher, config);
        if let Some(max_id) = engine.accountant.store().max_order_id() {
            engine.next_order_id = max_id.as_u64() + 1;
        }
        let open = engine.accountant.store().open_orders(engine.contract.id);
        for order in open {
            engine.book.submit_resting(order);
        }
        info!(
            contract = %engine.contract.ticker,
            resting = engine.book.len(),
            "book rebuilt from store"
        );
        engine.publish_book();
        engine
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn accountant(&self) -> &Accountant {
        &self.accountant
    }

    /// Hand the ledger back, e.g. to rebuild after a fatal error
    pub fn into_accountant(self) -> Accountant {
        self.accountant
    }

    pub fn safe_price(&self) -> Price {
        self.safe_price.safe_price()
    }

    /// Decode and process one raw inbound message
    ///
    /// Undecodable messages are logged and skipped; the stream continues.
    pub fn process_raw(&mut self, raw: &str, timestamp: i64) -> Result<(), FatalError> {
        match crate::requests::decode(raw) {
            Ok(request) => self.process(request, timestamp),
            Err(err) => {
                warn!(%err, "received message cannot be decoded, skipping");
                Ok(())
            }
        }
    }

    /// Process one decoded request
    ///
    /// Recoverable failures (failed cancels) are reported and the stream
    /// continues; anything else halts this engine instance so a
    /// supervisor can rebuild from the store.
    pub fn process(&mut self, request: Request, timestamp: i64) -> Result<(), FatalError> {
        let result = match request {
            Request::Order(submit) => self.submit(submit, timestamp).map(|_| ()),
            Request::Cancel(cancel) => self.cancel(cancel.order_id),
        };
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_fatal() => {
                error!(%err, contract = %self.contract.ticker, "fatal engine failure");
                Err(FatalError::from(err))
            }
            Err(err) => {
                warn!(%err, "request rejected");
                Ok(())
            }
        }
    }

    /// Submit a limit order: match what crosses, rest the remainder
    pub fn submit(
        &mut self,
        request: SubmitRequest,
        timestamp: i64,
    ) -> Result<OrderId, EngineError> {
        if request.contract != self.contract.id {
            return Err(EngineError::MalformedRequest(format!(
                "contract {} is not served by this engine",
                request.contract
            )));
        }
        if request.quantity.is_zero() {
            return Err(EngineError::MalformedRequest(
                "quantity must be positive".into(),
            ));
        }

        let order_id = self.alloc_order_id();
        let mut incoming = Order::new(
            order_id,
            request.username,
            request.contract,
            request.side,
            request.price,
            request.quantity,
            timestamp,
        );
        info!(
            order_id = %order_id,
            username = %incoming.username,
            side = ?incoming.side,
            price = %incoming.price,
            quantity = %incoming.quantity,
            "received order"
        );
        self.accountant.store_mut().insert_order(incoming.clone());

        self.match_incoming(&mut incoming)?;

        if !incoming.is_filled() {
            self.publisher.publish(Event::OpenOrders {
                username: incoming.username.clone(),
                order: incoming.order_id,
                quantity: incoming.quantity_left,
                price: incoming.price,
                side: incoming.side,
                ticker: self.contract.ticker.clone(),
                contract_id: self.contract.id,
            });
            self.book.submit_resting(incoming);
        }

        debug!(book = %self.book.render(), "book state");
        self.publish_book();
        Ok(order_id)
    }

    /// Cancel a resting order
    ///
    /// An id that is not currently resting (already filled or previously
    /// cancelled) fails with `OrderNotFound` and mutates nothing.
    pub fn cancel(&mut self, order_id: OrderId) -> Result<(), EngineError> {
        info!(order_id = %order_id, "received cancellation");

        let Some(order) = self.book.remove_resting(order_id) else {
            info!(
                order_id = %order_id,
                "order cannot be cancelled, it is already outside the book"
            );
            return Err(EngineError::OrderNotFound(order_id));
        };

        self.accountant.store_mut().mark_cancelled(order_id)?;
        self.publisher.publish(Event::Cancel {
            username: order.username.clone(),
            order: order_id,
        });

        debug!(book = %self.book.render(), "book state");
        self.publish_book();
        Ok(())
    }

    /// Dig into the opposing side while the incoming order crosses it
    fn match_incoming(&mut self, incoming: &mut Order) -> Result<(), EngineError> {
        let opposing = incoming.side.opposite();

        while !incoming.is_filled() {
            let Some(best) = self.book.best(opposing) else {
                break;
            };
            if !incoming.crosses(best) {
                break;
            }

            // Walk the best level in arrival order until the level drains
            // or the incoming order fills.
            while let Some(passive_id) = self.book.front_at(opposing, best) {
                self.execute(incoming, passive_id)?;
                if incoming.is_filled() {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Match the incoming order against one resting order
    ///
    /// Emits the trade, settles it through the ledger, reports it to the
    /// safe-price publisher and notifies both parties. The resting order
    /// leaves the book if it fills completely.
    fn execute(&mut self, incoming: &mut Order, passive_id: OrderId) -> Result<(), EngineError> {
        let trade = {
            let passive = self.book.order(passive_id).ok_or_else(|| {
                EngineError::Internal(format!("order {} not in arena", passive_id))
            })?;
            let quantity = incoming.quantity_left.min(passive.quantity_left);
            Trade::between(incoming, passive, quantity)
        };
        let quantity = trade.quantity;

        // Settlement is validated before any order state changes, so a
        // rejected commit leaves both the store and the book untouched.
        let journal = self.accountant.prepare_trade(&trade)?;

        incoming.fill(quantity);
        let passive = self
            .book
            .order_mut(passive_id)
            .ok_or_else(|| EngineError::Internal(format!("order {} not in arena", passive_id)))?;
        passive.fill(quantity);
        let passive_filled = passive.is_filled();
        let passive_username = passive.username.clone();

        self.accountant
            .store_mut()
            .apply_fill(incoming.order_id, quantity)?;
        self.accountant.store_mut().apply_fill(passive_id, quantity)?;
        self.accountant.commit_prepared(&trade, journal);

        self.safe_price
            .on_trade(quantity, trade.price, self.publisher.as_ref());
        self.publisher.publish(Event::Trade {
            ticker: self.contract.ticker.clone(),
            quantity,
            price: trade.price,
        });
        self.publisher.publish(Event::Fill {
            username: incoming.username.clone(),
            order: incoming.order_id,
            quantity,
            price: trade.price,
        });
        self.publisher.publish(Event::Fill {
            username: passive_username,
            order: passive_id,
            quantity,
            price: trade.price,
        });

        if passive_filled {
            let removed = self.book.remove_resting(passive_id);
            debug_assert!(removed.is_some());
        }
        Ok(())
    }

    /// Publish the full book snapshot
    fn publish_book(&self) {
        let entries: Vec<BookEntry> = self
            .book
            .resting_orders()
            .into_iter()
            .map(|order| BookEntry {
                quantity: order.quantity_left,
                price: order.price,
                order_side: order.side,
            })
            .collect();
        self.publisher.publish(Event::BookUpdate {
            ticker: self.contract.ticker.clone(),
            entries,
        });
    }

    fn alloc_order_id(&mut self) -> OrderId {
        let id = OrderId::new(self.next_order_id);
        self.next_order_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullPublisher;
    use ledger::TransactionalStore;

    fn test_engine() -> Engine {
        let mut store = TransactionalStore::new();
        for user in ["alice", "bob", "carol"] {
            store.register_account(user, AccountType::Liability);
        }
        Engine::new(
            Contract::new(ContractId::new(1), "TEST"),
            Accountant::new(store),
            Box::new(NullPublisher),
            EngineConfig::default(),
        )
    }

    fn submit(username: &str, side: Side, price: i64, quantity: u64) -> SubmitRequest {
        SubmitRequest {
            username: username.into(),
            contract: ContractId::new(1),
            quantity: Quantity::new(quantity),
            price: Price::new(price),
            side,
        }
    }

    #[test]
    fn test_order_rests_when_nothing_crosses() {
        let mut engine = test_engine();
        let id = engine.submit(submit("alice", Side::BUY, 100, 10), 1).unwrap();

        assert!(engine.book().contains(id));
        assert_eq!(engine.book().best(Side::BUY), Some(Price::new(100)));
        assert!(engine.accountant().store().trades().is_empty());
    }

    #[test]
    fn test_full_match_empties_book() {
        let mut engine = test_engine();
        engine.submit(submit("alice", Side::BUY, 100, 10), 1).unwrap();
        engine.submit(submit("bob", Side::SELL, 100, 10), 2).unwrap();

        assert!(engine.book().is_empty());
        let trades = engine.accountant().store().trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, Quantity::new(10));
        assert_eq!(trades[0].price, Price::new(100));
    }

    #[test]
    fn test_partial_fill_rests_remainder() {
        let mut engine = test_engine();
        engine.submit(submit("alice", Side::BUY, 101, 5), 1).unwrap();
        let id = engine.submit(submit("bob", Side::SELL, 100, 10), 2).unwrap();

        // Price improvement: execution at the resting bid's 101.
        let trades = engine.accountant().store().trades();
        assert_eq!(trades[0].price, Price::new(101));
        assert_eq!(trades[0].quantity, Quantity::new(5));

        // The leftover 5 rests on the ask side at the seller's limit.
        let remainder = engine.book().order(id).unwrap();
        assert_eq!(remainder.quantity_left, Quantity::new(5));
        assert_eq!(engine.book().best(Side::SELL), Some(Price::new(100)));
        assert_eq!(engine.book().best(Side::BUY), None);
    }

    #[test]
    fn test_sweep_multiple_levels() {
        let mut engine = test_engine();
        engine.submit(submit("alice", Side::SELL, 100, 5), 1).unwrap();
        engine.submit(submit("bob", Side::SELL, 101, 5), 2).unwrap();
        engine.submit(submit("carol", Side::BUY, 102, 12), 3).unwrap();

        let trades = engine.accountant().store().trades();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].price, Price::new(100));
        assert_eq!(trades[1].price, Price::new(101));

        // 2 lots left resting on the bid.
        assert_eq!(engine.book().best(Side::BUY), Some(Price::new(102)));
        assert_eq!(engine.book().best(Side::SELL), None);
    }

    #[test]
    fn test_fifo_within_level() {
        let mut engine = test_engine();
        let first = engine.submit(submit("alice", Side::BUY, 100, 5), 1).unwrap();
        let second = engine.submit(submit("bob", Side::BUY, 100, 5), 2).unwrap();
        engine.submit(submit("carol", Side::SELL, 100, 5), 3).unwrap();

        assert!(!engine.book().contains(first), "first arrival matches first");
        assert!(engine.book().contains(second));
        assert_eq!(
            engine.book().order(second).unwrap().quantity_left,
            Quantity::new(5)
        );
    }

    #[test]
    fn test_cancel_resting_order() {
        let mut engine = test_engine();
        let id = engine.submit(submit("alice", Side::BUY, 100, 10), 1).unwrap();
        engine.cancel(id).unwrap();

        assert!(engine.book().is_empty());
        let record = engine.accountant().store().order(id).unwrap();
        assert!(record.is_cancelled);
    }

    #[test]
    fn test_cancel_unknown_order_mutates_nothing() {
        let mut engine = test_engine();
        engine.submit(submit("alice", Side::BUY, 100, 10), 1).unwrap();

        let result = engine.cancel(OrderId::new(999));
        assert_eq!(result, Err(EngineError::OrderNotFound(OrderId::new(999))));
        assert_eq!(engine.book().len(), 1);
    }

    #[test]
    fn test_cancel_filled_order_not_found() {
        let mut engine = test_engine();
        let id = engine.submit(submit("alice", Side::BUY, 100, 10), 1).unwrap();
        engine.submit(submit("bob", Side::SELL, 100, 10), 2).unwrap();

        assert_eq!(engine.cancel(id), Err(EngineError::OrderNotFound(id)));
    }

    #[test]
    fn test_wrong_contract_rejected() {
        let mut engine = test_engine();
        let mut request = submit("alice", Side::BUY, 100, 10);
        request.contract = ContractId::new(9);

        assert!(matches!(
            engine.submit(request, 1),
            Err(EngineError::MalformedRequest(_))
        ));
        assert!(engine.book().is_empty());
    }

    #[test]
    fn test_process_skips_undecodable() {
        let mut engine = test_engine();
        engine.process_raw("garbage", 1).unwrap();
        engine
            .process_raw(
                r#"{"order": {"username": "alice", "contract": 1,
                    "quantity": 10, "price": 100, "side": "BUY"}}"#,
                2,
            )
            .unwrap();
        assert_eq!(engine.book().len(), 1);
    }

    #[test]
    fn test_process_reports_failed_cancel_non_fatally() {
        let mut engine = test_engine();
        let result = engine.process_raw(r#"{"cancel": {"order_id": 7}}"#, 1);
        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_account_is_fatal() {
        let mut engine = test_engine();
        engine.submit(submit("alice", Side::BUY, 100, 10), 1).unwrap();

        let request = Request::Order(submit("ghost", Side::SELL, 100, 10));
        let result = engine.process(request, 2);
        assert!(matches!(
            result,
            Err(FatalError {
                source: EngineError::Ledger(LedgerError::UnknownAccount(_))
            })
        ));
    }

    #[test]
    fn test_failed_settlement_leaves_store_untouched() {
        let mut engine = test_engine();
        let resting = engine.submit(submit("alice", Side::BUY, 100, 10), 1).unwrap();

        // Wire-valid order from an unregistered account: the commit is
        // rejected, and neither side of the would-be trade may keep a fill.
        let request = Request::Order(submit("ghost", Side::SELL, 100, 4));
        assert!(engine.process(request, 2).is_err());

        let store = engine.accountant().store();
        assert_eq!(
            store.order(resting).unwrap().quantity_left,
            Quantity::new(10)
        );
        assert!(store.trades().is_empty());
        assert!(store.journals().is_empty());
        assert_eq!(store.position("alice", ContractId::new(1)), 0);

        // The resting order also keeps its full quantity in the book, so a
        // rebuild from the store reproduces exactly this state.
        assert_eq!(
            engine.book().order(resting).unwrap().quantity_left,
            Quantity::new(10)
        );
        assert_eq!(engine.book().best(Side::BUY), Some(Price::new(100)));
    }

    #[test]
    fn test_positions_track_trades() {
        let mut engine = test_engine();
        engine.submit(submit("alice", Side::BUY, 100, 10), 1).unwrap();
        engine.submit(submit("bob", Side::SELL, 100, 4), 2).unwrap();

        let store = engine.accountant().store();
        assert_eq!(store.position("alice", ContractId::new(1)), 4);
        assert_eq!(store.position("bob", ContractId::new(1)), -4);
    }

    #[test]
    fn test_rebuild_restores_resting_orders() {
        let mut engine = test_engine();
        let resting = engine.submit(submit("alice", Side::BUY, 100, 10), 1).unwrap();
        engine.submit(submit("bob", Side::SELL, 100, 4), 2).unwrap();
        let cancelled = engine.submit(submit("carol", Side::SELL, 110, 3), 3).unwrap();
        engine.cancel(cancelled).unwrap();

        let accountant = engine.into_accountant();
        let rebuilt = Engine::rebuild(
            Contract::new(ContractId::new(1), "TEST"),
            accountant,
            Box::new(NullPublisher),
            EngineConfig::default(),
        );

        assert_eq!(rebuilt.book().len(), 1);
        assert_eq!(
            rebuilt.book().order(resting).unwrap().quantity_left,
            Quantity::new(6)
        );
        // Safe price seeds from the recorded trade, not the default.
        assert_eq!(rebuilt.safe_price(), Price::new(100));

        // New ids must not collide with restored ones.
        let mut rebuilt = rebuilt;
        let new_id = rebuilt.submit(submit("bob", Side::SELL, 120, 1), 4).unwrap();
        assert!(new_id > resting);
    }
}
