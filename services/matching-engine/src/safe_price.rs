//! Safe price: volume-weighted EMA of trade prices
//!
//! Maintains two accumulators, an exponentially decayed volume and an
//! exponentially decayed price×volume, and publishes
//! `floor(ema_price_volume / ema_volume)` after every reported trade. Sub
//! minor-unit granularity is unnecessary downstream and invites rounding
//! drift, hence the floor to an integer price.
//!
//! Accumulators use `Decimal` so the smoothing is deterministic.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::info;
use types::prelude::*;

use crate::events::{Event, Publisher};

/// Default decay constant `d`; each trade contributes weight `1 - d`
const DEFAULT_DECAY: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

#[derive(Debug, Clone)]
pub struct SafePricePublisher {
    ticker: String,
    decay: Decimal,
    ema_volume: Decimal,
    ema_price_volume: Decimal,
    safe_price: Price,
}

impl SafePricePublisher {
    /// Create with the default decay of 0.9
    ///
    /// `initial` is the most recent historical trade price for the
    /// contract, or a configured default when none exists.
    pub fn new(ticker: impl Into<String>, initial: Price) -> Self {
        Self::with_decay(ticker, initial, DEFAULT_DECAY)
    }

    pub fn with_decay(ticker: impl Into<String>, initial: Price, decay: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            decay,
            ema_volume: Decimal::ZERO,
            ema_price_volume: Decimal::ZERO,
            safe_price: initial,
        }
    }

    pub fn safe_price(&self) -> Price {
        self.safe_price
    }

    /// Publish the current value without recomputing (startup announcement)
    pub fn publish_current(&self, publisher: &dyn Publisher) {
        publisher.publish(Event::SafePrice {
            ticker: self.ticker.clone(),
            price: self.safe_price,
        });
    }

    /// Fold one trade into the EMA and publish the recomputed safe price
    pub fn on_trade(&mut self, quantity: Quantity, price: Price, publisher: &dyn Publisher) {
        let q = Decimal::from(quantity.as_u64());
        let p = Decimal::from(price.as_i64());
        let weight = Decimal::ONE - self.decay;

        self.ema_volume = self.decay * self.ema_volume + weight * q;
        self.ema_price_volume = self.decay * self.ema_price_volume + weight * q * p;

        // With no accumulated volume there is nothing to divide by; the
        // safe price keeps its initialized value.
        if !self.ema_volume.is_zero() {
            let vwap = self.ema_price_volume / self.ema_volume;
            self.safe_price = vwap
                .floor()
                .to_i64()
                .map(Price::new)
                .unwrap_or(self.safe_price);
        }

        info!(ticker = %self.ticker, safe_price = %self.safe_price, "safe price updated");
        self.publish_current(publisher);
    }
}
