//! Exchange adapters
//!
//! One capability interface, one implementation per exchange, selected
//! by configuration. The engine core only ever depends on the trait.

pub mod sim;

use async_trait::async_trait;
use hermes_core::Order;

use crate::error::ExchangeError;
use crate::messages::market_data::Bar;
use crate::messages::order::ExchangeAck;

/// Capability contract implemented by every exchange adapter.
///
/// All calls are asynchronous; the engine never waits on them from a
/// state-transition path. Failures use the [`ExchangeError`] taxonomy so
/// callers can classify retryable vs. fatal outcomes uniformly.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Adapter name (e.g. "alpaca", "binance", "sim")
    fn name(&self) -> &str;

    /// Submit an order; resolves to the exchange-assigned identifier
    async fn submit_order(&self, order: &Order) -> Result<ExchangeAck, ExchangeError>;

    /// Cancel a previously acknowledged order by its exchange identifier
    async fn cancel_order(&self, exchange_order_id: &str) -> Result<(), ExchangeError>;

    /// Fetch recent bars for a symbol
    async fn get_bars(&self, symbol: &str, limit: usize) -> Result<Vec<Bar>, ExchangeError>;
}
