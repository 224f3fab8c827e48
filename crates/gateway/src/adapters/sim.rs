//! In-process simulated exchange
//!
//! Acknowledges every submission with a fresh exchange id and remembers
//! what it was asked to do. Tests script failures with [`fail_next`] to
//! exercise the error-classification paths without a network.
//!
//! [`fail_next`]: SimulatedExchange::fail_next

use async_trait::async_trait;
use chrono::Utc;
use hermes_core::Order;
use log::debug;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::adapters::ExchangeAdapter;
use crate::error::ExchangeError;
use crate::messages::market_data::Bar;
use crate::messages::order::ExchangeAck;

#[derive(Default)]
struct SimState {
    /// (local order id, assigned exchange order id) in submission order
    submissions: Vec<(u64, String)>,
    /// Exchange order ids that were cancelled
    cancellations: Vec<String>,
    /// Failure to inject on the next submit/cancel call
    fail_next: Option<ExchangeError>,
    /// Canned bars served by get_bars, newest last
    bars: Vec<Bar>,
}

/// Simulator adapter for tests and paper trading
#[derive(Default)]
pub struct SimulatedExchange {
    state: Mutex<SimState>,
}

impl SimulatedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure into the next adapter call
    pub fn fail_next(&self, error: ExchangeError) {
        self.state.lock().fail_next = Some(error);
    }

    /// Preload bars served by `get_bars`
    pub fn set_bars(&self, bars: Vec<Bar>) {
        self.state.lock().bars = bars;
    }

    /// Local order ids submitted so far, in order
    pub fn submitted_order_ids(&self) -> Vec<u64> {
        self.state.lock().submissions.iter().map(|(id, _)| *id).collect()
    }

    /// Exchange order ids cancelled so far, in order
    pub fn cancelled_order_ids(&self) -> Vec<String> {
        self.state.lock().cancellations.clone()
    }

    fn take_injected_failure(&self) -> Option<ExchangeError> {
        self.state.lock().fail_next.take()
    }
}

#[async_trait]
impl ExchangeAdapter for SimulatedExchange {
    fn name(&self) -> &str {
        "sim"
    }

    async fn submit_order(&self, order: &Order) -> Result<ExchangeAck, ExchangeError> {
        if let Some(error) = self.take_injected_failure() {
            return Err(error);
        }

        let exchange_order_id = format!("sim-{}", Uuid::new_v4());
        debug!(
            "sim exchange accepted order {} as {}",
            order.id, exchange_order_id
        );
        self.state
            .lock()
            .submissions
            .push((order.id, exchange_order_id.clone()));

        Ok(ExchangeAck::new(exchange_order_id, Utc::now()))
    }

    async fn cancel_order(&self, exchange_order_id: &str) -> Result<(), ExchangeError> {
        if let Some(error) = self.take_injected_failure() {
            return Err(error);
        }

        let mut state = self.state.lock();
        let known = state
            .submissions
            .iter()
            .any(|(_, id)| id == exchange_order_id);
        if !known {
            return Err(ExchangeError::NotFound(exchange_order_id.to_string()));
        }
        state.cancellations.push(exchange_order_id.to_string());
        Ok(())
    }

    async fn get_bars(&self, symbol: &str, limit: usize) -> Result<Vec<Bar>, ExchangeError> {
        let state = self.state.lock();
        let matching: Vec<Bar> = state
            .bars
            .iter()
            .filter(|b| b.symbol == symbol)
            .cloned()
            .collect();
        let start = matching.len().saturating_sub(limit);
        Ok(matching[start..].to_vec())
    }
}

impl SimulatedExchange {
    /// Convenience for tests: a bar where every price is `price`
    pub fn flat_bar(symbol: &str, price: Decimal) -> Bar {
        Bar {
            symbol: symbol.to_string(),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: Decimal::ZERO,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Exchange, OrderType, Side, TimeInForce};
    use rust_decimal_macros::dec;

    fn order(id: u64) -> Order {
        Order::new_with_time(
            id,
            "BTC-USD",
            Exchange::Sim,
            Side::Buy,
            OrderType::Limit,
            dec!(1),
            Some(dec!(50000)),
            None,
            TimeInForce::Gtc,
            None,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn submit_assigns_exchange_id() {
        let sim = SimulatedExchange::new();
        let ack = sim.submit_order(&order(1)).await.unwrap();

        assert!(ack.exchange_order_id.starts_with("sim-"));
        assert_eq!(sim.submitted_order_ids(), vec![1]);
    }

    #[tokio::test]
    async fn cancel_requires_known_id() {
        let sim = SimulatedExchange::new();
        let ack = sim.submit_order(&order(1)).await.unwrap();

        assert!(sim.cancel_order(&ack.exchange_order_id).await.is_ok());
        assert_eq!(
            sim.cancel_order("sim-unknown").await,
            Err(ExchangeError::NotFound("sim-unknown".into()))
        );
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let sim = SimulatedExchange::new();
        sim.fail_next(ExchangeError::RateLimited { retry_after_ms: 250 });

        let err = sim.submit_order(&order(1)).await.unwrap_err();
        assert!(err.is_retryable());

        // Next call succeeds
        assert!(sim.submit_order(&order(2)).await.is_ok());
    }

    #[tokio::test]
    async fn get_bars_filters_and_limits() {
        let sim = SimulatedExchange::new();
        sim.set_bars(vec![
            SimulatedExchange::flat_bar("AAPL", dec!(100)),
            SimulatedExchange::flat_bar("MSFT", dec!(300)),
            SimulatedExchange::flat_bar("AAPL", dec!(101)),
        ]);

        let bars = sim.get_bars("AAPL", 1).await.unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, dec!(101));
    }
}
