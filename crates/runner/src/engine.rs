//! Trading engine wiring

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use hermes_core::{Exchange, Fill, Order, OrderId, OrderStatus, Position, StrategyDefinition};
use hermes_gateway::{Bar, ExchangeAdapter, ExchangeError, OrderRequest, RetryPolicy};
use hermes_order_manager::{
    FillHandler, FillSink, OrderManager, PositionManager, StrategyFillEvent,
};
use hermes_risk_manager::RiskGate;
use hermes_store::{FillJournal, StoreError, StrategyStore};
use log::{error, info, warn};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::EngineConfig;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Order(#[from] hermes_order_manager::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("engine io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write-ahead sink: journal the fill, then remember the sequence so a
/// later replay knows it was already applied in this process
struct JournalSink {
    journal: Arc<FillJournal>,
    applied_seq: Arc<AtomicU64>,
}

impl FillSink for JournalSink {
    fn record(&self, fill: &Fill) -> Result<(), String> {
        self.journal.append(fill).map_err(|e| e.to_string())?;
        self.applied_seq.fetch_max(fill.seq, Ordering::SeqCst);
        Ok(())
    }
}

/// The assembled engine: every order flows through risk gating before
/// submission, every fill updates positions and is dispatched back to
/// the originating strategy, and strategy definitions survive restarts
/// through the durable store.
pub struct TradingEngine {
    orders: Arc<OrderManager>,
    positions: Arc<PositionManager>,
    gate: Arc<RiskGate>,
    adapter: Arc<dyn ExchangeAdapter>,
    store: StrategyStore,
    journal: Arc<FillJournal>,
    /// Highest fill sequence applied to the position book
    applied_seq: Arc<AtomicU64>,
    retry: RetryPolicy,
}

impl TradingEngine {
    /// Build the engine and recover state: the strategy store rebuilds
    /// its index and the fill journal is replayed into the position
    /// book before any call is served.
    pub fn new(
        config: EngineConfig,
        adapter: Arc<dyn ExchangeAdapter>,
    ) -> Result<Self, EngineError> {
        std::fs::create_dir_all(config.data_dir())?;

        let store = StrategyStore::open(config.strategy_log_path())?;
        let journal = Arc::new(FillJournal::open(config.fill_journal_path())?);

        let gate = Arc::new(RiskGate::new(config.risk.clone(), Utc::now().date_naive()));
        let positions = Arc::new(PositionManager::new());
        let orders = Arc::new(OrderManager::new(Arc::clone(&gate), Arc::clone(&positions)));

        let applied_seq = Arc::new(AtomicU64::new(0));
        orders.set_fill_sink(Arc::new(JournalSink {
            journal: Arc::clone(&journal),
            applied_seq: Arc::clone(&applied_seq),
        }));
        orders.set_next_fill_seq(journal.last_seq() + 1);

        info!(
            "engine wired for {} through the {} adapter",
            config.exchange,
            adapter.name()
        );

        let engine = Self {
            orders,
            positions,
            gate,
            adapter,
            store,
            journal,
            applied_seq,
            retry: RetryPolicy::new(config.submit_attempts, Duration::from_millis(250)),
        };

        let replayed = engine.recover()?;
        if replayed > 0 {
            info!("recovered {replayed} journaled fills into the position book");
        }
        Ok(engine)
    }

    /// Replay journaled fills that have not been applied to the
    /// position book. Idempotent: fills at or below the applied
    /// high-water mark are skipped, so reapplying never double-counts.
    pub fn recover(&self) -> Result<usize, EngineError> {
        let mut applied = 0;
        for fill in self.journal.replay()? {
            if fill.seq <= self.applied_seq.load(Ordering::SeqCst) {
                continue;
            }
            self.positions.apply_fill(&fill);
            self.applied_seq.fetch_max(fill.seq, Ordering::SeqCst);
            applied += 1;
        }
        Ok(applied)
    }

    /// Validate, risk-gate and track an order, then hand it to the
    /// exchange adapter from a spawned task. The caller gets the
    /// Submitted (or Rejected) snapshot immediately and never waits on
    /// the exchange round trip.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: OrderRequest) -> Result<Order, EngineError> {
        let order = self.orders.submit(request)?;
        if order.status == OrderStatus::Submitted {
            self.dispatch_submission(order.clone());
        }
        Ok(order)
    }

    fn dispatch_submission(&self, order: Order) {
        let orders = Arc::clone(&self.orders);
        let adapter = Arc::clone(&self.adapter);
        let retry = self.retry.clone();

        tokio::spawn(async move {
            let id = order.id;
            match retry.run(|| adapter.submit_order(&order)).await {
                Ok(ack) => {
                    if let Err(e) = orders.acknowledge(id, ack.exchange_order_id) {
                        // A fill can land before the ack; that is not an error
                        warn!("could not mark order {id} accepted: {e}");
                    }
                }
                Err(e) if e.is_retryable() => {
                    // Retry budget exhausted; the order stays Submitted
                    // for the operator to redispatch or cancel
                    warn!("submission of order {id} still failing after retries: {e}");
                }
                Err(e) if e.is_session_fatal() => {
                    error!("session-fatal exchange error on order {id}: {e}");
                    let _ = orders.reject(id, e.to_string());
                }
                Err(e) => {
                    if let Err(reject_err) = orders.reject(id, e.to_string()) {
                        warn!("could not reject order {id}: {reject_err}");
                    }
                }
            }
        });
    }

    /// Cancel locally, then tell the exchange from a spawned task
    pub fn cancel(&self, id: OrderId) -> Result<Order, EngineError> {
        let order = self.orders.cancel(id)?;
        if let Some(exchange_order_id) = order.exchange_order_id.clone() {
            let adapter = Arc::clone(&self.adapter);
            tokio::spawn(async move {
                if let Err(e) = adapter.cancel_order(&exchange_order_id).await {
                    warn!("exchange cancel of {exchange_order_id} failed: {e}");
                }
            });
        }
        Ok(order)
    }

    /// Exchange acknowledgement callback
    pub fn acknowledge(
        &self,
        id: OrderId,
        exchange_order_id: impl Into<String>,
    ) -> Result<Order, EngineError> {
        Ok(self.orders.acknowledge(id, exchange_order_id)?)
    }

    /// Execution report callback: journals the fill, applies it to the
    /// order, routes it to the position book and the owning strategy
    pub fn on_exchange_fill(
        &self,
        id: OrderId,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<Order, EngineError> {
        Ok(self.orders.apply_fill(id, quantity, price)?)
    }

    /// Time-in-force elapsed
    pub fn expire(&self, id: OrderId) -> Result<Order, EngineError> {
        Ok(self.orders.expire(id)?)
    }

    /// Mark a position to market
    pub fn mark_price(
        &self,
        symbol: &str,
        exchange: Exchange,
        price: Decimal,
    ) -> Result<Position, EngineError> {
        Ok(self.positions.mark_price(symbol, exchange, price)?)
    }

    /// Explicit daily-counter reset at the day boundary
    pub fn roll_day(&self, trading_day: NaiveDate) {
        self.gate.roll_day(trading_day);
    }

    /// Fetch recent bars through the configured adapter
    pub async fn bars(&self, symbol: &str, limit: usize) -> Result<Vec<Bar>, EngineError> {
        Ok(self.adapter.get_bars(symbol, limit).await?)
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.orders.get(id)
    }

    pub fn open_orders(&self) -> Vec<Order> {
        self.orders.open_orders()
    }

    pub fn position(&self, symbol: &str, exchange: Exchange) -> Option<Position> {
        self.positions.get(symbol, exchange)
    }

    pub fn positions(&self) -> Vec<Position> {
        self.positions.all()
    }

    pub fn net_exposure(&self) -> Decimal {
        self.positions.net_exposure()
    }

    pub fn gross_exposure(&self) -> Decimal {
        self.positions.gross_exposure()
    }

    // ── Observers & strategy dispatch ──────────────────────────────

    pub fn add_order_listener(&self, listener: impl Fn(&Order) + Send + Sync + 'static) {
        self.orders.add_order_listener(listener);
    }

    pub fn add_position_listener(&self, listener: impl Fn(&Position) + Send + Sync + 'static) {
        self.positions.add_listener(listener);
    }

    pub fn add_strategy_listener(
        &self,
        listener: impl Fn(&StrategyFillEvent) + Send + Sync + 'static,
    ) {
        self.orders.add_strategy_listener(listener);
    }

    pub fn register_fill_handler(
        &self,
        strategy_id: impl Into<String>,
        handler: Arc<dyn FillHandler>,
    ) {
        self.orders.register_fill_handler(strategy_id, handler);
    }

    // ── Strategy persistence ───────────────────────────────────────

    pub fn save_strategy(&self, definition: &StrategyDefinition) -> Result<(), EngineError> {
        Ok(self.store.save(definition)?)
    }

    pub fn delete_strategy(&self, id: &str) -> Result<bool, EngineError> {
        Ok(self.store.delete(id)?)
    }

    pub fn strategy(&self, id: &str) -> Option<StrategyDefinition> {
        self.store.find_by_id(id)
    }

    pub fn strategies(&self) -> Vec<StrategyDefinition> {
        self.store.find_all()
    }

    /// Flush and close the durable logs. Idempotent.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.store.close()?;
        self.journal.close()?;
        Ok(())
    }
}
