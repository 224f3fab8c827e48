//! Order lifecycle management
//!
//! The order manager owns every order, assigns the local sequence ids,
//! gates submissions through the risk gate, and drives the state
//! machine:
//!
//! ```text
//! Pending ──► Submitted ──► Accepted ──► PartiallyFilled ⇄ ──► Filled
//!    │            │   │                       │
//!    │            │   └──────► Cancelled / Expired ◄──────────┘
//!    └──► Rejected◄┘
//! ```
//!
//! Filled, Cancelled, Rejected and Expired are terminal: any further
//! event fails with `InvalidTransition` and leaves the order unchanged.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use hermes_core::{Fill, Order, OrderId, OrderStatus};
use hermes_gateway::OrderRequest;
use hermes_risk_manager::RiskGate;
use log::{info, warn};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::dispatch::{FillHandler, FillSink, StrategyFillEvent};
use crate::error::{Error, Result};
use crate::fanout::Fanout;
use crate::positions::PositionManager;

/// Order lifecycle state machine and fill router
pub struct OrderManager {
    /// Authoritative order map; per-entry shard locks keep unrelated
    /// orders from serializing each other
    orders: DashMap<OrderId, Order>,
    /// Monotonic, process-unique local order ids
    next_order_id: AtomicU64,
    /// Monotonic fill sequence, continued from the journal on recovery
    next_fill_seq: AtomicU64,
    gate: Arc<RiskGate>,
    positions: Arc<PositionManager>,
    /// Write-ahead sink consulted before any fill is applied
    fill_sink: RwLock<Option<Arc<dyn FillSink>>>,
    /// Per-strategy fill dispatch
    fill_handlers: DashMap<String, Arc<dyn FillHandler>>,
    order_events: Fanout<Order>,
    strategy_events: Fanout<StrategyFillEvent>,
}

impl OrderManager {
    pub fn new(gate: Arc<RiskGate>, positions: Arc<PositionManager>) -> Self {
        Self {
            orders: DashMap::new(),
            next_order_id: AtomicU64::new(1),
            next_fill_seq: AtomicU64::new(1),
            gate,
            positions,
            fill_sink: RwLock::new(None),
            fill_handlers: DashMap::new(),
            order_events: Fanout::new("order-notifier"),
            strategy_events: Fanout::new("strategy-notifier"),
        }
    }

    /// Install the write-ahead fill sink (the runner wires the journal in)
    pub fn set_fill_sink(&self, sink: Arc<dyn FillSink>) {
        *self.fill_sink.write() = Some(sink);
    }

    /// Continue the fill sequence after a journal replay
    pub fn set_next_fill_seq(&self, next: u64) {
        self.next_fill_seq.store(next, Ordering::SeqCst);
    }

    /// Register an order listener; receives every transition snapshot,
    /// in transition order, on the notifier thread
    pub fn add_order_listener(&self, listener: impl Fn(&Order) + Send + Sync + 'static) {
        self.order_events.subscribe(listener);
    }

    /// Register a listener for post-dispatch strategy fill events
    pub fn add_strategy_listener(
        &self,
        listener: impl Fn(&StrategyFillEvent) + Send + Sync + 'static,
    ) {
        self.strategy_events.subscribe(listener);
    }

    /// Register the fill handler for a strategy id
    pub fn register_fill_handler(&self, strategy_id: impl Into<String>, handler: Arc<dyn FillHandler>) {
        self.fill_handlers.insert(strategy_id.into(), handler);
    }

    /// Validate, risk-gate and start tracking an order.
    ///
    /// Never blocks on exchange I/O - the caller dispatches the
    /// submission to the adapter asynchronously. On a risk breach the
    /// order is tracked in `Rejected` status with the breach as its
    /// reject reason and returned; a malformed request fails before any
    /// state is touched.
    pub fn submit(&self, request: OrderRequest) -> Result<Order> {
        request.validate().map_err(Error::Validation)?;

        let id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let mut order = Order::new_with_time(
            id,
            request.symbol.clone(),
            request.exchange,
            request.side,
            request.order_type,
            request.quantity,
            request.price,
            request.stop_price,
            request.time_in_force,
            request.strategy_id.clone(),
            now,
        );

        match self.gate.authorize(self.positions.portfolio_view(), &request) {
            Ok(()) => {
                order.status = OrderStatus::Submitted;
                info!("order {id} submitted: {} {} {}", order.side, order.quantity, order.symbol);
            }
            Err(breach) => {
                order.status = OrderStatus::Rejected;
                order.reject_reason = Some(breach.to_string());
                warn!("order {id} rejected by risk gate: {breach}");
            }
        }

        self.orders.insert(id, order.clone());
        self.order_events.publish(order.clone());
        Ok(order)
    }

    /// Exchange acknowledged the order and assigned its own id
    pub fn acknowledge(&self, id: OrderId, exchange_order_id: impl Into<String>) -> Result<Order> {
        let exchange_order_id = exchange_order_id.into();
        self.transition(id, OrderStatus::Accepted, |order| {
            order.exchange_order_id = Some(exchange_order_id);
        })
    }

    /// Apply an execution report.
    ///
    /// Fails with `UnknownOrder` for untracked ids and with
    /// `InvalidTransition` for terminal orders or over-fills, leaving
    /// the order unchanged. On success the fill is written to the sink,
    /// applied to the order, routed to the position book and then to
    /// the owning strategy.
    pub fn apply_fill(&self, id: OrderId, quantity: Decimal, price: Decimal) -> Result<Order> {
        if quantity <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "fill quantity {quantity} must be positive"
            )));
        }

        let (snapshot, fill) = {
            let mut entry = self.orders.get_mut(&id).ok_or(Error::UnknownOrder(id))?;
            let order = entry.value_mut();

            let target = if order.filled_quantity + quantity >= order.quantity {
                OrderStatus::Filled
            } else {
                OrderStatus::PartiallyFilled
            };
            if !order.status.can_transition(target) {
                return Err(Error::InvalidTransition {
                    id,
                    from: order.status,
                    to: target,
                });
            }
            if order.filled_quantity + quantity > order.quantity {
                // Over-fill is an out-of-order event, not a new state
                return Err(Error::InvalidTransition {
                    id,
                    from: order.status,
                    to: target,
                });
            }

            let now = Utc::now();
            let fill = Fill {
                seq: self.next_fill_seq.fetch_add(1, Ordering::SeqCst),
                order_id: id,
                strategy_id: order.strategy_id.clone(),
                symbol: order.symbol.clone(),
                exchange: order.exchange,
                side: order.side,
                quantity,
                price,
                timestamp: now,
            };

            // Write-ahead: a refused append means the fill never happened
            let sink = self.fill_sink.read().clone();
            if let Some(sink) = sink {
                sink.record(&fill).map_err(Error::Persistence)?;
            }

            order.record_fill(quantity, price, now);
            let snapshot = order.clone();
            self.order_events.publish(snapshot.clone());
            (snapshot, fill)
        };

        // Route to the position book after releasing the order entry;
        // there is deliberately no cross-entity transaction here (the
        // journal is the recovery source if we die in between).
        self.positions.apply_fill(&fill);

        // Strategy dispatch, then the strategy-specific notification
        if let Some(strategy_id) = &fill.strategy_id {
            if let Some(handler) = self.fill_handlers.get(strategy_id) {
                handler.on_fill(&snapshot, quantity, price);
            }
            self.strategy_events.publish(StrategyFillEvent {
                strategy_id: strategy_id.clone(),
                order: snapshot.clone(),
                quantity,
                price,
            });
        }

        Ok(snapshot)
    }

    /// Cancel an active order
    pub fn cancel(&self, id: OrderId) -> Result<Order> {
        let order = self.transition(id, OrderStatus::Cancelled, |_| {})?;
        info!("order {id} cancelled");
        Ok(order)
    }

    /// Expire an active order (time-in-force elapsed)
    pub fn expire(&self, id: OrderId) -> Result<Order> {
        let order = self.transition(id, OrderStatus::Expired, |_| {})?;
        info!("order {id} expired");
        Ok(order)
    }

    /// Reject a pending or submitted order
    pub fn reject(&self, id: OrderId, reason: impl Into<String>) -> Result<Order> {
        let reason = reason.into();
        let order = self.transition(id, OrderStatus::Rejected, |order| {
            order.reject_reason = Some(reason);
        })?;
        warn!(
            "order {id} rejected: {}",
            order.reject_reason.as_deref().unwrap_or("")
        );
        Ok(order)
    }

    pub fn get(&self, id: OrderId) -> Option<Order> {
        self.orders.get(&id).map(|o| o.value().clone())
    }

    pub fn all(&self) -> Vec<Order> {
        self.orders.iter().map(|o| o.value().clone()).collect()
    }

    /// Orders still working on the exchange
    pub fn open_orders(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| o.status.is_active())
            .map(|o| o.value().clone())
            .collect()
    }

    /// Shared transition path: validate against the state machine,
    /// mutate, stamp, publish. The entry lock is released before any
    /// listener can observe the event.
    fn transition(
        &self,
        id: OrderId,
        to: OrderStatus,
        mutate: impl FnOnce(&mut Order),
    ) -> Result<Order> {
        let mut entry = self.orders.get_mut(&id).ok_or(Error::UnknownOrder(id))?;
        let order = entry.value_mut();

        if !order.status.can_transition(to) {
            return Err(Error::InvalidTransition {
                id,
                from: order.status,
                to,
            });
        }

        mutate(order);
        order.status = to;
        order.updated_at = Utc::now();
        let snapshot = order.clone();
        self.order_events.publish(snapshot.clone());
        Ok(snapshot)
    }
}
