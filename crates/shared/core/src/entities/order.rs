use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Exchange, OrderStatus, OrderType, Side, TimeInForce};

/// Locally assigned order identifier: a monotonic, process-unique
/// sequence number handed out by the order manager.
pub type OrderId = u64;

/// Full order details.
///
/// Owned exclusively by the order manager; every mutation goes through
/// its transition API so the status state machine cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Exchange-assigned identifier, absent until the exchange acknowledges
    pub exchange_order_id: Option<String>,
    pub symbol: String,
    pub exchange: Exchange,
    pub side: Side,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    /// Requested quantity
    pub quantity: Decimal,
    /// Required for Limit and StopLimit orders
    pub price: Option<Decimal>,
    /// Required for Stop and StopLimit orders
    pub stop_price: Option<Decimal>,
    /// Cumulative filled quantity, `0 <= filled_quantity <= quantity`
    pub filled_quantity: Decimal,
    /// Volume-weighted average fill price; defined only once filled_quantity > 0
    pub avg_fill_price: Option<Decimal>,
    pub status: OrderStatus,
    pub reject_reason: Option<String>,
    /// Strategy that originated this order, if any
    pub strategy_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order with explicit timestamp
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_time(
        id: OrderId,
        symbol: impl Into<String>,
        exchange: Exchange,
        side: Side,
        order_type: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
        stop_price: Option<Decimal>,
        time_in_force: TimeInForce,
        strategy_id: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            exchange_order_id: None,
            symbol: symbol.into(),
            exchange,
            side,
            order_type,
            time_in_force,
            quantity,
            price,
            stop_price,
            filled_quantity: Decimal::ZERO,
            avg_fill_price: None,
            status: OrderStatus::Pending,
            reject_reason: None,
            strategy_id,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns remaining quantity to be filled
    pub fn remaining_quantity(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }

    /// Returns true if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled_quantity >= self.quantity
    }

    /// Apply an execution to this order: monotonically increase the filled
    /// quantity, fold the fill into the volume-weighted average price, and
    /// move the status to Filled or PartiallyFilled.
    ///
    /// The caller (order manager) is responsible for checking that the
    /// order is not terminal and that the fill does not exceed the
    /// remaining quantity.
    pub fn record_fill(&mut self, quantity: Decimal, price: Decimal, now: DateTime<Utc>) {
        let prior_notional = self.avg_fill_price.unwrap_or(Decimal::ZERO) * self.filled_quantity;
        let new_filled = self.filled_quantity + quantity;

        if new_filled > Decimal::ZERO {
            self.avg_fill_price = Some((prior_notional + quantity * price) / new_filled);
        }
        self.filled_quantity = new_filled;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = now;
    }
}
