use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Exchange, OrderId, Side};

/// A partial or complete execution report for an order.
///
/// Fills are the unit routed from the order manager to the position
/// book, to the owning strategy's fill handler, and to the durable fill
/// journal used for crash recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Journal sequence number, monotonic across the engine's lifetime.
    /// Replay uses this to skip fills that were already applied.
    pub seq: u64,
    pub order_id: OrderId,
    /// Strategy that owns the filled order, if any
    pub strategy_id: Option<String>,
    pub symbol: String,
    pub exchange: Exchange,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Fill {
    /// Monetary size of this fill
    pub fn notional(&self) -> Decimal {
        self.quantity * self.price
    }
}
