//! Fill routing contracts

use hermes_core::{Fill, Order};
use rust_decimal::Decimal;

/// Strategy dispatch contract: the engine calls into the owning
/// strategy's handler with each fill on one of its orders. The handler
/// updates the strategy's own state before returning; the strategy-fill
/// notification is published only afterwards, so observers never see
/// stale strategy state.
pub trait FillHandler: Send + Sync {
    fn on_fill(&self, order: &Order, quantity: Decimal, price: Decimal);
}

/// Write-ahead sink for applied fills.
///
/// Called before the order or position is mutated; a refusal aborts the
/// fill entirely, so a persisted record always precedes the in-memory
/// effect and recovery can replay the log as the source of truth.
pub trait FillSink: Send + Sync {
    fn record(&self, fill: &Fill) -> std::result::Result<(), String>;
}

/// Published after a fill has been dispatched to its owning strategy
#[derive(Debug, Clone)]
pub struct StrategyFillEvent {
    pub strategy_id: String,
    /// Snapshot of the order after the fill was applied
    pub order: Order,
    pub quantity: Decimal,
    pub price: Decimal,
}
