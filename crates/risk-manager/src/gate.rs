//! Atomic risk gate
//!
//! Couples the pure risk evaluation with the daily-ledger increment.
//! Both happen under one ledger lock, so an order can never pass the
//! check and escape being counted - the counter increment is part of
//! the same atomic submission step.

use chrono::NaiveDate;
use hermes_gateway::OrderRequest;
use log::debug;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::context::{PortfolioView, RiskContext};
use crate::engine::{RiskBreach, RiskEngine};
use crate::ledger::DailyLedger;
use crate::limits::RiskLimits;

/// Serialized owner of the risk limits and daily counters
pub struct RiskGate {
    limits: RiskLimits,
    ledger: Mutex<DailyLedger>,
}

impl RiskGate {
    pub fn new(limits: RiskLimits, trading_day: NaiveDate) -> Self {
        Self {
            limits,
            ledger: Mutex::new(DailyLedger::new(trading_day)),
        }
    }

    /// Evaluate `request` against the current state. On acceptance the
    /// daily order and notional counters are incremented before the
    /// ledger lock is released.
    pub fn authorize(
        &self,
        portfolio: PortfolioView,
        request: &OrderRequest,
    ) -> Result<(), RiskBreach> {
        let mut ledger = self.ledger.lock();

        let ctx = RiskContext {
            portfolio,
            orders_submitted_today: ledger.orders_submitted(),
            notional_traded_today: ledger.notional_traded(),
            limits: self.limits.clone(),
        };

        RiskEngine::evaluate(&ctx, request)?;

        let notional = RiskEngine::proposed_notional(&ctx, request);
        ledger.record_submission(notional);
        debug!(
            "risk gate accepted {} {} {} (notional {notional})",
            request.side, request.quantity, request.symbol
        );
        Ok(())
    }

    /// Explicit day rollover
    pub fn roll_day(&self, trading_day: NaiveDate) {
        self.ledger.lock().reset_for(trading_day);
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Current (orders, notional) counters, for status reporting
    pub fn daily_totals(&self) -> (u32, Decimal) {
        let ledger = self.ledger.lock();
        (ledger.orders_submitted(), ledger.notional_traded())
    }
}
