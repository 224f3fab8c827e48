//! Daily trading counters
//!
//! The ledger is the single owner of the per-day counters the risk
//! engine reads. It is mutated only through its own API - callers never
//! see raw shared counters - and the day rollover is an explicit
//! operation, never a side effect of a read.

use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Orders and notional accumulated during one trading day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLedger {
    trading_day: NaiveDate,
    orders_submitted: u32,
    notional_traded: Decimal,
}

impl DailyLedger {
    pub fn new(trading_day: NaiveDate) -> Self {
        Self {
            trading_day,
            orders_submitted: 0,
            notional_traded: Decimal::ZERO,
        }
    }

    /// Count an accepted submission. Called only after the risk check
    /// passed, never on rejection.
    pub fn record_submission(&mut self, notional: Decimal) {
        self.orders_submitted += 1;
        self.notional_traded += notional;
    }

    /// Explicit day rollover: zero the counters and start a new day
    pub fn reset_for(&mut self, trading_day: NaiveDate) {
        info!(
            "daily ledger reset for {trading_day}: previous day had {} orders, {} notional",
            self.orders_submitted, self.notional_traded
        );
        self.trading_day = trading_day;
        self.orders_submitted = 0;
        self.notional_traded = Decimal::ZERO;
    }

    pub fn trading_day(&self) -> NaiveDate {
        self.trading_day
    }

    pub fn orders_submitted(&self) -> u32 {
        self.orders_submitted
    }

    pub fn notional_traded(&self) -> Decimal {
        self.notional_traded
    }
}
