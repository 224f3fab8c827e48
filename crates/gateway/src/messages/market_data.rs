//! Market data message types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single OHLCV bar as returned by `ExchangeAdapter::get_bars`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Bar {
    /// Midpoint of the bar's range
    pub fn mid(&self) -> Decimal {
        (self.high + self.low) / Decimal::TWO
    }
}
