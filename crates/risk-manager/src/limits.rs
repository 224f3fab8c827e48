//! Risk limit configuration

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Immutable risk limits for one engine instance.
///
/// The exact numbers are a configuration surface; the defaults are
/// permissive enough for paper trading and tests tighten them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Maximum orders accepted per trading day
    pub max_orders_per_day: u32,
    /// Maximum notional traded per trading day
    pub max_daily_notional: Decimal,
    /// Maximum absolute net exposure (signed sum of market values)
    pub max_net_exposure: Decimal,
    /// Maximum gross exposure (sum of absolute market values)
    pub max_gross_exposure: Decimal,
    /// Maximum absolute position size per symbol
    pub max_position_size: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_orders_per_day: 1_000,
            max_daily_notional: dec!(10_000_000),
            max_net_exposure: dec!(1_000_000),
            max_gross_exposure: dec!(2_000_000),
            max_position_size: dec!(10_000),
        }
    }
}
