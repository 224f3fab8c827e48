//! Risk context snapshot
//!
//! A read-only view of the trading state the risk engine evaluates
//! against. The engine never mutates anything; the gate assembles a
//! context from the position book's portfolio view plus the daily
//! ledger at the moment of the check.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::limits::RiskLimits;

/// Aggregated position-book state, produced by the position manager
#[derive(Debug, Clone, Default)]
pub struct PortfolioView {
    /// Signed quantity per symbol (aggregated across exchanges)
    pub positions: HashMap<String, Decimal>,
    /// Last mark price per symbol, used to value market orders
    pub mark_prices: HashMap<String, Decimal>,
    /// Signed sum of position market values
    pub net_exposure: Decimal,
    /// Sum of absolute position market values
    pub gross_exposure: Decimal,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
}

/// Read-only snapshot handed to the risk engine
#[derive(Debug, Clone)]
pub struct RiskContext {
    pub portfolio: PortfolioView,
    /// Orders accepted so far today
    pub orders_submitted_today: u32,
    /// Notional accepted so far today
    pub notional_traded_today: Decimal,
    /// Active limits
    pub limits: RiskLimits,
}

impl RiskContext {
    /// Signed position quantity for a symbol; flat if never traded
    pub fn position_quantity(&self, symbol: &str) -> Decimal {
        self.portfolio
            .positions
            .get(symbol)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Last observed mark price for a symbol, if any
    pub fn mark_price(&self, symbol: &str) -> Option<Decimal> {
        self.portfolio.mark_prices.get(symbol).copied()
    }

    pub fn total_pnl(&self) -> Decimal {
        self.portfolio.realized_pnl + self.portfolio.unrealized_pnl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn lookups_default_to_flat() {
        let ctx = RiskContext {
            portfolio: PortfolioView::default(),
            orders_submitted_today: 0,
            notional_traded_today: Decimal::ZERO,
            limits: RiskLimits::default(),
        };

        assert_eq!(ctx.position_quantity("AAPL"), Decimal::ZERO);
        assert_eq!(ctx.mark_price("AAPL"), None);
    }

    #[test]
    fn total_pnl_sums_components() {
        let ctx = RiskContext {
            portfolio: PortfolioView {
                realized_pnl: dec!(100),
                unrealized_pnl: dec!(-30),
                ..Default::default()
            },
            orders_submitted_today: 0,
            notional_traded_today: Decimal::ZERO,
            limits: RiskLimits::default(),
        };

        assert_eq!(ctx.total_pnl(), dec!(70));
    }
}
