//! Position book
//!
//! Owns one position per (symbol, exchange), created lazily on the
//! first fill and never deleted - a closed position persists at zero.
//! Each entry is guarded by its own DashMap shard lock, so updating one
//! position never serializes updates to another.

use dashmap::DashMap;
use hermes_core::{Exchange, Fill, Position, PositionKey};
use hermes_risk_manager::PortfolioView;
use log::debug;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::fanout::Fanout;

/// Real-time position and P&L accounting
pub struct PositionManager {
    positions: DashMap<PositionKey, Position>,
    events: Fanout<Position>,
}

impl PositionManager {
    pub fn new() -> Self {
        Self {
            positions: DashMap::new(),
            events: Fanout::new("position-notifier"),
        }
    }

    /// Register a position listener. Listeners receive owned snapshots,
    /// in mutation order, on the notifier thread.
    pub fn add_listener(&self, listener: impl Fn(&Position) + Send + Sync + 'static) {
        self.events.subscribe(listener);
    }

    /// Apply a fill, creating the position if this is the first fill
    /// for its (symbol, exchange). Returns the updated snapshot.
    pub fn apply_fill(&self, fill: &Fill) -> Position {
        let key: PositionKey = (fill.symbol.clone(), fill.exchange);
        let mut entry = self
            .positions
            .entry(key)
            .or_insert_with(|| Position::new(fill.symbol.clone(), fill.exchange, fill.timestamp));

        let realized = entry.apply_fill(fill.side, fill.quantity, fill.price, fill.timestamp);
        let snapshot = entry.value().clone();
        // Publish before releasing the entry so notification order
        // matches mutation order
        self.events.publish(snapshot.clone());
        drop(entry);

        debug!(
            "fill applied to {} on {}: qty {} entry {} realized {realized}",
            snapshot.symbol, snapshot.exchange, snapshot.quantity, snapshot.avg_entry_price
        );
        snapshot
    }

    /// Mark a position to a new market price. Touches neither realized
    /// P&L nor quantity.
    pub fn mark_price(&self, symbol: &str, exchange: Exchange, price: Decimal) -> Result<Position> {
        let key: PositionKey = (symbol.to_string(), exchange);
        let mut entry = self
            .positions
            .get_mut(&key)
            .ok_or_else(|| Error::UnknownPosition {
                symbol: symbol.to_string(),
                exchange,
            })?;

        entry.update_mark_price(price, chrono::Utc::now());
        let snapshot = entry.value().clone();
        self.events.publish(snapshot.clone());
        drop(entry);

        Ok(snapshot)
    }

    pub fn get(&self, symbol: &str, exchange: Exchange) -> Option<Position> {
        self.positions
            .get(&(symbol.to_string(), exchange))
            .map(|p| p.value().clone())
    }

    pub fn all(&self) -> Vec<Position> {
        self.positions.iter().map(|p| p.value().clone()).collect()
    }

    /// Signed sum of position market values
    pub fn net_exposure(&self) -> Decimal {
        self.positions.iter().map(|p| p.market_value).sum()
    }

    /// Sum of absolute position market values
    pub fn gross_exposure(&self) -> Decimal {
        self.positions.iter().map(|p| p.market_value.abs()).sum()
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.positions.iter().map(|p| p.realized_pnl).sum()
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        self.positions.iter().map(|p| p.unrealized_pnl).sum()
    }

    /// Aggregate view consumed by the risk gate. Per-symbol quantities
    /// are summed across exchanges.
    pub fn portfolio_view(&self) -> PortfolioView {
        let mut view = PortfolioView::default();
        for position in self.positions.iter() {
            *view
                .positions
                .entry(position.symbol.clone())
                .or_insert(Decimal::ZERO) += position.quantity;
            if !position.mark_price.is_zero() {
                view.mark_prices
                    .insert(position.symbol.clone(), position.mark_price);
            }
            view.net_exposure += position.market_value;
            view.gross_exposure += position.market_value.abs();
            view.realized_pnl += position.realized_pnl;
            view.unrealized_pnl += position.unrealized_pnl;
        }
        view
    }
}

impl Default for PositionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hermes_core::Side;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn fill(symbol: &str, side: Side, quantity: Decimal, price: Decimal) -> Fill {
        Fill {
            seq: 0,
            order_id: 1,
            strategy_id: None,
            symbol: symbol.to_string(),
            exchange: Exchange::Sim,
            side,
            quantity,
            price,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn positions_are_created_lazily_and_persist_flat() {
        let manager = PositionManager::new();
        assert!(manager.get("BTC-USD", Exchange::Sim).is_none());

        manager.apply_fill(&fill("BTC-USD", Side::Buy, dec!(1), dec!(100)));
        manager.apply_fill(&fill("BTC-USD", Side::Sell, dec!(1), dec!(110)));

        let pos = manager.get("BTC-USD", Exchange::Sim).unwrap();
        assert!(pos.is_flat());
        assert_eq!(pos.realized_pnl, dec!(10));
    }

    #[test]
    fn mark_price_requires_existing_position() {
        let manager = PositionManager::new();
        let err = manager
            .mark_price("BTC-USD", Exchange::Sim, dec!(100))
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnknownPosition {
                symbol: "BTC-USD".into(),
                exchange: Exchange::Sim
            }
        );
    }

    #[test]
    fn exposure_aggregates_are_signed_and_absolute() {
        let manager = PositionManager::new();
        manager.apply_fill(&fill("BTC-USD", Side::Buy, dec!(2), dec!(100)));
        manager.apply_fill(&fill("ETH-USD", Side::Sell, dec!(3), dec!(50)));

        // BTC long 2 @ mark 100 = +200, ETH short 3 @ mark 50 = -150
        assert_eq!(manager.net_exposure(), dec!(50));
        assert_eq!(manager.gross_exposure(), dec!(350));
    }

    #[test]
    fn portfolio_view_sums_symbols_across_exchanges() {
        let manager = PositionManager::new();
        manager.apply_fill(&fill("BTC-USD", Side::Buy, dec!(2), dec!(100)));
        let mut other = fill("BTC-USD", Side::Sell, dec!(3), dec!(100));
        other.exchange = Exchange::Binance;
        manager.apply_fill(&other);

        let view = manager.portfolio_view();
        assert_eq!(view.positions.get("BTC-USD"), Some(&dec!(-1)));
    }

    #[test]
    fn listeners_see_snapshots_in_mutation_order() {
        let manager = PositionManager::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        manager.add_listener(move |p: &Position| {
            tx.send(p.quantity).unwrap();
        });

        manager.apply_fill(&fill("BTC-USD", Side::Buy, dec!(1), dec!(100)));
        manager.apply_fill(&fill("BTC-USD", Side::Buy, dec!(2), dec!(100)));
        manager.apply_fill(&fill("BTC-USD", Side::Sell, dec!(1), dec!(100)));

        let quantities: Vec<Decimal> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(1)).unwrap())
            .collect();
        assert_eq!(quantities, vec![dec!(1), dec!(3), dec!(2)]);
    }
}
