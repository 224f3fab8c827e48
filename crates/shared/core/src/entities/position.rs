use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Exchange, Side};

/// Positions are keyed by (symbol, exchange); the same symbol traded on
/// two exchanges is two independent positions.
pub type PositionKey = (String, Exchange);

/// A trading position in a single instrument on a single exchange.
///
/// Quantity is signed: positive = long, negative = short, zero = flat.
/// Created lazily on the first fill and never deleted; a closed position
/// persists at zero quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub exchange: Exchange,

    /// Signed quantity (positive = long, negative = short)
    pub quantity: Decimal,

    /// Average entry price; only moves on fills that open or increase
    /// the position, never on reducing fills
    pub avg_entry_price: Decimal,

    /// Last observed market price
    pub mark_price: Decimal,

    /// quantity * mark_price (signed)
    pub market_value: Decimal,

    /// Profit/loss locked in by reducing or reversing fills
    pub realized_pnl: Decimal,

    /// Profit/loss of the open quantity at the current mark price
    pub unrealized_pnl: Decimal,

    /// Largest observed single-step drop in unrealized P&L
    pub max_drawdown: Decimal,

    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Create a flat position; the first fill establishes direction and entry
    pub fn new(symbol: impl Into<String>, exchange: Exchange, now: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            quantity: Decimal::ZERO,
            avg_entry_price: Decimal::ZERO,
            mark_price: Decimal::ZERO,
            market_value: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            opened_at: now,
            updated_at: now,
        }
    }

    pub fn is_long(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    pub fn is_short(&self) -> bool {
        self.quantity < Decimal::ZERO
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Apply a fill to this position, returning the realized P&L from
    /// this fill.
    ///
    /// Same-direction fills (or fills on a flat position) update the
    /// average entry price as the quantity-weighted average of the old
    /// and new lots. Opposite-direction fills close all or part of the
    /// position first, realizing P&L against the entry price; any excess
    /// quantity opens a new position in the opposite direction at the
    /// fill price.
    pub fn apply_fill(
        &mut self,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Decimal {
        let signed_qty = side.sign() * quantity;
        let mut realized = Decimal::ZERO;

        if self.quantity.is_zero() {
            // Opening a fresh position
            self.quantity = signed_qty;
            self.avg_entry_price = price;
            self.mark_price = price;
        } else if (self.quantity > Decimal::ZERO) == (signed_qty > Decimal::ZERO) {
            // Adding to the position: weighted average entry
            let total = self.quantity.abs() + quantity;
            self.avg_entry_price =
                (self.avg_entry_price * self.quantity.abs() + price * quantity) / total;
            self.quantity += signed_qty;
        } else {
            // Reducing or reversing
            let close_qty = quantity.min(self.quantity.abs());
            let direction = if self.quantity > Decimal::ZERO {
                Decimal::ONE
            } else {
                -Decimal::ONE
            };
            realized = close_qty * (price - self.avg_entry_price) * direction;
            self.realized_pnl += realized;

            let new_quantity = self.quantity + signed_qty;
            if (new_quantity > Decimal::ZERO) != (self.quantity > Decimal::ZERO)
                && !new_quantity.is_zero()
            {
                // Flipped sides: the remainder opens at the fill price
                self.avg_entry_price = price;
            }
            self.quantity = new_quantity;
        }

        self.refresh_valuation();
        self.updated_at = now;
        realized
    }

    /// Mark the position to a new market price. Never touches realized
    /// P&L or quantity.
    pub fn update_mark_price(&mut self, price: Decimal, now: DateTime<Utc>) {
        self.mark_price = price;
        self.refresh_valuation();
        self.updated_at = now;
    }

    /// Recompute market value and unrealized P&L from the current mark,
    /// folding the change into the drawdown watermark.
    fn refresh_valuation(&mut self) {
        self.market_value = self.quantity * self.mark_price;
        let previous = self.unrealized_pnl;
        // Signed quantity makes this correct for both directions
        self.unrealized_pnl = self.quantity * (self.mark_price - self.avg_entry_price);
        let drop = previous - self.unrealized_pnl;
        if drop > self.max_drawdown {
            self.max_drawdown = drop;
        }
    }
}
