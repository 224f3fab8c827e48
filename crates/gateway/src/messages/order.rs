//! Order message types

use chrono::{DateTime, Utc};
use hermes_core::{Exchange, OrderType, Side, TimeInForce};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order submission request, as produced by a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Instrument to trade
    pub symbol: String,
    /// Exchange to route to
    pub exchange: Exchange,
    /// Buy or sell
    pub side: Side,
    pub order_type: OrderType,
    /// Quantity to trade
    pub quantity: Decimal,
    /// Limit price (required for Limit and StopLimit orders)
    pub price: Option<Decimal>,
    /// Stop trigger price (required for Stop and StopLimit orders)
    pub stop_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
    /// Strategy that originated the request, if any
    pub strategy_id: Option<String>,
}

impl OrderRequest {
    /// Create a new limit order request
    pub fn limit(
        symbol: impl Into<String>,
        exchange: Exchange,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            stop_price: None,
            time_in_force,
            strategy_id: None,
        }
    }

    /// Create a new market order request. Market orders are always IOC.
    pub fn market(
        symbol: impl Into<String>,
        exchange: Exchange,
        side: Side,
        quantity: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            stop_price: None,
            time_in_force: TimeInForce::Ioc,
            strategy_id: None,
        }
    }

    pub fn for_strategy(mut self, strategy_id: impl Into<String>) -> Self {
        self.strategy_id = Some(strategy_id.into());
        self
    }

    /// Check the request is well-formed for its order type.
    /// Returns the first problem found, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.is_empty() {
            return Err("symbol is empty".into());
        }
        if self.quantity <= Decimal::ZERO {
            return Err(format!("quantity {} must be positive", self.quantity));
        }
        if self.order_type.requires_price() && self.price.is_none() {
            return Err(format!("{:?} order requires a limit price", self.order_type));
        }
        if self.order_type.requires_stop_price() && self.stop_price.is_none() {
            return Err(format!("{:?} order requires a stop price", self.order_type));
        }
        if let Some(price) = self.price {
            if price <= Decimal::ZERO {
                return Err(format!("limit price {price} must be positive"));
            }
        }
        if let Some(stop) = self.stop_price {
            if stop <= Decimal::ZERO {
                return Err(format!("stop price {stop} must be positive"));
            }
        }
        Ok(())
    }

    /// Monetary size of the request at its limit price, if priced
    pub fn notional(&self) -> Option<Decimal> {
        self.price.map(|p| self.quantity * p)
    }
}

/// Acknowledgement returned by an exchange adapter on submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeAck {
    /// Exchange-assigned order identifier
    pub exchange_order_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ExchangeAck {
    pub fn new(exchange_order_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            exchange_order_id: exchange_order_id.into(),
            timestamp,
        }
    }
}
