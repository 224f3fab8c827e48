//! Order Manager errors

use hermes_core::{Exchange, OrderId, OrderStatus};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed order request, rejected before any state mutation
    #[error("validation failed: {0}")]
    Validation(String),

    /// Lookup miss on the order map; nothing was mutated
    #[error("unknown order: {0}")]
    UnknownOrder(OrderId),

    /// Lookup miss on the position map; nothing was mutated
    #[error("unknown position: {symbol} on {exchange}")]
    UnknownPosition { symbol: String, exchange: Exchange },

    /// Terminal-state or out-of-order event; the original state is unchanged
    #[error("invalid transition for order {id}: {from:?} -> {to:?}")]
    InvalidTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The write-ahead fill sink refused the record; the fill was not applied
    #[error("persistence failure: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, Error>;
