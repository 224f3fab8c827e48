//! Hermes Gateway
//!
//! Boundary between the engine core and the outside world. Provides:
//! - The `ExchangeAdapter` capability contract every exchange implements
//! - The adapter error taxonomy and its retryability classification
//! - Wire message types for order submission and market data
//! - An in-process simulator adapter for tests and paper trading
//!
//! ## Architecture
//!
//! ```text
//! External World (Alpaca, Binance, Simulator)
//!         │
//!    ┌────▼────────────┐
//!    │ ExchangeAdapter │  submit_order / cancel_order / get_bars
//!    └────┬────────────┘
//!         │ ExchangeAck / ExchangeError
//!    ┌────▼────┐
//!    │ Engine  │
//!    │  Core   │
//!    └─────────┘
//! ```
//!
//! The core never blocks on an adapter call: submissions are dispatched
//! from spawned tasks and acknowledgements flow back in asynchronously.

pub mod adapters;
pub mod error;
pub mod messages;
pub mod retry;

// Re-export commonly used types
pub use adapters::{ExchangeAdapter, sim::SimulatedExchange};
pub use error::ExchangeError;
pub use messages::{
    market_data::Bar,
    order::{ExchangeAck, OrderRequest},
};
pub use retry::RetryPolicy;
