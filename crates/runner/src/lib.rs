//! Hermes Runner
//!
//! Wires the engine together: one order manager, one position book,
//! one risk gate, one durable store and one configured exchange
//! adapter. The [`TradingEngine`] is the surface strategies and
//! operators talk to:
//!
//! ```text
//!                    ┌───────────────────────────────────────┐
//! OrderRequest ────► │              TradingEngine            │
//!                    │  OrderManager ──► RiskGate            │
//!                    │       │                               │
//!                    │       ├──► FillJournal (write-ahead)  │
//!                    │       ├──► PositionManager            │
//!                    │       └──► strategy FillHandler       │
//!                    │  StrategyStore (save/delete/find)     │
//!                    └───────────┬───────────────────────────┘
//!                                │ tokio::spawn
//!                    ExchangeAdapter (async submit/cancel)
//! ```
//!
//! On construction the engine replays the fill journal into the
//! position book, so a crash between an order update and its position
//! update converges after restart.

pub mod config;
pub mod engine;

// Re-export main types
pub use config::EngineConfig;
pub use engine::{EngineError, TradingEngine};
