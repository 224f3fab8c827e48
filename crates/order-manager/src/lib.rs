//! Hermes Order Manager
//!
//! Owns every order and every position in the engine and drives the
//! order lifecycle state machine:
//!
//! ```text
//! Strategy ──► OrderRequest ──► ┌──────────────────────────────────────┐
//!                               │            Order Manager             │
//!                               │  validate ──► RiskGate ──► Submitted │
//!                               │                   │                  │
//!                               │                   └──► Rejected      │
//!                               └────────┬─────────────────────────────┘
//!                                        │ async dispatch (runner)
//! Exchange adapter ◄─────────────────────┘
//!        │ acks / fills
//!        ▼
//!   apply_fill ──► order snapshot ──► order listeners (ordered fan-out)
//!        │
//!        ├──► PositionManager ──► position listeners
//!        │
//!        └──► strategy FillHandler ──► strategy-fill listeners
//! ```
//!
//! Concurrency model: both managers keep their authoritative map in a
//! `DashMap`, so contention on one order or position never serializes
//! updates to another. Listener callbacks run on a dedicated notifier
//! thread fed by an unbounded channel - mutators enqueue snapshots and
//! move on, and listeners observe transitions in exactly the order they
//! occurred without ever holding an entity lock.

pub mod dispatch;
pub mod error;
mod fanout;
pub mod orders;
pub mod positions;

// Re-export main types
pub use dispatch::{FillHandler, FillSink, StrategyFillEvent};
pub use error::{Error, Result};
pub use orders::OrderManager;
pub use positions::PositionManager;
