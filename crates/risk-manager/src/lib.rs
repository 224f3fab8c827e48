//! Hermes Risk Manager
//!
//! Pre-trade risk gating. Every order the engine accepts passes through
//! here before it is handed to an exchange adapter:
//!
//! - **RiskLimits**: immutable per-engine configuration
//! - **DailyLedger**: the single owner of the orders/notional daily
//!   counters; reset is an explicit operation, never implicit
//! - **RiskContext**: read-only snapshot of aggregated trading state
//! - **RiskEngine**: a pure function of (context, proposed order) that
//!   accepts or reports exactly the first breached limit
//! - **RiskGate**: evaluates and, on acceptance, increments the daily
//!   counters under the same lock, so no order can pass the check
//!   without being counted
//!
//! ```text
//! PortfolioView ──┐
//!                 ├──► RiskGate ──► RiskEngine ──► accept / RiskBreach
//! DailyLedger ────┘        │
//!                          └── counters += (on accept only)
//! ```

pub mod context;
pub mod engine;
pub mod gate;
pub mod ledger;
pub mod limits;

// Re-export main types
pub use context::{PortfolioView, RiskContext};
pub use engine::{RiskBreach, RiskEngine};
pub use gate::RiskGate;
pub use ledger::DailyLedger;
pub use limits::RiskLimits;
