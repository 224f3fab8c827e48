//! Hermes Store
//!
//! Durable, append-only persistence for the engine:
//!
//! - **StrategyStore**: the source of truth for strategy definitions.
//!   An append-only log of PUT and DELETE records plus an in-memory
//!   index (id -> latest definition) rebuilt by a one-time sequential
//!   replay on open. Reads never scan the log; the log is never
//!   rewritten.
//! - **FillJournal**: the append-only log of applied fills, written
//!   ahead of the in-memory order/position mutation. Replay on restart
//!   reconstructs the position book; sequence numbers make the replay
//!   idempotent.
//!
//! Both logs share one framed record format: one record per line,
//! reserved separator characters, and backslash escaping so any field
//! value - including one containing the separators themselves -
//! round-trips losslessly.

pub mod error;
pub mod journal;
pub mod record;
pub mod strategy_store;

// Re-export main types
pub use error::{Result, StoreError};
pub use journal::FillJournal;
pub use strategy_store::StrategyStore;
