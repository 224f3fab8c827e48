//! Store errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Log append or read fault. A failed append is never reflected in
    /// the in-memory index.
    #[error("persistence failure: {0}")]
    Io(#[from] std::io::Error),

    /// A fully written record that cannot be decoded. Replay stops and
    /// the index is left untouched.
    #[error("corrupt record at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    /// Operation on a store that was already closed
    #[error("store is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, StoreError>;
