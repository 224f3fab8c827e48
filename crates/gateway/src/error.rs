//! Adapter error taxonomy
//!
//! Every exchange adapter surfaces failures through this one enum so the
//! order layer can classify them uniformly: rate-limited and server
//! errors are retryable later, unauthorized is fatal to the session, and
//! not-found / other client errors are fatal to the order they concern.

use thiserror::Error;

/// Errors surfaced by exchange adapters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl ExchangeError {
    /// Transient failures eligible for caller-driven retry with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::RateLimited { .. }
                | ExchangeError::Server { .. }
                | ExchangeError::Transport(_)
        )
    }

    /// Failures that invalidate the whole session (credentials revoked)
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, ExchangeError::Unauthorized(_))
    }

    /// Failures that doom the order they concern but nothing else
    pub fn is_order_fatal(&self) -> bool {
        matches!(
            self,
            ExchangeError::NotFound(_) | ExchangeError::Client { .. }
        )
    }
}
