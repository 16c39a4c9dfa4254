//! Error types for ledger access.

use thiserror::Error;

/// Errors raised by a ledger client or event source.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transport-level failure talking to the node.
    #[error("network error: {0}")]
    Network(String),

    /// The requested transaction, block or account is unknown.
    #[error("not found: {0}")]
    NotFound(String),

    /// The event stream ended before the awaited event arrived.
    #[error("subscription closed")]
    SubscriptionClosed,

    /// The node refused to accept the payload at all.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
