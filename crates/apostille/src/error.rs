//! Error types for the notarization services.

use apostille_core::{CoreError, TransactionHash};
use apostille_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur while notarizing or auditing.
#[derive(Debug, Error)]
pub enum ApostilleError {
    /// The transaction set cannot be announced as composed.
    #[error("compose error: {0}")]
    Compose(String),

    /// The notarization account could not be derived.
    #[error("derivation error: {0}")]
    Derivation(String),

    /// A ledger call failed. Never retried locally.
    #[error("network error: {0}")]
    Network(#[from] LedgerError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// The audited transaction is not an aggregate.
    #[error("invalid transaction type")]
    InvalidTransactionType,

    /// No inner transfer carries a notarization payload.
    #[error("core transaction not found")]
    CoreTransactionNotFound,

    /// The ledger reported a validation failure for a submitted transaction.
    #[error("transaction {hash} rejected: {status}")]
    Rejected {
        hash: TransactionHash,
        status: String,
    },

    /// No confirmation arrived in time.
    #[error("timeout: {0}")]
    Timeout(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ApostilleError>;
