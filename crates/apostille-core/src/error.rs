//! Error types for the apostille core.

use thiserror::Error;

/// Errors raised by the pure primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The payload does not match `PREFIX || known code || remainder`.
    #[error("not apostille payload")]
    NotApostillePayload,

    #[error("unknown hash type code: {0:#04x}")]
    UnknownHashType(u8),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
