//! Outcomes of announcing and auditing.

use apostille_core::{Address, PublicKey, TaggedPayload, TransactionHash};

use crate::account::PublicAccount;

/// A notarization accepted by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceResult {
    pub tx_hash: TransactionHash,
    /// The tagged payload carried by the core transfer.
    pub file_hash: TaggedPayload,
    pub owner: PublicKey,
    pub account: PublicAccount,
}

/// What a successful audit recovered from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub tx_hash: TransactionHash,
    /// Payload text exactly as found in the core transfer.
    pub file_hash: String,
    pub owner: PublicKey,
    pub account: Address,
    /// Block time in Unix milliseconds.
    pub timestamp: u64,
}

/// Outcome of an audit. Details are present only when the audit passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditResult {
    record: Option<AuditRecord>,
}

impl AuditResult {
    pub fn valid(record: AuditRecord) -> Self {
        Self {
            record: Some(record),
        }
    }

    pub fn invalid() -> Self {
        Self { record: None }
    }

    pub fn is_valid(&self) -> bool {
        self.record.is_some()
    }

    pub fn record(&self) -> Option<&AuditRecord> {
        self.record.as_ref()
    }
}
