//! Auditing a published notarization against candidate content.

use std::sync::Arc;

use tracing::info;

use apostille_core::{
    AggregateTransaction, AuditPayload, PublicKey, TaggedPayload, Transaction, TransactionHash,
    TransferTransaction,
};
use apostille_ledger::{LedgerClient, LedgerError};

use crate::config::ServiceConfig;
use crate::error::{ApostilleError, Result};
use crate::result::{AuditRecord, AuditResult};

/// Verifies notarizations recorded on the ledger.
pub struct AuditService<L> {
    ledger: Arc<L>,
    config: ServiceConfig,
}

impl<L: LedgerClient> AuditService<L> {
    pub fn new(ledger: Arc<L>, config: ServiceConfig) -> Self {
        Self { ledger, config }
    }

    /// Check that transaction `tx_hash` notarizes `data`.
    ///
    /// The first inner transfer whose message carries the payload prefix is
    /// the core; its signer is the claimed owner. A payload that fails to
    /// parse or verify yields an invalid result, not an error.
    pub async fn audit(&self, data: &[u8], tx_hash: &TransactionHash) -> Result<AuditResult> {
        let confirmed = self.ledger.transaction(tx_hash).await?;
        let aggregate = confirmed
            .signed
            .envelope
            .transaction
            .as_aggregate()
            .ok_or(ApostilleError::InvalidTransactionType)?;
        let (owner, core) = find_core(aggregate).ok_or(ApostilleError::CoreTransactionNotFound)?;

        let payload = core.message.payload();
        if !AuditPayload::audit(data, payload, owner) {
            info!(%tx_hash, "audit failed");
            return Ok(AuditResult::invalid());
        }

        let block = self.ledger.block(confirmed.height).await?;
        let timestamp = block
            .timestamp
            .checked_add(self.config.network.epoch_adjustment_ms)
            .ok_or_else(|| {
                LedgerError::Network(format!(
                    "block {} timestamp {} out of range",
                    block.height, block.timestamp
                ))
            })?;
        let record = AuditRecord {
            tx_hash: *tx_hash,
            file_hash: payload.to_string(),
            owner: *owner,
            account: core.recipient,
            timestamp,
        };
        info!(%tx_hash, owner = %record.owner, height = block.height, "audit passed");
        Ok(AuditResult::valid(record))
    }
}

fn find_core(aggregate: &AggregateTransaction) -> Option<(&PublicKey, &TransferTransaction)> {
    aggregate
        .inner
        .iter()
        .find_map(|inner| match &inner.transaction {
            Transaction::Transfer(transfer)
                if TaggedPayload::has_prefix(transfer.message.payload()) =>
            {
                Some((&inner.signer, transfer))
            }
            Transaction::Transfer(_)
            | Transaction::Aggregate(_)
            | Transaction::MultisigModification(_)
            | Transaction::HashLock(_)
            | Transaction::AccountMetadata(_) => None,
        })
}
