//! Composition of the sub-transactions of one notarization.
//!
//! Both the create and the update service compose over a [`TransactionSet`].
//! Inner transactions always come out in the same order regardless of the
//! order the builder methods were called in:
//!
//! ```text
//! core, sink announcement, ownership assignment, metadata..., legacy metadata
//! ```

use serde_json::Value;

use apostille_core::{
    metadata_scoped_key, AccountMetadataTransaction, Address, AggregateKind,
    AggregateTransaction, InnerTransaction, Message, MultisigModificationTransaction,
    PublicKey, TaggedPayload, Transaction, TransferTransaction,
};

use crate::account::PublicAccount;
use crate::error::{ApostilleError, Result};

/// The sub-transactions of one notarization, before signing.
#[derive(Debug, Clone)]
pub struct TransactionSet {
    owner: PublicKey,
    account: PublicAccount,
    payload: TaggedPayload,
    public_sink: Address,

    core: Option<InnerTransaction>,
    sink_announcement: Option<InnerTransaction>,
    ownership_assignment: Option<InnerTransaction>,
    metadata: Vec<InnerTransaction>,
    legacy_metadata: Option<InnerTransaction>,
}

impl TransactionSet {
    /// Start an empty set for `payload` published by `owner` to `account`.
    pub fn new(
        owner: PublicKey,
        account: PublicAccount,
        payload: TaggedPayload,
        public_sink: Address,
    ) -> Self {
        Self {
            owner,
            account,
            payload,
            public_sink,
            core: None,
            sink_announcement: None,
            ownership_assignment: None,
            metadata: Vec::new(),
            legacy_metadata: None,
        }
    }

    /// The payload every notarizing transfer carries.
    pub fn payload(&self) -> &TaggedPayload {
        &self.payload
    }

    /// Transfer of the payload to the notarization account, signed by the owner.
    pub fn build_core(&mut self) {
        let transfer = self.payload_transfer(self.account.address);
        self.core = Some(transfer.into_inner(self.owner));
    }

    /// Copy of the payload to the network's public sink, signed by the account.
    pub fn add_sink_announcement(&mut self) {
        let transfer = self.payload_transfer(self.public_sink);
        self.sink_announcement = Some(transfer.into_inner(self.account.public_key));
    }

    /// Make the owner the account's sole cosignatory (+1 approval, +1 removal).
    pub fn add_ownership_assignment(&mut self) {
        let modification = Transaction::MultisigModification(MultisigModificationTransaction {
            min_approval_delta: 1,
            min_removal_delta: 1,
            additions: vec![self.owner],
            deletions: Vec::new(),
        });
        self.ownership_assignment = Some(modification.into_inner(self.account.public_key));
    }

    /// One account-metadata entry per top-level key of `metadata`.
    ///
    /// String values are stored as-is, anything else as its JSON text.
    pub fn add_metadata(&mut self, metadata: &Value) -> Result<()> {
        let object = metadata
            .as_object()
            .ok_or_else(|| ApostilleError::Compose("metadata must be a JSON object".into()))?;

        self.metadata = object
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                Transaction::AccountMetadata(AccountMetadataTransaction {
                    target: self.account.public_key,
                    scoped_key: metadata_scoped_key(key),
                    value,
                })
                .into_inner(self.account.public_key)
            })
            .collect();
        Ok(())
    }

    /// Transfer of the metadata's JSON text to the account, signed by the account.
    pub fn add_legacy_metadata(&mut self, metadata: &Value) {
        let transfer = Transaction::Transfer(TransferTransaction {
            recipient: self.account.address,
            mosaics: Vec::new(),
            message: Message::plain(metadata.to_string()),
        });
        self.legacy_metadata = Some(transfer.into_inner(self.account.public_key));
    }

    pub fn has_core(&self) -> bool {
        self.core.is_some()
    }

    /// Whether any sub-transaction acting for the notarization account is present.
    pub fn has_optional(&self) -> bool {
        self.sink_announcement.is_some()
            || self.ownership_assignment.is_some()
            || !self.metadata.is_empty()
            || self.legacy_metadata.is_some()
    }

    /// Inner transactions in canonical order.
    pub fn inner_transactions(&self) -> Vec<InnerTransaction> {
        self.core
            .iter()
            .chain(self.sink_announcement.iter())
            .chain(self.ownership_assignment.iter())
            .chain(self.metadata.iter())
            .chain(self.legacy_metadata.iter())
            .cloned()
            .collect()
    }

    /// Combine everything present into one aggregate.
    pub fn aggregate(&self, kind: AggregateKind) -> Result<AggregateTransaction> {
        if !self.has_core() {
            return Err(ApostilleError::Compose("can not announce".into()));
        }
        Ok(AggregateTransaction {
            kind,
            inner: self.inner_transactions(),
        })
    }

    fn payload_transfer(&self, recipient: Address) -> Transaction {
        Transaction::Transfer(TransferTransaction {
            recipient,
            mosaics: Vec::new(),
            message: Message::plain(self.payload.to_hex()),
        })
    }
}
