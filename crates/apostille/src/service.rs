//! Creating a new notarization.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use apostille_core::{Address, AggregateKind, HashFunction, Keypair};
use apostille_ledger::{EventSource, LedgerClient};

use crate::account::NotarizationAccount;
use crate::builder::TransactionSet;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::result::AnnounceResult;
use crate::submit::{sign_aggregate, submit, SubmissionPlan};

/// Publishes the first notarization of a file.
///
/// Compose with the builder methods, then [`announce`](Self::announce), which
/// consumes the service.
pub struct NotarizationService<L> {
    ledger: Arc<L>,
    config: ServiceConfig,
    owner: Keypair,
    account: NotarizationAccount,
    set: TransactionSet,
}

impl<L> NotarizationService<L>
where
    L: LedgerClient + EventSource,
{
    /// Notarize `data` under the account derived from `filename` and `owner`.
    pub fn new(
        ledger: Arc<L>,
        config: ServiceConfig,
        owner: Keypair,
        filename: &str,
        data: &[u8],
        hash_function: &dyn HashFunction,
    ) -> Result<Self> {
        let account = NotarizationAccount::derive(filename, &owner, config.network.network_type)?;
        Ok(Self::with_account(
            ledger,
            config,
            owner,
            account,
            data,
            hash_function,
        ))
    }

    /// Notarize `data` under an account that already exists.
    pub fn with_account(
        ledger: Arc<L>,
        config: ServiceConfig,
        owner: Keypair,
        account: NotarizationAccount,
        data: &[u8],
        hash_function: &dyn HashFunction,
    ) -> Self {
        let hashing_type = hash_function.hashing_type();
        if hashing_type.is_legacy() {
            warn!(?hashing_type, "notarizing with a legacy hash");
        }
        let payload = hash_function.signed_embed(data, &owner);
        let set = TransactionSet::new(
            owner.public_key(),
            account.public_account(),
            payload,
            config.network.public_sink,
        );
        Self {
            ledger,
            config,
            owner,
            account,
            set,
        }
    }

    pub fn account(&self) -> &NotarizationAccount {
        &self.account
    }

    pub fn build_core(&mut self) {
        self.set.build_core();
    }

    pub fn add_sink_announcement(&mut self) {
        self.set.add_sink_announcement();
    }

    pub fn add_ownership_assignment(&mut self) {
        self.set.add_ownership_assignment();
    }

    pub fn add_metadata(&mut self, metadata: &Value) -> Result<()> {
        self.set.add_metadata(metadata)
    }

    pub fn add_legacy_metadata(&mut self, metadata: &Value) {
        self.set.add_legacy_metadata(metadata);
    }

    /// Sign and submit the composed aggregate, then wait for the ledger to
    /// accept it.
    ///
    /// The notarization account cosigns when it acts in an optional
    /// sub-transaction and its key is held locally; otherwise the owner signs
    /// alone.
    pub async fn announce(self) -> Result<AnnounceResult> {
        let cosigner = self.account.keypair().filter(|_| self.set.has_optional());
        let signed = sign_aggregate(
            &self.set,
            AggregateKind::Complete,
            &self.owner,
            cosigner,
            &self.config,
        )?;
        info!(
            hash = %signed.hash,
            account = %self.account.address(),
            cosigned = cosigner.is_some(),
            "announcing notarization"
        );

        let owner_address =
            Address::from_public_key(&self.owner.public_key(), self.config.network.network_type);
        let tx_hash = submit(
            self.ledger.as_ref(),
            &owner_address,
            &SubmissionPlan::Complete(signed),
            self.config.confirmation_timeout,
        )
        .await?;

        Ok(AnnounceResult {
            tx_hash,
            file_hash: self.set.payload().clone(),
            owner: self.owner.public_key(),
            account: self.account.public_account(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apostille_core::{Sha256Hash, Transaction};
    use apostille_ledger::{LedgerCall, MemoryLedger};
    use serde_json::json;

    fn ledger_and_config() -> (Arc<MemoryLedger>, ServiceConfig) {
        let config = ServiceConfig::default();
        let ledger = Arc::new(MemoryLedger::new(
            config.network.network_type,
            config.network.generation_hash,
        ));
        (ledger, config)
    }

    fn service(
        ledger: &Arc<MemoryLedger>,
        config: &ServiceConfig,
    ) -> NotarizationService<MemoryLedger> {
        NotarizationService::new(
            Arc::clone(ledger),
            config.clone(),
            Keypair::from_seed(&[1u8; 32]),
            "deed.pdf",
            b"deed contents",
            &Sha256Hash,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_core_only_is_signed_by_owner() {
        let (ledger, config) = ledger_and_config();
        let mut service = service(&ledger, &config);
        service.build_core();

        let result = service.announce().await.unwrap();
        let stored = ledger.transaction(&result.tx_hash).await.unwrap();
        assert!(stored.signed.cosignatures.is_empty());
        assert_eq!(result.owner, Keypair::from_seed(&[1u8; 32]).public_key());
        assert!(result.file_hash.to_hex().starts_with("fe4e545983"));
    }

    #[tokio::test]
    async fn test_optional_parts_cosigned_by_account() {
        let (ledger, config) = ledger_and_config();
        let mut service = service(&ledger, &config);
        let account_key = *service.account().public_key();
        service.build_core();
        service.add_sink_announcement();
        service.add_ownership_assignment();
        service.add_metadata(&json!({"title": "deed"})).unwrap();

        let result = service.announce().await.unwrap();
        let stored = ledger.transaction(&result.tx_hash).await.unwrap();
        assert_eq!(stored.signed.signers(), vec![result.owner, account_key]);
        let inner = &stored.signed.envelope.transaction.as_aggregate().unwrap().inner;
        assert_eq!(inner.len(), 4);
        assert!(matches!(inner[2].transaction, Transaction::MultisigModification(_)));

        let info = ledger
            .multisig_info(&result.account.address)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.cosignatories, vec![result.owner]);
    }

    #[tokio::test]
    async fn test_announce_without_core_makes_no_calls() {
        let (ledger, config) = ledger_and_config();
        let mut service = service(&ledger, &config);
        service.add_sink_announcement();

        let err = service.announce().await.unwrap_err();
        assert!(err.to_string().contains("can not announce"));
        assert_eq!(ledger.calls(), Vec::<LedgerCall>::new());
    }

    #[test]
    fn test_empty_filename_fails() {
        let (ledger, config) = ledger_and_config();
        let result = NotarizationService::new(
            ledger,
            config,
            Keypair::from_seed(&[1u8; 32]),
            "",
            b"data",
            &Sha256Hash,
        );
        assert!(result.is_err());
    }
}
