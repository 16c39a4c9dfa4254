//! Adding a notarization to an existing account.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use apostille_core::{Address, AggregateKind, HashFunction, Keypair, SignType};
use apostille_ledger::{EventSource, LedgerClient};

use crate::account::NotarizationAccount;
use crate::builder::TransactionSet;
use crate::config::ServiceConfig;
use crate::error::{ApostilleError, Result};
use crate::result::AnnounceResult;
use crate::submit::{sign_aggregate, submit, SubmissionPlan};

/// Publishes a notarization to an account that may already be multisig.
///
/// The signing path is chosen from the account's multisig state, which is
/// read from the ledger on every [`announce`](Self::announce).
pub struct UpdateNotarizationService<L> {
    ledger: Arc<L>,
    config: ServiceConfig,
    owner: Keypair,
    account: NotarizationAccount,
    set: TransactionSet,
}

impl<L> UpdateNotarizationService<L>
where
    L: LedgerClient + EventSource,
{
    pub fn new(
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

    /// Build the submission plan for the account's current sign type.
    ///
    /// | sign type | plan |
    /// |---|---|
    /// | `NeedOtherCosignatory` | hash lock, then bonded aggregate signed by the owner |
    /// | `SingleCosignatoryOnly` | complete aggregate signed by the owner |
    /// | `ApostilleAccountOnly` | complete aggregate, cosigned by the account when it acts and its key is local |
    pub fn plan(&self, sign_type: SignType) -> Result<SubmissionPlan> {
        let plan = match sign_type {
            SignType::NeedOtherCosignatory => {
                let aggregate = sign_aggregate(
                    &self.set,
                    AggregateKind::Bonded,
                    &self.owner,
                    None,
                    &self.config,
                )?;
                SubmissionPlan::bonded(aggregate, &self.owner, &self.config)
            }
            SignType::SingleCosignatoryOnly => SubmissionPlan::Complete(sign_aggregate(
                &self.set,
                AggregateKind::Complete,
                &self.owner,
                None,
                &self.config,
            )?),
            SignType::ApostilleAccountOnly => {
                let cosigner = self.account.keypair().filter(|_| self.set.has_optional());
                SubmissionPlan::Complete(sign_aggregate(
                    &self.set,
                    AggregateKind::Complete,
                    &self.owner,
                    cosigner,
                    &self.config,
                )?)
            }
        };
        Ok(plan)
    }

    /// Resolve the sign type, sign accordingly, submit, and wait for the
    /// ledger to accept the notarization.
    ///
    /// Can be called again; each call re-reads the multisig state.
    pub async fn announce(&self) -> Result<AnnounceResult> {
        if !self.set.has_core() {
            return Err(ApostilleError::Compose("can not announce".into()));
        }

        let owner_key = self.owner.public_key();
        let sign_type = self
            .account
            .resolve_sign_type(self.ledger.as_ref(), &owner_key)
            .await?;
        let plan = self.plan(sign_type)?;
        info!(
            hash = %plan.hash(),
            account = %self.account.address(),
            ?sign_type,
            bonded = matches!(plan, SubmissionPlan::Bonded { .. }),
            "announcing notarization update"
        );

        let owner_address = Address::from_public_key(&owner_key, self.config.network.network_type);
        let tx_hash = submit(
            self.ledger.as_ref(),
            &owner_address,
            &plan,
            self.config.confirmation_timeout,
        )
        .await?;

        Ok(AnnounceResult {
            tx_hash,
            file_hash: self.set.payload().clone(),
            owner: owner_key,
            account: self.account.public_account(),
        })
    }
}
