//! Submitting signed transactions and waiting for their outcome.

use std::time::Duration;

use tracing::{info, warn};

use apostille_core::{
    Address, AggregateKind, Deadline, HashLockTransaction, Keypair, Mosaic, SignedTransaction,
    Transaction, TransactionEnvelope, TransactionHash,
};
use apostille_ledger::{EventSource, LedgerClient, Listener, Outcome, Stage, Subscription};

use crate::builder::TransactionSet;
use crate::config::ServiceConfig;
use crate::error::{ApostilleError, Result};

/// Sign the aggregate of `set` as `owner`, cosigned by `cosigner` if given.
///
/// Fails with a compose error when the core transaction is missing.
pub fn sign_aggregate(
    set: &TransactionSet,
    kind: AggregateKind,
    owner: &Keypair,
    cosigner: Option<&Keypair>,
    config: &ServiceConfig,
) -> Result<SignedTransaction> {
    let envelope = TransactionEnvelope::new(
        config.network.network_type,
        Deadline::after(config.deadline),
        config.max_fee,
        Transaction::Aggregate(set.aggregate(kind)?),
    );
    let generation_hash = &config.network.generation_hash;

    Ok(match cosigner {
        Some(cosigner) => envelope.sign_with_cosignatories(owner, &[cosigner], generation_hash),
        None => envelope.sign(owner, generation_hash),
    })
}

/// What gets submitted, and in which order.
#[derive(Debug, Clone)]
pub enum SubmissionPlan {
    /// One fully signed aggregate.
    Complete(SignedTransaction),
    /// A hash lock that must confirm before the bonded aggregate is sent.
    Bonded {
        lock: SignedTransaction,
        aggregate: SignedTransaction,
    },
}

impl SubmissionPlan {
    /// Lock `aggregate` with a deposit signed by `owner`.
    pub fn bonded(aggregate: SignedTransaction, owner: &Keypair, config: &ServiceConfig) -> Self {
        let lock = TransactionEnvelope::new(
            config.network.network_type,
            Deadline::after(config.deadline),
            config.max_fee,
            Transaction::HashLock(HashLockTransaction {
                mosaic: Mosaic {
                    id: config.network.currency,
                    amount: config.lock_amount,
                },
                duration: config.lock_duration,
                hash: aggregate.hash,
            }),
        )
        .sign(owner, &config.network.generation_hash);

        SubmissionPlan::Bonded { lock, aggregate }
    }

    /// Hash of the transaction carrying the notarization.
    pub fn hash(&self) -> TransactionHash {
        match self {
            SubmissionPlan::Complete(signed) => signed.hash,
            SubmissionPlan::Bonded { aggregate, .. } => aggregate.hash,
        }
    }
}

/// Run `plan` through a listener on `address`. The listener is closed on
/// every path.
pub async fn submit<L>(
    ledger: &L,
    address: &Address,
    plan: &SubmissionPlan,
    timeout: Duration,
) -> Result<TransactionHash>
where
    L: LedgerClient + EventSource,
{
    let mut listener = Listener::open(ledger, address, timeout).await?;
    let outcome = run(&mut listener, ledger, plan).await;
    let closed = listener.close().await;

    let hash = outcome?;
    closed?;
    Ok(hash)
}

async fn run<L, S>(
    listener: &mut Listener<S>,
    ledger: &L,
    plan: &SubmissionPlan,
) -> Result<TransactionHash>
where
    L: LedgerClient,
    S: Subscription,
{
    match plan {
        SubmissionPlan::Complete(signed) => {
            listener.announce(ledger, signed).await?;
            expect(listener.wait_for(&signed.hash, Stage::Unconfirmed).await?, signed)?;
        }
        SubmissionPlan::Bonded { lock, aggregate } => {
            listener.announce(ledger, lock).await?;
            expect(listener.wait_for(&lock.hash, Stage::Confirmed).await?, lock)?;
            info!(lock = %lock.hash, "hash lock confirmed");

            listener.announce_aggregate_bonded(ledger, aggregate).await?;
            expect(
                listener.wait_for(&aggregate.hash, Stage::Unconfirmed).await?,
                aggregate,
            )?;
        }
    }

    let hash = plan.hash();
    info!(%hash, "announced");
    Ok(hash)
}

fn expect(outcome: Outcome, signed: &SignedTransaction) -> Result<()> {
    match outcome {
        Outcome::Reached(_) => Ok(()),
        Outcome::Rejected { code } => {
            warn!(hash = %signed.hash, %code, "rejected by ledger");
            Err(ApostilleError::Rejected {
                hash: signed.hash,
                status: code,
            })
        }
        Outcome::TimedOut => Err(ApostilleError::Timeout(format!(
            "no confirmation for {}",
            signed.hash
        ))),
    }
}
