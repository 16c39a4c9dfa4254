//! In-memory ledger implementing both [`LedgerClient`] and [`EventSource`].
//!
//! This is primarily for testing. It validates signatures and cosigner
//! authorization the way a node would, applies multisig modifications and
//! hash locks on confirmation, and pushes events to open subscriptions.
//! Every call is logged so tests can assert on submission order.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use apostille_core::{
    Address, AggregateKind, GenerationHash, Keypair, MultisigInfo,
    MultisigModificationTransaction, NetworkType, PublicKey, SignedTransaction, Transaction,
    TransactionHash, TransactionType,
};

use crate::client::{BlockInfo, ConfirmedTransaction, LedgerClient, LiveSubscription};
use crate::error::{LedgerError, Result};
use crate::events::{EventSource, LedgerEvent, Subscription};

/// Simulated time between blocks, in milliseconds.
pub const BLOCK_INTERVAL_MS: u64 = 15_000;

/// Status codes reported for failed validation.
pub mod status {
    pub const SIGNATURE_NOT_VERIFIABLE: &str = "Failure_Signature_Not_Verifiable";
    pub const MISSING_COSIGNATURES: &str = "Failure_Aggregate_Missing_Cosignatures";
    pub const MULTISIG_NOT_OPTED_IN: &str = "Failure_Multisig_Missing_Cosignatures";
    pub const UNKNOWN_LOCK: &str = "Failure_LockHash_Unknown_Hash";
}

/// How far announced transactions progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventMode {
    /// Unconfirmed-added followed by confirmation in a new block.
    #[default]
    Confirm,
    /// Unconfirmed-added only; nothing is ever confirmed.
    UnconfirmedOnly,
    /// No events at all.
    Silent,
}

/// A call made against the ledger, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    Open(Address),
    Close(Address),
    Announce {
        hash: TransactionHash,
        kind: TransactionType,
    },
    AnnounceAggregateBonded(TransactionHash),
    Transaction(TransactionHash),
    Block(u64),
    MultisigInfo(Address),
}

/// In-memory ledger.
pub struct MemoryLedger {
    network: NetworkType,
    generation_hash: GenerationHash,
    inner: Arc<Mutex<MemoryLedgerInner>>,
}

struct MemoryLedgerInner {
    calls: Vec<LedgerCall>,

    /// Confirmed transactions indexed by hash.
    transactions: HashMap<TransactionHash, ConfirmedTransaction>,

    /// Bonded aggregates waiting for cosignatures.
    partial: HashMap<TransactionHash, SignedTransaction>,

    /// Aggregate hashes covered by a confirmed hash lock.
    locks: HashSet<TransactionHash>,

    multisig: HashMap<Address, MultisigInfo>,
    blocks: BTreeMap<u64, BlockInfo>,

    subscribers: HashMap<u64, Subscriber>,
    next_subscriber: u64,

    event_mode: EventMode,
    reject_next: Option<String>,
    offline: bool,
}

struct Subscriber {
    address: Address,
    sender: mpsc::UnboundedSender<LedgerEvent>,
}

impl MemoryLedgerInner {
    fn emit(&mut self, involved: &HashSet<Address>, event: LedgerEvent) {
        for subscriber in self.subscribers.values() {
            if involved.contains(&subscriber.address) {
                // The receiver may already be gone; it deregisters on close.
                let _ = subscriber.sender.send(event.clone());
            }
        }
    }

    fn next_block(&mut self) -> BlockInfo {
        let (height, timestamp) = self
            .blocks
            .values()
            .next_back()
            .map_or((1, 0), |last| (last.height + 1, last.timestamp + BLOCK_INTERVAL_MS));
        let block = BlockInfo { height, timestamp };
        self.blocks.insert(height, block);
        block
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(LedgerError::Network("node unreachable".into()));
        }
        Ok(())
    }
}

impl MemoryLedger {
    /// Create an empty ledger with a genesis block.
    pub fn new(network: NetworkType, generation_hash: GenerationHash) -> Self {
        let mut inner = MemoryLedgerInner {
            calls: Vec::new(),
            transactions: HashMap::new(),
            partial: HashMap::new(),
            locks: HashSet::new(),
            multisig: HashMap::new(),
            blocks: BTreeMap::new(),
            subscribers: HashMap::new(),
            next_subscriber: 0,
            event_mode: EventMode::default(),
            reject_next: None,
            offline: false,
        };
        inner.next_block();

        Self {
            network,
            generation_hash,
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryLedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn address_of(&self, key: &PublicKey) -> Address {
        Address::from_public_key(key, self.network)
    }

    /// Replace the multisig entry of `info.account`.
    pub fn set_multisig(&self, info: MultisigInfo) {
        let address = self.address_of(&info.account);
        self.lock().multisig.insert(address, info);
    }

    /// Reject the next announced transaction with a status code.
    pub fn reject_next(&self, code: impl Into<String>) {
        self.lock().reject_next = Some(code.into());
    }

    /// Make every call fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn set_event_mode(&self, mode: EventMode) {
        self.lock().event_mode = mode;
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Number of subscriptions still open.
    pub fn open_subscriptions(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// A bonded aggregate waiting for cosignatures, if any.
    pub fn partial(&self, hash: &TransactionHash) -> Option<SignedTransaction> {
        self.lock().partial.get(hash).cloned()
    }

    /// Confirm a transaction directly, skipping validation. Returns its height.
    pub fn insert_confirmed(&self, signed: SignedTransaction) -> u64 {
        let mut inner = self.lock();
        self.confirm(&mut inner, signed)
    }

    /// Add a cosignature to a bonded aggregate, confirming it once authorized.
    pub fn cosign_partial(&self, hash: &TransactionHash, cosigner: &Keypair) -> Result<()> {
        let mut inner = self.lock();
        let signed = {
            let partial = inner
                .partial
                .get_mut(hash)
                .ok_or_else(|| LedgerError::NotFound(format!("partial transaction {}", hash)))?;
            partial.add_cosignature(cosigner);
            partial.clone()
        };

        if inner.event_mode == EventMode::Confirm && self.authorize(&inner, &signed).is_ok() {
            inner.partial.remove(hash);
            self.confirm(&mut inner, signed);
        }
        Ok(())
    }

    /// Addresses an event about `signed` is delivered to.
    fn involved(&self, signed: &SignedTransaction) -> HashSet<Address> {
        let mut involved: HashSet<Address> = signed
            .signers()
            .iter()
            .map(|key| self.address_of(key))
            .collect();

        for (signer, transaction) in flatten(signed) {
            involved.insert(self.address_of(signer));
            if let Transaction::Transfer(transfer) = transaction {
                involved.insert(transfer.recipient);
            }
        }
        involved
    }

    /// Check that every account acting in `signed` approved it.
    fn authorize(
        &self,
        inner: &MemoryLedgerInner,
        signed: &SignedTransaction,
    ) -> std::result::Result<(), &'static str> {
        let signers: HashSet<PublicKey> = signed.signers().into_iter().collect();

        for (account, transaction) in flatten(signed) {
            let approved = match inner
                .multisig
                .get(&self.address_of(account))
                .filter(|info| info.is_multisig())
            {
                None => signers.contains(account),
                Some(info) => {
                    let approvals = info
                        .cosignatories
                        .iter()
                        .filter(|key| signers.contains(key))
                        .count();
                    approvals >= usize::from(info.min_approval.max(1))
                }
            };
            if !approved {
                return Err(status::MISSING_COSIGNATURES);
            }

            if let Transaction::MultisigModification(modification) = transaction {
                if !modification.additions.iter().all(|key| signers.contains(key)) {
                    return Err(status::MULTISIG_NOT_OPTED_IN);
                }
            }
        }
        Ok(())
    }

    /// Run the checks shared by both submit paths. Returns the status code
    /// on failure.
    fn validate(
        &self,
        inner: &mut MemoryLedgerInner,
        signed: &SignedTransaction,
    ) -> std::result::Result<(), String> {
        if let Some(code) = inner.reject_next.take() {
            return Err(code);
        }
        if signed.verify(&self.generation_hash).is_err() {
            return Err(status::SIGNATURE_NOT_VERIFIABLE.into());
        }
        Ok(())
    }

    fn confirm(&self, inner: &mut MemoryLedgerInner, signed: SignedTransaction) -> u64 {
        let block = inner.next_block();
        let involved = self.involved(&signed);

        for (signer, transaction) in flatten(&signed) {
            match transaction {
                Transaction::MultisigModification(modification) => {
                    let address = self.address_of(signer);
                    apply_modification(&mut inner.multisig, address, *signer, modification);
                }
                Transaction::HashLock(lock) => {
                    inner.locks.insert(lock.hash);
                }
                Transaction::Transfer(_)
                | Transaction::AccountMetadata(_)
                | Transaction::Aggregate(_) => {}
            }
        }

        let hash = signed.hash;
        debug!(%hash, height = block.height, "confirmed");
        inner.transactions.insert(
            hash,
            ConfirmedTransaction {
                signed,
                height: block.height,
            },
        );
        inner.emit(
            &involved,
            LedgerEvent::Confirmed {
                hash,
                height: block.height,
            },
        );
        block.height
    }
}

/// Every `(acting account, transaction)` pair, looking through aggregates.
fn flatten(signed: &SignedTransaction) -> Vec<(&PublicKey, &Transaction)> {
    match &signed.envelope.transaction {
        Transaction::Aggregate(aggregate) => aggregate
            .inner
            .iter()
            .map(|inner| (&inner.signer, &inner.transaction))
            .collect(),
        transaction => vec![(&signed.signer, transaction)],
    }
}

fn apply_modification(
    multisig: &mut HashMap<Address, MultisigInfo>,
    address: Address,
    account: PublicKey,
    modification: &MultisigModificationTransaction,
) {
    let info = multisig.entry(address).or_insert_with(|| MultisigInfo {
        account,
        min_approval: 0,
        min_removal: 0,
        cosignatories: Vec::new(),
    });

    info.min_approval = apply_delta(info.min_approval, modification.min_approval_delta);
    info.min_removal = apply_delta(info.min_removal, modification.min_removal_delta);
    info.cosignatories
        .retain(|key| !modification.deletions.contains(key));
    for key in &modification.additions {
        if !info.cosignatories.contains(key) {
            info.cosignatories.push(*key);
        }
    }
}

fn apply_delta(value: u8, delta: i8) -> u8 {
    (i16::from(value) + i16::from(delta)).clamp(0, i16::from(u8::MAX)) as u8
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn announce(
        &self,
        _subscription: &LiveSubscription,
        transaction: &SignedTransaction,
    ) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(LedgerCall::Announce {
            hash: transaction.hash,
            kind: transaction.envelope.transaction.transaction_type(),
        });
        inner.check_online()?;

        if transaction.envelope.transaction.transaction_type() == TransactionType::AggregateBonded {
            return Err(LedgerError::InvalidTransaction(
                "bonded aggregates go through announce_aggregate_bonded".into(),
            ));
        }

        let hash = transaction.hash;
        let involved = self.involved(transaction);

        let checked = self
            .validate(&mut inner, transaction)
            .and_then(|()| self.authorize(&inner, transaction).map_err(String::from));
        if let Err(code) = checked {
            debug!(%hash, %code, "rejected");
            inner.emit(&involved, LedgerEvent::Status { hash, code });
            return Ok(());
        }

        match inner.event_mode {
            EventMode::Silent => {}
            EventMode::UnconfirmedOnly => {
                inner.emit(&involved, LedgerEvent::UnconfirmedAdded { hash });
            }
            EventMode::Confirm => {
                inner.emit(&involved, LedgerEvent::UnconfirmedAdded { hash });
                self.confirm(&mut inner, transaction.clone());
            }
        }
        Ok(())
    }

    async fn announce_aggregate_bonded(
        &self,
        _subscription: &LiveSubscription,
        transaction: &SignedTransaction,
    ) -> Result<()> {
        let mut inner = self.lock();
        inner
            .calls
            .push(LedgerCall::AnnounceAggregateBonded(transaction.hash));
        inner.check_online()?;

        let is_bonded = transaction
            .envelope
            .transaction
            .as_aggregate()
            .map_or(false, |aggregate| aggregate.kind == AggregateKind::Bonded);
        if !is_bonded {
            return Err(LedgerError::InvalidTransaction(
                "not a bonded aggregate".into(),
            ));
        }

        let hash = transaction.hash;
        let involved = self.involved(transaction);

        let checked = self.validate(&mut inner, transaction).and_then(|()| {
            if inner.locks.contains(&hash) {
                Ok(())
            } else {
                Err(status::UNKNOWN_LOCK.to_string())
            }
        });
        if let Err(code) = checked {
            debug!(%hash, %code, "rejected");
            inner.emit(&involved, LedgerEvent::Status { hash, code });
            return Ok(());
        }

        if inner.event_mode == EventMode::Silent {
            return Ok(());
        }
        inner.emit(&involved, LedgerEvent::AggregateBondedAdded { hash });

        if inner.event_mode == EventMode::Confirm && self.authorize(&inner, transaction).is_ok() {
            self.confirm(&mut inner, transaction.clone());
        } else {
            inner.partial.insert(hash, transaction.clone());
        }
        Ok(())
    }

    async fn transaction(&self, hash: &TransactionHash) -> Result<ConfirmedTransaction> {
        let mut inner = self.lock();
        inner.calls.push(LedgerCall::Transaction(*hash));
        inner.check_online()?;
        inner
            .transactions
            .get(hash)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", hash)))
    }

    async fn block(&self, height: u64) -> Result<BlockInfo> {
        let mut inner = self.lock();
        inner.calls.push(LedgerCall::Block(height));
        inner.check_online()?;
        inner
            .blocks
            .get(&height)
            .copied()
            .ok_or_else(|| LedgerError::NotFound(format!("block {}", height)))
    }

    async fn multisig_info(&self, address: &Address) -> Result<Option<MultisigInfo>> {
        let mut inner = self.lock();
        inner.calls.push(LedgerCall::MultisigInfo(*address));
        inner.check_online()?;
        Ok(inner.multisig.get(address).cloned())
    }
}

/// Subscription handed out by [`MemoryLedger`].
pub struct MemorySubscription {
    id: u64,
    address: Address,
    receiver: mpsc::UnboundedReceiver<LedgerEvent>,
    ledger: Arc<Mutex<MemoryLedgerInner>>,
    closed: bool,
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn next_event(&mut self) -> Result<LedgerEvent> {
        if self.closed {
            return Err(LedgerError::SubscriptionClosed);
        }
        self.receiver
            .recv()
            .await
            .ok_or(LedgerError::SubscriptionClosed)
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.receiver.close();

        let mut inner = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscribers.remove(&self.id);
        inner.calls.push(LedgerCall::Close(self.address));
        Ok(())
    }
}

#[async_trait]
impl EventSource for MemoryLedger {
    type Subscription = MemorySubscription;

    async fn open(&self, address: &Address) -> Result<MemorySubscription> {
        let mut inner = self.lock();
        inner.calls.push(LedgerCall::Open(*address));
        inner.check_online()?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let id = inner.next_subscriber;
        inner.next_subscriber += 1;
        inner.subscribers.insert(
            id,
            Subscriber {
                address: *address,
                sender,
            },
        );

        Ok(MemorySubscription {
            id,
            address: *address,
            receiver,
            ledger: Arc::clone(&self.inner),
            closed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::{Listener, Outcome, Stage};
    use apostille_core::{
        AggregateTransaction, Deadline, HashLockTransaction, Message, Mosaic, MosaicId,
        TransactionEnvelope, TransferTransaction,
    };
    use std::time::Duration;

    const NETWORK: NetworkType = NetworkType::MijinTest;
    const TIMEOUT: Duration = Duration::from_millis(100);

    fn key(seed: u8) -> Keypair {
        Keypair::from_seed(&[seed; 32])
    }

    fn address(keypair: &Keypair) -> Address {
        Address::from_public_key(&keypair.public_key(), NETWORK)
    }

    fn envelope(transaction: Transaction) -> TransactionEnvelope {
        TransactionEnvelope::new(NETWORK, Deadline(u64::MAX), 0, transaction)
    }

    fn transfer(to: &Keypair, text: &str) -> Transaction {
        Transaction::Transfer(TransferTransaction {
            recipient: address(to),
            mosaics: vec![],
            message: Message::plain(text),
        })
    }

    fn aggregate(kind: AggregateKind, inner: Vec<(Transaction, &Keypair)>) -> Transaction {
        Transaction::Aggregate(AggregateTransaction {
            kind,
            inner: inner
                .into_iter()
                .map(|(transaction, signer)| transaction.into_inner(signer.public_key()))
                .collect(),
        })
    }

    #[tokio::test]
    async fn test_announce_confirms_and_notifies() {
        let ledger = MemoryLedger::new(NETWORK, GenerationHash::ZERO);
        let owner = key(1);
        let account = key(2);

        let signed = envelope(transfer(&account, "hi")).sign(&owner, &GenerationHash::ZERO);
        let mut listener = Listener::open(&ledger, &address(&owner), TIMEOUT)
            .await
            .unwrap();
        listener.announce(&ledger, &signed).await.unwrap();

        let outcome = listener.wait_for(&signed.hash, Stage::Confirmed).await.unwrap();
        assert!(matches!(outcome, Outcome::Reached(LedgerEvent::Confirmed { height: 2, .. })));
        listener.close().await.unwrap();
        assert_eq!(ledger.open_subscriptions(), 0);

        let stored = ledger.transaction(&signed.hash).await.unwrap();
        assert_eq!(stored.height, 2);
        assert_eq!(ledger.block(2).await.unwrap().timestamp, BLOCK_INTERVAL_MS);
    }

    #[tokio::test]
    async fn test_missing_cosigner_is_reported_as_status() {
        let ledger = MemoryLedger::new(NETWORK, GenerationHash::ZERO);
        let owner = key(1);
        let account = key(2);

        let signed = envelope(aggregate(
            AggregateKind::Complete,
            vec![(transfer(&account, "core"), &owner), (transfer(&owner, "x"), &account)],
        ))
        .sign(&owner, &GenerationHash::ZERO);

        let mut listener = Listener::open(&ledger, &address(&owner), TIMEOUT)
            .await
            .unwrap();
        listener.announce(&ledger, &signed).await.unwrap();
        let outcome = listener.wait_for(&signed.hash, Stage::Unconfirmed).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Rejected {
                code: status::MISSING_COSIGNATURES.into()
            }
        );
    }

    #[tokio::test]
    async fn test_multisig_modification_updates_account() {
        let ledger = MemoryLedger::new(NETWORK, GenerationHash::ZERO);
        let owner = key(1);
        let account = key(2);

        let modification = Transaction::MultisigModification(MultisigModificationTransaction {
            min_approval_delta: 1,
            min_removal_delta: 1,
            additions: vec![owner.public_key()],
            deletions: vec![],
        });
        let signed = envelope(aggregate(AggregateKind::Complete, vec![(modification, &account)]))
            .sign_with_cosignatories(&owner, &[&account], &GenerationHash::ZERO);

        let listener = Listener::open(&ledger, &address(&owner), TIMEOUT)
            .await
            .unwrap();
        listener.announce(&ledger, &signed).await.unwrap();
        listener.close().await.unwrap();

        let info = ledger.multisig_info(&address(&account)).await.unwrap().unwrap();
        assert_eq!(info.min_approval, 1);
        assert_eq!(info.cosignatories, vec![owner.public_key()]);
    }

    #[tokio::test]
    async fn test_bonded_requires_confirmed_lock() {
        let ledger = MemoryLedger::new(NETWORK, GenerationHash::ZERO);
        let owner = key(1);
        let other = key(3);
        let account = key(2);
        ledger.set_multisig(MultisigInfo {
            account: account.public_key(),
            min_approval: 2,
            min_removal: 2,
            cosignatories: vec![owner.public_key(), other.public_key()],
        });

        let bonded = envelope(aggregate(
            AggregateKind::Bonded,
            vec![(transfer(&owner, "x"), &account)],
        ))
        .sign(&owner, &GenerationHash::ZERO);

        let mut listener = Listener::open(&ledger, &address(&owner), TIMEOUT)
            .await
            .unwrap();

        listener
            .announce_aggregate_bonded(&ledger, &bonded)
            .await
            .unwrap();
        assert_eq!(
            listener.wait_for(&bonded.hash, Stage::Unconfirmed).await.unwrap(),
            Outcome::Rejected {
                code: status::UNKNOWN_LOCK.into()
            }
        );

        let lock = envelope(Transaction::HashLock(HashLockTransaction {
            mosaic: Mosaic {
                id: MosaicId(1),
                amount: 10,
            },
            duration: 480,
            hash: bonded.hash,
        }))
        .sign(&owner, &GenerationHash::ZERO);
        listener.announce(&ledger, &lock).await.unwrap();
        assert!(matches!(
            listener.wait_for(&lock.hash, Stage::Confirmed).await.unwrap(),
            Outcome::Reached(_)
        ));

        listener
            .announce_aggregate_bonded(&ledger, &bonded)
            .await
            .unwrap();
        assert_eq!(
            listener.wait_for(&bonded.hash, Stage::Unconfirmed).await.unwrap(),
            Outcome::Reached(LedgerEvent::AggregateBondedAdded { hash: bonded.hash })
        );
        assert!(ledger.partial(&bonded.hash).is_some());

        ledger.cosign_partial(&bonded.hash, &other).unwrap();
        assert!(ledger.partial(&bonded.hash).is_none());
        assert!(matches!(
            listener.wait_for(&bonded.hash, Stage::Confirmed).await.unwrap(),
            Outcome::Reached(LedgerEvent::Confirmed { .. })
        ));
        listener.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_offline_fails_calls() {
        let ledger = MemoryLedger::new(NETWORK, GenerationHash::ZERO);
        ledger.set_offline(true);

        let err = ledger.multisig_info(&address(&key(1))).await.unwrap_err();
        assert!(matches!(err, LedgerError::Network(_)));
        assert!(Listener::open(&ledger, &address(&key(1)), TIMEOUT).await.is_err());
        assert_eq!(ledger.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_lookups() {
        let ledger = MemoryLedger::new(NETWORK, GenerationHash::ZERO);
        let missing = TransactionHash::from_bytes([9u8; 32]);
        assert!(matches!(
            ledger.transaction(&missing).await,
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(ledger.block(99).await, Err(LedgerError::NotFound(_))));
        assert_eq!(ledger.multisig_info(&address(&key(1))).await.unwrap(), None);
    }

    #[test]
    fn test_apply_delta_saturates() {
        assert_eq!(apply_delta(0, -1), 0);
        assert_eq!(apply_delta(1, 1), 2);
        assert_eq!(apply_delta(255, 1), 255);
    }
}
