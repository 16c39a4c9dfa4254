//! The ledger transaction model.
//!
//! Transactions are a closed set of tagged variants. Code that inspects a
//! transaction matches on [`Transaction`] exhaustively instead of probing
//! for concrete types.

use sha3::Digest;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::address::Address;
use crate::crypto::PublicKey;
use crate::network::NetworkType;
use crate::types::TransactionHash;

/// Transaction deadline in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(pub u64);

impl Deadline {
    /// A deadline `window` from now.
    pub fn after(window: Duration) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self((now + window).as_millis() as u64)
    }

    /// Milliseconds since the Unix epoch.
    pub const fn millis(&self) -> u64 {
        self.0
    }
}

/// Identifier of a mosaic (token) definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MosaicId(pub u64);

/// An amount of a mosaic, in its smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mosaic {
    pub id: MosaicId,
    pub amount: u64,
}

/// A plain-text transfer message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Message(String);

impl Message {
    /// Create a plain message.
    pub fn plain(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The message text.
    pub fn payload(&self) -> &str {
        &self.0
    }
}

/// Transfer of mosaics and a message to a recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTransaction {
    pub recipient: Address,
    pub mosaics: Vec<Mosaic>,
    pub message: Message,
}

/// Change of an account's multisig configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigModificationTransaction {
    pub min_approval_delta: i8,
    pub min_removal_delta: i8,
    pub additions: Vec<PublicKey>,
    pub deletions: Vec<PublicKey>,
}

/// Escrow deposit that must confirm before a bonded aggregate is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashLockTransaction {
    pub mosaic: Mosaic,
    /// Number of blocks the lock stays open.
    pub duration: u64,
    /// Hash of the bonded aggregate being locked for.
    pub hash: TransactionHash,
}

/// A key/value metadata entry attached to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMetadataTransaction {
    pub target: PublicKey,
    pub scoped_key: u64,
    pub value: String,
}

/// Whether an aggregate arrives fully signed or collects cosignatures later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Complete,
    Bonded,
}

/// A transaction embedded in an aggregate, with the account it acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerTransaction {
    pub signer: PublicKey,
    pub transaction: Transaction,
}

/// A set of inner transactions applied atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateTransaction {
    pub kind: AggregateKind,
    pub inner: Vec<InnerTransaction>,
}

/// Every transaction kind the notarization protocol produces or inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Transfer(TransferTransaction),
    Aggregate(AggregateTransaction),
    MultisigModification(MultisigModificationTransaction),
    HashLock(HashLockTransaction),
    AccountMetadata(AccountMetadataTransaction),
}

/// Wire type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Transfer,
    AggregateComplete,
    AggregateBonded,
    MultisigModification,
    HashLock,
    AccountMetadata,
}

impl TransactionType {
    /// The 16-bit type code used in canonical encoding.
    pub const fn code(self) -> u16 {
        match self {
            TransactionType::Transfer => 0x4154,
            TransactionType::AggregateComplete => 0x4141,
            TransactionType::AggregateBonded => 0x4241,
            TransactionType::MultisigModification => 0x4155,
            TransactionType::HashLock => 0x4148,
            TransactionType::AccountMetadata => 0x4144,
        }
    }
}

impl Transaction {
    /// The wire type of this transaction.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Transaction::Transfer(_) => TransactionType::Transfer,
            Transaction::Aggregate(agg) => match agg.kind {
                AggregateKind::Complete => TransactionType::AggregateComplete,
                AggregateKind::Bonded => TransactionType::AggregateBonded,
            },
            Transaction::MultisigModification(_) => TransactionType::MultisigModification,
            Transaction::HashLock(_) => TransactionType::HashLock,
            Transaction::AccountMetadata(_) => TransactionType::AccountMetadata,
        }
    }

    /// Embed this transaction in an aggregate on behalf of `signer`.
    pub fn into_inner(self, signer: PublicKey) -> InnerTransaction {
        InnerTransaction {
            signer,
            transaction: self,
        }
    }

    /// Borrow as an aggregate, if it is one.
    pub fn as_aggregate(&self) -> Option<&AggregateTransaction> {
        match self {
            Transaction::Aggregate(agg) => Some(agg),
            _ => None,
        }
    }
}

/// A top-level transaction with the fields every signed transaction carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub network: NetworkType,
    pub deadline: Deadline,
    pub max_fee: u64,
    pub transaction: Transaction,
}

impl TransactionEnvelope {
    /// Wrap a transaction.
    pub fn new(
        network: NetworkType,
        deadline: Deadline,
        max_fee: u64,
        transaction: Transaction,
    ) -> Self {
        Self {
            network,
            deadline,
            max_fee,
            transaction,
        }
    }
}

/// Scoped metadata key: the first 8 bytes of `SHA3-256(key)`, little-endian.
pub fn metadata_scoped_key(key: &str) -> u64 {
    let digest = sha3::Sha3_256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
