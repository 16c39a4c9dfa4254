//! Ledger node client contract.
//!
//! Implementations may talk REST to a node or, as [`crate::MemoryLedger`]
//! does, simulate one in memory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use apostille_core::{Address, MultisigInfo, SignedTransaction, TransactionHash};

use crate::error::Result;

/// A transaction as stored in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTransaction {
    pub signed: SignedTransaction,
    /// Height of the block that includes it.
    pub height: u64,
}

/// Block header fields the services need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    /// Milliseconds since the network's epoch adjustment, not the Unix epoch.
    pub timestamp: u64,
}

/// Proof that an event subscription is open.
///
/// Only [`crate::Listener`] can produce one, so anything holding a
/// `&LiveSubscription` is listening for the outcome of what it submits.
#[derive(Debug)]
pub struct LiveSubscription {
    address: Address,
}

impl LiveSubscription {
    pub(crate) fn new(address: Address) -> Self {
        Self { address }
    }

    /// The address the subscription listens on.
    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Access to a ledger node.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a signed transaction. Acceptance is reported through events.
    async fn announce(
        &self,
        subscription: &LiveSubscription,
        transaction: &SignedTransaction,
    ) -> Result<()>;

    /// Submit a bonded aggregate whose hash lock has confirmed.
    async fn announce_aggregate_bonded(
        &self,
        subscription: &LiveSubscription,
        transaction: &SignedTransaction,
    ) -> Result<()>;

    /// Fetch a confirmed transaction by hash.
    async fn transaction(&self, hash: &TransactionHash) -> Result<ConfirmedTransaction>;

    /// Fetch a block header by height.
    async fn block(&self, height: u64) -> Result<BlockInfo>;

    /// Current multisig configuration of an account, `None` if it has none.
    async fn multisig_info(&self, address: &Address) -> Result<Option<MultisigInfo>>;
}
