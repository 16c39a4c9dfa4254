//! Ledger event stream contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use apostille_core::{Address, TransactionHash};

use crate::error::Result;

/// An event pushed by the node about a transaction touching a watched address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Accepted into the unconfirmed pool.
    UnconfirmedAdded { hash: TransactionHash },
    /// Included in a block.
    Confirmed { hash: TransactionHash, height: u64 },
    /// A bonded aggregate entered the partial pool awaiting cosignatures.
    AggregateBondedAdded { hash: TransactionHash },
    /// Validation failed with a node status code.
    Status { hash: TransactionHash, code: String },
}

impl LedgerEvent {
    /// The transaction the event refers to.
    pub fn hash(&self) -> &TransactionHash {
        match self {
            LedgerEvent::UnconfirmedAdded { hash }
            | LedgerEvent::Confirmed { hash, .. }
            | LedgerEvent::AggregateBondedAdded { hash }
            | LedgerEvent::Status { hash, .. } => hash,
        }
    }
}

/// An open stream of events for one address.
#[async_trait]
pub trait Subscription: Send {
    /// Wait for the next event.
    ///
    /// Returns [`crate::LedgerError::SubscriptionClosed`] once the stream ends.
    async fn next_event(&mut self) -> Result<LedgerEvent>;

    /// Stop receiving events. Closing twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Something that can open event subscriptions.
#[async_trait]
pub trait EventSource: Send + Sync {
    type Subscription: Subscription;

    /// Start listening for events involving `address`.
    async fn open(&self, address: &Address) -> Result<Self::Subscription>;
}
