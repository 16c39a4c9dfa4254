//! Subscribe-then-submit protocol object.
//!
//! A [`Listener`] is the only way to obtain a [`LiveSubscription`], and the
//! ledger client's submit methods demand one. Submitting before the
//! subscription is open therefore does not type-check.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use apostille_core::{Address, SignedTransaction, TransactionHash};

use crate::client::{LedgerClient, LiveSubscription};
use crate::error::Result;
use crate::events::{EventSource, LedgerEvent, Subscription};

/// How far a transaction must get before a wait succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Unconfirmed-added, bonded-added, or confirmed.
    Unconfirmed,
    /// Confirmed in a block.
    Confirmed,
}

/// Result of waiting for a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The awaited stage was reached with this event.
    Reached(LedgerEvent),
    /// The node reported a validation failure.
    Rejected { code: String },
    /// No matching event arrived within the timeout.
    TimedOut,
}

/// An open subscription that transactions can be submitted through.
pub struct Listener<S> {
    subscription: S,
    live: LiveSubscription,
    timeout: Duration,
}

impl<S: Subscription> Listener<S> {
    /// Open a subscription on `address`. Waits are bounded by `timeout`.
    pub async fn open<E>(events: &E, address: &Address, timeout: Duration) -> Result<Self>
    where
        E: EventSource<Subscription = S> + ?Sized,
    {
        let subscription = events.open(address).await?;
        debug!(%address, "listener opened");
        Ok(Self {
            subscription,
            live: LiveSubscription::new(*address),
            timeout,
        })
    }

    /// The token proving this subscription is live.
    pub fn live(&self) -> &LiveSubscription {
        &self.live
    }

    /// Submit a transaction through `client`.
    pub async fn announce<C>(&self, client: &C, transaction: &SignedTransaction) -> Result<()>
    where
        C: LedgerClient + ?Sized,
    {
        debug!(hash = %transaction.hash, "announcing");
        client.announce(&self.live, transaction).await
    }

    /// Submit a bonded aggregate through `client`.
    pub async fn announce_aggregate_bonded<C>(
        &self,
        client: &C,
        transaction: &SignedTransaction,
    ) -> Result<()>
    where
        C: LedgerClient + ?Sized,
    {
        debug!(hash = %transaction.hash, "announcing bonded aggregate");
        client
            .announce_aggregate_bonded(&self.live, transaction)
            .await
    }

    /// Wait until `hash` reaches `stage`, is rejected, or the timeout expires.
    ///
    /// Events for other transactions are skipped.
    pub async fn wait_for(&mut self, hash: &TransactionHash, stage: Stage) -> Result<Outcome> {
        let deadline = Instant::now() + self.timeout;

        loop {
            let event =
                match tokio::time::timeout_at(deadline, self.subscription.next_event()).await {
                    Ok(event) => event?,
                    Err(_) => {
                        warn!(%hash, ?stage, timeout = ?self.timeout, "no event before timeout");
                        return Ok(Outcome::TimedOut);
                    }
                };

            if event.hash() != hash {
                continue;
            }

            match (&event, stage) {
                (LedgerEvent::Status { code, .. }, _) => {
                    return Ok(Outcome::Rejected { code: code.clone() })
                }
                (LedgerEvent::Confirmed { .. }, _) => return Ok(Outcome::Reached(event)),
                (
                    LedgerEvent::UnconfirmedAdded { .. } | LedgerEvent::AggregateBondedAdded { .. },
                    Stage::Unconfirmed,
                ) => return Ok(Outcome::Reached(event)),
                _ => continue,
            }
        }
    }

    /// Close the underlying subscription.
    pub async fn close(mut self) -> Result<()> {
        debug!(address = %self.live.address(), "listener closed");
        self.subscription.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use apostille_core::{Keypair, NetworkType};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    struct Scripted {
        events: VecDeque<LedgerEvent>,
        hang: bool,
    }

    #[async_trait]
    impl Subscription for Scripted {
        async fn next_event(&mut self) -> Result<LedgerEvent> {
            match self.events.pop_front() {
                Some(event) => Ok(event),
                None if self.hang => std::future::pending().await,
                None => Err(LedgerError::SubscriptionClosed),
            }
        }

        async fn close(&mut self) -> Result<()> {
            self.events.clear();
            Ok(())
        }
    }

    fn listener(events: Vec<LedgerEvent>, hang: bool) -> Listener<Scripted> {
        let owner = Keypair::from_seed(&[1u8; 32]).public_key();
        Listener {
            subscription: Scripted {
                events: events.into(),
                hang,
            },
            live: LiveSubscription::new(Address::from_public_key(&owner, NetworkType::MijinTest)),
            timeout: Duration::from_millis(50),
        }
    }

    fn hash(byte: u8) -> TransactionHash {
        TransactionHash::from_bytes([byte; 32])
    }

    #[tokio::test]
    async fn test_skips_unrelated_events() {
        let mut listener = listener(
            vec![
                LedgerEvent::Status {
                    hash: hash(2),
                    code: "Failure_Core_Insufficient_Balance".into(),
                },
                LedgerEvent::UnconfirmedAdded { hash: hash(1) },
            ],
            false,
        );
        let outcome = listener.wait_for(&hash(1), Stage::Unconfirmed).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Reached(LedgerEvent::UnconfirmedAdded { hash: hash(1) })
        );
    }

    #[tokio::test]
    async fn test_confirmed_stage_ignores_unconfirmed() {
        let mut listener = listener(
            vec![
                LedgerEvent::UnconfirmedAdded { hash: hash(1) },
                LedgerEvent::Confirmed {
                    hash: hash(1),
                    height: 7,
                },
            ],
            false,
        );
        let outcome = listener.wait_for(&hash(1), Stage::Confirmed).await.unwrap();
        assert!(matches!(
            outcome,
            Outcome::Reached(LedgerEvent::Confirmed { height: 7, .. })
        ));
    }

    #[tokio::test]
    async fn test_status_rejects() {
        let mut listener = listener(
            vec![LedgerEvent::Status {
                hash: hash(1),
                code: "Failure_Aggregate_Missing_Cosigners".into(),
            }],
            false,
        );
        let outcome = listener.wait_for(&hash(1), Stage::Confirmed).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Rejected {
                code: "Failure_Aggregate_Missing_Cosigners".into()
            }
        );
    }

    #[tokio::test]
    async fn test_times_out() {
        let mut listener = listener(vec![LedgerEvent::UnconfirmedAdded { hash: hash(2) }], true);
        let outcome = listener.wait_for(&hash(1), Stage::Unconfirmed).await.unwrap();
        assert_eq!(outcome, Outcome::TimedOut);
        listener.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_stream_is_an_error() {
        let mut listener = listener(vec![], false);
        let err = listener
            .wait_for(&hash(1), Stage::Unconfirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::SubscriptionClosed));
    }
}
