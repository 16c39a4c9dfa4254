//! # Apostille Ledger
//!
//! Contracts for talking to a ledger node, and the listener protocol used to
//! submit transactions and observe their outcome.
//!
//! ## Submission flow
//!
//! ```text
//! Service                 Listener                 Node
//!   |--- open(address) ---->|------ subscribe ------>|
//!   |--- announce(tx) ----->|------ announce ------->|
//!   |--- wait_for(hash) --->|<----- events ----------|
//!   |--- close() ---------->|------ unsubscribe ---->|
//! ```
//!
//! [`LedgerClient::announce`] requires a [`LiveSubscription`], which only an
//! open [`Listener`] hands out, so a transaction cannot be submitted before
//! its outcome is being listened for.

pub mod client;
pub mod error;
pub mod events;
pub mod listener;
pub mod memory;

pub use client::{BlockInfo, ConfirmedTransaction, LedgerClient, LiveSubscription};
pub use error::{LedgerError, Result};
pub use events::{EventSource, LedgerEvent, Subscription};
pub use listener::{Listener, Outcome, Stage};
pub use memory::{EventMode, LedgerCall, MemoryLedger, MemorySubscription};
