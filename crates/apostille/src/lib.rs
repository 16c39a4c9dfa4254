//! # Apostille
//!
//! Notarization of file content on a ledger.
//!
//! An owner publishes a signed, type-tagged hash of a file to an account
//! derived from the filename and the owner's key. Anyone holding the file
//! can later audit the record.
//!
//! ## Services
//!
//! - [`NotarizationService`] - first notarization of a file
//! - [`UpdateNotarizationService`] - further notarizations, including to
//!   accounts whose ownership has moved to a multisig
//! - [`AuditService`] - verify a published record against content
//!
//! ## Signing paths
//!
//! ```text
//! create                         -> complete aggregate (owner, + account if it acts)
//! update, SingleCosignatoryOnly  -> complete aggregate (owner)
//! update, ApostilleAccountOnly   -> complete aggregate (owner, + account if it acts)
//! update, NeedOtherCosignatory   -> hash lock, confirmed, then bonded aggregate (owner)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use apostille::{NotarizationService, ServiceConfig};
//! use apostille_core::{Keypair, Sha256Hash};
//! use apostille_ledger::MemoryLedger;
//!
//! async fn example() -> apostille::Result<()> {
//!     let config = ServiceConfig::default();
//!     let ledger = Arc::new(MemoryLedger::new(
//!         config.network.network_type,
//!         config.network.generation_hash,
//!     ));
//!
//!     let owner = Keypair::generate();
//!     let mut service =
//!         NotarizationService::new(ledger, config, owner, "deed.pdf", b"...", &Sha256Hash)?;
//!     service.build_core();
//!     service.add_sink_announcement();
//!     service.add_ownership_assignment();
//!     let result = service.announce().await?;
//!     println!("notarized in {}", result.tx_hash);
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod audit;
pub mod builder;
pub mod config;
pub mod error;
pub mod result;
pub mod service;
pub mod submit;
pub mod update;

pub use account::{NotarizationAccount, PublicAccount};
pub use audit::AuditService;
pub use builder::TransactionSet;
pub use config::{public_sink, NetworkParams, ServiceConfig};
pub use error::{ApostilleError, Result};
pub use result::{AnnounceResult, AuditRecord, AuditResult};
pub use service::NotarizationService;
pub use submit::SubmissionPlan;
pub use update::UpdateNotarizationService;
