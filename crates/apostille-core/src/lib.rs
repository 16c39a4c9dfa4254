//! # Apostille Core
//!
//! Pure primitives for ledger notarization: keys, addresses, hash functions,
//! the tagged hash payload, the transaction model, and transaction signing.
//!
//! This crate contains no I/O and no networking. Everything here is
//! deterministic computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Keypair`] / [`PublicKey`] / [`Signature`] - Ed25519 identities
//! - [`Address`] - Ledger account address derived from a public key
//! - [`HashFunction`] / [`HashingType`] - Pluggable hashing strategies
//! - [`TaggedPayload`] / [`AuditPayload`] - The on-chain notarization record
//! - [`Transaction`] - Tagged ledger transaction variants
//! - [`SignedTransaction`] - An envelope with its signer, signature and hash
//! - [`SignType`] - How many and whose signatures an account requires
//!
//! ## Wire format
//!
//! The notarization record embedded in the core transfer is hex text:
//!
//! ```text
//! fe4e5459 || HASH_TYPE_CODE (1 byte) || SIGNED_HASH (64 bytes)
//! ```

pub mod address;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod hash;
pub mod multisig;
pub mod network;
pub mod payload;
pub mod signing;
pub mod transaction;
pub mod types;

pub use address::Address;
pub use canonical::{canonical_bytes, signing_message};
pub use crypto::{Keypair, PublicKey, Signature};
pub use error::{CoreError, Result};
pub use hash::{
    hash_function_for, HashFunction, HashingType, Keccak256Hash, Keccak512Hash, Md5Hash,
    Sha1Hash, Sha256Hash, Sha3_256Hash, Sha3_512Hash,
};
pub use multisig::{MultisigInfo, SignType};
pub use network::NetworkType;
pub use payload::{AuditPayload, TaggedPayload, PAYLOAD_PREFIX};
pub use signing::{Cosignature, SignedTransaction};
pub use transaction::{
    metadata_scoped_key, AccountMetadataTransaction, AggregateKind, AggregateTransaction,
    Deadline, HashLockTransaction, InnerTransaction, Message, Mosaic, MosaicId,
    MultisigModificationTransaction, Transaction, TransactionEnvelope, TransactionType,
    TransferTransaction,
};
pub use types::{GenerationHash, TransactionHash};
