//! # Apostille Testkit
//!
//! Testing utilities for apostille.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known digests and payloads for a fixed owner key
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: An owner, an in-memory ledger, and a matching config
//!
//! ## Golden Vectors
//!
//! ```rust
//! use apostille_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().unwrap();
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use apostille_testkit::generators::{content, hashing_type, keypair};
//!
//! proptest! {
//!     #[test]
//!     fn embed_audits(owner in keypair(), data in content(256), kind in hashing_type()) {
//!         let payload = hash_function_for(kind).signed_embed(&data, &owner).to_hex();
//!         prop_assert!(AuditPayload::audit(&data, &payload, &owner.public_key()));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use apostille_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let mut service = fixture.notarize("deed.pdf", b"contents").unwrap();
//! service.build_core();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_keys, TestFixture, OWNER_PRIVATE_KEY};
pub use generators::{MultisigParams, PayloadParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
