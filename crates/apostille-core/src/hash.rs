//! Pluggable hash functions for notarized content.
//!
//! Every implementation shares one capability: hash the content, and embed
//! the owner's signature over that hash in a [`TaggedPayload`]. The payload
//! carries a one-byte [`HashingType`] code so an auditor can pick the same
//! function back out with [`hash_function_for`].

use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::crypto::Keypair;
use crate::error::CoreError;
use crate::payload::TaggedPayload;

/// Supported hash algorithms and their payload codes.
///
/// The codes are the signed ("private") variants of the apostille hash tags.
/// MD5 and SHA-1 are legacy codes, kept so older records still audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashingType {
    Md5,
    Sha1,
    Sha256,
    Keccak256,
    Keccak512,
    Sha3_256,
    Sha3_512,
}

impl HashingType {
    /// Every supported hashing type.
    pub const ALL: [HashingType; 7] = [
        HashingType::Md5,
        HashingType::Sha1,
        HashingType::Sha256,
        HashingType::Keccak256,
        HashingType::Keccak512,
        HashingType::Sha3_256,
        HashingType::Sha3_512,
    ];

    /// The one-byte tag written after the payload prefix.
    pub const fn code(self) -> u8 {
        match self {
            HashingType::Md5 => 0x81,
            HashingType::Sha1 => 0x82,
            HashingType::Sha256 => 0x83,
            HashingType::Keccak256 => 0x88,
            HashingType::Keccak512 => 0x89,
            HashingType::Sha3_256 => 0x90,
            HashingType::Sha3_512 => 0x91,
        }
    }

    /// Look up a hashing type by its tag.
    pub fn from_code(code: u8) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(CoreError::UnknownHashType(code))
    }

    /// Digest length in bytes.
    pub const fn digest_len(self) -> usize {
        match self {
            HashingType::Md5 => 16,
            HashingType::Sha1 => 20,
            HashingType::Sha256 | HashingType::Keccak256 | HashingType::Sha3_256 => 32,
            HashingType::Keccak512 | HashingType::Sha3_512 => 64,
        }
    }

    /// Whether this is a legacy code that new records should not use.
    pub const fn is_legacy(self) -> bool {
        matches!(self, HashingType::Md5 | HashingType::Sha1)
    }
}

/// A hashing strategy for notarized content.
pub trait HashFunction: Send + Sync {
    /// The tag identifying this function in a payload.
    fn hashing_type(&self) -> HashingType;

    /// Hash the content.
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Hash the content and sign the digest with the owner's key.
    fn signed_embed(&self, data: &[u8], owner: &Keypair) -> TaggedPayload {
        let digest = self.hash(data);
        let signature = owner.sign(&digest);
        TaggedPayload::new(self.hashing_type(), signature.as_bytes().to_vec())
    }
}

/// MD5. Legacy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Hash;

impl HashFunction for Md5Hash {
    fn hashing_type(&self) -> HashingType {
        HashingType::Md5
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        md5::Md5::digest(data).to_vec()
    }
}

/// SHA-1. Legacy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha1Hash;

impl HashFunction for Sha1Hash {
    fn hashing_type(&self) -> HashingType {
        HashingType::Sha1
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha1::Sha1::digest(data).to_vec()
    }
}

/// SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hash;

impl HashFunction for Sha256Hash {
    fn hashing_type(&self) -> HashingType {
        HashingType::Sha256
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha2::Sha256::digest(data).to_vec()
    }
}

/// Keccak-256 (pre-standard SHA-3 padding).
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Hash;

impl HashFunction for Keccak256Hash {
    fn hashing_type(&self) -> HashingType {
        HashingType::Keccak256
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha3::Keccak256::digest(data).to_vec()
    }
}

/// Keccak-512.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak512Hash;

impl HashFunction for Keccak512Hash {
    fn hashing_type(&self) -> HashingType {
        HashingType::Keccak512
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha3::Keccak512::digest(data).to_vec()
    }
}

/// SHA3-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha3_256Hash;

impl HashFunction for Sha3_256Hash {
    fn hashing_type(&self) -> HashingType {
        HashingType::Sha3_256
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha3::Sha3_256::digest(data).to_vec()
    }
}

/// SHA3-512.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha3_512Hash;

impl HashFunction for Sha3_512Hash {
    fn hashing_type(&self) -> HashingType {
        HashingType::Sha3_512
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha3::Sha3_512::digest(data).to_vec()
    }
}

/// The hash function identified by a hashing type.
pub fn hash_function_for(hashing_type: HashingType) -> Box<dyn HashFunction> {
    match hashing_type {
        HashingType::Md5 => Box::new(Md5Hash),
        HashingType::Sha1 => Box::new(Sha1Hash),
        HashingType::Sha256 => Box::new(Sha256Hash),
        HashingType::Keccak256 => Box::new(Keccak256Hash),
        HashingType::Keccak512 => Box::new(Keccak512Hash),
        HashingType::Sha3_256 => Box::new(Sha3_256Hash),
        HashingType::Sha3_512 => Box::new(Sha3_512Hash),
    }
}
