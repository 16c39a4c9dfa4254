//! Strong type definitions for ledger hashes.
//!
//! Identifiers are newtypes so a transaction hash can never be passed where a
//! generation hash is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte transaction hash, computed when a transaction is signed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionHash(pub [u8; 32]);

impl TransactionHash {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for TransactionHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for TransactionHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// The generation hash of a ledger network.
///
/// Mixed into every signing message so a signature is only valid on the
/// network it was produced for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationHash(pub [u8; 32]);

impl GenerationHash {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The zero generation hash (private test networks).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for GenerationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GenerationHash({})", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_hash_hex_roundtrip() {
        let hash = TransactionHash::from_bytes([0x42; 32]);
        let recovered = TransactionHash::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, recovered);
    }

    #[test]
    fn test_transaction_hash_display_is_full_hex() {
        let hash = TransactionHash::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", hash), "ab".repeat(32));
        assert!(format!("{:?}", hash).starts_with("TransactionHash("));
    }

    #[test]
    fn test_generation_hash_rejects_wrong_length() {
        assert!(GenerationHash::from_hex("44d2").is_err());
        let parsed = GenerationHash::from_hex(
            "44D2225B8932C9A96DCB13508CBCDFFA9A9663BFBA2354FEEC8FCFCB7E19846C",
        )
        .unwrap();
        assert_eq!(parsed.as_bytes()[0], 0x44);
    }
}
