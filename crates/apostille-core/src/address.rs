//! Ledger account addresses.
//!
//! An address is derived from a public key and a network:
//!
//! ```text
//! network_id (1) || Blake3("apostille-address-v0:" || public_key)[..20] || checksum (4)
//! ```
//!
//! The checksum is the first four bytes of `Blake3(network_id || body)`.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::crypto::PublicKey;
use crate::error::CoreError;
use crate::network::NetworkType;

const BODY_LEN: usize = 20;
const CHECKSUM_LEN: usize = 4;

/// Length of an encoded address in bytes.
pub const ADDRESS_LEN: usize = 1 + BODY_LEN + CHECKSUM_LEN;

/// A 25-byte ledger address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Derive the address of a public key on a network.
    pub fn from_public_key(public_key: &PublicKey, network: NetworkType) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"apostille-address-v0:");
        hasher.update(public_key.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[0] = network.id();
        bytes[1..1 + BODY_LEN].copy_from_slice(&digest.as_bytes()[..BODY_LEN]);
        let checksum = checksum(&bytes[..1 + BODY_LEN]);
        bytes[1 + BODY_LEN..].copy_from_slice(&checksum);
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// The network encoded in the first byte, if it is a known one.
    pub fn network(&self) -> Option<NetworkType> {
        NetworkType::from_id(self.0[0])
    }

    /// Convert to upper-case hex string.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse from hex string, validating network byte and checksum.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
        let arr: [u8; ADDRESS_LEN] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ))
        })?;

        if NetworkType::from_id(arr[0]).is_none() {
            return Err(CoreError::InvalidAddress(format!(
                "unknown network id {:#04x}",
                arr[0]
            )));
        }
        if checksum(&arr[..1 + BODY_LEN]) != arr[1 + BODY_LEN..] {
            return Err(CoreError::InvalidAddress("checksum mismatch".into()));
        }
        Ok(Self(arr))
    }
}

fn checksum(prefix: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = blake3::hash(prefix);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest.as_bytes()[..CHECKSUM_LEN]);
    out
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(de::Error::custom)
    }
}
