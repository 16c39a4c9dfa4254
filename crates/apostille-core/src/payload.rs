//! The tagged hash payload and its audit.
//!
//! A notarization record is the hex text of
//! `PAYLOAD_PREFIX || hashing type code || signed hash`. A payload is a
//! notarization record iff it starts with the prefix followed by a known
//! code and at least one more byte.

use std::fmt;

use crate::crypto::{PublicKey, Signature};
use crate::error::CoreError;
use crate::hash::{hash_function_for, HashingType};

/// Fixed 4-byte protocol marker (`fe4e5459`).
pub const PAYLOAD_PREFIX: [u8; 4] = [0xfe, 0x4e, 0x54, 0x59];

const PREFIX_HEX: &str = "fe4e5459";

/// A parsed or freshly produced notarization record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedPayload {
    hashing_type: HashingType,
    signed_hash: Vec<u8>,
}

impl TaggedPayload {
    /// Create a payload from its parts.
    pub fn new(hashing_type: HashingType, signed_hash: Vec<u8>) -> Self {
        Self {
            hashing_type,
            signed_hash,
        }
    }

    /// The hashing type tag.
    pub fn hashing_type(&self) -> HashingType {
        self.hashing_type
    }

    /// The signed hash bytes following the tag.
    pub fn signed_hash(&self) -> &[u8] {
        &self.signed_hash
    }

    /// The signed hash as an Ed25519 signature, if it has the right length.
    pub fn signature(&self) -> Option<Signature> {
        Signature::try_from(self.signed_hash.as_slice()).ok()
    }

    /// Encode to raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PAYLOAD_PREFIX.len() + 1 + self.signed_hash.len());
        buf.extend_from_slice(&PAYLOAD_PREFIX);
        buf.push(self.hashing_type.code());
        buf.extend_from_slice(&self.signed_hash);
        buf
    }

    /// Encode to lower-case hex text, the form embedded in transfer messages.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() <= PAYLOAD_PREFIX.len() + 1 || bytes[..PAYLOAD_PREFIX.len()] != PAYLOAD_PREFIX
        {
            return Err(CoreError::NotApostillePayload);
        }
        let hashing_type = HashingType::from_code(bytes[PAYLOAD_PREFIX.len()])
            .map_err(|_| CoreError::NotApostillePayload)?;
        Ok(Self {
            hashing_type,
            signed_hash: bytes[PAYLOAD_PREFIX.len() + 1..].to_vec(),
        })
    }

    /// Parse hex text as found in a transfer message.
    pub fn parse(payload: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(payload.trim()).map_err(|_| CoreError::NotApostillePayload)?;
        Self::from_bytes(&bytes)
    }

    /// Whether message text starts with the protocol prefix.
    ///
    /// Used to spot the core transfer inside an aggregate before a full parse.
    pub fn has_prefix(message: &str) -> bool {
        message
            .get(..PREFIX_HEX.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(PREFIX_HEX))
    }
}

impl fmt::Display for TaggedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Verification of a published payload against candidate content.
pub struct AuditPayload;

impl AuditPayload {
    /// Check that `payload` notarizes `data` under `owner`.
    ///
    /// Returns `false` when the payload is not a notarization record, when
    /// the signed hash is malformed, or when the signature does not verify
    /// over the recomputed digest. Never fails.
    pub fn audit(data: &[u8], payload: &str, owner: &PublicKey) -> bool {
        Self::verify(data, payload, owner).is_ok()
    }

    /// Same as [`AuditPayload::audit`] but reports why verification failed.
    pub fn verify(data: &[u8], payload: &str, owner: &PublicKey) -> Result<(), CoreError> {
        let parsed = TaggedPayload::parse(payload)?;
        let signature = parsed.signature().ok_or(CoreError::InvalidSignature)?;
        let digest = hash_function_for(parsed.hashing_type()).hash(data);
        owner.verify(&digest, &signature)
    }
}
