//! Cryptographic identities for owners and notarization accounts.
//!
//! Wraps Ed25519 signing with strong types. Signatures are deterministic,
//! which the account derivation relies on.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
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
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|_| CoreError::InvalidPublicKey)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::InvalidPublicKey)?;
        Ok(Self(arr))
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CoreError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 64] = slice.try_into().map_err(|_| CoreError::InvalidSignature)?;
        Ok(Self(arr))
    }
}

/// An Ed25519 keypair for an owner or a self-custodied notarization account.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Parse a private key given as 64 hex characters.
    pub fn from_hex(private_key: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(private_key)
            .map_err(|e| CoreError::InvalidPrivateKey(e.to_string()))?;
        let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::InvalidPrivateKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_seed(&seed))
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig = self.signing_key.sign(message);
        Signature(sig.to_bytes())
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"hello world";
        let signature = keypair.sign(message);

        keypair
            .public_key()
            .verify(message, &signature)
            .expect("valid signature should verify");

        let tampered = b"hello worlD";
        assert!(keypair.public_key().verify(tampered, &signature).is_err());
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let keypair = Keypair::from_seed(&[0x42u8; 32]);
        assert_eq!(keypair.sign(b"file.txt"), keypair.sign(b"file.txt"));
    }

    #[test]
    fn test_keypair_from_hex() {
        let keypair = Keypair::from_hex(
            "aaaaaaaaaaeeeeeeeeeebbbbbbbbbb5555555555dddddddddd1111111111aaee",
        )
        .unwrap();
        assert_eq!(hex::encode(keypair.seed()), "aaaaaaaaaaeeeeeeeeeebbbbbbbbbb5555555555dddddddddd1111111111aaee");

        assert!(matches!(
            Keypair::from_hex("abcd"),
            Err(CoreError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            Keypair::from_hex("zz"),
            Err(CoreError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = Keypair::generate().public_key();
        let recovered = PublicKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, recovered);
        assert!(PublicKey::from_hex("00ff").is_err());
    }

    #[test]
    fn test_signature_from_short_slice_fails() {
        assert!(Signature::try_from(&[0u8; 12][..]).is_err());
        assert!(Signature::try_from(&[0u8; 64][..]).is_ok());
    }
}
