//! Transaction signing and signature checks.
//!
//! The signer signs [`signing_message`]. The transaction hash is
//! `Blake3(signature || signer || signing_message)`, and every cosigner of
//! an aggregate signs that hash.

use crate::canonical::signing_message;
use crate::crypto::{Keypair, PublicKey, Signature};
use crate::error::CoreError;
use crate::transaction::TransactionEnvelope;
use crate::types::{GenerationHash, TransactionHash};

/// A cosigner's signature over a transaction hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cosignature {
    pub signer: PublicKey,
    pub signature: Signature,
}

impl Cosignature {
    /// Cosign a transaction hash.
    pub fn sign(hash: &TransactionHash, keypair: &Keypair) -> Self {
        Self {
            signer: keypair.public_key(),
            signature: keypair.sign(hash.as_bytes()),
        }
    }
}

/// A signed envelope ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub envelope: TransactionEnvelope,
    pub signer: PublicKey,
    pub signature: Signature,
    pub cosignatures: Vec<Cosignature>,
    pub hash: TransactionHash,
}

impl TransactionEnvelope {
    /// Sign with a single key.
    pub fn sign(self, keypair: &Keypair, generation_hash: &GenerationHash) -> SignedTransaction {
        let message = signing_message(&self, generation_hash);
        let signature = keypair.sign(&message);
        let signer = keypair.public_key();
        let hash = transaction_hash(&signature, &signer, &message);

        SignedTransaction {
            envelope: self,
            signer,
            signature,
            cosignatures: Vec::new(),
            hash,
        }
    }

    /// Sign, then add a cosignature from each of `cosigners`.
    pub fn sign_with_cosignatories(
        self,
        keypair: &Keypair,
        cosigners: &[&Keypair],
        generation_hash: &GenerationHash,
    ) -> SignedTransaction {
        let mut signed = self.sign(keypair, generation_hash);
        for cosigner in cosigners {
            signed.add_cosignature(cosigner);
        }
        signed
    }
}

impl SignedTransaction {
    /// Append a cosignature. Signing twice with the same key is a no-op.
    pub fn add_cosignature(&mut self, keypair: &Keypair) {
        let signer = keypair.public_key();
        if signer == self.signer || self.cosignatures.iter().any(|c| c.signer == signer) {
            return;
        }
        self.cosignatures.push(Cosignature::sign(&self.hash, keypair));
    }

    /// Every key that has signed: the signer first, then cosigners.
    pub fn signers(&self) -> Vec<PublicKey> {
        std::iter::once(self.signer)
            .chain(self.cosignatures.iter().map(|c| c.signer))
            .collect()
    }

    /// Check the signature, the hash, and every cosignature.
    pub fn verify(&self, generation_hash: &GenerationHash) -> Result<(), CoreError> {
        let message = signing_message(&self.envelope, generation_hash);
        self.signer.verify(&message, &self.signature)?;

        if transaction_hash(&self.signature, &self.signer, &message) != self.hash {
            return Err(CoreError::InvalidSignature);
        }

        for cosignature in &self.cosignatures {
            cosignature
                .signer
                .verify(self.hash.as_bytes(), &cosignature.signature)?;
        }
        Ok(())
    }
}

fn transaction_hash(signature: &Signature, signer: &PublicKey, message: &[u8]) -> TransactionHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(signature.as_bytes());
    hasher.update(signer.as_bytes());
    hasher.update(message);
    TransactionHash(*hasher.finalize().as_bytes())
}
