//! The notarization account a file's records are published to.

use serde::{Deserialize, Serialize};
use tracing::debug;

use apostille_core::{
    Address, HashFunction, Keypair, NetworkType, PublicKey, Sha256Hash, SignType,
};
use apostille_ledger::LedgerClient;

use crate::error::{ApostilleError, Result};

const DERIVATION_DOMAIN: &[u8] = b"apostille-account-v0:";

/// The public identity of a notarization account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicAccount {
    pub public_key: PublicKey,
    pub address: Address,
}

/// A ledger account bound to one file and its owner.
///
/// Holds the private key only when it was derived locally. After ownership
/// has been transferred the account is wrapped from its public key alone.
#[derive(Debug, Clone)]
pub struct NotarizationAccount {
    public: PublicAccount,
    keypair: Option<Keypair>,
}

impl NotarizationAccount {
    /// Derive the account for `filename` owned by `owner`.
    ///
    /// The owner signs `SHA-256(filename)`; Ed25519 signatures are
    /// deterministic, so the seed `Blake3(domain || signature)` is too.
    pub fn derive(filename: &str, owner: &Keypair, network: NetworkType) -> Result<Self> {
        if filename.is_empty() {
            return Err(ApostilleError::Derivation("filename must not be empty".into()));
        }

        let filename_hash = Sha256Hash.hash(filename.as_bytes());
        let signature = owner.sign(&filename_hash);

        let mut hasher = blake3::Hasher::new();
        hasher.update(DERIVATION_DOMAIN);
        hasher.update(signature.as_bytes());
        let keypair = Keypair::from_seed(hasher.finalize().as_bytes());

        Ok(Self::from_keypair(keypair, network))
    }

    /// Wrap an existing account whose private key is held locally.
    pub fn from_keypair(keypair: Keypair, network: NetworkType) -> Self {
        let public_key = keypair.public_key();
        Self {
            public: PublicAccount {
                public_key,
                address: Address::from_public_key(&public_key, network),
            },
            keypair: Some(keypair),
        }
    }

    /// Wrap an existing account known only by its public key.
    pub fn from_public_key(public_key: PublicKey, network: NetworkType) -> Self {
        Self {
            public: PublicAccount {
                public_key,
                address: Address::from_public_key(&public_key, network),
            },
            keypair: None,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public.public_key
    }

    pub fn address(&self) -> &Address {
        &self.public.address
    }

    /// The public identity, without key material.
    pub fn public_account(&self) -> PublicAccount {
        self.public
    }

    /// The account's keypair, if it is held locally.
    pub fn keypair(&self) -> Option<&Keypair> {
        self.keypair.as_ref()
    }

    /// Read the account's multisig state and classify it for `owner`.
    ///
    /// Always queries the ledger; multisig configuration can change between
    /// calls.
    pub async fn resolve_sign_type<C>(&self, ledger: &C, owner: &PublicKey) -> Result<SignType>
    where
        C: LedgerClient + ?Sized,
    {
        let info = ledger.multisig_info(self.address()).await?;
        let sign_type = SignType::classify(info.as_ref(), owner);
        debug!(
            account = %self.address(),
            ?sign_type,
            cosignatories = info.as_ref().map_or(0, |i| i.cosignatories.len()),
            "resolved sign type"
        );
        Ok(sign_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apostille_core::{GenerationHash, MultisigInfo};
    use apostille_ledger::{LedgerCall, LedgerError, MemoryLedger};

    const NETWORK: NetworkType = NetworkType::MijinTest;

    fn owner() -> Keypair {
        Keypair::from_seed(&[1u8; 32])
    }

    #[test]
    fn test_derive_is_deterministic() {
        let a = NotarizationAccount::derive("contract.pdf", &owner(), NETWORK).unwrap();
        let b = NotarizationAccount::derive("contract.pdf", &owner(), NETWORK).unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.public_key(), b.public_key());
        assert!(a.keypair().is_some());
    }

    #[test]
    fn test_derive_depends_on_inputs() {
        let a = NotarizationAccount::derive("a.txt", &owner(), NETWORK).unwrap();
        let b = NotarizationAccount::derive("b.txt", &owner(), NETWORK).unwrap();
        let c = NotarizationAccount::derive("a.txt", &Keypair::from_seed(&[2u8; 32]), NETWORK)
            .unwrap();
        assert_ne!(a.address(), b.address());
        assert_ne!(a.address(), c.address());
    }

    #[test]
    fn test_derive_rejects_empty_filename() {
        assert!(matches!(
            NotarizationAccount::derive("", &owner(), NETWORK),
            Err(ApostilleError::Derivation(_))
        ));
    }

    #[test]
    fn test_from_public_key_has_no_keypair() {
        let account = NotarizationAccount::from_public_key(owner().public_key(), NETWORK);
        assert!(account.keypair().is_none());
        assert_eq!(
            *account.address(),
            Address::from_public_key(&owner().public_key(), NETWORK)
        );
    }

    #[tokio::test]
    async fn test_resolve_sign_type_reads_fresh_state() {
        let ledger = MemoryLedger::new(NETWORK, GenerationHash::ZERO);
        let account = NotarizationAccount::derive("file.txt", &owner(), NETWORK).unwrap();
        let owner_key = owner().public_key();

        assert_eq!(
            account.resolve_sign_type(&ledger, &owner_key).await.unwrap(),
            SignType::ApostilleAccountOnly
        );

        ledger.set_multisig(MultisigInfo {
            account: *account.public_key(),
            min_approval: 1,
            min_removal: 1,
            cosignatories: vec![owner_key],
        });
        assert_eq!(
            account.resolve_sign_type(&ledger, &owner_key).await.unwrap(),
            SignType::SingleCosignatoryOnly
        );
        assert_eq!(
            ledger.calls(),
            vec![
                LedgerCall::MultisigInfo(*account.address()),
                LedgerCall::MultisigInfo(*account.address()),
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_sign_type_surfaces_network_error() {
        let ledger = MemoryLedger::new(NETWORK, GenerationHash::ZERO);
        ledger.set_offline(true);
        let account = NotarizationAccount::derive("file.txt", &owner(), NETWORK).unwrap();

        let err = account
            .resolve_sign_type(&ledger, &owner().public_key())
            .await
            .unwrap_err();
        assert!(matches!(err, ApostilleError::Network(LedgerError::Network(_))));
    }
}
