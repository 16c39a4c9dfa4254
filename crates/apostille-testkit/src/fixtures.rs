//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use apostille::{
    AuditService, NotarizationAccount, NotarizationService, Result, ServiceConfig,
    UpdateNotarizationService,
};
use apostille_core::{Address, Keypair, MultisigInfo, PublicKey, Sha256Hash};
use apostille_ledger::MemoryLedger;

/// Owner key used across fixtures and golden vectors.
pub const OWNER_PRIVATE_KEY: &str =
    "aaaaaaaaaaeeeeeeeeeebbbbbbbbbb5555555555dddddddddd1111111111aaee";

/// An owner, a ledger, and a config that agree on network and generation hash.
pub struct TestFixture {
    pub owner: Keypair,
    pub ledger: Arc<MemoryLedger>,
    pub config: ServiceConfig,
}

impl TestFixture {
    /// Create a fixture owned by [`OWNER_PRIVATE_KEY`].
    pub fn new() -> Self {
        Self::with_owner(Keypair::from_hex(OWNER_PRIVATE_KEY).expect("valid fixture key"))
    }

    /// Create with a deterministic owner from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_owner(Keypair::from_seed(&seed))
    }

    /// Create with a given owner.
    pub fn with_owner(owner: Keypair) -> Self {
        let config = ServiceConfig::default();
        let ledger = Arc::new(MemoryLedger::new(
            config.network.network_type,
            config.network.generation_hash,
        ));
        Self {
            owner,
            ledger,
            config,
        }
    }

    pub fn owner_key(&self) -> PublicKey {
        self.owner.public_key()
    }

    pub fn owner_address(&self) -> Address {
        Address::from_public_key(&self.owner_key(), self.config.network.network_type)
    }

    /// A creation service for `filename`, hashing with SHA-256.
    pub fn notarize(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<NotarizationService<MemoryLedger>> {
        NotarizationService::new(
            Arc::clone(&self.ledger),
            self.config.clone(),
            self.owner.clone(),
            filename,
            data,
            &Sha256Hash,
        )
    }

    /// An update service for an account known only by its public key.
    pub fn update(&self, account: PublicKey, data: &[u8]) -> UpdateNotarizationService<MemoryLedger> {
        UpdateNotarizationService::new(
            Arc::clone(&self.ledger),
            self.config.clone(),
            self.owner.clone(),
            NotarizationAccount::from_public_key(account, self.config.network.network_type),
            data,
            &Sha256Hash,
        )
    }

    pub fn auditor(&self) -> AuditService<MemoryLedger> {
        AuditService::new(Arc::clone(&self.ledger), self.config.clone())
    }

    /// Make `account` an `min_approval`-of-n multisig over `cosignatories`.
    pub fn make_multisig(&self, account: PublicKey, min_approval: u8, cosignatories: Vec<PublicKey>) {
        self.ledger.set_multisig(MultisigInfo {
            account,
            min_approval,
            min_removal: min_approval,
            cosignatories,
        });
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Distinct deterministic keypairs for multi-party tests.
pub fn multi_party_keys(count: usize) -> Vec<Keypair> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = 0xa5;
            Keypair::from_seed(&seed)
        })
        .collect()
}
