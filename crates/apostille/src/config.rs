//! Service configuration.
//!
//! Everything network-specific is passed in here at construction; nothing is
//! looked up from global tables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use apostille_core::{Address, GenerationHash, MosaicId, NetworkType, PublicKey};

use crate::error::{ApostilleError, Result};

/// Start of ledger time, 2016-04-01T00:00:00Z, in Unix milliseconds.
pub const DEFAULT_EPOCH_ADJUSTMENT_MS: u64 = 1_459_468_800_000;

/// The network currency mosaic used for hash lock deposits.
pub const DEFAULT_CURRENCY: MosaicId = MosaicId(0x0DC6_7FBE_1CAD_29E3);

/// Parameters of the ledger network being notarized on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    pub network_type: NetworkType,
    pub generation_hash: GenerationHash,
    /// Address that receives public copies of every notarization.
    pub public_sink: Address,
    pub currency: MosaicId,
    pub epoch_adjustment_ms: u64,
}

impl NetworkParams {
    /// Parameters for a network, using its well-known public sink.
    pub fn for_network(network_type: NetworkType, generation_hash: GenerationHash) -> Self {
        Self {
            network_type,
            generation_hash,
            public_sink: public_sink(network_type),
            currency: DEFAULT_CURRENCY,
            epoch_adjustment_ms: DEFAULT_EPOCH_ADJUSTMENT_MS,
        }
    }
}

/// The well-known public sink address of a network.
pub fn public_sink(network_type: NetworkType) -> Address {
    let key = blake3::derive_key("apostille public sink v0", &[network_type.id()]);
    Address::from_public_key(&PublicKey::from_bytes(key), network_type)
}

/// Configuration shared by the notarization and audit services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub network: NetworkParams,
    /// Maximum fee offered per transaction, in micro units.
    pub max_fee: u64,
    /// Hash lock deposit, in micro units of the network currency.
    pub lock_amount: u64,
    /// Hash lock duration in blocks.
    pub lock_duration: u64,
    /// How long a signed transaction stays valid.
    #[serde(with = "millis")]
    pub deadline: Duration,
    /// Bound on every wait for a ledger event.
    #[serde(with = "millis")]
    pub confirmation_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            network: NetworkParams::for_network(NetworkType::MijinTest, GenerationHash::ZERO),
            max_fee: 0,
            lock_amount: 10_000_000,
            lock_duration: 480,
            deadline: Duration::from_secs(2 * 60 * 60),
            confirmation_timeout: Duration::from_secs(60),
        }
    }
}

impl ServiceConfig {
    /// Default configuration for a network.
    pub fn for_network(network_type: NetworkType, generation_hash: GenerationHash) -> Self {
        Self {
            network: NetworkParams::for_network(network_type, generation_hash),
            ..Self::default()
        }
    }

    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ApostilleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no submission could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.confirmation_timeout.is_zero() {
            return Err(ApostilleError::Config(
                "confirmation_timeout must be positive".into(),
            ));
        }
        if self.deadline.is_zero() {
            return Err(ApostilleError::Config("deadline must be positive".into()));
        }
        if self.lock_duration == 0 {
            return Err(ApostilleError::Config("lock_duration must be positive".into()));
        }
        if self.network.public_sink.network() != Some(self.network.network_type) {
            return Err(ApostilleError::Config(
                "public_sink belongs to a different network".into(),
            ));
        }
        Ok(())
    }
}

/// Durations as integer milliseconds.
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
