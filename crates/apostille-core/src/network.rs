//! Ledger network identifiers.

use serde::{Deserialize, Serialize};

/// The ledger network a key, address or transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    MainNet,
    TestNet,
    Mijin,
    MijinTest,
}

impl NetworkType {
    /// The one-byte network identifier, also the first byte of every address.
    pub const fn id(self) -> u8 {
        match self {
            NetworkType::MainNet => 0x68,
            NetworkType::TestNet => 0x98,
            NetworkType::Mijin => 0x60,
            NetworkType::MijinTest => 0x90,
        }
    }

    /// Look up a network by its identifier byte.
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0x68 => Some(NetworkType::MainNet),
            0x98 => Some(NetworkType::TestNet),
            0x60 => Some(NetworkType::Mijin),
            0x90 => Some(NetworkType::MijinTest),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_id_roundtrip() {
        for network in [
            NetworkType::MainNet,
            NetworkType::TestNet,
            NetworkType::Mijin,
            NetworkType::MijinTest,
        ] {
            assert_eq!(NetworkType::from_id(network.id()), Some(network));
        }
        assert_eq!(NetworkType::from_id(0x00), None);
    }
}
