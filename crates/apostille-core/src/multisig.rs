//! Multisig configuration and sign-type classification.

use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;

/// An account's multisig configuration as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigInfo {
    /// The multisig account.
    pub account: PublicKey,
    /// Cosignatures required to approve a transaction.
    pub min_approval: u8,
    /// Cosignatures required to remove a cosignatory.
    pub min_removal: u8,
    /// Keys allowed to cosign for the account.
    pub cosignatories: Vec<PublicKey>,
}

impl MultisigInfo {
    /// Whether the account has been converted to multisig.
    pub fn is_multisig(&self) -> bool {
        !self.cosignatories.is_empty()
    }
}

/// How a notarization account has to be signed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignType {
    /// The owner is the only cosignatory and one approval suffices.
    SingleCosignatoryOnly,
    /// The account is not multisig; its own key controls it.
    ApostilleAccountOnly,
    /// Another cosignatory must approve; needs a bonded aggregate.
    NeedOtherCosignatory,
}

impl SignType {
    /// Classify an account's multisig state relative to `owner`.
    ///
    /// `None` means the ledger has no multisig entry for the account.
    pub fn classify(info: Option<&MultisigInfo>, owner: &PublicKey) -> Self {
        match info {
            None => SignType::ApostilleAccountOnly,
            Some(info) if !info.is_multisig() => SignType::ApostilleAccountOnly,
            Some(info)
                if info.min_approval <= 1 && info.cosignatories == [*owner] =>
            {
                SignType::SingleCosignatoryOnly
            }
            Some(_) => SignType::NeedOtherCosignatory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn key(seed: u8) -> PublicKey {
        Keypair::from_seed(&[seed; 32]).public_key()
    }

    fn info(min_approval: u8, cosignatories: Vec<PublicKey>) -> MultisigInfo {
        MultisigInfo {
            account: key(0),
            min_approval,
            min_removal: min_approval,
            cosignatories,
        }
    }

    #[test]
    fn test_not_multisig() {
        let owner = key(1);
        assert_eq!(SignType::classify(None, &owner), SignType::ApostilleAccountOnly);
        assert_eq!(
            SignType::classify(Some(&info(0, vec![])), &owner),
            SignType::ApostilleAccountOnly
        );
    }

    #[test]
    fn test_owner_single_cosignatory() {
        let owner = key(1);
        assert_eq!(
            SignType::classify(Some(&info(1, vec![owner])), &owner),
            SignType::SingleCosignatoryOnly
        );
    }

    #[test]
    fn test_other_cosignatory_needed() {
        let owner = key(1);
        let other = key(2);
        assert_eq!(
            SignType::classify(Some(&info(2, vec![owner, other])), &owner),
            SignType::NeedOtherCosignatory
        );
        assert_eq!(
            SignType::classify(Some(&info(1, vec![owner, other])), &owner),
            SignType::NeedOtherCosignatory
        );
        assert_eq!(
            SignType::classify(Some(&info(1, vec![other])), &owner),
            SignType::NeedOtherCosignatory
        );
        assert_eq!(
            SignType::classify(Some(&info(2, vec![owner])), &owner),
            SignType::NeedOtherCosignatory
        );
    }
}
