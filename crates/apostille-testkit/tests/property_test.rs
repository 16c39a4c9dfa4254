//! Property tests over payloads, account derivation, and sign types.

use proptest::prelude::*;

use apostille::NotarizationAccount;
use apostille_core::{
    AuditPayload, HashingType, Keypair, NetworkType, SignType, TaggedPayload, PAYLOAD_PREFIX,
};
use apostille_testkit::generators::{content, filename, keypair, MultisigParams, PayloadParams};

proptest! {
    #[test]
    fn payload_round_trips_through_hex(params: PayloadParams) {
        let payload = params.payload();
        let parsed = TaggedPayload::parse(&payload.to_hex()).unwrap();

        prop_assert_eq!(parsed.hashing_type(), params.hashing_type);
        prop_assert_eq!(&parsed, &payload);
        prop_assert!(AuditPayload::audit(&params.data, &payload.to_hex(), &params.owner.public_key()));
    }

    #[test]
    fn audit_detects_changed_content(params: PayloadParams, other in content(512)) {
        prop_assume!(other != params.data);
        let payload = params.payload().to_hex();
        prop_assert!(!AuditPayload::audit(&other, &payload, &params.owner.public_key()));
    }

    #[test]
    fn audit_detects_other_owner(params: PayloadParams, other in keypair()) {
        prop_assume!(other.public_key() != params.owner.public_key());
        let payload = params.payload().to_hex();
        prop_assert!(!AuditPayload::audit(&params.data, &payload, &other.public_key()));
    }

    #[test]
    fn audit_detects_flipped_signature_bit(params: PayloadParams, index in 5usize..69, bit in 0u8..8) {
        let mut bytes = params.payload().to_bytes();
        bytes[index] ^= 1 << bit;
        prop_assert!(!AuditPayload::audit(&params.data, &hex::encode(bytes), &params.owner.public_key()));
    }

    #[test]
    fn parse_rejects_missing_prefix(bytes in prop::collection::vec(any::<u8>(), 0..80), owner in keypair()) {
        prop_assume!(!bytes.starts_with(&PAYLOAD_PREFIX));
        let text = hex::encode(bytes);
        prop_assert!(TaggedPayload::parse(&text).is_err());
        prop_assert!(!AuditPayload::audit(b"content", &text, &owner.public_key()));
    }

    #[test]
    fn parse_rejects_unknown_code(code in any::<u8>(), tail in prop::collection::vec(any::<u8>(), 64)) {
        prop_assume!(HashingType::from_code(code).is_err());
        let mut bytes = PAYLOAD_PREFIX.to_vec();
        bytes.push(code);
        bytes.extend(tail);
        let text = hex::encode(bytes);
        prop_assert!(TaggedPayload::parse(&text).is_err());
        prop_assert!(!AuditPayload::audit(b"content", &text, &Keypair::from_seed(&[code; 32]).public_key()));
    }

    #[test]
    fn parse_rejects_non_hex(text in "[g-z]{1,40}") {
        prop_assert!(TaggedPayload::parse(&text).is_err());
        prop_assert!(!TaggedPayload::has_prefix(&text));
    }

    #[test]
    fn account_derivation_is_deterministic(owner in keypair(), name in filename()) {
        let a = NotarizationAccount::derive(&name, &owner, NetworkType::MijinTest).unwrap();
        let b = NotarizationAccount::derive(&name, &owner, NetworkType::MijinTest).unwrap();
        prop_assert_eq!(a.public_key(), b.public_key());
        prop_assert!(a.keypair().is_some());
    }

    #[test]
    fn account_derivation_separates_files(owner in keypair(), first in filename(), second in filename()) {
        prop_assume!(first != second);
        let a = NotarizationAccount::derive(&first, &owner, NetworkType::MijinTest).unwrap();
        let b = NotarizationAccount::derive(&second, &owner, NetworkType::MijinTest).unwrap();
        prop_assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn account_derivation_separates_owners(first in keypair(), second in keypair(), name in filename()) {
        prop_assume!(first.public_key() != second.public_key());
        let a = NotarizationAccount::derive(&name, &first, NetworkType::MijinTest).unwrap();
        let b = NotarizationAccount::derive(&name, &second, NetworkType::MijinTest).unwrap();
        prop_assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn sign_type_matches_multisig_state(params: MultisigParams) {
        let owner = params.owner.public_key();
        let info = &params.info;
        let expected = if info.cosignatories.is_empty() {
            SignType::ApostilleAccountOnly
        } else if info.min_approval <= 1 && info.cosignatories == vec![owner] {
            SignType::SingleCosignatoryOnly
        } else {
            SignType::NeedOtherCosignatory
        };
        prop_assert_eq!(SignType::classify(Some(info), &owner), expected);
        prop_assert_eq!(SignType::classify(None, &owner), SignType::ApostilleAccountOnly);
    }
}
