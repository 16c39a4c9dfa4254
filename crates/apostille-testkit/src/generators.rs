//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use apostille_core::{
    hash_function_for, HashingType, Keypair, MultisigInfo, PublicKey, TaggedPayload,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random public key.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate file content of at most `max_len` bytes.
pub fn content(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a non-empty filename.
pub fn filename() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,24}(\\.[a-z]{1,4})?".prop_map(String::from)
}

/// Generate a HashingType.
pub fn hashing_type() -> impl Strategy<Value = HashingType> {
    prop::sample::select(HashingType::ALL.to_vec())
}

/// Generate a flat JSON object suitable for metadata.
pub fn metadata() -> impl Strategy<Value = Value> {
    let value = prop_oneof![
        "[a-z ]{0,16}".prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ];
    prop::collection::btree_map("[a-z]{1,8}", value, 0..4)
        .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
}

/// Parameters for a signed payload.
#[derive(Debug, Clone)]
pub struct PayloadParams {
    pub owner: Keypair,
    pub data: Vec<u8>,
    pub hashing_type: HashingType,
}

impl PayloadParams {
    pub fn payload(&self) -> TaggedPayload {
        hash_function_for(self.hashing_type).signed_embed(&self.data, &self.owner)
    }
}

impl Arbitrary for PayloadParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (keypair(), content(512), hashing_type())
            .prop_map(|(owner, data, hashing_type)| PayloadParams {
                owner,
                data,
                hashing_type,
            })
            .boxed()
    }
}

/// An owner and a multisig state for some account.
///
/// The owner is sometimes among the cosignatories, sometimes the only one.
#[derive(Debug, Clone)]
pub struct MultisigParams {
    pub owner: Keypair,
    pub info: MultisigInfo,
}

impl Arbitrary for MultisigParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            keypair(),
            public_key(),                               // account
            prop::collection::vec(public_key(), 0..4),  // other cosignatories
            any::<bool>(),                              // owner is a cosignatory
            0u8..=4,                                    // min approval
        )
            .prop_map(|(owner, account, mut cosignatories, include_owner, min_approval)| {
                if include_owner {
                    cosignatories.insert(0, owner.public_key());
                }
                MultisigParams {
                    info: MultisigInfo {
                        account,
                        min_approval,
                        min_removal: min_approval,
                        cosignatories,
                    },
                    owner,
                }
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_payload_deterministic(params: PayloadParams) {
            prop_assert_eq!(params.payload(), params.payload());
        }

        #[test]
        fn test_payload_length_is_fixed(params: PayloadParams) {
            prop_assert_eq!(params.payload().to_bytes().len(), 4 + 1 + 64);
        }

        #[test]
        fn test_metadata_is_object(value in metadata()) {
            prop_assert!(value.is_object());
        }
    }
}
