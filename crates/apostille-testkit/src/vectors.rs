//! Golden test vectors for deterministic verification.
//!
//! Digests are standard known answers. Payloads are signed by
//! [`OWNER_PRIVATE_KEY`](crate::fixtures::OWNER_PRIVATE_KEY); Ed25519 is
//! deterministic, so they are stable across implementations.

use apostille_core::{hash_function_for, AuditPayload, HashingType, Keypair};

use crate::fixtures::OWNER_PRIVATE_KEY;

/// Public key of the fixture owner.
pub const OWNER_PUBLIC_KEY: &str =
    "b12ccb90ad702ed3d93ef48d8189ea614f808f11aa21a2c3785da835665d257c";

/// Content notarized by every vector.
pub const CONTENT: &[u8] = b"aaaaaaaaa";

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    pub name: &'static str,
    pub hashing_type: HashingType,
    /// Expected digest of [`CONTENT`] (hex).
    pub expected_digest: &'static str,
    /// Expected payload for [`CONTENT`] under the fixture owner (hex).
    pub expected_payload: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "MD5",
            hashing_type: HashingType::Md5,
            expected_digest: "552e6a97297c53e592208cf97fbb3b60",
            expected_payload: "fe4e54598146fe868badf8499a457d11d31f04fe82a43e7a8e16203a4c756803\
                4340981e4fee1ca4cbbb14ea544b9378af1bbd1bb7517dc3e62d77953ffaf30224343ff001",
        },
        GoldenVector {
            name: "SHA-1",
            hashing_type: HashingType::Sha1,
            expected_digest: "2882f38e575101ba615f725af5e59bf2333a9a68",
            expected_payload: "fe4e54598230bce5f18a008b42cd4457ea757be5507e6bc3a1a126e7018fa46e\
                63a46125e0e64cbedcb110d938785b39fc0e689ba917364bfd870aaf3e22eaa5ba9572140c",
        },
        GoldenVector {
            name: "SHA-256",
            hashing_type: HashingType::Sha256,
            expected_digest: "f2aca93b80cae681221f0445fa4e2cae8a1f9f8fa1e1741d9639caad222f537d",
            expected_payload: "fe4e545983de27650cf6d449588d5ad127edfdb6eef461473b3cda1fd3eb2018\
                7ff4a310c78d49033b6a52d35ec0d0f4dab7ed89a25a02ac13338db472ba05e20100c7880c",
        },
        GoldenVector {
            name: "Keccak-256",
            hashing_type: HashingType::Keccak256,
            expected_digest: "d976263a31b7b5d986e429c3b54f529145fa4c6c09d2e3928c7057fdd3e706dd",
            expected_payload: "fe4e545988d992ddc3a976f9f23e25cd774d5133816d59bca2818c745aa2a8e0\
                6a837cadbd5f1ccf8628cd7ecb792b88c30030a3fe11e075edfd0e33137aa0d3398300a302",
        },
        GoldenVector {
            name: "Keccak-512",
            hashing_type: HashingType::Keccak512,
            expected_digest: "dc0e60230d7d6c6ac1c33ba7f8d7032a6f7402eebf26b033a592d7c68e91dafd\
                28e2d102f1539a36126103d247a7623e2632a025c3d59e99ab946fd6bb23ab62",
            expected_payload: "fe4e5459890df4375d21d3519ce8875c27942b90b20e9127e2d2f7461c719742\
                7acdcdd13469a69fac28cebea15bac487d0a198362f24d4f56b3223ecabbba5b1c0a84e607",
        },
        GoldenVector {
            name: "SHA3-256",
            hashing_type: HashingType::Sha3_256,
            expected_digest: "2ab7f2952296575c06c4e394cc0d3a75a58de42a9e2c845118d9642d925a3e2f",
            expected_payload: "fe4e5459909156398e82049892139358d154956f6acc2c82dad4f81de16b609a\
                23b41b47bb1514ee1ba650f29be32a0001b1ffc22ab88464d6e6a93478aa38d2803bbe510a",
        },
        GoldenVector {
            name: "SHA3-512",
            hashing_type: HashingType::Sha3_512,
            expected_digest: "a3e7785cd7e362825d9d7b786a283c5364e654e986f831a1ca7df57f4daf1713\
                2b8f4472363fd13706ffe62172f3bf7c2322559a71686b6bf5b3396bfea6b4ee",
            expected_payload: "fe4e545991371fc47d4e552fb6cd11ced089225b61e481ce0e0ed70d52d87d96\
                c254df8b98bfe70e7df4d40b21022e40f9a9a53f1bf868e9c268385cda86849c1957d87f0c",
        },
    ]
}

/// Check every vector. Returns the name of the first one that fails.
pub fn verify_all_vectors() -> Result<(), String> {
    let owner = Keypair::from_hex(OWNER_PRIVATE_KEY).map_err(|e| e.to_string())?;
    if owner.public_key().to_hex() != OWNER_PUBLIC_KEY {
        return Err("owner public key".into());
    }

    for vector in all_vectors() {
        let function = hash_function_for(vector.hashing_type);
        if hex::encode(function.hash(CONTENT)) != vector.expected_digest {
            return Err(format!("{}: digest", vector.name));
        }
        if function.signed_embed(CONTENT, &owner).to_hex() != vector.expected_payload {
            return Err(format!("{}: payload", vector.name));
        }
        if !AuditPayload::audit(CONTENT, vector.expected_payload, &owner.public_key()) {
            return Err(format!("{}: audit", vector.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        assert_eq!(verify_all_vectors(), Ok(()));
    }

    #[test]
    fn test_vectors_cover_every_hashing_type() {
        let covered: Vec<_> = all_vectors().iter().map(|v| v.hashing_type).collect();
        assert_eq!(covered, HashingType::ALL.to_vec());
    }

    #[test]
    fn test_legacy_payloads_parse_and_audit() {
        let owner = apostille_core::PublicKey::from_hex(OWNER_PUBLIC_KEY).unwrap();
        for vector in all_vectors().iter().filter(|v| v.hashing_type.is_legacy()) {
            let parsed = apostille_core::TaggedPayload::parse(vector.expected_payload).unwrap();
            assert_eq!(parsed.hashing_type(), vector.hashing_type);
            assert!(AuditPayload::audit(CONTENT, vector.expected_payload, &owner));
        }
    }

    #[test]
    fn test_vector_payload_rejects_other_content() {
        for vector in all_vectors() {
            let owner = apostille_core::PublicKey::from_hex(OWNER_PUBLIC_KEY).unwrap();
            assert!(!AuditPayload::audit(b"aaaaaaaab", vector.expected_payload, &owner));
        }
    }
}
