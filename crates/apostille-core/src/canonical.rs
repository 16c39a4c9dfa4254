//! Canonical CBOR encoding of transactions.
//!
//! Follows RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats
//!
//! Signatures and transaction hashes are computed over these bytes, so the
//! same envelope must encode identically everywhere.

use ciborium::value::Value;

use crate::address::Address;
use crate::crypto::PublicKey;
use crate::transaction::{
    AccountMetadataTransaction, AggregateTransaction, HashLockTransaction, InnerTransaction,
    Mosaic, MultisigModificationTransaction, Transaction, TransactionEnvelope,
    TransferTransaction,
};
use crate::types::GenerationHash;

/// Envelope field keys.
mod keys {
    pub const NETWORK: u64 = 0;
    pub const DEADLINE: u64 = 1;
    pub const MAX_FEE: u64 = 2;
    pub const BODY: u64 = 3;

    pub const TYPE: u64 = 0;
    pub const SIGNER: u64 = 1;
}

/// Encode an envelope to canonical CBOR bytes.
pub fn canonical_bytes(envelope: &TransactionEnvelope) -> Vec<u8> {
    let value = Value::Map(vec![
        entry(keys::NETWORK, Value::Integer(envelope.network.id().into())),
        entry(keys::DEADLINE, Value::Integer(envelope.deadline.millis().into())),
        entry(keys::MAX_FEE, Value::Integer(envelope.max_fee.into())),
        entry(keys::BODY, transaction_to_value(&envelope.transaction)),
    ]);
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &value);
    buf
}

/// The bytes a signer signs: `generation_hash || canonical_bytes(envelope)`.
pub fn signing_message(envelope: &TransactionEnvelope, generation_hash: &GenerationHash) -> Vec<u8> {
    let mut buf = generation_hash.as_bytes().to_vec();
    buf.extend_from_slice(&canonical_bytes(envelope));
    buf
}

fn entry(key: u64, value: Value) -> (Value, Value) {
    (Value::Integer(key.into()), value)
}

fn transaction_to_value(transaction: &Transaction) -> Value {
    let type_code = Value::Integer(transaction.transaction_type().code().into());
    let mut entries = vec![entry(keys::TYPE, type_code)];

    match transaction {
        Transaction::Transfer(TransferTransaction {
            recipient,
            mosaics,
            message,
        }) => {
            entries.push(entry(2, address_value(recipient)));
            entries.push(entry(3, Value::Array(mosaics.iter().map(mosaic_value).collect())));
            entries.push(entry(4, Value::Text(message.payload().to_string())));
        }
        Transaction::Aggregate(AggregateTransaction { inner, .. }) => {
            entries.push(entry(2, Value::Array(inner.iter().map(inner_value).collect())));
        }
        Transaction::MultisigModification(MultisigModificationTransaction {
            min_approval_delta,
            min_removal_delta,
            additions,
            deletions,
        }) => {
            entries.push(entry(2, Value::Integer((*min_approval_delta).into())));
            entries.push(entry(3, Value::Integer((*min_removal_delta).into())));
            entries.push(entry(4, Value::Array(additions.iter().map(key_value).collect())));
            entries.push(entry(5, Value::Array(deletions.iter().map(key_value).collect())));
        }
        Transaction::HashLock(HashLockTransaction {
            mosaic,
            duration,
            hash,
        }) => {
            entries.push(entry(2, mosaic_value(mosaic)));
            entries.push(entry(3, Value::Integer((*duration).into())));
            entries.push(entry(4, Value::Bytes(hash.as_bytes().to_vec())));
        }
        Transaction::AccountMetadata(AccountMetadataTransaction {
            target,
            scoped_key,
            value,
        }) => {
            entries.push(entry(2, key_value(target)));
            entries.push(entry(3, Value::Integer((*scoped_key).into())));
            entries.push(entry(4, Value::Text(value.clone())));
        }
    }

    Value::Map(entries)
}

fn inner_value(inner: &InnerTransaction) -> Value {
    Value::Map(vec![
        entry(keys::TYPE, transaction_to_value(&inner.transaction)),
        entry(keys::SIGNER, key_value(&inner.signer)),
    ])
}

fn address_value(address: &Address) -> Value {
    Value::Bytes(address.as_bytes().to_vec())
}

fn key_value(key: &PublicKey) -> Value {
    Value::Bytes(key.as_bytes().to_vec())
}

fn mosaic_value(mosaic: &Mosaic) -> Value {
    Value::Array(vec![
        Value::Integer(mosaic.id.0.into()),
        Value::Integer(mosaic.amount.into()),
    ])
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        _ => unreachable!("transaction encoder only produces integers, bytes, text, arrays and maps"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n) as u64;
        encode_uint(buf, 1, abs);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item);
    }
}

/// Encode a map with keys sorted by their encoded bytes.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut key_value_pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, key_value_pairs.len() as u64);
    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::network::NetworkType;
    use crate::transaction::{AggregateKind, Deadline, Message};

    fn sample_envelope(message: &str) -> TransactionEnvelope {
        let signer = Keypair::from_seed(&[5u8; 32]).public_key();
        let recipient = Address::from_public_key(&signer, NetworkType::MijinTest);
        let transfer = Transaction::Transfer(TransferTransaction {
            recipient,
            mosaics: vec![],
            message: Message::plain(message),
        });
        TransactionEnvelope::new(
            NetworkType::MijinTest,
            Deadline(1_000),
            0,
            Transaction::Aggregate(AggregateTransaction {
                kind: AggregateKind::Complete,
                inner: vec![transfer.into_inner(signer)],
            }),
        )
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let envelope = sample_envelope("fe4e5459");
        assert_eq!(canonical_bytes(&envelope), canonical_bytes(&envelope.clone()));
    }

    #[test]
    fn test_encoding_covers_message() {
        assert_ne!(
            canonical_bytes(&sample_envelope("a")),
            canonical_bytes(&sample_envelope("b"))
        );
    }

    #[test]
    fn test_encoding_is_valid_cbor() {
        let bytes = canonical_bytes(&sample_envelope("hello"));
        let decoded: Value = ciborium::from_reader(bytes.as_slice()).unwrap();
        assert!(matches!(decoded, Value::Map(ref m) if m.len() == 4));
    }

    #[test]
    fn test_signing_message_binds_generation_hash() {
        let envelope = sample_envelope("x");
        let a = signing_message(&envelope, &GenerationHash::ZERO);
        let b = signing_message(&envelope, &GenerationHash::from_bytes([1u8; 32]));
        assert_ne!(a, b);
        assert_eq!(&a[32..], canonical_bytes(&envelope).as_slice());
    }

    #[test]
    fn test_negative_integers() {
        let mut buf = Vec::new();
        encode_integer(&mut buf, (-1i8).into());
        assert_eq!(buf, vec![0x20]);
    }
}
