//! Compact id codec through the public API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use category_tree::codec::{self, TOKEN_LEN};
use category_tree::{ByteOrder, CompactId, CompactIdCodec, DecodeError};

#[test]
fn test_boundary_values_round_trip() {
    for value in [0u128, 1, u128::MAX, u128::MAX - 1, 1 << 127] {
        let id = Uuid::from_u128(value);
        let token = codec::encode(id);
        assert_eq!(token.len(), TOKEN_LEN);
        assert_eq!(codec::decode(&token).unwrap(), id);
    }
}

#[test]
fn test_short_inputs_are_errors() {
    // 16 and 18 characters pad out to invalid base64, never a silent nil id
    assert!(codec::decode("YXNkZmFzZGZhZGZh").is_err());
    assert!(codec::decode("YXNkZmFzZGZhZGZh-_").is_err());
}

#[test]
fn test_raw_standard_alphabet_accepted() {
    let id = Uuid::from_bytes([0xfb, 0xff, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(codec::decode("+/8AAAAAAAAAAAAAAAAAAA").unwrap(), id);
    assert_eq!(codec::encode(id), "-_8AAAAAAAAAAAAAAAAAAA");
}

#[test]
fn test_padding_in_input_rejected() {
    let err = codec::decode("AAAAAAAAAAAAAAAAAAAAAA==").unwrap_err();
    assert_eq!(err, DecodeError::TooLong { len: 24 });
}

#[test]
fn test_mixed_endian_matches_guid_layout() {
    let guid = Uuid::parse_str("6f1c2a9e-3b4d-4c1e-9a7f-0d2b5e8c1a33").unwrap();
    let mixed = CompactIdCodec::new(ByteOrder::MixedEndian);
    let token = mixed.encode(guid);
    assert_ne!(token, codec::encode(guid));
    assert_eq!(mixed.decode(&token).unwrap(), guid);
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct CategoryLink {
    id: CompactId,
    name: String,
}

#[test]
fn test_compact_id_in_payload() {
    let link = CategoryLink {
        id: CompactId(Uuid::parse_str("6f1c2a9e-3b4d-4c1e-9a7f-0d2b5e8c1a33").unwrap()),
        name: "Electronics".to_string(),
    };
    let json = serde_json::to_string(&link).unwrap();
    assert_eq!(json, r#"{"id":"bxwqnjtNTB6afw0rXowaMw","name":"Electronics"}"#);
    let back: CategoryLink = serde_json::from_str(&json).unwrap();
    assert_eq!(back, link);
}
