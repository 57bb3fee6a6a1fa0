//! Compact identifier codec
//!
//! A 128-bit id is written as 22 URL-safe base64 characters with the
//! padding stripped:
//!
//! ```text
//! 00000000-0000-0000-0000-000000000000  <->  AAAAAAAAAAAAAAAAAAAAAA
//! ffffffff-ffff-ffff-ffff-ffffffffffff  <->  _____________________w
//! ```
//!
//! Decoding goes through fixed stack buffers only: the token is normalized
//! into 24 standard-alphabet characters (right-padded with `=`), then
//! decoded into a byte array that must come out at exactly 16 bytes.

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::{DecodeSliceError, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// Characters in an encoded token
pub const TOKEN_LEN: usize = 22;

/// Characters fed to the standard decoder after padding
const PADDED_LEN: usize = 24;

/// Bytes in a decoded identifier
const ID_BYTES: usize = 16;

/// Upper bound on bytes decoded from `PADDED_LEN` characters
const DECODE_BUF: usize = 18;

/// Standard alphabet with canonical padding; stray bits after the last
/// decoded byte are dropped
const DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("token too long: {len} characters, expected at most 22")]
    TooLong { len: usize },

    #[error("token contains non-ASCII characters")]
    NonAscii,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token decoded to {len} bytes, expected 16")]
    Length { len: usize },
}

/// How the 16 decoded bytes map onto the identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByteOrder {
    /// Bytes in RFC 4122 field order
    #[default]
    Rfc4122,
    /// First three fields little-endian, as laid out by .NET `Guid`
    MixedEndian,
}

/// Encoder/decoder between [`Uuid`] and compact tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactIdCodec {
    byte_order: ByteOrder,
}

impl CompactIdCodec {
    pub fn new(byte_order: ByteOrder) -> Self {
        Self { byte_order }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Encode `id` as a 22-character token
    pub fn encode(&self, id: Uuid) -> String {
        let bytes = match self.byte_order {
            ByteOrder::Rfc4122 => *id.as_bytes(),
            ByteOrder::MixedEndian => id.to_bytes_le(),
        };
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Decode a token of at most 22 characters
    pub fn decode(&self, token: &str) -> Result<Uuid, DecodeError> {
        let input = token.as_bytes();
        if input.len() > TOKEN_LEN {
            return Err(DecodeError::TooLong { len: input.len() });
        }
        if !token.is_ascii() {
            return Err(DecodeError::NonAscii);
        }

        let mut padded = [b'='; PADDED_LEN];
        for (slot, &c) in padded.iter_mut().zip(input) {
            *slot = match c {
                b'-' => b'+',
                b'_' => b'/',
                other => other,
            };
        }

        let mut decoded = [0u8; DECODE_BUF];
        let len = DECODER
            .decode_slice(padded, &mut decoded)
            .map_err(|e| match e {
                DecodeSliceError::DecodeError(inner) => DecodeError::Base64(inner),
                DecodeSliceError::OutputSliceTooSmall => DecodeError::Length { len: DECODE_BUF },
            })?;

        if len != ID_BYTES {
            return Err(DecodeError::Length { len });
        }

        let mut bytes = [0u8; ID_BYTES];
        bytes.copy_from_slice(&decoded[..ID_BYTES]);
        Ok(match self.byte_order {
            ByteOrder::Rfc4122 => Uuid::from_bytes(bytes),
            ByteOrder::MixedEndian => Uuid::from_bytes_le(bytes),
        })
    }
}

/// Encode with the default (RFC 4122) byte order
pub fn encode(id: Uuid) -> String {
    CompactIdCodec::default().encode(id)
}

/// Decode with the default (RFC 4122) byte order
pub fn decode(token: &str) -> Result<Uuid, DecodeError> {
    CompactIdCodec::default().decode(token)
}

/// A [`Uuid`] that displays, parses and serializes as its compact token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompactId(pub Uuid);

impl CompactId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for CompactId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<CompactId> for Uuid {
    fn from(id: CompactId) -> Self {
        id.0
    }
}

impl fmt::Display for CompactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self.0))
    }
}

impl FromStr for CompactId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s).map(Self)
    }
}

impl Serialize for CompactId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(self.0))
    }
}

impl<'de> Deserialize<'de> for CompactId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}
