//! The injectable serializer capability for the persistent backend.
//!
//! The disk backend never chooses a wire encoding itself; it routes every
//! write and read through a [`ValueCodec`]. The contract is a strict
//! round-trip: `decode(encode(v)) == v` for every supported value type, with
//! the same codec used on both sides. Decoding into a type other than the
//! one encoded must fail with an error, not produce garbage.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Encode/decode failures from a [`ValueCodec`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),
}

/// A byte encoding for cached values.
pub trait ValueCodec {
    /// Encode a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes into a value.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// JSON codec, the default encoding for persistent entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
