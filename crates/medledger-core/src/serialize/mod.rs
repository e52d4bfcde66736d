//! JSON encoding shared by every stored and returned payload.
//!
//! Only format concerns live here. Size limits are passed in by the record
//! layer (`record::codec`), which owns them.

mod json;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("payload of {len} bytes exceeds the {max_bytes} byte limit")]
    TooLarge { len: usize, max_bytes: usize },
}

pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializeError> {
    json::to_bytes(value)
}

/// Decode `bytes`, refusing anything longer than `max_bytes` before parsing.
pub fn deserialize_bounded<T: DeserializeOwned>(
    bytes: &[u8],
    max_bytes: usize,
) -> Result<T, SerializeError> {
    if bytes.len() > max_bytes {
        return Err(SerializeError::TooLarge {
            len: bytes.len(),
            max_bytes,
        });
    }

    json::from_bytes(bytes)
}

///
/// TESTS
///
