use crate::serialize::SerializeError;
use serde::{Serialize, de::DeserializeOwned};

pub(super) fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializeError> {
    serde_json::to_vec(value).map_err(|err| SerializeError::Serialize(err.to_string()))
}

// trailing non-whitespace is rejected by serde_json
pub(super) fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializeError> {
    serde_json::from_slice(bytes).map_err(|err| SerializeError::Deserialize(err.to_string()))
}
