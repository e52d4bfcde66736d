use crate::{
    record::{HistoryEntry, Patient, PatientSet},
    serialize::{SerializeError, deserialize_bounded, serialize},
};
use thiserror::Error as ThisError;

///
/// Record Codec
///
/// Record-specific wrappers over the generic JSON helpers.
///
/// Policy lives here:
/// - the size limit for one stored record
/// - mapping format failures into `DecodeError`
///

/// Max encoded bytes accepted for a single stored record.
pub const MAX_VALUE_BYTES: usize = 4 * 1024 * 1024;

///
/// DecodeError
/// Stored bytes that could not be turned back into a record.
///

#[derive(Debug, ThisError)]
pub enum DecodeError {
    #[error("record failed to deserialize: {source}")]
    Deserialize {
        #[source]
        source: SerializeError,
    },
}

/// Encode a patient into its canonical stored form.
pub fn encode_patient(patient: &Patient) -> Result<Vec<u8>, SerializeError> {
    serialize(patient)
}

/// Decode stored bytes into a patient.
pub fn decode_patient(bytes: &[u8]) -> Result<Patient, DecodeError> {
    deserialize_bounded(bytes, MAX_VALUE_BYTES).map_err(|source| DecodeError::Deserialize { source })
}

/// Encode a scan result as `{"patients":[...]}`.
pub fn encode_patient_set(set: &PatientSet) -> Result<Vec<u8>, SerializeError> {
    serialize(set)
}

/// Encode a history as a JSON array of `{"txId", "value"}` objects.
pub fn encode_history(entries: &[HistoryEntry]) -> Result<Vec<u8>, SerializeError> {
    serialize(&entries)
}
