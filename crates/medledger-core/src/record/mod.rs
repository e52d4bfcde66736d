//! Patient record types and their wire codec.
//!
//! Field names on the wire are fixed (`MPI`, `FName`, `LName`, `Files`,
//! `CreatedDate`); Rust-side names are free to follow Rust conventions.

mod codec;


use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Deserializer, Serialize};

// re-exports
pub use codec::{
    DecodeError, MAX_VALUE_BYTES, decode_patient, encode_history, encode_patient,
    encode_patient_set,
};

///
/// Patient
///
/// A patient identity record, addressed on the ledger by its `MPI`.
/// Absent or `null` fields decode to the empty string.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Patient {
    #[serde(rename = "MPI", deserialize_with = "nullable_string")]
    pub mpi: String,

    #[serde(rename = "FName", deserialize_with = "nullable_string")]
    pub first_name: String,

    #[serde(rename = "LName", deserialize_with = "nullable_string")]
    pub last_name: String,

    /// Flattened attachment list; opaque to this crate.
    #[serde(rename = "Files", deserialize_with = "nullable_string")]
    pub files: String,

    #[serde(rename = "CreatedDate", deserialize_with = "nullable_string")]
    pub created_date: String,
}

///
/// HistoryEntry
///
/// One committed version of a key: the transaction that wrote it and the
/// record snapshot it left behind.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HistoryEntry {
    #[serde(rename = "txId")]
    pub tx_id: String,

    pub value: Patient,
}

///
/// PatientSet
///
/// Aggregate scan result, in the order the ledger yielded the keys.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, IntoIterator, PartialEq, Serialize)]
pub struct PatientSet {
    #[serde(default, deserialize_with = "nullable_vec")]
    patients: Vec<Patient>,
}

impl PatientSet {
    #[must_use]
    pub const fn new(patients: Vec<Patient>) -> Self {
        Self { patients }
    }
}

// Go-style clients encode missing strings as `null`.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_vec<'de, D>(deserializer: D) -> Result<Vec<Patient>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Patient>>::deserialize(deserializer)?.unwrap_or_default())
}
