//! Patient record operations over a [`Ledger`](crate::ledger::Ledger).
//!
//! Each operation runs inside the single ledger transaction it is handed
//! and keeps no state between calls.

mod decode;
mod history;
mod key;
mod read;
mod scan;
mod write;

#[cfg(test)]
mod tests;

// re-exports
pub use decode::DecodePolicy;
pub use history::patient_history;
pub use key::{
    DEFAULT_DIGIT_WIDTH, DEFAULT_KEY_PREFIX, KeyError, KeyScheme, KeySchemeKind, KeyWindow,
};
pub use read::get_patient_raw;
pub use scan::scan_patients;
pub use write::{PatientDraft, put_patient, put_raw};
