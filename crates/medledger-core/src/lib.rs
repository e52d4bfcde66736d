//! Core runtime for MedLedger: patient record codec, ledger capability
//! surface, write/read/scan/history operations, and the command dispatcher
//! that a ledger runtime calls once per transaction.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod obs;
pub mod record;
pub mod serialize;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary and the dispatcher entry points.
///

pub mod prelude {
    pub use crate::{
        config::Config,
        db::{DecodePolicy, KeyScheme},
        dispatch::{Command, Dispatcher, Response},
        error::{Error, ErrorKind},
        ledger::Ledger,
        record::{HistoryEntry, Patient, PatientSet},
    };
}
