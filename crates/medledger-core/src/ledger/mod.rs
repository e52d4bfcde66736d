//! Ledger capability surface.
//!
//! The ledger runtime owns ordering, consensus, isolation and durability.
//! This crate only sees the narrow capability below, handed in once per
//! transaction.

mod cursor;
pub mod memory;


use thiserror::Error as ThisError;
use time::OffsetDateTime;

// re-exports
pub use cursor::ScopedCursor;

///
/// LedgerError
///
/// Failure reported by the ledger runtime for one capability call.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum LedgerError {
    #[error("failed to set asset '{key}': {reason}")]
    Put { key: String, reason: String },

    #[error("failed to get asset '{key}': {reason}")]
    Get { key: String, reason: String },

    #[error("range query ['{start}', '{end}') failed: {reason}")]
    Range {
        start: String,
        end: String,
        reason: String,
    },

    #[error("history query for '{key}' failed: {reason}")]
    History { key: String, reason: String },

    #[error("{label} cursor failed: {reason}")]
    Cursor { label: &'static str, reason: String },

    #[error("transaction timestamp unavailable: {reason}")]
    Timestamp { reason: String },
}

///
/// KeyValue
/// One entry yielded by a range cursor.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

///
/// KeyModification
/// One committed version of a key, as yielded by a history cursor.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyModification {
    pub tx_id: String,
    pub value: Vec<u8>,
    pub is_delete: bool,
}

///
/// LedgerCursor
///
/// Scoped cursor over a range or history query. Holders must call `close`
/// exactly once; wrap in [`ScopedCursor`] to get that on every exit path.
///

pub trait LedgerCursor {
    type Item;

    fn next_entry(&mut self) -> Result<Option<Self::Item>, LedgerError>;

    fn close(&mut self) -> Result<(), LedgerError>;
}

///
/// Ledger
///
/// Per-transaction capability handle.
///
/// - `state_by_range` treats `start` as inclusive and `end` as exclusive,
///   yielding keys in ascending byte order.
/// - `history_for_key` yields versions oldest first.
/// - `tx_timestamp` is the client-supplied timestamp recorded with the
///   transaction; it is identical on every replica that evaluates it.
///

pub trait Ledger {
    type RangeCursor: LedgerCursor<Item = KeyValue>;
    type HistoryCursor: LedgerCursor<Item = KeyModification>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    fn state_by_range(&self, start: &str, end: &str) -> Result<Self::RangeCursor, LedgerError>;

    fn history_for_key(&self, key: &str) -> Result<Self::HistoryCursor, LedgerError>;

    /// All transaction arguments as strings, function name included.
    fn string_args(&self) -> Vec<String>;

    /// First argument as the function name, the rest as its parameters.
    fn function_and_parameters(&self) -> (String, Vec<String>) {
        let mut args = self.string_args().into_iter();
        let function = args.next().unwrap_or_default();

        (function, args.collect())
    }

    fn tx_id(&self) -> &str;

    fn tx_timestamp(&self) -> Result<OffsetDateTime, LedgerError>;
}
