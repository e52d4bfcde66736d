//! In-process reference ledger.
//!
//! Stands in for the ledger runtime in tests and in the developer CLI:
//! committed state, per-key version history, transaction-scoped buffered
//! writes, and fault hooks for exercising failure paths.

use crate::ledger::{KeyModification, KeyValue, Ledger, LedgerCursor, LedgerError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    cell::Cell,
    collections::{BTreeMap, VecDeque},
    fmt::Write as _,
    ops::Bound,
    rc::Rc,
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// Faults
///
/// Failure injection for the reference ledger. Every flag is off by default.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Faults {
    pub put: bool,
    pub get: bool,
    pub range: bool,
    pub history: bool,
    /// Cursors fail on the read after yielding this many entries.
    pub cursor_after: Option<usize>,
    pub close: bool,
}

#[derive(Debug, Default)]
struct CursorStats {
    opened: Cell<usize>,
    closed: Cell<usize>,
}

///
/// Version
/// One committed write; `value` is `None` for a deletion marker.
/// `timestamp` is the recorded RFC 3339 transaction time, kept in the
/// snapshot for inspection.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
struct Version {
    tx_id: String,
    timestamp: String,
    value: Option<Vec<u8>>,
}

///
/// MemoryLedger
///

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MemoryLedger {
    state: BTreeMap<String, Vec<u8>>,
    history: BTreeMap<String, Vec<Version>>,
    sequence: u64,

    #[serde(skip)]
    faults: Faults,

    #[serde(skip)]
    cursors: Rc<CursorStats>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction. `args` is the raw argument list, function name
    /// first for invocations.
    pub fn begin(&mut self, args: Vec<String>, timestamp: OffsetDateTime) -> MemoryTx<'_> {
        self.sequence = self.sequence.saturating_add(1);
        let tx_id = derive_tx_id(self.sequence, &args, timestamp);

        MemoryTx {
            ledger: self,
            tx_id,
            timestamp,
            args,
            writes: BTreeMap::new(),
        }
    }

    pub const fn set_faults(&mut self, faults: Faults) {
        self.faults = faults;
    }

    /// Committed value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.state.get(key).map(Vec::as_slice)
    }

    /// Number of committed versions recorded for `key`.
    #[must_use]
    pub fn version_count(&self, key: &str) -> usize {
        self.history.get(key).map_or(0, Vec::len)
    }

    /// Number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Cursors handed out and not yet closed.
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.cursors
            .opened
            .get()
            .saturating_sub(self.cursors.closed.get())
    }

    #[must_use]
    pub fn opened_cursors(&self) -> usize {
        self.cursors.opened.get()
    }

    fn cursor<T>(&self, label: &'static str, entries: VecDeque<T>) -> MemoryCursor<T> {
        self.cursors.opened.set(self.cursors.opened.get() + 1);

        MemoryCursor {
            entries,
            label,
            yielded: 0,
            fail_after: self.faults.cursor_after,
            fail_close: self.faults.close,
            stats: Rc::clone(&self.cursors),
            closed: false,
        }
    }
}

// Stable across replicas: depends only on the transaction's own inputs.
fn derive_tx_id(sequence: u64, args: &[String], timestamp: OffsetDateTime) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sequence.to_be_bytes());
    for arg in args {
        hasher.update((arg.len() as u64).to_be_bytes());
        hasher.update(arg.as_bytes());
    }
    hasher.update(timestamp.unix_timestamp_nanos().to_be_bytes());

    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

///
/// MemoryTx
///
/// One transaction against a [`MemoryLedger`]. Writes are buffered and only
/// become visible on [`MemoryTx::commit`]; dropping the transaction discards
/// them. Reads see committed state only.
///

pub struct MemoryTx<'a> {
    ledger: &'a mut MemoryLedger,
    tx_id: String,
    timestamp: OffsetDateTime,
    args: Vec<String>,
    writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl MemoryTx<'_> {
    /// Record a deletion marker for `key`. Not reachable through the
    /// patient commands; exists so history readers can be exercised against
    /// deleted versions.
    pub fn delete_state(&mut self, key: &str) {
        self.writes.insert(key.to_string(), None);
    }

    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Apply buffered writes and append one version per written key.
    pub fn commit(self) -> Result<String, LedgerError> {
        let timestamp = self
            .timestamp
            .format(&Rfc3339)
            .map_err(|err| LedgerError::Timestamp {
                reason: err.to_string(),
            })?;

        for (key, value) in self.writes {
            match &value {
                Some(bytes) => self.ledger.state.insert(key.clone(), bytes.clone()),
                None => self.ledger.state.remove(&key),
            };

            self.ledger.history.entry(key).or_default().push(Version {
                tx_id: self.tx_id.clone(),
                timestamp: timestamp.clone(),
                value,
            });
        }

        Ok(self.tx_id)
    }
}

impl Ledger for MemoryTx<'_> {
    type RangeCursor = MemoryCursor<KeyValue>;
    type HistoryCursor = MemoryCursor<KeyModification>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        if self.ledger.faults.put {
            return Err(LedgerError::Put {
                key: key.to_string(),
                reason: "injected put failure".to_string(),
            });
        }

        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        if self.ledger.faults.get {
            return Err(LedgerError::Get {
                key: key.to_string(),
                reason: "injected get failure".to_string(),
            });
        }

        Ok(self.ledger.state.get(key).cloned())
    }

    fn state_by_range(&self, start: &str, end: &str) -> Result<Self::RangeCursor, LedgerError> {
        if self.ledger.faults.range {
            return Err(LedgerError::Range {
                start: start.to_string(),
                end: end.to_string(),
                reason: "injected range failure".to_string(),
            });
        }

        // Empty end means unbounded; an inverted window is empty.
        let entries = if !end.is_empty() && start >= end {
            VecDeque::new()
        } else {
            let upper = if end.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Excluded(end)
            };

            self.ledger
                .state
                .range::<str, _>((Bound::Included(start), upper))
                .map(|(key, value)| KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect()
        };

        Ok(self.ledger.cursor("range", entries))
    }

    fn history_for_key(&self, key: &str) -> Result<Self::HistoryCursor, LedgerError> {
        if self.ledger.faults.history {
            return Err(LedgerError::History {
                key: key.to_string(),
                reason: "injected history failure".to_string(),
            });
        }

        let entries = self
            .ledger
            .history
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|version| KeyModification {
                tx_id: version.tx_id.clone(),
                value: version.value.clone().unwrap_or_default(),
                is_delete: version.value.is_none(),
            })
            .collect::<VecDeque<_>>();

        Ok(self.ledger.cursor("history", entries))
    }

    fn string_args(&self) -> Vec<String> {
        self.args.clone()
    }

    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> Result<OffsetDateTime, LedgerError> {
        Ok(self.timestamp)
    }
}

///
/// MemoryCursor
/// Pre-materialized cursor; counts opens and closes on the owning ledger.
///

pub struct MemoryCursor<T> {
    entries: VecDeque<T>,
    label: &'static str,
    yielded: usize,
    fail_after: Option<usize>,
    fail_close: bool,
    stats: Rc<CursorStats>,
    closed: bool,
}

impl<T> LedgerCursor for MemoryCursor<T> {
    type Item = T;

    fn next_entry(&mut self) -> Result<Option<T>, LedgerError> {
        if self.fail_after.is_some_and(|limit| self.yielded >= limit) {
            return Err(LedgerError::Cursor {
                label: self.label,
                reason: format!("injected failure after {} entries", self.yielded),
            });
        }

        let next = self.entries.pop_front();
        if next.is_some() {
            self.yielded += 1;
        }

        Ok(next)
    }

    fn close(&mut self) -> Result<(), LedgerError> {
        if !self.closed {
            self.closed = true;
            self.stats.closed.set(self.stats.closed.get() + 1);
        }

        if self.fail_close {
            return Err(LedgerError::Cursor {
                label: self.label,
                reason: "injected close failure".to_string(),
            });
        }

        Ok(())
    }
}
