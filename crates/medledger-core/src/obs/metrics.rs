use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventReport
/// Ephemeral, in-memory counters for command executions.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub commands: BTreeMap<String, CommandCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Entrypoints
    pub init_calls: u64,
    pub write_calls: u64,
    pub read_calls: u64,
    pub scan_calls: u64,
    pub history_calls: u64,
    pub failures: u64,
    /// Invocations refused before dispatch: bad arity or unknown name.
    pub rejected: u64,

    // Rows touched
    pub rows_scanned: u64,
    pub history_entries: u64,

    // Masked decode failures, all origins
    pub decode_masked: u64,
}

///
/// CommandCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CommandCounters {
    pub calls: u64,
    pub failures: u64,
    /// Invocations refused before dispatch: bad arity or unknown name.
    pub rejected: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventReport> = RefCell::new(EventReport::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventReport) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventReport) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventReport::default());
}
