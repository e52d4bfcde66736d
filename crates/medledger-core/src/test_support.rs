use crate::{
    dispatch::{Dispatcher, Response},
    ledger::{Ledger, memory::MemoryLedger},
};
use time::OffsetDateTime;

/// Base instant for test transaction timestamps (2023-11-14T22:13:20Z).
pub(crate) const BASE_UNIX_SECONDS: i64 = 1_700_000_000;

pub(crate) fn at(second: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(BASE_UNIX_SECONDS + second)
        .expect("test timestamp should be in range")
}

pub(crate) fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Run one invocation in its own transaction, committing only on success.
pub(crate) fn invoke(
    ledger: &mut MemoryLedger,
    dispatcher: &Dispatcher,
    values: &[&str],
    second: i64,
) -> Response {
    let mut tx = ledger.begin(args(values), at(second));
    let response = dispatcher.invoke(&mut tx);
    if response.is_success() {
        tx.commit().expect("test commit should succeed");
    }

    response
}

/// Run the bootstrap call in its own transaction, committing only on success.
pub(crate) fn init(
    ledger: &mut MemoryLedger,
    dispatcher: &Dispatcher,
    values: &[&str],
) -> Response {
    let mut tx = ledger.begin(args(values), at(0));
    let response = dispatcher.init(&mut tx);
    if response.is_success() {
        tx.commit().expect("test commit should succeed");
    }

    response
}

/// Success payload as JSON.
pub(crate) fn json(response: &Response) -> serde_json::Value {
    let payload = response
        .payload()
        .unwrap_or_else(|| panic!("expected success, got {response:?}"));

    serde_json::from_slice(payload).expect("payload should be JSON")
}

pub(crate) fn write_patient(
    ledger: &mut MemoryLedger,
    dispatcher: &Dispatcher,
    mpi: &str,
    first_name: &str,
    second: i64,
) {
    let response = invoke(
        ledger,
        dispatcher,
        &["init_patient", mpi, first_name, "Okafor", "[]"],
        second,
    );
    assert_eq!(response, Response::Success(mpi.as_bytes().to_vec()));
}

/// Commit raw bytes under `key`, bypassing the record codec.
pub(crate) fn put_bytes(ledger: &mut MemoryLedger, key: &str, bytes: &[u8], second: i64) {
    let mut tx = ledger.begin(args(&["raw"]), at(second));
    tx.put_state(key, bytes.to_vec())
        .expect("raw put should succeed");
    tx.commit().expect("raw commit should succeed");
}
