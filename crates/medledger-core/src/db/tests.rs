use super::*;
use crate::{
    error::{ErrorKind, ErrorOrigin},
    ledger::memory::{Faults, MemoryLedger},
    record::{Patient, decode_patient, encode_patient},
    test_support::{args, at, put_bytes},
};

fn draft(mpi: &str, first_name: &str) -> PatientDraft {
    PatientDraft {
        mpi: mpi.to_string(),
        first_name: first_name.to_string(),
        last_name: "Okafor".to_string(),
        files: "[]".to_string(),
    }
}

fn write(ledger: &mut MemoryLedger, scheme: &KeyScheme, mpi: &str, first_name: &str, second: i64) {
    let mut tx = ledger.begin(args(&["init_patient"]), at(second));
    put_patient(&mut tx, scheme, draft(mpi, first_name)).expect("write should succeed");
    tx.commit().expect("commit should succeed");
}

fn stored(ledger: &mut MemoryLedger, key: &str) -> Patient {
    let tx = ledger.begin(args(&["get_patient"]), at(100));
    let bytes = get_patient_raw(&tx, key).expect("patient should be readable");

    decode_patient(&bytes).expect("stored patient should decode")
}

fn scan(ledger: &mut MemoryLedger, scheme: &KeyScheme, policy: DecodePolicy) -> Vec<String> {
    let tx = ledger.begin(args(&["get_AllPatients"]), at(100));
    scan_patients(&tx, &scheme.window(), policy)
        .expect("scan should succeed")
        .into_iter()
        .map(|patient| patient.mpi)
        .collect()
}

//
// Key schemes
//

#[test]
fn legacy_window_brackets_prefix_plus_digits() {
    let window = KeyScheme::default().window();

    assert_eq!(window.start, "MPI0");
    assert_eq!(window.end, "MPI99999999999");
}

#[test]
fn padded_window_spans_every_conforming_key() {
    let scheme = KeyScheme::Padded {
        prefix: "MPI".into(),
        width: 4,
    };
    let window = scheme.window();

    assert_eq!(window.start, "MPI0000");
    assert_eq!(window.end, "MPI:");
    for key in ["MPI0000", "MPI0001", "MPI9999"] {
        assert!(
            window.start.as_str() <= key && key < window.end.as_str(),
            "{key} must fall inside the padded window"
        );
    }
}

#[test]
fn padded_scheme_checks_prefix_width_and_digits() {
    let scheme = KeyScheme::Padded {
        prefix: "MPI".into(),
        width: 4,
    };

    assert_eq!(scheme.check("MPI0042"), Ok(()));
    assert!(matches!(
        scheme.check("MPI42"),
        Err(KeyError::SchemeMismatch { .. })
    ));
    assert!(matches!(
        scheme.check("MPI00a2"),
        Err(KeyError::SchemeMismatch { .. })
    ));
    assert!(matches!(
        scheme.check("PAT0042"),
        Err(KeyError::SchemeMismatch { .. })
    ));
    assert_eq!(scheme.check(""), Err(KeyError::Empty));
}

#[test]
fn legacy_scheme_accepts_any_non_empty_key() {
    let scheme = KeyScheme::default();

    assert_eq!(scheme.check("anything-goes"), Ok(()));
    assert_eq!(scheme.check(""), Err(KeyError::Empty));
}

//
// Write / read
//

#[test]
fn write_stamps_created_date_from_transaction_timestamp() {
    let mut ledger = MemoryLedger::new();
    write(&mut ledger, &KeyScheme::default(), "MPI001", "Ada", 5);

    let patient = stored(&mut ledger, "MPI001");

    assert_eq!(patient.created_date, "2023-11-14T22:13:25Z");
    assert_eq!(patient.first_name, "Ada");
}

#[test]
fn write_replaces_every_field_of_the_previous_version() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::default();
    write(&mut ledger, &scheme, "MPI001", "A", 1);

    let mut tx = ledger.begin(args(&["init_patient"]), at(2));
    let mut second = draft("MPI001", "B");
    second.files = String::new();
    put_patient(&mut tx, &scheme, second).expect("overwrite should succeed");
    tx.commit().expect("commit should succeed");

    let patient = stored(&mut ledger, "MPI001");
    assert_eq!(patient.first_name, "B");
    assert_eq!(patient.files, "", "files must not be merged from the first version");
    assert_eq!(patient.created_date, "2023-11-14T22:13:22Z");
}

#[test]
fn write_rejects_empty_mpi_without_touching_the_ledger() {
    let mut ledger = MemoryLedger::new();
    let mut tx = ledger.begin(args(&["init_patient"]), at(1));

    let err = put_patient(&mut tx, &KeyScheme::default(), draft("", "Ada"))
        .expect_err("empty MPI must be rejected");

    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert_eq!(err.origin, ErrorOrigin::Write);
    assert_eq!(tx.pending_writes(), 0);
}

#[test]
fn write_surfaces_put_failure_as_ledger_io() {
    let mut ledger = MemoryLedger::new();
    ledger.set_faults(Faults {
        put: true,
        ..Faults::default()
    });
    let mut tx = ledger.begin(args(&["init_patient"]), at(1));

    let err = put_patient(&mut tx, &KeyScheme::default(), draft("MPI001", "Ada"))
        .expect_err("put failure must surface");

    assert_eq!(err.kind, ErrorKind::LedgerIo);
}

#[test]
fn read_returns_stored_bytes_verbatim() {
    let mut ledger = MemoryLedger::new();
    put_bytes(&mut ledger, "MPI001", b"{ \"MPI\" : \"MPI001\" }", 1);

    let tx = ledger.begin(args(&["get_patient"]), at(2));
    let raw = get_patient_raw(&tx, "MPI001").expect("raw read should succeed");

    assert_eq!(raw, b"{ \"MPI\" : \"MPI001\" }");
}

#[test]
fn read_of_absent_key_is_not_found() {
    let mut ledger = MemoryLedger::new();
    let tx = ledger.begin(args(&["get_patient"]), at(1));

    let err = get_patient_raw(&tx, "DOES-NOT-EXIST").expect_err("absent key must fail");

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.origin, ErrorOrigin::Read);
    assert_eq!(err.message, "asset not found: DOES-NOT-EXIST");
}

#[test]
fn read_surfaces_get_failure_as_ledger_io() {
    let mut ledger = MemoryLedger::new();
    ledger.set_faults(Faults {
        get: true,
        ..Faults::default()
    });
    let tx = ledger.begin(args(&["get_patient"]), at(1));

    let err = get_patient_raw(&tx, "MPI001").expect_err("get failure must surface");

    assert_eq!(err.kind, ErrorKind::LedgerIo);
}

//
// Range scan
//

#[test]
fn scan_returns_ascending_key_order_regardless_of_insertion_order() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::default();
    write(&mut ledger, &scheme, "MPI002", "Bo", 1);
    write(&mut ledger, &scheme, "MPI001", "Ada", 2);

    assert_eq!(
        scan(&mut ledger, &scheme, DecodePolicy::Mask),
        ["MPI001", "MPI002"]
    );
}

#[test]
fn scan_skips_keys_outside_the_window() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::default();
    write(&mut ledger, &scheme, "MPI001", "Ada", 1);
    write(&mut ledger, &scheme, "PAT001", "Cy", 2);
    put_bytes(&mut ledger, "a", b"10", 3);

    assert_eq!(scan(&mut ledger, &scheme, DecodePolicy::Mask), ["MPI001"]);
}

#[test]
fn legacy_window_excludes_keys_at_or_past_the_upper_bound() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::default();
    write(&mut ledger, &scheme, "MPI001", "Ada", 1);
    write(&mut ledger, &scheme, "MPI99999999999", "Edge", 2);
    write(&mut ledger, &scheme, "MPI999999999991", "Wide", 3);

    assert_eq!(scan(&mut ledger, &scheme, DecodePolicy::Mask), ["MPI001"]);
}

// Pins the legacy window defect: these are valid patients, yet the fixed
// lexicographic upper bound drops them. The padded scheme has no such gap.
#[test]
#[ignore = "legacy key window drops keys that reach its upper bound"]
fn legacy_window_returns_every_written_patient() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::default();
    write(&mut ledger, &scheme, "MPI001", "Ada", 1);
    write(&mut ledger, &scheme, "MPI99999999999", "Edge", 2);
    write(&mut ledger, &scheme, "MPI999999999991", "Wide", 3);

    assert_eq!(
        scan(&mut ledger, &scheme, DecodePolicy::Mask),
        ["MPI001", "MPI99999999999", "MPI999999999991"]
    );
}

#[test]
fn padded_scheme_returns_every_written_patient() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::Padded {
        prefix: "MPI".into(),
        width: 11,
    };
    for (second, key) in [(1, "MPI00000000001"), (2, "MPI99999999999"), (3, "MPI00000000042")] {
        write(&mut ledger, &scheme, key, "Ada", second);
    }

    assert_eq!(
        scan(&mut ledger, &scheme, DecodePolicy::Mask),
        ["MPI00000000001", "MPI00000000042", "MPI99999999999"]
    );
}

#[test]
fn padded_scheme_rejects_non_conforming_writes() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::Padded {
        prefix: "MPI".into(),
        width: 11,
    };
    let mut tx = ledger.begin(args(&["init_patient"]), at(1));

    let err = put_patient(&mut tx, &scheme, draft("MPI001", "Ada"))
        .expect_err("short MPI must be rejected");

    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert_eq!(tx.pending_writes(), 0);
}

#[test]
fn scan_masks_corrupt_rows_with_zero_records() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::default();
    write(&mut ledger, &scheme, "MPI001", "Ada", 1);
    put_bytes(&mut ledger, "MPI002", b"{broken", 2);
    write(&mut ledger, &scheme, "MPI003", "Cy", 3);

    let tx = ledger.begin(args(&["get_AllPatients"]), at(4));
    let set = scan_patients(&tx, &scheme.window(), DecodePolicy::Mask).expect("scan should mask");

    assert_eq!(set.len(), 3);
    assert_eq!(set[0].first_name, "Ada");
    assert_eq!(set[1], Patient::default());
    assert_eq!(set[2].first_name, "Cy");
}

#[test]
fn scan_aborts_on_corrupt_row_and_still_closes_the_cursor() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::default();
    write(&mut ledger, &scheme, "MPI001", "Ada", 1);
    put_bytes(&mut ledger, "MPI002", b"{broken", 2);
    write(&mut ledger, &scheme, "MPI003", "Cy", 3);

    {
        let tx = ledger.begin(args(&["get_AllPatients"]), at(4));
        let err = scan_patients(&tx, &scheme.window(), DecodePolicy::Abort)
            .expect_err("corrupt row must abort");

        assert_eq!(err.kind, ErrorKind::Decode);
        assert_eq!(err.origin, ErrorOrigin::Scan);
        assert!(err.message.contains("MPI002"), "unexpected error: {err:?}");
    }

    assert_eq!(ledger.opened_cursors(), 1);
    assert_eq!(ledger.open_cursors(), 0);
}

#[test]
fn scan_closes_the_cursor_when_iteration_fails() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::default();
    write(&mut ledger, &scheme, "MPI001", "Ada", 1);
    write(&mut ledger, &scheme, "MPI002", "Bo", 2);
    ledger.set_faults(Faults {
        cursor_after: Some(1),
        ..Faults::default()
    });

    {
        let tx = ledger.begin(args(&["get_AllPatients"]), at(3));
        let err = scan_patients(&tx, &scheme.window(), DecodePolicy::Mask)
            .expect_err("cursor failure must abort");
        assert_eq!(err.kind, ErrorKind::LedgerIo);
    }

    assert_eq!(ledger.open_cursors(), 0);
}

#[test]
fn scan_closes_the_cursor_on_success() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::default();
    write(&mut ledger, &scheme, "MPI001", "Ada", 1);

    scan(&mut ledger, &scheme, DecodePolicy::Mask);

    assert_eq!(ledger.opened_cursors(), 1);
    assert_eq!(ledger.open_cursors(), 0);
}

#[test]
fn scan_surfaces_range_query_failure() {
    let mut ledger = MemoryLedger::new();
    ledger.set_faults(Faults {
        range: true,
        ..Faults::default()
    });
    let tx = ledger.begin(args(&["get_AllPatients"]), at(1));

    let err = scan_patients(&tx, &KeyScheme::default().window(), DecodePolicy::Mask)
        .expect_err("range failure must surface");

    assert_eq!(err.kind, ErrorKind::LedgerIo);
}

//
// History
//

#[test]
fn history_lists_every_version_oldest_first() {
    let mut ledger = MemoryLedger::new();
    let scheme = KeyScheme::default();
    for (second, name) in [(1, "A"), (2, "B"), (3, "C")] {
        write(&mut ledger, &scheme, "MPI001", name, second);
    }

    let tx = ledger.begin(args(&["get_TxHisBypatId"]), at(4));
    let history = patient_history(&tx, "MPI001", DecodePolicy::Mask).expect("history should load");

    let names: Vec<&str> = history.iter().map(|e| e.value.first_name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
    assert_ne!(history[0].tx_id, history[1].tx_id);
    assert_ne!(history[1].tx_id, history[2].tx_id);
    assert_ne!(history[0].tx_id, history[2].tx_id);
}

#[test]
fn history_of_unknown_key_is_empty() {
    let mut ledger = MemoryLedger::new();
    let tx = ledger.begin(args(&["get_TxHisBypatId"]), at(1));

    let history = patient_history(&tx, "MPI404", DecodePolicy::Abort).expect("history should load");

    assert!(history.is_empty());
}

#[test]
fn history_substitutes_zero_record_for_deletion_markers() {
    let mut ledger = MemoryLedger::new();
    write(&mut ledger, &KeyScheme::default(), "MPI001", "Ada", 1);
    {
        let mut tx = ledger.begin(args(&["delete"]), at(2));
        tx.delete_state("MPI001");
        tx.commit().expect("delete should commit");
    }

    // Abort would fail on an empty payload if the marker were decoded.
    let tx = ledger.begin(args(&["get_TxHisBypatId"]), at(3));
    let history = patient_history(&tx, "MPI001", DecodePolicy::Abort).expect("history should load");

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].value.first_name, "Ada");
    assert_eq!(history[1].value, Patient::default());
}

#[test]
fn history_decode_failures_follow_the_policy() {
    let mut ledger = MemoryLedger::new();
    let good = encode_patient(&Patient {
        mpi: "MPI001".into(),
        first_name: "Ada".into(),
        ..Patient::default()
    })
    .expect("patient should encode");
    put_bytes(&mut ledger, "MPI001", b"[1,2", 1);
    put_bytes(&mut ledger, "MPI001", &good, 2);

    {
        let tx = ledger.begin(args(&["get_TxHisBypatId"]), at(3));
        let masked = patient_history(&tx, "MPI001", DecodePolicy::Mask).expect("mask keeps going");
        assert_eq!(masked[0].value, Patient::default());
        assert_eq!(masked[1].value.first_name, "Ada");

        let err = patient_history(&tx, "MPI001", DecodePolicy::Abort)
            .expect_err("abort must fail on the corrupt version");
        assert_eq!(err.kind, ErrorKind::Decode);
        assert_eq!(err.origin, ErrorOrigin::History);
    }

    assert_eq!(ledger.opened_cursors(), 2);
    assert_eq!(ledger.open_cursors(), 0);
}

#[test]
fn history_surfaces_query_and_cursor_failures() {
    let mut ledger = MemoryLedger::new();
    write(&mut ledger, &KeyScheme::default(), "MPI001", "Ada", 1);
    write(&mut ledger, &KeyScheme::default(), "MPI001", "Bo", 2);

    ledger.set_faults(Faults {
        history: true,
        ..Faults::default()
    });
    {
        let tx = ledger.begin(args(&["get_TxHisBypatId"]), at(3));
        let err = patient_history(&tx, "MPI001", DecodePolicy::Mask)
            .expect_err("history failure must surface");
        assert_eq!(err.kind, ErrorKind::LedgerIo);
    }

    ledger.set_faults(Faults {
        cursor_after: Some(1),
        ..Faults::default()
    });
    {
        let tx = ledger.begin(args(&["get_TxHisBypatId"]), at(4));
        let err = patient_history(&tx, "MPI001", DecodePolicy::Mask)
            .expect_err("cursor failure must surface");
        assert_eq!(err.kind, ErrorKind::LedgerIo);
    }

    assert_eq!(ledger.open_cursors(), 0);
}
