use crate::{
    db::{DecodePolicy, KeyWindow},
    error::{Error, ErrorOrigin},
    ledger::{KeyValue, Ledger, ScopedCursor},
    obs::sink::{self, MetricsEvent},
    record::PatientSet,
};
use tracing::{debug, instrument};

/// Collect every patient whose key falls inside `window`, in ledger order.
///
/// The range cursor is closed on every exit path: explicitly on success, by
/// `ScopedCursor`'s drop on any early return.
#[instrument(level = "debug", skip(ledger), fields(start = %window.start, end = %window.end))]
pub fn scan_patients<L: Ledger>(
    ledger: &L,
    window: &KeyWindow,
    policy: DecodePolicy,
) -> Result<PatientSet, Error> {
    let mut cursor = ScopedCursor::new(ledger.state_by_range(&window.start, &window.end)?, "range");
    let mut patients = Vec::new();

    while let Some(KeyValue { key, value }) = cursor.next_entry()? {
        debug!(%key, "scanned patient");
        patients.push(policy.decode(ErrorOrigin::Scan, &key, &value)?);
    }
    cursor.finish()?;

    sink::record(MetricsEvent::RowsScanned {
        rows: patients.len() as u64,
    });
    debug!(rows = patients.len(), "scan complete");

    Ok(PatientSet::new(patients))
}
