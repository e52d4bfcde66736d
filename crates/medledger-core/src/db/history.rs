use crate::{
    db::DecodePolicy,
    error::{Error, ErrorOrigin},
    ledger::{Ledger, ScopedCursor},
    obs::sink::{self, MetricsEvent},
    record::{HistoryEntry, Patient},
};
use tracing::{debug, instrument};

/// Every committed version of `key`, oldest first, as the ledger yields it.
///
/// Deletion markers become the zero record without a decode attempt.
#[instrument(level = "debug", skip(ledger, policy))]
pub fn patient_history<L: Ledger>(
    ledger: &L,
    key: &str,
    policy: DecodePolicy,
) -> Result<Vec<HistoryEntry>, Error> {
    let mut cursor = ScopedCursor::new(ledger.history_for_key(key)?, "history");
    let mut entries = Vec::new();

    while let Some(modification) = cursor.next_entry()? {
        let value = if modification.is_delete {
            Patient::default()
        } else {
            policy.decode(ErrorOrigin::History, key, &modification.value)?
        };

        entries.push(HistoryEntry {
            tx_id: modification.tx_id,
            value,
        });
    }
    cursor.finish()?;

    sink::record(MetricsEvent::HistoryRead {
        entries: entries.len() as u64,
    });
    debug!(entries = entries.len(), "history complete");

    Ok(entries)
}
