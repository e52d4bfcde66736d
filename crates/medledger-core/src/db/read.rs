use crate::{error::Error, ledger::Ledger};
use tracing::instrument;

/// Raw stored bytes for `key`, returned verbatim.
#[instrument(level = "debug", skip(ledger))]
pub fn get_patient_raw<L: Ledger>(ledger: &L, key: &str) -> Result<Vec<u8>, Error> {
    ledger
        .get_state(key)?
        .ok_or_else(|| Error::not_found(key))
}
