use crate::{
    db::KeyScheme,
    error::{Error, ErrorKind, ErrorOrigin},
    ledger::{Ledger, LedgerError},
    record::{Patient, encode_patient},
};
use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing::{debug, instrument};

///
/// PatientDraft
/// Caller-supplied fields of a patient write.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PatientDraft {
    pub mpi: String,
    pub first_name: String,
    pub last_name: String,
    pub files: String,
}

/// Upsert a patient under its MPI.
///
/// `CreatedDate` is the transaction's recorded timestamp in RFC 3339 UTC, so
/// every replica evaluating the transaction writes the same bytes. The whole
/// record is replaced; no field of a previous version survives.
#[instrument(level = "debug", skip_all, fields(mpi = %draft.mpi))]
pub fn put_patient<L: Ledger>(
    ledger: &mut L,
    scheme: &KeyScheme,
    draft: PatientDraft,
) -> Result<Patient, Error> {
    scheme
        .check(&draft.mpi)
        .map_err(|err| Error::invalid_argument(ErrorOrigin::Write, err.to_string()))?;

    let created_date = ledger
        .tx_timestamp()?
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|err| LedgerError::Timestamp {
            reason: err.to_string(),
        })?;

    let patient = Patient {
        mpi: draft.mpi,
        first_name: draft.first_name,
        last_name: draft.last_name,
        files: draft.files,
        created_date,
    };

    let bytes = encode_patient(&patient)?;
    ledger.put_state(&patient.mpi, bytes)?;
    debug!(tx_id = ledger.tx_id(), "patient written");

    Ok(patient)
}

/// Store `value` verbatim under `key`. Bootstrap path only.
#[instrument(level = "debug", skip(ledger, value))]
pub fn put_raw<L: Ledger>(ledger: &mut L, key: &str, value: &str) -> Result<(), Error> {
    ledger.put_state(key, value.as_bytes().to_vec()).map_err(|err| {
        debug!(error = %err, "bootstrap put failed");
        Error::new(
            ErrorKind::LedgerIo,
            ErrorOrigin::Ledger,
            format!("failed to create asset: {key}"),
        )
    })
}
