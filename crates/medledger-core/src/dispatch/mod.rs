//! Command dispatch: the entry points a ledger runtime calls.
//!
//! `init` runs once when the ledger code is instantiated; `invoke` runs once
//! per transaction. Both resolve the call into a closed command, run it
//! against the handed-in ledger and fold the outcome into a [`Response`].

mod command;
mod response;


use crate::{
    config::Config,
    db::{
        DecodePolicy, KeyScheme, PatientDraft, get_patient_raw, patient_history, put_patient,
        put_raw, scan_patients,
    },
    error::Error,
    ledger::Ledger,
    obs::{
        CommandKind, MetricsEvent,
        sink::{self, Span},
    },
    record::{encode_history, encode_patient_set},
};
use tracing::{debug, instrument, warn};

// re-exports
pub use command::{Bootstrap, Command, CommandError};
pub use response::Response;

///
/// Dispatcher
///
/// Stateless between calls; holds only the key scheme and decode policy
/// it was configured with.
///

#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    scheme: KeyScheme,
    decode: DecodePolicy,
}

impl Dispatcher {
    #[must_use]
    pub const fn new(scheme: KeyScheme, decode: DecodePolicy) -> Self {
        Self { scheme, decode }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.key_scheme(), config.decode.policy)
    }

    /// Bootstrap entry point: store `(key, value)` from the raw arguments.
    #[instrument(level = "debug", skip_all, fields(tx_id = ledger.tx_id()))]
    pub fn init<L: Ledger>(&self, ledger: &mut L) -> Response {
        let bootstrap = match Bootstrap::parse(ledger.string_args()) {
            Ok(bootstrap) => bootstrap,
            Err(err) => {
                sink::record(MetricsEvent::CommandRejected);
                return finish(Bootstrap::NAME, Err(Error::from(err)));
            }
        };

        let mut span = Span::new(CommandKind::Init);
        let result = put_raw(ledger, &bootstrap.key, &bootstrap.value).map(|()| Vec::new());
        if result.is_ok() {
            span.succeed();
        }

        finish(Bootstrap::NAME, result)
    }

    /// Transaction entry point.
    #[instrument(level = "debug", skip_all, fields(tx_id = ledger.tx_id()))]
    pub fn invoke<L: Ledger>(&self, ledger: &mut L) -> Response {
        let (function, args) = ledger.function_and_parameters();

        // a rejected invocation never reaches execute, so it has no span
        let result = match Command::parse(&function, args) {
            Ok(command) => self.execute(ledger, command),
            Err(err) => {
                sink::record(MetricsEvent::CommandRejected);
                Err(Error::from(err))
            }
        };

        finish(&function, result)
    }

    /// Run an already-parsed command and encode its success payload.
    pub fn execute<L: Ledger>(&self, ledger: &mut L, command: Command) -> Result<Vec<u8>, Error> {
        let mut span = Span::new(command.kind());
        debug!(command = command.name(), "dispatching");

        let payload = match command {
            Command::InitPatient {
                mpi,
                first_name,
                last_name,
                files,
            } => {
                let draft = PatientDraft {
                    mpi,
                    first_name,
                    last_name,
                    files,
                };
                put_patient(ledger, &self.scheme, draft)?.mpi.into_bytes()
            }
            Command::GetPatient { mpi } => get_patient_raw(ledger, &mpi)?,
            Command::GetHistory { mpi } => {
                let history = patient_history(ledger, &mpi, self.decode)?;
                encode_history(&history)?
            }
            Command::GetAllPatients => {
                let set = scan_patients(ledger, &self.scheme.window(), self.decode)?;
                encode_patient_set(&set)?
            }
        };

        span.succeed();
        Ok(payload)
    }
}

fn finish(function: &str, result: Result<Vec<u8>, Error>) -> Response {
    match &result {
        Ok(payload) => debug!(function, bytes = payload.len(), "command succeeded"),
        Err(err) => warn!(function, error = %err.display_with_class(), "command failed"),
    }

    Response::from(result)
}
