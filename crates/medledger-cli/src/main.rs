//! Run patient-ledger commands against a local JSON snapshot.
//!
//! Each invocation is one transaction: the snapshot is loaded, the command
//! runs against a fresh transaction, and the snapshot is written back only
//! when the command succeeds.

use clap::{Parser, Subcommand};
use medledger_core::{
    config::{Config, ConfigError},
    dispatch::{Dispatcher, Response},
    ledger::{LedgerError, memory::MemoryLedger},
    obs::metrics_report,
};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};
use thiserror::Error as ThisError;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MEDLEDGER_LOG";

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "medledger", version, about = "Patient records on a versioned ledger")]
struct Cli {
    /// Ledger snapshot; created on the first successful command.
    #[arg(long, env = "MEDLEDGER_STATE", default_value = "medledger-state.json")]
    state: PathBuf,

    /// TOML configuration file.
    #[arg(long, env = "MEDLEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Transaction timestamp (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    timestamp: Option<OffsetDateTime>,

    /// Print the metrics report as JSON to stderr after the command.
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Store a value verbatim under a key (one-off bootstrap).
    Init { key: String, value: String },

    /// Invoke a named function with positional arguments.
    Invoke {
        function: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

///
/// CliError
///

#[derive(Debug, ThisError)]
enum CliError {
    #[error("failed to read state file '{path}': {source}")]
    ReadState {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write state file '{path}': {source}")]
    WriteState {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("state file '{path}' is not a valid snapshot: {source}")]
    Snapshot {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let code = match run(&cli) {
        Ok(response) => match response.message() {
            None => ExitCode::SUCCESS,
            Some(message) => {
                eprintln!("{message}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    };

    if cli.metrics {
        match serde_json::to_string_pretty(&metrics_report()) {
            Ok(report) => eprintln!("{report}"),
            Err(err) => eprintln!("error: failed to encode metrics: {err}"),
        }
    }

    code
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<Response, CliError> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let dispatcher = Dispatcher::from_config(&config);
    let timestamp = cli.timestamp.unwrap_or_else(OffsetDateTime::now_utc);

    let mut ledger = load_state(&cli.state)?;
    let response = match &cli.command {
        CliCommand::Init { key, value } => {
            let mut tx = ledger.begin(vec![key.clone(), value.clone()], timestamp);
            let response = dispatcher.init(&mut tx);
            if response.is_success() {
                tx.commit()?;
            }
            response
        }
        CliCommand::Invoke { function, args } => {
            let mut values = Vec::with_capacity(args.len() + 1);
            values.push(function.clone());
            values.extend(args.iter().cloned());

            let mut tx = ledger.begin(values, timestamp);
            let response = dispatcher.invoke(&mut tx);
            if response.is_success() {
                let tx_id = tx.commit()?;
                info!(%tx_id, %function, "transaction committed");
            }
            response
        }
    };

    if let Some(payload) = response.payload() {
        save_state(&cli.state, &ledger)?;

        let mut stdout = io::stdout().lock();
        stdout.write_all(payload).map_err(CliError::Output)?;
        if !payload.is_empty() {
            stdout.write_all(b"\n").map_err(CliError::Output)?;
        }
    }

    Ok(response)
}

fn load_state(path: &Path) -> Result<MemoryLedger, CliError> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot, starting from an empty ledger");
        return Ok(MemoryLedger::new());
    }

    let bytes = fs::read(path).map_err(|source| CliError::ReadState {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| CliError::Snapshot {
        path: path.display().to_string(),
        source,
    })
}

// Written to a sibling file and renamed into place, so a crash mid-write
// leaves the previous snapshot intact.
fn save_state(path: &Path, ledger: &MemoryLedger) -> Result<(), CliError> {
    let write_error = |source: io::Error| CliError::WriteState {
        path: path.display().to_string(),
        source,
    };

    let bytes = serde_json::to_vec_pretty(ledger).map_err(|source| CliError::Snapshot {
        path: path.display().to_string(),
        source,
    })?;

    let tmp = staging_path(path);
    fs::write(&tmp, bytes).map_err(write_error)?;
    fs::rename(&tmp, path).map_err(write_error)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");

    PathBuf::from(name)
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|err| format!("expected RFC 3339: {err}"))
}

///
/// TESTS
///
