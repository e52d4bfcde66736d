use crate::{
    dispatch::CommandError, ledger::LedgerError, record::DecodeError, serialize::SerializeError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Invocation-level error with a stable kind + origin classification.
/// Only `message` crosses the wire; kind and origin exist for callers and
/// tests that need to branch on the failure.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Construct a wrong-arity error for a named command.
    pub fn argument_count(command: &str, expected: usize, found: usize) -> Self {
        Self::new(
            ErrorKind::ArgumentCount,
            ErrorOrigin::Dispatch,
            format!("incorrect arguments for {command}: expected {expected}, found {found}"),
        )
    }

    pub fn unknown_command(name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownCommand,
            ErrorOrigin::Dispatch,
            format!("unknown command: '{name}'"),
        )
    }

    pub fn invalid_argument(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, origin, message)
    }

    pub fn not_found(key: &str) -> Self {
        Self::new(
            ErrorKind::NotFound,
            ErrorOrigin::Read,
            format!("asset not found: {key}"),
        )
    }

    /// Construct a decode failure for the record stored under `key`.
    pub fn decode(origin: ErrorOrigin, key: &str, err: &DecodeError) -> Self {
        Self::new(
            ErrorKind::Decode,
            origin,
            format!("record under key '{key}' is corrupt: {err}"),
        )
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.kind, self.message)
    }
}

impl From<LedgerError> for Error {
    fn from(err: LedgerError) -> Self {
        Self::new(ErrorKind::LedgerIo, ErrorOrigin::Ledger, err.to_string())
    }
}

impl From<SerializeError> for Error {
    fn from(err: SerializeError) -> Self {
        Self::new(ErrorKind::Encode, ErrorOrigin::Serialize, err.to_string())
    }
}

impl From<CommandError> for Error {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::ArgumentCount {
                command,
                expected,
                found,
            } => Self::argument_count(command, expected, found),
            CommandError::UnknownCommand { name } => Self::unknown_command(&name),
        }
    }
}

///
/// ErrorKind
/// Failure taxonomy surfaced to callers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    ArgumentCount,
    InvalidArgument,
    UnknownCommand,
    NotFound,
    LedgerIo,
    Decode,
    Encode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ArgumentCount => "argument_count",
            Self::InvalidArgument => "invalid_argument",
            Self::UnknownCommand => "unknown_command",
            Self::NotFound => "not_found",
            Self::LedgerIo => "ledger_io",
            Self::Decode => "decode",
            Self::Encode => "encode",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Subsystem that raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Dispatch,
    Write,
    Read,
    Scan,
    History,
    Ledger,
    Serialize,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Dispatch => "dispatch",
            Self::Write => "write",
            Self::Read => "read",
            Self::Scan => "scan",
            Self::History => "history",
            Self::Ledger => "ledger",
            Self::Serialize => "serialize",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
