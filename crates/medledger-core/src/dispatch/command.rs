use crate::obs::CommandKind;
use thiserror::Error as ThisError;

///
/// CommandError
/// Rejections raised before any ledger call is made.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum CommandError {
    #[error("incorrect arguments for {command}: expected {expected}, found {found}")]
    ArgumentCount {
        command: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unknown command: '{name}'")]
    UnknownCommand { name: String },
}

///
/// Command
///
/// The closed set of invocations. Arity is checked while parsing, so a
/// constructed `Command` always carries exactly the arguments it needs.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    InitPatient {
        mpi: String,
        first_name: String,
        last_name: String,
        files: String,
    },
    GetPatient {
        mpi: String,
    },
    GetHistory {
        mpi: String,
    },
    GetAllPatients,
}

impl Command {
    pub const INIT_PATIENT: &'static str = "init_patient";
    pub const GET_PATIENT: &'static str = "get_patient";
    pub const GET_HISTORY: &'static str = "get_TxHisBypatId";
    pub const GET_ALL_PATIENTS: &'static str = "get_AllPatients";

    /// Resolve an invocation name and its positional arguments.
    pub fn parse(name: &str, args: Vec<String>) -> Result<Self, CommandError> {
        match name {
            Self::INIT_PATIENT => {
                let [mpi, first_name, last_name, files] =
                    take_args::<4>(Self::INIT_PATIENT, args)?;
                Ok(Self::InitPatient {
                    mpi,
                    first_name,
                    last_name,
                    files,
                })
            }
            Self::GET_PATIENT => {
                let [mpi] = take_args::<1>(Self::GET_PATIENT, args)?;
                Ok(Self::GetPatient { mpi })
            }
            Self::GET_HISTORY => {
                let [mpi] = take_args::<1>(Self::GET_HISTORY, args)?;
                Ok(Self::GetHistory { mpi })
            }
            Self::GET_ALL_PATIENTS => {
                take_args::<0>(Self::GET_ALL_PATIENTS, args)?;
                Ok(Self::GetAllPatients)
            }
            _ => Err(CommandError::UnknownCommand {
                name: name.to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InitPatient { .. } => Self::INIT_PATIENT,
            Self::GetPatient { .. } => Self::GET_PATIENT,
            Self::GetHistory { .. } => Self::GET_HISTORY,
            Self::GetAllPatients => Self::GET_ALL_PATIENTS,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::InitPatient { .. } => CommandKind::Write,
            Self::GetPatient { .. } => CommandKind::Read,
            Self::GetHistory { .. } => CommandKind::History,
            Self::GetAllPatients => CommandKind::Scan,
        }
    }
}

///
/// Bootstrap
/// Arguments of the one-off `init` call: a key and the value stored under it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bootstrap {
    pub key: String,
    pub value: String,
}

impl Bootstrap {
    pub const NAME: &'static str = "init";

    pub fn parse(args: Vec<String>) -> Result<Self, CommandError> {
        let [key, value] = take_args::<2>(Self::NAME, args)?;

        Ok(Self { key, value })
    }
}

fn take_args<const N: usize>(
    command: &'static str,
    args: Vec<String>,
) -> Result<[String; N], CommandError> {
    let found = args.len();

    <[String; N]>::try_from(args).map_err(|_| CommandError::ArgumentCount {
        command,
        expected: N,
        found,
    })
}
