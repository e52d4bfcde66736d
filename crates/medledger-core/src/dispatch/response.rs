use crate::error::Error;

///
/// Response
///
/// Outcome handed back to the ledger runtime. A failure carries only a
/// human-readable message; the runtime rejects the transaction and applies
/// none of its writes.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    Success(Vec<u8>),
    Failure(String),
}

impl Response {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Success(bytes) => Some(bytes),
            Self::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }
}

impl From<Result<Vec<u8>, Error>> for Response {
    fn from(result: Result<Vec<u8>, Error>) -> Self {
        match result {
            Ok(bytes) => Self::Success(bytes),
            Err(err) => Self::Failure(err.message),
        }
    }
}
