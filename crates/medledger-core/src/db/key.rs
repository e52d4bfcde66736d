use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Default MPI prefix.
pub const DEFAULT_KEY_PREFIX: &str = "MPI";

/// Default maximum digit width bracketed by the legacy window.
pub const DEFAULT_DIGIT_WIDTH: usize = 11;

///
/// KeyError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum KeyError {
    #[error("MPI must not be empty")]
    Empty,

    #[error("MPI '{key}' does not match {prefix} followed by exactly {width} digits")]
    SchemeMismatch {
        key: String,
        prefix: String,
        width: usize,
    },
}

///
/// KeyWindow
///
/// Fixed scan window; `start` inclusive, `end` exclusive.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyWindow {
    pub start: String,
    pub end: String,
}

///
/// KeyScheme
///
/// How patient keys are laid out, and therefore which window brackets them.
///
/// `Legacy` accepts any MPI and scans `[prefix + "0", prefix + "9" * digit_width)`.
/// The comparison is byte-lexicographic, not numeric: a key equal to the end
/// bound, or one that extends it with more digits, falls outside the window.
///
/// `Padded` only admits `prefix` + exactly `width` digits, so the window
/// `[prefix + "0" * width, prefix + ":")` holds every admissible key.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyScheme {
    Legacy { prefix: String, digit_width: usize },
    Padded { prefix: String, width: usize },
}

impl Default for KeyScheme {
    fn default() -> Self {
        Self::Legacy {
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            digit_width: DEFAULT_DIGIT_WIDTH,
        }
    }
}

impl KeyScheme {
    #[must_use]
    pub fn window(&self) -> KeyWindow {
        match self {
            Self::Legacy {
                prefix,
                digit_width,
            } => KeyWindow {
                start: format!("{prefix}0"),
                end: format!("{prefix}{}", "9".repeat(*digit_width)),
            },
            // ':' is the byte after '9'
            Self::Padded { prefix, width } => KeyWindow {
                start: format!("{prefix}{}", "0".repeat(*width)),
                end: format!("{prefix}:"),
            },
        }
    }

    /// Validate a caller-supplied MPI against this scheme.
    pub fn check(&self, key: &str) -> Result<(), KeyError> {
        if key.is_empty() {
            return Err(KeyError::Empty);
        }

        match self {
            Self::Legacy { .. } => Ok(()),
            Self::Padded { prefix, width } => {
                let conforms = key.strip_prefix(prefix.as_str()).is_some_and(|digits| {
                    digits.len() == *width && digits.bytes().all(|b| b.is_ascii_digit())
                });

                if conforms {
                    Ok(())
                } else {
                    Err(KeyError::SchemeMismatch {
                        key: key.to_string(),
                        prefix: prefix.clone(),
                        width: *width,
                    })
                }
            }
        }
    }
}

///
/// KeySchemeKind
/// Config-facing selector for [`KeyScheme`].
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySchemeKind {
    #[default]
    Legacy,
    Padded,
}
