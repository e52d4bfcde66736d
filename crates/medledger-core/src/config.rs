//! Runtime configuration, loaded from TOML.
//!
//! Every section and field is optional; omitted values take the defaults
//! that reproduce the historical key window and decode behaviour.

use crate::db::{
    DEFAULT_DIGIT_WIDTH, DEFAULT_KEY_PREFIX, DecodePolicy, KeyScheme, KeySchemeKind,
};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scan: ScanConfig,
    pub decode: DecodeConfig,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.prefix.is_empty() {
            return Err(ConfigError::Invalid("scan.prefix must not be empty".into()));
        }

        let (field, width) = match self.scan.scheme {
            KeySchemeKind::Legacy => ("scan.digit_width", self.scan.digit_width),
            KeySchemeKind::Padded => ("scan.width", self.scan.width),
        };
        if width == 0 {
            return Err(ConfigError::Invalid(format!("{field} must be at least 1")));
        }

        Ok(())
    }

    #[must_use]
    pub fn key_scheme(&self) -> KeyScheme {
        let prefix = self.scan.prefix.clone();

        match self.scan.scheme {
            KeySchemeKind::Legacy => KeyScheme::Legacy {
                prefix,
                digit_width: self.scan.digit_width,
            },
            KeySchemeKind::Padded => KeyScheme::Padded {
                prefix,
                width: self.scan.width,
            },
        }
    }
}

///
/// ScanConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub scheme: KeySchemeKind,
    pub prefix: String,
    /// Legacy window: widest digit run bracketed by the upper bound.
    pub digit_width: usize,
    /// Padded scheme: exact digit count of every MPI.
    pub width: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scheme: KeySchemeKind::default(),
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            digit_width: DEFAULT_DIGIT_WIDTH,
            width: DEFAULT_DIGIT_WIDTH,
        }
    }
}

///
/// DecodeConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    pub policy: DecodePolicy,
}

///
/// TESTS
///
