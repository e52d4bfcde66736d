use crate::{
    error::{Error, ErrorOrigin},
    obs::sink::{self, MetricsEvent},
    record::{Patient, decode_patient},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

///
/// DecodePolicy
///
/// What an aggregating read does with a stored value that fails to decode.
///
/// `Mask` substitutes the zero record, logs a warning and counts the event.
/// `Abort` fails the whole query.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    #[default]
    Mask,
    Abort,
}

impl DecodePolicy {
    pub(crate) fn decode(self, origin: ErrorOrigin, key: &str, bytes: &[u8]) -> Result<Patient, Error> {
        match decode_patient(bytes) {
            Ok(patient) => Ok(patient),
            Err(err) => match self {
                Self::Mask => {
                    warn!(%origin, key, error = %err, "masking undecodable record with zero record");
                    sink::record(MetricsEvent::DecodeMasked { origin });

                    Ok(Patient::default())
                }
                Self::Abort => Err(Error::decode(origin, key, &err)),
            },
        }
    }
}
