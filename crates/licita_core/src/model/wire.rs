//! Decoding helpers for ledger payload values.

use crate::error::{CoreError, CoreResult};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum UintRepr {
    Number(u64),
    Text(String),
}

/// Ledger integers arrive either as JSON numbers or as decimal strings.
pub(crate) fn de_u128<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    match UintRepr::deserialize(deserializer)? {
        UintRepr::Number(value) => Ok(u128::from(value)),
        UintRepr::Text(text) => text
            .trim()
            .parse::<u128>()
            .map_err(|_| D::Error::custom(format!("invalid unsigned integer `{text}`"))),
    }
}

pub(crate) fn de_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = de_u128(deserializer)?;
    u64::try_from(value).map_err(|_| D::Error::custom(format!("integer {value} exceeds u64")))
}

pub(crate) fn de_u8<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = de_u128(deserializer)?;
    u8::try_from(value).map_err(|_| D::Error::custom(format!("integer {value} exceeds u8")))
}

/// Decodes a ledger value into a wire record, labelling failures with `what`.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, what: &str) -> CoreResult<T> {
    serde_json::from_value(value)
        .map_err(|err| CoreError::InvalidData(format!("malformed {what}: {err}")))
}
