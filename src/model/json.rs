//! Helpers for the loose decode strategy: interpret a `serde_json::Value`
//! as an object and pull typed fields out of it.

use crate::error::{Error, ParsingError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use url::Url;

/// Interpret a payload as a JSON object.
///
/// Loose decodes start here; anything else is a malformed payload.
pub(crate) fn as_object(value: &Value) -> Result<&Map<String, Value>, Error> {
    value.as_object().ok_or(Error::JsonParsing)
}

/// A key that must be present.
pub(crate) fn required<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Value, ParsingError> {
    object
        .get(key)
        .ok_or_else(|| ParsingError::KeyMissing(key.to_string()))
}

/// A key that must be present and hold a string.
pub(crate) fn required_str<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str, ParsingError> {
    required(object, key)?
        .as_str()
        .ok_or(ParsingError::DataNotCorrectFormat)
}

/// A key that must be present and hold a parseable URL.
pub(crate) fn required_url(object: &Map<String, Value>, key: &str) -> Result<Url, ParsingError> {
    Url::parse(required_str(object, key)?).map_err(|_| ParsingError::DataNotCorrectFormat)
}

pub(crate) fn optional_str(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key)?.as_str().map(str::to_string)
}

pub(crate) fn optional_url(object: &Map<String, Value>, key: &str) -> Option<Url> {
    Url::parse(object.get(key)?.as_str()?).ok()
}

pub(crate) fn optional_u64(object: &Map<String, Value>, key: &str) -> Option<u64> {
    object.get(key)?.as_u64()
}

pub(crate) fn optional_bool(object: &Map<String, Value>, key: &str) -> Option<bool> {
    object.get(key)?.as_bool()
}

/// A millisecond epoch timestamp, as the server reports build times.
pub(crate) fn optional_timestamp(
    object: &Map<String, Value>,
    key: &str,
) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(object.get(key)?.as_i64()?)
}

/// An array-valued key, defaulting to empty when absent.
pub(crate) fn array_or_empty<'a>(object: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
