//! Response-shape-aware decoding
//!
//! Some endpoints answer `204 No Content` (or a body without the expected
//! marker field) when there is nothing to report, e.g. no active playback.
//! Others return polymorphic payloads selected by a discriminator value.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Decode a full body.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))
}

/// Decode only when the top-level `marker` field is present.
///
/// Empty bodies and bodies without the marker are `Ok(None)`. A body that
/// has the marker but does not match `T` is a decode error.
pub fn decode_if_present<T: DeserializeOwned>(body: &[u8], marker: &str) -> Result<Option<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: Value = decode(body)?;
    if value.get(marker).is_none() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| Error::Decode(e.to_string()))
}

/// A payload whose concrete type is chosen by a string at a JSON pointer.
pub trait Discriminated: Sized {
    /// JSON pointer to the discriminator, e.g. `/item/type`.
    const TAG_POINTER: &'static str;

    /// Build the variant for `tag`. `None` means the discriminator was
    /// missing or not a string (e.g. `"item": null`).
    fn from_tagged(tag: Option<&str>, value: Value) -> std::result::Result<Self, serde_json::Error>;
}

pub fn decode_discriminated<T: Discriminated>(value: Value) -> Result<T> {
    let tag = value
        .pointer(T::TAG_POINTER)
        .and_then(Value::as_str)
        .map(str::to_owned);
    T::from_tagged(tag.as_deref(), value).map_err(|e| Error::Decode(e.to_string()))
}
