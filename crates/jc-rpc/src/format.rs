//! Payload formats.
//!
//! A [`Format`] turns JSON values into transport text and back. Envelopes
//! and call payloads both go through the same format.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::FormatError;

pub trait Format: Send + Sync {
    fn encode(&self, value: &Value) -> Result<String, FormatError>;
    fn decode(&self, text: &str) -> Result<Value, FormatError>;
}

/// Plain JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn encode(&self, value: &Value) -> Result<String, FormatError> {
        serde_json::to_string(value).map_err(FormatError::from)
    }

    fn decode(&self, text: &str) -> Result<Value, FormatError> {
        serde_json::from_str(text).map_err(FormatError::from)
    }
}

// ── Helpers shared by clients and the server ──────────────────────────────────

/// Encode a payload slot; absence is the empty string.
pub(crate) fn encode_slot(format: &dyn Format, slot: Option<&Value>) -> Result<String, FormatError> {
    match slot {
        Some(value) => format.encode(value),
        None => Ok(String::new()),
    }
}

/// Decode a payload slot; the empty string is absence.
pub(crate) fn decode_slot(format: &dyn Format, text: &str) -> Result<Option<Value>, FormatError> {
    if text.is_empty() {
        Ok(None)
    } else {
        format.decode(text).map(Some)
    }
}

pub(crate) fn encode_envelope<T: Serialize>(format: &dyn Format, envelope: &T) -> Result<String, FormatError> {
    format.encode(&serde_json::to_value(envelope)?)
}

pub(crate) fn decode_envelope<T: DeserializeOwned>(format: &dyn Format, text: &str) -> Result<T, FormatError> {
    Ok(serde_json::from_value(format.decode(text)?)?)
}
