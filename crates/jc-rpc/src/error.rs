//! Call-layer errors. Every call-stage failure is returned as a
//! [`CallError`] value; none escapes as a panic.

use jc_codec::{ConvertError, ValidateError};
use thiserror::Error;

/// A payload or envelope could not be (de)serialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FormatError(pub String);

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        FormatError(err.to_string())
    }
}

/// The transport failed to deliver a request or produce a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("send failed: {0}")]
pub struct SendError(pub String);

impl SendError {
    pub fn new(cause: impl Into<String>) -> Self {
        SendError(cause.into())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error(transparent)]
    Validate(#[from] ValidateError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("resolver for '{name}' failed: {cause}")]
    Resolver { name: String, cause: String },
    #[error(transparent)]
    Send(#[from] SendError),
    #[error("serialization failed: {0}")]
    Serialization(#[from] FormatError),
    /// The server answered with `CallingFailed`.
    #[error("server error: {0}")]
    Server(String),
    #[error("unknown call '{0}'")]
    UnknownCall(String),
}
