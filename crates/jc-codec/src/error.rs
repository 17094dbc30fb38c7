//! Codec error values.
//!
//! Validation and conversion failures are returned, never panicked:
//! [`ValidateError`] names what was expected and where, [`ConvertError`]
//! wraps a converter failure on an already-validated value.

use std::fmt;

use thiserror::Error;

use crate::codec::CodecTag;

/// A value was rejected by a codec.
///
/// `context` is a path from the innermost failure outwards; each composite
/// codec appends its own segment (`list`, `record`, `object.name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateError {
    pub expected: String,
    pub context: Vec<String>,
}

impl ValidateError {
    pub fn expected(description: impl Into<String>) -> Self {
        Self {
            expected: description.into(),
            context: Vec::new(),
        }
    }

    /// Append an outer path segment.
    pub fn in_context(mut self, segment: impl Into<String>) -> Self {
        self.context.push(segment.into());
        self
    }
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}", self.expected)?;
        for segment in &self.context {
            write!(f, " in {segment}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidateError {}

/// A converter failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {kind}: {cause}")]
pub struct ConvertError {
    pub kind: CodecTag,
    pub cause: String,
}

impl ConvertError {
    pub fn new(kind: CodecTag, cause: impl Into<String>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }
}

/// Failure of the typed [`decode`](crate::Codec::decode) /
/// [`encode`](crate::Codec::encode) facade.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Validate(#[from] ValidateError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A schema could not be turned into codecs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecBuildError {
    #[error("no derivation registered for '{name}' (module '{module}')")]
    MissingDerivation { module: String, name: String },
    #[error("unresolved name '{name}' in module '{module}'")]
    UnresolvedName { module: String, name: String },
    #[error("'{name}' in module '{module}' is a call, not a type")]
    NotAType { module: String, name: String },
    #[error("module '{0}' is not part of the schema")]
    UnknownModule(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_error_display() {
        let err = ValidateError::expected("number")
            .in_context("object.id")
            .in_context("list");
        assert_eq!(err.to_string(), "expected number in object.id in list");
    }

    #[test]
    fn test_convert_error_display() {
        let err = ConvertError::new(CodecTag::Derive, "out of range");
        assert_eq!(err.to_string(), "cannot convert derive: out of range");
    }
}
