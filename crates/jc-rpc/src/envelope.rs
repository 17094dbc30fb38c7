//! The RPC wire envelope.
//!
//! Requests and responses are `kind`-tagged records. Call payloads are
//! already-encoded strings, so the envelope never needs to know about the
//! types flowing through it; an absent payload is the empty string.
//!
//! ```text
//! {"kind":"Single","name":"getUser","input":"3"}
//! {"kind":"Batch","callings":[{"kind":"Single",...}, ...]}
//! {"kind":"Introspection"}
//!
//! {"kind":"CallingSuccess","output":"{\"id\":3}"}
//! {"kind":"CallingFailed","message":"expected number"}
//! {"outputs":[{"kind":"CallingSuccess",...}, ...]}
//! ```

use jc_types::schema::Schema;
use serde::{Deserialize, Serialize};

/// One call: its name and encoded input payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleCalling {
    pub name: String,
    pub input: String,
}

/// A request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Calling {
    Single(SingleCalling),
    /// Items are expected to be `Single`; anything else fails per item.
    Batch { callings: Vec<Calling> },
    Introspection,
}

impl Calling {
    pub fn single(name: impl Into<String>, input: impl Into<String>) -> Self {
        Calling::Single(SingleCalling {
            name: name.into(),
            input: input.into(),
        })
    }
}

/// The response to one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CallingOutput {
    CallingSuccess { output: String },
    CallingFailed { message: String },
}

impl CallingOutput {
    pub fn success(output: impl Into<String>) -> Self {
        CallingOutput::CallingSuccess {
            output: output.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        CallingOutput::CallingFailed {
            message: message.into(),
        }
    }
}

/// The response to a batch, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutput {
    pub outputs: Vec<CallingOutput>,
}

/// Payload of a successful introspection response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Introspection {
    pub fingerprint: String,
    pub schema: Schema,
}

impl Introspection {
    pub fn of(schema: &Schema) -> Self {
        Self {
            fingerprint: schema.fingerprint(),
            schema: schema.clone(),
        }
    }
}
