//! Clients: the caller side of a call.
//!
//! ```text
//! domain input → reverse-convert → validate → encode → send
//!              → decode → validate → convert → domain output
//! ```
//!
//! A transport is anything implementing [`Sender`] (async) or
//! [`SyncSender`] (blocking). It receives one encoded request envelope and
//! returns the encoded response text. Plain closures implement both.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use jc_codec::CallCodecs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::envelope::{Calling, CallingOutput, Introspection};
use crate::error::{CallError, FormatError, SendError};
use crate::format::{decode_envelope, decode_slot, encode_envelope, encode_slot, Format, JsonFormat};

// ══════════════════════════════════════════════════════════════════════════════
// Transports
// ══════════════════════════════════════════════════════════════════════════════

/// An async transport.
pub trait Sender: Send + Sync {
    fn send(&self, request: String) -> BoxFuture<'static, Result<String, SendError>>;
}

impl<F, Fut> Sender for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, SendError>> + Send + 'static,
{
    fn send(&self, request: String) -> BoxFuture<'static, Result<String, SendError>> {
        Box::pin(self(request))
    }
}

/// A blocking transport. Never suspends and never batches.
pub trait SyncSender: Send + Sync {
    fn send(&self, request: String) -> Result<String, SendError>;
}

impl<F> SyncSender for F
where
    F: Fn(String) -> Result<String, SendError> + Send + Sync,
{
    fn send(&self, request: String) -> Result<String, SendError> {
        self(request)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Shared steps
// ══════════════════════════════════════════════════════════════════════════════

/// Build the request for `call` from a domain input slot.
pub(crate) fn prepare(format: &dyn Format, call: &CallCodecs, input: Option<Value>) -> Result<Calling, CallError> {
    let wire = call.input.reverse_convert_slot(input)?;
    call.input.validate_slot(wire.as_ref())?;
    let payload = encode_slot(format, wire.as_ref())?;
    Ok(Calling::single(call.name.clone(), payload))
}

/// Turn one call's response into a domain output slot.
pub(crate) fn complete(format: &dyn Format, call: &CallCodecs, output: CallingOutput) -> Result<Option<Value>, CallError> {
    let payload = match output {
        CallingOutput::CallingSuccess { output } => output,
        CallingOutput::CallingFailed { message } => return Err(CallError::Server(message)),
    };
    let wire = decode_slot(format, &payload)?;
    call.output.validate_slot(wire.as_ref())?;
    Ok(call.output.convert_slot(wire)?)
}

pub(crate) fn to_domain<I: Serialize + ?Sized>(input: &I) -> Result<Option<Value>, CallError> {
    Ok(Some(serde_json::to_value(input).map_err(FormatError::from)?))
}

pub(crate) fn from_domain<O: DeserializeOwned>(output: Option<Value>) -> Result<O, CallError> {
    Ok(serde_json::from_value(output.unwrap_or(Value::Null)).map_err(FormatError::from)?)
}

// ══════════════════════════════════════════════════════════════════════════════
// Client
// ══════════════════════════════════════════════════════════════════════════════

/// Async client: one transport round trip per call.
pub struct Client<S> {
    sender: S,
    format: Arc<dyn Format>,
}

impl<S: Sender> Client<S> {
    pub fn new(sender: S) -> Self {
        Self::with_format(sender, JsonFormat)
    }

    pub fn with_format(sender: S, format: impl Format + 'static) -> Self {
        Self {
            sender,
            format: Arc::new(format),
        }
    }

    /// Call with domain values. `None` is an absent payload.
    pub async fn call(&self, call: &CallCodecs, input: Option<Value>) -> Result<Option<Value>, CallError> {
        let request = prepare(&*self.format, call, input)?;
        let text = encode_envelope(&*self.format, &request)?;
        debug!(call = %call.name, bytes = text.len(), "sending call");
        let response = self.sender.send(text).await?;
        let output: CallingOutput = decode_envelope(&*self.format, &response)?;
        complete(&*self.format, call, output)
    }

    /// Call with serde types on both sides.
    pub async fn call_typed<I, O>(&self, call: &CallCodecs, input: &I) -> Result<O, CallError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let output = self.call(call, to_domain(input)?).await?;
        from_domain(output)
    }

    /// Ask the server for its schema and fingerprint.
    pub async fn introspect(&self) -> Result<Introspection, CallError> {
        let text = encode_envelope(&*self.format, &Calling::Introspection)?;
        let response = self.sender.send(text).await?;
        match decode_envelope::<CallingOutput>(&*self.format, &response)? {
            CallingOutput::CallingSuccess { output } => Ok(decode_envelope(&*self.format, &output)?),
            CallingOutput::CallingFailed { message } => Err(CallError::Server(message)),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// SyncClient
// ══════════════════════════════════════════════════════════════════════════════

/// Blocking client over a [`SyncSender`].
pub struct SyncClient<S> {
    sender: S,
    format: Arc<dyn Format>,
}

impl<S: SyncSender> SyncClient<S> {
    pub fn new(sender: S) -> Self {
        Self::with_format(sender, JsonFormat)
    }

    pub fn with_format(sender: S, format: impl Format + 'static) -> Self {
        Self {
            sender,
            format: Arc::new(format),
        }
    }

    pub fn call(&self, call: &CallCodecs, input: Option<Value>) -> Result<Option<Value>, CallError> {
        let request = prepare(&*self.format, call, input)?;
        let text = encode_envelope(&*self.format, &request)?;
        debug!(call = %call.name, bytes = text.len(), "sending call");
        let response = self.sender.send(text)?;
        let output: CallingOutput = decode_envelope(&*self.format, &response)?;
        complete(&*self.format, call, output)
    }

    pub fn call_typed<I, O>(&self, call: &CallCodecs, input: &I) -> Result<O, CallError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let output = self.call(call, to_domain(input)?)?;
        from_domain(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jc_codec::Codec;
    use serde_json::json;

    fn echo() -> CallCodecs {
        CallCodecs {
            name: "echo".into(),
            input: Codec::number(),
            output: Codec::number(),
            description: None,
        }
    }

    #[test]
    fn test_prepare_validates_before_sending() {
        let err = prepare(&JsonFormat, &echo(), Some(json!("x"))).unwrap_err();
        assert_eq!(err.to_string(), "expected number");
        assert_eq!(
            prepare(&JsonFormat, &echo(), Some(json!(2))).unwrap(),
            Calling::single("echo", "2")
        );
    }

    #[test]
    fn test_complete() {
        let call = echo();
        assert_eq!(
            complete(&JsonFormat, &call, CallingOutput::success("5")).unwrap(),
            Some(json!(5))
        );
        assert_eq!(
            complete(&JsonFormat, &call, CallingOutput::failed("boom")).unwrap_err(),
            CallError::Server("boom".into())
        );
        assert!(matches!(
            complete(&JsonFormat, &call, CallingOutput::success("\"5\"")),
            Err(CallError::Validate(_))
        ));
        assert!(matches!(
            complete(&JsonFormat, &call, CallingOutput::success("{")),
            Err(CallError::Serialization(_))
        ));
    }

    #[test]
    fn test_sync_client_with_closure() {
        let client = SyncClient::new(|request: String| -> Result<String, SendError> {
            assert!(request.contains("\"name\":\"echo\""));
            Ok(r#"{"kind":"CallingSuccess","output":"9"}"#.to_string())
        });
        assert_eq!(client.call_typed::<_, i64>(&echo(), &1).unwrap(), 9);
    }

    #[test]
    fn test_sync_client_send_failure() {
        let client = SyncClient::new(|_: String| -> Result<String, SendError> { Err(SendError::new("offline")) });
        assert_eq!(
            client.call(&echo(), Some(json!(1))).unwrap_err(),
            CallError::Send(SendError::new("offline"))
        );
    }
}
