//! Server dispatch: the resolver side of a call.
//!
//! ```text
//! decode → validate → convert → resolver → reverse-convert → validate → encode
//! ```
//!
//! Every failure on the way, including a resolver error or panic, is
//! answered with `CallingFailed`. Batch items run concurrently and are
//! answered in request order.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::{join_all, lazy, BoxFuture};
use futures_util::FutureExt;
use jc_codec::CallCodecs;
use jc_types::schema::Schema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::{BatchOutput, Calling, CallingOutput, Introspection};
use crate::error::CallError;
use crate::format::{decode_envelope, decode_slot, encode_envelope, encode_slot, Format, JsonFormat};

/// What a resolver returns: a domain output slot, or a failure cause.
pub type ResolverFuture = BoxFuture<'static, Result<Option<Value>, String>>;

type Resolver = Arc<dyn Fn(Option<Value>) -> ResolverFuture + Send + Sync>;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Answer `Introspection` requests with the schema and its fingerprint.
    pub introspection: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            introspection: true,
        }
    }
}

struct Route {
    codecs: CallCodecs,
    resolver: Resolver,
}

/// Either kind of response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Single(CallingOutput),
    Batch(BatchOutput),
}

pub struct Server {
    routes: HashMap<String, Route>,
    format: Arc<dyn Format>,
    introspection: Option<Introspection>,
    options: ServerOptions,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            format: Arc::new(JsonFormat),
            introspection: None,
            options: ServerOptions::default(),
        }
    }

    pub fn with_format(mut self, format: impl Format + 'static) -> Self {
        self.format = Arc::new(format);
        self
    }

    pub fn with_options(mut self, options: ServerOptions) -> Self {
        self.options = options;
        self
    }

    /// Serve `schema` to introspection requests.
    pub fn with_schema(mut self, schema: &Schema) -> Self {
        self.introspection = Some(Introspection::of(schema));
        self
    }

    /// Register the resolver for `call`, replacing any earlier one.
    pub fn register<F, Fut>(&mut self, call: CallCodecs, resolver: F) -> &mut Self
    where
        F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, String>> + Send + 'static,
    {
        let resolver: Resolver = Arc::new(move |input: Option<Value>| -> ResolverFuture { resolver(input).boxed() });
        debug!(call = %call.name, "resolver registered");
        self.routes.insert(
            call.name.clone(),
            Route {
                codecs: call,
                resolver,
            },
        );
        self
    }

    /// Register a resolver working on serde types. An absent input
    /// deserializes from `null`.
    pub fn register_typed<I, O, F, Fut>(&mut self, call: CallCodecs, resolver: F) -> &mut Self
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, String>> + Send + 'static,
    {
        let resolver = Arc::new(resolver);
        self.register(call, move |input: Option<Value>| {
            let resolver = Arc::clone(&resolver);
            async move {
                let input: I = serde_json::from_value(input.unwrap_or(Value::Null)).map_err(|e| e.to_string())?;
                let output = resolver(input).await?;
                serde_json::to_value(output).map(Some).map_err(|e| e.to_string())
            }
        })
    }

    /// Names of the registered calls.
    pub fn calls(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Answer an encoded request envelope with an encoded response.
    ///
    /// Malformed requests are answered with `CallingFailed`; only encoding
    /// the response itself can fail.
    pub async fn handle(&self, request: &str) -> Result<String, CallError> {
        let response = match decode_envelope::<Calling>(&*self.format, request) {
            Ok(calling) => self.dispatch(calling).await,
            Err(err) => {
                warn!(error = %err, "malformed request");
                Response::Single(CallingOutput::failed(format!("malformed request: {err}")))
            }
        };
        Ok(encode_envelope(&*self.format, &response)?)
    }

    pub async fn dispatch(&self, calling: Calling) -> Response {
        match calling {
            Calling::Batch { callings } => {
                debug!(size = callings.len(), "dispatching batch");
                let outputs = join_all(callings.into_iter().map(|c| self.dispatch_item(c))).await;
                Response::Batch(BatchOutput { outputs })
            }
            other => Response::Single(self.dispatch_item(other).await),
        }
    }

    async fn dispatch_item(&self, calling: Calling) -> CallingOutput {
        match calling {
            Calling::Single(single) => match self.call(&single.name, &single.input).await {
                Ok(output) => CallingOutput::success(output),
                Err(err) => CallingOutput::failed(err.to_string()),
            },
            Calling::Introspection => self.introspect(),
            Calling::Batch { .. } => CallingOutput::failed("batches cannot be nested"),
        }
    }

    fn introspect(&self) -> CallingOutput {
        let payload = match (&self.introspection, self.options.introspection) {
            (Some(introspection), true) => introspection,
            _ => return CallingOutput::failed("introspection is disabled"),
        };
        match encode_envelope(&*self.format, payload) {
            Ok(output) => CallingOutput::success(output),
            Err(err) => CallingOutput::failed(err.to_string()),
        }
    }

    /// Run one call on an encoded input payload and return the encoded
    /// output payload.
    pub async fn call(&self, name: &str, input: &str) -> Result<String, CallError> {
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| CallError::UnknownCall(name.to_string()))?;
        let codecs = &route.codecs;
        debug!(call = name, "dispatching call");

        let wire = decode_slot(&*self.format, input)?;
        codecs.input.validate_slot(wire.as_ref())?;
        let domain = codecs.input.convert_slot(wire)?;

        // Invoking the resolver happens inside the first poll, so a panic
        // while building its future is caught along with one while running it.
        let invocation = lazy(|_| (route.resolver)(domain)).flatten();
        let resolved = AssertUnwindSafe(invocation).catch_unwind().await;
        let output = match resolved {
            Ok(Ok(output)) => output,
            Ok(Err(cause)) => {
                warn!(call = name, %cause, "resolver failed");
                return Err(CallError::Resolver {
                    name: name.to_string(),
                    cause,
                });
            }
            Err(_) => {
                warn!(call = name, "resolver panicked");
                return Err(CallError::Resolver {
                    name: name.to_string(),
                    cause: "resolver panicked".to_string(),
                });
            }
        };

        let wire = codecs.output.reverse_convert_slot(output)?;
        codecs.output.validate_slot(wire.as_ref())?;
        Ok(encode_slot(&*self.format, wire.as_ref())?)
    }
}
