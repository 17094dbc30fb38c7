//! JC call layer.
//!
//! Wraps the [`CallCodecs`] of a call definition with a transport on the
//! client side ([`Client`], [`SyncClient`], [`BatchClient`]) or a resolver
//! on the server side ([`Server`]). Requests and responses travel in the
//! `kind`-tagged envelopes of [`envelope`]; payloads are encoded with a
//! [`Format`].
//!
//! Call-stage failures come back as [`CallError`] values.

mod batch;
mod client;
pub mod envelope;
mod error;
mod format;
mod server;

pub use batch::BatchClient;
pub use client::{Client, Sender, SyncClient, SyncSender};
pub use envelope::{BatchOutput, Calling, CallingOutput, Introspection, SingleCalling};
pub use error::{CallError, FormatError, SendError};
pub use format::{Format, JsonFormat};
pub use server::{ResolverFuture, Response, Server, ServerOptions};

pub use jc_codec::CallCodecs;
