//! JC codec engine.
//!
//! Turns schema types into [`Codec`]s: composable validator/converter
//! pairs over JSON values. [`CodecRegistry::from_schema`] builds one codec
//! per definition of a checked schema plus [`CallCodecs`] for every call.

mod codec;
mod derive;
mod engine;
mod error;
mod registry;

pub use codec::{Codec, CodecKind, CodecTag, DeriveCodec, LazyCodec, ObjectField};
pub use derive::{derivations, Derivation, Derivations};
pub use error::{CodecBuildError, CodecError, ConvertError, ValidateError};
pub use registry::{CallCodecs, CodecRegistry};
