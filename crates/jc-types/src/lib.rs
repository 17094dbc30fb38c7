//! Shared types for the JC schema compiler.
//!
//! This crate defines the AST node types, the Schema IR, source spans and
//! the compiler error type used across all compiler stages.

mod error;
mod span;
pub mod ast;
pub mod schema;

pub use error::{CompileError, ErrorCategory, ErrorCode};
pub use span::{SourceFile, Span};

/// Result type used throughout the JC compiler.
pub type Result<T> = std::result::Result<T, CompileError>;
