//! JC compiler: orchestrates the schema pipeline.
//!
//! ```text
//! .jc source → Lexer → Parser → Bundler (+ ModuleResolver) → Schema → Checker → [Renamer]
//! ```
//!
//! [`compile`] runs bundling and checking in one step. Every stage returns
//! the first [`CompileError`] it meets.

mod bundler;
mod checker;
mod renamer;
mod resolver;

pub use bundler::bundle;
pub use checker::check;
pub use renamer::{file_stem_namer, rename};
pub use resolver::{FsResolver, MemoryResolver, ModuleResolver, ResolveError};

pub use jc_types::schema::Schema;
pub use jc_types::{CompileError, Result};

/// Bundle `entry` through `resolver` and check the result.
pub fn compile<R: ModuleResolver + ?Sized>(entry: &str, resolver: &R) -> Result<Schema> {
    let schema = bundle(entry, resolver)?;
    check(&schema)?;
    Ok(schema)
}

/// Compile a single in-memory module with no imports available.
pub fn compile_source(id: &str, source: &str) -> Result<Schema> {
    let resolver = MemoryResolver::new().with_module(id, source);
    compile(id, &resolver)
}

/// Lex a source text without parsing it. Useful for tooling such as
/// highlighters that need token categories.
pub fn tokens(id: &str, source: &str) -> Result<Vec<jc_lexer::Token>> {
    jc_lexer::lex(&jc_types::SourceFile::new(id, source))
}
