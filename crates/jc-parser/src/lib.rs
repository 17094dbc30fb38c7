//! JC parser: converts a token stream into an AST.

mod parse_decl;
mod parse_type;
mod parser;

pub use parser::Parser;

use jc_types::ast::Document;
use jc_types::{Result, SourceFile};

/// Parse a whole source file into a [`Document`].
///
/// Stops at the first lexical or syntax error.
pub fn parse_source(source_file: &SourceFile) -> Result<Document> {
    Parser::new(source_file).parse_document()
}
