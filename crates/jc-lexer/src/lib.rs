//! JC lexer: converts schema source text into tokens.

pub mod lexer;
pub mod token;

pub use lexer::{Lexer, TokenStream};
pub use token::{Token, TokenCategory, TokenKind, ALL_KEYWORDS};

/// Lex a whole source file, comments included, ending with `Eof`.
pub fn lex(source_file: &jc_types::SourceFile) -> jc_types::Result<Vec<Token>> {
    Lexer::new(source_file).tokenize()
}
