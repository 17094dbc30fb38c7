//! Core parser infrastructure: token cursor, comment collection, helpers.

use jc_lexer::{Token, TokenKind, TokenStream};
use jc_types::ast::Ident;
use jc_types::{CompileError, ErrorCode, Result, SourceFile, Span};

/// The JC parser.
///
/// Recursive descent with one token of lookahead over a lazily-scanned
/// [`TokenStream`]. Comment tokens are invisible to the grammar except where
/// a description may start (before a statement or an object field).
/// The first syntax error aborts parsing.
pub struct Parser<'src> {
    stream: TokenStream<'src>,
    source_file: &'src SourceFile,
    /// Span of the most recently consumed significant token.
    last_span: Span,
}

impl<'src> Parser<'src> {
    /// Create a parser over `source_file`.
    pub fn new(source_file: &'src SourceFile) -> Self {
        let stream = TokenStream::new(source_file);
        let last_span = stream.current().span;
        Self {
            stream,
            source_file,
            last_span,
        }
    }

    pub(crate) fn source_file(&self) -> &'src SourceFile {
        self.source_file
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// The next significant (non-comment) token, without consuming anything.
    pub(crate) fn peek(&mut self) -> Result<Token> {
        let mut index = self.stream.cursor() + 1;
        loop {
            let token = self.stream.get(index)?;
            if !matches!(token.kind, TokenKind::Comment(_)) {
                return Ok(token.clone());
            }
            index += 1;
        }
    }

    pub(crate) fn peek_kind(&mut self) -> Result<TokenKind> {
        Ok(self.peek()?.kind)
    }

    /// Consume the next significant token, skipping comments before it.
    pub(crate) fn advance(&mut self) -> Result<Token> {
        loop {
            let token = self.stream.next()?.clone();
            if !matches!(token.kind, TokenKind::Comment(_)) {
                self.last_span = token.span;
                return Ok(token);
            }
        }
    }

    /// Span of the most recently consumed token.
    pub(crate) fn previous_span(&self) -> Span {
        self.last_span
    }

    /// Check if the next significant token matches the given kind exactly.
    pub(crate) fn check(&mut self, kind: &TokenKind) -> Result<bool> {
        Ok(&self.peek_kind()? == kind)
    }

    /// If the next token matches, consume it and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> Result<bool> {
        if self.check(kind)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // ── Comments ──────────────────────────────────────────────────────────────

    /// Consume the comment tokens directly ahead and join them into a
    /// description. Returns `None` when there are none (or all are blank).
    pub(crate) fn take_description(&mut self) -> Result<Option<String>> {
        let mut lines = Vec::new();
        while let TokenKind::Comment(text) = &self.stream.lookahead()?.kind {
            lines.push(text.clone());
            self.stream.next()?;
        }
        let joined = lines.join("\n");
        let trimmed = joined.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Result<Token> {
        let token = self.peek()?;
        if &token.kind == expected {
            self.advance()
        } else {
            Err(self.unexpected(&token, &format!("'{expected}'")))
        }
    }

    /// Expect a name token.
    pub(crate) fn expect_name(&mut self) -> Result<Ident> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Name(name) => {
                let span = self.advance()?.span;
                Ok(Ident::new(name, span))
            }
            _ => Err(self.unexpected(&token, "name")),
        }
    }

    /// Expect a name OR any reserved word used as an object field name:
    /// `{ type: string, from: number }`.
    pub(crate) fn expect_field_name(&mut self) -> Result<Ident> {
        let token = self.peek()?;
        match &token.kind {
            TokenKind::Name(name) => {
                let name = name.clone();
                let span = self.advance()?.span;
                Ok(Ident::new(name, span))
            }
            kind if kind.is_reserved() => {
                let span = self.advance()?.span;
                Ok(Ident::new(token.word, span))
            }
            _ => Err(self.unexpected(&token, "field name")),
        }
    }

    /// Expect a string literal token. Returns the string value and its span.
    pub(crate) fn expect_string(&mut self) -> Result<(String, Span)> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::String(value) => {
                let span = self.advance()?.span;
                Ok((value, span))
            }
            _ => Err(self.unexpected(&token, "string literal")),
        }
    }

    /// Eat an optional separator comma.
    pub(crate) fn eat_comma(&mut self) -> Result<bool> {
        self.eat(&TokenKind::Comma)
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Build a syntax error naming what was expected and what was found.
    pub(crate) fn unexpected(&self, found: &Token, expected: &str) -> CompileError {
        let found_text = match found.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("'{}'", found.word),
        };
        CompileError::new(
            self.source_file,
            ErrorCode::UNEXPECTED_TOKEN,
            format!("expected {expected}, found {found_text}"),
            found.span,
        )
    }

    /// Build a syntax error with a custom message at `span`.
    pub(crate) fn error_at(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> CompileError {
        CompileError::new(self.source_file, code, message, span)
    }
}
