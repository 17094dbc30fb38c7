//! Core JC lexer: converts source text to tokens on demand.
//!
//! Features:
//! - Fixed operators `{ } [ ] ( ) < > | & = => , :`
//! - Reserved words take precedence over names on exact match
//! - `#` line comments are kept as tokens so the parser can attach them as
//!   descriptions
//! - JSON string escapes, including `\uXXXX` surrogate pairs
//! - JSON-style numbers with an optional leading sign
//! - Fail-fast: the first malformed token aborts lexing

use jc_types::{CompileError, ErrorCode, Result, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The JC lexer.
///
/// Each call to [`Lexer::next_token`] skips whitespace and scans exactly one
/// token. After [`TokenKind::Eof`] it keeps returning `Eof`.
pub struct Lexer<'src> {
    source_file: &'src SourceFile,
    text: &'src str,
    /// Current byte offset into `text`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, counted in chars).
    col: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source_file,
            text: &source_file.source,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Lex the whole source into a token vector ending with `Eof`.
    /// Comments are included; the start-of-file sentinel is not.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    /// The start-of-file sentinel every token stream begins with.
    pub fn start_token(&self) -> Token {
        Token::new(TokenKind::Sof, "", Span::point(0, 1, 1))
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_digits(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
            count += 1;
        }
        count
    }

    fn span_from(&self, start: usize, line: u32, col: u32) -> Span {
        Span::new(start, self.pos, line, col)
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> CompileError {
        CompileError::new(self.source_file, code, message, span)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
            self.advance();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let start = self.pos;
        let (line, col) = (self.line, self.col);

        let Some(ch) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, "", Span::point(start, line, col)));
        };

        let kind = match ch {
            '#' => self.scan_comment(),
            '"' => self.scan_string(start, line, col)?,
            '0'..='9' => self.scan_number(start, line, col)?,
            '-' | '+' if matches!(self.peek(), Some('0'..='9')) => {
                self.scan_number(start, line, col)?
            }
            'a'..='z' | 'A'..='Z' | '_' => self.scan_word(start),

            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '|' => TokenKind::Pipe,
            '&' => TokenKind::Amp,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '=' => {
                if self.eat('>') {
                    TokenKind::FatArrow
                } else {
                    TokenKind::Eq
                }
            }

            other => {
                return Err(self.error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    format!("unexpected character '{other}'"),
                    self.span_from(start, line, col),
                ));
            }
        };

        let span = self.span_from(start, line, col);
        Ok(Token::new(kind, &self.text[start..self.pos], span))
    }

    /// Scan a `#` comment up to (not including) the end of line.
    fn scan_comment(&mut self) -> TokenKind {
        let body_start = self.pos;
        while !matches!(self.peek(), None | Some('\n')) {
            self.advance();
        }
        let body = self.text[body_start..self.pos].trim_end_matches('\r');
        TokenKind::Comment(body.to_string())
    }

    fn scan_word(&mut self, start: usize) -> TokenKind {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let word = &self.text[start..self.pos];
        TokenKind::from_keyword(word).unwrap_or_else(|| TokenKind::Name(word.to_string()))
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a number. The sign or first digit is already consumed.
    fn scan_number(&mut self, start: usize, line: u32, col: u32) -> Result<TokenKind> {
        let first = self.text[start..].chars().next();
        let leading = if matches!(first, Some('-' | '+')) {
            self.advance()
        } else {
            first
        };

        if leading == Some('0') && matches!(self.peek(), Some('0'..='9')) {
            self.eat_digits();
            return Err(self.error(
                ErrorCode::INVALID_NUMBER,
                "numbers must not have leading zeros",
                self.span_from(start, line, col),
            ));
        }
        self.eat_digits();

        if self.peek() == Some('.') {
            self.advance();
            if self.eat_digits() == 0 {
                return Err(self.error(
                    ErrorCode::INVALID_NUMBER,
                    "expected digits after decimal point",
                    self.span_from(start, line, col),
                ));
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if self.eat_digits() == 0 {
                return Err(self.error(
                    ErrorCode::INVALID_NUMBER,
                    "expected digits in exponent",
                    self.span_from(start, line, col),
                ));
            }
        }

        if matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            self.advance();
            return Err(self.error(
                ErrorCode::INVALID_NUMBER,
                format!("malformed number '{}'", &self.text[start..self.pos]),
                self.span_from(start, line, col),
            ));
        }

        let text = &self.text[start..self.pos];
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(TokenKind::Number(value)),
            Ok(_) => Err(self.error(
                ErrorCode::INVALID_NUMBER,
                format!("number '{text}' is out of range"),
                self.span_from(start, line, col),
            )),
            Err(_) => Err(self.error(
                ErrorCode::INVALID_NUMBER,
                format!("malformed number '{text}'"),
                self.span_from(start, line, col),
            )),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a string literal after the opening `"`.
    fn scan_string(&mut self, start: usize, line: u32, col: u32) -> Result<TokenKind> {
        let mut buf = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        self.span_from(start, line, col),
                    ));
                }
                Some('"') => {
                    self.advance();
                    return Ok(TokenKind::String(buf));
                }
                Some('\\') => {
                    let escaped = self.scan_escape_sequence()?;
                    buf.push(escaped);
                }
                Some(ch) => {
                    self.advance();
                    buf.push(ch);
                }
            }
        }
    }

    /// Scan an escape sequence starting at the `\`.
    fn scan_escape_sequence(&mut self) -> Result<char> {
        let start = self.pos;
        let (line, col) = (self.line, self.col);
        self.advance(); // consume the '\'

        let escaped = match self.advance() {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => return self.scan_unicode_escape(start, line, col),
            Some(ch) => {
                return Err(self.error(
                    ErrorCode::INVALID_ESCAPE,
                    format!("invalid escape sequence '\\{ch}'"),
                    self.span_from(start, line, col),
                ));
            }
            None => {
                return Err(self.error(
                    ErrorCode::UNTERMINATED_STRING,
                    "unexpected end of file in escape sequence",
                    self.span_from(start, line, col),
                ));
            }
        };
        Ok(escaped)
    }

    /// Scan the `XXXX` of a `\uXXXX` escape, combining surrogate pairs.
    fn scan_unicode_escape(&mut self, start: usize, line: u32, col: u32) -> Result<char> {
        let high = self.scan_hex4(start, line, col)?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if self.peek() != Some('\\') || self.peek_at(1) != Some('u') {
                return Err(self.error(
                    ErrorCode::INVALID_ESCAPE,
                    "unpaired surrogate in unicode escape",
                    self.span_from(start, line, col),
                ));
            }
            self.advance();
            self.advance();
            let low = self.scan_hex4(start, line, col)?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(self.error(
                    ErrorCode::INVALID_ESCAPE,
                    "invalid low surrogate in unicode escape",
                    self.span_from(start, line, col),
                ));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };

        char::from_u32(code).ok_or_else(|| {
            self.error(
                ErrorCode::INVALID_ESCAPE,
                format!("invalid unicode escape U+{code:04X}"),
                self.span_from(start, line, col),
            )
        })
    }

    fn scan_hex4(&mut self, start: usize, line: u32, col: u32) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self.peek().and_then(|c| c.to_digit(16)).ok_or_else(|| {
                self.error(
                    ErrorCode::INVALID_ESCAPE,
                    "expected four hex digits in unicode escape",
                    self.span_from(start, line, col),
                )
            })?;
            self.advance();
            value = value * 16 + digit;
        }
        Ok(value)
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenStream
// ─────────────────────────────────────────────────────────────────────

/// A cursor over a lazily-scanned token sequence.
///
/// The stream starts on a [`TokenKind::Sof`] sentinel. Tokens are scanned
/// only when the cursor or a lookahead reaches them, and are kept so that
/// repeated lookahead and `prev` are free. Index neighbours act as the
/// prev/next links.
pub struct TokenStream<'src> {
    lexer: Lexer<'src>,
    tokens: Vec<Token>,
    cursor: usize,
    finished: bool,
}

impl<'src> TokenStream<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        let lexer = Lexer::new(source_file);
        let sof = lexer.start_token();
        Self {
            lexer,
            tokens: vec![sof],
            cursor: 0,
            finished: false,
        }
    }

    /// The token under the cursor.
    pub fn current(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The token before the cursor, if any.
    pub fn prev(&self) -> Option<&Token> {
        self.cursor.checked_sub(1).map(|i| &self.tokens[i])
    }

    /// The token at `index`, scanning forward if needed. Indexes past the
    /// end of input yield the `Eof` token.
    pub fn get(&mut self, index: usize) -> Result<&Token> {
        self.fill(index)?;
        let last = self.tokens.len() - 1;
        Ok(&self.tokens[index.min(last)])
    }

    /// The token after the cursor, without moving.
    pub fn lookahead(&mut self) -> Result<&Token> {
        self.get(self.cursor + 1)
    }

    /// Move the cursor forward one token and return the new current token.
    /// The cursor never moves past `Eof`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<&Token> {
        self.fill(self.cursor + 1)?;
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
        Ok(self.current())
    }

    fn fill(&mut self, index: usize) -> Result<()> {
        while self.tokens.len() <= index && !self.finished {
            let token = self.lexer.next_token()?;
            self.finished = token.kind == TokenKind::Eof;
            self.tokens.push(token);
        }
        Ok(())
    }
}
