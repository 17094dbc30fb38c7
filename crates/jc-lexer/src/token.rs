//! Token types for the JC lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of JC source, the coarse
//! [`TokenCategory`] each kind belongs to, and [`Token`], which pairs a kind
//! with its raw word and source [`Span`].

use jc_types::Span;
use std::fmt;

/// All reserved words of JC source, in the order the lexer checks them.
///
/// Each one is matched on the exact word only; `types` or `Call` are names.
pub const ALL_KEYWORDS: &[&str] = &[
    // Keywords (7)
    "type", "call", "derive", "from", "import", "export", "as",
    // Primitive types (4)
    "number", "string", "null", "boolean",
    // Special types (2)
    "any", "none",
    // Booleans (2)
    "true", "false",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the JC lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw source text of the token (empty for sentinels).
    pub word: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, word: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            word: word.into(),
            span,
        }
    }

    pub fn category(&self) -> TokenCategory {
        self.kind.category()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenCategory
// ─────────────────────────────────────────────────────────────────────

/// The coarse kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Comment,
    Operator,
    Keyword,
    PrimitiveType,
    SpecialType,
    String,
    Number,
    Boolean,
    Name,
    StartOfFile,
    EndOfFile,
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenCategory::Comment => "comment",
            TokenCategory::Operator => "operator",
            TokenCategory::Keyword => "keyword",
            TokenCategory::PrimitiveType => "primitive-type",
            TokenCategory::SpecialType => "special-type",
            TokenCategory::String => "string",
            TokenCategory::Number => "number",
            TokenCategory::Boolean => "boolean",
            TokenCategory::Name => "name",
            TokenCategory::StartOfFile => "start-of-file",
            TokenCategory::EndOfFile => "end-of-file",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in JC source.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// Numeric literal: `42`, `-3.5e2`
    Number(f64),
    /// String literal with escapes resolved: `"hello"`
    String(String),
    /// `true`
    True,
    /// `false`
    False,

    // ── Identifiers & comments ───────────────────────────────

    /// User-defined name: `user_id`
    Name(String),
    /// `# ...` line comment; carries the text after the `#` verbatim.
    Comment(String),

    // ── Keywords ─────────────────────────────────────────────

    /// `type`
    Type,
    /// `call`
    Call,
    /// `derive`
    Derive,
    /// `from`
    From,
    /// `import`
    Import,
    /// `export`
    Export,
    /// `as`
    As,

    // ── Type words ───────────────────────────────────────────

    /// `number`
    KwNumber,
    /// `string`
    KwString,
    /// `null`
    KwNull,
    /// `boolean`
    KwBoolean,
    /// `any`
    KwAny,
    /// `none`
    KwNone,

    // ── Operators ────────────────────────────────────────────

    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `|`
    Pipe,
    /// `&`
    Amp,
    /// `=`
    Eq,
    /// `=>`
    FatArrow,
    /// `,`
    Comma,
    /// `:`
    Colon,

    // ── Sentinels ────────────────────────────────────────────

    /// Start of file
    Sof,
    /// End of file
    Eof,
}

impl TokenKind {
    /// Look up a reserved word. Returns `None` for plain names.
    pub fn from_keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "type" => TokenKind::Type,
            "call" => TokenKind::Call,
            "derive" => TokenKind::Derive,
            "from" => TokenKind::From,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "as" => TokenKind::As,
            "number" => TokenKind::KwNumber,
            "string" => TokenKind::KwString,
            "null" => TokenKind::KwNull,
            "boolean" => TokenKind::KwBoolean,
            "any" => TokenKind::KwAny,
            "none" => TokenKind::KwNone,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => return None,
        };
        Some(kind)
    }

    pub fn category(&self) -> TokenCategory {
        match self {
            TokenKind::Number(_) => TokenCategory::Number,
            TokenKind::String(_) => TokenCategory::String,
            TokenKind::True | TokenKind::False => TokenCategory::Boolean,
            TokenKind::Name(_) => TokenCategory::Name,
            TokenKind::Comment(_) => TokenCategory::Comment,
            TokenKind::Type
            | TokenKind::Call
            | TokenKind::Derive
            | TokenKind::From
            | TokenKind::Import
            | TokenKind::Export
            | TokenKind::As => TokenCategory::Keyword,
            TokenKind::KwNumber | TokenKind::KwString | TokenKind::KwNull | TokenKind::KwBoolean => {
                TokenCategory::PrimitiveType
            }
            TokenKind::KwAny | TokenKind::KwNone => TokenCategory::SpecialType,
            TokenKind::Sof => TokenCategory::StartOfFile,
            TokenKind::Eof => TokenCategory::EndOfFile,
            _ => TokenCategory::Operator,
        }
    }

    /// Returns `true` for any reserved word (keyword, type word or boolean).
    pub fn is_reserved(&self) -> bool {
        matches!(
            self.category(),
            TokenCategory::Keyword
                | TokenCategory::PrimitiveType
                | TokenCategory::SpecialType
                | TokenCategory::Boolean
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::String(s) => write!(f, "\"{s}\""),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Name(name) => write!(f, "{name}"),
            TokenKind::Comment(_) => write!(f, "comment"),

            TokenKind::Type => write!(f, "type"),
            TokenKind::Call => write!(f, "call"),
            TokenKind::Derive => write!(f, "derive"),
            TokenKind::From => write!(f, "from"),
            TokenKind::Import => write!(f, "import"),
            TokenKind::Export => write!(f, "export"),
            TokenKind::As => write!(f, "as"),

            TokenKind::KwNumber => write!(f, "number"),
            TokenKind::KwString => write!(f, "string"),
            TokenKind::KwNull => write!(f, "null"),
            TokenKind::KwBoolean => write!(f, "boolean"),
            TokenKind::KwAny => write!(f, "any"),
            TokenKind::KwNone => write!(f, "none"),

            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Less => write!(f, "<"),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::Pipe => write!(f, "|"),
            TokenKind::Amp => write!(f, "&"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::FatArrow => write!(f, "=>"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),

            TokenKind::Sof => write!(f, "start of file"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}
