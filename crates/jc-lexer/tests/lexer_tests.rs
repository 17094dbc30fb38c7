//! Lexer tests for JC source.
//!
//! Covers: reserved words, operators, literals (numbers, strings, escapes),
//! comments, positions, the canonical declaration example, malformed input
//! and determinism.

use jc_lexer::{lex, TokenCategory, TokenKind};
use jc_types::{ErrorCategory, ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return the token kinds, excluding the final Eof.
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.jc", source);
    lex(&sf)
        .expect("lexing should succeed")
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

/// Lex source text and return its words, including the empty Eof word.
fn words(source: &str) -> Vec<String> {
    let sf = SourceFile::new("test.jc", source);
    lex(&sf)
        .expect("lexing should succeed")
        .into_iter()
        .map(|t| t.word)
        .collect()
}

/// Lex and return the error, panicking if lexing succeeded.
fn lex_err(source: &str) -> jc_types::CompileError {
    let sf = SourceFile::new("bad.jc", source);
    lex(&sf).expect_err("lexing should fail")
}

fn name(n: &str) -> TokenKind {
    TokenKind::Name(n.into())
}

// ─────────────────────────────────────────────────────────────────────
// Canonical example
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_declaration_example() {
    let source = "type foo1 = number\ntype foo2 = boolean\ncall fooFn: number => string\nderive int from number";
    assert_eq!(
        words(source),
        vec![
            "type", "foo1", "=", "number", "type", "foo2", "=", "boolean", "call", "fooFn", ":",
            "number", "=>", "string", "derive", "int", "from", "number", "",
        ]
    );
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Type,
            name("foo1"),
            TokenKind::Eq,
            TokenKind::KwNumber,
            TokenKind::Type,
            name("foo2"),
            TokenKind::Eq,
            TokenKind::KwBoolean,
            TokenKind::Call,
            name("fooFn"),
            TokenKind::Colon,
            TokenKind::KwNumber,
            TokenKind::FatArrow,
            TokenKind::KwString,
            TokenKind::Derive,
            name("int"),
            TokenKind::From,
            TokenKind::KwNumber,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Reserved words & names
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_keywords() {
    let pairs = [
        ("type", TokenKind::Type),
        ("call", TokenKind::Call),
        ("derive", TokenKind::Derive),
        ("from", TokenKind::From),
        ("import", TokenKind::Import),
        ("export", TokenKind::Export),
        ("as", TokenKind::As),
    ];
    for (src, expected) in &pairs {
        assert_eq!(kinds(src), vec![expected.clone()], "keyword '{src}'");
    }
}

#[test]
fn test_type_words_and_booleans() {
    assert_eq!(
        kinds("number string null boolean any none true false"),
        vec![
            TokenKind::KwNumber,
            TokenKind::KwString,
            TokenKind::KwNull,
            TokenKind::KwBoolean,
            TokenKind::KwAny,
            TokenKind::KwNone,
            TokenKind::True,
            TokenKind::False,
        ]
    );
}

#[test]
fn test_reserved_prefix_is_a_name() {
    assert_eq!(
        kinds("types numbers _any None asx"),
        vec![name("types"), name("numbers"), name("_any"), name("None"), name("asx")]
    );
}

#[test]
fn test_name_with_digits_and_underscores() {
    assert_eq!(kinds("_a1_B2"), vec![name("_a1_B2")]);
}

// ─────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_all_operators() {
    assert_eq!(
        kinds("{ } [ ] ( ) < > | & = => , :"),
        vec![
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Pipe,
            TokenKind::Amp,
            TokenKind::Eq,
            TokenKind::FatArrow,
            TokenKind::Comma,
            TokenKind::Colon,
        ]
    );
}

#[test]
fn test_operators_without_spaces() {
    assert_eq!(
        kinds("a=>b={x:[c]}"),
        vec![
            name("a"),
            TokenKind::FatArrow,
            name("b"),
            TokenKind::Eq,
            TokenKind::LBrace,
            name("x"),
            TokenKind::Colon,
            TokenKind::LBracket,
            name("c"),
            TokenKind::RBracket,
            TokenKind::RBrace,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Numbers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("0 42 -7 +3 3.25 1e3 2.5E-2 -0.5"),
        vec![
            TokenKind::Number(0.0),
            TokenKind::Number(42.0),
            TokenKind::Number(-7.0),
            TokenKind::Number(3.0),
            TokenKind::Number(3.25),
            TokenKind::Number(1000.0),
            TokenKind::Number(0.025),
            TokenKind::Number(-0.5),
        ]
    );
}

#[test]
fn test_leading_zero_rejected() {
    let err = lex_err("type a = 01");
    assert_eq!(err.code, ErrorCode::INVALID_NUMBER);
    assert_eq!(err.category, ErrorCategory::Lexical);
}

#[test]
fn test_out_of_range_number_rejected() {
    for src in ["1e400", "-1e400", "type t = 1e309"] {
        let err = lex_err(src);
        assert_eq!(err.code, ErrorCode::INVALID_NUMBER, "source '{src}'");
        assert!(err.message.contains("out of range"), "source '{src}'");
    }
    // Underflow rounds to zero and stays finite.
    assert_eq!(kinds("1e-400"), vec![TokenKind::Number(0.0)]);
}

#[test]
fn test_malformed_numbers_rejected() {
    for src in ["1.", "1e", "1e+", "12abc", "-"] {
        let err = lex_err(src);
        assert_eq!(err.category, ErrorCategory::Lexical, "source '{src}'");
    }
}

// ─────────────────────────────────────────────────────────────────────
// Strings
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_string_literal() {
    assert_eq!(
        kinds(r#""hello world""#),
        vec![TokenKind::String("hello world".into())]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r#""a\"b\\c\/d\be\ff\ng\rh\ti""#),
        vec![TokenKind::String("a\"b\\c/d\u{8}e\u{c}f\ng\rh\ti".into())]
    );
}

#[test]
fn test_unicode_escapes() {
    assert_eq!(
        kinds(r#""\u00e9\ud83d\ude00""#),
        vec![TokenKind::String("\u{e9}\u{1f600}".into())]
    );
}

#[test]
fn test_string_keeps_raw_word() {
    let w = words(r#""a\nb""#);
    assert_eq!(w[0], r#""a\nb""#);
}

#[test]
fn test_invalid_escape() {
    let err = lex_err(r#""bad \q""#);
    assert_eq!(err.code, ErrorCode::INVALID_ESCAPE);
}

#[test]
fn test_unpaired_surrogate() {
    let err = lex_err(r#""\ud83d""#);
    assert_eq!(err.code, ErrorCode::INVALID_ESCAPE);
}

#[test]
fn test_unterminated_string() {
    let err = lex_err("type a = \"open\ntype b = number");
    assert_eq!(err.code, ErrorCode::UNTERMINATED_STRING);
    assert_eq!(err.span.map(|s| (s.line, s.column)), Some((1, 10)));
}

// ─────────────────────────────────────────────────────────────────────
// Comments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comment_content_is_verbatim() {
    assert_eq!(
        kinds("#  spaced out\ntype"),
        vec![TokenKind::Comment("  spaced out".into()), TokenKind::Type]
    );
}

#[test]
fn test_comment_at_end_of_file() {
    assert_eq!(
        kinds("type a = number # trailing"),
        vec![
            TokenKind::Type,
            name("a"),
            TokenKind::Eq,
            TokenKind::KwNumber,
            TokenKind::Comment(" trailing".into()),
        ]
    );
}

#[test]
fn test_comment_crlf() {
    assert_eq!(
        kinds("# windows\r\ntype"),
        vec![TokenKind::Comment(" windows".into()), TokenKind::Type]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Positions & errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_positions() {
    let sf = SourceFile::new("test.jc", "type a\n  = number");
    let tokens = lex(&sf).unwrap();
    let number = &tokens[3];
    assert_eq!(number.kind, TokenKind::KwNumber);
    assert_eq!((number.span.line, number.span.column), (2, 5));
    assert_eq!((number.span.start, number.span.end), (11, 17));
}

#[test]
fn test_unexpected_character_reports_location() {
    let err = lex_err("type a = number\ntype b = @");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_CHARACTER);
    assert_eq!(err.module_id, "bad.jc");
    assert_eq!(err.span.map(|s| (s.line, s.column)), Some((2, 10)));
    assert_eq!(err.source_line, "type b = @");
}

#[test]
fn test_categories_of_example() {
    let sf = SourceFile::new("test.jc", "# doc\ntype a = \"x\" | 1 | true | any | string");
    let cats: Vec<TokenCategory> = lex(&sf).unwrap().iter().map(|t| t.category()).collect();
    assert_eq!(
        cats,
        vec![
            TokenCategory::Comment,
            TokenCategory::Keyword,
            TokenCategory::Name,
            TokenCategory::Operator,
            TokenCategory::String,
            TokenCategory::Operator,
            TokenCategory::Number,
            TokenCategory::Operator,
            TokenCategory::Boolean,
            TokenCategory::Operator,
            TokenCategory::SpecialType,
            TokenCategory::Operator,
            TokenCategory::PrimitiveType,
            TokenCategory::EndOfFile,
        ]
    );
}

#[test]
fn test_empty_source() {
    assert!(kinds("").is_empty());
    assert!(kinds("   \n\t ").is_empty());
}

#[test]
fn test_determinism_100_iterations() {
    let source = "import { a as b } from \"./lib\"\ntype t = { x: [number], y: <string> }";
    let first = kinds(source);
    for i in 0..100 {
        assert_eq!(kinds(source), first, "determinism failure at iteration {i}");
    }
}
