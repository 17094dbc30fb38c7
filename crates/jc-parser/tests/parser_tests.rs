//! Parser tests for JC source.
//!
//! Covers: the five statement forms, every type expression form, flattened
//! union/intersection chains, grouping vs. tuples, descriptions from
//! comment blocks, syntax errors and determinism.

use jc_parser::parse_source;
use jc_types::ast::*;
use jc_types::{CompileError, ErrorCategory, ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse source and return the document, panicking on error.
fn parse_ok(source: &str) -> Document {
    let sf = SourceFile::new("test.jc", source);
    match parse_source(&sf) {
        Ok(doc) => doc,
        Err(e) => panic!("unexpected parse error: {e}"),
    }
}

fn parse_err(source: &str) -> CompileError {
    let sf = SourceFile::new("bad.jc", source);
    parse_source(&sf).expect_err("parsing should fail")
}

/// Parse `type t = <source>` and return the type expression kind.
fn type_of(source: &str) -> TypeExprKind {
    let doc = parse_ok(&format!("type t = {source}"));
    match doc.statements.into_iter().next() {
        Some(Statement::Type(decl)) => decl.ty.kind,
        other => panic!("expected a type declaration, got {other:?}"),
    }
}

fn name_of(ty: &TypeExpr) -> &str {
    match &ty.kind {
        TypeExprKind::Name(ident) => &ident.name,
        other => panic!("expected a name reference, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_declaration_example() {
    let doc = parse_ok(
        "type foo1 = number\ntype foo2 = boolean\ncall fooFn: number => string\nderive int from number",
    );
    assert_eq!(doc.statements.len(), 4);

    let Statement::Type(foo1) = &doc.statements[0] else {
        panic!("expected type");
    };
    assert_eq!(foo1.name.name, "foo1");
    assert_eq!(foo1.ty.kind, TypeExprKind::Primitive(PrimitiveName::Number));

    let Statement::Call(call) = &doc.statements[2] else {
        panic!("expected call");
    };
    assert_eq!(call.name.name, "fooFn");
    assert_eq!(call.input.kind, TypeExprKind::Primitive(PrimitiveName::Number));
    assert_eq!(call.output.kind, TypeExprKind::Primitive(PrimitiveName::String));

    let Statement::Derive(derive) = &doc.statements[3] else {
        panic!("expected derive");
    };
    assert_eq!(derive.name.name, "int");
    assert_eq!(derive.from.kind, TypeExprKind::Primitive(PrimitiveName::Number));
}

#[test]
fn test_import_with_aliases() {
    let doc = parse_ok(r#"import { a, b as c d } from "./lib""#);
    let Statement::Import(import) = &doc.statements[0] else {
        panic!("expected import");
    };
    assert_eq!(import.specifier, "./lib");
    let locals: Vec<&str> = import.items.iter().map(|i| i.local_name().name.as_str()).collect();
    assert_eq!(locals, vec!["a", "c", "d"]);
    assert_eq!(import.items[1].name.name, "b");
    assert!(import.items[0].alias.is_none());
}

#[test]
fn test_empty_import_and_export() {
    let doc = parse_ok("import {} from \"./x\"\nexport {}");
    assert!(matches!(&doc.statements[0], Statement::Import(i) if i.items.is_empty()));
    assert!(matches!(&doc.statements[1], Statement::Export(e) if e.names.is_empty()));
}

#[test]
fn test_export_list() {
    let doc = parse_ok("export { a, b c, }");
    let Statement::Export(export) = &doc.statements[0] else {
        panic!("expected export");
    };
    let names: Vec<&str> = export.names.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_empty_document() {
    assert!(parse_ok("").statements.is_empty());
    assert!(parse_ok("# only a comment\n").statements.is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// Type expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_primitive_and_special_types() {
    assert_eq!(type_of("null"), TypeExprKind::Primitive(PrimitiveName::Null));
    assert_eq!(type_of("string"), TypeExprKind::Primitive(PrimitiveName::String));
    assert_eq!(type_of("any"), TypeExprKind::Special(SpecialName::Any));
    assert_eq!(type_of("none"), TypeExprKind::Special(SpecialName::None));
}

#[test]
fn test_literal_types() {
    assert_eq!(
        type_of(r#""ok""#),
        TypeExprKind::Literal(LiteralValue::String("ok".into()))
    );
    assert_eq!(type_of("-2.5"), TypeExprKind::Literal(LiteralValue::Number(-2.5)));
    assert_eq!(type_of("false"), TypeExprKind::Literal(LiteralValue::Boolean(false)));
}

#[test]
fn test_list_and_record() {
    let TypeExprKind::List(item) = type_of("[string]") else {
        panic!("expected list");
    };
    assert_eq!(item.kind, TypeExprKind::Primitive(PrimitiveName::String));

    let TypeExprKind::Record(item) = type_of("<[number]>") else {
        panic!("expected record");
    };
    assert!(matches!(item.kind, TypeExprKind::List(_)));
}

#[test]
fn test_object_fields() {
    let TypeExprKind::Object(fields) = type_of("{ id: number, name: string tags: [string] }") else {
        panic!("expected object");
    };
    let names: Vec<&str> = fields.iter().map(|f| f.name.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "tags"]);
}

#[test]
fn test_object_reserved_word_field_names() {
    let TypeExprKind::Object(fields) = type_of("{ type: string, from: number }") else {
        panic!("expected object");
    };
    assert_eq!(fields[0].name.name, "type");
    assert_eq!(fields[1].name.name, "from");
}

#[test]
fn test_empty_object() {
    assert_eq!(type_of("{}"), TypeExprKind::Object(vec![]));
}

#[test]
fn test_tuple() {
    let TypeExprKind::Tuple(items) = type_of("(number, string)") else {
        panic!("expected tuple");
    };
    assert_eq!(items.len(), 2);

    let TypeExprKind::Tuple(items) = type_of("(number,)") else {
        panic!("expected single-element tuple");
    };
    assert_eq!(items.len(), 1);
}

#[test]
fn test_parentheses_group() {
    assert_eq!(type_of("(number)"), TypeExprKind::Primitive(PrimitiveName::Number));
}

#[test]
fn test_union_is_flat_and_ordered() {
    let TypeExprKind::Union(members) = type_of("a | b | c") else {
        panic!("expected union");
    };
    let names: Vec<&str> = members.iter().map(name_of).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_intersection_is_flat() {
    let TypeExprKind::Intersection(members) = type_of("{ a: number } & { b: string } & c") else {
        panic!("expected intersection");
    };
    assert_eq!(members.len(), 3);
    assert_eq!(name_of(&members[2]), "c");
}

#[test]
fn test_grouping_disambiguates_mixed_operators() {
    let TypeExprKind::Union(members) = type_of("a | (b & c)") else {
        panic!("expected union");
    };
    assert_eq!(members.len(), 2);
    assert!(matches!(&members[1].kind, TypeExprKind::Intersection(m) if m.len() == 2));
}

#[test]
fn test_grouped_chain_of_same_operator_is_spliced() {
    let TypeExprKind::Union(members) = type_of("a | (b | c)") else {
        panic!("expected union");
    };
    let names: Vec<&str> = members.iter().map(name_of).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    let TypeExprKind::Intersection(members) = type_of("(a & b) & c") else {
        panic!("expected intersection");
    };
    assert_eq!(members.len(), 3);
}

#[test]
fn test_mixed_operators_rejected() {
    let err = parse_err("type t = a | b & c");
    assert_eq!(err.code, ErrorCode::MIXED_OPERATORS);
    assert_eq!(err.category, ErrorCategory::Syntax);
    let err = parse_err("type t = a & b | c");
    assert_eq!(err.code, ErrorCode::MIXED_OPERATORS);
}

#[test]
fn test_union_inside_list() {
    let TypeExprKind::List(item) = type_of("[number | null]") else {
        panic!("expected list");
    };
    assert!(matches!(&item.kind, TypeExprKind::Union(m) if m.len() == 2));
}

// ─────────────────────────────────────────────────────────────────────
// Descriptions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_statement_description() {
    let doc = parse_ok("# A user id.\n#   Always positive.\ntype id = number\ntype other = string");
    assert_eq!(
        doc.statements[0].description(),
        Some("A user id.\n   Always positive.")
    );
    assert_eq!(doc.statements[1].description(), None);
}

#[test]
fn test_field_description() {
    let TypeExprKind::Object(fields) = type_of("{\n  # the name\n  name: string\n  age: number\n}")
    else {
        panic!("expected object");
    };
    assert_eq!(fields[0].description.as_deref(), Some("the name"));
    assert_eq!(fields[1].description, None);
}

#[test]
fn test_blank_comment_is_no_description() {
    let doc = parse_ok("#\n#   \ntype a = number");
    assert_eq!(doc.statements[0].description(), None);
}

#[test]
fn test_comments_inside_types_are_ignored() {
    let TypeExprKind::Union(members) = type_of("a # first\n | b # second") else {
        panic!("expected union");
    };
    assert_eq!(members.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────
// Spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_declaration_span_covers_statement() {
    let doc = parse_ok("type pair = (number, string)\n");
    let span = doc.statements[0].span();
    assert_eq!((span.start, span.end), (0, 28));
    assert_eq!((span.line, span.column), (1, 1));
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_token_names_expected_and_found() {
    let err = parse_err("type = number");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(err.message, "expected name, found '='");
    assert_eq!(err.span.map(|s| (s.line, s.column)), Some((1, 6)));
}

#[test]
fn test_missing_arrow_in_call() {
    let err = parse_err("call f: number string");
    assert_eq!(err.message, "expected '=>', found 'string'");
}

#[test]
fn test_unexpected_end_of_file() {
    let err = parse_err("type a =");
    assert_eq!(err.message, "expected type, found end of file");
}

#[test]
fn test_statement_keyword_required() {
    let err = parse_err("number");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert!(err.message.starts_with("expected 'type', 'derive'"));
}

#[test]
fn test_import_requires_string_specifier() {
    let err = parse_err("import { a } from lib");
    assert_eq!(err.message, "expected string literal, found 'lib'");
}

#[test]
fn test_lexical_error_propagates() {
    let err = parse_err("type a = 007");
    assert_eq!(err.category, ErrorCategory::Lexical);
    assert_eq!(err.module_id, "bad.jc");
}

#[test]
fn test_empty_parentheses_rejected() {
    let err = parse_err("type a = ()");
    assert_eq!(err.message, "expected type, found ')'");
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_determinism_100_iterations() {
    let source = "# doc\ntype t = { a: [number | null], b: <(string, boolean)> } & base\ncall c: t => none";
    let first = parse_ok(source);
    for i in 0..100 {
        assert_eq!(parse_ok(source), first, "determinism failure at iteration {i}");
    }
}
