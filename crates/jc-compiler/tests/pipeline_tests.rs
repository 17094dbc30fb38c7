//! End-to-end pipeline tests: source → schema, serialization,
//! fingerprints, renaming and determinism.

use jc_compiler::{compile, compile_source, file_stem_namer, rename, tokens, MemoryResolver};
use jc_lexer::TokenCategory;
use jc_types::schema::Schema;

const MAIN: &str = "\
import { id } from \"./common/ids\"

# A registered user.
type user = {
  id: id
  # Shown in the UI.
  name: string
  role: \"admin\" | \"member\"
}

derive date from string

# Look a user up.
call getUser: (id,) => user | null
call touch: { id: id, at: date } => none

export { user }
";

const IDS: &str = "type id = number\nexport { id }";

fn compile_app() -> Schema {
    let resolver = MemoryResolver::new()
        .with_module("app/main", MAIN)
        .with_module("app/common/ids", IDS);
    match compile("app/main", &resolver) {
        Ok(schema) => schema,
        Err(e) => panic!("unexpected compile error: {e}"),
    }
}

#[test]
fn test_compile_app() {
    let schema = compile_app();
    assert_eq!(schema.entry, "app/main");
    let main = schema.entry_module().unwrap();
    assert_eq!(main.type_definitions.len(), 1);
    assert_eq!(main.derive_definitions.len(), 1);
    assert_eq!(main.call_definitions.len(), 2);
    assert_eq!(main.call_definitions[0].input.to_string(), "(id,)");
    assert_eq!(main.call_definitions[0].output.to_string(), "user | null");
}

#[test]
fn test_schema_json_shape() {
    let schema = compile_source("m", "type pair = (number, \"x\")").unwrap();
    let json = serde_json::to_value(&schema).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "entry": "m",
            "modules": [{
                "id": "m",
                "type_definitions": [{
                    "name": "pair",
                    "type": {
                        "kind": "tuple",
                        "items": [
                            { "kind": "primitive", "primitive": "number" },
                            { "kind": "literal", "value": "x" }
                        ]
                    }
                }],
                "derive_definitions": [],
                "call_definitions": [],
                "link_definitions": []
            }]
        })
    );
    let back: Schema = serde_json::from_value(json).unwrap();
    assert_eq!(back, schema);
}

#[test]
fn test_fingerprint_is_stable() {
    let first = compile_app().fingerprint();
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    for _ in 0..10 {
        assert_eq!(compile_app().fingerprint(), first);
    }
}

#[test]
fn test_fingerprint_tracks_content() {
    let a = compile_source("m", "type a = number").unwrap();
    let b = compile_source("m", "type a = string").unwrap();
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_determinism_100_iterations() {
    let first = compile_app();
    for i in 0..100 {
        assert_eq!(compile_app(), first, "determinism failure at iteration {i}");
    }
}

#[test]
fn test_renamed_schema_still_checks() {
    let renamed = rename(&compile_app(), file_stem_namer);
    let ids: Vec<&str> = renamed.modules.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["ids", "main"]);
    assert_eq!(renamed.entry, "main");
    assert!(jc_compiler::check(&renamed).is_ok());
}

#[test]
fn test_token_categories_for_tooling() {
    let toks = tokens("m", "# hi\ncall f: any => none").unwrap();
    let categories: Vec<TokenCategory> = toks.iter().map(|t| t.category()).collect();
    assert_eq!(categories[0], TokenCategory::Comment);
    assert_eq!(categories[1], TokenCategory::Keyword);
    assert_eq!(categories[4], TokenCategory::SpecialType);
    assert_eq!(*categories.last().unwrap(), TokenCategory::EndOfFile);
}
