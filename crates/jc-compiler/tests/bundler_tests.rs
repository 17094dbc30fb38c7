//! Bundler tests: module ordering, linking, memoization and semantic errors.

use std::cell::RefCell;
use std::collections::HashMap;

use jc_compiler::{bundle, MemoryResolver, ModuleResolver, ResolveError};
use jc_types::schema::{Link, Schema};
use jc_types::{CompileError, ErrorCategory, ErrorCode};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Wraps a [`MemoryResolver`] and counts `read` calls per id.
struct CountingResolver {
    inner: MemoryResolver,
    reads: RefCell<HashMap<String, usize>>,
}

impl CountingResolver {
    fn new(modules: &[(&str, &str)]) -> Self {
        let mut inner = MemoryResolver::new();
        for (id, source) in modules {
            inner.insert(*id, *source);
        }
        Self {
            inner,
            reads: RefCell::new(HashMap::new()),
        }
    }

    fn reads(&self, id: &str) -> usize {
        self.reads.borrow().get(id).copied().unwrap_or(0)
    }

    fn total_reads(&self) -> usize {
        self.reads.borrow().values().sum()
    }
}

impl ModuleResolver for CountingResolver {
    fn resolve(&self, specifier: &str, from: &str) -> Result<String, ResolveError> {
        self.inner.resolve(specifier, from)
    }

    fn read(&self, id: &str) -> Result<String, ResolveError> {
        *self.reads.borrow_mut().entry(id.to_string()).or_default() += 1;
        self.inner.read(id)
    }
}

fn bundle_sources(modules: &[(&str, &str)]) -> Result<Schema, CompileError> {
    let resolver = CountingResolver::new(modules);
    bundle(modules[0].0, &resolver)
}

fn bundle_ok(modules: &[(&str, &str)]) -> Schema {
    match bundle_sources(modules) {
        Ok(schema) => schema,
        Err(e) => panic!("unexpected bundle error: {e}"),
    }
}

fn bundle_err(modules: &[(&str, &str)]) -> CompileError {
    bundle_sources(modules).expect_err("bundling should fail")
}

fn module_ids(schema: &Schema) -> Vec<&str> {
    schema.modules.iter().map(|m| m.id.as_str()).collect()
}

// ─────────────────────────────────────────────────────────────────────
// Single module
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_declaration_example() {
    let schema = bundle_ok(&[(
        "main",
        "type foo1 = number\ntype foo2 = boolean\ncall fooFn: number => string\nderive int from number",
    )]);
    assert_eq!(schema.entry, "main");
    assert_eq!(schema.modules.len(), 1);
    let module = &schema.modules[0];
    assert_eq!(module.type_definitions.len(), 2);
    assert_eq!(module.call_definitions.len(), 1);
    assert_eq!(module.derive_definitions.len(), 1);
    assert_eq!(module.call_definitions[0].name, "fooFn");
    assert_eq!(module.derive_definitions[0].from.to_string(), "number");
}

#[test]
fn test_descriptions_flow_into_ir() {
    let schema = bundle_ok(&[(
        "main",
        "# A user.\ntype user = {\n  # Display name.\n  name: string\n}\n# Fetch one.\ncall getUser: number => user",
    )]);
    let module = &schema.modules[0];
    assert_eq!(module.type_definitions[0].description.as_deref(), Some("A user."));
    assert_eq!(module.call_definitions[0].description.as_deref(), Some("Fetch one."));
    let jc_types::schema::Type::Object { fields } = &module.type_definitions[0].ty else {
        panic!("expected object");
    };
    assert_eq!(fields[0].description.as_deref(), Some("Display name."));
}

#[test]
fn test_exports_are_recorded() {
    let schema = bundle_ok(&[("main", "type a = number\ntype b = string\nexport { a }\nexport { b }")]);
    let module = &schema.modules[0];
    assert!(module.exports("a"));
    assert!(module.exports("b"));
    assert!(!module.exports("c"));
}

#[test]
fn test_duplicate_declarations_are_left_to_checker() {
    let schema = bundle_ok(&[("main", "type a = number\ntype a = string")]);
    assert_eq!(schema.modules[0].type_definitions.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────
// Linking
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_dependencies_come_first() {
    let schema = bundle_ok(&[
        ("main", "import { id } from \"./ids\"\ntype user = { id: id }"),
        ("ids", "type id = number\nexport { id }"),
    ]);
    assert_eq!(module_ids(&schema), vec!["ids", "main"]);
    let link = &schema.modules[1].link_definitions[0];
    assert_eq!(link.from, "ids");
    assert_eq!(
        link.links,
        vec![Link {
            name: "id".into(),
            alias: "id".into(),
        }]
    );
}

#[test]
fn test_import_alias() {
    let schema = bundle_ok(&[
        ("main", "import { id as userId } from \"./ids\"\ntype user = { id: userId }"),
        ("ids", "type id = number\nexport { id }"),
    ]);
    let main = schema.entry_module().unwrap();
    assert_eq!(main.linked_names().collect::<Vec<_>>(), vec!["userId"]);
}

#[test]
fn test_nested_directories() {
    let schema = bundle_ok(&[
        ("api/main", "import { id } from \"../shared/ids\""),
        ("shared/ids", "import { base } from \"./base\"\ntype id = base\nexport { id }"),
        ("shared/base", "type base = number\nexport { base }"),
    ]);
    assert_eq!(module_ids(&schema), vec!["shared/base", "shared/ids", "api/main"]);
}

#[test]
fn test_diamond_import_reads_each_module_once() {
    let modules = [
        ("main", "import { l } from \"./left\"\nimport { r } from \"./right\""),
        ("left", "import { s } from \"./shared\"\ntype l = s\nexport { l }"),
        ("right", "import { s } from \"./shared\"\ntype r = s\nexport { r }"),
        ("shared", "type s = string\nexport { s }"),
    ];
    let resolver = CountingResolver::new(&modules);
    let schema = bundle("main", &resolver).unwrap();

    assert_eq!(module_ids(&schema), vec!["shared", "left", "right", "main"]);
    assert_eq!(resolver.reads("shared"), 1);
    assert_eq!(resolver.total_reads(), 4);
}

#[test]
fn test_memoization_is_per_bundle_call() {
    let modules = [
        ("main", "import { s } from \"./shared\""),
        ("shared", "type s = string\nexport { s }"),
    ];
    let resolver = CountingResolver::new(&modules);
    bundle("main", &resolver).unwrap();
    bundle("main", &resolver).unwrap();
    assert_eq!(resolver.reads("shared"), 2);
}

// ─────────────────────────────────────────────────────────────────────
// Semantic errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_import_of_unexported_name() {
    let err = bundle_err(&[
        ("main", "import { secret } from \"./lib\""),
        ("lib", "type secret = string\ntype open = number\nexport { open }"),
    ]);
    assert_eq!(err.code, ErrorCode::NAME_NOT_EXPORTED);
    assert_eq!(err.category, ErrorCategory::Semantic);
    assert_eq!(err.module_id, "main");
    assert_eq!(err.span.map(|s| (s.line, s.column)), Some((1, 10)));
    assert_eq!(err.fragment.as_deref(), Some("secret"));
}

#[test]
fn test_import_collides_with_declaration() {
    let err = bundle_err(&[
        ("main", "type a = number\nimport { a } from \"./lib\""),
        ("lib", "type a = string\nexport { a }"),
    ]);
    assert_eq!(err.code, ErrorCode::NAME_COLLISION);
    assert_eq!(err.span.map(|s| s.line), Some(2));
    assert_eq!(err.related.map(|s| (s.line, s.column)), Some((1, 6)));
}

#[test]
fn test_declaration_collides_with_import() {
    let err = bundle_err(&[
        ("main", "import { a } from \"./lib\"\ncall a: number => number"),
        ("lib", "type a = string\nexport { a }"),
    ]);
    assert_eq!(err.code, ErrorCode::NAME_COLLISION);
    assert_eq!(err.related.map(|s| s.line), Some(1));
}

#[test]
fn test_two_imports_with_same_alias() {
    let err = bundle_err(&[
        ("main", "import { a } from \"./one\"\nimport { b as a } from \"./two\""),
        ("one", "type a = string\nexport { a }"),
        ("two", "type b = string\nexport { b }"),
    ]);
    assert_eq!(err.code, ErrorCode::NAME_COLLISION);
}

#[test]
fn test_unresolvable_specifier() {
    let err = bundle_err(&[("main", "\nimport { a } from \"./missing\"")]);
    assert_eq!(err.code, ErrorCode::MODULE_NOT_FOUND);
    assert_eq!(err.span.map(|s| (s.line, s.column)), Some((2, 19)));
}

#[test]
fn test_missing_entry() {
    let resolver = MemoryResolver::new();
    let err = bundle("nowhere", &resolver).unwrap_err();
    assert_eq!(err.code, ErrorCode::MODULE_NOT_FOUND);
    assert_eq!(err.module_id, "nowhere");
    assert!(err.span.is_none());
}

#[test]
fn test_circular_import() {
    let err = bundle_err(&[
        ("a", "import { b } from \"./b\"\ntype a = number\nexport { a }"),
        ("b", "import { a } from \"./a\"\ntype b = number\nexport { b }"),
    ]);
    assert_eq!(err.code, ErrorCode::CIRCULAR_IMPORT);
    assert_eq!(err.module_id, "b");
}

#[test]
fn test_self_import() {
    let err = bundle_err(&[("a", "import { x } from \"./a\"\ntype x = number\nexport { x }")]);
    assert_eq!(err.code, ErrorCode::CIRCULAR_IMPORT);
}

#[test]
fn test_syntax_error_in_dependency_names_that_module() {
    let err = bundle_err(&[
        ("main", "import { a } from \"./lib\""),
        ("lib", "type a = = number"),
    ]);
    assert_eq!(err.category, ErrorCategory::Syntax);
    assert_eq!(err.module_id, "lib");
}
