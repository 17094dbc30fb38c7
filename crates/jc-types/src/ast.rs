//! AST node types for JC schema source.
//!
//! Every node carries a [`Span`] for error reporting. Declarations, imports,
//! exports and object fields also carry the comment block written directly
//! above them as an optional description.
//! Union and intersection chains are stored flat, in source order.

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A parsed source module: statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Type(TypeDecl),
    Derive(DeriveDecl),
    Call(CallDecl),
    Import(ImportStmt),
    Export(ExportStmt),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Type(d) => d.span,
            Statement::Derive(d) => d.span,
            Statement::Call(d) => d.span,
            Statement::Import(s) => s.span,
            Statement::Export(s) => s.span,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Statement::Type(d) => d.description.as_deref(),
            Statement::Derive(d) => d.description.as_deref(),
            Statement::Call(d) => d.description.as_deref(),
            Statement::Import(s) => s.description.as_deref(),
            Statement::Export(s) => s.description.as_deref(),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations
// ══════════════════════════════════════════════════════════════════════════════

/// `type Name = Type`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: Ident,
    pub ty: TypeExpr,
    pub description: Option<String>,
    pub span: Span,
}

/// `derive Name from Type`
#[derive(Debug, Clone, PartialEq)]
pub struct DeriveDecl {
    pub name: Ident,
    pub from: TypeExpr,
    pub description: Option<String>,
    pub span: Span,
}

/// `call Name: Input => Output`
#[derive(Debug, Clone, PartialEq)]
pub struct CallDecl {
    pub name: Ident,
    pub input: TypeExpr,
    pub output: TypeExpr,
    pub description: Option<String>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// `import { a, b as c } from "specifier"`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub items: Vec<ImportItem>,
    pub specifier: String,
    pub specifier_span: Span,
    pub description: Option<String>,
    pub span: Span,
}

/// One imported name, optionally aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    pub name: Ident,
    pub alias: Option<Ident>,
    pub span: Span,
}

impl ImportItem {
    /// The name the import is visible under in the importing module.
    pub fn local_name(&self) -> &Ident {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

/// `export { a, b }`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStmt {
    pub names: Vec<Ident>,
    pub description: Option<String>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Type Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// A type expression with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveName {
    Number,
    String,
    Null,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialName {
    Any,
    None,
}

/// A literal type value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// `number`, `string`, `null`, `boolean`
    Primitive(PrimitiveName),
    /// `any`, `none`
    Special(SpecialName),
    /// `[T]`
    List(Box<TypeExpr>),
    /// `{ name: T, ... }`
    Object(Vec<ObjectField>),
    /// `(T, U, ...)`
    Tuple(Vec<TypeExpr>),
    /// `<T>`: string-keyed map of `T`
    Record(Box<TypeExpr>),
    /// `"foo"`, `1`, `true`
    Literal(LiteralValue),
    /// `A | B | C`
    Union(Vec<TypeExpr>),
    /// `A & B & C`
    Intersection(Vec<TypeExpr>),
    /// A reference to a declared or imported name.
    Name(Ident),
}

/// A field of an object type: `name: T`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: Ident,
    pub ty: TypeExpr,
    pub description: Option<String>,
    pub span: Span,
}
