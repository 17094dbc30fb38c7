//! The codec algebra.
//!
//! A [`Codec`] pairs a validator with a converter (wire value to domain
//! value) and a reverse converter (domain value to wire value). Codecs are
//! immutable, cheap to clone and safe to share across threads. Composite
//! codecs are built from smaller ones; dispatch is a match on [`CodecKind`].
//!
//! Values are `serde_json::Value`. A codec works on optional *slots*: an
//! absent slot (a missing object field, an empty call payload) is `None`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use jc_types::schema::Primitive;
use serde_json::Value;

use crate::derive::Derivation;

/// A validator/converter pair for one type.
#[derive(Clone)]
pub struct Codec(Arc<CodecInner>);

struct CodecInner {
    kind: CodecKind,
    description: OnceLock<String>,
}

/// The shape of a codec.
#[derive(Clone)]
pub enum CodecKind {
    Primitive(Primitive),
    Any,
    /// Accepts only an absent slot.
    None,
    Literal(Value),
    List(Codec),
    Tuple(Vec<Codec>),
    Object(Vec<ObjectField>),
    /// String-keyed map with values of one codec.
    Record(Codec),
    /// Alternatives in declaration order; the last matching one wins.
    Union(Vec<Codec>),
    Intersection(Vec<Codec>),
    Derive(DeriveCodec),
    /// A named codec filled in after construction (recursive and
    /// cross-module references).
    Reference(LazyCodec),
}

/// A declared object field.
#[derive(Clone)]
pub struct ObjectField {
    pub name: String,
    pub codec: Codec,
    pub description: Option<String>,
}

impl ObjectField {
    pub fn new(name: impl Into<String>, codec: Codec) -> Self {
        Self {
            name: name.into(),
            codec,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A domain codec layered on a wire codec.
#[derive(Clone)]
pub struct DeriveCodec {
    pub name: String,
    pub from: Codec,
    pub derivation: Derivation,
}

/// A single-assignment slot holding a codec that may not exist yet.
#[derive(Clone)]
pub struct LazyCodec {
    name: String,
    cell: Arc<OnceLock<Codec>>,
}

impl LazyCodec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cell: Arc::new(OnceLock::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fill the slot. Returns `false` if it was already filled.
    pub fn set(&self, codec: Codec) -> bool {
        self.cell.set(codec).is_ok()
    }

    pub fn get(&self) -> Option<&Codec> {
        self.cell.get()
    }

    /// A codec forwarding to this slot.
    pub fn codec(&self) -> Codec {
        Codec::new(CodecKind::Reference(self.clone()))
    }
}

/// Payload-free discriminant of a [`CodecKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecTag {
    Number,
    String,
    Null,
    Boolean,
    Any,
    None,
    Literal,
    List,
    Tuple,
    Object,
    Record,
    Union,
    Intersection,
    Derive,
    Reference,
}

impl fmt::Display for CodecTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CodecTag::Number => "number",
            CodecTag::String => "string",
            CodecTag::Null => "null",
            CodecTag::Boolean => "boolean",
            CodecTag::Any => "any",
            CodecTag::None => "none",
            CodecTag::Literal => "literal",
            CodecTag::List => "list",
            CodecTag::Tuple => "tuple",
            CodecTag::Object => "object",
            CodecTag::Record => "record",
            CodecTag::Union => "union",
            CodecTag::Intersection => "intersection",
            CodecTag::Derive => "derive",
            CodecTag::Reference => "reference",
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Construction
// ══════════════════════════════════════════════════════════════════════════════

impl Codec {
    pub fn new(kind: CodecKind) -> Self {
        Self(Arc::new(CodecInner {
            kind,
            description: OnceLock::new(),
        }))
    }

    pub fn number() -> Self {
        Self::new(CodecKind::Primitive(Primitive::Number))
    }

    pub fn string() -> Self {
        Self::new(CodecKind::Primitive(Primitive::String))
    }

    pub fn boolean() -> Self {
        Self::new(CodecKind::Primitive(Primitive::Boolean))
    }

    pub fn null() -> Self {
        Self::new(CodecKind::Primitive(Primitive::Null))
    }

    pub fn any() -> Self {
        Self::new(CodecKind::Any)
    }

    pub fn none() -> Self {
        Self::new(CodecKind::None)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(CodecKind::Literal(value.into()))
    }

    pub fn list(item: Codec) -> Self {
        Self::new(CodecKind::List(item))
    }

    pub fn tuple(items: impl IntoIterator<Item = Codec>) -> Self {
        Self::new(CodecKind::Tuple(items.into_iter().collect()))
    }

    /// An object codec from `(name, codec)` pairs.
    pub fn object<N: Into<String>>(fields: impl IntoIterator<Item = (N, Codec)>) -> Self {
        Self::object_fields(fields.into_iter().map(|(n, c)| ObjectField::new(n, c)))
    }

    pub fn object_fields(fields: impl IntoIterator<Item = ObjectField>) -> Self {
        Self::new(CodecKind::Object(fields.into_iter().collect()))
    }

    pub fn record(item: Codec) -> Self {
        Self::new(CodecKind::Record(item))
    }

    pub fn union(alternatives: impl IntoIterator<Item = Codec>) -> Self {
        Self::new(CodecKind::Union(alternatives.into_iter().collect()))
    }

    pub fn intersection(operands: impl IntoIterator<Item = Codec>) -> Self {
        Self::new(CodecKind::Intersection(operands.into_iter().collect()))
    }

    /// Layer `derivation` on top of `from` under `name`.
    pub fn derive(name: impl Into<String>, from: Codec, derivation: Derivation) -> Self {
        Self::new(CodecKind::Derive(DeriveCodec {
            name: name.into(),
            from,
            derivation,
        }))
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    pub fn kind(&self) -> &CodecKind {
        &self.0.kind
    }

    pub fn tag(&self) -> CodecTag {
        match &self.0.kind {
            CodecKind::Primitive(Primitive::Number) => CodecTag::Number,
            CodecKind::Primitive(Primitive::String) => CodecTag::String,
            CodecKind::Primitive(Primitive::Null) => CodecTag::Null,
            CodecKind::Primitive(Primitive::Boolean) => CodecTag::Boolean,
            CodecKind::Any => CodecTag::Any,
            CodecKind::None => CodecTag::None,
            CodecKind::Literal(_) => CodecTag::Literal,
            CodecKind::List(_) => CodecTag::List,
            CodecKind::Tuple(_) => CodecTag::Tuple,
            CodecKind::Object(_) => CodecTag::Object,
            CodecKind::Record(_) => CodecTag::Record,
            CodecKind::Union(_) => CodecTag::Union,
            CodecKind::Intersection(_) => CodecTag::Intersection,
            CodecKind::Derive(_) => CodecTag::Derive,
            CodecKind::Reference(_) => CodecTag::Reference,
        }
    }

    /// Whether two handles share the same codec instance.
    pub fn ptr_eq(&self, other: &Codec) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Human-readable type description, used in validation messages.
    ///
    /// Computed on first use and cached; references render as their name,
    /// so recursive codecs terminate.
    pub fn description(&self) -> &str {
        self.0.description.get_or_init(|| describe(&self.0.kind))
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codec({})", self.description())
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Descriptions
// ══════════════════════════════════════════════════════════════════════════════

fn describe(kind: &CodecKind) -> String {
    match kind {
        CodecKind::Primitive(p) => p.as_str().to_string(),
        CodecKind::Any => "any".to_string(),
        CodecKind::None => "none".to_string(),
        CodecKind::Literal(value) => describe_literal(value),
        CodecKind::List(item) => format!("{}[]", grouped(item)),
        CodecKind::Tuple(items) => format!("[{}]", join(items, ", ")),
        CodecKind::Object(fields) if fields.is_empty() => "{}".to_string(),
        CodecKind::Object(fields) => {
            let body: Vec<String> = fields
                .iter()
                .map(|f| format!("{}: {}", f.name, f.codec.description()))
                .collect();
            format!("{{ {} }}", body.join(", "))
        }
        CodecKind::Record(item) => format!("{{ [key: string]: {} }}", item.description()),
        CodecKind::Union(alternatives) => join_grouped(alternatives, " | "),
        CodecKind::Intersection(operands) => join_grouped(operands, " & "),
        CodecKind::Derive(derive) => derive.name.clone(),
        CodecKind::Reference(lazy) => lazy.name.clone(),
    }
}

/// Integral numbers render without a fraction: `1`, not `1.0`.
fn describe_literal(value: &Value) -> String {
    match value.as_f64() {
        Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        _ => value.to_string(),
    }
}

fn join(codecs: &[Codec], separator: &str) -> String {
    codecs
        .iter()
        .map(|c| c.description())
        .collect::<Vec<_>>()
        .join(separator)
}

fn join_grouped(codecs: &[Codec], separator: &str) -> String {
    codecs.iter().map(grouped).collect::<Vec<_>>().join(separator)
}

/// Parenthesize union and intersection descriptions when nested.
fn grouped(codec: &Codec) -> String {
    match codec.kind() {
        CodecKind::Union(_) | CodecKind::Intersection(_) => format!("({})", codec.description()),
        _ => codec.description().to_string(),
    }
}
