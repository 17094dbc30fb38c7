//! Schema IR: the normalized, linked representation of one or more modules.
//!
//! A [`Schema`] is produced by the bundler, verified by the checker and
//! consumed by code generators and the codec registry. It is plain data and
//! serializes to JSON with `kind`-tagged types.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Schema & Modules
// ══════════════════════════════════════════════════════════════════════════════

/// A bundled schema. Modules are dependency-ordered: every module appears
/// after all modules it imports, so the entry module is last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub entry: String,
    pub modules: Vec<SchemaModule>,
}

impl Schema {
    /// Look up a module by id.
    pub fn module(&self, id: &str) -> Option<&SchemaModule> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// The entry module, if present.
    pub fn entry_module(&self) -> Option<&SchemaModule> {
        self.module(&self.entry)
    }

    /// Hex SHA-256 over the schema's canonical JSON form.
    ///
    /// Identical sources bundle to identical fingerprints.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        Sha256::digest(&canonical)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

/// One source module after linking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaModule {
    pub id: String,
    pub type_definitions: Vec<TypeDefinition>,
    pub derive_definitions: Vec<DeriveDefinition>,
    pub call_definitions: Vec<CallDefinition>,
    pub link_definitions: Vec<LinkDefinition>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub export_definition: Option<ExportDefinition>,
}

impl SchemaModule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Names declared by this module (types, derives, calls), in that order.
    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.type_definitions
            .iter()
            .map(|d| d.name.as_str())
            .chain(self.derive_definitions.iter().map(|d| d.name.as_str()))
            .chain(self.call_definitions.iter().map(|d| d.name.as_str()))
    }

    /// Names visible through imports, under their local alias.
    pub fn linked_names(&self) -> impl Iterator<Item = &str> {
        self.link_definitions
            .iter()
            .flat_map(|l| l.links.iter().map(|link| link.alias.as_str()))
    }

    /// Whether `name` is listed in this module's export set.
    pub fn exports(&self, name: &str) -> bool {
        self.export_definition
            .as_ref()
            .is_some_and(|e| e.names.iter().any(|n| n == name))
    }

    /// Find where a visible name comes from.
    pub fn lookup(&self, name: &str) -> Option<Binding<'_>> {
        if let Some(def) = self.type_definitions.iter().find(|d| d.name == name) {
            return Some(Binding::Type(def));
        }
        if let Some(def) = self.derive_definitions.iter().find(|d| d.name == name) {
            return Some(Binding::Derive(def));
        }
        if let Some(def) = self.call_definitions.iter().find(|d| d.name == name) {
            return Some(Binding::Call(def));
        }
        self.link_definitions.iter().find_map(|l| {
            l.links
                .iter()
                .find(|link| link.alias == name)
                .map(|link| Binding::Link {
                    module_id: &l.from,
                    name: &link.name,
                })
        })
    }
}

/// What a visible name in a module is bound to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding<'a> {
    Type(&'a TypeDefinition),
    Derive(&'a DeriveDefinition),
    Call(&'a CallDefinition),
    /// An imported name: look up `name` in module `module_id`.
    Link { module_id: &'a str, name: &'a str },
}

// ══════════════════════════════════════════════════════════════════════════════
// Definitions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// A domain type layered on a wire type; its runtime behaviour is supplied
/// by the host as a derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeriveDefinition {
    pub name: String,
    pub from: Type,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDefinition {
    pub name: String,
    pub input: Type,
    pub output: Type,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// An import from one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDefinition {
    /// Id of the module the names come from.
    pub from: String,
    pub links: Vec<Link>,
}

/// `name` as exported by the source module, visible locally as `alias`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub alias: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDefinition {
    pub names: Vec<String>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Types
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Number,
    String,
    Null,
    Boolean,
}

impl Primitive {
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::Null => "null",
            Primitive::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Special {
    Any,
    None,
}

impl Special {
    pub fn as_str(self) -> &'static str {
        match self {
            Special::Any => "any",
            Special::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Literal {
    /// The literal as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Literal::Boolean(b) => serde_json::Value::Bool(*b),
            Literal::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Literal::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// A field of an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// A type in the IR. Closed set of shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Type {
    Primitive { primitive: Primitive },
    Special { special: Special },
    Literal { value: Literal },
    List { item: Box<Type> },
    Object { fields: Vec<Field> },
    Tuple { items: Vec<Type> },
    Record { item: Box<Type> },
    /// Ordered alternatives.
    Union { types: Vec<Type> },
    /// Ordered operands.
    Intersect { types: Vec<Type> },
    Name { name: String },
}

impl Type {
    /// Visit every name reference in this type, depth-first, in source order.
    pub fn walk_names<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        match self {
            Type::Primitive { .. } | Type::Special { .. } | Type::Literal { .. } => {}
            Type::List { item } | Type::Record { item } => item.walk_names(visit),
            Type::Object { fields } => fields.iter().for_each(|f| f.ty.walk_names(visit)),
            Type::Tuple { items: types }
            | Type::Union { types }
            | Type::Intersect { types } => types.iter().for_each(|t| t.walk_names(visit)),
            Type::Name { name } => visit(name),
        }
    }

    /// Visit every object type in this type, outermost first.
    pub fn walk_objects<'a>(&'a self, visit: &mut impl FnMut(&'a [Field])) {
        match self {
            Type::Primitive { .. }
            | Type::Special { .. }
            | Type::Literal { .. }
            | Type::Name { .. } => {}
            Type::List { item } | Type::Record { item } => item.walk_objects(visit),
            Type::Object { fields } => {
                visit(fields.as_slice());
                fields.iter().for_each(|f| f.ty.walk_objects(visit));
            }
            Type::Tuple { items: types }
            | Type::Union { types }
            | Type::Intersect { types } => types.iter().for_each(|t| t.walk_objects(visit)),
        }
    }
}

/// Renders the type in source syntax.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, types: &[Type], sep: &str) -> fmt::Result {
            for (i, t) in types.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                match t {
                    Type::Union { .. } | Type::Intersect { .. } => write!(f, "({t})")?,
                    _ => write!(f, "{t}")?,
                }
            }
            Ok(())
        }

        match self {
            Type::Primitive { primitive } => f.write_str(primitive.as_str()),
            Type::Special { special } => f.write_str(special.as_str()),
            Type::Literal { value } => write!(f, "{value}"),
            Type::List { item } => write!(f, "[{item}]"),
            Type::Object { fields } => {
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {}: {}", field.name, field.ty)?;
                }
                if fields.is_empty() {
                    f.write_str("}")
                } else {
                    f.write_str(" }")
                }
            }
            Type::Tuple { items } => {
                f.write_str("(")?;
                join(f, items, ", ")?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Type::Record { item } => write!(f, "<{item}>"),
            Type::Union { types } => join(f, types, " | "),
            Type::Intersect { types } => join(f, types, " & "),
            Type::Name { name } => f.write_str(name),
        }
    }
}
