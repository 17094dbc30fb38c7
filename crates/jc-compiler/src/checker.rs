//! Schema checker: consistency rules over a bundled [`Schema`].
//!
//! Entry point: [`check`]. Runs once after bundling and returns the first
//! violation found. Modules are checked in schema order; within a module
//! the phases run names, then links, then references, then calls.
//!
//! Error codes emitted:
//! - E400: duplicate definition name, or import alias shadowing one
//! - E401: name reference that resolves to nothing visible
//! - E402: duplicate export
//! - E403: duplicate object field
//! - E404: export of a name the module does not define or import
//! - E405: link to a name its source module does not export
//! - E406: link to a module missing from the schema
//! - E407: definitions that reach themselves through names, unions and
//!   intersections only
//!
//! The cycle rule is schema-wide and runs after every module passed the
//! per-module phases, since a cycle may cross links.

use std::collections::{HashMap, HashSet};

use jc_types::schema::{Binding, Field, Schema, SchemaModule, Type};
use jc_types::{CompileError, ErrorCode, Result};
use tracing::debug;

/// Check every module of `schema`.
pub fn check(schema: &Schema) -> Result<()> {
    for module in &schema.modules {
        let checker = ModuleChecker::new(module);
        checker.check_names()?;
        checker.check_links(schema)?;
        checker.check_definitions()?;
        checker.check_calls()?;
    }
    check_cycles(schema)?;
    debug!(entry = %schema.entry, modules = schema.modules.len(), "schema checked");
    Ok(())
}

struct ModuleChecker<'a> {
    module: &'a SchemaModule,
    /// Local definitions plus link aliases.
    visible: HashSet<&'a str>,
}

impl<'a> ModuleChecker<'a> {
    fn new(module: &'a SchemaModule) -> Self {
        let visible = module.local_names().chain(module.linked_names()).collect();
        Self { module, visible }
    }

    fn error(&self, code: ErrorCode, message: String) -> CompileError {
        CompileError::unlocated(&self.module.id, code, message)
    }

    // ── Names ─────────────────────────────────────────────────────────────────

    fn check_names(&self) -> Result<()> {
        let mut locals = HashSet::new();
        for name in self.module.local_names() {
            if !locals.insert(name) {
                return Err(self.error(
                    ErrorCode::DUPLICATE_NAME,
                    format!("duplicate definition of '{name}'"),
                ));
            }
        }

        let mut aliases = HashSet::new();
        for alias in self.module.linked_names() {
            if locals.contains(alias) || !aliases.insert(alias) {
                return Err(self.error(
                    ErrorCode::DUPLICATE_NAME,
                    format!("imported name '{alias}' collides with another local name"),
                ));
            }
        }

        if let Some(exports) = &self.module.export_definition {
            let mut seen = HashSet::new();
            for name in &exports.names {
                if !seen.insert(name.as_str()) {
                    return Err(self.error(
                        ErrorCode::DUPLICATE_EXPORT,
                        format!("'{name}' is exported more than once"),
                    ));
                }
                if !self.visible.contains(name.as_str()) {
                    return Err(self.error(
                        ErrorCode::UNKNOWN_EXPORT,
                        format!("cannot export '{name}': it is not defined or imported"),
                    ));
                }
            }
        }
        Ok(())
    }

    // ── Links ─────────────────────────────────────────────────────────────────

    fn check_links(&self, schema: &Schema) -> Result<()> {
        for link_definition in &self.module.link_definitions {
            let Some(source) = schema.module(&link_definition.from) else {
                return Err(self.error(
                    ErrorCode::UNKNOWN_MODULE,
                    format!("link to unknown module '{}'", link_definition.from),
                ));
            };
            for link in &link_definition.links {
                if !source.exports(&link.name) {
                    return Err(self.error(
                        ErrorCode::LINK_NOT_EXPORTED,
                        format!("'{}' is not exported by '{}'", link.name, source.id),
                    ));
                }
            }
        }
        Ok(())
    }

    // ── References ────────────────────────────────────────────────────────────

    fn check_definitions(&self) -> Result<()> {
        for def in &self.module.type_definitions {
            self.check_type(&def.name, &def.ty)?;
        }
        for def in &self.module.derive_definitions {
            self.check_type(&def.name, &def.from)?;
        }
        Ok(())
    }

    fn check_calls(&self) -> Result<()> {
        for def in &self.module.call_definitions {
            self.check_type(&def.name, &def.input)?;
            self.check_type(&def.name, &def.output)?;
        }
        Ok(())
    }

    /// References inside the body of definition `owner` must name some
    /// other visible definition; object field names must be unique.
    fn check_type(&self, owner: &str, ty: &Type) -> Result<()> {
        let mut unresolved = None;
        ty.walk_names(&mut |name| {
            if unresolved.is_none() && (name == owner || !self.visible.contains(name)) {
                unresolved = Some(name);
            }
        });
        if let Some(name) = unresolved {
            let message = if name == owner {
                format!("'{owner}' refers to itself")
            } else {
                format!("unresolved reference '{name}' in '{owner}'")
            };
            return Err(self.error(ErrorCode::UNRESOLVED_REFERENCE, message));
        }

        let mut duplicate = None;
        ty.walk_objects(&mut |fields: &[Field]| {
            if duplicate.is_none() {
                duplicate = first_duplicate_field(fields);
            }
        });
        if let Some(field) = duplicate {
            return Err(self.error(
                ErrorCode::DUPLICATE_FIELD,
                format!("duplicate field '{field}' in '{owner}'"),
            ));
        }
        Ok(())
    }
}

fn first_duplicate_field(fields: &[Field]) -> Option<&str> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .map(|f| f.name.as_str())
        .find(|name| !seen.insert(*name))
}

// ══════════════════════════════════════════════════════════════════════════════
// Cycles
// ══════════════════════════════════════════════════════════════════════════════

/// A type or derive definition: (module id, definition name).
type DefKey<'a> = (&'a str, &'a str);

/// Recursion must pass through a list, tuple, object or record at least
/// once. A cycle of plain references, unions and intersections has no
/// value to bottom out at, and codecs built from it never terminate.
fn check_cycles(schema: &Schema) -> Result<()> {
    let mut finder = CycleFinder {
        edges: HashMap::new(),
        visits: HashMap::new(),
        path: Vec::new(),
    };
    let mut order = Vec::new();
    for module in &schema.modules {
        let bodies = module
            .type_definitions
            .iter()
            .map(|d| (d.name.as_str(), &d.ty))
            .chain(module.derive_definitions.iter().map(|d| (d.name.as_str(), &d.from)));
        for (name, ty) in bodies {
            let mut names = Vec::new();
            unguarded_names(ty, &mut names);
            let targets = names
                .into_iter()
                .filter_map(|n| resolve(schema, module, n))
                .collect();
            let key = (module.id.as_str(), name);
            finder.edges.entry(key).or_insert(targets);
            order.push(key);
        }
    }

    for key in order {
        if let Some(cycle) = finder.visit(key) {
            let (module_id, name) = cycle[0];
            let trail = cycle
                .iter()
                .map(|(m, n)| if *m == module_id { n.to_string() } else { format!("{m}.{n}") })
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(CompileError::unlocated(
                module_id,
                ErrorCode::UNGUARDED_CYCLE,
                format!("'{name}' is defined in terms of itself ({trail}) with no container type in between"),
            ));
        }
    }
    Ok(())
}

/// Names `ty` reaches without entering a list, tuple, object or record.
fn unguarded_names<'a>(ty: &'a Type, out: &mut Vec<&'a str>) {
    match ty {
        Type::Name { name } => out.push(name),
        Type::Union { types } | Type::Intersect { types } => {
            types.iter().for_each(|t| unguarded_names(t, out))
        }
        _ => {}
    }
}

/// Follow links from `module` to the definition `name` is bound to.
/// Calls and dangling names resolve to nothing.
fn resolve<'a>(schema: &'a Schema, module: &'a SchemaModule, name: &'a str) -> Option<DefKey<'a>> {
    let (mut current, mut current_name) = (module, name);
    for _ in 0..=schema.modules.len() {
        match current.lookup(current_name)? {
            Binding::Type(_) | Binding::Derive(_) => return Some((current.id.as_str(), current_name)),
            Binding::Call(_) => return None,
            Binding::Link { module_id, name } => {
                current = schema.module(module_id)?;
                current_name = name;
            }
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Visit {
    Active,
    Done,
}

struct CycleFinder<'a> {
    edges: HashMap<DefKey<'a>, Vec<DefKey<'a>>>,
    visits: HashMap<DefKey<'a>, Visit>,
    /// Definitions on the current depth-first path.
    path: Vec<DefKey<'a>>,
}

impl<'a> CycleFinder<'a> {
    /// Depth-first search from `key`. A cycle comes back as the path that
    /// starts and ends at the same definition.
    fn visit(&mut self, key: DefKey<'a>) -> Option<Vec<DefKey<'a>>> {
        match self.visits.get(&key) {
            Some(Visit::Done) => return None,
            Some(Visit::Active) => {
                let start = self.path.iter().position(|k| *k == key).unwrap_or(0);
                let mut cycle = self.path[start..].to_vec();
                cycle.push(key);
                return Some(cycle);
            }
            None => {}
        }

        self.visits.insert(key, Visit::Active);
        self.path.push(key);
        let targets = self.edges.get(&key).cloned().unwrap_or_default();
        for target in targets {
            if let Some(cycle) = self.visit(target) {
                return Some(cycle);
            }
        }
        self.path.pop();
        self.visits.insert(key, Visit::Done);
        None
    }
}
