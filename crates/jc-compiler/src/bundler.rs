//! Bundler: loads an entry module and everything it imports into one
//! dependency-ordered [`Schema`].
//!
//! Each module is parsed, then its statements are lowered to IR in source
//! order through a [`ModuleBuilder`]. Imports load their target module
//! recursively. Loads are memoized per [`bundle`] call, keyed by resolved
//! module id, so a module imported from several places is read once.
//!
//! Error codes emitted:
//! - E300: imported name is not exported by its module
//! - E301: import alias or declaration collides with an existing local name
//! - E302: specifier cannot be resolved or module cannot be read
//! - E303: circular import

use std::collections::HashMap;

use jc_parser::parse_source;
use jc_types::ast::{self, Ident, ImportStmt, Statement, TypeExpr, TypeExprKind};
use jc_types::schema::*;
use jc_types::{CompileError, ErrorCode, Result, SourceFile, Span};
use tracing::{debug, trace};

use crate::resolver::ModuleResolver;

/// Bundle `entry` and all modules reachable from it.
///
/// The returned schema lists every module after the modules it imports;
/// the entry module is last. The schema is not checked; see
/// [`check`](crate::check).
pub fn bundle<R: ModuleResolver + ?Sized>(entry: &str, resolver: &R) -> Result<Schema> {
    let source = resolver.read(entry).map_err(|e| {
        CompileError::unlocated(entry, ErrorCode::MODULE_NOT_FOUND, e.to_string())
    })?;

    let mut bundler = Bundler {
        resolver,
        states: HashMap::new(),
        modules: Vec::new(),
    };
    bundler.states.insert(entry.to_string(), LoadState::Loading);
    bundler.load(entry, source)?;

    debug!(entry, modules = bundler.modules.len(), "bundled schema");
    Ok(Schema {
        entry: entry.to_string(),
        modules: bundler.modules,
    })
}

// ══════════════════════════════════════════════════════════════════════════════
// Bundler
// ══════════════════════════════════════════════════════════════════════════════

enum LoadState {
    /// On the current import chain.
    Loading,
    /// Finished; index into `modules`.
    Loaded(usize),
}

struct Bundler<'r, R: ?Sized> {
    resolver: &'r R,
    states: HashMap<String, LoadState>,
    modules: Vec<SchemaModule>,
}

impl<R: ModuleResolver + ?Sized> Bundler<'_, R> {
    /// Parse and lower one module. Returns its index in `modules`.
    fn load(&mut self, id: &str, source: String) -> Result<usize> {
        debug!(module = id, "loading module");
        let file = SourceFile::new(id, source);
        let document = parse_source(&file)?;

        let mut builder = ModuleBuilder::new(&file);
        for statement in &document.statements {
            match statement {
                Statement::Type(decl) => {
                    builder.declare(&decl.name)?;
                    builder.module.type_definitions.push(TypeDefinition {
                        name: decl.name.name.clone(),
                        ty: lower(&decl.ty),
                        description: decl.description.clone(),
                    });
                }
                Statement::Derive(decl) => {
                    builder.declare(&decl.name)?;
                    builder.module.derive_definitions.push(DeriveDefinition {
                        name: decl.name.name.clone(),
                        from: lower(&decl.from),
                        description: decl.description.clone(),
                    });
                }
                Statement::Call(decl) => {
                    builder.declare(&decl.name)?;
                    builder.module.call_definitions.push(CallDefinition {
                        name: decl.name.name.clone(),
                        input: lower(&decl.input),
                        output: lower(&decl.output),
                        description: decl.description.clone(),
                    });
                }
                Statement::Import(import) => self.link(&mut builder, import)?,
                Statement::Export(export) => builder.export(&export.names),
            }
        }

        let index = self.modules.len();
        self.modules.push(builder.finish());
        self.states.insert(id.to_string(), LoadState::Loaded(index));
        Ok(index)
    }

    /// Load the module an import points at and bind its names locally.
    fn link(&mut self, builder: &mut ModuleBuilder<'_>, import: &ImportStmt) -> Result<()> {
        let file = builder.file;
        let target = self
            .resolver
            .resolve(&import.specifier, &file.name)
            .map_err(|e| {
                CompileError::new(file, ErrorCode::MODULE_NOT_FOUND, e.to_string(), import.specifier_span)
                    .with_fragment(file.slice(import.span))
            })?;

        let index = self.load_dependency(&target, file, import)?;

        let mut links = Vec::with_capacity(import.items.len());
        for item in &import.items {
            if !self.modules[index].exports(&item.name.name) {
                return Err(CompileError::new(
                    file,
                    ErrorCode::NAME_NOT_EXPORTED,
                    format!("'{}' is not exported by '{target}'", item.name.name),
                    item.name.span,
                )
                .with_fragment(file.slice(item.span)));
            }
            builder.bind_import(item.local_name())?;
            links.push(Link {
                name: item.name.name.clone(),
                alias: item.local_name().name.clone(),
            });
        }

        builder.module.link_definitions.push(LinkDefinition {
            from: target,
            links,
        });
        Ok(())
    }

    fn load_dependency(&mut self, target: &str, file: &SourceFile, import: &ImportStmt) -> Result<usize> {
        match self.states.get(target) {
            Some(LoadState::Loaded(index)) => {
                trace!(module = target, importer = %file.name, "module cache hit");
                Ok(*index)
            }
            Some(LoadState::Loading) => {
                debug!(module = target, importer = %file.name, "circular import");
                Err(CompileError::new(
                    file,
                    ErrorCode::CIRCULAR_IMPORT,
                    format!("circular import of '{target}'"),
                    import.specifier_span,
                )
                .with_fragment(file.slice(import.span)))
            }
            None => {
                self.states.insert(target.to_string(), LoadState::Loading);
                let source = self.resolver.read(target).map_err(|e| {
                    CompileError::new(file, ErrorCode::MODULE_NOT_FOUND, e.to_string(), import.specifier_span)
                        .with_fragment(file.slice(import.span))
                })?;
                self.load(target, source)
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// ModuleBuilder
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Declared,
    Imported,
}

/// Mutable state for the module being lowered.
struct ModuleBuilder<'f> {
    file: &'f SourceFile,
    module: SchemaModule,
    /// First registration of every local name.
    names: HashMap<String, (Origin, Span)>,
}

impl<'f> ModuleBuilder<'f> {
    fn new(file: &'f SourceFile) -> Self {
        Self {
            file,
            module: SchemaModule::new(file.name.clone()),
            names: HashMap::new(),
        }
    }

    /// Register a declared name. Declared-vs-declared duplicates are left to
    /// the checker; clashing with an imported name is an error here.
    fn declare(&mut self, name: &Ident) -> Result<()> {
        match self.names.get(&name.name) {
            Some(&(Origin::Imported, earlier)) => Err(self.collision(name, earlier)),
            Some(_) => Ok(()),
            None => {
                self.names.insert(name.name.clone(), (Origin::Declared, name.span));
                Ok(())
            }
        }
    }

    /// Register an import alias. Any earlier local name is a collision.
    fn bind_import(&mut self, alias: &Ident) -> Result<()> {
        if let Some(&(_, earlier)) = self.names.get(&alias.name) {
            return Err(self.collision(alias, earlier));
        }
        self.names.insert(alias.name.clone(), (Origin::Imported, alias.span));
        Ok(())
    }

    fn collision(&self, name: &Ident, earlier: Span) -> CompileError {
        CompileError::new(
            self.file,
            ErrorCode::NAME_COLLISION,
            format!("'{}' is already defined at {earlier}", name.name),
            name.span,
        )
        .with_related(earlier)
        .with_fragment(self.file.slice(name.span))
    }

    fn export(&mut self, names: &[Ident]) {
        self.module
            .export_definition
            .get_or_insert_with(ExportDefinition::default)
            .names
            .extend(names.iter().map(|n| n.name.clone()));
    }

    fn finish(self) -> SchemaModule {
        self.module
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// AST → IR
// ══════════════════════════════════════════════════════════════════════════════

/// Lower a type expression to its IR form.
fn lower(expr: &TypeExpr) -> Type {
    match &expr.kind {
        TypeExprKind::Primitive(p) => Type::Primitive {
            primitive: match p {
                ast::PrimitiveName::Number => Primitive::Number,
                ast::PrimitiveName::String => Primitive::String,
                ast::PrimitiveName::Null => Primitive::Null,
                ast::PrimitiveName::Boolean => Primitive::Boolean,
            },
        },
        TypeExprKind::Special(s) => Type::Special {
            special: match s {
                ast::SpecialName::Any => Special::Any,
                ast::SpecialName::None => Special::None,
            },
        },
        TypeExprKind::Literal(value) => Type::Literal {
            value: match value {
                ast::LiteralValue::Boolean(b) => Literal::Boolean(*b),
                ast::LiteralValue::Number(n) => Literal::Number(*n),
                ast::LiteralValue::String(s) => Literal::String(s.clone()),
            },
        },
        TypeExprKind::List(item) => Type::List {
            item: Box::new(lower(item)),
        },
        TypeExprKind::Record(item) => Type::Record {
            item: Box::new(lower(item)),
        },
        TypeExprKind::Object(fields) => Type::Object {
            fields: fields
                .iter()
                .map(|f| Field {
                    name: f.name.name.clone(),
                    ty: lower(&f.ty),
                    description: f.description.clone(),
                })
                .collect(),
        },
        TypeExprKind::Tuple(items) => Type::Tuple {
            items: items.iter().map(lower).collect(),
        },
        TypeExprKind::Union(members) => Type::Union {
            types: members.iter().map(lower).collect(),
        },
        TypeExprKind::Intersection(members) => Type::Intersect {
            types: members.iter().map(lower).collect(),
        },
        TypeExprKind::Name(ident) => Type::Name {
            name: ident.name.clone(),
        },
    }
}
