//! Building codecs from a checked [`Schema`].
//!
//! Every type and derive definition of every module gets one codec. Name
//! references become [`LazyCodec`] slots that are filled once all
//! definitions are built, so recursive and cross-module references work
//! without ordering constraints.

use std::collections::{BTreeMap, HashMap};

use jc_types::schema::{Binding, Schema, SchemaModule, Special, Type};
use tracing::debug;

use crate::codec::{Codec, CodecKind, LazyCodec, ObjectField};
use crate::derive::Derivations;
use crate::error::CodecBuildError;

/// Input and output codecs of one call definition.
#[derive(Debug, Clone)]
pub struct CallCodecs {
    pub name: String,
    pub input: Codec,
    pub output: Codec,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
struct ModuleCodecs {
    codecs: BTreeMap<String, Codec>,
    /// In declaration order.
    calls: Vec<CallCodecs>,
}

/// All codecs of a schema, by module and name.
#[derive(Debug)]
pub struct CodecRegistry {
    entry: String,
    modules: BTreeMap<String, ModuleCodecs>,
}

impl CodecRegistry {
    /// Build codecs for `schema`.
    ///
    /// Derive definitions take their behaviour from `derivations`, looked
    /// up by definition name. The schema should have passed the checker;
    /// unresolvable names are still reported rather than panicking.
    pub fn from_schema(schema: &Schema, derivations: &Derivations) -> Result<Self, CodecBuildError> {
        let mut builder = RegistryBuilder {
            schema,
            slots: HashMap::new(),
        };
        for module in &schema.modules {
            let names = module
                .type_definitions
                .iter()
                .map(|d| &d.name)
                .chain(module.derive_definitions.iter().map(|d| &d.name));
            for name in names {
                builder
                    .slots
                    .entry((module.id.clone(), name.clone()))
                    .or_insert_with(|| LazyCodec::new(name.clone()));
            }
        }

        let mut modules = BTreeMap::new();
        for module in &schema.modules {
            let mut codecs = ModuleCodecs::default();

            for def in &module.type_definitions {
                let codec = builder.build(module, &def.ty)?;
                builder.define(module, &def.name, codec, &mut codecs);
            }
            for def in &module.derive_definitions {
                let derivation = derivations.get(&def.name).ok_or_else(|| {
                    CodecBuildError::MissingDerivation {
                        module: module.id.clone(),
                        name: def.name.clone(),
                    }
                })?;
                let from = builder.build(module, &def.from)?;
                let codec = Codec::derive(def.name.clone(), from, derivation.clone());
                builder.define(module, &def.name, codec, &mut codecs);
            }
            for def in &module.call_definitions {
                codecs.calls.push(CallCodecs {
                    name: def.name.clone(),
                    input: builder.build(module, &def.input)?,
                    output: builder.build(module, &def.output)?,
                    description: def.description.clone(),
                });
            }

            modules.insert(module.id.clone(), codecs);
        }

        debug!(
            entry = %schema.entry,
            modules = modules.len(),
            codecs = builder.slots.len(),
            "codec registry built"
        );
        Ok(Self {
            entry: schema.entry.clone(),
            modules,
        })
    }

    /// Id of the schema's entry module.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Codec of a type or derive definition in the entry module.
    pub fn codec(&self, name: &str) -> Option<&Codec> {
        self.codec_in(&self.entry, name)
    }

    pub fn codec_in(&self, module: &str, name: &str) -> Option<&Codec> {
        self.modules.get(module)?.codecs.get(name)
    }

    /// Codecs of a call definition in the entry module.
    pub fn call(&self, name: &str) -> Option<&CallCodecs> {
        self.calls().find(|c| c.name == name)
    }

    /// Calls of the entry module, in declaration order.
    pub fn calls(&self) -> impl Iterator<Item = &CallCodecs> {
        self.modules
            .get(&self.entry)
            .into_iter()
            .flat_map(|m| m.calls.iter())
    }
}

struct RegistryBuilder<'s> {
    schema: &'s Schema,
    /// One slot per (module id, definition name).
    slots: HashMap<(String, String), LazyCodec>,
}

impl<'s> RegistryBuilder<'s> {
    /// Publish a built definition. The first definition of a name wins.
    fn define(&self, module: &SchemaModule, name: &str, codec: Codec, out: &mut ModuleCodecs) {
        if let Some(slot) = self.slots.get(&(module.id.clone(), name.to_string())) {
            if slot.set(codec.clone()) {
                out.codecs.insert(name.to_string(), codec);
            }
        }
    }

    fn build(&self, module: &'s SchemaModule, ty: &'s Type) -> Result<Codec, CodecBuildError> {
        let codec = match ty {
            Type::Primitive { primitive } => Codec::new(CodecKind::Primitive(*primitive)),
            Type::Special {
                special: Special::Any,
            } => Codec::any(),
            Type::Special {
                special: Special::None,
            } => Codec::none(),
            Type::Literal { value } => Codec::literal(value.to_json()),
            Type::List { item } => Codec::list(self.build(module, item)?),
            Type::Record { item } => Codec::record(self.build(module, item)?),
            Type::Tuple { items } => Codec::tuple(self.build_all(module, items)?),
            Type::Union { types } => Codec::union(self.build_all(module, types)?),
            Type::Intersect { types } => Codec::intersection(self.build_all(module, types)?),
            Type::Object { fields } => {
                let mut built = Vec::with_capacity(fields.len());
                for field in fields {
                    let mut object_field = ObjectField::new(field.name.clone(), self.build(module, &field.ty)?);
                    object_field.description = field.description.clone();
                    built.push(object_field);
                }
                Codec::object_fields(built)
            }
            Type::Name { name } => self.reference(module, name)?,
        };
        Ok(codec)
    }

    fn build_all(&self, module: &'s SchemaModule, types: &'s [Type]) -> Result<Vec<Codec>, CodecBuildError> {
        types.iter().map(|t| self.build(module, t)).collect()
    }

    /// Follow links (including re-exports) to the defining module and
    /// return a reference to that definition's slot.
    fn reference(&self, module: &'s SchemaModule, name: &'s str) -> Result<Codec, CodecBuildError> {
        let unresolved = || CodecBuildError::UnresolvedName {
            module: module.id.clone(),
            name: name.to_string(),
        };

        let (mut current, mut current_name) = (module, name);
        // A well-formed link chain visits each module at most once.
        for _ in 0..=self.schema.modules.len() {
            match current.lookup(current_name) {
                Some(Binding::Type(_)) | Some(Binding::Derive(_)) => {
                    let key = (current.id.clone(), current_name.to_string());
                    return self.slots.get(&key).map(LazyCodec::codec).ok_or_else(unresolved);
                }
                Some(Binding::Call(_)) => {
                    return Err(CodecBuildError::NotAType {
                        module: current.id.clone(),
                        name: current_name.to_string(),
                    })
                }
                Some(Binding::Link {
                    module_id,
                    name: linked,
                }) => {
                    current = self
                        .schema
                        .module(module_id)
                        .ok_or_else(|| CodecBuildError::UnknownModule(module_id.to_string()))?;
                    current_name = linked;
                }
                None => return Err(unresolved()),
            }
        }
        Err(unresolved())
    }
}
