//! Module resolution: turning import specifiers into module ids and ids
//! into source text.
//!
//! The bundler never touches the filesystem directly; it goes through a
//! [`ModuleResolver`]. [`FsResolver`] treats ids as filesystem paths and
//! [`MemoryResolver`] serves sources from a map.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Resolves import specifiers and reads module sources.
pub trait ModuleResolver {
    /// Map `specifier`, written in module `from`, to a module id.
    fn resolve(&self, specifier: &str, from: &str) -> Result<String, ResolveError>;

    /// Read the source text of module `id`.
    fn read(&self, id: &str) -> Result<String, ResolveError>;
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot resolve '{specifier}' from '{from}'")]
    NotFound { specifier: String, from: String },
    #[error("module '{0}' does not exist")]
    Missing(String),
    #[error("cannot read module '{id}': {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Join `specifier` onto the directory of module `from`.
///
/// `./` and `../` specifiers are relative to the importing module; anything
/// else is relative to `root`.
fn join_specifier(root: &Path, from: &str, specifier: &str) -> PathBuf {
    let relative = specifier.starts_with("./") || specifier.starts_with("../");
    let base = if relative {
        Path::new(from).parent().unwrap_or(Path::new("")).to_path_buf()
    } else {
        root.to_path_buf()
    };
    normalize(&base.join(specifier))
}

/// Lexically collapse `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ══════════════════════════════════════════════════════════════════════════════
// FsResolver
// ══════════════════════════════════════════════════════════════════════════════

/// Resolves ids as filesystem paths.
///
/// Specifiers without an extension get the configured one (`jc` by
/// default), so `import { a } from "./common"` loads `common.jc` next to
/// the importing file.
#[derive(Debug, Clone)]
pub struct FsResolver {
    root: PathBuf,
    extension: String,
}

impl Default for FsResolver {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            extension: "jc".to_string(),
        }
    }
}

impl FsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory bare (non-relative) specifiers are resolved against.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Extension appended to specifiers that have none. Empty disables it.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl ModuleResolver for FsResolver {
    fn resolve(&self, specifier: &str, from: &str) -> Result<String, ResolveError> {
        let mut path = join_specifier(&self.root, from, specifier);
        if path.extension().is_none() && !self.extension.is_empty() {
            path.set_extension(&self.extension);
        }
        if !path.is_file() {
            return Err(ResolveError::NotFound {
                specifier: specifier.to_string(),
                from: from.to_string(),
            });
        }
        Ok(path.to_string_lossy().into_owned())
    }

    fn read(&self, id: &str) -> Result<String, ResolveError> {
        std::fs::read_to_string(id).map_err(|source| ResolveError::Io {
            id: id.to_string(),
            source,
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// MemoryResolver
// ══════════════════════════════════════════════════════════════════════════════

/// Serves module sources from memory. Ids are path-like keys (`"main"`,
/// `"lib/common"`); specifiers resolve the same way as on the filesystem,
/// without extension handling.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    modules: BTreeMap<String, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module, builder style.
    pub fn with_module(mut self, id: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(id, source);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, source: impl Into<String>) {
        self.modules.insert(id.into(), source.into());
    }
}

impl ModuleResolver for MemoryResolver {
    fn resolve(&self, specifier: &str, from: &str) -> Result<String, ResolveError> {
        let id = join_specifier(Path::new(""), from, specifier)
            .to_string_lossy()
            .into_owned();
        if self.modules.contains_key(&id) {
            Ok(id)
        } else {
            Err(ResolveError::NotFound {
                specifier: specifier.to_string(),
                from: from.to_string(),
            })
        }
    }

    fn read(&self, id: &str) -> Result<String, ResolveError> {
        self.modules
            .get(id)
            .cloned()
            .ok_or_else(|| ResolveError::Missing(id.to_string()))
    }
}
