//! Module id renaming.
//!
//! Bundled module ids are whatever the resolver produced (often long
//! filesystem paths). Code generators usually want short, unique names;
//! [`rename`] rewrites every id through a caller-supplied namer.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use jc_types::schema::Schema;

/// Rewrite module ids.
///
/// `namer(previous_id, exists)` runs once per module in schema order and
/// returns the new id. `exists(id)` reports whether an id was already
/// assigned to an earlier module. Module ids, link sources and the entry
/// id are all rewritten through the resulting mapping.
pub fn rename<F>(schema: &Schema, mut namer: F) -> Schema
where
    F: FnMut(&str, &dyn Fn(&str) -> bool) -> String,
{
    let mut mapping: HashMap<&str, String> = HashMap::new();
    let mut assigned: HashSet<String> = HashSet::new();
    for module in &schema.modules {
        let taken = &assigned;
        let new_id = namer(&module.id, &|id: &str| taken.contains(id));
        assigned.insert(new_id.clone());
        mapping.insert(&module.id, new_id);
    }

    let map = |id: &str| mapping.get(id).cloned().unwrap_or_else(|| id.to_string());
    let mut renamed = schema.clone();
    for module in &mut renamed.modules {
        module.id = map(&module.id);
        for link in &mut module.link_definitions {
            link.from = map(&link.from);
        }
    }
    renamed.entry = map(&schema.entry);
    renamed
}

/// A namer producing the file stem of each id, suffixed with a counter on
/// collision: `a/types.jc` and `b/types.jc` become `types` and `types2`.
pub fn file_stem_namer(previous: &str, exists: &dyn Fn(&str) -> bool) -> String {
    let stem = Path::new(previous)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "module".to_string());
    if !exists(&stem) {
        return stem;
    }
    (2..)
        .map(|n| format!("{stem}{n}"))
        .find(|candidate| !exists(candidate))
        .unwrap_or(stem)
}
