//! Entrypoint membership of emitted files.

use super::chunk_modules::strip_query;
use crate::parser::schema::CompilationResult;
use std::collections::{BTreeMap, HashMap};

/// Map each emitted file to the entrypoints that load it on startup
///
/// **Public** - feeds `isInitialByEntrypoint` on report entries
///
/// # Returns
/// File name (query stripped) -> entrypoint name -> true
pub fn initial_by_entrypoint(compilation: &CompilationResult) -> HashMap<String, BTreeMap<String, bool>> {
    let mut initial: HashMap<String, BTreeMap<String, bool>> = HashMap::new();

    for (entrypoint_name, entrypoint) in &compilation.entrypoints {
        for asset in &entrypoint.assets {
            initial
                .entry(strip_query(asset.name()).to_string())
                .or_default()
                .insert(entrypoint_name.clone(), true);
        }
    }

    initial
}
