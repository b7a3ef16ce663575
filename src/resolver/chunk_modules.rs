//! Resolve which modules belong to which emitted bundle.
//!
//! Module membership is encoded three ways across bundler versions:
//! 1. a flat `modules` list whose records carry the ids of their chunks
//! 2. module records nested inside a chunk's own `modules` list
//! 3. bare module ids inside a chunk's `modules` list, pointing into the flat list
//!
//! Sub-chunks (workers, dynamic imports) are emitted as their own files and
//! resolve to their own report entries; they are never folded into the
//! referencing chunk.
//!
//! Anomalies never abort resolution. Every record is classified as a
//! [`MemberRecord`]: resolved, a placeholder for ids missing from the payload,
//! or malformed.

use super::entrypoints::initial_by_entrypoint;
use crate::parser::schema::{CompilationResult, Id, StatsChunk, StatsModule};
use crate::utils::config::{ASSET_EXTENSIONS, ASSET_TYPE};
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// A module record that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub id: Option<Id>,
    pub name: Option<String>,
    pub identifier: Option<String>,

    /// Declared size, taken as ground truth
    pub declared_size: u64,

    pub depth: Option<u32>,

    /// Scope-hoisted content. `Some` marks a concatenated module.
    pub content: Option<Vec<ResolvedModule>>,
}

impl ResolvedModule {
    pub fn is_entry(&self) -> bool {
        self.depth == Some(0)
    }

    /// Best human-readable identifier
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.identifier.clone())
            .or_else(|| self.id.as_ref().map(Id::to_string))
            .unwrap_or_default()
    }

    /// De-duplication key within one bundle
    fn key(&self) -> String {
        match &self.id {
            Some(id) => format!("id:{}", id),
            None => format!("name:{}", self.display_name()),
        }
    }
}

impl TryFrom<StatsModule> for ResolvedModule {
    type Error = String;

    fn try_from(module: StatsModule) -> Result<Self, Self::Error> {
        if module.id.is_none() && module.name.is_none() && module.identifier.is_none() {
            return Err("module has no id, name or identifier".to_string());
        }

        let declared_size = module
            .declared_size()
            .ok_or_else(|| "module has neither `size` nor `source`".to_string())?;

        let content = module.modules.as_ref().map(|children| {
            children
                .iter()
                .enumerate()
                .filter_map(|(index, child)| match resolve_module_record(child) {
                    Ok(child) => Some(child),
                    Err(reason) => {
                        warn!(
                            "Skipping malformed concatenated module {}[{}]: {}",
                            module.name.as_deref().unwrap_or("?"),
                            index,
                            reason
                        );
                        None
                    }
                })
                .collect()
        });

        Ok(Self {
            id: module.id,
            name: module.name,
            identifier: module.identifier,
            declared_size,
            depth: module.depth,
            content,
        })
    }
}

/// Stand-in for module ids a chunk references but the payload does not contain.
///
/// Only the declared size is known: the part of the chunk's declared size not
/// covered by its resolved members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub chunk: Id,
    pub missing: Vec<Id>,
    pub declared_size: u64,
}

/// Classification of one membership record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRecord {
    Resolved(ResolvedModule),
    Placeholder(Placeholder),
    Malformed { location: String, reason: String },
}

/// One emitted bundle with its member records, in discovery order
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    /// Emitted file name without query string
    pub name: String,

    /// Declared size of the emitted file
    pub declared_size: u64,

    pub chunks: Vec<Id>,

    pub members: Vec<MemberRecord>,

    /// Entrypoint name -> true for every entrypoint loading this file initially
    pub initial_by_entrypoint: BTreeMap<String, bool>,
}

impl ResolvedAsset {
    /// (resolved, placeholders, malformed)
    pub fn counts(&self) -> (usize, usize, usize) {
        self.members
            .iter()
            .fold((0, 0, 0), |(resolved, placeholders, malformed), member| match member {
                MemberRecord::Resolved(_) => (resolved + 1, placeholders, malformed),
                MemberRecord::Placeholder(_) => (resolved, placeholders + 1, malformed),
                MemberRecord::Malformed { .. } => (resolved, placeholders, malformed + 1),
            })
    }
}

/// Emitted script file selected for the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAsset {
    pub name: String,
    pub size: u64,
    pub chunks: Vec<Id>,
}

/// Resolve the member modules of every reported bundle in a compilation
///
/// **Public** - main entry point for resolution
///
/// # Arguments
/// * `compilation` - Normalized compilation
/// * `exclude` - Asset name patterns to leave out of the report
///
/// # Returns
/// One ResolvedAsset per selected bundle, in asset order
pub fn resolve_compilation(compilation: &CompilationResult, exclude: &[Regex]) -> Vec<ResolvedAsset> {
    let assets = select_assets(compilation, exclude);

    if assets.is_empty() {
        warn!("{}: no script assets to report", compilation.entry);
        return Vec::new();
    }

    let known_chunks: HashSet<&Id> = compilation.chunks.iter().map(|chunk| &chunk.id).collect();

    for chunk in compilation.chunks.iter().filter(|chunk| !chunk.children.is_empty()) {
        let children: Vec<String> = chunk.children.iter().map(Id::to_string).collect();
        debug!(
            "{}: chunk {} loads sub-chunks [{}], reported as their own bundles",
            compilation.entry,
            chunk.id,
            children.join(", ")
        );
    }
    let (candidates, placeholders) = collect_candidates(compilation);
    let mut initial = initial_by_entrypoint(compilation);

    assets
        .into_iter()
        .map(|asset| {
            if !known_chunks.is_empty() {
                for id in asset.chunks.iter().filter(|id| !known_chunks.contains(id)) {
                    warn!(
                        "{}: chunk {} of {} is missing from stats",
                        compilation.entry, id, asset.name
                    );
                }
            }

            let members = asset_members(&asset.chunks, &candidates, &placeholders);

            let resolved = ResolvedAsset {
                initial_by_entrypoint: initial.remove(&asset.name).unwrap_or_default(),
                name: asset.name,
                declared_size: asset.size,
                chunks: asset.chunks,
                members,
            };

            let (modules, missing, malformed) = resolved.counts();
            debug!(
                "{}: {} modules, {} placeholders, {} malformed records",
                resolved.name, modules, missing, malformed
            );

            resolved
        })
        .collect()
}

/// Pick the emitted script files to report on
///
/// **Public** - also used to decide which bundles to read sources for
///
/// Without an `assets` list, files are taken from the chunks themselves.
pub fn select_assets(compilation: &CompilationResult, exclude: &[Regex]) -> Vec<SelectedAsset> {
    let listed = if compilation.assets.is_empty() {
        assets_from_chunks(&compilation.chunks)
    } else {
        compilation
            .assets
            .iter()
            .filter(|asset| asset.asset_type.as_deref().map_or(true, |t| t == ASSET_TYPE))
            .map(|asset| SelectedAsset {
                name: strip_query(&asset.name).to_string(),
                size: asset.size,
                chunks: asset.chunks.clone(),
            })
            .collect()
    };

    listed
        .into_iter()
        .filter(|asset| {
            if !is_script_asset(&asset.name) || asset.chunks.is_empty() {
                return false;
            }
            if exclude.iter().any(|pattern| pattern.is_match(&asset.name)) {
                debug!("Excluding asset {}", asset.name);
                return false;
            }
            true
        })
        .collect()
}

/// Remove a `?query` suffix from an emitted file name
pub fn strip_query(name: &str) -> &str {
    name.split('?').next().unwrap_or(name)
}

fn is_script_asset(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ASSET_EXTENSIONS.contains(&ext))
}

/// Assets for compilations whose stats list no `assets`
fn assets_from_chunks(chunks: &[StatsChunk]) -> Vec<SelectedAsset> {
    let mut assets: Vec<SelectedAsset> = Vec::new();

    for chunk in chunks {
        for file in &chunk.files {
            let name = strip_query(file);
            match assets.iter_mut().find(|asset| asset.name == name) {
                Some(asset) => {
                    asset.chunks.push(chunk.id.clone());
                    asset.size += chunk.size.unwrap_or(0);
                }
                None => assets.push(SelectedAsset {
                    name: name.to_string(),
                    size: chunk.size.unwrap_or(0),
                    chunks: vec![chunk.id.clone()],
                }),
            }
        }
    }

    assets
}

/// A module record together with the chunks it belongs to
#[derive(Debug, Clone)]
struct Candidate {
    chunks: Vec<Id>,
    location: String,
    record: Result<ResolvedModule, String>,
}

/// Gather every module record of the compilation, chunk-nested ones first
///
/// **Private** - also builds placeholders for chunks referencing missing ids
fn collect_candidates(compilation: &CompilationResult) -> (Vec<Candidate>, HashMap<Id, Placeholder>) {
    let flat: Vec<Candidate> = compilation
        .modules
        .iter()
        .enumerate()
        .filter_map(|(index, value)| candidate(value, format!("modules[{}]", index), None))
        .collect();

    let mut by_id: HashMap<&Id, usize> = HashMap::new();
    for (index, candidate) in flat.iter().enumerate() {
        if let Ok(ResolvedModule { id: Some(id), .. }) = &candidate.record {
            by_id.entry(id).or_insert(index);
        }
    }

    let mut nested = Vec::new();
    let mut placeholders = HashMap::new();

    for chunk in &compilation.chunks {
        let Some(refs) = &chunk.modules else {
            continue;
        };

        let mut missing = Vec::new();
        let mut resolved_size = 0u64;

        for (index, value) in refs.iter().enumerate() {
            let location = format!("chunks[{}].modules[{}]", chunk.id, index);

            if let Some(id) = bare_id(value) {
                match by_id.get(&id) {
                    Some(&flat_index) => {
                        let mut referenced = flat[flat_index].clone();
                        if let Ok(module) = &referenced.record {
                            resolved_size += module.declared_size;
                        }
                        if !referenced.chunks.contains(&chunk.id) {
                            referenced.chunks.push(chunk.id.clone());
                        }
                        nested.push(referenced);
                    }
                    None => {
                        warn!("{}: module {} not found in stats", location, id);
                        missing.push(id);
                    }
                }
                continue;
            }

            if let Some(found) = candidate(value, location, Some(&chunk.id)) {
                if let Ok(module) = &found.record {
                    resolved_size += module.declared_size;
                }
                nested.push(found);
            }
        }

        if missing.is_empty() {
            continue;
        }

        match chunk.size {
            Some(size) => {
                placeholders.insert(
                    chunk.id.clone(),
                    Placeholder {
                        chunk: chunk.id.clone(),
                        missing,
                        declared_size: size.saturating_sub(resolved_size),
                    },
                );
            }
            None => warn!(
                "Chunk {} references {} missing modules and declares no size",
                chunk.id,
                missing.len()
            ),
        }
    }

    nested.extend(flat);
    (nested, placeholders)
}

/// Classify one raw module record. Runtime modules are dropped.
fn candidate(value: &Value, location: String, owner: Option<&Id>) -> Option<Candidate> {
    match StatsModule::deserialize(value) {
        Ok(module) if module.is_runtime() => {
            debug!("{}: skipping runtime module", location);
            None
        }
        Ok(module) => {
            let mut chunks = module.chunks.clone();
            if let Some(owner) = owner {
                if !chunks.contains(owner) {
                    chunks.push(owner.clone());
                }
            }
            Some(Candidate {
                chunks,
                location,
                record: ResolvedModule::try_from(module),
            })
        }
        Err(e) => {
            // Still try to place the record so the bundle it belongs to sees it
            let mut chunks: Vec<Id> = value
                .get("chunks")
                .and_then(|chunks| Vec::<Id>::deserialize(chunks).ok())
                .unwrap_or_default();
            if let Some(owner) = owner {
                chunks.push(owner.clone());
            }
            Some(Candidate {
                chunks,
                location,
                record: Err(e.to_string()),
            })
        }
    }
}

/// Parse and validate a single module record
pub fn resolve_module_record(value: &Value) -> Result<ResolvedModule, String> {
    let module = StatsModule::deserialize(value).map_err(|e| e.to_string())?;
    ResolvedModule::try_from(module)
}

fn bare_id(value: &Value) -> Option<Id> {
    match value {
        Value::Number(n) => n.as_u64().map(Id::Number),
        Value::String(s) => Some(Id::Name(s.clone())),
        _ => None,
    }
}

/// Member records of one bundle, de-duplicated, placeholders last
fn asset_members(
    asset_chunks: &[Id],
    candidates: &[Candidate],
    placeholders: &HashMap<Id, Placeholder>,
) -> Vec<MemberRecord> {
    let mut seen = HashSet::new();
    let mut members = Vec::new();

    for candidate in candidates {
        if !candidate.chunks.iter().any(|id| asset_chunks.contains(id)) {
            continue;
        }

        match &candidate.record {
            Ok(module) => {
                if seen.insert(module.key()) {
                    members.push(MemberRecord::Resolved(module.clone()));
                }
            }
            Err(reason) => {
                warn!("Skipping malformed module record {}: {}", candidate.location, reason);
                members.push(MemberRecord::Malformed {
                    location: candidate.location.clone(),
                    reason: reason.clone(),
                });
            }
        }
    }

    for chunk_id in asset_chunks {
        if let Some(placeholder) = placeholders.get(chunk_id) {
            members.push(MemberRecord::Placeholder(placeholder.clone()));
        }
    }

    members
}
