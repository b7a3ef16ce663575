//! Size calculation for resolved bundle members.
//!
//! The declared size always comes from the stats record. Parsed and gzip sizes
//! come from the module's emitted source when the bundle could be read; they
//! stay absent otherwise.

use super::triplet::SizeTriplet;
use crate::parser::bundle::BundleSources;
use crate::parser::schema::Id;
use crate::resolver::{MemberRecord, Placeholder, ResolvedAsset, ResolvedModule};
use crate::utils::config::ENTRY_MODULES_LABEL;
use log::debug;
use std::collections::BTreeMap;

/// A module with its sizes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedModule {
    pub id: Option<Id>,
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub size: SizeTriplet,

    /// Merged modules of a concatenated module, with estimated sizes
    pub content: Option<Vec<SizedModule>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizedMember {
    Module(SizedModule),
    Placeholder(Placeholder),
}

impl SizedMember {
    pub fn size(&self) -> SizeTriplet {
        match self {
            SizedMember::Module(module) => module.size,
            SizedMember::Placeholder(placeholder) => SizeTriplet::declared(placeholder.declared_size),
        }
    }
}

/// One bundle with sized members, malformed records removed
#[derive(Debug, Clone)]
pub struct SizedAsset {
    pub name: String,
    pub declared_size: u64,
    pub members: Vec<SizedMember>,
    pub initial_by_entrypoint: BTreeMap<String, bool>,

    /// Number of malformed records left out
    pub malformed: usize,
}

/// Compute the size triplet of every member of a bundle
///
/// **Public** - main entry point for size calculation
///
/// # Arguments
/// * `asset` - Resolved bundle
/// * `sources` - Module sources located in the emitted file, if it could be read
///
/// # Returns
/// Sized members in resolution order. Entry modules whose wrapper was not
/// found in the bundle take the bundle's runtime source.
pub fn size_asset(asset: ResolvedAsset, sources: Option<&BundleSources>) -> SizedAsset {
    let mut modules = Vec::new();
    let mut placeholders = Vec::new();
    let mut malformed = 0;

    for member in asset.members {
        match member {
            MemberRecord::Resolved(module) => modules.push(module),
            MemberRecord::Placeholder(placeholder) => placeholders.push(placeholder),
            MemberRecord::Malformed { .. } => malformed += 1,
        }
    }

    let mut members: Vec<SizedMember> = match sources {
        Some(sources) => size_with_sources(modules, sources),
        None => modules
            .into_iter()
            .map(|module| SizedMember::Module(measure_module(module, None)))
            .collect(),
    };

    members.extend(placeholders.into_iter().map(SizedMember::Placeholder));

    SizedAsset {
        name: asset.name,
        declared_size: asset.declared_size,
        members,
        initial_by_entrypoint: asset.initial_by_entrypoint,
        malformed,
    }
}

/// **Private** - sizes members of a bundle whose sources were located
fn size_with_sources(modules: Vec<ResolvedModule>, sources: &BundleSources) -> Vec<SizedMember> {
    let unlocated: Vec<usize> = modules
        .iter()
        .enumerate()
        .filter(|(_, module)| module.is_entry() && located_source(module, sources).is_none())
        .map(|(index, _)| index)
        .collect();

    if unlocated.len() <= 1 {
        // A lone entry module owns whatever is left outside the wrappers
        return modules
            .into_iter()
            .enumerate()
            .map(|(index, module)| {
                let source = if unlocated.contains(&index) {
                    Some(sources.runtime_src.as_str())
                } else {
                    located_source(&module, sources)
                };
                SizedMember::Module(measure_module(module, source))
            })
            .collect();
    }

    debug!("Grouping {} entry modules without located source", unlocated.len());

    let (entries, rest): (Vec<_>, Vec<_>) = modules
        .into_iter()
        .enumerate()
        .partition(|(index, _)| unlocated.contains(index));
    let entries: Vec<ResolvedModule> = entries.into_iter().map(|(_, module)| module).collect();

    let entry_modules = ResolvedModule {
        id: None,
        name: Some(ENTRY_MODULES_LABEL.to_string()),
        identifier: Some(ENTRY_MODULES_LABEL.to_string()),
        declared_size: entries.iter().map(|module| module.declared_size).sum(),
        depth: Some(0),
        content: Some(entries),
    };

    let mut sized = Vec::with_capacity(rest.len() + 1);
    sized.push(SizedMember::Module(measure_module(
        entry_modules,
        Some(&sources.runtime_src),
    )));
    sized.extend(rest.into_iter().map(|(_, module)| {
        let source = located_source(&module, sources);
        SizedMember::Module(measure_module(module, source))
    }));

    sized
}

fn located_source<'s>(module: &ResolvedModule, sources: &'s BundleSources) -> Option<&'s str> {
    module.id.as_ref().and_then(|id| sources.module_source(id))
}

/// Size one module from its declared size and, if found, its emitted source
///
/// **Public** - concatenated content gets sizes estimated from the module
pub fn measure_module(module: ResolvedModule, source: Option<&str>) -> SizedModule {
    let size = match source {
        Some(src) => SizeTriplet::measured(module.declared_size, src),
        None => SizeTriplet::declared(module.declared_size),
    };

    let content = module
        .content
        .map(|content| content.into_iter().map(|child| estimate_content(child, &size)).collect());

    SizedModule {
        id: module.id,
        name: module.name,
        identifier: module.identifier,
        size,
        content,
    }
}

fn estimate_content(module: ResolvedModule, owner: &SizeTriplet) -> SizedModule {
    SizedModule {
        size: SizeTriplet::estimated_from(module.declared_size, owner),
        content: module
            .content
            .map(|content| content.into_iter().map(|child| estimate_content(child, owner)).collect()),
        id: module.id,
        name: module.name,
        identifier: module.identifier,
    }
}
