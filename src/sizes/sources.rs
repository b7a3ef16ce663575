//! Retrieval of emitted bundle sources.
//!
//! Parsed and gzip sizes need the text a module was emitted as. Any type
//! implementing [`SourceProvider`] can supply it; when none is given, or a
//! bundle cannot be read, those sizes are simply left out.

use crate::parser::bundle::{parse_bundle, BundleSources};
use crate::utils::error::SourceError;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Source retrieval capability
///
/// Implementations must be shareable across threads: bundles are read
/// concurrently.
pub trait SourceProvider: Send + Sync {
    /// Located module sources of one emitted file, `None` when unavailable
    fn bundle_sources(&self, asset_name: &str) -> Option<BundleSources>;
}

/// Reads emitted bundles from an output directory
#[derive(Debug, Clone)]
pub struct BundleDirectory {
    root: PathBuf,
}

impl BundleDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read and parse one bundle
    ///
    /// # Errors
    /// * `SourceError::Io` - file missing or unreadable
    /// * `SourceError::Syntax` - see [`parse_bundle`]
    pub fn read_bundle(&self, asset_name: &str) -> Result<BundleSources, SourceError> {
        let path = self.root.join(asset_name);
        debug!("Reading bundle {}", path.display());

        let src = fs::read_to_string(&path)?;
        parse_bundle(asset_name, &src)
    }
}

impl SourceProvider for BundleDirectory {
    fn bundle_sources(&self, asset_name: &str) -> Option<BundleSources> {
        match self.read_bundle(asset_name) {
            Ok(sources) => Some(sources),
            Err(e) => {
                warn!("No module sources for {}: {}", asset_name, e);
                None
            }
        }
    }
}

/// Bundle contents held in memory, keyed by emitted file name
#[derive(Debug, Clone, Default)]
pub struct InMemorySources {
    bundles: HashMap<String, String>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, asset_name: impl Into<String>, src: impl Into<String>) -> Self {
        self.insert(asset_name, src);
        self
    }

    pub fn insert(&mut self, asset_name: impl Into<String>, src: impl Into<String>) {
        self.bundles.insert(asset_name.into(), src.into());
    }
}

impl SourceProvider for InMemorySources {
    fn bundle_sources(&self, asset_name: &str) -> Option<BundleSources> {
        let src = self.bundles.get(asset_name)?;
        match parse_bundle(asset_name, src) {
            Ok(sources) => Some(sources),
            Err(e) => {
                warn!("No module sources for {}: {}", asset_name, e);
                None
            }
        }
    }
}

/// Fetch sources for several bundles concurrently
///
/// **Public** - reads have no ordering among themselves; results are merged
/// by asset name before any tree is built
///
/// # Returns
/// Asset name -> located sources, for every bundle that could be read
pub fn collect_sources(provider: &dyn SourceProvider, asset_names: &[String]) -> HashMap<String, BundleSources> {
    let sources: HashMap<String, BundleSources> = asset_names
        .par_iter()
        .filter_map(|name| provider.bundle_sources(name).map(|sources| (name.clone(), sources)))
        .collect();

    debug!("Located sources for {}/{} bundles", sources.len(), asset_names.len());
    sources
}
