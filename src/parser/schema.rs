//! Stats payload record definitions.
//!
//! These mirror the records a bundler writes into its stats JSON. Every field
//! that some bundler versions omit is optional or defaulted, so a record only
//! fails to deserialize when its shape is actually wrong.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::utils::config::RUNTIME_MODULE_TYPE;

/// Chunk or module id. Bundlers emit numeric ids in production builds and
/// path-like string ids in development builds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(u64),
    Name(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::Name(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Id::Number(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Name(value.to_string())
    }
}

/// Emitted output file
#[derive(Debug, Clone, Deserialize)]
pub struct StatsAsset {
    pub name: String,

    /// Size of the emitted file in bytes
    #[serde(default)]
    pub size: u64,

    /// Ids of the chunks written into this file
    #[serde(default)]
    pub chunks: Vec<Id>,

    /// Asset kind. Webpack 5 lists auxiliary entries with a type other than "asset".
    #[serde(default, rename = "type")]
    pub asset_type: Option<String>,
}

/// Output chunk
#[derive(Debug, Clone, Deserialize)]
pub struct StatsChunk {
    pub id: Id,

    /// Files this chunk was emitted into
    #[serde(default)]
    pub files: Vec<String>,

    /// Declared size of all modules in the chunk
    #[serde(default)]
    pub size: Option<u64>,

    /// Member modules, either full records or bare ids.
    /// Kept raw; the resolver classifies each entry.
    #[serde(default)]
    pub modules: Option<Vec<serde_json::Value>>,

    /// Sub-chunks (dynamic imports, workers). Emitted as their own files.
    #[serde(default)]
    pub children: Vec<Id>,
}

/// Source module record
#[derive(Debug, Clone, Deserialize)]
pub struct StatsModule {
    #[serde(default)]
    pub id: Option<Id>,

    #[serde(default)]
    pub identifier: Option<String>,

    /// Readable request path, possibly prefixed with loaders (`loader!./src/a.js`)
    #[serde(default)]
    pub name: Option<String>,

    /// Declared size in bytes
    #[serde(default)]
    pub size: Option<u64>,

    /// Ids of the chunks this module is part of
    #[serde(default)]
    pub chunks: Vec<Id>,

    /// Distance from an entry point; entry modules have depth 0
    #[serde(default)]
    pub depth: Option<u32>,

    #[serde(default, rename = "moduleType")]
    pub module_type: Option<String>,

    /// Modules merged into this one by scope hoisting
    #[serde(default)]
    pub modules: Option<Vec<serde_json::Value>>,

    /// Original source, present when stats were generated with sources
    #[serde(default)]
    pub source: Option<String>,
}

impl StatsModule {
    /// Declared size, falling back to the UTF-8 byte length of the embedded source
    pub fn declared_size(&self) -> Option<u64> {
        self.size
            .or_else(|| self.source.as_ref().map(|src| src.len() as u64))
    }

    pub fn is_runtime(&self) -> bool {
        self.module_type.as_deref() == Some(RUNTIME_MODULE_TYPE)
    }

    pub fn is_entry(&self) -> bool {
        self.depth == Some(0)
    }
}

/// Asset reference inside an entrypoint (plain name in webpack 4, object in webpack 5)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntrypointAsset {
    Name(String),
    Record { name: String },
}

impl EntrypointAsset {
    pub fn name(&self) -> &str {
        match self {
            EntrypointAsset::Name(name) => name,
            EntrypointAsset::Record { name } => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entrypoint {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub assets: Vec<EntrypointAsset>,
}

/// One compilation's records, normalized out of whatever shape the payload had.
///
/// Immutable once produced by the normalizer.
#[derive(Debug, Clone, Default)]
pub struct CompilationResult {
    /// Where this compilation sits in the payload (`payload`, `payload[1]`, `payload.children[0]`)
    pub entry: String,

    pub name: Option<String>,

    pub assets: Vec<StatsAsset>,

    pub chunks: Vec<StatsChunk>,

    /// Flat module list, kept raw so a malformed record only affects itself
    pub modules: Vec<serde_json::Value>,

    pub entrypoints: BTreeMap<String, Entrypoint>,
}
