//! Stats parsing and schema definitions.
//!
//! This module handles:
//! - Defining the stats record schema
//! - Normalizing the payload shapes bundlers write into one compilation list
//! - Locating module sources inside emitted bundles

pub mod bundle;
pub mod normalizer;
pub mod schema;

// Re-export main types
pub use bundle::{parse_bundle, BundleSources};
pub use normalizer::{normalize_stats, parse_stats_str, NormalizedStats};
pub use schema::{CompilationResult, Entrypoint, Id, StatsAsset, StatsChunk, StatsModule};
