//! Chunk and module membership resolution.
//!
//! This module handles:
//! - Selecting the emitted script files to report on
//! - Assigning module records to the bundles that contain them
//! - Classifying unresolvable and malformed records instead of failing

pub mod chunk_modules;
pub mod entrypoints;

pub use chunk_modules::{
    resolve_compilation, select_assets, MemberRecord, Placeholder, ResolvedAsset, ResolvedModule,
};
pub use entrypoints::initial_by_entrypoint;
