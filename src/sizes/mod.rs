//! Size metrics.
//!
//! This module handles:
//! - The declared/parsed/gzip size triplet and its sum-of-optionals combinator
//! - Sizing resolved bundle members
//! - Retrieving emitted bundle sources

pub mod calculator;
pub mod sources;
pub mod triplet;

pub use calculator::{measure_module, size_asset, SizedAsset, SizedMember, SizedModule};
pub use sources::{collect_sources, BundleDirectory, InMemorySources, SourceProvider};
pub use triplet::{gzip_size, sum_optional, SizeTriplet};
