//! Bundle Treemap
//!
//! Size reports for JavaScript bundles, built from the stats file a bundler
//! writes next to its output.
//!
//! For every emitted script file the crate reports which source modules it
//! contains, arranged by path, with three sizes per node:
//! - `statSize`: size declared in the stats file
//! - `parsedSize`: size of the module's text in the emitted bundle
//! - `gzipSize`: size of that text after gzip compression
//!
//! The last two are present only when the emitted bundles can be read.
//!
//! ## Getting Started
//!
//! ```bash
//! bundle-treemap analyze dist/stats.json --mode static
//! ```
//!
//! ```ignore
//! use bundle_treemap::analyzer::{analyze_stats, AnalyzerOptions};
//! use bundle_treemap::sizes::BundleDirectory;
//!
//! let payload: serde_json::Value = serde_json::from_str(&stats)?;
//! let bundles = BundleDirectory::new("dist");
//! let report = analyze_stats(&payload, Some(&bundles), &AnalyzerOptions::default())?;
//! ```

pub mod analyzer;
pub mod commands;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod sizes;
pub mod tree;
pub mod utils;

pub use analyzer::{analyze_stats, AnalysisReport, AnalyzerOptions};
pub use tree::ChartNode;
