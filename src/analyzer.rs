//! Stats analysis pipeline.
//!
//! Normalizer -> resolver -> size calculator -> tree builder, run once per
//! compilation. Compilations share nothing and are analyzed in parallel;
//! the chart data keeps their payload order.

use crate::parser::normalizer::normalize_stats;
use crate::parser::schema::CompilationResult;
use crate::resolver::resolve_compilation;
use crate::sizes::{collect_sources, size_asset, SourceProvider};
use crate::tree::{build_asset_tree, ChartNode};
use crate::utils::error::ParseError;
use log::{debug, info, warn};
use rayon::prelude::*;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Analysis options
#[derive(Debug, Clone, Default)]
pub struct AnalyzerOptions {
    /// Emitted files matching any of these are left out of the report
    pub exclude_assets: Vec<Regex>,
}

impl AnalyzerOptions {
    /// Options excluding assets that match any of the given patterns
    ///
    /// # Errors
    /// Returns the first pattern that is not a valid regex
    pub fn with_exclude_patterns<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exclude_assets = patterns
            .into_iter()
            .map(|pattern| Regex::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { exclude_assets })
    }
}

/// Result of analyzing one stats payload
#[derive(Debug)]
pub struct AnalysisReport {
    /// One root group per reported bundle, in payload order
    pub chart_data: Vec<ChartNode>,

    /// Payload entries left out because they could not be parsed
    pub skipped_entries: Vec<ParseError>,
}

/// Analyze a stats payload into chart data
///
/// **Public** - main entry point of the library
///
/// # Arguments
/// * `payload` - Parsed stats JSON
/// * `sources` - Where to find emitted bundle text; without it parsed and
///   gzip sizes are absent everywhere
/// * `options` - Analysis options
///
/// # Errors
/// * `ParseError` - the payload as a whole is unusable. No partial chart
///   data is produced in that case.
pub fn analyze_stats(
    payload: &Value,
    sources: Option<&dyn SourceProvider>,
    options: &AnalyzerOptions,
) -> Result<AnalysisReport, ParseError> {
    let normalized = normalize_stats(payload)?;

    info!("Analyzing {} compilations", normalized.compilations.len());

    let chart_data: Vec<ChartNode> = normalized
        .compilations
        .par_iter()
        .map(|compilation| analyze_compilation(compilation, sources, options))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    if !normalized.skipped.is_empty() {
        warn!("{} stats entries were skipped", normalized.skipped.len());
    }

    Ok(AnalysisReport {
        chart_data,
        skipped_entries: normalized.skipped,
    })
}

/// Chart data of a single compilation
///
/// **Public** - one root group per reported bundle
pub fn analyze_compilation(
    compilation: &CompilationResult,
    sources: Option<&dyn SourceProvider>,
    options: &AnalyzerOptions,
) -> Vec<ChartNode> {
    let assets = resolve_compilation(compilation, &options.exclude_assets);

    let located = match sources {
        Some(provider) => {
            let names: Vec<String> = assets.iter().map(|asset| asset.name.clone()).collect();
            collect_sources(provider, &names)
        }
        None => HashMap::new(),
    };

    debug!(
        "{}: {} bundles, sources for {}",
        compilation.entry,
        assets.len(),
        located.len()
    );

    assets
        .into_iter()
        .map(|asset| {
            let bundle = located.get(&asset.name);
            let sized = size_asset(asset, bundle);
            ChartNode::from(build_asset_tree(sized))
        })
        .collect()
}
