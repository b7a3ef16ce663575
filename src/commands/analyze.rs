//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads the stats file
//! 2. Resolves bundle membership and sizes (reading emitted bundles when present)
//! 3. Writes the report
//! 4. Optionally prints a size summary

use super::models::{AnalyzeArgs, ReportMode, SizeDisplay};
use crate::analyzer::{analyze_stats, AnalyzerOptions};
use crate::output::{default_report_title, write_report, write_static_report};
use crate::sizes::{BundleDirectory, SourceProvider};
use crate::tree::ChartNode;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Stats file missing or not JSON
/// * Stats payload unusable as a whole
/// * Report write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Analyzing stats file: {}", args.stats_file.display());

    // Step 1: Read stats
    info!("Step 1/3: Reading stats...");
    let raw = fs::read_to_string(&args.stats_file)
        .with_context(|| format!("Failed to read stats file {}", args.stats_file.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", args.stats_file.display()))?;

    // Step 2: Analyze
    info!("Step 2/3: Analyzing bundles...");
    let options = AnalyzerOptions::with_exclude_patterns(&args.exclude)
        .context("Invalid exclude pattern")?;

    let bundle_dir = args.resolved_bundle_dir();
    let provider = if bundle_dir.is_dir() {
        debug!("Reading bundles from {}", bundle_dir.display());
        Some(BundleDirectory::new(&bundle_dir))
    } else {
        warn!(
            "Bundle directory {} not found, parsed and gzip sizes will be unavailable",
            bundle_dir.display()
        );
        None
    };

    let report = analyze_stats(
        &payload,
        provider.as_ref().map(|p| p as &dyn SourceProvider),
        &options,
    )
    .context("Failed to analyze stats")?;

    for skipped in &report.skipped_entries {
        warn!("Skipped: {}", skipped);
    }

    if report.chart_data.is_empty() {
        warn!("No bundles to report");
    }

    // Step 3: Write report
    info!("Step 3/3: Writing report...");
    let output = args.resolved_output();
    match args.mode {
        ReportMode::Json => {
            write_report(&report.chart_data, &output).context("Failed to write JSON report")?;
        }
        ReportMode::Static => {
            let title = args.title.clone().unwrap_or_else(default_report_title);
            write_static_report(&report.chart_data, &title, &output)
                .context("Failed to write static report")?;
        }
    }

    info!("✓ Report written to: {}", output.display());

    if args.print_summary {
        print_summary(&report.chart_data);
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if !args.stats_file.is_file() {
        anyhow::bail!("Stats file not found: {}", args.stats_file.display());
    }

    if let Some(dir) = &args.bundle_dir {
        if !dir.is_dir() {
            anyhow::bail!("Bundle directory not found: {}", dir.display());
        }
    }

    if args.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        anyhow::bail!("Report title cannot be empty");
    }

    AnalyzerOptions::with_exclude_patterns(&args.exclude).context("Invalid exclude pattern")?;

    Ok(())
}

/// Print each bundle's sizes
///
/// **Private** - internal helper for execute_analyze
fn print_summary(chart_data: &[ChartNode]) {
    println!("\n{}", "=".repeat(80));
    println!("BUNDLE SUMMARY");
    println!("{}", "=".repeat(80));
    println!("{:<44} {:>11} {:>11} {:>11}", "Bundle", "Stat", "Parsed", "Gzip");

    for root in chart_data {
        println!(
            "{:<44} {:>11} {:>11} {:>11}",
            root.label,
            SizeDisplay::format(root.size.stat_size),
            SizeDisplay::format_optional(root.size.parsed_size),
            SizeDisplay::format_optional(root.size.gzip_size),
        );
    }

    println!("{}", "=".repeat(80));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::read_report;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_stats(dir: &TempDir) -> PathBuf {
        let stats = dir.path().join("stats.json");
        fs::write(
            &stats,
            r#"{
                "assets": [{"name": "main.js", "size": 60, "chunks": [0]}],
                "chunks": [{"id": 0, "files": ["main.js"]}],
                "modules": [{"id": 0, "name": "./src/index.js", "size": 40, "chunks": [0]}]
            }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("main.js"),
            "webpackJsonp([0], { 0: function () { start(); } });",
        )
        .unwrap();
        stats
    }

    #[test]
    fn test_validate_args_missing_stats() {
        let args = AnalyzeArgs {
            stats_file: PathBuf::from("/definitely/not/here.json"),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_bad_pattern() {
        let dir = TempDir::new().unwrap();
        let args = AnalyzeArgs {
            stats_file: write_stats(&dir),
            exclude: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_empty_title() {
        let dir = TempDir::new().unwrap();
        let args = AnalyzeArgs {
            stats_file: write_stats(&dir),
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_execute_writes_json_report_with_measured_sizes() {
        let dir = TempDir::new().unwrap();
        let args = AnalyzeArgs {
            stats_file: write_stats(&dir),
            ..Default::default()
        };

        assert!(validate_args(&args).is_ok());
        execute_analyze(args).unwrap();

        let chart = read_report(dir.path().join("report.json")).unwrap();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].label, "main.js");
        assert_eq!(chart[0].size.stat_size, 40);
        assert_eq!(
            chart[0].size.parsed_size,
            Some("function () { start(); }".len() as u64)
        );
    }

    #[test]
    fn test_execute_writes_static_report() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out/index.html");
        let args = AnalyzeArgs {
            stats_file: write_stats(&dir),
            mode: ReportMode::Static,
            output: Some(output.clone()),
            title: Some("My build".to_string()),
            ..Default::default()
        };

        execute_analyze(args).unwrap();

        let html = fs::read_to_string(output).unwrap();
        assert!(html.contains("<title>My build</title>"));
        assert!(html.contains("\"label\":\"main.js\""));
    }

    #[test]
    fn test_execute_rejects_non_json_stats() {
        let dir = TempDir::new().unwrap();
        let stats = dir.path().join("stats.json");
        fs::write(&stats, "not json").unwrap();

        let args = AnalyzeArgs {
            stats_file: stats,
            ..Default::default()
        };
        assert!(execute_analyze(args).is_err());
    }
}
