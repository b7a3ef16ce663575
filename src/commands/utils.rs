use crate::output::read_report;
use crate::utils::config::{REPORT_TOOL_NAME, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a JSON report file
pub fn validate_report_file(file_path: &Path) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let chart_data = read_report(file_path)
        .with_context(|| format!("{} is not a valid report", file_path.display()))?;

    let nodes: usize = chart_data.iter().map(|root| root.descendants().len()).sum();
    let total: u64 = chart_data.iter().map(|root| root.size.stat_size).sum();

    println!("✓ Valid report JSON");
    println!("  Bundles: {}", chart_data.len());
    println!("  Nodes: {}", nodes);
    println!("  Total Stat Size: {}", total);

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("{} v{}", REPORT_TOOL_NAME, env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Size reports and treemap chart data from JavaScript bundler stats files.");
}
