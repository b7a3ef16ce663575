//! JSON chart data writer.

use super::{file_size, prepare_output_path};
use crate::tree::ChartNode;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write chart data to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `chart_data` - Root groups, one per bundle
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report(chart_data: &[ChartNode], output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    prepare_output_path(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, chart_data)?;
    writer.flush()?;

    info!("Report written successfully ({} bytes)", file_size(output_path));

    Ok(())
}

/// Serialize chart data to a string
///
/// **Public** - useful for tests and piping
pub fn report_to_string(chart_data: &[ChartNode]) -> Result<String, OutputError> {
    Ok(serde_json::to_string(chart_data)?)
}

/// Read chart data back from a JSON file
///
/// **Public** - used by the validate command
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (I/O errors share the variant)
/// * `OutputError::SerializationFailed` - not chart data JSON
pub fn read_report(input_path: impl AsRef<Path>) -> Result<Vec<ChartNode>, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path)?;
    let chart_data: Vec<ChartNode> = serde_json::from_reader(BufReader::new(file))?;

    debug!("Report loaded: {} bundles", chart_data.len());

    Ok(chart_data)
}
