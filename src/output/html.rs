//! Static HTML report writer.
//!
//! The report is one self-contained file: chart data is embedded as
//! `window.chartData` next to a small script that renders it as a nested,
//! collapsible size listing.

use super::{file_size, prepare_output_path};
use crate::tree::ChartNode;
use crate::utils::config::REPORT_TOOL_NAME;
use crate::utils::error::OutputError;
use askama::Template;
use chrono::{Local, NaiveDateTime};
use log::info;
use std::fs;
use std::path::Path;

/// Report page; `chart_data` is pre-serialized, script-safe JSON
#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    title: &'a str,
    chart_data: String,
}

/// Render the static report page
///
/// **Public** - pure rendering, see [`write_static_report`] for the file
///
/// # Errors
/// * `OutputError::SerializationFailed` - chart data could not be serialized
/// * `OutputError::RenderFailed` - the page template failed
pub fn render_static_report(chart_data: &[ChartNode], title: &str) -> Result<String, OutputError> {
    let template = ReportTemplate {
        title,
        chart_data: script_safe_json(&serde_json::to_string(chart_data)?),
    };

    Ok(template.render()?)
}

/// Write the static report page to disk
///
/// # Errors
/// * `OutputError::InvalidPath` / `OutputError::WriteFailed` - file could not be written
/// * `OutputError::SerializationFailed` / `OutputError::RenderFailed` - page could not be built
pub fn write_static_report(
    chart_data: &[ChartNode],
    title: &str,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing static report to: {}", output_path.display());

    prepare_output_path(output_path)?;
    let html = render_static_report(chart_data, title)?;
    fs::write(output_path, html)?;

    info!("Static report written successfully ({} bytes)", file_size(output_path));

    Ok(())
}

/// Title used when none is given: `<tool> [<date> at <HH:MM>]`
pub fn default_report_title() -> String {
    report_title_at(Local::now().naive_local())
}

fn report_title_at(time: NaiveDateTime) -> String {
    format!("{} [{}]", REPORT_TOOL_NAME, time.format("%-d %b %Y at %H:%M"))
}

/// JSON that cannot close the surrounding `<script>` element
fn script_safe_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
