use crate::utils::config::{DEFAULT_HTML_REPORT, DEFAULT_JSON_REPORT};
use clap::ValueEnum;
use std::path::PathBuf;

/// Report format written by the analyze command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportMode {
    /// Chart data as JSON
    #[default]
    Json,

    /// Self-contained HTML page
    Static,
}

impl ReportMode {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ReportMode::Json => DEFAULT_JSON_REPORT,
            ReportMode::Static => DEFAULT_HTML_REPORT,
        }
    }
}

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Stats JSON file written by the bundler
    pub stats_file: PathBuf,

    /// Directory holding the emitted bundles (defaults to the stats file's directory)
    pub bundle_dir: Option<PathBuf>,

    /// Report format
    pub mode: ReportMode,

    /// Report path (defaults to report.json / report.html next to the stats file)
    pub output: Option<PathBuf>,

    /// Title of the static report
    pub title: Option<String>,

    /// Regex patterns of emitted files to leave out
    pub exclude: Vec<String>,

    /// Print a per-bundle size summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            stats_file: PathBuf::from("stats.json"),
            bundle_dir: None,
            mode: ReportMode::Json,
            output: None,
            title: None,
            exclude: Vec::new(),
            print_summary: false,
        }
    }
}

impl AnalyzeArgs {
    fn stats_dir(&self) -> PathBuf {
        self.stats_file
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn resolved_bundle_dir(&self) -> PathBuf {
        self.bundle_dir.clone().unwrap_or_else(|| self.stats_dir())
    }

    pub fn resolved_output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.stats_dir().join(self.mode.default_file_name()))
    }
}

/// Human-readable byte sizes for the summary
pub struct SizeDisplay;

impl SizeDisplay {
    pub fn format(bytes: u64) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

        let mut value = bytes as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }

        if unit == 0 {
            format!("{} B", bytes)
        } else {
            format!("{:.2} {}", value, UNITS[unit])
        }
    }

    /// Absent sizes print as `-`
    pub fn format_optional(bytes: Option<u64>) -> String {
        bytes.map(Self::format).unwrap_or_else(|| "-".to_string())
    }
}
