//! Report writers for chart data.
//!
//! This module handles writing reports to disk:
//! - JSON chart data
//! - A self-contained static HTML report

pub mod html;
pub mod json;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

// Re-export main functions
pub use html::{default_report_title, render_static_report, write_static_report};
pub use json::{read_report, report_to_string, write_report};

/// Check an output path and create its parent directories
///
/// **Private** - shared by the report writers
///
/// # Errors
/// * `OutputError::InvalidPath` - path is empty, is a directory, or its
///   parent cannot be created
fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

/// File size in bytes, 0 when unknown
fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_rejected() {
        assert!(prepare_output_path(Path::new("")).is_err());
    }

    #[test]
    fn test_directory_path_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(prepare_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_parent_directories_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("nested/dirs/report.json");

        prepare_output_path(&nested).unwrap();
        assert!(temp_dir.path().join("nested/dirs").is_dir());
    }
}
