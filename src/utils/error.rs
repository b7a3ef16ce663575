//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//!
//! Only [`ParseError`] is fatal. Unresolved references and malformed records
//! never surface as errors; they are absorbed into the report shape.

use thiserror::Error;

/// Errors raised while normalizing a stats payload
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid stats entry `{entry}`: expected {expected}")]
    InvalidPayload { entry: String, expected: String },

    #[error("No usable compilation found in {entries} stats entries")]
    NoCompilations { entries: usize },
}

impl ParseError {
    pub(crate) fn invalid(entry: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidPayload {
            entry: entry.into(),
            expected: expected.into(),
        }
    }

    /// Entry label the error refers to, if it is tied to one
    pub fn entry(&self) -> Option<&str> {
        match self {
            Self::InvalidPayload { entry, .. } => Some(entry),
            _ => None,
        }
    }
}

/// Errors raised while retrieving emitted bundle sources.
///
/// Never fatal: the affected bundle simply has no parsed or gzip sizes.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse bundle {asset}: {message}")]
    Syntax { asset: String, message: String },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Failed to render report: {0}")]
    RenderFailed(#[from] askama::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
