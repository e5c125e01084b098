use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by chat-timeline.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// The raw directory holds nothing besides placeholder markers.
    #[error("No messages found in {dir}. Please copy your messages into the 'raw' directory.")]
    NoInputData { dir: PathBuf },

    /// A row does not have the expected number of columns.
    #[error("Schema mismatch in {path} line {line}: expected {expected} columns, found {found}")]
    SchemaMismatch {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line (or whole `.json` file) is not valid JSON.
    #[error("Failed to parse JSON in {path} line {line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Neither `datetime` nor `timestamp` could be turned into a UTC time.
    #[error("Invalid timestamp in {path} line {line}: {value}")]
    InvalidTimestamp {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// A required text column holds something other than a string.
    #[error("Invalid value for column '{column}' in {path} line {line}")]
    InvalidCell {
        path: PathBuf,
        line: usize,
        column: &'static str,
    },

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the timeline crates.
pub type Result<T> = std::result::Result<T, TimelineError>;
