use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while picking a numeric column out of a loaded table.
#[derive(Debug, Error)]
pub enum ColumnError {
    /// Column letter is not of the form `A`..`Z`, `AA`..
    #[error("invalid column letter '{0}'")]
    InvalidLetter(String),

    /// Selector does not match any column in the table
    #[error("column {0} not found")]
    NotFound(String),

    /// Cell is neither a number nor a configured missing-value marker
    #[error("column {column}, row {row}: '{value}' is not a number")]
    NotNumeric {
        column: String,
        row: usize,
        value: String,
    },
}

/// Errors that can occur while loading a core series from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported input extension: .{0}")]
    UnsupportedFormat(String),

    #[error("{}: sheet '{sheet}' not found", path.display())]
    SheetNotFound { path: PathBuf, sheet: String },

    #[error("{}: {source}", path.display())]
    Column {
        path: PathBuf,
        #[source]
        source: ColumnError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, LoadError>;
