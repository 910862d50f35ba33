//! Error types for Orgaplex
//!
//! Structural errors abort a run. Load and calculation errors are caught at the
//! smallest scope (one file, one relationship, one entity) by the aggregators.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Orgaplex error types
#[derive(Error, Debug)]
pub enum Error {
    /// Input layout does not match the producer convention (fatal to the run)
    #[error("Structure error: {0}")]
    Structure(String),

    /// A single measurement file could not be loaded or failed validation
    #[error("Failed to load {}: {source}", file.display())]
    Load {
        /// File that was being loaded
        file: PathBuf,
        /// Validation rule or I/O failure that rejected it
        #[source]
        source: LoadError,
    },

    /// A computed statistic was NaN or infinite
    #[error("Calculation error: {0}")]
    Calculation(String),

    /// Configuration rejected by the builder
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Export sink failure
    #[error("Export error: {0}")]
    Export(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON (config) error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error aborts a whole run rather than one unit of work
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Structure(_))
    }
}

/// Reasons a measurement file is rejected.
///
/// Any of these means "this file's data is unavailable"; callers never
/// substitute a placeholder value.
#[derive(Error, Debug)]
pub enum LoadError {
    /// File could not be read
    #[error("unreadable file: {0}")]
    Unreadable(#[from] std::io::Error),

    /// Nothing left after the header block
    #[error("no data rows after skipping {header_lines} header lines")]
    NoDataRows {
        /// Header lines skipped
        header_lines: usize,
    },

    /// Every value was missing
    #[error("no valid {quantity} values")]
    NoValidValues {
        /// Quantity being loaded
        quantity: &'static str,
    },

    /// A value failed to parse as a number
    #[error("non-numeric {quantity} value {value:?} on line {line}")]
    NonNumeric {
        /// Quantity being loaded
        quantity: &'static str,
        /// 1-based line number in the file
        line: usize,
        /// Offending text
        value: String,
    },

    /// A value was +/- infinity
    #[error("infinite {quantity} value on line {line}")]
    Infinite {
        /// Quantity being loaded
        quantity: &'static str,
        /// 1-based line number in the file
        line: usize,
    },

    /// Volume series contained negative values
    #[error("{count} negative volume value(s), min {min}")]
    NegativeVolume {
        /// Number of negative entries
        count: usize,
        /// Smallest value observed
        min: f64,
    },
}
