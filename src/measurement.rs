//! Measurement file loading and validation
//!
//! One file holds one column of values after a fixed header block. Loading
//! either yields a non-empty, finite [`MeasurementSeries`] or an error; a failed
//! load is never turned into a placeholder value.

use crate::error::LoadError;
use crate::report::{Diagnostic, Reporter};
use crate::{AnalysisConfig, Error, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// Tokens treated as missing cells and dropped
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Physical quantity held by a file; selects the range rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Shortest surface-to-surface distance (may be negative)
    Distance,
    /// Object volume (never negative)
    Volume,
    /// Object sphericity (expected in the configured range)
    Sphericity,
}

impl Quantity {
    /// Human-readable name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Distance => "Distance",
            Self::Volume => "Volume",
            Self::Sphericity => "Sphericity",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated values from one file. Never empty, every value finite.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSeries {
    quantity: Quantity,
    values: Vec<f64>,
}

impl MeasurementSeries {
    /// Wrap already-validated values
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NoValidValues` for an empty slice and
    /// `LoadError::Infinite` if a value is not finite
    pub fn new(quantity: Quantity, values: Vec<f64>) -> std::result::Result<Self, LoadError> {
        if values.is_empty() {
            return Err(LoadError::NoValidValues { quantity: quantity.name() });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(LoadError::Infinite { quantity: quantity.name(), line: index + 1 });
        }
        Ok(Self { quantity, values })
    }

    /// Quantity this series measures
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Values in file order
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed series
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of values
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Arithmetic mean
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        self.sum() / self.values.len() as f64
    }

    /// Largest value
    #[must_use]
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest value
    #[must_use]
    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Number of values `<= 0`
    #[must_use]
    pub fn count_non_positive(&self) -> usize {
        self.values.iter().filter(|v| **v <= 0.0).count()
    }
}

/// Source of measurement series.
///
/// Aggregators only see this trait, so they stay pure functions of the
/// discovery result and whatever loads the files.
pub trait SeriesSource {
    /// Load and validate one file
    ///
    /// # Errors
    ///
    /// Returns `Error::Load` if the file is unreadable or fails validation
    fn load(&self, path: &Path, quantity: Quantity, reporter: &dyn Reporter) -> Result<MeasurementSeries>;
}

/// Loads measurement files written by the segmentation tool.
#[derive(Debug, Clone)]
pub struct MeasurementLoader<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> MeasurementLoader<'a> {
    /// Loader using the header size and thresholds in `config`
    #[must_use]
    pub const fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Parse file contents (everything after reading) into a validated series
    ///
    /// `source` is only used to label diagnostics.
    ///
    /// # Errors
    ///
    /// Returns the first violated `LoadError` rule
    pub fn parse(
        &self,
        contents: &str,
        quantity: Quantity,
        source: &Path,
        reporter: &dyn Reporter,
    ) -> std::result::Result<MeasurementSeries, LoadError> {
        let header_lines = self.config.header_lines;
        let rows: Vec<(usize, &str)> = contents
            .lines()
            .enumerate()
            .skip(header_lines)
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        if rows.is_empty() {
            return Err(LoadError::NoDataRows { header_lines });
        }

        let mut values = Vec::with_capacity(rows.len());
        for (index, line) in rows {
            let field = first_field(line);
            if MISSING_TOKENS.contains(&field) {
                continue;
            }
            let value: f64 = field.parse().map_err(|_| LoadError::NonNumeric {
                quantity: quantity.name(),
                line: index + 1,
                value: field.to_string(),
            })?;
            if value.is_nan() {
                continue;
            }
            if value.is_infinite() {
                return Err(LoadError::Infinite { quantity: quantity.name(), line: index + 1 });
            }
            values.push(value);
        }

        let series = MeasurementSeries::new(quantity, values)?;
        self.check_range(&series, source, reporter)?;
        Ok(series)
    }

    /// Quantity-specific rules: fatal for negative volume, advisory otherwise
    fn check_range(
        &self,
        series: &MeasurementSeries,
        source: &Path,
        reporter: &dyn Reporter,
    ) -> std::result::Result<(), LoadError> {
        let (min, max) = (series.min(), series.max());
        match series.quantity() {
            Quantity::Distance => {
                let limit = self.config.distance_warn_magnitude;
                if min.abs() > limit || max.abs() > limit {
                    reporter.report(
                        Diagnostic::warning(format!(
                            "unusually large distance magnitude (>{limit}); min {min:.3}, max {max:.3}"
                        ))
                        .at(source),
                    );
                }
            }
            Quantity::Volume => {
                if min < 0.0 {
                    let count = series.values().iter().filter(|v| **v < 0.0).count();
                    return Err(LoadError::NegativeVolume { count, min });
                }
                let limit = self.config.volume_warn_magnitude;
                if max > limit {
                    reporter.report(
                        Diagnostic::warning(format!("unusually large volume values (>{limit}); max {max:.3}"))
                            .at(source),
                    );
                }
            }
            Quantity::Sphericity => {
                let (low, high) = self.config.sphericity_range;
                if min < low || max > high {
                    reporter.report(
                        Diagnostic::warning(format!(
                            "sphericity values outside expected range [{low}, {high}]; min {min:.3}, max {max:.3}"
                        ))
                        .at(source),
                    );
                }
            }
        }
        Ok(())
    }
}

impl SeriesSource for MeasurementLoader<'_> {
    fn load(&self, path: &Path, quantity: Quantity, reporter: &dyn Reporter) -> Result<MeasurementSeries> {
        let wrap = |source: LoadError| Error::Load { file: path.to_path_buf(), source };
        let bytes = fs::read(path).map_err(|e| wrap(LoadError::Unreadable(e)))?;
        let contents = String::from_utf8_lossy(&bytes);
        self.parse(&contents, quantity, path, reporter).map_err(wrap)
    }
}

/// First comma-separated field, trimmed and unquoted
fn first_field(line: &str) -> &str {
    let field = line.split(',').next().unwrap_or_default().trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .map_or(field, str::trim)
}
