//! Analysis configuration
//!
//! Every naming-convention constant and validation threshold lives here so the
//! rest of the crate never hardcodes producer details.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which measurement count populates the relationship count matrix.
///
/// Producer versions disagree on this statistic, so both are computed for every
/// relationship and the consumer picks one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Number of valid measurements
    #[default]
    All,
    /// Number of measurements `<= 0` (touching or overlapping structures)
    NonPositive,
}

impl CountMode {
    /// Label used in provenance records
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all measurements",
            Self::NonPositive => "measurements <= 0",
        }
    }
}

/// Configuration shared by discovery, loading and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Lines skipped unconditionally at the top of every measurement file
    pub header_lines: usize,
    /// Suffix marking a category folder
    pub folder_suffix: String,
    /// Prefix of filesystem shadow entries excluded from every listing
    pub shadow_prefix: String,
    /// Substring identifying a shortest-distance export
    pub distance_marker: String,
    /// Extension of measurement files (without dot)
    pub measurement_extension: String,
    /// Distance magnitude above which a warning is emitted
    pub distance_warn_magnitude: f64,
    /// Volume above which a warning is emitted
    pub volume_warn_magnitude: f64,
    /// Expected sphericity range (inclusive)
    pub sphericity_range: (f64, f64),
    /// Count statistic used for the relationship count matrix
    pub count_mode: CountMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            header_lines: 4,
            folder_suffix: "_Statistics".to_string(),
            shadow_prefix: "._".to_string(),
            distance_marker: "Shortest_Distance_to_Surfaces_Surfaces".to_string(),
            measurement_extension: "csv".to_string(),
            distance_warn_magnitude: 1000.0,
            volume_warn_magnitude: 1000.0,
            sphericity_range: (0.0, 1.0),
            count_mode: CountMode::All,
        }
    }
}

impl AnalysisConfig {
    /// Create a builder starting from the defaults
    #[must_use]
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Load a (partial) configuration from a JSON document
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the result fails validation
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the crate relies on
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` describing the first violated invariant
    pub fn validate(&self) -> Result<()> {
        if self.folder_suffix.is_empty() {
            return Err(Error::InvalidConfig("folder_suffix must not be empty".into()));
        }
        if self.shadow_prefix.is_empty() {
            return Err(Error::InvalidConfig("shadow_prefix must not be empty".into()));
        }
        if self.distance_marker.is_empty() {
            return Err(Error::InvalidConfig("distance_marker must not be empty".into()));
        }
        for (name, value) in [
            ("distance_warn_magnitude", self.distance_warn_magnitude),
            ("volume_warn_magnitude", self.volume_warn_magnitude),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a finite positive number, got {value}"
                )));
            }
        }
        let (low, high) = self.sphericity_range;
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return Err(Error::InvalidConfig(format!(
                "sphericity_range must be an ordered finite interval, got [{low}, {high}]"
            )));
        }
        Ok(())
    }

    /// Whether a directory or file name is a filesystem shadow entry
    #[must_use]
    pub fn is_shadow_name(&self, name: &str) -> bool {
        name.starts_with(&self.shadow_prefix)
    }
}

/// Builder for `AnalysisConfig`.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Number of header lines to skip
    #[must_use]
    pub const fn header_lines(mut self, lines: usize) -> Self {
        self.config.header_lines = lines;
        self
    }

    /// Category folder suffix
    #[must_use]
    pub fn folder_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.folder_suffix = suffix.into();
        self
    }

    /// Shadow entry prefix
    #[must_use]
    pub fn shadow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.shadow_prefix = prefix.into();
        self
    }

    /// Shortest-distance filename marker
    #[must_use]
    pub fn distance_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.distance_marker = marker.into();
        self
    }

    /// Distance warning threshold
    #[must_use]
    pub const fn distance_warn_magnitude(mut self, magnitude: f64) -> Self {
        self.config.distance_warn_magnitude = magnitude;
        self
    }

    /// Volume warning threshold
    #[must_use]
    pub const fn volume_warn_magnitude(mut self, magnitude: f64) -> Self {
        self.config.volume_warn_magnitude = magnitude;
        self
    }

    /// Expected sphericity interval
    #[must_use]
    pub const fn sphericity_range(mut self, low: f64, high: f64) -> Self {
        self.config.sphericity_range = (low, high);
        self
    }

    /// Count statistic for the relationship count matrix
    #[must_use]
    pub const fn count_mode(mut self, mode: CountMode) -> Self {
        self.config.count_mode = mode;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if any invariant is violated
    pub fn build(self) -> Result<AnalysisConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_producer_convention() {
        let config = AnalysisConfig::default();
        assert_eq!(config.header_lines, 4);
        assert_eq!(config.folder_suffix, "_Statistics");
        assert_eq!(config.shadow_prefix, "._");
        assert_eq!(config.count_mode, CountMode::All);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = AnalysisConfig::builder()
            .header_lines(2)
            .count_mode(CountMode::NonPositive)
            .volume_warn_magnitude(50.0)
            .build()
            .unwrap();
        assert_eq!(config.header_lines, 2);
        assert_eq!(config.count_mode, CountMode::NonPositive);
        assert!((config.volume_warn_magnitude - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_rejects_inverted_sphericity_range() {
        let result = AnalysisConfig::builder().sphericity_range(1.0, 0.0).build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_rejects_empty_suffix() {
        let result = AnalysisConfig::builder().folder_suffix("").build();
        assert!(result.unwrap_err().to_string().contains("folder_suffix"));
    }

    #[test]
    fn test_from_json_partial_document() {
        let config = AnalysisConfig::from_json(r#"{"header_lines": 3, "count_mode": "non_positive"}"#)
            .unwrap();
        assert_eq!(config.header_lines, 3);
        assert_eq!(config.count_mode, CountMode::NonPositive);
        assert_eq!(config.distance_marker, "Shortest_Distance_to_Surfaces_Surfaces");
    }

    #[test]
    fn test_from_json_rejects_negative_threshold() {
        let result = AnalysisConfig::from_json(r#"{"distance_warn_magnitude": -1.0}"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_shadow_name() {
        let config = AnalysisConfig::default();
        assert!(config.is_shadow_name("._a1_ER_Statistics"));
        assert!(!config.is_shadow_name("a1_ER_Statistics"));
    }
}
