//! Volume and sphericity aggregation
//!
//! One matrix per category: six fixed metric rows, one column per entity that
//! has a folder for the category. An entity whose files are missing or broken
//! keeps its column, filled with sentinels (empty statistics, zero counts).

use super::Matrix;
use crate::discovery::{Discovery, FolderRecord};
use crate::measurement::{MeasurementSeries, Quantity, SeriesSource};
use crate::report::{Diagnostic, Reporter};
use crate::{AnalysisConfig, Error, Result};
use std::fmt;
use std::path::Path;

/// Metric rows, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricRow {
    /// Mean sphericity
    SphericityMean,
    /// Number of sphericity values
    SphericityCount,
    /// Mean volume
    VolumeMean,
    /// Number of volume values
    VolumeCount,
    /// Sum of volumes
    VolumeTotal,
    /// Largest volume
    VolumeMax,
}

impl MetricRow {
    /// Every row in output order
    pub const ALL: [Self; 6] = [
        Self::SphericityMean,
        Self::SphericityCount,
        Self::VolumeMean,
        Self::VolumeCount,
        Self::VolumeTotal,
        Self::VolumeMax,
    ];

    /// Row label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SphericityMean => "Mean_Sphericity",
            Self::SphericityCount => "Count_Sphericity",
            Self::VolumeMean => "Mean_Volume",
            Self::VolumeCount => "Count_Volume",
            Self::VolumeTotal => "Total_Volume",
            Self::VolumeMax => "Max_Volume",
        }
    }

    /// Row for a label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|row| row.label() == label)
    }
}

impl fmt::Display for MetricRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metric × entity matrix for one category.
///
/// Statistics are `None` when unavailable; counts are `Some(0)` then.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricMatrix {
    category: String,
    matrix: Matrix<Option<f64>>,
}

impl MetricMatrix {
    /// Category this matrix describes
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Underlying matrix (rows are `MetricRow` labels)
    #[must_use]
    pub const fn matrix(&self) -> &Matrix<Option<f64>> {
        &self.matrix
    }

    /// Entities (columns), natural order
    #[must_use]
    pub fn entities(&self) -> &[String] {
        self.matrix.columns()
    }

    /// Value of one metric for one entity
    #[must_use]
    pub fn value(&self, row: MetricRow, entity_id: &str) -> Option<f64> {
        self.matrix.get(row.label(), entity_id).copied().flatten()
    }
}

/// Completed metric aggregation, one matrix per category.
#[derive(Debug, Clone)]
pub struct MetricAnalysis {
    matrices: Vec<MetricMatrix>,
}

impl MetricAnalysis {
    /// Matrices in category order
    #[must_use]
    pub fn matrices(&self) -> &[MetricMatrix] {
        &self.matrices
    }

    /// Matrix for one category
    #[must_use]
    pub fn matrix_for(&self, category: &str) -> Option<&MetricMatrix> {
        self.matrices.iter().find(|m| m.category == category)
    }

    /// Categories with a matrix
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.matrices.iter().map(|m| m.category.as_str()).collect()
    }

    /// Largest column count across matrices
    #[must_use]
    pub fn max_entities(&self) -> usize {
        self.matrices.iter().map(|m| m.entities().len()).max().unwrap_or(0)
    }
}

/// Per-entity statistics before they are laid out as a column
#[derive(Debug, Clone, Copy, PartialEq)]
struct EntityMetrics {
    sphericity_mean: Option<f64>,
    sphericity_count: usize,
    volume_mean: Option<f64>,
    volume_count: usize,
    volume_total: Option<f64>,
    volume_max: Option<f64>,
}

impl EntityMetrics {
    const EMPTY: Self = Self {
        sphericity_mean: None,
        sphericity_count: 0,
        volume_mean: None,
        volume_count: 0,
        volume_total: None,
        volume_max: None,
    };

    #[allow(clippy::cast_precision_loss)]
    fn get(&self, row: MetricRow) -> Option<f64> {
        match row {
            MetricRow::SphericityMean => self.sphericity_mean,
            MetricRow::SphericityCount => Some(self.sphericity_count as f64),
            MetricRow::VolumeMean => self.volume_mean,
            MetricRow::VolumeCount => Some(self.volume_count as f64),
            MetricRow::VolumeTotal => self.volume_total,
            MetricRow::VolumeMax => self.volume_max,
        }
    }
}

/// Builds per-category metric matrices from a discovery result.
#[derive(Debug, Clone)]
pub struct MetricAggregator<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> MetricAggregator<'a> {
    /// Aggregator for the conventions in `config`
    #[must_use]
    pub const fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Volume file for a folder: `<entity>_<Category>_Volume.<ext>`
    #[must_use]
    pub fn volume_file(&self, folder: &FolderRecord) -> std::path::PathBuf {
        self.metric_file(folder, Quantity::Volume)
    }

    /// Sphericity file for a folder: `<entity>_<Category>_Sphericity.<ext>`
    #[must_use]
    pub fn sphericity_file(&self, folder: &FolderRecord) -> std::path::PathBuf {
        self.metric_file(folder, Quantity::Sphericity)
    }

    fn metric_file(&self, folder: &FolderRecord, quantity: Quantity) -> std::path::PathBuf {
        folder.path.join(format!(
            "{}_{}_{}.{}",
            folder.entity_id,
            folder.category,
            quantity.name(),
            self.config.measurement_extension
        ))
    }

    /// Aggregate every category
    ///
    /// # Errors
    ///
    /// Returns `Error::Structure` if not a single volume or sphericity file
    /// loaded successfully
    pub fn aggregate(
        &self,
        discovery: &Discovery,
        source: &dyn SeriesSource,
        reporter: &dyn Reporter,
    ) -> Result<MetricAnalysis> {
        let mut matrices = Vec::with_capacity(discovery.categories().len());
        let mut loaded_any = false;

        for category in discovery.categories() {
            reporter.info(&format!("Analyzing category: {category}"));
            let entities = discovery.entities_with(category);
            let mut columns = Vec::with_capacity(entities.len());

            for entity in &entities {
                let Some(folder) = discovery.folder(entity, category) else {
                    continue;
                };
                let metrics = self.entity_metrics(folder, source, reporter);
                loaded_any |= metrics.volume_count > 0 || metrics.sphericity_count > 0;
                columns.push(((*entity).to_string(), metrics));
            }

            let labels = MetricRow::ALL.iter().map(|r| r.label().to_string()).collect();
            let entity_ids = columns.iter().map(|(id, _)| id.clone()).collect();
            let matrix = Matrix::from_fn(labels, entity_ids, |row, entity| {
                let row = MetricRow::from_label(row)?;
                columns
                    .iter()
                    .find(|(id, _)| id == entity)
                    .map_or_else(|| EntityMetrics::EMPTY.get(row), |(_, m)| m.get(row))
            });
            reporter.info(&format!("  Processed {} entities", columns.len()));

            matrices.push(MetricMatrix {
                category: category.clone(),
                matrix,
            });
        }

        if !loaded_any {
            return Err(Error::Structure(format!(
                "no volume or sphericity data could be processed under {}",
                discovery.scan_dir().display()
            )));
        }

        Ok(MetricAnalysis { matrices })
    }

    fn entity_metrics(
        &self,
        folder: &FolderRecord,
        source: &dyn SeriesSource,
        reporter: &dyn Reporter,
    ) -> EntityMetrics {
        let mut metrics = EntityMetrics::EMPTY;

        if let Some(volumes) = self.load_optional(&self.volume_file(folder), Quantity::Volume, folder, source, reporter) {
            let (mean, total, max) = (volumes.mean(), volumes.sum(), volumes.max());
            if [mean, total, max].iter().all(|v| v.is_finite()) {
                metrics.volume_mean = Some(mean);
                metrics.volume_count = volumes.len();
                metrics.volume_total = Some(total);
                metrics.volume_max = Some(max);
            } else {
                reporter.report(
                    Diagnostic::error(format!(
                        "volume statistics for {} ({}) are not finite",
                        folder.entity_id, folder.category
                    ))
                    .at(&folder.path),
                );
            }
        }

        if let Some(sphericity) =
            self.load_optional(&self.sphericity_file(folder), Quantity::Sphericity, folder, source, reporter)
        {
            let mean = sphericity.mean();
            if mean.is_finite() {
                metrics.sphericity_mean = Some(mean);
                metrics.sphericity_count = sphericity.len();
            } else {
                reporter.report(
                    Diagnostic::error(format!(
                        "sphericity mean for {} ({}) is not finite",
                        folder.entity_id, folder.category
                    ))
                    .at(&folder.path),
                );
            }
        }

        metrics
    }

    /// Load a metric file, reporting (not propagating) absence and failures
    fn load_optional(
        &self,
        path: &Path,
        quantity: Quantity,
        folder: &FolderRecord,
        source: &dyn SeriesSource,
        reporter: &dyn Reporter,
    ) -> Option<MeasurementSeries> {
        if !path.is_file() {
            reporter.report(
                Diagnostic::warning(format!(
                    "missing {} file for {} ({})",
                    quantity.name().to_lowercase(),
                    folder.entity_id,
                    folder.category
                ))
                .at(path),
            );
            return None;
        }
        match source.load(path, quantity, reporter) {
            Ok(series) => Some(series),
            Err(e) => {
                reporter.report(Diagnostic::error(format!("failed to process: {e}")).at(path));
                None
            }
        }
    }
}
