//! Pairwise-distance aggregation
//!
//! For every entity and each of its category folders, every distance export
//! becomes one `source-to-target` relationship with its mean distance and
//! counts. Failures are contained to the relationship they affect.

use super::{AggregateCell, CompletenessReport, Matrix, SummaryMatrix};
use crate::discovery::{Discovery, EntityDiscoverer, FolderRecord};
use crate::measurement::{Quantity, SeriesSource};
use crate::report::{Diagnostic, Reporter};
use crate::{AnalysisConfig, CountMode, Error, Result};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

/// Statistics for one relationship of one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelationshipStats {
    /// Mean distance
    pub mean: f64,
    /// Number of valid measurements
    pub count: usize,
    /// Number of measurements `<= 0`
    pub non_positive_count: usize,
}

impl RelationshipStats {
    /// Count selected by `mode`
    #[must_use]
    pub const fn count_for(&self, mode: CountMode) -> usize {
        match mode {
            CountMode::All => self.count,
            CountMode::NonPositive => self.non_positive_count,
        }
    }
}

/// Completed relationship aggregation.
#[derive(Debug, Clone)]
pub struct RelationshipAnalysis {
    entities: Vec<String>,
    relationships: Vec<String>,
    results: FxHashMap<String, BTreeMap<String, RelationshipStats>>,
    matrix: SummaryMatrix,
    count_mode: CountMode,
}

impl RelationshipAnalysis {
    /// Entities (matrix columns), natural order
    #[must_use]
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Relationship labels (matrix rows), lexicographic order
    #[must_use]
    pub fn relationships(&self) -> &[String] {
        &self.relationships
    }

    /// Observed relationships for one entity
    #[must_use]
    pub fn results_for(&self, entity_id: &str) -> Option<&BTreeMap<String, RelationshipStats>> {
        self.results.get(entity_id)
    }

    /// Matrix built with the configured count mode
    #[must_use]
    pub const fn matrix(&self) -> &SummaryMatrix {
        &self.matrix
    }

    /// Count mode used for `matrix()`
    #[must_use]
    pub const fn count_mode(&self) -> CountMode {
        self.count_mode
    }

    /// Rebuild the matrix with another count statistic
    #[must_use]
    pub fn matrix_with(&self, mode: CountMode) -> SummaryMatrix {
        build_matrix(&self.relationships, &self.entities, &self.results, mode)
    }

    /// Mean-distance matrix (`None` where absent)
    #[must_use]
    pub fn mean_matrix(&self) -> Matrix<Option<f64>> {
        self.matrix.map(AggregateCell::mean)
    }

    /// Count matrix (zero where absent)
    #[must_use]
    pub fn count_matrix(&self) -> Matrix<usize> {
        self.matrix.map(AggregateCell::count)
    }

    /// Missing-cell tally of the matrix
    #[must_use]
    pub fn completeness(&self) -> CompletenessReport {
        self.matrix.completeness_report()
    }
}

/// Builds relationship matrices from a discovery result.
#[derive(Debug, Clone)]
pub struct RelationshipAggregator<'a> {
    config: &'a AnalysisConfig,
    discoverer: EntityDiscoverer<'a>,
}

impl<'a> RelationshipAggregator<'a> {
    /// Aggregator for the conventions in `config`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the naming patterns cannot be built
    pub fn new(config: &'a AnalysisConfig) -> Result<Self> {
        Ok(Self {
            config,
            discoverer: EntityDiscoverer::new(config)?,
        })
    }

    /// Aggregate every relationship of every discovered entity
    ///
    /// # Errors
    ///
    /// Returns `Error::Structure` if no relationship was processed at all
    pub fn aggregate(
        &self,
        discovery: &Discovery,
        source: &dyn SeriesSource,
        reporter: &dyn Reporter,
    ) -> Result<RelationshipAnalysis> {
        let total = discovery.entities().len();
        let mut results: FxHashMap<String, BTreeMap<String, RelationshipStats>> = FxHashMap::default();

        for (position, entity) in discovery.entities().iter().enumerate() {
            reporter.info(&format!("[{}/{total}] Processing entity: {entity}", position + 1));
            let mut observed = BTreeMap::new();
            for category in discovery.categories_of(entity) {
                if let Some(folder) = discovery.folder(entity, category) {
                    self.aggregate_folder(folder, source, reporter, &mut observed);
                }
            }
            results.insert(entity.clone(), observed);
        }

        if results.values().all(BTreeMap::is_empty) {
            return Err(Error::Structure(format!(
                "no relationship data could be processed under {}",
                discovery.scan_dir().display()
            )));
        }

        let relationships: Vec<String> = results
            .values()
            .flat_map(BTreeMap::keys)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let entities = discovery.entities().to_vec();
        let count_mode = self.config.count_mode;
        let matrix = build_matrix(&relationships, &entities, &results, count_mode);

        let completeness = matrix.completeness_report();
        reporter.info(&format!(
            "Found {} relationships across {} entities",
            relationships.len(),
            entities.len()
        ));
        if !completeness.is_complete() {
            reporter.warn(&format!("Relationship matrix incomplete: {completeness}"));
        }

        Ok(RelationshipAnalysis {
            entities,
            relationships,
            results,
            matrix,
            count_mode,
        })
    }

    /// Process every distance export in one category folder
    fn aggregate_folder(
        &self,
        folder: &FolderRecord,
        source: &dyn SeriesSource,
        reporter: &dyn Reporter,
        observed: &mut BTreeMap<String, RelationshipStats>,
    ) {
        let files = match self.discoverer.relationship_files(folder, reporter) {
            Ok(files) => files,
            Err(e) => {
                reporter.report(
                    Diagnostic::error(format!("cannot list distance files: {e}")).at(&folder.path),
                );
                return;
            }
        };

        for file in files {
            let label = format!("{}-to-{}", folder.category, file.target);
            if observed.contains_key(&label) {
                reporter.report(
                    Diagnostic::warning(format!("duplicate export for {label}; keeping the first"))
                        .at(&file.path),
                );
                continue;
            }

            match relationship_stats(source, &file.path, reporter) {
                Ok(stats) => {
                    reporter.info(&format!(
                        "  {label}: mean={:.3}, count={}",
                        stats.mean, stats.count
                    ));
                    observed.insert(label, stats);
                }
                Err(e) => reporter.report(
                    Diagnostic::error(format!("failed to process {label}: {e}")).at(&file.path),
                ),
            }
        }
    }
}

/// Load one distance export and summarise it
fn relationship_stats(
    source: &dyn SeriesSource,
    path: &std::path::Path,
    reporter: &dyn Reporter,
) -> Result<RelationshipStats> {
    let series = source.load(path, Quantity::Distance, reporter)?;
    let mean = series.mean();
    if !mean.is_finite() {
        return Err(Error::Calculation(format!("mean distance is {mean}")));
    }
    Ok(RelationshipStats {
        mean,
        count: series.len(),
        non_positive_count: series.count_non_positive(),
    })
}

fn build_matrix(
    relationships: &[String],
    entities: &[String],
    results: &FxHashMap<String, BTreeMap<String, RelationshipStats>>,
    mode: CountMode,
) -> SummaryMatrix {
    Matrix::from_fn(relationships.to_vec(), entities.to_vec(), |relationship, entity| {
        results
            .get(entity)
            .and_then(|observed| observed.get(relationship))
            .map_or(AggregateCell::Absent, |stats| AggregateCell::Present {
                mean: stats.mean,
                count: stats.count_for(mode),
            })
    })
}
