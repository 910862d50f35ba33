//! End-to-end runs
//!
//! Each run discovers once, aggregates once and attaches a freshly captured
//! provenance record. Nothing is cached between runs or shared between the two
//! analyses.

use crate::aggregate::{
    Completeness, CompletenessReport, Matrix, MetricAggregator, MetricAnalysis, RelationshipAggregator,
    RelationshipAnalysis,
};
use crate::discovery::{Discovery, EntityDiscoverer};
use crate::measurement::MeasurementLoader;
use crate::provenance::{AnalysisKind, ProvenanceRecord, ProvenanceRecorder};
use crate::report::Reporter;
use crate::{AnalysisConfig, Result};
use std::fmt::Write as _;
use std::path::Path;

/// Output of the relationship analysis
#[derive(Debug, Clone)]
pub struct RelationshipReport {
    /// Discovery the analysis ran on
    pub discovery: Discovery,
    /// Aggregated results and matrix
    pub analysis: RelationshipAnalysis,
    /// Provenance captured for this run
    pub provenance: ProvenanceRecord,
}

impl RelationshipReport {
    /// Mean-distance matrix (`None` where absent)
    #[must_use]
    pub fn mean_matrix(&self) -> Matrix<Option<f64>> {
        self.analysis.mean_matrix()
    }

    /// Count matrix (zero where absent)
    #[must_use]
    pub fn count_matrix(&self) -> Matrix<usize> {
        self.analysis.count_matrix()
    }

    /// Present / Missing per cell
    #[must_use]
    pub fn completeness_matrix(&self) -> Matrix<Completeness> {
        self.analysis.matrix().completeness_matrix()
    }

    /// Missing-cell tally
    #[must_use]
    pub fn completeness(&self) -> CompletenessReport {
        self.analysis.completeness()
    }

    /// Human-readable results summary
    #[must_use]
    pub fn summary(&self) -> String {
        let rule = "=".repeat(60);
        let matrix = self.analysis.matrix();
        let (rows, columns) = matrix.shape();
        let mut out = String::new();
        let _ = writeln!(out, "{rule}\nANALYSIS RESULTS SUMMARY\n{rule}");
        let _ = writeln!(out, "Total entities analyzed: {columns}");
        let _ = writeln!(out, "Total unique relationships: {rows}");
        let _ = writeln!(out, "Completeness: {}", self.completeness());
        let _ = writeln!(out, "\nSample relationships (mean across entities):");
        for (index, label) in matrix.rows().iter().take(5).enumerate() {
            let present: Vec<f64> = matrix.row(index).iter().filter_map(|c| c.mean()).collect();
            if present.is_empty() {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let mean = present.iter().sum::<f64>() / present.len() as f64;
            let _ = writeln!(out, "  {label}: mean = {mean:.3}");
        }
        out.push_str(&rule);
        out
    }
}

/// Output of the metric analysis
#[derive(Debug, Clone)]
pub struct MetricReport {
    /// Discovery the analysis ran on
    pub discovery: Discovery,
    /// One matrix per category
    pub analysis: MetricAnalysis,
    /// Provenance captured for this run
    pub provenance: ProvenanceRecord,
}

impl MetricReport {
    /// Human-readable results summary
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::from("Vol/Spher Metrics Analysis Summary\n");
        out.push_str(&"=".repeat(40));
        for matrix in self.analysis.matrices() {
            let _ = write!(
                out,
                "\n\n{}:\n  Entities analyzed: {}\n  Metrics: {}",
                matrix.category(),
                matrix.entities().len(),
                matrix.matrix().rows().join(", ")
            );
        }
        out
    }
}

/// Discover entities under `root`
///
/// # Errors
///
/// Returns `Error::Structure` if the layout is not recognised or no folder parses
pub fn discover(root: impl AsRef<Path>, config: &AnalysisConfig, reporter: &dyn Reporter) -> Result<Discovery> {
    let discovery = EntityDiscoverer::new(config)?.discover(root, reporter)?;
    for gap in discovery.coverage_gaps() {
        reporter.warn(&format!(
            "Entity {} is missing categories: {}",
            gap.entity_id,
            gap.missing.join(", ")
        ));
    }
    Ok(discovery)
}

/// Run the relationship analysis under `root`
///
/// # Errors
///
/// Returns a structural error if discovery fails or no relationship loads
pub fn run_relationships(
    root: impl AsRef<Path>,
    config: &AnalysisConfig,
    reporter: &dyn Reporter,
) -> Result<RelationshipReport> {
    let discovery = discover(root, config, reporter)?;
    let loader = MeasurementLoader::new(config);
    let analysis = RelationshipAggregator::new(config)?.aggregate(&discovery, &loader, reporter)?;
    let provenance = relationship_provenance(&discovery, &analysis, config);
    Ok(RelationshipReport { discovery, analysis, provenance })
}

/// Run the metric analysis under `root`
///
/// # Errors
///
/// Returns a structural error if discovery fails or no metric file loads
pub fn run_metrics(root: impl AsRef<Path>, config: &AnalysisConfig, reporter: &dyn Reporter) -> Result<MetricReport> {
    let discovery = discover(root, config, reporter)?;
    let loader = MeasurementLoader::new(config);
    let analysis = MetricAggregator::new(config).aggregate(&discovery, &loader, reporter)?;
    let provenance = metric_provenance(&discovery, &analysis, config);
    Ok(MetricReport { discovery, analysis, provenance })
}

fn relationship_provenance(
    discovery: &Discovery,
    analysis: &RelationshipAnalysis,
    config: &AnalysisConfig,
) -> ProvenanceRecord {
    let mut record = ProvenanceRecorder::new(AnalysisKind::Relationships).record(discovery, config.header_lines);
    record.push("Relationships", analysis.relationships().len());
    record.push("Count_Mode", analysis.count_mode().label());
    record.push("Missing_Cells_Percent", format!("{:.2}", analysis.completeness().missing_percent()));
    record
}

fn metric_provenance(discovery: &Discovery, analysis: &MetricAnalysis, config: &AnalysisConfig) -> ProvenanceRecord {
    let mut record = ProvenanceRecorder::new(AnalysisKind::Metrics).record(discovery, config.header_lines);
    record.push("Categories_Analyzed", analysis.categories().join(", "));
    record.push("Total_Entities", analysis.max_entities());
    record
}
