//! Export of summary matrices
//!
//! Every table is materialised as an Arrow `RecordBatch` whose first column
//! holds the row labels and whose remaining columns are entities. The batches
//! are then written one file per table, either as CSV or as Parquet.
//!
//! ```rust,no_run
//! use orgaplex::export::{export_relationships, ExportFormat};
//! use orgaplex::pipeline::run_relationships;
//! use orgaplex::report::TracingReporter;
//! use orgaplex::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! let report = run_relationships("data/experiment1", &config, &TracingReporter)?;
//! let written = export_relationships(&report, "out", ExportFormat::Csv)?;
//! println!("wrote {} files", written.len());
//! # Ok::<(), orgaplex::Error>(())
//! ```

use crate::aggregate::{Completeness, Matrix, MetricMatrix};
use crate::pipeline::{MetricReport, RelationshipReport};
use crate::provenance::ProvenanceRecord;
use crate::{Error, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Row-label column of relationship tables
pub const RELATIONSHIP_HEADER: &str = "Relationship";
/// Row-label column of metric tables
pub const METRIC_HEADER: &str = "Metric";

/// On-disk container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// One CSV file per table
    #[default]
    Csv,
    /// One Parquet file per table
    Parquet,
}

impl ExportFormat {
    /// File extension (without dot)
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// Named table ready to write
#[derive(Debug, Clone)]
pub struct Table {
    /// File stem
    pub name: String,
    /// Table contents
    pub batch: RecordBatch,
}

fn matrix_batch<C, F>(matrix: &Matrix<C>, row_header: &str, data_type: &DataType, mut column: F) -> Result<RecordBatch>
where
    F: FnMut(Vec<&C>) -> ArrayRef,
{
    let (rows, _) = matrix.shape();
    let mut fields = vec![Field::new(row_header, DataType::Utf8, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from_iter_values(matrix.rows()))];

    for (index, label) in matrix.columns().iter().enumerate() {
        let cells: Vec<&C> = (0..rows).map(|r| &matrix.row(r)[index]).collect();
        fields.push(Field::new(label, data_type.clone(), true));
        arrays.push(column(cells));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Float table; `None` cells become nulls
///
/// # Errors
///
/// Returns `Error::Arrow` if the batch cannot be assembled
pub fn float_batch(matrix: &Matrix<Option<f64>>, row_header: &str) -> Result<RecordBatch> {
    matrix_batch(matrix, row_header, &DataType::Float64, |cells| {
        Arc::new(cells.into_iter().copied().collect::<Float64Array>())
    })
}

/// Count table
///
/// # Errors
///
/// Returns `Error::Arrow` if the batch cannot be assembled
pub fn count_batch(matrix: &Matrix<usize>, row_header: &str) -> Result<RecordBatch> {
    matrix_batch(matrix, row_header, &DataType::UInt64, |cells| {
        Arc::new(UInt64Array::from_iter_values(
            cells.into_iter().map(|c| u64::try_from(*c).unwrap_or(u64::MAX)),
        ))
    })
}

/// Completeness table ("Present" / "Missing")
///
/// # Errors
///
/// Returns `Error::Arrow` if the batch cannot be assembled
pub fn completeness_batch(matrix: &Matrix<Completeness>, row_header: &str) -> Result<RecordBatch> {
    matrix_batch(matrix, row_header, &DataType::Utf8, |cells| {
        Arc::new(StringArray::from_iter_values(cells.into_iter().map(|c| c.label())))
    })
}

/// Two-column `Parameter`/`Value` table
///
/// # Errors
///
/// Returns `Error::Arrow` if the batch cannot be assembled
pub fn provenance_batch(record: &ProvenanceRecord) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("Parameter", DataType::Utf8, false),
        Field::new("Value", DataType::Utf8, false),
    ]);
    let keys = StringArray::from_iter_values(record.entries().iter().map(|(k, _)| k));
    let values = StringArray::from_iter_values(record.entries().iter().map(|(_, v)| v));
    Ok(RecordBatch::try_new(Arc::new(schema), vec![Arc::new(keys), Arc::new(values)])?)
}

/// Metric table for one category
///
/// # Errors
///
/// Returns `Error::Arrow` if the batch cannot be assembled
pub fn metric_batch(matrix: &MetricMatrix) -> Result<RecordBatch> {
    float_batch(matrix.matrix(), METRIC_HEADER)
}

impl RelationshipReport {
    /// Mean, count, completeness and metadata tables
    ///
    /// # Errors
    ///
    /// Returns `Error::Arrow` if a batch cannot be assembled
    pub fn tables(&self) -> Result<Vec<Table>> {
        Ok(vec![
            Table {
                name: "one_way_interactions_mean_distance".into(),
                batch: float_batch(&self.mean_matrix(), RELATIONSHIP_HEADER)?,
            },
            Table {
                name: "one_way_interactions_count".into(),
                batch: count_batch(&self.count_matrix(), RELATIONSHIP_HEADER)?,
            },
            Table {
                name: "one_way_interactions_completeness".into(),
                batch: completeness_batch(&self.completeness_matrix(), RELATIONSHIP_HEADER)?,
            },
            Table {
                name: "one_way_interactions_metadata".into(),
                batch: provenance_batch(&self.provenance)?,
            },
        ])
    }
}

impl MetricReport {
    /// One table per category plus metadata
    ///
    /// # Errors
    ///
    /// Returns `Error::Arrow` if a batch cannot be assembled
    pub fn tables(&self) -> Result<Vec<Table>> {
        let mut tables = Vec::with_capacity(self.analysis.matrices().len() + 1);
        for matrix in self.analysis.matrices() {
            tables.push(Table {
                name: format!("vol_spher_metrics_{}", matrix.category()),
                batch: metric_batch(matrix)?,
            });
        }
        tables.push(Table {
            name: "vol_spher_metrics_metadata".into(),
            batch: provenance_batch(&self.provenance)?,
        });
        Ok(tables)
    }
}

/// Write tables into `dir` (created if needed), one file each
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written
pub fn write_tables(tables: &[Table], dir: impl AsRef<Path>, format: ExportFormat) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    if !dir.is_dir() {
        return Err(Error::Export(format!("output path is not a directory: {}", dir.display())));
    }

    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = dir.join(format!("{}.{}", table.name, format.extension()));
        let file = File::create(&path)?;
        match format {
            ExportFormat::Csv => {
                let mut writer = arrow::csv::WriterBuilder::new().with_header(true).build(file);
                writer.write(&table.batch)?;
            }
            ExportFormat::Parquet => {
                let mut writer = parquet::arrow::ArrowWriter::try_new(file, table.batch.schema(), None)?;
                writer.write(&table.batch)?;
                writer.close()?;
            }
        }
        written.push(path);
    }
    Ok(written)
}

/// Export a relationship report
///
/// # Errors
///
/// Returns an error if a table cannot be built or written
pub fn export_relationships(
    report: &RelationshipReport,
    dir: impl AsRef<Path>,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    write_tables(&report.tables()?, dir, format)
}

/// Export a metric report
///
/// # Errors
///
/// Returns an error if a table cannot be built or written
pub fn export_metrics(report: &MetricReport, dir: impl AsRef<Path>, format: ExportFormat) -> Result<Vec<PathBuf>> {
    write_tables(&report.tables()?, dir, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_float_batch_schema_and_nulls() {
        let matrix = Matrix::from_fn(labels(&["ER-to-LD", "M-to-ER"]), labels(&["a1", "a2"]), |r, c| {
            (r != "M-to-ER" || c != "a2").then_some(1.5)
        });
        let batch = float_batch(&matrix, RELATIONSHIP_HEADER).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 3);
        assert_eq!(batch.schema().field(0).name(), "Relationship");
        assert_eq!(batch.schema().field(2).name(), "a2");

        let a2 = batch.column(2).as_any().downcast_ref::<Float64Array>().unwrap();
        assert!(!a2.is_null(0));
        assert!(a2.is_null(1));
    }

    #[test]
    fn test_provenance_batch() {
        let mut record = ProvenanceRecord::default();
        record.push("Software", "x");
        record.push("Entities", 2);
        let batch = provenance_batch(&record).unwrap();
        assert_eq!(batch.num_rows(), 2);
        let values = batch.column(1).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(values.value(1), "2");
    }

    #[test]
    fn test_write_csv_and_parquet() {
        let matrix = Matrix::from_fn(labels(&["ER-to-LD"]), labels(&["a1"]), |_, _| 3_usize);
        let tables = vec![Table {
            name: "counts".into(),
            batch: count_batch(&matrix, RELATIONSHIP_HEADER).unwrap(),
        }];
        let dir = tempfile::tempdir().unwrap();

        let csv = write_tables(&tables, dir.path(), ExportFormat::Csv).unwrap();
        let text = fs::read_to_string(&csv[0]).unwrap();
        assert_eq!(text, "Relationship,a1\nER-to-LD,3\n");

        let parquet = write_tables(&tables, dir.path().join("pq"), ExportFormat::Parquet).unwrap();
        assert!(parquet[0].ends_with("counts.parquet"));
        assert!(fs::metadata(&parquet[0]).unwrap().len() > 0);
    }
}
