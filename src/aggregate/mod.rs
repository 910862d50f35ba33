//! Summary matrices
//!
//! A [`Matrix`] is dense: every `(row, column)` pair has a cell. Absence is a
//! cell value, never a missing key, so consumers do not special-case holes.

mod metric;
mod relationship;

pub use metric::{MetricAggregator, MetricAnalysis, MetricMatrix, MetricRow};
pub use relationship::{RelationshipAggregator, RelationshipAnalysis, RelationshipStats};

use std::fmt;

/// Dense row-major matrix with labelled rows and columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<C> {
    rows: Vec<String>,
    columns: Vec<String>,
    cells: Vec<C>,
}

impl<C> Matrix<C> {
    /// Build a matrix by evaluating `cell` for every `(row, column)`
    pub fn from_fn<F>(rows: Vec<String>, columns: Vec<String>, mut cell: F) -> Self
    where
        F: FnMut(&str, &str) -> C,
    {
        let mut cells = Vec::with_capacity(rows.len() * columns.len());
        for row in &rows {
            for column in &columns {
                cells.push(cell(row, column));
            }
        }
        Self { rows, columns, cells }
    }

    /// Row labels
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Column labels
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `(rows, columns)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Total number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the matrix has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells of row `index`
    #[must_use]
    pub fn row(&self, index: usize) -> &[C] {
        let width = self.columns.len();
        &self.cells[index * width..(index + 1) * width]
    }

    /// Cell at `(row label, column label)`
    #[must_use]
    pub fn get(&self, row: &str, column: &str) -> Option<&C> {
        let r = self.rows.iter().position(|label| label == row)?;
        let c = self.columns.iter().position(|label| label == column)?;
        self.cells.get(r * self.columns.len() + c)
    }

    /// All cells, row-major
    #[must_use]
    pub fn cells(&self) -> &[C] {
        &self.cells
    }

    /// Same labels, cells transformed by `f`
    #[must_use]
    pub fn map<D, F>(&self, f: F) -> Matrix<D>
    where
        F: FnMut(&C) -> D,
    {
        Matrix {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

/// One cell of a summary matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateCell {
    /// Observed: mean and count of the underlying series
    Present {
        /// Mean of the loaded values
        mean: f64,
        /// Count statistic (see `CountMode`)
        count: usize,
    },
    /// Never observed, or its data failed to load
    Absent,
}

impl AggregateCell {
    /// Whether the cell holds data
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    /// Mean, if present
    #[must_use]
    pub const fn mean(&self) -> Option<f64> {
        match self {
            Self::Present { mean, .. } => Some(*mean),
            Self::Absent => None,
        }
    }

    /// Count, zero when absent
    #[must_use]
    pub const fn count(&self) -> usize {
        match self {
            Self::Present { count, .. } => *count,
            Self::Absent => 0,
        }
    }

    /// Presence marker for the completeness matrix
    #[must_use]
    pub const fn completeness(&self) -> Completeness {
        if self.is_present() {
            Completeness::Present
        } else {
            Completeness::Missing
        }
    }
}

/// Relationship × entity matrix
pub type SummaryMatrix = Matrix<AggregateCell>;

/// Per-cell presence record paired with a summary matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// Cell holds data
    Present,
    /// Cell is absent
    Missing,
}

impl Completeness {
    /// Label written to exports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Missing => "Missing",
        }
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl SummaryMatrix {
    /// Presence matrix with the same labels
    #[must_use]
    pub fn completeness_matrix(&self) -> Matrix<Completeness> {
        self.map(AggregateCell::completeness)
    }

    /// Missing-cell tally
    #[must_use]
    pub fn completeness_report(&self) -> CompletenessReport {
        let missing = self.cells().iter().filter(|c| !c.is_present()).count();
        CompletenessReport::new(missing, self.len())
    }
}

/// Fraction of absent cells in a summary matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletenessReport {
    /// Absent cells
    pub missing_cells: usize,
    /// All cells (rows × columns)
    pub total_cells: usize,
}

impl CompletenessReport {
    /// Report for `missing` absent cells out of `total`
    #[must_use]
    pub const fn new(missing_cells: usize, total_cells: usize) -> Self {
        Self { missing_cells, total_cells }
    }

    /// `missing / total × 100`, zero for an empty matrix
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn missing_percent(&self) -> f64 {
        if self.total_cells == 0 {
            0.0
        } else {
            self.missing_cells as f64 / self.total_cells as f64 * 100.0
        }
    }

    /// Whether every cell is present
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.missing_cells == 0
    }
}

impl fmt::Display for CompletenessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} cells missing ({:.1}%)",
            self.missing_cells,
            self.total_cells,
            self.missing_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_from_fn_is_dense() {
        let matrix = Matrix::from_fn(labels(&["r1", "r2"]), labels(&["a", "b", "c"]), |r, c| format!("{r}{c}"));
        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.len(), 6);
        assert_eq!(matrix.row(1), ["r2a", "r2b", "r2c"]);
        assert_eq!(matrix.get("r1", "c").map(String::as_str), Some("r1c"));
        assert!(matrix.get("r3", "a").is_none());
    }

    #[test]
    fn test_completeness() {
        let matrix = SummaryMatrix::from_fn(labels(&["ER-to-LD"]), labels(&["a1", "a2", "a3", "a4"]), |_, c| {
            if c == "a2" {
                AggregateCell::Absent
            } else {
                AggregateCell::Present { mean: 1.0, count: 3 }
            }
        });

        let presence = matrix.completeness_matrix();
        assert_eq!(presence.get("ER-to-LD", "a2"), Some(&Completeness::Missing));
        assert_eq!(presence.get("ER-to-LD", "a1"), Some(&Completeness::Present));

        let report = matrix.completeness_report();
        assert_eq!(report.missing_cells, 1);
        assert_eq!(report.total_cells, 4);
        assert!((report.missing_percent() - 25.0).abs() < 1e-12);
        assert_eq!(report.to_string(), "1/4 cells missing (25.0%)");
    }

    #[test]
    fn test_empty_matrix_report() {
        let matrix = SummaryMatrix::from_fn(vec![], labels(&["a"]), |_, _| AggregateCell::Absent);
        let report = matrix.completeness_report();
        assert!(report.is_complete());
        assert!(report.missing_percent().abs() < f64::EPSILON);
    }

    #[test]
    fn test_absent_cell_accessors() {
        assert_eq!(AggregateCell::Absent.mean(), None);
        assert_eq!(AggregateCell::Absent.count(), 0);
        assert_eq!(AggregateCell::Present { mean: 2.0, count: 5 }.count(), 5);
    }
}
