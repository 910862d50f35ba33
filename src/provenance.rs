//! Provenance records
//!
//! A flat, ordered list of `(key, value)` pairs describing how an export was
//! produced. Built fresh for every export from already-computed state.

use crate::discovery::Discovery;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Software name written to every record
pub const SOFTWARE_NAME: &str = "Orgaplex-Analyzer";

/// Timestamp format used in records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Analysis a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisKind {
    /// Pairwise-distance analysis
    Relationships,
    /// Volume / sphericity analysis
    Metrics,
}

impl AnalysisKind {
    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Relationships => "One-Way Interactions",
            Self::Metrics => "Vol/Spher Metrics",
        }
    }
}

/// Ordered key/value provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    entries: Vec<(String, String)>,
}

impl ProvenanceRecord {
    /// Entries in insertion order
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Value for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Append an entry
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.entries.push((key.into(), value.to_string()));
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Captures run parameters and environment identifiers.
#[derive(Debug, Clone)]
pub struct ProvenanceRecorder {
    kind: AnalysisKind,
    timestamp: DateTime<Local>,
}

impl ProvenanceRecorder {
    /// Recorder stamped with the current local time
    #[must_use]
    pub fn new(kind: AnalysisKind) -> Self {
        Self { kind, timestamp: Local::now() }
    }

    /// Use a fixed timestamp instead of now
    #[must_use]
    pub const fn at(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Common entries: software, environment, input and discovery counts
    ///
    /// Analysis-specific entries are appended by the caller.
    #[must_use]
    pub fn record(&self, discovery: &Discovery, header_lines: usize) -> ProvenanceRecord {
        let mut record = ProvenanceRecord::default();
        record.push("Software", SOFTWARE_NAME);
        record.push("Version", env!("CARGO_PKG_VERSION"));
        record.push("Analysis_Type", self.kind.label());
        record.push("Timestamp", self.timestamp.format(TIMESTAMP_FORMAT));
        record.push("OS", std::env::consts::OS);
        record.push("Architecture", std::env::consts::ARCH);
        record.push("User", whoami::username());
        record.push(
            "Host",
            whoami::fallible::hostname().unwrap_or_else(|_| "unknown".to_string()),
        );
        record.push("Input_Directory", discovery.root().display());
        record.push("Scan_Directory", discovery.scan_dir().display());
        record.push("Layout", discovery.layout());
        record.push("Entities", discovery.entities().len());
        record.push("Categories", discovery.categories().len());
        record.push("Header_Lines", header_lines);
        record
    }
}
