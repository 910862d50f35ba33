//! Reporting port
//!
//! The core never logs through global state. Operations take a `&dyn Reporter`
//! and the host decides where diagnostics go: `TracingReporter` forwards them to
//! `tracing`, `CollectingReporter` keeps them in memory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Progress information
    Info,
    /// Advisory: data used, but suspicious
    Warning,
    /// A unit of work (file, relationship, entity) failed and was skipped
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// One reported event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// File or folder the event refers to, if any
    pub path: Option<PathBuf>,
}

impl Diagnostic {
    /// Info diagnostic
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { severity: Severity::Info, message: message.into(), path: None }
    }

    /// Warning diagnostic
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, message: message.into(), path: None }
    }

    /// Error diagnostic
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into(), path: None }
    }

    /// Attach the path this diagnostic refers to
    #[must_use]
    pub fn at(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(path) = &self.path {
            write!(f, " ({})", path.display())?;
        }
        Ok(())
    }
}

/// Sink for diagnostics emitted by discovery, loading and aggregation.
pub trait Reporter: Send + Sync {
    /// Receive one diagnostic
    fn report(&self, diagnostic: Diagnostic);

    /// Shorthand for an info diagnostic
    fn info(&self, message: &str) {
        self.report(Diagnostic::info(message));
    }

    /// Shorthand for a warning diagnostic
    fn warn(&self, message: &str) {
        self.report(Diagnostic::warning(message));
    }
}

/// Forwards diagnostics to `tracing` under the `orgaplex` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        let path = diagnostic
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match diagnostic.severity {
            Severity::Info => tracing::info!(target: "orgaplex", path = %path, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(target: "orgaplex", path = %path, "{}", diagnostic.message),
            Severity::Error => tracing::error!(target: "orgaplex", path = %path, "{}", diagnostic.message),
        }
    }
}

/// Keeps every diagnostic in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingReporter {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Diagnostics of one severity
    #[must_use]
    pub fn with_severity(&self, severity: Severity) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(|d| d.severity == severity)
            .collect()
    }

    /// Warnings reported so far
    #[must_use]
    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.with_severity(Severity::Warning)
    }

    /// Errors reported so far
    #[must_use]
    pub fn errors(&self) -> Vec<Diagnostic> {
        self.with_severity(Severity::Error)
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut guard) = self.diagnostics.lock() {
            guard.push(diagnostic);
        }
    }
}
