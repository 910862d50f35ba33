//! Directory listing with shadow-entry filtering
//!
//! Copy tools on some platforms leave `._name` companion entries next to every
//! real file and folder. They are removed here, before any pattern matching
//! sees them, and the remaining entries are sorted by name so listing order is
//! reproducible.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Kind of entry to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directories only
    Directory,
    /// Regular files only
    File,
}

/// Excludes shadow entries from directory listings.
#[derive(Debug, Clone)]
pub struct MetadataFileFilter {
    prefix: String,
}

impl MetadataFileFilter {
    /// Filter dropping entries whose name starts with `prefix`
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Whether `path` names a shadow entry
    #[must_use]
    pub fn is_shadow(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(&self.prefix))
    }

    /// Drop shadow entries from `paths`, preserving order
    #[must_use]
    pub fn retain_visible<I>(&self, paths: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        paths.into_iter().filter(|p| !self.is_shadow(p)).collect()
    }

    /// List the visible entries of `dir` of the given kind, sorted by name
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if `dir` cannot be read
    pub fn list(&self, dir: &Path, kind: EntryKind) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let keep = match kind {
                EntryKind::Directory => path.is_dir(),
                EntryKind::File => path.is_file(),
            };
            if keep {
                entries.push(path);
            }
        }

        let mut visible = self.retain_visible(entries);
        visible.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(visible)
    }
}
