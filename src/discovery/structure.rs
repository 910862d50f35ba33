//! Input layout detection
//!
//! Category folders live either directly under the root (flat) or one level
//! down inside condition subfolders (nested). Anything deeper is rejected.

use super::filter::{EntryKind, MetadataFileFilter};
use crate::report::{Diagnostic, Reporter};
use crate::{AnalysisConfig, Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Detected input layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// `<root>/<entity>_<Category>_Statistics/`
    Flat,
    /// `<root>/<condition>/<entity>_<Category>_Statistics/`
    Nested {
        /// Name of the condition subfolder that was selected
        condition: String,
    },
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::Nested { condition } => write!(f, "nested ({condition})"),
        }
    }
}

/// Directory to scan, with the layout that led to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStructure {
    /// Directory holding the category folders
    pub scan_dir: PathBuf,
    /// Layout detected
    pub layout: Layout,
}

/// Chooses the scan directory for an input root.
#[derive(Debug, Clone)]
pub struct StructureResolver<'a> {
    config: &'a AnalysisConfig,
    filter: MetadataFileFilter,
}

impl<'a> StructureResolver<'a> {
    /// Resolver using the suffix and shadow prefix from `config`
    #[must_use]
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self {
            config,
            filter: MetadataFileFilter::new(config.shadow_prefix.clone()),
        }
    }

    /// Decide between flat and nested layout
    ///
    /// Nested candidates are considered in name order; the first one holding a
    /// category folder wins.
    ///
    /// # Errors
    ///
    /// Returns `Error::Structure` if the root does not exist, is not a
    /// directory, or neither layout yields a category folder
    pub fn resolve(&self, root: &Path, reporter: &dyn Reporter) -> Result<ResolvedStructure> {
        if !root.exists() {
            return Err(Error::Structure(format!(
                "input directory does not exist: {}",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(Error::Structure(format!(
                "input path is not a directory: {}",
                root.display()
            )));
        }

        let subdirs = self.filter.list(root, EntryKind::Directory)?;
        if subdirs.iter().any(|d| self.is_category_folder(d)) {
            reporter.report(Diagnostic::info("Structure: flat, category folders under input root").at(root));
            return Ok(ResolvedStructure {
                scan_dir: root.to_path_buf(),
                layout: Layout::Flat,
            });
        }

        let mut candidates = Vec::new();
        for subdir in &subdirs {
            let children = self.filter.list(subdir, EntryKind::Directory)?;
            if children.iter().any(|d| self.is_category_folder(d)) {
                candidates.push(subdir.clone());
            }
        }

        let Some(chosen) = candidates.first() else {
            return Err(Error::Structure(format!(
                "no folders ending with '{}' found in {} or its immediate subdirectories",
                self.config.folder_suffix,
                root.display()
            )));
        };

        let condition = chosen
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if candidates.len() > 1 {
            let names: Vec<String> = candidates
                .iter()
                .filter_map(|c| c.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect();
            reporter.report(
                Diagnostic::warning(format!(
                    "{} condition subfolders contain data ({}); using '{condition}'",
                    candidates.len(),
                    names.join(", ")
                ))
                .at(root),
            );
        } else {
            reporter.report(
                Diagnostic::info(format!("Structure: nested, using condition subfolder '{condition}'"))
                    .at(chosen),
            );
        }

        Ok(ResolvedStructure {
            scan_dir: chosen.clone(),
            layout: Layout::Nested { condition },
        })
    }

    fn is_category_folder(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&self.config.folder_suffix))
    }
}
