//! Entity and category discovery
//!
//! Turns an input root into an immutable [`Discovery`]: every category folder
//! found under the resolved scan directory, parsed into `(entity, category)`,
//! plus the two lookup indices built together from the same records.
//!
//! ```rust,no_run
//! use orgaplex::discovery::EntityDiscoverer;
//! use orgaplex::report::TracingReporter;
//! use orgaplex::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! let discovery = EntityDiscoverer::new(&config)?.discover("data/experiment1", &TracingReporter)?;
//! println!("{discovery}");
//! # Ok::<(), orgaplex::Error>(())
//! ```

mod filter;
mod structure;

pub use filter::{EntryKind, MetadataFileFilter};
pub use structure::{Layout, ResolvedStructure, StructureResolver};

use crate::report::{Diagnostic, Reporter};
use crate::sorting::sorted_natural;
use crate::{AnalysisConfig, Error, Result};
use regex::Regex;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// One discovered category folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRecord {
    /// Folder path
    pub path: PathBuf,
    /// Specimen identifier
    pub entity_id: String,
    /// Category label
    pub category: String,
}

/// Distance export found inside a category folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipFile {
    /// File path
    pub path: PathBuf,
    /// Target category parsed from `Surfaces=<Target>`
    pub target: String,
}

/// Categories an entity lacks relative to the union of all categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    /// Entity with missing categories
    pub entity_id: String,
    /// Missing categories, sorted
    pub missing: Vec<String>,
}

/// Immutable result of one discovery pass.
#[derive(Debug, Clone)]
pub struct Discovery {
    root: PathBuf,
    structure: ResolvedStructure,
    folders: Vec<FolderRecord>,
    by_key: FxHashMap<(String, String), usize>,
    by_entity: FxHashMap<String, Vec<String>>,
    entities: Vec<String>,
    categories: Vec<String>,
}

impl Discovery {
    /// Build the result and both indices from parsed records
    ///
    /// Duplicate `(entity, category)` pairs keep the first record.
    fn from_records(
        root: PathBuf,
        structure: ResolvedStructure,
        records: Vec<FolderRecord>,
        reporter: &dyn Reporter,
    ) -> Self {
        let mut folders = Vec::with_capacity(records.len());
        let mut by_key = FxHashMap::default();
        let mut by_entity: FxHashMap<String, Vec<String>> = FxHashMap::default();

        for record in records {
            let key = (record.entity_id.clone(), record.category.clone());
            if let Some(&existing) = by_key.get(&key) {
                let kept: &FolderRecord = &folders[existing];
                reporter.report(
                    Diagnostic::warning(format!(
                        "duplicate folder for entity '{}' category '{}'; keeping {}",
                        record.entity_id,
                        record.category,
                        kept.path.display()
                    ))
                    .at(&record.path),
                );
                continue;
            }
            by_key.insert(key, folders.len());
            by_entity
                .entry(record.entity_id.clone())
                .or_default()
                .push(record.category.clone());
            folders.push(record);
        }

        for categories in by_entity.values_mut() {
            categories.sort();
        }

        let entities = sorted_natural(by_entity.keys().cloned());
        let categories: Vec<String> = folders
            .iter()
            .map(|f| f.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            root,
            structure,
            folders,
            by_key,
            by_entity,
            entities,
            categories,
        }
    }

    /// Input root as given
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that was scanned for category folders
    #[must_use]
    pub fn scan_dir(&self) -> &Path {
        &self.structure.scan_dir
    }

    /// Detected layout
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.structure.layout
    }

    /// All folder records, in name order
    #[must_use]
    pub fn folders(&self) -> &[FolderRecord] {
        &self.folders
    }

    /// Exact lookup by `(entity, category)`
    #[must_use]
    pub fn folder(&self, entity_id: &str, category: &str) -> Option<&FolderRecord> {
        self.by_key
            .get(&(entity_id.to_string(), category.to_string()))
            .map(|&index| &self.folders[index])
    }

    /// Categories present for an entity, sorted (empty if unknown)
    #[must_use]
    pub fn categories_of(&self, entity_id: &str) -> &[String] {
        self.by_entity.get(entity_id).map_or(&[], Vec::as_slice)
    }

    /// Entities that have a folder for `category`, in natural order
    #[must_use]
    pub fn entities_with(&self, category: &str) -> Vec<&str> {
        self.entities
            .iter()
            .filter(|entity| self.folder(entity, category).is_some())
            .map(String::as_str)
            .collect()
    }

    /// All entities, natural order
    #[must_use]
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// All categories, lexicographic order
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Per-entity categories missing relative to the union
    #[must_use]
    pub fn coverage_gaps(&self) -> Vec<CoverageGap> {
        self.entities
            .iter()
            .filter_map(|entity| {
                let present = self.categories_of(entity);
                let missing: Vec<String> = self
                    .categories
                    .iter()
                    .filter(|c| !present.contains(c))
                    .cloned()
                    .collect();
                (!missing.is_empty()).then(|| CoverageGap {
                    entity_id: entity.clone(),
                    missing,
                })
            })
            .collect()
    }
}

impl fmt::Display for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(f, "DISCOVERY SUMMARY")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Layout: {}", self.layout())?;
        writeln!(f, "Search directory: {}", self.scan_dir().display())?;
        writeln!(f, "Total entities: {}", self.entities.len())?;
        writeln!(f, "Total categories: {}", self.categories.len())?;
        writeln!(f, "Categories: {}", self.categories.join(", "))?;
        writeln!(f, "Entities: {}", self.entities.join(", "))?;
        write!(f, "{rule}")
    }
}

/// Scans a resolved directory for category folders.
#[derive(Debug, Clone)]
pub struct EntityDiscoverer<'a> {
    config: &'a AnalysisConfig,
    filter: MetadataFileFilter,
    folder_pattern: Regex,
    target_pattern: Regex,
}

impl<'a> EntityDiscoverer<'a> {
    /// Discoverer for the naming convention in `config`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the folder suffix cannot form a pattern
    pub fn new(config: &'a AnalysisConfig) -> Result<Self> {
        let suffix = regex::escape(&config.folder_suffix);
        let folder_pattern = Regex::new(&format!(r"^(.+?)_([A-Z][A-Za-z0-9]*){suffix}$"))
            .map_err(|e| Error::InvalidConfig(format!("folder pattern: {e}")))?;
        let target_pattern = Regex::new(r"Surfaces=([A-Z][A-Za-z0-9]*)")
            .map_err(|e| Error::InvalidConfig(format!("target pattern: {e}")))?;

        Ok(Self {
            config,
            filter: MetadataFileFilter::new(config.shadow_prefix.clone()),
            folder_pattern,
            target_pattern,
        })
    }

    /// Parse `(entity_id, category)` from a folder name
    ///
    /// The category is the capitalised token right before the suffix; the
    /// entity is everything before it.
    #[must_use]
    pub fn parse_folder_name(&self, name: &str) -> Option<(String, String)> {
        let captures = self.folder_pattern.captures(name)?;
        Some((captures[1].to_string(), captures[2].to_string()))
    }

    /// Resolve the layout under `root` and discover every category folder
    ///
    /// Each call is a fresh pass; nothing carries over from earlier results.
    ///
    /// # Errors
    ///
    /// Returns `Error::Structure` if the layout cannot be resolved or no folder
    /// name parses
    pub fn discover(&self, root: impl AsRef<Path>, reporter: &dyn Reporter) -> Result<Discovery> {
        let root = root.as_ref();
        let structure = StructureResolver::new(self.config).resolve(root, reporter)?;
        self.discover_in(root, structure, reporter)
    }

    /// Discover category folders in an already-resolved structure
    ///
    /// # Errors
    ///
    /// Returns `Error::Structure` if no folder name parses
    pub fn discover_in(
        &self,
        root: &Path,
        structure: ResolvedStructure,
        reporter: &dyn Reporter,
    ) -> Result<Discovery> {
        let candidates: Vec<PathBuf> = self
            .filter
            .list(&structure.scan_dir, EntryKind::Directory)?
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(&self.config.folder_suffix))
            })
            .collect();

        if candidates.is_empty() {
            return Err(Error::Structure(format!(
                "no folders ending with '{}' found in {}",
                self.config.folder_suffix,
                structure.scan_dir.display()
            )));
        }

        let mut records = Vec::with_capacity(candidates.len());
        for path in candidates {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if let Some((entity_id, category)) = self.parse_folder_name(&name) {
                records.push(FolderRecord { path, entity_id, category });
            } else {
                reporter.report(
                    Diagnostic::warning(format!("could not parse entity and category from '{name}'"))
                        .at(&path),
                );
            }
        }

        if records.is_empty() {
            return Err(Error::Structure(format!(
                "no valid category folders could be parsed in {}",
                structure.scan_dir.display()
            )));
        }

        let discovery = Discovery::from_records(root.to_path_buf(), structure, records, reporter);
        reporter.info(&format!(
            "Found {} entities and {} categories: {}",
            discovery.entities().len(),
            discovery.categories().len(),
            discovery.categories().join(", ")
        ));
        Ok(discovery)
    }

    /// Distance exports inside one category folder, sorted by name
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the folder cannot be listed
    pub fn relationship_files(
        &self,
        folder: &FolderRecord,
        reporter: &dyn Reporter,
    ) -> Result<Vec<RelationshipFile>> {
        let extension = &self.config.measurement_extension;
        let mut files = Vec::new();

        for path in self.filter.list(&folder.path, EntryKind::File)? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let has_extension = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension));
            if !has_extension || !name.contains(&self.config.distance_marker) {
                continue;
            }

            match self.target_pattern.captures(name) {
                Some(captures) => files.push(RelationshipFile {
                    target: captures[1].to_string(),
                    path,
                }),
                None => reporter.report(
                    Diagnostic::warning(format!("could not identify target category in '{name}'"))
                        .at(&path),
                ),
            }
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use std::fs;

    fn discoverer(config: &AnalysisConfig) -> EntityDiscoverer<'_> {
        EntityDiscoverer::new(config).unwrap()
    }

    #[test]
    fn test_parse_folder_name() {
        let config = AnalysisConfig::default();
        let d = discoverer(&config);
        assert_eq!(
            d.parse_folder_name("control_1_ER_Statistics"),
            Some(("control_1".into(), "ER".into()))
        );
        assert_eq!(
            d.parse_folder_name("1h LPS 2_Ly2_Statistics"),
            Some(("1h LPS 2".into(), "Ly2".into()))
        );
        assert_eq!(
            d.parse_folder_name("a_B_C_Statistics"),
            Some(("a_B".into(), "C".into()))
        );
        assert_eq!(d.parse_folder_name("control_1_er_Statistics"), None);
        assert_eq!(d.parse_folder_name("_ER_Statistics"), None);
        assert_eq!(d.parse_folder_name("control_1_ER_Stats"), None);
    }

    #[test]
    fn test_indices_consistent() {
        let tmp = tempfile::tempdir().unwrap();
        for dir in ["c2_ER_Statistics", "c10_ER_Statistics", "c2_LD_Statistics", "junk_Statistics"] {
            fs::create_dir(tmp.path().join(dir)).unwrap();
        }
        let config = AnalysisConfig::default();
        let reporter = CollectingReporter::new();

        let discovery = discoverer(&config).discover(tmp.path(), &reporter).unwrap();
        assert_eq!(discovery.entities(), ["c2", "c10"]);
        assert_eq!(discovery.categories(), ["ER", "LD"]);
        assert_eq!(discovery.categories_of("c2"), ["ER", "LD"]);
        assert_eq!(discovery.categories_of("c10"), ["ER"]);
        assert_eq!(discovery.entities_with("LD"), vec!["c2"]);

        for record in discovery.folders() {
            let found = discovery.folder(&record.entity_id, &record.category).unwrap();
            assert_eq!(found, record);
            assert!(discovery.categories_of(&record.entity_id).contains(&record.category));
        }

        assert_eq!(reporter.warnings().len(), 1);
        assert!(reporter.warnings()[0].message.contains("junk_Statistics"));
    }

    #[test]
    fn test_zero_parseable_folders_is_structural() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("lower_case_Statistics")).unwrap();
        let config = AnalysisConfig::default();

        let err = discoverer(&config)
            .discover(tmp.path(), &CollectingReporter::new())
            .unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("no valid category folders"));
    }

    #[test]
    fn test_coverage_gaps() {
        let tmp = tempfile::tempdir().unwrap();
        for dir in ["a1_ER_Statistics", "a1_M_Statistics", "a2_ER_Statistics"] {
            fs::create_dir(tmp.path().join(dir)).unwrap();
        }
        let config = AnalysisConfig::default();
        let discovery = discoverer(&config)
            .discover(tmp.path(), &CollectingReporter::new())
            .unwrap();

        assert_eq!(
            discovery.coverage_gaps(),
            vec![CoverageGap { entity_id: "a2".into(), missing: vec!["M".into()] }]
        );
    }

    #[test]
    fn test_relationship_files() {
        let tmp = tempfile::tempdir().unwrap();
        let folder = tmp.path().join("c1_ER_Statistics");
        fs::create_dir(&folder).unwrap();
        for name in [
            "c1_ER_Shortest_Distance_to_Surfaces_Surfaces=LD.csv",
            "c1_ER_Shortest_Distance_to_Surfaces_Surfaces=M.csv",
            "._c1_ER_Shortest_Distance_to_Surfaces_Surfaces=LD.csv",
            "c1_ER_Shortest_Distance_to_Surfaces_Surfaces=lower.csv",
            "c1_ER_Volume.csv",
            "c1_ER_Shortest_Distance_to_Surfaces_Surfaces=G.txt",
        ] {
            fs::write(folder.join(name), "").unwrap();
        }
        let config = AnalysisConfig::default();
        let reporter = CollectingReporter::new();
        let record = FolderRecord {
            path: folder,
            entity_id: "c1".into(),
            category: "ER".into(),
        };

        let files = discoverer(&config).relationship_files(&record, &reporter).unwrap();
        let targets: Vec<_> = files.iter().map(|f| f.target.as_str()).collect();
        assert_eq!(targets, vec!["LD", "M"]);
        assert_eq!(reporter.warnings().len(), 1);
    }
}
