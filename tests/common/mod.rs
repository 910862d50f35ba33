//! On-disk experiment fixtures shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Four-line header block as written by the segmentation tool
pub const HEADER: &str = " \n==================\nShortest Distance to Surfaces\nValue,Unit,Category,Collection,Time,Surfaces,ID\n";

/// Write a measurement file: header, then one value per line
pub fn write_series(path: &Path, values: &[&str]) {
    let mut contents = String::from(HEADER);
    for value in values {
        contents.push_str(value);
        contents.push_str(",um,Surface,Position,1,,0\n");
    }
    fs::write(path, contents).unwrap();
}

/// Experiment directory under construction
pub struct Experiment {
    dir: tempfile::TempDir,
    scan: PathBuf,
}

impl Experiment {
    /// Category folders directly under the root
    pub fn flat() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().to_path_buf();
        Self { dir, scan }
    }

    /// Category folders under `<root>/<condition>`
    pub fn nested(condition: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join(condition);
        fs::create_dir_all(&scan).unwrap();
        Self { dir, scan }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create (if needed) and return `<entity>_<category>_Statistics`
    pub fn folder(&self, entity: &str, category: &str) -> PathBuf {
        let path = self.scan.join(format!("{entity}_{category}_Statistics"));
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Distance export from `category` to `target` for one entity
    pub fn distances(&self, entity: &str, category: &str, target: &str, values: &[&str]) -> PathBuf {
        let path = self
            .folder(entity, category)
            .join(format!("{entity}_{category}_Shortest_Distance_to_Surfaces_Surfaces={target}.csv"));
        write_series(&path, values);
        path
    }

    /// Volume file for one entity and category
    pub fn volumes(&self, entity: &str, category: &str, values: &[&str]) -> PathBuf {
        let path = self.folder(entity, category).join(format!("{entity}_{category}_Volume.csv"));
        write_series(&path, values);
        path
    }

    /// Sphericity file for one entity and category
    pub fn sphericity(&self, entity: &str, category: &str, values: &[&str]) -> PathBuf {
        let path = self
            .folder(entity, category)
            .join(format!("{entity}_{category}_Sphericity.csv"));
        write_series(&path, values);
        path
    }
}
